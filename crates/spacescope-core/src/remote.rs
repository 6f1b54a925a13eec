/// The remote scan engine collaborator.
///
/// [`ScanBackend`] is the seam between the session logic and the network.
/// [`HttpBackend`] talks JSON over HTTP to the engine; tests substitute a
/// scripted in-process implementation.
use crate::config::ClientConfig;
use crate::error::{ScanError, ScanResult};
use crate::protocol::{
    DiscoveredPaths, ErrorBody, ProgressResponse, RemoteNode, ScanRequest, ScanStatus,
};
use reqwest::blocking::{Client, Response};
use tracing::debug;

/// Operations offered by the remote scan engine.
///
/// Every call blocks the calling thread until a response or failure
/// arrives; callers keep these calls off the UI thread where it matters.
pub trait ScanBackend: Send + Sync {
    /// `POST /scan`. A rejection must come back as [`ScanError::Submission`].
    fn submit(&self, request: &ScanRequest) -> ScanResult<()>;

    /// `GET /progress`. Failures are [`ScanError::Transport`].
    fn progress(&self) -> ScanResult<ScanStatus>;

    /// `POST /stop_scan`. Best effort.
    fn stop(&self) -> ScanResult<()>;

    /// `GET /results`. Failures are [`ScanError::ResultRetrieval`].
    fn results(&self) -> ScanResult<RemoteNode>;

    /// `GET /discover_paths`.
    fn discover_paths(&self) -> ScanResult<DiscoveredPaths>;
}

/// [`ScanBackend`] over HTTP using a blocking `reqwest` client.
pub struct HttpBackend {
    base_url: String,
    client: Client,
}

impl HttpBackend {
    pub fn new(config: &ClientConfig) -> ScanResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| ScanError::Config(format!("HTTP client: {e}")))?;
        Ok(Self {
            base_url: config.base_url().to_owned(),
            client,
        })
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint)
    }
}

/// Pull the engine's `{error}` message out of a failed response.
fn error_message(response: Response) -> String {
    let status = response.status();
    match response.json::<ErrorBody>() {
        Ok(body) if !body.error.is_empty() => body.error,
        _ => format!("HTTP {status}"),
    }
}

impl ScanBackend for HttpBackend {
    fn submit(&self, request: &ScanRequest) -> ScanResult<()> {
        debug!("POST /scan path={}", request.path);
        let response = self
            .client
            .post(self.url("scan"))
            .json(request)
            .send()
            .map_err(|e| ScanError::Submission(e.to_string()))?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(ScanError::Submission(error_message(response)))
        }
    }

    fn progress(&self) -> ScanResult<ScanStatus> {
        let response = self.client.get(self.url("progress")).send()?;
        if !response.status().is_success() {
            return Err(ScanError::Transport(error_message(response)));
        }
        let raw: ProgressResponse = response.json()?;
        Ok(raw.into())
    }

    fn stop(&self) -> ScanResult<()> {
        let response = self.client.post(self.url("stop_scan")).send()?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(ScanError::Transport(error_message(response)))
        }
    }

    fn results(&self) -> ScanResult<RemoteNode> {
        let response = self
            .client
            .get(self.url("results"))
            .send()
            .map_err(|e| ScanError::ResultRetrieval(e.to_string()))?;
        if !response.status().is_success() {
            return Err(ScanError::ResultRetrieval(error_message(response)));
        }
        response
            .json::<RemoteNode>()
            .map_err(|e| ScanError::ResultRetrieval(e.to_string()))
    }

    fn discover_paths(&self) -> ScanResult<DiscoveredPaths> {
        let response = self.client.get(self.url("discover_paths")).send()?;
        if !response.status().is_success() {
            return Err(ScanError::Transport(error_message(response)));
        }
        Ok(response.json()?)
    }
}

/// Discover selectable paths, falling back to a single Downloads entry.
pub fn discover_or_fallback(backend: &dyn ScanBackend, config: &ClientConfig) -> DiscoveredPaths {
    match backend.discover_paths() {
        Ok(found) => found,
        Err(e) => {
            tracing::warn!("Failed to load available paths: {e}");
            DiscoveredPaths::fallback(&config.fallback_username, &config.home_root)
        }
    }
}

/// Error taxonomy for the SpaceScope client.
///
/// Transport failures are the only transient kind: the poller swallows and
/// logs them. Every other variant is surfaced to the user as a single
/// human-readable message via its `Display` impl.
use thiserror::Error;

/// Convenience alias used across the core crate.
pub type ScanResult<T> = Result<T, ScanError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScanError {
    /// The remote engine rejected the scan start.
    #[error("Failed to start scan: {0}")]
    Submission(String),

    /// A single request failed at the network / decoding level.
    #[error("Request failed: {0}")]
    Transport(String),

    /// The remote engine reported `error` status for the running scan.
    #[error("Scan failed: {0}")]
    RemoteScan(String),

    /// The scan completed but its results could not be fetched.
    #[error("Failed to load results: {0}")]
    ResultRetrieval(String),

    /// No drop strategy produced a candidate path.
    #[error("Could not detect folder paths. Please try typing the path manually.")]
    PathResolution,

    /// The chart renderer did not finish within the bounded wait.
    #[error("Treemap rendering timed out after {0} ms")]
    RenderTimeout(u64),

    /// `start()` was called while a scan is already running.
    #[error("A scan is already in progress")]
    AlreadyScanning,

    /// Invalid or unreadable client configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ScanError {
    /// `true` for failures the poller tolerates and retries.
    pub fn is_transient(&self) -> bool {
        matches!(self, ScanError::Transport(_))
    }
}

impl From<reqwest::Error> for ScanError {
    fn from(e: reqwest::Error) -> Self {
        ScanError::Transport(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_transport_is_transient() {
        assert!(ScanError::Transport("timeout".into()).is_transient());
        assert!(!ScanError::Submission("nope".into()).is_transient());
        assert!(!ScanError::RemoteScan("disk gone".into()).is_transient());
        assert!(!ScanError::PathResolution.is_transient());
    }

    #[test]
    fn messages_are_user_readable() {
        assert_eq!(
            ScanError::Submission("Cannot scan container system directories.".into()).to_string(),
            "Failed to start scan: Cannot scan container system directories."
        );
        assert_eq!(
            ScanError::RemoteScan("No results returned from scan".into()).to_string(),
            "Scan failed: No results returned from scan"
        );
        assert_eq!(
            ScanError::RenderTimeout(30_000).to_string(),
            "Treemap rendering timed out after 30000 ms"
        );
    }
}

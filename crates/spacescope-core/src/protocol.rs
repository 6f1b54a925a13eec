/// Wire types of the remote scan engine's polling protocol.
///
/// All payloads are JSON. Field names follow the engine (`exclude_dirs`,
/// `current_path`, ...), not Rust conventions, hence the serde attributes.
use serde::{Deserialize, Serialize};

/// Body of `POST /scan`. Immutable once submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanRequest {
    pub path: String,
    #[serde(default)]
    pub exclude_dirs: Vec<String>,
}

/// Placeholder in a scan path that expands to the resolved username.
pub const USER_PLACEHOLDER: &str = "$USER";

impl ScanRequest {
    /// Build a request, expanding [`USER_PLACEHOLDER`] and trimming the path.
    ///
    /// The path is not validated against the local filesystem; the remote
    /// engine decides whether it can scan it. An empty path is left for
    /// `ScanSession::start` to reject.
    pub fn new(path: &str, exclude_dirs: Vec<String>, username: &str) -> Self {
        Self {
            path: path.trim().replacen(USER_PLACEHOLDER, username, 1),
            exclude_dirs,
        }
    }
}

/// Split a comma-separated exclusion field into trimmed, non-empty entries.
pub fn parse_exclusions(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Error payload returned by the engine on a rejected request.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Raw body of `GET /progress`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProgressResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub progress: f64,
    #[serde(default)]
    pub current_path: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Remote scan state as reported by one poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteState {
    Scanning,
    Completed,
    Error,
    Stopped,
}

impl RemoteState {
    /// Map the engine's status string.
    ///
    /// The engine reports `cancelled` after a stop request; anything it has
    /// not named yet (e.g. an empty status before the first walk) counts as
    /// still scanning.
    pub fn parse(status: &str) -> Self {
        match status {
            "completed" => RemoteState::Completed,
            "error" => RemoteState::Error,
            "cancelled" | "stopped" => RemoteState::Stopped,
            _ => RemoteState::Scanning,
        }
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, RemoteState::Scanning)
    }
}

/// One progress snapshot. Each poll overwrites the previous one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanStatus {
    pub state: RemoteState,
    /// Always within 0..=100.
    pub progress_percent: u8,
    pub current_path: Option<String>,
    pub error_message: Option<String>,
}

impl ScanStatus {
    pub fn scanning(progress_percent: u8, current_path: Option<&str>) -> Self {
        Self {
            state: RemoteState::Scanning,
            progress_percent: progress_percent.min(100),
            current_path: current_path.map(str::to_owned),
            error_message: None,
        }
    }

    pub fn completed() -> Self {
        Self {
            state: RemoteState::Completed,
            progress_percent: 100,
            current_path: None,
            error_message: None,
        }
    }

    pub fn error(message: &str) -> Self {
        Self {
            state: RemoteState::Error,
            progress_percent: 0,
            current_path: None,
            error_message: Some(message.to_owned()),
        }
    }

    pub fn stopped() -> Self {
        Self {
            state: RemoteState::Stopped,
            progress_percent: 0,
            current_path: None,
            error_message: None,
        }
    }

    /// Human-readable status line for the progress display.
    pub fn status_text(&self) -> &'static str {
        match self.state {
            RemoteState::Scanning if self.progress_percent == 0 && self.current_path.is_none() => {
                "Initializing..."
            }
            RemoteState::Scanning => "Scanning directories...",
            RemoteState::Completed => "Processing results...",
            RemoteState::Error => "Scan failed",
            RemoteState::Stopped => "Scan stopped",
        }
    }
}

impl From<ProgressResponse> for ScanStatus {
    fn from(raw: ProgressResponse) -> Self {
        let percent = if raw.progress.is_finite() {
            raw.progress.clamp(0.0, 100.0).round() as u8
        } else {
            0
        };
        Self {
            state: RemoteState::parse(&raw.status),
            progress_percent: percent,
            current_path: raw.current_path.filter(|p| !p.is_empty()),
            error_message: raw.error,
        }
    }
}

/// One node of the nested result tree returned by `GET /results`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteNode {
    pub name: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub children: Vec<RemoteNode>,
    #[serde(default)]
    pub file_count: u64,
    #[serde(default)]
    pub dir_count: u64,
    #[serde(default)]
    pub is_file: bool,
    /// Synthetic "... N other items" bucket created by the engine.
    #[serde(default)]
    pub is_summary: bool,
}

/// Grouping of a discovered location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathCategory {
    User,
    System,
    #[serde(other)]
    Other,
}

/// A selectable scan location suggested by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathOption {
    pub label: String,
    pub path: String,
    pub category: PathCategory,
}

/// Body of `GET /discover_paths`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveredPaths {
    pub username: String,
    #[serde(default)]
    pub paths: Vec<PathOption>,
}

impl DiscoveredPaths {
    /// Fallback used when discovery fails: a single Downloads entry.
    pub fn fallback(username: &str, home_root: &str) -> Self {
        Self {
            username: username.to_owned(),
            paths: vec![PathOption {
                label: "Downloads".to_owned(),
                path: format!("{home_root}/{username}/Downloads"),
                category: PathCategory::User,
            }],
        }
    }

    /// The home directory entry if present, otherwise the first path.
    pub fn default_selection(&self, home_root: &str) -> Option<&PathOption> {
        let prefix = format!("{home_root}/");
        self.paths
            .iter()
            .find(|p| p.path.starts_with(&prefix) && p.path.ends_with(self.username.as_str()))
            .or_else(|| self.paths.first())
    }

    /// Entries of one category, in engine order.
    pub fn by_category(&self, category: PathCategory) -> Vec<&PathOption> {
        self.paths.iter().filter(|p| p.category == category).collect()
    }
}

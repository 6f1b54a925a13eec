/// Drop-path resolution — turns a drag-and-drop payload into folder paths.
///
/// A browser drop exposes the dropped folder in different, platform
/// dependent ways. Four extraction strategies are tried in fixed priority
/// order and the first that yields at least one candidate wins:
///
/// 1. Per-file metadata (relative path, else absolute path).
/// 2. Directory entries exposing a filesystem-root URL.
/// 3. `text/uri-list`, then `text/plain`.
/// 4. Every typed payload, scanned for absolute paths or `file://` URIs.
///
/// The primary (first) candidate may then be corrected when it is clearly
/// incomplete; see [`correction`].
pub mod correction;
pub mod strategies;

use crate::error::{ScanError, ScanResult};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub use correction::{correct_primary, merge_exclusions, Correction, ExclusionMerge};
pub use strategies::Strategy;

/// Metadata of one dropped file, as exposed by the platform.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DroppedFile {
    pub name: String,
    /// Path relative to the dropped folder's parent (`folder/sub/file`).
    pub relative_path: Option<String>,
    /// Absolute path of the file, where the platform exposes one.
    pub path: Option<String>,
}

/// One dropped item seen through the directory-entry API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DroppedEntry {
    pub name: String,
    pub is_directory: bool,
    /// `filesystem:file:///...` URL of the entry's filesystem root, if exposed.
    pub filesystem_root_url: Option<String>,
}

/// One typed text payload (`text/uri-list`, `text/plain`, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypedData {
    pub mime: String,
    pub data: String,
}

/// Everything a single drop event carried. Every part may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DropPayload {
    pub files: Vec<DroppedFile>,
    pub entries: Vec<DroppedEntry>,
    /// In the order the platform listed the types.
    pub data: Vec<TypedData>,
}

impl DropPayload {
    /// Payload of the given MIME type, if present.
    pub fn data_of(&self, mime: &str) -> Option<&str> {
        self.data
            .iter()
            .find(|d| d.mime == mime)
            .map(|d| d.data.as_str())
    }
}

/// Candidate paths from one drop. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropCandidate {
    paths: Vec<String>,
    /// Which strategy produced the paths.
    pub strategy: Strategy,
}

impl DropCandidate {
    pub fn primary(&self) -> &str {
        &self.paths[0]
    }

    pub fn paths(&self) -> &[String] {
        &self.paths
    }
}

/// Run the strategies in priority order and return the first non-empty result.
///
/// Fails with [`ScanError::PathResolution`] when nothing usable was found;
/// no candidate is ever invented.
pub fn resolve(payload: &DropPayload) -> ScanResult<DropCandidate> {
    debug!(
        "Drop payload: {} file(s), {} entr(ies), types {:?}",
        payload.files.len(),
        payload.entries.len(),
        payload.data.iter().map(|d| d.mime.as_str()).collect::<Vec<_>>()
    );
    for strategy in Strategy::ORDER {
        let paths = strategy.extract(payload);
        if !paths.is_empty() {
            debug!("{strategy:?} produced {} candidate(s)", paths.len());
            return Ok(DropCandidate { paths, strategy });
        }
    }
    Err(ScanError::PathResolution)
}

/// Resolve a drop for a single-path field and correct the primary candidate.
pub fn resolve_single(
    payload: &DropPayload,
    username: &str,
    home_root: &str,
) -> ScanResult<Correction> {
    let candidate = resolve(payload)?;
    Ok(correct_primary(candidate.primary(), username, home_root))
}

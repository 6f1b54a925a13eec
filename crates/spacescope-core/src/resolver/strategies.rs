/// The four drop extraction strategies.
///
/// Each strategy is a pure function from the payload to an ordered,
/// de-duplicated list of candidate paths; an empty list means "no match".
use super::DropPayload;

/// Name macOS Finder gives its per-folder metadata file.
const DS_STORE: &str = ".DS_Store";
const FILE_SCHEME: &str = "file://";
const FILESYSTEM_ROOT_PREFIX: &str = "filesystem:file:///";
const URI_LIST: &str = "text/uri-list";
const PLAIN_TEXT: &str = "text/plain";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Containing directory of each dropped file.
    FileMetadata,
    /// Directory entries with a filesystem-root URL.
    DirectoryEntry,
    /// `text/uri-list`, falling back to `text/plain`.
    TextPayload,
    /// Any payload type that contains path-like lines.
    Exhaustive,
}

impl Strategy {
    /// Priority order.
    pub const ORDER: [Strategy; 4] = [
        Strategy::FileMetadata,
        Strategy::DirectoryEntry,
        Strategy::TextPayload,
        Strategy::Exhaustive,
    ];

    pub fn extract(self, payload: &DropPayload) -> Vec<String> {
        match self {
            Strategy::FileMetadata => from_file_metadata(payload),
            Strategy::DirectoryEntry => from_directory_entries(payload),
            Strategy::TextPayload => from_text_payload(payload),
            Strategy::Exhaustive => from_any_payload(payload),
        }
    }
}

fn push_unique(paths: &mut Vec<String>, path: String) {
    if !path.is_empty() && !paths.contains(&path) {
        paths.push(path);
    }
}

/// Decode a `file://` URI into a path. Returns `None` for other schemes.
fn decode_file_uri(uri: &str) -> Option<String> {
    let rest = uri.strip_prefix(FILE_SCHEME)?;
    let decoded = urlencoding::decode(rest)
        .map(|d| d.into_owned())
        .unwrap_or_else(|_| rest.to_owned());
    Some(strip_trailing_slash(&decoded))
}

fn strip_trailing_slash(path: &str) -> String {
    match path.strip_suffix('/') {
        Some(stripped) if !stripped.is_empty() => stripped.to_owned(),
        _ => path.to_owned(),
    }
}

fn from_file_metadata(payload: &DropPayload) -> Vec<String> {
    let mut paths = Vec::new();
    for file in &payload.files {
        let dir = if let Some(relative) = file.relative_path.as_deref().filter(|r| !r.is_empty()) {
            // "folder/sub/file" -> "/folder/sub"
            relative
                .rsplit_once('/')
                .map(|(parent, _)| format!("/{parent}"))
        } else if let Some(path) = file.path.as_deref() {
            let cut = if file.name == DS_STORE {
                path.rfind(&format!("/{DS_STORE}"))
            } else {
                path.rfind('/')
            };
            cut.map(|i| path[..i].to_owned())
        } else {
            None
        };
        if let Some(dir) = dir {
            push_unique(&mut paths, dir);
        }
    }
    paths
}

fn from_directory_entries(payload: &DropPayload) -> Vec<String> {
    let mut paths = Vec::new();
    for entry in payload.entries.iter().filter(|e| e.is_directory) {
        let Some(url) = entry.filesystem_root_url.as_deref() else {
            continue;
        };
        if !url.starts_with(FILESYSTEM_ROOT_PREFIX) {
            continue;
        }
        // Keep the leading '/' of the path part.
        let raw = &url["filesystem:file://".len()..];
        let root = urlencoding::decode(raw)
            .map(|d| d.into_owned())
            .unwrap_or_else(|_| raw.to_owned());
        push_unique(&mut paths, format!("{}/{}", root.trim_end_matches('/'), entry.name));
    }
    paths
}

fn from_text_payload(payload: &DropPayload) -> Vec<String> {
    let mut paths = Vec::new();
    if let Some(list) = payload.data_of(URI_LIST) {
        for line in list.lines().map(str::trim).filter(|l| !l.is_empty()) {
            if let Some(path) = decode_file_uri(line) {
                push_unique(&mut paths, path);
            }
        }
    }
    if paths.is_empty() {
        if let Some(text) = payload.data_of(PLAIN_TEXT) {
            let text = text.trim();
            if text.starts_with('/') {
                push_unique(&mut paths, text.to_owned());
            }
        }
    }
    paths
}

fn from_any_payload(payload: &DropPayload) -> Vec<String> {
    let mut paths = Vec::new();
    for typed in payload.data.iter().filter(|d| d.data.contains('/')) {
        for line in typed.data.lines().map(str::trim).filter(|l| !l.is_empty()) {
            if line.starts_with('/') {
                push_unique(&mut paths, strip_trailing_slash(line));
            } else if let Some(path) = decode_file_uri(line) {
                push_unique(&mut paths, path);
            }
        }
    }
    paths
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::{DroppedEntry, DroppedFile, TypedData};

    fn file(name: &str, relative: Option<&str>, path: Option<&str>) -> DroppedFile {
        DroppedFile {
            name: name.into(),
            relative_path: relative.map(Into::into),
            path: path.map(Into::into),
        }
    }

    fn with_data(items: &[(&str, &str)]) -> DropPayload {
        DropPayload {
            data: items
                .iter()
                .map(|(mime, data)| TypedData {
                    mime: (*mime).into(),
                    data: (*data).into(),
                })
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn relative_path_yields_folder_chain() {
        let payload = DropPayload {
            files: vec![
                file("a.txt", Some("Projects/site/a.txt"), None),
                file("b.txt", Some("Projects/site/b.txt"), None),
            ],
            ..Default::default()
        };
        assert_eq!(Strategy::FileMetadata.extract(&payload), ["/Projects/site"]);
    }

    #[test]
    fn relative_path_without_folder_is_skipped() {
        let payload = DropPayload {
            files: vec![file("a.txt", Some("a.txt"), None)],
            ..Default::default()
        };
        assert!(Strategy::FileMetadata.extract(&payload).is_empty());
    }

    #[test]
    fn ds_store_maps_to_its_folder() {
        let payload = DropPayload {
            files: vec![
                file(".DS_Store", None, Some("/Users/alex/Movies/.DS_Store")),
                file("clip.mov", None, Some("/Users/alex/Pictures/clip.mov")),
            ],
            ..Default::default()
        };
        assert_eq!(
            Strategy::FileMetadata.extract(&payload),
            ["/Users/alex/Movies", "/Users/alex/Pictures"]
        );
    }

    #[test]
    fn path_without_separator_is_skipped() {
        let payload = DropPayload {
            files: vec![file("loose", None, Some("loose"))],
            ..Default::default()
        };
        assert!(Strategy::FileMetadata.extract(&payload).is_empty());
    }

    #[test]
    fn directory_entry_uses_filesystem_root() {
        let payload = DropPayload {
            entries: vec![
                DroppedEntry {
                    name: "My Music".into(),
                    is_directory: true,
                    filesystem_root_url: Some("filesystem:file:///Users/alex%20b/".into()),
                },
                DroppedEntry {
                    name: "notes.txt".into(),
                    is_directory: false,
                    filesystem_root_url: Some("filesystem:file:///Users/alex".into()),
                },
                DroppedEntry {
                    name: "Opaque".into(),
                    is_directory: true,
                    filesystem_root_url: None,
                },
            ],
            ..Default::default()
        };
        assert_eq!(
            Strategy::DirectoryEntry.extract(&payload),
            ["/Users/alex b/My Music"]
        );
    }

    #[test]
    fn uri_list_is_decoded_and_trailing_slash_dropped() {
        let payload = with_data(&[(
            "text/uri-list",
            "file:///Users/alex/My%20Docs/\r\nhttps://example.com\r\nfile:///tmp\r\n",
        )]);
        assert_eq!(
            Strategy::TextPayload.extract(&payload),
            ["/Users/alex/My Docs", "/tmp"]
        );
    }

    #[test]
    fn plain_text_needs_leading_slash() {
        assert_eq!(
            Strategy::TextPayload.extract(&with_data(&[("text/plain", " /opt/data \n")])),
            ["/opt/data"]
        );
        assert!(Strategy::TextPayload
            .extract(&with_data(&[("text/plain", "Downloads")]))
            .is_empty());
    }

    #[test]
    fn uri_list_wins_over_plain_text() {
        let payload = with_data(&[
            ("text/plain", "/from/text"),
            ("text/uri-list", "file:///from/uri"),
        ]);
        assert_eq!(Strategy::TextPayload.extract(&payload), ["/from/uri"]);
    }

    #[test]
    fn exhaustive_scan_reads_every_type() {
        let payload = with_data(&[
            ("text/html", "<a>not a path</a>"),
            ("application/x-finder", "junk\n/Volumes/Backup/\nfile:///Users/alex/Desktop"),
            ("text/x-moz-url", "/Volumes/Backup"),
        ]);
        assert_eq!(
            Strategy::Exhaustive.extract(&payload),
            ["/Volumes/Backup", "/Users/alex/Desktop"]
        );
    }

    #[test]
    fn root_slash_is_kept() {
        assert_eq!(strip_trailing_slash("/"), "/");
        assert_eq!(decode_file_uri("file:///").as_deref(), Some("/"));
    }
}

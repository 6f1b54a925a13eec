/// Best-effort correction of clearly incomplete dropped paths.
///
/// Some platforms only expose a folder's name (or a root-level looking
/// `/Name`) instead of its absolute path. Such values are mapped into the
/// user's home directory. The result is a guess: callers show it to the user
/// and flag it when `corrected` is set.
use crate::protocol::parse_exclusions;

/// Folder names that stand for the home directory itself.
const HOME_MARKER: &str = "user";

/// Home sub-folders that never exist at the filesystem root, so a
/// root-level `/Name` for these can only be a truncated home path.
const HOME_ONLY_FOLDERS: [&str; 3] = ["Documents", "Downloads", "Desktop"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Correction {
    /// The candidate as extracted from the drop.
    pub original: String,
    /// The value to put in the path field.
    pub path: String,
    pub corrected: bool,
}

impl Correction {
    fn unchanged(path: &str) -> Self {
        Self {
            original: path.to_owned(),
            path: path.to_owned(),
            corrected: false,
        }
    }

    fn to(original: &str, path: String) -> Self {
        let corrected = path != original;
        Self {
            original: original.to_owned(),
            path,
            corrected,
        }
    }

    /// Message shown after the drop.
    pub fn message(&self) -> String {
        if self.corrected {
            format!("Path set to: {} (auto-corrected - please verify)", self.path)
        } else {
            format!("Scan path set to: {}", self.path)
        }
    }
}

fn home_dir(username: &str, home_root: &str) -> String {
    format!("{home_root}/{username}")
}

/// `Some(name)` for a two-segment absolute path such as `/Applications`.
fn root_level_name(path: &str) -> Option<&str> {
    let name = path.strip_prefix('/')?;
    (!name.is_empty() && !name.contains('/')).then_some(name)
}

/// Correct the primary drop candidate if it is clearly incomplete.
///
/// - A bare name (no leading `/`) is placed under the home directory; the
///   home markers (`user` or the username) become the home directory.
/// - A root-level `/Name` becomes the home directory when it is the home
///   root itself or the username, and `home/Name` for the home-only
///   folders. Any other root-level folder is real and left alone.
/// - Everything else is returned unchanged.
pub fn correct_primary(path: &str, username: &str, home_root: &str) -> Correction {
    if path.is_empty() {
        return Correction::unchanged(path);
    }
    let home = home_dir(username, home_root);

    if !path.starts_with('/') {
        let name = path.trim_end_matches('/');
        let fixed = if name == HOME_MARKER || name == username {
            home
        } else {
            format!("{home}/{name}")
        };
        return Correction::to(path, fixed);
    }

    match root_level_name(path) {
        Some(_) if path == home_root => Correction::to(path, home),
        Some(name) if name == username => Correction::to(path, home),
        Some(name) if HOME_ONLY_FOLDERS.contains(&name) => {
            Correction::to(path, format!("{home}/{name}"))
        }
        _ => Correction::unchanged(path),
    }
}

/// Light correction used for exclusion drops: bare names go under home and
/// the home root itself becomes the home directory.
fn correct_exclusion(path: &str, username: &str, home_root: &str) -> String {
    if !path.starts_with('/') {
        format!("{}/{path}", home_dir(username, home_root))
    } else if path == home_root {
        home_dir(username, home_root)
    } else {
        path.to_owned()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExclusionMerge {
    /// New comma-separated field value.
    pub value: String,
    /// How many dropped folders were not already listed.
    pub added: usize,
}

impl ExclusionMerge {
    pub fn message(&self) -> String {
        if self.added > 0 {
            format!("Added {} folder(s) to exclusion list", self.added)
        } else {
            "Folders already in exclusion list".to_string()
        }
    }
}

/// Append every dropped folder to the exclusion field, skipping duplicates.
pub fn merge_exclusions(
    current: &str,
    dropped: &[String],
    username: &str,
    home_root: &str,
) -> ExclusionMerge {
    let mut all = parse_exclusions(current);
    let mut added = 0;
    for path in dropped {
        let fixed = correct_exclusion(path, username, home_root);
        if !all.contains(&fixed) {
            all.push(fixed);
            added += 1;
        }
    }
    ExclusionMerge {
        value: all.join(", "),
        added,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absolute_paths_are_left_alone() {
        let c = correct_primary("/Users/alex/Downloads", "alex", "/Users");
        assert!(!c.corrected);
        assert_eq!(c.path, "/Users/alex/Downloads");
    }

    #[test]
    fn bare_names_go_under_home() {
        for (input, expected) in [
            ("Downloads", "/Users/alex/Downloads"),
            ("Documents", "/Users/alex/Documents"),
            ("Desktop", "/Users/alex/Desktop"),
            ("Library", "/Users/alex/Library"),
            ("Projects", "/Users/alex/Projects"),
            ("alex", "/Users/alex"),
            ("user", "/Users/alex"),
        ] {
            let c = correct_primary(input, "alex", "/Users");
            assert_eq!(c.path, expected, "input {input}");
            assert!(c.corrected);
        }
    }

    #[test]
    fn root_level_home_paths_are_completed() {
        assert_eq!(correct_primary("/Users", "alex", "/Users").path, "/Users/alex");
        assert_eq!(correct_primary("/alex", "alex", "/Users").path, "/Users/alex");
        assert_eq!(
            correct_primary("/Desktop", "alex", "/Users").path,
            "/Users/alex/Desktop"
        );
    }

    #[test]
    fn real_root_folders_are_not_touched() {
        for input in ["/Applications", "/Library", "/tmp", "/"] {
            let c = correct_primary(input, "alex", "/Users");
            assert!(!c.corrected, "input {input}");
            assert_eq!(c.path, input);
        }
    }

    #[test]
    fn custom_home_root() {
        assert_eq!(
            correct_primary("Music", "sam", "/home").path,
            "/home/sam/Music"
        );
    }

    #[test]
    fn messages_reflect_correction() {
        assert!(correct_primary("Downloads", "alex", "/Users")
            .message()
            .contains("auto-corrected"));
        assert_eq!(
            correct_primary("/opt", "alex", "/Users").message(),
            "Scan path set to: /opt"
        );
    }

    #[test]
    fn exclusions_merge_without_duplicates() {
        let merged = merge_exclusions(
            "/Users/alex/Library, node_modules",
            &[
                "Library".to_string(),
                "/Volumes/Backup".to_string(),
                "/Volumes/Backup".to_string(),
                "/Users".to_string(),
            ],
            "alex",
            "/Users",
        );
        assert_eq!(
            merged.value,
            "/Users/alex/Library, node_modules, /Volumes/Backup, /Users/alex"
        );
        assert_eq!(merged.added, 2);
        assert_eq!(merged.message(), "Added 2 folder(s) to exclusion list");
    }

    #[test]
    fn exclusion_merge_reports_nothing_new() {
        let merged = merge_exclusions("/tmp", &["/tmp".to_string()], "alex", "/Users");
        assert_eq!(merged.added, 0);
        assert_eq!(merged.value, "/tmp");
        assert_eq!(merged.message(), "Folders already in exclusion list");
    }
}

use log::debug;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Entry produced by a snapshot traversal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Absolute path on disk
    pub path: PathBuf,
    /// Path relative to the traversal root, `/`-separated
    pub relative: String,
    pub is_dir: bool,
}

impl FileEntry {
    /// Lowercased base name.
    pub fn base_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().to_lowercase())
            .unwrap_or_default()
    }

    /// Lowercased extension including the leading dot, if any.
    pub fn extension(&self) -> Option<String> {
        self.path
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
    }
}

/// Lazily walks `root` depth-first in file-name order.
///
/// The root itself and the VCS `.git` directory are not yielded. Entries
/// that cannot be read are skipped. Each call starts a fresh traversal.
pub fn walk(root: &Path) -> impl Iterator<Item = FileEntry> + '_ {
    WalkDir::new(root)
        .min_depth(1)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !(entry.file_type().is_dir() && entry.file_name() == ".git"))
        .filter_map(|entry| {
            entry
                .inspect_err(|e| debug!("Skipping unreadable entry: {e}"))
                .ok()
        })
        .filter(|entry| entry.file_type().is_dir() || entry.file_type().is_file())
        .map(move |entry| {
            let relative = entry
                .path()
                .strip_prefix(root)
                .unwrap_or(entry.path())
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");

            FileEntry {
                is_dir: entry.file_type().is_dir(),
                path: entry.into_path(),
                relative,
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn fixture() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("src/components")).unwrap();
        fs::create_dir_all(dir.path().join(".git/objects")).unwrap();
        fs::write(dir.path().join(".git/HEAD"), "ref: refs/heads/main\n").unwrap();
        fs::write(dir.path().join("src/components/App.ts"), "export {}\n").unwrap();
        fs::write(dir.path().join("src/index.ts"), "import './components/App'\n").unwrap();
        fs::write(dir.path().join("README.md"), "# Demo\n").unwrap();
        dir
    }

    #[test]
    fn test_walk_is_depth_first_and_sorted() {
        let dir = fixture();
        let entries: Vec<_> = walk(dir.path())
            .map(|e| (e.relative, e.is_dir))
            .collect();

        assert_eq!(
            entries,
            vec![
                ("README.md".to_string(), false),
                ("src".to_string(), true),
                ("src/components".to_string(), true),
                ("src/components/App.ts".to_string(), false),
                ("src/index.ts".to_string(), false),
            ]
        );
    }

    #[test]
    fn test_walk_skips_git_metadata() {
        let dir = fixture();
        assert!(walk(dir.path()).all(|e| !e.relative.starts_with(".git")));
    }

    #[test]
    fn test_walk_is_restartable() {
        let dir = fixture();
        let first: Vec<_> = walk(dir.path()).collect();
        let second: Vec<_> = walk(dir.path()).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_entry_name_helpers() {
        let entry = FileEntry {
            path: PathBuf::from("/tmp/x/Contracts/Token.SOL"),
            relative: "Contracts/Token.SOL".to_string(),
            is_dir: false,
        };
        assert_eq!(entry.base_name(), "token.sol");
        assert_eq!(entry.extension().as_deref(), Some(".sol"));

        let bare = FileEntry {
            path: PathBuf::from("/tmp/x/Makefile"),
            relative: "Makefile".to_string(),
            is_dir: false,
        };
        assert_eq!(bare.extension(), None);
    }
}

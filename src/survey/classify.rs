use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::path::PathBuf;

use super::walker::FileEntry;

/// Extensions treated as source code.
const CODE_EXTENSIONS: &[&str] = &[
    ".js", ".ts", ".sol", ".py", ".java", ".c", ".cpp", ".cs", ".rb", ".go", ".php", ".rs",
];

const CONTRACT_EXTENSIONS: &[&str] = &[".sol"];

/// Extensions the role heuristics (API, backend, frontend) apply to.
const SCRIPT_EXTENSIONS: &[&str] = &[".js", ".ts"];

static API_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)api|routes|controller|server|app").expect("API pattern is valid")
});

static BACKEND_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)backend|server|api").expect("backend pattern is valid"));

static FRONTEND_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)frontend|src|components|pages|client").expect("frontend pattern is valid")
});

/// A classified source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceFile {
    pub path: PathBuf,
    pub relative: String,
}

impl From<&FileEntry> for SourceFile {
    fn from(entry: &FileEntry) -> Self {
        Self {
            path: entry.path.clone(),
            relative: entry.relative.clone(),
        }
    }
}

/// Source files grouped by heuristic role, each list in discovery order.
///
/// Categories overlap: a file may appear in several lists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FileClassification {
    pub code_files: Vec<SourceFile>,
    pub contract_files: Vec<SourceFile>,
    pub api_files: Vec<SourceFile>,
    pub backend_files: Vec<SourceFile>,
    pub frontend_files: Vec<SourceFile>,
}

impl FileClassification {
    /// Classifies every file yielded by `entries`; directories are ignored.
    pub fn from_entries(entries: impl IntoIterator<Item = FileEntry>) -> Self {
        let mut classification = Self::default();
        for entry in entries.into_iter().filter(|e| !e.is_dir) {
            classification.add(&entry);
        }
        classification
    }

    fn add(&mut self, entry: &FileEntry) {
        let Some(ext) = entry.extension() else {
            return;
        };
        let ext = ext.as_str();

        if CODE_EXTENSIONS.contains(&ext) {
            self.code_files.push(entry.into());
        }
        if CONTRACT_EXTENSIONS.contains(&ext) {
            self.contract_files.push(entry.into());
        }
        if SCRIPT_EXTENSIONS.contains(&ext) {
            let path = entry.relative.as_str();
            if API_PATTERN.is_match(path) {
                self.api_files.push(entry.into());
            }
            if BACKEND_PATTERN.is_match(path) {
                self.backend_files.push(entry.into());
            }
            if FRONTEND_PATTERN.is_match(path) {
                self.frontend_files.push(entry.into());
            }
        }
    }
}

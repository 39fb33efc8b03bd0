//! Static survey of a local snapshot: line counts per language, key folders,
//! detected frameworks, and the role classification of source files.

mod classify;
mod frameworks;
mod languages;
mod walker;

use log::info;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

pub use classify::{FileClassification, SourceFile};
use languages::language_for;
pub use walker::{walk, FileEntry};

/// Language statistics and structural facts of a snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StaticAnalysis {
    /// Language label to total line count
    pub language_stats: BTreeMap<String, u64>,
    /// Recognized directory names present in the tree
    pub key_folders: BTreeSet<String>,
    /// Frameworks named by dependency manifests
    pub frameworks: BTreeSet<String>,
}

impl StaticAnalysis {
    /// Computes statistics over the entries of one traversal.
    pub fn from_entries(entries: impl IntoIterator<Item = FileEntry>) -> Self {
        let mut analysis = Self::default();

        for entry in entries {
            if entry.is_dir {
                let base = entry.base_name();
                if languages::is_key_folder(&base) {
                    analysis.key_folders.insert(base);
                }
                continue;
            }

            let language = language_for(entry.extension().as_deref());
            *analysis.language_stats.entry(language).or_insert(0) +=
                languages::count_lines(&entry.path);

            frameworks::detect(&entry.path, &mut analysis.frameworks);
        }

        analysis
    }

    pub fn total_lines(&self) -> u64 {
        self.language_stats.values().sum()
    }
}

/// Everything the narrative stage needs from a snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Survey {
    pub analysis: StaticAnalysis,
    pub classification: FileClassification,
}

/// Surveys the tree under `root`.
///
/// Statistics and classification run as two independent traversals.
/// This is blocking filesystem work.
pub fn survey(root: &Path) -> Survey {
    let analysis = StaticAnalysis::from_entries(walk(root));
    let classification = FileClassification::from_entries(walk(root));

    info!(
        "Surveyed {} lines across {} languages, {} code files",
        analysis.total_lines(),
        analysis.language_stats.len(),
        classification.code_files.len()
    );

    Survey {
        analysis,
        classification,
    }
}

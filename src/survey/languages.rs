use std::path::Path;

/// Bucket for files that have no extension at all.
pub const NO_EXTENSION: &str = "(none)";

/// Directory names reported as key folders when present anywhere in the tree.
pub const KEY_FOLDERS: &[&str] = &[
    "contracts", "src", "docs", "test", "lib", "public", "build", "dist",
];

/// Maps a lowercased extension (with leading dot) to a language label.
///
/// Unmapped extensions are returned as-is, so every file lands in exactly
/// one bucket.
pub fn language_for(extension: Option<&str>) -> String {
    let Some(ext) = extension else {
        return NO_EXTENSION.to_string();
    };

    let label = match ext {
        ".js" => "JavaScript",
        ".ts" => "TypeScript",
        ".py" => "Python",
        ".sol" => "Solidity",
        ".java" => "Java",
        ".c" => "C",
        ".cpp" => "C++",
        ".cs" => "C#",
        ".rb" => "Ruby",
        ".go" => "Go",
        ".php" => "PHP",
        ".rs" => "Rust",
        ".html" => "HTML",
        ".css" => "CSS",
        ".md" => "Markdown",
        ".json" => "JSON",
        ".sh" => "Shell",
        ".yml" | ".yaml" => "YAML",
        other => other,
    };

    label.to_string()
}

/// Number of lines in a text file; unreadable or non-UTF-8 files count 0.
///
/// A trailing newline does not start another line, so `"a\n"` is one line
/// and an empty file is zero. This intentionally differs from counting the
/// pieces of a split on `\n`, which would give two and one.
pub fn count_lines(path: &Path) -> u64 {
    std::fs::read_to_string(path)
        .map(|content| content.lines().count() as u64)
        .unwrap_or(0)
}

pub fn is_key_folder(base_name: &str) -> bool {
    KEY_FOLDERS.contains(&base_name)
}

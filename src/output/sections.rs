use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;

static HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#+\s*(.+)$").expect("heading pattern is valid"));
static RULE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^-{3,}$").expect("rule pattern is valid"));
static NUMBERED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+\.\s+(.+)$").expect("numbered item pattern is valid"));
static NON_ALPHANUMERIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9]+").expect("slug pattern is valid"));

/// Key of the text before the first heading or numbered item.
pub const LEADING_SECTION: &str = "summary";

/// Lowercase, dash-separated key for a heading.
pub fn slugify(text: &str) -> String {
    let lowered = text.to_lowercase();
    NON_ALPHANUMERIC
        .replace_all(&lowered, "-")
        .trim_matches('-')
        .to_string()
}

/// Splits loosely structured markdown into named sections.
///
/// Headings (`#`, `##`, ...) open a section keyed by their slug and are not
/// kept in the body. Numbered items (`1. ...`) open a section too and stay
/// as its first line. A horizontal rule (`---`) closes the open section and
/// the lines after it are dropped until the next heading or item. Sections
/// with empty bodies are left out, and repeated keys are appended to the
/// first occurrence.
pub fn split_sections(text: &str) -> IndexMap<String, String> {
    let mut sections = IndexMap::new();
    let mut current: Option<(String, Vec<&str>)> = Some((LEADING_SECTION.to_string(), Vec::new()));

    for line in text.lines() {
        let trimmed = line.trim();

        if let Some(caps) = HEADING.captures(trimmed) {
            close(&mut sections, current.take());
            current = Some((slug_or_default(&caps[1]), Vec::new()));
        } else if RULE.is_match(trimmed) {
            close(&mut sections, current.take());
        } else if let Some(caps) = NUMBERED.captures(trimmed) {
            close(&mut sections, current.take());
            current = Some((slug_or_default(&caps[1]), vec![trimmed]));
        } else if let Some((_, lines)) = current.as_mut() {
            lines.push(line);
        }
    }
    close(&mut sections, current);

    sections
}

fn slug_or_default(text: &str) -> String {
    let slug = slugify(text);
    if slug.is_empty() {
        "section".to_string()
    } else {
        slug
    }
}

fn close(sections: &mut IndexMap<String, String>, section: Option<(String, Vec<&str>)>) {
    let Some((key, lines)) = section else {
        return;
    };

    let body = lines.join("\n").trim().to_string();
    if body.is_empty() {
        return;
    }

    if let Some(existing) = sections.get_mut(&key) {
        existing.push_str("\n\n");
        existing.push_str(&body);
    } else {
        sections.insert(key, body);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Project Description"), "project-description");
        assert_eq!(slugify("**API Endpoints & Routes:**"), "api-endpoints-routes");
        assert_eq!(slugify("  Smart-Contract  Structure "), "smart-contract-structure");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn test_headings_open_sections() {
        let text = "Intro line.\n\n# Project Description\nWidgets for all.\n## Architecture\nNext.js frontend.\n";
        let sections = split_sections(text);

        let keys: Vec<_> = sections.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["summary", "project-description", "architecture"]);
        assert_eq!(sections["summary"], "Intro line.");
        assert_eq!(sections["project-description"], "Widgets for all.");
        assert_eq!(sections["architecture"], "Next.js frontend.");
    }

    #[test]
    fn test_numbered_items_keep_their_line() {
        let text = "1. Contract structure\nERC20 token.\n2. API endpoints\nGET /widgets";
        let sections = split_sections(text);

        assert_eq!(sections["contract-structure"], "1. Contract structure\nERC20 token.");
        assert_eq!(sections["api-endpoints"], "2. API endpoints\nGET /widgets");
        assert!(!sections.contains_key("summary"));
    }

    #[test]
    fn test_rule_drops_trailing_text() {
        let text = "# Overview\nA toolkit.\n---\nstray footer\n# Usage\nRun it.";
        let sections = split_sections(text);

        assert_eq!(sections["overview"], "A toolkit.");
        assert_eq!(sections["usage"], "Run it.");
        assert!(sections.values().all(|body| !body.contains("stray footer")));
    }

    #[test]
    fn test_empty_sections_dropped_and_repeats_merged() {
        let text = "# Notes\n\n# Details\nfirst\n# Details\nsecond";
        let sections = split_sections(text);

        assert!(!sections.contains_key("notes"));
        assert_eq!(sections["details"], "first\n\nsecond");
    }

    #[test]
    fn test_plain_text_is_single_summary() {
        let sections = split_sections("Just one paragraph.");
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[LEADING_SECTION], "Just one paragraph.");
        assert!(split_sections("").is_empty());
    }
}

use std::fmt::Write;

use comfy_table::{Cell, Color as TableColor};

use crate::report::AnalysisReport;

use super::sections::split_sections;
use super::styling::{bright, bright_yellow, cyan, dim, unavailable};
use super::tables::{create_table, cyan_header, format_bytes, language_share_cell, optional_cell};

/// Prints a human-readable rendering of an analysis report to stdout.
///
/// Shows an overview of the repository, its language composition, top
/// contributors, recent commits, open work, the generated summary split into
/// sections, and the similarity verdicts. Collections that could not be
/// fetched are marked as unavailable.
pub fn print_report(report: &AnalysisReport) {
    println!("{}", render_summary(report));
}

fn add_section_header(output: &mut String, emoji: &str, title: &str) {
    let _ = writeln!(output, "{} {}", bright(emoji), bright(title).underlined());
}

fn section_title(key: &str) -> String {
    let spaced = key.replace('-', " ");
    let mut chars = spaced.chars();
    chars
        .next()
        .map(|first| first.to_uppercase().chain(chars).collect())
        .unwrap_or_default()
}

fn render_overview(output: &mut String, report: &AnalysisReport) {
    add_section_header(output, "📊", "Overview");

    let Some(info) = &report.repo_info else {
        let _ = writeln!(output, "  {}\n", unavailable());
        return;
    };

    let _ = writeln!(
        output,
        "  {} {}",
        dim("Repository:"),
        cyan(info.full_name.as_deref().unwrap_or("unknown"))
    );
    if let Some(description) = &info.description {
        let _ = writeln!(output, "  {} {}", dim("Description:"), description);
    }
    output.push('\n');

    let license = info
        .license
        .as_ref()
        .and_then(|l| l.spdx_id.clone().or_else(|| l.name.clone()));

    let mut table = create_table();
    table.set_header(cyan_header(&[
        "Stars",
        "Forks",
        "Watchers",
        "Open Issues",
        "License",
        "Default Branch",
    ]));
    table.add_row(vec![
        optional_cell(info.stargazers_count),
        optional_cell(info.forks_count),
        optional_cell(info.subscribers_count.or(info.watchers_count)),
        optional_cell(info.open_issues_count),
        optional_cell(license),
        optional_cell(info.default_branch.as_deref()),
    ]);
    let _ = writeln!(output, "{table}\n");
}

fn render_languages(output: &mut String, report: &AnalysisReport) {
    add_section_header(output, "🧬", "Languages");

    let Some(languages) = &report.languages else {
        let _ = writeln!(output, "  {}\n", unavailable());
        return;
    };
    if languages.is_empty() {
        let _ = writeln!(output, "  {}\n", dim("No languages reported."));
        return;
    }

    let total: u64 = languages.values().sum();
    let mut table = create_table();
    table.set_header(cyan_header(&["Language", "Size", "Share"]));

    for (language, bytes) in languages {
        #[allow(clippy::cast_precision_loss)]
        let share = if total > 0 {
            (*bytes as f64 / total as f64) * 100.0
        } else {
            0.0
        };
        table.add_row(vec![
            Cell::new(language),
            Cell::new(format_bytes(*bytes)),
            language_share_cell(share),
        ]);
    }
    let _ = writeln!(output, "{table}\n");
}

fn render_contributors(output: &mut String, report: &AnalysisReport) {
    add_section_header(output, "👥", "Top Contributors");

    let Some(contributors) = &report.contributors else {
        let _ = writeln!(output, "  {}\n", unavailable());
        return;
    };

    let mut table = create_table();
    table.set_header(cyan_header(&["Login", "Contributions"]));
    for contributor in contributors {
        table.add_row(vec![
            optional_cell(contributor.login.as_deref()),
            optional_cell(contributor.contributions),
        ]);
    }
    let _ = writeln!(output, "{table}\n");
}

fn render_commits(output: &mut String, report: &AnalysisReport) {
    add_section_header(output, "📝", "Recent Commits");

    let Some(commits) = &report.commits else {
        let _ = writeln!(output, "  {}\n", unavailable());
        return;
    };

    let mut table = create_table();
    table.set_header(cyan_header(&["SHA", "Message", "Author", "Date"]));
    for commit in commits {
        let author = commit.commit.as_ref().and_then(|c| c.author.as_ref());
        table.add_row(vec![
            optional_cell(commit.sha.as_deref().map(|sha| sha.chars().take(7).collect::<String>())),
            optional_cell(commit.headline()),
            optional_cell(author.and_then(|a| a.name.as_deref())),
            optional_cell(author.and_then(|a| a.date).map(|d| d.format("%Y-%m-%d"))),
        ]);
    }
    let _ = writeln!(output, "{table}\n");
}

fn render_activity(output: &mut String, report: &AnalysisReport) {
    add_section_header(output, "📬", "Open Work");

    let count = |value: Option<usize>| {
        value.map_or_else(|| unavailable().to_string(), |n| bright_yellow(n).to_string())
    };

    let _ = writeln!(
        output,
        "  {} {}\n  {} {}\n",
        dim("Open issues:"),
        count(report.open_issue_count()),
        dim("Open pull requests:"),
        count(report.pulls.as_ref().map(Vec::len)),
    );
}

fn render_narrative(output: &mut String, report: &AnalysisReport) {
    add_section_header(output, "🧠", "Project Summary");

    for (key, body) in split_sections(&report.summary) {
        let _ = writeln!(output, "  {}", bright(section_title(&key)));
        for line in body.lines() {
            let _ = writeln!(output, "    {line}");
        }
        output.push('\n');
    }
}

fn render_similarity(output: &mut String, report: &AnalysisReport) {
    add_section_header(output, "🔎", "Similarity Checks");

    if report.plagiarism_results.is_empty() {
        let _ = writeln!(output, "  {}\n", dim("No files were checked."));
        return;
    }

    let mut table = create_table();
    table.set_header(cyan_header(&["File", "Verdict"]));
    for result in &report.plagiarism_results {
        table.add_row(vec![
            Cell::new(&result.file).fg(TableColor::Cyan),
            Cell::new(result.result.trim()),
        ]);
    }
    let _ = writeln!(output, "{table}\n");
}

pub(super) fn render_summary(report: &AnalysisReport) -> String {
    let mut output = String::new();

    render_overview(&mut output, report);
    render_languages(&mut output, report);
    render_contributors(&mut output, report);
    render_commits(&mut output, report);
    render_activity(&mut output, report);
    render_narrative(&mut output, report);
    render_similarity(&mut output, report);

    output
}

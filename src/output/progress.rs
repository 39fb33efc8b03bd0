use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::Duration;

use super::styling::{bright, bright_green, bright_red, bright_yellow};

/// Pending and finished labels of each analysis phase.
const PHASES: [(&str, &str); 4] = [
    (
        "Fetching metadata and cloning repository",
        "Fetched metadata and cloned repository",
    ),
    ("Surveying source tree", "Surveyed source tree"),
    ("Generating project summary", "Generated project summary"),
    ("Checking file similarity", "Checked file similarity"),
];

/// Spinner per analysis phase on stderr.
///
/// A hidden tracker keeps the same state but draws nothing.
pub struct PhaseProgress {
    pb: ProgressBar,
    phase: usize,
    visible: bool,
}

impl PhaseProgress {
    pub fn start(visible: bool) -> Self {
        if visible {
            eprintln!("{}  {}", bright("⚙️"), bright("Phases").underlined());
        }
        Self {
            pb: create_spinner(visible, pending_message(0)),
            phase: 0,
            visible,
        }
    }

    /// Marks the current phase done and starts the next one.
    pub fn advance(&mut self) {
        self.pb.finish_with_message(done_message(self.phase));
        self.phase += 1;
        self.pb = create_spinner(self.visible, pending_message(self.phase));
    }

    pub fn finish(self) {
        self.pb.finish_with_message(done_message(self.phase));
        if self.visible {
            eprintln!();
        }
    }

    pub fn fail(self, reason: &str) {
        self.pb.abandon_with_message(
            bright_red(format!(
                "Phase {}/{}: {} failed: {reason}",
                self.phase + 1,
                PHASES.len(),
                phase_label(self.phase).0
            ))
            .to_string(),
        );
        if self.visible {
            eprintln!();
        }
    }
}

fn phase_label(phase: usize) -> (&'static str, &'static str) {
    PHASES.get(phase).copied().unwrap_or(("Finishing", "Finished"))
}

fn pending_message(phase: usize) -> String {
    bright_yellow(format!(
        "Phase {}/{}: {}",
        phase + 1,
        PHASES.len(),
        phase_label(phase).0
    ))
    .to_string()
}

fn done_message(phase: usize) -> String {
    bright_green(format!(
        "Phase {}/{}: {} ✓",
        phase + 1,
        PHASES.len(),
        phase_label(phase).1
    ))
    .to_string()
}

fn create_spinner(visible: bool, message: String) -> ProgressBar {
    if !visible {
        let pb = ProgressBar::hidden();
        pb.set_message(message);
        return pb;
    }

    let pb = ProgressBar::new_spinner();
    pb.set_draw_target(ProgressDrawTarget::stderr());
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("  {msg} {spinner}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hidden_progress_walks_all_phases() {
        let mut progress = PhaseProgress::start(false);
        assert!(progress.pb.is_hidden());

        for _ in 1..PHASES.len() {
            progress.advance();
        }

        assert_eq!(progress.phase, PHASES.len() - 1);
        assert!(progress.pb.message().contains("Checking file similarity"));
        progress.finish();
    }

    #[test]
    fn test_messages_number_phases() {
        assert!(pending_message(1).contains("Phase 2/4: Surveying source tree"));
        assert!(done_message(3).contains("Phase 4/4: Checked file similarity"));
        assert!(pending_message(7).contains("Finishing"));
    }
}

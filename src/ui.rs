//! Terminal output: spinners while the backend works, colored tables and
//! non-blocking notifications.
//!
//! Uses `indicatif` for the spinner and `console` for styling.

use console::Style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::error::GlasslineError;
use crate::production::{Advance, JobCard, Priority, STAGE_SEQUENCE, Stage};

/// Spinner shown while a backend request is outstanding.
pub struct Busy {
    pb: ProgressBar,
}

impl Busy {
    pub fn start(message: &str) -> Self {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
            pb.set_style(style);
        }
        pb.set_message(message.to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        Self { pb }
    }

    pub fn finish(self) {
        self.pb.finish_and_clear();
    }
}

/// Styled console output for one operator session.
pub struct Console {
    green: Style,
    red: Style,
    yellow: Style,
    dim: Style,
    bold: Style,
}

impl Default for Console {
    fn default() -> Self {
        Self {
            green: Style::new().green().bold(),
            red: Style::new().red().bold(),
            yellow: Style::new().yellow(),
            dim: Style::new().dim(),
            bold: Style::new().bold(),
        }
    }
}

impl Console {
    fn priority_style(&self, priority: Priority) -> &Style {
        match priority {
            Priority::Normal => &self.dim,
            Priority::High => &self.yellow,
            Priority::Urgent => &self.red,
        }
    }

    fn stage_style(&self, stage: Stage) -> &Style {
        if stage.is_terminal() {
            &self.green
        } else {
            &self.bold
        }
    }

    pub fn job_cards(&self, cards: &[JobCard], filter_label: &str) {
        println!(
            "{} {}",
            self.bold.apply_to("Job cards"),
            self.dim.apply_to(format!("({filter_label}, {})", cards.len()))
        );
        if cards.is_empty() {
            println!("  {}", self.dim.apply_to("no job cards"));
            return;
        }
        println!(
            "  {:>6}  {:<16} {:<12} {:<22} {:>5}  {:<14} {:<8} {}",
            "ID", "JOB CARD", "GLASS", "SIZE", "QTY", "STAGE", "PRIORITY", "CREATED"
        );
        for card in cards {
            println!(
                "  {:>6}  {:<16} {:<12} {:<22} {:>5}  {:<14} {:<8} {}",
                card.id,
                card.job_card_number,
                card.glass_type,
                card.size_label(),
                card.quantity,
                self.stage_style(card.current_stage)
                    .apply_to(card.current_stage.as_str().to_uppercase()),
                self.priority_style(card.priority)
                    .apply_to(card.priority.label()),
                card.created_label(),
            );
        }
    }

    /// Per-stage tallies, in pipeline order.
    pub fn stage_counts(&self, counts: &[(Stage, usize)]) {
        let line = counts
            .iter()
            .map(|(stage, n)| format!("{}: {n}", stage.label()))
            .collect::<Vec<_>>()
            .join("  ");
        println!("  {}", self.dim.apply_to(line));
    }

    pub fn pipeline(&self) {
        let names = STAGE_SEQUENCE
            .iter()
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join(" → ");
        println!("{names}");
    }

    pub fn advance(&self, outcome: &Advance) {
        match outcome {
            Advance::Moved(card) => self.success(&format!(
                "{} moved to {}",
                card.job_card_number,
                card.current_stage.label()
            )),
            Advance::Terminal => println!(
                "  {} Job card is already dispatched; no further stage",
                self.yellow.apply_to("!")
            ),
            Advance::InFlight => println!(
                "  {} A stage change for this job card is still in progress",
                self.yellow.apply_to("↻")
            ),
        }
    }

    pub fn notice(&self, message: &str) {
        println!("  {} {message}", self.yellow.apply_to("!"));
    }

    pub fn success(&self, message: &str) {
        println!("  {} {message}", self.green.apply_to("✓"));
    }

    /// Non-blocking error notification on stderr.
    pub fn error(&self, err: &GlasslineError) {
        eprintln!(
            "  {} {} {err}",
            self.red.apply_to("✗"),
            self.dim.apply_to(format!("[{}]", err.kind()))
        );
    }
}

//! Streams a turn to the terminal as it arrives

use crate::output::console::ConsoleFormatter;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use parley_application::TurnProgressNotifier;
use parley_domain::{ArticleCard, ErrorInfo, Role};
use std::io::Write;
use std::sync::Mutex;
use std::time::Duration;

/// Prints deltas to stdout, with a spinner until the first one arrives
pub struct TurnReporter {
    show_spinner: bool,
    spinner: Mutex<Option<ProgressBar>>,
}

impl TurnReporter {
    pub fn new(show_spinner: bool) -> Self {
        Self {
            show_spinner,
            spinner: Mutex::new(None),
        }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn clear_spinner(&self) {
        if let Some(pb) = self.spinner.lock().unwrap_or_else(|e| e.into_inner()).take() {
            pb.finish_and_clear();
        }
    }

    fn print(text: &str) {
        let mut stdout = std::io::stdout().lock();
        let _ = stdout.write_all(text.as_bytes());
        let _ = stdout.flush();
    }
}

impl TurnProgressNotifier for TurnReporter {
    fn on_turn_start(&self, _message_id: &str) {
        Self::print(&format!("{}\n", ConsoleFormatter::role_label(Role::Assistant)));
        if !self.show_spinner {
            return;
        }
        let pb = ProgressBar::new_spinner();
        pb.set_style(Self::spinner_style());
        pb.set_message("Thinking...");
        pb.enable_steady_tick(Duration::from_millis(100));
        *self.spinner.lock().unwrap_or_else(|e| e.into_inner()) = Some(pb);
    }

    fn on_chunk(&self, delta: &str, _cumulative: &str) {
        self.clear_spinner();
        Self::print(delta);
    }

    fn on_card(&self, card: &ArticleCard) {
        self.clear_spinner();
        Self::print(&format!("\n{}", ConsoleFormatter::card(card)));
    }

    fn on_turn_complete(&self, _text: &str) {
        self.clear_spinner();
        Self::print("\n\n");
    }

    fn on_turn_error(&self, error: &ErrorInfo) {
        self.clear_spinner();
        Self::print("\n");
        eprint!("{}", ConsoleFormatter::error(error));
        println!();
    }

    fn on_turn_cancelled(&self) {
        self.clear_spinner();
        Self::print(&format!("\n{}\n\n", "(stopped)".yellow()));
    }
}

impl Drop for TurnReporter {
    fn drop(&mut self) {
        self.clear_spinner();
    }
}

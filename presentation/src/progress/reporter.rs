//! Progress reporting for MedBot requests

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use medbot_application::ProgressNotifier;
use std::sync::Mutex;
use std::time::Duration;

const TICK: Duration = Duration::from_millis(100);

fn spinner_style() -> ProgressStyle {
    ProgressStyle::default_spinner()
        .template("{spinner:.green} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

/// A ticking spinner showing `message`, drawn to stderr.
pub fn waiting_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(spinner_style());
    pb.set_message(message.to_string());
    pb.enable_steady_tick(TICK);
    pb
}

/// Reports progress with an animated spinner per request
pub struct ProgressReporter {
    spinner: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            spinner: Mutex::new(None),
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressNotifier for ProgressReporter {
    fn on_request_start(&self, label: &str) {
        let pb = waiting_spinner(&format!("{label}..."));
        let mut spinner = self.spinner.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(previous) = spinner.replace(pb) {
            previous.finish_and_clear();
        }
    }

    fn on_request_end(&self, label: &str, success: bool) {
        let taken = self
            .spinner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        if let Some(pb) = taken {
            if success {
                pb.finish_with_message(format!("{} {}", "v".green(), label));
            } else {
                pb.finish_with_message(format!("{} {}", "x".red(), label));
            }
        }
    }
}

/// Simple text-based progress (no fancy UI)
pub struct SimpleProgress;

impl ProgressNotifier for SimpleProgress {
    fn on_request_start(&self, label: &str) {
        eprintln!("{} {}...", "->".cyan(), label.bold());
    }

    fn on_request_end(&self, label: &str, success: bool) {
        if success {
            eprintln!("  {} {}", "v".green(), label);
        } else {
            eprintln!("  {} {} (failed)", "x".red(), label);
        }
    }
}

//! Progress reporting utilities

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Progress reporter for a comparison run.
///
/// A spinner covers single-query steps (row counts, schema listing); a bar
/// covers the per-column distinct and value checks. Both draw to stderr and
/// stay hidden when stderr is not a terminal.
#[derive(Debug)]
pub struct ProgressReporter {
    pub step_pb: Option<ProgressBar>,
    pub columns_pb: Option<ProgressBar>,
    show_progress: bool,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            step_pb: None,
            columns_pb: None,
            show_progress: true,
        }
    }

    /// Create minimal progress reporter (no progress bars)
    pub fn new_minimal() -> Self {
        Self {
            step_pb: None,
            columns_pb: None,
            show_progress: false,
        }
    }

    /// Show a spinner for a single step, replacing any previous one
    pub fn start_step(&mut self, message: &str) {
        self.finish_step();
        if self.show_progress {
            self.step_pb = Some(create_spinner(message));
        }
    }

    pub fn finish_step(&mut self) {
        if let Some(pb) = self.step_pb.take() {
            pb.finish_and_clear();
        }
    }

    /// Start a bar over `total` columns
    pub fn start_columns(&mut self, total: u64, message: &str) {
        self.finish_step();
        self.finish_columns();
        if self.show_progress {
            self.columns_pb = Some(create_progress_bar(total, message));
        }
    }

    /// Note the column currently being queried
    pub fn on_column(&self, column: &str) {
        if let Some(pb) = &self.columns_pb {
            pb.set_message(column.to_string());
        }
    }

    pub fn column_done(&self) {
        if let Some(pb) = &self.columns_pb {
            pb.inc(1);
        }
    }

    pub fn finish_columns(&mut self) {
        if let Some(pb) = self.columns_pb.take() {
            pb.finish_and_clear();
        }
    }

    /// Run `f` with any visible bar hidden, so report lines print cleanly
    pub fn suspend<F: FnOnce() -> R, R>(&self, f: F) -> R {
        match self.columns_pb.as_ref().or(self.step_pb.as_ref()) {
            Some(pb) => pb.suspend(f),
            None => f(),
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ProgressReporter {
    fn drop(&mut self) {
        self.finish_step();
        self.finish_columns();
    }
}

fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

fn create_progress_bar(total: u64, prefix: &str) -> ProgressBar {
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos:>4}/{len:4} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    pb.set_prefix(prefix.to_string());
    pb
}

//! Colored console progress and end-of-batch summary.
use std::fmt::Display;
use std::io::Write;
use std::time::Instant;

use colored::Colorize;
use spireflat_game::{BatchOutcome, FlattenError, ProgressReporter};

/// Colored console progress for a batch, written to `out`.
pub struct ConsoleReporter<W: Write> {
    out: W,
    verbose: bool,
    started_at: Option<Instant>,
}

impl<W: Write> ConsoleReporter<W> {
    pub const fn new(out: W, verbose: bool) -> Self {
        Self {
            out,
            verbose,
            started_at: None,
        }
    }

    fn emit(&mut self, line: impl Display) {
        if let Err(err) = writeln!(self.out, "{line}") {
            log::debug!("console write failed: {err}");
        }
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ProgressReporter for ConsoleReporter<W> {
    fn started(&mut self, total: usize) {
        self.started_at = Some(Instant::now());
        self.emit(format!("📂 Flattening {total} runs").bright_yellow().bold());
        self.emit("-".repeat(30).yellow());
    }

    fn progressed(&mut self, index: usize, total: usize) {
        self.emit(format!("⏳ Processed run {index} of {total}"));
    }

    fn run_failed(&mut self, index: usize, error: &FlattenError) {
        if self.verbose {
            self.emit(format!("❌ run {index}: {error}").red());
        }
    }

    fn finished(&mut self, outcome: &BatchOutcome) {
        let elapsed = self.started_at.map(|t| t.elapsed()).unwrap_or_default();
        self.emit("");
        self.emit("📊 Flatten Summary".bright_cyan().bold());
        self.emit("==================".cyan());
        self.emit(format!("Runs processed: {}", outcome.runs_processed));
        self.emit(format!(
            "Succeeded: {}",
            outcome.runs_succeeded().to_string().green()
        ));
        self.emit(format!(
            "Failed: {}",
            outcome.failures.len().to_string().red()
        ));
        self.emit(format!("Floor records: {}", outcome.records.len()));
        self.emit(format!("Total time: {elapsed:?}"));
        if !self.verbose && !outcome.failures.is_empty() {
            self.emit("   (re-run with --verbose to list failed runs)".dimmed());
        }
    }
}

//! Batch driver over a collection of raw run envelopes.
use serde_json::Value;

use crate::error::FlattenError;
use crate::flatten::RunFlattener;
use crate::floor::FloorRecord;

/// Hooks the batch driver calls while it works. Front ends decide how (and
/// whether) to show them.
pub trait ProgressReporter {
    fn started(&mut self, total: usize);

    /// Called after run `index` was attempted, every `every` runs.
    fn progressed(&mut self, index: usize, total: usize);

    fn run_failed(&mut self, index: usize, error: &FlattenError);

    fn finished(&mut self, outcome: &BatchOutcome);
}

/// Reporter that ignores every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullReporter;

impl ProgressReporter for NullReporter {
    fn started(&mut self, _total: usize) {}

    fn progressed(&mut self, _index: usize, _total: usize) {}

    fn run_failed(&mut self, _index: usize, _error: &FlattenError) {}

    fn finished(&mut self, _outcome: &BatchOutcome) {}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunFailure {
    /// Position of the run in the input collection.
    pub index: usize,
    pub message: String,
}

#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    /// Records of every successful run, in input order.
    pub records: Vec<FloorRecord>,
    pub failures: Vec<RunFailure>,
    pub runs_processed: usize,
}

impl BatchOutcome {
    #[must_use]
    pub fn runs_succeeded(&self) -> usize {
        self.runs_processed - self.failures.len()
    }
}

/// Flatten every run, isolating failures. A failed run is reported, recorded
/// in [`BatchOutcome::failures`], and contributes no records.
///
/// Progress fires after run `i` whenever `every > 0` and `i % every == 0`,
/// whatever the run's outcome.
pub fn flatten_batch(
    runs: &[Value],
    flattener: &RunFlattener,
    reporter: &mut dyn ProgressReporter,
    every: usize,
) -> BatchOutcome {
    let total = runs.len();
    reporter.started(total);

    let mut outcome = BatchOutcome::default();
    for (index, raw) in runs.iter().enumerate() {
        match flattener.flatten_value(raw) {
            Ok(mut floors) => outcome.records.append(&mut floors),
            Err(error) => {
                log::warn!("run {index} skipped: {error}");
                reporter.run_failed(index, &error);
                outcome.failures.push(RunFailure {
                    index,
                    message: error.to_string(),
                });
            }
        }
        outcome.runs_processed += 1;
        if every > 0 && index % every == 0 {
            reporter.progressed(index, total);
        }
    }

    log::info!(
        "flattened {} runs into {} floor records ({} failed)",
        outcome.runs_processed,
        outcome.records.len(),
        outcome.failures.len()
    );
    reporter.finished(&outcome);
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Default)]
    struct Recorder {
        started: Option<usize>,
        progressed: Vec<usize>,
        failed: Vec<usize>,
        finished_records: Option<usize>,
    }

    impl ProgressReporter for Recorder {
        fn started(&mut self, total: usize) {
            self.started = Some(total);
        }

        fn progressed(&mut self, index: usize, _total: usize) {
            self.progressed.push(index);
        }

        fn run_failed(&mut self, index: usize, _error: &FlattenError) {
            self.failed.push(index);
        }

        fn finished(&mut self, outcome: &BatchOutcome) {
            self.finished_records = Some(outcome.records.len());
        }
    }

    fn run(id: i64, character: &str, floor_reached: u32) -> Value {
        json!({"event": {
            "seed_source_timestamp": id,
            "floor_reached": floor_reached,
            "character_chosen": character
        }})
    }

    #[test]
    fn failed_runs_are_isolated_and_reported() {
        let runs = vec![
            run(1, "IRONCLAD", 2),
            run(2, "HERMIT", 5),
            run(3, "WATCHER", 1),
            json!({"not_an_event": true}),
        ];
        let mut reporter = Recorder::default();
        let outcome = flatten_batch(&runs, &RunFlattener::default(), &mut reporter, 0);

        assert_eq!(outcome.runs_processed, 4);
        assert_eq!(outcome.runs_succeeded(), 2);
        assert_eq!(outcome.records.len(), 5);
        assert!(outcome.records.iter().all(|r| r.labels.run_id != 2));
        assert_eq!(
            outcome.failures.iter().map(|f| f.index).collect::<Vec<_>>(),
            [1, 3]
        );
        assert!(outcome.failures[0].message.contains("HERMIT"));
        assert_eq!(reporter.failed, [1, 3]);
        assert_eq!(reporter.started, Some(4));
        assert_eq!(reporter.finished_records, Some(5));
        assert!(reporter.progressed.is_empty());
    }

    #[test]
    fn progress_fires_on_multiples_including_failures() {
        let runs: Vec<Value> = (0..7)
            .map(|i| if i == 3 { run(i, "NOBODY", 0) } else { run(i, "DEFECT", 0) })
            .collect();
        let mut reporter = Recorder::default();
        let outcome = flatten_batch(&runs, &RunFlattener::default(), &mut reporter, 3);
        assert_eq!(reporter.progressed, [0, 3, 6]);
        assert_eq!(outcome.records.len(), 6);
    }

    #[test]
    fn empty_batch_produces_nothing() {
        let outcome = flatten_batch(&[], &RunFlattener::default(), &mut NullReporter, 10);
        assert_eq!(outcome.runs_processed, 0);
        assert!(outcome.records.is_empty());
        assert!(outcome.failures.is_empty());
    }
}

//! Run outcomes
//!
//! Non-fatal problems never abort a run. They are collected here so callers can inspect
//! exactly what was skipped without scraping console output.

use std::fmt;
use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};

/// Which tier of the pipeline a failure happened in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureTier {
    /// Listing a whole resource kind failed
    Kind,
    /// One instance could not be transformed or written
    Instance,
    /// One container's log could not be captured
    Container,
}

impl fmt::Display for FailureTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FailureTier::Kind => "kind",
            FailureTier::Instance => "instance",
            FailureTier::Container => "container",
        };
        write!(f, "{}", s)
    }
}

/// A single non-fatal failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub tier: FailureTier,
    /// Kind identifier, file path, or `namespace/pod/container`
    pub subject: String,
    pub reason: String,
}

impl Failure {
    pub fn new(tier: FailureTier, subject: impl Into<String>, reason: impl fmt::Display) -> Self {
        Self {
            tier,
            subject: subject.into(),
            reason: reason.to_string(),
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.tier, self.subject, self.reason)
    }
}

/// Result of processing one instance or one container log
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    Written(PathBuf),
    Skipped(Failure),
}

impl ItemOutcome {
    pub fn is_written(&self) -> bool {
        matches!(self, ItemOutcome::Written(_))
    }
}

/// Final report of a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunResult {
    /// Instance YAML files written
    pub files_written: i64,
    /// Container log files written
    pub log_files_written: i64,
    /// Resource kinds whose processing finished (including ones that failed to list)
    pub kinds_processed: usize,
    /// All non-fatal failures, in the order they were recorded
    pub failures: Vec<Failure>,
    /// The run was interrupted before every kind was processed
    pub cancelled: bool,
}

impl RunResult {
    pub fn failures_in(&self, tier: FailureTier) -> impl Iterator<Item = &Failure> {
        self.failures.iter().filter(move |f| f.tier == tier)
    }
}

/// Run-wide accumulator shared by concurrent workers
#[derive(Debug, Default)]
pub(crate) struct RunAccumulator {
    files_written: AtomicI64,
    log_files_written: AtomicI64,
    kinds_processed: AtomicUsize,
    failures: Mutex<Vec<Failure>>,
}

impl RunAccumulator {
    pub(crate) fn record_instance(&self, outcome: ItemOutcome) {
        match outcome {
            ItemOutcome::Written(_) => {
                self.files_written.fetch_add(1, Ordering::Relaxed);
            }
            ItemOutcome::Skipped(failure) => self.record_failure(failure),
        }
    }

    pub(crate) fn record_log(&self, outcome: ItemOutcome) {
        match outcome {
            ItemOutcome::Written(_) => {
                self.log_files_written.fetch_add(1, Ordering::Relaxed);
            }
            ItemOutcome::Skipped(failure) => self.record_failure(failure),
        }
    }

    pub(crate) fn record_failure(&self, failure: Failure) {
        tracing::warn!(tier = %failure.tier, subject = %failure.subject, "{}", failure.reason);
        // Poisoning cannot leave a half-pushed record behind
        let mut failures = self
            .failures
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        failures.push(failure);
    }

    pub(crate) fn kind_done(&self) {
        self.kinds_processed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn finish(self, cancelled: bool) -> RunResult {
        RunResult {
            files_written: self.files_written.into_inner(),
            log_files_written: self.log_files_written.into_inner(),
            kinds_processed: self.kinds_processed.into_inner(),
            failures: self
                .failures
                .into_inner()
                .unwrap_or_else(|poisoned| poisoned.into_inner()),
            cancelled,
        }
    }
}

//! Mapping from evaluation failures to the driver-facing score.
//!
//! All four failure categories share one sentinel score. The driver only
//! needs to tell "could not evaluate" apart from genuine scores; the message
//! says which stage went wrong.

use serde::{Deserialize, Serialize};

use crate::context::OracleContext;
use crate::error::OracleResult;
use crate::evaluation::{CompiledArtifact, Evaluation};
use crate::obs;
use crate::report::OutcomeReport;

/// Score reported for every candidate that could not be evaluated.
pub const SENTINEL_SCORE: i64 = -30_000_005;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum FailureCategory {
    CompileFailed,
    CompileTimedOut,
    RunFailed,
    RunTimedOut,
}

impl FailureCategory {
    pub fn name(&self) -> &'static str {
        match self {
            FailureCategory::CompileFailed => "compile_failed",
            FailureCategory::CompileTimedOut => "compile_timed_out",
            FailureCategory::RunFailed => "run_failed",
            FailureCategory::RunTimedOut => "run_timed_out",
        }
    }

    /// Message shown in the driver UI.
    pub fn message(&self) -> &'static str {
        match self {
            FailureCategory::CompileFailed => "Failed to compile program",
            FailureCategory::CompileTimedOut => "Timed out compiling",
            FailureCategory::RunFailed => "Compiled program failed to run",
            FailureCategory::RunTimedOut => "Time out running",
        }
    }

    pub fn report(&self) -> OutcomeReport {
        OutcomeReport::score(self.message(), SENTINEL_SCORE)
    }
}

impl std::fmt::Display for FailureCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// An evaluation reduced to what decides the report.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Verdict<'a> {
    Clean(&'a CompiledArtifact),
    Failed(FailureCategory),
}

pub fn classify(evaluation: &Evaluation) -> Verdict<'_> {
    match evaluation {
        Evaluation::Success(artifact) => Verdict::Clean(artifact),
        Evaluation::CompileFailed(_) => Verdict::Failed(FailureCategory::CompileFailed),
        Evaluation::CompileTimedOut(_) => Verdict::Failed(FailureCategory::CompileTimedOut),
        Evaluation::RunFailed(_) => Verdict::Failed(FailureCategory::RunFailed),
        Evaluation::RunTimedOut(_) => Verdict::Failed(FailureCategory::RunTimedOut),
    }
}

impl Evaluation {
    pub fn category(&self) -> Option<FailureCategory> {
        match classify(self) {
            Verdict::Clean(_) => None,
            Verdict::Failed(category) => Some(category),
        }
    }
}

/// The report for an evaluation: `on_clean` decides what a clean run is
/// worth, failures get the sentinel.
pub fn report_for<F>(evaluation: &Evaluation, on_clean: F) -> OutcomeReport
where
    F: FnOnce(&CompiledArtifact) -> OutcomeReport,
{
    match classify(evaluation) {
        Verdict::Clean(artifact) => on_clean(artifact),
        Verdict::Failed(category) => {
            obs::emit_verdict(category.name(), SENTINEL_SCORE);
            category.report()
        }
    }
}

impl OracleContext {
    /// Finish the process from a pipeline result.
    ///
    /// Candidate failures are reported with the sentinel score, a clean run
    /// with whatever `on_clean` returns (exit 0 either way). An oracle error
    /// is printed to stderr and exits with 1.
    pub fn settle<F>(self, result: OracleResult<Evaluation>, on_clean: F) -> !
    where
        F: FnOnce(&CompiledArtifact) -> OutcomeReport,
    {
        match result {
            Ok(evaluation) => {
                let report = report_for(&evaluation, on_clean);
                self.report(report)
            }
            Err(e) => self.abort(e),
        }
    }
}

//! Per-process oracle state: configuration, scratch space and the artifact
//! counter.

use std::path::{Path, PathBuf};

use crate::config::OracleConfig;
use crate::error::OracleResult;
use crate::obs;
use crate::report::{self, OutcomeReport};
use crate::scratch::ScratchSpace;

/// Owns everything one oracle run mutates.
///
/// Compile and run go through `&mut self`, so a context is driven by one
/// flow at a time. Dropping the context removes its scratch directory; the
/// terminal methods ([`report`](Self::report), [`abort`](Self::abort)) do so
/// before exiting the process.
#[derive(Debug)]
pub struct OracleContext {
    config: OracleConfig,
    scratch: ScratchSpace,
    artifacts_issued: u64,
}

impl OracleContext {
    pub fn new(config: OracleConfig) -> Self {
        let scratch = ScratchSpace::new(&config.scratch_base);
        Self {
            config,
            scratch,
            artifacts_issued: 0,
        }
    }

    pub fn config(&self) -> &OracleConfig {
        &self.config
    }

    /// The scratch directory, created on first access.
    pub fn scratch_dir(&mut self) -> OracleResult<&Path> {
        self.scratch.dir()
    }

    pub fn scratch(&self) -> &ScratchSpace {
        &self.scratch
    }

    /// Number of artifact paths handed out so far.
    pub fn artifacts_issued(&self) -> u64 {
        self.artifacts_issued
    }

    /// Take the next counter value and return it with `<scratch>/bin<n>`.
    ///
    /// The counter moves even if creating the scratch directory fails.
    pub(crate) fn next_artifact(&mut self) -> OracleResult<(u64, PathBuf)> {
        self.artifacts_issued += 1;
        let ordinal = self.artifacts_issued;
        let path = self.scratch.dir()?.join(format!("bin{ordinal}"));
        Ok((ordinal, path))
    }

    /// Remove the scratch directory now rather than on drop.
    pub fn cleanup(&mut self) -> OracleResult<()> {
        self.scratch.teardown()
    }

    /// Tear down scratch space, emit `report` on stdout and exit with 0.
    pub fn report(mut self, report: OutcomeReport) -> ! {
        self.teardown_before_exit();
        report::terminate(&report)
    }

    pub fn report_score(self, message: impl Into<String>, score: i64) -> ! {
        self.report(OutcomeReport::score(message, score))
    }

    pub fn report_interesting(self, message: impl Into<String>) -> ! {
        self.report(OutcomeReport::interesting(message))
    }

    pub fn report_dead_end(self, message: impl Into<String>, score: i64) -> ! {
        self.report(OutcomeReport::dead_end(message, score))
    }

    /// Oracle-internal failure: print the error chain to stderr, tear down
    /// scratch space and exit with status 1. Nothing is written to stdout.
    pub fn abort(mut self, error: impl Into<anyhow::Error>) -> ! {
        let error = error.into();
        eprintln!("Error: {error:?}");
        self.teardown_before_exit();
        std::process::exit(1)
    }

    fn teardown_before_exit(&mut self) {
        if let Err(e) = self.scratch.teardown() {
            obs::emit_scratch_remove_failed(self.scratch.path(), &e);
        }
    }
}

//! Outcome of compiling and running one candidate.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::process::{ProcessOutput, TimeoutDetail};

/// An executable produced by a successful compile.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompiledArtifact {
    /// `<scratch>/bin<ordinal>`.
    pub path: PathBuf,
    pub compiler: String,
    pub source_file: PathBuf,
    pub flags: Vec<String>,
    /// Counter value this compile consumed; starts at 1.
    pub ordinal: u64,
}

/// Runtime sanitizers whose reports count as a failed run even on exit 0.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Sanitizer {
    /// Clang's UndefinedBehaviorSanitizer.
    ClangUbsan,
    /// GCC's `-fsanitize=undefined`.
    GccUbsan,
}

impl Sanitizer {
    /// Checked in this order against captured stderr.
    pub const ALL: [Sanitizer; 2] = [Sanitizer::ClangUbsan, Sanitizer::GccUbsan];

    /// Literal marker text; matched as a plain substring.
    pub fn marker(&self) -> &'static str {
        match self {
            Sanitizer::ClangUbsan => "UndefinedBehaviorSanitizer",
            Sanitizer::GccUbsan => "runtime error:",
        }
    }

    /// First sanitizer whose marker occurs in `stderr`.
    pub fn detect(stderr: &str) -> Option<Sanitizer> {
        Self::ALL.into_iter().find(|s| stderr.contains(s.marker()))
    }
}

/// A compiler or program that ran to completion but did not succeed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProcessFailure {
    pub argv: Vec<String>,
    pub exit_code: Option<i32>,
    pub signal: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub duration_ms: u64,
    /// Set when the process exited cleanly but reported a sanitizer error.
    pub sanitizer: Option<Sanitizer>,
}

impl ProcessFailure {
    pub fn from_output(argv: Vec<String>, output: ProcessOutput) -> Self {
        Self {
            argv,
            exit_code: output.exit_code,
            signal: output.signal,
            stdout: output.stdout,
            stderr: output.stderr,
            duration_ms: output.duration_ms,
            sanitizer: None,
        }
    }

    pub fn with_sanitizer(mut self, sanitizer: Sanitizer) -> Self {
        self.sanitizer = Some(sanitizer);
        self
    }
}

/// Result of [`crate::OracleContext::compile`] or
/// [`crate::OracleContext::compile_and_run`].
///
/// The four failure variants are verdicts about the candidate. Problems of the
/// oracle itself are [`crate::OracleError`]s instead.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "outcome", content = "detail", rename_all = "snake_case")]
pub enum Evaluation {
    Success(CompiledArtifact),
    CompileFailed(ProcessFailure),
    CompileTimedOut(TimeoutDetail),
    RunFailed(ProcessFailure),
    RunTimedOut(TimeoutDetail),
}

impl Evaluation {
    pub fn is_success(&self) -> bool {
        matches!(self, Evaluation::Success(_))
    }

    pub fn artifact(&self) -> Option<&CompiledArtifact> {
        match self {
            Evaluation::Success(artifact) => Some(artifact),
            _ => None,
        }
    }

    pub fn artifact_path(&self) -> Option<&Path> {
        self.artifact().map(|a| a.path.as_path())
    }
}

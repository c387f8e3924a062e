//! Structured observability hooks for the compile/run lifecycle.
//!
//! Every event carries an `event` field (`scratch.created`, `compile.finished`,
//! ...) so JSON log consumers can filter on it. Failures of the candidate are
//! logged at `info!`; they are expected outcomes, not oracle problems.

use std::path::Path;

use tracing::{debug, info, warn};

/// Span covering one candidate evaluation; events inside it carry
/// `source = <path>`.
pub fn evaluation_span(source_file: &Path) -> tracing::Span {
    tracing::info_span!("scc.evaluate", source = %source_file.display())
}

pub fn emit_scratch_created(path: &Path) {
    debug!(event = "scratch.created", path = %path.display());
}

pub fn emit_scratch_removed(path: &Path) {
    debug!(event = "scratch.removed", path = %path.display());
}

pub fn emit_scratch_remove_failed(path: &Path, error: &dyn std::error::Error) {
    warn!(event = "scratch.remove_failed", path = %path.display(), error = %error);
}

pub fn emit_compile_started(ordinal: u64, argv: &[String]) {
    debug!(event = "compile.started", ordinal = ordinal, argv = ?argv);
}

pub fn emit_compile_finished(ordinal: u64, duration_ms: u64, success: bool) {
    info!(
        event = "compile.finished",
        ordinal = ordinal,
        duration_ms = duration_ms,
        success = success,
    );
}

pub fn emit_run_finished(artifact: &Path, duration_ms: u64, exit_code: Option<i32>) {
    info!(
        event = "run.finished",
        artifact = %artifact.display(),
        duration_ms = duration_ms,
        exit_code = ?exit_code,
    );
}

pub fn emit_timed_out(stage: &str, limit_ms: u64, elapsed_ms: u64) {
    info!(
        event = "process.timed_out",
        stage = stage,
        limit_ms = limit_ms,
        elapsed_ms = elapsed_ms,
    );
}

pub fn emit_sanitizer_violation(artifact: &Path, marker: &str) {
    info!(event = "run.sanitizer_violation", artifact = %artifact.display(), marker = marker);
}

pub fn emit_verdict(category: &str, score: i64) {
    info!(event = "oracle.verdict", category = category, score = score);
}

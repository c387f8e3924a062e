//! Compile stage: candidate source to `<scratch>/bin<n>`.

use std::ffi::OsString;
use std::path::Path;

use crate::context::OracleContext;
use crate::error::OracleResult;
use crate::evaluation::{CompiledArtifact, Evaluation, ProcessFailure};
use crate::obs;
use crate::process::{display_argv, run_bounded, Bounded};

/// `[compiler, source_file, "-o", artifact] + extra_flags`, paths kept as
/// given.
pub fn compile_argv(
    compiler: &str,
    source_file: &Path,
    artifact: &Path,
    extra_flags: &[String],
) -> Vec<OsString> {
    let mut argv = vec![
        OsString::from(compiler),
        source_file.as_os_str().to_os_string(),
        OsString::from("-o"),
        artifact.as_os_str().to_os_string(),
    ];
    argv.extend(extra_flags.iter().map(OsString::from));
    argv
}

impl OracleContext {
    /// Compile `source_file` into a fresh artifact inside the scratch
    /// directory.
    ///
    /// Returns [`Evaluation::Success`] on exit status 0 within the compile
    /// limit, [`Evaluation::CompileTimedOut`] if the compiler had to be
    /// killed, and [`Evaluation::CompileFailed`] otherwise. Each call
    /// consumes a new artifact number, including calls that fail.
    pub async fn compile(
        &mut self,
        compiler: &str,
        source_file: &Path,
        extra_flags: &[String],
    ) -> OracleResult<Evaluation> {
        let (ordinal, artifact_path) = self.next_artifact()?;
        let argv = compile_argv(compiler, source_file, &artifact_path, extra_flags);
        obs::emit_compile_started(ordinal, &display_argv(&argv));

        let output = match run_bounded(&argv, self.config().compile_timeout()).await? {
            Bounded::TimedOut(detail) => {
                obs::emit_timed_out("compile", detail.limit_ms, detail.elapsed_ms);
                return Ok(Evaluation::CompileTimedOut(detail));
            }
            Bounded::Finished(output) => output,
        };

        obs::emit_compile_finished(ordinal, output.duration_ms, output.success());
        if !output.success() {
            return Ok(Evaluation::CompileFailed(ProcessFailure::from_output(
                display_argv(&argv),
                output,
            )));
        }

        Ok(Evaluation::Success(CompiledArtifact {
            path: artifact_path,
            compiler: compiler.to_string(),
            source_file: source_file.to_path_buf(),
            flags: extra_flags.to_vec(),
            ordinal,
        }))
    }
}

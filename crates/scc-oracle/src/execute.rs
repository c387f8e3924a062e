//! Execute stage: compile, then run the artifact under the run limit.

use std::path::Path;

use tracing::Instrument;

use crate::context::OracleContext;
use crate::error::OracleResult;
use crate::evaluation::{CompiledArtifact, Evaluation, ProcessFailure, Sanitizer};
use crate::obs;
use crate::process::{display_argv, run_bounded, Bounded};

impl OracleContext {
    /// Compile `source_file` and run the result with no arguments.
    ///
    /// Compile verdicts are returned unchanged. A run that times out, exits
    /// non-zero, dies from a signal, or exits 0 while printing a sanitizer
    /// marker on stderr is [`Evaluation::RunFailed`] /
    /// [`Evaluation::RunTimedOut`]. A clean run returns
    /// [`Evaluation::Success`] and reports nothing.
    pub async fn compile_and_run(
        &mut self,
        compiler: &str,
        source_file: &Path,
        extra_flags: &[String],
    ) -> OracleResult<Evaluation> {
        let span = obs::evaluation_span(source_file);
        async move {
            match self.compile(compiler, source_file, extra_flags).await? {
                Evaluation::Success(artifact) => self.run_artifact(artifact).await,
                verdict => Ok(verdict),
            }
        }
        .instrument(span)
        .await
    }

    /// Run an artifact produced by [`compile`](Self::compile).
    pub async fn run_artifact(&mut self, artifact: CompiledArtifact) -> OracleResult<Evaluation> {
        let argv = vec![artifact.path.as_os_str().to_os_string()];

        let output = match run_bounded(&argv, self.config().run_timeout()).await? {
            Bounded::TimedOut(detail) => {
                obs::emit_timed_out("run", detail.limit_ms, detail.elapsed_ms);
                return Ok(Evaluation::RunTimedOut(detail));
            }
            Bounded::Finished(output) => output,
        };

        obs::emit_run_finished(&artifact.path, output.duration_ms, output.exit_code);
        if !output.success() {
            return Ok(Evaluation::RunFailed(ProcessFailure::from_output(
                display_argv(&argv),
                output,
            )));
        }

        // Sanitizer runtimes may report and still exit 0.
        if let Some(sanitizer) = Sanitizer::detect(&output.stderr) {
            obs::emit_sanitizer_violation(&artifact.path, sanitizer.marker());
            return Ok(Evaluation::RunFailed(
                ProcessFailure::from_output(display_argv(&argv), output)
                    .with_sanitizer(sanitizer),
            ));
        }

        Ok(Evaluation::Success(artifact))
    }
}

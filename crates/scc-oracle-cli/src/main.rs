//! SCC Oracle - command-line test oracle for the SCC fuzzing driver
//!
//! The driver invokes `scc-oracle ... <candidate>` and reads the `FUZZ:`
//! protocol from stdout.
//!
//! ## Commands
//!
//! - `run`: compile the candidate, run it, score the outcome
//! - `compile`: compile only, score the outcome
//! - `report`: emit a protocol report directly (for shell-script oracles)

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use scc_oracle::config::{
    DEFAULT_SCRATCH_BASE, DEFAULT_TIMEOUT_MS, ENV_COMPILE_TIMEOUT_MS, ENV_RUN_TIMEOUT_MS,
    ENV_SCRATCH_BASE,
};
use scc_oracle::{
    CompiledArtifact, Evaluation, OracleConfig, OracleContext, OracleResult, OutcomeReport,
};
use std::path::{Path, PathBuf};
use tracing::{debug, Level};

#[derive(Parser, Debug)]
#[command(name = "scc-oracle")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Compile/run test oracle for the SCC fuzzer", long_about = None)]
struct Cli {
    /// Enable verbose output (on stderr)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(flatten)]
    settings: Settings,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug)]
struct Settings {
    /// Parent directory for the per-process scratch directory
    #[arg(long, global = true, env = ENV_SCRATCH_BASE, default_value = DEFAULT_SCRATCH_BASE)]
    scratch_base: PathBuf,

    /// Wall-clock limit for the compiler, in milliseconds
    #[arg(long, global = true, env = ENV_COMPILE_TIMEOUT_MS, default_value_t = DEFAULT_TIMEOUT_MS)]
    compile_timeout_ms: u64,

    /// Wall-clock limit for the compiled program, in milliseconds
    #[arg(long, global = true, env = ENV_RUN_TIMEOUT_MS, default_value_t = DEFAULT_TIMEOUT_MS)]
    run_timeout_ms: u64,

    /// Write the evaluation detail as JSON to this file before reporting
    #[arg(long, global = true)]
    dump: Option<PathBuf>,
}

impl Settings {
    fn oracle_config(&self) -> OracleConfig {
        OracleConfig {
            scratch_base: self.scratch_base.clone(),
            compile_timeout_ms: self.compile_timeout_ms,
            run_timeout_ms: self.run_timeout_ms,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compile the candidate and run it
    Run {
        #[command(flatten)]
        target: Target,

        #[command(flatten)]
        clean: CleanOutcome,
    },

    /// Compile the candidate without running it
    Compile {
        #[command(flatten)]
        target: Target,

        #[command(flatten)]
        clean: CleanOutcome,
    },

    /// Emit a report without compiling anything
    Report {
        #[command(subcommand)]
        action: ReportAction,
    },
}

#[derive(Args, Debug)]
struct Target {
    /// Compiler executable
    #[arg(long, env = "CC", default_value = "cc")]
    compiler: String,

    /// Candidate source file
    source: PathBuf,

    /// Extra compiler flags, after `--`
    #[arg(last = true)]
    flags: Vec<String>,
}

#[derive(Args, Debug)]
struct CleanOutcome {
    /// Score reported when the candidate compiles (and runs) cleanly
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    score: i64,

    /// Message reported when the candidate compiles (and runs) cleanly
    #[arg(long)]
    message: Option<String>,

    /// Mark a clean candidate as interesting instead of scoring it
    #[arg(long)]
    interesting: bool,
}

impl CleanOutcome {
    fn report(&self, default_message: &str) -> OutcomeReport {
        let message = self
            .message
            .clone()
            .unwrap_or_else(|| default_message.to_string());
        if self.interesting {
            OutcomeReport::interesting(message)
        } else {
            OutcomeReport::score(message, self.score)
        }
    }
}

#[derive(Subcommand, Debug)]
enum ReportAction {
    /// FUZZ:SCORE + FUZZ:MSG
    Score {
        #[arg(allow_negative_numbers = true)]
        value: i64,
        message: String,
    },

    /// FUZZ:HIT + FUZZ:SCORE:1 + FUZZ:MSG
    Interesting { message: String },

    /// FUZZ:DEAD + FUZZ:SCORE + FUZZ:MSG
    DeadEnd {
        #[arg(allow_negative_numbers = true)]
        value: i64,
        message: String,
    },
}

impl ReportAction {
    fn into_report(self) -> OutcomeReport {
        match self {
            ReportAction::Score { value, message } => OutcomeReport::score(message, value),
            ReportAction::Interesting { message } => OutcomeReport::interesting(message),
            ReportAction::DeadEnd { value, message } => OutcomeReport::dead_end(message, value),
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::WARN
    };
    scc_oracle::init_tracing(cli.json, level);

    let config = cli.settings.oracle_config();
    let mut ctx = OracleContext::new(config.clone());
    if let Err(e) = config.validate() {
        ctx.abort(e);
    }

    match cli.command {
        Commands::Report { action } => ctx.report(action.into_report()),
        Commands::Run { target, clean } => {
            let result = ctx
                .compile_and_run(&target.compiler, &target.source, &target.flags)
                .await;
            finish(ctx, result, cli.settings.dump.as_deref(), |_| {
                clean.report("Program compiled and ran")
            })
        }
        Commands::Compile { target, clean } => {
            let result = ctx
                .compile(&target.compiler, &target.source, &target.flags)
                .await;
            finish(ctx, result, cli.settings.dump.as_deref(), |_| {
                clean.report("Program compiled")
            })
        }
    }
}

fn finish<F>(
    ctx: OracleContext,
    result: OracleResult<Evaluation>,
    dump: Option<&Path>,
    on_clean: F,
) -> !
where
    F: FnOnce(&CompiledArtifact) -> OutcomeReport,
{
    if let (Some(path), Ok(evaluation)) = (dump, &result) {
        if let Err(e) = dump_evaluation(path, evaluation) {
            ctx.abort(e);
        }
    }
    ctx.settle(result, on_clean)
}

fn dump_evaluation(path: &Path, evaluation: &Evaluation) -> Result<()> {
    let json = serde_json::to_string_pretty(evaluation)?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {:?}", path))?;
    debug!(event = "evaluation.dumped", path = %path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_run_with_flags() {
        let cli = Cli::try_parse_from([
            "scc-oracle",
            "run",
            "--compiler",
            "clang",
            "/tmp/gen_source1.c",
            "--",
            "-O2",
            "-fsanitize=undefined",
        ])
        .unwrap();
        match cli.command {
            Commands::Run { target, clean } => {
                assert_eq!(target.compiler, "clang");
                assert_eq!(target.source, PathBuf::from("/tmp/gen_source1.c"));
                assert_eq!(target.flags, vec!["-O2", "-fsanitize=undefined"]);
                assert_eq!(clean.score, 0);
                assert!(!clean.interesting);
            }
            other => panic!("expected Run, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_settings() {
        let cli = Cli::try_parse_from([
            "scc-oracle",
            "--scratch-base",
            "/var/tmp/scc",
            "--run-timeout-ms",
            "500",
            "compile",
            "--compiler",
            "gcc",
            "a.c",
        ])
        .unwrap();
        let config = cli.settings.oracle_config();
        assert_eq!(config.scratch_base, PathBuf::from("/var/tmp/scc"));
        assert_eq!(config.run_timeout_ms, 500);
        assert!(matches!(cli.command, Commands::Compile { .. }));
    }

    #[test]
    fn test_parse_negative_score() {
        let cli =
            Cli::try_parse_from(["scc-oracle", "report", "score", "-30000005", "nope"]).unwrap();
        match cli.command {
            Commands::Report { action } => {
                assert_eq!(action.into_report(), OutcomeReport::score("nope", -30000005));
            }
            other => panic!("expected Report, got {:?}", other),
        }
    }

    #[test]
    fn test_clean_outcome_report() {
        let clean = CleanOutcome {
            score: 5,
            message: None,
            interesting: false,
        };
        assert_eq!(clean.report("ran"), OutcomeReport::score("ran", 5));

        let clean = CleanOutcome {
            score: 5,
            message: Some("wow".to_string()),
            interesting: true,
        };
        assert_eq!(clean.report("ran"), OutcomeReport::interesting("wow"));
    }
}

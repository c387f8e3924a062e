//! SCC Oracle Core
//!
//! Building blocks for test oracles driven by the SCC fuzzer:
//!
//! - [`scratch`]: per-process scratch directory, removed when the oracle finishes
//! - [`compile`] and [`execute`]: bounded compile and run of a candidate
//! - [`classify`]: failure categories and the shared sentinel score
//! - [`report`]: the `FUZZ:` score protocol on stdout
//!
//! A typical oracle:
//!
//! ```no_run
//! use scc_oracle::{OracleConfig, OracleContext, OutcomeReport};
//! use std::path::Path;
//!
//! # async fn oracle() {
//! let mut ctx = OracleContext::new(OracleConfig::default());
//! let result = ctx
//!     .compile_and_run("clang", Path::new("/tmp/gen_source1.c"), &["-O2".to_string()])
//!     .await;
//! ctx.settle(result, |_| OutcomeReport::score("Program ran", 0))
//! # }
//! ```

pub mod classify;
pub mod compile;
pub mod config;
pub mod context;
pub mod error;
pub mod evaluation;
pub mod execute;
pub mod obs;
pub mod process;
pub mod report;
pub mod scratch;
pub mod telemetry;

pub use classify::{classify, report_for, FailureCategory, Verdict, SENTINEL_SCORE};
pub use config::OracleConfig;
pub use context::OracleContext;
pub use error::{OracleError, OracleResult};
pub use evaluation::{CompiledArtifact, Evaluation, ProcessFailure, Sanitizer};
pub use process::{ProcessOutput, TimeoutDetail};
pub use report::{Feedback, OutcomeKind, OutcomeReport};
pub use scratch::ScratchSpace;
pub use telemetry::init_tracing;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

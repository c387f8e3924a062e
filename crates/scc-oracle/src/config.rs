//! Oracle configuration: scratch location and wall-clock limits.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{OracleError, OracleResult};

/// Default parent directory for per-process scratch directories.
pub const DEFAULT_SCRATCH_BASE: &str = "/tmp/scc";

/// Default wall-clock limit for both compiling and running (milliseconds).
pub const DEFAULT_TIMEOUT_MS: u64 = 3_000;

pub const ENV_SCRATCH_BASE: &str = "SCC_SCRATCH_BASE";
pub const ENV_COMPILE_TIMEOUT_MS: &str = "SCC_COMPILE_TIMEOUT_MS";
pub const ENV_RUN_TIMEOUT_MS: &str = "SCC_RUN_TIMEOUT_MS";

/// Configuration for a single oracle process.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OracleConfig {
    /// Directory under which `rundir_<pid>_<suffix>` is created.
    pub scratch_base: PathBuf,
    /// Maximum wall-clock time for the compiler (milliseconds).
    pub compile_timeout_ms: u64,
    /// Maximum wall-clock time for the compiled program (milliseconds).
    pub run_timeout_ms: u64,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            scratch_base: PathBuf::from(DEFAULT_SCRATCH_BASE),
            compile_timeout_ms: DEFAULT_TIMEOUT_MS,
            run_timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl OracleConfig {
    /// Defaults overlaid with `SCC_SCRATCH_BASE`, `SCC_COMPILE_TIMEOUT_MS`
    /// and `SCC_RUN_TIMEOUT_MS` when set.
    pub fn from_env() -> OracleResult<Self> {
        let mut config = Self::default();
        if let Ok(base) = std::env::var(ENV_SCRATCH_BASE) {
            config.scratch_base = PathBuf::from(base);
        }
        if let Some(ms) = read_ms(ENV_COMPILE_TIMEOUT_MS)? {
            config.compile_timeout_ms = ms;
        }
        if let Some(ms) = read_ms(ENV_RUN_TIMEOUT_MS)? {
            config.run_timeout_ms = ms;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> OracleResult<()> {
        if self.scratch_base.as_os_str().is_empty() {
            return Err(OracleError::InvalidConfig(
                "scratch_base must not be empty".to_string(),
            ));
        }
        if self.compile_timeout_ms == 0 {
            return Err(OracleError::InvalidConfig(
                "compile_timeout_ms must be positive".to_string(),
            ));
        }
        if self.run_timeout_ms == 0 {
            return Err(OracleError::InvalidConfig(
                "run_timeout_ms must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn compile_timeout(&self) -> Duration {
        Duration::from_millis(self.compile_timeout_ms)
    }

    pub fn run_timeout(&self) -> Duration {
        Duration::from_millis(self.run_timeout_ms)
    }
}

fn read_ms(var: &str) -> OracleResult<Option<u64>> {
    match std::env::var(var) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|e| OracleError::InvalidConfig(format!("{var}={raw:?}: {e}"))),
        Err(_) => Ok(None),
    }
}

//! Service configuration.

use crate::domain::entities::{MAX_NAME_LENGTH, MAX_RECORDS};
use crate::domain::value_objects::Pubkey;
use std::env;
use thiserror::Error;

/// Program id used when none is configured.
pub const DEFAULT_PROGRAM_ID: Pubkey = Pubkey::new(*b"DiaryProgram11111111111111111111");

/// Default per-transaction execution timeout.
pub const DEFAULT_EXECUTION_TIMEOUT_MS: u64 = 5_000;

/// Configuration errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Variable is set but unparsable.
    #[error("invalid value for {var}: {value:?}")]
    InvalidValue {
        /// Environment variable name.
        var: &'static str,
        /// Raw value that failed to parse.
        value: String,
    },

    /// Parsed values are inconsistent.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Diary service configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Address of the deployed program; owner of every diary and record.
    pub program_id: Pubkey,
    /// Exclusive upper bound on diary name bytes.
    pub max_name_length: usize,
    /// Records a diary may reference.
    pub max_records: usize,
    /// Execution budget in milliseconds, from lock acquisition until the
    /// staged set is ready to commit. Bounds account loading and is checked
    /// before each instruction; an instruction already running is not
    /// interrupted.
    pub execution_timeout_ms: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            program_id: DEFAULT_PROGRAM_ID,
            max_name_length: MAX_NAME_LENGTH,
            max_records: MAX_RECORDS,
            execution_timeout_ms: DEFAULT_EXECUTION_TIMEOUT_MS,
        }
    }
}

impl ServiceConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `DIARY_PROGRAM_ID`: program id, 32 bytes hex (default: built-in id)
    /// - `DIARY_EXECUTION_TIMEOUT_MS`: execution timeout (default: 5000)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Same as `from_env` with an explicit variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(value) = lookup("DIARY_PROGRAM_ID") {
            config.program_id =
                Pubkey::from_hex(value.trim()).ok_or(ConfigError::InvalidValue {
                    var: "DIARY_PROGRAM_ID",
                    value,
                })?;
        }

        if let Some(value) = lookup("DIARY_EXECUTION_TIMEOUT_MS") {
            config.execution_timeout_ms =
                value.trim().parse().map_err(|_| ConfigError::InvalidValue {
                    var: "DIARY_EXECUTION_TIMEOUT_MS",
                    value,
                })?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Checks that limits fit the on-ledger layout.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_name_length == 0 || self.max_name_length > MAX_NAME_LENGTH {
            return Err(ConfigError::Invalid(format!(
                "max_name_length must be in 1..={MAX_NAME_LENGTH}"
            )));
        }
        if self.max_records > MAX_RECORDS {
            return Err(ConfigError::Invalid(format!(
                "max_records must be at most {MAX_RECORDS}"
            )));
        }
        if self.execution_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "execution_timeout_ms must be positive".into(),
            ));
        }
        if self.program_id.is_zero() {
            return Err(ConfigError::Invalid("program_id must be set".into()));
        }
        Ok(())
    }
}

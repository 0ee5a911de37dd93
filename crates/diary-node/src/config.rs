//! Node configuration.

use diary_program::config::{ConfigError, ServiceConfig};
use diary_program::domain::entities::MAX_PERMITTED_DATA_LENGTH;
use std::env;
use thiserror::Error;

/// Node configuration errors.
#[derive(Debug, Error)]
pub enum NodeConfigError {
    /// Service configuration is invalid.
    #[error(transparent)]
    Service(#[from] ConfigError),

    /// Variable is set but unparsable.
    #[error("invalid value for {var}: {value:?}")]
    InvalidValue { var: &'static str, value: String },
}

/// Parameters for the scenario the node replays.
#[derive(Debug, Clone)]
pub struct NodeConfig {
    /// Diary service configuration.
    pub service: ServiceConfig,
    /// Authority keypair seed; a fresh key is generated when unset.
    pub authority_seed: Option<[u8; 32]>,
    /// Lamports credited to the authority at startup.
    pub airdrop_lamports: u64,
    /// Diary id.
    pub diary_id: u32,
    /// Diary name.
    pub diary_name: String,
    /// Text of the record that is added and removed.
    pub record_text: String,
    /// Bytes allocated for the record account.
    pub record_space: usize,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            service: ServiceConfig::default(),
            authority_seed: None,
            airdrop_lamports: 100_000_000_000,
            diary_id: 1,
            diary_name: "My diary 1".to_string(),
            record_text: "dasdasdasdas".to_string(),
            record_space: 1_024,
        }
    }
}

impl NodeConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `DIARY_PROGRAM_ID`, `DIARY_EXECUTION_TIMEOUT_MS`: see `ServiceConfig`
    /// - `DIARY_NODE_AUTHORITY_SEED`: 32-byte hex seed (default: random)
    /// - `DIARY_NODE_AIRDROP_LAMPORTS` (default: 100 000 000 000)
    /// - `DIARY_NODE_DIARY_ID` (default: 1)
    /// - `DIARY_NODE_DIARY_NAME` (default: "My diary 1")
    /// - `DIARY_NODE_RECORD_TEXT` (default: "dasdasdasdas")
    /// - `DIARY_NODE_RECORD_SPACE` (default: 1024)
    pub fn from_env() -> Result<Self, NodeConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Same as `from_env` with an explicit variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, NodeConfigError> {
        let defaults = Self::default();
        let service = ServiceConfig::from_lookup(&lookup)?;

        let authority_seed = match lookup("DIARY_NODE_AUTHORITY_SEED") {
            Some(value) => Some(parse_seed(&value).ok_or(NodeConfigError::InvalidValue {
                var: "DIARY_NODE_AUTHORITY_SEED",
                value,
            })?),
            None => None,
        };

        let record_space = parse_or(&lookup, "DIARY_NODE_RECORD_SPACE", defaults.record_space)?;
        if record_space > MAX_PERMITTED_DATA_LENGTH {
            return Err(NodeConfigError::InvalidValue {
                var: "DIARY_NODE_RECORD_SPACE",
                value: record_space.to_string(),
            });
        }

        Ok(Self {
            service,
            authority_seed,
            airdrop_lamports: parse_or(
                &lookup,
                "DIARY_NODE_AIRDROP_LAMPORTS",
                defaults.airdrop_lamports,
            )?,
            diary_id: parse_or(&lookup, "DIARY_NODE_DIARY_ID", defaults.diary_id)?,
            diary_name: lookup("DIARY_NODE_DIARY_NAME").unwrap_or(defaults.diary_name),
            record_text: lookup("DIARY_NODE_RECORD_TEXT").unwrap_or(defaults.record_text),
            record_space,
        })
    }
}

fn parse_seed(value: &str) -> Option<[u8; 32]> {
    let bytes = hex::decode(value.trim().trim_start_matches("0x")).ok()?;
    bytes.try_into().ok()
}

fn parse_or<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: T,
) -> Result<T, NodeConfigError> {
    match lookup(var) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| NodeConfigError::InvalidValue { var, value }),
        None => Ok(default),
    }
}

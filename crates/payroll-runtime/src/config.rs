//! # Runtime Configuration
//!
//! Configuration loaded from the environment. The contract address is the
//! one setting with no sane default: without it the runtime fails fast at
//! startup instead of limping along unconfigured.

use cp_04_readiness_coordinator::CoordinatorConfig;
use shared_types::Address;
use thiserror::Error;

/// Environment variable naming the payroll contract address.
pub const CONTRACT_ADDRESS_VAR: &str = "PAYROLL_CONTRACT_ADDRESS";

/// Environment variable overriding the coordinator soft timeout.
pub const SLOW_WARNING_VAR: &str = "PAYROLL_SLOW_WARNING_MS";

/// Environment variable for the log filter (falls back to `RUST_LOG`).
pub const LOG_FILTER_VAR: &str = "PAYROLL_LOG";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The contract address variable is not set.
    #[error("{CONTRACT_ADDRESS_VAR} is not set; refusing to start unconfigured")]
    MissingContractAddress,

    /// The contract address variable is set but unparseable.
    #[error("{CONTRACT_ADDRESS_VAR} is invalid: {0}")]
    InvalidContractAddress(String),

    /// A numeric override is unparseable.
    #[error("{0} is not a number")]
    InvalidNumber(&'static str),
}

/// Complete runtime configuration.
#[derive(Clone, Debug)]
pub struct AppConfig {
    /// The payroll contract the client targets.
    pub contract_address: Address,
    /// Readiness coordinator configuration.
    pub coordinator: CoordinatorConfig,
}

impl AppConfig {
    /// Load configuration from the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let raw = std::env::var(CONTRACT_ADDRESS_VAR)
            .map_err(|_| ConfigError::MissingContractAddress)?;
        let contract_address =
            Address::parse(&raw).map_err(|e| ConfigError::InvalidContractAddress(e.to_string()))?;

        let mut coordinator = CoordinatorConfig::default();
        if let Ok(ms) = std::env::var(SLOW_WARNING_VAR) {
            coordinator.slow_warning_ms = ms
                .parse()
                .map_err(|_| ConfigError::InvalidNumber(SLOW_WARNING_VAR))?;
        }

        Ok(Self {
            contract_address,
            coordinator,
        })
    }

    /// Create a config for testing.
    #[must_use]
    pub fn for_testing(contract_address: Address) -> Self {
        Self {
            contract_address,
            coordinator: CoordinatorConfig::for_testing(),
        }
    }
}

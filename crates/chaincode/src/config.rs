//! Chaincode configuration, loaded from the environment.

use anyhow::Context;

use supplychain_core::TxTimestamp;
use supplychain_observability::LogFormat;

pub const DEFAULT_NAME: &str = "supplychain";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChaincodeConfig {
    /// `CHAINCODE_NAME`
    pub name: String,
    /// `CHAINCODE_LOG_FORMAT`: `json` or `pretty`.
    pub log_format: LogFormat,
    /// `CHAINCODE_INIT_LEDGER`: run `InitLedger` before serving.
    pub init_ledger: bool,
    /// `CHAINCODE_INIT_TIMESTAMP`: seconds since the epoch used for seeding.
    pub init_timestamp: TxTimestamp,
}

impl Default for ChaincodeConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_NAME.to_string(),
            log_format: LogFormat::default(),
            init_ledger: false,
            init_timestamp: TxTimestamp::new(0, 0),
        }
    }
}

impl ChaincodeConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key lookup; unset keys keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let mut config = Self::default();

        if let Some(name) = lookup("CHAINCODE_NAME") {
            let name = name.trim();
            if name.is_empty() {
                anyhow::bail!("CHAINCODE_NAME must not be empty");
            }
            config.name = name.to_string();
        }

        if let Some(format) = lookup("CHAINCODE_LOG_FORMAT") {
            config.log_format = format.parse().context("invalid CHAINCODE_LOG_FORMAT")?;
        }

        if let Some(flag) = lookup("CHAINCODE_INIT_LEDGER") {
            config.init_ledger = flag
                .trim()
                .parse::<bool>()
                .with_context(|| format!("invalid CHAINCODE_INIT_LEDGER '{flag}'"))?;
        }

        if let Some(seconds) = lookup("CHAINCODE_INIT_TIMESTAMP") {
            let seconds = seconds
                .trim()
                .parse::<i64>()
                .with_context(|| format!("invalid CHAINCODE_INIT_TIMESTAMP '{seconds}'"))?;
            config.init_timestamp = TxTimestamp::new(seconds, 0);
        }

        Ok(config)
    }
}

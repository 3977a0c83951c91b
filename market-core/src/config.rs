//! Configuration for the marketplace ledger

use crate::types::Address;
use serde::{Deserialize, Serialize};

/// Basis points in a whole (100%)
pub const BPS_DENOMINATOR: u16 = 10_000;

/// Marketplace configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Service name
    pub service_name: String,

    /// Service version
    pub service_version: String,

    /// Escrow address the marketplace holds listed assets under
    pub marketplace_address: String,

    /// Operator address entitled to withdraw accrued fees
    pub operator_address: String,

    /// Marketplace fee in basis points (500 = 5%)
    pub fee_bps: u16,

    /// Actor mailbox capacity (bounded channel for backpressure)
    pub mailbox_capacity: usize,

    /// Metrics listen address
    pub metrics_listen_addr: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service_name: "market-core".to_string(),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            marketplace_address: "market:escrow".to_string(),
            operator_address: "market:operator".to_string(),
            fee_bps: 500,
            mailbox_capacity: 1000,
            metrics_listen_addr: "0.0.0.0:9090".to_string(),
        }
    }
}

impl Config {
    /// Load from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| crate::Error::Config(format!("Failed to parse config: {}", e)))?;
        Ok(config)
    }

    /// Load from environment variables
    pub fn from_env() -> crate::Result<Self> {
        let mut config = Config::default();

        if let Ok(addr) = std::env::var("MARKET_ESCROW_ADDR") {
            config.marketplace_address = addr;
        }

        if let Ok(addr) = std::env::var("MARKET_OPERATOR_ADDR") {
            config.operator_address = addr;
        }

        if let Ok(bps) = std::env::var("MARKET_FEE_BPS") {
            config.fee_bps = bps
                .parse()
                .map_err(|_| crate::Error::Config(format!("invalid MARKET_FEE_BPS: {}", bps)))?;
        }

        if let Ok(addr) = std::env::var("MARKET_METRICS_ADDR") {
            config.metrics_listen_addr = addr;
        }

        Ok(config)
    }

    /// Validate invariants the rest of the crate relies on
    pub fn validate(&self) -> crate::Result<()> {
        if self.fee_bps > BPS_DENOMINATOR {
            return Err(crate::Error::Config(format!(
                "fee_bps must be <= {}, got {}",
                BPS_DENOMINATOR, self.fee_bps
            )));
        }

        if self.marketplace_address == self.operator_address {
            return Err(crate::Error::Config(
                "marketplace and operator addresses must differ".to_string(),
            ));
        }

        let null = Address::null();
        if self.marketplace_address == null.as_str() || self.operator_address == null.as_str() {
            return Err(crate::Error::Config(
                "marketplace and operator addresses must not be the null address".to_string(),
            ));
        }

        Ok(())
    }

    /// Marketplace escrow address as an [`Address`]
    pub fn marketplace(&self) -> Address {
        Address::new(self.marketplace_address.clone())
    }

    /// Operator address as an [`Address`]
    pub fn operator(&self) -> Address {
        Address::new(self.operator_address.clone())
    }
}

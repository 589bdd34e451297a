//! Pipeline configuration.
//!
//! The flat Riyadh shipping-cost fallback is an explicit injected value, not
//! an ambient lookup, so the cost computation stays pure and testable.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Environment variable holding the fallback flat Riyadh shipping cost, in
/// the smallest currency unit.
pub const RIYADH_FLAT_COST_ENV: &str = "SALEOPS_RIYADH_FLAT_COST";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpsConfig {
    /// Flat per-order shipping cost applied inside Riyadh when the selected
    /// carrier has none configured. 0 means "not configured"; a zero total
    /// never produces a purchase order.
    pub riyadh_flat_cost_fallback: u64,
}

impl OpsConfig {
    pub fn new(riyadh_flat_cost_fallback: u64) -> Self {
        Self {
            riyadh_flat_cost_fallback,
        }
    }

    /// Read the configuration from the environment. An unset variable yields
    /// the default; a malformed one is an error.
    pub fn from_env() -> Result<Self> {
        match std::env::var(RIYADH_FLAT_COST_ENV) {
            Ok(raw) => {
                let value = raw.trim().parse::<u64>().with_context(|| {
                    format!("invalid {RIYADH_FLAT_COST_ENV} value: {raw:?}")
                })?;
                Ok(Self::new(value))
            }
            Err(std::env::VarError::NotPresent) => Ok(Self::default()),
            Err(e) => Err(e).with_context(|| format!("reading {RIYADH_FLAT_COST_ENV}")),
        }
    }
}

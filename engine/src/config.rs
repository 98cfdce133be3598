//! Engine configuration
//!
//! One serde-loadable structure carries every regulated constant: the taxi
//! tariff, the sales taxes and the courier rate tables. Defaults are the
//! Quebec 2026 values, so an empty JSON object is a complete configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::hash::content_hash;
use crate::core::tax::TaxConstants;
use crate::courier::CourierRates;
use crate::error::{PricingError, PricingResult};
use crate::schedule::TaxiTariff;

/// Complete pricing configuration
///
/// # Example
/// ```
/// use fare_engine_core::config::EngineConfig;
///
/// let config = EngineConfig::from_json_str(r#"{"taxi": {"regulatory_fee": 100}}"#);
/// assert!(config.is_err()); // a partial tariff is rejected, sections are all-or-nothing
///
/// let config = EngineConfig::from_json_str("{}").unwrap();
/// assert_eq!(config.taxi.regulatory_fee, 90);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub taxi: TaxiTariff,
    #[serde(default)]
    pub taxes: TaxConstants,
    #[serde(default)]
    pub courier: CourierRates,
}

impl EngineConfig {
    pub fn from_json_str(json: &str) -> PricingResult<Self> {
        let config: EngineConfig =
            serde_json::from_str(json).map_err(|e| PricingError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> PricingResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| PricingError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_json_str(&json)
    }

    pub fn to_json_pretty(&self) -> PricingResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| PricingError::Serialization(e.to_string()))
    }

    pub fn validate(&self) -> PricingResult<()> {
        self.taxi.validate().map_err(PricingError::Config)?;
        self.taxes.validate().map_err(PricingError::Config)?;
        self.courier.validate().map_err(PricingError::Config)?;
        Ok(())
    }

    /// SHA256 of the canonical JSON form
    pub fn config_hash(&self) -> PricingResult<String> {
        content_hash(self)
    }
}

//! Meter checkpoints
//!
//! A snapshot captures the trip state and event log of a meter together
//! with the hash of the tariff it was recorded under, so a trip survives a
//! process restart without being billed against different rates.
//!
//! # Critical Invariants
//!
//! - **Tariff matching**: a snapshot only restores under the same tariff
//! - **Integrity**: accumulators finite and non-negative, a running meter
//!   always has a start time

use serde::{Deserialize, Serialize};

use crate::core::hash::content_hash;
use crate::error::{PricingError, PricingResult};
use crate::schedule::TaxiTariff;

use super::{MeterEventLog, TaxiMeter, TripMeterState};

/// Serializable meter state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeterSnapshot {
    pub state: TripMeterState,

    #[serde(default)]
    pub events: MeterEventLog,

    /// SHA256 of the tariff in force when the snapshot was taken
    pub tariff_hash: String,
}

impl MeterSnapshot {
    pub fn to_json(&self) -> PricingResult<String> {
        serde_json::to_string(self).map_err(|e| PricingError::Serialization(e.to_string()))
    }

    pub fn from_json(json: &str) -> PricingResult<Self> {
        serde_json::from_str(json).map_err(|e| PricingError::Serialization(e.to_string()))
    }
}

/// Hash identifying a tariff in snapshots
pub fn tariff_hash(tariff: &TaxiTariff) -> PricingResult<String> {
    content_hash(tariff)
}

impl TaxiMeter {
    pub fn snapshot(&self) -> PricingResult<MeterSnapshot> {
        Ok(MeterSnapshot {
            state: self.state.clone(),
            events: self.events.clone(),
            tariff_hash: tariff_hash(&self.tariff)?,
        })
    }

    /// Rebuild a meter from a snapshot
    ///
    /// # Errors
    /// - `ConfigMismatch` if `tariff` differs from the recorded one
    /// - `InvalidInput` if the recorded state is inconsistent
    pub fn restore(tariff: TaxiTariff, snapshot: MeterSnapshot) -> PricingResult<Self> {
        let expected = tariff_hash(&tariff)?;
        if snapshot.tariff_hash != expected {
            return Err(PricingError::ConfigMismatch {
                expected,
                actual: snapshot.tariff_hash,
            });
        }
        snapshot
            .state
            .validate()
            .map_err(|reason| PricingError::invalid("snapshot", reason))?;

        Ok(TaxiMeter::from_parts(tariff, snapshot.state, snapshot.events))
    }
}

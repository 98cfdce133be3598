//! Fare Engine Core
//!
//! Deterministic pricing for Quebec taxi rides and courier deliveries.
//!
//! # Architecture
//!
//! - **core**: Money, tax split and content hashing primitives
//! - **schedule**: Day/night tariff resolution
//! - **meter**: Taxi meter state machine fed by speed samples
//! - **fare**: Itemized taxi fares
//! - **courier**: Courier and delivery-fee pricing
//! - **format**: fr-CA / en-CA rendering
//! - **receipt**: Printable receipts with reproducibility fingerprints
//! - **config**: Loadable engine configuration
//!
//! # Critical Invariants
//!
//! 1. All money values are i64 (cents)
//! 2. Every breakdown reconciles to the cent
//! 3. No randomness or clock reads in pricing; time and weather are inputs

pub mod config;
pub mod core;
pub mod courier;
pub mod error;
pub mod fare;
pub mod format;
pub mod meter;
pub mod receipt;
pub mod schedule;

pub use crate::core::{Cents, Rate, TaxAmounts, TaxConstants};
pub use config::EngineConfig;
pub use courier::{
    calculate_courier_price, calculate_delivery_fee, CourierPriceBreakdown,
    CourierPricingCalculator, DeliveryFeeBreakdown, DeliveryKind, PriceQuote, PricingInput,
};
pub use error::{PricingError, PricingResult};
pub use fare::{calculate_fare, FareBreakdown, FareCalculator, TripMetrics};
pub use format::{format_currency, Locale};
pub use meter::{
    MeterCommand, MeterEvent, MeterMode, MeterSnapshot, MeterTick, SharedMeter, TaxiMeter,
    TickOutcome, TickRejection,
};
pub use receipt::{PaymentMethod, TaxiReceipt};
pub use schedule::{resolve_rate_schedule, RateSchedule, ResolvedSchedule, TaxiTariff};

// FFI module (when feature enabled)
#[cfg(feature = "pyo3")]
pub mod ffi;

#[cfg(feature = "pyo3")]
use pyo3::prelude::*;

#[cfg(feature = "pyo3")]
#[pymodule]
fn fare_engine_core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(ffi::calculate_fare, m)?)?;
    m.add_function(wrap_pyfunction!(ffi::calculate_courier_price, m)?)?;
    m.add_function(wrap_pyfunction!(ffi::format_currency, m)?)?;
    Ok(())
}

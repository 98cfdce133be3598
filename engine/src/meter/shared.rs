//! Thread-safe meter handle
//!
//! The telemetry feed and the UI usually live on different threads. Both
//! go through [`SharedMeter`], which serializes every command on one lock so
//! a tick can never interleave with a stop or a reset.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::PricingResult;
use crate::fare::{FareBreakdown, FareCalculator, TripMetrics};

use super::{CommandOutcome, MeterCommand, MeterTick, TaxiMeter, TickOutcome, TripMeterState};

/// Cloneable handle to one meter
#[derive(Debug, Clone, Default)]
pub struct SharedMeter {
    inner: Arc<Mutex<TaxiMeter>>,
}

impl SharedMeter {
    pub fn new(meter: TaxiMeter) -> Self {
        Self {
            inner: Arc::new(Mutex::new(meter)),
        }
    }

    // Meter mutations never panic midway, so a poisoned lock still guards a
    // consistent meter.
    fn lock(&self) -> MutexGuard<'_, TaxiMeter> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn apply(&self, command: &MeterCommand) -> PricingResult<CommandOutcome> {
        self.lock().apply(command)
    }

    pub fn tick(&self, tick: MeterTick) -> TickOutcome {
        self.lock().tick(tick)
    }

    /// Copy of the current trip state
    pub fn state(&self) -> TripMeterState {
        self.lock().state().clone()
    }

    pub fn metrics(&self) -> Option<TripMetrics> {
        self.lock().metrics()
    }

    pub fn current_fare(&self, calculator: &FareCalculator) -> PricingResult<FareBreakdown> {
        self.lock().current_fare(calculator)
    }

    /// Run `f` with exclusive access to the meter
    pub fn with<R>(&self, f: impl FnOnce(&mut TaxiMeter) -> R) -> R {
        f(&mut self.lock())
    }
}

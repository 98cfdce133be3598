//! Taxi meter state machine
//!
//! Consumes a stream of timestamped speed samples for one trip and keeps
//! the billed quantities: distance while the vehicle moves at or above the
//! waiting threshold, waiting time below it.
//!
//! # States
//!
//! - **Stopped**: initial and terminal; nothing accumulates
//! - **Distance**: accumulating kilometres
//! - **Waiting**: accumulating waiting time
//!
//! A running meter can additionally be paused, which suspends tick
//! processing without touching accumulators or mode.
//!
//! # Critical Invariants
//!
//! 1. At most one accumulator advances per accepted tick
//! 2. Both accumulators are non-decreasing
//! 3. The schedule is pinned to the trip start time, never re-resolved
//! 4. A malformed or out-of-order sample changes nothing

pub mod checkpoint;
pub mod event;
pub mod shared;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};

use crate::error::{PricingError, PricingResult};
use crate::fare::{FareBreakdown, FareCalculator, TripMetrics};
use crate::schedule::TaxiTariff;

pub use checkpoint::MeterSnapshot;
pub use event::{MeterEvent, MeterEventLog};
pub use shared::SharedMeter;

/// Nominal telemetry period (1 Hz)
pub const NOMINAL_TICK_SECS: f64 = 1.0;

/// Billing mode of the meter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeterMode {
    Stopped,
    Distance,
    Waiting,
}

impl fmt::Display for MeterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MeterMode::Stopped => f.write_str("stopped"),
            MeterMode::Distance => f.write_str("distance"),
            MeterMode::Waiting => f.write_str("waiting"),
        }
    }
}

fn nominal_interval() -> f64 {
    NOMINAL_TICK_SECS
}

/// One telemetry sample: the speed held over the interval ending at `at`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeterTick {
    pub at: NaiveDateTime,
    pub speed_kmh: f64,
    #[serde(default = "nominal_interval")]
    pub interval_secs: f64,
}

impl MeterTick {
    /// Sample covering one nominal tick period
    pub fn new(at: NaiveDateTime, speed_kmh: f64) -> Self {
        Self {
            at,
            speed_kmh,
            interval_secs: NOMINAL_TICK_SECS,
        }
    }

    pub fn with_interval(mut self, interval_secs: f64) -> Self {
        self.interval_secs = interval_secs;
        self
    }
}

/// Why a sample was ignored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TickRejection {
    NotRunning,
    Paused,
    /// Negative or non-finite speed
    InvalidSpeed,
    /// Non-positive or non-finite interval
    InvalidInterval,
    /// Not after the last processed tick (late or duplicate)
    OutOfOrder,
}

/// Result of feeding one sample to the meter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TickOutcome {
    Accumulated { mode: MeterMode, mode_changed: bool },
    Rejected(TickRejection),
}

impl TickOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, TickOutcome::Accumulated { .. })
    }
}

/// Mutable state of one trip, owned by exactly one meter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripMeterState {
    mode: MeterMode,
    paused: bool,
    accumulated_distance_km: f64,
    accumulated_waiting_secs: f64,
    trip_start_time: Option<NaiveDateTime>,
    is_airport: bool,
    last_tick_at: Option<NaiveDateTime>,
    ticks_accepted: u64,
}

impl Default for TripMeterState {
    fn default() -> Self {
        Self {
            mode: MeterMode::Stopped,
            paused: false,
            accumulated_distance_km: 0.0,
            accumulated_waiting_secs: 0.0,
            trip_start_time: None,
            is_airport: false,
            last_tick_at: None,
            ticks_accepted: 0,
        }
    }
}

impl TripMeterState {
    pub fn mode(&self) -> MeterMode {
        self.mode
    }

    pub fn is_running(&self) -> bool {
        self.mode != MeterMode::Stopped
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn accumulated_distance_km(&self) -> f64 {
        self.accumulated_distance_km
    }

    pub fn accumulated_waiting_secs(&self) -> f64 {
        self.accumulated_waiting_secs
    }

    pub fn accumulated_waiting_minutes(&self) -> f64 {
        self.accumulated_waiting_secs / 60.0
    }

    pub fn trip_start_time(&self) -> Option<NaiveDateTime> {
        self.trip_start_time
    }

    pub fn is_airport(&self) -> bool {
        self.is_airport
    }

    pub fn last_tick_at(&self) -> Option<NaiveDateTime> {
        self.last_tick_at
    }

    pub fn ticks_accepted(&self) -> u64 {
        self.ticks_accepted
    }

    /// Frozen quantities for pricing, once a trip has started
    pub fn metrics(&self) -> Option<TripMetrics> {
        self.trip_start_time.map(|trip_start_time| TripMetrics {
            distance_km: self.accumulated_distance_km,
            waiting_minutes: self.accumulated_waiting_minutes(),
            is_airport: self.is_airport,
            trip_start_time,
        })
    }

    fn describe(&self) -> String {
        if self.paused {
            "paused".to_string()
        } else {
            self.mode.to_string()
        }
    }

    pub(crate) fn validate(&self) -> Result<(), String> {
        let finite_non_negative = |v: f64| v.is_finite() && v >= 0.0;
        if !finite_non_negative(self.accumulated_distance_km)
            || !finite_non_negative(self.accumulated_waiting_secs)
        {
            return Err("accumulators must be finite and non-negative".to_string());
        }
        if self.is_running() && self.trip_start_time.is_none() {
            return Err("running meter has no trip start time".to_string());
        }
        if self.paused && !self.is_running() {
            return Err("stopped meter cannot be paused".to_string());
        }
        Ok(())
    }
}

/// Caller-issued meter command, the unit of a recorded trip trace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum MeterCommand {
    Start {
        at: NaiveDateTime,
        #[serde(default)]
        is_airport: bool,
    },
    Tick(MeterTick),
    Pause,
    Resume,
    Stop,
    Reset,
}

/// What a command did
#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutcome {
    Started,
    Tick(TickOutcome),
    Paused,
    Resumed,
    Stopped(TripMetrics),
    Reset,
}

/// Taxi meter for one trip at a time
///
/// # Example
/// ```
/// use chrono::{Duration, NaiveDate};
/// use fare_engine_core::meter::{MeterMode, MeterTick, TaxiMeter};
///
/// let start = NaiveDate::from_ymd_opt(2026, 2, 3).unwrap().and_hms_opt(9, 0, 0).unwrap();
/// let mut meter = TaxiMeter::default();
/// meter.start(start, false).unwrap();
///
/// meter.tick(MeterTick::new(start + Duration::seconds(1), 36.0));
/// meter.tick(MeterTick::new(start + Duration::seconds(2), 5.0));
/// assert_eq!(meter.mode(), MeterMode::Waiting);
///
/// let trip = meter.stop().unwrap();
/// assert!((trip.distance_km - 0.01).abs() < 1e-12);
/// assert!((trip.waiting_minutes - 1.0 / 60.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Default)]
pub struct TaxiMeter {
    tariff: TaxiTariff,
    state: TripMeterState,
    events: MeterEventLog,
}

impl TaxiMeter {
    pub fn new(tariff: TaxiTariff) -> Self {
        Self {
            tariff,
            state: TripMeterState::default(),
            events: MeterEventLog::new(),
        }
    }

    pub(crate) fn from_parts(
        tariff: TaxiTariff,
        state: TripMeterState,
        events: MeterEventLog,
    ) -> Self {
        Self {
            tariff,
            state,
            events,
        }
    }

    pub fn tariff(&self) -> &TaxiTariff {
        &self.tariff
    }

    pub fn state(&self) -> &TripMeterState {
        &self.state
    }

    pub fn mode(&self) -> MeterMode {
        self.state.mode
    }

    /// Events of the current trip (or of the last one, once stopped)
    pub fn events(&self) -> &MeterEventLog {
        &self.events
    }

    pub fn events_mut(&mut self) -> &mut MeterEventLog {
        &mut self.events
    }

    fn invalid_state(&self, command: &'static str) -> PricingError {
        PricingError::InvalidState {
            command,
            state: self.state.describe(),
        }
    }

    /// Begin a trip: `Stopped -> Distance`, accumulators zeroed, start pinned
    ///
    /// The event log is cleared, so it only ever holds one trip.
    ///
    /// # Errors
    /// `InvalidState` if a trip is already running.
    pub fn start(&mut self, at: NaiveDateTime, is_airport: bool) -> PricingResult<()> {
        if self.state.is_running() {
            return Err(self.invalid_state("start"));
        }

        self.state = TripMeterState {
            mode: MeterMode::Distance,
            trip_start_time: Some(at),
            is_airport,
            ..TripMeterState::default()
        };
        self.events.clear();

        let is_night_rate = self.tariff.resolve(at).is_night;
        debug!(%at, is_airport, is_night_rate, "meter started");
        self.events.log(MeterEvent::TripStarted {
            at,
            is_airport,
            is_night_rate,
        });
        Ok(())
    }

    fn check_tick(&self, tick: &MeterTick) -> Result<(), TickRejection> {
        if !self.state.is_running() {
            return Err(TickRejection::NotRunning);
        }
        if self.state.paused {
            return Err(TickRejection::Paused);
        }
        if !tick.speed_kmh.is_finite() || tick.speed_kmh < 0.0 {
            return Err(TickRejection::InvalidSpeed);
        }
        if !tick.interval_secs.is_finite() || tick.interval_secs <= 0.0 {
            return Err(TickRejection::InvalidInterval);
        }
        let watermark = self.state.last_tick_at.or(self.state.trip_start_time);
        if matches!(watermark, Some(last) if tick.at <= last) {
            return Err(TickRejection::OutOfOrder);
        }
        Ok(())
    }

    /// Feed one telemetry sample
    ///
    /// Rejected samples are logged and leave the state untouched; they never
    /// surface as errors so a bad GPS fix cannot abort a billable trip.
    pub fn tick(&mut self, tick: MeterTick) -> TickOutcome {
        if let Err(reason) = self.check_tick(&tick) {
            warn!(at = %tick.at, speed_kmh = tick.speed_kmh, ?reason, "meter tick rejected");
            self.events.log(MeterEvent::TickRejected {
                at: tick.at,
                reason,
            });
            return TickOutcome::Rejected(reason);
        }

        let previous = self.state.mode;
        let mode = if tick.speed_kmh < self.tariff.waiting_speed_threshold_kmh {
            self.state.accumulated_waiting_secs += tick.interval_secs;
            MeterMode::Waiting
        } else {
            self.state.accumulated_distance_km += tick.speed_kmh * tick.interval_secs / 3600.0;
            MeterMode::Distance
        };

        self.state.mode = mode;
        self.state.last_tick_at = Some(tick.at);
        self.state.ticks_accepted += 1;

        let mode_changed = mode != previous;
        if mode_changed {
            debug!(at = %tick.at, from = %previous, to = %mode, "meter mode changed");
            self.events.log(MeterEvent::ModeChanged {
                at: tick.at,
                from: previous,
                to: mode,
                speed_kmh: tick.speed_kmh,
            });
        }

        TickOutcome::Accumulated { mode, mode_changed }
    }

    /// Suspend tick processing
    ///
    /// # Errors
    /// `InvalidState` unless the meter is running and not already paused.
    pub fn pause(&mut self) -> PricingResult<()> {
        if !self.state.is_running() || self.state.paused {
            return Err(self.invalid_state("pause"));
        }
        self.state.paused = true;
        self.events.log(MeterEvent::Paused);
        Ok(())
    }

    /// Resume tick processing after [`pause`](Self::pause)
    ///
    /// # Errors
    /// `InvalidState` unless the meter is paused.
    pub fn resume(&mut self) -> PricingResult<()> {
        if !self.state.paused {
            return Err(self.invalid_state("resume"));
        }
        self.state.paused = false;
        self.events.log(MeterEvent::Resumed);
        Ok(())
    }

    /// End the trip and freeze its quantities for the final receipt
    ///
    /// # Errors
    /// `InvalidState` if no trip is running.
    pub fn stop(&mut self) -> PricingResult<TripMetrics> {
        if !self.state.is_running() {
            return Err(self.invalid_state("stop"));
        }
        self.state.mode = MeterMode::Stopped;
        self.state.paused = false;

        let metrics = self
            .state
            .metrics()
            .ok_or_else(|| self.invalid_state("stop"))?;
        debug!(
            distance_km = metrics.distance_km,
            waiting_minutes = metrics.waiting_minutes,
            "meter stopped"
        );
        self.events.log(MeterEvent::TripStopped {
            distance_km: metrics.distance_km,
            waiting_minutes: metrics.waiting_minutes,
        });
        Ok(metrics)
    }

    /// Clear a stopped meter and its event log for reuse
    ///
    /// # Errors
    /// `InvalidState` if a trip is running.
    pub fn reset(&mut self) -> PricingResult<()> {
        if self.state.is_running() {
            return Err(self.invalid_state("reset"));
        }
        self.state = TripMeterState::default();
        self.events.clear();
        self.events.log(MeterEvent::Reset);
        Ok(())
    }

    /// Current trip quantities, `None` before the first start
    pub fn metrics(&self) -> Option<TripMetrics> {
        self.state.metrics()
    }

    /// Price the quantities accumulated so far against the pinned start time
    ///
    /// # Errors
    /// `InvalidState` if no trip has been started.
    pub fn current_fare(&self, calculator: &FareCalculator) -> PricingResult<FareBreakdown> {
        let metrics = self.metrics().ok_or_else(|| self.invalid_state("price"))?;
        calculator.calculate_trip(&metrics)
    }

    /// Apply one command
    pub fn apply(&mut self, command: &MeterCommand) -> PricingResult<CommandOutcome> {
        match command {
            MeterCommand::Start { at, is_airport } => {
                self.start(*at, *is_airport).map(|_| CommandOutcome::Started)
            }
            MeterCommand::Tick(tick) => Ok(CommandOutcome::Tick(self.tick(*tick))),
            MeterCommand::Pause => self.pause().map(|_| CommandOutcome::Paused),
            MeterCommand::Resume => self.resume().map(|_| CommandOutcome::Resumed),
            MeterCommand::Stop => self.stop().map(CommandOutcome::Stopped),
            MeterCommand::Reset => self.reset().map(|_| CommandOutcome::Reset),
        }
    }

    /// Rebuild a meter from a recorded command trace
    ///
    /// Deterministic: the same trace always yields the same state and event
    /// log. Stops at the first command that is invalid for the state reached.
    pub fn replay<'a>(
        tariff: TaxiTariff,
        commands: impl IntoIterator<Item = &'a MeterCommand>,
    ) -> PricingResult<Self> {
        let mut meter = TaxiMeter::new(tariff);
        for command in commands {
            meter.apply(command)?;
        }
        Ok(meter)
    }
}

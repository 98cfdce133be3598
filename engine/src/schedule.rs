//! Regulated taxi rate schedules
//!
//! The Commission des transports du Québec sets two rate tables: Tarif A
//! (day, 05:00 to 23:00) and Tarif B (night, 23:00 to 05:00). The table is
//! chosen from the wall-clock hour at which a trip starts.

use chrono::{DateTime, NaiveDateTime, TimeZone, Timelike};
use serde::{Deserialize, Serialize};

use crate::core::money::Cents;

/// One regulated rate table (all values in cents)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateSchedule {
    /// Flag drop (prise en charge)
    pub base_fare: Cents,
    pub per_km: Cents,
    pub per_minute_waiting: Cents,
    /// Floor applied to the fare before the regulatory fee
    pub minimum_fare: Cents,
}

impl RateSchedule {
    /// Tarif A
    pub const DAY: RateSchedule = RateSchedule {
        base_fare: 350,
        per_km: 190,
        per_minute_waiting: 70,
        minimum_fare: 700,
    };

    /// Tarif B
    pub const NIGHT: RateSchedule = RateSchedule {
        base_fare: 390,
        per_km: 210,
        per_minute_waiting: 75,
        minimum_fare: 780,
    };

    fn validate(&self, label: &str) -> Result<(), String> {
        if self.base_fare < 0
            || self.per_km < 0
            || self.per_minute_waiting < 0
            || self.minimum_fare < 0
        {
            return Err(format!("{} schedule amounts must be non-negative", label));
        }
        Ok(())
    }
}

/// Full taxi tariff: both schedules plus the schedule-independent constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxiTariff {
    pub day: RateSchedule,
    pub night: RateSchedule,
    /// Supplément aéroport, same under both schedules (cents)
    pub airport_surcharge: Cents,
    /// Frais réglementaires, shown separately and never taxed (cents)
    pub regulatory_fee: Cents,
    /// Below this speed the meter bills waiting time instead of distance
    pub waiting_speed_threshold_kmh: f64,
    /// First hour of the day schedule
    pub day_start_hour: u32,
    /// First hour of the night schedule
    pub night_start_hour: u32,
}

impl Default for TaxiTariff {
    fn default() -> Self {
        Self {
            day: RateSchedule::DAY,
            night: RateSchedule::NIGHT,
            airport_surcharge: 1750,
            regulatory_fee: 90,
            waiting_speed_threshold_kmh: 20.0,
            day_start_hour: 5,
            night_start_hour: 23,
        }
    }
}

/// Schedule selected for a timestamp
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedSchedule {
    pub schedule: RateSchedule,
    pub is_night: bool,
}

impl TaxiTariff {
    /// Whether a local hour falls in the night schedule
    ///
    /// Night covers `[night_start_hour, 24) ∪ [0, day_start_hour)`.
    pub fn is_night_hour(&self, hour: u32) -> bool {
        hour >= self.night_start_hour || hour < self.day_start_hour
    }

    /// Resolve the schedule for a local wall-clock timestamp
    ///
    /// # Example
    /// ```
    /// use chrono::NaiveDate;
    /// use fare_engine_core::schedule::{RateSchedule, TaxiTariff};
    ///
    /// let tariff = TaxiTariff::default();
    /// let at = NaiveDate::from_ymd_opt(2026, 3, 1)
    ///     .unwrap()
    ///     .and_hms_opt(22, 59, 59)
    ///     .unwrap();
    /// let resolved = tariff.resolve(at);
    /// assert!(!resolved.is_night);
    /// assert_eq!(resolved.schedule, RateSchedule::DAY);
    /// ```
    pub fn resolve(&self, at: NaiveDateTime) -> ResolvedSchedule {
        let is_night = self.is_night_hour(at.hour());
        let schedule = if is_night { self.night } else { self.day };
        ResolvedSchedule { schedule, is_night }
    }

    /// Resolve from a zoned timestamp using its local wall-clock time
    pub fn resolve_zoned<Tz: TimeZone>(&self, at: &DateTime<Tz>) -> ResolvedSchedule {
        self.resolve(at.naive_local())
    }

    pub fn validate(&self) -> Result<(), String> {
        self.day.validate("day")?;
        self.night.validate("night")?;
        if self.airport_surcharge < 0 || self.regulatory_fee < 0 {
            return Err("airport surcharge and regulatory fee must be non-negative".to_string());
        }
        if !self.waiting_speed_threshold_kmh.is_finite() || self.waiting_speed_threshold_kmh < 0.0
        {
            return Err("waiting speed threshold must be a non-negative number".to_string());
        }
        if self.night_start_hour > 23 || self.day_start_hour > 23 {
            return Err("schedule boundary hours must be within 0..=23".to_string());
        }
        if self.day_start_hour >= self.night_start_hour {
            return Err("day schedule must start before night schedule".to_string());
        }
        Ok(())
    }
}

/// Resolve a timestamp against the default Quebec tariff
pub fn resolve_rate_schedule(at: NaiveDateTime) -> ResolvedSchedule {
    TaxiTariff::default().resolve(at)
}

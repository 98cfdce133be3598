//! Taxi fare calculation
//!
//! Turns accumulated trip metrics into an itemized, tax-inclusive fare.
//!
//! # Order of operations
//!
//! 1. Resolve the schedule from the trip start time
//! 2. Flag drop, distance, waiting time and airport surcharge
//! 3. Minimum fare applied to the sum of step 2
//! 4. GST and QST on the floored fare only
//! 5. Untaxed regulatory fee added after taxes are computed
//!
//! Every line is rounded to the cent when computed and the totals are sums
//! of rounded lines, so a printed receipt always adds up.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::EngineConfig;
use crate::core::money::{checked_sum, price_quantity, Cents};
use crate::core::tax::TaxConstants;
use crate::error::{ensure_non_negative, PricingResult};
use crate::schedule::TaxiTariff;

/// Share of estimated travel time assumed to be spent waiting (lights, traffic)
const ESTIMATED_WAITING_SHARE: f64 = 0.1;

/// Measured quantities of one trip, as frozen by the meter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripMetrics {
    pub distance_km: f64,
    pub waiting_minutes: f64,
    pub is_airport: bool,
    /// Local wall-clock start; pins the schedule for the whole trip
    pub trip_start_time: NaiveDateTime,
}

/// Itemized taxi fare (all amounts in cents)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FareBreakdown {
    pub base_fare: Cents,
    pub distance_fare: Cents,
    pub waiting_fare: Cents,
    pub airport_surcharge: Cents,
    /// Fare after the minimum-fare floor, the taxable base
    pub fare_subtotal: Cents,
    pub regulatory_fee: Cents,
    /// Fare subtotal plus regulatory fee, before taxes
    pub subtotal: Cents,
    pub gst: Cents,
    pub qst: Cents,
    pub total_taxes: Cents,
    pub total: Cents,
    /// Whether Tarif B (night) was applied
    pub is_night_rate: bool,
}

impl FareBreakdown {
    /// Whether the minimum fare replaced the metered amount
    pub fn minimum_fare_applied(&self) -> bool {
        self.fare_subtotal
            > self.base_fare + self.distance_fare + self.waiting_fare + self.airport_surcharge
    }

    /// `total == subtotal + gst + qst` and `subtotal == fare_subtotal + fee`
    pub fn reconciles(&self) -> bool {
        self.total_taxes == self.gst + self.qst
            && self.subtotal == self.fare_subtotal + self.regulatory_fee
            && self.total == self.subtotal + self.total_taxes
    }
}

/// Prices taxi trips against a tariff and tax constants
#[derive(Debug, Clone, Default)]
pub struct FareCalculator {
    tariff: TaxiTariff,
    taxes: TaxConstants,
}

impl FareCalculator {
    pub fn new(tariff: TaxiTariff, taxes: TaxConstants) -> Self {
        Self { tariff, taxes }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.taxi.clone(), config.taxes)
    }

    pub fn tariff(&self) -> &TaxiTariff {
        &self.tariff
    }

    pub fn taxes(&self) -> &TaxConstants {
        &self.taxes
    }

    /// Calculate the fare for measured trip quantities
    ///
    /// # Errors
    /// `InvalidInput` if distance or waiting time is negative or non-finite,
    /// or large enough that the fare leaves the money range.
    ///
    /// # Example
    /// ```
    /// use chrono::NaiveDate;
    /// use fare_engine_core::fare::FareCalculator;
    ///
    /// let start = NaiveDate::from_ymd_opt(2026, 5, 4)
    ///     .unwrap()
    ///     .and_hms_opt(14, 0, 0)
    ///     .unwrap();
    /// let fare = FareCalculator::default()
    ///     .calculate(10.0, 2.0, false, start)
    ///     .unwrap();
    /// assert_eq!(fare.fare_subtotal, 2390);
    /// assert_eq!(fare.total, 2838);
    /// ```
    pub fn calculate(
        &self,
        distance_km: f64,
        waiting_minutes: f64,
        is_airport: bool,
        trip_start_time: NaiveDateTime,
    ) -> PricingResult<FareBreakdown> {
        let distance_km = ensure_non_negative("distance_km", distance_km)?;
        let waiting_minutes = ensure_non_negative("waiting_minutes", waiting_minutes)?;

        let resolved = self.tariff.resolve(trip_start_time);
        let schedule = resolved.schedule;

        let base_fare = schedule.base_fare;
        let distance_fare = price_quantity("distance_km", distance_km, schedule.per_km)?;
        let waiting_fare =
            price_quantity("waiting_minutes", waiting_minutes, schedule.per_minute_waiting)?;
        let airport_surcharge = if is_airport {
            self.tariff.airport_surcharge
        } else {
            0
        };

        let metered = checked_sum(
            "fare_subtotal",
            &[base_fare, distance_fare, waiting_fare, airport_surcharge],
        )?;
        let fare_subtotal = metered.max(schedule.minimum_fare);

        let regulatory_fee = self.tariff.regulatory_fee;
        let taxes = self.taxes.apply(fare_subtotal)?;
        let subtotal = checked_sum("subtotal", &[fare_subtotal, regulatory_fee])?;
        let total_taxes = taxes.total();
        let total = checked_sum("total", &[subtotal, total_taxes])?;

        let breakdown = FareBreakdown {
            base_fare,
            distance_fare,
            waiting_fare,
            airport_surcharge,
            fare_subtotal,
            regulatory_fee,
            subtotal,
            gst: taxes.gst,
            qst: taxes.qst,
            total_taxes,
            total,
            is_night_rate: resolved.is_night,
        };

        debug!(
            distance_km,
            waiting_minutes,
            is_airport,
            is_night = resolved.is_night,
            total = breakdown.total,
            "fare calculated"
        );

        Ok(breakdown)
    }

    /// Calculate the fare for metrics frozen by the meter
    pub fn calculate_trip(&self, trip: &TripMetrics) -> PricingResult<FareBreakdown> {
        self.calculate(
            trip.distance_km,
            trip.waiting_minutes,
            trip.is_airport,
            trip.trip_start_time,
        )
    }

    /// Pre-trip estimate assuming a tenth of the travel time is spent waiting
    pub fn estimate(
        &self,
        distance_km: f64,
        estimated_minutes: f64,
        at: NaiveDateTime,
    ) -> PricingResult<FareBreakdown> {
        let estimated_minutes = ensure_non_negative("estimated_minutes", estimated_minutes)?;
        self.calculate(
            distance_km,
            estimated_minutes * ESTIMATED_WAITING_SHARE,
            false,
            at,
        )
    }
}

/// Calculate a fare with the default Quebec tariff and taxes
pub fn calculate_fare(
    distance_km: f64,
    waiting_minutes: f64,
    is_airport: bool,
    trip_start_time: NaiveDateTime,
) -> PricingResult<FareBreakdown> {
    FareCalculator::default().calculate(distance_km, waiting_minutes, is_airport, trip_start_time)
}

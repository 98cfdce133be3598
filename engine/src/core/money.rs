//! Money and rate primitives
//!
//! Every monetary amount in the engine is an `i64` count of cents. Rates
//! (taxes, multipliers, discounts) are exact parts-per-million so that
//! applying a rate to an amount never goes through binary floating point.
//!
//! CRITICAL: All money values are i64 (cents)

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{PricingError, PricingResult};

/// Monetary amount in cents
pub type Cents = i64;

/// Denominator of [`Rate`]
pub const PPM_SCALE: i64 = 1_000_000;

/// Largest magnitude any line item or total may reach ($10 trillion)
///
/// Keeps every product of an amount and a rate, and every sum of line
/// items, far inside `i64`.
pub const MAX_AMOUNT: Cents = 1_000_000_000_000_000;

/// Exact fractional rate stored in parts per million
///
/// Serialized as a plain decimal (`0.09975`) so configuration files stay
/// readable; the value is snapped to the nearest ppm on load.
///
/// # Example
/// ```
/// use fare_engine_core::core::money::Rate;
///
/// let qst = Rate::from_ppm(99_750);
/// assert_eq!(qst.apply("qst", 2390), Ok(238)); // 2.384025 rounds to 2.38
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "f64", into = "f64")]
pub struct Rate(i64);

impl Rate {
    pub const ZERO: Rate = Rate(0);
    pub const ONE: Rate = Rate(PPM_SCALE);

    pub const fn from_ppm(ppm: i64) -> Self {
        Rate(ppm)
    }

    /// Snap a decimal fraction to the nearest ppm
    pub fn from_fraction(fraction: f64) -> Self {
        Rate((fraction * PPM_SCALE as f64).round() as i64)
    }

    pub const fn ppm(self) -> i64 {
        self.0
    }

    pub fn as_fraction(self) -> f64 {
        self.0 as f64 / PPM_SCALE as f64
    }

    /// `self - 1`, the surcharge share of a multiplier (negative below 1.0)
    pub const fn surcharge(self) -> Rate {
        Rate(self.0.saturating_sub(PPM_SCALE))
    }

    pub const fn plus(self, other: Rate) -> Rate {
        Rate(self.0.saturating_add(other.0))
    }

    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Apply the rate to an amount, rounding half away from zero to the cent
    ///
    /// # Errors
    /// `InvalidInput` on `field` if the result exceeds [`MAX_AMOUNT`].
    pub fn apply(self, field: &'static str, amount: Cents) -> PricingResult<Cents> {
        checked_cents(
            field,
            div_round(amount as i128 * self.0 as i128, PPM_SCALE as i128),
        )
    }

    /// Apply the rate to a non-negative amount, rounding up to the cent
    ///
    /// Used for floors, which must never sit below the exact value.
    pub fn apply_ceil(self, field: &'static str, amount: Cents) -> PricingResult<Cents> {
        let product = amount as i128 * self.0 as i128;
        let scale = PPM_SCALE as i128;
        checked_cents(field, (product + scale - 1).div_euclid(scale))
    }
}

impl From<f64> for Rate {
    fn from(value: f64) -> Self {
        Rate::from_fraction(value)
    }
}

impl From<Rate> for f64 {
    fn from(value: Rate) -> Self {
        value.as_fraction()
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_fraction())
    }
}

/// Integer division rounding half away from zero
///
/// # Panics
/// Panics if `denominator` is zero.
pub fn div_round(numerator: i128, denominator: i128) -> i128 {
    assert!(denominator != 0, "denominator must be non-zero");
    let negative = (numerator < 0) != (denominator < 0);
    let (n, d) = (numerator.abs(), denominator.abs());
    let quotient = (n + d / 2) / d;
    if negative {
        -quotient
    } else {
        quotient
    }
}

fn out_of_range(field: &'static str) -> PricingError {
    PricingError::invalid(
        field,
        format!("amount exceeds the {} cent limit", MAX_AMOUNT),
    )
}

fn checked_cents(field: &'static str, value: i128) -> PricingResult<Cents> {
    if value.abs() > MAX_AMOUNT as i128 {
        return Err(out_of_range(field));
    }
    Ok(value as Cents)
}

/// Round a fractional cent value half away from zero
///
/// # Errors
/// `InvalidInput` on `field` for a non-finite value or one beyond
/// [`MAX_AMOUNT`].
pub fn round_cents(field: &'static str, value: f64) -> PricingResult<Cents> {
    let rounded = value.round();
    if !rounded.is_finite() || rounded.abs() > MAX_AMOUNT as f64 {
        return Err(out_of_range(field));
    }
    Ok(rounded as Cents)
}

/// Sum line items, failing instead of overflowing
///
/// # Errors
/// `InvalidInput` on `field` if the sum exceeds [`MAX_AMOUNT`].
pub fn checked_sum(field: &'static str, parts: &[Cents]) -> PricingResult<Cents> {
    parts
        .iter()
        .try_fold(0 as Cents, |acc, &part| acc.checked_add(part))
        .filter(|sum| sum.abs() <= MAX_AMOUNT)
        .ok_or_else(|| out_of_range(field))
}

/// Price a continuous quantity (km, minutes) at a per-unit price in cents
///
/// # Example
/// ```
/// use fare_engine_core::core::money::price_quantity;
///
/// assert_eq!(price_quantity("distance_km", 10.0, 190), Ok(1900));
/// assert_eq!(price_quantity("waiting_minutes", 2.0, 70), Ok(140));
/// assert!(price_quantity("distance_km", 1e17, 190).is_err());
/// ```
pub fn price_quantity(field: &'static str, quantity: f64, unit_price: Cents) -> PricingResult<Cents> {
    round_cents(field, quantity * unit_price as f64)
}

/// Price a quantity at a per-unit price that is first scaled by `factor`
///
/// The unit price is scaled exactly in micro-cents before the quantity is
/// applied, so `1.50 * 0.9` stays `1.35` instead of drifting.
pub fn price_quantity_scaled(
    field: &'static str,
    quantity: f64,
    unit_price: Cents,
    factor: Rate,
) -> PricingResult<Cents> {
    let micro_cents = unit_price as i128 * factor.ppm() as i128;
    round_cents(field, quantity * micro_cents as f64 / PPM_SCALE as f64)
}

/// Convert a dollar float from an outer surface to cents
pub fn from_dollars(field: &'static str, amount: f64) -> PricingResult<Cents> {
    round_cents(field, amount * 100.0)
}

//! Locale-aware rendering of money, distance and duration
//!
//! Two locales are supported: Canadian French (`10,50 $`) and Canadian
//! English (`$10.50`). Presentation only; nothing here feeds back into a
//! calculation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::core::money::Cents;
use crate::error::PricingError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Locale {
    /// fr-CA
    #[default]
    #[serde(rename = "fr")]
    French,
    /// en-CA
    #[serde(rename = "en")]
    English,
}

impl Locale {
    pub fn code(&self) -> &'static str {
        match self {
            Locale::French => "fr",
            Locale::English => "en",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Locale {
    type Err = PricingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "fr" | "fr-ca" => Ok(Locale::French),
            "en" | "en-ca" => Ok(Locale::English),
            other => Err(PricingError::InvalidInput {
                field: "locale",
                reason: format!("unsupported locale '{}'", other),
            }),
        }
    }
}

/// Render an amount in cents
///
/// # Example
/// ```
/// use fare_engine_core::format::{format_currency, Locale};
///
/// assert_eq!(format_currency(1050, Locale::French), "10,50 $");
/// assert_eq!(format_currency(1050, Locale::English), "$10.50");
/// ```
pub fn format_currency(amount: Cents, locale: Locale) -> String {
    let sign = if amount < 0 { "-" } else { "" };
    let abs = amount.unsigned_abs();
    let (dollars, cents) = (abs / 100, abs % 100);
    match locale {
        Locale::French => format!("{}{},{:02} $", sign, dollars, cents),
        Locale::English => format!("{}${}.{:02}", sign, dollars, cents),
    }
}

/// Render a distance: whole metres below 1 km, one decimal above
pub fn format_distance(km: f64, locale: Locale) -> String {
    if km < 1.0 {
        return format!("{} m", (km * 1000.0).round() as i64);
    }
    let formatted = format!("{:.1}", km);
    match locale {
        Locale::French => format!("{} km", formatted.replace('.', ",")),
        Locale::English => format!("{} km", formatted),
    }
}

/// Render a duration given in minutes
pub fn format_duration(minutes: f64, locale: Locale) -> String {
    if minutes < 1.0 {
        return "< 1 min".to_string();
    }
    let total = minutes.round() as u64;
    if total < 60 {
        return format!("{} min", total);
    }
    let (hours, mins) = (total / 60, total % 60);
    match (locale, mins) {
        (Locale::French, 0) => format!("{} h", hours),
        (Locale::French, m) => format!("{} h {} min", hours, m),
        (Locale::English, 0) => format!("{}h", hours),
        (Locale::English, m) => format!("{}h {}m", hours, m),
    }
}

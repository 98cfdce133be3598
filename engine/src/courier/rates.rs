//! Courier rate tables and pricing dimensions
//!
//! Defines the enums a courier job is priced along and the rate tables for
//! each of them. All monetary values in cents; multipliers and discounts are
//! exact [`Rate`]s.

use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::core::money::{Cents, Rate};
use crate::error::PricingError;
use crate::format::Locale;

/// Declares a snake_case enum with `FromStr`, `Display` and `ALL`
///
/// Extra derives (such as `Default`) and variant attributes (`#[default]`)
/// pass through.
macro_rules! pricing_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $field:literal {
            $( $(#[$vmeta:meta])* $variant:ident => $text:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = PricingError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $($text => Ok($name::$variant),)+
                    other => Err(PricingError::InvalidInput {
                        field: $field,
                        reason: format!("unknown value '{}'", other),
                    }),
                }
            }
        }
    };
}

pricing_enum! {
    /// Package size tier
    PackageSize, "package_size" {
        /// Up to 5 kg, 30 cm
        Small => "small",
        /// Up to 15 kg, 60 cm
        Medium => "medium",
        /// Up to 30 kg, 100 cm
        Large => "large",
    }
}

pricing_enum! {
    /// Requested delivery speed
    SpeedTier, "speed_tier" {
        Express => "express",
        Priority => "priority",
        Standard => "standard",
        /// Pooled with other deliveries; the only tier priced below base
        Shared => "shared",
    }
}

pricing_enum! {
    /// Time-of-day band of the pickup
    #[derive(Default)]
    TimeOfDay, "time_of_day" {
        /// 06:00 to 12:00
        Morning => "morning",
        /// 12:00 to 17:00
        #[default]
        Afternoon => "afternoon",
        /// 17:00 to 21:00
        Evening => "evening",
        /// 21:00 to 24:00
        Night => "night",
        /// 00:00 to 06:00
        AfterMidnight => "after_midnight",
    }
}

pricing_enum! {
    /// Weather signal injected by the caller's weather provider
    #[derive(Default)]
    Weather, "weather" {
        #[default]
        Clear => "clear",
        Rain => "rain",
        Snow => "snow",
        /// Blizzard, ice storm
        Extreme => "extreme",
    }
}

pricing_enum! {
    /// Declared-value insurance tier
    #[derive(Default)]
    InsuranceLevel, "insurance_level" {
        #[default]
        None => "none",
        /// Up to $100
        Basic => "basic",
        /// Up to $500
        Premium => "premium",
        /// Up to $2000
        Full => "full",
    }
}

impl TimeOfDay {
    /// Band for a local hour (0-23)
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            0..=5 => TimeOfDay::AfterMidnight,
            6..=11 => TimeOfDay::Morning,
            12..=16 => TimeOfDay::Afternoon,
            17..=20 => TimeOfDay::Evening,
            _ => TimeOfDay::Night,
        }
    }

    pub fn from_time(at: NaiveDateTime) -> Self {
        Self::from_hour(at.hour())
    }
}

impl SpeedTier {
    /// Whether the tier may be pooled for a shared-route discount
    pub fn allows_route_sharing(&self) -> bool {
        matches!(self, SpeedTier::Standard | SpeedTier::Shared)
    }

    /// Promised delivery window shown to the customer
    pub fn eta(&self, locale: Locale) -> &'static str {
        match (self, locale) {
            (SpeedTier::Express, Locale::English) => "1-2 hours",
            (SpeedTier::Express, Locale::French) => "1-2 heures",
            (SpeedTier::Priority, Locale::English) => "2-4 hours",
            (SpeedTier::Priority, Locale::French) => "2-4 heures",
            (SpeedTier::Standard, Locale::English) => "Same day",
            (SpeedTier::Standard, Locale::French) => "Même jour",
            (SpeedTier::Shared, Locale::English) => "Same day (flexible)",
            (SpeedTier::Shared, Locale::French) => "Même jour (flexible)",
        }
    }
}

/// Base price and per-km rate for one package size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeRate {
    pub base: Cents,
    /// Charged per km beyond the free allowance
    pub per_km: Cents,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeRates {
    pub small: SizeRate,
    pub medium: SizeRate,
    pub large: SizeRate,
}

impl Default for SizeRates {
    fn default() -> Self {
        Self {
            small: SizeRate { base: 899, per_km: 150 },
            medium: SizeRate { base: 1499, per_km: 200 },
            large: SizeRate { base: 2499, per_km: 250 },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeedMultipliers {
    pub express: Rate,
    pub priority: Rate,
    pub standard: Rate,
    pub shared: Rate,
}

impl Default for SpeedMultipliers {
    fn default() -> Self {
        Self {
            express: Rate::from_ppm(1_750_000),
            priority: Rate::from_ppm(1_350_000),
            standard: Rate::ONE,
            shared: Rate::from_ppm(750_000),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeMultipliers {
    pub morning: Rate,
    pub afternoon: Rate,
    pub evening: Rate,
    pub night: Rate,
    pub after_midnight: Rate,
}

impl Default for TimeMultipliers {
    fn default() -> Self {
        Self {
            morning: Rate::ONE,
            afternoon: Rate::ONE,
            evening: Rate::from_ppm(1_150_000),
            night: Rate::from_ppm(1_250_000),
            after_midnight: Rate::from_ppm(1_500_000),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeatherSurcharges {
    pub rain: Cents,
    pub snow: Cents,
    pub extreme: Cents,
}

impl Default for WeatherSurcharges {
    fn default() -> Self {
        Self {
            rain: 299,
            snow: 499,
            extreme: 999,
        }
    }
}

/// Flat handling fees
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandlingFees {
    pub fragile: Cents,
    pub signature: Cents,
    pub insurance_basic: Cents,
    pub insurance_premium: Cents,
    pub insurance_full: Cents,
}

impl Default for HandlingFees {
    fn default() -> Self {
        Self {
            fragile: 299,
            signature: 199,
            insurance_basic: 299,
            insurance_premium: 799,
            insurance_full: 1499,
        }
    }
}

/// Distance allowance and long-haul per-km discounts
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistanceTiers {
    /// Distance included in the base price
    pub free_km: f64,
    /// Total distance above which `long_distance_factor` applies
    pub long_distance_km: f64,
    /// Total distance above which `very_long_distance_factor` applies
    pub very_long_distance_km: f64,
    pub long_distance_factor: Rate,
    pub very_long_distance_factor: Rate,
}

impl Default for DistanceTiers {
    fn default() -> Self {
        Self {
            free_km: 3.0,
            long_distance_km: 15.0,
            very_long_distance_km: 30.0,
            long_distance_factor: Rate::from_ppm(900_000),
            very_long_distance_factor: Rate::from_ppm(800_000),
        }
    }
}

impl DistanceTiers {
    /// Per-km factor for a total trip distance
    pub fn factor_for(&self, distance_km: f64) -> Rate {
        if distance_km > self.very_long_distance_km {
            self.very_long_distance_factor
        } else if distance_km > self.long_distance_km {
            self.long_distance_factor
        } else {
            Rate::ONE
        }
    }

    pub fn chargeable_km(&self, distance_km: f64) -> f64 {
        (distance_km - self.free_km).max(0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareDiscounts {
    /// One other delivery on the route
    pub one_partner: Rate,
    /// Two or more other deliveries on the route
    pub multi_partner: Rate,
}

impl Default for ShareDiscounts {
    fn default() -> Self {
        Self {
            one_partner: Rate::from_ppm(150_000),
            multi_partner: Rate::from_ppm(250_000),
        }
    }
}

/// Flat delivery-fee rule used for food orders and simple courier quotes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryFeeRates {
    /// Food delivery base fee
    pub food_base_fee: Cents,
    /// Per km beyond the free allowance, any order kind
    pub per_km: Cents,
    /// Food orders at or above this value ship free
    pub free_delivery_threshold: Cents,
}

impl Default for DeliveryFeeRates {
    fn default() -> Self {
        Self {
            food_base_fee: 499,
            per_km: 150,
            free_delivery_threshold: 3500,
        }
    }
}

/// Complete courier pricing configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourierRates {
    #[serde(default)]
    pub sizes: SizeRates,
    #[serde(default)]
    pub speed: SpeedMultipliers,
    #[serde(default)]
    pub time_of_day: TimeMultipliers,
    #[serde(default)]
    pub weather: WeatherSurcharges,
    #[serde(default)]
    pub handling: HandlingFees,
    #[serde(default)]
    pub distance: DistanceTiers,
    #[serde(default)]
    pub sharing: ShareDiscounts,
    #[serde(default)]
    pub delivery: DeliveryFeeRates,
    /// Subtotal never drops below this share of the base price
    #[serde(default = "default_floor_share")]
    pub floor_share_of_base: Rate,
}

fn default_floor_share() -> Rate {
    Rate::from_ppm(500_000)
}

impl Default for CourierRates {
    fn default() -> Self {
        Self {
            sizes: SizeRates::default(),
            speed: SpeedMultipliers::default(),
            time_of_day: TimeMultipliers::default(),
            weather: WeatherSurcharges::default(),
            handling: HandlingFees::default(),
            distance: DistanceTiers::default(),
            sharing: ShareDiscounts::default(),
            delivery: DeliveryFeeRates::default(),
            floor_share_of_base: default_floor_share(),
        }
    }
}

impl CourierRates {
    pub fn size_rate(&self, size: PackageSize) -> SizeRate {
        match size {
            PackageSize::Small => self.sizes.small,
            PackageSize::Medium => self.sizes.medium,
            PackageSize::Large => self.sizes.large,
        }
    }

    pub fn speed_multiplier(&self, tier: SpeedTier) -> Rate {
        match tier {
            SpeedTier::Express => self.speed.express,
            SpeedTier::Priority => self.speed.priority,
            SpeedTier::Standard => self.speed.standard,
            SpeedTier::Shared => self.speed.shared,
        }
    }

    pub fn time_multiplier(&self, band: TimeOfDay) -> Rate {
        match band {
            TimeOfDay::Morning => self.time_of_day.morning,
            TimeOfDay::Afternoon => self.time_of_day.afternoon,
            TimeOfDay::Evening => self.time_of_day.evening,
            TimeOfDay::Night => self.time_of_day.night,
            TimeOfDay::AfterMidnight => self.time_of_day.after_midnight,
        }
    }

    pub fn weather_surcharge(&self, weather: Weather) -> Cents {
        match weather {
            Weather::Clear => 0,
            Weather::Rain => self.weather.rain,
            Weather::Snow => self.weather.snow,
            Weather::Extreme => self.weather.extreme,
        }
    }

    pub fn insurance_fee(&self, level: InsuranceLevel) -> Cents {
        match level {
            InsuranceLevel::None => 0,
            InsuranceLevel::Basic => self.handling.insurance_basic,
            InsuranceLevel::Premium => self.handling.insurance_premium,
            InsuranceLevel::Full => self.handling.insurance_full,
        }
    }

    /// Discount rate for a number of share partners, if any applies
    pub fn share_discount(&self, partners: u32) -> Option<Rate> {
        match partners {
            0 => None,
            1 => Some(self.sharing.one_partner),
            _ => Some(self.sharing.multi_partner),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        for size in PackageSize::ALL {
            let rate = self.size_rate(*size);
            if rate.base < 0 || rate.per_km < 0 {
                return Err(format!("{} size rates must be non-negative", size));
            }
        }
        for tier in SpeedTier::ALL {
            if self.speed_multiplier(*tier).is_negative() {
                return Err(format!("{} speed multiplier must be non-negative", tier));
            }
        }
        for band in TimeOfDay::ALL {
            if self.time_multiplier(*band) < Rate::ONE {
                return Err(format!("{} time multiplier must be at least 1.0", band));
            }
        }
        let d = &self.distance;
        if !(d.free_km >= 0.0 && d.long_distance_km >= d.free_km)
            || d.very_long_distance_km < d.long_distance_km
        {
            return Err("distance tiers must be ordered free <= long <= very long".to_string());
        }
        if d.long_distance_factor.is_negative() || d.very_long_distance_factor.is_negative() {
            return Err("distance factors must be non-negative".to_string());
        }
        for weather in Weather::ALL {
            if self.weather_surcharge(*weather) < 0 {
                return Err(format!("{} weather surcharge must be non-negative", weather));
            }
        }
        let h = &self.handling;
        if h.fragile < 0 || h.signature < 0 {
            return Err("handling fees must be non-negative".to_string());
        }
        for level in InsuranceLevel::ALL {
            if self.insurance_fee(*level) < 0 {
                return Err(format!("{} insurance fee must be non-negative", level));
            }
        }
        let delivery = &self.delivery;
        if delivery.food_base_fee < 0 || delivery.per_km < 0 || delivery.free_delivery_threshold < 0
        {
            return Err("delivery fee rates must be non-negative".to_string());
        }
        for discount in [self.sharing.one_partner, self.sharing.multi_partner] {
            if discount.is_negative() || discount > Rate::ONE {
                return Err("share discounts must be within 0..=1".to_string());
            }
        }
        if self.floor_share_of_base.is_negative() || self.floor_share_of_base > Rate::ONE {
            return Err("floor share of base must be within 0..=1".to_string());
        }
        Ok(())
    }
}

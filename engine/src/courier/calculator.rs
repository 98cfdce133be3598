//! Courier dynamic pricing
//!
//! Prices a delivery along several independent factors. Multiplicative
//! factors compound in a fixed order (speed tier, then time of day); flat
//! fees are added afterwards and the shared-route discount applies to
//! everything before it.
//!
//! # Algorithm
//!
//! 1. Base price of the package size
//! 2. Distance beyond the free allowance, per-km rate discounted on long hauls
//! 3. Speed-tier surcharge on (1 + 2)
//! 4. Time-of-day surcharge on (1 + 2 + 3)
//! 5. Weather, fragile, signature and insurance fees
//! 6. Shared-route discount on (1..5) for standard/shared tiers
//! 7. Floor at half the base price
//! 8. GST and QST on the floored subtotal

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::EngineConfig;
use crate::core::money::{checked_sum, price_quantity_scaled, Cents};
use crate::core::tax::TaxConstants;
use crate::error::{ensure_non_negative, PricingResult};
use crate::format::Locale;

use super::rates::{CourierRates, InsuranceLevel, PackageSize, SpeedTier, TimeOfDay, Weather};

/// Static attributes of one delivery plus injected environmental signals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingInput {
    pub package_size: PackageSize,
    pub distance_km: f64,
    pub speed_tier: SpeedTier,
    #[serde(default)]
    pub is_fragile: bool,
    #[serde(default)]
    pub time_of_day: TimeOfDay,
    #[serde(default)]
    pub weather: Weather,
    #[serde(default)]
    pub signature_required: bool,
    #[serde(default)]
    pub insurance_level: InsuranceLevel,
    #[serde(default)]
    pub can_share_route: bool,
    /// Other deliveries that could share the route (0, 1 or 2+)
    #[serde(default)]
    pub share_partners: u32,
}

impl PricingInput {
    /// Input with defaults for every optional signal
    ///
    /// Afternoon, clear weather, not fragile, no signature, no insurance,
    /// no route sharing.
    pub fn new(package_size: PackageSize, distance_km: f64, speed_tier: SpeedTier) -> Self {
        Self {
            package_size,
            distance_km,
            speed_tier,
            is_fragile: false,
            time_of_day: TimeOfDay::default(),
            weather: Weather::default(),
            signature_required: false,
            insurance_level: InsuranceLevel::default(),
            can_share_route: false,
            share_partners: 0,
        }
    }

    pub fn fragile(mut self) -> Self {
        self.is_fragile = true;
        self
    }

    pub fn with_time_of_day(mut self, time_of_day: TimeOfDay) -> Self {
        self.time_of_day = time_of_day;
        self
    }

    pub fn with_weather(mut self, weather: Weather) -> Self {
        self.weather = weather;
        self
    }

    pub fn with_signature(mut self) -> Self {
        self.signature_required = true;
        self
    }

    pub fn with_insurance(mut self, level: InsuranceLevel) -> Self {
        self.insurance_level = level;
        self
    }

    /// Mark the route as shareable with `partners` other deliveries
    pub fn with_share_partners(mut self, partners: u32) -> Self {
        self.can_share_route = true;
        self.share_partners = partners;
        self
    }
}

/// Itemized courier price (all amounts in cents)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourierPriceBreakdown {
    pub base_price: Cents,
    pub distance_price: Cents,
    /// Negative for the shared tier
    pub speed_surcharge: Cents,
    pub time_surcharge: Cents,
    pub weather_surcharge: Cents,
    pub fragile_fee: Cents,
    pub signature_fee: Cents,
    pub insurance_fee: Cents,
    pub shared_discount: Cents,
    /// Steps 1-5 before the shared discount
    pub subtotal_before_discount: Cents,
    /// Pre-tax subtotal after discount and floor
    pub subtotal: Cents,
    pub gst: Cents,
    pub qst: Cents,
    pub total_taxes: Cents,
    pub total: Cents,
    /// Informational: express price minus actual subtotal, plus discount
    pub savings: Cents,
    pub speed_tier: SpeedTier,
    pub estimated_delivery: String,
    pub estimated_delivery_fr: String,
}

impl CourierPriceBreakdown {
    pub fn reconciles(&self) -> bool {
        self.total_taxes == self.gst + self.qst && self.total == self.subtotal + self.total_taxes
    }

    /// Whether the half-base floor raised the subtotal
    pub fn floor_applied(&self) -> bool {
        self.subtotal > self.subtotal_before_discount - self.shared_discount
    }

    pub fn estimated_delivery(&self, locale: Locale) -> &str {
        match locale {
            Locale::English => &self.estimated_delivery,
            Locale::French => &self.estimated_delivery_fr,
        }
    }
}

/// Prices courier jobs against a rate table and tax constants
#[derive(Debug, Clone, Default)]
pub struct CourierPricingCalculator {
    rates: CourierRates,
    taxes: TaxConstants,
}

impl CourierPricingCalculator {
    pub fn new(rates: CourierRates, taxes: TaxConstants) -> Self {
        Self { rates, taxes }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.courier.clone(), config.taxes)
    }

    pub fn rates(&self) -> &CourierRates {
        &self.rates
    }

    pub fn taxes(&self) -> &TaxConstants {
        &self.taxes
    }

    /// Distance price for a total trip distance
    ///
    /// Only the distance beyond the free allowance is charged; the per-km
    /// discount tier is chosen from the total distance.
    pub fn distance_price(&self, size: PackageSize, distance_km: f64) -> PricingResult<Cents> {
        let tiers = &self.rates.distance;
        let chargeable = tiers.chargeable_km(distance_km);
        if chargeable <= 0.0 {
            return Ok(0);
        }
        price_quantity_scaled(
            "distance_km",
            chargeable,
            self.rates.size_rate(size).per_km,
            tiers.factor_for(distance_km),
        )
    }

    /// Calculate the itemized price of a delivery
    ///
    /// # Errors
    /// `InvalidInput` if the distance is negative or non-finite, or large
    /// enough that the price leaves the money range.
    ///
    /// # Example
    /// ```
    /// use fare_engine_core::courier::{CourierPricingCalculator, PackageSize, PricingInput, SpeedTier};
    ///
    /// let input = PricingInput::new(PackageSize::Small, 8.0, SpeedTier::Standard);
    /// let price = CourierPricingCalculator::default().calculate(&input).unwrap();
    /// assert_eq!(price.subtotal, 1649);
    /// assert_eq!(price.total, 1896);
    /// ```
    pub fn calculate(&self, input: &PricingInput) -> PricingResult<CourierPriceBreakdown> {
        let distance_km = ensure_non_negative("distance_km", input.distance_km)?;
        let rates = &self.rates;

        let base_price = rates.size_rate(input.package_size).base;
        let distance_price = self.distance_price(input.package_size, distance_km)?;

        let metered = checked_sum("distance_km", &[base_price, distance_price])?;
        let speed_surcharge = rates
            .speed_multiplier(input.speed_tier)
            .surcharge()
            .apply("speed_surcharge", metered)?;

        let time_surcharge = rates
            .time_multiplier(input.time_of_day)
            .surcharge()
            .apply("time_surcharge", metered + speed_surcharge)?;

        let weather_surcharge = rates.weather_surcharge(input.weather);
        let fragile_fee = if input.is_fragile {
            rates.handling.fragile
        } else {
            0
        };
        let signature_fee = if input.signature_required {
            rates.handling.signature
        } else {
            0
        };
        let insurance_fee = rates.insurance_fee(input.insurance_level);

        let subtotal_before_discount = checked_sum(
            "subtotal",
            &[
                metered,
                speed_surcharge,
                time_surcharge,
                weather_surcharge,
                fragile_fee,
                signature_fee,
                insurance_fee,
            ],
        )?;

        let shared_discount = if input.can_share_route && input.speed_tier.allows_route_sharing() {
            rates
                .share_discount(input.share_partners)
                .map(|rate| rate.apply("shared_discount", subtotal_before_discount))
                .transpose()?
                .unwrap_or(0)
        } else {
            0
        };

        let floor = rates.floor_share_of_base.apply_ceil("floor", base_price)?;
        let subtotal = (subtotal_before_discount - shared_discount).max(floor);

        let taxes = self.taxes.apply(subtotal)?;
        let total_taxes = taxes.total();
        let total = checked_sum("total", &[subtotal, total_taxes])?;

        let express_surcharge = rates.speed.express.surcharge().apply("savings", metered)?;
        let express_subtotal = checked_sum("savings", &[metered, express_surcharge])?;
        let savings = (express_subtotal - subtotal + shared_discount).max(0);

        let breakdown = CourierPriceBreakdown {
            base_price,
            distance_price,
            speed_surcharge,
            time_surcharge,
            weather_surcharge,
            fragile_fee,
            signature_fee,
            insurance_fee,
            shared_discount,
            subtotal_before_discount,
            subtotal,
            gst: taxes.gst,
            qst: taxes.qst,
            total_taxes,
            total,
            savings,
            speed_tier: input.speed_tier,
            estimated_delivery: input.speed_tier.eta(Locale::English).to_string(),
            estimated_delivery_fr: input.speed_tier.eta(Locale::French).to_string(),
        };

        debug!(
            package_size = %input.package_size,
            speed_tier = %input.speed_tier,
            distance_km,
            subtotal = breakdown.subtotal,
            total = breakdown.total,
            "courier price calculated"
        );

        Ok(breakdown)
    }
}

/// Calculate a courier price with the default rate table and taxes
pub fn calculate_courier_price(input: &PricingInput) -> PricingResult<CourierPriceBreakdown> {
    CourierPricingCalculator::default().calculate(input)
}

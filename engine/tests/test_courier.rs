//! Courier pricing tests
//!
//! Critical invariants tested:
//! - total == subtotal + gst + qst to the cent
//! - Multipliers compound speed first, then time of day
//! - Shared discount only for standard/shared tiers with partners
//! - Subtotal never below half the base price
//! - Delivery fees and localized quotes

use chrono::{NaiveDate, NaiveDateTime};
use fare_engine_core::core::money::Rate;
use fare_engine_core::core::tax::TaxConstants;
use fare_engine_core::courier::{
    calculate_courier_price, calculate_delivery_fee, CourierPricingCalculator, CourierRates,
    DeliveryKind, InsuranceLevel, PackageSize, PricingInput, SpeedTier, TimeOfDay, Weather,
};
use fare_engine_core::format::Locale;
use fare_engine_core::PricingError;

fn small_8km() -> PricingInput {
    PricingInput::new(PackageSize::Small, 8.0, SpeedTier::Standard)
}

// ============================================================================
// Reference scenarios
// ============================================================================

#[test]
fn test_small_standard_8km() {
    let price = calculate_courier_price(&small_8km()).unwrap();

    assert_eq!(price.base_price, 899);
    assert_eq!(price.distance_price, 750);
    assert_eq!(price.speed_surcharge, 0);
    assert_eq!(price.time_surcharge, 0);
    assert_eq!(price.weather_surcharge, 0);
    assert_eq!(price.shared_discount, 0);
    assert_eq!(price.subtotal, 1649);
    assert_eq!(price.gst, 82);
    assert_eq!(price.qst, 165);
    assert_eq!(price.total, 1896);
    assert_eq!(price.savings, 1237);
    assert!(price.reconciles());
}

#[test]
fn test_shared_route_two_partners() {
    let input = small_8km().with_share_partners(2);
    let price = calculate_courier_price(&input).unwrap();

    assert_eq!(price.subtotal_before_discount, 1649);
    assert_eq!(price.shared_discount, 412);
    assert_eq!(price.subtotal, 1237);
    assert_eq!(price.total, 1422);
    assert_eq!(price.savings, 2061);
}

#[test]
fn test_shared_route_one_partner() {
    let price = calculate_courier_price(&small_8km().with_share_partners(1)).unwrap();
    assert_eq!(price.shared_discount, 247);
    assert_eq!(price.subtotal, 1402);
}

#[test]
fn test_every_factor_compounds_in_order() {
    let input = PricingInput::new(PackageSize::Medium, 20.0, SpeedTier::Express)
        .with_time_of_day(TimeOfDay::Evening)
        .with_weather(Weather::Rain)
        .fragile()
        .with_signature()
        .with_insurance(InsuranceLevel::Premium);
    let price = calculate_courier_price(&input).unwrap();

    // 17 km at 2.00 * 0.9
    assert_eq!(price.distance_price, 3060);
    // (14.99 + 30.60) * 0.75
    assert_eq!(price.speed_surcharge, 3419);
    // (14.99 + 30.60 + 34.19) * 0.15
    assert_eq!(price.time_surcharge, 1197);
    assert_eq!(price.weather_surcharge, 299);
    assert_eq!(price.fragile_fee, 299);
    assert_eq!(price.signature_fee, 199);
    assert_eq!(price.insurance_fee, 799);
    assert_eq!(price.subtotal, 10771);
    assert_eq!(price.total, 12384);
    assert_eq!(price.savings, 0);
    assert!(price.reconciles());
}

#[test]
fn test_very_long_priority_after_midnight() {
    let input = PricingInput::new(PackageSize::Large, 40.0, SpeedTier::Priority)
        .with_time_of_day(TimeOfDay::AfterMidnight)
        .with_weather(Weather::Snow)
        .with_insurance(InsuranceLevel::Full);
    let price = calculate_courier_price(&input).unwrap();
    assert_eq!(price.distance_price, 7400);
    assert_eq!(price.speed_surcharge, 3465);
    assert_eq!(price.time_surcharge, 6682);
    assert_eq!(price.subtotal, 22044);
    assert_eq!(price.total, 25345);
}

// ============================================================================
// Discounts and floor
// ============================================================================

#[test]
fn test_shared_tier_is_below_base() {
    let input = PricingInput::new(PackageSize::Small, 0.0, SpeedTier::Shared).with_share_partners(2);
    let price = calculate_courier_price(&input).unwrap();
    assert_eq!(price.speed_surcharge, -225);
    assert_eq!(price.shared_discount, 169);
    assert_eq!(price.subtotal, 505);
    assert!(!price.floor_applied());
}

#[test]
fn test_floor_at_half_base() {
    let mut rates = CourierRates::default();
    rates.sharing.multi_partner = Rate::from_fraction(0.5);
    let calculator = CourierPricingCalculator::new(rates, TaxConstants::default());

    let input = PricingInput::new(PackageSize::Small, 0.0, SpeedTier::Shared).with_share_partners(3);
    let price = calculator.calculate(&input).unwrap();
    assert_eq!(price.shared_discount, 337);
    // ceil(8.99 / 2)
    assert_eq!(price.subtotal, 450);
    assert!(price.floor_applied());
    assert_eq!(price.total, 517);
}

#[test]
fn test_no_share_discount_for_fast_tiers() {
    for tier in [SpeedTier::Express, SpeedTier::Priority] {
        let input = PricingInput::new(PackageSize::Small, 8.0, tier).with_share_partners(2);
        let price = calculate_courier_price(&input).unwrap();
        assert_eq!(price.shared_discount, 0, "{}", tier);
    }
}

#[test]
fn test_no_share_discount_without_partners() {
    let input = small_8km().with_share_partners(0);
    assert!(input.can_share_route);
    let price = calculate_courier_price(&input).unwrap();
    assert_eq!(price.shared_discount, 0);
}

// ============================================================================
// Signals and parsing
// ============================================================================

#[test]
fn test_time_of_day_bands() {
    let at = |hour| -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 1, 20)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    };
    assert_eq!(TimeOfDay::from_time(at(0)), TimeOfDay::AfterMidnight);
    assert_eq!(TimeOfDay::from_time(at(5)), TimeOfDay::AfterMidnight);
    assert_eq!(TimeOfDay::from_time(at(6)), TimeOfDay::Morning);
    assert_eq!(TimeOfDay::from_time(at(12)), TimeOfDay::Afternoon);
    assert_eq!(TimeOfDay::from_time(at(17)), TimeOfDay::Evening);
    assert_eq!(TimeOfDay::from_time(at(21)), TimeOfDay::Night);
    assert_eq!(TimeOfDay::from_time(at(23)), TimeOfDay::Night);
}

#[test]
fn test_enum_names_round_trip() {
    for size in PackageSize::ALL {
        assert_eq!(size.as_str().parse::<PackageSize>().unwrap(), *size);
    }
    assert_eq!("AFTER_MIDNIGHT".parse::<TimeOfDay>().unwrap(), TimeOfDay::AfterMidnight);
    match "hail".parse::<Weather>() {
        Err(PricingError::InvalidInput { field, .. }) => assert_eq!(field, "weather"),
        other => panic!("expected InvalidInput, got {:?}", other),
    }
}

#[test]
fn test_input_defaults_from_json() {
    let input: PricingInput = serde_json::from_str(
        r#"{"package_size": "medium", "distance_km": 4.0, "speed_tier": "priority"}"#,
    )
    .unwrap();
    assert_eq!(input.time_of_day, TimeOfDay::Afternoon);
    assert_eq!(input.weather, Weather::Clear);
    assert_eq!(input.insurance_level, InsuranceLevel::None);
    assert!(!input.signature_required);
    assert!(!input.can_share_route);
}

// ============================================================================
// Delivery fees and quotes
// ============================================================================

#[test]
fn test_food_delivery_free_over_threshold() {
    let fee = calculate_delivery_fee(6.0, 3500, DeliveryKind::Food).unwrap();
    assert!(fee.free_delivery);
    assert_eq!(fee.total, 0);

    let fee = calculate_delivery_fee(6.0, 3499, DeliveryKind::Food).unwrap();
    assert!(!fee.free_delivery);
    // 4.99 + 3 km * 1.50
    assert_eq!(fee.fee, 949);
    assert_eq!(fee.total, fee.fee + fee.gst + fee.qst);
}

#[test]
fn test_courier_delivery_fee_uses_package_base() {
    let fee = calculate_delivery_fee(5.0, 0, DeliveryKind::Courier(PackageSize::Large)).unwrap();
    assert_eq!(fee.fee, 2499 + 300);
    assert!(!fee.free_delivery);
}

#[test]
fn test_delivery_fee_validation() {
    assert!(calculate_delivery_fee(-1.0, 0, DeliveryKind::Food).is_err());
    assert!(calculate_delivery_fee(1.0, -1, DeliveryKind::Food).is_err());
}

#[test]
fn test_english_quote_summary() {
    let quote = CourierPricingCalculator::default()
        .quote(&small_8km().with_share_partners(2), Locale::English)
        .unwrap();
    assert_eq!(quote.summary.total, "$14.22");
    assert_eq!(quote.summary.eta, "Same day");
    assert!(quote.summary.has_savings);
    assert_eq!(quote.summary.savings_amount, "$20.61");
    assert!(quote.summary.shared_delivery_available);
}

#[test]
fn test_invalid_distance() {
    let input = PricingInput::new(PackageSize::Small, f64::NAN, SpeedTier::Express);
    assert!(matches!(
        calculate_courier_price(&input),
        Err(PricingError::InvalidInput { field: "distance_km", .. })
    ));
}

#[test]
fn test_huge_distance_rejected_instead_of_overflowing() {
    let input = PricingInput::new(PackageSize::Small, 1e17, SpeedTier::Express);
    assert!(matches!(
        calculate_courier_price(&input),
        Err(PricingError::InvalidInput { field: "distance_km", .. })
    ));

    // distance line fits, the express surcharge pushes the subtotal out of range
    let input = PricingInput::new(PackageSize::Small, 8e12, SpeedTier::Express);
    assert!(matches!(
        calculate_courier_price(&input),
        Err(PricingError::InvalidInput { .. })
    ));

    assert!(matches!(
        calculate_delivery_fee(1e17, 0, DeliveryKind::Food),
        Err(PricingError::InvalidInput { field: "distance_km", .. })
    ));
}

#[test]
fn test_large_in_range_distance_reconciles() {
    let input = PricingInput::new(PackageSize::Small, 1e6, SpeedTier::Express);
    let price = calculate_courier_price(&input).unwrap();
    assert!(price.reconciles());
    assert!(price.total > price.subtotal);
}

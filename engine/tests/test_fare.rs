//! Taxi fare calculation tests
//!
//! Critical invariants tested:
//! - total == subtotal + gst + qst to the cent
//! - Minimum fare floors the taxable fare, regulatory fee never taxed
//! - GST and QST both computed on the fare subtotal (no tax on tax)
//! - Schedule pinned to the trip start time

use chrono::{NaiveDate, NaiveDateTime};
use fare_engine_core::core::money::Rate;
use fare_engine_core::core::tax::TaxConstants;
use fare_engine_core::fare::{calculate_fare, FareCalculator, TripMetrics};
use fare_engine_core::schedule::TaxiTariff;
use fare_engine_core::PricingError;

fn at(hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 5, 4)
        .unwrap()
        .and_hms_opt(hour, minute, 0)
        .unwrap()
}

// ============================================================================
// Reference scenarios
// ============================================================================

#[test]
fn test_day_fare_10km_2min() {
    let fare = calculate_fare(10.0, 2.0, false, at(14, 0)).unwrap();

    assert!(!fare.is_night_rate);
    assert_eq!(fare.base_fare, 350);
    assert_eq!(fare.distance_fare, 1900);
    assert_eq!(fare.waiting_fare, 140);
    assert_eq!(fare.airport_surcharge, 0);
    assert_eq!(fare.fare_subtotal, 2390);
    assert_eq!(fare.regulatory_fee, 90);
    assert_eq!(fare.subtotal, 2480);
    assert_eq!(fare.gst, 120);
    assert_eq!(fare.qst, 238);
    assert_eq!(fare.total_taxes, 358);
    assert_eq!(fare.total, 2838);
    assert!(fare.reconciles());
}

#[test]
fn test_night_fare_10km_2min() {
    let fare = calculate_fare(10.0, 2.0, false, at(23, 30)).unwrap();

    assert!(fare.is_night_rate);
    assert_eq!(fare.base_fare, 390);
    assert_eq!(fare.distance_fare, 2100);
    assert_eq!(fare.waiting_fare, 150);
    assert_eq!(fare.fare_subtotal, 2640);
    assert_eq!(fare.subtotal, 2730);
    assert_eq!(fare.gst, 132);
    assert_eq!(fare.qst, 263);
    assert_eq!(fare.total, 3125);
    assert!(fare.reconciles());
}

#[test]
fn test_airport_surcharge_is_taxed() {
    let fare = calculate_fare(10.0, 2.0, true, at(14, 0)).unwrap();
    assert_eq!(fare.airport_surcharge, 1750);
    assert_eq!(fare.fare_subtotal, 4140);
    assert_eq!(fare.gst, 207);
    assert_eq!(fare.qst, 413);
    assert_eq!(fare.total, 4850);
}

// ============================================================================
// Floors and fees
// ============================================================================

#[test]
fn test_minimum_fare_applies_before_regulatory_fee() {
    let fare = calculate_fare(0.0, 0.0, false, at(10, 0)).unwrap();
    assert!(fare.minimum_fare_applied());
    assert_eq!(fare.fare_subtotal, 700);
    assert_eq!(fare.subtotal, 790);
    assert_eq!(fare.gst, 35);
    assert_eq!(fare.qst, 70);
    assert_eq!(fare.total, 895);

    let night = calculate_fare(0.5, 0.0, false, at(2, 0)).unwrap();
    assert_eq!(night.fare_subtotal, 780);
}

#[test]
fn test_regulatory_fee_never_taxed() {
    let mut tariff = TaxiTariff::default();
    tariff.regulatory_fee = 0;
    let without_fee = FareCalculator::new(tariff, TaxConstants::default())
        .calculate(10.0, 2.0, false, at(14, 0))
        .unwrap();
    let with_fee = calculate_fare(10.0, 2.0, false, at(14, 0)).unwrap();

    assert_eq!(with_fee.gst, without_fee.gst);
    assert_eq!(with_fee.qst, without_fee.qst);
    assert_eq!(with_fee.total - without_fee.total, 90);
}

#[test]
fn test_qst_not_compounded_on_gst() {
    // With GST removed QST must be unchanged; compounding would lower it
    let taxes = TaxConstants {
        gst_rate: Rate::ZERO,
        ..TaxConstants::default()
    };
    let qst_only = FareCalculator::new(TaxiTariff::default(), taxes)
        .calculate(10.0, 2.0, false, at(14, 0))
        .unwrap();
    assert_eq!(qst_only.gst, 0);
    assert_eq!(qst_only.qst, 238);
}

// ============================================================================
// Schedule pinning and estimates
// ============================================================================

#[test]
fn test_trip_started_before_night_keeps_day_rate() {
    let trip = TripMetrics {
        distance_km: 15.0,
        waiting_minutes: 4.0,
        is_airport: false,
        trip_start_time: at(22, 59),
    };
    let fare = FareCalculator::default().calculate_trip(&trip).unwrap();
    assert!(!fare.is_night_rate);
    assert_eq!(fare.base_fare, 350);
}

#[test]
fn test_estimate_assumes_tenth_waiting() {
    let estimate = FareCalculator::default()
        .estimate(10.0, 20.0, at(14, 0))
        .unwrap();
    let exact = calculate_fare(10.0, 2.0, false, at(14, 0)).unwrap();
    assert_eq!(estimate, exact);
}

// ============================================================================
// Input validation
// ============================================================================

#[test]
fn test_invalid_inputs_rejected() {
    let cases = [
        (-1.0, 0.0, "distance_km"),
        (f64::NAN, 0.0, "distance_km"),
        (1.0, -0.5, "waiting_minutes"),
        (1.0, f64::INFINITY, "waiting_minutes"),
    ];
    for (distance, waiting, expected_field) in cases {
        match calculate_fare(distance, waiting, false, at(14, 0)) {
            Err(PricingError::InvalidInput { field, .. }) => assert_eq!(field, expected_field),
            other => panic!("expected InvalidInput, got {:?}", other),
        }
    }
    assert!(FareCalculator::default()
        .estimate(1.0, -3.0, at(14, 0))
        .is_err());
}

// ============================================================================
// Money range
// ============================================================================

#[test]
fn test_huge_distance_rejected_instead_of_overflowing() {
    match calculate_fare(1e17, 0.0, false, at(14, 0)) {
        Err(PricingError::InvalidInput { field, .. }) => assert_eq!(field, "distance_km"),
        other => panic!("expected InvalidInput, got {:?}", other),
    }
    match calculate_fare(1.0, 1e18, false, at(14, 0)) {
        Err(PricingError::InvalidInput { field, .. }) => assert_eq!(field, "waiting_minutes"),
        other => panic!("expected InvalidInput, got {:?}", other),
    }
}

#[test]
fn test_total_beyond_money_range_rejected() {
    // distance line alone fits, the taxed total does not
    match calculate_fare(5e12, 0.0, false, at(14, 0)) {
        Err(PricingError::InvalidInput { field, .. }) => assert_eq!(field, "total"),
        other => panic!("expected InvalidInput, got {:?}", other),
    }
}

#[test]
fn test_large_in_range_distance_reconciles() {
    let fare = calculate_fare(1e9, 0.0, false, at(14, 0)).unwrap();
    assert_eq!(fare.distance_fare, 190_000_000_000);
    assert!(fare.reconciles());
}

//! Meter checkpoint tests
//!
//! Critical invariants tested:
//! - Determinism: a restored meter finishes the trip exactly like the original
//! - Tariff matching: a snapshot is rejected under a different tariff
//! - Integrity: inconsistent snapshots are rejected

use chrono::{Duration, NaiveDate, NaiveDateTime};
use fare_engine_core::config::EngineConfig;
use fare_engine_core::fare::FareCalculator;
use fare_engine_core::meter::{MeterMode, MeterSnapshot, MeterTick, SharedMeter, TaxiMeter};
use fare_engine_core::schedule::TaxiTariff;
use fare_engine_core::PricingError;

fn start_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 11, 2)
        .unwrap()
        .and_hms_opt(8, 15, 0)
        .unwrap()
}

fn tick(secs: i64, speed: f64) -> MeterTick {
    MeterTick::new(start_time() + Duration::seconds(secs), speed)
}

fn drive(meter: &mut TaxiMeter, from: i64, to: i64) {
    for i in from..to {
        meter.tick(tick(i, if i % 90 < 60 { 42.0 } else { 4.0 }));
    }
}

#[test]
fn test_restored_meter_matches_uninterrupted_run() {
    let mut original = TaxiMeter::default();
    original.start(start_time(), false).unwrap();
    drive(&mut original, 1, 400);

    let json = original.snapshot().unwrap().to_json().unwrap();
    let snapshot = MeterSnapshot::from_json(&json).unwrap();
    let mut restored = TaxiMeter::restore(TaxiTariff::default(), snapshot).unwrap();
    assert_eq!(restored.state(), original.state());
    assert_eq!(restored.events(), original.events());

    drive(&mut original, 400, 900);
    drive(&mut restored, 400, 900);
    let a = original.stop().unwrap();
    let b = restored.stop().unwrap();
    assert_eq!(a, b);

    let calculator = FareCalculator::default();
    assert_eq!(
        original.current_fare(&calculator).unwrap(),
        restored.current_fare(&calculator).unwrap()
    );
}

#[test]
fn test_restore_rejects_other_tariff() {
    let mut meter = TaxiMeter::default();
    meter.start(start_time(), true).unwrap();
    let snapshot = meter.snapshot().unwrap();

    let mut tariff = TaxiTariff::default();
    tariff.airport_surcharge = 2000;
    match TaxiMeter::restore(tariff, snapshot) {
        Err(PricingError::ConfigMismatch { expected, actual }) => assert_ne!(expected, actual),
        other => panic!("expected ConfigMismatch, got {:?}", other),
    }
}

#[test]
fn test_restore_under_loaded_config() {
    let config = EngineConfig::from_json_str(r#"{"taxes": {"gst_rate": 0.05, "qst_rate": 0.1}}"#)
        .unwrap();
    let mut meter = TaxiMeter::new(config.taxi.clone());
    meter.start(start_time(), false).unwrap();
    let snapshot = meter.snapshot().unwrap();

    // Only the tariff is pinned; tax changes do not invalidate a snapshot
    assert!(TaxiMeter::restore(TaxiTariff::default(), snapshot).is_ok());
}

#[test]
fn test_restore_rejects_inconsistent_state() {
    let meter = TaxiMeter::default();
    let json = meter.snapshot().unwrap().to_json().unwrap();
    let tampered = json.replace(r#""mode":"stopped""#, r#""mode":"waiting""#);
    assert_ne!(tampered, json);

    let snapshot = MeterSnapshot::from_json(&tampered).unwrap();
    assert!(matches!(
        TaxiMeter::restore(TaxiTariff::default(), snapshot),
        Err(PricingError::InvalidInput { field: "snapshot", .. })
    ));
}

#[test]
fn test_paused_state_survives_checkpoint() {
    let mut meter = TaxiMeter::default();
    meter.start(start_time(), false).unwrap();
    drive(&mut meter, 1, 10);
    meter.pause().unwrap();

    let restored = TaxiMeter::restore(TaxiTariff::default(), meter.snapshot().unwrap()).unwrap();
    assert!(restored.state().is_paused());
    assert_ne!(restored.mode(), MeterMode::Stopped);
}

#[test]
fn test_shared_meter_snapshot() {
    let shared = SharedMeter::new(TaxiMeter::default());
    shared.with(|meter| meter.start(start_time(), false)).unwrap();
    shared.tick(tick(1, 50.0));

    let snapshot = shared.with(|meter| meter.snapshot()).unwrap();
    assert_eq!(snapshot.state.ticks_accepted(), 1);
    assert_eq!(shared.state(), snapshot.state);
}

//! Python bindings
//!
//! Exposes the calculators as plain functions returning dicts; amounts stay
//! in integer cents on the Python side.
//!
//! ```python
//! from fare_engine_core import calculate_fare, format_currency
//!
//! fare = calculate_fare(10.0, 2.0, False, "2026-05-04T14:00:00")
//! print(format_currency(fare["total"], "fr"))  # 28,38 $
//! ```

pub mod types;

use chrono::NaiveDateTime;
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::PyDict;

use crate::courier::CourierPricingCalculator;
use crate::fare::FareCalculator;
use crate::format::Locale;
use types::{courier_breakdown_to_py, fare_breakdown_to_py, parse_pricing_input, to_py_err};

/// Price a taxi trip; `trip_start` is a local ISO 8601 timestamp
#[pyfunction]
#[pyo3(signature = (distance_km, waiting_minutes, is_airport, trip_start))]
pub fn calculate_fare(
    py: Python<'_>,
    distance_km: f64,
    waiting_minutes: f64,
    is_airport: bool,
    trip_start: &str,
) -> PyResult<Py<PyDict>> {
    let trip_start: NaiveDateTime = trip_start
        .parse()
        .map_err(|e| PyValueError::new_err(format!("Invalid trip_start '{}': {}", trip_start, e)))?;
    let fare = FareCalculator::default()
        .calculate(distance_km, waiting_minutes, is_airport, trip_start)
        .map_err(to_py_err)?;
    fare_breakdown_to_py(py, &fare)
}

/// Price a courier delivery described by a dict of pricing inputs
#[pyfunction]
pub fn calculate_courier_price(py: Python<'_>, input: &Bound<'_, PyDict>) -> PyResult<Py<PyDict>> {
    let input = parse_pricing_input(input)?;
    let price = CourierPricingCalculator::default()
        .calculate(&input)
        .map_err(to_py_err)?;
    courier_breakdown_to_py(py, &price)
}

#[pyfunction]
#[pyo3(signature = (cents, locale = "fr"))]
pub fn format_currency(cents: i64, locale: &str) -> PyResult<String> {
    let locale: Locale = locale.parse().map_err(to_py_err)?;
    Ok(crate::format::format_currency(cents, locale))
}

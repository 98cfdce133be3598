//! Type conversion utilities for FFI boundary
//!
//! Converts between Rust types and Python dicts.

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::PyDict;
use std::str::FromStr;

use crate::courier::{CourierPriceBreakdown, PricingInput};
use crate::error::PricingError;
use crate::fare::FareBreakdown;

pub fn to_py_err(err: PricingError) -> PyErr {
    PyValueError::new_err(err.to_string())
}

// ========================================================================
// PyDict Extraction Helpers
// ========================================================================

/// Extract a required field, failing with ValueError when it is missing
fn extract_required<'py, T>(dict: &Bound<'py, PyDict>, key: &str) -> PyResult<T>
where
    T: FromPyObject<'py>,
{
    dict.get_item(key)?
        .ok_or_else(|| PyValueError::new_err(format!("Missing required field '{}'", key)))?
        .extract()
}

/// Extract a field, falling back to `default` when missing
fn extract_with_default<'py, T>(dict: &Bound<'py, PyDict>, key: &str, default: T) -> PyResult<T>
where
    T: FromPyObject<'py>,
{
    match dict.get_item(key)? {
        Some(value) => value.extract(),
        None => Ok(default),
    }
}

/// Extract an enum given by its snake_case name
fn extract_enum<T>(dict: &Bound<'_, PyDict>, key: &str) -> PyResult<Option<T>>
where
    T: FromStr<Err = PricingError>,
{
    match dict.get_item(key)? {
        Some(value) => {
            let name: String = value.extract()?;
            name.parse().map(Some).map_err(to_py_err)
        }
        None => Ok(None),
    }
}

// ========================================================================
// Parsers
// ========================================================================

/// Convert a Python dict to a courier `PricingInput`
///
/// `package_size`, `distance_km` and `speed_tier` are required; every
/// other field takes its default when absent.
pub fn parse_pricing_input(py_input: &Bound<'_, PyDict>) -> PyResult<PricingInput> {
    let package_size = extract_enum(py_input, "package_size")?
        .ok_or_else(|| PyValueError::new_err("Missing required field 'package_size'"))?;
    let speed_tier = extract_enum(py_input, "speed_tier")?
        .ok_or_else(|| PyValueError::new_err("Missing required field 'speed_tier'"))?;
    let distance_km: f64 = extract_required(py_input, "distance_km")?;

    let mut input = PricingInput::new(package_size, distance_km, speed_tier);
    input.is_fragile = extract_with_default(py_input, "is_fragile", false)?;
    input.signature_required = extract_with_default(py_input, "signature_required", false)?;
    input.can_share_route = extract_with_default(py_input, "can_share_route", false)?;
    input.share_partners = extract_with_default(py_input, "share_partners", 0u32)?;
    if let Some(time_of_day) = extract_enum(py_input, "time_of_day")? {
        input.time_of_day = time_of_day;
    }
    if let Some(weather) = extract_enum(py_input, "weather")? {
        input.weather = weather;
    }
    if let Some(level) = extract_enum(py_input, "insurance_level")? {
        input.insurance_level = level;
    }
    Ok(input)
}

// ========================================================================
// Result Converters
// ========================================================================

pub fn fare_breakdown_to_py(py: Python<'_>, fare: &FareBreakdown) -> PyResult<Py<PyDict>> {
    let dict = PyDict::new(py);

    dict.set_item("base_fare", fare.base_fare)?;
    dict.set_item("distance_fare", fare.distance_fare)?;
    dict.set_item("waiting_fare", fare.waiting_fare)?;
    dict.set_item("airport_surcharge", fare.airport_surcharge)?;
    dict.set_item("fare_subtotal", fare.fare_subtotal)?;
    dict.set_item("regulatory_fee", fare.regulatory_fee)?;
    dict.set_item("subtotal", fare.subtotal)?;
    dict.set_item("gst", fare.gst)?;
    dict.set_item("qst", fare.qst)?;
    dict.set_item("total_taxes", fare.total_taxes)?;
    dict.set_item("total", fare.total)?;
    dict.set_item("is_night_rate", fare.is_night_rate)?;

    Ok(dict.into())
}

pub fn courier_breakdown_to_py(
    py: Python<'_>,
    price: &CourierPriceBreakdown,
) -> PyResult<Py<PyDict>> {
    let dict = PyDict::new(py);

    dict.set_item("base_price", price.base_price)?;
    dict.set_item("distance_price", price.distance_price)?;
    dict.set_item("speed_surcharge", price.speed_surcharge)?;
    dict.set_item("time_surcharge", price.time_surcharge)?;
    dict.set_item("weather_surcharge", price.weather_surcharge)?;
    dict.set_item("fragile_fee", price.fragile_fee)?;
    dict.set_item("signature_fee", price.signature_fee)?;
    dict.set_item("insurance_fee", price.insurance_fee)?;
    dict.set_item("shared_discount", price.shared_discount)?;
    dict.set_item("subtotal", price.subtotal)?;
    dict.set_item("gst", price.gst)?;
    dict.set_item("qst", price.qst)?;
    dict.set_item("total_taxes", price.total_taxes)?;
    dict.set_item("total", price.total)?;
    dict.set_item("savings", price.savings)?;
    dict.set_item("speed_tier", price.speed_tier.as_str())?;
    dict.set_item("estimated_delivery", &price.estimated_delivery)?;
    dict.set_item("estimated_delivery_fr", &price.estimated_delivery_fr)?;

    Ok(dict.into())
}

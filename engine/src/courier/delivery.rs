//! Flat delivery fees
//!
//! The simpler fee rule used for food orders and quick courier estimates:
//! a base fee plus a per-km rate beyond the free allowance, with food orders
//! above a threshold delivered free. No regulatory fee applies to delivery.

use serde::{Deserialize, Serialize};

use crate::core::money::{checked_sum, price_quantity, Cents};
use crate::error::{ensure_non_negative, PricingError, PricingResult};

use super::calculator::CourierPricingCalculator;
use super::rates::PackageSize;

/// What is being delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "package_size", rename_all = "snake_case")]
pub enum DeliveryKind {
    Food,
    Courier(PackageSize),
}

/// Delivery fee with taxes (all amounts in cents)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryFeeBreakdown {
    /// Taxable delivery fee
    pub fee: Cents,
    pub gst: Cents,
    pub qst: Cents,
    pub total_taxes: Cents,
    pub total: Cents,
    /// Food order met the free-delivery threshold
    pub free_delivery: bool,
}

impl CourierPricingCalculator {
    /// Flat delivery fee for a food order or a courier package
    ///
    /// # Errors
    /// `InvalidInput` for a negative or non-finite distance or a negative
    /// order value.
    pub fn delivery_fee(
        &self,
        distance_km: f64,
        order_value: Cents,
        kind: DeliveryKind,
    ) -> PricingResult<DeliveryFeeBreakdown> {
        let distance_km = ensure_non_negative("distance_km", distance_km)?;
        if order_value < 0 {
            return Err(PricingError::InvalidInput {
                field: "order_value",
                reason: format!("{} is negative", order_value),
            });
        }

        let rates = self.rates();
        let per_km = rates.delivery.per_km;
        let distance_fee =
            price_quantity("distance_km", rates.distance.chargeable_km(distance_km), per_km)?;

        let (fee, free_delivery) = match kind {
            DeliveryKind::Courier(size) => (
                checked_sum("fee", &[rates.size_rate(size).base, distance_fee])?,
                false,
            ),
            DeliveryKind::Food if order_value >= rates.delivery.free_delivery_threshold => {
                (0, true)
            }
            DeliveryKind::Food => (
                checked_sum("fee", &[rates.delivery.food_base_fee, distance_fee])?,
                false,
            ),
        };

        let taxes = self.taxes().apply(fee)?;
        Ok(DeliveryFeeBreakdown {
            fee,
            gst: taxes.gst,
            qst: taxes.qst,
            total_taxes: taxes.total(),
            total: checked_sum("total", &[fee, taxes.total()])?,
            free_delivery,
        })
    }
}

/// Delivery fee with the default rate table and taxes
pub fn calculate_delivery_fee(
    distance_km: f64,
    order_value: Cents,
    kind: DeliveryKind,
) -> PricingResult<DeliveryFeeBreakdown> {
    CourierPricingCalculator::default().delivery_fee(distance_km, order_value, kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_food_under_threshold() {
        let fee = calculate_delivery_fee(5.0, 2000, DeliveryKind::Food).unwrap();
        // 4.99 + 2 km * 1.50
        assert_eq!(fee.fee, 799);
        assert!(!fee.free_delivery);
        assert_eq!(fee.total, fee.fee + fee.gst + fee.qst);
    }

    #[test]
    fn test_food_free_at_threshold() {
        let fee = calculate_delivery_fee(12.0, 3500, DeliveryKind::Food).unwrap();
        assert_eq!(fee.fee, 0);
        assert_eq!(fee.total, 0);
        assert!(fee.free_delivery);
    }

    #[test]
    fn test_courier_package_ignores_order_value() {
        let fee =
            calculate_delivery_fee(4.0, 10_000, DeliveryKind::Courier(PackageSize::Medium)).unwrap();
        assert_eq!(fee.fee, 1499 + 150);
    }

    #[test]
    fn test_negative_order_value_rejected() {
        assert!(calculate_delivery_fee(1.0, -1, DeliveryKind::Food).is_err());
    }
}

//! Sales tax primitives
//!
//! Quebec applies two sales taxes side by side: the federal GST (TPS) and
//! the provincial QST (TVQ). Both are computed on the same taxable base and
//! never on each other.

use serde::{Deserialize, Serialize};

use super::money::{Cents, Rate};
use crate::error::PricingResult;

/// GST / QST rates applied additively to a taxable subtotal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxConstants {
    /// Federal goods and services tax (TPS)
    pub gst_rate: Rate,
    /// Quebec sales tax (TVQ)
    pub qst_rate: Rate,
}

impl Default for TaxConstants {
    fn default() -> Self {
        Self {
            gst_rate: Rate::from_ppm(50_000), // 5%
            qst_rate: Rate::from_ppm(99_750), // 9.975%
        }
    }
}

/// Taxes owed on one taxable amount
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxAmounts {
    pub gst: Cents,
    pub qst: Cents,
}

impl TaxAmounts {
    pub fn total(&self) -> Cents {
        self.gst + self.qst
    }
}

impl TaxConstants {
    /// Combined rate (GST + QST), the only rate the total tax ever sees
    pub fn combined_rate(&self) -> Rate {
        self.gst_rate.plus(self.qst_rate)
    }

    /// Split the tax on `taxable` into its GST and QST lines
    ///
    /// The combined tax is rounded once at the combined rate; GST is rounded
    /// on its own and QST takes the remainder. `gst + qst` always equals the
    /// combined tax to the cent.
    ///
    /// The QST line is therefore NOT always `round(taxable * qst_rate)`: it
    /// can be one cent above or below that standalone value. On a base of
    /// 10¢ the combined tax is 1¢ and GST rounds to 1¢, so QST is 0¢ even
    /// though 9.975% of 10¢ alone would round to 1¢.
    ///
    /// # Example
    /// ```
    /// use fare_engine_core::core::tax::TaxConstants;
    ///
    /// let taxes = TaxConstants::default().apply(2390).unwrap();
    /// assert_eq!(taxes.gst, 120);
    /// assert_eq!(taxes.qst, 238);
    ///
    /// let small = TaxConstants::default().apply(10).unwrap();
    /// assert_eq!((small.gst, small.qst), (1, 0));
    /// ```
    ///
    /// # Errors
    /// `InvalidInput` if a tax line exceeds the money range.
    pub fn apply(&self, taxable: Cents) -> PricingResult<TaxAmounts> {
        let combined = self.combined_rate().apply("taxes", taxable)?;
        let gst = self.gst_rate.apply("gst", taxable)?;
        Ok(TaxAmounts {
            gst,
            qst: combined - gst,
        })
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.gst_rate.is_negative() || self.qst_rate.is_negative() {
            return Err("tax rates must be non-negative".to_string());
        }
        if self.combined_rate() > Rate::ONE {
            return Err("combined tax rate cannot exceed 100%".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quebec_rates() {
        let taxes = TaxConstants::default();
        assert_eq!(taxes.combined_rate(), Rate::from_ppm(149_750));
    }

    #[test]
    fn test_split_is_not_compounded() {
        let taxes = TaxConstants::default().apply(10_000).unwrap();
        assert_eq!(taxes.gst, 500);
        assert_eq!(taxes.qst, 998); // 997.5 -> 998 at the combined rate
        // compounding would have produced 5.00 + 10.47
        assert_eq!(taxes.total(), 1498);
    }

    #[test]
    fn test_zero_base() {
        let taxes = TaxConstants::default().apply(0).unwrap();
        assert_eq!(taxes, TaxAmounts { gst: 0, qst: 0 });
    }

    #[test]
    fn test_qst_line_can_differ_from_standalone_rounding() {
        let constants = TaxConstants::default();
        let taxes = constants.apply(10).unwrap();
        assert_eq!(taxes, TaxAmounts { gst: 1, qst: 0 });
        assert_eq!(constants.qst_rate.apply("qst", 10), Ok(1));
        assert_eq!(taxes.total(), constants.combined_rate().apply("taxes", 10).unwrap());
    }

    #[test]
    fn test_validate_rejects_negative() {
        let taxes = TaxConstants {
            gst_rate: Rate::from_ppm(-1),
            qst_rate: Rate::ZERO,
        };
        assert!(taxes.validate().is_err());
    }
}

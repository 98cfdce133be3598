//! Customer-facing courier quotes
//!
//! Pairs a price breakdown with the localized strings the booking screen
//! shows: formatted total, ETA and savings messaging.

use serde::{Deserialize, Serialize};

use crate::error::PricingResult;
use crate::format::{format_currency, Locale};

use super::calculator::{CourierPriceBreakdown, CourierPricingCalculator, PricingInput};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteSummary {
    pub total: String,
    pub eta: String,
    pub has_savings: bool,
    pub savings_amount: String,
    pub shared_delivery_available: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub price: CourierPriceBreakdown,
    pub summary: QuoteSummary,
}

impl CourierPricingCalculator {
    /// Price a delivery and render its summary for `locale`
    pub fn quote(&self, input: &PricingInput, locale: Locale) -> PricingResult<PriceQuote> {
        let price = self.calculate(input)?;
        let summary = QuoteSummary {
            total: format_currency(price.total, locale),
            eta: price.estimated_delivery(locale).to_string(),
            has_savings: price.savings > 0,
            savings_amount: format_currency(price.savings, locale),
            shared_delivery_available: price.shared_discount > 0,
        };
        Ok(PriceQuote { price, summary })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::courier::{PackageSize, SpeedTier};

    #[test]
    fn test_french_quote() {
        let input = PricingInput::new(PackageSize::Small, 8.0, SpeedTier::Standard);
        let quote = CourierPricingCalculator::default()
            .quote(&input, Locale::French)
            .unwrap();
        assert_eq!(quote.summary.total, "18,96 $");
        assert_eq!(quote.summary.eta, "Même jour");
        assert!(!quote.summary.shared_delivery_available);
    }

    #[test]
    fn test_shared_quote_flags_discount() {
        let input =
            PricingInput::new(PackageSize::Small, 8.0, SpeedTier::Standard).with_share_partners(1);
        let quote = CourierPricingCalculator::default()
            .quote(&input, Locale::English)
            .unwrap();
        assert!(quote.summary.shared_delivery_available);
        assert!(quote.summary.has_savings);
        assert!(quote.summary.savings_amount.starts_with('$'));
    }
}

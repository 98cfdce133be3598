//! Courier and delivery pricing

pub mod calculator;
pub mod delivery;
pub mod quote;
pub mod rates;

pub use calculator::{
    calculate_courier_price, CourierPriceBreakdown, CourierPricingCalculator, PricingInput,
};
pub use delivery::{calculate_delivery_fee, DeliveryFeeBreakdown, DeliveryKind};
pub use quote::{PriceQuote, QuoteSummary};
pub use rates::{
    CourierRates, InsuranceLevel, PackageSize, SizeRate, SpeedTier, TimeOfDay, Weather,
};

//! Plain-text output

use fare_engine_core::courier::{DeliveryFeeBreakdown, PriceQuote};
use fare_engine_core::format::{format_currency, format_distance, format_duration, Locale};
use fare_engine_core::meter::TaxiMeter;
use fare_engine_core::{Cents, FareBreakdown};

fn line(label: &str, amount: Cents, locale: Locale) -> String {
    format!("{:<24}{:>12}\n", label, format_currency(amount, locale))
}

fn pick(locale: Locale, fr: &'static str, en: &'static str) -> &'static str {
    match locale {
        Locale::French => fr,
        Locale::English => en,
    }
}

pub fn fare(fare: &FareBreakdown, locale: Locale) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{}: {}\n",
        pick(locale, "Tarif", "Rate"),
        match (fare.is_night_rate, locale) {
            (true, Locale::French) => "B (nuit)",
            (true, Locale::English) => "B (night)",
            (false, Locale::French) => "A (jour)",
            (false, Locale::English) => "A (day)",
        }
    ));
    out.push_str(&line(pick(locale, "Prise en charge", "Base fare"), fare.base_fare, locale));
    out.push_str(&line("Distance", fare.distance_fare, locale));
    out.push_str(&line(pick(locale, "Attente", "Waiting time"), fare.waiting_fare, locale));
    if fare.airport_surcharge > 0 {
        out.push_str(&line(
            pick(locale, "Supplément aéroport", "Airport surcharge"),
            fare.airport_surcharge,
            locale,
        ));
    }
    if fare.minimum_fare_applied() {
        out.push_str(pick(locale, "(tarif minimum)\n", "(minimum fare)\n"));
    }
    out.push_str(&line(pick(locale, "Sous-total course", "Fare subtotal"), fare.fare_subtotal, locale));
    out.push_str(&line(pick(locale, "TPS", "GST"), fare.gst, locale));
    out.push_str(&line(pick(locale, "TVQ", "QST"), fare.qst, locale));
    out.push_str(&line(
        pick(locale, "Redevance réglementaire", "Regulatory fee"),
        fare.regulatory_fee,
        locale,
    ));
    out.push_str(&line("TOTAL", fare.total, locale));
    out
}

pub fn quote(quote: &PriceQuote, locale: Locale) -> String {
    let price = &quote.price;
    let mut out = String::new();
    out.push_str(&line(pick(locale, "Prix de base", "Base price"), price.base_price, locale));
    out.push_str(&line("Distance", price.distance_price, locale));
    if price.speed_surcharge != 0 {
        out.push_str(&line(pick(locale, "Vitesse", "Speed"), price.speed_surcharge, locale));
    }
    if price.time_surcharge != 0 {
        out.push_str(&line(pick(locale, "Heure", "Time of day"), price.time_surcharge, locale));
    }
    if price.weather_surcharge != 0 {
        out.push_str(&line(pick(locale, "Météo", "Weather"), price.weather_surcharge, locale));
    }
    if price.fragile_fee != 0 {
        out.push_str(&line(pick(locale, "Fragile", "Fragile"), price.fragile_fee, locale));
    }
    if price.signature_fee != 0 {
        out.push_str(&line("Signature", price.signature_fee, locale));
    }
    if price.insurance_fee != 0 {
        out.push_str(&line(pick(locale, "Assurance", "Insurance"), price.insurance_fee, locale));
    }
    if price.shared_discount != 0 {
        out.push_str(&line(
            pick(locale, "Rabais partage", "Shared discount"),
            -price.shared_discount,
            locale,
        ));
    }
    out.push_str(&line(pick(locale, "Sous-total", "Subtotal"), price.subtotal, locale));
    out.push_str(&line(pick(locale, "TPS", "GST"), price.gst, locale));
    out.push_str(&line(pick(locale, "TVQ", "QST"), price.qst, locale));
    out.push_str(&format!("{:<24}{:>12}\n", "TOTAL", quote.summary.total));
    out.push_str(&format!(
        "{}: {}\n",
        pick(locale, "Livraison", "Delivery"),
        quote.summary.eta
    ));
    if quote.summary.has_savings {
        out.push_str(&format!(
            "{}: {}\n",
            pick(locale, "Économies", "Savings"),
            quote.summary.savings_amount
        ));
    }
    out
}

pub fn delivery(fee: &DeliveryFeeBreakdown, locale: Locale) -> String {
    let mut out = String::new();
    if fee.free_delivery {
        out.push_str(pick(locale, "Livraison gratuite\n", "Free delivery\n"));
    }
    out.push_str(&line(pick(locale, "Frais de livraison", "Delivery fee"), fee.fee, locale));
    out.push_str(&line(pick(locale, "TPS", "GST"), fee.gst, locale));
    out.push_str(&line(pick(locale, "TVQ", "QST"), fee.qst, locale));
    out.push_str(&line("TOTAL", fee.total, locale));
    out
}

/// Trip summary after replaying a trace
pub fn trip(meter: &TaxiMeter, locale: Locale) -> String {
    let state = meter.state();
    let mut out = String::new();
    out.push_str(&format!(
        "{}: {}\n",
        pick(locale, "Distance", "Distance"),
        format_distance(state.accumulated_distance_km(), locale)
    ));
    out.push_str(&format!(
        "{}: {}\n",
        pick(locale, "Attente", "Waiting"),
        format_duration(state.accumulated_waiting_minutes(), locale)
    ));
    out.push_str(&format!(
        "{}: {} / {}\n",
        pick(locale, "Échantillons acceptés", "Samples accepted"),
        state.ticks_accepted(),
        state.ticks_accepted() as usize + meter.events().events_of_type("TickRejected").len()
    ));
    out.push_str(&format!(
        "{}: {}\n",
        pick(locale, "Changements de mode", "Mode changes"),
        meter.events().mode_changes().len()
    ));
    out
}

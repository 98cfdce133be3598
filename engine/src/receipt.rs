//! Taxi receipts
//!
//! A receipt carries the regulatory identification of the ride (driver
//! permit, plate, tax registrations) alongside the frozen trip metrics and
//! the itemized fare. The fingerprint lets anyone recompute the fare from
//! the recorded metrics and check that nothing was altered.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::str::FromStr;
use uuid::Uuid;

use crate::core::hash::content_hash;
use crate::error::{PricingError, PricingResult};
use crate::fare::{FareBreakdown, TripMetrics};
use crate::format::{format_currency, format_distance, format_duration, Locale};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Card,
}

impl PaymentMethod {
    pub fn label(&self, locale: Locale) -> &'static str {
        match (self, locale) {
            (PaymentMethod::Cash, Locale::French) => "Comptant",
            (PaymentMethod::Cash, Locale::English) => "Cash",
            (PaymentMethod::Card, Locale::French) => "Carte",
            (PaymentMethod::Card, Locale::English) => "Card",
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = PricingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cash" => Ok(PaymentMethod::Cash),
            "card" => Ok(PaymentMethod::Card),
            other => Err(PricingError::invalid(
                "payment_method",
                format!("unknown payment method '{}'", other),
            )),
        }
    }
}

/// Who drove, in what vehicle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverInfo {
    pub name: String,
    pub permit_number: String,
    pub vehicle_plate: String,
    #[serde(default)]
    pub company: Option<String>,
}

/// GST and QST registration numbers of the operator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxRegistration {
    pub gst_number: String,
    pub qst_number: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxiReceipt {
    pub receipt_number: String,
    pub issued_at: DateTime<Utc>,
    pub driver: DriverInfo,
    pub pickup_address: String,
    pub dropoff_address: String,
    pub metrics: TripMetrics,
    pub fare: FareBreakdown,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub tax_registration: Option<TaxRegistration>,
}

/// The part of a receipt that the fingerprint covers
#[derive(Serialize)]
struct FingerprintInput<'a> {
    metrics: &'a TripMetrics,
    fare: &'a FareBreakdown,
}

/// `QC-<issue epoch millis in base 36>-<4 random chars>`
pub fn receipt_number(issued_at: DateTime<Utc>) -> String {
    let millis = issued_at.timestamp_millis().max(0) as u64;
    let suffix: String = Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .take(4)
        .collect();
    format!("QC-{}-{}", to_base36(millis), suffix.to_ascii_uppercase())
}

fn to_base36(mut value: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
    if value == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.iter().rev().map(|&b| b as char).collect()
}

struct Labels {
    title: &'static str,
    number: &'static str,
    date: &'static str,
    driver: &'static str,
    permit: &'static str,
    vehicle: &'static str,
    company: &'static str,
    pickup: &'static str,
    dropoff: &'static str,
    distance: &'static str,
    waiting: &'static str,
    tariff: &'static str,
    tariff_day: &'static str,
    tariff_night: &'static str,
    base_fare: &'static str,
    distance_fare: &'static str,
    waiting_fare: &'static str,
    airport: &'static str,
    minimum_adjustment: &'static str,
    fare_subtotal: &'static str,
    gst: &'static str,
    qst: &'static str,
    regulatory_fee: &'static str,
    total: &'static str,
    payment: &'static str,
    gst_number: &'static str,
    qst_number: &'static str,
}

const FRENCH: Labels = Labels {
    title: "REÇU DE TAXI",
    number: "No de reçu",
    date: "Date",
    driver: "Chauffeur",
    permit: "permis",
    vehicle: "Véhicule",
    company: "Entreprise",
    pickup: "Départ",
    dropoff: "Arrivée",
    distance: "Distance",
    waiting: "Attente",
    tariff: "Tarif",
    tariff_day: "A (jour)",
    tariff_night: "B (nuit)",
    base_fare: "Prise en charge",
    distance_fare: "Distance",
    waiting_fare: "Attente",
    airport: "Supplément aéroport",
    minimum_adjustment: "Ajustement tarif minimum",
    fare_subtotal: "Sous-total course",
    gst: "TPS",
    qst: "TVQ",
    regulatory_fee: "Redevance réglementaire",
    total: "TOTAL",
    payment: "Paiement",
    gst_number: "No TPS",
    qst_number: "No TVQ",
};

const ENGLISH: Labels = Labels {
    title: "TAXI RECEIPT",
    number: "Receipt no.",
    date: "Date",
    driver: "Driver",
    permit: "permit",
    vehicle: "Vehicle",
    company: "Company",
    pickup: "Pickup",
    dropoff: "Dropoff",
    distance: "Distance",
    waiting: "Waiting",
    tariff: "Rate",
    tariff_day: "A (day)",
    tariff_night: "B (night)",
    base_fare: "Base fare",
    distance_fare: "Distance",
    waiting_fare: "Waiting time",
    airport: "Airport surcharge",
    minimum_adjustment: "Minimum fare adjustment",
    fare_subtotal: "Fare subtotal",
    gst: "GST",
    qst: "QST",
    regulatory_fee: "Regulatory fee",
    total: "TOTAL",
    payment: "Payment",
    gst_number: "GST no.",
    qst_number: "QST no.",
};

impl TaxiReceipt {
    /// Issue a receipt with a fresh receipt number
    pub fn issue(
        driver: DriverInfo,
        pickup_address: impl Into<String>,
        dropoff_address: impl Into<String>,
        metrics: TripMetrics,
        fare: FareBreakdown,
        payment_method: PaymentMethod,
        issued_at: DateTime<Utc>,
    ) -> Self {
        Self {
            receipt_number: receipt_number(issued_at),
            issued_at,
            driver,
            pickup_address: pickup_address.into(),
            dropoff_address: dropoff_address.into(),
            metrics,
            fare,
            payment_method,
            tax_registration: None,
        }
    }

    pub fn with_tax_registration(mut self, registration: TaxRegistration) -> Self {
        self.tax_registration = Some(registration);
        self
    }

    /// SHA256 over the canonical JSON of the trip metrics and fare
    ///
    /// Identification fields (number, driver, addresses) are excluded, so
    /// pricing the same metrics again reproduces the fingerprint.
    pub fn fingerprint(&self) -> PricingResult<String> {
        content_hash(&FingerprintInput {
            metrics: &self.metrics,
            fare: &self.fare,
        })
    }

    /// Printable receipt text
    pub fn render(&self, locale: Locale) -> String {
        let labels = match locale {
            Locale::French => &FRENCH,
            Locale::English => &ENGLISH,
        };
        let money = |amount| format_currency(amount, locale);
        let fare = &self.fare;
        let mut out = String::new();

        // Writing into a String cannot fail
        let _ = writeln!(out, "{}", labels.title);
        let _ = writeln!(out, "{}: {}", labels.number, self.receipt_number);
        let _ = writeln!(
            out,
            "{}: {}",
            labels.date,
            self.metrics.trip_start_time.format("%Y-%m-%d %H:%M")
        );
        let _ = writeln!(
            out,
            "{}: {} ({} {})",
            labels.driver, self.driver.name, labels.permit, self.driver.permit_number
        );
        let _ = writeln!(out, "{}: {}", labels.vehicle, self.driver.vehicle_plate);
        if let Some(company) = &self.driver.company {
            let _ = writeln!(out, "{}: {}", labels.company, company);
        }
        let _ = writeln!(out, "{}: {}", labels.pickup, self.pickup_address);
        let _ = writeln!(out, "{}: {}", labels.dropoff, self.dropoff_address);
        let _ = writeln!(
            out,
            "{}: {}",
            labels.distance,
            format_distance(self.metrics.distance_km, locale)
        );
        let _ = writeln!(
            out,
            "{}: {}",
            labels.waiting,
            format_duration(self.metrics.waiting_minutes, locale)
        );
        let _ = writeln!(
            out,
            "{}: {}",
            labels.tariff,
            if fare.is_night_rate {
                labels.tariff_night
            } else {
                labels.tariff_day
            }
        );
        out.push('\n');

        let mut line = |label: &str, amount| {
            let _ = writeln!(out, "{:<28}{:>12}", label, money(amount));
        };
        line(labels.base_fare, fare.base_fare);
        line(labels.distance_fare, fare.distance_fare);
        line(labels.waiting_fare, fare.waiting_fare);
        if fare.airport_surcharge > 0 {
            line(labels.airport, fare.airport_surcharge);
        }
        if fare.minimum_fare_applied() {
            let metered =
                fare.base_fare + fare.distance_fare + fare.waiting_fare + fare.airport_surcharge;
            line(labels.minimum_adjustment, fare.fare_subtotal - metered);
        }
        line(labels.fare_subtotal, fare.fare_subtotal);
        line(labels.gst, fare.gst);
        line(labels.qst, fare.qst);
        line(labels.regulatory_fee, fare.regulatory_fee);
        line(labels.total, fare.total);

        out.push('\n');
        let _ = writeln!(
            out,
            "{}: {}",
            labels.payment,
            self.payment_method.label(locale)
        );
        if let Some(registration) = &self.tax_registration {
            let _ = writeln!(out, "{}: {}", labels.gst_number, registration.gst_number);
            let _ = writeln!(out, "{}: {}", labels.qst_number, registration.qst_number);
        }
        out
    }
}

//! Fare Engine CLI
//!
//! Quote taxi fares and courier deliveries, or replay a recorded meter
//! trace into a receipt.
//!
//! ```sh
//! # Day fare, 10 km with 2 minutes of waiting
//! fare-engine fare --distance-km 10 --waiting-minutes 2 --start 2026-05-04T14:00:00
//!
//! # Courier quote in English, as JSON
//! fare-engine --locale en --json courier --size small --distance-km 8 --tier standard
//!
//! # Rebuild a trip from recorded telemetry and print the receipt
//! fare-engine replay trip.json --receipt --driver "M. Tremblay" --permit T-1234 --plate TX-42
//! ```

mod error;
mod render;
mod telemetry;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use chrono::{Local, NaiveDateTime, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::info;

use fare_engine_core::core::money::from_dollars;
use fare_engine_core::courier::{
    CourierPricingCalculator, DeliveryKind, InsuranceLevel, PackageSize, PricingInput, SpeedTier,
    TimeOfDay, Weather,
};
use fare_engine_core::meter::{MeterCommand, TaxiMeter};
use fare_engine_core::receipt::{DriverInfo, PaymentMethod, TaxiReceipt};
use fare_engine_core::{EngineConfig, FareCalculator, Locale};

use error::CliError;

#[derive(Parser, Debug)]
#[command(
    name = "fare-engine",
    version,
    about = "Quebec taxi fare and courier pricing engine"
)]
struct Cli {
    /// Output locale (fr or en)
    #[arg(long, global = true, default_value = "fr")]
    locale: Locale,

    /// Engine configuration file (JSON); Quebec defaults when absent
    #[arg(long, global = true, env = "FARE_ENGINE_CONFIG")]
    config: Option<PathBuf>,

    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Price a completed taxi trip
    Fare(FareArgs),
    /// Estimate a taxi fare before the trip
    Estimate(EstimateArgs),
    /// Quote a courier delivery
    Courier(CourierArgs),
    /// Flat delivery fee for a food order or package
    Delivery(DeliveryArgs),
    /// Replay a recorded meter trace (JSON array of meter commands)
    Replay(ReplayArgs),
}

#[derive(Args, Debug)]
struct FareArgs {
    #[arg(long)]
    distance_km: f64,
    #[arg(long, default_value_t = 0.0)]
    waiting_minutes: f64,
    /// Trip to or from the airport
    #[arg(long)]
    airport: bool,
    /// Local trip start (YYYY-MM-DDTHH:MM[:SS]); defaults to now
    #[arg(long, value_parser = parse_datetime)]
    start: Option<NaiveDateTime>,
}

#[derive(Args, Debug)]
struct EstimateArgs {
    #[arg(long)]
    distance_km: f64,
    /// Expected travel time
    #[arg(long)]
    minutes: f64,
    /// Local departure time; defaults to now
    #[arg(long, value_parser = parse_datetime)]
    at: Option<NaiveDateTime>,
}

#[derive(Args, Debug)]
struct CourierArgs {
    #[arg(long)]
    size: PackageSize,
    #[arg(long)]
    distance_km: f64,
    #[arg(long, default_value = "standard")]
    tier: SpeedTier,
    #[arg(long)]
    fragile: bool,
    #[arg(long)]
    signature: bool,
    #[arg(long, default_value = "none")]
    insurance: InsuranceLevel,
    #[arg(long, default_value = "clear")]
    weather: Weather,
    /// Time-of-day band; derived from --at when omitted
    #[arg(long)]
    time_of_day: Option<TimeOfDay>,
    /// Local pickup time used to derive the time-of-day band
    #[arg(long, value_parser = parse_datetime)]
    at: Option<NaiveDateTime>,
    /// Other deliveries able to share the route
    #[arg(long, default_value_t = 0)]
    share_partners: u32,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum DeliveryItem {
    Food,
    Small,
    Medium,
    Large,
}

impl From<DeliveryItem> for DeliveryKind {
    fn from(item: DeliveryItem) -> Self {
        match item {
            DeliveryItem::Food => DeliveryKind::Food,
            DeliveryItem::Small => DeliveryKind::Courier(PackageSize::Small),
            DeliveryItem::Medium => DeliveryKind::Courier(PackageSize::Medium),
            DeliveryItem::Large => DeliveryKind::Courier(PackageSize::Large),
        }
    }
}

#[derive(Args, Debug)]
struct DeliveryArgs {
    #[arg(long)]
    distance_km: f64,
    #[arg(long, value_enum, default_value = "food")]
    kind: DeliveryItem,
    /// Order value in dollars
    #[arg(long, default_value_t = 0.0)]
    order_value: f64,
}

#[derive(Args, Debug)]
struct ReplayArgs {
    trace: PathBuf,
    /// Print a full receipt instead of the fare summary
    #[arg(long)]
    receipt: bool,
    #[arg(long, default_value = "")]
    driver: String,
    #[arg(long, default_value = "")]
    permit: String,
    #[arg(long, default_value = "")]
    plate: String,
    #[arg(long)]
    company: Option<String>,
    #[arg(long, default_value = "")]
    pickup: String,
    #[arg(long, default_value = "")]
    dropoff: String,
    #[arg(long, default_value = "card")]
    payment: PaymentMethod,
}

fn parse_datetime(value: &str) -> Result<NaiveDateTime, String> {
    const FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
    ];
    FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .ok_or_else(|| format!("expected YYYY-MM-DDTHH:MM[:SS], got '{}'", value))
}

fn now_local() -> NaiveDateTime {
    Local::now().naive_local()
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig, CliError> {
    match path {
        Some(path) => {
            let config = EngineConfig::from_json_file(path)?;
            info!(path = %path.display(), "configuration loaded");
            Ok(config)
        }
        None => Ok(EngineConfig::default()),
    }
}

fn load_trace(path: &Path) -> Result<Vec<MeterCommand>, CliError> {
    let raw = std::fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| CliError::Trace {
        path: path.to_path_buf(),
        source,
    })
}

fn run(cli: Cli) -> Result<String, CliError> {
    let config = load_config(cli.config.as_deref())?;
    let locale = cli.locale;

    match cli.command {
        Command::Fare(args) => {
            let start = args.start.unwrap_or_else(now_local);
            let fare = FareCalculator::from_config(&config).calculate(
                args.distance_km,
                args.waiting_minutes,
                args.airport,
                start,
            )?;
            if cli.json {
                Ok(serde_json::to_string_pretty(&fare)?)
            } else {
                Ok(render::fare(&fare, locale))
            }
        }
        Command::Estimate(args) => {
            let at = args.at.unwrap_or_else(now_local);
            let fare = FareCalculator::from_config(&config).estimate(
                args.distance_km,
                args.minutes,
                at,
            )?;
            if cli.json {
                Ok(serde_json::to_string_pretty(&fare)?)
            } else {
                Ok(render::fare(&fare, locale))
            }
        }
        Command::Courier(args) => {
            let time_of_day = args
                .time_of_day
                .or_else(|| args.at.map(TimeOfDay::from_time))
                .unwrap_or_default();
            let mut input = PricingInput::new(args.size, args.distance_km, args.tier)
                .with_time_of_day(time_of_day)
                .with_weather(args.weather)
                .with_insurance(args.insurance);
            if args.fragile {
                input = input.fragile();
            }
            if args.signature {
                input = input.with_signature();
            }
            if args.share_partners > 0 {
                input = input.with_share_partners(args.share_partners);
            }

            let quote = CourierPricingCalculator::from_config(&config).quote(&input, locale)?;
            if cli.json {
                Ok(serde_json::to_string_pretty(&quote)?)
            } else {
                Ok(render::quote(&quote, locale))
            }
        }
        Command::Delivery(args) => {
            let fee = CourierPricingCalculator::from_config(&config).delivery_fee(
                args.distance_km,
                from_dollars("order_value", args.order_value)?,
                args.kind.into(),
            )?;
            if cli.json {
                Ok(serde_json::to_string_pretty(&fee)?)
            } else {
                Ok(render::delivery(&fee, locale))
            }
        }
        Command::Replay(args) => replay(&config, &args, locale, cli.json),
    }
}

fn replay(
    config: &EngineConfig,
    args: &ReplayArgs,
    locale: Locale,
    json: bool,
) -> Result<String, CliError> {
    let commands = load_trace(&args.trace)?;
    let meter = TaxiMeter::replay(config.taxi.clone(), &commands)?;
    info!(
        commands = commands.len(),
        events = meter.events().len(),
        "trace replayed"
    );

    let metrics = meter.metrics().ok_or_else(|| {
        CliError::Pricing(fare_engine_core::PricingError::InvalidState {
            command: "price",
            state: meter.mode().to_string(),
        })
    })?;
    let fare = FareCalculator::from_config(config).calculate_trip(&metrics)?;

    if args.receipt {
        let driver = DriverInfo {
            name: args.driver.clone(),
            permit_number: args.permit.clone(),
            vehicle_plate: args.plate.clone(),
            company: args.company.clone(),
        };
        let receipt = TaxiReceipt::issue(
            driver,
            args.pickup.as_str(),
            args.dropoff.as_str(),
            metrics,
            fare,
            args.payment,
            Utc::now(),
        );
        return if json {
            Ok(serde_json::to_string_pretty(&serde_json::json!({
                "receipt": receipt,
                "fingerprint": receipt.fingerprint()?,
            }))?)
        } else {
            Ok(receipt.render(locale))
        };
    }

    if json {
        Ok(serde_json::to_string_pretty(&serde_json::json!({
            "metrics": metrics,
            "fare": fare,
            "events": meter.events().events(),
        }))?)
    } else {
        Ok(format!(
            "{}\n{}",
            render::trip(&meter, locale),
            render::fare(&fare, locale)
        ))
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(err) = telemetry::init(&cli.log_level) {
        eprintln!("error: {err}");
        return ExitCode::FAILURE;
    }

    match run(cli) {
        Ok(output) => {
            println!("{}", output.trim_end());
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_datetime_formats() {
        let expected = parse_datetime("2026-05-04T14:00:00").unwrap();
        assert_eq!(parse_datetime("2026-05-04T14:00").unwrap(), expected);
        assert_eq!(parse_datetime("2026-05-04 14:00").unwrap(), expected);
        assert!(parse_datetime("04/05/2026").is_err());
    }

    #[test]
    fn test_courier_args() {
        let cli = Cli::try_parse_from([
            "fare-engine",
            "--locale",
            "en",
            "courier",
            "--size",
            "small",
            "--distance-km",
            "8",
            "--share-partners",
            "2",
        ])
        .unwrap();
        assert_eq!(cli.locale, Locale::English);
        match cli.command {
            Command::Courier(args) => {
                assert_eq!(args.size, PackageSize::Small);
                assert_eq!(args.tier, SpeedTier::Standard);
                assert_eq!(args.share_partners, 2);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_unknown_enum_rejected() {
        let parsed = Cli::try_parse_from([
            "fare-engine",
            "courier",
            "--size",
            "huge",
            "--distance-km",
            "1",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_fare_command_output() {
        let cli = Cli::try_parse_from([
            "fare-engine",
            "--locale",
            "en",
            "fare",
            "--distance-km",
            "10",
            "--waiting-minutes",
            "2",
            "--start",
            "2026-05-04T14:00",
        ])
        .unwrap();
        let output = run(cli).unwrap();
        assert!(output.contains("A (day)"));
        assert!(output.contains("$28.38"));
    }

    #[test]
    fn test_delivery_json_output() {
        let cli = Cli::try_parse_from([
            "fare-engine",
            "--json",
            "delivery",
            "--distance-km",
            "2",
            "--order-value",
            "40",
        ])
        .unwrap();
        let output = run(cli).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["free_delivery"], true);
        assert_eq!(value["total"], 0);
    }
}

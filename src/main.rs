mod airlines;
mod allocator;
mod amadeus;
mod config;
mod error;
mod flights;
mod hotels;
mod http;
mod llm;
mod metrics;
mod otel;
mod places;
mod planner;
mod prompt;
mod trip;
mod weather;

use allocator::{HotelCandidate, RankedHotel};
use anyhow::Context;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use config::PlannerConfig;
use dotenv::dotenv;
use error::PlannerError;
use planner::{BudgetSettings, TripPlan, TripPlanner};
use serde::Deserialize;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};
use trip::TripRequest;

#[derive(Parser)]
#[command(name = "trip-planner")]
#[command(about = "Plan a trip within budget: flights, hotels, weather and an AI itinerary")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Look up flights, hotels, weather and attractions, then write an itinerary
    Plan {
        /// Number of people traveling
        #[arg(long)]
        travelers: u32,
        /// Departure airport code (e.g. LHR)
        #[arg(long)]
        from: String,
        /// Destination airport code (e.g. JFK)
        #[arg(long)]
        to: String,
        /// Destination city name
        #[arg(long)]
        city: String,
        /// Total budget for the trip
        #[arg(long)]
        budget: f64,
        /// Departure date (YYYY-MM-DD)
        #[arg(long)]
        depart: NaiveDate,
        /// Return date (YYYY-MM-DD)
        #[arg(long = "return")]
        return_date: NaiveDate,
        #[command(flatten)]
        budget_rules: BudgetArgs,
        /// Print the prompt instead of calling the language model
        #[arg(long)]
        dry_run: bool,
        /// Print the full plan as JSON
        #[arg(long)]
        json: bool,
    },
    /// Rank hotels from a JSON file against a budget without any network calls
    Rank {
        /// Total budget for the trip
        #[arg(long)]
        budget: f64,
        /// Round-trip flight cost
        #[arg(long)]
        flight_cost: f64,
        /// Number of nights
        #[arg(long)]
        nights: u32,
        /// JSON array of {"name", "price", "url"} objects
        #[arg(long)]
        hotels: PathBuf,
        /// Amount deducted per night before comparing prices
        #[arg(long, env = "TRIP_DAILY_OVERHEAD", default_value_t = 100.0)]
        daily_overhead: f64,
        /// Number of hotels to show (0 shows all)
        #[arg(long, env = "TRIP_TOP_K", default_value_t = 0)]
        top_k: usize,
    },
}

#[derive(Args)]
struct BudgetArgs {
    /// Amount deducted per night before comparing hotel prices
    #[arg(long, env = "TRIP_DAILY_OVERHEAD", default_value_t = 100.0)]
    daily_overhead: f64,
    /// Estimated price of one meal per person
    #[arg(long, env = "TRIP_MEAL_PRICE", default_value_t = 20.0)]
    meal_price: f64,
    /// Meals per person per day counted in the estimate
    #[arg(long, env = "TRIP_MEALS_PER_DAY", default_value_t = 2)]
    meals_per_day: u32,
    /// Number of hotels to recommend
    #[arg(long, env = "TRIP_TOP_K", default_value_t = 1)]
    top_k: usize,
}

impl From<&BudgetArgs> for BudgetSettings {
    fn from(args: &BudgetArgs) -> Self {
        BudgetSettings {
            daily_overhead: args.daily_overhead,
            daily_meal_rate: args.meal_price * f64::from(args.meals_per_day),
            top_k: args.top_k,
        }
    }
}

/// Hotel entry in a `rank` input file; prices may be numbers or free-form text
#[derive(Debug, Deserialize)]
struct HotelEntry {
    name: String,
    #[serde(default)]
    price: Option<PriceField>,
    #[serde(default)]
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PriceField {
    Number(f64),
    Text(String),
}

impl From<HotelEntry> for HotelCandidate {
    fn from(entry: HotelEntry) -> Self {
        let price = match entry.price {
            Some(PriceField::Text(text)) => {
                return HotelCandidate::from_raw_price(entry.name, &text, entry.url);
            }
            Some(PriceField::Number(n)) if n.is_finite() && n >= 0.0 => Some(n),
            Some(PriceField::Number(_)) | None => None,
        };
        HotelCandidate {
            name: entry.name,
            price,
            url: entry.url,
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode, anyhow::Error> {
    dotenv().ok();
    let cli = Cli::parse();

    // OTEL graceful shutdown on success or error exit
    let _otel_guard = otel::init_otel()?;

    match cli.command {
        Commands::Plan {
            travelers,
            from,
            to,
            city,
            budget,
            depart,
            return_date,
            budget_rules,
            dry_run,
            json,
        } => {
            let result = run_plan(
                TripRequest::new(travelers, &from, &to, &city, budget, depart, return_date),
                BudgetSettings::from(&budget_rules),
                dry_run,
            )
            .await;
            match result {
                Ok(plan) => {
                    print_plan(&plan, json)?;
                    Ok(ExitCode::SUCCESS)
                }
                Err(e) => {
                    error!(kind = e.kind(), "Trip planning failed: {}", e);
                    eprintln!("{}", e.user_message());
                    Ok(ExitCode::FAILURE)
                }
            }
        }
        Commands::Rank {
            budget,
            flight_cost,
            nights,
            hotels,
            daily_overhead,
            top_k,
        } => {
            if let Err(e) = validate_rank_args(budget, flight_cost, nights) {
                error!(kind = e.kind(), "Hotel ranking failed: {}", e);
                eprintln!("{}", e.user_message());
                return Ok(ExitCode::FAILURE);
            }
            let raw = std::fs::read_to_string(&hotels)
                .with_context(|| format!("Failed to read {}", hotels.display()))?;
            let entries: Vec<HotelEntry> = serde_json::from_str(&raw)
                .with_context(|| format!("Failed to parse {}", hotels.display()))?;
            let candidates: Vec<HotelCandidate> = entries.into_iter().map(Into::into).collect();
            let ranked = allocator::rank(
                budget,
                flight_cost,
                nights,
                &candidates,
                daily_overhead,
                top_k,
            );
            let target = allocator::per_night_target(budget, flight_cost, nights, daily_overhead);
            print_ranking(target, &ranked);
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn run_plan(
    trip: Result<TripRequest, PlannerError>,
    budget: BudgetSettings,
    dry_run: bool,
) -> Result<TripPlan, PlannerError> {
    // Validate before any client is built or any request is sent
    let trip = trip?;
    let config = PlannerConfig::from_env()?;
    let planner = TripPlanner::from_config(&config, budget, dry_run).await?;
    info!(
        from = %trip.departure_airport,
        to = %trip.destination_airport,
        "Starting trip planner"
    );
    planner.plan(trip).await
}

/// Same rules `TripRequest::new` applies, for the inputs `rank` takes directly
fn validate_rank_args(budget: f64, flight_cost: f64, nights: u32) -> Result<(), PlannerError> {
    if !budget.is_finite() || budget <= 0.0 {
        return Err(PlannerError::InvalidTrip(
            "Budget must be a positive amount.".to_string(),
        ));
    }
    if !flight_cost.is_finite() || flight_cost < 0.0 {
        return Err(PlannerError::InvalidTrip(
            "Flight cost cannot be negative.".to_string(),
        ));
    }
    if nights == 0 {
        return Err(PlannerError::InvalidTrip(
            "The trip must last at least one night.".to_string(),
        ));
    }
    Ok(())
}

fn print_plan(plan: &TripPlan, json: bool) -> Result<(), anyhow::Error> {
    if json {
        println!("{}", serde_json::to_string_pretty(plan)?);
        return Ok(());
    }
    match &plan.itinerary {
        Some(itinerary) => {
            println!("Your AI-Generated Travel Plan:\n");
            println!("{}", itinerary);
        }
        None => println!("{}", plan.prompt),
    }
    Ok(())
}

fn print_ranking(target: f64, ranked: &[RankedHotel]) {
    println!("Per-night target: {:.2}", target);
    if ranked.is_empty() {
        println!("No suitable hotel found.");
        return;
    }
    for (i, entry) in ranked.iter().enumerate() {
        let price = entry.hotel.price.unwrap_or_default();
        println!(
            "{}. {} - {:.2} per night (delta {:.2}){}",
            i + 1,
            entry.hotel.name,
            price,
            entry.cost_delta,
            entry
                .hotel
                .url
                .as_deref()
                .map(|url| format!(" {}", url))
                .unwrap_or_default()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use rstest::rstest;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_plan_arguments_parse() {
        let cli = Cli::try_parse_from([
            "trip-planner",
            "plan",
            "--travelers",
            "2",
            "--from",
            "LHR",
            "--to",
            "JFK",
            "--city",
            "New York",
            "--budget",
            "3000",
            "--depart",
            "2026-12-01",
            "--return",
            "2026-12-06",
            "--top-k",
            "3",
        ])
        .unwrap();
        let Commands::Plan {
            budget_rules,
            return_date,
            ..
        } = cli.command
        else {
            panic!("expected plan command");
        };
        assert_eq!(return_date, NaiveDate::from_ymd_opt(2026, 12, 6).unwrap());
        let settings = BudgetSettings::from(&budget_rules);
        assert_eq!(settings.top_k, 3);
        assert_eq!(settings.daily_meal_rate, 40.0);
    }

    #[test]
    fn test_hotel_entries_accept_numbers_and_text() {
        let entries: Vec<HotelEntry> = serde_json::from_str(
            r#"[
                {"name": "Numeric", "price": 250},
                {"name": "Textual", "price": "$1,180.00", "url": "https://t.example"},
                {"name": "Unpriced", "price": "ask"},
                {"name": "Missing"}
            ]"#,
        )
        .unwrap();
        let candidates: Vec<HotelCandidate> = entries.into_iter().map(Into::into).collect();
        assert_eq!(candidates[0].price, Some(250.0));
        assert_eq!(candidates[1].price, Some(1180.0));
        assert_eq!(candidates[1].url.as_deref(), Some("https://t.example"));
        assert_eq!(candidates[2].price, None);
        assert_eq!(candidates[3].price, None);
    }

    #[rstest]
    #[case(1000.0, 200.0, 0)]
    #[case(0.0, 200.0, 3)]
    #[case(-50.0, 200.0, 3)]
    #[case(f64::NAN, 200.0, 3)]
    #[case(f64::INFINITY, 200.0, 3)]
    #[case(1000.0, -1.0, 3)]
    #[case(1000.0, f64::NAN, 3)]
    fn test_rank_rejects_invalid_arguments(
        #[case] budget: f64,
        #[case] flight_cost: f64,
        #[case] nights: u32,
    ) {
        let err = validate_rank_args(budget, flight_cost, nights).unwrap_err();
        assert!(matches!(err, PlannerError::InvalidTrip(_)));
        assert!(!err.user_message().is_empty());
    }

    #[test]
    fn test_rank_accepts_valid_arguments() {
        assert!(validate_rank_args(1000.0, 0.0, 1).is_ok());
        assert!(validate_rank_args(3000.0, 750.5, 5).is_ok());
    }

    #[test]
    fn test_rank_zero_nights_parses_but_fails_validation() {
        let cli = Cli::try_parse_from([
            "trip-planner",
            "rank",
            "--budget",
            "1000",
            "--flight-cost",
            "200",
            "--nights",
            "0",
            "--hotels",
            "hotels.json",
        ])
        .unwrap();
        let Commands::Rank {
            budget,
            flight_cost,
            nights,
            ..
        } = cli.command
        else {
            panic!("expected rank command");
        };
        let err = validate_rank_args(budget, flight_cost, nights).unwrap_err();
        assert_eq!(err.user_message(), "The trip must last at least one night.");
    }

    #[tokio::test]
    async fn test_invalid_trip_fails_before_configuration() {
        let depart = NaiveDate::from_ymd_opt(2026, 12, 6).unwrap();
        let trip = TripRequest::new(1, "LHR", "JFK", "New York", 1000.0, depart, depart);
        let result = run_plan(trip, BudgetSettings::default(), true).await;
        assert!(matches!(result, Err(PlannerError::InvalidTrip(_))));
    }
}

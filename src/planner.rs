//! Sequential trip planning: lookups, hotel ranking, prompt, completion.

use crate::airlines::AirlineDirectory;
use crate::allocator::{self, BudgetBreakdown, HotelCandidate, RankedHotel};
use crate::amadeus::AmadeusClient;
use crate::config::PlannerConfig;
use crate::error::PlannerError;
use crate::flights::{self, FlightQuote};
use crate::hotels::{self, WebsiteFinder};
use crate::http::build_client;
use crate::llm::ItineraryWriter;
use crate::metrics::{inc_plans_generated, record_hotels_ranked};
use crate::places::{Activity, PlacesClient};
use crate::prompt::build_prompt;
use crate::trip::TripRequest;
use crate::weather::{WeatherClient, WeatherSummary};
use serde::Serialize;
use tracing::{info, instrument, warn};

/// Budget rules applied when ranking hotels and estimating cost
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BudgetSettings {
    /// Deducted from the budget per night before comparing hotel prices
    pub daily_overhead: f64,
    /// Meal allowance per traveler per day
    pub daily_meal_rate: f64,
    /// How many hotels to keep; 0 keeps all
    pub top_k: usize,
}

impl Default for BudgetSettings {
    fn default() -> Self {
        Self {
            daily_overhead: 100.0,
            daily_meal_rate: 20.0 * 2.0,
            top_k: 1,
        }
    }
}

/// Everything known about a trip before the itinerary is written
#[derive(Debug, Clone, Serialize)]
pub struct TripFacts {
    pub trip: TripRequest,
    pub nights: u32,
    pub flight: FlightQuote,
    pub airline_name: String,
    pub weather: WeatherSummary,
    pub activities: Vec<Activity>,
    pub ranking: Vec<RankedHotel>,
    pub breakdown: BudgetBreakdown,
}

impl TripFacts {
    /// Ranks the hotels and derives the budget breakdown from the looked-up data
    pub fn assemble(
        trip: TripRequest,
        flight: FlightQuote,
        airline_name: String,
        weather: WeatherSummary,
        activities: Vec<Activity>,
        hotels: &[HotelCandidate],
        budget: BudgetSettings,
    ) -> Self {
        let nights = trip.nights();
        let ranking = allocator::rank(
            trip.total_budget,
            flight.total_price,
            nights,
            hotels,
            budget.daily_overhead,
            budget.top_k,
        );
        let breakdown = BudgetBreakdown::estimate(
            trip.total_budget,
            flight.total_price,
            ranking.first().map(|r| &r.hotel),
            nights,
            trip.travelers,
            budget.daily_meal_rate,
        );
        Self {
            trip,
            nights,
            flight,
            airline_name,
            weather,
            activities,
            ranking,
            breakdown,
        }
    }

    pub fn selected_hotel(&self) -> Option<&RankedHotel> {
        self.ranking.first()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TripPlan {
    pub facts: TripFacts,
    pub prompt: String,
    /// `None` for dry runs
    pub itinerary: Option<String>,
}

pub struct TripPlanner {
    amadeus: AmadeusClient,
    places: Option<PlacesClient>,
    websites: Option<WebsiteFinder>,
    weather: WeatherClient,
    airlines: AirlineDirectory,
    writer: Option<ItineraryWriter>,
    hotel_candidate_limit: usize,
    budget: BudgetSettings,
}

impl TripPlanner {
    /// Builds every client up front. Without a writer the planner only produces prompts.
    pub async fn from_config(
        config: &PlannerConfig,
        budget: BudgetSettings,
        dry_run: bool,
    ) -> Result<Self, PlannerError> {
        let http = build_client(config.http_timeout)?;
        let writer = if dry_run {
            None
        } else {
            Some(ItineraryWriter::new(&config.llm)?)
        };
        let amadeus = AmadeusClient::new(
            http.clone(),
            &config.amadeus_base_url,
            config.amadeus.clone(),
        );
        let places = config.google.as_ref().map(|google| {
            PlacesClient::new(http.clone(), google.api_key.clone(), config.max_activities)
        });
        if places.is_none() {
            warn!("GOOGLE_API_KEY not set, skipping activities lookup");
        }
        let websites = config.google.as_ref().and_then(|google| {
            google
                .cse_id
                .clone()
                .map(|cse_id| WebsiteFinder::new(http.clone(), google.api_key.clone(), cse_id))
        });
        let weather = WeatherClient::new(http.clone(), &config.weather_base_url)?;
        let airlines = match AirlineDirectory::download(&http, &config.airlines_data_url).await {
            Ok(directory) => directory,
            Err(e) => {
                warn!("Airline directory unavailable, names will be unknown: {}", e);
                AirlineDirectory::default()
            }
        };
        Ok(Self {
            amadeus,
            places,
            websites,
            weather,
            airlines,
            writer,
            hotel_candidate_limit: config.hotel_candidate_limit,
            budget,
        })
    }

    #[instrument(skip(self, trip), fields(city = %trip.destination_city))]
    pub async fn plan(&self, trip: TripRequest) -> Result<TripPlan, PlannerError> {
        info!(nights = trip.nights(), "Planning trip");

        let city_code = self.amadeus.city_code(&trip.destination_city).await?;
        let activities = self.activities(&trip.destination_city).await;
        let flight = flights::round_trip_quote(&self.amadeus, &trip).await?;
        let airline_name = self.airlines.name(&flight.carrier_code).to_string();
        let hotels = hotels::search_hotels(
            &self.amadeus,
            self.websites.as_ref(),
            &city_code,
            &trip,
            self.hotel_candidate_limit,
        )
        .await?;
        let weather = self
            .weather
            .average_temperature(&trip.destination_city, trip.departure_date)
            .await;

        record_hotels_ranked(hotels.iter().filter(|h| h.price.is_some()).count());
        let facts = TripFacts::assemble(
            trip,
            flight,
            airline_name,
            weather,
            activities,
            &hotels,
            self.budget,
        );
        match facts.selected_hotel() {
            Some(best) => info!(
                hotel = %best.hotel.name,
                cost_delta = best.cost_delta,
                "Selected hotel"
            ),
            None => warn!("No suitable hotel found"),
        }

        let prompt = build_prompt(&facts);
        let itinerary = match &self.writer {
            Some(writer) => Some(writer.write(&prompt).await?),
            None => None,
        };
        inc_plans_generated();
        Ok(TripPlan {
            facts,
            prompt,
            itinerary,
        })
    }

    async fn activities(&self, city: &str) -> Vec<Activity> {
        let Some(places) = &self.places else {
            return Vec::new();
        };
        match places.activities(city).await {
            Ok(activities) => activities,
            Err(e) => {
                warn!("Activities lookup failed: {}", e);
                Vec::new()
            }
        }
    }
}

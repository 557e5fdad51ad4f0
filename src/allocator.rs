//! Budget allocation and hotel ranking.
//!
//! The per-night target is what remains of the budget after flights and a daily
//! overhead. Hotels are ranked by how close their nightly price is to that target.
//! A negative target is valid: the cheapest hotel then ranks first.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// A hotel offer as returned by a hotel search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HotelCandidate {
    pub name: String,
    /// Nightly price, `None` when the source text could not be parsed
    pub price: Option<f64>,
    pub url: Option<String>,
}

impl HotelCandidate {
    /// Builds a candidate from a free-form price string such as `"$1,234.50"`
    pub fn from_raw_price(name: impl Into<String>, raw_price: &str, url: Option<String>) -> Self {
        Self {
            name: name.into(),
            price: normalize_price(raw_price),
            url,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedHotel {
    pub hotel: HotelCandidate,
    /// Absolute distance between the nightly price and the per-night target
    pub cost_delta: f64,
}

/// Strips everything but digits and the decimal point, then parses.
///
/// Returns `None` rather than zero when nothing usable remains.
pub fn normalize_price(text: &str) -> Option<f64> {
    static NON_NUMERIC: OnceLock<Option<Regex>> = OnceLock::new();
    let re = NON_NUMERIC
        .get_or_init(|| Regex::new(r"[^0-9.]").ok())
        .as_ref()?;
    let cleaned = re.replace_all(text, "");
    cleaned
        .parse::<f64>()
        .ok()
        .filter(|price| price.is_finite())
}

pub fn per_night_target(
    total_budget: f64,
    flight_cost: f64,
    trip_nights: u32,
    daily_overhead: f64,
) -> f64 {
    (total_budget - flight_cost) - daily_overhead * f64::from(trip_nights)
}

/// Ranks hotels by distance to the per-night target, closest first.
///
/// Candidates without a price are skipped. Equal deltas keep input order.
/// `top_k == 0` returns every priced candidate.
pub fn rank(
    total_budget: f64,
    flight_cost: f64,
    trip_nights: u32,
    hotels: &[HotelCandidate],
    daily_overhead: f64,
    top_k: usize,
) -> Vec<RankedHotel> {
    let target = per_night_target(total_budget, flight_cost, trip_nights, daily_overhead);
    let mut ranked: Vec<RankedHotel> = hotels
        .iter()
        .filter_map(|hotel| {
            hotel.price.map(|price| RankedHotel {
                hotel: hotel.clone(),
                cost_delta: (target - price).abs(),
            })
        })
        .collect();
    // sort_by is stable, so ties stay in input order
    ranked.sort_by(|a, b| a.cost_delta.total_cmp(&b.cost_delta));
    if top_k > 0 {
        ranked.truncate(top_k);
    }
    ranked
}

/// Estimated trip cost; reported only, never used for selection
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetBreakdown {
    pub flight: f64,
    pub hotel_nightly: Option<f64>,
    pub hotel_total: f64,
    pub meals: f64,
    pub total: f64,
    pub remaining: f64,
}

impl BudgetBreakdown {
    pub fn estimate(
        total_budget: f64,
        flight_cost: f64,
        selected: Option<&HotelCandidate>,
        trip_nights: u32,
        travelers: u32,
        daily_meal_rate: f64,
    ) -> Self {
        let nights = f64::from(trip_nights);
        let hotel_nightly = selected.and_then(|hotel| hotel.price);
        let hotel_total = hotel_nightly.map_or(0.0, |price| price * nights);
        let meals = daily_meal_rate * nights * f64::from(travelers);
        let total = flight_cost + hotel_total + meals;
        Self {
            flight: flight_cost,
            hotel_nightly,
            hotel_total,
            meals,
            total,
            remaining: total_budget - total,
        }
    }
}

use crate::allocator::HotelCandidate;
use crate::amadeus::AmadeusClient;
use crate::error::PlannerError;
use crate::http::{read_json, send_failed};
use crate::trip::TripRequest;
use reqwest::Client;
use serde_json::Value;
use tracing::{info, instrument, warn};

const CUSTOM_SEARCH_URL: &str = "https://www.googleapis.com/customsearch/v1";

/// Finds a hotel's official site through Google Custom Search
pub struct WebsiteFinder {
    http: Client,
    api_key: String,
    cse_id: String,
}

impl WebsiteFinder {
    pub fn new(http: Client, api_key: String, cse_id: String) -> Self {
        Self {
            http,
            api_key,
            cse_id,
        }
    }

    #[instrument(skip(self))]
    pub async fn find(&self, hotel_name: &str) -> Result<Option<String>, PlannerError> {
        let query = format!("{} official website", hotel_name);
        let response = self
            .http
            .get(CUSTOM_SEARCH_URL)
            .query(&[
                ("q", query.as_str()),
                ("key", self.api_key.as_str()),
                ("cx", self.cse_id.as_str()),
            ])
            .send()
            .await
            .map_err(|e| send_failed("custom_search", e))?;
        let data = read_json("custom_search", response).await?;
        Ok(parse_first_link(&data))
    }
}

fn parse_first_link(data: &Value) -> Option<String> {
    data.get("items")
        .and_then(|items| items.as_array())
        .and_then(|items| items.first())
        .and_then(|item| item.get("link"))
        .and_then(|link| link.as_str())
        .map(str::to_string)
}

/// Hotel candidates for the stay. An empty city hotel list is not an error.
#[instrument(skip(amadeus, websites, trip), fields(city = %city_code))]
pub async fn search_hotels(
    amadeus: &AmadeusClient,
    websites: Option<&WebsiteFinder>,
    city_code: &str,
    trip: &TripRequest,
    limit: usize,
) -> Result<Vec<HotelCandidate>, PlannerError> {
    let hotel_ids = amadeus.hotel_ids(city_code, limit).await?;
    if hotel_ids.is_empty() {
        warn!("No hotels listed for city");
        return Ok(Vec::new());
    }
    let offers = amadeus
        .hotel_offers(&hotel_ids, trip.departure_date, trip.return_date)
        .await?;
    info!(offers = offers.len(), "Received hotel offers");

    let nights = trip.nights();
    let mut candidates = Vec::with_capacity(offers.len());
    for offer in offers {
        let url = match websites {
            Some(finder) => match finder.find(&offer.name).await {
                Ok(url) => url,
                Err(e) => {
                    warn!(hotel = %offer.name, "Website lookup failed: {}", e);
                    None
                }
            },
            None => None,
        };
        let price = offer.nightly_price(nights);
        if price.is_none() {
            warn!(hotel = %offer.name, raw_price = %offer.stay_total, "Unparseable hotel price");
        }
        candidates.push(HotelCandidate {
            name: offer.name,
            price,
            url,
        });
    }
    Ok(candidates)
}

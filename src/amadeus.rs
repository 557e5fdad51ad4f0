//! Amadeus self-service API: flight offers, city codes and hotel offers.

use crate::allocator::normalize_price;
use crate::config::AmadeusCredentials;
use crate::error::PlannerError;
use crate::flights::FlightOffer;
use crate::http::{read_json, send_failed};
use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::OnceCell;
use tracing::{debug, info, instrument};

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// A hotel offer before price normalization
#[derive(Debug, Clone, PartialEq)]
pub struct RawHotelOffer {
    pub name: String,
    /// `price.total`, which covers the whole stay
    pub stay_total: String,
    /// `price.variations.average`, the per-night rate when Amadeus provides it
    pub nightly: Option<String>,
}

impl RawHotelOffer {
    /// Nightly rate: the average variation when present, else the stay total spread over `nights`
    pub fn nightly_price(&self, nights: u32) -> Option<f64> {
        if let Some(price) = self.nightly.as_deref().and_then(normalize_price) {
            return Some(price);
        }
        let total = normalize_price(&self.stay_total)?;
        (nights > 0).then(|| total / f64::from(nights))
    }
}

pub struct AmadeusClient {
    http: Client,
    base_url: String,
    credentials: AmadeusCredentials,
    token: OnceCell<String>,
}

impl AmadeusClient {
    pub fn new(http: Client, base_url: &str, credentials: AmadeusCredentials) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
            token: OnceCell::new(),
        }
    }

    /// Fetched once with the client-credentials grant and reused for the process
    async fn access_token(&self) -> Result<&str, PlannerError> {
        let token = self
            .token
            .get_or_try_init(|| async {
                debug!("Requesting Amadeus access token");
                let response = self
                    .http
                    .post(format!("{}/v1/security/oauth2/token", self.base_url))
                    .form(&[
                        ("grant_type", "client_credentials"),
                        ("client_id", self.credentials.client_id.as_str()),
                        ("client_secret", self.credentials.client_secret.as_str()),
                    ])
                    .send()
                    .await
                    .map_err(|e| send_failed("amadeus_token", e))?;
                let data = read_json("amadeus_token", response).await?;
                let token: TokenResponse = serde_json::from_value(data)
                    .map_err(|e| PlannerError::InvalidResponse(format!("amadeus_token: {}", e)))?;
                Ok::<String, PlannerError>(token.access_token)
            })
            .await?;
        Ok(token.as_str())
    }

    async fn get(
        &self,
        service: &'static str,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Value, PlannerError> {
        let token = self.access_token().await?;
        let response = self
            .http
            .get(format!("{}{}", self.base_url, path))
            .bearer_auth(token)
            .query(query)
            .send()
            .await
            .map_err(|e| send_failed(service, e))?;
        read_json(service, response).await
    }

    /// First offer for a one-way search, `None` when the search has no results
    #[instrument(skip(self))]
    pub async fn flight_offer(
        &self,
        origin: &str,
        destination: &str,
        date: NaiveDate,
        adults: u32,
        non_stop: bool,
    ) -> Result<Option<FlightOffer>, PlannerError> {
        let query = [
            ("originLocationCode", origin.to_string()),
            ("destinationLocationCode", destination.to_string()),
            ("departureDate", date.format(DATE_FORMAT).to_string()),
            ("adults", adults.to_string()),
            ("travelClass", "ECONOMY".to_string()),
            ("nonStop", non_stop.to_string()),
            ("max", "5".to_string()),
        ];
        info!("Searching flight offers");
        let data = self.get("flight_offers", "/v2/shopping/flight-offers", &query).await?;
        Ok(parse_first_flight_offer(&data))
    }

    #[instrument(skip(self))]
    pub async fn city_code(&self, city: &str) -> Result<String, PlannerError> {
        let query = [
            ("keyword", city.to_uppercase()),
            ("subType", "CITY".to_string()),
        ];
        let data = self.get("city_search", "/v1/reference-data/locations", &query).await?;
        parse_city_code(&data)
            .ok_or_else(|| PlannerError::NotFound(format!("a city named {}", city)))
    }

    #[instrument(skip(self))]
    pub async fn hotel_ids(
        &self,
        city_code: &str,
        limit: usize,
    ) -> Result<Vec<String>, PlannerError> {
        let query = [("cityCode", city_code.to_string())];
        let data = self
            .get("hotel_list", "/v1/reference-data/locations/hotels/by-city", &query)
            .await?;
        Ok(parse_hotel_ids(&data, limit))
    }

    #[instrument(skip(self, hotel_ids), fields(hotel_count = hotel_ids.len()))]
    pub async fn hotel_offers(
        &self,
        hotel_ids: &[String],
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> Result<Vec<RawHotelOffer>, PlannerError> {
        let query = [
            ("hotelIds", hotel_ids.join(",")),
            ("checkInDate", check_in.format(DATE_FORMAT).to_string()),
            ("checkOutDate", check_out.format(DATE_FORMAT).to_string()),
        ];
        let data = self.get("hotel_offers", "/v3/shopping/hotel-offers", &query).await?;
        Ok(parse_hotel_offers(&data))
    }
}

fn data_array(data: &Value) -> &[Value] {
    data.get("data")
        .and_then(|d| d.as_array())
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// Carrier of the first segment of the first itinerary, plus the offer's total price
pub(crate) fn parse_first_flight_offer(data: &Value) -> Option<FlightOffer> {
    data_array(data).iter().find_map(|offer| {
        let carrier_code = offer
            .get("itineraries")
            .and_then(|i| i.as_array())
            .and_then(|i| i.first())
            .and_then(|itinerary| itinerary.get("segments"))
            .and_then(|s| s.as_array())
            .and_then(|s| s.first())
            .and_then(|segment| segment.get("carrierCode"))
            .and_then(|c| c.as_str())?;
        // Amadeus sends prices as strings ("245.67")
        let price = offer
            .get("price")
            .and_then(|p| p.get("total"))
            .and_then(|t| match t {
                Value::String(s) => s.parse::<f64>().ok(),
                other => other.as_f64(),
            })?;
        Some(FlightOffer {
            carrier_code: carrier_code.to_string(),
            price,
        })
    })
}

pub(crate) fn parse_city_code(data: &Value) -> Option<String> {
    data_array(data)
        .iter()
        .find_map(|location| location.get("iataCode").and_then(|c| c.as_str()))
        .map(str::to_string)
}

pub(crate) fn parse_hotel_ids(data: &Value, limit: usize) -> Vec<String> {
    data_array(data)
        .iter()
        .filter_map(|hotel| hotel.get("hotelId").and_then(|id| id.as_str()))
        .take(limit)
        .map(str::to_string)
        .collect()
}

fn price_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub(crate) fn parse_hotel_offers(data: &Value) -> Vec<RawHotelOffer> {
    data_array(data)
        .iter()
        .filter_map(|entry| {
            let name = entry
                .get("hotel")
                .and_then(|h| h.get("name"))
                .and_then(|n| n.as_str())?;
            let price = entry
                .get("offers")
                .and_then(|o| o.as_array())
                .and_then(|o| o.first())
                .and_then(|offer| offer.get("price"));
            let stay_total = price
                .and_then(|p| p.get("total"))
                .map(price_text)
                .unwrap_or_default();
            let nightly = price
                .and_then(|p| p.get("variations"))
                .and_then(|v| v.get("average"))
                .and_then(|average| average.get("total").or_else(|| average.get("base")))
                .map(price_text);
            Some(RawHotelOffer {
                name: name.to_string(),
                stay_total,
                nightly,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_first_flight_offer() {
        let data = json!({
            "data": [
                {
                    "itineraries": [{
                        "segments": [{ "carrierCode": "BA" }, { "carrierCode": "AA" }]
                    }],
                    "price": { "currency": "EUR", "total": "412.30" }
                },
                {
                    "itineraries": [{ "segments": [{ "carrierCode": "VS" }] }],
                    "price": { "total": "380.00" }
                }
            ]
        });
        let offer = parse_first_flight_offer(&data).unwrap();
        assert_eq!(offer.carrier_code, "BA");
        assert_eq!(offer.price, 412.30);
    }

    #[test]
    fn test_parse_flight_offer_skips_malformed_entries() {
        let data = json!({
            "data": [
                { "itineraries": [], "price": { "total": "99.00" } },
                {
                    "itineraries": [{ "segments": [{ "carrierCode": "U2" }] }],
                    "price": { "total": 120.5 }
                }
            ]
        });
        let offer = parse_first_flight_offer(&data).unwrap();
        assert_eq!(offer.carrier_code, "U2");
        assert_eq!(offer.price, 120.5);
    }

    #[test]
    fn test_parse_flight_offer_empty() {
        assert!(parse_first_flight_offer(&json!({ "data": [] })).is_none());
        assert!(parse_first_flight_offer(&json!({ "errors": [{ "code": 477 }] })).is_none());
    }

    #[test]
    fn test_parse_city_code() {
        let data = json!({ "data": [{ "subType": "CITY", "name": "PARIS", "iataCode": "PAR" }] });
        assert_eq!(parse_city_code(&data).as_deref(), Some("PAR"));
        assert!(parse_city_code(&json!({ "data": [] })).is_none());
    }

    #[test]
    fn test_parse_hotel_ids_respects_limit() {
        let hotels: Vec<Value> = (0..50)
            .map(|i| json!({ "hotelId": format!("HT{:04}", i), "name": "Hotel" }))
            .collect();
        let ids = parse_hotel_ids(&json!({ "data": hotels }), 40);
        assert_eq!(ids.len(), 40);
        assert_eq!(ids[0], "HT0000");
        assert_eq!(ids[39], "HT0039");
    }

    #[test]
    fn test_parse_hotel_offers() {
        let data = json!({
            "data": [
                {
                    "hotel": { "hotelId": "A", "name": "Riverside Inn" },
                    "offers": [{ "price": { "currency": "GBP", "total": "189.00" } }]
                },
                {
                    "hotel": { "hotelId": "B", "name": "No Offers Lodge" },
                    "offers": []
                },
                { "offers": [{ "price": { "total": "50.00" } }] }
            ]
        });
        let offers = parse_hotel_offers(&data);
        assert_eq!(
            offers,
            vec![
                RawHotelOffer {
                    name: "Riverside Inn".into(),
                    stay_total: "189.00".into(),
                    nightly: None,
                },
                RawHotelOffer {
                    name: "No Offers Lodge".into(),
                    stay_total: String::new(),
                    nightly: None,
                },
            ]
        );
    }

    #[test]
    fn test_hotel_offer_prefers_average_nightly_rate() {
        let data = json!({
            "data": [{
                "hotel": { "name": "Harbour View" },
                "offers": [{
                    "price": {
                        "total": "500.00",
                        "variations": { "average": { "base": "100.00" } }
                    }
                }]
            }]
        });
        let offers = parse_hotel_offers(&data);
        assert_eq!(offers[0].nightly.as_deref(), Some("100.00"));
        assert_eq!(offers[0].nightly_price(5), Some(100.0));
    }

    #[test]
    fn test_hotel_offer_average_total_wins_over_base() {
        let data = json!({
            "data": [{
                "hotel": { "name": "Taxed Inn" },
                "offers": [{
                    "price": {
                        "total": "600.00",
                        "variations": { "average": { "base": "100.00", "total": "120.00" } }
                    }
                }]
            }]
        });
        assert_eq!(parse_hotel_offers(&data)[0].nightly_price(5), Some(120.0));
    }

    #[test]
    fn test_hotel_offer_spreads_stay_total_without_variations() {
        let offer = RawHotelOffer {
            name: "Riverside Inn".into(),
            stay_total: "400.00".into(),
            nightly: None,
        };
        assert_eq!(offer.nightly_price(4), Some(100.0));
        assert_eq!(offer.nightly_price(0), None);

        let unpriced = RawHotelOffer {
            stay_total: "on request".into(),
            ..offer
        };
        assert_eq!(unpriced.nightly_price(4), None);
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = AmadeusClient::new(
            Client::new(),
            "https://test.api.amadeus.com/",
            AmadeusCredentials {
                client_id: "id".into(),
                client_secret: "secret".into(),
            },
        );
        assert_eq!(client.base_url, "https://test.api.amadeus.com");
    }
}

//! Points of interest near the destination via Google Geocoding and Places.

use crate::error::PlannerError;
use crate::http::{read_json, send_failed};
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

const GEOCODE_URL: &str = "https://maps.googleapis.com/maps/api/geocode/json";
const NEARBY_SEARCH_URL: &str = "https://maps.googleapis.com/maps/api/place/nearbysearch/json";
const PLACE_DETAILS_URL: &str = "https://maps.googleapis.com/maps/api/place/details/json";
const SEARCH_RADIUS_METERS: u32 = 5000;
const NO_DESCRIPTION: &str = "No description available";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Activity {
    pub name: String,
    pub address: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq)]
struct NearbyPlace {
    name: String,
    address: String,
    place_id: Option<String>,
}

pub struct PlacesClient {
    http: Client,
    api_key: String,
    max_activities: usize,
}

impl PlacesClient {
    pub fn new(http: Client, api_key: String, max_activities: usize) -> Self {
        Self {
            http,
            api_key,
            max_activities,
        }
    }

    async fn get(
        &self,
        service: &'static str,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<Value, PlannerError> {
        let response = self
            .http
            .get(url)
            .query(query)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| send_failed(service, e))?;
        read_json(service, response).await
    }

    /// Tourist attractions around the city; empty when the city cannot be geocoded
    #[instrument(skip(self))]
    pub async fn activities(&self, city: &str) -> Result<Vec<Activity>, PlannerError> {
        let geocode = self
            .get("geocode", GEOCODE_URL, &[("address", city.to_string())])
            .await?;
        let Some((lat, lng)) = parse_coordinates(&geocode) else {
            warn!("No geocoding results for city");
            return Ok(Vec::new());
        };
        debug!(lat, lng, "Geocoded destination");

        let nearby = self
            .get(
                "places_nearby",
                NEARBY_SEARCH_URL,
                &[
                    ("location", format!("{},{}", lat, lng)),
                    ("radius", SEARCH_RADIUS_METERS.to_string()),
                    ("type", "tourist_attraction".to_string()),
                ],
            )
            .await?;
        let places = parse_nearby_places(&nearby);
        info!(places = places.len(), "Found nearby attractions");

        let mut activities = Vec::new();
        for place in places.into_iter().take(self.max_activities) {
            let description = match &place.place_id {
                Some(place_id) => self.description(place_id).await,
                None => NO_DESCRIPTION.to_string(),
            };
            activities.push(Activity {
                name: place.name,
                address: place.address,
                description,
            });
        }
        Ok(activities)
    }

    async fn description(&self, place_id: &str) -> String {
        let query = [
            ("place_id", place_id.to_string()),
            ("fields", "editorial_summary".to_string()),
        ];
        match self.get("place_details", PLACE_DETAILS_URL, &query).await {
            Ok(details) => {
                parse_editorial_overview(&details).unwrap_or_else(|| NO_DESCRIPTION.to_string())
            }
            Err(e) => {
                warn!(place_id, "Place details failed: {}", e);
                "Error retrieving details".to_string()
            }
        }
    }
}

fn status_ok(data: &Value) -> bool {
    data.get("status").and_then(|s| s.as_str()) == Some("OK")
}

fn parse_coordinates(data: &Value) -> Option<(f64, f64)> {
    if !status_ok(data) {
        return None;
    }
    let location = data
        .get("results")
        .and_then(|r| r.as_array())
        .and_then(|r| r.first())
        .and_then(|result| result.get("geometry"))
        .and_then(|g| g.get("location"))?;
    let lat = location.get("lat").and_then(|v| v.as_f64())?;
    let lng = location.get("lng").and_then(|v| v.as_f64())?;
    Some((lat, lng))
}

fn parse_nearby_places(data: &Value) -> Vec<NearbyPlace> {
    data.get("results")
        .and_then(|r| r.as_array())
        .map(|results| {
            results
                .iter()
                .filter_map(|place| {
                    let name = place.get("name").and_then(|n| n.as_str())?;
                    Some(NearbyPlace {
                        name: name.to_string(),
                        address: place
                            .get("vicinity")
                            .and_then(|v| v.as_str())
                            .unwrap_or_default()
                            .to_string(),
                        place_id: place
                            .get("place_id")
                            .and_then(|p| p.as_str())
                            .map(str::to_string),
                    })
                })
                .collect()
        })
        .unwrap_or_default()
}

fn parse_editorial_overview(data: &Value) -> Option<String> {
    if !status_ok(data) {
        return None;
    }
    data.get("result")
        .and_then(|r| r.get("editorial_summary"))
        .and_then(|s| s.get("overview"))
        .and_then(|o| o.as_str())
        .map(str::to_string)
}

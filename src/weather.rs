//! Monthly average temperature scraped from holiday-weather.com.

use crate::error::PlannerError;
use crate::http::{read_text, send_failed};
use chrono::NaiveDate;
use reqwest::Client;
use scraper::{Html, Selector};
use serde::Serialize;
use std::fmt;
use tracing::{instrument, warn};

const TEMPERATURE_SELECTOR: &str = "div.p-2.pl-md-3.text.fw-600";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherSummary {
    pub location: String,
    pub month: String,
    /// Temperature text as shown on the page, e.g. "14°C"
    pub average_temperature: Option<String>,
}

impl fmt::Display for WeatherSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.average_temperature {
            Some(temp) => write!(
                f,
                "The average temperature in {} during {} is {}.",
                self.location, self.month, temp
            ),
            None => write!(
                f,
                "Could not find temperature information for {} in {}.",
                self.location, self.month
            ),
        }
    }
}

pub struct WeatherClient {
    http: Client,
    base_url: String,
    selector: Selector,
}

impl WeatherClient {
    pub fn new(http: Client, base_url: &str) -> Result<Self, PlannerError> {
        let selector = Selector::parse(TEMPERATURE_SELECTOR)
            .map_err(|e| PlannerError::Config(format!("Invalid temperature selector: {}", e)))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            selector,
        })
    }

    fn page_url(&self, city: &str, month: &str) -> String {
        format!("{}/{}/averages/{}/", self.base_url, city_slug(city), month)
    }

    /// Never fails: lookup problems produce a summary without a temperature
    #[instrument(skip(self))]
    pub async fn average_temperature(&self, city: &str, departure: NaiveDate) -> WeatherSummary {
        let month = departure.format("%B").to_string().to_lowercase();
        let location = city.trim().to_lowercase();
        let average_temperature = match self.fetch_page(city, &month).await {
            Ok(html) => self.extract_temperature(&html),
            Err(e) => {
                warn!("Weather lookup failed: {}", e);
                None
            }
        };
        WeatherSummary {
            location,
            month,
            average_temperature,
        }
    }

    async fn fetch_page(&self, city: &str, month: &str) -> Result<String, PlannerError> {
        let response = self
            .http
            .get(self.page_url(city, month))
            .send()
            .await
            .map_err(|e| send_failed("weather", e))?;
        read_text("weather", response).await
    }

    fn extract_temperature(&self, html: &str) -> Option<String> {
        let document = Html::parse_document(html);
        document
            .select(&self.selector)
            .next()
            .map(|element| element.text().collect::<String>().trim().to_string())
            .filter(|text| !text.is_empty())
    }
}

fn city_slug(city: &str) -> String {
    city.split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> WeatherClient {
        WeatherClient::new(Client::new(), "https://www.holiday-weather.com/").unwrap()
    }

    #[test]
    fn test_page_url_uses_slug_and_month() {
        assert_eq!(
            client().page_url("New York", "december"),
            "https://www.holiday-weather.com/new-york/averages/december/"
        );
    }

    #[test]
    fn test_extract_temperature() {
        let html = r#"
            <html><body>
              <div class="p-2 pl-md-3 text fw-600">
                 14°C
              </div>
              <div class="p-2 pl-md-3 text fw-600">8°C</div>
            </body></html>
        "#;
        assert_eq!(client().extract_temperature(html).as_deref(), Some("14°C"));
    }

    #[test]
    fn test_extract_temperature_missing() {
        let html = "<html><body><div class=\"text\">nothing here</div></body></html>";
        assert!(client().extract_temperature(html).is_none());
    }

    #[test]
    fn test_summary_display() {
        let found = WeatherSummary {
            location: "paris".into(),
            month: "june".into(),
            average_temperature: Some("21°C".into()),
        };
        assert_eq!(found.to_string(), "The average temperature in paris during june is 21°C.");

        let missing = WeatherSummary {
            average_temperature: None,
            ..found
        };
        assert!(missing.to_string().starts_with("Could not find temperature information"));
    }
}

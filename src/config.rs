//! Runtime configuration read from the environment (and `.env` via `dotenv`).

use crate::error::PlannerError;
use std::env;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_AMADEUS_BASE_URL: &str = "https://test.api.amadeus.com";
pub const DEFAULT_WEATHER_BASE_URL: &str = "https://www.holiday-weather.com";
pub const DEFAULT_AIRLINES_DATA_URL: &str =
    "https://raw.githubusercontent.com/jpatokal/openflights/master/data/airlines.dat";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-3.5-turbo";

#[derive(Debug, Clone)]
pub struct AmadeusCredentials {
    pub client_id: String,
    pub client_secret: String,
}

#[derive(Debug, Clone)]
pub struct GoogleCredentials {
    pub api_key: String,
    /// Custom Search engine id, only needed for hotel website lookups
    pub cse_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct LlmSettings {
    pub api_key: Option<String>,
    pub model: String,
    pub max_tokens: u64,
    pub temperature: f64,
}

#[derive(Debug, Clone)]
pub struct PlannerConfig {
    pub amadeus: AmadeusCredentials,
    pub amadeus_base_url: String,
    pub google: Option<GoogleCredentials>,
    pub llm: LlmSettings,
    pub weather_base_url: String,
    pub airlines_data_url: String,
    pub http_timeout: Duration,
    pub hotel_candidate_limit: usize,
    pub max_activities: usize,
}

impl PlannerConfig {
    pub fn from_env() -> Result<Self, PlannerError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup, which keeps tests off the process env.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, PlannerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let require = |key: &'static str| get(key).ok_or(PlannerError::MissingApiKey(key));

        let amadeus = AmadeusCredentials {
            client_id: require("AMADEUS_CLIENT_ID")?,
            client_secret: require("AMADEUS_CLIENT_SECRET")?,
        };
        let google = get("GOOGLE_API_KEY").map(|api_key| GoogleCredentials {
            api_key,
            cse_id: get("GOOGLE_CSE_ID"),
        });
        let llm = LlmSettings {
            api_key: get("OPENAI_API_KEY"),
            model: get("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
            max_tokens: parse_or("LLM_MAX_TOKENS", get("LLM_MAX_TOKENS"), 1024)?,
            temperature: parse_or("LLM_TEMPERATURE", get("LLM_TEMPERATURE"), 0.7)?,
        };
        let timeout_secs: u64 = parse_or("HTTP_TIMEOUT_SECS", get("HTTP_TIMEOUT_SECS"), 30)?;
        if timeout_secs == 0 {
            return Err(PlannerError::Config(
                "HTTP_TIMEOUT_SECS must be greater than zero".to_string(),
            ));
        }

        let config = PlannerConfig {
            amadeus,
            amadeus_base_url: get("AMADEUS_BASE_URL")
                .unwrap_or_else(|| DEFAULT_AMADEUS_BASE_URL.to_string()),
            google,
            llm,
            weather_base_url: get("WEATHER_BASE_URL")
                .unwrap_or_else(|| DEFAULT_WEATHER_BASE_URL.to_string()),
            airlines_data_url: get("AIRLINES_DATA_URL")
                .unwrap_or_else(|| DEFAULT_AIRLINES_DATA_URL.to_string()),
            http_timeout: Duration::from_secs(timeout_secs),
            hotel_candidate_limit: parse_or(
                "HOTEL_CANDIDATE_LIMIT",
                get("HOTEL_CANDIDATE_LIMIT"),
                40,
            )?,
            max_activities: parse_or("MAX_ACTIVITIES", get("MAX_ACTIVITIES"), 10)?,
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), PlannerError> {
        for (name, url) in [
            ("AMADEUS_BASE_URL", &self.amadeus_base_url),
            ("WEATHER_BASE_URL", &self.weather_base_url),
            ("AIRLINES_DATA_URL", &self.airlines_data_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(PlannerError::Config(format!(
                    "{} must be an http(s) URL, got '{}'",
                    name, url
                )));
            }
        }
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(PlannerError::Config(
                "LLM_TEMPERATURE must be between 0.0 and 2.0".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_or<T: FromStr>(name: &str, raw: Option<String>, default: T) -> Result<T, PlannerError> {
    match raw {
        Some(value) => value.trim().parse().map_err(|_| {
            PlannerError::Config(format!("{} has an invalid value '{}'", name, value))
        }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    const CREDENTIALS: [(&str, &str); 2] = [
        ("AMADEUS_CLIENT_ID", "client-id"),
        ("AMADEUS_CLIENT_SECRET", "client-secret"),
    ];

    #[test]
    fn test_defaults_applied() {
        let config = PlannerConfig::from_lookup(lookup(&CREDENTIALS)).unwrap();
        assert_eq!(config.amadeus_base_url, DEFAULT_AMADEUS_BASE_URL);
        assert_eq!(config.llm.model, "gpt-3.5-turbo");
        assert_eq!(config.llm.max_tokens, 1024);
        assert_eq!(config.http_timeout, Duration::from_secs(30));
        assert_eq!(config.hotel_candidate_limit, 40);
        assert_eq!(config.max_activities, 10);
        assert!(config.google.is_none());
        assert!(config.llm.api_key.is_none());
    }

    #[test]
    fn test_missing_amadeus_secret() {
        let result = PlannerConfig::from_lookup(lookup(&[("AMADEUS_CLIENT_ID", "id")]));
        assert!(matches!(
            result,
            Err(PlannerError::MissingApiKey("AMADEUS_CLIENT_SECRET"))
        ));
    }

    #[test]
    fn test_blank_value_counts_as_missing() {
        let result = PlannerConfig::from_lookup(lookup(&[
            ("AMADEUS_CLIENT_ID", "   "),
            ("AMADEUS_CLIENT_SECRET", "secret"),
        ]));
        assert!(matches!(
            result,
            Err(PlannerError::MissingApiKey("AMADEUS_CLIENT_ID"))
        ));
    }

    #[test]
    fn test_overrides() {
        let mut pairs = CREDENTIALS.to_vec();
        pairs.extend([
            ("GOOGLE_API_KEY", "g-key"),
            ("GOOGLE_CSE_ID", "cse"),
            ("OPENAI_MODEL", "gpt-4.1"),
            ("HTTP_TIMEOUT_SECS", "5"),
            ("HOTEL_CANDIDATE_LIMIT", "12"),
        ]);
        let config = PlannerConfig::from_lookup(lookup(&pairs)).unwrap();
        let google = config.google.unwrap();
        assert_eq!(google.api_key, "g-key");
        assert_eq!(google.cse_id.as_deref(), Some("cse"));
        assert_eq!(config.llm.model, "gpt-4.1");
        assert_eq!(config.http_timeout, Duration::from_secs(5));
        assert_eq!(config.hotel_candidate_limit, 12);
    }

    #[test]
    fn test_invalid_number_names_variable() {
        let mut pairs = CREDENTIALS.to_vec();
        pairs.push(("MAX_ACTIVITIES", "lots"));
        let err = PlannerConfig::from_lookup(lookup(&pairs)).unwrap_err();
        assert!(err.to_string().contains("MAX_ACTIVITIES"));
    }

    #[test]
    fn test_rejects_non_http_base_url() {
        let mut pairs = CREDENTIALS.to_vec();
        pairs.push(("WEATHER_BASE_URL", "ftp://weather"));
        let err = PlannerConfig::from_lookup(lookup(&pairs)).unwrap_err();
        assert!(matches!(err, PlannerError::Config(_)));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut pairs = CREDENTIALS.to_vec();
        pairs.push(("HTTP_TIMEOUT_SECS", "0"));
        assert!(PlannerConfig::from_lookup(lookup(&pairs)).is_err());
    }
}

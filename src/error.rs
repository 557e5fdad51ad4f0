use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlannerError {
    #[error("HTTP request failed: {0}")]
    HttpRequestFailed(String),
    #[error("Request timed out: {0}")]
    Timeout(String),
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    #[error("API error: {0}")]
    ApiError(String),
    #[error("Missing API key: {0}")]
    MissingApiKey(&'static str),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Invalid trip: {0}")]
    InvalidTrip(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("No flights available from {from} to {to}")]
    NoFlightAvailable { from: String, to: String },
    #[error("Completion failed: {0}")]
    Completion(String),
}

impl PlannerError {
    /// Short label used as a metric attribute
    pub fn kind(&self) -> &'static str {
        match self {
            PlannerError::HttpRequestFailed(_) => "HttpRequestFailed",
            PlannerError::Timeout(_) => "Timeout",
            PlannerError::InvalidResponse(_) => "InvalidResponse",
            PlannerError::ApiError(_) => "ApiError",
            PlannerError::MissingApiKey(_) => "MissingApiKey",
            PlannerError::Config(_) => "Config",
            PlannerError::InvalidTrip(_) => "InvalidTrip",
            PlannerError::NotFound(_) => "NotFound",
            PlannerError::NoFlightAvailable { .. } => "NoFlightAvailable",
            PlannerError::Completion(_) => "Completion",
        }
    }

    /// Message shown to the traveler instead of the raw error chain
    pub fn user_message(&self) -> String {
        match self {
            PlannerError::InvalidTrip(message) => message.clone(),
            PlannerError::NoFlightAvailable { from, to } => {
                format!(
                    "No flights could be found from {} to {} on the selected dates.",
                    from, to
                )
            }
            PlannerError::NotFound(what) => format!("Could not find {}.", what),
            PlannerError::MissingApiKey(var) => {
                format!("{} is not set. Add it to your environment or .env file.", var)
            }
            PlannerError::Config(message) => format!("Configuration problem: {}", message),
            PlannerError::Timeout(_) => {
                "An external service took too long to respond. Please try again.".to_string()
            }
            PlannerError::HttpRequestFailed(_)
            | PlannerError::InvalidResponse(_)
            | PlannerError::ApiError(_) => {
                "Unable to retrieve travel data from an external service.".to_string()
            }
            PlannerError::Completion(_) => "Unable to generate the travel plan.".to_string(),
        }
    }
}

impl From<reqwest::Error> for PlannerError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            PlannerError::Timeout(error.to_string())
        } else if error.is_decode() {
            PlannerError::InvalidResponse(error.to_string())
        } else {
            PlannerError::HttpRequestFailed(error.to_string())
        }
    }
}

use crate::error::PlannerError;
use crate::metrics::{inc_lookup_error, inc_lookup_success};
use reqwest::{Client, Response};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error};

const USER_AGENT: &str = concat!("trip-planner/", env!("CARGO_PKG_VERSION"));

/// One client shared by every lookup so all calls get the same timeout
pub fn build_client(timeout: Duration) -> Result<Client, PlannerError> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
        .map_err(|e| PlannerError::Config(format!("Unable to build HTTP client: {}", e)))
}

/// Reads a response body, recording the outcome under `service`
pub async fn read_text(service: &'static str, response: Response) -> Result<String, PlannerError> {
    let status = response.status();
    let text = match response.text().await {
        Ok(text) => text,
        Err(e) => {
            let error = PlannerError::from(e);
            inc_lookup_error(service, status.as_u16() as u64, &error);
            return Err(error);
        }
    };
    if !status.is_success() {
        error!(service, %status, "API call failed: {}", text);
        let error = PlannerError::ApiError(format!(
            "{}: status {}, response: {}",
            service, status, text
        ));
        inc_lookup_error(service, status.as_u16() as u64, &error);
        return Err(error);
    }
    inc_lookup_success(service);
    Ok(text)
}

/// Like [`read_text`], then parses the body as JSON
pub async fn read_json(service: &'static str, response: Response) -> Result<Value, PlannerError> {
    let text = read_text(service, response).await?;
    let data: Value = serde_json::from_str(&text)
        .map_err(|e| PlannerError::InvalidResponse(format!("{}: {}", service, e)))?;
    debug!(service, "Parsed response: {:?}", data);
    Ok(data)
}

/// Records a transport failure (no response at all) and converts it
pub fn send_failed(service: &'static str, e: reqwest::Error) -> PlannerError {
    let error = PlannerError::from(e);
    inc_lookup_error(service, 0, &error);
    error
}

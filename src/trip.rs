use crate::error::PlannerError;
use chrono::NaiveDate;
use serde::Serialize;

/// Validated trip parameters. Construct through [`TripRequest::new`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TripRequest {
    pub travelers: u32,
    pub departure_airport: String,
    pub destination_airport: String,
    pub destination_city: String,
    pub total_budget: f64,
    pub departure_date: NaiveDate,
    pub return_date: NaiveDate,
}

impl TripRequest {
    pub fn new(
        travelers: u32,
        departure_airport: &str,
        destination_airport: &str,
        destination_city: &str,
        total_budget: f64,
        departure_date: NaiveDate,
        return_date: NaiveDate,
    ) -> Result<Self, PlannerError> {
        if travelers == 0 {
            return Err(PlannerError::InvalidTrip(
                "At least one traveler is required.".to_string(),
            ));
        }
        let departure_airport = normalize_iata(departure_airport, "Departure airport")?;
        let destination_airport = normalize_iata(destination_airport, "Destination airport")?;
        let destination_city = destination_city.trim();
        if destination_city.is_empty() {
            return Err(PlannerError::InvalidTrip(
                "Destination city is required.".to_string(),
            ));
        }
        if !total_budget.is_finite() || total_budget <= 0.0 {
            return Err(PlannerError::InvalidTrip(
                "Budget must be a positive amount.".to_string(),
            ));
        }
        if return_date <= departure_date {
            return Err(PlannerError::InvalidTrip(
                "Return date must be after departure date.".to_string(),
            ));
        }
        Ok(Self {
            travelers,
            departure_airport,
            destination_airport,
            destination_city: destination_city.to_string(),
            total_budget,
            departure_date,
            return_date,
        })
    }

    /// Number of nights between departure and return, at least 1 for a valid request
    pub fn nights(&self) -> u32 {
        (self.return_date - self.departure_date).num_days().max(0) as u32
    }
}

fn normalize_iata(code: &str, label: &str) -> Result<String, PlannerError> {
    let code = code.trim();
    if code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic()) {
        Ok(code.to_ascii_uppercase())
    } else {
        Err(PlannerError::InvalidTrip(format!(
            "{} must be a 3-letter IATA code, got '{}'.",
            label, code
        )))
    }
}

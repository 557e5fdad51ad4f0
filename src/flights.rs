use crate::amadeus::AmadeusClient;
use crate::error::PlannerError;
use crate::trip::TripRequest;
use serde::Serialize;
use tracing::{info, instrument, warn};

/// First offer returned for a single leg
#[derive(Debug, Clone, PartialEq)]
pub struct FlightOffer {
    pub carrier_code: String,
    pub price: f64,
}

/// Round-trip quote used for budgeting
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlightQuote {
    /// Carrier of the outbound leg
    pub carrier_code: String,
    pub total_price: f64,
    pub non_stop: bool,
}

impl FlightQuote {
    /// Both legs are required; a one-way result is no quote at all
    pub fn from_legs(
        outbound: Option<FlightOffer>,
        inbound: Option<FlightOffer>,
        non_stop: bool,
    ) -> Option<Self> {
        let (outbound, inbound) = (outbound?, inbound?);
        Some(Self {
            carrier_code: outbound.carrier_code,
            total_price: outbound.price + inbound.price,
            non_stop,
        })
    }
}

/// Looks up both legs non-stop first, then retries allowing connections
#[instrument(
    skip(amadeus, trip),
    fields(from = %trip.departure_airport, to = %trip.destination_airport)
)]
pub async fn round_trip_quote(
    amadeus: &AmadeusClient,
    trip: &TripRequest,
) -> Result<FlightQuote, PlannerError> {
    for non_stop in [true, false] {
        let outbound = amadeus
            .flight_offer(
                &trip.departure_airport,
                &trip.destination_airport,
                trip.departure_date,
                trip.travelers,
                non_stop,
            )
            .await?;
        let inbound = amadeus
            .flight_offer(
                &trip.destination_airport,
                &trip.departure_airport,
                trip.return_date,
                trip.travelers,
                non_stop,
            )
            .await?;
        if let Some(quote) = FlightQuote::from_legs(outbound, inbound, non_stop) {
            info!(
                carrier = %quote.carrier_code,
                price = quote.total_price,
                non_stop,
                "Found round-trip flights"
            );
            return Ok(quote);
        }
        if non_stop {
            warn!("No direct round trip found, retrying with connecting flights");
        }
    }
    Err(PlannerError::NoFlightAvailable {
        from: trip.departure_airport.clone(),
        to: trip.destination_airport.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offer(code: &str, price: f64) -> Option<FlightOffer> {
        Some(FlightOffer {
            carrier_code: code.to_string(),
            price,
        })
    }

    #[test]
    fn test_quote_sums_both_legs() {
        let quote = FlightQuote::from_legs(offer("BA", 310.0), offer("AA", 290.5), true).unwrap();
        assert_eq!(quote.carrier_code, "BA");
        assert_eq!(quote.total_price, 600.5);
        assert!(quote.non_stop);
    }

    #[test]
    fn test_quote_requires_both_legs() {
        assert!(FlightQuote::from_legs(offer("BA", 310.0), None, true).is_none());
        assert!(FlightQuote::from_legs(None, offer("AA", 290.0), false).is_none());
    }
}

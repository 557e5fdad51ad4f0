use crate::planner::TripFacts;
use chrono::{Datelike, NaiveDate};

pub const PREAMBLE: &str = "You are an expert travel planner. Create structured, personalized and \
informative travel plans that stay within the traveler's budget and trip duration.";

/// Renders the collected trip facts into the completion prompt
pub fn build_prompt(facts: &TripFacts) -> String {
    let trip = &facts.trip;
    let mut prompt = String::new();

    prompt.push_str(
        "Based on the details provided below, create a structured, personalized, and informative \
         travel plan. The plan should be balanced, staying within the given budget and trip \
         duration. Please follow the guidelines for each section:\n\n",
    );

    prompt.push_str("**Trip Overview:**\n");
    prompt.push_str(&format!("- Budget: ${:.2}\n", trip.total_budget));
    prompt.push_str(&format!("- Trip Duration: {} nights\n", facts.nights));
    prompt.push_str(&format!("- Number of Travelers: {}\n", trip.travelers));
    prompt.push_str(&format!("- Departure Location: {}\n", trip.departure_airport));
    prompt.push_str(&format!(
        "- Destination: {} ({})\n",
        trip.destination_city, trip.destination_airport
    ));
    prompt.push_str(&format!(
        "- Dates: {} to {}\n\n",
        human_date(trip.departure_date),
        human_date(trip.return_date)
    ));

    prompt.push_str("**Flight Information:**\n");
    prompt.push_str(&format!(
        "- Airline: {} ({})\n",
        facts.airline_name, facts.flight.carrier_code
    ));
    prompt.push_str(&format!("- Price: ${:.2} (return tickets)\n", facts.flight.total_price));
    let non_stop = if facts.flight.non_stop { "Yes" } else { "No" };
    prompt.push_str(&format!("- Non-stop: {}\n", non_stop));
    prompt.push_str(&format!(
        "- Flight Details: Departure from {} and return from {}. Include flight duration and any \
         relevant details.\n",
        trip.departure_airport, trip.destination_airport
    ));
    prompt.push_str(
        "- Add a link to the airline's booking page if you can find one, otherwise leave it \
         out.\n\n",
    );

    prompt.push_str("**Weather Info:**\n");
    prompt.push_str(&format!("- {}\n\n", facts.weather));

    prompt.push_str("**Hotel Recommendation:**\n");
    match facts.selected_hotel() {
        Some(selected) => {
            let hotel = &selected.hotel;
            prompt.push_str(&format!("- {}\n", hotel.name));
            if let Some(price) = hotel.price {
                prompt.push_str(&format!(
                    "- Price: ${:.2} per night ({} nights, ${:.2} total)\n",
                    price, facts.nights, facts.breakdown.hotel_total
                ));
            }
            if let Some(url) = &hotel.url {
                prompt.push_str(&format!("- Book your stay: {}\n", url));
            }
            for alternative in facts.ranking.iter().skip(1) {
                if let Some(price) = alternative.hotel.price {
                    prompt.push_str(&format!(
                        "- Alternative: {} at ${:.2} per night\n",
                        alternative.hotel.name, price
                    ));
                }
            }
        }
        None => prompt.push_str(
            "- No suitable hotel was found. Suggest neighborhoods and typical lodging options \
             instead.\n",
        ),
    }
    prompt.push('\n');

    prompt.push_str("**Activities and Attractions:**\n");
    prompt.push_str(
        "- Based on the duration of the trip, suggest 1-2 activities per day that are relevant to \
         the destination.\n",
    );
    if facts.activities.is_empty() {
        prompt.push_str("- No attraction list is available; use your own knowledge of the city.\n");
    } else {
        prompt.push_str("- Attractions near the city center:\n");
        for activity in &facts.activities {
            prompt.push_str(&format!(
                "  - {} ({}): {}\n",
                activity.name, activity.address, activity.description
            ));
        }
    }
    prompt.push_str(
        "- Include brief descriptions of each activity and links to booking or more details if \
         available.\n\n",
    );

    prompt.push_str("**Day-by-Day Itinerary:**\n");
    prompt.push_str(
        "- Create a detailed day-by-day itinerary covering the arrival and departure days. \
         Include suggested times for activities, transportation tips, and meal recommendations.\n",
    );
    prompt.push_str(
        "- Balance the itinerary to avoid overwhelming the traveler, while keeping the trip \
         fulfilling and diverse.\n\n",
    );

    let breakdown = &facts.breakdown;
    prompt.push_str("**Budget Breakdown:**\n");
    prompt.push_str(&format!("- Flights: ${:.2}\n", breakdown.flight));
    prompt.push_str(&format!("- Hotel: ${:.2}\n", breakdown.hotel_total));
    prompt.push_str(&format!("- Meals (estimate): ${:.2}\n", breakdown.meals));
    prompt.push_str(&format!(
        "- Estimated total: ${:.2}, leaving ${:.2} of the budget\n\n",
        breakdown.total, breakdown.remaining
    ));

    prompt.push_str("**Additional Tips:**\n");
    prompt.push_str(&format!(
        "- Provide useful travel tips, such as local customs, transportation options (e.g. metro, \
         taxis), and cultural insights specific to {}.\n\n",
        trip.destination_city
    ));
    prompt.push_str(
        "Ensure that the plan is practical, engaging, and inspiring. The tone should be exciting \
         and easy to follow, with clear steps for the traveler to enjoy their journey.",
    );
    prompt
}

/// "December 1st 2026"
pub fn human_date(date: NaiveDate) -> String {
    format!(
        "{} {}{} {}",
        date.format("%B"),
        date.day(),
        day_suffix(date.day()),
        date.year()
    )
}

fn day_suffix(day: u32) -> &'static str {
    match day {
        11..=13 => "th",
        _ => match day % 10 {
            1 => "st",
            2 => "nd",
            3 => "rd",
            _ => "th",
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocator::{BudgetBreakdown, HotelCandidate, RankedHotel};
    use crate::flights::FlightQuote;
    use crate::places::Activity;
    use crate::trip::TripRequest;
    use crate::weather::WeatherSummary;
    use rstest::rstest;

    fn facts(ranking: Vec<RankedHotel>, activities: Vec<Activity>) -> TripFacts {
        let trip = TripRequest::new(
            2,
            "LHR",
            "CDG",
            "Paris",
            2500.0,
            NaiveDate::from_ymd_opt(2026, 6, 1).unwrap(),
            NaiveDate::from_ymd_opt(2026, 6, 4).unwrap(),
        )
        .unwrap();
        let selected = ranking.first().map(|r| &r.hotel);
        let breakdown = BudgetBreakdown::estimate(2500.0, 400.0, selected, 3, 2, 40.0);
        TripFacts {
            nights: trip.nights(),
            trip,
            flight: FlightQuote {
                carrier_code: "AF".into(),
                total_price: 400.0,
                non_stop: true,
            },
            airline_name: "Air France".into(),
            weather: WeatherSummary {
                location: "paris".into(),
                month: "june".into(),
                average_temperature: Some("21°C".into()),
            },
            activities,
            ranking,
            breakdown,
        }
    }

    fn ranked(name: &str, price: f64, url: Option<&str>) -> RankedHotel {
        RankedHotel {
            hotel: HotelCandidate {
                name: name.into(),
                price: Some(price),
                url: url.map(str::to_string),
            },
            cost_delta: 0.0,
        }
    }

    #[test]
    fn test_prompt_contains_all_sections() {
        let prompt = build_prompt(&facts(
            vec![ranked("Hotel Lutetia", 320.0, Some("https://lutetia.example"))],
            vec![Activity {
                name: "Louvre Museum".into(),
                address: "Rue de Rivoli".into(),
                description: "Art museum".into(),
            }],
        ));
        for section in [
            "**Trip Overview:**",
            "**Flight Information:**",
            "**Weather Info:**",
            "**Hotel Recommendation:**",
            "**Activities and Attractions:**",
            "**Day-by-Day Itinerary:**",
            "**Budget Breakdown:**",
            "**Additional Tips:**",
        ] {
            assert!(prompt.contains(section), "missing {}", section);
        }
        assert!(prompt.contains("Air France (AF)"));
        assert!(prompt.contains("Non-stop: Yes"));
        assert!(prompt.contains("21°C"));
        assert!(prompt.contains("Hotel Lutetia"));
        assert!(prompt.contains("$320.00 per night (3 nights, $960.00 total)"));
        assert!(prompt.contains("https://lutetia.example"));
        assert!(prompt.contains("Louvre Museum (Rue de Rivoli): Art museum"));
        assert!(prompt.contains("June 1st 2026 to June 4th 2026"));
    }

    #[test]
    fn test_prompt_without_hotel_or_activities() {
        let prompt = build_prompt(&facts(Vec::new(), Vec::new()));
        assert!(prompt.contains("No suitable hotel was found"));
        assert!(prompt.contains("No attraction list is available"));
        assert!(prompt.contains("- Hotel: $0.00"));
    }

    #[test]
    fn test_prompt_lists_alternatives() {
        let prompt = build_prompt(&facts(
            vec![ranked("First", 300.0, None), ranked("Second", 280.0, None)],
            Vec::new(),
        ));
        assert!(prompt.contains("Alternative: Second at $280.00 per night"));
    }

    #[rstest]
    #[case(1, "st")]
    #[case(2, "nd")]
    #[case(3, "rd")]
    #[case(4, "th")]
    #[case(11, "th")]
    #[case(12, "th")]
    #[case(13, "th")]
    #[case(21, "st")]
    #[case(22, "nd")]
    #[case(31, "st")]
    fn test_day_suffix(#[case] day: u32, #[case] expected: &str) {
        assert_eq!(day_suffix(day), expected);
    }
}

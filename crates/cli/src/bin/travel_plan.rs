//! Plans a trip in five stages: flights, hotels, itinerary, budget and a
//! marketing summary.

use std::process::ExitCode;

use clap::Parser;
use plans::TravelRequest;

/// Generate a travel plan with a chain of LLM stages
#[derive(Debug, Parser)]
#[command(name = "travel-plan", version)]
struct Args {
    /// Destination country or city [default: Iceland]
    destination: Option<String>,

    /// Trip length [default: 5 days]
    duration: Option<String>,

    /// Departure city [default: New York]
    departure_city: Option<String>,

    /// Travel window [default: January 15-20, 2026]
    trip_dates: Option<String>,

    /// Number of travelers [default: 2]
    #[arg(value_parser = clap::value_parser!(u32).range(1..))]
    travelers: Option<u32>,

    /// budget, mid-range or luxury [default: mid-range]
    #[arg(value_name = "BUDGET")]
    budget_preference: Option<String>,
}

impl Args {
    fn into_request(self) -> TravelRequest {
        let defaults = TravelRequest::default();
        TravelRequest {
            destination: self.destination.unwrap_or(defaults.destination),
            duration: self.duration.unwrap_or(defaults.duration),
            trip_dates: self.trip_dates.unwrap_or(defaults.trip_dates),
            departure_city: self.departure_city.unwrap_or(defaults.departure_city),
            travelers: self.travelers.unwrap_or(defaults.travelers),
            budget_preference: self
                .budget_preference
                .unwrap_or(defaults.budget_preference),
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();
    let request = Args::parse().into_request();
    cli::launch(&request).await
}

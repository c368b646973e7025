//! Travel planning: flights, hotels, itinerary, budget and a marketing summary.
//!
//! Stages run in that order and each one sees every earlier output. The first
//! four carry a research-brief tool; the briefs are instructions for the model
//! (what to research and where), not fetched data.

use pipeline::{Pipeline, PipelineError, ResearchTool, RunParameters, Stage};

use crate::{param_name, pipeline_name, slug, stage_name, tool_name, Plan};

/// A trip to plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TravelRequest {
    /// Country or city, e.g. `Iceland`.
    pub destination: String,
    /// Trip length, e.g. `5 days`.
    pub duration: String,
    /// Travel window, e.g. `January 15-20, 2026`.
    pub trip_dates: String,
    pub departure_city: String,
    pub travelers: u32,
    /// `budget`, `mid-range` or `luxury`; free text is passed through.
    pub budget_preference: String,
}

impl Default for TravelRequest {
    fn default() -> Self {
        Self {
            destination: "Iceland".to_string(),
            duration: "5 days".to_string(),
            trip_dates: "January 15-20, 2026".to_string(),
            departure_city: "New York".to_string(),
            travelers: 2,
            budget_preference: "mid-range".to_string(),
        }
    }
}

/// The city hotels are searched in: the capital for a few well-known country
/// destinations, otherwise the destination itself.
pub fn hotel_location(destination: &str) -> String {
    match destination.trim().to_lowercase().as_str() {
        "iceland" => "Reykjavik".to_string(),
        "france" => "Paris".to_string(),
        "japan" => "Tokyo".to_string(),
        _ => destination.trim().to_string(),
    }
}

/// System prompt for a persona: who the model is, its background, its goal.
fn persona(role: &str, backstory: &str, goal: &str) -> String {
    format!("You are a {role}.\n{backstory}\n\nYour goal: {goal}")
}

/// User prompt: the task, the expected deliverable, then earlier outputs.
fn task(description: &str, expected: &str, context: &[(&str, &str)]) -> String {
    let mut prompt = format!("{description}\n\nExpected output: {expected}");
    for (title, stage) in context {
        let section = format!("\n\n{title} (from the earlier stage):\n{{{stage}}}");
        prompt.push_str(&section);
    }
    prompt
}

// ---------------------------------------------------------------------------
// Research briefs
// ---------------------------------------------------------------------------

const FLIGHT_BRIEF: &str = "\
Research flights from {departure_city} to {destination}. Report:
1. Current flight options with prices (Kayak, Skyscanner, Google Flights)
2. Airlines operating the route
3. Flight durations and layovers
4. Best booking windows and price trends
5. Seasonal price variation for {trip_dates}";

const HOTEL_BRIEF: &str = "\
Research hotels in {hotel_location} for {trip_dates}. Report:
1. Top-rated hotels with guest reviews (Booking.com, TripAdvisor, Google Hotels)
2. Current pricing for the whole stay
3. Amenities and facilities
4. Location and proximity to attractions
5. Ratings and the reasons guests recommend them
Include budget, mid-range and luxury options.";

const ATTRACTIONS_BRIEF: &str = "\
Research attractions and activities in {destination}. Report:
1. Top-rated attractions and typical visit times
2. Popular day tours and multi-day excursions
3. Outdoor activities
4. Cultural sites and local experiences
5. Tour prices and entrance fees
6. Best time of day to visit each location
7. Transport options between sites
Include lesser-known but highly rated activities that fit into {trip_duration}.";

const COSTS_BRIEF: &str = "\
Research what a trip to {destination} costs. Report:
1. Average meal prices (budget, mid-range, restaurants)
2. Public transport and rental car prices
3. Tour, activity and entrance fees
4. Estimated daily costs per budget level
5. Money-saving tips, currency and payment methods";

impl TravelRequest {
    fn stages(&self) -> Result<Vec<Stage>, PipelineError> {
        let flights = Stage::new(
            stage_name("flights")?,
            "Flight Options",
            persona(
                "Senior Aviation Travel Consultant",
                "You have fifteen years in the travel industry, know airline pricing and \
                 seasonal trends, and balance cost against comfort and convenience.",
                "Recommend the best flight options for the {destination} trip ({trip_dates}), \
                 weighing dates, airlines, prices and durations.",
            ),
            task(
                "Compile two or three realistic flight options from {departure_city} to \
                 {destination} for {trip_dates} and {travelers} travelers, with airlines, \
                 departure and arrival times, durations and current prices. Recommend the \
                 best value considering price and convenience.",
                "A short report of flight options with a reasoned recommendation.",
                &[],
            ),
        )
        .with_tool(ResearchTool::new(
            tool_name("search_flight_prices")?,
            "flight prices and options",
            FLIGHT_BRIEF,
        ));

        let hotels = Stage::new(
            stage_name("hotels")?,
            "Accommodation",
            persona(
                "Elite Hospitality Concierge",
                "You have visited hundreds of properties, read between the lines of guest \
                 reviews, and match travelers with stays from budget gems to five-star resorts.",
                "Suggest top-rated hotels in {hotel_location} for the {destination} trip \
                 ({trip_dates}), considering amenities, location and value for money.",
            ),
            task(
                "Recommend three or four hotels in {hotel_location} for {trip_dates}, \
                 mixing budget, mid-range and luxury with a lean towards {budget_preference}. \
                 Give each hotel's name, guest rating, nightly price, amenities and why it \
                 suits this trip.",
                "A curated hotel list with ratings, prices and personalised reasons.",
                &[("Flight Options", "flights")],
            ),
        )
        .with_tool(ResearchTool::new(
            tool_name("search_hotel_options")?,
            "hotel availability and pricing",
            HOTEL_BRIEF,
        ));

        let itinerary = Stage::new(
            stage_name("itinerary")?,
            "Day-by-Day Itinerary",
            persona(
                "Master Travel Experience Designer",
                "You lived in {destination} for years, lead tours there, and pace itineraries \
                 around weather, crowds and the best times to visit each place.",
                "Create a day-by-day plan that makes the most of {trip_duration} in \
                 {destination}.",
            ),
            task(
                "Create a detailed {trip_duration} itinerary for {destination} ({trip_dates}). \
                 Plan each day's attractions with opening hours, entry fees, travel times \
                 between locations and activity durations, and account for typical weather \
                 in this period.",
                "A realistic, well-paced day-by-day itinerary with practical tips.",
                &[("Flight Options", "flights"), ("Accommodation", "hotels")],
            ),
        )
        .with_tool(ResearchTool::new(
            tool_name("search_attractions_activities")?,
            "attractions and activities",
            ATTRACTIONS_BRIEF,
        ));

        let budget = Stage::new(
            stage_name("budget")?,
            "Trip Budget",
            persona(
                "Travel Finance Optimization Expert",
                "You specialise in travel economics, account for seasonal prices and \
                 currency swings, and uncover hidden fees before they surprise travelers.",
                "Calculate the total trip cost for {destination} and find savings without \
                 lowering quality.",
            ),
            task(
                "Using the flights, hotels and itinerary above, calculate a budget for the \
                 {trip_duration} {destination} trip for {travelers} travelers: flights, \
                 accommodation, meals, activities, local transport and miscellaneous costs. \
                 Give totals for budget, mid-range and luxury levels, highlight the \
                 {budget_preference} option, and suggest cost-saving tips.",
                "An itemised budget with totals per level and cost-saving recommendations.",
                &[
                    ("Flight Options", "flights"),
                    ("Accommodation", "hotels"),
                    ("Day-by-Day Itinerary", "itinerary"),
                ],
            ),
        )
        .with_tool(ResearchTool::new(
            tool_name("search_travel_costs")?,
            "meal, transport and activity costs",
            COSTS_BRIEF,
        ));

        let marketing = Stage::new(
            stage_name("marketing")?,
            "Marketing Summary",
            persona(
                "Travel Marketing Strategist",
                "You write travel copy that turns browsers into bookers by pairing \
                 aspirational storytelling with practical detail.",
                "Write a compelling summary of the {destination} trip package.",
            ),
            task(
                "Write a marketing summary for the {trip_duration} {destination} package: \
                 an engaging headline and opening, three to five unique selling points, the \
                 key package details, answers to likely traveler concerns (value, safety, \
                 experience) and a strong call to action. Keep it under \
                 {max_output_words} words.",
                "A polished summary with headline, body copy and call to action.",
                &[
                    ("Flight Options", "flights"),
                    ("Accommodation", "hotels"),
                    ("Day-by-Day Itinerary", "itinerary"),
                    ("Trip Budget", "budget"),
                ],
            ),
        )
        .with_max_output_words(300);

        Ok(vec![flights, hotels, itinerary, budget, marketing])
    }
}

impl Plan for TravelRequest {
    fn parameters(&self) -> Result<RunParameters, PipelineError> {
        let hotels = hotel_location(&self.destination);
        Ok(RunParameters::new()
            .with(param_name("destination")?, &self.destination)
            .with(param_name("trip_duration")?, &self.duration)
            .with(param_name("trip_dates")?, &self.trip_dates)
            .with(param_name("departure_city")?, &self.departure_city)
            .with(param_name("travelers")?, self.travelers.to_string())
            .with(param_name("budget_preference")?, &self.budget_preference)
            .with(param_name("hotel_location")?, hotels))
    }

    fn pipeline(&self) -> Result<Pipeline, PipelineError> {
        Ok(Pipeline::new(
            pipeline_name("travel-planning")?,
            "Travel Plan - {trip_duration} Trip to {destination}",
            "Five specialists (flights, hotels, itinerary, budget, marketing) each built \
             upon the previous outputs to produce a complete travel plan.",
            self.stages()?,
        )?
        .with_notes([
            "Prices and availability reflect the model's research at generation time",
            "Hotel availability and prices vary by booking date",
            "Verify weather conditions and attraction hours before travel",
        ]))
    }

    fn file_stem(&self) -> String {
        let place = slug(&self.destination);
        if place.is_empty() {
            "travel_plan".to_string()
        } else {
            format!("travel_plan_{place}")
        }
    }
}

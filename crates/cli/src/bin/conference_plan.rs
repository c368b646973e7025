//! Plans a tech conference in five stages: theme, speakers, schedule,
//! logistics and marketing.

use std::process::ExitCode;

use clap::Parser;
use plans::ConferenceRequest;

/// Generate a conference plan with a chain of LLM stages
#[derive(Debug, Parser)]
#[command(name = "conference-plan", version)]
struct Args {
    /// Conference name [default: AI Horizons 2026]
    name: Option<String>,

    /// Conference domain [default: AI/ML technology]
    #[arg(value_name = "TYPE")]
    conference_type: Option<String>,

    /// Conference length [default: 3 days]
    duration: Option<String>,
}

impl Args {
    fn into_request(self) -> ConferenceRequest {
        let defaults = ConferenceRequest::default();
        ConferenceRequest {
            name: self.name.unwrap_or(defaults.name),
            conference_type: self.conference_type.unwrap_or(defaults.conference_type),
            duration: self.duration.unwrap_or(defaults.duration),
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();
    let request = Args::parse().into_request();
    cli::launch(&request).await
}

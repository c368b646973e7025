//! Conference planning: five stages from theme to marketing.
//!
//! | Stage | Reads | Advisory length |
//! |-------|-------|-----------------|
//! | `theme` | parameters | 200 words |
//! | `speakers` | `theme` | 200 words |
//! | `schedule` | `theme`, `speakers` | 250 words |
//! | `logistics` | `schedule`, `theme` | 200 words |
//! | `marketing` | `theme`, `schedule` | 200 words |

use pipeline::{Pipeline, PipelineError, RunParameters, Stage};

use crate::{param_name, pipeline_name, stage_name, Plan};

/// A tech conference to plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConferenceRequest {
    /// Event name, e.g. `AI Horizons 2026`.
    pub name: String,
    /// Domain of the event, e.g. `AI/ML technology`.
    pub conference_type: String,
    /// Length of the event, e.g. `3 days`.
    pub duration: String,
}

impl Default for ConferenceRequest {
    fn default() -> Self {
        Self {
            name: "AI Horizons 2026".to_string(),
            conference_type: "AI/ML technology".to_string(),
            duration: "3 days".to_string(),
        }
    }
}

const THEME_SYSTEM: &str = "\
You are a conference theme strategist specializing in {conference_type} events.
Define a compelling conference theme and vision. Include:
- A creative, memorable theme or tagline
- The target audience and who should attend
- Three or four main topic tracks
- The conference goals and value proposition
Keep it concise - {max_output_words} words.";

const THEME_USER: &str = "\
Create a compelling theme and vision for '{conference_name}', a {duration} {conference_type} conference.";

const SPEAKERS_SYSTEM: &str = "\
You are a speaker curator for {conference_type} conferences.
Based on the conference theme, identify:
- Six to eight speaker profiles (roles and expertise, not specific names)
- Session types (keynotes, workshops, panels, lightning talks)
- Topic suggestions for each track
- Speaking format recommendations
Keep it concise - {max_output_words} words.";

const SPEAKERS_USER: &str = "\
Conference Theme and Vision:
{theme}

Now identify ideal speaker profiles and session topics for this {duration} conference.";

const SCHEDULE_SYSTEM: &str = "\
You are a conference schedule planner.
Based on the theme and speaker information, create a detailed {duration} agenda:
- A day-by-day breakdown
- Time slots for each session, using realistic hours (9am-5pm)
- A balance of keynotes, workshops, panels and networking
- Breaks, meals and networking time
- Parallel tracks where applicable
Keep it structured and clear - {max_output_words} words.";

const SCHEDULE_USER: &str = "\
Conference Theme:
{theme}

Speaker & Session Information:
{speakers}

Create a detailed {duration} conference schedule.";

const LOGISTICS_SYSTEM: &str = "\
You are a conference logistics coordinator.
Based on the schedule and expected attendees, plan:
- Venue requirements (room sizes, AV equipment, layout)
- Catering (meals, breaks, dietary considerations)
- Registration and check-in
- Technology (WiFi, streaming, event app)
- Contingency plans
Keep it practical and concise - {max_output_words} words.";

const LOGISTICS_USER: &str = "\
Conference Schedule:
{schedule}

Conference Theme & Audience:
{theme}

Plan the logistics for this conference.";

const MARKETING_SYSTEM: &str = "\
You are a conference marketing strategist.
Based on all conference details, create a marketing plan:
- Key messages and positioning
- Promotion channels (social media, email, partnerships)
- Early-bird versus regular pricing
- A promotional timeline starting three months before the event
- Content marketing ideas
Keep it actionable - {max_output_words} words.";

const MARKETING_USER: &str = "\
Conference Details:

Theme & Vision:
{theme}

Schedule Overview:
{schedule}

Create a comprehensive marketing strategy for this conference.";

impl Plan for ConferenceRequest {
    fn parameters(&self) -> Result<RunParameters, PipelineError> {
        Ok(RunParameters::new()
            .with(param_name("conference_name")?, &self.name)
            .with(param_name("conference_type")?, &self.conference_type)
            .with(param_name("duration")?, &self.duration))
    }

    fn pipeline(&self) -> Result<Pipeline, PipelineError> {
        let stages = vec![
            Stage::new(
                stage_name("theme")?,
                "Theme & Vision",
                THEME_SYSTEM,
                THEME_USER,
            )
            .with_max_output_words(200),
            Stage::new(
                stage_name("speakers")?,
                "Speakers & Topics",
                SPEAKERS_SYSTEM,
                SPEAKERS_USER,
            )
            .with_max_output_words(200),
            Stage::new(
                stage_name("schedule")?,
                "Conference Schedule",
                SCHEDULE_SYSTEM,
                SCHEDULE_USER,
            )
            .with_max_output_words(250),
            Stage::new(
                stage_name("logistics")?,
                "Logistics Plan",
                LOGISTICS_SYSTEM,
                LOGISTICS_USER,
            )
            .with_max_output_words(200),
            Stage::new(
                stage_name("marketing")?,
                "Marketing Strategy",
                MARKETING_SYSTEM,
                MARKETING_USER,
            )
            .with_max_output_words(200),
        ];

        Pipeline::new(
            pipeline_name("conference-planning")?,
            "Conference Planning - {conference_name}",
            "Five stages (theme, speakers, schedule, logistics, marketing) each built \
             upon the previous outputs to create a comprehensive conference plan.",
            stages,
        )
    }

    fn file_stem(&self) -> String {
        "conference_plan".to_string()
    }
}

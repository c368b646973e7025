//! Plain-text report rendering.
//!
//! [`render`] is a pure function of a [`RunResult`]: it reads only the values
//! stored in the result (including its timestamps), so rendering the same
//! result twice yields byte-identical text.

use crate::{params, RunResult};

const WIDTH: usize = 80;

/// Renders `result` as a human-readable document.
///
/// Layout: a header block with run metadata and parameters, one section per
/// stage in pipeline order, and a summary trailer. Stage outputs are copied
/// exactly as stored.
pub fn render(result: &RunResult) -> String {
    let heavy = "=".repeat(WIDTH);
    let light = "-".repeat(WIDTH);
    let mut doc = String::new();

    push_line(&mut doc, &heavy);
    push_line(&mut doc, &result.title.to_uppercase());
    push_line(&mut doc, &heavy);
    let started = result.started_at.display_human();
    let finished = result.finished_at.display_human();
    let settings = &result.settings;
    push_line(&mut doc, &format!("Run: {}", result.run_id));
    push_line(&mut doc, &format!("Started: {started}"));
    push_line(&mut doc, &format!("Finished: {finished}"));
    push_line(&mut doc, &format!("Model: {}", settings.model));
    push_line(&mut doc, &format!("Temperature: {}", settings.temperature));
    for (name, value) in result.parameters.iter() {
        let label = params::label(name.as_str());
        push_line(&mut doc, &format!("{label}: {value}"));
    }
    if !result.notes.is_empty() {
        push_line(&mut doc, "\nNotes:");
        for note in &result.notes {
            push_line(&mut doc, &format!("- {note}"));
        }
    }

    for record in &result.stages {
        push_line(&mut doc, &format!("\n{light}"));
        push_line(&mut doc, &record.title.to_uppercase());
        push_line(&mut doc, &light);
        doc.push_str(&record.output);
        if !record.output.ends_with('\n') {
            doc.push('\n');
        }
    }

    push_line(&mut doc, &format!("\n{heavy}"));
    push_line(&mut doc, "SUMMARY");
    push_line(&mut doc, &heavy);
    push_line(&mut doc, &format!("Stages completed: {}", result.len()));
    for (i, record) in result.stages.iter().enumerate() {
        push_line(&mut doc, &format!("{}. {}", i + 1, record.title));
    }
    if let Some(usage) = result.total_usage() {
        push_line(
            &mut doc,
            &format!(
                "Tokens used: {} (prompt {}, completion {})",
                usage.total(),
                usage.prompt,
                usage.completion
            ),
        );
    }
    push_line(&mut doc, &format!("\n{}", result.purpose));

    doc
}

fn push_line(doc: &mut String, text: &str) {
    doc.push_str(text);
    doc.push('\n');
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use uuid::Uuid;

    use super::*;
    use crate::{
        GenerationSettings, ModelId, ParameterName, PipelineName, RunId, RunParameters, StageName,
        StageRecord, Temperature, Timestamp, TokenCount, TokenUsage,
    };

    fn at(minute: u32) -> Timestamp {
        Timestamp::from_utc(Utc.with_ymd_and_hms(2026, 1, 15, 9, minute, 0).unwrap())
    }

    fn record(name: &str, title: &str, output: &str, usage: Option<TokenUsage>) -> StageRecord {
        StageRecord {
            name: StageName::new(name).unwrap(),
            title: title.to_string(),
            system_prompt: String::new(),
            user_prompt: String::new(),
            output: output.to_string(),
            usage,
            started_at: at(1),
            finished_at: at(2),
        }
    }

    fn result() -> RunResult {
        RunResult {
            run_id: RunId::from_uuid(Uuid::nil()),
            pipeline: PipelineName::new("demo").unwrap(),
            title: "Trip to Iceland".to_string(),
            purpose: "Each stage built upon the previous outputs.".to_string(),
            notes: vec!["Verify prices before booking".to_string()],
            parameters: RunParameters::new()
                .with(ParameterName::new("destination").unwrap(), "Iceland")
                .with(
                    ParameterName::new("trip_dates").unwrap(),
                    "January 15-20, 2026",
                ),
            settings: GenerationSettings::new(
                ModelId::new("stub-model").unwrap(),
                Temperature::new(0.7).unwrap(),
                TokenCount::new(1500),
            )
            .unwrap(),
            started_at: at(0),
            finished_at: at(5),
            stages: vec![
                record(
                    "flights",
                    "Flight Options",
                    "OUT:flights\n",
                    Some(TokenUsage::new(100, 50)),
                ),
                record(
                    "hotels",
                    "Hotel Picks",
                    "OUT:hotels",
                    Some(TokenUsage::new(200, 60)),
                ),
            ],
        }
    }

    #[test]
    fn renders_header_sections_and_trailer() {
        let rule = "=".repeat(80);
        let dash = "-".repeat(80);
        let expected = format!(
            "{rule}\nTRIP TO ICELAND\n{rule}\n\
             Run: 00000000-0000-0000-0000-000000000000\n\
             Started: 2026-01-15 09:00:00 UTC\n\
             Finished: 2026-01-15 09:05:00 UTC\n\
             Model: stub-model\n\
             Temperature: 0.70\n\
             Destination: Iceland\n\
             Trip Dates: January 15-20, 2026\n\
             \nNotes:\n- Verify prices before booking\n\
             \n{dash}\nFLIGHT OPTIONS\n{dash}\nOUT:flights\n\
             \n{dash}\nHOTEL PICKS\n{dash}\nOUT:hotels\n\
             \n{rule}\nSUMMARY\n{rule}\n\
             Stages completed: 2\n\
             1. Flight Options\n\
             2. Hotel Picks\n\
             Tokens used: 410 (prompt 300, completion 110)\n\
             \nEach stage built upon the previous outputs.\n"
        );
        assert_eq!(render(&result()), expected);
    }

    #[test]
    fn rendering_is_deterministic() {
        let result = result();
        assert_eq!(render(&result), render(&result));
    }

    #[test]
    fn sections_follow_stage_order() {
        let doc = render(&result());
        let flights = doc.find("FLIGHT OPTIONS").unwrap();
        let hotels = doc.find("HOTEL PICKS").unwrap();
        assert!(flights < hotels);
    }

    #[test]
    fn omits_usage_and_notes_when_absent() {
        let mut result = result();
        result.notes.clear();
        for stage in &mut result.stages {
            stage.usage = None;
        }
        let doc = render(&result);
        assert!(!doc.contains("Tokens used"));
        assert!(!doc.contains("Notes:"));
    }

    #[test]
    fn stage_output_is_copied_verbatim() {
        let output = "Line one\n    indented code block   \n\n";
        let mut result = result();
        result.stages[0].output = output.to_string();

        let doc = render(&result);

        let dash = "-".repeat(80);
        let section = format!("{dash}\nFLIGHT OPTIONS\n{dash}\n{output}\n{dash}\nHOTEL PICKS");
        assert!(doc.contains(&section), "{doc}");
    }
}

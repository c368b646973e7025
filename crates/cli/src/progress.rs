//! Console progress for interactive runs.

use pipeline::{
    params, GenerationError, Pipeline, RunId, RunObserver, RunParameters, Stage, StageRecord,
};

const RULE_WIDTH: usize = 80;
const PREVIEW_CHARS: usize = 200;

/// Prints stage banners and output previews to stdout.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleProgress;

impl RunObserver for ConsoleProgress {
    fn run_started(&self, run_id: RunId, pipeline: &Pipeline, parameters: &RunParameters) {
        let rule = "=".repeat(RULE_WIDTH);
        println!("{rule}");
        println!("{} ({} stages)", pipeline.name(), pipeline.stages().len());
        println!("Run {run_id}");
        println!("{rule}");
        for (name, value) in parameters.iter() {
            println!("  {}: {value}", params::label(name.as_str()));
        }
        println!();
    }

    fn stage_started(&self, index: usize, total: usize, stage: &Stage) {
        println!("[{}/{total}] {}...", index + 1, stage.title);
    }

    fn stage_completed(&self, _index: usize, _total: usize, record: &StageRecord) {
        println!("  done: {}", preview(&record.output, PREVIEW_CHARS));
        println!();
    }

    fn stage_failed(&self, index: usize, total: usize, stage: &Stage, error: &GenerationError) {
        println!("[{}/{total}] {} failed: {error}", index + 1, stage.title);
    }
}

/// First `max_chars` characters of `text` on one line, with `...` when cut.
pub fn preview(text: &str, max_chars: usize) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    match flat.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &flat[..cut]),
        None => flat,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn preview_flattens_and_cuts_on_char_boundaries() {
        assert_eq!(
            preview("Day 1:\n  Reykjavík\twalk", 100),
            "Day 1: Reykjavík walk"
        );
        assert_eq!(preview("Reykjavík", 8), "Reykjaví...");
        assert_eq!(preview("", 10), "");
    }
}

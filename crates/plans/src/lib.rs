//! Chainplan built-in pipelines.
//!
//! Each plan turns a typed request (a conference to organise, a trip to take)
//! into [`RunParameters`] and a five-stage [`Pipeline`]. The "agents" of a plan
//! are plain data: a role-flavoured system prompt, a task prompt and, for the
//! travel plan, a research-brief tool. The generic
//! [`PipelineRunner`](pipeline::PipelineRunner) executes them all the same way.
//!
//! ## Architectural Layer
//!
//! **Orchestration content.** Plans contain prompts and parameter derivation
//! only; no I/O and no execution logic.

pub mod conference;
pub mod travel;

pub use conference::ConferenceRequest;
pub use travel::TravelRequest;

use pipeline::{
    ParameterName, Pipeline, PipelineError, PipelineName, RunParameters, StageName, ToolName,
};

/// A request that can be planned by a pipeline run.
pub trait Plan {
    /// The run parameters derived from this request.
    fn parameters(&self) -> Result<RunParameters, PipelineError>;

    /// The stage catalogue for this request.
    fn pipeline(&self) -> Result<Pipeline, PipelineError>;

    /// File-name stem for the persisted document, e.g. `travel_plan_iceland`.
    fn file_stem(&self) -> String;
}

// ---------------------------------------------------------------------------
// Key helpers. Plans declare their keys as literals; an invalid literal is a
// definition bug, reported as a configuration error rather than a panic.
// ---------------------------------------------------------------------------

fn invalid(kind: &str, value: &str) -> PipelineError {
    PipelineError::Configuration {
        message: format!("'{value}' is not a valid {kind}"),
    }
}

pub(crate) fn stage_name(value: &str) -> Result<StageName, PipelineError> {
    StageName::new(value).ok_or_else(|| invalid("stage name", value))
}

pub(crate) fn param_name(value: &str) -> Result<ParameterName, PipelineError> {
    ParameterName::new(value).ok_or_else(|| invalid("parameter name", value))
}

pub(crate) fn tool_name(value: &str) -> Result<ToolName, PipelineError> {
    ToolName::new(value).ok_or_else(|| invalid("tool name", value))
}

pub(crate) fn pipeline_name(value: &str) -> Result<PipelineName, PipelineError> {
    PipelineName::new(value).ok_or_else(|| invalid("pipeline name", value))
}

/// Lower-cases `value` and replaces every run of non-alphanumeric characters
/// with a single `_`: `"New Zealand"` → `"new_zealand"`.
pub fn slug(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if c.is_alphanumeric() {
            out.extend(c.to_lowercase());
        } else if !out.is_empty() && !out.ends_with('_') {
            out.push('_');
        }
    }
    while out.ends_with('_') {
        out.pop();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_collapses_separators() {
        assert_eq!(slug("Iceland"), "iceland");
        assert_eq!(slug("  New Zealand!! "), "new_zealand");
        assert_eq!(slug("São Paulo"), "são_paulo");
        assert_eq!(slug("---"), "");
    }
}

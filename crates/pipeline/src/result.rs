//! Records produced by a pipeline run.

use serde::{Deserialize, Serialize};

use crate::{
    GenerationSettings, PipelineName, RunId, RunParameters, StageName, Timestamp, TokenUsage,
};

/// The recorded input and output of one completed stage.
///
/// Created once, when the stage's generation call succeeds, and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageRecord {
    pub name: StageName,
    /// Display heading copied from the stage definition.
    pub title: String,
    /// Rendered system message sent to the provider.
    pub system_prompt: String,
    /// Rendered user message sent to the provider, research briefs included.
    pub user_prompt: String,
    /// Generated text, stored verbatim.
    pub output: String,
    pub usage: Option<TokenUsage>,
    pub started_at: Timestamp,
    pub finished_at: Timestamp,
}

/// The complete ordered record of a successful run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    pub run_id: RunId,
    pub pipeline: PipelineName,
    /// Report title, rendered from the pipeline's title template.
    pub title: String,
    pub purpose: String,
    pub notes: Vec<String>,
    pub parameters: RunParameters,
    pub settings: GenerationSettings,
    pub started_at: Timestamp,
    pub finished_at: Timestamp,
    /// One record per stage, in pipeline order.
    pub stages: Vec<StageRecord>,
}

impl RunResult {
    /// Returns the stored output of stage `name`.
    pub fn output(&self, name: &str) -> Option<&str> {
        self.stages
            .iter()
            .find(|record| record.name.as_str() == name)
            .map(|record| record.output.as_str())
    }

    /// Stage names in execution order.
    pub fn stage_names(&self) -> Vec<&StageName> {
        self.stages.iter().map(|record| &record.name).collect()
    }

    /// Sum of the usage reported for each stage, or `None` if the provider
    /// reported none.
    pub fn total_usage(&self) -> Option<TokenUsage> {
        self.stages
            .iter()
            .filter_map(|record| record.usage)
            .fold(None, |acc, usage| {
                let mut total = acc.unwrap_or_default();
                total += usage;
                Some(total)
            })
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

//! Top-level error type for the pipeline domain.
//!
//! [`PipelineError`] covers every condition that stops a run: an invalid
//! pipeline definition, parameters or templates that cannot be resolved (both
//! detected before the first generation call), and a failed generation call.
//! Provider failures themselves are described by
//! [`GenerationError`](crate::GenerationError).

use thiserror::Error;

use crate::{GenerationError, PipelineName, StageName, StageRecord};

/// Where a template lives, for error messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSite {
    /// The pipeline's report title.
    Title,
    /// A stage's system or user template, or one of its tools.
    Stage(StageName),
}

impl std::fmt::Display for TemplateSite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Title => write!(f, "pipeline title"),
            Self::Stage(name) => write!(f, "stage '{name}'"),
        }
    }
}

/// Errors that halt a pipeline run.
///
/// Nothing is retried. Every variant except [`PipelineError::Generation`] is
/// raised before any stage runs.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Settings or inputs are missing or invalid.
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration problem.
        message: String,
    },

    /// A pipeline was declared without stages.
    #[error("Pipeline '{pipeline}' has no stages")]
    EmptyPipeline { pipeline: PipelineName },

    /// Two stages share a name.
    #[error("Stage '{stage}' is declared more than once")]
    DuplicateStage { stage: StageName },

    /// A run parameter shadows a stage name or a reserved placeholder.
    #[error("Run parameter '{parameter}' collides with a stage name or reserved placeholder")]
    ParameterCollision { parameter: String },

    /// A template references a stage that does not run strictly before it.
    #[error("{site} references '{{{referenced}}}', which does not run before it")]
    ForwardReference {
        site: TemplateSite,
        referenced: StageName,
    },

    /// A template references a name that is neither a parameter nor a stage.
    #[error("{site} references unknown placeholder '{{{placeholder}}}'")]
    UnresolvedPlaceholder {
        site: TemplateSite,
        placeholder: String,
    },

    /// The text-generation call for `stage` failed; the run stops here.
    #[error("Stage '{stage}' failed: {source}")]
    Generation {
        /// The stage whose call failed.
        stage: StageName,
        /// Records of the stages that completed before the failure.
        completed: Vec<StageRecord>,
        #[source]
        source: GenerationError,
    },
}

impl PipelineError {
    /// Returns the stage a generation failure occurred in.
    pub fn failed_stage(&self) -> Option<&StageName> {
        match self {
            Self::Generation { stage, .. } => Some(stage),
            _ => None,
        }
    }

    /// Operator-facing advice for this failure.
    pub fn remediation(&self) -> &'static str {
        match self {
            Self::Generation { source, .. } => source.remediation(),
            Self::Configuration { .. } => "Check the environment variables or .env file.",
            _ => "The pipeline definition is inconsistent with its run parameters.",
        }
    }
}

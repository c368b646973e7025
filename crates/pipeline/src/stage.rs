//! Stage and pipeline definitions.
//!
//! A [`Stage`] is an immutable data record: a name, a display title, two prompt
//! templates, an advisory length and any research-brief tools. There is no
//! per-stage behaviour; one generic runner consumes every stage the same way.

use crate::{PipelineError, PipelineName, PromptTemplate, StageName, ToolName};

/// Placeholder that resolves to a stage's advisory word limit.
pub const MAX_OUTPUT_WORDS: &str = "max_output_words";

// ---------------------------------------------------------------------------
// Research tools
// ---------------------------------------------------------------------------

/// A research-brief tool attached to a stage.
///
/// Tools never fetch data. Rendering one produces instructional text (what to
/// research, which sources to consult) that is appended to the stage's user
/// message. The template may reference run parameters only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResearchTool {
    /// Tool identifier, shown in the brief heading.
    pub name: ToolName,
    /// One-line description of what the brief asks for.
    pub description: String,
    /// Brief body.
    pub template: PromptTemplate,
}

impl ResearchTool {
    /// Creates a tool from its name, description and brief template.
    pub fn new(
        name: ToolName,
        description: impl Into<String>,
        template: impl Into<PromptTemplate>,
    ) -> Self {
        Self {
            name,
            description: description.into(),
            template: template.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Stages
// ---------------------------------------------------------------------------

/// One step of the linear generation pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stage {
    /// Unique key; later stages reference this stage's output as `{name}`.
    pub name: StageName,
    /// Section heading used by the report renderer.
    pub title: String,
    /// Role-flavoured system prompt.
    pub system_template: PromptTemplate,
    /// Task prompt; may reference parameters and earlier stage outputs.
    pub user_template: PromptTemplate,
    /// Advisory length, exposed to templates as `{max_output_words}`.
    pub max_output_words: Option<u32>,
    /// Research briefs appended to the user message, in order.
    pub tools: Vec<ResearchTool>,
}

impl Stage {
    /// Creates a stage with no length hint and no tools.
    pub fn new(
        name: StageName,
        title: impl Into<String>,
        system_template: impl Into<PromptTemplate>,
        user_template: impl Into<PromptTemplate>,
    ) -> Self {
        Self {
            name,
            title: title.into(),
            system_template: system_template.into(),
            user_template: user_template.into(),
            max_output_words: None,
            tools: Vec::new(),
        }
    }

    /// Sets the advisory word limit.
    #[must_use]
    pub fn with_max_output_words(mut self, words: u32) -> Self {
        self.max_output_words = Some(words);
        self
    }

    /// Attaches a research-brief tool.
    #[must_use]
    pub fn with_tool(mut self, tool: ResearchTool) -> Self {
        self.tools.push(tool);
        self
    }
}

// ---------------------------------------------------------------------------
// Pipelines
// ---------------------------------------------------------------------------

/// An ordered, immutable list of stages plus the metadata the report needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pipeline {
    name: PipelineName,
    title: PromptTemplate,
    purpose: String,
    notes: Vec<String>,
    stages: Vec<Stage>,
}

impl Pipeline {
    /// Creates a pipeline.
    ///
    /// Fails if `stages` is empty or two stages share a name. Placeholder
    /// resolution is checked by the runner once run parameters are known.
    pub fn new(
        name: PipelineName,
        title: impl Into<PromptTemplate>,
        purpose: impl Into<String>,
        stages: Vec<Stage>,
    ) -> Result<Self, PipelineError> {
        if stages.is_empty() {
            return Err(PipelineError::EmptyPipeline { pipeline: name });
        }
        for (i, stage) in stages.iter().enumerate() {
            if stages[..i].iter().any(|earlier| earlier.name == stage.name) {
                return Err(PipelineError::DuplicateStage {
                    stage: stage.name.clone(),
                });
            }
        }

        Ok(Self {
            name,
            title: title.into(),
            purpose: purpose.into(),
            notes: Vec::new(),
            stages,
        })
    }

    /// Adds advisory notes printed in the report header.
    #[must_use]
    pub fn with_notes<I, S>(mut self, notes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.notes.extend(notes.into_iter().map(Into::into));
        self
    }

    pub fn name(&self) -> &PipelineName {
        &self.name
    }

    /// Report title template; may reference run parameters.
    pub fn title(&self) -> &PromptTemplate {
        &self.title
    }

    pub fn purpose(&self) -> &str {
        &self.purpose
    }

    pub fn notes(&self) -> &[String] {
        &self.notes
    }

    /// Stages in execution order.
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }
}

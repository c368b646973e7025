//! Core orchestration domain for chainplan.
//!
//! A chainplan run is a fixed, linear sequence of text-generation calls. Each
//! [`Stage`] renders its prompts from the run's [`RunParameters`] and the
//! outputs of the stages before it, the [`PipelineRunner`] sends them to a
//! [`TextGenerator`], and the collected [`RunResult`] is rendered into a
//! plain-text document by [`report::render`].
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** This crate has no I/O dependencies.
//! It defines *what* is needed; the `llm` crate supplies an HTTP provider and
//! the `cli` crate wires configuration, logging and file output.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype identifiers (`StageName`, `ParameterName`, `RunId`, etc.) |
//! | [`types`] | Value types (`TokenUsage`, `Temperature`, `GenerationSettings`, `Timestamp`) |
//! | [`errors`] | [`PipelineError`] |
//! | [`template`] | `{placeholder}` prompt templates |
//! | [`params`] | [`RunParameters`] |
//! | [`stage`] | [`Stage`], [`ResearchTool`], [`Pipeline`] |
//! | [`generator`] | The [`TextGenerator`] port and its request/response types |
//! | [`runner`] | [`PipelineRunner`] and [`RunObserver`] |
//! | [`result`] | [`StageRecord`], [`RunResult`] |
//! | [`report`] | The plain-text renderer |

pub mod errors;
pub mod generator;
pub mod identifiers;
pub mod params;
pub mod report;
pub mod result;
pub mod runner;
pub mod stage;
pub mod template;
pub mod types;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use errors::{PipelineError, TemplateSite};
pub use generator::{
    ChatMessage, GenerationError, GenerationRequest, GenerationResponse, Role, TextGenerator,
};
pub use identifiers::{ModelId, ParameterName, PipelineName, RunId, StageName, ToolName};
pub use params::RunParameters;
pub use result::{RunResult, StageRecord};
pub use runner::{PipelineRunner, RunObserver, SilentObserver};
pub use stage::{Pipeline, ResearchTool, Stage, MAX_OUTPUT_WORDS};
pub use template::{MissingPlaceholder, PromptTemplate};
pub use types::{GenerationSettings, Temperature, Timestamp, TokenCount, TokenUsage};

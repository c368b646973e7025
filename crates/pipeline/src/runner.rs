//! The sequential pipeline runner.
//!
//! Stages run strictly in order. Each stage's prompts are rendered from the
//! run parameters plus the stored outputs of every earlier stage, sent to the
//! [`TextGenerator`] once, and the reply is stored before the next stage
//! starts. The first failed call ends the run; there is no retry, no skip and
//! no resume.

use std::sync::Arc;

use tracing::{error, info, info_span, Instrument};

use crate::{
    ChatMessage, GenerationError, GenerationRequest, GenerationSettings, Pipeline, PipelineError,
    RunId, RunParameters, RunResult, Stage, StageRecord, TemplateSite, TextGenerator, Timestamp,
    MAX_OUTPUT_WORDS,
};

// ---------------------------------------------------------------------------
// Progress observation
// ---------------------------------------------------------------------------

/// Receives progress notifications from a run.
///
/// Every method defaults to a no-op. `index` is zero-based; `total` is the
/// number of stages in the pipeline.
pub trait RunObserver: Send + Sync {
    fn run_started(&self, _run_id: RunId, _pipeline: &Pipeline, _params: &RunParameters) {}

    fn stage_started(&self, _index: usize, _total: usize, _stage: &Stage) {}

    fn stage_completed(&self, _index: usize, _total: usize, _record: &StageRecord) {}

    fn stage_failed(
        &self,
        _index: usize,
        _total: usize,
        _stage: &Stage,
        _error: &GenerationError,
    ) {
    }
}

/// Observer that ignores every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentObserver;

impl RunObserver for SilentObserver {}

// ---------------------------------------------------------------------------
// Runner
// ---------------------------------------------------------------------------

/// Drives one pipeline at a time against a text-generation provider.
pub struct PipelineRunner {
    generator: Arc<dyn TextGenerator>,
    settings: GenerationSettings,
    observer: Arc<dyn RunObserver>,
}

impl PipelineRunner {
    /// Creates a runner. `settings` apply unchanged to every stage call.
    pub fn new(generator: Arc<dyn TextGenerator>, settings: GenerationSettings) -> Self {
        Self {
            generator,
            settings,
            observer: Arc::new(SilentObserver),
        }
    }

    /// Routes progress notifications to `observer`.
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn RunObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn settings(&self) -> &GenerationSettings {
        &self.settings
    }

    /// Checks that every placeholder in `pipeline` resolves for `params`.
    ///
    /// Stage templates may reference run parameters, stages that run strictly
    /// earlier, and `{max_output_words}` when the stage sets a limit. Tool
    /// templates and the title may reference run parameters only.
    pub fn validate(pipeline: &Pipeline, params: &RunParameters) -> Result<(), PipelineError> {
        let stages = pipeline.stages();

        for (name, _) in params.iter() {
            let shadows_stage = stages.iter().any(|s| s.name.as_str() == name.as_str());
            if shadows_stage || name.as_str() == MAX_OUTPUT_WORDS {
                return Err(PipelineError::ParameterCollision {
                    parameter: name.to_string(),
                });
            }
        }

        for key in pipeline.title().placeholders() {
            if params.get(key).is_none() {
                return Err(unresolved(TemplateSite::Title, key, stages));
            }
        }

        for (index, stage) in stages.iter().enumerate() {
            let site = || TemplateSite::Stage(stage.name.clone());
            let earlier = &stages[..index];

            let prompt_keys = stage
                .system_template
                .placeholders()
                .into_iter()
                .chain(stage.user_template.placeholders());
            for key in prompt_keys {
                let resolved = params.get(key).is_some()
                    || earlier.iter().any(|s| s.name.as_str() == key)
                    || (key == MAX_OUTPUT_WORDS && stage.max_output_words.is_some());
                if !resolved {
                    return Err(unresolved(site(), key, &stages[index..]));
                }
            }

            for tool in &stage.tools {
                for key in tool.template.placeholders() {
                    if params.get(key).is_none() {
                        return Err(PipelineError::UnresolvedPlaceholder {
                            site: site(),
                            placeholder: key.to_string(),
                        });
                    }
                }
            }
        }

        Ok(())
    }

    /// Runs every stage of `pipeline` in order.
    ///
    /// On success the result holds exactly one record per stage. On a failed
    /// generation call the error names the stage and carries the records of the
    /// stages that completed before it.
    pub async fn run(
        &self,
        pipeline: &Pipeline,
        params: &RunParameters,
    ) -> Result<RunResult, PipelineError> {
        Self::validate(pipeline, params)?;

        let run_id = RunId::new_random();
        let span = info_span!("pipeline_run", %run_id, pipeline = %pipeline.name());
        self.execute(run_id, pipeline, params)
            .instrument(span)
            .await
    }

    async fn execute(
        &self,
        run_id: RunId,
        pipeline: &Pipeline,
        params: &RunParameters,
    ) -> Result<RunResult, PipelineError> {
        let title = pipeline
            .title()
            .render(|key| params.get(key))
            .map_err(|e| PipelineError::UnresolvedPlaceholder {
                site: TemplateSite::Title,
                placeholder: e.placeholder,
            })?;

        let total = pipeline.stages().len();
        let started_at = Timestamp::now();
        info!(stages = total, model = %self.settings.model, "pipeline run started");
        self.observer.run_started(run_id, pipeline, params);

        let mut records: Vec<StageRecord> = Vec::with_capacity(total);
        for (index, stage) in pipeline.stages().iter().enumerate() {
            let (system_prompt, user_prompt) = render_prompts(stage, params, &records)?;
            let request = GenerationRequest {
                settings: self.settings.clone(),
                messages: vec![
                    ChatMessage::system(system_prompt.clone()),
                    ChatMessage::user(user_prompt.clone()),
                ],
            };

            self.observer.stage_started(index, total, stage);
            info!(stage = %stage.name, index = index + 1, total, "stage started");

            let stage_started = Timestamp::now();
            let span = info_span!("stage", stage = %stage.name, index = index + 1);
            match self.generator.generate(&request).instrument(span).await {
                Ok(response) => {
                    let record = StageRecord {
                        name: stage.name.clone(),
                        title: stage.title.clone(),
                        system_prompt,
                        user_prompt,
                        output: response.text,
                        usage: response.usage,
                        started_at: stage_started,
                        finished_at: Timestamp::now(),
                    };
                    info!(
                        stage = %stage.name,
                        output_chars = record.output.chars().count(),
                        total_tokens = record.usage.map(|u| u.total().as_u64()),
                        "stage completed"
                    );
                    self.observer.stage_completed(index, total, &record);
                    records.push(record);
                }
                Err(source) => {
                    error!(stage = %stage.name, error = %source, "stage failed; aborting run");
                    self.observer.stage_failed(index, total, stage, &source);
                    return Err(PipelineError::Generation {
                        stage: stage.name.clone(),
                        completed: records,
                        source,
                    });
                }
            }
        }

        let finished_at = Timestamp::now();
        info!(stages = records.len(), "pipeline run completed");

        Ok(RunResult {
            run_id,
            pipeline: pipeline.name().clone(),
            title,
            purpose: pipeline.purpose().to_string(),
            notes: pipeline.notes().to_vec(),
            parameters: params.clone(),
            settings: self.settings.clone(),
            started_at,
            finished_at,
            stages: records,
        })
    }
}

/// Classifies an unknown key: a stage name in `later` is a forward reference.
fn unresolved(site: TemplateSite, key: &str, later: &[Stage]) -> PipelineError {
    match later.iter().find(|s| s.name.as_str() == key) {
        Some(stage) => PipelineError::ForwardReference {
            site,
            referenced: stage.name.clone(),
        },
        None => PipelineError::UnresolvedPlaceholder {
            site,
            placeholder: key.to_string(),
        },
    }
}

fn lookup<'a>(
    key: &str,
    params: &'a RunParameters,
    completed: &'a [StageRecord],
    max_words: Option<&'a str>,
) -> Option<&'a str> {
    params
        .get(key)
        .or_else(|| {
            completed
                .iter()
                .find(|record| record.name.as_str() == key)
                .map(|record| record.output.as_str())
        })
        .or(max_words.filter(|_| key == MAX_OUTPUT_WORDS))
}

/// Renders the system and user messages for `stage`.
fn render_prompts(
    stage: &Stage,
    params: &RunParameters,
    completed: &[StageRecord],
) -> Result<(String, String), PipelineError> {
    let missing = |e: crate::MissingPlaceholder| PipelineError::UnresolvedPlaceholder {
        site: TemplateSite::Stage(stage.name.clone()),
        placeholder: e.placeholder,
    };
    let words = stage.max_output_words.map(|w| w.to_string());
    let words = words.as_deref();

    let system = stage
        .system_template
        .render(|key| lookup(key, params, completed, words))
        .map_err(missing)?;
    let mut user = stage
        .user_template
        .render(|key| lookup(key, params, completed, words))
        .map_err(missing)?;

    for tool in &stage.tools {
        let brief = tool
            .template
            .render(|key| params.get(key))
            .map_err(missing)?;
        user.push_str(&format!(
            "\n\nResearch brief ({}): {}\n{}",
            tool.name,
            tool.description,
            brief.trim()
        ));
    }

    Ok((system, user))
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{
        GenerationResponse, ModelId, ParameterName, PipelineName, ResearchTool, StageName,
        Temperature, TokenCount, TokenUsage, ToolName,
    };

    // -- stub generators ---------------------------------------------------

    /// Replies `OUT:<system prompt>`, or fails when the system prompt matches
    /// `fail_on`. Records every request it sees.
    #[derive(Default)]
    struct ScriptedGenerator {
        fail_on: Option<&'static str>,
        echo_user: bool,
        requests: Mutex<Vec<GenerationRequest>>,
    }

    impl ScriptedGenerator {
        fn failing_on(stage_title: &'static str) -> Self {
            Self {
                fail_on: Some(stage_title),
                ..Self::default()
            }
        }

        fn echo() -> Self {
            Self {
                echo_user: true,
                ..Self::default()
            }
        }

        fn calls(&self) -> usize {
            self.requests.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl TextGenerator for ScriptedGenerator {
        async fn generate(
            &self,
            request: &GenerationRequest,
        ) -> Result<GenerationResponse, GenerationError> {
            self.requests.lock().unwrap().push(request.clone());
            let system = &request.messages[0].content;
            if self.fail_on == Some(system.as_str()) {
                return Err(GenerationError::RateLimited { retry_after: None });
            }
            if self.echo_user {
                let echoed = request.messages[1].content.clone();
                return Ok(GenerationResponse::text(echoed));
            }
            Ok(GenerationResponse {
                text: format!("OUT:{system}"),
                usage: Some(TokenUsage::new(10, 5)),
            })
        }
    }

    #[derive(Default)]
    struct RecordingObserver {
        events: Mutex<Vec<String>>,
    }

    impl RecordingObserver {
        fn record(&self, event: String) {
            self.events.lock().unwrap().push(event);
        }
    }

    impl RunObserver for RecordingObserver {
        fn stage_started(&self, index: usize, total: usize, stage: &Stage) {
            self.record(format!("start {}/{} {}", index + 1, total, stage.name));
        }

        fn stage_completed(&self, _index: usize, _total: usize, record: &StageRecord) {
            self.record(format!("done {}", record.name));
        }

        fn stage_failed(
            &self,
            _index: usize,
            _total: usize,
            stage: &Stage,
            _error: &GenerationError,
        ) {
            self.record(format!("fail {}", stage.name));
        }
    }

    // -- fixtures ----------------------------------------------------------

    fn settings() -> GenerationSettings {
        GenerationSettings::new(
            ModelId::new("stub-model").unwrap(),
            Temperature::new(0.7).unwrap(),
            TokenCount::new(512),
        )
        .unwrap()
    }

    fn key(name: &str) -> StageName {
        StageName::new(name).unwrap()
    }

    fn param(name: &str) -> ParameterName {
        ParameterName::new(name).unwrap()
    }

    fn params() -> RunParameters {
        RunParameters::new().with(param("topic"), "rust")
    }

    fn pipeline(title: &str, stages: Vec<Stage>) -> Pipeline {
        Pipeline::new(PipelineName::new("p").unwrap(), title, "p", stages).unwrap()
    }

    /// Five stages `a`..`e`; the system prompt is the upper-case title, the
    /// user prompt references the topic and every earlier stage.
    fn five_stage_pipeline() -> Pipeline {
        let names = ["a", "b", "c", "d", "e"];
        let stages = names
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let mut user = String::from("Topic: {topic}");
                for earlier in &names[..i] {
                    user.push_str(&format!("\n[{earlier}] {{{earlier}}}"));
                }
                Stage::new(key(name), name.to_uppercase(), name.to_uppercase(), user)
            })
            .collect();
        let name = PipelineName::new("letters").unwrap();
        Pipeline::new(name, "Letters about {topic}", "Testing", stages).unwrap()
    }

    fn runner(generator: Arc<ScriptedGenerator>) -> PipelineRunner {
        PipelineRunner::new(generator, settings())
    }

    // -- runs --------------------------------------------------------------

    #[tokio::test]
    async fn produces_one_output_per_stage_in_order() {
        let generator = Arc::new(ScriptedGenerator::default());
        let result = runner(generator.clone())
            .run(&five_stage_pipeline(), &params())
            .await
            .unwrap();

        let names: Vec<_> = result.stages.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c", "d", "e"]);
        for (name, title) in [("a", "A"), ("b", "B"), ("c", "C"), ("d", "D"), ("e", "E")] {
            assert_eq!(result.output(name), Some(format!("OUT:{title}").as_str()));
        }
        assert_eq!(result.title, "Letters about rust");
        assert_eq!(result.total_usage(), Some(TokenUsage::new(50, 25)));
        assert_eq!(generator.calls(), 5);
    }

    #[tokio::test]
    async fn each_stage_input_contains_every_prior_output() {
        let generator = Arc::new(ScriptedGenerator::echo());
        let result = runner(generator.clone())
            .run(&five_stage_pipeline(), &params())
            .await
            .unwrap();

        for (i, record) in result.stages.iter().enumerate() {
            for earlier in &result.stages[..i] {
                assert!(
                    record.user_prompt.contains(&earlier.output),
                    "stage {} input is missing output of {}",
                    record.name,
                    earlier.name
                );
            }
        }
        let requests = generator.requests.lock().unwrap();
        assert_eq!(requests.len(), 5);
        assert!(requests.iter().all(|r| r.settings == settings()));
    }

    #[tokio::test]
    async fn failure_stops_the_run_and_keeps_earlier_records() {
        let generator = Arc::new(ScriptedGenerator::failing_on("C"));
        let err = runner(generator.clone())
            .run(&five_stage_pipeline(), &params())
            .await
            .unwrap_err();

        match &err {
            PipelineError::Generation {
                stage,
                completed,
                source,
            } => {
                assert_eq!(stage.as_str(), "c");
                let done: Vec<_> = completed.iter().map(|r| r.output.as_str()).collect();
                assert_eq!(done, vec!["OUT:A", "OUT:B"]);
                assert!(matches!(source, GenerationError::RateLimited { .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(err.failed_stage().map(|s| s.as_str()), Some("c"));
        assert!(err.to_string().contains("Stage 'c' failed"));
        // d and e were never attempted.
        assert_eq!(generator.calls(), 3);
    }

    #[tokio::test]
    async fn observer_sees_progress_in_order() {
        let observer = Arc::new(RecordingObserver::default());
        let generator = Arc::new(ScriptedGenerator::failing_on("B"));
        let _ = runner(generator)
            .with_observer(observer.clone())
            .run(&five_stage_pipeline(), &params())
            .await;

        let events = observer.events.lock().unwrap().clone();
        assert_eq!(
            events,
            vec!["start 1/5 a", "done a", "start 2/5 b", "fail b"]
        );
    }

    #[tokio::test]
    async fn max_output_words_and_research_briefs_are_rendered() {
        let tool = ResearchTool::new(
            ToolName::new("search_costs").unwrap(),
            "Cost research",
            "  Find meal and transport prices in {topic}.  ",
        );
        let stage = Stage::new(
            key("costs"),
            "Costs",
            "Be brief - {max_output_words} words.",
            "Budget for {topic}.",
        )
        .with_max_output_words(200)
        .with_tool(tool);
        let pipeline = pipeline("T", vec![stage]);

        let generator = Arc::new(ScriptedGenerator::default());
        let result = runner(generator).run(&pipeline, &params()).await.unwrap();
        let record = &result.stages[0];

        assert_eq!(record.system_prompt, "Be brief - 200 words.");
        assert_eq!(
            record.user_prompt,
            "Budget for rust.\n\nResearch brief (search_costs): Cost research\nFind meal and transport prices in rust."
        );
    }

    // -- pre-flight validation ---------------------------------------------

    #[tokio::test]
    async fn forward_reference_is_rejected_before_any_call() {
        let stages = vec![
            Stage::new(key("first"), "First", "sys", "Needs {second}"),
            Stage::new(key("second"), "Second", "sys", "ok"),
        ];
        let pipeline = pipeline("T", stages);
        let generator = Arc::new(ScriptedGenerator::default());

        let err = runner(generator.clone())
            .run(&pipeline, &params())
            .await
            .unwrap_err();
        match err {
            PipelineError::ForwardReference { site, referenced } => {
                assert_eq!(site, TemplateSite::Stage(key("first")));
                assert_eq!(referenced.as_str(), "second");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(generator.calls(), 0);
    }

    #[test]
    fn self_reference_is_a_forward_reference() {
        let stages = vec![Stage::new(key("loop"), "Loop", "sys", "Again: {loop}")];
        let pipeline = pipeline("T", stages);
        let err = PipelineRunner::validate(&pipeline, &params()).unwrap_err();
        assert!(matches!(err, PipelineError::ForwardReference { .. }));
    }

    #[test]
    fn unknown_placeholder_is_rejected() {
        let stage = Stage::new(key("only"), "Only", "sys", "Fly from {departure_city}");
        let pipeline = pipeline("T", vec![stage]);
        let err = PipelineRunner::validate(&pipeline, &params()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "stage 'only' references unknown placeholder '{departure_city}'"
        );
    }

    #[test]
    fn max_output_words_requires_a_limit() {
        let stage = Stage::new(key("only"), "Only", "{max_output_words} words", "u");
        let pipeline = pipeline("T", vec![stage]);
        assert!(PipelineRunner::validate(&pipeline, &params()).is_err());
    }

    #[test]
    fn tools_may_not_reference_stage_outputs() {
        let tool = ResearchTool::new(ToolName::new("t").unwrap(), "d", "Use {a}");
        let stages = vec![
            Stage::new(key("a"), "A", "sys", "u"),
            Stage::new(key("b"), "B", "sys", "{a}").with_tool(tool),
        ];
        let pipeline = pipeline("T", stages);
        assert!(matches!(
            PipelineRunner::validate(&pipeline, &params()),
            Err(PipelineError::UnresolvedPlaceholder { .. })
        ));
    }

    #[test]
    fn parameters_may_not_shadow_stages() {
        let params = params().with(param("c"), "shadow");
        let err = PipelineRunner::validate(&five_stage_pipeline(), &params).unwrap_err();
        assert!(matches!(err, PipelineError::ParameterCollision { parameter } if parameter == "c"));
    }

    #[test]
    fn title_may_reference_parameters_only() {
        let stages = vec![Stage::new(key("a"), "A", "sys", "u")];
        let pipeline = pipeline("Plan for {a}", stages);
        let err = PipelineRunner::validate(&pipeline, &params()).unwrap_err();
        match err {
            PipelineError::ForwardReference { site, .. } => {
                assert_eq!(site, TemplateSite::Title);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}

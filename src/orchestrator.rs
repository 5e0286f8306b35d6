use crate::ai::client::{CompletionRequest, ModelEndpoint, OutputFormat};
use crate::ai::prompts;
use crate::ai::schema_utils;
use crate::config::Config;
use crate::core::types::{ChainOutcome, ChainRequest};
use crate::error::ChainError;
use serde_json::Value;
use std::fmt;
use uuid::Uuid;

/// Where a chain run currently is. Transitions are strictly forward; a
/// failure at any stage ends the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainStage {
    Idle,
    SchemaCheck,
    FirstCall,
    Substitute,
    SecondCall,
    Done,
}

impl fmt::Display for ChainStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ChainStage::Idle => "idle",
            ChainStage::SchemaCheck => "schema check",
            ChainStage::FirstCall => "first call",
            ChainStage::Substitute => "substitute",
            ChainStage::SecondCall => "second call",
            ChainStage::Done => "done",
        };
        f.write_str(name)
    }
}

/// Parses and validates schema text. Blank text means "no schema".
pub fn check_schema(schema_text: &str) -> Result<Option<Value>, ChainError> {
    if schema_text.trim().is_empty() {
        return Ok(None);
    }

    let schema: Value = serde_json::from_str(schema_text)
        .map_err(|e| ChainError::MalformedInput(e.to_string()))?;

    let issues = schema_utils::validate_schema(&schema);
    if !issues.is_empty() {
        return Err(ChainError::SchemaInvalid(issues));
    }

    Ok(Some(schema))
}

pub struct ChainOrchestrator<E> {
    endpoint: E,
    config: Config,
}

impl<E: ModelEndpoint> ChainOrchestrator<E> {
    pub fn new(endpoint: E, config: Config) -> Self {
        Self { endpoint, config }
    }

    pub async fn run(&self, request: &ChainRequest) -> Result<ChainOutcome, ChainError> {
        let run_id = Uuid::new_v4();
        let mut stage = ChainStage::Idle;

        match self.run_stages(request, run_id, &mut stage).await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                log::error!("[{run_id}] chain failed during {stage}: {e}");
                Err(e)
            }
        }
    }

    async fn run_stages(
        &self,
        request: &ChainRequest,
        run_id: Uuid,
        stage: &mut ChainStage,
    ) -> Result<ChainOutcome, ChainError> {
        let mut output_format = None;
        if !request.schema_text.trim().is_empty() {
            advance(stage, ChainStage::SchemaCheck, run_id);
            if let Some(schema) = check_schema(&request.schema_text)? {
                let name = request
                    .schema_name
                    .as_deref()
                    .map(str::trim)
                    .filter(|n| !n.is_empty())
                    .unwrap_or(self.config.default_schema_name.as_str())
                    .to_string();
                log::info!("[{run_id}]    -> structured output with schema '{name}'");
                output_format = Some(OutputFormat { name, schema });
            }
        }
        let schema_name = output_format.as_ref().map(|f| f.name.clone());

        advance(stage, ChainStage::FirstCall, run_id);
        let first_request = CompletionRequest {
            model: self.model_or_default(request.model_a.as_deref()),
            instructions: request.instructions_a.clone(),
            input: request.input_a.clone(),
            reasoning_effort: request.reasoning_effort_a,
            output_format,
        };
        let first = self.endpoint.complete(&first_request).await?;
        log::info!("[{run_id}]    -> {} chars from {}", first.text.len(), first_request.model);

        advance(stage, ChainStage::Substitute, run_id);
        let injected = prompts::format_injected(&first.text);
        let second_prompt = prompts::render_second_prompt(
            &request.instructions_b,
            &request.input_b,
            &request.placeholder_bindings,
            &injected,
        );

        advance(stage, ChainStage::SecondCall, run_id);
        let second_request = CompletionRequest {
            model: self.model_or_default(request.model_b.as_deref()),
            instructions: second_prompt.instructions,
            input: second_prompt.input,
            reasoning_effort: request.reasoning_effort_b,
            output_format: None,
        };
        let second = self.endpoint.complete(&second_request).await?;
        log::info!("[{run_id}]    -> {} chars from {}", second.text.len(), second_request.model);

        advance(stage, ChainStage::Done, run_id);
        Ok(ChainOutcome {
            first_output_text: first.text,
            second_output_text: second.text,
            structured_mode_used: schema_name.is_some(),
            schema_name,
            request_id: second.request_id.or(first.request_id),
        })
    }

    fn model_or_default(&self, model: Option<&str>) -> String {
        model
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(self.config.default_model.as_str())
            .to_string()
    }
}

fn advance(stage: &mut ChainStage, next: ChainStage, run_id: Uuid) {
    log::info!("[{run_id}] {stage} -> {next}");
    *stage = next;
}

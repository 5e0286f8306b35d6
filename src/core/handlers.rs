//! Request handlers shaped like HTTP routes: each returns a status code and
//! a JSON-serializable body. Framing and transport live elsewhere.

use super::types::{ApiResponse, ChainRequest, ChainResponse, ErrorBody, ValidationRequest, ValidationResponse};
use crate::ai::client::ModelEndpoint;
use crate::ai::schema_utils::Issue;
use crate::error::ChainError;
use crate::orchestrator::{self, ChainOrchestrator};

const PARSE_FAILURE_TITLE: &str = "JSON parse failure";

/// Live schema check. Blank text is accepted.
pub fn handle_validate(request: &ValidationRequest) -> ApiResponse<ValidationResponse> {
    match orchestrator::check_schema(&request.schema_text) {
        Ok(_) => ApiResponse { status: 200, body: ValidationResponse::Ok { ok: true } },
        Err(e) => ApiResponse {
            status: e.status_code(),
            body: ValidationResponse::Error(error_body(e, "invalid schema")),
        },
    }
}

pub async fn handle_chain<E: ModelEndpoint>(
    orchestrator: &ChainOrchestrator<E>,
    request: &ChainRequest,
) -> ApiResponse<ChainResponse> {
    match orchestrator.run(request).await {
        Ok(outcome) => ApiResponse { status: 200, body: ChainResponse::Success(outcome) },
        Err(e) => ApiResponse {
            status: e.status_code(),
            body: ChainResponse::Error(error_body(e, "invalid schema for structured outputs")),
        },
    }
}

fn error_body(err: ChainError, schema_error: &str) -> ErrorBody {
    match err {
        ChainError::MalformedInput(detail) => ErrorBody {
            error: "invalid schema JSON".to_string(),
            issues: Some(vec![Issue::new(PARSE_FAILURE_TITLE, detail)]),
            request_id: None,
        },
        ChainError::SchemaInvalid(issues) => ErrorBody {
            error: schema_error.to_string(),
            issues: Some(issues),
            request_id: None,
        },
        ChainError::Upstream(upstream) => ErrorBody {
            error: upstream.message,
            issues: (!upstream.hints.is_empty()).then_some(upstream.hints),
            request_id: upstream.request_id,
        },
        other => ErrorBody { error: other.to_string(), issues: None, request_id: None },
    }
}

use crate::ai::client::ReasoningEffort;
use crate::ai::schema_utils::Issue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationRequest {
    #[serde(default)]
    pub schema_text: String,
}

/// A user-submitted chain. Every field may be omitted on the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChainRequest {
    pub model_a: Option<String>,
    pub model_b: Option<String>,
    #[serde(alias = "gpt5EffortA")]
    pub reasoning_effort_a: ReasoningEffort,
    #[serde(alias = "gpt5EffortB")]
    pub reasoning_effort_b: ReasoningEffort,
    #[serde(alias = "sysA")]
    pub instructions_a: String,
    #[serde(alias = "userA")]
    pub input_a: String,
    #[serde(alias = "sysB")]
    pub instructions_b: String,
    #[serde(alias = "userB")]
    pub input_b: String,
    #[serde(alias = "valsB")]
    pub placeholder_bindings: BTreeMap<String, String>,
    pub schema_name: Option<String>,
    pub schema_text: String,
}

/// Result of a completed chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainOutcome {
    pub first_output_text: String,
    pub second_output_text: String,
    pub structured_mode_used: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issues: Option<Vec<Issue>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ValidationResponse {
    Ok { ok: bool },
    Error(ErrorBody),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChainResponse {
    Success(ChainOutcome),
    Error(ErrorBody),
}

/// Status code plus JSON body, as a transport layer would send it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse<T> {
    pub status: u16,
    pub body: T,
}

impl<T> ApiResponse<T> {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

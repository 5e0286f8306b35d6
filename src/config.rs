use crate::error::ChainError;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4.1-mini";
pub const DEFAULT_SCHEMA_NAME: &str = "ClinicalJSON";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Only needed to run a chain; schema validation works without it.
    pub api_key: Option<String>,
    pub base_url: String,
    pub timeout_secs: u64,
    pub default_model: String,
    pub default_schema_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            default_model: DEFAULT_MODEL.to_string(),
            default_schema_name: DEFAULT_SCHEMA_NAME.to_string(),
        }
    }
}

impl Config {
    /// Reads `.env` (if any) and the process environment.
    pub fn from_env() -> Result<Self, ChainError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ChainError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        let timeout_secs = match get("PROMPT_CHAIN_TIMEOUT_SECS") {
            Some(raw) => raw.parse::<u64>().map_err(|e| {
                ChainError::Config(format!("PROMPT_CHAIN_TIMEOUT_SECS ('{raw}'): {e}"))
            })?,
            None => defaults.timeout_secs,
        };

        Ok(Self {
            api_key: get("OPENAI_API_KEY"),
            base_url: get("OPENAI_BASE_URL").unwrap_or(defaults.base_url),
            timeout_secs,
            default_model: get("PROMPT_CHAIN_DEFAULT_MODEL").unwrap_or(defaults.default_model),
            default_schema_name: get("PROMPT_CHAIN_DEFAULT_SCHEMA_NAME")
                .unwrap_or(defaults.default_schema_name),
        })
    }
}

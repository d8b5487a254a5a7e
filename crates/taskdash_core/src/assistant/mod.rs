use crate::config::AssistantConfig;
use crate::error::AppError;
use crate::planner::PlannerRequest;

mod chat_completions;

pub use chat_completions::ChatCompletionsClient;

const OFFLINE_ENV_VAR: &str = "TASKDASH_OFFLINE";
const API_KEY_ENV_VARS: [&str; 2] = ["TASKDASH_API_KEY", "DEEPSEEK_API_KEY"];

/// A text-completion collaborator: one request in, one response out.
pub trait Assistant {
    fn complete(&self, request: &PlannerRequest) -> Result<String, AppError>;
}

/// Answers every request with its own payload. Used when running offline.
pub struct EchoAssistant;

impl Assistant for EchoAssistant {
    fn complete(&self, request: &PlannerRequest) -> Result<String, AppError> {
        Ok(request.payload.clone())
    }
}

pub fn assistant_from_env(config: &AssistantConfig) -> Result<Box<dyn Assistant>, AppError> {
    if std::env::var(OFFLINE_ENV_VAR).is_ok() {
        tracing::debug!("offline mode, echoing planner payloads");
        return Ok(Box::new(EchoAssistant));
    }

    let api_key = api_key_from_env().ok_or_else(|| {
        AppError::assistant(format!(
            "no API key configured, set {}",
            API_KEY_ENV_VARS[0]
        ))
    })?;
    Ok(Box::new(ChatCompletionsClient::new(config.clone(), api_key)))
}

fn api_key_from_env() -> Option<String> {
    API_KEY_ENV_VARS.iter().find_map(|name| {
        std::env::var(name)
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    })
}

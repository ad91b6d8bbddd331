use crate::clip_plan::{ClipJob, ClipJobList};
use std::env;
use std::path::PathBuf;
use thiserror::Error;

pub const DEFAULT_MODEL: &str = "text-davinci-003";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_LOG_PATH: &str = "chatgpt_conversation_history.log";

const DEMO_SPEED_MULTIPLIER: f64 = 2.0;
const DEMO_1_WINDOW: (f64, f64) = (0.0, 25.0);
const DEMO_2_WINDOW: (f64, f64) = (0.0, 30.0);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("environment variable {0} is not set")]
    Missing(&'static str),
    #[error("environment variable {0} is empty")]
    Empty(&'static str),
    #[error("invalid clip job: {0}")]
    Job(String),
}

#[derive(Debug, Clone, Copy)]
pub enum EnvKey {
    OpenAiApiKey,
    OpenAiModel,
    OpenAiBaseUrl,
    ChatLogPath,
    SrcDemo1,
    SrcDemo2,
    TgtDemo1,
    TgtDemo2,
    ClipJobsFile,
}

impl EnvKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnvKey::OpenAiApiKey => "OPENAI_API_KEY",
            EnvKey::OpenAiModel => "OPENAI_MODEL",
            EnvKey::OpenAiBaseUrl => "OPENAI_BASE_URL",
            EnvKey::ChatLogPath => "CHAT_LOG_PATH",
            EnvKey::SrcDemo1 => "CHATGPT_SRC_DEMO_1",
            EnvKey::SrcDemo2 => "CHATGPT_SRC_DEMO_2",
            EnvKey::TgtDemo1 => "CHATGPT_TGT_DEMO_1",
            EnvKey::TgtDemo2 => "CHATGPT_TGT_DEMO_2",
            EnvKey::ClipJobsFile => "CLIP_JOBS_FILE",
        }
    }
}

/// Loads `.env` from the working directory if there is one. A missing file is not an error.
pub fn load_dotenv() {
    if let Err(err) = dotenvy::dotenv() {
        if !err.not_found() {
            tracing::warn!("failed to load .env: {}", err);
        }
    }
}

pub fn get(key: EnvKey) -> Result<String, ConfigError> {
    let value = env::var(key.as_str()).map_err(|_| ConfigError::Missing(key.as_str()))?;
    if value.trim().is_empty() {
        return Err(ConfigError::Empty(key.as_str()));
    }
    Ok(value)
}

pub fn get_or(key: EnvKey, default: &str) -> String {
    match env::var(key.as_str()) {
        Ok(v) if !v.trim().is_empty() => v,
        _ => default.to_string(),
    }
}

#[derive(Debug, Clone)]
pub struct ChatConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub log_path: PathBuf,
}

impl ChatConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            api_key: get(EnvKey::OpenAiApiKey)?,
            model: get_or(EnvKey::OpenAiModel, DEFAULT_MODEL),
            base_url: get_or(EnvKey::OpenAiBaseUrl, DEFAULT_BASE_URL),
            log_path: PathBuf::from(get_or(EnvKey::ChatLogPath, DEFAULT_LOG_PATH)),
        })
    }
}

#[derive(Debug, Clone)]
pub enum ClipConfig {
    /// Jobs come from a JSON file.
    JobsFile(PathBuf),
    /// The two demo jobs named by the `CHATGPT_*_DEMO_*` variables.
    Demo(ClipJobList),
}

impl ClipConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(get)
    }

    /// `CLIP_JOBS_FILE` wins over the demo variables when both are set.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(EnvKey) -> Result<String, ConfigError>,
    {
        if let Ok(path) = lookup(EnvKey::ClipJobsFile) {
            return Ok(ClipConfig::JobsFile(PathBuf::from(path)));
        }

        let demo_1 = demo_job(&lookup, EnvKey::SrcDemo1, EnvKey::TgtDemo1, DEMO_1_WINDOW)?;
        let demo_2 = demo_job(&lookup, EnvKey::SrcDemo2, EnvKey::TgtDemo2, DEMO_2_WINDOW)?;
        Ok(ClipConfig::Demo(ClipJobList {
            items: vec![demo_1, demo_2],
        }))
    }
}

fn demo_job<F>(lookup: &F, src: EnvKey, tgt: EnvKey, window: (f64, f64)) -> Result<ClipJob, ConfigError>
where
    F: Fn(EnvKey) -> Result<String, ConfigError>,
{
    let source = PathBuf::from(lookup(src)?);
    let target = PathBuf::from(lookup(tgt)?);
    ClipJob::new(source, target, DEMO_SPEED_MULTIPLIER, window.0, window.1)
        .map_err(|e| ConfigError::Job(e.to_string()))
}

use anyhow::Result;
use std::env;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Dev,
    Staging,
    Prod,
}

impl Environment {
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "prod" | "production" => Self::Prod,
            "staging" => Self::Staging,
            _ => Self::Dev,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dev => "dev",
            Self::Staging => "staging",
            Self::Prod => "prod",
        }
    }

    pub fn is_dev(&self) -> bool {
        matches!(self, Self::Dev)
    }

    #[allow(dead_code)]
    pub fn is_prod(&self) -> bool {
        matches!(self, Self::Prod)
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub env: Environment,
    pub server_addr: String,

    // CORS
    pub cors_allow_origins: Vec<String>,

    // Hosted inference API. No key means every gateway operation runs its
    // deterministic fallback instead of failing startup.
    pub model_api_key: Option<String>,
    pub model_api_base: String,
    pub chat_model: String,
    pub detector_model: String,
    pub model_timeout_seconds: u64,

    // Resume analysis
    pub resume_min_chars: usize,

    // Uploads
    pub max_upload_mb: usize,

    // Media store (optional cloud upload of raw files)
    pub media_cloud_name: Option<String>,
    pub media_upload_preset: Option<String>,
    pub save_uploads_to_cloud: bool,

    // Shared bearer token; gate is disabled when unset
    pub api_auth_token: Option<String>,
}

fn optional_env(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty() && v != "dummy")
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        let env_name = Environment::from_str(&env::var("ENV").unwrap_or_else(|_| "dev".to_string()));
        let server_addr = env::var("SERVER_ADDR").unwrap_or_else(|_| "0.0.0.0:5000".to_string());

        let cors_allow_origins = env::var("CORS_ALLOW_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let model_api_key = optional_env("MODEL_API_KEY").or_else(|| optional_env("HUGGINGFACE_API_KEY"));
        let model_api_base = env::var("MODEL_API_BASE")
            .unwrap_or_else(|_| "https://api-inference.huggingface.co".to_string());
        let chat_model = env::var("CHAT_MODEL")
            .unwrap_or_else(|_| "meta-llama/Llama-3.2-1B-Instruct".to_string());
        let detector_model = env::var("DETECTOR_MODEL")
            .unwrap_or_else(|_| "openai-community/roberta-base-openai-detector".to_string());
        let model_timeout_seconds = env::var("MODEL_TIMEOUT_SECONDS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(120);

        let resume_min_chars = env::var("RESUME_MIN_CHAR_LENGTH")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(50);

        let max_upload_mb = env::var("MAX_UPLOAD_MB")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(5);

        let media_cloud_name = optional_env("MEDIA_CLOUD_NAME");
        let media_upload_preset = optional_env("MEDIA_UPLOAD_PRESET");
        let save_uploads_to_cloud = env::var("SAVE_UPLOADS_TO_CLOUD")
            .map(|v| v.to_lowercase() == "true")
            .unwrap_or(false);

        let api_auth_token = optional_env("API_AUTH_TOKEN");

        Ok(Settings {
            env: env_name,
            server_addr,
            cors_allow_origins,
            model_api_key,
            model_api_base,
            chat_model,
            detector_model,
            model_timeout_seconds,
            resume_min_chars,
            max_upload_mb,
            media_cloud_name,
            media_upload_preset,
            save_uploads_to_cloud,
            api_auth_token,
        })
    }

    /// Settings with every external integration disabled, for tests.
    pub fn offline() -> Self {
        Settings {
            env: Environment::Dev,
            server_addr: "127.0.0.1:0".to_string(),
            cors_allow_origins: vec!["http://localhost:3000".to_string()],
            model_api_key: None,
            model_api_base: "https://api-inference.huggingface.co".to_string(),
            chat_model: "meta-llama/Llama-3.2-1B-Instruct".to_string(),
            detector_model: "openai-community/roberta-base-openai-detector".to_string(),
            model_timeout_seconds: 5,
            resume_min_chars: 50,
            max_upload_mb: 5,
            media_cloud_name: None,
            media_upload_preset: None,
            save_uploads_to_cloud: false,
            api_auth_token: None,
        }
    }
}

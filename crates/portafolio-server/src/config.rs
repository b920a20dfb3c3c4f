use clap::Parser;
use portafolio_core::ai::groq::{
    CompletionSettings, DEFAULT_BASE_URL, DEFAULT_MAX_TOKENS, DEFAULT_MODEL, DEFAULT_TEMPERATURE,
};
use std::net::SocketAddr;

pub const DEFAULT_API_KEY_ENV: &str = "GROQ_API_KEY";

/// Server settings, from flags or the environment
#[derive(Parser, Debug, Clone)]
#[command(name = "portafolio-server")]
#[command(about = "Chat proxy and locale endpoint for the portfolio site")]
pub struct ServerConfig {
    /// Address to listen on
    #[arg(long, env = "PORTAFOLIO_BIND", default_value = "127.0.0.1:3000")]
    pub bind: SocketAddr,

    /// Base URL of the OpenAI-compatible completion API
    #[arg(long, env = "GROQ_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub upstream_url: String,

    /// Environment variable holding the API key, read on every request
    #[arg(long, default_value = DEFAULT_API_KEY_ENV)]
    pub api_key_env: String,

    /// Model identifier sent upstream
    #[arg(long, default_value = DEFAULT_MODEL)]
    pub model: String,

    #[arg(long, default_value_t = DEFAULT_TEMPERATURE)]
    pub temperature: f32,

    #[arg(long, default_value_t = DEFAULT_MAX_TOKENS)]
    pub max_tokens: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 3000)),
            upstream_url: DEFAULT_BASE_URL.to_string(),
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

impl ServerConfig {
    pub fn completion_settings(&self) -> CompletionSettings {
        CompletionSettings {
            model: self.model.clone(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }

    /// The upstream credential, if set and non-empty right now.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }
}

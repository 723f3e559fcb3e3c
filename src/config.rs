use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;
use crate::error::{AppError, Result};

pub const DEFAULT_MODEL: &str = "llama3.2:3b";
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(8);
pub const DEFAULT_SUMMARIZE_TIMEOUT: Duration = Duration::from_secs(120);

/// Generation backend settings, fixed for the lifetime of the process.
#[derive(Clone, Debug)]
pub struct BackendConfig {
    pub endpoint: String,
    pub model: String,
    pub temperature: f32,
    pub top_p: f32,
    pub num_predict: u32,
    pub timeout: Duration,
}

impl BackendConfig {
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>) -> Self {
        let endpoint = endpoint.into();
        BackendConfig {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            model: model.into(),
            temperature: 0.3,
            top_p: 0.9,
            num_predict: 500,
            timeout: DEFAULT_SUMMARIZE_TIMEOUT,
        }
    }

    pub fn generate_url(&self) -> String {
        format!("{}/api/generate", self.endpoint)
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub server_addr: SocketAddr,
    pub fetch_timeout: Duration,
    pub backend: BackendConfig,
}

impl Config {
    pub fn load() -> Result<Self> {
        // Load environment variables from .env file if it exists
        dotenv::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup, so callers other than
    /// `load` never have to touch the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let endpoint = lookup("OLLAMA_API_ENDPOINT")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| AppError::Config("OLLAMA_API_ENDPOINT is not set".to_string()))?;
        let model = lookup("OLLAMA_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let mut backend = BackendConfig::new(endpoint.trim(), model);
        if let Some(v) = lookup("LLM_TEMPERATURE") {
            backend.temperature = parse_var("LLM_TEMPERATURE", &v)?;
        }
        if let Some(v) = lookup("LLM_TOP_P") {
            backend.top_p = parse_var("LLM_TOP_P", &v)?;
        }
        if let Some(v) = lookup("LLM_NUM_PREDICT") {
            backend.num_predict = parse_var("LLM_NUM_PREDICT", &v)?;
        }
        if let Some(v) = lookup("SUMMARIZE_TIMEOUT_SECS") {
            backend.timeout = Duration::from_secs(parse_var("SUMMARIZE_TIMEOUT_SECS", &v)?);
        }

        let fetch_timeout = match lookup("FETCH_TIMEOUT_SECS") {
            Some(v) => Duration::from_secs(parse_var("FETCH_TIMEOUT_SECS", &v)?),
            None => DEFAULT_FETCH_TIMEOUT,
        };

        // Load server configuration with defaults
        let host = lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let port = lookup("PORT").unwrap_or_else(|| "3000".to_string());
        let port = port.parse::<u16>().map_err(|e| AppError::Config(format!("Invalid port: {}", e)))?;
        let ip = IpAddr::from_str(&host).map_err(|e| AppError::Config(format!("Invalid host address: {}", e)))?;

        Ok(Config {
            server_addr: SocketAddr::new(ip, port),
            fetch_timeout,
            backend,
        })
    }
}

fn parse_var<T>(key: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse::<T>()
        .map_err(|e| AppError::Config(format!("Invalid {}: {}", key, e)))
}

use crate::error::AppError;
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    /// Riot API key. Absent keys are not an error at startup: the
    /// server answers `server_misconfigured` per request instead.
    pub api_key: Option<String>,
    /// Queue ids applied when a request does not pass `queues`.
    pub default_queues: Vec<u32>,
    pub bind_addr: String,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let api_key = env::var("RIOT_API_KEY").ok().filter(|k| !k.is_empty());

        let default_queues = match env::var("DEFAULT_QUEUES") {
            Ok(raw) => parse_queues(&raw)
                .map_err(|bad| AppError::ConfigError(format!("DEFAULT_QUEUES: bad queue id '{bad}'")))?,
            Err(_) => Vec::new(),
        };

        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:3000".to_string());

        Ok(Config {
            api_key,
            default_queues,
            bind_addr,
        })
    }

    pub fn require_api_key(&self) -> Result<&str, AppError> {
        self.api_key.as_deref().ok_or(AppError::ServerMisconfigured)
    }
}

/// Parses a comma-separated queue-id list, skipping empty segments.
pub fn parse_queues(raw: &str) -> Result<Vec<u32>, String> {
    let mut out = Vec::new();
    for part in raw.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let id: u32 = part.parse().map_err(|_| part.to_string())?;
        out.push(id);
    }
    Ok(out)
}

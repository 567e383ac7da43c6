use dotenvy::dotenv;
use once_cell::sync::Lazy;
use std::env;
use std::str::FromStr;

pub static CONFIG: Lazy<Config> = Lazy::new(|| {
    dotenv().ok(); // Load .env file if present
    Config::from_env()
});

#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the service exposing `/index` and `/search`.
    pub api_url: String,
    pub timeout_secs: u64,
    /// Snippet preview length in characters.
    pub snippet_chars: usize,
    pub log_level: tracing::Level,
    /// `KEY=value` pairs that did not parse and fell back to their default.
    /// Kept until a logger exists to report them.
    pub rejected: Vec<String>,
}

impl Config {
    pub fn from_env() -> Config {
        let mut rejected = Vec::new();
        let timeout_secs = get_env_parsed_or("DOMSEARCH_TIMEOUT_SECS", 30, &mut rejected);
        let snippet_chars = get_env_parsed_or("DOMSEARCH_SNIPPET_CHARS", 200, &mut rejected);
        let log_level =
            get_env_parsed_or("DOMSEARCH_LOG_LEVEL", tracing::Level::WARN, &mut rejected);
        Config {
            api_url: get_env_or_default("DOMSEARCH_API_URL", "http://localhost:8000"),
            timeout_secs,
            snippet_chars,
            log_level,
            rejected,
        }
    }

    /// Logs the rejected variables; call once logging is installed.
    pub fn report_rejected(&self) {
        for entry in &self.rejected {
            log::warn!("ignoring unparsable {entry}, using the default");
        }
    }
}

fn get_env_or_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Falls back to `default` when the variable is unset or does not parse;
/// unparsable values are recorded in `rejected`.
fn get_env_parsed_or<T: FromStr>(key: &str, default: T, rejected: &mut Vec<String>) -> T {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            rejected.push(format!("{key}={raw:?}"));
            default
        }),
        Err(_) => default,
    }
}

//! Layered configuration for the inferq service.
//!
//! Precedence: built-in defaults, then an optional config file (JSON or
//! TOML, inferred from the extension), then `INFERQ_*` environment
//! variables, which always win.

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;

/// Raw, everything-optional shape of a config file.
#[derive(Debug, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub server: Option<ServerSection>,
    #[serde(default)]
    pub logging: Option<LoggingSection>,
    #[serde(default)]
    pub worker: Option<WorkerSection>,
    #[serde(default)]
    pub retry: Option<RetrySection>,
    #[serde(default)]
    pub inference: Option<InferenceSection>,
}

#[derive(Debug, Deserialize)]
pub struct ServerSection {
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
}

#[derive(Debug, Deserialize)]
pub struct LoggingSection {
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default)]
    pub json: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct WorkerSection {
    #[serde(default)]
    pub count: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct RetrySection {
    #[serde(default)]
    pub max_attempts: Option<u32>,
    #[serde(default)]
    pub backoff_base_secs: Option<u64>,
    #[serde(default)]
    pub attempt_timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct InferenceSection {
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub max_tokens: Option<u32>,
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("Io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Load a RawConfigFile from a path. The format is inferred from the
/// extension: .toml or .json.
pub fn load_raw_from_file<P: AsRef<Path>>(path: P) -> Result<RawConfigFile, ConfigError> {
    let path = path.as_ref();
    let s = fs::read_to_string(path)?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_ascii_lowercase());
    parse_config_str(&s, ext.as_deref())
}

/// Parse configuration from a string with optional format hint.
fn parse_config_str(s: &str, ext: Option<&str>) -> Result<RawConfigFile, ConfigError> {
    match ext {
        #[cfg(feature = "toml")]
        Some("toml") => toml::from_str(s).map_err(|e| ConfigError::Parse(e.to_string())),
        #[cfg(feature = "json")]
        Some("json") => serde_json::from_str(s).map_err(|e| ConfigError::Parse(e.to_string())),
        _ => parse_config_auto(s),
    }
}

/// Try to parse config by attempting each enabled format.
fn parse_config_auto(s: &str) -> Result<RawConfigFile, ConfigError> {
    #[cfg(feature = "json")]
    if let Ok(cfg) = serde_json::from_str(s) {
        return Ok(cfg);
    }

    #[cfg(feature = "toml")]
    if let Ok(cfg) = toml::from_str(s) {
        return Ok(cfg);
    }

    #[cfg(any(feature = "json", feature = "toml"))]
    {
        Err(ConfigError::Parse(
            "failed to parse config as any supported format".into(),
        ))
    }

    #[cfg(not(any(feature = "json", feature = "toml")))]
    {
        let _ = s;
        Err(ConfigError::Parse("no config format enabled".into()))
    }
}

/// Concrete application configuration with defaults.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub worker: WorkerConfig,
    pub retry: RetryConfig,
    pub inference: InferenceConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkerConfig {
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub backoff_base_secs: u64,
    pub attempt_timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InferenceConfig {
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Only settable via `INFERQ_API_KEY`; never read from a config file.
    #[serde(skip_serializing)]
    pub api_key: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                json: false,
            },
            worker: WorkerConfig { count: 4 },
            retry: RetryConfig {
                max_attempts: 3,
                backoff_base_secs: 2,
                attempt_timeout_secs: 60,
            },
            inference: InferenceConfig {
                base_url: "https://api.openai.com".to_string(),
                model: "gpt-4".to_string(),
                temperature: 0.7,
                max_tokens: 500,
                api_key: String::new(),
            },
        }
    }
}

fn parse_bool(s: &str) -> Result<bool, ()> {
    match s.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" => Ok(true),
        "0" | "false" | "no" | "n" => Ok(false),
        _ => Err(()),
    }
}

/// Helper macro to apply optional value if present.
macro_rules! apply_opt {
    ($target:expr, $source:expr) => {
        if let Some(v) = $source {
            $target = v;
        }
    };
}

/// Helper macro to apply a parsed env var if present and parseable.
macro_rules! apply_env {
    ($target:expr, $name:expr, $parse:expr) => {
        if let Ok(raw) = env::var($name) {
            match $parse(&raw) {
                Ok(v) => $target = v,
                Err(_) => {
                    return Err(ConfigError::Validation(format!(
                        "invalid value for {}: {raw}",
                        $name
                    )))
                }
            }
        }
    };
}

/// Load concrete `Config` from optional file and environment variables.
/// Environment variables take precedence over file values and defaults.
pub fn load_config<P: AsRef<Path>>(path: Option<P>) -> Result<Config, ConfigError> {
    let mut cfg = Config::default();

    if let Some(p) = path {
        let raw = load_raw_from_file(p)?;
        if let Some(server) = raw.server {
            apply_opt!(cfg.server.host, server.host);
            apply_opt!(cfg.server.port, server.port);
        }
        if let Some(logging) = raw.logging {
            apply_opt!(cfg.logging.level, logging.level);
            apply_opt!(cfg.logging.json, logging.json);
        }
        if let Some(worker) = raw.worker {
            apply_opt!(cfg.worker.count, worker.count);
        }
        if let Some(retry) = raw.retry {
            apply_opt!(cfg.retry.max_attempts, retry.max_attempts);
            apply_opt!(cfg.retry.backoff_base_secs, retry.backoff_base_secs);
            apply_opt!(cfg.retry.attempt_timeout_secs, retry.attempt_timeout_secs);
        }
        if let Some(inference) = raw.inference {
            apply_opt!(cfg.inference.base_url, inference.base_url);
            apply_opt!(cfg.inference.model, inference.model);
            apply_opt!(cfg.inference.temperature, inference.temperature);
            apply_opt!(cfg.inference.max_tokens, inference.max_tokens);
        }
    }

    if let Ok(host) = env::var("INFERQ_HOST") {
        cfg.server.host = host;
    }
    apply_env!(cfg.server.port, "INFERQ_PORT", |s: &str| s.parse::<u16>());
    if let Ok(level) = env::var("INFERQ_LOG_LEVEL") {
        cfg.logging.level = level;
    }
    apply_env!(cfg.logging.json, "INFERQ_LOG_JSON", parse_bool);
    apply_env!(cfg.worker.count, "INFERQ_WORKERS", |s: &str| s
        .parse::<usize>());
    apply_env!(cfg.retry.max_attempts, "INFERQ_MAX_ATTEMPTS", |s: &str| s
        .parse::<u32>());
    apply_env!(
        cfg.retry.backoff_base_secs,
        "INFERQ_BACKOFF_BASE_SECS",
        |s: &str| s.parse::<u64>()
    );
    apply_env!(
        cfg.retry.attempt_timeout_secs,
        "INFERQ_ATTEMPT_TIMEOUT_SECS",
        |s: &str| s.parse::<u64>()
    );
    if let Ok(url) = env::var("INFERQ_INFERENCE_URL") {
        cfg.inference.base_url = url;
    }
    if let Ok(model) = env::var("INFERQ_INFERENCE_MODEL") {
        cfg.inference.model = model;
    }
    if let Ok(key) = env::var("INFERQ_API_KEY") {
        cfg.inference.api_key = key;
    }

    validate(&cfg)?;
    Ok(cfg)
}

fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if cfg.worker.count == 0 {
        return Err(ConfigError::Validation(
            "worker.count must be at least 1".into(),
        ));
    }
    if cfg.retry.max_attempts == 0 {
        return Err(ConfigError::Validation(
            "retry.max_attempts must be at least 1".into(),
        ));
    }
    if cfg.inference.base_url.is_empty() {
        return Err(ConfigError::Validation(
            "inference.base_url must not be empty".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_sane() {
        let cfg = Config::default();
        assert_eq!(cfg.worker.count, 4);
        assert_eq!(cfg.retry.max_attempts, 3);
        assert_eq!(cfg.retry.backoff_base_secs, 2);
        assert_eq!(cfg.logging.level, "info");
    }

    #[test]
    fn loads_toml_file() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        writeln!(
            file,
            r#"
[server]
port = 9000

[worker]
count = 8

[retry]
max_attempts = 5
"#
        )
        .unwrap();

        let cfg = load_config(Some(file.path())).unwrap();
        assert_eq!(cfg.server.port, 9000);
        assert_eq!(cfg.worker.count, 8);
        assert_eq!(cfg.retry.max_attempts, 5);
        // Untouched sections keep their defaults.
        assert_eq!(cfg.inference.model, "gpt-4");
    }

    #[test]
    fn loads_json_file() {
        let mut file = tempfile::Builder::new()
            .suffix(".json")
            .tempfile()
            .unwrap();
        write!(
            file,
            r#"{{"logging": {{"level": "debug", "json": true}}, "inference": {{"model": "gpt-4o"}}}}"#
        )
        .unwrap();

        let cfg = load_config(Some(file.path())).unwrap();
        assert_eq!(cfg.logging.level, "debug");
        assert!(cfg.logging.json);
        assert_eq!(cfg.inference.model, "gpt-4o");
    }

    #[test]
    fn rejects_zero_workers() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        writeln!(file, "[worker]\ncount = 0").unwrap();

        let err = load_config(Some(file.path())).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn rejects_unparseable_file() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        writeln!(file, "this is not a config").unwrap();

        let err = load_config(Some(file.path())).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_config(Some("/nonexistent/inferq.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::error::ConfigError;
use crate::routes::DEFAULT_MAX_BODY_BYTES;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Speech classifier web front-end.
#[derive(Debug, Clone, Parser)]
#[command(name = "speech-classifier", version, about)]
pub struct Config {
    /// Address the HTTP server listens on
    #[arg(long, env = "APP_BIND_ADDR", default_value = "127.0.0.1:8080")]
    pub bind_addr: String,

    /// Classifier artifact loaded at startup
    #[arg(long, env = "APP_MODEL_PATH", default_value = "model.json")]
    pub model_path: PathBuf,

    /// Number of HTTP workers (defaults to the number of CPUs)
    #[arg(long, env = "APP_WORKERS")]
    pub workers: Option<usize>,

    /// Largest accepted prediction form body, in bytes
    #[arg(long, env = "APP_MAX_BODY_BYTES", default_value_t = DEFAULT_MAX_BODY_BYTES)]
    pub max_body_bytes: usize,

    /// Log output format
    #[arg(long, env = "RUST_LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_bind_addr(&self.bind_addr)?;
        if self.workers == Some(0) {
            return Err(ConfigError::Workers);
        }
        if self.max_body_bytes == 0 {
            return Err(ConfigError::MaxBodyBytes);
        }
        Ok(())
    }
}

/// Requires a non-empty host and a non-zero port.
fn validate_bind_addr(addr: &str) -> Result<(), ConfigError> {
    let invalid = || ConfigError::BindAddr(addr.to_string());
    let (host, port) = addr.rsplit_once(':').ok_or_else(invalid)?;
    if host.trim().is_empty() {
        return Err(invalid());
    }
    match port.parse::<u16>() {
        Ok(0) | Err(_) => Err(invalid()),
        Ok(_) => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Config {
        Config::try_parse_from(std::iter::once("speech-classifier").chain(args.iter().copied()))
            .unwrap()
    }

    #[test]
    fn test_validate_bind_addr_valid() {
        assert!(validate_bind_addr("127.0.0.1:8080").is_ok());
        assert!(validate_bind_addr("localhost:80").is_ok());
        assert!(validate_bind_addr("[::1]:8080").is_ok());
    }

    #[test]
    fn test_validate_bind_addr_invalid() {
        assert!(validate_bind_addr("127.0.0.1").is_err());
        assert!(validate_bind_addr(":8080").is_err());
        assert!(validate_bind_addr("127.0.0.1:0").is_err());
        assert!(validate_bind_addr("127.0.0.1:http").is_err());
    }

    #[test]
    fn test_flags_override_defaults() {
        let config = parse(&[
            "--bind-addr",
            "0.0.0.0:9000",
            "--model-path",
            "artifacts/speeches.json",
            "--workers",
            "2",
            "--log-format",
            "json",
            "--max-body-bytes",
            "1048576",
        ]);
        assert_eq!(config.bind_addr, "0.0.0.0:9000");
        assert_eq!(config.model_path, PathBuf::from("artifacts/speeches.json"));
        assert_eq!(config.workers, Some(2));
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.max_body_bytes, 1_048_576);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_body_limit_defaults_above_actix_form_limit() {
        let config = parse(&[]);
        assert_eq!(config.max_body_bytes, DEFAULT_MAX_BODY_BYTES);
        assert!(config.max_body_bytes > 16 * 1024);
    }

    #[test]
    fn test_zero_body_limit_rejected() {
        let config = parse(&["--max-body-bytes", "0"]);
        assert!(matches!(config.validate(), Err(ConfigError::MaxBodyBytes)));
    }

    #[test]
    fn test_zero_workers_rejected() {
        let config = parse(&["--workers", "0"]);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("worker count cannot be 0"));
    }
}

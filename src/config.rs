use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

/// Terminal client for a task-tracker REST API.
#[derive(Debug, Parser)]
#[command(name = "taskdeck", version, about)]
pub struct Args {
    /// Base URL of the task tracker backend.
    #[arg(long, env = "TASKDECK_API_URL", default_value = "http://localhost:8000")]
    pub api_url: String,

    /// Request timeout in seconds for every API call.
    #[arg(long, default_value_t = 10)]
    pub timeout_secs: u64,

    /// Append tracing output to this file. Logging is off without it,
    /// since the terminal is taken over by the UI.
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub log_file: Option<PathBuf>,
}

impl AppConfig {
    pub fn from_args(args: Args) -> Self {
        Self {
            base_url: args.api_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(args.timeout_secs),
            log_file: args.log_file,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_stripped_from_base_url() {
        let args = Args::parse_from(["taskdeck", "--api-url", "http://example.com/"]);
        let config = AppConfig::from_args(args);
        assert_eq!(config.base_url, "http://example.com");
    }

    #[test]
    fn defaults() {
        // Clear the env override so the default applies regardless of the host env.
        std::env::remove_var("TASKDECK_API_URL");
        let args = Args::parse_from(["taskdeck"]);
        let config = AppConfig::from_args(args);
        assert_eq!(config.base_url, "http://localhost:8000");
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert!(config.log_file.is_none());
    }
}

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::AppError;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub elevenlabs: ElevenLabsConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub request: RequestConfig,
    pub session: SessionConfig,
}

/// ElevenLabs API configuration
#[derive(Debug, Clone)]
pub struct ElevenLabsConfig {
    pub api_key: String,
    pub base_url: String,
    /// Conversational agent to connect calls to. Optional because the
    /// provisioning CLI is what creates it in the first place.
    pub agent_id: Option<String>,
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub path: PathBuf,
    pub max_connections: u32,
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

/// Log output format
#[derive(Debug, Clone, PartialEq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// HTTP request configuration
#[derive(Debug, Clone)]
pub struct RequestConfig {
    pub timeout_ms: u64,
    pub max_retries: u32,
    pub retry_delay_ms: u64,
}

/// Training session policy configuration
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Hard cap on call length; any call still active at the cap is ended.
    pub max_call_duration_seconds: u32,
    /// Duration timer tick interval.
    pub timer_interval_ms: u64,
    /// Grace period between tag detection and ending the call, so the
    /// persona's closing line can finish playing.
    pub end_scenario_delay_ms: u64,
    /// Bounded history log size; oldest records are evicted past this.
    pub max_history: usize,
}

impl SessionConfig {
    /// The duration cap as a [`Duration`].
    pub fn max_call_duration(&self) -> Duration {
        Duration::from_secs(u64::from(self.max_call_duration_seconds))
    }

    /// The timer tick interval as a [`Duration`].
    pub fn timer_interval(&self) -> Duration {
        Duration::from_millis(self.timer_interval_ms)
    }

    /// The tag-to-teardown grace period as a [`Duration`].
    pub fn end_scenario_delay(&self) -> Duration {
        Duration::from_millis(self.end_scenario_delay_ms)
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, AppError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let elevenlabs = ElevenLabsConfig {
            api_key: env::var("ELEVENLABS_API_KEY").map_err(|_| AppError::Config {
                message: "ELEVENLABS_API_KEY is required".to_string(),
            })?,
            base_url: env::var("ELEVENLABS_BASE_URL")
                .unwrap_or_else(|_| "https://api.elevenlabs.io".to_string()),
            agent_id: env::var("ELEVENLABS_AGENT_ID").ok(),
        };

        let database = DatabaseConfig {
            path: PathBuf::from(
                env::var("DATABASE_PATH").unwrap_or_else(|_| "./data/training.db".to_string()),
            ),
            max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(5),
        };

        let logging = LoggingConfig {
            level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            format: match env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "pretty".to_string())
                .to_lowercase()
                .as_str()
            {
                "json" => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
        };

        let request = RequestConfig {
            timeout_ms: env::var("REQUEST_TIMEOUT_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(30000),
            max_retries: env::var("MAX_RETRIES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(3),
            retry_delay_ms: env::var("RETRY_DELAY_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(1000),
        };

        let session = SessionConfig {
            max_call_duration_seconds: env::var("MAX_CALL_DURATION_SECONDS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(300),
            timer_interval_ms: env::var("TIMER_INTERVAL_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(1000),
            end_scenario_delay_ms: env::var("END_SCENARIO_DELAY_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(2000),
            max_history: env::var("MAX_SESSION_HISTORY")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(50),
        };

        Ok(Config {
            elevenlabs,
            database,
            logging,
            request,
            session,
        })
    }
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 30000,
            max_retries: 3,
            retry_delay_ms: 1000,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_call_duration_seconds: 300,
            timer_interval_ms: 1000,
            end_scenario_delay_ms: 2000,
            max_history: 50,
        }
    }
}

use crate::components::calendar::CalendarSource;
use crate::error::{config_error, env_error, AppResult};
use chrono_tz::Tz;
use dotenvy::dotenv;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;

/// Default port for the HTTP server
pub const DEFAULT_PORT: u16 = 3000;

/// Default Gemini model used for event extraction
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";

/// Default Gemini REST endpoint
pub const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Value shipped in the sample `.env`; treated as "not configured"
const PLACEHOLDER_API_KEY: &str = "your_api_key_here";

/// Optional override file for the calendar source
const CALENDAR_CONFIG_PATH: &str = "config/calendar.toml";

/// Main configuration structure for the server
#[derive(Debug, Clone)]
pub struct Config {
    /// Address to bind the HTTP listener to
    pub bind_address: String,
    /// Port to listen on
    pub port: u16,
    /// Gemini API key, `None` when unset or left as the placeholder
    pub gemini_api_key: Option<String>,
    /// Gemini model name
    pub gemini_model: String,
    /// Base URL of the Gemini REST API
    pub gemini_api_base: String,
    /// Directory served as static files
    pub static_dir: String,
    /// Time zone used for "now" and floating calendar times
    pub timezone: Tz,
    /// Calendar feed served by the calendar endpoint
    pub calendar: CalendarSource,
}

/// Partial calendar source read from `config/calendar.toml`
#[derive(Debug, Default, Deserialize)]
struct CalendarOverrides {
    feed_url: Option<String>,
    id_prefix: Option<String>,
    host: Option<String>,
    calendar_name: Option<String>,
    window_days: Option<i64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            gemini_api_key: None,
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            gemini_api_base: DEFAULT_GEMINI_API_BASE.to_string(),
            static_dir: ".".to_string(),
            timezone: Tz::UTC,
            calendar: CalendarSource::default(),
        }
    }
}

impl Config {
    /// Load configuration from environment and config file
    pub fn load() -> AppResult<Self> {
        // Load .env file if it exists
        dotenv().ok();

        let mut config = Config::default();

        if let Ok(port) = env::var("PORT") {
            config.port = port.parse::<u16>().map_err(|_| env_error("PORT"))?;
        }
        if let Ok(addr) = env::var("BIND_ADDRESS") {
            config.bind_address = addr;
        }

        config.gemini_api_key = env::var("GEMINI_API_KEY")
            .ok()
            .and_then(|key| normalize_api_key(&key));
        if let Ok(model) = env::var("GEMINI_MODEL") {
            config.gemini_model = model;
        }
        if let Ok(base) = env::var("GEMINI_API_BASE") {
            config.gemini_api_base = base.trim_end_matches('/').to_string();
        }

        if let Ok(dir) = env::var("STATIC_DIR") {
            config.static_dir = dir;
        }

        if let Ok(tz) = env::var("TIMEZONE") {
            config.timezone = parse_timezone(&tz)?;
        }

        // Calendar overrides: file first, then the environment wins
        if let Ok(content) = fs::read_to_string(CALENDAR_CONFIG_PATH) {
            let overrides = toml::from_str::<CalendarOverrides>(&content)?;
            overrides.apply(&mut config.calendar);
        }
        if let Ok(days) = env::var("CALENDAR_WINDOW_DAYS") {
            config.calendar.window_days = days
                .parse::<i64>()
                .map_err(|_| env_error("CALENDAR_WINDOW_DAYS"))?;
        }
        validate_window(config.calendar.window_days)?;

        Ok(config)
    }

    /// Load calendar overrides from an explicit file path
    pub fn with_calendar_file(mut self, path: &Path) -> AppResult<Self> {
        let content = fs::read_to_string(path)?;
        let overrides = toml::from_str::<CalendarOverrides>(&content)?;
        overrides.apply(&mut self.calendar);
        validate_window(self.calendar.window_days)?;
        Ok(self)
    }

    /// Socket address string for the listener
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}

impl CalendarOverrides {
    fn apply(self, source: &mut CalendarSource) {
        if let Some(url) = self.feed_url {
            source.feed_url = url;
        }
        if let Some(prefix) = self.id_prefix {
            source.id_prefix = prefix;
        }
        if let Some(host) = self.host {
            source.host = host;
        }
        if let Some(name) = self.calendar_name {
            source.calendar_name = name;
        }
        if let Some(days) = self.window_days {
            source.window_days = days;
        }
    }
}

/// Treat blank keys and the sample placeholder as missing
fn normalize_api_key(key: &str) -> Option<String> {
    let key = key.trim();
    if key.is_empty() || key == PLACEHOLDER_API_KEY {
        None
    } else {
        Some(key.to_string())
    }
}

fn validate_window(days: i64) -> AppResult<()> {
    if days < 0 {
        return Err(config_error("Calendar window must not be negative"));
    }
    Ok(())
}

/// Parse an IANA time zone name
pub fn parse_timezone(name: &str) -> AppResult<Tz> {
    name.trim()
        .parse::<Tz>()
        .map_err(|_| config_error(&format!("Unknown timezone: {}", name)))
}

//! Configuration types.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use chrono::{FixedOffset, Offset, Utc};
use secrecy::SecretString;

use crate::error::{ConfigError, Result};

/// Default Microsoft Graph root.
pub const DEFAULT_GRAPH_BASE_URL: &str = "https://graph.microsoft.com/v1.0";

/// Default notebook healed on a section-directory miss.
pub const DEFAULT_NOTEBOOK: &str = "Life Log";

/// Router configuration, read once at start-up.
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// HTTP listen port.
    pub port: u16,
    /// Local timezone used when stamping page titles.
    pub timezone: FixedOffset,
    /// Notebook whose sections are listed on heal.
    pub notebook: String,
    /// Static section directory (name → section id).
    pub static_sections: HashMap<String, String>,
    /// Lifetime of the dynamic section cache.
    pub cache_ttl: Duration,
    /// libSQL file backing the KV cache. In-memory when `None`.
    pub db_path: Option<PathBuf>,
    /// How often the retry sweep runs.
    pub retry_interval: Duration,
    /// Microsoft Graph root URL.
    pub graph_base_url: String,
    /// Bearer token for Graph calls.
    pub graph_token: Option<SecretString>,
    /// Directory for the rolling log file. Stderr only when `None`.
    pub log_dir: Option<PathBuf>,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            timezone: utc_offset(),
            notebook: DEFAULT_NOTEBOOK.to_string(),
            static_sections: HashMap::new(),
            cache_ttl: Duration::from_secs(86_400), // 24 hours
            db_path: None,
            retry_interval: Duration::from_secs(60),
            graph_base_url: DEFAULT_GRAPH_BASE_URL.to_string(),
            graph_token: None,
            log_dir: None,
        }
    }
}

impl RouterConfig {
    /// Build config from environment variables.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let port: u16 = std::env::var("LIFELOG_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.port);

        let timezone = match std::env::var("LIFELOG_TZ_OFFSET") {
            Ok(raw) => parse_offset(&raw)?,
            Err(_) => defaults.timezone,
        };

        let notebook = std::env::var("LIFELOG_NOTEBOOK")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(defaults.notebook);

        let mut static_sections = HashMap::new();
        if let Ok(path) = std::env::var("LIFELOG_SECTION_MAP_FILE") {
            let raw = std::fs::read_to_string(&path).map_err(ConfigError::from)?;
            static_sections.extend(parse_section_map("LIFELOG_SECTION_MAP_FILE", &raw)?);
        }
        if let Ok(raw) = std::env::var("LIFELOG_SECTION_MAP") {
            static_sections.extend(parse_section_map("LIFELOG_SECTION_MAP", &raw)?);
        }

        let cache_ttl = std::env::var("LIFELOG_CACHE_TTL_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.cache_ttl);

        let db_path = std::env::var("LIFELOG_DB_PATH").ok().map(PathBuf::from);

        let retry_interval = std::env::var("LIFELOG_RETRY_INTERVAL_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .filter(|secs: &u64| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(defaults.retry_interval);

        let graph_base_url = std::env::var("GRAPH_BASE_URL")
            .map(|s| s.trim_end_matches('/').to_string())
            .unwrap_or(defaults.graph_base_url);

        let graph_token = std::env::var("GRAPH_ACCESS_TOKEN")
            .ok()
            .filter(|s| !s.is_empty())
            .map(SecretString::from);

        let log_dir = std::env::var("LIFELOG_LOG_DIR").ok().map(PathBuf::from);

        Ok(Self {
            port,
            timezone,
            notebook,
            static_sections,
            cache_ttl,
            db_path,
            retry_interval,
            graph_base_url,
            graph_token,
            log_dir,
        })
    }
}

fn utc_offset() -> FixedOffset {
    Utc.fix()
}

/// Parse a `±HH:MM` (or `Z`/`UTC`) offset.
pub fn parse_offset(raw: &str) -> std::result::Result<FixedOffset, ConfigError> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("z") || raw.eq_ignore_ascii_case("utc") {
        return Ok(utc_offset());
    }

    let invalid = |message: &str| ConfigError::InvalidValue {
        key: "LIFELOG_TZ_OFFSET".into(),
        message: format!("{message}: {raw:?}"),
    };

    let (sign, rest) = match raw.as_bytes().first() {
        Some(b'+') => (1, &raw[1..]),
        Some(b'-') => (-1, &raw[1..]),
        _ => return Err(invalid("expected a leading + or -")),
    };
    let (hours, minutes) = rest
        .split_once(':')
        .ok_or_else(|| invalid("expected HH:MM"))?;
    let hours = offset_field(hours).ok_or_else(|| invalid("bad hours"))?;
    let minutes = offset_field(minutes).ok_or_else(|| invalid("bad minutes"))?;
    if hours > 14 || minutes > 59 {
        return Err(invalid("offset out of range"));
    }

    let seconds = (hours * 3600 + minutes * 60) as i32;
    FixedOffset::east_opt(sign * seconds)
        .ok_or_else(|| invalid("offset out of range"))
}

/// One or two ASCII digits, no sign.
fn offset_field(raw: &str) -> Option<u32> {
    if raw.is_empty() || raw.len() > 2 || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

/// Parse a JSON object of section name → section id.
pub fn parse_section_map(
    key: &str,
    raw: &str,
) -> std::result::Result<HashMap<String, String>, ConfigError> {
    serde_json::from_str(raw).map_err(|e| ConfigError::InvalidValue {
        key: key.to_string(),
        message: e.to_string(),
    })
}

use std::env;
use std::path::PathBuf;
use tracing::warn;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_SUBMISSION_TIMEOUT_SECS: u64 = 10;
const DEFAULT_SESSION_IDLE_TTL_SECS: u64 = 30 * 60;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    pub clinic_data_path: Option<PathBuf>,
    pub slot_calendar_path: Option<PathBuf>,
    pub booking_submission_url: Option<String>,
    pub booking_submission_timeout_secs: u64,
    pub session_idle_ttl_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            clinic_data_path: None,
            slot_calendar_path: None,
            booking_submission_url: None,
            booking_submission_timeout_secs: DEFAULT_SUBMISSION_TIMEOUT_SECS,
            session_idle_ttl_secs: DEFAULT_SESSION_IDLE_TTL_SECS,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            bind_addr: env::var("API_BIND_ADDR")
                .unwrap_or_else(|_| {
                    warn!("API_BIND_ADDR not set, using default {}", DEFAULT_BIND_ADDR);
                    DEFAULT_BIND_ADDR.to_string()
                }),
            clinic_data_path: optional_var("CLINIC_DATA_PATH").map(PathBuf::from),
            slot_calendar_path: optional_var("SLOT_CALENDAR_PATH").map(PathBuf::from),
            booking_submission_url: optional_var("BOOKING_SUBMISSION_URL"),
            booking_submission_timeout_secs: secs_var(
                "BOOKING_SUBMISSION_TIMEOUT_SECS",
                DEFAULT_SUBMISSION_TIMEOUT_SECS,
            ),
            session_idle_ttl_secs: secs_var("SESSION_IDLE_TTL_SECS", DEFAULT_SESSION_IDLE_TTL_SECS),
        };

        if config.clinic_data_path.is_none() {
            warn!("CLINIC_DATA_PATH not set, admin lists will start empty");
        }
        if config.slot_calendar_path.is_none() {
            warn!("SLOT_CALENDAR_PATH not set, no appointment slots will be offered");
        }
        if !config.is_submission_configured() {
            warn!("BOOKING_SUBMISSION_URL not set, completed bookings will only be logged");
        }

        config
    }

    pub fn is_submission_configured(&self) -> bool {
        self.booking_submission_url
            .as_deref()
            .is_some_and(|url| !url.trim().is_empty())
    }
}

/// Positive number of seconds from `key`, or `default` with a warning.
fn secs_var(key: &str, default: u64) -> u64 {
    match env::var(key) {
        Ok(raw) => parse_secs(&raw).unwrap_or_else(|| {
            warn!("{} is invalid ({}), using default {}", key, raw, default);
            default
        }),
        Err(_) => default,
    }
}

fn parse_secs(raw: &str) -> Option<u64> {
    raw.trim().parse::<u64>().ok().filter(|secs| *secs > 0)
}

fn optional_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

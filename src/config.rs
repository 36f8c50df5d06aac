//! Runtime configuration for the control plane with environment overrides.
//! Defaults suit a local console deployment; every value can be overridden
//! through `PORDISTO_*` variables so static deployments can change endpoints
//! and cadences without rebuilding. Configuration values are public; do not
//! store secrets here.

use std::{env, path::PathBuf, time::Duration};
use tracing::warn;
use url::Url;

/// Default request timeout applied to every HTTP call.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
/// Default tenant-status polling cadence.
const DEFAULT_STATUS_POLL: Duration = Duration::from_secs(120);
/// Default announcement polling cadence.
const DEFAULT_ANNOUNCEMENTS_POLL: Duration = Duration::from_secs(300);

#[derive(Clone, Debug)]
pub struct Config {
    /// Base URL of the console backend, e.g. `https://api.console.dev`.
    pub api_base_url: String,
    /// Timeout for every outbound request.
    pub request_timeout: Duration,
    /// Cadence of the tenant-status poll loop. Must be positive.
    pub status_poll_interval: Duration,
    /// Cadence of the announcement poll loop. Must be positive.
    pub announcements_poll_interval: Duration,
    /// Directory holding the persisted session records.
    pub session_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: String::new(),
            request_timeout: DEFAULT_TIMEOUT,
            status_poll_interval: DEFAULT_STATUS_POLL,
            announcements_poll_interval: DEFAULT_ANNOUNCEMENTS_POLL,
            session_dir: PathBuf::from(".pordisto"),
        }
    }
}

impl Config {
    /// Loads defaults and applies `PORDISTO_*` environment overrides.
    /// Empty or non-positive override values are ignored.
    #[must_use]
    pub fn load() -> Self {
        let mut config = Self::default();

        if let Some(value) = env_value("PORDISTO_API_BASE_URL") {
            match check_base_url(&value) {
                Ok(()) => config.api_base_url = value,
                Err(err) => warn!("Ignoring PORDISTO_API_BASE_URL: {err}"),
            }
        }
        if let Some(value) = env_value("PORDISTO_SESSION_DIR") {
            config.session_dir = PathBuf::from(value);
        }
        if let Some(seconds) = env_seconds("PORDISTO_REQUEST_TIMEOUT_SECONDS") {
            config.request_timeout = seconds;
        }
        if let Some(seconds) = env_seconds("PORDISTO_STATUS_POLL_SECONDS") {
            config.status_poll_interval = seconds;
        }
        if let Some(seconds) = env_seconds("PORDISTO_ANNOUNCEMENTS_POLL_SECONDS") {
            config.announcements_poll_interval = seconds;
        }

        config
    }

    /// Builds a full URL from the configured base and the provided path.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        join_url(&self.api_base_url, path)
    }
}

/// Builds a URL from a base URL and a path, tolerating stray slashes.
pub(crate) fn join_url(base_url: &str, path: &str) -> String {
    let base = base_url.trim().trim_end_matches('/');
    let path = path.trim();

    if base.is_empty() {
        path.to_string()
    } else {
        format!("{}/{}", base, path.trim_start_matches('/'))
    }
}

/// Checks that a base URL is parseable, names a host, and uses an http(s)
/// scheme. An empty base is accepted: same-origin deployments address the
/// backend with bare paths.
///
/// # Errors
/// Returns a description of the first problem found.
pub fn check_base_url(base_url: &str) -> Result<(), String> {
    if base_url.trim().is_empty() {
        return Ok(());
    }

    let url = Url::parse(base_url).map_err(|err| format!("Error parsing URL: {err}"))?;

    let scheme = url.scheme();
    if scheme != "http" && scheme != "https" {
        return Err(format!("Error parsing URL: unsupported scheme {scheme}"));
    }

    if url.host().is_none() {
        return Err("Error parsing URL: no host specified".to_string());
    }

    Ok(())
}

fn env_value(name: &str) -> Option<String> {
    let value = env::var(name).ok()?;
    normalize_value(&value)
}

fn env_seconds(name: &str) -> Option<Duration> {
    let value = env_value(name)?;
    match value.parse::<u64>() {
        Ok(seconds) if seconds > 0 => Some(Duration::from_secs(seconds)),
        _ => {
            warn!("Ignoring {name}: expected a positive number of seconds, got {value:?}");
            None
        }
    }
}

fn normalize_value(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

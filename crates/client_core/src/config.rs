use std::{fs, io, path::Path};

use serde::Deserialize;
use tracing::warn;
use url::Url;

use crate::error::ClientError;

pub const SETTINGS_FILE: &str = "storefront.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientSettings {
    pub base_url: String,
    pub request_timeout_secs: u64,
    pub connect_timeout_secs: u64,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".into(),
            request_timeout_secs: 120,
            connect_timeout_secs: 10,
        }
    }
}

/// Reads `storefront.toml` from the working directory, then applies
/// environment overrides.
pub fn load_settings() -> Result<ClientSettings, ClientError> {
    load_settings_from(Path::new(SETTINGS_FILE), |name| std::env::var(name).ok())
}

pub fn load_settings_from(
    path: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> Result<ClientSettings, ClientError> {
    let mut settings = match fs::read_to_string(path) {
        Ok(raw) => toml::from_str::<ClientSettings>(&raw).map_err(|source| {
            ClientError::SettingsParse {
                path: path.display().to_string(),
                source,
            }
        })?,
        Err(err) if err.kind() == io::ErrorKind::NotFound => ClientSettings::default(),
        Err(source) => {
            return Err(ClientError::SettingsRead {
                path: path.display().to_string(),
                source,
            })
        }
    };

    if let Some(v) = env("STOREFRONT_BASE_URL") {
        settings.base_url = v;
    }
    if let Some(v) = env("APP__BASE_URL") {
        settings.base_url = v;
    }
    if let Some(v) = env("APP__REQUEST_TIMEOUT_SECS") {
        if let Some(secs) = parse_timeout("APP__REQUEST_TIMEOUT_SECS", &v) {
            settings.request_timeout_secs = secs;
        }
    }
    if let Some(v) = env("APP__CONNECT_TIMEOUT_SECS") {
        if let Some(secs) = parse_timeout("APP__CONNECT_TIMEOUT_SECS", &v) {
            settings.connect_timeout_secs = secs;
        }
    }

    // Timeouts must be non-zero.
    let defaults = ClientSettings::default();
    if settings.request_timeout_secs == 0 {
        warn!("request_timeout_secs of 0 is not usable; using the default");
        settings.request_timeout_secs = defaults.request_timeout_secs;
    }
    if settings.connect_timeout_secs == 0 {
        warn!("connect_timeout_secs of 0 is not usable; using the default");
        settings.connect_timeout_secs = defaults.connect_timeout_secs;
    }

    settings.base_url = normalize_base_url(&settings.base_url)?;
    Ok(settings)
}

fn parse_timeout(name: &str, raw: &str) -> Option<u64> {
    match raw.trim().parse::<u64>() {
        Ok(0) => {
            warn!(%name, "ignoring zero timeout");
            None
        }
        Ok(secs) => Some(secs),
        Err(_) => {
            warn!(%name, value = %raw, "ignoring non-numeric timeout");
            None
        }
    }
}

/// Trims whitespace and trailing slashes so endpoint paths can be appended.
pub fn normalize_base_url(raw: &str) -> Result<String, ClientError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let parsed = Url::parse(trimmed).map_err(|source| ClientError::InvalidBaseUrl {
        url: raw.to_string(),
        source,
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ClientError::UnsupportedScheme(raw.to_string()));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;

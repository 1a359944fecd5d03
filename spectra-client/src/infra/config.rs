use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Environment variable overriding [`ClientConfig::server_url`].
pub const SERVER_URL_ENV: &str = "SPECTRA_SERVER_URL";
/// Environment variable overriding the processing timeout, e.g. `"90s"`.
pub const PROCESS_TIMEOUT_ENV: &str = "SPECTRA_PROCESS_TIMEOUT";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub server_url: String,
    /// Upper bound for one `/api/process` round trip.
    #[serde(with = "duration_format")]
    pub process_timeout: Duration,
    /// Upper bound for health and upload requests.
    #[serde(with = "duration_format")]
    pub request_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: "http://localhost:5000".to_string(),
            process_timeout: Duration::from_secs(120),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl ClientConfig {
    pub fn process_timeout(&self) -> Duration {
        self.process_timeout
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Replace the processing timeout. A zero duration is ignored.
    pub fn with_process_timeout(mut self, timeout: Duration) -> Self {
        self.set_process_timeout(timeout);
        self
    }

    fn set_process_timeout(&mut self, timeout: Duration) {
        if timeout.is_zero() {
            log::warn!("[Config] Ignoring zero processing timeout");
        } else {
            self.process_timeout = timeout;
        }
    }

    /// Default location of the persisted config file.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("spectra").join("config.json"))
    }

    /// Load the config file (if any), then apply environment overrides.
    pub fn load() -> Self {
        let mut config = Self::default_path()
            .filter(|path| path.exists())
            .and_then(|path| match Self::load_from(&path) {
                Ok(config) => Some(config),
                Err(err) => {
                    log::warn!(
                        "[Config] Ignoring unreadable config {}: {}",
                        path.display(),
                        err
                    );
                    None
                }
            })
            .unwrap_or_default();

        config.apply_env_overrides(|key| std::env::var(key).ok());
        config
    }

    pub fn load_from(path: &Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(std::io::Error::other)
    }

    pub fn save(&self) -> Result<(), std::io::Error> {
        match Self::default_path() {
            Some(path) => self.save_to(&path),
            None => Ok(()),
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<(), std::io::Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)
    }

    /// Apply `SPECTRA_*` overrides read through `lookup`. Malformed values
    /// are logged and skipped.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(SERVER_URL_ENV)
            && !url.trim().is_empty()
        {
            self.server_url = url;
        }

        if let Some(raw) = lookup(PROCESS_TIMEOUT_ENV) {
            match humantime::parse_duration(raw.trim()) {
                Ok(timeout) => self.set_process_timeout(timeout),
                Err(err) => log::warn!(
                    "[Config] Ignoring {}='{}': {}",
                    PROCESS_TIMEOUT_ENV,
                    raw,
                    err
                ),
            }
        }
    }
}

/// Durations as humantime strings (`"2m"`, `"1s 500ms"`). Bare integers
/// are read as seconds.
mod duration_format {
    use std::time::Duration;

    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Seconds(u64),
        Text(String),
    }

    pub fn serialize<S: Serializer>(
        value: &Duration,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer
            .serialize_str(&humantime::format_duration(*value).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Duration, D::Error> {
        match Raw::deserialize(deserializer)? {
            Raw::Seconds(secs) => Ok(Duration::from_secs(secs)),
            Raw::Text(text) => {
                humantime::parse_duration(text.trim()).map_err(D::Error::custom)
            }
        }
    }
}

/// Add `http://` when the scheme is missing and drop trailing slashes.
///
/// Most people type `localhost:5000`, which reqwest rejects.
pub fn normalize_base_url(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    let normalized = if trimmed.starts_with("http://")
        || trimmed.starts_with("https://")
    {
        trimmed.to_string()
    } else {
        format!("http://{}", trimmed)
    };
    if normalized != raw {
        log::warn!(
            "[ApiClient] Normalized base URL from '{}' to '{}'",
            raw,
            normalized
        );
    }
    normalized
}

//! Layered configuration for manifest access.
//!
//! Values are resolved from, lowest to highest precedence:
//!
//! 1. Built-in defaults ([`Config::default`])
//! 2. A configuration file, TOML, YAML or JSON by extension: the path given
//!    to [`Config::load`], or `config.toml` in the platform config directory
//!    if none is given (a missing default file is not an error)
//! 3. Environment variables prefixed with `MANIFEST_` (`MANIFEST_LOCALE=fr`)

pub mod error;

use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use serde::{Deserialize, Serialize};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "MANIFEST_";
/// Host serving both the manifest metadata and the archives it points at.
pub const DEFAULT_BASE_URL: &str = "https://www.bungie.net";
pub const DEFAULT_LOCALE: &str = "en";
// The archive is large and a slow mirror shouldn't be mistaken for a dead one.
const DEFAULT_TIMEOUT_SECS: u64 = 300;
const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Scheme and host, without a trailing path; remote paths are joined onto it.
    pub base_url: String,
    /// The one locale whose database is fetched.
    pub locale: String,
    /// Directory holding downloaded databases. Created when missing.
    pub cache_dir: PathBuf,
    /// Sent as `X-API-Key` on metadata requests.
    pub api_key: Option<String>,
    /// Per-request HTTP timeout.
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            locale: DEFAULT_LOCALE.to_string(),
            cache_dir: PathBuf::from("."),
            api_key: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Config {
    /// Load and validate configuration.
    ///
    /// An explicit `path` must exist; without one, the default location is
    /// consulted only if a file is there.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config: Self = Self::figment(path)?.extract().or_raise(|| ErrorKind::Load)?;
        config.validate()?;
        Ok(config)
    }

    /// The merged provider chain, before extraction.
    pub fn figment(path: Option<&Path>) -> Result<Figment> {
        let figment = Figment::from(Serialized::defaults(Self::default()));
        let figment = match path {
            Some(path) => {
                if !path.is_file() {
                    exn::bail!(ErrorKind::Missing(path.to_path_buf()));
                }
                merge_file(figment, path)?
            },
            None => match Self::default_path() {
                Some(default) if default.is_file() => {
                    tracing::debug!(path = %default.display(), "Loading configuration from default location");
                    merge_file(figment, &default)?
                },
                _ => figment,
            },
        };
        Ok(figment.merge(Env::prefixed(ENV_PREFIX)))
    }

    /// `config.toml` in the platform configuration directory, if the
    /// platform has one.
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "manifest").map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    pub fn validate(&self) -> Result<()> {
        let host = self
            .base_url
            .strip_prefix("https://")
            .or_else(|| self.base_url.strip_prefix("http://"))
            .unwrap_or_default()
            .trim_end_matches('/');
        if host.is_empty() || host.contains('/') {
            exn::bail!(ErrorKind::Invalid("base_url"));
        }
        if self.locale.is_empty() || self.locale.contains(['/', '\\']) {
            exn::bail!(ErrorKind::Invalid("locale"));
        }
        if self.timeout_secs == 0 {
            exn::bail!(ErrorKind::Invalid("timeout_secs"));
        }
        Ok(())
    }

    #[inline]
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn merge_file(figment: Figment, path: &Path) -> Result<Figment> {
    let extension = path.extension().and_then(OsStr::to_str).unwrap_or_default().to_ascii_lowercase();
    Ok(match extension.as_str() {
        "toml" => figment.merge(Toml::file(path)),
        "yaml" | "yml" => figment.merge(Yaml::file(path)),
        "json" => figment.merge(Json::file(path)),
        _ => exn::bail!(ErrorKind::UnsupportedFormat(extension)),
    })
}

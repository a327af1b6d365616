// SPDX-FileCopyrightText: © 2026 Edge Mesh SDK Contributors
//
// SPDX-License-Identifier: MPL-2.0

//! The closed [`SessionConfig`] option set and its deterministic precedence
//! merge: built-in default → environment variable → user-config file →
//! explicit constructor override.

mod error;

pub use error::{ConfigError, Result};

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

/// Maps the wire env-var suffixes (`HOSTNAME`, `PORT`, ...) from spec.md §6
/// onto the [`SessionConfig`] field names figment's `Serialized` provider
/// produced defaults under.
fn translate_env_key(key: &figment::value::UncasedStr) -> figment::value::Uncased<'_> {
    match key.as_str().to_ascii_lowercase().as_str() {
        "hostname" => "host".into(),
        "username" => "user".into(),
        "password" => "pwd".into(),
        other => other.to_string().into(),
    }
}

fn default_port() -> u16 {
    1883
}

fn default_online_timeout() -> u64 {
    60
}

fn default_root_topic() -> String {
    "lummetry".to_string()
}

/// The full recognized option set for connecting and running a Session.
///
/// Every field here is one spec.md §6 calls out; there is no escape hatch
/// for unrecognized options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub name: Option<String>,
    pub host: Option<String>,
    #[serde(default = "default_port")]
    pub port: u16,
    pub user: Option<String>,
    pub pwd: Option<String>,
    pub secured: bool,
    pub cert_path: Option<String>,
    pub encrypt_comms: bool,
    pub filter_workers: Vec<String>,
    #[serde(default = "default_root_topic")]
    pub root_topic: String,
    #[serde(default = "default_online_timeout")]
    pub online_timeout: u64,
    pub auto_configuration: bool,
    pub eth_enabled: bool,
    pub dotenv_path: Option<String>,
    pub local_cache_base_folder: Option<String>,
    pub local_cache_app_folder: Option<String>,
    pub use_home_folder: bool,
    /// Gates ingestion of pipeline configs embedded directly in heartbeats,
    /// an open question in the source protocol (see generic_session.py's
    /// legacy `CONFIG_STREAMS` handling). Off by default: the documented
    /// protocol delivers configs only via net-config replies.
    pub legacy_heartbeat_pipelines: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            name: None,
            host: None,
            port: default_port(),
            user: None,
            pwd: None,
            secured: false,
            cert_path: None,
            encrypt_comms: true,
            filter_workers: Vec::new(),
            root_topic: default_root_topic(),
            online_timeout: default_online_timeout(),
            auto_configuration: false,
            eth_enabled: true,
            dotenv_path: None,
            local_cache_base_folder: None,
            local_cache_app_folder: None,
            use_home_folder: false,
            legacy_heartbeat_pipelines: false,
        }
    }
}

impl SessionConfig {
    /// Loads a config via the closed precedence merge, given an optional
    /// user-config TOML path and an `overrides` value representing explicit
    /// constructor arguments (only the fields the caller actually set should
    /// be `Some`/non-default in practice; callers build this by starting
    /// from [`SessionConfig::default`] and mutating just the fields they
    /// passed).
    ///
    /// Environment variables are read under both the `EE_` and historical
    /// `AIXP_` prefixes; `EE_` wins when both are set, because it is merged
    /// last.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Load`] if the user-config file exists but is
    /// not valid TOML, or if environment values don't deserialize into the
    /// expected types.
    pub fn load(
        user_config_path: Option<&str>,
        overrides: Option<&SessionConfig>,
    ) -> Result<Self> {
        let mut figment = Figment::new().merge(Serialized::defaults(SessionConfig::default()));

        figment = figment
            .merge(Env::prefixed("AIXP_").map(translate_env_key))
            .merge(Env::prefixed("EE_").map(translate_env_key));

        if let Some(path) = user_config_path {
            if std::path::Path::new(path).exists() {
                figment = figment.merge(Toml::file(path));
            } else {
                tracing::debug!(path, "user config file not found, skipping");
            }
        }

        if let Some(overrides) = overrides {
            figment = figment.merge(Serialized::defaults(overrides));
        }

        let config: Self = figment.extract().map_err(|e| ConfigError::Load(Box::new(e)))?;
        Ok(config)
    }

    /// Validates the closed required set at startup, surfacing
    /// `ConfigMissing` the way spec.md §7 requires.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] if `host` could not be resolved from
    /// any layer.
    pub fn require_host(&self) -> Result<&str> {
        self.host.as_deref().ok_or_else(|| ConfigError::Missing("host".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_has_expected_port_and_topic() {
        let cfg = SessionConfig::default();
        assert_eq!(cfg.port, 1883);
        assert_eq!(cfg.root_topic, "lummetry");
    }

    #[test]
    fn constructor_override_wins_over_file_and_env() {
        std::env::set_var("EE_HOSTNAME", "h2");
        let mut file = tempfile::NamedTempFile::new().expect("tmp file");
        writeln!(file, r#"host = "h3""#).expect("write");

        let mut overrides = SessionConfig::default();
        overrides.host = Some("h1".to_string());

        let cfg = SessionConfig::load(Some(file.path().to_str().expect("utf8 path")), Some(&overrides))
            .expect("loads");
        assert_eq!(cfg.host.as_deref(), Some("h1"));
        std::env::remove_var("EE_HOSTNAME");
    }

    #[test]
    fn file_wins_over_env_when_no_override() {
        std::env::set_var("EE_HOSTNAME", "h2");
        let mut file = tempfile::NamedTempFile::new().expect("tmp file");
        writeln!(file, r#"host = "h3""#).expect("write");

        let cfg = SessionConfig::load(Some(file.path().to_str().expect("utf8 path")), None)
            .expect("loads");
        assert_eq!(cfg.host.as_deref(), Some("h3"));
        std::env::remove_var("EE_HOSTNAME");
    }

    #[test]
    fn env_wins_over_default_when_no_file_or_override() {
        std::env::set_var("EE_HOSTNAME", "h2");
        let cfg = SessionConfig::load(None, None).expect("loads");
        assert_eq!(cfg.host.as_deref(), Some("h2"));
        std::env::remove_var("EE_HOSTNAME");
    }

    #[test]
    fn newer_prefix_wins_on_conflict() {
        std::env::set_var("AIXP_HOSTNAME", "old");
        std::env::set_var("EE_HOSTNAME", "new");
        let cfg = SessionConfig::load(None, None).expect("loads");
        assert_eq!(cfg.host.as_deref(), Some("new"));
        std::env::remove_var("AIXP_HOSTNAME");
        std::env::remove_var("EE_HOSTNAME");
    }
}

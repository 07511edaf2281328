//! Application configuration: provider credentials, search tuning and
//! output location, loaded from TOML (or legacy JSON).

use std::path::{Path, PathBuf};

use netspace_search::{SearchConfig, Source, SourceCredentials};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// File name looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "netspace.toml";

/// Environment variables that override the configured key of each source.
pub const ENV_OVERRIDES: [(Source, &str); 3] = [
    (Source::Fofa, "NETSPACE_FOFA_KEY"),
    (Source::Hunter, "NETSPACE_HUNTER_KEY"),
    (Source::Quake, "NETSPACE_QUAKE_KEY"),
];

/// Top-level configuration file.
///
/// ```toml
/// [fofa]
/// key = "..."
/// base_url = "https://fofoapi.com/api/v1"
///
/// [hunter]
/// api_key = "..."
///
/// [quake]
/// api_key = "..."
///
/// [search]
/// search_timeout_seconds = 120
/// probe_timeout_seconds = 30
///
/// [output]
/// directory = "results"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub fofa: SourceCredentials,
    pub hunter: SourceCredentials,
    pub quake: SourceCredentials,
    pub search: SearchSection,
    pub output: OutputSection,
}

/// `[search]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSection {
    pub search_timeout_seconds: u64,
    pub probe_timeout_seconds: u64,
    pub strict_probe: bool,
    pub user_agent: Option<String>,
}

impl Default for SearchSection {
    fn default() -> Self {
        let defaults = SearchConfig::default();
        Self {
            search_timeout_seconds: defaults.search_timeout_seconds,
            probe_timeout_seconds: defaults.probe_timeout_seconds,
            strict_probe: defaults.strict_probe,
            user_agent: defaults.user_agent,
        }
    }
}

/// `[output]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSection {
    /// Directory for interactive-mode exports.
    pub directory: PathBuf,
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("results"),
        }
    }
}

impl AppConfig {
    /// Load configuration from a file.
    ///
    /// A missing or blank file yields the defaults (no credentials). Files
    /// ending in `.json` are parsed as JSON; everything else as TOML.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "config file not found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let config = if is_json {
            serde_json::from_str(&content).map_err(|e| {
                AppError::Config(format!("failed to parse {}: {e}", path.display()))
            })?
        } else {
            toml::from_str(&content).map_err(|e| {
                AppError::Config(format!("failed to parse {}: {e}", path.display()))
            })?
        };
        Ok(config)
    }

    /// Load from `path` if given, else from [`default_config_path`], then
    /// apply environment overrides.
    ///
    /// # Errors
    ///
    /// As [`AppConfig::from_file`].
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => {
                if !p.exists() {
                    tracing::warn!(path = %p.display(), "config file does not exist, using defaults");
                }
                p.to_path_buf()
            }
            None => default_config_path(),
        };
        tracing::debug!(path = %path.display(), "loading configuration");
        let mut config = Self::from_file(&path)?;
        config.apply_env_overrides(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Replace keys with non-blank values returned by `lookup` for the
    /// variables in [`ENV_OVERRIDES`].
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        for (source, var) in ENV_OVERRIDES {
            if let Some(key) = lookup(var).filter(|k| !k.trim().is_empty()) {
                tracing::debug!(%source, var, "credential taken from environment");
                source
                    .pick(&mut self.fofa, &mut self.hunter, &mut self.quake)
                    .api_key = Some(key);
            }
        }
    }

    /// The search core's view of this configuration.
    pub fn search_config(&self) -> SearchConfig {
        SearchConfig {
            fofa: self.fofa.clone(),
            hunter: self.hunter.clone(),
            quake: self.quake.clone(),
            search_timeout_seconds: self.search.search_timeout_seconds,
            probe_timeout_seconds: self.search.probe_timeout_seconds,
            strict_probe: self.search.strict_probe,
            user_agent: self.search.user_agent.clone(),
        }
    }
}

/// `./netspace.toml` if it exists, else `<config dir>/netspace/config.toml`.
pub fn default_config_path() -> PathBuf {
    let local = PathBuf::from(LOCAL_CONFIG_FILE);
    if local.exists() {
        return local;
    }
    dirs::config_dir()
        .map(|dir| dir.join("netspace").join("config.toml"))
        .unwrap_or(local)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &tempfile::TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, content).expect("write config");
        path
    }

    #[test]
    fn toml_file_with_all_sections() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write(
            &dir,
            "netspace.toml",
            r#"
[fofa]
key = "fofa-key"
base_url = "https://fofa.mirror/api/v1"

[hunter]
api_key = "hunter-key"

[search]
probe_timeout_seconds = 5
strict_probe = true

[output]
directory = "out"
"#,
        );
        let config = AppConfig::from_file(&path).expect("load");
        assert_eq!(config.fofa.key(), Some("fofa-key"));
        assert_eq!(config.fofa.base_url.as_deref(), Some("https://fofa.mirror/api/v1"));
        assert_eq!(config.hunter.key(), Some("hunter-key"));
        assert_eq!(config.quake.key(), None);
        assert_eq!(config.search.probe_timeout_seconds, 5);
        assert_eq!(config.search.search_timeout_seconds, 120);
        assert!(config.search.strict_probe);
        assert_eq!(config.output.directory, PathBuf::from("out"));

        let search = config.search_config();
        assert!(search.validate().is_ok());
        assert_eq!(search.base_url(Source::Fofa), "https://fofa.mirror/api/v1");
        assert!(search.strict_probe);
    }

    #[test]
    fn legacy_json_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write(
            &dir,
            "config.json",
            r#"{"fofa": {"key": "k1"}, "hunter": {"api_key": ""}, "quake": {"api_key": "k3"}}"#,
        );
        let config = AppConfig::from_file(&path).expect("load");
        assert_eq!(config.fofa.key(), Some("k1"));
        assert_eq!(config.hunter.key(), None);
        assert_eq!(config.quake.key(), Some("k3"));
        assert_eq!(config.output.directory, PathBuf::from("results"));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = AppConfig::from_file(&dir.path().join("absent.toml")).expect("defaults");
        assert_eq!(config, AppConfig::default());
        assert!(!config.search_config().any_credential());
    }

    #[test]
    fn blank_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write(&dir, "netspace.toml", "  \n");
        assert_eq!(AppConfig::from_file(&path).expect("load"), AppConfig::default());
    }

    #[test]
    fn invalid_toml_is_config_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write(&dir, "bad.toml", "this is not valid toml {{{");
        let err = AppConfig::from_file(&path).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
        assert!(err.to_string().contains("bad.toml"));
    }

    #[test]
    fn env_overrides_replace_keys() {
        let mut config = AppConfig::default();
        config.quake.api_key = Some("from-file".into());
        config.apply_env_overrides(|name| match name {
            "NETSPACE_HUNTER_KEY" => Some("from-env".into()),
            "NETSPACE_QUAKE_KEY" => Some("   ".into()),
            _ => None,
        });
        assert_eq!(config.hunter.key(), Some("from-env"));
        assert_eq!(config.quake.key(), Some("from-file"));
        assert_eq!(config.fofa.key(), None);
    }

    #[test]
    fn zero_timeout_fails_validation() {
        let mut config = AppConfig::default();
        config.search.search_timeout_seconds = 0;
        assert!(config.search_config().validate().is_err());
    }
}

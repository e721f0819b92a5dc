use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use stackup_utils::error::ConfigError;

use crate::env_file::parse_env_file;
use crate::keys::{REQUIRED_KEYS, optional_default};

/// Immutable run configuration.
///
/// Loaded once at start. Phases receive it as environment variables on
/// their own process; the orchestrator's environment is left untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    values: BTreeMap<String, String>,
    source: PathBuf,
}

impl Config {
    /// Load and validate the environment file at `path` against [`REQUIRED_KEYS`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let config = Self::load_unvalidated(path)?;
        config.validate_required(REQUIRED_KEYS)?;
        tracing::debug!(
            path = %config.source.display(),
            keys = config.values.len(),
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Parse the file without checking required keys.
    pub fn load_unvalidated(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(ConfigError::ConfigurationMissing {
                path: path.to_path_buf(),
            });
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(Self {
            values: parse_env_file(&content, path)?,
            source: path.to_path_buf(),
        })
    }

    /// Build a configuration from in-memory pairs.
    pub fn from_pairs<I, K, V>(pairs: I, source: impl Into<PathBuf>) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            source: source.into(),
        }
    }

    /// Fail on the first key in `required` that is absent or blank.
    pub fn validate_required(&self, required: &[&str]) -> Result<(), ConfigError> {
        for key in required {
            let present = self
                .values
                .get(*key)
                .is_some_and(|value| !value.trim().is_empty());
            if !present {
                return Err(ConfigError::RequiredVariableMissing {
                    key: (*key).to_string(),
                    path: self.source.clone(),
                });
            }
        }
        Ok(())
    }

    /// Value of `key`, treating an empty string as unset.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// Value of `key`, falling back to its documented optional default.
    #[must_use]
    pub fn get_or_default(&self, key: &str) -> Option<&str> {
        self.get(key).or_else(|| optional_default(key))
    }

    /// Whether `key` was set explicitly.
    #[must_use]
    pub fn is_set(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Path the configuration was loaded from.
    #[must_use]
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Entries in key order, for handing to a child process environment.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use tempfile::TempDir;

    const COMPLETE: &str = "\
DOMAIN=example.com
LETSENCRYPT_EMAIL=ops@example.com
OPENAI_API_KEY=sk-test
DEEPGRAM_API_KEY=dg-test
";

    fn write_env(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join(".env");
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_load_complete_file() -> Result<()> {
        let dir = TempDir::new()?;
        let path = write_env(&dir, COMPLETE);
        let config = Config::load(&path)?;
        assert_eq!(config.get("DOMAIN"), Some("example.com"));
        assert_eq!(config.source(), path.as_path());
        assert_eq!(config.len(), 4);
        Ok(())
    }

    #[test]
    fn test_missing_file_names_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".env");
        let err = Config::load(&path).unwrap_err();
        match err {
            ConfigError::ConfigurationMissing { path: reported } => assert_eq!(reported, path),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_directory_is_not_a_config_file() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            Config::load(dir.path()),
            Err(ConfigError::ConfigurationMissing { .. })
        ));
    }

    #[test]
    fn test_missing_required_key_is_named() {
        let dir = TempDir::new().unwrap();
        let path = write_env(&dir, &COMPLETE.replace("DOMAIN=example.com\n", ""));
        let err = Config::load(&path).unwrap_err();
        match err {
            ConfigError::RequiredVariableMissing { key, path: reported } => {
                assert_eq!(key, "DOMAIN");
                assert_eq!(reported, path);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_blank_required_key_counts_as_missing() {
        let dir = TempDir::new().unwrap();
        let path = write_env(
            &dir,
            &COMPLETE.replace("OPENAI_API_KEY=sk-test", "OPENAI_API_KEY=   "),
        );
        let err = Config::load(&path).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::RequiredVariableMissing { ref key, .. } if key == "OPENAI_API_KEY"
        ));
    }

    #[test]
    fn test_optional_defaults_only_for_display() {
        let config = Config::from_pairs([("DOMAIN", "example.com"), ("TURN_PASSWORD", "")], ".env");
        assert_eq!(config.get("KEYCLOAK_ADMIN_PASSWORD"), None);
        assert_eq!(config.get_or_default("KEYCLOAK_ADMIN_PASSWORD"), Some("admin"));
        // Empty counts as unset, so the default shows through
        assert_eq!(config.get_or_default("TURN_PASSWORD"), Some("turnpass"));
        assert!(!config.is_set("TURN_PASSWORD"));
        // Defaults never leak into the phase environment
        assert!(config.iter().all(|(k, _)| k != "KEYCLOAK_ADMIN_PASSWORD"));
    }

    #[test]
    fn test_load_does_not_touch_process_environment() -> Result<()> {
        let dir = TempDir::new()?;
        let path = write_env(&dir, &format!("{COMPLETE}STACKUP_CONFIG_PROBE_KEY=1\n"));
        let _config = Config::load(&path)?;
        assert!(std::env::var_os("STACKUP_CONFIG_PROBE_KEY").is_none());
        Ok(())
    }
}

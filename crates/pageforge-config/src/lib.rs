use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Where the JSON document file lives.
    pub document_path: PathBuf,
    /// Default directory for HTML exports. Falls back to the document's
    /// directory when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export_dir: Option<PathBuf>,
}

impl Config {
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let mut config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        // Expand shell variables and tilde in the loaded paths
        config.document_path =
            Self::expand_path(&config.document_path).unwrap_or(config.document_path);
        config.export_dir = config
            .export_dir
            .map(|dir| Self::expand_path(&dir).unwrap_or(dir));

        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        self.save_to_path(&config_path)
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/pageforge");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    fn expand_path(path: &Path) -> Option<PathBuf> {
        let path_str = path.to_string_lossy();
        match shellexpand::full(&path_str) {
            Ok(expanded) => Some(PathBuf::from(expanded.as_ref())),
            Err(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use tempfile::TempDir;

    #[test]
    fn config_path_is_expanded() {
        let config_path = Config::config_path();
        let path_str = config_path.to_string_lossy();

        assert!(!path_str.starts_with('~'));
        assert!(path_str.ends_with(".config/pageforge/config.toml"));
    }

    #[test]
    fn config_serialization_roundtrip() {
        let original = Config {
            document_path: PathBuf::from("/tmp/pages.json"),
            export_dir: Some(PathBuf::from("/tmp/exports")),
        };

        let toml_str = toml::to_string(&original).unwrap();
        let deserialized: Config = toml::from_str(&toml_str).unwrap();

        assert_eq!(original, deserialized);
    }

    #[test]
    fn export_dir_is_optional() {
        let config: Config = toml::from_str("document_path = \"/tmp/pages.json\"").unwrap();
        assert_eq!(config.export_dir, None);
    }

    #[test]
    fn expand_path_with_tilde() {
        let expanded = Config::expand_path(&PathBuf::from("~/pages/doc.json")).unwrap();
        assert!(!expanded.to_string_lossy().starts_with('~'));
        assert!(expanded.to_string_lossy().contains("pages/doc.json"));
    }

    #[test]
    fn expand_path_with_env_var() {
        unsafe {
            env::set_var("PAGEFORGE_TEST_VAR", "/test/env/path");
        }

        let expanded = Config::expand_path(&PathBuf::from("$PAGEFORGE_TEST_VAR/doc.json")).unwrap();
        assert_eq!(expanded, PathBuf::from("/test/env/path/doc.json"));

        unsafe {
            env::remove_var("PAGEFORGE_TEST_VAR");
        }
    }

    #[test]
    fn missing_config_file_loads_as_none() {
        let dir = TempDir::new().unwrap();
        let loaded = Config::load_from_path(dir.path().join("config.toml")).unwrap();
        assert_eq!(loaded, None);
    }

    #[test]
    fn config_survives_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        let config = Config {
            document_path: PathBuf::from("/data/pages.json"),
            export_dir: None,
        };

        config.save_to_path(&path).unwrap();
        let loaded = Config::load_from_path(&path).unwrap().unwrap();

        assert_eq!(loaded, config);
    }
}

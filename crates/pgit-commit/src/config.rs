//! Repository configuration, stored as TOML.
//!
//! ```toml
//! [core]
//! hash_algorithm = "sha1"
//! default_branch = "main"
//!
//! [user]
//! name = "Ada Lovelace"
//! email = "ada@example.com"
//!
//! [commit]
//! allow_empty = false
//! ```
//!
//! Every section and key is optional; missing values take their defaults.

use std::fs;
use std::path::{Path, PathBuf};

use pgit_types::HashAlgorithm;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from reading or writing configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("failed to write config file '{path}': {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to serialize config: {0}")]
    SerializeError(String),
}

/// Top-level repository configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepoConfig {
    pub core: CoreConfig,
    pub user: UserConfig,
    pub commit: CommitConfig,
}

/// Storage settings fixed when the repository is created.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// Digest algorithm for object ids.
    pub hash_algorithm: HashAlgorithm,
    /// Branch HEAD points at after init.
    pub default_branch: String,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            hash_algorithm: HashAlgorithm::Sha1,
            default_branch: "main".into(),
        }
    }
}

/// Default committer identity.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Defaults applied to new commit requests.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommitConfig {
    /// Record commits whose tree equals their parent's.
    pub allow_empty: bool,
}

impl RepoConfig {
    /// Default configuration with the `[user]` identity filled in.
    pub fn with_user(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            user: UserConfig {
                name: Some(name.into()),
                email: Some(email.into()),
            },
            ..Default::default()
        }
    }

    /// Default configuration using `algorithm` for object ids.
    pub fn with_algorithm(algorithm: HashAlgorithm) -> Self {
        Self {
            core: CoreConfig {
                hash_algorithm: algorithm,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Parse from TOML text. `path` only labels errors.
    pub fn from_toml_str(contents: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Read and parse a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_toml_str(&contents, path)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::SerializeError(e.to_string()))
    }

    /// Write the config to `path`, replacing any existing file.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let contents = self.to_toml_string()?;
        fs::write(path, contents).map_err(|e| ConfigError::WriteError {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config = RepoConfig::from_toml_str("", Path::new("config.toml")).unwrap();
        assert_eq!(config, RepoConfig::default());
        assert_eq!(config.core.default_branch, "main");
        assert_eq!(config.core.hash_algorithm, HashAlgorithm::Sha1);
        assert!(!config.commit.allow_empty);
    }

    #[test]
    fn parses_all_sections() {
        let text = r#"
            [core]
            hash_algorithm = "blake3"
            default_branch = "trunk"

            [user]
            name = "Ada"
            email = "ada@example.com"

            [commit]
            allow_empty = true
        "#;
        let config = RepoConfig::from_toml_str(text, Path::new("config.toml")).unwrap();
        assert_eq!(config.core.hash_algorithm, HashAlgorithm::Blake3);
        assert_eq!(config.core.default_branch, "trunk");
        assert_eq!(config.user.name.as_deref(), Some("Ada"));
        assert_eq!(config.user.email.as_deref(), Some("ada@example.com"));
        assert!(config.commit.allow_empty);
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let text = "[core]\nhash_algorithm = \"sha256\"\n";
        let config = RepoConfig::from_toml_str(text, Path::new("config.toml")).unwrap();
        assert_eq!(config.core.hash_algorithm, HashAlgorithm::Sha256);
        assert_eq!(config.core.default_branch, "main");
    }

    #[test]
    fn unknown_algorithm_is_parse_error() {
        let text = "[core]\nhash_algorithm = \"md5\"\n";
        let err = RepoConfig::from_toml_str(text, Path::new("bad.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
        assert!(err.to_string().contains("bad.toml"));
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut config = RepoConfig::with_user("Ada", "ada@example.com");
        config.commit.allow_empty = true;

        config.save(&path).unwrap();
        assert_eq!(RepoConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = RepoConfig::load(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::ReadError { .. }));
    }

    #[test]
    fn unset_user_is_not_serialized() {
        let text = RepoConfig::default().to_toml_string().unwrap();
        assert!(!text.contains("name"));
        assert!(text.contains("default_branch"));
    }
}

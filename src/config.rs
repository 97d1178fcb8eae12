//! Runtime configuration read from the environment.
//!
//! The binary loads a `.env` file (if any) with `dotenvy` before calling
//! [`Config::from_env`], so every setting can live in either place.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow, bail};

use crate::Database;
use crate::llm::{GeminiClientBuilder, LlmClient, OllamaClientBuilder};

/// Which language-generation provider to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Gemini,
    Ollama,
}

impl FromStr for Provider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "gemini" => Ok(Self::Gemini),
            "ollama" => Ok(Self::Ollama),
            other => bail!("Unknown provider '{other}' (expected 'gemini' or 'ollama')"),
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gemini => write!(f, "gemini"),
            Self::Ollama => write!(f, "ollama"),
        }
    }
}

/// Settings needed to assemble a [`crate::Notebook`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// SQLite file holding users and notes.
    pub database_path: PathBuf,
    pub provider: Provider,
}

impl Config {
    /// Reads configuration from process environment variables.
    ///
    /// - `NOTELY_DB`: database path, default `{data_dir}/notely/notes.db`
    /// - `NOTELY_PROVIDER`: `gemini` or `ollama`; defaults to `gemini` when
    ///   `GEMINI_API_KEY` is set and `ollama` otherwise
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Config::from_env`] but with an injectable variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let database_path = match lookup("NOTELY_DB").filter(|p| !p.trim().is_empty()) {
            Some(path) => PathBuf::from(path),
            None => default_database_path()?,
        };

        let provider = match lookup("NOTELY_PROVIDER").filter(|p| !p.trim().is_empty()) {
            Some(name) => name.parse::<Provider>()?,
            None if lookup("GEMINI_API_KEY").is_some_and(|k| !k.trim().is_empty()) => {
                Provider::Gemini
            }
            None => Provider::Ollama,
        };

        Ok(Self {
            database_path,
            provider,
        })
    }

    /// Builds the configured provider client.
    ///
    /// Provider-specific settings (`GEMINI_API_KEY`, `GEMINI_MODEL`,
    /// `OLLAMA_HOST`, `OLLAMA_MODEL`) are read by the client builders.
    pub fn build_client(&self) -> Result<Arc<dyn LlmClient>> {
        let client: Arc<dyn LlmClient> = match self.provider {
            Provider::Gemini => Arc::new(
                GeminiClientBuilder::new()
                    .build()
                    .context("Failed to create Gemini client")?,
            ),
            Provider::Ollama => Arc::new(
                OllamaClientBuilder::new()
                    .build()
                    .context("Failed to create Ollama client")?,
            ),
        };
        Ok(client)
    }

    /// Opens the database, creating its parent directory if needed.
    pub fn open_database(&self) -> Result<Database> {
        ensure_database_directory(&self.database_path)?;
        Database::open(&self.database_path).with_context(|| {
            format!(
                "Failed to open database: {}",
                self.database_path.display()
            )
        })
    }
}

/// Gets the cross-platform database path.
///
/// Returns the path as `{data_dir}/notely/notes.db` where `data_dir` is:
/// - Linux: `~/.local/share`
/// - macOS: `~/Library/Application Support`
/// - Windows: `C:\Users\<user>\AppData\Roaming`
pub fn default_database_path() -> Result<PathBuf> {
    let data_dir = dirs::data_dir().ok_or_else(|| anyhow!("Failed to determine data directory"))?;

    Ok(data_dir.join("notely").join("notes.db"))
}

/// Ensures the parent directory of the database file exists.
pub fn ensure_database_directory(db_path: &Path) -> Result<()> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent).with_context(|| {
            format!("Failed to create database directory: {}", parent.display())
        })?;
    }
    Ok(())
}

/// Username used when none is given on the command line or in `NOTELY_USER`.
///
/// Falls back to the login name from `USER`/`USERNAME`, then `"default"`.
pub fn default_username() -> String {
    ["USER", "USERNAME"]
        .iter()
        .filter_map(|key| std::env::var(key).ok())
        .find(|name| !name.trim().is_empty())
        .unwrap_or_else(|| "default".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let mut map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        map.entry("NOTELY_DB".to_string())
            .or_insert_with(|| "/tmp/notely-test.db".to_string());
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn provider_parses_case_insensitively() {
        assert_eq!("Gemini".parse::<Provider>().unwrap(), Provider::Gemini);
        assert_eq!(" ollama ".parse::<Provider>().unwrap(), Provider::Ollama);
        assert_eq!(Provider::Gemini.to_string(), "gemini");
    }

    #[test]
    fn unknown_provider_is_an_error() {
        let err = Config::from_lookup(lookup(&[("NOTELY_PROVIDER", "openai")])).unwrap_err();
        assert!(err.to_string().contains("Unknown provider 'openai'"));
    }

    #[test]
    fn provider_defaults_to_gemini_when_key_present() {
        let config = Config::from_lookup(lookup(&[("GEMINI_API_KEY", "k")])).unwrap();
        assert_eq!(config.provider, Provider::Gemini);
    }

    #[test]
    fn provider_defaults_to_ollama_without_key() {
        let config = Config::from_lookup(lookup(&[("GEMINI_API_KEY", " ")])).unwrap();
        assert_eq!(config.provider, Provider::Ollama);
    }

    #[test]
    fn explicit_provider_overrides_key_detection() {
        let config = Config::from_lookup(lookup(&[
            ("GEMINI_API_KEY", "k"),
            ("NOTELY_PROVIDER", "ollama"),
        ]))
        .unwrap();
        assert_eq!(config.provider, Provider::Ollama);
    }

    #[test]
    fn database_path_comes_from_notely_db() {
        let config = Config::from_lookup(lookup(&[("NOTELY_DB", "/tmp/custom.db")])).unwrap();
        assert_eq!(config.database_path, PathBuf::from("/tmp/custom.db"));
    }

    #[test]
    fn default_database_path_ends_with_notes_db() {
        let path = default_database_path().unwrap();
        assert!(path.ends_with("notely/notes.db"));
    }

    #[test]
    fn open_database_creates_missing_directories() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            database_path: dir.path().join("nested").join("deeper").join("notes.db"),
            provider: Provider::Ollama,
        };

        assert!(config.open_database().is_ok());
        assert!(config.database_path.exists());
    }
}

use crate::errors::CliError;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

pub const DEFAULT_SERVER: &str = "https://steuerllm.i5.ai.fau.de/benchmark";
pub const DEFAULT_SUBMISSION_KEY: &str = "GerTaxLaw2025";
pub const DEFAULT_QUESTIONS_FILE: &str = "benchmark-questions.json";
pub const DEFAULT_PREDICTIONS_FILE: &str = "predictions.json";
pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
pub const DEFAULT_API_MODEL: &str = "gpt-4o";

/// Environment variable that overrides where the config file is read from.
pub const CONFIG_PATH_ENV: &str = "GERTAXLAW_CONFIG";

/// Settings for `generate`, the `[generator]` table of the config file.
#[derive(Default, Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct GeneratorConfig {
    pub provider: Option<String>,
    pub api_base: Option<String>,
    pub api_model: Option<String>,
    pub concurrency: Option<usize>,
}

// Any change here must be coordinated with the README section on `cli.toml`
#[derive(Default, Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RawConfig {
    server: Option<String>,
    key: Option<String>,
    model: Option<String>,
    questions: Option<PathBuf>,
    #[serde(default)]
    generator: GeneratorConfig,
}

/// Values from the config file, consulted after command line flags and
/// environment variables and before the built-in defaults.
#[derive(Debug, Clone, Default)]
pub struct Config {
    home: RawConfig,
    path: Option<PathBuf>,
}

pub fn default_config_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os(CONFIG_PATH_ENV) {
        return Some(PathBuf::from(path));
    }
    dirs::config_dir().map(|dir| dir.join("gertaxlaw").join("cli.toml"))
}

impl Config {
    /// Load the user's config file. A missing file is not an error.
    pub fn load() -> anyhow::Result<Self> {
        match default_config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let text = match fs_err::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(e).context("failed to read config file"),
        };
        let home = Self::parse(path, &text)?;
        Ok(Self {
            home,
            path: Some(path.to_path_buf()),
        })
    }

    fn parse(path: &Path, text: &str) -> Result<RawConfig, CliError> {
        let home: RawConfig = toml::from_str(text).map_err(|source| CliError::Config {
            path: path.to_path_buf(),
            source,
        })?;
        if home.generator.concurrency == Some(0) {
            return Err(CliError::ConfigValue {
                key: "generator.concurrency",
                expected: "at least 1",
                found: "0".to_string(),
            });
        }
        Ok(home)
    }

    /// The file this config was read from, if one existed.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// The benchmark server base URL, without a trailing slash.
    pub fn server_url(&self, server: Option<&str>) -> String {
        server
            .or(self.home.server.as_deref())
            .unwrap_or(DEFAULT_SERVER)
            .trim_end_matches('/')
            .to_string()
    }

    pub fn submission_key(&self, key: Option<&str>) -> String {
        key.or(self.home.key.as_deref())
            .unwrap_or(DEFAULT_SUBMISSION_KEY)
            .to_string()
    }

    pub fn model_name(&self, model: Option<&str>) -> Result<String, CliError> {
        model
            .or(self.home.model.as_deref())
            .map(str::to_string)
            .ok_or(CliError::MissingModelName)
    }

    pub fn questions_path(&self, questions: Option<&Path>) -> PathBuf {
        questions
            .or(self.home.questions.as_deref())
            .unwrap_or(Path::new(DEFAULT_QUESTIONS_FILE))
            .to_path_buf()
    }

    pub fn generator(&self) -> &GeneratorConfig {
        &self.home.generator
    }
}

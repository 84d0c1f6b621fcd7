use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Config error: could not parse `{}`", .path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("Config error: the option `{key}` must be {expected}, found `{found}`")]
    ConfigValue {
        key: &'static str,
        expected: &'static str,
        found: String,
    },
    #[error("A model name is required. Pass `--model <NAME>` or set `model` in {}", config_path_hint())]
    MissingModelName,
}

fn config_path_hint() -> String {
    crate::config::default_config_path()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "the config file".to_string())
}

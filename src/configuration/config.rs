#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

use std::env;
use std::io;
use std::path;

use anyhow::bail;
use anyhow::Result;
use clap::Arg;
use clap::ArgMatches;
use clap::Command;
use dashmap::DashMap;
use once_cell::sync::Lazy;
use strum::EnumIter;
use strum::EnumVariantNames;
use strum::IntoEnumIterator;
use tokio::fs;

use crate::domain::models::BackendName;

static CONFIG: Lazy<DashMap<String, String>> = Lazy::new(DashMap::new);

#[derive(Clone, Copy, Debug, Eq, PartialEq, EnumIter, EnumVariantNames, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum ConfigKey {
    ApiURL,
    Backend,
    BackendHealthCheckTimeout,
    ConfigFile,
    SelectionMinLength,
    StateFile,
    Username,
}

/// Keys that must hold a non-negative integer once every layer is applied.
const INTEGER_KEYS: [ConfigKey; 2] = [
    ConfigKey::BackendHealthCheckTimeout,
    ConfigKey::SelectionMinLength,
];

fn app_dir() -> path::PathBuf {
    return dirs::cache_dir()
        .unwrap_or_else(env::temp_dir)
        .join("bookchat");
}

fn find_arg(cmd: &Command, key: ConfigKey) -> Option<&Arg> {
    let long = key.to_string();
    return cmd
        .get_arguments()
        .find(|e| return e.get_long() == Some(long.as_str()));
}

/// Values clap accepts for a key, empty when the key is free-form.
fn possible_values(cmd: &Command, key: ConfigKey) -> Vec<String> {
    return match find_arg(cmd, key) {
        Some(arg) => arg
            .get_possible_values()
            .iter()
            .map(|e| return e.get_name().to_string())
            .collect(),
        None => vec![],
    };
}

/// Last non-empty value given for a key on the command line or through its
/// environment variable. Later matches win, so subcommand args override
/// global ones.
fn arg_value(clap_arg_matches: &[&ArgMatches], key: ConfigKey) -> Option<String> {
    return clap_arg_matches
        .iter()
        .filter_map(|matches| {
            return matches
                .try_get_one::<String>(&key.to_string())
                .ok()
                .flatten();
        })
        .filter(|e| return !e.is_empty())
        .last()
        .cloned();
}

async fn read_config_file(config_path: &path::Path) -> Result<Option<toml_edit::Document>> {
    let toml_str = match fs::read_to_string(config_path).await {
        Ok(toml_str) => toml_str,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            return Ok(None);
        }
        Err(err) => {
            return Err(err.into());
        }
    };

    return Ok(Some(toml_str.parse::<toml_edit::Document>()?));
}

/// Applies one `config.toml` entry, checking it against the values the CLI
/// would accept for the same key.
fn apply_file_value(cmd: &Command, key: ConfigKey, item: &toml_edit::Item) -> Result<()> {
    if let Some(val_int) = item.as_integer() {
        Config::set(key, &val_int.to_string());
        return Ok(());
    }

    let val_str = match item.as_str() {
        Some(val_str) if !val_str.is_empty() => val_str,
        _ => return Ok(()),
    };

    let allowed = possible_values(cmd, key);
    if !allowed.is_empty() && !allowed.iter().any(|e| return e == val_str) {
        bail!(
            "config.toml has an invalid value for key '{key}': {val_str}\nPossible values are: {}",
            allowed.join(", ")
        );
    }

    Config::set(key, val_str);
    return Ok(());
}

/// `# help text [possible values: ...]` line for the generated config file.
fn describe(cmd: &Command, key: ConfigKey) -> Option<String> {
    let arg = find_arg(cmd, key)?;
    let help = arg.get_help().map(|e| return e.to_string()).unwrap_or_default();
    let mut description = help
        .split("[default:")
        .next()
        .unwrap_or_default()
        .trim()
        .to_string();

    let allowed = possible_values(cmd, key);
    if !allowed.is_empty() {
        description = format!("{description} [possible values: {}]", allowed.join(", "));
    }

    return Some(format!("# {description}"));
}

fn default_entry(key: ConfigKey) -> String {
    let val = Config::default(key);
    if val.is_empty() {
        return format!("# {key} = \"\"");
    }
    if val.parse::<i64>().is_ok() {
        return format!("{key} = {val}");
    }

    return format!("{key} = \"{val}\"");
}

pub struct Config {}

impl Config {
    pub fn get(key: ConfigKey) -> String {
        return CONFIG
            .get(&key.to_string())
            .map(|e| return e.value().to_string())
            .unwrap_or_default();
    }

    pub fn set(key: ConfigKey, value: &str) {
        CONFIG.insert(key.to_string(), value.to_string());
    }

    /// Reads a key that must hold a non-negative integer.
    pub fn get_usize(key: ConfigKey) -> Result<usize> {
        let val = Config::get(key);
        if let Ok(res) = val.trim().parse::<usize>() {
            return Ok(res);
        }

        bail!("Config key '{key}' must be a positive number, got '{val}'");
    }

    pub fn default(key: ConfigKey) -> String {
        return match key {
            ConfigKey::ApiURL => "http://localhost:8000".to_string(),
            ConfigKey::Backend => BackendName::Flat.to_string(),
            ConfigKey::BackendHealthCheckTimeout => "1000".to_string(),
            ConfigKey::ConfigFile => app_dir().join("config.toml").to_string_lossy().to_string(),
            ConfigKey::SelectionMinLength => "10".to_string(),
            ConfigKey::StateFile => app_dir().join("state.yaml").to_string_lossy().to_string(),
            ConfigKey::Username => env::var("USER")
                .ok()
                .filter(|e| return !e.is_empty())
                .unwrap_or_else(|| return "User".to_string()),
        };
    }

    /// Layers defaults, then `config.toml`, then CLI args and env vars.
    pub async fn load(cmd: Command, clap_arg_matches: Vec<&ArgMatches>) -> Result<()> {
        for key in ConfigKey::iter() {
            Config::set(key, &Config::default(key));
        }

        let config_file = arg_value(&clap_arg_matches, ConfigKey::ConfigFile)
            .unwrap_or_else(|| return Config::default(ConfigKey::ConfigFile));
        if let Some(doc) = read_config_file(&path::PathBuf::from(&config_file)).await? {
            tracing::debug!(config_file = config_file.as_str(), "Read config file");
            for key in ConfigKey::iter() {
                if let Some(item) = doc.get(&key.to_string()) {
                    apply_file_value(&cmd, key, item)?;
                }
            }
        }

        for key in ConfigKey::iter() {
            if let Some(val) = arg_value(&clap_arg_matches, key) {
                Config::set(key, &val);
            }
        }

        for key in INTEGER_KEYS {
            Config::get_usize(key)?;
        }

        tracing::debug!(
            username = Config::get(ConfigKey::Username),
            api_url = Config::get(ConfigKey::ApiURL),
            backend = Config::get(ConfigKey::Backend),
            state_file = Config::get(ConfigKey::StateFile),
            selection_min_length = Config::get(ConfigKey::SelectionMinLength),
            "config"
        );

        return Ok(());
    }

    /// Commented `config.toml` holding every default, for `config default`.
    pub fn serialize_default(cmd: Command) -> String {
        let mut entries = vec![];
        for key in ConfigKey::iter() {
            match key {
                ConfigKey::ConfigFile => continue,
                ConfigKey::Username => entries.push(
                    "# Your user name displayed next to your questions.\n# username = \"\""
                        .to_string(),
                ),
                _ => {
                    if let Some(description) = describe(&cmd, key) {
                        entries.push(format!("{description}\n{}", default_entry(key)));
                    }
                }
            }
        }

        return entries.join("\n\n");
    }
}

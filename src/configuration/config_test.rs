use anyhow::Result;

use super::apply_file_value;
use super::arg_value;
use super::possible_values;
use super::Config;
use super::ConfigKey;
use crate::application::cli;

#[test]
fn it_serializes_to_valid_toml() {
    let res = Config::serialize_default(cli::build());
    let doc = res.parse::<toml_edit::Document>();
    assert!(doc.is_ok());

    let doc = doc.unwrap();
    assert_eq!(doc["api-url"].as_str(), Some("http://localhost:8000"));
    assert_eq!(doc["backend"].as_str(), Some("flat"));
    assert_eq!(doc["backend-health-check-timeout"].as_integer(), Some(1000));
    assert_eq!(doc["selection-min-length"].as_integer(), Some(10));
    assert!(doc.get("config-file").is_none());
    assert!(doc.get("username").is_none());
}

#[test]
fn it_documents_possible_values() {
    let res = Config::serialize_default(cli::build());
    assert!(res.contains("[possible values: flat, sessions]"));
    assert!(res.contains("# username = \"\""));
}

#[test]
fn it_has_defaults_for_every_required_key() {
    assert_eq!(Config::default(ConfigKey::ApiURL), "http://localhost:8000");
    assert_eq!(Config::default(ConfigKey::Backend), "flat");
    assert!(Config::default(ConfigKey::StateFile).ends_with("state.yaml"));
    assert!(Config::default(ConfigKey::ConfigFile).ends_with("config.toml"));
    assert!(!Config::default(ConfigKey::Username).is_empty());
}

#[tokio::test]
async fn it_loads_config_from_file() -> Result<()> {
    let matches =
        cli::build().try_get_matches_from(vec!["bookchat", "-c", "./config.example.toml"])?;
    Config::load(cli::build(), vec![&matches]).await?;
    return Ok(());
}

#[tokio::test]
async fn it_fails_to_loads_config_from_file() -> Result<()> {
    let matches =
        cli::build().try_get_matches_from(vec!["bookchat", "-c", "./test/bad-config.toml"])?;
    let res = Config::load(cli::build(), vec![&matches]).await;
    assert!(res.is_err());
    return Ok(());
}

#[test]
fn it_reads_possible_values_from_the_cli() {
    let cmd = cli::build();
    assert_eq!(
        possible_values(&cmd, ConfigKey::Backend),
        vec!["flat".to_string(), "sessions".to_string()]
    );
    assert!(possible_values(&cmd, ConfigKey::ApiURL).is_empty());
}

#[test]
fn it_prefers_the_last_given_arg_value() -> Result<()> {
    let first = cli::build().try_get_matches_from(vec![
        "bookchat",
        "--selection-min-length",
        "5",
    ])?;
    let second = cli::build().try_get_matches_from(vec![
        "bookchat",
        "--selection-min-length",
        "20",
    ])?;
    let without = cli::build().try_get_matches_from(vec!["bookchat"])?;

    assert_eq!(
        arg_value(&[&first, &second, &without], ConfigKey::SelectionMinLength),
        Some("20".to_string())
    );
    assert_eq!(arg_value(&[&without], ConfigKey::SelectionMinLength), None);

    return Ok(());
}

#[test]
fn it_rejects_file_values_the_cli_would_reject() -> Result<()> {
    let doc = "backend = \"websocket\"".parse::<toml_edit::Document>()?;
    let res = apply_file_value(&cli::build(), ConfigKey::Backend, &doc["backend"]);

    let err = res.unwrap_err().to_string();
    assert!(err.contains("invalid value for key 'backend': websocket"));
    assert!(err.contains("Possible values are: flat, sessions"));

    return Ok(());
}

#[tokio::test]
async fn it_loads_defaults_without_a_config_file() -> Result<()> {
    let matches = cli::build().try_get_matches_from(vec![
        "bookchat",
        "-c",
        "./test/does-not-exist.toml",
    ])?;
    Config::load(cli::build(), vec![&matches]).await?;
    return Ok(());
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;

use std::env;
use std::io;
use std::path;

use anyhow::bail;
use anyhow::Result;
use clap::builder::PossibleValuesParser;
use clap::value_parser;
use clap::Arg;
use clap::ArgAction;
use clap::ArgMatches;
use clap::Command;
use clap_complete::generate;
use clap_complete::Generator;
use clap_complete::Shell;
use owo_colors::OwoColorize;
use owo_colors::Stream;
use strum::VariantNames;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use super::chat::help_text;
use super::render;
use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::Anchor;
use crate::domain::models::BackendName;
use crate::domain::models::KeyValueStore;
use crate::domain::models::Selection;
use crate::domain::models::SelectionEvent;
use crate::domain::models::SESSION_ID_KEY;
use crate::domain::services::AppState;
use crate::domain::services::SessionManager;
use crate::infrastructure::backends::BackendManager;
use crate::infrastructure::storage::file::FileStore;

fn print_completions<G: Generator>(gen: G, cmd: &mut Command) {
    generate(gen, cmd, cmd.get_name().to_string(), &mut io::stdout());
    std::process::exit(0);
}

/// Directory the debug log is written to when `RUST_LOG` includes bookchat.
pub fn log_dir() -> path::PathBuf {
    if let Ok(dir) = env::var("BOOKCHAT_LOG_DIR") {
        return path::PathBuf::from(dir);
    }

    return dirs::cache_dir()
        .unwrap_or_else(env::temp_dir)
        .join("bookchat");
}

async fn create_config_file() -> Result<()> {
    let config_file_path_str = Config::default(ConfigKey::ConfigFile);
    let config_file_path = path::PathBuf::from(&config_file_path_str);
    if config_file_path.exists() {
        bail!(format!(
            "Config file already exists at {config_file_path_str}"
        ));
    }

    if let Some(parent) = config_file_path.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent).await?;
        }
    }

    let mut file = fs::File::create(&config_file_path).await?;
    file.write_all(Config::serialize_default(build()).as_bytes())
        .await?;

    println!("Created default config file at {config_file_path_str}");
    return Ok(());
}

async fn ask(question: &str, selected_text: Option<&String>) -> Result<()> {
    let backend = BackendManager::from_config()?;
    let mut app_state = AppState::new(
        Box::<FileStore>::default(),
        Config::get_usize(ConfigKey::SelectionMinLength)?,
    );
    app_state.sessions.restore().await?;

    if let Some(text) = selected_text {
        let event = SelectionEvent::Changed(Selection {
            text: text.to_string(),
            anchor: Anchor::default(),
        });
        if !app_state.observe_selection(&event) {
            render::print_warning("Selection is too short to ask about, sending the question alone.");
        }
    }

    app_state.send(backend.as_ref(), question).await;
    if let Some(message) = app_state.sessions.messages().last() {
        render::print_message(message);
    }

    return Ok(());
}

async fn sessions_show() -> Result<()> {
    match FileStore::default().get(SESSION_ID_KEY).await? {
        Some(session_id) => println!("{session_id}"),
        None => println!("There is no stored session. One starts with your first question."),
    }

    return Ok(());
}

async fn sessions_history() -> Result<()> {
    let backend = BackendManager::from_config()?;
    let session_id = match SessionManager::new(Box::<FileStore>::default())
        .restore()
        .await?
    {
        Some(session_id) => session_id,
        None => {
            println!("There is no stored session. One starts with your first question.");
            return Ok(());
        }
    };

    let messages = backend.history(&session_id).await?;
    if messages.is_empty() {
        println!("Session {session_id} has no messages yet.");
    }
    for message in messages.iter() {
        render::print_message(message);
    }

    return Ok(());
}

async fn sessions_reset() -> Result<()> {
    let store = FileStore::default();
    match store.get(SESSION_ID_KEY).await? {
        Some(session_id) => {
            store.clear(SESSION_ID_KEY).await?;
            println!("Forgot session {session_id}. The next question starts a new one.");
        }
        None => println!("There is no stored session to reset."),
    }

    return Ok(());
}

async fn sessions_clear_history() -> Result<()> {
    let backend = BackendManager::from_config()?;
    let session_id = match SessionManager::new(Box::<FileStore>::default())
        .restore()
        .await?
    {
        Some(session_id) => session_id,
        None => {
            println!("There is no stored session to clear.");
            return Ok(());
        }
    };

    backend.clear_history(&session_id).await?;
    println!("Cleared the history of session {session_id}");

    return Ok(());
}

fn subcommand_ask() -> Command {
    return Command::new("ask")
        .about("Ask a single question in the stored session and print the reply.")
        .arg(
            Arg::new("question")
                .help("The question to ask.")
                .required(true)
                .num_args(1..)
                .trailing_var_arg(true),
        )
        .arg(
            Arg::new("selection")
                .short('s')
                .long("selection")
                .help("A passage of the book to attach to the question.")
                .num_args(1),
        );
}

fn subcommand_completions() -> Command {
    return Command::new("completions")
        .about("Generates shell completions.")
        .arg(
            clap::Arg::new("shell")
                .short('s')
                .long("shell")
                .help("Which shell to generate completions for.")
                .action(ArgAction::Set)
                .value_parser(value_parser!(Shell))
                .required(true),
        );
}

fn subcommand_config() -> Command {
    return Command::new("config")
        .about("Configuration file options.")
        .subcommand(
            Command::new("create").about("Saves the default config file to the configuration file path. This command will fail if the file exists already.")
        )
        .subcommand(
            Command::new("default").about("Outputs the default configuration file to stdout.")
        )
        .subcommand(
            Command::new("path").about("Returns the default path for the configuration file.")
        );
}

fn subcommand_debug() -> Command {
    return Command::new("debug")
        .about("Debug helpers for bookchat")
        .hide(true)
        .subcommand(
            Command::new("log-path").about("Output path to debug log file generated when running bookchat with environment variable RUST_LOG=bookchat")
        )
        .subcommand(
            Command::new("enum-config").about("List all config keys as strings.")
        );
}

fn subcommand_sessions() -> Command {
    return Command::new("sessions")
        .about("Manage the stored chat session.")
        .arg_required_else_help(true)
        .subcommand(Command::new("show").about("Print the stored session ID."))
        .subcommand(Command::new("history").about("Print the stored session's messages as the backend remembers them."))
        .subcommand(Command::new("reset").about("Forget the stored session. The backend keeps its copy."))
        .subcommand(Command::new("clear-history").about("Ask the backend to delete the stored session's messages."));
}

fn subcommand_chat() -> Command {
    return Command::new("chat").about("Start an interactive chat with the tutor.");
}

fn arg_backend() -> Arg {
    return Arg::new(ConfigKey::Backend.to_string())
        .short('b')
        .long(ConfigKey::Backend.to_string())
        .env("BOOKCHAT_BACKEND")
        .num_args(1)
        .help(format!(
            "The wire protocol the tutor backend speaks. [default: {}]",
            Config::default(ConfigKey::Backend)
        ))
        .value_parser(PossibleValuesParser::new(BackendName::VARIANTS))
        .global(true);
}

pub fn build() -> Command {
    let commands_text = help_text()
        .split('\n')
        .map(|line| {
            if line.starts_with('-') {
                return format!("  {line}");
            }
            if line.starts_with("COMMANDS:") {
                return format!("CHAT {line}")
                    .if_supports_color(Stream::Stdout, |e| return e.bold())
                    .to_string();
            }
            return line.to_string();
        })
        .collect::<Vec<String>>()
        .join("\n");

    let about = format!(
        "{}\n\nVersion: {}\nCommit: {}",
        env!("CARGO_PKG_DESCRIPTION"),
        env!("CARGO_PKG_VERSION"),
        env!("VERGEN_GIT_DESCRIBE")
    );

    return Command::new("bookchat")
        .about(about)
        .author(env!("CARGO_PKG_AUTHORS"))
        .version(env!("CARGO_PKG_VERSION"))
        .after_help(commands_text)
        .arg_required_else_help(false)
        .subcommand(subcommand_ask())
        .subcommand(subcommand_chat())
        .subcommand(subcommand_completions())
        .subcommand(subcommand_config())
        .subcommand(subcommand_debug())
        .subcommand(subcommand_sessions())
        .arg(
            Arg::new(ConfigKey::ApiURL.to_string())
                .short('u')
                .long(ConfigKey::ApiURL.to_string())
                .env("BOOKCHAT_API_URL")
                .num_args(1)
                .help(format!("Base URL of the tutor backend. [default: {}]", Config::default(ConfigKey::ApiURL)))
                .global(true),
        )
        .arg(arg_backend())
        .arg(
            Arg::new(ConfigKey::BackendHealthCheckTimeout.to_string())
                .long(ConfigKey::BackendHealthCheckTimeout.to_string())
                .env("BOOKCHAT_BACKEND_HEALTH_CHECK_TIMEOUT")
                .num_args(1)
                .help(format!("Time to wait in milliseconds before timing out when doing a healthcheck for a backend. [default: {}]", Config::default(ConfigKey::BackendHealthCheckTimeout)))
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::ConfigFile.to_string())
                .short('c')
                .long(ConfigKey::ConfigFile.to_string())
                .env("BOOKCHAT_CONFIG_FILE")
                .num_args(1)
                .help(format!("Path to configuration file [default: {}]", Config::default(ConfigKey::ConfigFile)))
                .global(true)
        )
        .arg(
            Arg::new(ConfigKey::StateFile.to_string())
                .long(ConfigKey::StateFile.to_string())
                .env("BOOKCHAT_STATE_FILE")
                .num_args(1)
                .help(format!("Path to the file remembering the session ID between runs. [default: {}]", Config::default(ConfigKey::StateFile)))
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::SelectionMinLength.to_string())
                .long(ConfigKey::SelectionMinLength.to_string())
                .env("BOOKCHAT_SELECTION_MIN_LENGTH")
                .num_args(1)
                .help(format!("Selections this many characters long or shorter are ignored. [default: {}]", Config::default(ConfigKey::SelectionMinLength)))
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::Username.to_string())
                .long(ConfigKey::Username.to_string())
                .env("BOOKCHAT_USERNAME")
                .num_args(1)
                .help("Your user name displayed next to your questions. [default: $USER]")
                .global(true),
        );
}

async fn load_config(cmd_matches: Vec<&ArgMatches>) -> Result<()> {
    return Config::load(build(), cmd_matches).await;
}

/// Handles every subcommand that finishes on its own. Returns true when the
/// interactive chat should start.
pub async fn parse() -> Result<bool> {
    let matches = build().get_matches();

    match matches.subcommand() {
        Some(("ask", subcmd_matches)) => {
            load_config(vec![&matches, subcmd_matches]).await?;
            let question = subcmd_matches
                .get_many::<String>("question")
                .unwrap_or_default()
                .map(|e| return e.to_string())
                .collect::<Vec<String>>()
                .join(" ");
            ask(&question, subcmd_matches.get_one::<String>("selection")).await?;
            return Ok(false);
        }
        Some(("chat", subcmd_matches)) => {
            load_config(vec![&matches, subcmd_matches]).await?;
        }
        Some(("completions", subcmd_matches)) => {
            if let Some(completions) = subcmd_matches.get_one::<Shell>("shell").copied() {
                let mut app = build();
                print_completions(completions, &mut app);
            }
            return Ok(false);
        }
        Some(("config", subcmd_matches)) => match subcmd_matches.subcommand() {
            Some(("create", _)) => {
                create_config_file().await?;
                return Ok(false);
            }
            Some(("default", _)) => {
                println!("{}", Config::serialize_default(build()));
                return Ok(false);
            }
            Some(("path", _)) => {
                println!("{}", Config::default(ConfigKey::ConfigFile));
                return Ok(false);
            }
            _ => {
                subcommand_config().print_long_help()?;
                return Ok(false);
            }
        },
        Some(("debug", debug_matches)) => {
            match debug_matches.subcommand() {
                Some(("log-path", _)) => {
                    println!("{}", log_dir().join("debug.log").to_string_lossy());
                }
                Some(("enum-config", _)) => {
                    println!("{}", ConfigKey::VARIANTS.join("\n"));
                }
                _ => {
                    subcommand_debug().print_long_help()?;
                }
            }

            return Ok(false);
        }
        Some(("sessions", subcmd_matches)) => {
            let mut cmd_matches = vec![&matches, subcmd_matches];
            if let Some((_, action_matches)) = subcmd_matches.subcommand() {
                cmd_matches.push(action_matches);
            }
            load_config(cmd_matches).await?;

            match subcmd_matches.subcommand() {
                Some(("show", _)) => sessions_show().await?,
                Some(("history", _)) => sessions_history().await?,
                Some(("reset", _)) => sessions_reset().await?,
                Some(("clear-history", _)) => sessions_clear_history().await?,
                _ => subcommand_sessions().print_long_help()?,
            }

            return Ok(false);
        }
        _ => {
            load_config(vec![&matches]).await?;
        }
    }

    return Ok(true);
}

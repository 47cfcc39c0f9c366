#![deny(clippy::implicit_return)]
#![allow(clippy::needless_return)]

mod application;
mod configuration;
mod domain;
mod infrastructure;

use std::env;
use std::process;

use anyhow::Error;
use owo_colors::OwoColorize;
use owo_colors::Stream;

use crate::application::chat;
use crate::application::cli;
use crate::infrastructure::backends::BackendManager;

fn handle_error(err: Error) {
    let report = format!(
        "Oh no! bookchat has failed with the following app version and error.\n\nVersion: {}\nCommit: {}\nError: {}",
        env!("CARGO_PKG_VERSION"),
        env!("VERGEN_GIT_DESCRIBE"),
        err
    );
    eprintln!("{}", report.if_supports_color(Stream::Stderr, |e| return e.red()));

    let backtrace = err.backtrace();
    if backtrace.to_string() == "disabled backtrace" {
        let args = env::args().collect::<Vec<String>>().join(" ");
        eprintln!("\nRunning the following can help explain further what the issue is:");
        eprintln!("\nRUST_BACKTRACE=1 {args}");
    } else {
        eprintln!("\n{}", backtrace);
    }

    process::exit(1);
}

#[tokio::main]
async fn main() {
    std::panic::set_hook(Box::new(|panic_info| {
        better_panic::Settings::auto().create_panic_handler()(panic_info);
    }));

    let file_appender = tracing_appender::rolling::never(cli::log_dir(), "debug.log");
    let (writer, guard) = tracing_appender::non_blocking(file_appender);
    if env::var("RUST_LOG")
        .unwrap_or_else(|_| return "".to_string())
        .contains("bookchat")
    {
        tracing_subscriber::fmt()
            .json()
            .with_max_level(tracing::Level::DEBUG)
            .with_writer(writer)
            .init();
    }

    match cli::parse().await {
        Ok(true) => (),
        Ok(false) => process::exit(0),
        Err(err) => handle_error(err),
    }

    let res = match BackendManager::from_config() {
        Ok(backend) => chat::start(backend).await,
        Err(err) => Err(err),
    };

    if let Err(err) = res {
        handle_error(err);
    }

    drop(guard);
    process::exit(0);
}

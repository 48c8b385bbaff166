#![deny(clippy::implicit_return)]
#![allow(clippy::needless_return)]

mod application;
mod configuration;
mod domain;
mod infrastructure;

use std::env;
use std::process;
use std::sync::Arc;

use anyhow::Error;
use anyhow::Result;
use domain::models::Event;
use domain::services::Publisher;
use domain::services::SessionController;
use domain::services::Snapshots;
use infrastructure::transports::HttpAgent;
use tokio::sync::mpsc;
use yansi::Paint;

use crate::application::cli;
use crate::application::repl;
use crate::configuration::Config;
use crate::configuration::ConfigKey;

fn handle_error(err: Error) {
    eprintln!(
        "{}",
        Paint::red(format!(
            "Oh no! Deckhand has failed with the following app version and error.\n\nVersion: {}\nCommit: {}\nError: {}",
            env!("CARGO_PKG_VERSION"),
            env!("VERGEN_GIT_DESCRIBE"),
            err
        ))
    );

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

async fn start() -> Result<()> {
    let (event_tx, event_rx) = mpsc::unbounded_channel::<Event>();
    let publisher = Publisher::default()
        .with_events(event_tx)
        .with_snapshots(Snapshots::default());

    let controller = Arc::new(SessionController::new(
        Box::<HttpAgent>::default(),
        &Config::get(ConfigKey::AgentKind),
        publisher,
    ));

    match Snapshots::default().load().await {
        Ok(Some(state)) => controller.restore(state),
        Ok(None) => {}
        Err(err) => {
            tracing::warn!(error = ?err, "Saved assistant state is unreadable, starting fresh");
        }
    }

    let conversation_id = Config::get(ConfigKey::ConversationID);
    if !conversation_id.is_empty() {
        let controller = Arc::clone(&controller);
        tokio::spawn(async move {
            controller.load_conversation_from_db(&conversation_id).await;
        });
    }

    return repl::start(controller, event_rx).await;
}

#[tokio::main]
async fn main() {
    std::panic::set_hook(Box::new(|panic_info| {
        better_panic::Settings::auto().create_panic_handler()(panic_info);
    }));

    let debug_log_dir = env::var("DECKHAND_LOG_DIR").unwrap_or_else(|_| {
        return dirs::cache_dir()
            .unwrap_or_else(env::temp_dir)
            .join("deckhand")
            .to_string_lossy()
            .to_string();
    });

    let file_appender = tracing_appender::rolling::never(debug_log_dir, "debug.log");
    let (writer, _guard) = tracing_appender::non_blocking(file_appender);
    if env::var("RUST_LOG")
        .unwrap_or_else(|_| return "".to_string())
        .contains("deckhand")
    {
        tracing_subscriber::fmt()
            .json()
            .with_max_level(tracing::Level::DEBUG)
            .with_writer(writer)
            .init();
    }

    match cli::parse().await {
        Ok(true) => {}
        Ok(false) => process::exit(0),
        Err(err) => {
            handle_error(err);
            return;
        }
    }

    if let Err(err) = start().await {
        handle_error(err);
    }

    process::exit(0);
}

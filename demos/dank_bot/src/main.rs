//! Dank Bot
//!
//! The smallest useful Botforge bot: one `;dank` command that answers
//! "memes", plus log lines for the ready and command-triggered events.
//!
//! It runs against the console client, so every line typed into the
//! terminal is a chat message:
//!
//! ```text
//! $ cargo run --package dank-bot -- my-token
//! ;dank please
//! Dank Bot: memes
//! ```
//!
//! Settings come from `botforge.toml` (or `--config <path>`) and
//! `BOTFORGE_*` environment variables, e.g. `BOTFORGE_BOT__PREFIX=!`.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use botforge::console::ConsoleClient;
use botforge::prelude::*;
use clap::Parser;
use clap::error::ErrorKind;

const USAGE: &str = "Usage: dank-bot <token>";

#[derive(Parser, Debug)]
#[command(name = "dank-bot", version, about = "A prefix-command demo bot")]
struct Cli {
    /// Token passed to the chat client.
    token: String,

    /// Configuration file to load instead of searching for `botforge.toml`.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn parse_cli() -> Cli {
    match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if is_missing_token(&e) => {
            println!("{USAGE}");
            std::process::exit(1);
        }
        Err(e) => e.exit(),
    }
}

fn is_missing_token(e: &clap::Error) -> bool {
    e.kind() == ErrorKind::MissingRequiredArgument
}

fn load_config(path: Option<&PathBuf>) -> Result<AppConfig> {
    let mut defaults = AppConfig::default();
    defaults.bot.prefix = ";".to_string();
    defaults.bot.name = "Dank Bot".to_string();

    let mut loader = ConfigLoader::new().merge(defaults);
    if let Some(path) = path {
        loader = loader.file(path);
    }
    Ok(loader.load()?)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = parse_cli();
    let config = load_config(cli.config.as_ref())?;

    let client = Arc::new(ConsoleClient::new());
    let bot = Bot::from_config(cli.token, &config, client)?;

    bot.on(EventKind::Ready, |event| {
        if let BotEvent::Ready { config, user } = event {
            info!("Logged in as {user}");
            info!("Command prefix is {:?}", config.prefix);
            info!("{}", "-".repeat(40));
        }
    });

    bot.on(EventKind::CommandTriggered, |event| {
        if let BotEvent::CommandTriggered { command, author } = event {
            info!(command = %command, author = %author, "Command triggered");
        }
    });

    bot.add_command("dank", |_args, _ctx| async { "memes" });

    bot.run().await?;
    Ok(())
}

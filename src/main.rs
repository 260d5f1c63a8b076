use anyhow::Context;
use evlog::{meta, LogEventConsolePrinter, Logger};

use crate::commands::CommandRegistry;
use crate::config::Config;
use crate::runtime::{get_logger, set_logger};
use crate::session::BotSession;

mod commands;
mod config;
mod directory;
mod dispatch;
mod handler;
mod helpers;
mod reaction;
mod runtime;
mod session;
mod sync;
#[cfg(test)]
mod testing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let mut logger = Logger::default();
    logger.register(LogEventConsolePrinter::default());
    set_logger(logger);

    let config = Config::from_env().context("failed to load configuration")?;
    let registry = CommandRegistry::builtin().context("invalid command definitions")?;

    let session = BotSession::new(config, registry);

    let result = if std::env::args().any(|arg| arg == "--sync-only") {
        session.sync_commands().await
    } else {
        session.start().await
    };

    if let Err(e) = result {
        get_logger().error("Bot session ended with an error.", meta! {
            "Error" => format!("{:#}", e),
        });
        return Err(e);
    }

    Ok(())
}

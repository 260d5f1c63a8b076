use crate::helpers::command_resp::{CommandInteraction, Reply};

pub const PING: &str = "ping";

/// Immediately replies with "Pong!", confirming the bot accepts and answers commands.
pub async fn ping(interaction: &dyn CommandInteraction) -> anyhow::Result<()> {
    interaction.reply(Reply::text("Pong!")).await
}

use std::sync::Arc;

use anyhow::Context;
use serenity::async_trait;
use serenity::http::Http;
use serenity::model::id::{CommandId, GuildId};
use serenity::model::interactions::application_command::ApplicationCommand;

use crate::helpers::command_def::CommandSchema;

/// A command as currently registered on the platform.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemoteCommand {
    pub id: u64,
    pub name: String,
}

impl From<&ApplicationCommand> for RemoteCommand {
    fn from(cmd: &ApplicationCommand) -> Self {
        Self {
            id: cmd.id.0,
            name: cmd.name.clone(),
        }
    }
}

/// The platform's per-guild command registration endpoint.
#[async_trait]
pub trait CommandDirectory: Send + Sync {
    async fn list(&self) -> anyhow::Result<Vec<RemoteCommand>>;

    /// Overwrites the whole remote set with `commands`.
    async fn bulk_replace(&self, commands: &[CommandSchema]) -> anyhow::Result<Vec<RemoteCommand>>;

    async fn delete(&self, id: u64) -> anyhow::Result<()>;
}

pub struct GuildCommandDirectory {
    http: Arc<Http>,
    guild_id: GuildId,
}

impl GuildCommandDirectory {
    pub fn new(http: Arc<Http>, guild_id: u64) -> Self {
        Self {
            http,
            guild_id: GuildId(guild_id),
        }
    }
}

#[async_trait]
impl CommandDirectory for GuildCommandDirectory {
    async fn list(&self) -> anyhow::Result<Vec<RemoteCommand>> {
        let existing_cmds = self.guild_id.get_application_commands(&self.http).await
            .context("failed to list guild commands")?;

        Ok(existing_cmds.iter().map(RemoteCommand::from).collect())
    }

    async fn bulk_replace(&self, commands: &[CommandSchema]) -> anyhow::Result<Vec<RemoteCommand>> {
        let created = self.guild_id.set_application_commands(&self.http, |c| {
            for schema in commands {
                c.create_application_command(|cmd| {
                    cmd.name(&schema.name)
                        .description(&schema.description);

                    for opt in &schema.options {
                        cmd.create_option(|o| o
                            .name(&opt.name)
                            .description(&opt.description)
                            .kind(opt.kind.into())
                            .required(opt.required));
                    }

                    cmd
                });
            }

            c
        }).await.context("failed to overwrite guild commands")?;

        Ok(created.iter().map(RemoteCommand::from).collect())
    }

    async fn delete(&self, id: u64) -> anyhow::Result<()> {
        self.guild_id.delete_application_command(&self.http, CommandId(id)).await
            .with_context(|| format!("failed to delete guild command {}", id))?;

        Ok(())
    }
}

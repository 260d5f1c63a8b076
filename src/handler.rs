use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Context as _;
use evlog::meta;
use serenity::async_trait;
use serenity::client::{Context, EventHandler};
use serenity::http::Http;
use serenity::model::channel::{MessageReaction, Reaction};
use serenity::model::gateway::Ready;
use serenity::model::interactions::application_command::ApplicationCommandInteraction;
use serenity::model::interactions::Interaction;
use tokio::sync::mpsc;

use crate::dispatch::BotEvent;
use crate::helpers::command_opt;
use crate::helpers::command_resp::{self, CommandInteraction, Reply};
use crate::reaction::{MessageDetail, ReactionData, ReactionSource, ReactionTally};
use crate::runtime::get_logger;

/// Forwards gateway events into the dispatcher's queue.
pub struct BotHandler {
    events: mpsc::UnboundedSender<BotEvent>,
    ready_seen: AtomicBool,
}

impl BotHandler {
    pub fn new(events: mpsc::UnboundedSender<BotEvent>) -> Self {
        Self {
            events,
            ready_seen: AtomicBool::new(false),
        }
    }

    /// Forwards the first ready of the session; reconnects are dropped.
    fn on_ready(&self, user: String) {
        if self.ready_seen.swap(true, Ordering::SeqCst) {
            get_logger().debug("Ignoring repeated ready.", meta! {
                "User" => user,
            });
            return;
        }

        self.forward(BotEvent::Ready { user });
    }

    fn forward(&self, event: BotEvent) {
        if self.events.send(event).is_err() {
            get_logger().error("Event dispatcher is gone; dropping event.", meta! {
                "Component" => "handler",
            });
        }
    }
}

#[async_trait]
impl EventHandler for BotHandler {
    async fn ready(&self, _ctx: Context, ready: Ready) {
        self.on_ready(ready.user.name);
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        if let Interaction::ApplicationCommand(interaction) = interaction {
            get_logger().debug("Interaction received.", meta! {
                "InteractionID" => interaction.id.0,
                "CommandID" => interaction.data.id.0,
                "CommandName" => interaction.data.name.clone(),
            });

            self.forward(BotEvent::InteractionCreate(Box::new(SerenityInteraction {
                http: ctx.http.clone(),
                inner: interaction,
            })));
        }
    }

    async fn reaction_add(&self, ctx: Context, add_reaction: Reaction) {
        let reaction = SerenityReaction::new(&ctx, add_reaction).await;
        self.forward(BotEvent::ReactionAdd(Box::new(reaction)));
    }

    async fn reaction_remove(&self, ctx: Context, removed_reaction: Reaction) {
        let reaction = SerenityReaction::new(&ctx, removed_reaction).await;
        self.forward(BotEvent::ReactionRemove(Box::new(reaction)));
    }
}

pub struct SerenityInteraction {
    http: Arc<Http>,
    inner: ApplicationCommandInteraction,
}

#[async_trait]
impl CommandInteraction for SerenityInteraction {
    fn command_name(&self) -> &str {
        &self.inner.data.name
    }

    fn string_option(&self, name: &str) -> Option<String> {
        command_opt::find_string_opt(&self.inner.data.options, name)
    }

    async fn reply(&self, reply: Reply) -> anyhow::Result<()> {
        command_resp::reply(&self.http, &self.inner, &reply).await
    }

    async fn defer_reply(&self) -> anyhow::Result<()> {
        command_resp::defer(&self.http, &self.inner).await
    }

    async fn edit_reply(&self, reply: Reply) -> anyhow::Result<()> {
        command_resp::edit_reply(&self.http, &self.inner, &reply).await
    }
}

/// A gateway reaction plus the reacted message, if the cache had it.
pub struct SerenityReaction {
    http: Arc<Http>,
    data: ReactionData,
    cached: Option<MessageDetail>,
}

impl SerenityReaction {
    async fn new(ctx: &Context, reaction: Reaction) -> Self {
        let cached = ctx.cache.message(reaction.channel_id, reaction.message_id).await
            .map(|msg| message_detail(&msg.reactions));

        Self {
            http: ctx.http.clone(),
            data: ReactionData {
                message_id: reaction.message_id.0,
                channel_id: reaction.channel_id.0,
                guild_id: reaction.guild_id.map(|v| v.0),
                user_id: reaction.user_id.map(|v| v.0),
                emoji: reaction.emoji.to_string(),
            },
            cached,
        }
    }
}

fn message_detail(reactions: &[MessageReaction]) -> MessageDetail {
    MessageDetail {
        reactions: reactions.iter()
            .map(|r| ReactionTally {
                emoji: r.reaction_type.to_string(),
                count: r.count,
            })
            .collect(),
    }
}

#[async_trait]
impl ReactionSource for SerenityReaction {
    fn data(&self) -> &ReactionData {
        &self.data
    }

    fn is_partial(&self) -> bool {
        self.cached.is_none()
    }

    fn cached(&self) -> Option<MessageDetail> {
        self.cached.clone()
    }

    async fn fetch(&self) -> anyhow::Result<MessageDetail> {
        let msg = self.http.get_message(self.data.channel_id, self.data.message_id).await
            .with_context(|| format!("failed to fetch message {}", self.data.message_id))?;

        Ok(message_detail(&msg.reactions))
    }
}

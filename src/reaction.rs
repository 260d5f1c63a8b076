//! Completing reaction events before anything inspects them.
//!
//! The gateway only sends ids for a reaction. When the reacted message is
//! not cached the event is partial, and anything that needs the message
//! (who reacted, with what) has to fetch it first.

use evlog::meta;
use serenity::async_trait;

use crate::runtime::get_logger;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReactionData {
    pub message_id: u64,
    pub channel_id: u64,
    pub guild_id: Option<u64>,
    pub user_id: Option<u64>,
    pub emoji: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReactionTally {
    pub emoji: String,
    pub count: u64,
}

/// What is known about the reacted message once it is loaded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MessageDetail {
    pub reactions: Vec<ReactionTally>,
}

#[async_trait]
pub trait ReactionSource: Send + Sync {
    fn data(&self) -> &ReactionData;

    fn is_partial(&self) -> bool;

    /// Message detail available without a request. `None` when partial.
    fn cached(&self) -> Option<MessageDetail>;

    async fn fetch(&self) -> anyhow::Result<MessageDetail>;
}

/// A reaction after resolution. `message` is `None` when the data could not
/// be completed, so consumers must cope with it missing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedReaction {
    pub data: ReactionData,
    pub message: Option<MessageDetail>,
}

impl ResolvedReaction {
    pub fn is_complete(&self) -> bool {
        self.message.is_some()
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct ReactionResolver;

impl ReactionResolver {
    pub async fn resolve(&self, reaction: &dyn ReactionSource) -> ResolvedReaction {
        let data = reaction.data().clone();

        if !reaction.is_partial() {
            return ResolvedReaction {
                message: reaction.cached(),
                data,
            };
        }

        let message = match reaction.fetch().await {
            Ok(v) => Some(v),
            Err(e) => {
                get_logger().error("Failed to fetch partial reaction.", meta! {
                    "MessageID" => data.message_id,
                    "ChannelID" => data.channel_id,
                    "Error" => e,
                });
                None
            }
        };

        ResolvedReaction { data, message }
    }
}

/// Hook for reaction-driven role assignment. Receives every resolved reaction.
#[async_trait]
pub trait ReactionRoleStrategy: Send + Sync {
    async fn reaction_added(&self, reaction: &ResolvedReaction) -> anyhow::Result<()>;

    async fn reaction_removed(&self, reaction: &ResolvedReaction) -> anyhow::Result<()>;
}

/// The default strategy: reactions never change roles.
#[derive(Clone, Copy, Debug, Default)]
pub struct DisabledReactionRoles;

#[async_trait]
impl ReactionRoleStrategy for DisabledReactionRoles {
    async fn reaction_added(&self, _reaction: &ResolvedReaction) -> anyhow::Result<()> {
        Ok(())
    }

    async fn reaction_removed(&self, _reaction: &ResolvedReaction) -> anyhow::Result<()> {
        Ok(())
    }
}

use anyhow::Context;
use serenity::async_trait;
use serenity::builder::CreateEmbed;
use serenity::http::Http;
use serenity::model::interactions::application_command::ApplicationCommandInteraction;
use serenity::model::interactions::InteractionResponseType;

/// Content of a reply produced by a command.
#[derive(Clone, Debug, PartialEq)]
pub enum Reply {
    Text(String),
    Embed(EmbedReply),
}

impl Reply {
    pub fn text(content: impl Into<String>) -> Self {
        Reply::Text(content.into())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct EmbedReply {
    pub color: u32,
    pub title: String,
    pub description: String,
    pub footer: Option<String>,
}

impl EmbedReply {
    fn apply<'a>(&self, e: &'a mut CreateEmbed) -> &'a mut CreateEmbed {
        e.color(self.color)
            .title(&self.title)
            .description(&self.description);

        if let Some(footer) = &self.footer {
            e.footer(|f| f.text(footer));
        }

        e
    }
}

/// An invocation of a slash command, as seen by command handlers.
///
/// Handlers must eventually produce exactly one response: either `reply`,
/// or `defer_reply` followed by `edit_reply`.
#[async_trait]
pub trait CommandInteraction: Send + Sync {
    fn command_name(&self) -> &str;

    fn string_option(&self, name: &str) -> Option<String>;

    async fn reply(&self, reply: Reply) -> anyhow::Result<()>;

    async fn defer_reply(&self) -> anyhow::Result<()>;

    async fn edit_reply(&self, reply: Reply) -> anyhow::Result<()>;
}

pub async fn reply(http: &Http, interaction: &ApplicationCommandInteraction, reply: &Reply) -> anyhow::Result<()> {
    interaction.create_interaction_response(http, |r| {
        r.kind(InteractionResponseType::ChannelMessageWithSource)
            .interaction_response_data(|d| match reply {
                Reply::Text(content) => d.content(content),
                Reply::Embed(embed) => d.create_embed(|e| embed.apply(e)),
            })
    }).await.context("failed to send interaction response")?;

    Ok(())
}

pub async fn defer(http: &Http, interaction: &ApplicationCommandInteraction) -> anyhow::Result<()> {
    interaction.create_interaction_response(http, |r| {
        r.kind(InteractionResponseType::DeferredChannelMessageWithSource)
    }).await.context("failed to defer interaction response")?;

    Ok(())
}

pub async fn edit_reply(http: &Http, interaction: &ApplicationCommandInteraction, reply: &Reply) -> anyhow::Result<()> {
    interaction.edit_original_interaction_response(http, |r| match reply {
        Reply::Text(content) => r.content(content),
        Reply::Embed(embed) => r.create_embed(|e| embed.apply(e)),
    }).await.context("failed to edit interaction response")?;

    Ok(())
}

use anyhow::Context;
use evlog::meta;
use once_cell::sync::Lazy;
use reqwest::Url;
use serde::Deserialize;

use crate::helpers::command_def::{OptionKind, OptionSpec};
use crate::helpers::command_resp::{CommandInteraction, EmbedReply, Reply};
use crate::runtime::get_logger;

pub const EIGHT_BALL: &str = "8ball";

pub const OPTIONS: &[OptionSpec] = &[
    OptionSpec {
        name: "query",
        description: "Your question for the Magic 8-ball",
        kind: OptionKind::String,
        required: true,
    },
];

const ORACLE_URL: &str = "https://8ball.delegator.com/magic/JSON/";
const EMBED_COLOR: u32 = 0xcf5ad9;
const MAX_FOOTER: usize = 2048;

static HTTP: Lazy<reqwest::Client> = Lazy::new(reqwest::Client::new);

#[derive(Debug, Deserialize)]
struct OracleResponse {
    magic: Magic,
}

#[derive(Debug, Deserialize)]
struct Magic {
    answer: String,
    #[serde(rename = "type")]
    kind: String,
}

pub async fn eight_ball(interaction: &dyn CommandInteraction) -> anyhow::Result<()> {
    interaction.defer_reply().await?;

    let query = interaction.string_option("query").unwrap_or_default();

    let magic = ask_oracle(&query).await?;

    get_logger().info("Received query.", meta! {
        "Query" => query,
    });

    interaction.edit_reply(Reply::Embed(fortune_embed(&query, &magic))).await
}

async fn ask_oracle(query: &str) -> anyhow::Result<Magic> {
    let mut url = Url::parse(ORACLE_URL)?;
    url.path_segments_mut()
        .map_err(|_| anyhow::Error::msg("oracle URL cannot be a base"))?
        .pop_if_empty()
        .push(query);

    let response: OracleResponse = HTTP.get(url)
        .send().await
        .context("failed to reach the 8-ball oracle")?
        .error_for_status()?
        .json().await
        .context("8-ball oracle returned an unexpected body")?;

    Ok(response.magic)
}

fn emoji_for(kind: &str) -> Option<&'static str> {
    match kind {
        "Affirmative" => Some("😁"),
        "Contrary" => Some("😬"),
        "Neutral" => Some("🤔"),
        _ => None,
    }
}

fn fortune_embed(query: &str, magic: &Magic) -> EmbedReply {
    let description = match emoji_for(&magic.kind) {
        Some(emoji) => format!("{}. {}", magic.answer, emoji),
        None => {
            get_logger().error("Received an unrecognised response type.", meta! {
                "Type" => magic.kind.clone(),
            });
            format!("{}.", magic.answer)
        }
    };

    EmbedReply {
        color: EMBED_COLOR,
        title: "🔮 The Magic 8-ball says...".to_owned(),
        description,
        footer: Some(query.chars().take(MAX_FOOTER).collect()),
    }
}

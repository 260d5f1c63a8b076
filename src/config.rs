use std::env;
use std::fmt;

use anyhow::Context;

pub const TOKEN_VAR: &str = "DISCORD_TOKEN";
pub const APPLICATION_VAR: &str = "DISCORD_APPLICATION_ID";
pub const GUILD_VAR: &str = "DISCORD_GUILD_ID";

/// Credentials and targets needed to run a session against one guild.
#[derive(Clone)]
pub struct Config {
    pub token: String,
    pub application_id: u64,
    pub guild_id: u64,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let token = required(&lookup, TOKEN_VAR)?;
        let application_id = required(&lookup, APPLICATION_VAR)?
            .parse::<u64>()
            .with_context(|| format!("{} is not a valid application ID", APPLICATION_VAR))?;
        let guild_id = required(&lookup, GUILD_VAR)?
            .parse::<u64>()
            .with_context(|| format!("{} is not a valid guild ID", GUILD_VAR))?;

        Ok(Self {
            token,
            application_id,
            guild_id,
        })
    }
}

fn required<F>(lookup: &F, key: &str) -> anyhow::Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_owned()),
        _ => anyhow::bail!("expected {}", key),
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("token", &"<redacted>")
            .field("application_id", &self.application_id)
            .field("guild_id", &self.guild_id)
            .finish()
    }
}

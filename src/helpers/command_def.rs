use futures::future::BoxFuture;
use once_cell::sync::Lazy;
use regex::Regex;
use serenity::model::interactions::application_command::ApplicationCommandOptionType;

use crate::helpers::command_resp::CommandInteraction;

pub type InteractionHandler = for<'a> fn(&'a dyn CommandInteraction) -> BoxFuture<'a, anyhow::Result<()>>;

static VALIDATE_COMMAND_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[-_\p{L}\p{N}]{1,32}$").expect("command name pattern is valid")
});

const MAX_DESCRIPTION: usize = 100;
const MAX_OPTIONS: usize = 25;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OptionKind {
    String,
    Integer,
    Boolean,
    User,
    Channel,
    Role,
    Mentionable,
}

impl From<OptionKind> for ApplicationCommandOptionType {
    fn from(kind: OptionKind) -> Self {
        match kind {
            OptionKind::String => ApplicationCommandOptionType::String,
            OptionKind::Integer => ApplicationCommandOptionType::Integer,
            OptionKind::Boolean => ApplicationCommandOptionType::Boolean,
            OptionKind::User => ApplicationCommandOptionType::User,
            OptionKind::Channel => ApplicationCommandOptionType::Channel,
            OptionKind::Role => ApplicationCommandOptionType::Role,
            OptionKind::Mentionable => ApplicationCommandOptionType::Mentionable,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct OptionSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub kind: OptionKind,
    pub required: bool,
}

#[derive(Clone, Copy)]
pub struct CommandDef {
    pub name: &'static str,
    pub description: &'static str,
    pub options: &'static [OptionSpec],
    pub handler: InteractionHandler,
}

impl CommandDef {
    /// The registrable form of this command; never carries the handler.
    pub fn schema(&self) -> CommandSchema {
        CommandSchema {
            name: self.name.to_owned(),
            description: self.description.to_owned(),
            options: self.options.iter()
                .map(|opt| OptionSchema {
                    name: opt.name.to_owned(),
                    description: opt.description.to_owned(),
                    kind: opt.kind,
                    required: opt.required,
                })
                .collect(),
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        validate_name(self.name)?;
        validate_description(self.name, self.description)?;

        if self.options.len() > MAX_OPTIONS {
            anyhow::bail!("command '{}' declares {} options; at most {} are allowed", self.name, self.options.len(), MAX_OPTIONS);
        }

        let mut seen_optional = false;
        for opt in self.options {
            validate_name(opt.name)?;
            validate_description(opt.name, opt.description)?;

            if opt.required && seen_optional {
                anyhow::bail!("command '{}': required option '{}' follows an optional option", self.name, opt.name);
            }
            seen_optional |= !opt.required;
        }

        Ok(())
    }
}

fn validate_name(name: &str) -> anyhow::Result<()> {
    if !VALIDATE_COMMAND_NAME.is_match(name) || name.to_lowercase() != name {
        anyhow::bail!("name '{}' is invalid; must be 1-32 lowercase letters, numbers, '-' or '_'", name);
    }
    Ok(())
}

fn validate_description(name: &str, description: &str) -> anyhow::Result<()> {
    let len = description.chars().count();
    if len == 0 || len > MAX_DESCRIPTION {
        anyhow::bail!("description of '{}' must be 1-{} characters; got {}", name, MAX_DESCRIPTION, len);
    }
    Ok(())
}

/// Handler-free command description; `directory` turns it into the platform request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandSchema {
    pub name: String,
    pub description: String,
    pub options: Vec<OptionSchema>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OptionSchema {
    pub name: String,
    pub description: String,
    pub kind: OptionKind,
    pub required: bool,
}

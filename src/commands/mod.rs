mod eight_ball;
mod ping;

use std::collections::HashMap;

use itertools::Itertools;

use crate::helpers::command_def::{CommandDef, CommandSchema};

pub const COMMANDS: &[CommandDef] = &[
    CommandDef {
        name: ping::PING,
        description: "Replies with pong!",
        options: &[],
        handler: |i| Box::pin(async move { ping::ping(i).await }),
    },
    CommandDef {
        name: eight_ball::EIGHT_BALL,
        description: "Ask the Magic 8-ball a question and it may tell you your fortune...",
        options: eight_ball::OPTIONS,
        handler: |i| Box::pin(async move { eight_ball::eight_ball(i).await }),
    },
];

/// The locally declared command set, keyed by name. Read-only once built.
pub struct CommandRegistry {
    commands: Vec<CommandDef>,
    by_name: HashMap<&'static str, usize>,
}

impl CommandRegistry {
    pub fn new(defs: &[CommandDef]) -> anyhow::Result<Self> {
        let mut by_name = HashMap::with_capacity(defs.len());

        for (idx, def) in defs.iter().enumerate() {
            def.validate()?;

            if by_name.insert(def.name, idx).is_some() {
                anyhow::bail!("command '{}' is declared more than once", def.name);
            }
        }

        Ok(Self {
            commands: defs.to_vec(),
            by_name,
        })
    }

    pub fn builtin() -> anyhow::Result<Self> {
        Self::new(COMMANDS)
    }

    pub fn get(&self, name: &str) -> Option<&CommandDef> {
        self.by_name.get(name).map(|&idx| &self.commands[idx])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Schemas for every command, in declaration order.
    pub fn schemas(&self) -> Vec<CommandSchema> {
        self.commands.iter().map(CommandDef::schema).collect()
    }

    pub fn names(&self) -> String {
        self.commands.iter().map(|c| c.name).join(", ")
    }
}

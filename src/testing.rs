//! In-memory stand-ins for the platform, used by unit tests.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use serenity::async_trait;
use tokio::sync::Semaphore;

use crate::directory::{CommandDirectory, RemoteCommand};
use crate::helpers::command_def::CommandSchema;
use crate::helpers::command_resp::{CommandInteraction, Reply};
use crate::reaction::{MessageDetail, ReactionData, ReactionSource, ReactionTally};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DirectoryCall {
    List,
    BulkReplace(Vec<String>),
    Delete(u64),
}

#[derive(Default)]
struct DirectoryState {
    commands: Vec<RemoteCommand>,
    next_id: u64,
    calls: Vec<DirectoryCall>,
    fail_list: bool,
    fail_bulk_replace: bool,
    fail_delete: HashSet<String>,
}

/// Behaves like the platform: a bulk overwrite keeps ids of commands it
/// names, assigns new ids to the rest, and drops everything else.
#[derive(Default)]
pub struct FakeDirectory {
    state: Mutex<DirectoryState>,
    delete_gate: Mutex<Option<Arc<Semaphore>>>,
}

impl FakeDirectory {
    pub fn with_names(names: &[&str]) -> Self {
        let directory = Self::default();
        {
            let mut state = directory.state.lock().unwrap();
            for name in names {
                state.next_id += 1;
                let id = 1000 + state.next_id;
                state.commands.push(RemoteCommand { id, name: name.to_string() });
            }
        }
        directory
    }

    pub fn fail_list(&self) {
        self.state.lock().unwrap().fail_list = true;
    }

    pub fn fail_bulk_replace(&self) {
        self.state.lock().unwrap().fail_bulk_replace = true;
    }

    pub fn fail_delete_of(&self, name: &str) {
        self.state.lock().unwrap().fail_delete.insert(name.to_owned());
    }

    /// Holds every delete until the semaphore hands out a permit.
    pub fn gate_deletes(&self, gate: Arc<Semaphore>) {
        *self.delete_gate.lock().unwrap() = Some(gate);
    }

    pub fn calls(&self) -> Vec<DirectoryCall> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn snapshot(&self) -> Vec<RemoteCommand> {
        self.state.lock().unwrap().commands.clone()
    }

    pub fn names(&self) -> Vec<String> {
        self.snapshot().into_iter().map(|c| c.name).collect()
    }

    pub fn sorted_names(&self) -> Vec<String> {
        let mut names = self.names();
        names.sort();
        names
    }

    pub fn id_of(&self, name: &str) -> Option<u64> {
        self.snapshot().into_iter().find(|c| c.name == name).map(|c| c.id)
    }
}

#[async_trait]
impl CommandDirectory for FakeDirectory {
    async fn list(&self) -> anyhow::Result<Vec<RemoteCommand>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(DirectoryCall::List);
        if state.fail_list {
            anyhow::bail!("listing unavailable");
        }
        Ok(state.commands.clone())
    }

    async fn bulk_replace(&self, commands: &[CommandSchema]) -> anyhow::Result<Vec<RemoteCommand>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(DirectoryCall::BulkReplace(commands.iter().map(|c| c.name.clone()).collect()));
        if state.fail_bulk_replace {
            anyhow::bail!("overwrite rejected");
        }

        let mut replaced = Vec::with_capacity(commands.len());
        for schema in commands {
            let existing = state.commands.iter().find(|c| c.name == schema.name).map(|c| c.id);
            let id = match existing {
                Some(id) => id,
                None => {
                    state.next_id += 1;
                    1000 + state.next_id
                }
            };
            replaced.push(RemoteCommand { id, name: schema.name.clone() });
        }
        state.commands = replaced.clone();

        Ok(replaced)
    }

    async fn delete(&self, id: u64) -> anyhow::Result<()> {
        let gate = self.delete_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            let _permit = gate.acquire().await?;
        }

        let mut state = self.state.lock().unwrap();
        state.calls.push(DirectoryCall::Delete(id));

        let idx = match state.commands.iter().position(|c| c.id == id) {
            Some(idx) => idx,
            None => anyhow::bail!("unknown command {}", id),
        };
        if state.fail_delete.contains(&state.commands[idx].name) {
            anyhow::bail!("delete of {} rejected", id);
        }
        state.commands.remove(idx);

        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Recorded {
    Reply(Reply),
    Defer,
    Edit(Reply),
}

pub struct FakeInteraction {
    name: String,
    recorded: Arc<Mutex<Vec<Recorded>>>,
}

impl FakeInteraction {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            recorded: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A handle that still sees responses after the interaction is moved into an event.
    pub fn log(&self) -> Arc<Mutex<Vec<Recorded>>> {
        Arc::clone(&self.recorded)
    }

    pub fn recorded(&self) -> Vec<Recorded> {
        self.recorded.lock().unwrap().clone()
    }
}

#[async_trait]
impl CommandInteraction for FakeInteraction {
    fn command_name(&self) -> &str {
        &self.name
    }

    fn string_option(&self, _name: &str) -> Option<String> {
        None
    }

    async fn reply(&self, reply: Reply) -> anyhow::Result<()> {
        self.recorded.lock().unwrap().push(Recorded::Reply(reply));
        Ok(())
    }

    async fn defer_reply(&self) -> anyhow::Result<()> {
        self.recorded.lock().unwrap().push(Recorded::Defer);
        Ok(())
    }

    async fn edit_reply(&self, reply: Reply) -> anyhow::Result<()> {
        self.recorded.lock().unwrap().push(Recorded::Edit(reply));
        Ok(())
    }
}

pub struct FakeReaction {
    data: ReactionData,
    partial: bool,
    fetch_fails: bool,
    fetches: Arc<AtomicUsize>,
}

impl FakeReaction {
    pub fn new(message_id: u64, partial: bool) -> Self {
        Self {
            data: ReactionData {
                message_id,
                channel_id: 10,
                guild_id: Some(20),
                user_id: Some(30),
                emoji: "👍".to_owned(),
            },
            partial,
            fetch_fails: false,
            fetches: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn failing_fetch(mut self) -> Self {
        self.fetch_fails = true;
        self
    }

    pub fn fetch_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.fetches)
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

pub fn detail() -> MessageDetail {
    MessageDetail {
        reactions: vec![ReactionTally { emoji: "👍".to_owned(), count: 2 }],
    }
}

#[async_trait]
impl ReactionSource for FakeReaction {
    fn data(&self) -> &ReactionData {
        &self.data
    }

    fn is_partial(&self) -> bool {
        self.partial
    }

    fn cached(&self) -> Option<MessageDetail> {
        if self.partial {
            None
        } else {
            Some(detail())
        }
    }

    async fn fetch(&self) -> anyhow::Result<MessageDetail> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.fetch_fails {
            anyhow::bail!("message fetch failed");
        }
        Ok(detail())
    }
}

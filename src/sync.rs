//! Reconciles the guild's registered commands with the local registry.
//!
//! A run has two phases. [`remove_stale`] lists what the platform has and
//! deletes every command the registry no longer declares; [`register_all`]
//! overwrites the remote set with the full local schema list. The phases are
//! separate requests with no transaction between them: if the process dies
//! after the deletions, the guild is left with fewer stale commands and none
//! of the new ones until the next run.
//!
//! At startup the two phases run concurrently (see [`spawn_startup_sync`]).
//! Every interleaving converges on the local set because the bulk overwrite
//! alone drops anything it does not name; a deletion that loses the race
//! fails on an id that no longer exists and is only logged.

use std::sync::Arc;

use evlog::meta;
use itertools::Itertools;
use tokio::task::JoinHandle;

use crate::commands::CommandRegistry;
use crate::directory::{CommandDirectory, RemoteCommand};
use crate::runtime::get_logger;

#[derive(Debug, Default, PartialEq, Eq)]
pub struct StaleRemoval {
    pub deleted: Vec<RemoteCommand>,
    pub failed: Vec<RemoteCommand>,
}

pub async fn remove_stale(directory: &dyn CommandDirectory, registry: &CommandRegistry) -> StaleRemoval {
    let existing_cmds = match directory.list().await {
        Ok(v) => v,
        Err(e) => {
            get_logger().error("Failed to list registered commands; assuming none.", meta! {
                "Error" => e,
            });
            Vec::new()
        }
    };

    let stale = existing_cmds.into_iter()
        .filter(|cmd| !registry.contains(&cmd.name))
        .collect::<Vec<_>>();

    let mut removal = StaleRemoval::default();

    for cmd in stale {
        match directory.delete(cmd.id).await {
            Ok(()) => {
                get_logger().info("Deleted stale command.", meta! {
                    "Command" => cmd.name.clone(),
                    "CommandID" => cmd.id,
                });
                removal.deleted.push(cmd);
            }
            Err(e) => {
                get_logger().error("Failed to delete stale command.", meta! {
                    "Command" => cmd.name.clone(),
                    "CommandID" => cmd.id,
                    "Error" => e,
                });
                removal.failed.push(cmd);
            }
        }
    }

    removal
}

/// Overwrites the remote set with every local schema. Returns whether the request succeeded.
pub async fn register_all(directory: &dyn CommandDirectory, registry: &CommandRegistry) -> bool {
    let schemas = registry.schemas();

    match directory.bulk_replace(&schemas).await {
        Ok(registered) => {
            get_logger().info("Registered commands.", meta! {
                "Commands" => registered.iter().map(|c| c.name.as_str()).join(", "),
            });
            true
        }
        Err(e) => {
            get_logger().error("Failed to register commands.", meta! {
                "Commands" => registry.names(),
                "Error" => e,
            });
            false
        }
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub removal: StaleRemoval,
    pub registered: bool,
}

/// One ordered run: remove stale commands, then overwrite with the local set.
pub async fn synchronize(directory: &dyn CommandDirectory, registry: &CommandRegistry) -> SyncReport {
    let removal = remove_stale(directory, registry).await;
    let registered = register_all(directory, registry).await;

    SyncReport { removal, registered }
}

/// Starts removal and registration together without sequencing them.
pub fn spawn_startup_sync(directory: Arc<dyn CommandDirectory>, registry: Arc<CommandRegistry>) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::join!(
            remove_stale(directory.as_ref(), &registry),
            register_all(directory.as_ref(), &registry),
        );
    })
}

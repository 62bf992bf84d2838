/*
 * SPDX-FileCopyrightText: 2025 Postino Project
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

//! Durable, concurrency-safe per-user mailbox storage.
//!
//! One JSON file per registered address holds that user's full ordered
//! message list; every mutation rewrites the file through a temporary
//! sibling and an atomic rename, so a crash mid-save never leaves a
//! half-written mailbox behind.
//!
//! Concurrency follows a per-user discipline: each address owns one
//! reader/writer lock, built eagerly from the closed registry at
//! startup. Reads (`fetch_all`, `fetch_since`) take it shared, writes
//! (`deposit`, `delete_by_id`, `mark_read`) take it exclusive.
//! Operations on different mailboxes never contend with each other.

pub mod error;

pub use error::StoreError;

use std::path::{Path, PathBuf};

use ahash::AHashMap;
use chrono::{DateTime, Utc};
use common::{Message, address};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// The process-wide mailbox store.
///
/// Constructed once at startup and shared by handle (`Arc`) with every
/// connection handler; there is no hidden global instance. The registry
/// and lock table are immutable after construction, so `user_exists`
/// needs no locking at all.
pub struct MailboxStore {
    data_dir: PathBuf,
    mailboxes: AHashMap<String, RwLock<PathBuf>>,
}

impl MailboxStore {
    /// Opens the store: creates the data directory and an empty mailbox
    /// file for every registered address that does not have one yet.
    ///
    /// Addresses are keyed lowercase; registry membership is
    /// case-insensitive.
    pub async fn open(
        data_dir: impl Into<PathBuf>,
        users: &[String],
    ) -> Result<Self, StoreError> {
        let data_dir = data_dir.into();
        tokio::fs::create_dir_all(&data_dir)
            .await
            .map_err(|source| StoreError::Io {
                address: data_dir.display().to_string(),
                source,
            })?;

        let mut mailboxes = AHashMap::with_capacity(users.len());
        for user in users {
            let key = address::normalize(user);
            let path = data_dir.join(format!("{key}.json"));
            if tokio::fs::try_exists(&path)
                .await
                .map_err(|source| StoreError::Io {
                    address: key.clone(),
                    source,
                })?
            {
                debug!(user = %key, "mailbox file present");
            } else {
                save(&key, &path, &[]).await?;
                info!(user = %key, "created empty mailbox");
            }
            mailboxes.insert(key, RwLock::new(path));
        }

        info!(users = mailboxes.len(), dir = %data_dir.display(), "mailbox store ready");
        Ok(Self { data_dir, mailboxes })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Case-insensitive membership test against the closed registry.
    pub fn user_exists(&self, user: &str) -> bool {
        self.mailboxes.contains_key(&address::normalize(user))
    }

    fn mailbox(&self, user: &str) -> Option<&RwLock<PathBuf>> {
        self.mailboxes.get(&address::normalize(user))
    }

    /// Appends `message` to `recipient`'s mailbox and persists.
    pub async fn deposit(&self, recipient: &str, message: &Message) -> Result<(), StoreError> {
        let mailbox = self
            .mailbox(recipient)
            .ok_or_else(|| StoreError::UnknownUser(recipient.to_string()))?;
        let path = mailbox.write().await;

        let mut messages = load(recipient, &path).await?;
        messages.push(message.clone());
        save(recipient, &path, &messages).await?;

        debug!(recipient, id = %message.id, total = messages.len(), "message deposited");
        Ok(())
    }

    /// Returns every message persisted for `user`, in storage order.
    ///
    /// Unknown users get an empty list, not an error. A read fault also
    /// degrades to an empty list with a logged warning, so a broken
    /// mailbox file cannot take a connection down.
    pub async fn fetch_all(&self, user: &str) -> Vec<Message> {
        let Some(mailbox) = self.mailbox(user) else {
            return Vec::new();
        };
        let path = mailbox.read().await;

        match load(user, &path).await {
            Ok(messages) => messages,
            Err(err) => {
                warn!(user, error = %err, "mailbox read failed, returning empty list");
                Vec::new()
            }
        }
    }

    /// Like [`fetch_all`](Self::fetch_all) but keeps only messages
    /// strictly newer than `since`. `None` means the full mailbox.
    pub async fn fetch_since(&self, user: &str, since: Option<DateTime<Utc>>) -> Vec<Message> {
        let messages = self.fetch_all(user).await;
        match since {
            None => messages,
            Some(since) => messages
                .into_iter()
                .filter(|message| message.timestamp > since)
                .collect(),
        }
    }

    /// Removes the message with `id` from `user`'s mailbox if present.
    ///
    /// Idempotent: a missing id is not an error, and the file is only
    /// rewritten when a removal actually happened.
    pub async fn delete_by_id(&self, user: &str, id: &str) -> Result<(), StoreError> {
        let mailbox = self
            .mailbox(user)
            .ok_or_else(|| StoreError::UnknownUser(user.to_string()))?;
        let path = mailbox.write().await;

        let mut messages = load(user, &path).await?;
        let before = messages.len();
        messages.retain(|message| message.id != id);

        if messages.len() != before {
            save(user, &path, &messages).await?;
            debug!(user, id, remaining = messages.len(), "message deleted");
        }
        Ok(())
    }

    /// Marks the message with `id` as read if present and unread.
    ///
    /// Persists only on an actual change; marking an already-read
    /// message is a no-op write and still succeeds.
    pub async fn mark_read(&self, user: &str, id: &str) -> Result<(), StoreError> {
        let mailbox = self
            .mailbox(user)
            .ok_or_else(|| StoreError::UnknownUser(user.to_string()))?;
        let path = mailbox.write().await;

        let mut messages = load(user, &path).await?;
        let changed = messages
            .iter_mut()
            .find(|message| message.id == id && !message.read)
            .map(|message| message.read = true)
            .is_some();

        if changed {
            save(user, &path, &messages).await?;
            debug!(user, id, "message marked read");
        }
        Ok(())
    }
}

async fn load(user: &str, path: &Path) -> Result<Vec<Message>, StoreError> {
    match tokio::fs::read(path).await {
        Ok(bytes) => serde_json::from_slice(&bytes).map_err(|source| StoreError::Corrupt {
            address: user.to_string(),
            source,
        }),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(source) => Err(StoreError::Io {
            address: user.to_string(),
            source,
        }),
    }
}

/// Writes the full message list to a temporary sibling, then renames it
/// over the mailbox file. A partial write from a crash leaves only the
/// temporary behind; the mailbox itself stays valid.
async fn save(user: &str, path: &Path, messages: &[Message]) -> Result<(), StoreError> {
    let bytes = serde_json::to_vec_pretty(messages).map_err(|source| StoreError::Corrupt {
        address: user.to_string(),
        source,
    })?;

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    let io_err = |source| StoreError::Io {
        address: user.to_string(),
        source,
    };
    tokio::fs::write(&tmp, &bytes).await.map_err(io_err)?;
    tokio::fs::rename(&tmp, path).await.map_err(io_err)?;
    Ok(())
}

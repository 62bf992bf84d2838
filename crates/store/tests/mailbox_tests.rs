/*
 * SPDX-FileCopyrightText: 2025 Postino Project
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

//! Mailbox store integration tests against a real filesystem.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use common::Message;
use store::MailboxStore;

const USER1: &str = "user1@mail.com";
const USER2: &str = "user2@mail.com";
const USER3: &str = "user3@mail.com";

fn registry() -> Vec<String> {
    vec![USER1.to_string(), USER2.to_string(), USER3.to_string()]
}

fn message_to(recipient: &str, subject: &str) -> Message {
    Message::new(USER1, vec![recipient.to_string()], subject, "body")
}

async fn open_store(dir: &tempfile::TempDir) -> MailboxStore {
    MailboxStore::open(dir.path(), &registry()).await.unwrap()
}

#[tokio::test]
async fn deposit_then_fetch_all_returns_the_message() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir).await;

    let sent = message_to(USER2, "first");
    store.deposit(USER2, &sent).await.unwrap();

    let inbox = store.fetch_all(USER2).await;
    assert_eq!(inbox.len(), 1);
    let got = &inbox[0];
    assert_eq!(got.id, sent.id);
    assert_eq!(got.sender, sent.sender);
    assert_eq!(got.subject, sent.subject);
    assert_eq!(got.text, sent.text);
    assert_eq!(got.recipients, sent.recipients);
}

#[tokio::test]
async fn fetch_all_preserves_storage_order() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir).await;

    for subject in ["a", "b", "c"] {
        store.deposit(USER2, &message_to(USER2, subject)).await.unwrap();
    }

    let subjects: Vec<_> = store
        .fetch_all(USER2)
        .await
        .into_iter()
        .map(|m| m.subject)
        .collect();
    assert_eq!(subjects, ["a", "b", "c"]);
}

#[tokio::test]
async fn fetch_since_returns_strictly_newer_messages() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir).await;

    let old = message_to(USER2, "old");
    store.deposit(USER2, &old).await.unwrap();
    let cutoff = old.timestamp;

    let mut at_cutoff = message_to(USER2, "at-cutoff");
    at_cutoff.timestamp = cutoff;
    store.deposit(USER2, &at_cutoff).await.unwrap();

    let mut newer = message_to(USER2, "newer");
    newer.timestamp = cutoff + chrono::Duration::seconds(1);
    store.deposit(USER2, &newer).await.unwrap();

    // Strictly after: the message stamped exactly at the cutoff stays out.
    let updates = store.fetch_since(USER2, Some(cutoff)).await;
    let subjects: Vec<_> = updates.into_iter().map(|m| m.subject).collect();
    assert_eq!(subjects, ["newer"]);
}

#[tokio::test]
async fn fetch_since_none_equals_fetch_all() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir).await;

    for subject in ["x", "y"] {
        store.deposit(USER3, &message_to(USER3, subject)).await.unwrap();
    }

    let all = store.fetch_all(USER3).await;
    let since_none = store.fetch_since(USER3, None).await;
    assert_eq!(all, since_none);
}

#[tokio::test]
async fn fetch_all_for_unknown_user_is_empty_not_error() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir).await;

    assert!(store.fetch_all("ghost@mail.com").await.is_empty());
    assert!(store.fetch_since("ghost@mail.com", Some(Utc::now())).await.is_empty());
}

#[tokio::test]
async fn delete_by_id_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir).await;

    let keep = message_to(USER2, "keep");
    let gone = message_to(USER2, "gone");
    store.deposit(USER2, &keep).await.unwrap();
    store.deposit(USER2, &gone).await.unwrap();

    store.delete_by_id(USER2, &gone.id).await.unwrap();
    let after_first = store.fetch_all(USER2).await;
    assert_eq!(after_first.len(), 1);
    assert_eq!(after_first[0].id, keep.id);

    // Second delete of the same id: still OK, mailbox unchanged.
    store.delete_by_id(USER2, &gone.id).await.unwrap();
    assert_eq!(store.fetch_all(USER2).await, after_first);
}

#[tokio::test]
async fn delete_in_one_mailbox_keeps_other_recipients_copy() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir).await;

    let message = Message::new(
        USER1,
        vec![USER2.to_string(), USER3.to_string()],
        "shared",
        "body",
    );
    store.deposit(USER2, &message).await.unwrap();
    store.deposit(USER3, &message).await.unwrap();

    store.delete_by_id(USER2, &message.id).await.unwrap();

    assert!(store.fetch_all(USER2).await.is_empty());
    let other = store.fetch_all(USER3).await;
    assert_eq!(other.len(), 1);
    assert_eq!(other[0].id, message.id);
}

#[tokio::test]
async fn timestamp_ties_are_both_retained() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir).await;

    let first = message_to(USER2, "tie-one");
    let mut second = message_to(USER2, "tie-two");
    second.timestamp = first.timestamp;

    store.deposit(USER2, &first).await.unwrap();
    store.deposit(USER2, &second).await.unwrap();

    let inbox = store.fetch_all(USER2).await;
    assert_eq!(inbox.len(), 2);
    assert!(inbox.iter().any(|m| m.id == first.id));
    assert!(inbox.iter().any(|m| m.id == second.id));
}

#[tokio::test]
async fn mark_read_persists_and_is_noop_when_already_read() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir).await;

    let message = message_to(USER2, "to-read");
    store.deposit(USER2, &message).await.unwrap();

    store.mark_read(USER2, &message.id).await.unwrap();
    let inbox = store.fetch_all(USER2).await;
    assert!(inbox[0].read);

    // Make the data directory unwritable: a second mark_read must not
    // attempt any write, so it still succeeds.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let readonly = std::fs::Permissions::from_mode(0o555);
        std::fs::set_permissions(dir.path(), readonly).unwrap();

        let result = store.mark_read(USER2, &message.id).await;

        let writable = std::fs::Permissions::from_mode(0o755);
        std::fs::set_permissions(dir.path(), writable).unwrap();

        result.expect("marking an already-read message must not rewrite the mailbox");
    }
    #[cfg(not(unix))]
    store.mark_read(USER2, &message.id).await.unwrap();

    assert!(store.fetch_all(USER2).await[0].read);
}

#[tokio::test]
async fn mark_read_of_absent_id_is_noop_ok() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir).await;

    store.mark_read(USER2, "no-such-id").await.unwrap();
    assert!(store.fetch_all(USER2).await.is_empty());
}

#[tokio::test]
async fn different_mailboxes_do_not_block_each_other() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(open_store(&dir).await);

    let mut tasks = tokio::task::JoinSet::new();
    for i in 0..50 {
        let store = store.clone();
        tasks.spawn(async move {
            if i % 2 == 0 {
                store
                    .deposit(USER2, &message_to(USER2, &format!("msg-{i}")))
                    .await
                    .unwrap();
            } else {
                let _ = store.fetch_all(USER3).await;
            }
        });
    }

    // Writers on one mailbox and readers on another must all finish
    // promptly; a cross-mailbox lock dependency would hang this.
    tokio::time::timeout(Duration::from_secs(10), async {
        while let Some(result) = tasks.join_next().await {
            result.unwrap();
        }
    })
    .await
    .expect("cross-mailbox operations blocked on each other");

    assert_eq!(store.fetch_all(USER2).await.len(), 25);
}

#[tokio::test]
async fn concurrent_deposits_to_one_mailbox_lose_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(open_store(&dir).await);

    let mut tasks = tokio::task::JoinSet::new();
    for i in 0..20 {
        let store = store.clone();
        tasks.spawn(async move {
            store
                .deposit(USER2, &message_to(USER2, &format!("concurrent-{i}")))
                .await
                .unwrap();
        });
    }
    while let Some(result) = tasks.join_next().await {
        result.unwrap();
    }

    // The exclusive per-user lock serializes the load-modify-store
    // cycle, so every deposit must survive.
    assert_eq!(store.fetch_all(USER2).await.len(), 20);
}

#[tokio::test]
async fn no_temp_files_left_behind_after_saves() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir).await;

    let message = message_to(USER2, "tmp-check");
    store.deposit(USER2, &message).await.unwrap();
    store.mark_read(USER2, &message.id).await.unwrap();
    store.delete_by_id(USER2, &message.id).await.unwrap();

    let leftovers: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_name().to_string_lossy().ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty(), "temporary files not cleaned up: {leftovers:?}");
}

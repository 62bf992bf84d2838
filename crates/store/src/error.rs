/*
 * SPDX-FileCopyrightText: 2025 Postino Project
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use thiserror::Error;

/// Storage faults surfaced at the store boundary.
///
/// These never escape as panics: the connection handler maps them to an
/// `ERROR` response on the write path, and the read path degrades to an
/// empty result after logging.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The address is not in the closed user registry.
    #[error("unknown mailbox: {0}")]
    UnknownUser(String),

    /// Reading or writing the mailbox file failed.
    #[error("mailbox i/o failure for {address}: {source}")]
    Io {
        address: String,
        #[source]
        source: std::io::Error,
    },

    /// The mailbox file exists but does not hold a valid message list.
    #[error("mailbox data corrupted for {address}: {source}")]
    Corrupt {
        address: String,
        #[source]
        source: serde_json::Error,
    },
}

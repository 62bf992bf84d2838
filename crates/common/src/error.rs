/*
 * SPDX-FileCopyrightText: 2025 Postino Project
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use thiserror::Error;

/// Errors raised while decoding a request into a [`crate::Command`].
///
/// These are validation failures: the connection handler reports them
/// inline in the response and never lets them tear down the session.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The command tag did not match any known operation.
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    /// A field the command requires was absent or null.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// The request line was not valid JSON for the wire schema.
    #[error("malformed request: {0}")]
    Malformed(#[from] serde_json::Error),
}

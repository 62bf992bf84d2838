/*
 * SPDX-FileCopyrightText: 2025 Postino Project
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

//! Wire-level request and response containers.
//!
//! One newline-terminated JSON [`Packet`] per connection in, one
//! newline-terminated JSON [`Response`] out. The raw packet is decoded
//! once into a typed [`Command`], which carries exactly the payload its
//! operation needs; unknown command tags are rejected at parse time
//! rather than falling through a dispatch table.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Message, ProtocolError};

/// The raw request container as it appears on the wire.
///
/// Field names are part of the protocol; absent fields are omitted when
/// serializing. `lastUpdateDate` being absent means "return everything".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Packet {
    pub command: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_email_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_update_date: Option<DateTime<Utc>>,
}

impl Packet {
    /// Builds a request carrying only a command and the acting user.
    pub fn for_user(command: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            user_email_address: Some(user.into()),
            ..Default::default()
        }
    }
}

/// A request decoded into its operation, payload attached.
#[derive(Debug, Clone)]
pub enum Command {
    SendEmail {
        email: Message,
    },
    GetUpdates {
        user: String,
        since: Option<DateTime<Utc>>,
    },
    DeleteEmail {
        user: String,
        id: String,
    },
    MarkAsRead {
        user: String,
        id: String,
    },
}

impl Command {
    /// Decodes a wire packet, checking that every field the operation
    /// requires is present.
    pub fn parse(packet: Packet) -> Result<Self, ProtocolError> {
        match packet.command.as_str() {
            "SEND_EMAIL" => {
                let email = packet.email.ok_or(ProtocolError::MissingField("email"))?;
                Ok(Command::SendEmail { email })
            }
            "GET_UPDATES" => {
                let user = packet
                    .user_email_address
                    .ok_or(ProtocolError::MissingField("userEmailAddress"))?;
                Ok(Command::GetUpdates {
                    user,
                    since: packet.last_update_date,
                })
            }
            "DELETE_EMAIL" => {
                let user = packet
                    .user_email_address
                    .ok_or(ProtocolError::MissingField("userEmailAddress"))?;
                let email = packet.email.ok_or(ProtocolError::MissingField("email"))?;
                Ok(Command::DeleteEmail { user, id: email.id })
            }
            "MARK_AS_READ" => {
                let user = packet
                    .user_email_address
                    .ok_or(ProtocolError::MissingField("userEmailAddress"))?;
                let email = packet.email.ok_or(ProtocolError::MissingField("email"))?;
                Ok(Command::MarkAsRead { user, id: email.id })
            }
            other => Err(ProtocolError::UnknownCommand(other.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Command::SendEmail { .. } => "SEND_EMAIL",
            Command::GetUpdates { .. } => "GET_UPDATES",
            Command::DeleteEmail { .. } => "DELETE_EMAIL",
            Command::MarkAsRead { .. } => "MARK_AS_READ",
        }
    }
}

/// Outcome code carried by every response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    #[serde(rename = "OK")]
    Ok,
    #[serde(rename = "ERROR")]
    Error,
    #[serde(rename = "PARTIAL_ERROR")]
    PartialError,
}

/// The response container written back to the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub outcome_code: Outcome,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub outcome_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub email_list: Option<Vec<Message>>,
}

impl Response {
    pub fn ok() -> Self {
        Self {
            outcome_code: Outcome::Ok,
            outcome_message: None,
            email_list: None,
        }
    }

    /// Success carrying a message list (GET_UPDATES only).
    pub fn ok_with_messages(messages: Vec<Message>) -> Self {
        Self {
            outcome_code: Outcome::Ok,
            outcome_message: None,
            email_list: Some(messages),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            outcome_code: Outcome::Error,
            outcome_message: Some(message.into()),
            email_list: None,
        }
    }

    pub fn partial_error(message: impl Into<String>) -> Self {
        Self {
            outcome_code: Outcome::PartialError,
            outcome_message: Some(message.into()),
            email_list: None,
        }
    }
}

/*
 * SPDX-FileCopyrightText: 2025 Postino Project
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

//! One-shot client for the mail core.
//!
//! Every call opens a fresh connection, writes one JSON request line,
//! reads one JSON response line and closes — there are no persistent
//! sockets. This is the surface interface collaborators (and the
//! integration tests) use: `login`, `poll`, `send`, `delete`,
//! `mark_read`. Addresses are syntax-checked locally before the server
//! is contacted at all.

use chrono::{DateTime, Utc};
use common::{Message, Outcome, Packet, Response, address};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tracing::debug;

use crate::error::ClientError;

#[derive(Debug, Clone)]
pub struct MailClient {
    addr: String,
}

impl MailClient {
    pub fn new(addr: impl Into<String>) -> Self {
        Self { addr: addr.into() }
    }

    /// Logs in by fetching the full mailbox: a `GET_UPDATES` with no
    /// `since` instant. Success means the address is a known user.
    pub async fn login(&self, user: &str) -> Result<Vec<Message>, ClientError> {
        if !address::is_valid_address(user) {
            return Err(ClientError::InvalidAddress(user.to_string()));
        }
        self.poll(user, None).await
    }

    /// Fetches the messages newer than `since`; `None` fetches
    /// everything.
    pub async fn poll(
        &self,
        user: &str,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<Message>, ClientError> {
        let mut packet = Packet::for_user("GET_UPDATES", user);
        packet.last_update_date = since;

        let response = self.roundtrip(&packet).await?;
        match response.outcome_code {
            Outcome::Ok => Ok(response.email_list.unwrap_or_default()),
            _ => Err(ClientError::Rejected(
                response
                    .outcome_message
                    .unwrap_or_else(|| "unspecified error".to_string()),
            )),
        }
    }

    /// Composes and submits a message. The returned response carries
    /// the delivery outcome, including partial-delivery detail.
    pub async fn send(
        &self,
        sender: &str,
        recipients: &[String],
        subject: &str,
        text: &str,
    ) -> Result<Response, ClientError> {
        if !address::is_valid_address(sender) {
            return Err(ClientError::InvalidAddress(sender.to_string()));
        }
        for recipient in recipients {
            if !address::is_valid_address(recipient) {
                return Err(ClientError::InvalidAddress(recipient.clone()));
            }
        }

        let email = Message::new(sender, recipients.to_vec(), subject, text);
        let packet = Packet {
            command: "SEND_EMAIL".into(),
            email: Some(email),
            user_email_address: Some(sender.to_string()),
            last_update_date: None,
        };
        self.roundtrip(&packet).await
    }

    /// Deletes one message from `user`'s mailbox.
    pub async fn delete(&self, user: &str, message: &Message) -> Result<Response, ClientError> {
        let packet = Packet {
            command: "DELETE_EMAIL".into(),
            email: Some(message.clone()),
            user_email_address: Some(user.to_string()),
            last_update_date: None,
        };
        self.roundtrip(&packet).await
    }

    /// Marks one message in `user`'s mailbox as read.
    pub async fn mark_read(&self, user: &str, message: &Message) -> Result<Response, ClientError> {
        let packet = Packet {
            command: "MARK_AS_READ".into(),
            email: Some(message.clone()),
            user_email_address: Some(user.to_string()),
            last_update_date: None,
        };
        self.roundtrip(&packet).await
    }

    async fn roundtrip(&self, packet: &Packet) -> Result<Response, ClientError> {
        let stream = TcpStream::connect(&self.addr).await?;
        let (read_half, mut write_half) = stream.into_split();

        let mut json = serde_json::to_vec(packet)?;
        json.push(b'\n');
        write_half.write_all(&json).await?;
        write_half.flush().await?;

        let mut reader = BufReader::new(read_half);
        let mut line = String::new();
        if reader.read_line(&mut line).await? == 0 {
            return Err(ClientError::NoResponse);
        }

        debug!(addr = %self.addr, command = %packet.command, "request round-trip complete");
        Ok(serde_json::from_str(&line)?)
    }
}

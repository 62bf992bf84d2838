/*
 * SPDX-FileCopyrightText: 2025 Postino Project
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

//! Per-connection protocol handling.
//!
//! A [`Session`] owns exactly one connection's lifecycle: read one
//! request line, dispatch, write one response line, close. Every
//! failure after parsing still produces a response with an error
//! outcome; only transport faults abort the exchange, and those affect
//! nothing beyond this one connection.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use common::{Command, Packet, Response};
use store::MailboxStore;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, BufWriter};
use tracing::{debug, info, warn};

pub struct Session {
    pub(crate) store: Arc<MailboxStore>,
    pub(crate) remote_addr: SocketAddr,
    pub(crate) session_id: u64,
    request_timeout: Duration,
}

impl Session {
    pub fn new(
        store: Arc<MailboxStore>,
        remote_addr: SocketAddr,
        session_id: u64,
        request_timeout: Duration,
    ) -> Self {
        Self {
            store,
            remote_addr,
            session_id,
            request_timeout,
        }
    }

    /// Runs the connection to completion.
    ///
    /// Generic over the stream so tests can drive a session through an
    /// in-memory duplex pipe.
    pub async fn handle<S>(self, stream: S)
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let (read_half, write_half) = tokio::io::split(stream);
        let mut reader = BufReader::new(read_half);
        let mut writer = BufWriter::new(write_half);

        let mut line = String::new();
        let response = match tokio::time::timeout(self.request_timeout, reader.read_line(&mut line)).await
        {
            Ok(Ok(0)) => {
                debug!(
                    session_id = self.session_id,
                    remote = %self.remote_addr,
                    "connection closed before a request arrived"
                );
                return;
            }
            Ok(Ok(_)) => self.respond(line.trim()).await,
            Ok(Err(err)) => {
                warn!(
                    session_id = self.session_id,
                    remote = %self.remote_addr,
                    error = %err,
                    "failed to read request"
                );
                return;
            }
            Err(_) => {
                warn!(
                    session_id = self.session_id,
                    remote = %self.remote_addr,
                    "request timed out"
                );
                Response::error("request timed out")
            }
        };

        if let Err(err) = write_response(&mut writer, &response).await {
            warn!(
                session_id = self.session_id,
                remote = %self.remote_addr,
                error = %err,
                "failed to write response"
            );
        }
    }

    /// Parses one request line and dispatches it to its operation.
    pub(crate) async fn respond(&self, line: &str) -> Response {
        let packet: Packet = match serde_json::from_str(line) {
            Ok(packet) => packet,
            Err(err) => {
                warn!(
                    session_id = self.session_id,
                    remote = %self.remote_addr,
                    error = %err,
                    "request is not valid JSON"
                );
                return Response::error(format!("malformed request: {err}"));
            }
        };

        let command = match Command::parse(packet) {
            Ok(command) => command,
            Err(err) => {
                warn!(
                    session_id = self.session_id,
                    remote = %self.remote_addr,
                    error = %err,
                    "request rejected at parse"
                );
                return Response::error(err.to_string());
            }
        };

        info!(
            session_id = self.session_id,
            remote = %self.remote_addr,
            command = command.name(),
            "request"
        );

        match command {
            Command::SendEmail { email } => self.send_email(email).await,
            Command::GetUpdates { user, since } => self.get_updates(&user, since).await,
            Command::DeleteEmail { user, id } => self.delete_email(&user, &id).await,
            Command::MarkAsRead { user, id } => self.mark_read(&user, &id).await,
        }
    }
}

async fn write_response<W>(writer: &mut W, response: &Response) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    // Compact JSON: the line is the frame, so the body must stay free
    // of raw newlines.
    let mut json = serde_json::to_vec(response).map_err(std::io::Error::other)?;
    json.push(b'\n');
    writer.write_all(&json).await?;
    writer.flush().await
}

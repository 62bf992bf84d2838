/*
 * SPDX-FileCopyrightText: 2025 Postino Project
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use std::collections::HashSet;

use common::{Message, Response, address};
use tracing::{error, info, warn};

use crate::Session;

impl Session {
    /// SEND_EMAIL: deliver a copy of the message to every valid
    /// recipient's mailbox.
    ///
    /// Recipients are deduplicated case-insensitively and partitioned:
    /// an address that fails the syntax check or is not a registered
    /// user counts as invalid, and each valid recipient is deposited
    /// independently so one storage fault cannot block the rest. The
    /// outcome is `OK` only when every recipient received a copy,
    /// `PARTIAL_ERROR` when some did, and `ERROR` when none did.
    pub(crate) async fn send_email(&self, email: Message) -> Response {
        if !address::is_valid_address(&email.sender) || !self.store.user_exists(&email.sender) {
            warn!(
                session_id = self.session_id,
                sender = %email.sender,
                "send rejected: invalid sender"
            );
            return Response::error("invalid sender or missing data");
        }
        if email.recipients.is_empty() {
            warn!(
                session_id = self.session_id,
                sender = %email.sender,
                "send rejected: no recipients"
            );
            return Response::error("no recipients specified");
        }

        let mut seen = HashSet::new();
        let mut delivered = Vec::new();
        let mut failed = Vec::new();

        for recipient in &email.recipients {
            if !seen.insert(address::normalize(recipient)) {
                continue;
            }

            // One rule for both causes: malformed syntax and an unknown
            // user are equally "invalid recipients".
            if !address::is_valid_address(recipient) || !self.store.user_exists(recipient) {
                failed.push(recipient.clone());
                continue;
            }

            match self.store.deposit(recipient, &email).await {
                Ok(()) => delivered.push(recipient.clone()),
                Err(err) => {
                    error!(
                        session_id = self.session_id,
                        recipient = %recipient,
                        error = %err,
                        "deposit failed"
                    );
                    failed.push(recipient.clone());
                }
            }
        }

        if failed.is_empty() {
            info!(
                session_id = self.session_id,
                sender = %email.sender,
                recipients = delivered.len(),
                id = %email.id,
                "message delivered"
            );
            Response::ok()
        } else if delivered.is_empty() {
            warn!(
                session_id = self.session_id,
                sender = %email.sender,
                failed = failed.len(),
                "send failed: no recipient reachable"
            );
            Response::error(format!(
                "no recipients could be delivered: {}",
                failed.join(", ")
            ))
        } else {
            warn!(
                session_id = self.session_id,
                sender = %email.sender,
                delivered = delivered.len(),
                failed = failed.len(),
                "partial delivery"
            );
            Response::partial_error(format!("undelivered recipients: {}", failed.join(", ")))
        }
    }
}

/*
 * SPDX-FileCopyrightText: 2025 Postino Project
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use common::Response;
use tracing::{error, info, warn};

use crate::Session;

impl Session {
    /// DELETE_EMAIL: remove one message from the acting user's mailbox.
    ///
    /// Idempotent; deleting an id that is already gone still answers
    /// `OK`. Only missing input or a storage fault is an error.
    pub(crate) async fn delete_email(&self, user: &str, id: &str) -> Response {
        if !self.store.user_exists(user) {
            warn!(session_id = self.session_id, user, "delete rejected: unknown user");
            return Response::error("unknown user");
        }

        match self.store.delete_by_id(user, id).await {
            Ok(()) => {
                info!(session_id = self.session_id, user, id, "message deleted");
                Response::ok()
            }
            Err(err) => {
                error!(
                    session_id = self.session_id,
                    user,
                    id,
                    error = %err,
                    "delete failed"
                );
                Response::error("could not delete message")
            }
        }
    }
}

/*
 * SPDX-FileCopyrightText: 2025 Postino Project
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use common::Response;
use tracing::{error, info, warn};

use crate::Session;

impl Session {
    /// MARK_AS_READ: flag one message in the acting user's mailbox as
    /// read. Re-marking a read message is a no-op that still succeeds.
    pub(crate) async fn mark_read(&self, user: &str, id: &str) -> Response {
        if !self.store.user_exists(user) {
            warn!(session_id = self.session_id, user, "mark-read rejected: unknown user");
            return Response::error("unknown user");
        }

        match self.store.mark_read(user, id).await {
            Ok(()) => {
                info!(session_id = self.session_id, user, id, "message marked read");
                Response::ok()
            }
            Err(err) => {
                error!(
                    session_id = self.session_id,
                    user,
                    id,
                    error = %err,
                    "mark-read failed"
                );
                Response::error("could not mark message as read")
            }
        }
    }
}

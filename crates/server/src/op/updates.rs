/*
 * SPDX-FileCopyrightText: 2025 Postino Project
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use chrono::{DateTime, Utc};
use common::Response;
use tracing::{info, warn};

use crate::Session;

impl Session {
    /// GET_UPDATES: return the messages newer than the client's last
    /// known instant, or the whole mailbox when no instant is given.
    ///
    /// An empty result is a normal success; the read path never fails
    /// the connection.
    pub(crate) async fn get_updates(&self, user: &str, since: Option<DateTime<Utc>>) -> Response {
        if !self.store.user_exists(user) {
            warn!(session_id = self.session_id, user, "updates rejected: unknown user");
            return Response::error("unknown user");
        }

        let messages = self.store.fetch_since(user, since).await;
        if !messages.is_empty() {
            info!(
                session_id = self.session_id,
                user,
                count = messages.len(),
                "delivering updates"
            );
        }
        Response::ok_with_messages(messages)
    }
}

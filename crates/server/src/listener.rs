/*
 * SPDX-FileCopyrightText: 2025 Postino Project
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

//! Connection acceptor.
//!
//! Binds the configured address, then hands every accepted connection
//! to a fresh [`Session`] task. Concurrency is bounded by a semaphore
//! acting as the reusable worker pool: when all permits are taken, the
//! accept loop waits instead of piling up unbounded tasks. A watch
//! channel signals shutdown.

use std::net::SocketAddr;
use std::sync::Arc;

use store::MailboxStore;
use tokio::net::TcpListener;
use tokio::sync::{Semaphore, watch};
use tracing::{info, warn};

use crate::{ServerConfig, ServerError, Session};

pub struct Listener {
    listener: TcpListener,
    config: ServerConfig,
    store: Arc<MailboxStore>,
}

impl Listener {
    /// Binds the configured listen address.
    pub async fn bind(config: ServerConfig, store: Arc<MailboxStore>) -> Result<Self, ServerError> {
        let addr = config.listen_addr();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|source| ServerError::Bind { addr, source })?;

        if let Ok(local) = listener.local_addr() {
            info!(addr = %local, "listening");
        }
        Ok(Self {
            listener,
            config,
            store,
        })
    }

    /// The actually bound address; useful when the configured port is 0.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accepts connections until `shutdown` fires.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let limiter = Arc::new(Semaphore::new(self.config.net.max_connections));
        let request_timeout = self.config.request_timeout();
        let mut session_id: u64 = 0;

        loop {
            // A worker slot must be free before we even accept.
            let permit = tokio::select! {
                _ = shutdown.changed() => break,
                permit = limiter.clone().acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => break,
                },
            };

            let (stream, peer) = tokio::select! {
                _ = shutdown.changed() => break,
                accepted = self.listener.accept() => match accepted {
                    Ok(conn) => conn,
                    Err(err) => {
                        warn!(error = %err, "accept failed");
                        continue;
                    }
                },
            };

            session_id += 1;
            let session = Session::new(self.store.clone(), peer, session_id, request_timeout);
            tokio::spawn(async move {
                let _permit = permit;
                session.handle(stream).await;
            });
        }

        info!("listener stopped");
    }
}

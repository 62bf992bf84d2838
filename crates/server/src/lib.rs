/*
 * SPDX-FileCopyrightText: 2025 Postino Project
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

//! Mail-core server: per-connection protocol handling and the
//! connection acceptor.
//!
//! A connection carries exactly one newline-terminated JSON request and
//! receives exactly one newline-terminated JSON response before the
//! server closes it. [`session::Session`] owns that lifecycle,
//! [`listener::Listener`] accepts connections into a bounded worker
//! pool, and [`client::MailClient`] is the one-shot counterpart used by
//! interface collaborators and the integration tests.

pub mod client;
pub mod config;
pub mod error;
pub mod listener;
pub mod op;
pub mod session;

pub use client::MailClient;
pub use config::ServerConfig;
pub use error::{ClientError, ConfigError, ServerError};
pub use listener::Listener;
pub use session::Session;

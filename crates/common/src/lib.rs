/*
 * SPDX-FileCopyrightText: 2025 Postino Project
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

//! Shared envelope and wire types for the mail core.
//!
//! Everything that travels between client and server lives here: the
//! [`Message`] envelope, the JSON wire containers ([`Packet`] and
//! [`Response`]), the parsed [`Command`] variants, and the address
//! syntax predicate used on both sides of the connection.

pub mod address;
pub mod error;
pub mod message;
pub mod wire;

pub use error::ProtocolError;
pub use message::Message;
pub use wire::{Command, Outcome, Packet, Response};

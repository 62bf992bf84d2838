/*
 * SPDX-FileCopyrightText: 2025 Postino Project
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

//! One module per protocol operation, each implemented as a method on
//! [`crate::Session`] returning the wire response.

mod delete;
mod mark_read;
mod send;
mod updates;

/*
 * SPDX-FileCopyrightText: 2025 Postino Project
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

//! Address syntax validation.
//!
//! Both sides of the wire use the same predicate: clients check
//! addresses before contacting the server, and the server treats a
//! syntax failure the same as an unknown user when partitioning
//! recipients.

/// Returns `true` if `address` is a syntactically valid mail address.
///
/// Accepted shape: a non-empty local part of ASCII alphanumerics plus
/// `+`, `_`, `.`, `-`, a single `@`, and a non-empty domain of ASCII
/// alphanumerics plus `.`, `-`.
pub fn is_valid_address(address: &str) -> bool {
    let Some((local, domain)) = address.split_once('@') else {
        return false;
    };

    !local.is_empty()
        && !domain.is_empty()
        && local
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '_' | '.' | '-'))
        && domain
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-'))
}

/// Lowercases an address for registry lookups and storage keys.
///
/// Membership in the user registry is case-insensitive; message bodies
/// keep the sender/recipient strings exactly as submitted.
pub fn normalize(address: &str) -> String {
    address.to_ascii_lowercase()
}

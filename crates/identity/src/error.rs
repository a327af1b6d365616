// SPDX-FileCopyrightText: © 2026 Edge Mesh SDK Contributors
//
// SPDX-License-Identifier: MPL-2.0

use thiserror::Error;

/// Failure modes owned by the identity/crypto façade.
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("signing failed: {0}")]
    Sign(String),

    #[error("failed to decrypt payload for self: {0}")]
    Decrypt(String),

    #[error("address {0:?} is not a recognized public key")]
    UnknownAddress(String),

    #[error("no recipients supplied for encryption")]
    NoRecipients,
}

pub type Result<T> = std::result::Result<T, IdentityError>;

// SPDX-FileCopyrightText: © 2026 Edge Mesh SDK Contributors
//
// SPDX-License-Identifier: MPL-2.0

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EnvelopeError {
    #[error("inbound frame is not decodable: {0}")]
    Parse(String),

    #[error("encrypted-for-us payload failed to decrypt or parse: {0}")]
    Decrypt(String),
}

pub type Result<T> = std::result::Result<T, EnvelopeError>;

// SPDX-FileCopyrightText: © 2026 Edge Mesh SDK Contributors
//
// SPDX-License-Identifier: MPL-2.0

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransactionError {
    #[error("transaction timed out before every required response arrived")]
    TimedOut,
}

pub type Result<T> = std::result::Result<T, TransactionError>;

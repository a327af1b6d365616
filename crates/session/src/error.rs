// SPDX-FileCopyrightText: © 2026 Edge Mesh SDK Contributors
//
// SPDX-License-Identifier: MPL-2.0

use thiserror::Error;

/// The closed error-kind taxonomy surfaced to callers.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("required connection parameter missing: {0}")]
    ConfigMissing(String),

    #[error("inbound frame could not be parsed")]
    ParseError,

    #[error("encrypted payload failed to decrypt: {0}")]
    DecryptError(String),

    #[error("outbound command targets an unresolved address: {0}")]
    AddressUnresolved(String),

    #[error("transaction timed out before completion")]
    TransactionTimeout,

    #[error("broker is disconnected")]
    BrokerDisconnected,

    #[error("envelope addressed to this node but sender not whitelisted")]
    Unauthorized,

    #[error(transparent)]
    Config(#[from] meshsdk_config::ConfigError),

    #[error(transparent)]
    Identity(#[from] meshsdk_identity::IdentityError),

    #[error(transparent)]
    Broker(#[from] meshsdk_broker::BrokerError),
}

pub type Result<T> = std::result::Result<T, SessionError>;

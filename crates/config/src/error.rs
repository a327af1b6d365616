// SPDX-FileCopyrightText: © 2026 Edge Mesh SDK Contributors
//
// SPDX-License-Identifier: MPL-2.0

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("required connection parameter could not be resolved: {0}")]
    Missing(String),

    #[error("failed to load configuration: {0}")]
    Load(#[from] Box<figment::Error>),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Error taxonomy for ledger operations.
//!
//! Services return [`LedgerError`]; the CLI wraps it in `anyhow` and prints
//! the message.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LedgerError {
    /// Caller supplied invalid or out-of-range input
    #[error("Validation error: {0}")]
    Validation(String),

    /// The operation would break a referential or business invariant
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Required configuration (API key, data dir, ...) is absent or malformed
    #[error("Configuration error: {0}")]
    Config(String),

    /// The exchange-rate service failed or returned an error payload
    #[error("Exchange-rate service error: {0}")]
    ExternalService(String),

    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// Stored data violates a structural invariant (category cycle, dangling parent)
    #[error("Data integrity error: {0}")]
    Integrity(String),

    #[error(transparent)]
    Database(#[from] rusqlite::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl LedgerError {
    pub fn not_found(entity_type: &'static str, identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            identifier: identifier.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }

    pub fn is_integrity(&self) -> bool {
        matches!(self, Self::Integrity(_))
    }
}

impl From<reqwest::Error> for LedgerError {
    fn from(err: reqwest::Error) -> Self {
        Self::ExternalService(err.to_string())
    }
}

impl From<config::ConfigError> for LedgerError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

pub type LedgerResult<T> = Result<T, LedgerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_names_entity() {
        let err = LedgerError::not_found("Wallet", "w-1");
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Wallet not found: w-1");
    }
}

// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use thiserror::Error;

/// Errors surfaced by encryption operations.
#[derive(Debug, Error)]
pub enum EncryptError {
    /// The session is degraded: the runtime never came up and every
    /// operation fails fast with the recorded bootstrap error.
    #[error("encryption unavailable: {0}")]
    Unavailable(String),

    #[error("value {value} exceeds the {bits}-bit input limit")]
    OutOfRange { value: u64, bits: u32 },

    #[error("encryption failed: {0}")]
    Encryption(String),
}

/// Bootstrap failures, split the way the retry loop consumes them: transient
/// failures are retried against the budget, fatal ones degrade immediately.
#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("{0}")]
    Transient(String),

    #[error("{0}")]
    Fatal(String),
}

impl BootstrapError {
    pub fn is_transient(&self) -> bool {
        matches!(self, BootstrapError::Transient(_))
    }

    pub fn message(&self) -> &str {
        match self {
            BootstrapError::Transient(msg) | BootstrapError::Fatal(msg) => msg,
        }
    }
}

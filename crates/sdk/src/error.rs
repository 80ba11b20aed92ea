// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use svb_fhe::EncryptError;
use thiserror::Error;

/// Failure taxonomy of the submission pipeline. Everything before the
/// contract call is local validation or an unavailable dependency; once the
/// transaction is broadcast only chain-side failures remain.
#[derive(Debug, Error)]
pub enum BetError {
    #[error("unrecognized team selection: {0:?} (expected home, away or draw)")]
    InvalidSelection(String),

    #[error("invalid stake amount {0:?}: {1}")]
    InvalidStake(String, String),

    #[error("scaled stake of {scaled} base units exceeds the 32-bit input limit")]
    StakeExceedsLimit { scaled: u128 },

    #[error("signer unavailable: {0}")]
    Wallet(String),

    #[error(transparent)]
    Encryption(#[from] EncryptError),

    #[error("contract call failed: {0}")]
    Chain(String),

    #[error("transaction confirmed but no bet-placed event was emitted")]
    MissingEvent,
}

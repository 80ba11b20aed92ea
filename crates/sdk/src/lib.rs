// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

//! Client SDK for the encrypted betting contract: stake validation, the
//! bet-submission pipeline, the read-only query layer and vault operations.

mod bets;
mod error;
mod games;
mod vault;
pub mod wire;

pub use bets::*;
pub use error::*;
pub use games::*;
pub use vault::*;

use svb_config::ChainConfig;
use svb_evm_helpers::wallet::ChainSpec;

/// Wallet-facing chain metadata from the loaded configuration.
pub fn chain_spec(config: &ChainConfig) -> anyhow::Result<ChainSpec> {
    Ok(ChainSpec {
        chain_id: config.chain_id,
        name: config.name.clone(),
        rpc_url: config.rpc_url()?.as_str().to_string(),
        currency_symbol: config.currency_symbol.clone(),
        explorer_url: (!config.explorer_url.is_empty()).then(|| config.explorer_url.clone()),
    })
}

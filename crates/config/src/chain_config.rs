// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::{contract::ContractAddresses, rpc::RPC};
use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

/// Target chain description. `explorer_url` and `currency_symbol` are the
/// metadata handed to a wallet when the chain has to be registered before
/// switching to it.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ChainConfig {
    pub name: String,
    pub chain_id: u64,
    pub rpc_url: String,
    pub relayer_url: String,
    pub explorer_url: String,
    pub currency_symbol: String,
    pub contracts: ContractAddresses,
}

impl ChainConfig {
    pub fn rpc_url(&self) -> Result<RPC> {
        RPC::from_url(&self.rpc_url)
            .map_err(|e| anyhow!("Failed to parse RPC URL for chain {}: {}", self.name, e))
    }

    pub fn relayer_url(&self) -> Result<RPC> {
        RPC::from_url(&self.relayer_url)
            .map_err(|e| anyhow!("Failed to parse relayer URL for chain {}: {}", self.name, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::Contract;

    fn sepolia() -> ChainConfig {
        ChainConfig {
            name: "sepolia".to_string(),
            chain_id: 11155111,
            rpc_url: "https://rpc.sepolia.org".to_string(),
            relayer_url: "https://relayer.testnet.example.org".to_string(),
            explorer_url: "https://sepolia.etherscan.io".to_string(),
            currency_symbol: "ETH".to_string(),
            contracts: ContractAddresses {
                vault_bet: Contract::AddressOnly("0x81C6".to_string()),
                usdc_token: Contract::AddressOnly("0x9B89".to_string()),
            },
        }
    }

    #[test]
    fn validates_rpc_and_relayer_urls() {
        let config = sepolia();
        assert!(config.rpc_url().is_ok());
        assert!(config.relayer_url().is_ok());

        let mut broken = sepolia();
        broken.rpc_url = "ftp://nope".to_string();
        assert!(broken.rpc_url().is_err());
    }
}

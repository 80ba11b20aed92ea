// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use std::sync::Arc;
use svb_config::AppConfig;
use svb_evm_helpers::contracts::{
    ReadOnly, ReadWrite, UsdcContract, VaultBetContract, VaultContractFactory,
};
use svb_evm_helpers::wallet::{ChainSpec, SwitchChainError, WalletRpc};
use svb_fhe::{EncryptionSession, RelayerBootstrap, RelayerClient, RetryPolicy};

pub const PRIVATE_KEY_ENV: &str = "PRIVATE_KEY";

pub fn to_anyhow(e: eyre::Report) -> anyhow::Error {
    anyhow!("{e:#}")
}

/// Builds the clients a command needs out of the loaded configuration.
pub struct AppContext {
    config: AppConfig,
}

impl AppContext {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    pub fn vault_address(&self) -> Result<Address> {
        self.config
            .chain
            .contracts
            .vault_bet
            .address()
            .parse()
            .context("Invalid betting contract address in configuration")
    }

    pub fn signer(&self) -> Result<PrivateKeySigner> {
        let key = std::env::var(PRIVATE_KEY_ENV)
            .with_context(|| format!("Set {PRIVATE_KEY_ENV} to sign transactions"))?;
        key.parse()
            .context("Invalid private key in environment")
    }

    fn rpc_url(&self) -> Result<String> {
        Ok(self.config.chain.rpc_url()?.as_str().to_string())
    }

    pub async fn read_contract(&self) -> Result<Arc<VaultBetContract<ReadOnly>>> {
        let contract = VaultContractFactory::create_read(
            &self.rpc_url()?,
            self.config.chain.contracts.vault_bet.address(),
        )
        .await
        .map_err(to_anyhow)?;
        Ok(Arc::new(contract))
    }

    pub async fn write_contract(&self) -> Result<Arc<VaultBetContract<ReadWrite>>> {
        let key = std::env::var(PRIVATE_KEY_ENV)
            .with_context(|| format!("Set {PRIVATE_KEY_ENV} to sign transactions"))?;
        let contract = VaultContractFactory::create_write(
            &self.rpc_url()?,
            self.config.chain.contracts.vault_bet.address(),
            &key,
        )
        .await
        .map_err(to_anyhow)?;
        Ok(Arc::new(contract))
    }

    pub async fn usdc_read_contract(&self) -> Result<Arc<UsdcContract<ReadOnly>>> {
        let contract = VaultContractFactory::create_usdc_read(
            &self.rpc_url()?,
            self.config.chain.contracts.usdc_token.address(),
        )
        .await
        .map_err(to_anyhow)?;
        Ok(Arc::new(contract))
    }

    pub async fn usdc_contract(&self) -> Result<Arc<UsdcContract<ReadWrite>>> {
        let key = std::env::var(PRIVATE_KEY_ENV)
            .with_context(|| format!("Set {PRIVATE_KEY_ENV} to sign transactions"))?;
        let contract = VaultContractFactory::create_usdc_write(
            &self.rpc_url()?,
            self.config.chain.contracts.usdc_token.address(),
            &key,
        )
        .await
        .map_err(to_anyhow)?;
        Ok(Arc::new(contract))
    }

    /// Process-wide encryption session bootstrapped against the relayer.
    pub fn session(&self) -> Result<Arc<EncryptionSession>> {
        let relayer = RelayerClient::new(self.config.chain.relayer_url()?.as_str());
        Ok(Arc::new(EncryptionSession::new(
            Arc::new(RelayerBootstrap::new(relayer)),
            RetryPolicy::default(),
        )))
    }

    pub fn local_wallet(
        &self,
        contract: &VaultBetContract<ReadWrite>,
    ) -> Result<Arc<dyn WalletRpc>> {
        Ok(Arc::new(LocalWalletRpc {
            provider: contract.get_provider(),
            address: self.signer()?.address(),
        }))
    }
}

/// Wallet surface over a local private key. The signer cannot move the node
/// to another chain, so a mismatch is surfaced instead of switched.
struct LocalWalletRpc {
    provider: Arc<svb_evm_helpers::contracts::VaultWriteProvider>,
    address: Address,
}

#[async_trait]
impl WalletRpc for LocalWalletRpc {
    async fn request_accounts(&self) -> eyre::Result<Vec<Address>> {
        Ok(vec![self.address])
    }

    async fn chain_id(&self) -> eyre::Result<u64> {
        use alloy::providers::Provider;
        let id = self.provider.get_chain_id().await?;
        Ok(id)
    }

    async fn switch_chain(&self, chain_id: u64) -> Result<(), SwitchChainError> {
        Err(SwitchChainError::Other(format!(
            "local signer cannot switch the node to chain {chain_id}; point the RPC URL at the right network"
        )))
    }

    async fn add_chain(&self, _spec: &ChainSpec) -> eyre::Result<()> {
        Ok(())
    }
}

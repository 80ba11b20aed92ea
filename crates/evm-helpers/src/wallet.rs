// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use alloy::primitives::Address;
use alloy::providers::Provider;
use async_trait::async_trait;
use eyre::{eyre, Result};
use serde_json::json;
use thiserror::Error;
use tracing::info;

/// Chain metadata handed to the wallet when the target chain has to be
/// registered before switching.
#[derive(Debug, Clone)]
pub struct ChainSpec {
    pub chain_id: u64,
    pub name: String,
    pub rpc_url: String,
    pub currency_symbol: String,
    pub explorer_url: Option<String>,
}

#[derive(Debug, Error)]
pub enum SwitchChainError {
    /// EIP-4902: the wallet has never seen this chain and needs it added.
    #[error("chain not registered with the wallet")]
    UnrecognizedChain,
    #[error("chain switch failed: {0}")]
    Other(String),
}

/// Wallet-facing RPC surface. Kept as a trait so the signer guard can be
/// exercised against a scripted wallet.
#[async_trait]
pub trait WalletRpc: Send + Sync {
    async fn request_accounts(&self) -> Result<Vec<Address>>;
    async fn chain_id(&self) -> Result<u64>;
    async fn switch_chain(&self, chain_id: u64) -> Result<(), SwitchChainError>;
    async fn add_chain(&self, spec: &ChainSpec) -> Result<()>;
}

/// Confirm an unlocked account and the expected chain before any write.
/// A wallet on the wrong chain is switched; a wallet that does not know the
/// chain gets it registered, then one more switch attempt. Returns the
/// account every subsequent transaction is sent from.
pub async fn ensure_signer_ready(wallet: &dyn WalletRpc, target: &ChainSpec) -> Result<Address> {
    let accounts = wallet.request_accounts().await?;
    let account = *accounts
        .first()
        .ok_or_else(|| eyre!("no wallet account available"))?;

    let current = wallet.chain_id().await?;
    if current == target.chain_id {
        return Ok(account);
    }

    info!(
        from = current,
        to = target.chain_id,
        chain = %target.name,
        "Wallet on wrong chain, requesting switch"
    );
    match wallet.switch_chain(target.chain_id).await {
        Ok(()) => {}
        Err(SwitchChainError::UnrecognizedChain) => {
            wallet.add_chain(target).await?;
            wallet
                .switch_chain(target.chain_id)
                .await
                .map_err(|e| eyre!("chain switch failed after registration: {e}"))?;
        }
        Err(e) => return Err(eyre!(e)),
    }

    // Switching is wallet-mediated; trust the reported chain, not the call.
    let now = wallet.chain_id().await?;
    if now != target.chain_id {
        return Err(eyre!(
            "wallet reports chain {now} after switch, expected {}",
            target.chain_id
        ));
    }
    Ok(account)
}

/// Wallet RPC over a node or browser bridge that exposes the `wallet_*`
/// methods alongside the standard ethereum namespace.
pub struct ProviderWalletRpc<P> {
    provider: P,
}

impl<P> ProviderWalletRpc<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl<P> WalletRpc for ProviderWalletRpc<P>
where
    P: Provider + Send + Sync,
{
    async fn request_accounts(&self) -> Result<Vec<Address>> {
        self.provider
            .raw_request("eth_requestAccounts".into(), ())
            .await
            .map_err(Into::into)
    }

    async fn chain_id(&self) -> Result<u64> {
        let id = self.provider.get_chain_id().await?;
        Ok(id)
    }

    async fn switch_chain(&self, chain_id: u64) -> Result<(), SwitchChainError> {
        let params = json!([{ "chainId": format!("{chain_id:#x}") }]);
        let result: Result<serde_json::Value, _> = self
            .provider
            .raw_request("wallet_switchEthereumChain".into(), params)
            .await;
        match result {
            Ok(_) => Ok(()),
            Err(e) => {
                let msg = e.to_string();
                if msg.contains("4902") || msg.contains("Unrecognized chain") {
                    Err(SwitchChainError::UnrecognizedChain)
                } else {
                    Err(SwitchChainError::Other(msg))
                }
            }
        }
    }

    async fn add_chain(&self, spec: &ChainSpec) -> Result<()> {
        let mut entry = json!({
            "chainId": format!("{:#x}", spec.chain_id),
            "chainName": spec.name,
            "rpcUrls": [spec.rpc_url],
            "nativeCurrency": {
                "name": spec.currency_symbol,
                "symbol": spec.currency_symbol,
                "decimals": 18,
            },
        });
        if let Some(explorer) = &spec.explorer_url {
            entry["blockExplorerUrls"] = json!([explorer]);
        }
        let _: serde_json::Value = self
            .provider
            .raw_request("wallet_addEthereumChain".into(), json!([entry]))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Mutex;

    fn sepolia() -> ChainSpec {
        ChainSpec {
            chain_id: 11155111,
            name: "Sepolia".to_string(),
            rpc_url: "https://rpc.sepolia.org".to_string(),
            currency_symbol: "ETH".to_string(),
            explorer_url: Some("https://sepolia.etherscan.io".to_string()),
        }
    }

    struct ScriptedWallet {
        chain: AtomicU64,
        known_chains: Mutex<Vec<u64>>,
        accounts: Vec<Address>,
        calls: Mutex<Vec<&'static str>>,
    }

    impl ScriptedWallet {
        fn on_chain(chain_id: u64) -> Self {
            Self {
                chain: AtomicU64::new(chain_id),
                known_chains: Mutex::new(vec![chain_id]),
                accounts: vec![Address::from([0x42; 20])],
                calls: Mutex::new(Vec::new()),
            }
        }

        fn knowing(self, chain_id: u64) -> Self {
            self.known_chains.lock().unwrap().push(chain_id);
            self
        }

        fn calls(&self) -> Vec<&'static str> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl WalletRpc for ScriptedWallet {
        async fn request_accounts(&self) -> Result<Vec<Address>> {
            self.calls.lock().unwrap().push("accounts");
            Ok(self.accounts.clone())
        }

        async fn chain_id(&self) -> Result<u64> {
            Ok(self.chain.load(Ordering::SeqCst))
        }

        async fn switch_chain(&self, chain_id: u64) -> Result<(), SwitchChainError> {
            self.calls.lock().unwrap().push("switch");
            if !self.known_chains.lock().unwrap().contains(&chain_id) {
                return Err(SwitchChainError::UnrecognizedChain);
            }
            self.chain.store(chain_id, Ordering::SeqCst);
            Ok(())
        }

        async fn add_chain(&self, spec: &ChainSpec) -> Result<()> {
            self.calls.lock().unwrap().push("add");
            self.known_chains.lock().unwrap().push(spec.chain_id);
            Ok(())
        }
    }

    #[tokio::test]
    async fn correct_chain_needs_no_switch() {
        let wallet = ScriptedWallet::on_chain(11155111);
        let account = ensure_signer_ready(&wallet, &sepolia()).await.unwrap();
        assert_eq!(account, Address::from([0x42; 20]));
        assert_eq!(wallet.calls(), vec!["accounts"]);
    }

    #[tokio::test]
    async fn wrong_chain_is_switched() {
        let wallet = ScriptedWallet::on_chain(1).knowing(11155111);
        ensure_signer_ready(&wallet, &sepolia()).await.unwrap();
        assert_eq!(wallet.calls(), vec!["accounts", "switch"]);
        assert_eq!(wallet.chain_id().await.unwrap(), 11155111);
    }

    #[tokio::test]
    async fn unknown_chain_is_registered_then_switched() {
        let wallet = ScriptedWallet::on_chain(1);
        ensure_signer_ready(&wallet, &sepolia()).await.unwrap();
        assert_eq!(wallet.calls(), vec!["accounts", "switch", "add", "switch"]);
        assert_eq!(wallet.chain_id().await.unwrap(), 11155111);
    }

    #[tokio::test]
    async fn missing_account_is_an_error() {
        let mut wallet = ScriptedWallet::on_chain(11155111);
        wallet.accounts.clear();
        let err = ensure_signer_ready(&wallet, &sepolia()).await.unwrap_err();
        assert!(err.to_string().contains("no wallet account"));
    }

    struct StubbornWallet;

    #[async_trait]
    impl WalletRpc for StubbornWallet {
        async fn request_accounts(&self) -> Result<Vec<Address>> {
            Ok(vec![Address::from([0x42; 20])])
        }

        async fn chain_id(&self) -> Result<u64> {
            Ok(1)
        }

        async fn switch_chain(&self, _chain_id: u64) -> Result<(), SwitchChainError> {
            // Wallet claims success but stays on the old chain.
            Ok(())
        }

        async fn add_chain(&self, _spec: &ChainSpec) -> Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn stale_chain_after_switch_is_an_error() {
        let err = ensure_signer_ready(&StubbornWallet, &sepolia())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("expected 11155111"));
    }
}

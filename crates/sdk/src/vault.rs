// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::bets::parse_usdc_units;
use crate::error::BetError;
use alloy::primitives::{Address, U256};
use eyre::Result;
use std::sync::Arc;
use svb_evm_helpers::contracts::{TxOutcome, UsdcOps, UsdcRead, VaultBetRead, VaultBetWrite};
use tracing::info;

/// Vault and token operations around the betting contract. The vault is the
/// contract-held balance bets are funded from; it is filled by an ERC20
/// approve followed by a deposit.
pub struct VaultClient {
    vault_address: Address,
    contract_read: Arc<dyn VaultBetRead + Send + Sync>,
    contract_write: Arc<dyn VaultBetWrite + Send + Sync>,
    usdc: Arc<dyn UsdcOps + Send + Sync>,
}

impl VaultClient {
    pub fn new(
        vault_address: Address,
        contract_read: Arc<dyn VaultBetRead + Send + Sync>,
        contract_write: Arc<dyn VaultBetWrite + Send + Sync>,
        usdc: Arc<dyn UsdcOps + Send + Sync>,
    ) -> Self {
        Self {
            vault_address,
            contract_read,
            contract_write,
            usdc,
        }
    }

    /// Contract-held balance, in USDC base units.
    pub async fn balance(&self, user: Address) -> Result<U256> {
        self.contract_read.get_vault_balance(user).await
    }

    /// Wallet-held token balance, in USDC base units.
    pub async fn usdc_balance(&self, user: Address) -> Result<U256> {
        self.usdc.balance_of(user).await
    }

    /// Approve then deposit. Two separate transactions; a failed deposit
    /// leaves the allowance standing, which is harmless.
    pub async fn deposit(&self, amount_usdc: &str) -> Result<TxOutcome> {
        let units = to_units(amount_usdc)?;
        self.usdc.approve(self.vault_address, units).await?;
        let outcome = self.contract_write.deposit_to_vault(units).await?;
        info!(amount = %amount_usdc, tx = %outcome.tx_hash, "Vault deposit confirmed");
        Ok(outcome)
    }

    pub async fn withdraw(&self, amount_usdc: &str) -> Result<TxOutcome> {
        let units = to_units(amount_usdc)?;
        let outcome = self.contract_write.withdraw_from_vault(units).await?;
        info!(amount = %amount_usdc, tx = %outcome.tx_hash, "Vault withdrawal confirmed");
        Ok(outcome)
    }

    /// Mint test tokens to a wallet. Testnet convenience only.
    pub async fn faucet(&self, to: Address, amount_usdc: &str) -> Result<TxOutcome> {
        let units = to_units(amount_usdc)?;
        self.usdc.faucet(to, units).await
    }
}

fn to_units(amount_usdc: &str) -> Result<U256> {
    let units = parse_usdc_units(amount_usdc).map_err(|e| eyre::eyre!(e))?;
    if units == 0 {
        return Err(eyre::eyre!(BetError::InvalidStake(
            amount_usdc.to_string(),
            "amount must be positive".to_string(),
        )));
    }
    Ok(U256::from(units))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{Bytes, B256};
    use async_trait::async_trait;
    use std::sync::Mutex;
    use svb_evm_helpers::contracts::{BetRecord, GameRecord, GameStatus};

    #[derive(Default)]
    struct Ledger {
        calls: Mutex<Vec<String>>,
    }

    impl Ledger {
        fn record(&self, call: impl Into<String>) {
            self.calls.lock().unwrap().push(call.into());
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl UsdcRead for Ledger {
        async fn balance_of(&self, _account: Address) -> Result<U256> {
            Ok(U256::from(9))
        }
    }

    #[async_trait]
    impl UsdcOps for Ledger {
        async fn approve(&self, spender: Address, amount: U256) -> Result<TxOutcome> {
            self.record(format!("approve {spender} {amount}"));
            Ok(TxOutcome::default())
        }

        async fn faucet(&self, _to: Address, amount: U256) -> Result<TxOutcome> {
            self.record(format!("faucet {amount}"));
            Ok(TxOutcome::default())
        }
    }

    #[async_trait]
    impl VaultBetWrite for Ledger {
        async fn place_bet(
            &self,
            _game_id: U256,
            _handles: Vec<B256>,
            _input_proof: Bytes,
            _usdc_amount: U256,
        ) -> Result<TxOutcome> {
            unimplemented!("not exercised here")
        }

        async fn create_game(
            &self,
            _home_team: String,
            _away_team: String,
            _start_time: U256,
            _end_time: U256,
        ) -> Result<TxOutcome> {
            unimplemented!("not exercised here")
        }

        async fn deposit_to_vault(&self, amount: U256) -> Result<TxOutcome> {
            self.record(format!("deposit {amount}"));
            Ok(TxOutcome::default())
        }

        async fn withdraw_from_vault(&self, amount: U256) -> Result<TxOutcome> {
            self.record(format!("withdraw {amount}"));
            Ok(TxOutcome::default())
        }
    }

    #[async_trait]
    impl VaultBetRead for Ledger {
        async fn get_game_count(&self) -> Result<U256> {
            Ok(U256::ZERO)
        }

        async fn get_game(&self, _index: U256) -> Result<GameRecord> {
            unimplemented!("not exercised here")
        }

        async fn get_game_basic_info(&self, _game_id: U256) -> Result<GameStatus> {
            unimplemented!("not exercised here")
        }

        async fn get_bet_count(&self) -> Result<U256> {
            Ok(U256::ZERO)
        }

        async fn get_bet_basic_info(&self, _bet_id: U256) -> Result<BetRecord> {
            unimplemented!("not exercised here")
        }

        async fn get_vault_balance(&self, _user: Address) -> Result<U256> {
            Ok(U256::from(123))
        }
    }

    fn client(ledger: Arc<Ledger>) -> VaultClient {
        VaultClient::new(
            Address::from([0xAA; 20]),
            ledger.clone(),
            ledger.clone(),
            ledger,
        )
    }

    #[tokio::test]
    async fn deposit_approves_before_depositing() {
        let ledger = Arc::new(Ledger::default());
        client(ledger.clone()).deposit("25.5").await.unwrap();

        let calls = ledger.calls();
        assert_eq!(calls.len(), 2);
        assert!(calls[0].starts_with("approve"));
        assert!(calls[0].ends_with("25500000"));
        assert_eq!(calls[1], "deposit 25500000");
    }

    #[tokio::test]
    async fn withdraw_scales_to_base_units() {
        let ledger = Arc::new(Ledger::default());
        client(ledger.clone()).withdraw("100").await.unwrap();
        assert_eq!(ledger.calls(), vec!["withdraw 100000000"]);
    }

    #[tokio::test]
    async fn zero_amount_is_rejected_locally() {
        let ledger = Arc::new(Ledger::default());
        let err = client(ledger.clone()).deposit("0").await.unwrap_err();
        assert!(err.to_string().contains("positive"));
        assert!(ledger.calls().is_empty());
    }

    #[tokio::test]
    async fn balances_come_from_the_right_surface() {
        let ledger = Arc::new(Ledger::default());
        let client = client(ledger);
        let user = Address::from([0x42; 20]);
        assert_eq!(client.balance(user).await.unwrap(), U256::from(123));
        assert_eq!(client.usdc_balance(user).await.unwrap(), U256::from(9));
    }
}

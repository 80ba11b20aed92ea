// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use alloy::providers::fillers::BlobGasFiller;
use alloy::{
    network::{Ethereum, EthereumWallet},
    primitives::{Address, Bytes, B256, U256},
    providers::fillers::{
        ChainIdFiller, FillProvider, GasFiller, JoinFill, NonceFiller, WalletFiller,
    },
    providers::{Identity, Provider, ProviderBuilder, RootProvider, WalletProvider},
    rpc::types::{Log, TransactionReceipt},
    signers::local::PrivateKeySigner,
    sol,
};
use async_trait::async_trait;
use eyre::{eyre, Result};
use once_cell::sync::Lazy;
use std::marker::PhantomData;
use std::sync::Arc;
use tokio::sync::Mutex;

static NONCE_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

/// Pending nonce of the provider's own signer. Node-side account lists are
/// never consulted: public RPC endpoints expose no accounts at all.
pub async fn next_pending_nonce(provider: &VaultWriteProvider) -> eyre::Result<u64> {
    let from = provider.default_signer_address();
    provider
        .get_transaction_count(from)
        .pending()
        .await
        .map_err(Into::into)
}

sol! {
    #[derive(Debug)]
    #[sol(rpc)]
    contract StadiumVaultBet {
        uint256 public MIN_BET_AMOUNT;
        uint256 public MAX_BET_AMOUNT;
        function createGame(string memory homeTeam, string memory awayTeam, uint256 startTime, uint256 endTime) external returns (uint256 gameId);
        function placeBet(uint256 gameId, bytes32[] calldata handles, bytes calldata inputProof, uint256 usdcAmount) external returns (uint256 betId);
        function depositToVault(uint256 amount) external;
        function withdrawFromVault(uint256 amount) external;
        function getVaultBalance(address user) external view returns (uint256);
        function games(uint256 index) external view returns (
            bytes32 gameId,
            string memory homeTeam,
            string memory awayTeam,
            bytes32 homeScore,
            bytes32 awayScore,
            bytes32 homeOdds,
            bytes32 awayOdds,
            bytes32 drawOdds,
            bytes32 isActiveEnc,
            bytes32 isFinishedEnc,
            uint256 startTime,
            uint256 endTime
        );
        function bets(uint256 index) external view returns (
            bytes32 betId,
            bytes32 amount,
            bytes32 odds,
            bytes32 teamSelection,
            bytes32 isWinner,
            bool isActive,
            bool isSettled,
            address bettor,
            uint256 gameId,
            uint256 timestamp
        );
        function getGameBasicInfo(uint256 gameId) external view returns (uint256 startTime, uint256 endTime, bool isActive, bool isFinished);
        function getBetBasicInfo(uint256 betId) external view returns (bool isActive, bool isSettled, address bettor, uint256 gameId, uint256 timestamp);
        function getGameCount() external view returns (uint256);
        function getBetCount() external view returns (uint256);
    }

    #[derive(Debug)]
    #[sol(rpc)]
    contract TestUsdc {
        function balanceOf(address account) external view returns (uint256);
        function approve(address spender, uint256 amount) external returns (bool);
        function faucet(address to, uint256 amount) external;
        function decimals() external view returns (uint8);
    }
}

/// One stored game. Score, odds and status fields are ciphertext handles the
/// client cannot open; only the team labels and schedule are plaintext.
#[derive(Debug, Clone)]
pub struct GameRecord {
    pub home_team: String,
    pub away_team: String,
    pub start_time: U256,
    pub end_time: U256,
}

/// One stored bet. Amount and selection stay encrypted on-chain; the
/// plaintext columns are what the public read path exposes.
#[derive(Debug, Clone)]
pub struct BetRecord {
    pub is_active: bool,
    pub is_settled: bool,
    pub bettor: Address,
    pub game_id: U256,
    pub timestamp: U256,
}

#[derive(Debug, Clone, Copy)]
pub struct GameStatus {
    pub start_time: U256,
    pub end_time: U256,
    pub is_active: bool,
    pub is_finished: bool,
}

/// Confirmed transaction, reduced to what callers inspect: the hash and the
/// emitted logs. Construction fails on a reverted receipt.
#[derive(Debug, Clone, Default)]
pub struct TxOutcome {
    pub tx_hash: B256,
    pub block_number: Option<u64>,
    pub logs: Vec<Log>,
}

impl TxOutcome {
    pub fn from_receipt(receipt: TransactionReceipt) -> Result<Self> {
        if !receipt.status() {
            return Err(eyre!(
                "transaction {} reverted",
                receipt.transaction_hash
            ));
        }
        Ok(Self {
            tx_hash: receipt.transaction_hash,
            block_number: receipt.block_number,
            logs: receipt.inner.logs().to_vec(),
        })
    }
}

/// Trait for read-only operations on the betting contract
#[async_trait]
pub trait VaultBetRead {
    /// Total number of games ever created
    async fn get_game_count(&self) -> Result<U256>;

    /// Plaintext columns of one stored game
    async fn get_game(&self, index: U256) -> Result<GameRecord>;

    /// Schedule and status flags for one game
    async fn get_game_basic_info(&self, game_id: U256) -> Result<GameStatus>;

    /// Total number of bets ever placed
    async fn get_bet_count(&self) -> Result<U256>;

    /// Plaintext columns of one stored bet
    async fn get_bet_basic_info(&self, bet_id: U256) -> Result<BetRecord>;

    /// Internal vault balance of a user, in USDC base units
    async fn get_vault_balance(&self, user: Address) -> Result<U256>;
}

/// Trait for write operations on the betting contract
#[async_trait]
pub trait VaultBetWrite {
    /// Submit an encrypted bet: ordered ciphertext handles plus the proof
    /// binding them to this contract and sender
    async fn place_bet(
        &self,
        game_id: U256,
        handles: Vec<B256>,
        input_proof: Bytes,
        usdc_amount: U256,
    ) -> Result<TxOutcome>;

    /// Create a game with a public schedule
    async fn create_game(
        &self,
        home_team: String,
        away_team: String,
        start_time: U256,
        end_time: U256,
    ) -> Result<TxOutcome>;

    /// Move approved USDC into the internal vault
    async fn deposit_to_vault(&self, amount: U256) -> Result<TxOutcome>;

    /// Withdraw from the internal vault back to the wallet
    async fn withdraw_from_vault(&self, amount: U256) -> Result<TxOutcome>;
}

/// Read surface of the test USDC token; needs no signer
#[async_trait]
pub trait UsdcRead {
    async fn balance_of(&self, account: Address) -> Result<U256>;
}

/// Write operations on the test USDC token
#[async_trait]
pub trait UsdcOps: UsdcRead {
    async fn approve(&self, spender: Address, amount: U256) -> Result<TxOutcome>;
    async fn faucet(&self, to: Address, amount: U256) -> Result<TxOutcome>;
}

/// Generic type to represent different provider types
pub trait ProviderType: Send {
    type Provider: Provider + Send + Sync + 'static;
}

/// Marker type for read-only provider
#[derive(Clone)]
pub struct ReadOnly;
impl ProviderType for ReadOnly {
    type Provider = VaultReadOnlyProvider;
}
/// Marker type for read-write provider
#[derive(Clone)]
pub struct ReadWrite;
impl ProviderType for ReadWrite {
    type Provider = VaultWriteProvider;
}

/// Generic betting contract handle
#[derive(Clone)]
pub struct VaultBetContract<T: ProviderType> {
    pub provider: Arc<T::Provider>,
    pub contract_address: Address,
    _marker: PhantomData<T>,
}

/// Generic USDC token handle sharing the same provider machinery
#[derive(Clone)]
pub struct UsdcContract<T: ProviderType> {
    pub provider: Arc<T::Provider>,
    pub contract_address: Address,
    _marker: PhantomData<T>,
}

impl VaultBetContract<ReadWrite> {
    pub fn get_provider(&self) -> Arc<VaultWriteProvider> {
        self.provider.clone()
    }
}

/// Type alias for read-only provider
pub type VaultReadOnlyProvider = FillProvider<
    JoinFill<
        Identity,
        JoinFill<GasFiller, JoinFill<BlobGasFiller, JoinFill<NonceFiller, ChainIdFiller>>>,
    >,
    RootProvider,
>;

/// Type alias for read-write provider
pub type VaultWriteProvider = FillProvider<
    JoinFill<
        JoinFill<
            JoinFill<
                Identity,
                JoinFill<GasFiller, JoinFill<BlobGasFiller, JoinFill<NonceFiller, ChainIdFiller>>>,
            >,
            NonceFiller,
        >,
        WalletFiller<EthereumWallet>,
    >,
    RootProvider<Ethereum>,
    Ethereum,
>;

// Factory for creating contract instances
pub struct VaultContractFactory;

impl VaultContractFactory {
    /// Create a write-capable contract
    pub async fn create_write(
        http_rpc_url: &str,
        contract_address: &str,
        private_key: &str,
    ) -> Result<VaultBetContract<ReadWrite>> {
        let contract_address = contract_address.parse()?;

        let provider = Self::write_provider(http_rpc_url, private_key).await?;

        Ok(VaultBetContract::<ReadWrite> {
            provider: Arc::new(provider),
            contract_address,
            _marker: PhantomData,
        })
    }

    /// Create a read-only contract
    pub async fn create_read(
        http_rpc_url: &str,
        contract_address: &str,
    ) -> Result<VaultBetContract<ReadOnly>> {
        let contract_address = contract_address.parse()?;

        let provider = ProviderBuilder::new().connect(http_rpc_url).await?;

        Ok(VaultBetContract::<ReadOnly> {
            provider: Arc::new(provider),
            contract_address,
            _marker: PhantomData,
        })
    }

    /// Create a write-capable USDC handle
    pub async fn create_usdc_write(
        http_rpc_url: &str,
        contract_address: &str,
        private_key: &str,
    ) -> Result<UsdcContract<ReadWrite>> {
        let contract_address = contract_address.parse()?;

        let provider = Self::write_provider(http_rpc_url, private_key).await?;

        Ok(UsdcContract::<ReadWrite> {
            provider: Arc::new(provider),
            contract_address,
            _marker: PhantomData,
        })
    }

    /// Create a read-only USDC handle
    pub async fn create_usdc_read(
        http_rpc_url: &str,
        contract_address: &str,
    ) -> Result<UsdcContract<ReadOnly>> {
        let contract_address = contract_address.parse()?;

        let provider = ProviderBuilder::new().connect(http_rpc_url).await?;

        Ok(UsdcContract::<ReadOnly> {
            provider: Arc::new(provider),
            contract_address,
            _marker: PhantomData,
        })
    }

    async fn write_provider(http_rpc_url: &str, private_key: &str) -> Result<VaultWriteProvider> {
        let signer: PrivateKeySigner = private_key.parse()?;
        let wallet = EthereumWallet::from(signer);
        let provider = ProviderBuilder::new()
            .with_cached_nonce_management()
            .wallet(wallet)
            .connect(http_rpc_url)
            .await?;
        Ok(provider)
    }
}

// Implement VaultBetRead for any VaultBetContract regardless of provider type
#[async_trait]
impl<T: Send + Sync> VaultBetRead for VaultBetContract<T>
where
    T: ProviderType,
{
    async fn get_game_count(&self) -> Result<U256> {
        let contract = StadiumVaultBet::new(self.contract_address, &self.provider);
        let count = contract.getGameCount().call().await?;
        Ok(count)
    }

    async fn get_game(&self, index: U256) -> Result<GameRecord> {
        let contract = StadiumVaultBet::new(self.contract_address, &self.provider);
        let game = contract.games(index).call().await?;
        Ok(GameRecord {
            home_team: game.homeTeam,
            away_team: game.awayTeam,
            start_time: game.startTime,
            end_time: game.endTime,
        })
    }

    async fn get_game_basic_info(&self, game_id: U256) -> Result<GameStatus> {
        let contract = StadiumVaultBet::new(self.contract_address, &self.provider);
        let info = contract.getGameBasicInfo(game_id).call().await?;
        Ok(GameStatus {
            start_time: info.startTime,
            end_time: info.endTime,
            is_active: info.isActive,
            is_finished: info.isFinished,
        })
    }

    async fn get_bet_count(&self) -> Result<U256> {
        let contract = StadiumVaultBet::new(self.contract_address, &self.provider);
        let count = contract.getBetCount().call().await?;
        Ok(count)
    }

    async fn get_bet_basic_info(&self, bet_id: U256) -> Result<BetRecord> {
        let contract = StadiumVaultBet::new(self.contract_address, &self.provider);
        let info = contract.getBetBasicInfo(bet_id).call().await?;
        Ok(BetRecord {
            is_active: info.isActive,
            is_settled: info.isSettled,
            bettor: info.bettor,
            game_id: info.gameId,
            timestamp: info.timestamp,
        })
    }

    async fn get_vault_balance(&self, user: Address) -> Result<U256> {
        let contract = StadiumVaultBet::new(self.contract_address, &self.provider);
        let balance = contract.getVaultBalance(user).call().await?;
        Ok(balance)
    }
}

// Implement VaultBetWrite only for contracts with ReadWrite marker
#[async_trait]
impl VaultBetWrite for VaultBetContract<ReadWrite> {
    async fn place_bet(
        &self,
        game_id: U256,
        handles: Vec<B256>,
        input_proof: Bytes,
        usdc_amount: U256,
    ) -> Result<TxOutcome> {
        let _guard = NONCE_LOCK.lock().await;
        let nonce = next_pending_nonce(&*self.provider).await?;

        let contract = StadiumVaultBet::new(self.contract_address, &self.provider);
        let builder = contract
            .placeBet(game_id, handles, input_proof, usdc_amount)
            .nonce(nonce);
        let receipt = builder.send().await?.get_receipt().await?;

        TxOutcome::from_receipt(receipt)
    }

    async fn create_game(
        &self,
        home_team: String,
        away_team: String,
        start_time: U256,
        end_time: U256,
    ) -> Result<TxOutcome> {
        let _guard = NONCE_LOCK.lock().await;
        let nonce = next_pending_nonce(&*self.provider).await?;

        let contract = StadiumVaultBet::new(self.contract_address, &self.provider);
        let builder = contract
            .createGame(home_team, away_team, start_time, end_time)
            .nonce(nonce);
        let receipt = builder.send().await?.get_receipt().await?;

        TxOutcome::from_receipt(receipt)
    }

    async fn deposit_to_vault(&self, amount: U256) -> Result<TxOutcome> {
        let _guard = NONCE_LOCK.lock().await;
        let nonce = next_pending_nonce(&*self.provider).await?;

        let contract = StadiumVaultBet::new(self.contract_address, &self.provider);
        let builder = contract.depositToVault(amount).nonce(nonce);
        let receipt = builder.send().await?.get_receipt().await?;

        TxOutcome::from_receipt(receipt)
    }

    async fn withdraw_from_vault(&self, amount: U256) -> Result<TxOutcome> {
        let _guard = NONCE_LOCK.lock().await;
        let nonce = next_pending_nonce(&*self.provider).await?;

        let contract = StadiumVaultBet::new(self.contract_address, &self.provider);
        let builder = contract.withdrawFromVault(amount).nonce(nonce);
        let receipt = builder.send().await?.get_receipt().await?;

        TxOutcome::from_receipt(receipt)
    }
}

// Balances are readable from either handle
#[async_trait]
impl<T: Send + Sync> UsdcRead for UsdcContract<T>
where
    T: ProviderType,
{
    async fn balance_of(&self, account: Address) -> Result<U256> {
        let contract = TestUsdc::new(self.contract_address, &self.provider);
        let balance = contract.balanceOf(account).call().await?;
        Ok(balance)
    }
}

#[async_trait]
impl UsdcOps for UsdcContract<ReadWrite> {
    async fn approve(&self, spender: Address, amount: U256) -> Result<TxOutcome> {
        let _guard = NONCE_LOCK.lock().await;
        let nonce = next_pending_nonce(&*self.provider).await?;

        let contract = TestUsdc::new(self.contract_address, &self.provider);
        let builder = contract.approve(spender, amount).nonce(nonce);
        let receipt = builder.send().await?.get_receipt().await?;

        TxOutcome::from_receipt(receipt)
    }

    async fn faucet(&self, to: Address, amount: U256) -> Result<TxOutcome> {
        let _guard = NONCE_LOCK.lock().await;
        let nonce = next_pending_nonce(&*self.provider).await?;

        let contract = TestUsdc::new(self.contract_address, &self.provider);
        let builder = contract.faucet(to, amount).nonce(nonce);
        let receipt = builder.send().await?.get_receipt().await?;

        TxOutcome::from_receipt(receipt)
    }
}

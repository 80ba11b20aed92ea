// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::error::BetError;
use crate::wire::{handle_to_b256, proof_to_bytes, to_hex, WireValue};
use alloy::primitives::{Address, B256, U256};
use std::str::FromStr;
use std::sync::Arc;
use svb_evm_helpers::contracts::VaultBetWrite;
use svb_evm_helpers::events::extract_bet_id;
use svb_evm_helpers::wallet::{ensure_signer_ready, ChainSpec, WalletRpc};
use svb_fhe::{EncryptedInputBuilder, EncryptionSession};
use tracing::{debug, info};

pub const USDC_DECIMALS: u32 = 6;

/// Outcome the bettor is backing. The numeric codes are part of the contract
/// protocol and never change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TeamSelection {
    Home,
    Away,
    Draw,
}

impl TeamSelection {
    pub fn code(&self) -> u8 {
        match self {
            TeamSelection::Home => 0,
            TeamSelection::Away => 1,
            TeamSelection::Draw => 2,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TeamSelection::Home => "home",
            TeamSelection::Away => "away",
            TeamSelection::Draw => "draw",
        }
    }
}

impl FromStr for TeamSelection {
    type Err = BetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "home" => Ok(TeamSelection::Home),
            "away" => Ok(TeamSelection::Away),
            "draw" => Ok(TeamSelection::Draw),
            other => Err(BetError::InvalidSelection(other.to_string())),
        }
    }
}

/// Parse a decimal USDC amount into base units (6 decimal places).
pub fn parse_usdc_units(s: &str) -> Result<u128, BetError> {
    let err = |msg: &str| BetError::InvalidStake(s.to_string(), msg.to_string());

    let (whole, frac) = match s.split_once('.') {
        Some((w, f)) => (w, f),
        None => (s, ""),
    };
    if whole.is_empty() && frac.is_empty() {
        return Err(err("empty amount"));
    }
    if frac.len() > USDC_DECIMALS as usize {
        return Err(err("more than 6 decimal places"));
    }
    if !whole.chars().all(|c| c.is_ascii_digit()) || !frac.chars().all(|c| c.is_ascii_digit()) {
        return Err(err("not an unsigned decimal number"));
    }

    let whole_units: u128 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| err("whole part too large"))?
    };
    let frac_units: u128 = if frac.is_empty() {
        0
    } else {
        let parsed: u128 = frac.parse().map_err(|_| err("fractional part too large"))?;
        parsed * 10u128.pow(USDC_DECIMALS - frac.len() as u32)
    };

    whole_units
        .checked_mul(10u128.pow(USDC_DECIMALS))
        .and_then(|w| w.checked_add(frac_units))
        .ok_or_else(|| err("amount too large"))
}

/// Minimum stake, 1 USDC in base units. The effective maximum is the
/// 32-bit ciphertext slot, which sits below the contract's nominal cap.
pub const MIN_STAKE_UNITS: u128 = 1_000_000;

/// Scale a stake to base units and confirm it fits the 32-bit ciphertext
/// slot. Fails locally, before any encryption or network work.
pub fn scale_stake(s: &str) -> Result<u32, BetError> {
    let units = parse_usdc_units(s)?;
    if units < MIN_STAKE_UNITS {
        return Err(BetError::InvalidStake(
            s.to_string(),
            "below the 1 USDC minimum stake".to_string(),
        ));
    }
    u32::try_from(units).map_err(|_| BetError::StakeExceedsLimit { scaled: units })
}

/// One bet as the caller states it: untrusted strings, validated as step one
/// of submission.
#[derive(Debug, Clone)]
pub struct BetSubmissionRequest {
    pub game_id: u64,
    pub team_selection: String,
    pub stake_usdc: String,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct BetSubmissionResult {
    pub success: bool,
    pub bet_id: Option<u64>,
    pub error: Option<String>,
}

impl BetSubmissionResult {
    fn confirmed(bet_id: u64) -> Self {
        Self {
            success: true,
            bet_id: Some(bet_id),
            error: None,
        }
    }

    fn failed(error: BetError) -> Self {
        Self {
            success: false,
            bet_id: None,
            error: Some(error.to_string()),
        }
    }
}

/// Sequences one encrypted bet submission: local validation, signer and
/// session guards, input sealing, wire encoding, the contract call, and
/// identifier recovery from the receipt logs.
pub struct BetSubmitter {
    contract_address: Address,
    chain: ChainSpec,
    wallet: Arc<dyn WalletRpc>,
    session: Arc<EncryptionSession>,
    contract: Arc<dyn VaultBetWrite + Send + Sync>,
}

impl BetSubmitter {
    pub fn new(
        contract_address: Address,
        chain: ChainSpec,
        wallet: Arc<dyn WalletRpc>,
        session: Arc<EncryptionSession>,
        contract: Arc<dyn VaultBetWrite + Send + Sync>,
    ) -> Self {
        Self {
            contract_address,
            chain,
            wallet,
            session,
            contract,
        }
    }

    /// Never retried internally: repeating a failed state-changing call
    /// risks double-submission, so retrying is the caller's decision.
    pub async fn place_bet(&self, request: &BetSubmissionRequest) -> BetSubmissionResult {
        match self.try_place(request).await {
            Ok(bet_id) => {
                info!(bet_id, game_id = request.game_id, "Bet confirmed");
                BetSubmissionResult::confirmed(bet_id)
            }
            Err(e) => {
                debug!(game_id = request.game_id, error = %e, "Bet submission failed");
                BetSubmissionResult::failed(e)
            }
        }
    }

    async fn try_place(&self, request: &BetSubmissionRequest) -> Result<u64, BetError> {
        let selection = TeamSelection::from_str(&request.team_selection)?;
        let scaled = scale_stake(&request.stake_usdc)?;

        let user = ensure_signer_ready(&*self.wallet, &self.chain)
            .await
            .map_err(|e| BetError::Wallet(format!("{e:#}")))?;
        let encryptor = self.session.ensure_ready().await;

        // Positional protocol with the contract: amount first, selection second.
        let sealed = EncryptedInputBuilder::new(self.contract_address, user)
            .add_u32(scaled)
            .add_u8(selection.code())
            .seal(&*encryptor)
            .await?;

        let handle_hex: Vec<String> = sealed
            .handles
            .iter()
            .map(|h| to_hex(&WireValue::Handle(*h)))
            .collect();
        debug!(
            handles = ?handle_hex,
            proof = %to_hex(&WireValue::Bytes(sealed.proof.clone())),
            "Sealed input encoded for submission"
        );

        let handles: Vec<B256> = sealed.handles.into_iter().map(handle_to_b256).collect();
        let outcome = self
            .contract
            .place_bet(
                U256::from(request.game_id),
                handles,
                proof_to_bytes(sealed.proof),
                U256::from(scaled),
            )
            .await
            .map_err(|e| BetError::Chain(format!("{e:#}")))?;

        // The identifier comes from the emitted event or not at all; guessing
        // from the bet count is racy under concurrent submissions.
        let bet_id = extract_bet_id(&outcome.logs).ok_or(BetError::MissingEvent)?;
        u64::try_from(bet_id).map_err(|_| BetError::Chain("bet id out of u64 range".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::Log as LogInner;
    use alloy::rpc::types::Log;
    use alloy::sol_types::SolEvent;
    use async_trait::async_trait;
    use eyre::eyre;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;
    use svb_evm_helpers::contracts::TxOutcome;
    use svb_evm_helpers::events::BetPlaced;
    use svb_evm_helpers::wallet::SwitchChainError;
    use svb_fhe::{
        BootstrapError, EncryptError, InputBinding, InputEncryptor, PlainField, RetryPolicy,
        SealedInput, SessionBootstrap,
    };

    #[test]
    fn selection_codes_are_fixed_and_total() {
        assert_eq!("home".parse::<TeamSelection>().unwrap().code(), 0);
        assert_eq!("AWAY".parse::<TeamSelection>().unwrap().code(), 1);
        assert_eq!("draw".parse::<TeamSelection>().unwrap().code(), 2);
        assert!(matches!(
            "banana".parse::<TeamSelection>(),
            Err(BetError::InvalidSelection(_))
        ));
    }

    #[test]
    fn stakes_scale_to_six_decimals() {
        assert_eq!(scale_stake("50").unwrap(), 50_000_000);
        assert_eq!(scale_stake("1").unwrap(), 1_000_000);
        assert_eq!(scale_stake("1.5").unwrap(), 1_500_000);
        // Largest stake that still fits 32 bits.
        assert_eq!(scale_stake("4294.967295").unwrap(), u32::MAX);
    }

    #[test]
    fn oversized_stake_fails_before_any_work() {
        let err = scale_stake("5000").unwrap_err();
        assert!(matches!(err, BetError::StakeExceedsLimit { .. }));
        let msg = err.to_string();
        assert!(msg.contains("exceeds"));
        assert!(msg.contains("limit"));
    }

    #[test]
    fn malformed_or_dusty_stakes_are_rejected() {
        assert!(scale_stake("").is_err());
        assert!(scale_stake("0").is_err());
        assert!(scale_stake("-5").is_err());
        assert!(scale_stake("0.5").is_err()); // below the 1 USDC minimum
        assert!(scale_stake("1.2345678").is_err());
        assert!(scale_stake("ten").is_err());
    }

    struct StubEncryptor;

    #[async_trait]
    impl InputEncryptor for StubEncryptor {
        async fn seal(
            &self,
            _binding: InputBinding,
            fields: &[PlainField],
        ) -> Result<SealedInput, EncryptError> {
            let handles = (0..fields.len() as u8).map(|i| [i; 32]).collect();
            Ok(SealedInput {
                handles,
                proof: vec![0xEE; 8],
            })
        }
    }

    struct StubBootstrap;

    #[async_trait]
    impl SessionBootstrap for StubBootstrap {
        async fn bootstrap(&self) -> Result<Arc<dyn InputEncryptor>, BootstrapError> {
            Ok(Arc::new(StubEncryptor))
        }
    }

    struct ConnectedWallet;

    #[async_trait]
    impl WalletRpc for ConnectedWallet {
        async fn request_accounts(&self) -> eyre::Result<Vec<Address>> {
            Ok(vec![Address::from([0x42; 20])])
        }

        async fn chain_id(&self) -> eyre::Result<u64> {
            Ok(11155111)
        }

        async fn switch_chain(&self, _chain_id: u64) -> Result<(), SwitchChainError> {
            Ok(())
        }

        async fn add_chain(&self, _spec: &ChainSpec) -> eyre::Result<()> {
            Ok(())
        }
    }

    enum WriterScript {
        EmitEvent,
        NoEvent,
        Revert,
    }

    struct ScriptedWriter {
        script: WriterScript,
        calls: AtomicU32,
        seen: Mutex<Vec<(U256, usize, U256)>>,
    }

    impl ScriptedWriter {
        fn new(script: WriterScript) -> Self {
            Self {
                script,
                calls: AtomicU32::new(0),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl VaultBetWrite for ScriptedWriter {
        async fn place_bet(
            &self,
            game_id: U256,
            handles: Vec<B256>,
            _input_proof: alloy::primitives::Bytes,
            usdc_amount: U256,
        ) -> eyre::Result<TxOutcome> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen
                .lock()
                .unwrap()
                .push((game_id, handles.len(), usdc_amount));
            match self.script {
                WriterScript::Revert => Err(eyre!("transaction reverted")),
                WriterScript::NoEvent => Ok(TxOutcome::default()),
                WriterScript::EmitEvent => {
                    let event = BetPlaced {
                        betId: U256::from(7),
                        gameId: game_id,
                        bettor: Address::from([0x42; 20]),
                    };
                    Ok(TxOutcome {
                        logs: vec![Log {
                            inner: LogInner {
                                address: Address::from([0xAA; 20]),
                                data: event.encode_log_data(),
                            },
                            ..Default::default()
                        }],
                        ..Default::default()
                    })
                }
            }
        }

        async fn create_game(
            &self,
            _home_team: String,
            _away_team: String,
            _start_time: U256,
            _end_time: U256,
        ) -> eyre::Result<TxOutcome> {
            unimplemented!("not exercised here")
        }

        async fn deposit_to_vault(&self, _amount: U256) -> eyre::Result<TxOutcome> {
            unimplemented!("not exercised here")
        }

        async fn withdraw_from_vault(&self, _amount: U256) -> eyre::Result<TxOutcome> {
            unimplemented!("not exercised here")
        }
    }

    fn sepolia() -> ChainSpec {
        ChainSpec {
            chain_id: 11155111,
            name: "Sepolia".to_string(),
            rpc_url: "https://rpc.sepolia.org".to_string(),
            currency_symbol: "ETH".to_string(),
            explorer_url: None,
        }
    }

    fn submitter(writer: Arc<ScriptedWriter>) -> BetSubmitter {
        let session = Arc::new(EncryptionSession::new(
            Arc::new(StubBootstrap),
            RetryPolicy {
                max_attempts: 3,
                backoff: Duration::from_millis(0),
            },
        ));
        BetSubmitter::new(
            Address::from([0xAA; 20]),
            sepolia(),
            Arc::new(ConnectedWallet),
            session,
            writer,
        )
    }

    #[tokio::test]
    async fn valid_bet_confirms_with_event_id() {
        let writer = Arc::new(ScriptedWriter::new(WriterScript::EmitEvent));
        let result = submitter(writer.clone())
            .place_bet(&BetSubmissionRequest {
                game_id: 1,
                team_selection: "home".to_string(),
                stake_usdc: "50".to_string(),
            })
            .await;

        assert!(result.success);
        assert_eq!(result.bet_id, Some(7));
        assert_eq!(result.error, None);

        let seen = writer.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        let (game_id, handle_count, amount) = seen[0];
        assert_eq!(game_id, U256::from(1));
        assert_eq!(handle_count, 2);
        assert_eq!(amount, U256::from(50_000_000u64));
    }

    #[tokio::test]
    async fn oversized_stake_never_reaches_the_chain() {
        let writer = Arc::new(ScriptedWriter::new(WriterScript::EmitEvent));
        let result = submitter(writer.clone())
            .place_bet(&BetSubmissionRequest {
                game_id: 1,
                team_selection: "home".to_string(),
                stake_usdc: "5000".to_string(),
            })
            .await;

        assert!(!result.success);
        let error = result.error.unwrap();
        assert!(error.contains("exceeds"));
        assert!(error.contains("limit"));
        assert_eq!(writer.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unknown_selection_never_reaches_the_chain() {
        let writer = Arc::new(ScriptedWriter::new(WriterScript::EmitEvent));
        let result = submitter(writer.clone())
            .place_bet(&BetSubmissionRequest {
                game_id: 1,
                team_selection: "both".to_string(),
                stake_usdc: "50".to_string(),
            })
            .await;

        assert!(!result.success);
        assert!(result.error.unwrap().contains("team selection"));
        assert_eq!(writer.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn missing_event_is_an_explicit_failure() {
        let writer = Arc::new(ScriptedWriter::new(WriterScript::NoEvent));
        let result = submitter(writer)
            .place_bet(&BetSubmissionRequest {
                game_id: 1,
                team_selection: "draw".to_string(),
                stake_usdc: "50".to_string(),
            })
            .await;

        assert!(!result.success);
        assert_eq!(result.bet_id, None);
        assert!(result.error.unwrap().contains("no bet-placed event"));
    }

    #[tokio::test]
    async fn reverted_transaction_is_reported_not_retried() {
        let writer = Arc::new(ScriptedWriter::new(WriterScript::Revert));
        let result = submitter(writer.clone())
            .place_bet(&BetSubmissionRequest {
                game_id: 1,
                team_selection: "away".to_string(),
                stake_usdc: "50".to_string(),
            })
            .await;

        assert!(!result.success);
        assert!(result.error.unwrap().contains("reverted"));
        assert_eq!(writer.calls.load(Ordering::SeqCst), 1);
    }
}

// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::context::AppContext;
use alloy::primitives::Address;
use anyhow::{bail, Context, Result};
use clap::Subcommand;
use svb_config::AppConfig;
use svb_sdk::{chain_spec, BetSubmissionRequest, BetSubmitter, GameReader};

#[derive(Subcommand, Debug)]
pub enum BetCommands {
    /// Place an encrypted bet on a game
    Place {
        /// Game to bet on
        #[arg(long)]
        game_id: u64,

        /// One of home, away or draw
        #[arg(long)]
        selection: String,

        /// Stake in USDC, e.g. 50 or 12.5
        #[arg(long)]
        stake: String,
    },

    /// List bets placed by an address (selection stays encrypted)
    List {
        /// Bettor address; defaults to the configured signer
        #[arg(long)]
        address: Option<String>,
    },
}

pub async fn execute(command: BetCommands, config: &AppConfig) -> Result<()> {
    match command {
        BetCommands::Place {
            game_id,
            selection,
            stake,
        } => place(config, game_id, selection, stake).await,
        BetCommands::List { address } => list(config, address).await,
    }
}

async fn place(config: &AppConfig, game_id: u64, selection: String, stake: String) -> Result<()> {
    let ctx = AppContext::new(config);
    let contract = ctx.write_contract().await?;
    let wallet = ctx.local_wallet(&contract)?;
    let submitter = BetSubmitter::new(
        ctx.vault_address()?,
        chain_spec(&config.chain)?,
        wallet,
        ctx.session()?,
        contract,
    );

    let result = submitter
        .place_bet(&BetSubmissionRequest {
            game_id,
            team_selection: selection,
            stake_usdc: stake,
        })
        .await;

    match (result.success, result.bet_id) {
        (true, Some(bet_id)) => {
            println!("Bet confirmed with id {bet_id}");
            Ok(())
        }
        _ => bail!(
            "Bet failed: {}",
            result.error.unwrap_or_else(|| "unknown error".to_string())
        ),
    }
}

async fn list(config: &AppConfig, address: Option<String>) -> Result<()> {
    let ctx = AppContext::new(config);
    let bettor: Address = match address {
        Some(raw) => raw.parse().context("Invalid bettor address")?,
        None => ctx.signer()?.address(),
    };

    let reader = GameReader::new(ctx.read_contract().await?);
    let bets = reader.list_user_bets(bettor).await;
    if bets.is_empty() {
        println!("No bets found for {bettor}");
        return Ok(());
    }
    for bet in bets {
        println!(
            "bet #{:<4} game #{:<4} placed at {}  selection: (encrypted)  {}",
            bet.bet_id,
            bet.game_id,
            bet.timestamp,
            if bet.is_settled {
                "settled"
            } else if bet.is_active {
                "active"
            } else {
                "inactive"
            },
        );
    }
    Ok(())
}

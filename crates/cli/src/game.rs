// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::context::{to_anyhow, AppContext};
use alloy::primitives::U256;
use anyhow::{bail, Result};
use clap::Subcommand;
use svb_config::AppConfig;
use svb_evm_helpers::contracts::VaultBetWrite;
use svb_evm_helpers::events::extract_game_id;

#[derive(Subcommand, Debug)]
pub enum GameCommands {
    /// Create a game with a public schedule
    Create {
        #[arg(long)]
        home: String,

        #[arg(long)]
        away: String,

        /// Kick-off, unix seconds
        #[arg(long)]
        start: u64,

        /// Scheduled end, unix seconds
        #[arg(long)]
        end: u64,
    },
}

pub async fn execute(command: GameCommands, config: &AppConfig) -> Result<()> {
    match command {
        GameCommands::Create {
            home,
            away,
            start,
            end,
        } => create(config, home, away, start, end).await,
    }
}

async fn create(config: &AppConfig, home: String, away: String, start: u64, end: u64) -> Result<()> {
    if end <= start {
        bail!("Game end must come after its start");
    }

    let ctx = AppContext::new(config);
    let contract = ctx.write_contract().await?;
    let outcome = contract
        .create_game(home.clone(), away.clone(), U256::from(start), U256::from(end))
        .await
        .map_err(to_anyhow)?;

    match extract_game_id(&outcome.logs) {
        Some(game_id) => {
            println!("Created game #{game_id}: {home} vs {away} (tx {})", outcome.tx_hash);
            Ok(())
        }
        None => bail!(
            "Transaction {} confirmed but no game-created event was emitted",
            outcome.tx_hash
        ),
    }
}

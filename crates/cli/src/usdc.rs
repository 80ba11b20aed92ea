// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::context::{to_anyhow, AppContext};
use crate::vault::fmt_usdc;
use alloy::primitives::Address;
use anyhow::{Context, Result};
use clap::Subcommand;
use svb_config::AppConfig;
use svb_evm_helpers::contracts::{UsdcOps, UsdcRead};

#[derive(Subcommand, Debug)]
pub enum UsdcCommands {
    /// Show the wallet-held USDC balance of an address
    Balance {
        /// Defaults to the configured signer
        #[arg(long)]
        address: Option<String>,
    },

    /// Approve the betting contract to spend USDC
    Approve {
        /// Amount in USDC
        #[arg(long)]
        amount: String,
    },

    /// Mint test USDC to an address (testnet only)
    Faucet {
        /// Recipient; defaults to the configured signer
        #[arg(long)]
        to: Option<String>,

        /// Amount in USDC
        #[arg(long)]
        amount: String,
    },
}

pub async fn execute(command: UsdcCommands, config: &AppConfig) -> Result<()> {
    let ctx = AppContext::new(config);
    match command {
        UsdcCommands::Balance { address } => {
            // Balance is a plain read: no signer, unless it names the default
            // account to look up.
            let user: Address = match address {
                Some(raw) => raw.parse().context("Invalid address")?,
                None => ctx.signer()?.address(),
            };
            let usdc = ctx.usdc_read_contract().await?;
            let balance = usdc.balance_of(user).await.map_err(to_anyhow)?;
            println!("USDC balance of {user}: {}", fmt_usdc(balance));
        }
        UsdcCommands::Approve { amount } => {
            let usdc = ctx.usdc_contract().await?;
            let units = svb_sdk::parse_usdc_units(&amount).map_err(|e| anyhow::anyhow!(e))?;
            let outcome = usdc
                .approve(ctx.vault_address()?, alloy::primitives::U256::from(units))
                .await
                .map_err(to_anyhow)?;
            println!("Approved {amount} USDC (tx {})", outcome.tx_hash);
        }
        UsdcCommands::Faucet { to, amount } => {
            let usdc = ctx.usdc_contract().await?;
            let recipient: Address = match to {
                Some(raw) => raw.parse().context("Invalid recipient address")?,
                None => ctx.signer()?.address(),
            };
            let units = svb_sdk::parse_usdc_units(&amount).map_err(|e| anyhow::anyhow!(e))?;
            let outcome = usdc
                .faucet(recipient, alloy::primitives::U256::from(units))
                .await
                .map_err(to_anyhow)?;
            println!("Minted {amount} USDC to {recipient} (tx {})", outcome.tx_hash);
        }
    }
    Ok(())
}

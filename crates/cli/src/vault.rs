// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::context::{to_anyhow, AppContext};
use alloy::primitives::{Address, U256};
use anyhow::{Context, Result};
use clap::Subcommand;
use svb_config::AppConfig;
use svb_evm_helpers::contracts::VaultBetRead;
use svb_sdk::{VaultClient, USDC_DECIMALS};

#[derive(Subcommand, Debug)]
pub enum VaultCommands {
    /// Show the contract-held vault balance of an address
    Balance {
        /// Defaults to the configured signer
        #[arg(long)]
        address: Option<String>,
    },

    /// Approve and move USDC into the vault
    Deposit {
        /// Amount in USDC, e.g. 100 or 12.5
        #[arg(long)]
        amount: String,
    },

    /// Withdraw USDC from the vault back to the wallet
    Withdraw {
        #[arg(long)]
        amount: String,
    },
}

/// Render base units as a decimal USDC amount.
pub fn fmt_usdc(units: U256) -> String {
    let scale = U256::from(10u64.pow(USDC_DECIMALS));
    let whole = units / scale;
    let frac = units % scale;
    if frac.is_zero() {
        format!("{whole}")
    } else {
        let frac = format!("{:0>width$}", frac.to_string(), width = USDC_DECIMALS as usize);
        format!("{whole}.{}", frac.trim_end_matches('0'))
    }
}

pub async fn execute(command: VaultCommands, config: &AppConfig) -> Result<()> {
    let ctx = AppContext::new(config);
    match command {
        VaultCommands::Balance { address } => {
            let user: Address = match address {
                Some(raw) => raw.parse().context("Invalid address")?,
                None => ctx.signer()?.address(),
            };
            let balance = ctx
                .read_contract()
                .await?
                .get_vault_balance(user)
                .await
                .map_err(to_anyhow)?;
            println!("Vault balance of {user}: {} USDC", fmt_usdc(balance));
        }
        VaultCommands::Deposit { amount } => {
            let client = vault_client(&ctx).await?;
            let outcome = client.deposit(&amount).await.map_err(to_anyhow)?;
            println!("Deposited {amount} USDC (tx {})", outcome.tx_hash);
        }
        VaultCommands::Withdraw { amount } => {
            let client = vault_client(&ctx).await?;
            let outcome = client.withdraw(&amount).await.map_err(to_anyhow)?;
            println!("Withdrew {amount} USDC (tx {})", outcome.tx_hash);
        }
    }
    Ok(())
}

pub async fn vault_client(ctx: &AppContext) -> Result<VaultClient> {
    Ok(VaultClient::new(
        ctx.vault_address()?,
        ctx.read_contract().await?,
        ctx.write_contract().await?,
        ctx.usdc_contract().await?,
    ))
}

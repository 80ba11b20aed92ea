// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::telemetry::setup_tracing;
use crate::{bet, game, games, usdc, vault};
use anyhow::Result;
use clap::{command, ArgAction, Parser, Subcommand};
use svb_config::load_config;
use tracing::{info, instrument, Level};

#[derive(Parser, Debug)]
#[command(name = "vaultbet")]
#[command(about = "A CLI for placing encrypted bets against the Stadium Vault contract", long_about = None)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,

    /// Indicate error levels by adding additional `-v` arguments. Eg. `vaultbet -vvv` will give
    /// you trace level output
    #[arg(
        short,
        long,
        action = ArgAction::Count,
        global = true
    )]
    pub verbose: u8,

    /// Silence all output. This argument cannot be used alongside `-v`
    #[arg(
        short,
        long,
        action = ArgAction::SetTrue,
        conflicts_with = "verbose",
        global = true
    )]
    quiet: bool,
}

impl Cli {
    pub fn log_level(&self) -> Level {
        if self.quiet {
            Level::ERROR
        } else {
            match self.verbose {
                0 => Level::WARN,  //
                1 => Level::INFO,  // -v
                2 => Level::DEBUG, // -vv
                _ => Level::TRACE, // -vvv
            }
        }
    }

    #[instrument(skip_all)]
    pub async fn execute(self) -> Result<()> {
        let config = load_config(self.config.as_deref())?;

        setup_tracing(self.log_level())?;
        info!("Config loaded from: {:?}", config.config_file());

        match self.command {
            Commands::Games => games::execute(&config).await?,
            Commands::Bet { command } => bet::execute(command, &config).await?,
            Commands::Game { command } => game::execute(command, &config).await?,
            Commands::Vault { command } => vault::execute(command, &config).await?,
            Commands::Usdc { command } => usdc::execute(command, &config).await?,
        }

        Ok(())
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List games, falling back to a placeholder schedule when the chain has none
    Games,

    /// Place and inspect encrypted bets
    Bet {
        #[command(subcommand)]
        command: bet::BetCommands,
    },

    /// Game administration
    Game {
        #[command(subcommand)]
        command: game::GameCommands,
    },

    /// Vault balance and funding
    Vault {
        #[command(subcommand)]
        command: vault::VaultCommands,
    },

    /// Test USDC token operations
    Usdc {
        #[command(subcommand)]
        command: usdc::UsdcCommands,
    },
}

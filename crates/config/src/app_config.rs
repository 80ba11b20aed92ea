// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::chain_config::ChainConfig;
use crate::contract::{Contract, ContractAddresses};
use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

pub const DEFAULT_CONFIG_NAME: &str = "vaultbet.config.yaml";

/// Top level application configuration.
///
/// Resolution order (later wins): built-in Sepolia defaults, the YAML config
/// file, then `SVB_*` environment variables (nested fields split on `__`,
/// e.g. `SVB_CHAIN__RPC_URL`).
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AppConfig {
    pub chain: ChainConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    config_file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            // Defaults mirror the Sepolia deployment the contract artifacts
            // were generated against.
            chain: ChainConfig {
                name: "sepolia".to_string(),
                chain_id: 11155111,
                rpc_url: "https://rpc.sepolia.org".to_string(),
                relayer_url: "https://relayer.testnet.zama.cloud".to_string(),
                explorer_url: "https://sepolia.etherscan.io".to_string(),
                currency_symbol: "ETH".to_string(),
                contracts: ContractAddresses {
                    vault_bet: Contract::AddressOnly(
                        "0x81C6B05D115838816B2D6E11162d533A6510a57B".to_string(),
                    ),
                    usdc_token: Contract::AddressOnly(
                        "0x9B89A787e6012d47459fDD71225155Df0C733Ba6".to_string(),
                    ),
                },
            },
            config_file: None,
        }
    }
}

impl AppConfig {
    pub fn config_file(&self) -> Option<&Path> {
        self.config_file.as_deref()
    }
}

/// Load the config at the given path, or from `vaultbet.config.yaml` in the
/// current directory if none is provided. A missing file is not an error:
/// defaults plus environment overrides still apply.
pub fn load_config(config_file: Option<&str>) -> Result<AppConfig> {
    let path = config_file
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_NAME));

    let mut figment = Figment::from(Serialized::defaults(AppConfig::default()));

    if path.exists() {
        info!(config = %path.display(), "Loading configuration file");
        figment = figment.merge(Yaml::file(&path));
    } else if config_file.is_some() {
        anyhow::bail!("Configuration file not found: {}", path.display());
    }

    let mut config: AppConfig = figment
        .merge(Env::prefixed("SVB_").split("__"))
        .extract()
        .context("Could not parse configuration")?;

    config.config_file = path.exists().then_some(path);
    config.chain.rpc_url()?;
    config.chain.relayer_url()?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn defaults_point_at_sepolia() {
        let config = AppConfig::default();
        assert_eq!(config.chain.chain_id, 11155111);
        assert_eq!(config.chain.name, "sepolia");
    }

    #[test]
    fn file_and_env_layering() {
        Jail::expect_with(|jail| {
            jail.create_file(
                DEFAULT_CONFIG_NAME,
                r#"
chain:
  name: localdev
  chain_id: 31337
  rpc_url: "http://localhost:8545"
  relayer_url: "http://localhost:8787"
  explorer_url: "http://localhost:3000"
  currency_symbol: ETH
  contracts:
    vault_bet: "0x0000000000000000000000000000000000000001"
    usdc_token: "0x0000000000000000000000000000000000000002"
"#,
            )?;
            jail.set_env("SVB_CHAIN__RPC_URL", "http://localhost:9999");

            let config = load_config(None).unwrap();
            assert_eq!(config.chain.chain_id, 31337);
            // env beats the file
            assert_eq!(config.chain.rpc_url, "http://localhost:9999");
            assert_eq!(
                config.chain.contracts.vault_bet.address(),
                "0x0000000000000000000000000000000000000001"
            );
            Ok(())
        });
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        Jail::expect_with(|_jail| {
            assert!(load_config(Some("does-not-exist.yaml")).is_err());
            Ok(())
        });
    }
}

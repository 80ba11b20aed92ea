// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::error::BootstrapError;
use base64::{engine::general_purpose::STANDARD, Engine};
use serde::Deserialize;
use std::time::Duration;
use tokio::time::sleep;
use tracing::debug;

const HEALTH_POLL_ATTEMPTS: u32 = 10;
const HEALTH_POLL_DELAY_MS: u64 = 500;

/// Network key material served by the relayer: the BFV parameter set the
/// deployment runs and the public key inputs are encrypted under.
#[derive(Debug, Clone, Deserialize)]
pub struct KeyMaterial {
    pub degree: usize,
    pub plaintext_modulus: u64,
    pub moduli: Vec<u64>,
    /// Base64-encoded serialized BFV public key.
    pub public_key: String,
}

impl KeyMaterial {
    pub fn public_key_bytes(&self) -> Result<Vec<u8>, BootstrapError> {
        STANDARD
            .decode(&self.public_key)
            .map_err(|e| BootstrapError::Fatal(format!("Invalid public key encoding: {e}")))
    }
}

/// Thin HTTP client for the deployment's FHE relayer.
#[derive(Debug, Clone)]
pub struct RelayerClient {
    base_url: String,
    http: reqwest::Client,
}

impl RelayerClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    /// Bounded polling of the relayer health endpoint. The runtime counts as
    /// present once a 2xx comes back; exhausting the poll budget is a
    /// transient failure (the outer retry loop owns the back-off).
    pub async fn wait_until_reachable(&self) -> Result<(), BootstrapError> {
        let url = format!("{}/healthz", self.base_url);
        let mut last_err = String::new();

        for attempt in 1..=HEALTH_POLL_ATTEMPTS {
            match self.http.get(&url).send().await {
                Ok(resp) if resp.status().is_success() => return Ok(()),
                Ok(resp) => last_err = format!("relayer health check returned {}", resp.status()),
                Err(e) => last_err = format!("relayer not reachable: {e}"),
            }
            debug!(attempt, max = HEALTH_POLL_ATTEMPTS, error = %last_err, "Relayer not ready");
            if attempt < HEALTH_POLL_ATTEMPTS {
                sleep(Duration::from_millis(HEALTH_POLL_DELAY_MS)).await;
            }
        }

        Err(BootstrapError::Transient(last_err))
    }

    /// Fetch the network-bound key material.
    pub async fn fetch_key_material(&self) -> Result<KeyMaterial, BootstrapError> {
        let url = format!("{}/v1/keys", self.base_url);
        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| BootstrapError::Transient(format!("key fetch failed: {e}")))?;

        let status = resp.status();
        if status.is_server_error() {
            return Err(BootstrapError::Transient(format!(
                "relayer key endpoint returned {status}"
            )));
        }
        if !status.is_success() {
            return Err(BootstrapError::Fatal(format!(
                "relayer key endpoint returned {status}"
            )));
        }

        resp.json::<KeyMaterial>()
            .await
            .map_err(|e| BootstrapError::Fatal(format!("malformed key material: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_material_decodes_base64_public_key() {
        let material: KeyMaterial = serde_json::from_value(serde_json::json!({
            "degree": 2048,
            "plaintext_modulus": 68719230977u64,
            "moduli": [2251799813046273u64],
            "public_key": STANDARD.encode([1u8, 2, 3]),
        }))
        .unwrap();
        assert_eq!(material.public_key_bytes().unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn bad_base64_is_fatal() {
        let material = KeyMaterial {
            degree: 2048,
            plaintext_modulus: 1,
            moduli: vec![1],
            public_key: "not base64!!".to_string(),
        };
        let err = material.public_key_bytes().unwrap_err();
        assert!(!err.is_transient());
    }

    #[test]
    fn trailing_slash_is_normalized() {
        let client = RelayerClient::new("http://localhost:8787/");
        assert_eq!(client.base_url, "http://localhost:8787");
    }
}

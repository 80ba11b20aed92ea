// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::encryptor::{BfvInputEncryptor, DegradedEncryptor, InputEncryptor};
use crate::error::BootstrapError;
use crate::keys::RelayerClient;
use crate::params::build_bfv_params_arc;
use async_trait::async_trait;
use fhe::bfv::PublicKey;
use fhe_traits::DeserializeParametrized;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

/// Observable session lifecycle. `Ready` and `Degraded` are terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    Initializing,
    Ready,
    Degraded { reason: String },
}

/// Retry budget for the bootstrap sequence. Tests inject a zero back-off.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Duration::from_secs(3),
        }
    }
}

/// One full bootstrap attempt: runtime presence check, one-time init, and
/// construction of the network-bound encryptor.
#[async_trait]
pub trait SessionBootstrap: Send + Sync {
    async fn bootstrap(&self) -> Result<Arc<dyn InputEncryptor>, BootstrapError>;
}

/// Bootstrap against the deployment's relayer: poll health, fetch key
/// material, build parameters and the public-key encryptor from it.
pub struct RelayerBootstrap {
    relayer: RelayerClient,
}

impl RelayerBootstrap {
    pub fn new(relayer: RelayerClient) -> Self {
        Self { relayer }
    }
}

#[async_trait]
impl SessionBootstrap for RelayerBootstrap {
    async fn bootstrap(&self) -> Result<Arc<dyn InputEncryptor>, BootstrapError> {
        self.relayer.wait_until_reachable().await?;

        let material = self.relayer.fetch_key_material().await?;
        let params = build_bfv_params_arc(
            material.degree,
            material.plaintext_modulus,
            &material.moduli,
        )
        .map_err(|e| BootstrapError::Fatal(format!("{e:#}")))?;

        let public_key = PublicKey::from_bytes(&material.public_key_bytes()?, &params)
            .map_err(|e| BootstrapError::Fatal(format!("Error deserializing public key: {e}")))?;

        Ok(Arc::new(BfvInputEncryptor::new(params, public_key)))
    }
}

enum Slot {
    Uninitialized,
    Initializing,
    Ready(Arc<dyn InputEncryptor>),
    Degraded(String),
}

/// Process-wide encryption session. Initialization is single-flight: the
/// first caller runs the bootstrap retry loop while concurrent callers wait
/// on the same attempt instead of starting their own.
pub struct EncryptionSession {
    bootstrap: Arc<dyn SessionBootstrap>,
    policy: RetryPolicy,
    slot: Mutex<Slot>,
    flight: tokio::sync::Mutex<()>,
}

impl EncryptionSession {
    pub fn new(bootstrap: Arc<dyn SessionBootstrap>, policy: RetryPolicy) -> Self {
        Self {
            bootstrap,
            policy,
            slot: Mutex::new(Slot::Uninitialized),
            flight: tokio::sync::Mutex::new(()),
        }
    }

    pub fn state(&self) -> SessionState {
        match &*self.slot.lock().expect("session state lock poisoned") {
            Slot::Uninitialized => SessionState::Uninitialized,
            Slot::Initializing => SessionState::Initializing,
            Slot::Ready(_) => SessionState::Ready,
            Slot::Degraded(reason) => SessionState::Degraded {
                reason: reason.clone(),
            },
        }
    }

    /// Idempotent. Always yields an encryptor: the shared instance once
    /// `Ready`, or a fail-fast stub once `Degraded`.
    pub async fn ensure_ready(&self) -> Arc<dyn InputEncryptor> {
        if let Some(encryptor) = self.settled() {
            return encryptor;
        }

        let _flight = self.flight.lock().await;
        // Re-check: another caller may have settled the session while we
        // waited on the flight guard.
        if let Some(encryptor) = self.settled() {
            return encryptor;
        }

        self.set_slot(Slot::Initializing);

        let mut attempt = 1u32;
        let last_error = loop {
            match self.bootstrap.bootstrap().await {
                Ok(encryptor) => {
                    info!(attempt, "Encryption session ready");
                    self.set_slot(Slot::Ready(encryptor.clone()));
                    return encryptor;
                }
                Err(e) if e.is_transient() && attempt < self.policy.max_attempts => {
                    warn!(
                        attempt,
                        max = self.policy.max_attempts,
                        error = e.message(),
                        "Encryption bootstrap failed, retrying after back-off"
                    );
                    sleep(self.policy.backoff).await;
                    attempt += 1;
                }
                Err(e) => break e.message().to_string(),
            }
        };

        warn!(error = %last_error, "Encryption session degraded; continuing without encryption");
        self.set_slot(Slot::Degraded(last_error.clone()));
        Arc::new(DegradedEncryptor::new(last_error))
    }

    fn settled(&self) -> Option<Arc<dyn InputEncryptor>> {
        match &*self.slot.lock().expect("session state lock poisoned") {
            Slot::Ready(encryptor) => Some(encryptor.clone()),
            Slot::Degraded(reason) => Some(Arc::new(DegradedEncryptor::new(reason.clone()))),
            _ => None,
        }
    }

    fn set_slot(&self, slot: Slot) {
        *self.slot.lock().expect("session state lock poisoned") = slot;
    }
}

// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::error::EncryptError;
use crate::input::{InputBinding, PlainField, SealedInput};
use async_trait::async_trait;
use fhe::bfv::{BfvParameters, Encoding, Plaintext, PublicKey};
use fhe_traits::{FheEncoder, FheEncrypter, Serialize as FheSerialize};
use rand::thread_rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::Arc;

const HANDLE_DOMAIN: &[u8] = b"SVB_INPUT_V1";

/// Seals an ordered field list into ciphertext handles plus an input proof.
/// Implementations must be deterministic in handle *shape* (32 bytes, one
/// per field, order preserved) but not in handle content.
#[async_trait]
pub trait InputEncryptor: Send + Sync {
    async fn seal(
        &self,
        binding: InputBinding,
        fields: &[PlainField],
    ) -> Result<SealedInput, EncryptError>;
}

/// Payload carried as the input proof: the binding plus the ciphertexts the
/// handles commit to. The receiving side re-derives the commitments to check
/// the handles were honestly produced for this (contract, user) pair.
#[derive(Debug, Serialize, Deserialize)]
pub struct ProofPayload {
    pub contract: [u8; 20],
    pub user: [u8; 20],
    pub ciphertexts: Vec<Vec<u8>>,
}

/// Commitment of one ciphertext to its binding and position.
pub fn field_handle(binding: InputBinding, index: u8, ciphertext: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(HANDLE_DOMAIN);
    hasher.update(binding.contract.as_slice());
    hasher.update(binding.user.as_slice());
    hasher.update([index]);
    hasher.update(ciphertext);
    hasher.finalize().into()
}

/// BFV-backed encryptor bound to the network key material fetched at
/// session bootstrap.
pub struct BfvInputEncryptor {
    params: Arc<BfvParameters>,
    public_key: PublicKey,
}

impl BfvInputEncryptor {
    pub fn new(params: Arc<BfvParameters>, public_key: PublicKey) -> Self {
        Self { params, public_key }
    }
}

#[async_trait]
impl InputEncryptor for BfvInputEncryptor {
    async fn seal(
        &self,
        binding: InputBinding,
        fields: &[PlainField],
    ) -> Result<SealedInput, EncryptError> {
        let mut handles = Vec::with_capacity(fields.len());
        let mut ciphertexts = Vec::with_capacity(fields.len());

        for (index, field) in fields.iter().enumerate() {
            let value = field.value();
            if value >= self.params.plaintext() {
                return Err(EncryptError::OutOfRange {
                    value,
                    bits: field.bit_width(),
                });
            }

            let pt = Plaintext::try_encode(&[value], Encoding::poly(), &self.params)
                .map_err(|e| EncryptError::Encryption(format!("Error encoding plaintext: {e}")))?;
            let ct = self
                .public_key
                .try_encrypt(&pt, &mut thread_rng())
                .map_err(|e| EncryptError::Encryption(format!("Error encrypting field: {e}")))?;

            let ct_bytes = ct.to_bytes();
            handles.push(field_handle(binding, index as u8, &ct_bytes));
            ciphertexts.push(ct_bytes);
        }

        let proof = bincode::serialize(&ProofPayload {
            contract: binding.contract.into_array(),
            user: binding.user.into_array(),
            ciphertexts,
        })
        .map_err(|e| EncryptError::Encryption(format!("Error serializing proof: {e}")))?;

        Ok(SealedInput { handles, proof })
    }
}

/// Stub returned once the session is degraded: every operation fails fast
/// with the recorded bootstrap error so read-only paths keep working.
pub struct DegradedEncryptor {
    reason: String,
}

impl DegradedEncryptor {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl InputEncryptor for DegradedEncryptor {
    async fn seal(
        &self,
        _binding: InputBinding,
        _fields: &[PlainField],
    ) -> Result<SealedInput, EncryptError> {
        Err(EncryptError::Unavailable(self.reason.clone()))
    }
}

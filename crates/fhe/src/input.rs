// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::encryptor::InputEncryptor;
use crate::error::EncryptError;
use alloy_primitives::Address;

/// A typed plaintext field queued for encryption. The contract interprets
/// handle[i] positionally, so the field order is part of the protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlainField {
    U32(u32),
    U8(u8),
}

impl PlainField {
    pub fn value(&self) -> u64 {
        match self {
            PlainField::U32(v) => *v as u64,
            PlainField::U8(v) => *v as u64,
        }
    }

    pub fn bit_width(&self) -> u32 {
        match self {
            PlainField::U32(_) => 32,
            PlainField::U8(_) => 8,
        }
    }
}

/// The (contract, user) pair the sealed input is cryptographically bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputBinding {
    pub contract: Address,
    pub user: Address,
}

/// One ciphertext handle per field, order preserved, plus the input proof
/// attesting the handles were derived for the builder's binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedInput {
    pub handles: Vec<[u8; 32]>,
    pub proof: Vec<u8>,
}

/// Ordered builder for one encrypted submission. Sealing consumes the
/// builder, so no field can be appended after the handles exist.
#[derive(Debug, Clone)]
pub struct EncryptedInputBuilder {
    binding: InputBinding,
    fields: Vec<PlainField>,
}

impl EncryptedInputBuilder {
    pub fn new(contract: Address, user: Address) -> Self {
        Self {
            binding: InputBinding { contract, user },
            fields: Vec::new(),
        }
    }

    pub fn add_u32(mut self, value: u32) -> Self {
        self.fields.push(PlainField::U32(value));
        self
    }

    pub fn add_u8(mut self, value: u8) -> Self {
        self.fields.push(PlainField::U8(value));
        self
    }

    pub fn binding(&self) -> InputBinding {
        self.binding
    }

    pub fn fields(&self) -> &[PlainField] {
        &self.fields
    }

    pub async fn seal(self, encryptor: &dyn InputEncryptor) -> Result<SealedInput, EncryptError> {
        encryptor.seal(self.binding, &self.fields).await
    }
}

// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

//! BFV parameter construction for the betting input scheme. The plaintext
//! modulus must exceed 2^32 so a scaled stake amount encodes into a single
//! coefficient.

use anyhow::{Context, Result};
use fhe::bfv::{BfvParameters, BfvParametersBuilder};
use std::sync::Arc;

pub const DEGREE: usize = 2048;
pub const PLAINTEXT_MODULUS: u64 = 0xffffee001;
pub const MODULI: &[u64] = &[0x7fffffffe0001];

pub fn build_bfv_params_arc(
    degree: usize,
    plaintext_modulus: u64,
    moduli: &[u64],
) -> Result<Arc<BfvParameters>> {
    BfvParametersBuilder::new()
        .set_degree(degree)
        .set_plaintext_modulus(plaintext_modulus)
        .set_moduli(moduli)
        .build_arc()
        .context("Failed to build BFV parameters")
}

/// The default parameter set used when the relayer does not dictate one.
pub fn default_params_arc() -> Result<Arc<BfvParameters>> {
    build_bfv_params_arc(DEGREE, PLAINTEXT_MODULUS, MODULI)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_params_build() {
        let params = default_params_arc().unwrap();
        assert_eq!(params.degree(), DEGREE);
    }

    #[test]
    fn plaintext_modulus_covers_u32_amounts() {
        assert!(PLAINTEXT_MODULUS > u32::MAX as u64);
    }
}

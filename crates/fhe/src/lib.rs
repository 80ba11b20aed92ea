// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

//! Client-side FHE plumbing for the betting contract: a process-wide
//! encryption session with single-flight bootstrap, and a positional
//! encrypted-input builder whose sealed output (handles + input proof) is
//! bound to a (contract, user) pair.

mod encryptor;
mod error;
mod input;
mod keys;
pub mod params;
mod session;

pub use encryptor::*;
pub use error::*;
pub use input::*;
pub use keys::*;
pub use session::*;

// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use std::future::Future;
use tokio::time::{sleep, Duration};
use tracing::info;

const RETRY_MAX_ATTEMPTS: u32 = 3;
const RETRY_INITIAL_DELAY_MS: u64 = 2000;

fn should_retry_error(error: &str, retry_on_errors: &[&str]) -> bool {
    if retry_on_errors.is_empty() {
        return true;
    }
    retry_on_errors.iter().any(|code| error.contains(code))
}

/// Bounded retry for read-only RPC calls. Writes are never routed through
/// here: repeating a state-changing call risks double-submission.
pub async fn call_with_retry<F, Fut, T>(
    operation_name: &str,
    retry_on_errors: &[&str],
    read_fn: F,
) -> eyre::Result<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = eyre::Result<T>>,
{
    let mut attempts = 0;
    let mut delay = RETRY_INITIAL_DELAY_MS;

    loop {
        attempts += 1;
        match read_fn().await {
            Ok(value) => return Ok(value),
            Err(e) => {
                if !should_retry_error(&e.to_string(), retry_on_errors)
                    || attempts >= RETRY_MAX_ATTEMPTS
                {
                    return Err(e);
                }
                info!(
                    "{}: error (attempt {}/{}), will retry after {}ms: {}",
                    operation_name, attempts, RETRY_MAX_ATTEMPTS, delay, e
                );
                sleep(Duration::from_millis(delay)).await;
                delay *= 2;
            }
        }
    }
}

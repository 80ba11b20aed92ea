// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use alloy::primitives::U256;
use alloy::rpc::types::Log;
use alloy::sol;
use alloy::sol_types::SolEvent;

sol! {
    #[derive(Debug)]
    event BetPlaced(uint256 indexed betId, uint256 indexed gameId, address indexed bettor);

    #[derive(Debug)]
    event GameCreated(uint256 indexed gameId, string homeTeam, string awayTeam);
}

/// Bet identifier from the first `BetPlaced` log in a receipt. `None` when
/// the event was not emitted; callers decide whether that is an error.
pub fn extract_bet_id(logs: &[Log]) -> Option<U256> {
    logs.iter().find_map(|log| {
        if log.topic0() != Some(&BetPlaced::SIGNATURE_HASH) {
            return None;
        }
        log.log_decode::<BetPlaced>()
            .ok()
            .map(|decoded| decoded.inner.data.betId)
    })
}

/// Game identifier from the first `GameCreated` log in a receipt.
pub fn extract_game_id(logs: &[Log]) -> Option<U256> {
    logs.iter().find_map(|log| {
        if log.topic0() != Some(&GameCreated::SIGNATURE_HASH) {
            return None;
        }
        log.log_decode::<GameCreated>()
            .ok()
            .map(|decoded| decoded.inner.data.gameId)
    })
}

// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::bets::TeamSelection;
use alloy::primitives::{Address, U256};
use chrono::Utc;
use std::sync::Arc;
use svb_evm_helpers::contracts::VaultBetRead;
use svb_evm_helpers::retry::call_with_retry;
use tracing::warn;

/// Unix timestamps at or below this are placeholder junk some deployments
/// store instead of a real schedule (roughly pre-2001).
pub const TIMESTAMP_SANITY_FLOOR: u64 = 1_000_000_000;

const SYNTH_START_OFFSET_SECS: u64 = 24 * 60 * 60;
const SYNTH_GAME_SPACING_SECS: u64 = 2 * 60 * 60;
const SYNTH_GAME_DURATION_SECS: u64 = 3 * 60 * 60;

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Game {
    pub id: u64,
    pub home_team: String,
    pub away_team: String,
    pub start_time: u64,
    pub end_time: u64,
    pub is_active: bool,
    pub is_finished: bool,
}

/// Game list with its provenance kept visible: real chain data or the
/// synthesized fallback schedule. Callers must be able to tell them apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GamesView {
    Live(Vec<Game>),
    Placeholder(Vec<Game>),
}

impl GamesView {
    pub fn games(&self) -> &[Game] {
        match self {
            GamesView::Live(games) | GamesView::Placeholder(games) => games,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, GamesView::Placeholder(_))
    }
}

/// One of the caller's bets. The selection stays encrypted on-chain, so it
/// is reported as absent rather than guessed.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct UserBet {
    pub bet_id: u64,
    pub game_id: u64,
    pub timestamp: u64,
    pub is_active: bool,
    pub is_settled: bool,
    pub selection: Option<TeamSelection>,
}

fn placeholder_schedule(now: u64) -> Vec<Game> {
    let fixtures = [
        ("Lakers", "Warriors"),
        ("Cowboys", "Giants"),
        ("City", "United"),
    ];
    fixtures
        .iter()
        .enumerate()
        .map(|(i, (home, away))| {
            let start = now + SYNTH_START_OFFSET_SECS + i as u64 * SYNTH_GAME_SPACING_SECS;
            Game {
                id: i as u64,
                home_team: home.to_string(),
                away_team: away.to_string(),
                start_time: start,
                end_time: start + SYNTH_GAME_DURATION_SECS,
                is_active: true,
                is_finished: false,
            }
        })
        .collect()
}

/// Replace corrupt schedule values with a synthesized future slot. A stored
/// zero (or anything below the sanity floor) is never shown as-is.
fn sanitize_schedule(index: u64, start: u64, end: u64, now: u64) -> (u64, u64) {
    if start > TIMESTAMP_SANITY_FLOOR {
        let end = if end > start {
            end
        } else {
            start + SYNTH_GAME_DURATION_SECS
        };
        return (start, end);
    }
    let start = now + SYNTH_START_OFFSET_SECS + index * SYNTH_GAME_SPACING_SECS;
    (start, start + SYNTH_GAME_DURATION_SECS)
}

/// Read-only query layer. Availability beats accuracy on this path: the
/// caller always gets something renderable.
pub struct GameReader {
    contract: Arc<dyn VaultBetRead + Send + Sync>,
}

impl GameReader {
    pub fn new(contract: Arc<dyn VaultBetRead + Send + Sync>) -> Self {
        Self { contract }
    }

    /// Never fails: a read error or an empty chain both degrade to the
    /// placeholder schedule, tagged as such.
    pub async fn list_games(&self) -> GamesView {
        self.list_games_at(Utc::now().timestamp() as u64).await
    }

    async fn list_games_at(&self, now: u64) -> GamesView {
        match self.read_games(now).await {
            Ok(games) if !games.is_empty() => GamesView::Live(games),
            Ok(_) => GamesView::Placeholder(placeholder_schedule(now)),
            Err(e) => {
                warn!(error = %format!("{e:#}"), "Game read failed, serving placeholder schedule");
                GamesView::Placeholder(placeholder_schedule(now))
            }
        }
    }

    async fn read_games(&self, now: u64) -> eyre::Result<Vec<Game>> {
        // Only infrastructure hiccups are worth retrying; contract-level
        // failures surface immediately and degrade to the placeholder view.
        let transient = &["connection", "timed out", "timeout", "429", "503"];
        let count = call_with_retry("getGameCount", transient, || async {
            self.contract.get_game_count().await
        })
        .await?;
        let count = u64::try_from(count).unwrap_or(0);

        let mut games = Vec::with_capacity(count as usize);
        for index in 0..count {
            let record = self.contract.get_game(U256::from(index)).await?;
            let status = self.contract.get_game_basic_info(U256::from(index)).await?;

            let raw_start = u64::try_from(record.start_time).unwrap_or(0);
            let raw_end = u64::try_from(record.end_time).unwrap_or(0);
            let (start_time, end_time) = sanitize_schedule(index, raw_start, raw_end, now);

            games.push(Game {
                id: index,
                home_team: record.home_team,
                away_team: record.away_team,
                start_time,
                end_time,
                is_active: status.is_active,
                is_finished: status.is_finished,
            });
        }
        Ok(games)
    }

    /// Best-effort scan of the caller's bets. Unreadable records are skipped
    /// rather than failing the whole listing.
    pub async fn list_user_bets(&self, user: Address) -> Vec<UserBet> {
        let count = match self.contract.get_bet_count().await {
            Ok(count) => u64::try_from(count).unwrap_or(0),
            Err(e) => {
                warn!(error = %format!("{e:#}"), "Bet count read failed");
                return Vec::new();
            }
        };

        let mut bets = Vec::new();
        for bet_id in 0..count {
            let record = match self.contract.get_bet_basic_info(U256::from(bet_id)).await {
                Ok(record) => record,
                Err(e) => {
                    warn!(bet_id, error = %format!("{e:#}"), "Skipping unreadable bet");
                    continue;
                }
            };
            if record.bettor != user {
                continue;
            }
            bets.push(UserBet {
                bet_id,
                game_id: u64::try_from(record.game_id).unwrap_or(0),
                timestamp: u64::try_from(record.timestamp).unwrap_or(0),
                is_active: record.is_active,
                is_settled: record.is_settled,
                selection: None,
            });
        }
        bets
    }
}

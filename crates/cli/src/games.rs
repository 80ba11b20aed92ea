// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::context::AppContext;
use anyhow::Result;
use chrono::DateTime;
use svb_config::AppConfig;
use svb_sdk::GameReader;

fn fmt_ts(ts: u64) -> String {
    DateTime::from_timestamp(ts as i64, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_else(|| ts.to_string())
}

pub async fn execute(config: &AppConfig) -> Result<()> {
    let ctx = AppContext::new(config);
    let reader = GameReader::new(ctx.read_contract().await?);

    let view = reader.list_games().await;
    if view.is_placeholder() {
        println!("No live games on-chain; showing a placeholder schedule.");
    }
    for game in view.games() {
        println!(
            "#{:<4} {} vs {}  {}  -  {}  [{}]",
            game.id,
            game.home_team,
            game.away_team,
            fmt_ts(game.start_time),
            fmt_ts(game.end_time),
            if game.is_finished {
                "finished"
            } else if game.is_active {
                "open"
            } else {
                "closed"
            },
        );
    }
    Ok(())
}

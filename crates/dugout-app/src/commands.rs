// Command handlers. Each returns the JSON document the binary prints.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use dugout_baseball::ingest::ingest;
use dugout_baseball::provider::{
    batting_path, load_batting, load_register, BattingTable, RosterSource, StatsApiClient,
};
use dugout_baseball::seed::RosterSeeder;
use dugout_core::config::Config;
use dugout_core::saved::UserId;
use dugout_core::store::PlayerStore;
use dugout_core::{DugoutError, Result};

use crate::cli::{Command, SavedCmd};
use crate::service::{PlayerService, SavedPlayers};

fn to_json<T: Serialize>(value: &T) -> Result<Value> {
    serde_json::to_value(value).map_err(|source| DugoutError::Encode {
        what: "command output",
        source,
    })
}

pub async fn run(command: Command, config: &Config, store: Arc<dyn PlayerStore>) -> Result<Value> {
    match command {
        Command::Search {
            query,
            limit,
            cutoff,
        } => {
            let service = PlayerService::new(store, config);
            to_json(&service.search(&query, limit, cutoff).await?)
        }
        Command::Detail { id } => {
            let service = PlayerService::new(store, config);
            to_json(&service.get_detail(id).await?)
        }
        Command::Saved { cmd } => run_saved(cmd, store).await,
        Command::Ingest => {
            to_json(&ingest(store.as_ref(), &config.data, &config.seasons).await?)
        }
        Command::SeedRosters { team, season } => {
            let season = season.unwrap_or(config.roster.season);
            let source: Arc<dyn RosterSource> = Arc::new(StatsApiClient::new(
                config.roster.stats_api_base.clone(),
                Duration::from_secs(config.roster.request_timeout_secs),
            )?);
            let seeder = build_seeder(config, store, source, season)?;
            match team {
                Some(code) => match seeder.seed_team(&code, season).await? {
                    Some(roster) => to_json(&roster),
                    None => Ok(Value::Null),
                },
                None => to_json(&seeder.seed_all(season).await),
            }
        }
        Command::Roster { team } => {
            let service = PlayerService::new(store, config);
            to_json(&service.team_roster(&team).await?)
        }
    }
}

async fn run_saved(cmd: SavedCmd, store: Arc<dyn PlayerStore>) -> Result<Value> {
    let saved = SavedPlayers::new(store);
    match cmd {
        SavedCmd::List { user } => to_json(&saved.list(&UserId::new(user)).await?),
        SavedCmd::Add { user, payload } => {
            let payload: Value = serde_json::from_str(&payload)
                .map_err(|e| DugoutError::invalid_input(format!("payload is not JSON: {e}")))?;
            to_json(&saved.add(&UserId::new(user), payload).await?)
        }
        SavedCmd::Get { user, id } => to_json(&saved.get(&UserId::new(user), &id).await?),
        SavedCmd::Remove { user, id } => {
            saved.remove(&UserId::new(user), &id).await?;
            Ok(serde_json::json!({ "removed": id }))
        }
    }
}

/// Batting lines used to score candidates: the requested season's export,
/// or the latest ingested season when that one is not available yet.
fn load_scoring_table(config: &Config, season: u16) -> Result<BattingTable> {
    let dir = Path::new(&config.data.batting_dir);
    match load_batting(&batting_path(dir, season), season) {
        Ok(table) => Ok(table),
        Err(e) if season != config.seasons.current_year => {
            let fallback = config.seasons.current_year;
            warn!("No batting export for {} ({}); scoring with {}", season, e, fallback);
            Ok(load_batting(&batting_path(dir, fallback), fallback)?)
        }
        Err(e) => Err(e.into()),
    }
}

pub fn build_seeder(
    config: &Config,
    store: Arc<dyn PlayerStore>,
    source: Arc<dyn RosterSource>,
    season: u16,
) -> Result<RosterSeeder> {
    let register = load_register(Path::new(&config.data.register_path))?;
    let batting = load_scoring_table(config, season)?;
    info!(
        "Seeding rosters for {} with {} register ids and {} batting lines from {}",
        season,
        register.len(),
        batting.len(),
        batting.season
    );
    Ok(RosterSeeder::new(
        store,
        source,
        Arc::new(register),
        Arc::new(batting),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::BTreeMap;

    #[test]
    fn unencodable_output_is_an_encode_error() {
        let mut by_pair = BTreeMap::new();
        by_pair.insert((2024, 1), "non-string map key");

        let err = to_json(&by_pair).unwrap_err();
        assert!(matches!(err, DugoutError::Encode { what: "command output", .. }));
        assert!(!err.is_not_found());
        assert!(!err.is_unavailable());
    }

    #[test]
    fn serializable_output_passes_through() {
        let value = to_json(&vec![1, 2, 3]).unwrap();
        assert_eq!(value, serde_json::json!([1, 2, 3]));
    }
}

// Build stored player records from yearly batting exports.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use dugout_core::config::{DataPaths, SeasonsConfig};
use dugout_core::player::{PlayerRecord, SeasonStat};
use dugout_core::store::PlayerStore;
use dugout_core::{DugoutError, Result};

use crate::provider::{batting_path, load_batting, load_register, BattingTable, IdRegister};

/// Counts from one ingestion run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub seasons_loaded: usize,
    pub players_written: usize,
    pub skipped_without_mlbam_id: usize,
    pub skipped_without_seasons: usize,
}

/// Stored form of one season: the typed line serialized, with defense
/// under its provider name `def`.
fn season_value(stat: &SeasonStat) -> Option<Value> {
    match serde_json::to_value(stat) {
        Ok(Value::Object(mut map)) => {
            if let Some(def) = map.remove("defense") {
                map.insert("def".to_string(), def);
            }
            Some(Value::Object(map))
        }
        Ok(_) => None,
        Err(e) => {
            warn!("could not serialize season line: {}", e);
            None
        }
    }
}

/// Assemble records for every player in the `current_year` table.
///
/// Each player collects every season (across `tables`) where they reached
/// `min_plate_appearances`. Players the register cannot map to an MLBAM id,
/// or with no qualifying season, are skipped. `overall_score` is the wRC+ of
/// the most recent qualifying season.
pub fn build_player_records(
    tables: &BTreeMap<u16, BattingTable>,
    register: &IdRegister,
    current_year: u16,
    min_plate_appearances: u32,
    report: &mut IngestReport,
) -> Result<Vec<PlayerRecord>> {
    let current = tables.get(&current_year).ok_or_else(|| {
        DugoutError::provider_unavailable(format!("no batting table for {current_year}"))
    })?;

    let mut seen = HashSet::new();
    let mut records = Vec::new();

    for line in current.lines() {
        let Some(mlbam_id) = register.mlbam_for(line.fangraphs_id) else {
            debug!("skipping {} ({}): no MLBAM id", line.name, line.fangraphs_id);
            report.skipped_without_mlbam_id += 1;
            continue;
        };
        if !seen.insert(mlbam_id) {
            continue;
        }

        let mut seasons = BTreeMap::new();
        let mut latest_wrc_plus = 0.0;
        for (year, table) in tables {
            let Some(season) = table.get(line.fangraphs_id) else {
                continue;
            };
            if season.stat.plate_appearances < min_plate_appearances {
                continue;
            }
            if let Some(value) = season_value(&season.stat) {
                seasons.insert(year.to_string(), value);
                // Tables iterate in ascending year order.
                latest_wrc_plus = season.stat.wrc_plus;
            }
        }

        if seasons.is_empty() {
            debug!("skipping {} ({}): no qualifying seasons", line.name, line.fangraphs_id);
            report.skipped_without_seasons += 1;
            continue;
        }

        records.push(PlayerRecord {
            id: mlbam_id,
            fangraphs_id: Some(line.fangraphs_id),
            name: line.name.clone(),
            team_abbrev: line.team_abbrev.clone(),
            overall_score: latest_wrc_plus,
            seasons,
        });
    }

    Ok(records)
}

/// Read `batting_<year>.csv` for every configured season. A missing or
/// unreadable year is logged and left out.
pub fn load_batting_tables(dir: &Path, seasons: &SeasonsConfig) -> BTreeMap<u16, BattingTable> {
    let mut tables = BTreeMap::new();
    for year in seasons.first_year..=seasons.current_year {
        match load_batting(&batting_path(dir, year), year) {
            Ok(table) => {
                info!("Loaded {} batting lines for {}", table.len(), year);
                tables.insert(year, table);
            }
            Err(e) => warn!("Skipping {} batting stats: {}", year, e),
        }
    }
    tables
}

/// Load the exports and the id register from disk, build records, and
/// upsert them into `store`.
pub async fn ingest(
    store: &dyn PlayerStore,
    paths: &DataPaths,
    seasons: &SeasonsConfig,
) -> Result<IngestReport> {
    let register = load_register(Path::new(&paths.register_path))?;
    info!("Id register has {} entries", register.len());

    let tables = load_batting_tables(Path::new(&paths.batting_dir), seasons);

    let mut report = IngestReport {
        seasons_loaded: tables.len(),
        ..IngestReport::default()
    };
    let records = build_player_records(
        &tables,
        &register,
        seasons.current_year,
        seasons.min_plate_appearances,
        &mut report,
    )?;

    report.players_written = store.upsert_players(&records).await?;
    info!(
        "Ingested {} players from {} seasons",
        report.players_written, report.seasons_loaded
    );
    Ok(report)
}

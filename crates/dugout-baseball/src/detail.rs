// Full multi-season record for one player.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use dugout_core::player::SeasonStat;
use dugout_core::store::PlayerStore;
use dugout_core::{DugoutError, Result};

use crate::search::image_url;
use crate::years::years_active;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerDetail {
    pub id: i64,
    pub name: String,
    pub fangraphs_id: Option<i64>,
    pub team_abbrev: Option<String>,
    pub image_url: String,
    pub years_active: String,
    /// As stored at ingestion; not recomputed from `seasons`.
    pub overall_score: f64,
    /// Every season keyed by four-digit year, ascending.
    pub seasons: BTreeMap<String, SeasonStat>,
}

/// Fetch one player and expand their stored seasons into typed stat lines.
///
/// Seasons that fail to decode are logged and come back zeroed rather than
/// failing the whole lookup.
pub async fn get_detail(
    store: &dyn PlayerStore,
    id: i64,
    image_url_template: &str,
    current_year: u16,
) -> Result<PlayerDetail> {
    let record = store
        .fetch_player(id)
        .await?
        .ok_or(DugoutError::PlayerNotFound { id })?;

    Ok(PlayerDetail {
        id: record.id,
        image_url: image_url(image_url_template, record.id),
        years_active: years_active(record.season_years(), current_year),
        seasons: record.typed_seasons(),
        name: record.name,
        fangraphs_id: record.fangraphs_id,
        team_abbrev: record.team_abbrev,
        overall_score: record.overall_score,
    })
}

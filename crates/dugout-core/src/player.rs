// Player identity, stored player records, and typed season stat lines.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::error::DugoutError;
use crate::lenient;

/// Who a player is, independent of any statistics.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerIdentity {
    /// MLBAM id; the primary key everywhere.
    pub id: i64,
    pub name: String,
    /// FanGraphs id, when the id register knows it.
    #[serde(default)]
    pub secondary_id: Option<i64>,
}

/// A player as written by ingestion and kept in the store.
///
/// `seasons` holds the raw per-year stat maps exactly as ingested (provider
/// field names included). Typed access goes through [`SeasonStat::from_raw`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRecord {
    #[serde(rename = "mlbam_id")]
    pub id: i64,
    #[serde(default, deserialize_with = "lenient::opt_i64")]
    pub fangraphs_id: Option<i64>,
    pub name: String,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub team_abbrev: Option<String>,
    /// Most recent season's wRC+, frozen at ingestion time.
    #[serde(default, deserialize_with = "lenient::zero_f64")]
    pub overall_score: f64,
    #[serde(default)]
    pub seasons: BTreeMap<String, Value>,
}

impl PlayerRecord {
    pub fn identity(&self) -> PlayerIdentity {
        PlayerIdentity {
            id: self.id,
            name: self.name.clone(),
            secondary_id: self.fangraphs_id,
        }
    }

    /// Season years present on this record, ascending. Keys that are not
    /// four-digit years are skipped.
    pub fn season_years(&self) -> Vec<u16> {
        self.seasons
            .keys()
            .filter_map(|key| parse_season_key(key))
            .collect()
    }

    /// Decode every season into a typed stat line, keyed by year string.
    pub fn typed_seasons(&self) -> BTreeMap<String, SeasonStat> {
        self.seasons
            .iter()
            .filter(|(year, _)| parse_season_key(year).is_some())
            .map(|(year, raw)| {
                let context = format!("player {} season {}", self.id, year);
                (year.clone(), SeasonStat::from_raw(&context, raw))
            })
            .collect()
    }
}

/// Parse a season key, accepting only four-digit years.
pub fn parse_season_key(key: &str) -> Option<u16> {
    if key.len() == 4 && key.bytes().all(|b| b.is_ascii_digit()) {
        key.parse().ok()
    } else {
        None
    }
}

/// One player's statistics for one season.
///
/// Counting and rate stats default to zero when missing or unparseable.
/// Contact-quality metrics stay `None` when the provider did not report
/// them. Anything unrecognized lands in `extra` and is written back out
/// unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeasonStat {
    // Counting stats
    #[serde(default, deserialize_with = "lenient::zero_u32")]
    pub games: u32,
    #[serde(default, deserialize_with = "lenient::zero_u32")]
    pub plate_appearances: u32,
    #[serde(default, deserialize_with = "lenient::zero_u32")]
    pub at_bats: u32,
    #[serde(default, deserialize_with = "lenient::zero_u32")]
    pub hits: u32,
    #[serde(default, deserialize_with = "lenient::zero_u32")]
    pub singles: u32,
    #[serde(default, deserialize_with = "lenient::zero_u32")]
    pub doubles: u32,
    #[serde(default, deserialize_with = "lenient::zero_u32")]
    pub triples: u32,
    #[serde(default, deserialize_with = "lenient::zero_u32")]
    pub home_runs: u32,
    #[serde(default, deserialize_with = "lenient::zero_u32")]
    pub runs: u32,
    #[serde(default, deserialize_with = "lenient::zero_u32")]
    pub rbi: u32,
    #[serde(default, deserialize_with = "lenient::zero_u32")]
    pub walks: u32,
    #[serde(default, deserialize_with = "lenient::zero_u32")]
    pub strikeouts: u32,
    #[serde(default, deserialize_with = "lenient::zero_u32")]
    pub stolen_bases: u32,
    #[serde(default, deserialize_with = "lenient::zero_u32")]
    pub caught_stealing: u32,

    // Rate stats
    #[serde(default, deserialize_with = "lenient::zero_f64")]
    pub batting_average: f64,
    #[serde(default, deserialize_with = "lenient::zero_f64")]
    pub on_base_percentage: f64,
    #[serde(default, deserialize_with = "lenient::zero_f64")]
    pub slugging_percentage: f64,
    #[serde(default, deserialize_with = "lenient::zero_f64")]
    pub ops: f64,
    #[serde(default, deserialize_with = "lenient::zero_f64")]
    pub isolated_power: f64,
    #[serde(default, deserialize_with = "lenient::zero_f64")]
    pub babip: f64,

    // Plate discipline, as fractions (0.123 rather than 12.3)
    #[serde(default, deserialize_with = "lenient::zero_f64")]
    pub walk_rate: f64,
    #[serde(default, deserialize_with = "lenient::zero_f64")]
    pub strikeout_rate: f64,
    #[serde(default, deserialize_with = "lenient::zero_f64")]
    pub bb_k_ratio: f64,

    // Advanced
    #[serde(default, deserialize_with = "lenient::zero_f64")]
    pub woba: f64,
    #[serde(default, deserialize_with = "lenient::zero_f64")]
    pub wrc_plus: f64,
    #[serde(default, deserialize_with = "lenient::zero_f64")]
    pub war: f64,
    #[serde(default, deserialize_with = "lenient::zero_f64")]
    pub off: f64,
    /// Stored by ingestion under the provider name `def`.
    #[serde(alias = "def", default, deserialize_with = "lenient::zero_f64")]
    pub defense: f64,
    #[serde(default, deserialize_with = "lenient::zero_f64")]
    pub base_running: f64,

    // Contact quality (absent for seasons before tracking data)
    #[serde(
        default,
        deserialize_with = "lenient::opt_f64",
        skip_serializing_if = "Option::is_none"
    )]
    pub hard_hit_rate: Option<f64>,
    #[serde(
        default,
        deserialize_with = "lenient::opt_f64",
        skip_serializing_if = "Option::is_none"
    )]
    pub barrel_rate: Option<f64>,
    #[serde(
        default,
        deserialize_with = "lenient::opt_f64",
        skip_serializing_if = "Option::is_none"
    )]
    pub avg_exit_velocity: Option<f64>,
    #[serde(
        default,
        deserialize_with = "lenient::opt_f64",
        skip_serializing_if = "Option::is_none"
    )]
    pub avg_launch_angle: Option<f64>,

    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub team_abbrev: Option<String>,

    /// Provider fields with no typed counterpart.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl SeasonStat {
    /// Decode a raw stored season map. Never fails: a value that is not a
    /// JSON object yields an all-default line and a logged warning.
    pub fn from_raw(context: &str, raw: &Value) -> SeasonStat {
        match serde_json::from_value::<SeasonStat>(raw.clone()) {
            Ok(stat) => stat,
            Err(e) => {
                let err = DugoutError::MalformedRecord {
                    context: context.to_string(),
                    reason: e.to_string(),
                };
                warn!("{err}; using defaults");
                SeasonStat::default()
            }
        }
    }
}

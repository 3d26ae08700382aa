// Offline data providers: the active-roster feed, the MLBAM/FanGraphs id
// register, and yearly FanGraphs-style batting tables.

use std::collections::{BTreeMap, HashMap};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use dugout_core::lenient;
use dugout_core::player::SeasonStat;
use dugout_core::{DugoutError, Result};

use crate::teams::MlbTeam;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },

    #[error("request to {url} failed: {source}")]
    Http { url: String, source: reqwest::Error },
}

impl From<ProviderError> for DugoutError {
    fn from(err: ProviderError) -> Self {
        DugoutError::provider_unavailable(err)
    }
}

// ---------------------------------------------------------------------------
// Active roster feed
// ---------------------------------------------------------------------------

/// One player on a team's active roster, as the feed lists them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterPlayer {
    pub mlbam_id: i64,
    pub name: String,
    /// Position abbreviation ("P", "SS", "TWP", ...).
    pub position: String,
}

#[async_trait]
pub trait RosterSource: Send + Sync {
    /// Active roster for `team` in `season`. Connectivity failures and
    /// timeouts surface as `ProviderUnavailable`.
    async fn active_roster(&self, team: &MlbTeam, season: u16) -> Result<Vec<RosterPlayer>>;
}

#[derive(Debug, Default, Deserialize)]
struct RosterResponse {
    #[serde(default)]
    roster: Vec<RawRosterEntry>,
}

#[derive(Debug, Default, Deserialize)]
struct RawRosterEntry {
    #[serde(default)]
    person: RawPerson,
    #[serde(default)]
    position: RawPosition,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPerson {
    #[serde(default, deserialize_with = "lenient::opt_i64")]
    id: Option<i64>,
    #[serde(default)]
    full_name: String,
}

#[derive(Debug, Default, Deserialize)]
struct RawPosition {
    #[serde(default)]
    abbreviation: String,
}

/// Flatten a roster payload, dropping entries without a player id.
fn parse_roster(response: RosterResponse) -> Vec<RosterPlayer> {
    response
        .roster
        .into_iter()
        .filter_map(|entry| {
            let Some(mlbam_id) = entry.person.id.filter(|id| *id > 0) else {
                warn!("skipping roster entry without a player id");
                return None;
            };
            Some(RosterPlayer {
                mlbam_id,
                name: entry.person.full_name.trim().to_string(),
                position: entry.position.abbreviation.trim().to_string(),
            })
        })
        .collect()
}

/// MLB stats API client for `/teams/{id}/roster/Active`.
pub struct StatsApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl StatsApiClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(DugoutError::provider_unavailable)?;
        Ok(StatsApiClient {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn roster_url(&self, team_id: u32) -> String {
        format!("{}/teams/{}/roster/Active", self.base_url, team_id)
    }
}

#[async_trait]
impl RosterSource for StatsApiClient {
    async fn active_roster(&self, team: &MlbTeam, season: u16) -> Result<Vec<RosterPlayer>> {
        let url = self.roster_url(team.stats_api_id);
        let http_err = |source: reqwest::Error| ProviderError::Http {
            url: url.clone(),
            source,
        };

        let response = self
            .http
            .get(&url)
            .query(&[("season", season)])
            .send()
            .await
            .map_err(http_err)?
            .error_for_status()
            .map_err(http_err)?
            .json::<RosterResponse>()
            .await
            .map_err(http_err)?;

        let players = parse_roster(response);
        debug!("{} active roster {}: {} players", team.code, season, players.len());
        Ok(players)
    }
}

// ---------------------------------------------------------------------------
// Id register (MLBAM <-> FanGraphs)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RawRegisterRow {
    #[serde(default, deserialize_with = "lenient::opt_i64")]
    key_mlbam: Option<i64>,
    #[serde(default, deserialize_with = "lenient::opt_i64")]
    key_fangraphs: Option<i64>,
    #[serde(flatten)]
    _extra: HashMap<String, Value>,
}

/// Player id cross-reference. Rows missing either id (blank or negative)
/// are left out.
#[derive(Debug, Clone, Default)]
pub struct IdRegister {
    to_fangraphs: HashMap<i64, i64>,
    to_mlbam: HashMap<i64, i64>,
}

impl IdRegister {
    pub fn insert(&mut self, mlbam_id: i64, fangraphs_id: i64) {
        self.to_fangraphs.insert(mlbam_id, fangraphs_id);
        self.to_mlbam.insert(fangraphs_id, mlbam_id);
    }

    pub fn fangraphs_for(&self, mlbam_id: i64) -> Option<i64> {
        self.to_fangraphs.get(&mlbam_id).copied()
    }

    pub fn mlbam_for(&self, fangraphs_id: i64) -> Option<i64> {
        self.to_mlbam.get(&fangraphs_id).copied()
    }

    pub fn len(&self) -> usize {
        self.to_fangraphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.to_fangraphs.is_empty()
    }
}

fn load_register_from_reader<R: Read>(rdr: R) -> std::result::Result<IdRegister, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut register = IdRegister::default();
    for result in reader.deserialize::<RawRegisterRow>() {
        match result {
            Ok(row) => {
                let ids = row
                    .key_mlbam
                    .filter(|id| *id > 0)
                    .zip(row.key_fangraphs.filter(|id| *id > 0));
                if let Some((mlbam_id, fangraphs_id)) = ids {
                    register.insert(mlbam_id, fangraphs_id);
                }
            }
            Err(e) => {
                warn!("skipping malformed register row: {}", e);
            }
        }
    }
    Ok(register)
}

/// Load the id register CSV (`key_mlbam`, `key_fangraphs` columns).
pub fn load_register(path: &Path) -> std::result::Result<IdRegister, ProviderError> {
    let file = std::fs::File::open(path).map_err(|e| ProviderError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    load_register_from_reader(file).map_err(|e| ProviderError::Csv {
        path: path.display().to_string(),
        source: e,
    })
}

// ---------------------------------------------------------------------------
// Batting tables
// ---------------------------------------------------------------------------

/// A column that is present always yields a value (blank reads as 0.0);
/// only an absent column leaves the field `None`.
fn present_f64<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Some(lenient::zero_f64(deserializer)?))
}

/// FanGraphs batting export row. Percent columns are on a 0-100 scale.
#[derive(Debug, Deserialize)]
#[allow(non_snake_case)]
struct RawBattingRow {
    #[serde(default, deserialize_with = "lenient::opt_i64")]
    IDfg: Option<i64>,
    #[serde(default)]
    Name: String,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    Team: Option<String>,
    #[serde(default, deserialize_with = "lenient::zero_u32")]
    G: u32,
    #[serde(default, deserialize_with = "lenient::zero_u32")]
    PA: u32,
    #[serde(default, deserialize_with = "lenient::zero_u32")]
    AB: u32,
    #[serde(default, deserialize_with = "lenient::zero_u32")]
    H: u32,
    #[serde(rename = "1B", default, deserialize_with = "lenient::zero_u32")]
    singles: u32,
    #[serde(rename = "2B", default, deserialize_with = "lenient::zero_u32")]
    doubles: u32,
    #[serde(rename = "3B", default, deserialize_with = "lenient::zero_u32")]
    triples: u32,
    #[serde(default, deserialize_with = "lenient::zero_u32")]
    HR: u32,
    #[serde(default, deserialize_with = "lenient::zero_u32")]
    R: u32,
    #[serde(default, deserialize_with = "lenient::zero_u32")]
    RBI: u32,
    #[serde(default, deserialize_with = "lenient::zero_u32")]
    BB: u32,
    #[serde(default, deserialize_with = "lenient::zero_u32")]
    SO: u32,
    #[serde(default, deserialize_with = "lenient::zero_u32")]
    SB: u32,
    #[serde(default, deserialize_with = "lenient::zero_u32")]
    CS: u32,
    #[serde(default, deserialize_with = "lenient::zero_f64")]
    AVG: f64,
    #[serde(default, deserialize_with = "lenient::zero_f64")]
    OBP: f64,
    #[serde(default, deserialize_with = "lenient::zero_f64")]
    SLG: f64,
    #[serde(default, deserialize_with = "lenient::zero_f64")]
    OPS: f64,
    #[serde(default, deserialize_with = "lenient::zero_f64")]
    ISO: f64,
    #[serde(default, deserialize_with = "lenient::zero_f64")]
    BABIP: f64,
    #[serde(rename = "BB%", default, deserialize_with = "lenient::zero_f64")]
    walk_pct: f64,
    #[serde(rename = "K%", default, deserialize_with = "lenient::zero_f64")]
    strikeout_pct: f64,
    #[serde(rename = "BB/K", default, deserialize_with = "lenient::zero_f64")]
    bb_k: f64,
    #[serde(default, deserialize_with = "lenient::zero_f64")]
    wOBA: f64,
    #[serde(rename = "wRC+", default, deserialize_with = "lenient::zero_f64")]
    wrc_plus: f64,
    #[serde(default, deserialize_with = "lenient::zero_f64")]
    WAR: f64,
    #[serde(default, deserialize_with = "lenient::zero_f64")]
    Off: f64,
    #[serde(default, deserialize_with = "lenient::zero_f64")]
    Def: f64,
    #[serde(default, deserialize_with = "lenient::zero_f64")]
    BsR: f64,
    #[serde(rename = "Hard%", default, deserialize_with = "present_f64")]
    hard_pct: Option<f64>,
    #[serde(rename = "Barrel%", default, deserialize_with = "present_f64")]
    barrel_pct: Option<f64>,
    #[serde(default, deserialize_with = "present_f64")]
    EV: Option<f64>,
    #[serde(default, deserialize_with = "present_f64")]
    LA: Option<f64>,
    /// Absorb the rest of the export's columns.
    #[serde(flatten)]
    _extra: HashMap<String, Value>,
}

impl RawBattingRow {
    fn into_line(self) -> Option<BattingLine> {
        let fangraphs_id = self.IDfg.filter(|id| *id > 0)?;
        let team_abbrev = self
            .Team
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty() && t != "- - -");

        let stat = SeasonStat {
            games: self.G,
            plate_appearances: self.PA,
            at_bats: self.AB,
            hits: self.H,
            singles: self.singles,
            doubles: self.doubles,
            triples: self.triples,
            home_runs: self.HR,
            runs: self.R,
            rbi: self.RBI,
            walks: self.BB,
            strikeouts: self.SO,
            stolen_bases: self.SB,
            caught_stealing: self.CS,
            batting_average: self.AVG,
            on_base_percentage: self.OBP,
            slugging_percentage: self.SLG,
            ops: self.OPS,
            isolated_power: self.ISO,
            babip: self.BABIP,
            walk_rate: self.walk_pct / 100.0,
            strikeout_rate: self.strikeout_pct / 100.0,
            bb_k_ratio: self.bb_k,
            woba: self.wOBA,
            wrc_plus: self.wrc_plus,
            war: self.WAR,
            off: self.Off,
            defense: self.Def,
            base_running: self.BsR,
            hard_hit_rate: self.hard_pct.map(|v| v / 100.0),
            barrel_rate: self.barrel_pct.map(|v| v / 100.0),
            avg_exit_velocity: self.EV,
            avg_launch_angle: self.LA,
            team_abbrev: team_abbrev.clone(),
            extra: BTreeMap::new(),
        };

        Some(BattingLine {
            fangraphs_id,
            name: self.Name.trim().to_string(),
            team_abbrev,
            stat,
        })
    }
}

/// One player's batting line for a season, rates already normalized to
/// fractions.
#[derive(Debug, Clone, PartialEq)]
pub struct BattingLine {
    pub fangraphs_id: i64,
    pub name: String,
    /// `None` for players who finished the season with no club ("- - -").
    pub team_abbrev: Option<String>,
    pub stat: SeasonStat,
}

/// All batting lines of one season, in file order, addressable by
/// FanGraphs id.
#[derive(Debug, Clone, Default)]
pub struct BattingTable {
    pub season: u16,
    lines: Vec<BattingLine>,
    by_fangraphs: HashMap<i64, usize>,
}

impl BattingTable {
    pub fn new(season: u16, lines: Vec<BattingLine>) -> Self {
        let mut by_fangraphs = HashMap::new();
        for (i, line) in lines.iter().enumerate() {
            // First row wins, matching a lookup that takes the first match.
            by_fangraphs.entry(line.fangraphs_id).or_insert(i);
        }
        BattingTable {
            season,
            lines,
            by_fangraphs,
        }
    }

    pub fn lines(&self) -> &[BattingLine] {
        &self.lines
    }

    pub fn get(&self, fangraphs_id: i64) -> Option<&BattingLine> {
        self.by_fangraphs.get(&fangraphs_id).map(|&i| &self.lines[i])
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

fn load_batting_from_reader<R: Read>(
    season: u16,
    rdr: R,
) -> std::result::Result<BattingTable, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut lines = Vec::new();
    for result in reader.deserialize::<RawBattingRow>() {
        match result {
            Ok(raw) => {
                let name = raw.Name.trim().to_string();
                match raw.into_line() {
                    Some(line) => lines.push(line),
                    None => warn!("skipping batting row '{}' without a FanGraphs id", name),
                }
            }
            Err(e) => {
                warn!("skipping malformed batting row: {}", e);
            }
        }
    }
    Ok(BattingTable::new(season, lines))
}

/// `<dir>/batting_<season>.csv`
pub fn batting_path(dir: &Path, season: u16) -> PathBuf {
    dir.join(format!("batting_{season}.csv"))
}

/// Load one season's batting export.
pub fn load_batting(path: &Path, season: u16) -> std::result::Result<BattingTable, ProviderError> {
    let file = std::fs::File::open(path).map_err(|e| ProviderError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    load_batting_from_reader(season, file).map_err(|e| ProviderError::Csv {
        path: path.display().to_string(),
        source: e,
    })
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const BATTING_CSV: &str = "\
IDfg,Season,Name,Team,G,PA,AB,H,1B,2B,3B,HR,R,RBI,BB,SO,SB,CS,AVG,OBP,SLG,OPS,ISO,BABIP,BB%,K%,BB/K,wOBA,wRC+,WAR,Off,Def,BsR,Hard%,Barrel%,EV,LA
15640,2024,Aaron Judge,NYY,158,704,559,180,85,36,1,58,122,144,133,171,10,0,.322,.458,.701,1.159,.379,.367,18.9,24.3,0.78,.476,218,11.2,82.1,-4.5,0.3,60.5,26.9,96.2,19.4
19755,2024,Shohei Ohtani,LAD,159,731,636,197,98,38,7,54,134,130,81,162,59,4,.310,.390,.646,1.036,.336,.336,11.1,22.2,0.50,.431,180,9.2,67.4,-15.9,6.6,,21.6,95.8,14.7
99999,2024,Journeyman Jones,- - -,20,40,36,8,6,2,0,0,3,2,3,12,0,0,.222,.275,.278,.553,.056,.333,7.5,30.0,0.25,.250,52,-0.3,-3.1,0.4,-0.2,30.1,2.0,86.0,9.0
,2024,No Id Guy,BOS,1,1,1,0,0,0,0,0,0,0,0,1,0,0,0,0,0,0,0,0,0,100,0,0,0,0,0,0,0,0,0,0,0
";

    #[test]
    fn batting_rows_are_normalized() {
        let table = load_batting_from_reader(2024, BATTING_CSV.as_bytes()).unwrap();
        assert_eq!(table.season, 2024);
        assert_eq!(table.len(), 3);

        let judge = table.get(15640).unwrap();
        assert_eq!(judge.name, "Aaron Judge");
        assert_eq!(judge.team_abbrev.as_deref(), Some("NYY"));
        assert_eq!(judge.stat.plate_appearances, 704);
        assert_eq!(judge.stat.singles, 85);
        assert!((judge.stat.walk_rate - 0.189).abs() < 1e-9);
        assert!((judge.stat.strikeout_rate - 0.243).abs() < 1e-9);
        assert!((judge.stat.wrc_plus - 218.0).abs() < 1e-9);
        assert!((judge.stat.defense + 4.5).abs() < 1e-9);
        assert!((judge.stat.hard_hit_rate.unwrap() - 0.605).abs() < 1e-9);
        assert_eq!(judge.stat.avg_exit_velocity, Some(96.2));
    }

    #[test]
    fn blank_contact_column_reads_zero() {
        let table = load_batting_from_reader(2024, BATTING_CSV.as_bytes()).unwrap();
        let ohtani = table.get(19755).unwrap();
        assert_eq!(ohtani.stat.hard_hit_rate, Some(0.0));
        assert!((ohtani.stat.barrel_rate.unwrap() - 0.216).abs() < 1e-9);
    }

    #[test]
    fn missing_contact_columns_stay_absent() {
        let csv = "IDfg,Name,Team,PA,BB%,K%\n15640,Aaron Judge,NYY,600,15.0,25.0\n";
        let table = load_batting_from_reader(2016, csv.as_bytes()).unwrap();
        let line = table.get(15640).unwrap();
        assert_eq!(line.stat.hard_hit_rate, None);
        assert_eq!(line.stat.barrel_rate, None);
        assert_eq!(line.stat.avg_exit_velocity, None);
        assert_eq!(line.stat.avg_launch_angle, None);
        assert_eq!(line.stat.games, 0);
    }

    #[test]
    fn free_agent_team_is_none() {
        let table = load_batting_from_reader(2024, BATTING_CSV.as_bytes()).unwrap();
        let jones = table.get(99999).unwrap();
        assert_eq!(jones.team_abbrev, None);
        assert_eq!(jones.stat.team_abbrev, None);
    }

    #[test]
    fn register_skips_incomplete_rows() {
        let csv = "\
key_mlbam,key_fangraphs,name_first,name_last
592450,15640,Aaron,Judge
660271,19755,Shohei,Ohtani
123456,-1,No,Fangraphs
,12345,No,Mlbam
";
        let register = load_register_from_reader(csv.as_bytes()).unwrap();
        assert_eq!(register.len(), 2);
        assert_eq!(register.fangraphs_for(592450), Some(15640));
        assert_eq!(register.mlbam_for(19755), Some(660271));
        assert_eq!(register.fangraphs_for(123456), None);
        assert_eq!(register.mlbam_for(12345), None);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_batting(Path::new("/nonexistent/batting_2024.csv"), 2024).unwrap_err();
        assert!(matches!(err, ProviderError::Io { .. }));
        let err: DugoutError = err.into();
        assert!(err.is_unavailable());
    }

    #[test]
    fn batting_path_uses_season() {
        assert_eq!(
            batting_path(Path::new("data"), 2019),
            PathBuf::from("data/batting_2019.csv")
        );
    }

    #[test]
    fn roster_payload_drops_entries_without_id() {
        let payload: RosterResponse = serde_json::from_value(serde_json::json!({
            "roster": [
                {"person": {"id": 592450, "fullName": "Aaron Judge"}, "position": {"abbreviation": "RF"}},
                {"person": {"fullName": "Ghost"}, "position": {"abbreviation": "C"}},
                {"person": {"id": 669203, "fullName": "Gerrit Cole"}}
            ]
        }))
        .unwrap();
        let players = parse_roster(payload);
        assert_eq!(players.len(), 2);
        assert_eq!(players[0].position, "RF");
        assert_eq!(players[1].position, "");
    }

    #[tokio::test]
    async fn stats_api_fetches_active_roster() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/teams/147/roster/Active"))
            .and(query_param("season", "2025"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "roster": [
                    {"person": {"id": 592450, "fullName": "Aaron Judge"}, "position": {"abbreviation": "RF"}},
                    {"person": {"id": 543037, "fullName": "Gerrit Cole"}, "position": {"abbreviation": "P"}}
                ]
            })))
            .mount(&server)
            .await;

        let client = StatsApiClient::new(server.uri(), Duration::from_secs(5)).unwrap();
        let team = crate::teams::find_team("NYY").unwrap();
        let players = client.active_roster(team, 2025).await.unwrap();

        assert_eq!(players.len(), 2);
        assert_eq!(players[0].mlbam_id, 592450);
        assert_eq!(players[0].name, "Aaron Judge");
        assert_eq!(players[1].position, "P");
    }

    #[tokio::test]
    async fn stats_api_error_status_is_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = StatsApiClient::new(server.uri(), Duration::from_secs(5)).unwrap();
        let team = crate::teams::find_team("BOS").unwrap();
        let err = client.active_roster(team, 2025).await.unwrap_err();
        assert!(err.is_unavailable());
    }
}

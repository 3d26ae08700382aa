// SQLite persistence layer for players, saved-player lists and team rosters.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use anyhow::{Context, Result};
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::warn;

use crate::error::DugoutError;
use crate::player::PlayerRecord;
use crate::roster::{RosterEntry, TeamRoster};
use crate::saved::{SavedPlayer, UserId};
use crate::store::PlayerStore;

/// SQLite-backed [`PlayerStore`].
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open (or create) a SQLite database at `path` and ensure all tables
    /// exist. Pass `":memory:"` for an ephemeral in-memory database (useful
    /// for tests).
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open database at {path}"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;
             PRAGMA foreign_keys = ON;",
        )
        .context("failed to set database pragmas")?;

        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS players (
                mlbam_id      INTEGER PRIMARY KEY,
                fangraphs_id  INTEGER,
                name          TEXT NOT NULL,
                team_abbrev   TEXT,
                overall_score REAL NOT NULL DEFAULT 0,
                seasons       TEXT NOT NULL DEFAULT '{}',
                updated_at    TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
            );

            CREATE TABLE IF NOT EXISTS saved_players (
                user_id   TEXT NOT NULL,
                player_id INTEGER NOT NULL,
                data      TEXT NOT NULL,
                saved_at  TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
                PRIMARY KEY (user_id, player_id)
            );

            CREATE TABLE IF NOT EXISTS team_rosters (
                team_code      TEXT PRIMARY KEY,
                full_team_name TEXT NOT NULL,
                season         INTEGER NOT NULL,
                lineup         TEXT NOT NULL,
                updated_at     TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
            );
            ",
        )
        .context("failed to create database schema")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Acquire the database connection. A poisoned lock is recovered: SQLite
    /// keeps its own consistency, so the connection is still usable.
    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ------------------------------------------------------------------
    // Players
    // ------------------------------------------------------------------

    /// Insert or replace players in a single transaction. Returns the number
    /// of rows written.
    pub fn upsert_players(&self, players: &[PlayerRecord]) -> Result<usize> {
        let mut conn = self.conn();
        let tx = conn.transaction().context("failed to begin player import")?;

        for player in players {
            let seasons_json =
                serde_json::to_string(&player.seasons).context("failed to serialize seasons")?;
            tx.execute(
                "INSERT INTO players (mlbam_id, fangraphs_id, name, team_abbrev, overall_score, seasons)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT(mlbam_id) DO UPDATE SET
                    fangraphs_id  = excluded.fangraphs_id,
                    name          = excluded.name,
                    team_abbrev   = excluded.team_abbrev,
                    overall_score = excluded.overall_score,
                    seasons       = excluded.seasons,
                    updated_at    = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
                params![
                    player.id,
                    player.fangraphs_id,
                    player.name,
                    player.team_abbrev,
                    player.overall_score,
                    seasons_json,
                ],
            )
            .with_context(|| format!("failed to upsert player {}", player.id))?;
        }

        tx.commit().context("failed to commit player import")?;
        Ok(players.len())
    }

    /// Load every player, ordered by MLBAM id.
    pub fn load_players(&self) -> Result<Vec<PlayerRecord>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare(
                "SELECT mlbam_id, fangraphs_id, name, team_abbrev, overall_score, seasons
                 FROM players ORDER BY mlbam_id",
            )
            .context("failed to prepare load_players query")?;

        let players = stmt
            .query_map([], player_from_row)
            .context("failed to query players")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("failed to map player rows")?;

        Ok(players)
    }

    /// Load a single player by MLBAM id. Returns `None` if absent.
    pub fn load_player(&self, id: i64) -> Result<Option<PlayerRecord>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT mlbam_id, fangraphs_id, name, team_abbrev, overall_score, seasons
             FROM players WHERE mlbam_id = ?1",
            params![id],
            player_from_row,
        )
        .optional()
        .with_context(|| format!("failed to load player {id}"))
    }

    pub fn player_count(&self) -> Result<usize> {
        let conn = self.conn();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM players", [], |row| row.get(0))
            .context("failed to count players")?;
        Ok(count as usize)
    }

    // ------------------------------------------------------------------
    // Saved players
    // ------------------------------------------------------------------

    /// Saved players for one user, oldest first.
    pub fn load_saved_players(&self, user: &UserId) -> Result<Vec<SavedPlayer>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare(
                "SELECT player_id, data FROM saved_players
                 WHERE user_id = ?1 ORDER BY saved_at, player_id",
            )
            .context("failed to prepare load_saved_players query")?;

        let rows = stmt
            .query_map(params![user.as_str()], |row| {
                Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
            })
            .context("failed to query saved players")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("failed to map saved player rows")?;

        let mut saved = Vec::with_capacity(rows.len());
        for (player_id, data) in rows {
            match serde_json::from_str::<SavedPlayer>(&data) {
                Ok(player) => saved.push(player),
                Err(e) => {
                    let err = DugoutError::MalformedRecord {
                        context: format!("saved player {player_id} for user {user}"),
                        reason: e.to_string(),
                    };
                    warn!("{err}; skipping");
                }
            }
        }
        Ok(saved)
    }

    pub fn load_saved_player(&self, user: &UserId, id: i64) -> Result<Option<SavedPlayer>> {
        let conn = self.conn();
        let data: Option<String> = conn
            .query_row(
                "SELECT data FROM saved_players WHERE user_id = ?1 AND player_id = ?2",
                params![user.as_str(), id],
                |row| row.get(0),
            )
            .optional()
            .context("failed to query saved player")?;

        data.map(|json| {
            serde_json::from_str(&json).context("failed to deserialize saved player")
        })
        .transpose()
    }

    /// Store a saved player. Re-saving the same id replaces the payload.
    pub fn save_saved_player(&self, user: &UserId, player: &SavedPlayer) -> Result<()> {
        let conn = self.conn();
        let json = serde_json::to_string(player).context("failed to serialize saved player")?;
        conn.execute(
            "INSERT INTO saved_players (user_id, player_id, data) VALUES (?1, ?2, ?3)
             ON CONFLICT(user_id, player_id) DO UPDATE SET data = excluded.data",
            params![user.as_str(), player.id, json],
        )
        .context("failed to save player")?;
        Ok(())
    }

    pub fn delete_saved_player(&self, user: &UserId, id: i64) -> Result<bool> {
        let conn = self.conn();
        let removed = conn
            .execute(
                "DELETE FROM saved_players WHERE user_id = ?1 AND player_id = ?2",
                params![user.as_str(), id],
            )
            .context("failed to delete saved player")?;
        Ok(removed > 0)
    }

    // ------------------------------------------------------------------
    // Team rosters
    // ------------------------------------------------------------------

    /// Overwrite the roster stored for `roster.team_code`.
    pub fn save_team_roster(&self, roster: &TeamRoster) -> Result<()> {
        let conn = self.conn();
        let lineup =
            serde_json::to_string(&roster.lineup).context("failed to serialize lineup")?;
        conn.execute(
            "INSERT OR REPLACE INTO team_rosters (team_code, full_team_name, season, lineup)
             VALUES (?1, ?2, ?3, ?4)",
            params![roster.team_code, roster.full_team_name, roster.season, lineup],
        )
        .with_context(|| format!("failed to save roster for {}", roster.team_code))?;
        Ok(())
    }

    pub fn load_team_roster(&self, team_code: &str) -> Result<Option<TeamRoster>> {
        let conn = self.conn();
        let row: Option<(String, String, u16, String)> = conn
            .query_row(
                "SELECT team_code, full_team_name, season, lineup
                 FROM team_rosters WHERE team_code = ?1",
                params![team_code],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )
            .optional()
            .context("failed to query team roster")?;

        let Some((team_code, full_team_name, season, lineup_json)) = row else {
            return Ok(None);
        };
        let lineup: Vec<RosterEntry> =
            serde_json::from_str(&lineup_json).context("failed to deserialize lineup")?;
        Ok(Some(TeamRoster {
            team_code,
            full_team_name,
            season,
            lineup,
        }))
    }
}

/// Map a `players` row. A corrupt seasons blob is logged and treated as
/// "no seasons" rather than failing the whole load.
fn player_from_row(row: &Row<'_>) -> rusqlite::Result<PlayerRecord> {
    let id: i64 = row.get(0)?;
    let seasons_json: String = row.get(5)?;
    let seasons = serde_json::from_str::<BTreeMap<String, serde_json::Value>>(&seasons_json)
        .unwrap_or_else(|e| {
            let err = DugoutError::MalformedRecord {
                context: format!("player {id} seasons"),
                reason: e.to_string(),
            };
            warn!("{err}; treating as empty");
            BTreeMap::new()
        });

    Ok(PlayerRecord {
        id,
        fangraphs_id: row.get(1)?,
        name: row.get(2)?,
        team_abbrev: row.get(3)?,
        overall_score: row.get(4)?,
        seasons,
    })
}

fn unavailable(err: anyhow::Error) -> DugoutError {
    DugoutError::store_unavailable(format!("{err:#}"))
}

#[async_trait]
impl PlayerStore for Database {
    async fn fetch_all_players(&self) -> crate::Result<Vec<PlayerRecord>> {
        self.load_players().map_err(unavailable)
    }

    async fn fetch_player(&self, id: i64) -> crate::Result<Option<PlayerRecord>> {
        self.load_player(id).map_err(unavailable)
    }

    async fn upsert_players(&self, players: &[PlayerRecord]) -> crate::Result<usize> {
        Database::upsert_players(self, players).map_err(unavailable)
    }

    async fn fetch_saved_players(&self, user: &UserId) -> crate::Result<Vec<SavedPlayer>> {
        self.load_saved_players(user).map_err(unavailable)
    }

    async fn fetch_saved_player(
        &self,
        user: &UserId,
        id: i64,
    ) -> crate::Result<Option<SavedPlayer>> {
        self.load_saved_player(user, id).map_err(unavailable)
    }

    async fn save_saved_player(&self, user: &UserId, player: &SavedPlayer) -> crate::Result<()> {
        Database::save_saved_player(self, user, player).map_err(unavailable)
    }

    async fn delete_saved_player(&self, user: &UserId, id: i64) -> crate::Result<bool> {
        Database::delete_saved_player(self, user, id).map_err(unavailable)
    }

    async fn save_team_roster(&self, roster: &TeamRoster) -> crate::Result<()> {
        Database::save_team_roster(self, roster).map_err(unavailable)
    }

    async fn fetch_team_roster(&self, team_code: &str) -> crate::Result<Option<TeamRoster>> {
        self.load_team_roster(team_code).map_err(unavailable)
    }
}

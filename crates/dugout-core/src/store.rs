// The persistence seam: everything the engine needs from a backing store.

use async_trait::async_trait;

use crate::error::Result;
use crate::player::PlayerRecord;
use crate::roster::TeamRoster;
use crate::saved::{SavedPlayer, UserId};

/// Backing store for players, saved-player lists and team rosters.
///
/// Implementations report connectivity and query failures as
/// [`DugoutError::BackingStoreUnavailable`](crate::error::DugoutError) and
/// signal a missing entity with `Ok(None)` / `Ok(false)`; turning that into
/// a not-found error is the caller's decision.
#[async_trait]
pub trait PlayerStore: Send + Sync {
    /// Every stored player, in a stable order.
    async fn fetch_all_players(&self) -> Result<Vec<PlayerRecord>>;

    async fn fetch_player(&self, id: i64) -> Result<Option<PlayerRecord>>;

    /// Insert or overwrite players by MLBAM id.
    async fn upsert_players(&self, players: &[PlayerRecord]) -> Result<usize>;

    async fn fetch_saved_players(&self, user: &UserId) -> Result<Vec<SavedPlayer>>;

    async fn fetch_saved_player(&self, user: &UserId, id: i64) -> Result<Option<SavedPlayer>>;

    /// Insert or overwrite one saved player for `user`.
    async fn save_saved_player(&self, user: &UserId, player: &SavedPlayer) -> Result<()>;

    /// Remove a saved player. Returns `false` when nothing was stored.
    async fn delete_saved_player(&self, user: &UserId, id: i64) -> Result<bool>;

    /// Replace the stored roster for `roster.team_code`.
    async fn save_team_roster(&self, roster: &TeamRoster) -> Result<()>;

    async fn fetch_team_roster(&self, team_code: &str) -> Result<Option<TeamRoster>>;
}

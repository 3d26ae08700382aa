// Caller-facing services: player search/detail, saved-player lists and
// stored team rosters.

use std::sync::Arc;

use serde_json::Value;
use tracing::info;

use dugout_baseball::detail::{get_detail, PlayerDetail};
use dugout_baseball::index::PlayerIndex;
use dugout_baseball::search::{Matcher, PlayerMatch, SearchOptions};
use dugout_core::config::Config;
use dugout_core::roster::TeamRoster;
use dugout_core::saved::{SavedPlayer, UserId};
use dugout_core::store::PlayerStore;
use dugout_core::{DugoutError, Result};

// ---------------------------------------------------------------------------
// PlayerService
// ---------------------------------------------------------------------------

/// Search and detail lookups over one player index. Construct one per
/// process and share it; the index loads on the first search.
pub struct PlayerService {
    store: Arc<dyn PlayerStore>,
    index: PlayerIndex,
    defaults: SearchOptions,
    image_url_template: String,
    current_year: u16,
}

impl PlayerService {
    pub fn new(store: Arc<dyn PlayerStore>, config: &Config) -> Self {
        PlayerService {
            index: PlayerIndex::new(store.clone()),
            store,
            defaults: SearchOptions {
                limit: config.search.limit,
                score_cutoff: config.search.score_cutoff,
            },
            image_url_template: config.search.image_url_template.clone(),
            current_year: config.seasons.current_year,
        }
    }

    /// Load the index now instead of on the first search.
    pub async fn load(&self) -> Result<()> {
        self.index.load().await?;
        info!("Player service ready ({} players)", self.index.size());
        Ok(())
    }

    pub fn is_loaded(&self) -> bool {
        self.index.is_loaded()
    }

    pub fn index(&self) -> &PlayerIndex {
        &self.index
    }

    /// Fuzzy name search. `limit` and `cutoff` fall back to the configured
    /// defaults.
    pub async fn search(
        &self,
        query: &str,
        limit: Option<usize>,
        cutoff: Option<f64>,
    ) -> Result<Vec<PlayerMatch>> {
        let options = SearchOptions {
            limit: limit.unwrap_or(self.defaults.limit),
            score_cutoff: cutoff.unwrap_or(self.defaults.score_cutoff),
        };
        if options.limit == 0 {
            return Err(DugoutError::invalid_input("limit must be greater than 0"));
        }
        if !(0.0..=100.0).contains(&options.score_cutoff) {
            return Err(DugoutError::invalid_input(format!(
                "cutoff must be between 0 and 100, got {}",
                options.score_cutoff
            )));
        }

        Matcher::new(&self.index, &self.image_url_template, self.current_year)
            .search(query, options)
            .await
    }

    pub async fn get_detail(&self, id: i64) -> Result<PlayerDetail> {
        get_detail(
            self.store.as_ref(),
            id,
            &self.image_url_template,
            self.current_year,
        )
        .await
    }

    /// The stored lineup for `team_code`, as last written by seeding.
    pub async fn team_roster(&self, team_code: &str) -> Result<TeamRoster> {
        let code = team_code.trim().to_uppercase();
        self.store
            .fetch_team_roster(&code)
            .await?
            .ok_or(DugoutError::EntityNotFound {
                kind: "team roster",
                id: code,
            })
    }
}

// ---------------------------------------------------------------------------
// SavedPlayers
// ---------------------------------------------------------------------------

/// A user's saved-player list. Users are already authenticated; only the
/// resolved id reaches this layer.
pub struct SavedPlayers {
    store: Arc<dyn PlayerStore>,
}

fn parse_player_id(raw: &str) -> Option<i64> {
    raw.trim().parse().ok()
}

fn saved_not_found(id: impl ToString) -> DugoutError {
    DugoutError::EntityNotFound {
        kind: "saved player",
        id: id.to_string(),
    }
}

impl SavedPlayers {
    pub fn new(store: Arc<dyn PlayerStore>) -> Self {
        SavedPlayers { store }
    }

    /// Save an arbitrary player payload. It must be an object with a
    /// numeric `id` (a numeric string is accepted) and a `name`; every
    /// other field is kept as given. Saving the same id again overwrites.
    pub async fn add(&self, user: &UserId, payload: Value) -> Result<SavedPlayer> {
        let Value::Object(mut fields) = payload else {
            return Err(DugoutError::invalid_input("player payload must be a JSON object"));
        };

        let id = match fields.get("id") {
            Some(Value::Number(n)) => n.as_i64(),
            Some(Value::String(s)) => parse_player_id(s),
            _ => None,
        }
        .ok_or_else(|| DugoutError::invalid_input("player id is required"))?;
        fields.insert("id".to_string(), Value::from(id));

        let player: SavedPlayer = serde_json::from_value(Value::Object(fields))
            .map_err(|e| DugoutError::invalid_input(format!("invalid player payload: {e}")))?;

        self.store.save_saved_player(user, &player).await?;
        info!("Saved player {} for user {}", player.id, user);
        Ok(player)
    }

    pub async fn list(&self, user: &UserId) -> Result<Vec<SavedPlayer>> {
        self.store.fetch_saved_players(user).await
    }

    pub async fn get(&self, user: &UserId, player_id: &str) -> Result<SavedPlayer> {
        let Some(id) = parse_player_id(player_id) else {
            return Err(saved_not_found(player_id));
        };
        self.store
            .fetch_saved_player(user, id)
            .await?
            .ok_or_else(|| saved_not_found(id))
    }

    pub async fn remove(&self, user: &UserId, player_id: &str) -> Result<()> {
        let Some(id) = parse_player_id(player_id) else {
            return Err(saved_not_found(player_id));
        };
        if self.store.delete_saved_player(user, id).await? {
            info!("Removed saved player {} for user {}", id, user);
            Ok(())
        } else {
            Err(saved_not_found(id))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use dugout_core::db::Database;
    use serde_json::json;

    fn saved() -> SavedPlayers {
        SavedPlayers::new(Arc::new(Database::open(":memory:").unwrap()))
    }

    #[tokio::test]
    async fn add_accepts_numeric_string_id() {
        let saved = saved();
        let user = UserId::new("u1");
        let player = saved
            .add(&user, json!({"id": "592450", "name": "Aaron Judge", "note": "captain"}))
            .await
            .unwrap();
        assert_eq!(player.id, 592450);
        assert_eq!(player.extra.get("note"), Some(&json!("captain")));

        let fetched = saved.get(&user, "592450").await.unwrap();
        assert_eq!(fetched, player);
    }

    #[tokio::test]
    async fn add_requires_id_and_name() {
        let saved = saved();
        let user = UserId::new("u1");
        for payload in [
            json!({"name": "No Id"}),
            json!({"id": "abc", "name": "Bad Id"}),
            json!({"id": 592450}),
            json!([1, 2, 3]),
        ] {
            let err = saved.add(&user, payload).await.unwrap_err();
            assert!(matches!(err, DugoutError::InvalidInput { .. }), "{err}");
        }
    }

    #[tokio::test]
    async fn lists_are_per_user() {
        let saved = saved();
        let alice = UserId::new("alice");
        let bob = UserId::new("bob");
        saved.add(&alice, json!({"id": 1, "name": "One"})).await.unwrap();
        saved.add(&alice, json!({"id": 2, "name": "Two"})).await.unwrap();

        assert_eq!(saved.list(&alice).await.unwrap().len(), 2);
        assert!(saved.list(&bob).await.unwrap().is_empty());
        assert!(saved.get(&bob, "1").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn remove_missing_is_not_found() {
        let saved = saved();
        let user = UserId::new("u1");
        saved.add(&user, json!({"id": 7, "name": "Seven"})).await.unwrap();

        saved.remove(&user, "7").await.unwrap();
        assert!(saved.remove(&user, "7").await.unwrap_err().is_not_found());
        assert!(saved.remove(&user, "seven").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn search_rejects_bad_overrides() {
        let store = Arc::new(Database::open(":memory:").unwrap());
        let service = PlayerService::new(store, &Config::default());

        let err = service.search("judge", Some(0), None).await.unwrap_err();
        assert!(matches!(err, DugoutError::InvalidInput { .. }));
        let err = service.search("judge", None, Some(150.0)).await.unwrap_err();
        assert!(matches!(err, DugoutError::InvalidInput { .. }));
        assert!(!service.is_loaded());
    }

    #[tokio::test]
    async fn missing_roster_is_not_found() {
        let store = Arc::new(Database::open(":memory:").unwrap());
        let service = PlayerService::new(store, &Config::default());
        let err = service.team_roster("nyy").await.unwrap_err();
        assert!(matches!(
            err,
            DugoutError::EntityNotFound { kind: "team roster", ref id } if id == "NYY"
        ));
    }
}

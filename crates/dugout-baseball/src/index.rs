// In-memory player index, loaded once from the backing store.

use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::info;

use dugout_core::player::PlayerRecord;
use dugout_core::store::PlayerStore;
use dugout_core::{DugoutError, Result};

/// Records plus the name columns the matcher scans. All three vectors share
/// the same indexing.
#[derive(Debug)]
struct IndexedPlayers {
    records: Vec<PlayerRecord>,
    names: Vec<String>,
    names_lower: Vec<String>,
}

impl IndexedPlayers {
    fn build(records: Vec<PlayerRecord>) -> Self {
        let names: Vec<String> = records.iter().map(|r| r.name.clone()).collect();
        let names_lower = names.iter().map(|n| n.to_lowercase()).collect();
        IndexedPlayers {
            records,
            names,
            names_lower,
        }
    }
}

/// Every stored player, fetched on first use and then reused for the life
/// of the index. Concurrent first callers wait on a single load; a failed
/// load leaves the index empty so the next call tries again.
pub struct PlayerIndex {
    store: Arc<dyn PlayerStore>,
    players: OnceCell<IndexedPlayers>,
}

impl PlayerIndex {
    pub fn new(store: Arc<dyn PlayerStore>) -> Self {
        PlayerIndex {
            store,
            players: OnceCell::new(),
        }
    }

    async fn loaded(&self) -> Result<&IndexedPlayers> {
        self.players
            .get_or_try_init(|| async {
                let records = self.store.fetch_all_players().await?;
                info!("Player index loaded with {} players", records.len());
                Ok::<_, DugoutError>(IndexedPlayers::build(records))
            })
            .await
    }

    /// Fetch and index all players. A no-op once loaded.
    pub async fn load(&self) -> Result<()> {
        self.loaded().await.map(|_| ())
    }

    pub fn is_loaded(&self) -> bool {
        self.players.initialized()
    }

    /// Number of indexed players; 0 before the first successful load.
    pub fn size(&self) -> usize {
        self.players.get().map_or(0, |p| p.records.len())
    }

    pub fn record_at(&self, index: usize) -> Option<&PlayerRecord> {
        self.players.get()?.records.get(index)
    }

    /// Display name at `index`, as stored.
    pub fn name_at(&self, index: usize) -> Option<&str> {
        self.players.get()?.names.get(index).map(String::as_str)
    }

    /// Lowercased names in index order, loading first if needed.
    pub(crate) async fn lower_names(&self) -> Result<&[String]> {
        Ok(&self.loaded().await?.names_lower)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use dugout_core::roster::TeamRoster;
    use dugout_core::saved::{SavedPlayer, UserId};

    pub(crate) fn record(id: i64, name: &str) -> PlayerRecord {
        PlayerRecord {
            id,
            fangraphs_id: None,
            name: name.to_string(),
            team_abbrev: None,
            overall_score: 0.0,
            seasons: BTreeMap::new(),
        }
    }

    /// Store stub that counts full-table fetches and can be told to fail.
    pub(crate) struct CountingStore {
        pub players: Vec<PlayerRecord>,
        pub fetches: AtomicUsize,
        pub fail: bool,
    }

    impl CountingStore {
        pub(crate) fn new(players: Vec<PlayerRecord>) -> Self {
            CountingStore {
                players,
                fetches: AtomicUsize::new(0),
                fail: false,
            }
        }

        pub(crate) fn failing() -> Self {
            CountingStore {
                fail: true,
                ..CountingStore::new(Vec::new())
            }
        }
    }

    #[async_trait]
    impl PlayerStore for CountingStore {
        async fn fetch_all_players(&self) -> Result<Vec<PlayerRecord>> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(10)).await;
            if self.fail {
                return Err(DugoutError::store_unavailable("connection refused"));
            }
            Ok(self.players.clone())
        }

        async fn fetch_player(&self, id: i64) -> Result<Option<PlayerRecord>> {
            if self.fail {
                return Err(DugoutError::store_unavailable("connection refused"));
            }
            Ok(self.players.iter().find(|p| p.id == id).cloned())
        }

        async fn upsert_players(&self, _players: &[PlayerRecord]) -> Result<usize> {
            Ok(0)
        }

        async fn fetch_saved_players(&self, _user: &UserId) -> Result<Vec<SavedPlayer>> {
            Ok(Vec::new())
        }

        async fn fetch_saved_player(&self, _user: &UserId, _id: i64) -> Result<Option<SavedPlayer>> {
            Ok(None)
        }

        async fn save_saved_player(&self, _user: &UserId, _player: &SavedPlayer) -> Result<()> {
            Ok(())
        }

        async fn delete_saved_player(&self, _user: &UserId, _id: i64) -> Result<bool> {
            Ok(false)
        }

        async fn save_team_roster(&self, _roster: &TeamRoster) -> Result<()> {
            Ok(())
        }

        async fn fetch_team_roster(&self, _team_code: &str) -> Result<Option<TeamRoster>> {
            Ok(None)
        }
    }

    #[tokio::test]
    async fn load_builds_parallel_columns() {
        let store = Arc::new(CountingStore::new(vec![
            record(1, "Babe Ruth"),
            record(2, "Mike Trout"),
        ]));
        let index = PlayerIndex::new(store);
        assert!(!index.is_loaded());
        assert_eq!(index.size(), 0);
        assert!(index.record_at(0).is_none());

        index.load().await.unwrap();

        assert!(index.is_loaded());
        assert_eq!(index.size(), 2);
        assert_eq!(index.record_at(1).unwrap().id, 2);
        assert_eq!(index.name_at(0), Some("Babe Ruth"));
        assert_eq!(index.lower_names().await.unwrap()[1], "mike trout");
    }

    #[tokio::test]
    async fn load_is_a_noop_once_loaded() {
        let store = Arc::new(CountingStore::new(vec![record(1, "Babe Ruth")]));
        let index = PlayerIndex::new(store.clone());
        index.load().await.unwrap();
        index.load().await.unwrap();
        assert_eq!(store.fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn concurrent_loads_fetch_once() {
        let store = Arc::new(CountingStore::new(vec![record(1, "Babe Ruth")]));
        let index = Arc::new(PlayerIndex::new(store.clone()));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let index = index.clone();
            handles.push(tokio::spawn(async move { index.load().await }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(store.fetches.load(Ordering::SeqCst), 1);
        assert_eq!(index.size(), 1);
    }

    #[tokio::test]
    async fn failed_load_surfaces_and_leaves_index_unloaded() {
        let store = Arc::new(CountingStore::failing());
        let index = PlayerIndex::new(store.clone());

        let err = index.load().await.unwrap_err();
        assert!(err.is_unavailable());
        assert!(!index.is_loaded());

        // Not retried behind the caller's back; the next call fetches again.
        let _ = index.load().await;
        assert_eq!(store.fetches.load(Ordering::SeqCst), 2);
    }
}

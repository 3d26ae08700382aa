// Offline roster seeding: active roster -> scored candidates -> best lineup.

use std::sync::Arc;

use serde::Serialize;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

use dugout_core::player::PlayerIdentity;
use dugout_core::roster::TeamRoster;
use dugout_core::store::PlayerStore;
use dugout_core::{DugoutError, Result};

use crate::offense::{offensive_score, OffenseInputs};
use crate::provider::{BattingTable, IdRegister, RosterSource};
use crate::roster::{build_roster, RosterCandidate};
use crate::teams::{find_team, MLB_TEAMS};

/// Outcome of seeding every team.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SeedSummary {
    pub season: u16,
    /// Teams whose roster was written, in table order.
    pub seeded: Vec<String>,
    /// Teams with no eligible candidates; nothing was written.
    pub skipped: Vec<String>,
    /// Teams that failed, with the error message.
    pub failed: Vec<(String, String)>,
}

/// Builds and persists team lineups. Cheap to clone; every part is shared.
#[derive(Clone)]
pub struct RosterSeeder {
    store: Arc<dyn PlayerStore>,
    source: Arc<dyn RosterSource>,
    register: Arc<IdRegister>,
    batting: Arc<BattingTable>,
}

impl RosterSeeder {
    pub fn new(
        store: Arc<dyn PlayerStore>,
        source: Arc<dyn RosterSource>,
        register: Arc<IdRegister>,
        batting: Arc<BattingTable>,
    ) -> Self {
        RosterSeeder {
            store,
            source,
            register,
            batting,
        }
    }

    /// Score one roster player from the batting table. Players without a
    /// FanGraphs id or a batting line score 0.0.
    fn score(&self, fangraphs_id: Option<i64>) -> f64 {
        fangraphs_id
            .and_then(|id| self.batting.get(id))
            .map(|line| offensive_score(&OffenseInputs::from(&line.stat)))
            .unwrap_or(0.0)
    }

    /// Compute the best lineup for `team_code` without persisting it.
    /// `Ok(None)` when the team has no non-pitchers on its active roster.
    pub async fn build_roster(&self, team_code: &str, season: u16) -> Result<Option<TeamRoster>> {
        let team = find_team(team_code).ok_or_else(|| DugoutError::EntityNotFound {
            kind: "team",
            id: team_code.trim().to_uppercase(),
        })?;

        let players = self.source.active_roster(team, season).await?;
        let candidates: Vec<RosterCandidate> = players
            .into_iter()
            .filter(|p| !p.position.eq_ignore_ascii_case("P"))
            .map(|p| {
                let secondary_id = self.register.fangraphs_for(p.mlbam_id);
                RosterCandidate {
                    offensive_score: self.score(secondary_id),
                    position_tag: p.position,
                    player: PlayerIdentity {
                        id: p.mlbam_id,
                        name: p.name,
                        secondary_id,
                    },
                }
            })
            .collect();

        Ok(build_roster(team.code, team.full_name, season, &candidates))
    }

    /// Build and overwrite the stored roster for one team.
    pub async fn seed_team(&self, team_code: &str, season: u16) -> Result<Option<TeamRoster>> {
        let Some(roster) = self.build_roster(team_code, season).await? else {
            info!("{}: no eligible players for {}, nothing written", team_code, season);
            return Ok(None);
        };
        self.store.save_team_roster(&roster).await?;
        info!(
            "{}: saved {}-player lineup for {}",
            roster.team_code,
            roster.lineup.len(),
            season
        );
        Ok(Some(roster))
    }

    /// Seed all 30 teams concurrently. One team failing does not stop the
    /// others.
    pub async fn seed_all(&self, season: u16) -> SeedSummary {
        let mut tasks = JoinSet::new();
        for team in MLB_TEAMS.iter() {
            let seeder = self.clone();
            let code = team.code;
            tasks.spawn(async move { (code, seeder.seed_team(code, season).await) });
        }

        let mut outcomes = Vec::with_capacity(MLB_TEAMS.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => error!("roster seeding task panicked: {}", e),
            }
        }

        let mut summary = SeedSummary {
            season,
            ..SeedSummary::default()
        };
        for team in MLB_TEAMS.iter() {
            let Some((code, result)) = outcomes.iter().find(|(code, _)| *code == team.code) else {
                summary
                    .failed
                    .push((team.code.to_string(), "task did not complete".to_string()));
                continue;
            };
            match result {
                Ok(Some(_)) => summary.seeded.push(code.to_string()),
                Ok(None) => summary.skipped.push(code.to_string()),
                Err(e) => {
                    warn!("{}: roster seeding failed: {}", code, e);
                    summary.failed.push((code.to_string(), e.to_string()));
                }
            }
        }
        summary
    }
}

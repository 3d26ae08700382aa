// Best-player-per-position lineup construction.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use dugout_core::player::PlayerIdentity;
use dugout_core::roster::{FieldPosition, RosterEntry, TeamRoster};

/// A roster player eligible for a lineup slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterCandidate {
    pub player: PlayerIdentity,
    /// Position abbreviation from the roster feed ("SS", "CF", "TWP", ...).
    pub position_tag: String,
    pub offensive_score: f64,
}

/// Pick the highest-scoring candidate for each fielding position.
///
/// Candidates are grouped by their position tag; within a group the first
/// candidate with the top score wins. If nobody is tagged DH, the best
/// candidate not already placed fills the DH slot (same tie rule).
/// Candidates with tags outside C..DH are never placed at a position but
/// can still be the DH. Returns `None` for an empty candidate list.
pub fn build_roster(
    team_code: &str,
    full_team_name: &str,
    season: u16,
    candidates: &[RosterCandidate],
) -> Option<TeamRoster> {
    if candidates.is_empty() {
        return None;
    }

    let mut best: BTreeMap<FieldPosition, usize> = BTreeMap::new();
    for (i, candidate) in candidates.iter().enumerate() {
        let Some(position) = FieldPosition::from_tag(&candidate.position_tag) else {
            continue;
        };
        match best.get(&position) {
            Some(&current) if candidates[current].offensive_score >= candidate.offensive_score => {}
            _ => {
                best.insert(position, i);
            }
        }
    }

    if !best.contains_key(&FieldPosition::DesignatedHitter) {
        let chosen: Vec<usize> = best.values().copied().collect();
        let mut fallback: Option<usize> = None;
        for (i, candidate) in candidates.iter().enumerate() {
            if chosen.contains(&i) {
                continue;
            }
            match fallback {
                Some(current) if candidates[current].offensive_score >= candidate.offensive_score => {}
                _ => fallback = Some(i),
            }
        }
        if let Some(i) = fallback {
            best.insert(FieldPosition::DesignatedHitter, i);
        }
    }

    let lineup = best
        .into_iter()
        .map(|(position, i)| {
            let candidate = &candidates[i];
            RosterEntry {
                position,
                player: candidate.player.clone(),
                listed_position: candidate.position_tag.clone(),
                offensive_score: candidate.offensive_score,
            }
        })
        .collect();

    Some(TeamRoster {
        team_code: team_code.to_string(),
        full_team_name: full_team_name.to_string(),
        season,
        lineup,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(id: i64, tag: &str, score: f64) -> RosterCandidate {
        RosterCandidate {
            player: PlayerIdentity {
                id,
                name: format!("Player {id}"),
                secondary_id: None,
            },
            position_tag: tag.to_string(),
            offensive_score: score,
        }
    }

    fn build(candidates: &[RosterCandidate]) -> Option<TeamRoster> {
        build_roster("NYY", "New York Yankees", 2025, candidates)
    }

    fn id_at(roster: &TeamRoster, position: FieldPosition) -> Option<i64> {
        roster.entry(position).map(|e| e.player.id)
    }

    #[test]
    fn empty_candidates_produce_no_roster() {
        assert!(build(&[]).is_none());
    }

    #[test]
    fn keeps_highest_score_per_position() {
        let roster = build(&[candidate(1, "SS", 5.0), candidate(2, "SS", 7.0)]).unwrap();
        assert_eq!(id_at(&roster, FieldPosition::ShortStop), Some(2));
        // The losing shortstop is the best unplaced candidate.
        assert_eq!(id_at(&roster, FieldPosition::DesignatedHitter), Some(1));
        assert_eq!(roster.lineup.len(), 2);
    }

    #[test]
    fn ties_go_to_first_seen() {
        let roster = build(&[
            candidate(1, "CF", 3.0),
            candidate(2, "CF", 3.0),
            candidate(3, "DH", 1.0),
        ])
        .unwrap();
        assert_eq!(id_at(&roster, FieldPosition::CenterField), Some(1));
        assert_eq!(id_at(&roster, FieldPosition::DesignatedHitter), Some(3));
    }

    #[test]
    fn listed_dh_is_not_replaced() {
        let roster = build(&[
            candidate(1, "1B", 2.0),
            candidate(2, "1B", 9.0),
            candidate(3, "DH", 0.5),
        ])
        .unwrap();
        assert_eq!(id_at(&roster, FieldPosition::DesignatedHitter), Some(3));
    }

    #[test]
    fn dh_fallback_picks_best_unplaced() {
        let roster = build(&[
            candidate(1, "C", 2.0),
            candidate(2, "C", 2.5),
            candidate(3, "LF", 3.0),
            candidate(4, "LF", 2.9),
            candidate(5, "C", 1.0),
        ])
        .unwrap();
        assert_eq!(id_at(&roster, FieldPosition::Catcher), Some(2));
        assert_eq!(id_at(&roster, FieldPosition::LeftField), Some(3));
        let dh = roster.entry(FieldPosition::DesignatedHitter).unwrap();
        assert_eq!(dh.player.id, 4);
        assert_eq!(dh.listed_position, "LF");
    }

    #[test]
    fn dh_fallback_tie_goes_to_first_seen() {
        let roster = build(&[
            candidate(1, "SS", 4.0),
            candidate(2, "SS", 3.0),
            candidate(3, "2B", 5.0),
            candidate(4, "2B", 3.0),
        ])
        .unwrap();
        assert_eq!(id_at(&roster, FieldPosition::DesignatedHitter), Some(2));
    }

    #[test]
    fn everyone_placed_leaves_dh_empty() {
        let roster = build(&[candidate(1, "C", 1.0), candidate(2, "RF", 1.0)]).unwrap();
        assert!(roster.entry(FieldPosition::DesignatedHitter).is_none());
        assert_eq!(roster.lineup.len(), 2);
    }

    #[test]
    fn unrecognized_tags_are_dh_eligible_only() {
        let roster = build(&[candidate(1, "TWP", 6.0), candidate(2, "3B", 2.0)]).unwrap();
        assert_eq!(id_at(&roster, FieldPosition::ThirdBase), Some(2));
        assert_eq!(id_at(&roster, FieldPosition::DesignatedHitter), Some(1));
    }

    #[test]
    fn lineup_is_in_position_order() {
        let roster = build(&[
            candidate(1, "RF", 1.0),
            candidate(2, "C", 1.0),
            candidate(3, "SS", 1.0),
            candidate(4, "RF", 0.5),
        ])
        .unwrap();
        let order: Vec<FieldPosition> = roster.lineup.iter().map(|e| e.position).collect();
        assert_eq!(
            order,
            vec![
                FieldPosition::Catcher,
                FieldPosition::ShortStop,
                FieldPosition::RightField,
                FieldPosition::DesignatedHitter,
            ]
        );
        assert_eq!(roster.team_code, "NYY");
        assert_eq!(roster.season, 2025);
    }
}

// Fielding positions and the persisted per-team lineup.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::player::PlayerIdentity;

/// Non-pitcher lineup slots, declared in lineup display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FieldPosition {
    #[serde(rename = "C")]
    Catcher,
    #[serde(rename = "1B")]
    FirstBase,
    #[serde(rename = "2B")]
    SecondBase,
    #[serde(rename = "3B")]
    ThirdBase,
    #[serde(rename = "SS")]
    ShortStop,
    #[serde(rename = "LF")]
    LeftField,
    #[serde(rename = "CF")]
    CenterField,
    #[serde(rename = "RF")]
    RightField,
    #[serde(rename = "DH")]
    DesignatedHitter,
}

impl FieldPosition {
    pub const ALL: [FieldPosition; 9] = [
        FieldPosition::Catcher,
        FieldPosition::FirstBase,
        FieldPosition::SecondBase,
        FieldPosition::ThirdBase,
        FieldPosition::ShortStop,
        FieldPosition::LeftField,
        FieldPosition::CenterField,
        FieldPosition::RightField,
        FieldPosition::DesignatedHitter,
    ];

    /// Parse a roster-feed position abbreviation. Pitchers, two-way tags
    /// and anything else unrecognized return `None`.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim().to_uppercase().as_str() {
            "C" => Some(FieldPosition::Catcher),
            "1B" => Some(FieldPosition::FirstBase),
            "2B" => Some(FieldPosition::SecondBase),
            "3B" => Some(FieldPosition::ThirdBase),
            "SS" => Some(FieldPosition::ShortStop),
            "LF" => Some(FieldPosition::LeftField),
            "CF" => Some(FieldPosition::CenterField),
            "RF" => Some(FieldPosition::RightField),
            "DH" => Some(FieldPosition::DesignatedHitter),
            _ => None,
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            FieldPosition::Catcher => "C",
            FieldPosition::FirstBase => "1B",
            FieldPosition::SecondBase => "2B",
            FieldPosition::ThirdBase => "3B",
            FieldPosition::ShortStop => "SS",
            FieldPosition::LeftField => "LF",
            FieldPosition::CenterField => "CF",
            FieldPosition::RightField => "RF",
            FieldPosition::DesignatedHitter => "DH",
        }
    }
}

impl fmt::Display for FieldPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// The player chosen for one lineup slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub position: FieldPosition,
    pub player: PlayerIdentity,
    /// Position tag as the roster feed listed it. Differs from `position`
    /// when the player was moved into the DH slot.
    pub listed_position: String,
    pub offensive_score: f64,
}

/// A team's best lineup for one season: at most one entry per position,
/// ordered by position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamRoster {
    pub team_code: String,
    pub full_team_name: String,
    pub season: u16,
    pub lineup: Vec<RosterEntry>,
}

impl TeamRoster {
    pub fn entry(&self, position: FieldPosition) -> Option<&RosterEntry> {
        self.lineup.iter().find(|e| e.position == position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_round_trip() {
        for pos in FieldPosition::ALL {
            assert_eq!(FieldPosition::from_tag(pos.tag()), Some(pos));
        }
    }

    #[test]
    fn from_tag_is_case_insensitive_and_rejects_pitchers() {
        assert_eq!(FieldPosition::from_tag("ss"), Some(FieldPosition::ShortStop));
        assert_eq!(FieldPosition::from_tag(" dh "), Some(FieldPosition::DesignatedHitter));
        assert_eq!(FieldPosition::from_tag("P"), None);
        assert_eq!(FieldPosition::from_tag("TWP"), None);
        assert_eq!(FieldPosition::from_tag(""), None);
    }

    #[test]
    fn ordering_follows_lineup_order() {
        let mut positions = vec![
            FieldPosition::DesignatedHitter,
            FieldPosition::Catcher,
            FieldPosition::RightField,
            FieldPosition::FirstBase,
        ];
        positions.sort();
        assert_eq!(
            positions,
            vec![
                FieldPosition::Catcher,
                FieldPosition::FirstBase,
                FieldPosition::RightField,
                FieldPosition::DesignatedHitter,
            ]
        );
    }

    #[test]
    fn serializes_as_tag() {
        let json = serde_json::to_string(&FieldPosition::FirstBase).unwrap();
        assert_eq!(json, "\"1B\"");
        let back: FieldPosition = serde_json::from_str("\"CF\"").unwrap();
        assert_eq!(back, FieldPosition::CenterField);
    }
}

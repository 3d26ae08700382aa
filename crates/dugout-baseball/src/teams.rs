// The 30 MLB clubs: roster code, stats-API team id and display name.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MlbTeam {
    pub code: &'static str,
    pub stats_api_id: u32,
    pub full_name: &'static str,
}

#[rustfmt::skip]
pub const MLB_TEAMS: [MlbTeam; 30] = [
    MlbTeam { code: "ARI", stats_api_id: 109, full_name: "Arizona Diamondbacks" },
    MlbTeam { code: "ATL", stats_api_id: 144, full_name: "Atlanta Braves" },
    MlbTeam { code: "BAL", stats_api_id: 110, full_name: "Baltimore Orioles" },
    MlbTeam { code: "BOS", stats_api_id: 111, full_name: "Boston Red Sox" },
    MlbTeam { code: "CHC", stats_api_id: 112, full_name: "Chicago Cubs" },
    MlbTeam { code: "CIN", stats_api_id: 113, full_name: "Cincinnati Reds" },
    MlbTeam { code: "CLE", stats_api_id: 114, full_name: "Cleveland Guardians" },
    MlbTeam { code: "COL", stats_api_id: 115, full_name: "Colorado Rockies" },
    MlbTeam { code: "CWS", stats_api_id: 145, full_name: "Chicago White Sox" },
    MlbTeam { code: "DET", stats_api_id: 116, full_name: "Detroit Tigers" },
    MlbTeam { code: "HOU", stats_api_id: 117, full_name: "Houston Astros" },
    MlbTeam { code: "KC", stats_api_id: 118, full_name: "Kansas City Royals" },
    MlbTeam { code: "LAA", stats_api_id: 108, full_name: "Los Angeles Angels" },
    MlbTeam { code: "LAD", stats_api_id: 119, full_name: "Los Angeles Dodgers" },
    MlbTeam { code: "MIA", stats_api_id: 146, full_name: "Miami Marlins" },
    MlbTeam { code: "MIL", stats_api_id: 158, full_name: "Milwaukee Brewers" },
    MlbTeam { code: "MIN", stats_api_id: 142, full_name: "Minnesota Twins" },
    MlbTeam { code: "NYM", stats_api_id: 121, full_name: "New York Mets" },
    MlbTeam { code: "NYY", stats_api_id: 147, full_name: "New York Yankees" },
    MlbTeam { code: "OAK", stats_api_id: 133, full_name: "Oakland Athletics" },
    MlbTeam { code: "PHI", stats_api_id: 143, full_name: "Philadelphia Phillies" },
    MlbTeam { code: "PIT", stats_api_id: 134, full_name: "Pittsburgh Pirates" },
    MlbTeam { code: "SD", stats_api_id: 135, full_name: "San Diego Padres" },
    MlbTeam { code: "SEA", stats_api_id: 136, full_name: "Seattle Mariners" },
    MlbTeam { code: "SF", stats_api_id: 137, full_name: "San Francisco Giants" },
    MlbTeam { code: "STL", stats_api_id: 138, full_name: "St. Louis Cardinals" },
    MlbTeam { code: "TB", stats_api_id: 139, full_name: "Tampa Bay Rays" },
    MlbTeam { code: "TEX", stats_api_id: 140, full_name: "Texas Rangers" },
    MlbTeam { code: "TOR", stats_api_id: 141, full_name: "Toronto Blue Jays" },
    MlbTeam { code: "WSH", stats_api_id: 120, full_name: "Washington Nationals" },
];

/// Look up a team by code, ignoring case and surrounding whitespace.
pub fn find_team(code: &str) -> Option<&'static MlbTeam> {
    let code = code.trim();
    MLB_TEAMS.iter().find(|t| t.code.eq_ignore_ascii_case(code))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn codes_and_ids_are_unique() {
        let codes: HashSet<_> = MLB_TEAMS.iter().map(|t| t.code).collect();
        let ids: HashSet<_> = MLB_TEAMS.iter().map(|t| t.stats_api_id).collect();
        assert_eq!(codes.len(), 30);
        assert_eq!(ids.len(), 30);
    }

    #[test]
    fn find_team_ignores_case() {
        let team = find_team(" nyy ").unwrap();
        assert_eq!(team.stats_api_id, 147);
        assert_eq!(team.full_name, "New York Yankees");
        assert!(find_team("XYZ").is_none());
    }
}

// Offensive score used to rank roster candidates.

use dugout_core::player::SeasonStat;

const WALK_RATE_WEIGHT: f64 = 1.0;
const CONTACT_WEIGHT: f64 = 1.0;
const OBP_WEIGHT: f64 = 1.0;
const ISO_WEIGHT: f64 = 1.0;
const BASE_RUNNING_WEIGHT: f64 = 1.0;

/// The batting-line fields the offensive score reads. Rates are fractions
/// (0.12, not 12).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OffenseInputs {
    pub walk_rate: f64,
    pub strikeout_rate: f64,
    pub on_base_percentage: f64,
    pub isolated_power: f64,
    pub base_running: f64,
}

impl From<&SeasonStat> for OffenseInputs {
    fn from(stat: &SeasonStat) -> Self {
        OffenseInputs {
            walk_rate: stat.walk_rate,
            strikeout_rate: stat.strikeout_rate,
            on_base_percentage: stat.on_base_percentage,
            isolated_power: stat.isolated_power,
            base_running: stat.base_running,
        }
    }
}

/// walk_rate + (1 - strikeout_rate) + OBP + ISO + base_running, each
/// weighted 1.0.
pub fn offensive_score(inputs: &OffenseInputs) -> f64 {
    WALK_RATE_WEIGHT * inputs.walk_rate
        + CONTACT_WEIGHT * (1.0 - inputs.strikeout_rate)
        + OBP_WEIGHT * inputs.on_base_percentage
        + ISO_WEIGHT * inputs.isolated_power
        + BASE_RUNNING_WEIGHT * inputs.base_running
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_formula() {
        let inputs = OffenseInputs {
            walk_rate: 0.10,
            strikeout_rate: 0.20,
            on_base_percentage: 0.350,
            isolated_power: 0.200,
            base_running: 1.5,
        };
        let expected = 0.10 + (1.0 - 0.20) + 0.350 + 0.200 + 1.5;
        assert!((offensive_score(&inputs) - expected).abs() < 1e-12);
    }

    #[test]
    fn empty_line_scores_one() {
        // Only the contact term survives an all-zero batting line.
        assert!((offensive_score(&OffenseInputs::default()) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn negative_base_running_lowers_score() {
        let base = OffenseInputs {
            on_base_percentage: 0.300,
            ..OffenseInputs::default()
        };
        let slow = OffenseInputs {
            base_running: -3.0,
            ..base
        };
        assert!(offensive_score(&slow) < offensive_score(&base));
    }

    #[test]
    fn reads_season_stat_fields() {
        let stat = SeasonStat {
            walk_rate: 0.15,
            strikeout_rate: 0.25,
            on_base_percentage: 0.400,
            isolated_power: 0.300,
            base_running: -1.0,
            ..SeasonStat::default()
        };
        let inputs = OffenseInputs::from(&stat);
        assert!((offensive_score(&inputs) - (0.15 + 0.75 + 0.400 + 0.300 - 1.0)).abs() < 1e-12);
    }
}

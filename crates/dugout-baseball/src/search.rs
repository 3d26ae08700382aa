// Fuzzy name search over the player index.

use serde::{Deserialize, Serialize};
use tracing::debug;

use dugout_core::Result;

use crate::fuzzy::weighted_ratio;
use crate::index::PlayerIndex;
use crate::years::years_active;

/// Per-call search knobs. Defaults come from `[search]` in the config.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchOptions {
    pub limit: usize,
    /// Minimum score (0-100) a name must reach to be returned.
    pub score_cutoff: f64,
}

impl Default for SearchOptions {
    fn default() -> Self {
        SearchOptions {
            limit: 5,
            score_cutoff: 70.0,
        }
    }
}

/// One search hit, shaped for display. Never carries the raw record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerMatch {
    pub id: i64,
    pub name: String,
    pub score: f64,
    pub image_url: String,
    pub years_active: String,
}

/// Render a player image URL from a template containing `{id}`.
pub fn image_url(template: &str, id: i64) -> String {
    template.replace("{id}", &id.to_string())
}

/// Scores every indexed name against `query` and returns the best matches.
pub struct Matcher<'a> {
    index: &'a PlayerIndex,
    image_url_template: &'a str,
    current_year: u16,
}

impl<'a> Matcher<'a> {
    pub fn new(index: &'a PlayerIndex, image_url_template: &'a str, current_year: u16) -> Self {
        Matcher {
            index,
            image_url_template,
            current_year,
        }
    }

    /// Ranked matches for `query`, highest score first, ties in index order.
    ///
    /// A blank query returns no matches without loading the index. A store
    /// failure during the first load is returned as-is.
    pub async fn search(&self, query: &str, options: SearchOptions) -> Result<Vec<PlayerMatch>> {
        let query = query.trim();
        if query.is_empty() || options.limit == 0 {
            return Ok(Vec::new());
        }
        let query = query.to_lowercase();

        let names = self.index.lower_names().await?;
        let mut scored: Vec<(usize, f64)> = names
            .iter()
            .enumerate()
            .map(|(i, name)| (i, weighted_ratio(&query, name)))
            .filter(|&(_, score)| score >= options.score_cutoff)
            .collect();

        // Stable sort keeps index order among equal scores.
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(options.limit);

        debug!(
            "Search {:?}: {} matches above {}",
            query,
            scored.len(),
            options.score_cutoff
        );

        Ok(scored
            .into_iter()
            .filter_map(|(i, score)| {
                let record = self.index.record_at(i)?;
                Some(PlayerMatch {
                    id: record.id,
                    name: self.index.name_at(i)?.to_string(),
                    score,
                    image_url: image_url(self.image_url_template, record.id),
                    years_active: years_active(record.season_years(), self.current_year),
                })
            })
            .collect())
    }
}

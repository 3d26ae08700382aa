// Command-line argument definitions.

use clap::{Parser, Subcommand};

/// Baseball player search, saved lists and team lineups.
#[derive(Debug, Parser)]
#[command(name = "dugout", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fuzzy-search players by name.
    Search {
        query: String,

        /// Maximum number of matches (defaults to `[search] limit`).
        #[arg(long, short)]
        limit: Option<usize>,

        /// Minimum score 0-100 (defaults to `[search] score_cutoff`).
        #[arg(long, short)]
        cutoff: Option<f64>,
    },

    /// Show one player's full season-by-season record.
    Detail {
        /// MLBAM player id.
        id: i64,
    },

    /// Manage a user's saved players.
    Saved {
        #[command(subcommand)]
        cmd: SavedCmd,
    },

    /// Load batting exports and the id register into the player store.
    Ingest,

    /// Rebuild team lineups from the active-roster feed.
    SeedRosters {
        /// Only this team (e.g. NYY). All 30 teams when omitted.
        #[arg(long, short)]
        team: Option<String>,

        /// Season to build (defaults to `[roster] season`).
        #[arg(long, short)]
        season: Option<u16>,
    },

    /// Show the stored lineup for a team.
    Roster {
        /// Team code, e.g. LAD.
        team: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum SavedCmd {
    /// List every saved player.
    List {
        #[arg(long, short)]
        user: String,
    },

    /// Save a player from a JSON object with at least `id` and `name`.
    Add {
        #[arg(long, short)]
        user: String,

        /// e.g. '{"id": 592450, "name": "Aaron Judge"}'
        payload: String,
    },

    /// Show one saved player.
    Get {
        #[arg(long, short)]
        user: String,

        id: String,
    },

    /// Remove a saved player.
    Remove {
        #[arg(long, short)]
        user: String,

        id: String,
    },
}

// Player search, detail assembly and roster ranking on top of dugout-core.

pub mod detail;
pub mod fuzzy;
pub mod index;
pub mod ingest;
pub mod offense;
pub mod provider;
pub mod roster;
pub mod search;
pub mod seed;
pub mod teams;
pub mod years;

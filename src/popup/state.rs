use crate::catalog::models::Game;

// Fetch progress. Independent of menu visibility and the search term.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FetchStatus {
    Idle,
    Loading,
    Ready,
}

// Result of one mount's fetch, sent back from the runtime.
#[derive(Clone, Debug)]
pub struct CatalogUpdate {
    pub generation: u64,
    pub games: Vec<Game>,
}

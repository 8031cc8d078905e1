use serde::{Deserialize, Serialize};

/// One entry of the remote game catalog.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub thumb: String,
    pub link: String,
}

/// Featured game shown in the "now playing" frame, independent of the catalog.
///
/// Same fields as [`Game`], borrowed from static data so it can be a `const`.
#[derive(Clone, Copy, Debug)]
pub struct FixedGame {
    pub id: i64,
    pub name: &'static str,
    pub description: &'static str,
    pub thumb: &'static str,
    pub link: &'static str,
}

pub const FIXED_GAME: FixedGame = FixedGame {
    id: 0,
    name: "Retrobowl",
    description: "Play Retrobowl online!",
    thumb: "https://example.com/thumb.png",
    link: "https://retrobowl-unblocked.github.io/new/index.html",
};

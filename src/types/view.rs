use serde::{Deserialize, Serialize};

/// Which tab of the bookmark grid is selected.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ViewTab {
    #[default]
    All,
    #[serde(alias = "fav")]
    Favorites,
}

impl ViewTab {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViewTab::All => "all",
            ViewTab::Favorites => "favorites",
        }
    }

    /// Parses a wire name. `"fav"` is accepted for `Favorites`.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "all" => Some(ViewTab::All),
            "favorites" | "fav" => Some(ViewTab::Favorites),
            _ => None,
        }
    }
}

/// How a new bookmark is being entered.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum EntryMode {
    #[default]
    Manual,
    QuickSearch,
}

/// Monotonic tag attached to a list fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FetchTicket(pub u64);

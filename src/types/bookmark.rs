use serde::{Deserialize, Serialize};

/// A saved OTT bookmark, owned by exactly one user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Bookmark {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub url: String,
    pub thumbnail: Option<String>,
    pub favorite: bool,
    pub created_at: i64,
}

/// Insert payload for a bookmark. The store assigns `id`, `user_id`,
/// `favorite` and `created_at`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewBookmark {
    pub title: String,
    pub url: String,
    pub thumbnail: Option<String>,
}

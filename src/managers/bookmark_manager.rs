//! Bookmark Manager for ottmarks.
//!
//! Implements `BookmarkManagerTrait`, the user-scoped store adapter for
//! bookmarks, backed by SQLite via `rusqlite`. Every statement filters on
//! the session's user id, so one user never sees or touches another
//! user's rows.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use rusqlite::{params, OptionalExtension};
use uuid::Uuid;

use crate::database::connection::Database;
use crate::types::bookmark::{Bookmark, NewBookmark};
use crate::types::errors::BookmarkError;
use crate::types::session::Session;

const SELECT_COLUMNS: &str =
    "SELECT id, user_id, title, url, thumbnail, favorite, created_at FROM bookmarks";

/// Trait defining bookmark store operations, all scoped to a session.
pub trait BookmarkManagerTrait {
    /// Lists the user's bookmarks: favorites first, then newest first.
    fn list_bookmarks(&self, session: &Session) -> Result<Vec<Bookmark>, BookmarkError>;
    /// Inserts a bookmark with `favorite = false`. Returns the generated ID.
    fn add_bookmark(&self, session: &Session, bookmark: &NewBookmark) -> Result<String, BookmarkError>;
    fn set_favorite(&self, session: &Session, id: &str, favorite: bool) -> Result<(), BookmarkError>;
    fn remove_bookmark(&self, session: &Session, id: &str) -> Result<(), BookmarkError>;
    fn get_bookmark(&self, session: &Session, id: &str) -> Result<Option<Bookmark>, BookmarkError>;
}

/// Bookmark manager backed by a shared SQLite database.
pub struct BookmarkManager {
    db: Arc<Database>,
}

impl BookmarkManager {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Returns the current UNIX timestamp in milliseconds.
    fn now_millis() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as i64
    }

    /// Reads a single `Bookmark` row into a struct.
    fn row_to_bookmark(row: &rusqlite::Row) -> rusqlite::Result<Bookmark> {
        Ok(Bookmark {
            id: row.get(0)?,
            user_id: row.get(1)?,
            title: row.get(2)?,
            url: row.get(3)?,
            thumbnail: row.get(4)?,
            favorite: row.get::<_, i64>(5)? != 0,
            created_at: row.get(6)?,
        })
    }
}

impl BookmarkManagerTrait for BookmarkManager {
    fn list_bookmarks(&self, session: &Session) -> Result<Vec<Bookmark>, BookmarkError> {
        let sql = format!(
            "{} WHERE user_id = ?1 ORDER BY favorite DESC, created_at DESC, rowid DESC",
            SELECT_COLUMNS
        );
        let conn = self.db.connection();
        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| BookmarkError::DatabaseError(e.to_string()))?;

        let rows = stmt
            .query_map(params![session.user_id()], Self::row_to_bookmark)
            .map_err(|e| BookmarkError::DatabaseError(e.to_string()))?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row.map_err(|e| BookmarkError::DatabaseError(e.to_string()))?);
        }
        Ok(results)
    }

    fn add_bookmark(&self, session: &Session, bookmark: &NewBookmark) -> Result<String, BookmarkError> {
        let title = bookmark.title.trim();
        if title.is_empty() {
            return Err(BookmarkError::InvalidInput("title must not be empty".to_string()));
        }
        if bookmark.url.trim().is_empty() {
            return Err(BookmarkError::InvalidInput("url must not be empty".to_string()));
        }

        let id = Uuid::new_v4().to_string();
        let thumbnail = bookmark
            .thumbnail
            .as_deref()
            .filter(|t| !t.trim().is_empty());

        self.db
            .connection()
            .execute(
                "INSERT INTO bookmarks (id, user_id, title, url, thumbnail, favorite, created_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6)",
                params![
                    id,
                    session.user_id(),
                    title,
                    bookmark.url,
                    thumbnail,
                    Self::now_millis()
                ],
            )
            .map_err(|e| BookmarkError::DatabaseError(e.to_string()))?;

        log::debug!("inserted bookmark {} for user {}", id, session.user_id());
        Ok(id)
    }

    /// Overwrites the favorite flag. Unknown IDs are ignored.
    fn set_favorite(&self, session: &Session, id: &str, favorite: bool) -> Result<(), BookmarkError> {
        let affected = self
            .db
            .connection()
            .execute(
                "UPDATE bookmarks SET favorite = ?1 WHERE id = ?2 AND user_id = ?3",
                params![favorite as i64, id, session.user_id()],
            )
            .map_err(|e| BookmarkError::DatabaseError(e.to_string()))?;

        if affected == 0 {
            log::debug!("set_favorite on unknown bookmark {}", id);
        }
        Ok(())
    }

    /// Removes a bookmark. Unknown IDs are ignored.
    fn remove_bookmark(&self, session: &Session, id: &str) -> Result<(), BookmarkError> {
        let affected = self
            .db
            .connection()
            .execute(
                "DELETE FROM bookmarks WHERE id = ?1 AND user_id = ?2",
                params![id, session.user_id()],
            )
            .map_err(|e| BookmarkError::DatabaseError(e.to_string()))?;

        if affected == 0 {
            log::debug!("remove_bookmark on unknown bookmark {}", id);
        }
        Ok(())
    }

    fn get_bookmark(&self, session: &Session, id: &str) -> Result<Option<Bookmark>, BookmarkError> {
        let sql = format!("{} WHERE id = ?1 AND user_id = ?2", SELECT_COLUMNS);
        self.db
            .connection()
            .query_row(&sql, params![id, session.user_id()], Self::row_to_bookmark)
            .optional()
            .map_err(|e| BookmarkError::DatabaseError(e.to_string()))
    }
}

//! Session Manager for ottmarks.
//!
//! Owns the explicit session context. Sign-in populates it and sign-out
//! clears it; store-scoped operations borrow it through [`SessionManager::session`].
//! The identity collaborator itself sits behind [`IdentityProvider`].

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use rusqlite::{params, OptionalExtension};

use crate::database::connection::Database;
use crate::types::errors::AuthError;
use crate::types::session::{OAuthProvider, Session, User};

/// The external identity collaborator.
pub trait IdentityProvider {
    /// Returns the user the provider currently holds a session for.
    fn current_user(&self) -> Result<Option<User>, AuthError>;
    /// Begins an OAuth sign-in and returns the URL the UI shell navigates to.
    fn sign_in_with_oauth(&mut self, provider: OAuthProvider, redirect_to: &str) -> Result<String, AuthError>;
    /// Records the user the provider verified at the end of the OAuth flow.
    fn complete_sign_in(&mut self, user: &User) -> Result<(), AuthError>;
    fn sign_out(&mut self) -> Result<(), AuthError>;
}

/// Identity provider that delegates OAuth to an external auth server and
/// persists the resulting user in the `auth_session` table.
pub struct StoredIdentityProvider {
    db: Arc<Database>,
    base_url: String,
}

impl StoredIdentityProvider {
    pub fn new(db: Arc<Database>, base_url: &str) -> Self {
        Self {
            db,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn now_millis() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as i64
    }
}

impl IdentityProvider for StoredIdentityProvider {
    fn current_user(&self) -> Result<Option<User>, AuthError> {
        let row = self
            .db
            .connection()
            .query_row(
                "SELECT user_id, email, provider FROM auth_session WHERE id = 'default'",
                [],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, Option<String>>(1)?,
                        row.get::<_, String>(2)?,
                    ))
                },
            )
            .optional()
            .map_err(|e| AuthError::DatabaseError(e.to_string()))?;

        Ok(row.and_then(|(id, email, provider)| {
            OAuthProvider::parse(&provider).map(|provider| User { id, email, provider })
        }))
    }

    fn sign_in_with_oauth(&mut self, provider: OAuthProvider, redirect_to: &str) -> Result<String, AuthError> {
        if self.base_url.is_empty() {
            return Err(AuthError::ProviderError("auth base url is not configured".to_string()));
        }
        Ok(format!(
            "{}/authorize?provider={}&redirect_to={}",
            self.base_url,
            provider.as_str(),
            urlencoding::encode(redirect_to)
        ))
    }

    fn complete_sign_in(&mut self, user: &User) -> Result<(), AuthError> {
        if user.id.trim().is_empty() {
            return Err(AuthError::ProviderError("user id must not be empty".to_string()));
        }
        self.db
            .connection()
            .execute(
                "INSERT OR REPLACE INTO auth_session (id, user_id, email, provider, started_at) \
                 VALUES ('default', ?1, ?2, ?3, ?4)",
                params![user.id, user.email, user.provider.as_str(), Self::now_millis()],
            )
            .map_err(|e| AuthError::DatabaseError(e.to_string()))?;
        Ok(())
    }

    fn sign_out(&mut self) -> Result<(), AuthError> {
        self.db
            .connection()
            .execute("DELETE FROM auth_session", [])
            .map_err(|e| AuthError::DatabaseError(e.to_string()))?;
        Ok(())
    }
}

/// Trait defining session management operations.
pub trait SessionManagerTrait {
    /// Restores the session from the identity provider, if it holds one.
    fn initialize(&mut self) -> Result<Option<&Session>, AuthError>;
    fn begin_sign_in(&mut self, provider: OAuthProvider, redirect_to: &str) -> Result<String, AuthError>;
    fn complete_sign_in(&mut self, user: User) -> Result<&Session, AuthError>;
    fn sign_out(&mut self) -> Result<(), AuthError>;
    /// Returns the active session or `AuthError::NotAuthenticated`.
    fn session(&self) -> Result<&Session, AuthError>;
    fn is_authenticated(&self) -> bool;
}

/// Session manager holding the identity provider and the active session.
pub struct SessionManager {
    provider: Box<dyn IdentityProvider>,
    current: Option<Session>,
}

impl SessionManager {
    pub fn new(provider: Box<dyn IdentityProvider>) -> Self {
        Self {
            provider,
            current: None,
        }
    }

    fn start(user: User) -> Session {
        Session {
            user,
            started_at: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default()
                .as_millis() as i64,
        }
    }
}

impl SessionManagerTrait for SessionManager {
    fn initialize(&mut self) -> Result<Option<&Session>, AuthError> {
        self.current = self.provider.current_user()?.map(Self::start);
        match &self.current {
            Some(s) => log::info!("restored session for user {}", s.user_id()),
            None => log::info!("no active session"),
        }
        Ok(self.current.as_ref())
    }

    fn begin_sign_in(&mut self, provider: OAuthProvider, redirect_to: &str) -> Result<String, AuthError> {
        self.provider.sign_in_with_oauth(provider, redirect_to)
    }

    fn complete_sign_in(&mut self, user: User) -> Result<&Session, AuthError> {
        self.provider.complete_sign_in(&user)?;
        log::info!("signed in user {} via {}", user.id, user.provider.as_str());
        Ok(self.current.insert(Self::start(user)))
    }

    fn sign_out(&mut self) -> Result<(), AuthError> {
        self.provider.sign_out()?;
        if let Some(s) = self.current.take() {
            log::info!("signed out user {}", s.user_id());
        }
        Ok(())
    }

    fn session(&self) -> Result<&Session, AuthError> {
        self.current.as_ref().ok_or(AuthError::NotAuthenticated)
    }

    fn is_authenticated(&self) -> bool {
        self.current.is_some()
    }
}

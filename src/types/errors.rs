use std::fmt;

// === BookmarkError ===

/// Errors related to bookmark store operations.
#[derive(Debug)]
pub enum BookmarkError {
    /// Bookmark with the given ID was not found for this user.
    NotFound(String),
    /// The bookmark payload failed validation (empty title or url).
    InvalidInput(String),
    /// Database operation failed.
    DatabaseError(String),
}

impl fmt::Display for BookmarkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookmarkError::NotFound(id) => write!(f, "Bookmark not found: {}", id),
            BookmarkError::InvalidInput(msg) => write!(f, "Invalid bookmark: {}", msg),
            BookmarkError::DatabaseError(msg) => {
                write!(f, "Bookmark database error: {}", msg)
            }
        }
    }
}

impl std::error::Error for BookmarkError {}

// === AuthError ===

/// Errors related to the session and identity collaborator.
#[derive(Debug)]
pub enum AuthError {
    /// No user is signed in.
    NotAuthenticated,
    /// The identity provider rejected or failed the request.
    ProviderError(String),
    /// Database operation failed while persisting the session.
    DatabaseError(String),
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::NotAuthenticated => write!(f, "Not authenticated"),
            AuthError::ProviderError(msg) => write!(f, "Identity provider error: {}", msg),
            AuthError::DatabaseError(msg) => write!(f, "Session database error: {}", msg),
        }
    }
}

impl std::error::Error for AuthError {}

// === ThumbnailError ===

/// Errors from the external image-lookup collaborator.
#[derive(Debug)]
pub enum ThumbnailError {
    /// The lookup request failed or returned a non-success status.
    NetworkError(String),
    /// The lookup response body could not be parsed.
    ParseError(String),
}

impl fmt::Display for ThumbnailError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ThumbnailError::NetworkError(msg) => write!(f, "Image lookup network error: {}", msg),
            ThumbnailError::ParseError(msg) => write!(f, "Image lookup parse error: {}", msg),
        }
    }
}

impl std::error::Error for ThumbnailError {}

// === VoiceError ===

/// Errors related to voice capture.
#[derive(Debug)]
pub enum VoiceError {
    /// No speech-recognition capability exists on this platform.
    Unsupported,
    /// A capture session is already running.
    AlreadyListening,
    /// The recognizer failed to start.
    RecognizerError(String),
}

impl fmt::Display for VoiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VoiceError::Unsupported => write!(f, "Voice not supported"),
            VoiceError::AlreadyListening => write!(f, "Voice capture already listening"),
            VoiceError::RecognizerError(msg) => write!(f, "Speech recognizer error: {}", msg),
        }
    }
}

impl std::error::Error for VoiceError {}

// === DashboardError ===

/// Errors surfaced by dashboard actions.
#[derive(Debug, PartialEq)]
pub enum DashboardError {
    /// User input was rejected before submission.
    Validation(String),
    /// An add is already in flight.
    Busy,
    /// No session is active.
    Unauthenticated,
    /// A store or lookup call failed.
    Remote(String),
}

impl DashboardError {
    /// Generic text shown to the user in an alert. Remote detail is never
    /// included; it only reaches the log.
    pub fn alert_message(&self) -> &str {
        match self {
            DashboardError::Validation(msg) => msg,
            DashboardError::Busy => "Please wait for the current bookmark to finish",
            DashboardError::Unauthenticated => "Please sign in",
            DashboardError::Remote(_) => "Something went wrong, please try again",
        }
    }

    /// Alert for a failed add.
    pub fn add_alert_message(&self) -> &str {
        match self {
            DashboardError::Remote(_) => "Error adding bookmark",
            other => other.alert_message(),
        }
    }
}

impl fmt::Display for DashboardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DashboardError::Validation(msg) => write!(f, "Validation failed: {}", msg),
            DashboardError::Busy => write!(f, "Dashboard busy"),
            DashboardError::Unauthenticated => write!(f, "unauthenticated"),
            DashboardError::Remote(msg) => write!(f, "Remote call failed: {}", msg),
        }
    }
}

impl std::error::Error for DashboardError {}

impl From<BookmarkError> for DashboardError {
    fn from(e: BookmarkError) -> Self {
        match e {
            BookmarkError::InvalidInput(msg) => DashboardError::Validation(msg),
            other => DashboardError::Remote(other.to_string()),
        }
    }
}

impl From<AuthError> for DashboardError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::NotAuthenticated => DashboardError::Unauthenticated,
            other => DashboardError::Remote(other.to_string()),
        }
    }
}

// === SettingsError ===

/// Errors related to settings management.
#[derive(Debug)]
pub enum SettingsError {
    /// An I/O error occurred while reading or writing settings.
    IoError(String),
    /// Failed to serialize or deserialize settings.
    SerializationError(String),
    /// The provided settings key is invalid.
    InvalidKey(String),
    /// The provided settings value is invalid.
    InvalidValue(String),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::IoError(msg) => write!(f, "Settings I/O error: {}", msg),
            SettingsError::SerializationError(msg) => {
                write!(f, "Settings serialization error: {}", msg)
            }
            SettingsError::InvalidKey(key) => write!(f, "Invalid settings key: {}", key),
            SettingsError::InvalidValue(msg) => {
                write!(f, "Invalid settings value: {}", msg)
            }
        }
    }
}

impl std::error::Error for SettingsError {}

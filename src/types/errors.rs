use std::fmt;

// === ParseError ===

/// Errors that abort a bookmark file import. No partial forest is produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The document contains no `<DL>` bookmark list.
    NoListFound,
    /// The document holds more folders and bookmarks than allowed.
    LimitExceeded { limit: usize },
    /// The import file could not be read.
    Unreadable(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::NoListFound => write!(f, "No valid bookmark list found in file"),
            ParseError::LimitExceeded { limit } => {
                write!(f, "Bookmark file exceeds the limit of {} items", limit)
            }
            ParseError::Unreadable(msg) => write!(f, "Bookmark file unreadable: {}", msg),
        }
    }
}

impl std::error::Error for ParseError {}

// === StoreError ===

/// Errors raised while persisting or restoring the forest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Database operation failed.
    DatabaseError(String),
    /// The forest could not be encoded or decoded.
    SerializationError(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::DatabaseError(msg) => write!(f, "Bookmark store database error: {}", msg),
            StoreError::SerializationError(msg) => {
                write!(f, "Bookmark store serialization error: {}", msg)
            }
        }
    }
}

impl std::error::Error for StoreError {}

// === ValidationError ===

/// User input rejected before it reaches the tree engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Title is empty or whitespace only.
    EmptyTitle,
    /// URL is empty or whitespace only.
    EmptyUrl,
    /// URL does not parse as an absolute URL.
    InvalidUrl(String),
    /// Tag is empty, has surrounding whitespace, or contains a comma. Such a
    /// tag would not survive the comma-separated `TAGS` attribute on export.
    InvalidTag(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::EmptyTitle => write!(f, "Title cannot be empty"),
            ValidationError::EmptyUrl => write!(f, "URL cannot be empty"),
            ValidationError::InvalidUrl(url) => write!(f, "Invalid URL: {}", url),
            ValidationError::InvalidTag(tag) => write!(f, "Invalid tag: '{}'", tag),
        }
    }
}

impl std::error::Error for ValidationError {}

// === BookmarkError ===

/// Errors surfaced by the bookmark manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookmarkError {
    Validation(ValidationError),
    Parse(ParseError),
    Store(StoreError),
}

impl fmt::Display for BookmarkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookmarkError::Validation(e) => write!(f, "{}", e),
            BookmarkError::Parse(e) => write!(f, "{}", e),
            BookmarkError::Store(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for BookmarkError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BookmarkError::Validation(e) => Some(e),
            BookmarkError::Parse(e) => Some(e),
            BookmarkError::Store(e) => Some(e),
        }
    }
}

impl From<ValidationError> for BookmarkError {
    fn from(e: ValidationError) -> Self {
        BookmarkError::Validation(e)
    }
}

impl From<ParseError> for BookmarkError {
    fn from(e: ParseError) -> Self {
        BookmarkError::Parse(e)
    }
}

impl From<StoreError> for BookmarkError {
    fn from(e: StoreError) -> Self {
        BookmarkError::Store(e)
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

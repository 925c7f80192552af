//! Persistence layer errors.

/// Specific error conditions for database operations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum DatabaseErrorKind {
    /// Failed to establish or borrow a connection
    #[display("connection failed: {}", _0)]
    Connection(String),
    /// A query or transaction failed
    #[display("query failed: {}", _0)]
    Query(String),
    /// The bounded transaction timeout elapsed
    #[display("transaction timed out: {}", _0)]
    Timeout(String),
    /// A generated row failed shape validation before insert
    #[display("invalid row for table '{}': {}", table, reason)]
    InvalidRow {
        /// Target table
        table: String,
        /// Validation failure
        reason: String,
    },
    /// A voice line referenced a panel that does not exist in this run's
    /// just-created panel set
    #[display("voice line {} references missing panel (storyboard {}, panel {})", line_index, storyboard_index, panel_index)]
    OrphanVoiceLine {
        /// Index of the offending voice line
        line_index: i32,
        /// Referenced storyboard ordinal
        storyboard_index: i32,
        /// Referenced panel ordinal
        panel_index: i32,
    },
}

/// Error type for persistence operations.
///
/// # Examples
///
/// ```
/// use clipwright_error::{DatabaseError, DatabaseErrorKind};
///
/// let err = DatabaseError::new(DatabaseErrorKind::Query("deadlock".to_string()));
/// assert!(format!("{}", err).contains("deadlock"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Database Error: {} at line {} in {}", kind, line, file)]
pub struct DatabaseError {
    /// The specific error condition
    pub kind: DatabaseErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl DatabaseError {
    /// Create a new DatabaseError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: DatabaseErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}

use std::fmt;

/// Why a session action was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// The session's capability does not allow changing chart configs.
    Forbidden,
    /// No report result has been loaded yet.
    NoResultSet,
    /// The chart editor is missing its X or Y axis.
    MissingAxes,
    /// A chosen axis is not a column of the loaded result.
    UnknownColumn(String),
    /// A backend call failed; the message is also kept as the session error.
    Remote(String),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::Forbidden => write!(f, "Only administrators can change chart configurations"),
            SessionError::NoResultSet => write!(f, "Run the report first"),
            SessionError::MissingAxes => write!(f, "Choose both an X axis and a Y axis"),
            SessionError::UnknownColumn(column) => {
                write!(f, "Column '{}' is not in the report result", column)
            }
            SessionError::Remote(message) => write!(f, "{}", message),
        }
    }
}

impl std::error::Error for SessionError {}

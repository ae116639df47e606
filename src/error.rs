use std::error;
use std::fmt;

/// Why a board or game could not be set up.
///
/// Text that cannot be parsed is reported as a `pgn_traits::Error` instead, with one of these as its cause where relevant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The requested board does not fit the engine's limits.
    InvalidDimensions,
    /// No ruleset is known under the given name.
    UnknownRules,
    /// A tower would have more bricks than a tower can hold.
    TowerTooHigh,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::InvalidDimensions => write!(f, "invalid board dimensions"),
            ErrorKind::UnknownRules => write!(f, "unknown ruleset"),
            ErrorKind::TowerTooHigh => write!(f, "tower too high"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    kind: ErrorKind,
    message: String,
}

impl Error {
    pub fn new<S: Into<String>>(kind: ErrorKind, message: S) -> Self {
        Error {
            kind,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl error::Error for Error {}

//! Errors returned by journal commands

use thiserror::Error;

use crate::storage::StorageError;

/// Errors that abort a command
#[derive(Error, Debug)]
pub enum Error {
    /// A supplied option failed its check; raised before any store access
    #[error("Can't execute '{command}' command. {reason} See 'pus {command} --help'.")]
    InvalidOption {
        command: String,
        field: String,
        reason: String,
    },

    /// The store failed to read or write
    #[error(transparent)]
    Persistence(#[from] StorageError),
}

impl Error {
    pub fn invalid_option(
        command: impl Into<String>,
        field: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Error::InvalidOption {
            command: command.into(),
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Name of the offending option, if any
    pub fn field(&self) -> Option<&str> {
        match self {
            Error::InvalidOption { field, .. } => Some(field),
            Error::Persistence(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_option_display() {
        let err = Error::invalid_option("log", "date", "Date is incorrect.");
        assert_eq!(
            err.to_string(),
            "Can't execute 'log' command. Date is incorrect. See 'pus log --help'."
        );
        assert_eq!(err.field(), Some("date"));
    }
}

use core::fmt;
use std::error::Error;
use std::fmt::Display;

/// Raft library error: short description plus an optional cause message.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct RaftError {
    text: String,
    cause: String,
}

pub type Result<T> = std::result::Result<T, RaftError>;

/// Returns new RaftError wrapped in Err.
pub fn new_err<T>(text: String, cause: String) -> std::result::Result<T, RaftError> {
    Err(RaftError::new(text, cause))
}

impl RaftError {
    /// Creates new RaftError. Cause can be empty.
    pub fn new(text: String, cause: String) -> RaftError {
        RaftError { text, cause }
    }

    /// Error description without the cause.
    pub fn text(&self) -> &str {
        &self.text
    }
}

impl Display for RaftError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let cause_word = {
            if !self.cause.is_empty() {
                " Cause: ".to_string()
            } else {
                String::new()
            }
        };
        write!(f, "{}.{}{}", self.text, cause_word, self.cause)
    }
}

impl Error for RaftError {}

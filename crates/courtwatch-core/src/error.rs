use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Malformed label {label:?}: {reason}")]
    MalformedLabel { label: String, reason: String },

    #[error("Invalid search criteria: {0}")]
    InvalidCriteria(String),

    #[error("Unexpected {event} while {state}")]
    UnexpectedEvent { event: String, state: String },
}

impl Error {
    pub(crate) fn malformed(label: &str, reason: impl Into<String>) -> Self {
        Error::MalformedLabel {
            label: label.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

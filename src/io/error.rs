use super::Format;
use crate::pipeline::ValidationError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O operation failed: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    #[error("failed to parse {format} data: {details}")]
    Parse { format: Format, details: String },

    #[error("failed to write {format} data: {details}")]
    Write { format: Format, details: String },

    #[error("route payload rejected: {0}")]
    InvalidRoute(#[from] ValidationError),

    #[error("catalog route '{route}' is invalid: {source}")]
    Catalog {
        route: String,
        #[source]
        source: ValidationError,
    },

    #[error("unknown {kind} '{id}'")]
    UnknownReference { kind: &'static str, id: String },
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        if e.is_io() {
            Error::Io { source: e.into() }
        } else {
            Error::parse(Format::Json, e.to_string())
        }
    }
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Error::parse(Format::Toml, e.message())
    }
}

impl Error {
    pub fn parse(format: Format, details: impl Into<String>) -> Self {
        Self::Parse {
            format,
            details: details.into(),
        }
    }

    pub fn unknown(kind: &'static str, id: impl Into<String>) -> Self {
        Self::UnknownReference {
            kind,
            id: id.into(),
        }
    }
}

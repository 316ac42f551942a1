use std::fmt;

use thiserror::Error as ThisError;

/// Coarse classification used by callers to decide how to present a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Config,
    Connectivity,
    DataShape,
}

impl ErrorKind {
    /// Short advice shown next to a failure message.
    pub fn hint(self) -> &'static str {
        match self {
            ErrorKind::Config => "Check DATABASE_URL and the other settings in .env.",
            ErrorKind::Connectivity => "Check the network and the store connection.",
            ErrorKind::DataShape => "The catalog returned records in an unexpected shape.",
        }
    }
}

#[derive(Debug, ThisError)]
#[non_exhaustive]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("connectivity error: {0}")]
    Connectivity(String),
    #[error("unexpected data shape: {0}")]
    DataShape(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Config(_) => ErrorKind::Config,
            Error::Connectivity(_) => ErrorKind::Connectivity,
            Error::DataShape(_) => ErrorKind::DataShape,
        }
    }

    pub fn data_shape<D: fmt::Display>(d: D) -> Self {
        Error::DataShape(d.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Error::DataShape(e.to_string())
        } else {
            Error::Connectivity(e.to_string())
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::DataShape(e.to_string())
    }
}

impl From<diesel::result::Error> for Error {
    fn from(e: diesel::result::Error) -> Self {
        Error::Connectivity(format!("store query failed: {}", e))
    }
}

impl From<diesel::ConnectionError> for Error {
    fn from(e: diesel::ConnectionError) -> Self {
        Error::Connectivity(format!("store connection failed: {}", e))
    }
}

impl From<diesel::r2d2::PoolError> for Error {
    fn from(e: diesel::r2d2::PoolError) -> Self {
        Error::Connectivity(format!("store pool unavailable: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_errors_are_data_shape() {
        let err: Error = serde_json::from_str::<serde_json::Value>("{").unwrap_err().into();
        assert_eq!(err.kind(), ErrorKind::DataShape);
        assert!(err.to_string().starts_with("unexpected data shape"));
    }

    #[test]
    fn store_errors_are_connectivity() {
        let err: Error = diesel::result::Error::NotFound.into();
        assert_eq!(err.kind(), ErrorKind::Connectivity);
    }

    #[test]
    fn request_errors_are_connectivity() {
        let err: Error = reqwest::Client::new()
            .get("not a url")
            .build()
            .unwrap_err()
            .into();
        assert_eq!(err.kind(), ErrorKind::Connectivity);
    }

    #[test]
    fn each_kind_has_its_own_hint() {
        let config = Error::Config("missing".into()).kind().hint();
        let connectivity = Error::Connectivity("refused".into()).kind().hint();
        let data_shape = Error::data_shape("no id").kind().hint();
        assert!(config.contains("DATABASE_URL"));
        assert!(connectivity.contains("network"));
        assert_ne!(data_shape, connectivity);
        assert_ne!(data_shape, config);
    }
}

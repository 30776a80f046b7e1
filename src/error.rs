use crate::response::Status;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Io(std::io::Error),
    AddrParse(std::net::AddrParseError),
    DirectoryNotFound(String),
    Template(String),
    /// A `%` escape that is truncated or not followed by two hex digits.
    MalformedEncoding,
    BadRequest,
    NotFound,
}

impl AppError {
    /// The status a stock reply should carry for this error.
    ///
    /// Anything that is not a request-shape problem collapses to `404`.
    pub fn status(&self) -> Status {
        match self {
            AppError::MalformedEncoding | AppError::BadRequest => Status::BadRequest,
            _ => Status::NotFound,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Io(err) => write!(f, "IO error: {err}"),
            AppError::AddrParse(err) => write!(f, "Address parse error: {err}"),
            AppError::DirectoryNotFound(path) => write!(f, "Directory not found: {path}"),
            AppError::Template(msg) => write!(f, "Template error: {msg}"),
            AppError::MalformedEncoding => write!(f, "Malformed percent-encoding"),
            AppError::BadRequest => write!(f, "Bad request"),
            AppError::NotFound => write!(f, "Not Found"),
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Io(err)
    }
}

impl From<std::net::AddrParseError> for AppError {
    fn from(err: std::net::AddrParseError) -> Self {
        AppError::AddrParse(err)
    }
}

impl std::error::Error for AppError {}

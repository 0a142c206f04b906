use std::fmt;

#[derive(Debug)]
pub enum Error {
    Io(std::io::Error),
    /// The request is missing a required field or carries an unusable value.
    InvalidInput(String),
    /// A caller-supplied screenshot could not be decoded.
    Image(String),
    /// The output document could not be built or re-parsed.
    Pdf(String),
    /// Object storage is misconfigured or unreachable.
    Storage(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "I/O error: {e}"),
            Error::InvalidInput(msg) => write!(f, "invalid input: {msg}"),
            Error::Image(msg) => write!(f, "image error: {msg}"),
            Error::Pdf(msg) => write!(f, "PDF error: {msg}"),
            Error::Storage(msg) => write!(f, "storage error: {msg}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<lopdf::Error> for Error {
    fn from(e: lopdf::Error) -> Self {
        Error::Pdf(e.to_string())
    }
}

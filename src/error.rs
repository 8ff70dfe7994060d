use std::{error, fmt, io, string};

use crate::atom::Fourcc;

/// Type alias for the result of container operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Kinds of errors that may occur while reading or editing a stem file.
#[derive(Debug)]
pub enum ErrorKind {
    /// An atom's declared size extends past the bounds of its enclosing box or
    /// the end of the buffer.
    Truncated,
    /// An atom's size field is smaller than the 8 byte header and not one of
    /// the valid sentinels (0 or 1). Contains the invalid size.
    InvalidSize(u64),
    /// A required atom could not be found. Contains the atom's identifier.
    AtomNotFound(Fourcc),
    /// The requested track index exceeds the number of `trak` atoms present.
    /// Contains the requested index.
    TrackNotFound(usize),
    /// The parsed structure violates the ISO base media file format, e.g. a
    /// sample-to-chunk table whose `first_chunk` column isn't strictly
    /// increasing.
    InvalidContainer,
    /// Shifting a 32 bit chunk offset table entry would overflow.
    OffsetOverflow,
    /// A typed metadata payload (pitch curve, onset list, ...) cannot be
    /// interpreted.
    MalformedPayload,
    /// An atom has an unknown version. Contains the version.
    UnknownVersion(u8),
    /// An IO error occurred. Contains the original `io::Error`.
    Io(io::Error),
    /// A string is not valid utf-8. Contains the original error.
    Utf8StringDecoding(string::FromUtf8Error),
    /// A JSON payload could not be serialized or deserialized. Contains the
    /// original error.
    Json(serde_json::Error),
}

/// A structure able to represent any error that may occur while performing
/// container operations.
pub struct Error {
    /// The kind of error.
    pub kind: ErrorKind,
    /// A human readable string describing the error.
    pub description: String,
}

impl Error {
    /// Creates a new `Error` using the error kind and description.
    pub fn new(kind: ErrorKind, description: impl Into<String>) -> Self {
        Self { kind, description: description.into() }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match &self.kind {
            ErrorKind::Io(err) => Some(err),
            ErrorKind::Utf8StringDecoding(err) => Some(err),
            ErrorKind::Json(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Self { kind: ErrorKind::Io(err), description: String::new() }
    }
}

impl From<string::FromUtf8Error> for Error {
    fn from(err: string::FromUtf8Error) -> Self {
        Self {
            kind: ErrorKind::Utf8StringDecoding(err),
            description: "Data is not valid utf-8".to_owned(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self { kind: ErrorKind::Json(err), description: "Invalid JSON payload".to_owned() }
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.description.is_empty() {
            write!(f, "{:?}", self.kind)
        } else {
            write!(f, "{:?}: {}", self.kind, self.description)
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.description.is_empty() {
            write!(f, "{:?}", self.kind)
        } else {
            write!(f, "{:?}: {}", self.kind, self.description)
        }
    }
}

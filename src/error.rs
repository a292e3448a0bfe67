use std::error::Error as StdError;
use std::fmt;
use std::io;
use std::result;

/// A type alias for `Result<T, csv_dialect::Error>`.
pub type Result<T> = result::Result<T, Error>;

/// An error that can occur when building a format, parsing or printing CSV
/// data.
///
/// Parse errors carry the line number and character position observed by the
/// reader at the point of failure. I/O errors from the underlying source or
/// sink are propagated as the `Io` kind.
#[derive(Debug)]
pub struct Error(Box<ErrorKind>);

impl Error {
    /// A crate private constructor for `Error`.
    pub(crate) fn new(kind: ErrorKind) -> Error {
        Error(Box::new(kind))
    }

    /// Return the specific type of this error.
    pub fn kind(&self) -> &ErrorKind {
        &self.0
    }

    /// Unwrap this error into its underlying type.
    pub fn into_kind(self) -> ErrorKind {
        *self.0
    }

    /// True when this error was caused by the underlying reader or writer.
    pub fn is_io_error(&self) -> bool {
        matches!(*self.0, ErrorKind::Io(_))
    }

    pub(crate) fn config(message: impl Into<String>) -> Error {
        Error::new(ErrorKind::Config(message.into()))
    }

    pub(crate) fn header(message: impl Into<String>) -> Error {
        Error::new(ErrorKind::Header(message.into()))
    }

    pub(crate) fn parse(line: u64, position: u64, message: impl Into<String>) -> Error {
        Error::new(ErrorKind::Parse {
            line,
            position,
            message: message.into(),
        })
    }
}

/// The specific type of an error.
#[derive(Debug)]
#[non_exhaustive]
pub enum ErrorKind {
    /// An error from the underlying character source or sink.
    Io(io::Error),
    /// An invalid dialect configuration, reported when a
    /// [`FormatBuilder`](crate::FormatBuilder) is finalized.
    Config(String),
    /// A missing or duplicate header name, reported when the header is
    /// processed at parser construction.
    Header(String),
    /// Malformed input such as an unclosed quote, an escape at EOF or
    /// illegal characters after a closing quote. Fatal for the current
    /// record; the parser is left positioned just past the offending
    /// character.
    Parse {
        /// 1-based line on which the error was detected.
        line: u64,
        /// Absolute character position at the point of failure.
        position: u64,
        message: String,
    },
    /// A field was requested by column name but the format defines no
    /// header.
    NoHeader,
    /// A field was requested by a column name the header does not contain.
    UnknownColumn {
        /// The name that failed to resolve.
        name: String,
    },
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Error {
        Error::new(ErrorKind::Io(err))
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match *self.0 {
            ErrorKind::Io(ref err) => Some(err),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self.0 {
            ErrorKind::Io(ref err) => err.fmt(f),
            ErrorKind::Config(ref msg) => {
                write!(f, "invalid format: {}", msg)
            }
            ErrorKind::Header(ref msg) => {
                write!(f, "invalid header: {}", msg)
            }
            ErrorKind::Parse {
                line,
                position,
                ref message,
            } => {
                write!(
                    f,
                    "parse error at line {}, position {}: {}",
                    line, position, message
                )
            }
            ErrorKind::NoHeader => {
                write!(f, "no header mapping was specified by the format")
            }
            ErrorKind::UnknownColumn { ref name } => {
                write!(f, "header does not contain a column named {:?}", name)
            }
        }
    }
}

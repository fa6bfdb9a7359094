use std::error;
use std::fmt;
use std::io;

/// Represents errors that can occur while talking to a SCIP device.
#[derive(Debug)]
pub enum Error {
    /// An I/O error occurred while communicating with the underlying stream (e.g., serial port).
    /// The byte stream is in an unknown position afterwards; reconnect before issuing more commands.
    IoError(io::Error),

    /// The stream ended before a fixed-length frame was complete.
    ShortFrame { expected: usize, received: usize },

    /// The device answered with a non-success status code.
    /// `description` is `None` when the code is not in the status table of the command.
    StatusError {
        code: String,
        description: Option<&'static str>,
    },

    /// The operation is not valid in the current session state.
    PreconditionError { description: String },

    /// A parameter was rejected before anything was sent to the device.
    InvalidArgument { description: String },

    /// The received data is malformed in a way that is not a short read.
    ProtocolError { description: String },
}

impl Error {
    pub(crate) fn precondition(description: &str) -> Error {
        Error::PreconditionError {
            description: description.to_owned(),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::IoError(err) => write!(f, "io error: {}", err),
            Error::ShortFrame { expected, received } => write!(
                f,
                "short frame: expected {} bytes, received {}",
                expected, received
            ),
            Error::StatusError {
                code,
                description: Some(description),
            } => write!(f, "device status {}: {}", code, description),
            Error::StatusError {
                code,
                description: None,
            } => write!(f, "unknown device status {}", code),
            Error::PreconditionError { description } => {
                write!(f, "precondition failed: {}", description)
            }
            Error::InvalidArgument { description } => {
                write!(f, "invalid argument: {}", description)
            }
            Error::ProtocolError { description } => write!(f, "protocol error: {}", description),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Error::IoError(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::IoError(err)
    }
}

/// A specialized `Result` type for SCIP operations.
pub type Result<T> = std::result::Result<T, Error>;

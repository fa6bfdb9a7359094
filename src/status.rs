//! Classification of the two-character status codes the device appends to every reply.

use crate::base::{Error, Result};
use log::warn;

/// Result of classifying a status code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    /// `"00"` or `"99"`.
    Success,
    /// A code listed in the status table of the command.
    KnownError {
        code: String,
        description: &'static str,
    },
    /// Any other code.
    UnknownError { code: String },
}

impl Status {
    /// Returns `true` for `"00"` and `"99"`.
    #[inline]
    pub fn is_success(&self) -> bool {
        matches!(self, Status::Success)
    }

    /// Turns an error status into `Error::StatusError`.
    pub fn into_result(self) -> Result<()> {
        match self {
            Status::Success => Ok(()),
            Status::KnownError { code, description } => Err(Error::StatusError {
                code,
                description: Some(description),
            }),
            Status::UnknownError { code } => {
                warn!("Device reported unknown status code {:?}", code);
                Err(Error::StatusError {
                    code,
                    description: None,
                })
            }
        }
    }
}

/// Immutable mapping from error codes to human-readable reasons.
#[derive(Debug, Clone, Copy)]
pub struct StatusTable {
    entries: &'static [(&'static str, &'static str)],
}

impl StatusTable {
    /// Creates a table from `(code, description)` pairs.
    pub const fn new(entries: &'static [(&'static str, &'static str)]) -> StatusTable {
        StatusTable { entries }
    }

    /// Looks up the description of `code`.
    pub fn describe(&self, code: &str) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, d)| *d)
    }

    /// Classifies a raw two-byte status code against this table.
    pub fn classify(&self, code: &[u8]) -> Status {
        if code == b"00" || code == b"99" {
            return Status::Success;
        }
        let code = String::from_utf8_lossy(code).into_owned();
        match self.describe(&code) {
            Some(description) => Status::KnownError { code, description },
            None => Status::UnknownError { code },
        }
    }
}

/// Codes shared by measurement, laser, reset and query commands.
pub const COMMON_STATUS: StatusTable = StatusTable::new(&[
    ("01", "Starting Step has non-numeric value"),
    ("02", "End Step has non-numeric value"),
    ("03", "Cluster Count has non-numeric value"),
    ("04", "End Step is out of range"),
    ("05", "End Step is smaller than Starting Step"),
    ("06", "Scan Interval has non-numeric value"),
    ("07", "Number of Scan has non-numeric value"),
    (
        "98",
        "Resumption of process after confirming normal laser operation",
    ),
]);

/// Codes of the time adjust command.
pub const TIME_ADJUST_STATUS: StatusTable = StatusTable::new(&[
    ("01", "Invalid control code"),
    ("02", "Adjust mode on when already on"),
    ("03", "Adjust mode off when already off"),
    ("04", "Adjust mode off when time requested"),
]);

/// Codes of the bit rate command.
pub const BIT_RATE_STATUS: StatusTable = StatusTable::new(&[
    ("01", "Bit rate has non-numeric value"),
    ("02", "Invalid bit rate"),
    ("03", "Sensor is already running at defined bit rate"),
    ("04", "Not compatible with the sensor model"),
]);

/// Codes of the sensitivity command.
pub const SENSITIVITY_STATUS: StatusTable = StatusTable::new(&[
    ("01", "Parameter error"),
    ("02", "Already running in set mode"),
    ("03", "Incompatible with current sensor model"),
]);

/// Codes of the motor speed command.
pub const MOTOR_SPEED_STATUS: StatusTable = StatusTable::new(&[
    ("01", "Invalid speed ratio"),
    ("02", "Speed ratio out of range"),
    ("03", "Motor is already running at defined speed"),
    ("04", "Incompatible with current sensor model"),
]);

/// Classifies `code` against the common table.
pub fn classify(code: &[u8]) -> Status {
    COMMON_STATUS.classify(code)
}

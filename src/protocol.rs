//! Reply framing of the SCIP2.0 commands.
//!
//! Every command is answered by a fixed-length header whose size follows from
//! the command bytes: the echoed command, a two-character status code and a
//! few padding bytes. Because the caller-supplied trailing string makes the
//! echo variable, the status is located from the end of the header.

use crate::base::{Command, Error, Result};
use crate::internals::STATUS_TAIL_OFFSET;
use crate::status::{Status, StatusTable};
use log::{error, trace};

/// Length of a fixed reply header and where its status code sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderShape {
    /// Total header length in bytes.
    pub len: usize,
    /// Distance from the end of the header to the first status byte.
    pub status_offset: usize,
}

impl HeaderShape {
    fn tail(len: usize) -> HeaderShape {
        HeaderShape {
            len,
            status_offset: STATUS_TAIL_OFFSET,
        }
    }

    /// `SCIP2.0`: 8 echo bytes, status, sum, two line feeds.
    pub fn protocol_switch() -> HeaderShape {
        HeaderShape::tail(13)
    }

    /// `MD`/`MS` start.
    pub fn distance_scan(cmd: &Command) -> HeaderShape {
        HeaderShape::tail(21 + cmd.trailing_len())
    }

    /// `GD`/`GS` start.
    pub fn intensity_scan(cmd: &Command) -> HeaderShape {
        HeaderShape::tail(18 + cmd.trailing_len())
    }

    /// `BM`, `QT` and `RS`.
    pub fn switch(cmd: &Command) -> HeaderShape {
        HeaderShape::tail(cmd.trailing_len() + 8)
    }

    /// `TM`: the status closes the header; the rest depends on the control code.
    pub fn time_adjust(cmd: &Command) -> HeaderShape {
        HeaderShape {
            len: cmd.len() + 2,
            status_offset: 2,
        }
    }

    /// `SS` and `HS`.
    pub fn setting(cmd: &Command) -> HeaderShape {
        HeaderShape::tail(cmd.len() + 5)
    }

    /// `CR`.
    pub fn motor_speed(cmd: &Command) -> HeaderShape {
        HeaderShape::tail(cmd.len() + 6)
    }

    /// `PP`, `II` and `VV` prelude preceding the information lines.
    pub fn info(cmd: &Command) -> HeaderShape {
        HeaderShape {
            len: 7 + cmd.trailing_len(),
            status_offset: 4,
        }
    }

    /// Extracts the two status bytes from a header read with this shape.
    pub fn status<'a>(&self, header: &'a [u8]) -> Result<&'a [u8]> {
        if header.len() != self.len || self.status_offset < 2 || self.status_offset > self.len {
            error!(
                "Header of {} bytes does not match shape {:?}",
                header.len(),
                self
            );
            return Err(Error::ProtocolError {
                description: format!(
                    "header length {} does not match expected {}",
                    header.len(),
                    self.len
                ),
            });
        }
        let start = self.len - self.status_offset;
        Ok(&header[start..start + 2])
    }

    /// Classifies the status of `header` against `table`.
    pub fn check(&self, header: &[u8], table: &StatusTable) -> Result<()> {
        let code = self.status(header)?;
        let status = table.classify(code);
        trace!(
            "Header status {:?} -> {:?}",
            String::from_utf8_lossy(code),
            status
        );
        if let Status::KnownError { code, description } = &status {
            error!("Device rejected command: {} {}", code, description);
        }
        status.into_result()
    }
}

/// Keeps the part of an information line before the first `;`.
///
/// Returns `None` for blank separator lines.
pub fn info_field(line: &[u8]) -> Option<String> {
    if line.is_empty() {
        return None;
    }
    let field = line.split(|b| *b == b';').next().unwrap_or_default();
    Some(String::from_utf8_lossy(field).into_owned())
}

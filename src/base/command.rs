use crate::codec::encode_decimal;
use crate::internals::{MAX_TRAILING_LEN, TERMINATOR};

/// One parameter of a command, in wire order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Field<'a> {
    /// Zero-padded decimal number of a fixed width.
    Decimal { value: u32, width: usize },
    /// Raw bytes copied verbatim.
    Literal(&'a [u8]),
}

/// An encoded request: tag, parameters, trailing string and line feed.
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    bytes: Vec<u8>,
    trailing_len: usize,
}

impl Command {
    /// Creates a command without parameters.
    ///
    /// # Arguments
    ///
    /// * `tag` - The one to three byte operation tag.
    /// * `trailing` - Free-form string echoed back by the device.
    pub fn new(tag: &[u8], trailing: &str) -> Command {
        Command::with_fields(tag, &[], trailing)
    }

    /// Creates a command with parameters.
    ///
    /// `trailing` is cut to 16 bytes without notice.
    pub fn with_fields(tag: &[u8], fields: &[Field], trailing: &str) -> Command {
        let trailing = &trailing.as_bytes()[..trailing.len().min(MAX_TRAILING_LEN)];

        let mut bytes = Vec::with_capacity(tag.len() + 16 + trailing.len() + 1);
        bytes.extend_from_slice(tag);
        for field in fields {
            match *field {
                Field::Decimal { value, width } => {
                    bytes.extend_from_slice(encode_decimal(value, width).as_bytes())
                }
                Field::Literal(raw) => bytes.extend_from_slice(raw),
            }
        }
        bytes.extend_from_slice(trailing);
        bytes.push(TERMINATOR);

        Command {
            bytes,
            trailing_len: trailing.len(),
        }
    }

    /// The full wire form, terminator included.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Length of the wire form, terminator included.
    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Always `false`; every command carries at least its terminator.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Length of the trailing string after truncation.
    #[inline]
    pub fn trailing_len(&self) -> usize {
        self.trailing_len
    }
}

/// Builds a command from a tag, ordered fields and a trailing string.
pub fn build_command(tag: &[u8], fields: &[Field], trailing: &str) -> Command {
    Command::with_fields(tag, fields, trailing)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_command_layout() {
        let cmd = build_command(
            b"MD",
            &[
                Field::Decimal { value: 44, width: 4 },
                Field::Decimal { value: 725, width: 4 },
                Field::Decimal { value: 1, width: 2 },
                Field::Decimal { value: 0, width: 1 },
                Field::Decimal { value: 1, width: 2 },
            ],
            "",
        );
        assert_eq!(cmd.as_bytes(), b"MD0044072501001\n");
        assert_eq!(cmd.len(), 16);
        assert_eq!(cmd.trailing_len(), 0);
    }

    #[test]
    fn trailing_is_truncated() {
        let cmd = Command::new(b"BM", "0123456789abcdefXYZ");
        assert_eq!(cmd.as_bytes(), b"BM0123456789abcdef\n");
        assert_eq!(cmd.trailing_len(), 16);
    }

    #[test]
    fn literal_fields_are_verbatim() {
        let cmd = build_command(b"SS", &[Field::Literal(b"115200")], "x");
        assert_eq!(cmd.as_bytes(), b"SS115200x\n");
    }
}

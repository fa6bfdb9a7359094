/// Line feed terminating commands and response lines.
pub const TERMINATOR: u8 = 0x0a;

/// Longest trailing string a command may carry.
pub const MAX_TRAILING_LEN: usize = 16;

/// Default capacity of the channel read buffer.
pub const DEFAULT_READ_BUFFER_SIZE: usize = 1024;

/// Longest informational line accepted before giving up on a terminator.
pub const MAX_LINE_LEN: usize = 4096;

/// Payload bytes in one full scan chunk.
pub const CHUNK_PAYLOAD_LEN: usize = 64;

/// Bytes following each chunk payload (sum character and line feed).
pub const CHUNK_TERMINATOR_LEN: usize = 2;

/// Position of the remaining-data marker inside a chunk.
pub const CHUNK_MARKER_RANGE: std::ops::Range<usize> = 13..15;

/// Marker value of the last full chunk.
pub const CHUNK_LAST_MARKER: &[u8] = b"00";

/// Status bytes of a measurement reply (status, sum character, line feed).
pub const SCAN_STATUS_LEN: usize = 4;

/// Timestamp bytes of a measurement reply (4 packed bytes, sum character, line feed).
pub const SCAN_TIMESTAMP_LEN: usize = 6;

/// Packed bytes of a timestamp.
pub const TIMESTAMP_WIDTH: usize = 4;

/// Reply length of the legacy version command.
pub const LEGACY_VERSION_LEN: usize = 7 * 65;

/// Distance from the end of most fixed headers to the status code.
pub const STATUS_TAIL_OFFSET: usize = 5;

/// Lines sent by the parameter query.
pub const PARAMETER_LINES: usize = 6;

/// Lines sent by the state query.
pub const STATE_INFO_LINES: usize = 7;

/// Lines sent by the version detail query.
pub const VERSION_LINES: usize = 5;

/// Bytes following the time adjust header when a time is requested.
pub const TIME_REPLY_LEN: usize = 9;

/// Bytes following the time adjust header otherwise.
pub const TIME_ACK_LEN: usize = 3;

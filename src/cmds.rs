// Protocol switching and identification

/// Switches a SCIP1.1 device to SCIP2.0. Sent without trailing string.
pub const SCIP_CMD_PROTOCOL_SWITCH: &[u8] = b"SCIP2.0";

/// SCIP1.1 version command.
pub const SCIP_CMD_LEGACY_VERSION: &[u8] = b"V";

// Measurement

/// Distance scan over a step range, continuous or a fixed number of scans.
/// Followed by the encoding byte (`D` or `S`).
pub const SCIP_CMD_DISTANCE_SCAN: u8 = b'M';

/// Latest scan with intensities. Followed by the encoding byte (`D` or `S`).
pub const SCIP_CMD_INTENSITY_SCAN: u8 = b'G';

// Sensor state

/// Switches the laser on.
pub const SCIP_CMD_LASER_ON: &[u8] = b"BM";

/// Switches the laser off.
pub const SCIP_CMD_LASER_OFF: &[u8] = b"QT";

/// Reverts every setting changed since power on.
pub const SCIP_CMD_RESET: &[u8] = b"RS";

/// Time adjust. Followed by a `TimeControl` code.
pub const SCIP_CMD_TIME_ADJUST: &[u8] = b"TM";

/// Changes the serial bit rate. Followed by a 6 character rate such as `115200`.
pub const SCIP_CMD_BIT_RATE: &[u8] = b"SS";

/// Switches between normal and high sensitivity. Followed by `0` or `1`.
pub const SCIP_CMD_SENSITIVITY: &[u8] = b"HS";

/// Adjusts the motor speed. Followed by a 2 digit speed ratio.
pub const SCIP_CMD_MOTOR_SPEED: &[u8] = b"CR";

// Informational queries

/// Sensor specifications.
pub const SCIP_CMD_PARAMETERS: &[u8] = b"PP";

/// Sensor running state.
pub const SCIP_CMD_STATE_INFO: &[u8] = b"II";

/// Vendor, product, firmware, protocol and serial number.
pub const SCIP_CMD_VERSION: &[u8] = b"VV";

/// Width of the bit rate literal of `SCIP_CMD_BIT_RATE`.
pub const SCIP_BIT_RATE_LEN: usize = 6;

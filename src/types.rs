use crate::codec::decode_packed;

/// Number of bytes used to pack one measured value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// Two characters per value, 12-bit range.
    Two,
    /// Three characters per value, 18-bit range.
    Three,
}

impl Encoding {
    /// Bytes occupied by one sample on the wire.
    #[inline]
    pub fn bytes_per_sample(self) -> usize {
        match self {
            Encoding::Two => 2,
            Encoding::Three => 3,
        }
    }

    /// Second byte of a measurement command tag.
    #[inline]
    pub(crate) fn tag_byte(self) -> u8 {
        match self {
            Encoding::Two => b'S',
            Encoding::Three => b'D',
        }
    }

    /// Decodes one sample group. `group` must be `bytes_per_sample()` long.
    #[inline]
    pub fn decode(self, group: &[u8]) -> u32 {
        debug_assert_eq!(group.len(), self.bytes_per_sample());
        decode_packed(group)
    }
}

/// Command language the device currently speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolMode {
    /// SCIP1.1, which only answers the version command.
    Legacy,
    /// SCIP2.0.
    Current,
}

/// How `ScipDevice::connect` treats the protocol of the device.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectOptions {
    /// Protocol the device runs after power on.
    pub boot_protocol: ProtocolMode,
    /// Switch a legacy device to SCIP2.0 while connecting.
    pub normalize: bool,
}

impl Default for ConnectOptions {
    fn default() -> ConnectOptions {
        ConnectOptions {
            boot_protocol: ProtocolMode::Current,
            normalize: true,
        }
    }
}

/// Parameters of a measurement command.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanOptions {
    /// Width of each packed value.
    pub encoding: Encoding,
    /// First step to measure.
    pub start_step: u32,
    /// Last step to measure, inclusive.
    pub end_step: u32,
    /// Adjacent steps merged into one sample. 0 behaves as 1.
    pub cluster_count: u32,
    /// Revolutions skipped between two reported scans (distance scans only).
    pub scan_interval: u32,
    /// Scans to report, 0 for unlimited (distance scans only).
    pub scan_count: u32,
}

impl ScanOptions {
    /// Options covering `start_step..=end_step` with default encoding and clustering.
    pub fn with_range(start_step: u32, end_step: u32) -> ScanOptions {
        ScanOptions {
            start_step,
            end_step,
            ..ScanOptions::default()
        }
    }
}

impl Default for ScanOptions {
    /// Full measurement area of the URG-04LX, three character encoding, continuous.
    fn default() -> ScanOptions {
        ScanOptions {
            encoding: Encoding::Three,
            start_step: crate::utils::AMIN,
            end_step: crate::utils::AMAX,
            cluster_count: 1,
            scan_interval: 0,
            scan_count: 0,
        }
    }
}

/// Which measurement command produced the active scan configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanKind {
    /// `MD`/`MS`: distances only.
    Distance,
    /// `GD`/`GS`: alternating distance and intensity values.
    DistanceIntensity,
}

/// Scan parameters accepted by the device, kept until reset or disconnect.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanConfig {
    pub kind: ScanKind,
    pub encoding: Encoding,
    pub start_step: u32,
    pub end_step: u32,
    pub cluster_count: u32,
    pub scan_interval: u32,
    /// Length of the reply header of the starting command.
    pub header_len: usize,
    /// Tag of the starting command.
    pub tag: [u8; 2],
}

impl ScanConfig {
    /// Echo bytes preceding the status of every measurement reply.
    pub fn echo_len(&self) -> usize {
        match self.kind {
            ScanKind::Distance => self.header_len.saturating_sub(5),
            ScanKind::DistanceIntensity => self.header_len.saturating_sub(10),
        }
    }

    /// Samples covered by the step range after clustering.
    pub fn sample_count(&self) -> usize {
        usize::try_from(self.clustered_steps()).unwrap_or(usize::MAX)
    }

    /// Parameters are taken as given, wider than their wire fields included.
    fn clustered_steps(&self) -> u64 {
        if self.end_step < self.start_step {
            return 0;
        }
        let steps = u64::from(self.end_step - self.start_step) + 1;
        steps.div_ceil(u64::from(self.cluster_count.max(1)))
    }

    /// Length of the partial final chunk, if the step range implies one.
    ///
    /// Only distance scans compute it; intensity scans end on the chunk marker alone.
    pub fn trailing_chunk_len(&self) -> Option<usize> {
        match self.kind {
            ScanKind::Distance => {
                let payload = self.clustered_steps() * self.encoding.bytes_per_sample() as u64;
                match payload % crate::internals::CHUNK_PAYLOAD_LEN as u64 {
                    0 => None,
                    rest => Some(rest as usize),
                }
            }
            ScanKind::DistanceIntensity => None,
        }
    }
}

/// One decoded scan.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Scan {
    /// Device time of the scan in milliseconds.
    pub timestamp: u32,
    /// Distances in millimeters, in step order.
    pub distances: Vec<u32>,
    /// Intensities in step order; empty for distance scans.
    pub intensities: Vec<u32>,
}

/// Control code of the time adjust command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeControl {
    /// Enter adjust mode.
    AdjustOn,
    /// Request the device time (adjust mode only).
    Request,
    /// Leave adjust mode.
    AdjustOff,
}

impl TimeControl {
    pub(crate) fn code(self) -> u8 {
        match self {
            TimeControl::AdjustOn => b'0',
            TimeControl::Request => b'1',
            TimeControl::AdjustOff => b'2',
        }
    }
}

/// Detection sensitivity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sensitivity {
    Normal,
    /// About 20% more range, at the cost of errors near strong reflectors.
    High,
}

impl Sensitivity {
    pub(crate) fn code(self) -> u8 {
        match self {
            Sensitivity::Normal => b'0',
            Sensitivity::High => b'1',
        }
    }
}

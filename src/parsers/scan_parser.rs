use crate::base::{Channel, Result};
use crate::codec::decode_packed;
use crate::internals::*;
use crate::status::classify;
use crate::types::{Encoding, Scan, ScanConfig, ScanKind};
use log::{error, trace, warn};
use std::io::{Read, Write};

#[derive(Debug, Clone, Copy, PartialEq)]
enum ScanStage {
    AwaitEcho,
    AwaitStatus,
    AwaitTimestamp,
    AwaitPayload,
    Done,
}

/// Reads one measurement reply: echo, status, timestamp, then the chunked payload.
#[derive(Debug)]
pub struct ScanParser<'a> {
    config: &'a ScanConfig,
    stage: ScanStage,
    timestamp: u32,
    payload: Vec<u8>,
}

impl<'a> ScanParser<'a> {
    pub fn new(config: &'a ScanConfig) -> ScanParser<'a> {
        ScanParser {
            config,
            stage: ScanStage::AwaitEcho,
            timestamp: 0,
            payload: Vec::new(),
        }
    }

    fn advance(&mut self, stage: ScanStage) {
        trace!("Scan parser {:?} -> {:?}", self.stage, stage);
        self.stage = stage;
    }

    /// Runs the reply through every stage. Any failure aborts without a partial scan.
    pub fn parse<T>(mut self, channel: &mut Channel<T>) -> Result<Scan>
    where
        T: Read + Write + ?Sized,
    {
        loop {
            match self.stage {
                ScanStage::AwaitEcho => {
                    let echo = channel.read_fixed(self.config.echo_len())?;
                    trace!("Scan echo: {:?}", String::from_utf8_lossy(&echo));
                    self.advance(ScanStage::AwaitStatus);
                }
                ScanStage::AwaitStatus => {
                    let status = channel.read_fixed(SCAN_STATUS_LEN)?;
                    classify(&status[0..2]).into_result().map_err(|e| {
                        error!("Scan reply status error: {}", e);
                        e
                    })?;
                    self.advance(ScanStage::AwaitTimestamp);
                }
                ScanStage::AwaitTimestamp => {
                    let encoded = channel.read_fixed(SCAN_TIMESTAMP_LEN)?;
                    self.timestamp = decode_packed(&encoded[0..TIMESTAMP_WIDTH]);
                    trace!("Scan timestamp: {}", self.timestamp);
                    self.advance(ScanStage::AwaitPayload);
                }
                ScanStage::AwaitPayload => {
                    self.payload = read_payload(channel, self.config.trailing_chunk_len())?;
                    self.advance(ScanStage::Done);
                }
                ScanStage::Done => break,
            }
        }

        let (distances, intensities) =
            split_samples(&self.payload, self.config.encoding, self.config.kind);
        Ok(Scan {
            timestamp: self.timestamp,
            distances,
            intensities,
        })
    }
}

/// Collects chunk payloads until the end marker, plus the partial chunk when one is expected.
///
/// Consumes the line feed closing the reply.
pub fn read_payload<T>(channel: &mut Channel<T>, trailing_chunk: Option<usize>) -> Result<Vec<u8>>
where
    T: Read + Write + ?Sized,
{
    let mut payload = Vec::new();
    loop {
        let chunk = channel.read_fixed(CHUNK_PAYLOAD_LEN + CHUNK_TERMINATOR_LEN)?;
        payload.extend_from_slice(&chunk[..CHUNK_PAYLOAD_LEN]);
        if &chunk[CHUNK_MARKER_RANGE] == CHUNK_LAST_MARKER {
            trace!("Last full chunk received, payload {} bytes", payload.len());
            break;
        }
    }

    if let Some(rest) = trailing_chunk {
        trace!("Reading partial chunk of {} bytes", rest);
        let chunk = channel.read_fixed(rest + CHUNK_TERMINATOR_LEN)?;
        payload.extend_from_slice(&chunk[..rest]);
    }

    channel.read_fixed(1)?;
    Ok(payload)
}

/// Decodes the payload into distances and, for intensity scans, intensities.
pub fn split_samples(payload: &[u8], encoding: Encoding, kind: ScanKind) -> (Vec<u32>, Vec<u32>) {
    let width = encoding.bytes_per_sample();
    if payload.len() % width != 0 {
        warn!(
            "Payload of {} bytes is not a multiple of {}, ignoring the last {} bytes",
            payload.len(),
            width,
            payload.len() % width
        );
    }

    let values = payload.chunks_exact(width).map(|group| encoding.decode(group));
    match kind {
        ScanKind::Distance => (values.collect(), Vec::new()),
        ScanKind::DistanceIntensity => {
            let mut distances = Vec::with_capacity(payload.len() / width / 2 + 1);
            let mut intensities = Vec::with_capacity(payload.len() / width / 2);
            for (i, value) in values.enumerate() {
                if i % 2 == 0 {
                    distances.push(value);
                } else {
                    intensities.push(value);
                }
            }
            (distances, intensities)
        }
    }
}

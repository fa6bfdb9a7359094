//! # SCIP Driver
//!
//! `scip` talks the SCIP2.0 command language of scanning laser rangefinders
//! (Hokuyo URG series and compatibles) over any byte stream, typically a
//! serial port or USB CDC device. It configures the sensor, starts distance
//! or distance+intensity scans and reassembles the chunked scan replies into
//! decoded samples.
//!
//! One `ScipDevice` owns one stream. The protocol has no framing recovery:
//! every command must be answered in full before the next one is issued, so a
//! device must not be shared between threads without external locking.

extern crate log;

pub mod base;
mod cmds;
pub mod codec;
mod internals;
mod parsers;
mod protocol;
#[cfg(feature = "serial")]
pub mod serial;
pub mod status;
pub mod types;
pub mod utils;

#[cfg(test)]
mod tests;

pub use crate::base::{build_command, Channel, Command, Error, Field, Result};
pub use crate::codec::{decode_packed, encode_decimal};
pub use crate::protocol::HeaderShape;
pub use crate::status::{classify, Status, StatusTable};
pub use crate::types::{
    ConnectOptions, Encoding, ProtocolMode, Scan, ScanConfig, ScanKind, ScanOptions,
    Sensitivity, TimeControl,
};
pub use crate::utils::Point;

use crate::cmds::*;
use crate::internals::*;
use crate::parsers::scan_parser::ScanParser;
use crate::protocol::info_field;
use crate::status::{
    BIT_RATE_STATUS, COMMON_STATUS, MOTOR_SPEED_STATUS, SENSITIVITY_STATUS, TIME_ADJUST_STATUS,
};
use log::{error, trace, warn};
use std::io::{Read, Write};

/// A protocol session with one SCIP device.
///
/// The session starts disconnected. `connect` attaches a stream, the
/// measurement commands record the active scan configuration that
/// `fetch_scan` needs, and `reset` or `disconnect` drop it again.
#[derive(Debug)]
pub struct ScipDevice<T: ?Sized> {
    channel: Option<Channel<T>>,
    protocol_mode: ProtocolMode,
    laser_on: bool,
    scan_config: Option<ScanConfig>,
}

impl<T: ?Sized> Default for ScipDevice<T>
where
    T: Read + Write,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> ScipDevice<T>
where
    T: Read + Write,
{
    /// Constructs a disconnected `ScipDevice`.
    pub fn new() -> ScipDevice<T> {
        ScipDevice {
            channel: None,
            protocol_mode: ProtocolMode::Current,
            laser_on: false,
            scan_config: None,
        }
    }

    /// Constructs a `ScipDevice` connected to `stream` with default options.
    ///
    /// # Example
    /// ```ignore
    /// let port = serialport::new("/dev/ttyACM0", 115200).open()?;
    /// let mut lidar = ScipDevice::with_stream(port)?;
    /// lidar.laser_on("")?;
    /// ```
    pub fn with_stream(stream: Box<T>) -> Result<ScipDevice<T>> {
        let mut device = ScipDevice::new();
        device.connect(stream, &ConnectOptions::default())?;
        Ok(device)
    }

    /// Attaches an opened stream.
    ///
    /// A legacy device is switched to SCIP2.0 when `options.normalize` is set.
    /// If that switch fails the stream is dropped and the session stays disconnected.
    pub fn connect(&mut self, stream: Box<T>, options: &ConnectOptions) -> Result<()> {
        if self.channel.is_some() {
            error!("connect called on a connected device");
            return Err(Error::precondition("device is already connected"));
        }
        trace!("Connecting with options {:?}", options);
        self.channel = Some(Channel::new(stream));
        self.protocol_mode = options.boot_protocol;
        self.laser_on = false;
        self.scan_config = None;

        if options.boot_protocol == ProtocolMode::Legacy && options.normalize {
            if let Err(e) = self.normalize_protocol() {
                error!("Protocol switch failed while connecting: {}", e);
                self.channel = None;
                return Err(e);
            }
        }
        Ok(())
    }

    /// Detaches the stream and hands it back for closing. All session state is cleared.
    pub fn disconnect(&mut self) -> Result<Box<T>> {
        let mut channel = self
            .channel
            .take()
            .ok_or_else(|| Error::precondition("device is not connected"))?;
        trace!("Disconnecting");
        channel.reset();
        self.protocol_mode = ProtocolMode::Current;
        self.laser_on = false;
        self.scan_config = None;
        Ok(channel.into_inner())
    }

    /// Returns `true` while a stream is attached.
    pub fn is_connected(&self) -> bool {
        self.channel.is_some()
    }

    /// Protocol the device is believed to speak.
    pub fn protocol_mode(&self) -> ProtocolMode {
        self.protocol_mode
    }

    /// Returns `true` after a successful `laser_on` until `laser_off` or `reset`.
    pub fn is_laser_on(&self) -> bool {
        self.laser_on
    }

    /// The configuration recorded by the last successful measurement command.
    pub fn scan_config(&self) -> Option<&ScanConfig> {
        self.scan_config.as_ref()
    }

    fn channel(&mut self) -> Result<&mut Channel<T>> {
        self.channel
            .as_mut()
            .ok_or_else(|| Error::precondition("device is not connected"))
    }

    /// Writes `cmd`, reads its fixed header and checks the status against `table`.
    fn invoke(
        &mut self,
        cmd: &Command,
        shape: HeaderShape,
        table: &StatusTable,
    ) -> Result<Vec<u8>> {
        let channel = self.channel()?;
        channel.write(cmd)?;
        let header = channel.read_fixed(shape.len)?;
        trace!(
            "Header ({} bytes): {:?}",
            header.len(),
            String::from_utf8_lossy(&header)
        );
        shape.check(&header, table)?;
        Ok(header)
    }

    /// Switches a SCIP1.1 device to SCIP2.0.
    pub fn normalize_protocol(&mut self) -> Result<()> {
        trace!("Switching device to SCIP2.0");
        let cmd = Command::new(SCIP_CMD_PROTOCOL_SWITCH, "");
        self.invoke(&cmd, HeaderShape::protocol_switch(), &COMMON_STATUS)?;
        self.protocol_mode = ProtocolMode::Current;
        Ok(())
    }

    /// Gets the firmware and version text of the device.
    ///
    /// In legacy mode this is the raw reply of the version command; otherwise the
    /// version detail lines joined by line feeds.
    pub fn version(&mut self) -> Result<String> {
        match self.protocol_mode {
            ProtocolMode::Legacy => {
                trace!("Requesting legacy version block");
                let channel = self.channel()?;
                channel.write(&Command::new(SCIP_CMD_LEGACY_VERSION, ""))?;
                let block = channel.read_fixed(LEGACY_VERSION_LEN)?;
                let text = String::from_utf8_lossy(&block);
                Ok(text.trim_end_matches(&['\n', '\0'][..]).to_owned())
            }
            ProtocolMode::Current => Ok(self.version_details("")?.join("\n")),
        }
    }

    /// Starts a distance scan (`MD`/`MS`) over `options.start_step..=options.end_step`.
    ///
    /// `options.scan_count` scans are reported, every `options.scan_interval + 1`
    /// revolutions; 0 scans means until the laser is switched off. Numbers wider
    /// than their field are cut to their leading digits.
    pub fn start_distance_scan(&mut self, options: &ScanOptions, trailing: &str) -> Result<()> {
        trace!("Starting distance scan: {:?}", options);
        let tag = [SCIP_CMD_DISTANCE_SCAN, options.encoding.tag_byte()];
        let cmd = Command::with_fields(
            &tag,
            &[
                Field::Decimal {
                    value: options.start_step,
                    width: 4,
                },
                Field::Decimal {
                    value: options.end_step,
                    width: 4,
                },
                Field::Decimal {
                    value: options.cluster_count,
                    width: 2,
                },
                Field::Decimal {
                    value: options.scan_interval,
                    width: 1,
                },
                Field::Decimal {
                    value: options.scan_count,
                    width: 2,
                },
            ],
            trailing,
        );
        let shape = HeaderShape::distance_scan(&cmd);
        self.invoke(&cmd, shape, &COMMON_STATUS)?;

        self.scan_config = Some(ScanConfig {
            kind: ScanKind::Distance,
            encoding: options.encoding,
            start_step: options.start_step,
            end_step: options.end_step,
            cluster_count: options.cluster_count,
            scan_interval: options.scan_interval,
            header_len: shape.len,
            tag,
        });
        trace!("Scan configured: {:?}", self.scan_config);
        Ok(())
    }

    /// Requests the latest scan with intensities (`GD`/`GS`).
    ///
    /// Scan interval and count do not apply; the recorded interval is 0.
    pub fn start_intensity_scan(&mut self, options: &ScanOptions, trailing: &str) -> Result<()> {
        trace!("Starting intensity scan: {:?}", options);
        let tag = [SCIP_CMD_INTENSITY_SCAN, options.encoding.tag_byte()];
        let cmd = Command::with_fields(
            &tag,
            &[
                Field::Decimal {
                    value: options.start_step,
                    width: 4,
                },
                Field::Decimal {
                    value: options.end_step,
                    width: 4,
                },
                Field::Decimal {
                    value: options.cluster_count,
                    width: 2,
                },
            ],
            trailing,
        );
        let shape = HeaderShape::intensity_scan(&cmd);
        self.invoke(&cmd, shape, &COMMON_STATUS)?;

        self.scan_config = Some(ScanConfig {
            kind: ScanKind::DistanceIntensity,
            encoding: options.encoding,
            start_step: options.start_step,
            end_step: options.end_step,
            cluster_count: options.cluster_count,
            scan_interval: 0,
            header_len: shape.len,
            tag,
        });
        trace!("Scan configured: {:?}", self.scan_config);
        Ok(())
    }

    /// Reads one scan of the active configuration.
    ///
    /// Repeatable for continuous distance scans. Fails with `PreconditionError`,
    /// without touching the stream, when no measurement command succeeded yet.
    pub fn fetch_scan(&mut self) -> Result<Scan> {
        let channel = self
            .channel
            .as_mut()
            .ok_or_else(|| Error::precondition("device is not connected"))?;
        let config = self.scan_config.as_ref().ok_or_else(|| {
            error!("fetch_scan called before a scan was started");
            Error::precondition("no scan has been started")
        })?;

        trace!("Fetching scan for {:?}", config);
        let scan = ScanParser::new(config).parse(channel)?;
        trace!(
            "Scan at {}: {} distances, {} intensities",
            scan.timestamp,
            scan.distances.len(),
            scan.intensities.len()
        );
        if config.kind == ScanKind::Distance && scan.distances.len() != config.sample_count() {
            warn!(
                "Scan has {} distances, step range implies {}",
                scan.distances.len(),
                config.sample_count()
            );
        }
        Ok(scan)
    }

    /// Switches the laser on, which measurement requires.
    pub fn laser_on(&mut self, trailing: &str) -> Result<()> {
        trace!("Switching laser on");
        let cmd = Command::new(SCIP_CMD_LASER_ON, trailing);
        self.invoke(&cmd, HeaderShape::switch(&cmd), &COMMON_STATUS)?;
        self.laser_on = true;
        Ok(())
    }

    /// Switches the laser off, ending any running measurement.
    pub fn laser_off(&mut self, trailing: &str) -> Result<()> {
        trace!("Switching laser off");
        let cmd = Command::new(SCIP_CMD_LASER_OFF, trailing);
        self.invoke(&cmd, HeaderShape::switch(&cmd), &COMMON_STATUS)?;
        self.laser_on = false;
        Ok(())
    }

    /// Reverts laser, motor speed, bit rate and internal timer to their power-on state.
    pub fn reset(&mut self, trailing: &str) -> Result<()> {
        trace!("Resetting device settings");
        let cmd = Command::new(SCIP_CMD_RESET, trailing);
        self.invoke(&cmd, HeaderShape::switch(&cmd), &COMMON_STATUS)?;
        self.laser_on = false;
        self.scan_config = None;
        Ok(())
    }

    /// Sends a time adjust command.
    ///
    /// Returns the device time for `TimeControl::Request`, `None` otherwise.
    /// While adjust mode is on the device refuses every other command.
    pub fn time_sync(&mut self, control: TimeControl, trailing: &str) -> Result<Option<u32>> {
        trace!("Time adjust: {:?}", control);
        let code = [control.code()];
        let cmd = Command::with_fields(SCIP_CMD_TIME_ADJUST, &[Field::Literal(&code)], trailing);
        self.invoke(&cmd, HeaderShape::time_adjust(&cmd), &TIME_ADJUST_STATUS)?;

        let channel = self.channel()?;
        match control {
            TimeControl::Request => {
                let reply = channel.read_fixed(TIME_REPLY_LEN)?;
                let time = codec::decode_packed(&reply[2..2 + TIMESTAMP_WIDTH]);
                trace!("Device time: {}", time);
                Ok(Some(time))
            }
            TimeControl::AdjustOn | TimeControl::AdjustOff => {
                channel.read_fixed(TIME_ACK_LEN)?;
                Ok(None)
            }
        }
    }

    /// Changes the serial bit rate. `bit_rate` is a 6 character literal such as `"115200"`.
    pub fn set_bit_rate(&mut self, bit_rate: &str, trailing: &str) -> Result<()> {
        if bit_rate.len() != SCIP_BIT_RATE_LEN {
            error!("Bit rate {:?} is not {} characters", bit_rate, SCIP_BIT_RATE_LEN);
            return Err(Error::InvalidArgument {
                description: format!(
                    "bit rate must be {} characters, got {:?}",
                    SCIP_BIT_RATE_LEN, bit_rate
                ),
            });
        }
        trace!("Setting bit rate {}", bit_rate);
        let cmd = Command::with_fields(
            SCIP_CMD_BIT_RATE,
            &[Field::Literal(bit_rate.as_bytes())],
            trailing,
        );
        self.invoke(&cmd, HeaderShape::setting(&cmd), &BIT_RATE_STATUS)?;
        Ok(())
    }

    /// Switches between normal and high sensitivity.
    pub fn set_sensitivity(&mut self, sensitivity: Sensitivity, trailing: &str) -> Result<()> {
        trace!("Setting sensitivity {:?}", sensitivity);
        let code = [sensitivity.code()];
        let cmd = Command::with_fields(SCIP_CMD_SENSITIVITY, &[Field::Literal(&code)], trailing);
        self.invoke(&cmd, HeaderShape::setting(&cmd), &SENSITIVITY_STATUS)?;
        Ok(())
    }

    /// Adjusts the motor speed by a two digit ratio.
    pub fn set_motor_speed(&mut self, ratio: u32, trailing: &str) -> Result<()> {
        trace!("Setting motor speed ratio {}", ratio);
        let cmd = Command::with_fields(
            SCIP_CMD_MOTOR_SPEED,
            &[Field::Decimal {
                value: ratio,
                width: 2,
            }],
            trailing,
        );
        self.invoke(&cmd, HeaderShape::motor_speed(&cmd), &MOTOR_SPEED_STATUS)?;
        Ok(())
    }

    /// Gets the sensor specifications (`PP`).
    pub fn parameters(&mut self, trailing: &str) -> Result<Vec<String>> {
        self.query_info(SCIP_CMD_PARAMETERS, PARAMETER_LINES, trailing)
    }

    /// Gets the running state of the sensor (`II`).
    pub fn state_info(&mut self, trailing: &str) -> Result<Vec<String>> {
        self.query_info(SCIP_CMD_STATE_INFO, STATE_INFO_LINES, trailing)
    }

    /// Gets vendor, product, firmware, protocol and serial number (`VV`).
    pub fn version_details(&mut self, trailing: &str) -> Result<Vec<String>> {
        self.query_info(SCIP_CMD_VERSION, VERSION_LINES, trailing)
    }

    fn query_info(&mut self, tag: &[u8], lines: usize, trailing: &str) -> Result<Vec<String>> {
        trace!("Querying {} ({} lines)", String::from_utf8_lossy(tag), lines);
        let cmd = Command::new(tag, trailing);
        self.invoke(&cmd, HeaderShape::info(&cmd), &COMMON_STATUS)?;

        let channel = self.channel()?;
        let mut fields = Vec::with_capacity(lines);
        for _ in 0..lines {
            let line = channel.read_line()?;
            if let Some(field) = info_field(&line) {
                fields.push(field);
            }
        }
        trace!("Info fields: {:?}", fields);
        Ok(fields)
    }

    /// Angle between two samples of the active configuration, in degrees.
    pub fn angular_step(&self) -> Result<f64> {
        let config = self
            .scan_config
            .as_ref()
            .ok_or_else(|| Error::precondition("no scan has been started"))?;
        Ok(utils::angular_step(config.cluster_count, config.scan_interval))
    }

    /// Converts the distances of a full-range scan of the active configuration to points.
    pub fn to_cartesian(&self, distances: &[u32]) -> Result<Vec<Point>> {
        let step = self.angular_step()?;
        Ok(utils::to_cartesian(
            distances,
            step,
            utils::default_angle_min(),
        ))
    }
}

//! Serial port transport, enabled with the `serial` feature.

use crate::base::{Error, Result};
use crate::types::ConnectOptions;
use crate::ScipDevice;
use log::{error, trace};
use std::io;
use std::time::Duration;

pub use serialport::SerialPort;

/// Default read timeout; a frame still incomplete after it fails as a short frame.
pub const DEFAULT_SERIAL_TIMEOUT: Duration = Duration::from_secs(1);

/// Opens `path` as a raw 8N1 serial port.
pub fn open(path: &str, baud_rate: u32, timeout: Duration) -> Result<Box<dyn SerialPort>> {
    trace!("Opening serial port {} at {} bit/s", path, baud_rate);
    serialport::new(path, baud_rate)
        .timeout(timeout)
        .open()
        .map_err(|err| {
            error!("Failed to open serial port {}: {}", path, err);
            Error::IoError(io::Error::from(err))
        })
}

impl ScipDevice<dyn SerialPort> {
    /// Opens a serial port and connects to the device behind it.
    ///
    /// # Example
    /// ```ignore
    /// let mut lidar = ScipDevice::open_serial("/dev/ttyACM0", 115200, &ConnectOptions::default())?;
    /// lidar.laser_on("")?;
    /// ```
    pub fn open_serial(
        path: &str,
        baud_rate: u32,
        options: &ConnectOptions,
    ) -> Result<ScipDevice<dyn SerialPort>> {
        let port = open(path, baud_rate, DEFAULT_SERIAL_TIMEOUT)?;
        let mut device = ScipDevice::new();
        device.connect(port, options)?;
        Ok(device)
    }
}

use crate::base::command::Command;
use crate::base::error::{Error, Result};
use crate::base::ring_byte_buffer::RingByteBuffer;
use crate::internals::{DEFAULT_READ_BUFFER_SIZE, MAX_LINE_LEN, TERMINATOR};
use log::{error, trace};
use std::io;

/// Channel writes commands to a stream and reads fixed-length frames and lines back.
///
/// Every read blocks until the requested bytes arrived. A stream that reports
/// end of data (or a read timeout) before that yields `Error::ShortFrame`.
///
/// # Examples
/// ```ignore
/// let mut channel = Channel::new(serial_port);
/// channel.write(&Command::new(b"BM", ""))?;
/// let header = channel.read_fixed(8)?;
/// ```
#[derive(Debug)]
pub struct Channel<T: ?Sized> {
    stream: Box<T>,
    read_buffer: RingByteBuffer,
}

impl<T: ?Sized> Channel<T>
where
    T: io::Read + io::Write,
{
    /// Create a new `Channel` with the default read buffer
    pub fn new(stream: Box<T>) -> Channel<T> {
        Channel::with_read_buffer_size(stream, DEFAULT_READ_BUFFER_SIZE)
    }

    /// Create a new `Channel` with non-default read buffer capacity
    pub fn with_read_buffer_size(stream: Box<T>, read_buffer_size: usize) -> Channel<T> {
        trace!("Creating new Channel with buffer size {}", read_buffer_size);
        Channel {
            stream,
            read_buffer: RingByteBuffer::with_capacity(read_buffer_size),
        }
    }

    /// Drop any buffered but unread bytes
    pub fn reset(&mut self) {
        trace!(
            "Resetting Channel, discarding {} buffered bytes",
            self.read_buffer.len()
        );
        self.read_buffer.clear();
    }

    /// Give the stream back, discarding buffered bytes
    pub fn into_inner(self) -> Box<T> {
        self.stream
    }

    /// Write one command and flush the stream
    pub fn write(&mut self, cmd: &Command) -> Result<usize> {
        trace!(
            "Channel write: {:?}",
            String::from_utf8_lossy(cmd.as_bytes())
        );
        if let Err(err) = self.stream.write_all(cmd.as_bytes()) {
            error!("IO error writing command: {}", err);
            return Err(err.into());
        }
        self.stream.flush()?;
        Ok(cmd.len())
    }

    fn fill(&mut self) -> Result<usize> {
        match self.read_buffer.read_from(&mut self.stream) {
            Ok(read) => {
                trace!("Read {} bytes from stream", read);
                Ok(read)
            }
            Err(err) => {
                error!("IO error reading from stream: {}", err);
                Err(err.into())
            }
        }
    }

    /// Read exactly `n` bytes
    pub fn read_fixed(&mut self, n: usize) -> Result<Vec<u8>> {
        trace!("Channel read_fixed({})", n);
        let mut frame = Vec::with_capacity(n);
        while frame.len() < n {
            if self.read_buffer.is_empty() && self.fill()? == 0 {
                error!("Stream ended after {} of {} frame bytes", frame.len(), n);
                return Err(Error::ShortFrame {
                    expected: n,
                    received: frame.len(),
                });
            }
            let wanted = n - frame.len();
            self.read_buffer.drain_into(&mut frame, wanted);
        }
        Ok(frame)
    }

    /// Read up to and including the next line feed; the line feed is not returned
    pub fn read_line(&mut self) -> Result<Vec<u8>> {
        let mut line = Vec::new();
        loop {
            let byte = match self.read_buffer.pop_front() {
                Some(byte) => byte,
                None => {
                    if self.fill()? == 0 {
                        error!("Stream ended inside a line after {} bytes", line.len());
                        return Err(Error::ShortFrame {
                            expected: line.len() + 1,
                            received: line.len(),
                        });
                    }
                    continue;
                }
            };
            if byte == TERMINATOR {
                trace!("Channel read_line: {:?}", String::from_utf8_lossy(&line));
                return Ok(line);
            }
            if line.len() == MAX_LINE_LEN {
                error!("No line feed within {} bytes", MAX_LINE_LEN);
                return Err(Error::ProtocolError {
                    description: format!("line longer than {} bytes", MAX_LINE_LEN),
                });
            }
            line.push(byte);
        }
    }
}

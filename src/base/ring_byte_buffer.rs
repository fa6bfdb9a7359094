use std::cmp::min;
use std::io::{self, Read};

/// Fixed-capacity ring of received bytes sitting between the stream and the frame reader.
///
/// Filling performs at most one `read` call on the upstream so a blocking
/// stream is never asked for bytes the device has not sent yet.
#[derive(Debug, Clone, PartialEq)]
pub struct RingByteBuffer {
    buf: Vec<u8>,
    head: usize,
    size: usize,
}

impl RingByteBuffer {
    /// Creates a new `RingByteBuffer` with the specified capacity.
    ///
    /// # Arguments
    ///
    /// * `capacity` - The maximum number of bytes the buffer can hold. Must be non-zero.
    pub fn with_capacity(capacity: usize) -> RingByteBuffer {
        RingByteBuffer {
            buf: vec![0; capacity.max(1)],
            head: 0,
            size: 0,
        }
    }

    /// Returns the number of bytes currently stored in the buffer.
    pub fn len(&self) -> usize {
        self.size
    }

    /// Returns `true` if the buffer contains no bytes.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Returns the total capacity of the buffer in bytes.
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Returns the amount of free space available in the buffer in bytes.
    pub fn free_space(&self) -> usize {
        self.buf.len() - self.size
    }

    /// Drops all buffered bytes.
    pub fn clear(&mut self) {
        self.head = 0;
        self.size = 0;
    }

    fn tail(&self) -> usize {
        (self.head + self.size) % self.buf.len()
    }

    /// Contiguous run of the oldest buffered bytes. May be shorter than `len()` when the data wraps.
    pub fn current_read_slice(&self) -> &[u8] {
        let end = min(self.head + self.size, self.buf.len());
        &self.buf[self.head..end]
    }

    /// Removes up to `bytes` bytes from the front and returns how many were removed.
    pub fn skip_bytes(&mut self, bytes: usize) -> usize {
        let skipped = min(self.size, bytes);
        self.head = (self.head + skipped) % self.buf.len();
        self.size -= skipped;
        if self.size == 0 {
            self.head = 0;
        }
        skipped
    }

    fn current_write_slice(&mut self) -> &mut [u8] {
        let tail = self.tail();
        let end = min(self.buf.len(), tail + self.free_space());
        &mut self.buf[tail..end]
    }

    /// Moves up to `max` buffered bytes to the end of `dest`, returning the count moved.
    pub fn drain_into(&mut self, dest: &mut Vec<u8>, max: usize) -> usize {
        let mut moved = 0;
        while moved < max && !self.is_empty() {
            let slice = self.current_read_slice();
            let take = min(slice.len(), max - moved);
            dest.extend_from_slice(&slice[..take]);
            self.skip_bytes(take);
            moved += take;
        }
        moved
    }

    /// Pops the oldest byte.
    pub fn pop_front(&mut self) -> Option<u8> {
        let byte = *self.current_read_slice().first()?;
        self.skip_bytes(1);
        Some(byte)
    }

    /// Performs one read from `upstream` into the free space and returns the byte count.
    ///
    /// `Ok(0)` means the stream is exhausted, timed out, or the buffer is full.
    pub fn read_from(&mut self, upstream: &mut impl Read) -> io::Result<usize> {
        loop {
            let slice = self.current_write_slice();
            if slice.is_empty() {
                return Ok(0);
            }
            match upstream.read(slice) {
                Ok(read) => {
                    self.size += min(read, self.free_space());
                    return Ok(read);
                }
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == io::ErrorKind::TimedOut => return Ok(0),
                Err(err) => return Err(err),
            }
        }
    }
}

mod channel;
mod command;
mod error;
mod ring_byte_buffer;

pub use self::channel::*;
pub use self::command::{build_command, Command, Field};
pub use self::error::{Error, Result};
pub use self::ring_byte_buffer::RingByteBuffer;

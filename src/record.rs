//! Fixed-size sample records.
//!
//! A record stores one sample relative to the minute in its key:
//!
//! ```text
//! | 1 byte        | 1 byte  | 4 bytes             | 1 byte  |
//! | second offset | padding | response time (LE)  | padding |
//! ```
//!
//! The response time is an `f32` in milliseconds; `-1` marks a timeout.

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use chrono::{DateTime, Timelike, Utc};
use std::io::Write;

/// Size of one encoded record in bytes.
pub const RECORD_LEN: usize = 7;

/// Response time stored for a probe that timed out.
pub const TIMEOUT: f32 = -1.0;

const MAX_SECOND_OFFSET: u8 = 59;

/// Appends the record for a sample taken at `ts` to `writer`.
///
/// # Errors
///
/// Returns error if the writer fails.
pub fn encode_into<W: Write>(
    writer: &mut W,
    ts: &DateTime<Utc>,
    response_time: f32,
) -> std::io::Result<()> {
    // NOTE: second() is at most 59, leap seconds live in nanosecond()
    #[allow(clippy::cast_possible_truncation)]
    writer.write_u8(ts.second() as u8)?;
    writer.write_u8(0)?;
    writer.write_f32::<LittleEndian>(response_time)?;
    writer.write_u8(0)?;
    Ok(())
}

/// Decodes one record into its second offset and response time.
///
/// # Errors
///
/// Returns error if `bytes` is not exactly [`RECORD_LEN`] long,
/// or if the second offset is out of range.
pub fn decode(bytes: &[u8]) -> crate::Result<(u8, f64)> {
    if bytes.len() != RECORD_LEN {
        return Err(crate::Error::InvalidByteLength(bytes.len()));
    }

    let mut reader = bytes;

    let second_offset = reader.read_u8()?;
    if second_offset > MAX_SECOND_OFFSET {
        return Err(crate::Error::SecondOffsetOutOfRange(second_offset));
    }

    let _padding = reader.read_u8()?;
    let response_time = reader.read_f32::<LittleEndian>()?;

    Ok((second_offset, f64::from(response_time)))
}

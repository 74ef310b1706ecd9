//! Frame encoding for the device wire protocol
//!
//! # Wire Protocol
//!
//! One frame is sent per flush. There is no response from the device.
//!
//! ```text
//! ┌──────────────────┬──────────────────┬────────────────────────────────┐
//! │ Offset (2 bytes) │ Length (2 bytes) │ Payload (Length * record size) │
//! │ native-endian u16│ native-endian u16│ raw records, index order       │
//! └──────────────────┴──────────────────┴────────────────────────────────┘
//! ```
//!
//! - **Offset**: index of the first record in the payload (always 0 today)
//! - **Length**: number of records that follow
//! - **Byte order**: whatever the sending host uses; the device must match
//! - No checksum, no terminator. The receiver knows the record layout and
//!   relies on the header alone to delimit the payload.

use crate::error::{Error, Result};
use crate::record::Record;

/// Size of the frame header in bytes
pub const HEADER_LEN: usize = 4;

/// Largest record count a single frame can carry
pub const MAX_RECORDS: usize = u16::MAX as usize;

/// Frame header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    /// Index of the first record carried
    pub offset: u16,
    /// Number of records carried
    pub length: u16,
}

impl FrameHeader {
    /// Header for `count` records starting at `offset`
    pub fn new(offset: u16, count: usize) -> Result<Self> {
        let length = u16::try_from(count).map_err(|_| Error::EncodingOverflow { count })?;
        Ok(Self { offset, length })
    }

    /// Header bytes as sent on the wire
    pub fn to_bytes(&self) -> [u8; HEADER_LEN] {
        let mut out = [0u8; HEADER_LEN];
        out[0..2].copy_from_slice(&self.offset.to_ne_bytes());
        out[2..4].copy_from_slice(&self.length.to_ne_bytes());
        out
    }

    /// Parse a header from the start of `bytes`
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_LEN {
            return Err(Error::InvalidFrame(format!(
                "need {} header bytes, got {}",
                HEADER_LEN,
                bytes.len()
            )));
        }
        Ok(Self {
            offset: u16::from_ne_bytes([bytes[0], bytes[1]]),
            length: u16::from_ne_bytes([bytes[2], bytes[3]]),
        })
    }

    /// Payload size in bytes for records of type `R`
    pub fn payload_len<R: Record>(&self) -> usize {
        self.length as usize * R::SIZE
    }
}

/// Check that `count` records fit in one frame
pub fn check_count(count: usize) -> Result<()> {
    if count > MAX_RECORDS {
        return Err(Error::EncodingOverflow { count });
    }
    Ok(())
}

/// Encode a frame into `buf`, replacing its contents
///
/// Reusing `buf` across flushes avoids an allocation per frame.
pub fn encode_into<R: Record>(buf: &mut Vec<u8>, offset: u16, records: &[R]) -> Result<()> {
    let header = FrameHeader::new(offset, records.len())?;

    buf.clear();
    buf.reserve(HEADER_LEN + records.len() * R::SIZE);
    buf.extend_from_slice(&header.to_bytes());
    for record in records {
        record.write_ne(buf);
    }
    Ok(())
}

/// Encode a frame: header followed by raw record bytes
pub fn encode<R: Record>(offset: u16, records: &[R]) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    encode_into(&mut buf, offset, records)?;
    Ok(buf)
}

/// Decode exactly one frame
///
/// Fails if `bytes` is truncated or carries trailing data.
pub fn decode<R: Record>(bytes: &[u8]) -> Result<(FrameHeader, Vec<R>)> {
    let (header, records, used) = decode_one(bytes)?;
    if used != bytes.len() {
        return Err(Error::InvalidFrame(format!(
            "{} trailing bytes after frame",
            bytes.len() - used
        )));
    }
    Ok((header, records))
}

/// Decode the first frame of a byte stream
///
/// Returns the header, the records and the number of bytes consumed, so a
/// receiver can walk a stream holding several frames back to back.
pub fn decode_one<R: Record>(bytes: &[u8]) -> Result<(FrameHeader, Vec<R>, usize)> {
    let header = FrameHeader::parse(bytes)?;
    let payload_len = header.payload_len::<R>();
    let total = HEADER_LEN + payload_len;

    if bytes.len() < total {
        return Err(Error::InvalidFrame(format!(
            "truncated payload: need {} bytes, got {}",
            payload_len,
            bytes.len() - HEADER_LEN
        )));
    }

    let records = bytes[HEADER_LEN..total]
        .chunks_exact(R::SIZE)
        .map(R::read_ne)
        .collect();

    Ok((header, records, total))
}

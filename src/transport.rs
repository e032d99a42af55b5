//! byte framed transport for the engine
//!
//! the input side is a fixed 9 byte big endian frame per triple, the output
//! side is one text record per accumulated nonzero. the engine itself never
//! sees malformed frames, they are surfaced to the caller here.
//!
//! frame layout:
//! ```text
//! byte 0..3 : value   signed 32 bit
//! byte 4..5 : row     unsigned 16 bit
//! byte 6..7 : col     unsigned 16 bit
//! byte 8    : flags   bit 0 = last, bits 1..7 reserved, must be 0
//! ```

use std::io::{self, Read, Write};

use thiserror::Error;

use crate::engine::{OutputRecord, Triple};

pub const FRAME_BYTES: usize = 9;
pub const FLAG_LAST: u8 = 0x01;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("truncated frame: got {got} of 9 bytes")]
    TruncatedFrame { got: usize },
    #[error("reserved flag bits set: {flags:#04x}")]
    ReservedFlags { flags: u8 },
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub fn encode_frame(triple: &Triple) -> [u8; FRAME_BYTES] {
    let mut frame = [0u8; FRAME_BYTES];
    frame[0..4].copy_from_slice(&triple.value.to_be_bytes());
    frame[4..6].copy_from_slice(&triple.row.to_be_bytes());
    frame[6..8].copy_from_slice(&triple.col.to_be_bytes());
    frame[8] = if triple.last { FLAG_LAST } else { 0 };
    frame
}

pub fn decode_frame(frame: &[u8]) -> Result<Triple, TransportError> {
    if frame.len() < FRAME_BYTES {
        return Err(TransportError::TruncatedFrame { got: frame.len() });
    }
    let flags = frame[8];
    if flags & !FLAG_LAST != 0 {
        return Err(TransportError::ReservedFlags { flags });
    }
    Ok(Triple::new(
        i32::from_be_bytes(frame[0..4].try_into().unwrap()),
        u16::from_be_bytes(frame[4..6].try_into().unwrap()),
        u16::from_be_bytes(frame[6..8].try_into().unwrap()),
        flags & FLAG_LAST != 0,
    ))
}

/// # Description
/// - pulls whole frames off any byte source
/// - a clean end of stream between frames is None, end of stream inside a
///   frame is a truncation error
#[derive(Debug)]
pub struct FrameReader<R: Read> {
    inner: R,
}

impl<R: Read> FrameReader<R> {
    pub fn new(inner: R) -> Self {
        FrameReader { inner }
    }

    pub fn next_frame(&mut self) -> Result<Option<Triple>, TransportError> {
        let mut frame = [0u8; FRAME_BYTES];
        let mut got = 0;
        while got < FRAME_BYTES {
            let n = self.inner.read(&mut frame[got..])?;
            if n == 0 {
                break;
            }
            got += n;
        }
        if got == 0 {
            return Ok(None);
        }
        if got < FRAME_BYTES {
            return Err(TransportError::TruncatedFrame { got });
        }
        decode_frame(&frame).map(Some)
    }
}

/// writes one `row,col,value` line per record, values as plain integers
#[derive(Debug)]
pub struct RecordWriter<W: Write> {
    inner: W,
}

impl<W: Write> RecordWriter<W> {
    pub fn new(inner: W) -> Self {
        RecordWriter { inner }
    }

    pub fn write_record(&mut self, record: &OutputRecord) -> io::Result<()> {
        writeln!(self.inner, "{},{},{}", record.row, record.col, record.value)
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

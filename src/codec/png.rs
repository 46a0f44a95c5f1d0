//! pHYs density codec: reads and rewrites the physical-pixel-dimensions
//! chunk of a PNG stream.
//!
//! A PNG is the fixed 8-byte signature followed by chunks, each laid out as
//! a 4-byte big-endian data length, a 4-byte ASCII type, the data, and a
//! CRC32 over type + data. The `pHYs` data is 9 bytes: X pixels-per-unit,
//! Y pixels-per-unit (both big-endian u32), and a unit specifier where 1
//! means meter. The chunk must precede the first `IDAT`.
//!
//! Writing rebuilds the stream: every chunk is copied verbatim in its
//! original order, any existing `pHYs` chunks are dropped, and exactly one
//! freshly built `pHYs` (with its CRC recomputed) is placed before the
//! first `IDAT`, or before `IEND` when the stream has no image data.

use super::crc32::crc32;
use super::{CodecError, CodecOptions, Policy};
use crate::types::{DEFAULT_DPI, PNG_SIGNATURE};
use crate::units::INCHES_TO_METERS;

const UNIT_METER: u8 = 1;

/// One chunk located in a PNG stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Chunk {
    /// Four-byte chunk type.
    pub kind: [u8; 4],
    /// Offset of the 4-byte length field.
    pub start: usize,
    /// Offset one past the CRC.
    pub end: usize,
}

impl Chunk {
    /// The chunk's data bytes (between the type and the CRC).
    pub fn data<'a>(&self, data: &'a [u8]) -> &'a [u8] {
        &data[self.start + 8..self.end - 4]
    }
}

/// Walks a PNG stream chunk by chunk, starting after the signature.
///
/// The walk ends cleanly at the end of the buffer, or early at the first
/// chunk header that claims more bytes than the buffer holds;
/// `truncated_at` reports where that happened.
pub(crate) struct Chunks<'a> {
    data: &'a [u8],
    pos: usize,
    truncated_at: Option<usize>,
}

impl<'a> Chunks<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: PNG_SIGNATURE.len(),
            truncated_at: None,
        }
    }

    pub fn truncated_at(&self) -> Option<usize> {
        self.truncated_at
    }
}

impl Iterator for Chunks<'_> {
    type Item = Chunk;

    fn next(&mut self) -> Option<Chunk> {
        if self.pos >= self.data.len() {
            return None;
        }
        if self.pos + 8 > self.data.len() {
            self.truncated_at = Some(self.pos);
            return None;
        }
        let length = u32::from_be_bytes([
            self.data[self.pos],
            self.data[self.pos + 1],
            self.data[self.pos + 2],
            self.data[self.pos + 3],
        ]) as usize;
        let end = self.pos + 12 + length;
        if end > self.data.len() {
            self.truncated_at = Some(self.pos);
            return None;
        }
        let chunk = Chunk {
            kind: [
                self.data[self.pos + 4],
                self.data[self.pos + 5],
                self.data[self.pos + 6],
                self.data[self.pos + 7],
            ],
            start: self.pos,
            end,
        };
        self.pos = end;
        Some(chunk)
    }
}

/// Read the X pixels-per-meter from the `pHYs` chunk, converted to DPI.
///
/// Returns [`DEFAULT_DPI`] when no `pHYs` chunk exists or its unit byte is
/// not meters. The conversion rounds to the nearest integer.
pub(crate) fn read_dpi(data: &[u8], options: CodecOptions) -> Result<u32, CodecError> {
    if !data.starts_with(&PNG_SIGNATURE) {
        return Err(CodecError::NotAPng);
    }
    let mut chunks = Chunks::new(data);
    let phys = (&mut chunks).find(|c| &c.kind == b"pHYs" && c.data(data).len() >= 9);
    if phys.is_none() && options.policy == Policy::Strict {
        if let Some(offset) = chunks.truncated_at() {
            return Err(CodecError::TruncatedStream { offset });
        }
    }
    let Some(chunk) = phys else {
        return Ok(DEFAULT_DPI);
    };
    let d = chunk.data(data);
    if d[8] != UNIT_METER {
        return Ok(DEFAULT_DPI);
    }
    let ppm = u32::from_be_bytes([d[0], d[1], d[2], d[3]]);
    Ok((ppm as f64 * INCHES_TO_METERS).round() as u32)
}

/// Rebuild the stream with exactly one `pHYs` chunk carrying the given DPI.
///
/// The input is never mutated; a freshly allocated buffer is returned with
/// every other chunk copied verbatim in its original order.
pub(crate) fn write_dpi(
    data: &[u8],
    dpi: u32,
    options: CodecOptions,
) -> Result<Vec<u8>, CodecError> {
    if !data.starts_with(&PNG_SIGNATURE) {
        return Err(CodecError::NotAPng);
    }
    super::check_dpi(dpi, options)?;
    let ppm = (dpi as f64 / INCHES_TO_METERS).round() as u32;
    let phys = phys_chunk(ppm, ppm);

    let mut out = Vec::with_capacity(data.len() + phys.len());
    out.extend_from_slice(&PNG_SIGNATURE);
    let mut inserted = false;
    let mut chunks = Chunks::new(data);
    for chunk in &mut chunks {
        if !inserted && (&chunk.kind == b"IDAT" || &chunk.kind == b"IEND") {
            out.extend_from_slice(&phys);
            inserted = true;
        }
        if &chunk.kind != b"pHYs" {
            out.extend_from_slice(&data[chunk.start..chunk.end]);
        }
    }
    if let Some(offset) = chunks.truncated_at() {
        // Chunks past this point cannot be copied; strict mode refuses to
        // silently drop them.
        if options.policy == Policy::Strict {
            return Err(CodecError::TruncatedStream { offset });
        }
    }
    if !inserted {
        // No IDAT and no IEND; keep the single-pHYs invariant anyway
        out.extend_from_slice(&phys);
    }
    Ok(out)
}

/// Build a complete 21-byte `pHYs` chunk, CRC included.
fn phys_chunk(x_ppm: u32, y_ppm: u32) -> [u8; 21] {
    let mut chunk = [0u8; 21];
    chunk[..4].copy_from_slice(&9u32.to_be_bytes());
    chunk[4..8].copy_from_slice(b"pHYs");
    chunk[8..12].copy_from_slice(&x_ppm.to_be_bytes());
    chunk[12..16].copy_from_slice(&y_ppm.to_be_bytes());
    chunk[16] = UNIT_METER;
    let crc = crc32(&chunk[4..17]);
    chunk[17..].copy_from_slice(&crc.to_be_bytes());
    chunk
}

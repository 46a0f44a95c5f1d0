//! JFIF density codec: reads and rewrites the DPI fields of the JPEG
//! APP0/JFIF marker segment.
//!
//! A JPEG stream is a sequence of marker segments: a `0xFF` byte, a marker
//! code, and (for most markers) a big-endian u16 length covering itself and
//! the payload. The JFIF APP0 payload of interest:
//!
//! ```text
//! bytes 0-4   "JFIF\0" identifier
//! bytes 5-6   version
//! byte  7     density units (0 = none, 1 = dots/inch, 2 = dots/cm)
//! bytes 8-9   X density (big-endian)
//! bytes 10-11 Y density (big-endian)
//! bytes 12-13 thumbnail width / height
//! ```
//!
//! Writing never touches any byte outside the density fields; when no JFIF
//! segment exists, a canonical 18-byte one is spliced in directly after SOI.

use super::{CodecError, CodecOptions, Policy};
use crate::types::{DEFAULT_DPI, JPEG_SOI};

const MARKER_APP0: u8 = 0xE0;
const MARKER_SOS: u8 = 0xDA;
const MARKER_EOI: u8 = 0xD9;
const JFIF_ID: &[u8] = b"JFIF\0";
const UNITS_DOTS_PER_INCH: u8 = 1;

/// One marker segment located in a JPEG stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Segment {
    /// Marker code (the byte after `0xFF`).
    pub marker: u8,
    /// Offset of the `0xFF` marker byte.
    pub start: usize,
    /// Offset one past the segment (marker + length + payload).
    pub end: usize,
}

impl Segment {
    /// Payload bytes after the 2-byte marker and 2-byte length.
    ///
    /// Empty for standalone markers, which carry no length field.
    pub fn payload<'a>(&self, data: &'a [u8]) -> &'a [u8] {
        if self.end > self.start + 4 {
            &data[self.start + 4..self.end]
        } else {
            &[]
        }
    }
}

/// Markers that carry no length field.
fn is_standalone(marker: u8) -> bool {
    matches!(marker, 0x01 | 0xD0..=0xD7 | 0xD8)
}

/// Walks a JPEG stream segment by segment, starting after SOI.
///
/// The walk ends at SOS (entropy-coded data follows, markers can no longer
/// be trusted), at EOI, or at the first structure that extends past the end
/// of the buffer; `truncated_at` reports where the latter happened.
pub(crate) struct Segments<'a> {
    data: &'a [u8],
    pos: usize,
    truncated_at: Option<usize>,
}

impl<'a> Segments<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: JPEG_SOI.len(),
            truncated_at: None,
        }
    }

    /// Offset of the segment header that claimed more bytes than the buffer
    /// holds, if the walk ended that way.
    pub fn truncated_at(&self) -> Option<usize> {
        self.truncated_at
    }
}

impl Iterator for Segments<'_> {
    type Item = Segment;

    fn next(&mut self) -> Option<Segment> {
        while self.pos + 2 <= self.data.len() {
            if self.data[self.pos] != 0xFF {
                // Lost marker sync; stop rather than guess at boundaries.
                return None;
            }
            let marker = self.data[self.pos + 1];
            if marker == 0xFF {
                // Fill byte; the real marker code follows
                self.pos += 1;
                continue;
            }
            if marker == MARKER_SOS || marker == MARKER_EOI {
                return None;
            }
            if is_standalone(marker) {
                let seg = Segment {
                    marker,
                    start: self.pos,
                    end: self.pos + 2,
                };
                self.pos += 2;
                return Some(seg);
            }
            if self.pos + 4 > self.data.len() {
                self.truncated_at = Some(self.pos);
                return None;
            }
            let length =
                u16::from_be_bytes([self.data[self.pos + 2], self.data[self.pos + 3]]) as usize;
            if length < 2 {
                // The length covers its own two bytes; anything smaller is garbage
                self.truncated_at = Some(self.pos);
                return None;
            }
            let end = self.pos + 2 + length;
            if end > self.data.len() {
                self.truncated_at = Some(self.pos);
                return None;
            }
            let seg = Segment {
                marker,
                start: self.pos,
                end,
            };
            self.pos = end;
            return Some(seg);
        }
        None
    }
}

/// True for an APP0 segment whose payload is a JFIF header large enough to
/// hold the density fields. Shorter "JFIF" payloads are treated as absent.
fn is_jfif(data: &[u8], seg: &Segment) -> bool {
    let payload = seg.payload(data);
    seg.marker == MARKER_APP0 && payload.starts_with(JFIF_ID) && payload.len() >= 12
}

/// Locate the authoritative JFIF APP0 segment, honoring the parse policy.
fn find_jfif(data: &[u8], options: CodecOptions) -> Result<Option<Segment>, CodecError> {
    let mut segments = Segments::new(data);
    let jfif = (&mut segments).find(|seg| is_jfif(data, seg));
    if jfif.is_none() && options.policy == Policy::Strict {
        if let Some(offset) = segments.truncated_at() {
            return Err(CodecError::TruncatedStream { offset });
        }
    }
    Ok(jfif)
}

/// Read the X density from the JFIF APP0 segment.
///
/// Returns [`DEFAULT_DPI`] when no JFIF segment exists or its unit byte is
/// anything other than dots/inch.
pub(crate) fn read_dpi(data: &[u8], options: CodecOptions) -> Result<u32, CodecError> {
    if !data.starts_with(&JPEG_SOI) {
        return Err(CodecError::NotAJpeg);
    }
    let Some(seg) = find_jfif(data, options)? else {
        return Ok(DEFAULT_DPI);
    };
    let payload = seg.payload(data);
    if payload[7] != UNITS_DOTS_PER_INCH {
        return Ok(DEFAULT_DPI);
    }
    Ok(u16::from_be_bytes([payload[8], payload[9]]) as u32)
}

/// Rewrite (or synthesize) the JFIF APP0 segment with the given DPI.
///
/// The input is never mutated; a freshly allocated buffer is returned.
/// Overwriting keeps the length constant; synthesis grows the stream by
/// exactly 18 bytes. Under the lenient policy the value wraps to 16 bits.
pub(crate) fn write_dpi(
    data: &[u8],
    dpi: u32,
    options: CodecOptions,
) -> Result<Vec<u8>, CodecError> {
    if !data.starts_with(&JPEG_SOI) {
        return Err(CodecError::NotAJpeg);
    }
    super::check_dpi(dpi, options)?;
    let density = dpi as u16;

    match find_jfif(data, options)? {
        Some(seg) => {
            let mut out = data.to_vec();
            let base = seg.start + 4;
            out[base + 7] = UNITS_DOTS_PER_INCH;
            out[base + 8..base + 10].copy_from_slice(&density.to_be_bytes());
            out[base + 10..base + 12].copy_from_slice(&density.to_be_bytes());
            Ok(out)
        }
        None => Ok(insert_jfif_segment(data, density)),
    }
}

/// The canonical 18-byte APP0/JFIF segment: version 1.1, dots/inch, equal
/// X/Y density, no thumbnail.
fn jfif_app0_segment(density: u16) -> [u8; 18] {
    let [hi, lo] = density.to_be_bytes();
    [
        0xFF,
        MARKER_APP0,
        0x00,
        0x10, // segment length (16)
        b'J',
        b'F',
        b'I',
        b'F',
        0x00,
        0x01,
        0x01, // JFIF version 1.1
        UNITS_DOTS_PER_INCH,
        hi,
        lo, // X density
        hi,
        lo, // Y density
        0x00,
        0x00, // no thumbnail
    ]
}

/// Splice a fresh JFIF segment in directly after the SOI marker.
fn insert_jfif_segment(data: &[u8], density: u16) -> Vec<u8> {
    let seg = jfif_app0_segment(density);
    let mut out = Vec::with_capacity(data.len() + seg.len());
    out.extend_from_slice(&data[..JPEG_SOI.len()]);
    out.extend_from_slice(&seg);
    out.extend_from_slice(&data[JPEG_SOI.len()..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lenient() -> CodecOptions {
        CodecOptions::default()
    }

    fn strict() -> CodecOptions {
        CodecOptions {
            policy: Policy::Strict,
        }
    }

    /// SOI + full 18-byte APP0/JFIF + EOI.
    fn jpeg_with_jfif(units: u8, density: u16) -> Vec<u8> {
        let [hi, lo] = density.to_be_bytes();
        vec![
            0xFF, 0xD8, // SOI
            0xFF, 0xE0, 0x00, 0x10, // APP0, length 16
            b'J', b'F', b'I', b'F', 0x00, // identifier
            0x01, 0x01, // version
            units, hi, lo, hi, lo, // units, X density, Y density
            0x00, 0x00, // thumbnail
            0xFF, 0xD9, // EOI
        ]
    }

    /// SOI + a quantization-table-shaped segment + EOI, no APP0.
    fn jpeg_without_app0() -> Vec<u8> {
        vec![
            0xFF, 0xD8, // SOI
            0xFF, 0xDB, 0x00, 0x05, 0x00, 0x01, 0x02, // DQT, length 5
            0xFF, 0xD9, // EOI
        ]
    }

    #[test]
    fn read_dots_per_inch_density() {
        let data = jpeg_with_jfif(1, 300);
        assert_eq!(read_dpi(&data, lenient()).unwrap(), 300);
    }

    #[test]
    fn read_defaults_when_units_are_not_inches() {
        // 0 = aspect ratio only, 2 = dots/cm; both fall back to the default
        assert_eq!(read_dpi(&jpeg_with_jfif(0, 300), lenient()).unwrap(), 96);
        assert_eq!(read_dpi(&jpeg_with_jfif(2, 300), lenient()).unwrap(), 96);
    }

    #[test]
    fn read_defaults_without_app0() {
        assert_eq!(read_dpi(&jpeg_without_app0(), lenient()).unwrap(), 96);
    }

    #[test]
    fn read_rejects_non_jpeg() {
        assert!(matches!(
            read_dpi(b"not a jpeg", lenient()),
            Err(CodecError::NotAJpeg)
        ));
        assert!(matches!(read_dpi(&[], lenient()), Err(CodecError::NotAJpeg)));
        assert!(matches!(
            read_dpi(&[0xFF], lenient()),
            Err(CodecError::NotAJpeg)
        ));
    }

    #[test]
    fn write_overwrites_existing_jfif_in_place() {
        let input = jpeg_with_jfif(0, 72);
        let out = write_dpi(&input, 300, lenient()).unwrap();

        assert_eq!(out.len(), input.len());
        // Everything before the units byte is untouched
        assert_eq!(out[..13], input[..13]);
        // Units forced to dots/inch, X and Y density both set
        assert_eq!(out[13], 1);
        assert_eq!(out[14..16], 300u16.to_be_bytes());
        assert_eq!(out[16..18], 300u16.to_be_bytes());
        // Thumbnail bytes and the rest of the stream are untouched
        assert_eq!(out[18..], input[18..]);

        assert_eq!(read_dpi(&out, lenient()).unwrap(), 300);
    }

    #[test]
    fn write_synthesizes_segment_after_soi() {
        let input = jpeg_without_app0();
        let out = write_dpi(&input, 96, lenient()).unwrap();

        assert_eq!(out.len(), input.len() + 18);
        assert_eq!(out[..2], [0xFF, 0xD8]);
        assert_eq!(out[2..4], [0xFF, 0xE0]);
        // The original stream continues unchanged after the new segment
        assert_eq!(out[20..], input[2..]);

        assert_eq!(read_dpi(&out, lenient()).unwrap(), 96);
    }

    #[test]
    fn write_is_idempotent() {
        let once = write_dpi(&jpeg_without_app0(), 150, lenient()).unwrap();
        let twice = write_dpi(&once, 150, lenient()).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn rewriting_with_new_value_keeps_single_segment() {
        let first = write_dpi(&jpeg_without_app0(), 150, lenient()).unwrap();
        let second = write_dpi(&first, 300, lenient()).unwrap();
        assert_eq!(second.len(), first.len());
        assert_eq!(read_dpi(&second, lenient()).unwrap(), 300);
    }

    #[test]
    fn write_rejects_non_jpeg() {
        assert!(matches!(
            write_dpi(b"PNG-ish", 96, lenient()),
            Err(CodecError::NotAJpeg)
        ));
    }

    #[test]
    fn scanner_walks_past_earlier_segments() {
        // APP1 (EXIF-shaped) first, then the JFIF APP0
        let mut data = vec![0xFF, 0xD8, 0xFF, 0xE1, 0x00, 0x04, 0xAA, 0xBB];
        data.extend_from_slice(&jpeg_with_jfif(1, 240)[2..]);
        assert_eq!(read_dpi(&data, lenient()).unwrap(), 240);
    }

    #[test]
    fn app0_without_jfif_identifier_is_not_authoritative() {
        let mut data = jpeg_with_jfif(1, 300);
        // Corrupt the identifier: now an APP0 extension-ish segment
        data[8] = b'X';
        data[9] = b'X';
        let out = write_dpi(&data, 96, lenient()).unwrap();
        assert_eq!(out.len(), data.len() + 18);
        assert_eq!(read_dpi(&out, lenient()).unwrap(), 96);
    }

    #[test]
    fn lenient_wraps_oversized_dpi_to_16_bits() {
        let out = write_dpi(&jpeg_without_app0(), 70_000, lenient()).unwrap();
        assert_eq!(read_dpi(&out, lenient()).unwrap(), 70_000 % 65_536);
    }

    #[test]
    fn strict_rejects_out_of_range_dpi() {
        assert!(matches!(
            write_dpi(&jpeg_without_app0(), 70_000, strict()),
            Err(CodecError::DpiOutOfRange(70_000))
        ));
        assert!(matches!(
            write_dpi(&jpeg_without_app0(), 0, strict()),
            Err(CodecError::DpiOutOfRange(0))
        ));
        assert!(write_dpi(&jpeg_without_app0(), 65_535, strict()).is_ok());
    }

    #[test]
    fn truncated_segment_reads_as_default_when_lenient() {
        // APP1 header claims 65535 bytes the buffer does not hold
        let data = vec![0xFF, 0xD8, 0xFF, 0xE1, 0xFF, 0xFF];
        assert_eq!(read_dpi(&data, lenient()).unwrap(), 96);
    }

    #[test]
    fn truncated_segment_errors_when_strict() {
        let data = vec![0xFF, 0xD8, 0xFF, 0xE1, 0xFF, 0xFF];
        assert!(matches!(
            read_dpi(&data, strict()),
            Err(CodecError::TruncatedStream { offset: 2 })
        ));
        assert!(matches!(
            write_dpi(&data, 96, strict()),
            Err(CodecError::TruncatedStream { offset: 2 })
        ));
    }

    #[test]
    fn truncation_after_jfif_does_not_mask_the_segment() {
        // Valid JFIF, then a truncated APP1 tail
        let mut data = jpeg_with_jfif(1, 180);
        data.truncate(data.len() - 2); // drop EOI
        data.extend_from_slice(&[0xFF, 0xE1, 0xFF, 0xFF]);
        assert_eq!(read_dpi(&data, strict()).unwrap(), 180);
        let out = write_dpi(&data, 200, strict()).unwrap();
        assert_eq!(out.len(), data.len());
        assert_eq!(read_dpi(&out, strict()).unwrap(), 200);
    }

    #[test]
    fn scanner_stops_at_start_of_scan() {
        // A fake APP0 placed after SOS must not be found
        let mut data = vec![
            0xFF, 0xD8, // SOI
            0xFF, 0xDA, 0x00, 0x04, 0x00, 0x00, // SOS
        ];
        data.extend_from_slice(&jfif_app0_segment(300));
        assert_eq!(read_dpi(&data, lenient()).unwrap(), 96);
    }

    #[test]
    fn segment_payload_of_standalone_marker_is_empty() {
        let seg = Segment {
            marker: 0xD8,
            start: 0,
            end: 2,
        };
        assert!(seg.payload(&[0xFF, 0xD8]).is_empty());
    }
}

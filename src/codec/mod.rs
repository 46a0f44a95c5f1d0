//! Image container metadata codec.
//!
//! Reads and rewrites the physical pixel-density (DPI) metadata embedded in
//! JPEG and PNG byte streams — the JFIF APP0 density fields and the PNG
//! `pHYs` chunk — without re-encoding pixel data and without disturbing any
//! other stream content.
//!
//! | Format | Metadata carrier | Module |
//! |---|---|---|
//! | JPEG | APP0/JFIF density fields (u16, dots/inch) | `jpeg.rs` |
//! | PNG | `pHYs` chunk (u32, pixels/meter, CRC-protected) | `png.rs` |
//!
//! Every entry point takes the complete file content as a byte slice and,
//! for writes, returns a freshly allocated buffer; the input is never
//! mutated. The transforms are pure: fixed input bytes and a fixed DPI
//! value always produce identical output bytes.
//!
//! ## Parse policy
//!
//! Historically this codec tolerated malformed input: a segment or chunk
//! header claiming more bytes than the buffer holds ends the scan as "not
//! found", and DPI values above 16 bits silently wrap when written into
//! the JFIF fields. [`Policy::Lenient`] (the default) keeps those
//! tolerances; [`Policy::Strict`] turns them into
//! [`CodecError::TruncatedStream`] and [`CodecError::DpiOutOfRange`].

mod crc32;
mod jpeg;
mod png;

use crate::types::ImageFormat;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("not a JPEG stream: missing SOI marker")]
    NotAJpeg,
    #[error("not a PNG stream: bad signature")]
    NotAPng,
    #[error("truncated stream: structure at offset {offset} extends past the end of the buffer")]
    TruncatedStream { offset: usize },
    #[error("DPI value {0} outside the supported range 1..=65535")]
    DpiOutOfRange(u32),
    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),
    #[error("decode failed: {0}")]
    Decode(image::ImageError),
    #[error("encode failed: {0}")]
    Encode(image::ImageError),
}

/// How the codec treats malformed input and out-of-range values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Policy {
    /// Legacy tolerances: truncated structures end the scan as "not
    /// found" (reads) or end the copy (writes), and DPI values wrap to
    /// 16 bits in the JFIF fields.
    #[default]
    Lenient,
    /// Truncated structures and DPI values outside `1..=65535` are errors.
    Strict,
}

/// Options for the `_with` entry points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CodecOptions {
    pub policy: Policy,
}

impl CodecOptions {
    pub fn strict() -> Self {
        Self {
            policy: Policy::Strict,
        }
    }
}

/// Strict-policy range check. The lenient policy lets values wrap (JFIF)
/// or saturate (pHYs) downstream instead.
pub(crate) fn check_dpi(dpi: u32, options: CodecOptions) -> Result<(), CodecError> {
    if options.policy == Policy::Strict && !(1..=u16::MAX as u32).contains(&dpi) {
        return Err(CodecError::DpiOutOfRange(dpi));
    }
    Ok(())
}

/// Read the DPI recorded in an image buffer's density metadata.
///
/// Returns [`DEFAULT_DPI`](crate::types::DEFAULT_DPI) when the stream is
/// valid but carries no usable density information.
pub fn get_dpi(data: &[u8], format: ImageFormat) -> Result<u32, CodecError> {
    get_dpi_with(data, format, CodecOptions::default())
}

/// [`get_dpi`] with an explicit parse policy.
pub fn get_dpi_with(
    data: &[u8],
    format: ImageFormat,
    options: CodecOptions,
) -> Result<u32, CodecError> {
    match format {
        ImageFormat::Jpeg => jpeg::read_dpi(data, options),
        ImageFormat::Png => png::read_dpi(data, options),
    }
}

/// Produce a new byte buffer with the density metadata set to `dpi`.
///
/// All pixel data and every other segment/chunk are carried over verbatim;
/// only the density carrier is rewritten (or synthesized when absent).
pub fn set_dpi(data: &[u8], format: ImageFormat, dpi: u32) -> Result<Vec<u8>, CodecError> {
    set_dpi_with(data, format, dpi, CodecOptions::default())
}

/// [`set_dpi`] with an explicit parse policy.
pub fn set_dpi_with(
    data: &[u8],
    format: ImageFormat,
    dpi: u32,
    options: CodecOptions,
) -> Result<Vec<u8>, CodecError> {
    match format {
        ImageFormat::Jpeg => jpeg::write_dpi(data, dpi, options),
        ImageFormat::Png => png::write_dpi(data, dpi, options),
    }
}

impl FromStr for ImageFormat {
    type Err = CodecError;

    /// Parse the format tags callers pass over string boundaries.
    fn from_str(s: &str) -> Result<Self, CodecError> {
        match s {
            "jpeg" | "jpg" => Ok(ImageFormat::Jpeg),
            "png" => Ok(ImageFormat::Png),
            other => Err(CodecError::UnsupportedFormat(other.to_string())),
        }
    }
}

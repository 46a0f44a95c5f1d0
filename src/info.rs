//! Image info reporting.
//!
//! Describes an image buffer without fully decoding it: format from magic
//! bytes, pixel dimensions from the container headers (via the `image`
//! crate), DPI from the metadata codec.

use crate::codec::{self, CodecError};
use crate::types::ImageFormat;
use serde::{Deserialize, Serialize};
use std::io::Cursor;

/// Summary of an image buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    pub format: ImageFormat,
    /// Recorded density, or [`DEFAULT_DPI`](crate::types::DEFAULT_DPI)
    /// when the stream carries none.
    pub dpi: u32,
}

/// Describe an image buffer.
///
/// Fails with [`CodecError::UnsupportedFormat`] when the buffer starts with
/// neither a JPEG SOI marker nor a PNG signature.
pub fn image_info(data: &[u8]) -> Result<ImageInfo, CodecError> {
    let Some(format) = ImageFormat::detect(data) else {
        return Err(CodecError::UnsupportedFormat(
            "unrecognized signature".to_string(),
        ));
    };

    let mut reader = image::ImageReader::new(Cursor::new(data));
    reader.set_format(format.decoder_format());
    let (width, height) = reader.into_dimensions().map_err(CodecError::Decode)?;

    let dpi = codec::get_dpi(data, format)?;

    Ok(ImageInfo {
        width,
        height,
        format,
        dpi,
    })
}

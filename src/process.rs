//! Re-encode pipeline: decode, re-encode in the same format, stamp DPI.
//!
//! The codec modules never touch pixel data; this is the one module that
//! does. It exists for callers that want a freshly encoded image with known
//! density metadata in one step — the decoded raster goes through the
//! `image` crate's encoders, then the codec stamps the result. Input and
//! output format are always the same; changing formats is a different job.

use crate::codec::{self, CodecError};
use crate::types::ImageFormat;
use image::ImageEncoder;
use image::codecs::jpeg::JpegEncoder;
use std::io::Cursor;

/// Quality setting for lossy re-encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(95)
    }
}

/// Decode `data`, re-encode it in the same format, and stamp the result
/// with `dpi`.
///
/// JPEG output is encoded at the given quality; PNG encoding is lossless
/// and ignores it. The returned buffer is brand new; the input is never
/// mutated.
pub fn reencode_with_dpi(
    data: &[u8],
    format: ImageFormat,
    dpi: u32,
    quality: Quality,
) -> Result<Vec<u8>, CodecError> {
    let mut reader = image::ImageReader::new(Cursor::new(data));
    reader.set_format(format.decoder_format());
    let img = reader.decode().map_err(CodecError::Decode)?;

    let mut encoded = Vec::new();
    match format {
        ImageFormat::Jpeg => {
            // JPEG has no alpha channel
            let rgb = img.to_rgb8();
            JpegEncoder::new_with_quality(&mut encoded, quality.value() as u8)
                .write_image(
                    rgb.as_raw(),
                    rgb.width(),
                    rgb.height(),
                    image::ExtendedColorType::Rgb8,
                )
                .map_err(CodecError::Encode)?;
        }
        ImageFormat::Png => {
            img.write_to(&mut Cursor::new(&mut encoded), image::ImageFormat::Png)
                .map_err(CodecError::Encode)?;
        }
    }

    codec::set_dpi(&encoded, format, dpi)
}

//! Shared types used across the codec and pipeline modules.

use serde::{Deserialize, Serialize};
use std::fmt;

/// JPEG streams open with the two-byte SOI marker.
pub(crate) const JPEG_SOI: [u8; 2] = [0xFF, 0xD8];

/// Fixed eight-byte PNG signature.
pub(crate) const PNG_SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

/// DPI assumed when a stream carries no density metadata.
pub const DEFAULT_DPI: u32 = 96;

/// Common density presets.
pub const DPI_72: u32 = 72;
pub const DPI_96: u32 = 96;
pub const DPI_150: u32 = 150;
pub const DPI_300: u32 = 300;

/// Container formats the codec understands.
///
/// Serialized with lowercase tags (`"jpeg"`, `"png"`) so the values match
/// what callers pass over JSON boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Jpeg,
    Png,
}

impl ImageFormat {
    /// Sniff the format from a buffer's magic bytes.
    ///
    /// Returns `None` when the buffer starts with neither the JPEG SOI
    /// marker nor the PNG signature.
    pub fn detect(data: &[u8]) -> Option<ImageFormat> {
        if data.starts_with(&PNG_SIGNATURE) {
            Some(ImageFormat::Png)
        } else if data.starts_with(&JPEG_SOI) {
            Some(ImageFormat::Jpeg)
        } else {
            None
        }
    }

    /// Matching format tag in the `image` crate, for the modules that decode.
    pub(crate) fn decoder_format(self) -> image::ImageFormat {
        match self {
            ImageFormat::Jpeg => image::ImageFormat::Jpeg,
            ImageFormat::Png => image::ImageFormat::Png,
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ImageFormat::Jpeg => "jpeg",
            ImageFormat::Png => "png",
        })
    }
}

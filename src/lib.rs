//! # dpikit
//!
//! Read and rewrite the physical pixel-density (DPI) metadata embedded in
//! JPEG and PNG byte streams — without re-encoding pixel data and without
//! disturbing anything else in the file.
//!
//! DPI lives in a fixed-size field inside each container: JPEG keeps it in
//! the APP0/JFIF marker segment, PNG in the `pHYs` chunk. Rewriting it is
//! byte surgery, not image processing: walk the container's structural
//! units, find (or synthesize) the density carrier, and emit a new byte
//! sequence in which every other byte is carried over verbatim.
//!
//! ```
//! use dpikit::{ImageFormat, get_dpi, set_dpi};
//!
//! // A minimal JPEG: SOI, one comment segment, EOI.
//! let jpeg = [0xFF, 0xD8, 0xFF, 0xFE, 0x00, 0x04, b'o', b'k', 0xFF, 0xD9];
//!
//! // No JFIF segment yet, so one is spliced in after SOI (18 bytes).
//! let stamped = set_dpi(&jpeg, ImageFormat::Jpeg, 300).unwrap();
//! assert_eq!(stamped.len(), jpeg.len() + 18);
//! assert_eq!(get_dpi(&stamped, ImageFormat::Jpeg).unwrap(), 300);
//! ```
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`codec`] | The core: JPEG segment / PNG chunk scanners, JFIF and `pHYs` density codecs, CRC32, format dispatch |
//! | [`units`] | Conversion between DPI, dots/cm, and pixels/meter |
//! | [`info`] | One-call summary of a buffer: dimensions, format, DPI |
//! | [`process`] | Decode → same-format re-encode → stamp DPI, for callers that want a fresh encode |
//! | [`types`] | Shared types: [`ImageFormat`], density presets |
//!
//! # Design Decisions
//!
//! ## Whole-Buffer Transforms
//!
//! Every entry point takes the complete file content as a slice and writes
//! a complete new buffer. Structural edits move every downstream byte, so
//! the insertion point cannot be known until the stream has been walked —
//! streaming would buy nothing. Callers read the file, call the codec, and
//! write the returned buffer back out (temp-file-then-rename if they want
//! atomicity); the crate itself owns no file handles and performs no I/O.
//!
//! ## The Input Is Never Mutated
//!
//! Writers take `&[u8]` and allocate their output. There is no in-place
//! editing API: sharing a mutable buffer across a metadata rewrite is how
//! half-written files happen.
//!
//! ## Lenient By Default, Strict By Choice
//!
//! Real-world files are routinely truncated or carry out-of-range values,
//! and the historical behavior of this codec was to degrade gracefully:
//! report "no metadata" instead of failing, wrap oversized densities. That
//! tolerance is now a visible policy ([`Policy`]) rather than an accident —
//! the default keeps it, [`Policy::Strict`] turns both tolerances into
//! errors.
//!
//! ## Pure Functions Over An Umbrella Type
//!
//! The crate is a set of independent functions (`get_dpi`, `set_dpi`,
//! `convert_dpi_value`, `image_info`, `reencode_with_dpi`), not one
//! transformer struct accreting unrelated capabilities. Nothing here holds
//! state between calls; the only process-wide state is the immutable CRC32
//! table.

pub mod codec;
pub mod info;
pub mod process;
pub mod types;
pub mod units;

pub use codec::{
    CodecError, CodecOptions, Policy, get_dpi, get_dpi_with, set_dpi, set_dpi_with,
};
pub use info::{ImageInfo, image_info};
pub use process::{Quality, reencode_with_dpi};
pub use types::{DEFAULT_DPI, DPI_72, DPI_96, DPI_150, DPI_300, ImageFormat};
pub use units::{Unit, UnitError, convert, convert_dpi_value};

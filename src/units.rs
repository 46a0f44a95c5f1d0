//! Density unit conversion.
//!
//! Three units are in play: DPI (dots per inch, what JFIF stores when its
//! unit byte is 1), dots per centimeter (JFIF unit byte 2), and pixels per
//! meter (the only unit the PNG `pHYs` chunk defines). All conversions
//! normalize through dots per inch using the fixed factor
//! `1 inch = 0.0254 m`.

use std::str::FromStr;
use thiserror::Error;

/// Meters per inch; ties DPI to the PNG pixels-per-meter unit.
pub(crate) const INCHES_TO_METERS: f64 = 0.0254;

const CM_PER_INCH: f64 = 2.54;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UnitError {
    #[error("unsupported unit: {0}")]
    Unsupported(String),
}

/// A density unit accepted by [`convert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    DotsPerInch,
    DotsPerCm,
    PixelsPerMeter,
}

impl FromStr for Unit {
    type Err = UnitError;

    /// Parse the literal unit tags callers pass over string boundaries:
    /// `"dpi"`/`"dots/inch"`, `"dpcm"`/`"dots/cm"`, `"pixels/meter"`.
    fn from_str(s: &str) -> Result<Self, UnitError> {
        match s {
            "dpi" | "dots/inch" => Ok(Unit::DotsPerInch),
            "dpcm" | "dots/cm" => Ok(Unit::DotsPerCm),
            "pixels/meter" => Ok(Unit::PixelsPerMeter),
            other => Err(UnitError::Unsupported(other.to_string())),
        }
    }
}

/// Convert a density value between units.
pub fn convert(value: f64, from: Unit, to: Unit) -> f64 {
    let dpi = match from {
        Unit::DotsPerInch => value,
        Unit::DotsPerCm => value * CM_PER_INCH,
        Unit::PixelsPerMeter => value * INCHES_TO_METERS,
    };
    match to {
        Unit::DotsPerInch => dpi,
        Unit::DotsPerCm => dpi / CM_PER_INCH,
        Unit::PixelsPerMeter => dpi / INCHES_TO_METERS,
    }
}

/// String-tag front end for [`convert`].
///
/// Fails with [`UnitError::Unsupported`] when either tag is unrecognized.
pub fn convert_dpi_value(value: f64, from_unit: &str, to_unit: &str) -> Result<f64, UnitError> {
    let from = from_unit.parse()?;
    let to = to_unit.parse()?;
    Ok(convert(value, from, to))
}

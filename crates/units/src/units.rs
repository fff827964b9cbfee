// internal modules
use crate::error::{Error, Result};
use crate::parsers;
use crate::registry::{lookup, Dimension, UnitDefinition};

// external crates
use log::trace;

/// A parsed unit string
///
/// Any magnitude in front of the symbol is kept separately, so `"2.5 mm"` is a
/// magnitude of `2.5` and the `mm` definition.
///
/// ```rust
/// # use nxtools_units::{parse_units, Dimension};
/// let units = parse_units("2.5 mm").unwrap();
/// assert_eq!(units.magnitude, 2.5);
/// assert_eq!(units.symbol(), "mm");
/// assert_eq!(units.dimension(), Dimension::Length);
/// assert_eq!(units.factor(), 0.0025);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Units {
    /// Leading magnitude, 1.0 when none was given
    pub magnitude: f64,
    /// Registry definition of the symbol
    pub definition: &'static UnitDefinition,
}

impl Units {
    /// Unit symbol without the magnitude
    pub fn symbol(&self) -> &'static str {
        self.definition.symbol
    }

    /// Physical dimension of the unit
    pub fn dimension(&self) -> Dimension {
        self.definition.dimension
    }

    /// Multiplier to the SI base unit, including the magnitude
    pub fn factor(&self) -> f64 {
        self.magnitude * self.definition.factor
    }
}

/// Parse a unit string into its magnitude and registry definition
pub fn parse_units(units: &str) -> Result<Units> {
    let (_, (magnitude, symbol)) =
        parsers::units(units).map_err(|_| Error::ParseError(units.to_string()))?;

    let definition = lookup(symbol).ok_or_else(|| Error::UnrecognisedUnits(units.to_string()))?;
    trace!("Parsed \"{units}\" as {magnitude:?} {}", definition.symbol);

    Ok(Units {
        magnitude: magnitude.unwrap_or(1.0),
        definition,
    })
}

fn parse_with_dimension(units: &str, expected: Dimension) -> Result<Units> {
    let parsed = parse_units(units)?;
    if parsed.dimension() != expected {
        return Err(Error::WrongDimensionality {
            units: units.to_string(),
            expected: expected.name(),
        });
    }
    Ok(parsed)
}

fn require_unit_magnitude(units: &str, parsed: &Units) -> Result<()> {
    if parsed.magnitude != 1.0 {
        return Err(Error::MagnitudeNotOne {
            units: units.to_string(),
            magnitude: parsed.magnitude,
        });
    }
    Ok(())
}

/// Factor to convert a length in `units` to metres
///
/// ```rust
/// # use nxtools_units::calculate_unit_conversion_factor;
/// assert_eq!(calculate_unit_conversion_factor("m").unwrap(), 1.0);
/// assert_eq!(calculate_unit_conversion_factor("km").unwrap(), 1000.0);
/// assert!(calculate_unit_conversion_factor("deg").is_err());
/// ```
pub fn calculate_unit_conversion_factor(units: &str) -> Result<f64> {
    Ok(parse_with_dimension(units, Dimension::Length)?.factor())
}

/// Factor to convert an angle in `units` to radians
///
/// ```rust
/// # use nxtools_units::angle_conversion_factor;
/// assert_eq!(angle_conversion_factor("rad").unwrap(), 1.0);
/// assert_eq!(angle_conversion_factor("degrees").unwrap(), std::f64::consts::PI / 180.0);
/// ```
pub fn angle_conversion_factor(units: &str) -> Result<f64> {
    Ok(parse_with_dimension(units, Dimension::Angle)?.factor())
}

/// Check that a unit string is a recognised length with a magnitude of one
pub fn validate_length_units(units: &str) -> Result<()> {
    let parsed = parse_with_dimension(units, Dimension::Length)?;
    require_unit_magnitude(units, &parsed)
}

/// Check that a unit string is a recognised angle with a magnitude of one
pub fn validate_angle_units(units: &str) -> Result<()> {
    let parsed = parse_with_dimension(units, Dimension::Angle)?;
    require_unit_magnitude(units, &parsed)
}

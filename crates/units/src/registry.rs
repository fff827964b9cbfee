/// Physical dimension of a unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dimension {
    /// Converts to metres
    Length,
    /// Converts to radians
    Angle,
}

impl Dimension {
    /// Lowercase name used in messages
    pub fn name(&self) -> &'static str {
        match self {
            Dimension::Length => "length",
            Dimension::Angle => "angle",
        }
    }
}

impl std::fmt::Display for Dimension {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A recognised unit symbol and its factor to the SI base unit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitDefinition {
    /// Symbol or name as it appears in a file
    pub symbol: &'static str,
    /// Physical dimension
    pub dimension: Dimension,
    /// Multiplier to metres or radians
    pub factor: f64,
}

const fn length(symbol: &'static str, factor: f64) -> UnitDefinition {
    UnitDefinition {
        symbol,
        dimension: Dimension::Length,
        factor,
    }
}

const fn angle(symbol: &'static str, factor: f64) -> UnitDefinition {
    UnitDefinition {
        symbol,
        dimension: Dimension::Angle,
        factor,
    }
}

/// Every unit symbol understood by the parser
pub const UNIT_REGISTRY: &[UnitDefinition] = &[
    // metres and SI multiples
    length("m", 1.0),
    length("metre", 1.0),
    length("metres", 1.0),
    length("meter", 1.0),
    length("meters", 1.0),
    length("km", 1e3),
    length("cm", 1e-2),
    length("mm", 1e-3),
    length("um", 1e-6),
    length("µm", 1e-6),
    length("micrometre", 1e-6),
    length("micrometres", 1e-6),
    length("micron", 1e-6),
    length("microns", 1e-6),
    length("nm", 1e-9),
    length("pm", 1e-12),
    length("angstrom", 1e-10),
    length("Angstrom", 1e-10),
    length("Å", 1e-10),
    // imperial
    length("in", 0.0254),
    length("inch", 0.0254),
    length("inches", 0.0254),
    length("ft", 0.3048),
    length("foot", 0.3048),
    length("feet", 0.3048),
    length("yd", 0.9144),
    // angles
    angle("rad", 1.0),
    angle("radian", 1.0),
    angle("radians", 1.0),
    angle("deg", std::f64::consts::PI / 180.0),
    angle("degree", std::f64::consts::PI / 180.0),
    angle("degrees", std::f64::consts::PI / 180.0),
];

/// Find the definition for a bare unit symbol
pub(crate) fn lookup(symbol: &str) -> Option<&'static UnitDefinition> {
    UNIT_REGISTRY.iter().find(|u| u.symbol == symbol)
}

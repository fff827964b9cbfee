// standard library
use std::str::FromStr;

// crate modules
use crate::dataset::Dataset;
use crate::error::Error;
use crate::instrument::{ComponentId, TransformId};
use crate::node::{Attributes, Node};
use crate::value::Value;

// nxtools modules
use nxtools_units::{angle_conversion_factor, calculate_unit_conversion_factor};
use nxtools_utils::{f, StringExt};

// external crates
use log::warn;
use nalgebra::{Matrix4, Rotation3, Unit, Vector3};

/// Attribute naming the kind of transformation
pub const TRANSFORMATION_TYPE: &str = "transformation_type";

/// Attribute holding the transformation axis
pub const VECTOR: &str = "vector";

/// Attribute or field naming a dependency
pub const DEPENDS_ON: &str = "depends_on";

/// Attribute holding units
pub const UNITS: &str = "units";

/// Kind of transformation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransformationType {
    /// Move along `vector` by `ui_value`
    Translation,
    /// Rotate about `vector` by `ui_value`
    Rotation,
}

impl TransformationType {
    /// Name used in the `transformation_type` attribute
    pub fn name(&self) -> &'static str {
        match self {
            TransformationType::Translation => "translation",
            TransformationType::Rotation => "rotation",
        }
    }
}

impl FromStr for TransformationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "translation" => Ok(TransformationType::Translation),
            "rotation" => Ok(TransformationType::Rotation),
            _ => Err(f!("unknown transformation type \"{s}\"")),
        }
    }
}

impl std::fmt::Display for TransformationType {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.name().capitalise())
    }
}

/// Anything that can name a transformation in its dependency field
///
/// Every variant corresponds to exactly one edge in the model, so a
/// transformation's dependents are simply the edges that point at it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dependent {
    /// `depends_on` of another transformation
    Transform(TransformId),
    /// `depends_on` field of a component
    Component(ComponentId),
    /// `dependent_transform` of a component attached to a transform parent
    Attachment(ComponentId),
}

/// A single translation or rotation in a depends_on chain
///
/// The magnitude lives in the values of the underlying [Dataset], with the
/// semantic attributes kept alongside. Graph edges are only changed through
/// the [Instrument](crate::Instrument) so that `depends_on` and `dependents`
/// always agree.
#[derive(Debug, Clone, PartialEq)]
pub struct Transformation {
    dataset: Dataset,
    kind: TransformationType,
    vector: Vector3<f64>,
    units: String,
    ui_value: f64,
    owner: ComponentId,
    pub(crate) depends_on: Option<TransformId>,
    pub(crate) dependents: Vec<Dependent>,
}

impl Transformation {
    pub(crate) fn new(
        name: &str,
        kind: TransformationType,
        magnitude: f64,
        units: &str,
        vector: Vector3<f64>,
        owner: ComponentId,
    ) -> Self {
        Self {
            dataset: Dataset::new(name, magnitude),
            kind,
            vector,
            units: units.to_string(),
            ui_value: magnitude,
            owner,
            depends_on: None,
            dependents: Vec::new(),
        }
    }

    pub(crate) fn set_name(&mut self, name: &str) {
        self.dataset.name = name.to_string();
    }

    /// Kind of transformation
    pub fn kind(&self) -> TransformationType {
        self.kind
    }

    /// Axis of the transformation
    pub fn vector(&self) -> Vector3<f64> {
        self.vector
    }

    /// Length units for translations, angle units for rotations
    pub fn units(&self) -> &str {
        &self.units
    }

    /// Magnitude or angle
    ///
    /// Taken from the stored values when they hold a number, otherwise the
    /// last value set directly.
    pub fn ui_value(&self) -> f64 {
        self.dataset.values.as_f64().unwrap_or(self.ui_value)
    }

    /// Stored values
    pub fn values(&self) -> &Value {
        &self.dataset.values
    }

    /// Underlying dataset
    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// Component that owns this transformation
    pub fn owner(&self) -> ComponentId {
        self.owner
    }

    /// Transformation this one is applied after, or `None` for the origin
    pub fn depends_on(&self) -> Option<TransformId> {
        self.depends_on
    }

    /// Everything whose dependency field names this transformation
    pub fn dependents(&self) -> &[Dependent] {
        &self.dependents
    }

    /// True if anything depends on this transformation
    pub fn has_dependents(&self) -> bool {
        !self.dependents.is_empty()
    }

    /// Change the kind of transformation
    pub fn set_kind(&mut self, kind: TransformationType) {
        self.kind = kind;
    }

    /// Change the axis
    pub fn set_vector(&mut self, vector: Vector3<f64>) {
        self.vector = vector;
    }

    /// Change the units
    pub fn set_units(&mut self, units: &str) {
        self.units = units.to_string();
    }

    /// Set the magnitude or angle, replacing the stored values with a scalar
    pub fn set_ui_value(&mut self, value: f64) {
        self.ui_value = value;
        self.dataset.values = Value::from(value);
    }

    /// Replace the stored values
    ///
    /// The cached magnitude follows the new values if they are numeric.
    pub fn set_values(&mut self, values: Value) {
        if let Some(value) = values.as_f64() {
            self.ui_value = value;
        }
        self.dataset.values = values;
    }

    /// Homogeneous matrix of this transformation, in metres
    ///
    /// Translations move by `ui_value` along the normalised `vector`, and
    /// rotations turn by `ui_value` about `vector`. Unrecognised units are
    /// treated as metres or degrees.
    ///
    /// ```rust
    /// # use nxtools_model::{ComponentType, Instrument};
    /// # use nalgebra::{Point3, Vector3};
    /// let mut instrument = Instrument::new();
    /// let detector = instrument.add_component("detector", ComponentType::Detector).unwrap();
    /// let t = instrument
    ///     .add_translation(detector, Vector3::new(0.0, 0.0, 2.0), None, None)
    ///     .unwrap();
    ///
    /// let matrix = instrument.transform(t).unwrap().matrix();
    /// assert_eq!(matrix.transform_point(&Point3::origin()), Point3::new(0.0, 0.0, 2.0));
    /// ```
    pub fn matrix(&self) -> Matrix4<f64> {
        match self.kind {
            TransformationType::Translation => {
                let factor = calculate_unit_conversion_factor(&self.units).unwrap_or_else(|_| {
                    warn!(
                        "Unrecognised units \"{}\" on translation {}, assuming metres",
                        self.units,
                        self.name()
                    );
                    1.0
                });
                let direction = self
                    .vector
                    .try_normalize(f64::EPSILON)
                    .unwrap_or_else(Vector3::zeros);
                Matrix4::new_translation(&(direction * self.ui_value() * factor))
            }
            TransformationType::Rotation => {
                let factor = angle_conversion_factor(&self.units).unwrap_or_else(|_| {
                    warn!(
                        "Unrecognised units \"{}\" on rotation {}, assuming degrees",
                        self.units,
                        self.name()
                    );
                    std::f64::consts::PI / 180.0
                });
                match Unit::try_new(self.vector, f64::EPSILON) {
                    Some(axis) => {
                        Rotation3::from_axis_angle(&axis, self.ui_value() * factor).to_homogeneous()
                    }
                    None => {
                        warn!("Rotation {} has no axis, ignoring it", self.name());
                        Matrix4::identity()
                    }
                }
            }
        }
    }
}

impl Node for Transformation {
    fn name(&self) -> &str {
        &self.dataset.name
    }

    fn attributes(&self) -> &Attributes {
        &self.dataset.attributes
    }

    fn attributes_mut(&mut self) -> &mut Attributes {
        &mut self.dataset.attributes
    }
}

impl From<TransformationType> for Value {
    fn from(kind: TransformationType) -> Self {
        Value::from(kind.name())
    }
}

impl TryFrom<&Value> for TransformationType {
    type Error = Error;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        value
            .as_str()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| Error::ValueTypeMismatch(value.dtype().to_string()))
    }
}

#[cfg(test)]
mod transformation_tests {
    use super::*;
    use nalgebra::Point3;
    use slotmap::KeyData;

    fn owner() -> ComponentId {
        ComponentId::from(KeyData::from_ffi(1))
    }

    #[test]
    fn type_names() {
        assert_eq!(TransformationType::Rotation.to_string(), "Rotation");
        assert_eq!(TransformationType::Rotation.name(), "rotation");
        assert_eq!(
            "Translation".parse::<TransformationType>(),
            Ok(TransformationType::Translation)
        );
        assert!("shear".parse::<TransformationType>().is_err());
    }

    #[test]
    fn ui_value_follows_values() {
        let mut t = Transformation::new(
            "offset",
            TransformationType::Translation,
            1.0,
            "m",
            Vector3::x(),
            owner(),
        );
        assert_eq!(t.ui_value(), 1.0);

        t.set_values(Value::from(4_i64));
        assert_eq!(t.ui_value(), 4.0);

        // text values fall back to the cached number
        t.set_values(Value::from("/entry/stream"));
        assert_eq!(t.ui_value(), 4.0);
    }

    #[test]
    fn translation_matrix_uses_units() {
        let t = Transformation::new(
            "offset",
            TransformationType::Translation,
            500.0,
            "mm",
            Vector3::new(0.0, 2.0, 0.0),
            owner(),
        );
        let p = t.matrix().transform_point(&Point3::origin());
        assert!((p - Point3::new(0.0, 0.5, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn rotation_matrix_in_degrees() {
        let t = Transformation::new(
            "spin",
            TransformationType::Rotation,
            90.0,
            "degrees",
            Vector3::z(),
            owner(),
        );
        let p = t.matrix().transform_point(&Point3::new(1.0, 0.0, 0.0));
        assert!((p - Point3::new(0.0, 1.0, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn rotation_without_axis_is_identity() {
        let t = Transformation::new(
            "spin",
            TransformationType::Rotation,
            90.0,
            "deg",
            Vector3::zeros(),
            owner(),
        );
        assert_eq!(t.matrix(), Matrix4::identity());
    }
}

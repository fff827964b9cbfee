// nxtools modules
use nxtools_utils::{f, StringExt};

/// Catalog of component types
///
/// Each type corresponds to a NeXus base class, `NX` followed by the type name
/// in snake case.
///
/// ```rust
/// # use nxtools_model::ComponentType;
/// assert_eq!(ComponentType::DiskChopper.nx_class(), "NXdisk_chopper");
/// assert_eq!(ComponentType::from_nx_class("NXsample"), Some(ComponentType::Sample));
/// assert!(ComponentType::Detector.supports_pixel_data());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentType {
    Aperture,
    Attenuator,
    BeamStop,
    Collimator,
    Crystal,
    Detector,
    DetectorModule,
    DiskChopper,
    FermiChopper,
    Filter,
    Guide,
    Mirror,
    Moderator,
    Monitor,
    Monochromator,
    Polarizer,
    Positioner,
    Sample,
    Sensor,
    Slit,
    Source,
    VelocitySelector,
}

impl ComponentType {
    /// Every component type in the catalog
    pub const ALL: [ComponentType; 22] = [
        ComponentType::Aperture,
        ComponentType::Attenuator,
        ComponentType::BeamStop,
        ComponentType::Collimator,
        ComponentType::Crystal,
        ComponentType::Detector,
        ComponentType::DetectorModule,
        ComponentType::DiskChopper,
        ComponentType::FermiChopper,
        ComponentType::Filter,
        ComponentType::Guide,
        ComponentType::Mirror,
        ComponentType::Moderator,
        ComponentType::Monitor,
        ComponentType::Monochromator,
        ComponentType::Polarizer,
        ComponentType::Positioner,
        ComponentType::Sample,
        ComponentType::Sensor,
        ComponentType::Slit,
        ComponentType::Source,
        ComponentType::VelocitySelector,
    ];

    /// Type name, e.g. `DiskChopper`
    pub fn name(&self) -> &'static str {
        match self {
            ComponentType::Aperture => "Aperture",
            ComponentType::Attenuator => "Attenuator",
            ComponentType::BeamStop => "BeamStop",
            ComponentType::Collimator => "Collimator",
            ComponentType::Crystal => "Crystal",
            ComponentType::Detector => "Detector",
            ComponentType::DetectorModule => "DetectorModule",
            ComponentType::DiskChopper => "DiskChopper",
            ComponentType::FermiChopper => "FermiChopper",
            ComponentType::Filter => "Filter",
            ComponentType::Guide => "Guide",
            ComponentType::Mirror => "Mirror",
            ComponentType::Moderator => "Moderator",
            ComponentType::Monitor => "Monitor",
            ComponentType::Monochromator => "Monochromator",
            ComponentType::Polarizer => "Polarizer",
            ComponentType::Positioner => "Positioner",
            ComponentType::Sample => "Sample",
            ComponentType::Sensor => "Sensor",
            ComponentType::Slit => "Slit",
            ComponentType::Source => "Source",
            ComponentType::VelocitySelector => "VelocitySelector",
        }
    }

    /// NeXus class name
    pub fn nx_class(&self) -> String {
        f!("NX{}", self.name().to_snake_case())
    }

    /// Look up a type from its NeXus class name
    pub fn from_nx_class(nx_class: &str) -> Option<ComponentType> {
        Self::ALL.into_iter().find(|t| t.nx_class() == nx_class)
    }

    /// Only detectors can carry pixel data
    pub fn supports_pixel_data(&self) -> bool {
        matches!(self, ComponentType::Detector | ComponentType::DetectorModule)
    }

    /// Samples sit directly in the entry rather than in the instrument
    pub fn is_sample(&self) -> bool {
        matches!(self, ComponentType::Sample)
    }
}

impl std::fmt::Display for ComponentType {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod component_type_tests {
    use super::*;

    #[test]
    fn class_names() {
        assert_eq!(ComponentType::Sample.nx_class(), "NXsample");
        assert_eq!(ComponentType::BeamStop.nx_class(), "NXbeam_stop");
        assert_eq!(ComponentType::VelocitySelector.nx_class(), "NXvelocity_selector");
    }

    #[test]
    fn every_class_maps_back() {
        for t in ComponentType::ALL {
            assert_eq!(ComponentType::from_nx_class(&t.nx_class()), Some(t));
        }
        assert_eq!(ComponentType::from_nx_class("NXinstrument"), None);
    }
}

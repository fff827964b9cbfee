// standard library
use std::collections::HashSet;

// crate modules
use crate::component::Component;
use crate::error::{Error, Result};
use crate::instrument::{ComponentId, Instrument, TransformId};
use crate::node::Node;

// external crates
use log::trace;
use nalgebra::Matrix4;

/// Transformation of a parent that children attach to by default
///
/// This is the parent's last local transformation, which is the head of its
/// chain when transformations are added in order. `None` if the parent has no
/// transformations, in which case the walk carries on to its own parent.
pub fn default_dependent_transform(parent: &Component) -> Option<TransformId> {
    parent.transforms().last().copied()
}

impl Instrument {
    /// Every transformation applied to a component, nearest first
    ///
    /// The walk starts at the component's `depends_on` and follows each
    /// transformation's `depends_on` in turn. With `local_only` it stops at the
    /// first transformation owned by another component. Otherwise, whenever a
    /// chain runs out it carries on from the transform parent of the component
    /// it ran out in, at the dependent transform or the parent's last
    /// transformation.
    ///
    /// Revisiting a transformation or a component is an error.
    ///
    /// ```rust
    /// # use nxtools_model::{ComponentType, Instrument};
    /// # use nalgebra::Vector3;
    /// let mut instrument = Instrument::new();
    /// let a = instrument.add_component("a", ComponentType::Source).unwrap();
    /// let b = instrument.add_component("b", ComponentType::Monitor).unwrap();
    ///
    /// let t1 = instrument.add_translation(a, Vector3::x(), None, None).unwrap();
    /// let t2 = instrument.add_rotation(a, Vector3::z(), 90.0, None, Some(t1)).unwrap();
    /// let t3 = instrument.add_translation(b, Vector3::y(), None, None).unwrap();
    /// instrument.set_transform_parent(b, Some(a), Some(t2)).unwrap();
    ///
    /// assert_eq!(instrument.resolve_chain(b, false).unwrap(), vec![t3, t2, t1]);
    /// assert_eq!(instrument.resolve_chain(b, true).unwrap(), vec![t3]);
    /// ```
    pub fn resolve_chain(&self, component: ComponentId, local_only: bool) -> Result<Vec<TransformId>> {
        let start = self.component(component)?.depends_on();
        self.walk(component, start, local_only)
    }

    /// Transformation in the nearest ancestor that a component's chain joins
    ///
    /// `None` for a root, or if no ancestor has any transformations.
    pub fn ancestral_dependent_transform(&self, component: ComponentId) -> Result<Option<TransformId>> {
        let mut visited = HashSet::new();
        let mut current = component;

        loop {
            let c = self.component(current)?;
            let Some(parent) = c.transform_parent().filter(|p| *p != current) else {
                return Ok(None);
            };

            if !visited.insert(current) {
                return Err(Error::CyclicTransformParent(c.name().to_string()));
            }

            let attach = c
                .dependent_transform()
                .or_else(|| default_dependent_transform(self.component(parent).ok()?));
            if attach.is_some() {
                return Ok(attach);
            }

            current = parent;
        }
    }

    /// Pose of a component in metres, composed from the full chain
    ///
    /// The nearest transformation is applied first, so the matrix maps points
    /// in the component's frame to the global frame.
    pub fn absolute_transform(&self, component: ComponentId) -> Result<Matrix4<f64>> {
        self.resolve_chain(component, false)?
            .iter()
            .rev()
            .try_fold(Matrix4::identity(), |matrix, id| {
                Ok(matrix * self.transform(*id)?.matrix())
            })
    }

    pub(crate) fn walk(
        &self,
        component: ComponentId,
        start: Option<TransformId>,
        local_only: bool,
    ) -> Result<Vec<TransformId>> {
        let mut chain = Vec::new();
        let mut seen_transforms = HashSet::new();
        let mut seen_components = HashSet::new();
        let mut current = component;
        let mut next = start;

        loop {
            match next {
                Some(id) => {
                    let t = self.transform(id)?;
                    if local_only && t.owner() != component {
                        break;
                    }
                    if !seen_transforms.insert(id) {
                        return Err(Error::CyclicDependsOn(t.name().to_string()));
                    }
                    chain.push(id);
                    current = t.owner();
                    next = t.depends_on();
                }
                None if local_only => break,
                None => {
                    let c = self.component(current)?;
                    let Some(parent) = c.transform_parent().filter(|p| *p != current) else {
                        break;
                    };
                    if !seen_components.insert(current) {
                        return Err(Error::CyclicTransformParent(c.name().to_string()));
                    }

                    trace!("Chain of \"{}\" continues in its transform parent", c.name());
                    next = match c.dependent_transform() {
                        Some(id) => Some(id),
                        None => default_dependent_transform(self.component(parent)?),
                    };
                    current = parent;
                }
            }
        }

        Ok(chain)
    }
}

#[cfg(test)]
mod chain_tests {
    use super::*;
    use crate::ComponentType;
    use nalgebra::{Point3, Vector3};

    #[test]
    fn default_is_last_local_transform() {
        let mut instrument = Instrument::new();
        let a = instrument.add_component("a", ComponentType::Source).unwrap();
        assert_eq!(default_dependent_transform(instrument.component(a).unwrap()), None);

        let t1 = instrument.add_translation(a, Vector3::x(), None, None).unwrap();
        let t2 = instrument.add_translation(a, Vector3::y(), None, Some(t1)).unwrap();
        assert_eq!(default_dependent_transform(instrument.component(a).unwrap()), Some(t2));
    }

    #[test]
    fn walk_skips_parents_without_transforms() {
        let mut instrument = Instrument::new();
        let a = instrument.add_component("a", ComponentType::Source).unwrap();
        let b = instrument.add_component("b", ComponentType::Guide).unwrap();
        let c = instrument.add_component("c", ComponentType::Monitor).unwrap();

        let t1 = instrument.add_translation(a, Vector3::x(), None, None).unwrap();
        instrument.set_transform_parent(b, Some(a), None).unwrap();
        instrument.set_transform_parent(c, Some(b), None).unwrap();

        assert_eq!(instrument.resolve_chain(c, false).unwrap(), vec![t1]);
        assert_eq!(instrument.ancestral_dependent_transform(c).unwrap(), Some(t1));
        assert!(instrument.resolve_chain(c, true).unwrap().is_empty());
    }

    #[test]
    fn absolute_transform_applies_nearest_first() {
        let mut instrument = Instrument::new();
        let a = instrument.add_component("a", ComponentType::Sample).unwrap();

        // rotate the frame, then move along the rotated x axis
        let spin = instrument.add_rotation(a, Vector3::z(), 90.0, None, None).unwrap();
        instrument
            .add_translation(a, Vector3::new(2.0, 0.0, 0.0), None, Some(spin))
            .unwrap();

        let p = instrument
            .absolute_transform(a)
            .unwrap()
            .transform_point(&Point3::origin());
        assert!((p - Point3::new(0.0, 2.0, 0.0)).norm() < 1e-12);
    }
}

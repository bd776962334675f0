//! Opaque / transparent classification of a frame's mesh instances
//!
//! Bins hold indices into the frame's mesh list, so the classifier keeps its
//! allocations from frame to frame without borrowing any frame data.

use crate::render::api::MeshInstance;

/// Capacity reserved per submitted mesh when a bin has to grow
const RESERVE_FACTOR: usize = 10;

/// Stable partition of mesh instances by material transparency
#[derive(Debug, Default)]
pub struct GeometryClassifier {
    opaque: Vec<usize>,
    transparent: Vec<usize>,
}

impl GeometryClassifier {
    /// Create an empty classifier
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild both bins from `meshes`
    ///
    /// Every instance lands in exactly one bin; relative submission order is
    /// kept inside each bin.
    pub fn classify(&mut self, meshes: &[MeshInstance<'_>]) {
        self.opaque.clear();
        self.transparent.clear();

        let wanted = meshes.len() * RESERVE_FACTOR;
        if self.opaque.capacity() < meshes.len() {
            self.opaque.reserve(wanted);
        }
        if self.transparent.capacity() < meshes.len() {
            self.transparent.reserve(wanted);
        }

        for (index, instance) in meshes.iter().enumerate() {
            if instance.is_transparent() {
                self.transparent.push(index);
            } else {
                self.opaque.push(index);
            }
        }
    }

    /// Indices of opaque instances in submission order
    pub fn opaque(&self) -> &[usize] {
        &self.opaque
    }

    /// Indices of transparent instances in submission order
    pub fn transparent(&self) -> &[usize] {
        &self.transparent
    }

    /// Total number of classified instances
    pub fn len(&self) -> usize {
        self.opaque.len() + self.transparent.len()
    }

    /// Whether nothing was classified
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Mat4;
    use crate::render::api::GeometryHandle;
    use crate::render::primitives::{Material, Mesh};

    fn meshes(pattern: &[bool]) -> Vec<Mesh> {
        pattern
            .iter()
            .enumerate()
            .map(|(i, &transparent)| {
                Mesh::new(
                    GeometryHandle(i as u64),
                    Material::default().with_transparency(transparent),
                )
            })
            .collect()
    }

    fn instances(meshes: &[Mesh]) -> Vec<MeshInstance<'_>> {
        meshes.iter().map(|m| MeshInstance::new(Mat4::identity(), m)).collect()
    }

    #[test]
    fn test_partition_is_total_and_stable() {
        let meshes = meshes(&[false, true, false, true, true, false]);
        let mut classifier = GeometryClassifier::new();
        classifier.classify(&instances(&meshes));

        assert_eq!(classifier.opaque(), &[0, 2, 5]);
        assert_eq!(classifier.transparent(), &[1, 3, 4]);
        assert_eq!(classifier.len(), meshes.len());
    }

    #[test]
    fn test_every_index_appears_exactly_once() {
        let pattern: Vec<bool> = (0..37).map(|i| i % 3 == 0 || i % 7 == 0).collect();
        let meshes = meshes(&pattern);
        let mut classifier = GeometryClassifier::new();
        classifier.classify(&instances(&meshes));

        let mut seen: Vec<usize> = classifier
            .opaque()
            .iter()
            .chain(classifier.transparent())
            .copied()
            .collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..37).collect::<Vec<_>>());

        assert!(classifier.opaque().windows(2).all(|w| w[0] < w[1]));
        assert!(classifier.transparent().windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_bins_are_rebuilt_each_frame() {
        let first = meshes(&[true, true, true]);
        let second = meshes(&[false]);
        let mut classifier = GeometryClassifier::new();

        classifier.classify(&instances(&first));
        assert_eq!(classifier.transparent().len(), 3);

        classifier.classify(&instances(&second));
        assert_eq!(classifier.opaque(), &[0]);
        assert!(classifier.transparent().is_empty());
    }

    #[test]
    fn test_empty_frame() {
        let mut classifier = GeometryClassifier::new();
        classifier.classify(&[]);
        assert!(classifier.is_empty());
    }
}

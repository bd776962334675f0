//! Cascade split computation
//!
//! The camera frustum is cut along view depth into `count` slices. Split
//! distances blend a logarithmic distribution (good texel density near the
//! camera) with a uniform one (keeps far cascades from growing too large):
//!
//! ```text
//! s        = i / count
//! log      = near * (far / near)^s
//! uniform  = near + (far - near) * s
//! split[i] = lambda * log + (1 - lambda) * uniform
//! ```
//!
//! Each cascade's far bound is pushed past the next split by
//! [`CASCADE_OVERLAP`] so that neighbouring cascades overlap slightly and no
//! seam shows where the shader switches layers.

/// Relative overlap of a cascade's far bound past the next cascade's near bound
pub const CASCADE_OVERLAP: f32 = 1.005;

/// Most cascades the shadow and mesh shaders are compiled for
///
/// Matches `MAX_CASCADES` in the GLSL sources under `shaders/`.
pub const MAX_CASCADES: usize = 16;

/// Default blend factor between logarithmic and uniform splits
pub const DEFAULT_SPLIT_LAMBDA: f32 = 0.75;

/// Depth range of one shadow cascade in view-space distance
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CascadeSplit {
    /// Near distance
    pub near: f32,
    /// Far distance
    pub far: f32,
}

impl CascadeSplit {
    /// Depth extent of the cascade
    pub fn depth(&self) -> f32 {
        self.far - self.near
    }
}

/// Split the depth range `[near, far]` into `count` cascades, written into `splits`
///
/// `splits` is cleared first so a single buffer can be reused every frame.
///
/// # Panics
/// When `count` is zero or the planes do not satisfy `0 < near < far`; both
/// are programming errors of the caller.
pub fn compute_cascade_splits_into(
    near: f32,
    far: f32,
    count: usize,
    lambda: f32,
    splits: &mut Vec<CascadeSplit>,
) {
    assert!(count > 0, "shadow cascade count must be at least 1");
    assert!(near > 0.0 && far > near, "invalid camera planes: near {near}, far {far}");

    splits.clear();
    splits.resize(count, CascadeSplit::default());

    let ratio = far / near;
    splits[0].near = near;

    for i in 1..count {
        let s = i as f32 / count as f32;
        let log_split = near * ratio.powf(s);
        let uniform_split = near + (far - near) * s;
        let split = lambda * log_split + (1.0 - lambda) * uniform_split;

        splits[i].near = split;
        splits[i - 1].far = split * CASCADE_OVERLAP;
    }

    splits[count - 1].far = far;
}

/// Split the depth range `[near, far]` into `count` cascades
///
/// See [`compute_cascade_splits_into`].
pub fn compute_cascade_splits(near: f32, far: f32, count: usize, lambda: f32) -> Vec<CascadeSplit> {
    let mut splits = Vec::with_capacity(count);
    compute_cascade_splits_into(near, far, count, lambda, &mut splits);
    splits
}

//! Cascaded shadow map math
//!
//! Split computation and light-space matrix fitting. Both are pure functions
//! of the camera and light parameters; the shadow pass consumes their output.

pub mod cascades;
pub mod light_space;

pub use cascades::{compute_cascade_splits, compute_cascade_splits_into, CascadeSplit, CASCADE_OVERLAP, DEFAULT_SPLIT_LAMBDA, MAX_CASCADES};
pub use light_space::{
    frustum_corners_world_space, light_space_matrices, light_space_matrices_into, light_space_matrix,
    CascadeFrustum, DEFAULT_Z_MULTIPLIER,
};

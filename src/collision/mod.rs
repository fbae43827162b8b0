pub mod interact;
pub mod spatial;

pub use interact::{interact, interact_all, Interaction};
pub use spatial::SpatialHash;

/// Pairs closer than this have no usable normal and are skipped.
pub const EPSILON: f64 = 1e-4;

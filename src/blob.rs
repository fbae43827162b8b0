use nalgebra::Vector2;
use rand::Rng;
use std::f64::consts::TAU;

use crate::color::{self, Rgb};

/// One slime body. Position is in page coordinates so bodies stay put while
/// the viewport scrolls.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Blob {
    /// Stable handle. Indices into the body list shift on merge and eviction.
    pub id: u64,
    pub position: Vector2<f64>,
    pub velocity: Vector2<f64>,
    pub radius: f64,
    pub mass: f64,
    pub color: Rgb,
    pub highlight: Rgb,
    pub alpha: f64,
    pub phase: f64,
    pub float_phase: f64,
    /// Spatial hash cell from the latest step.
    pub cell: (i32, i32),
}

impl Blob {
    pub fn new<R: Rng>(
        id: u64,
        position: Vector2<f64>,
        velocity: Vector2<f64>,
        radius: f64,
        base: Rgb,
        rng: &mut R,
    ) -> Blob {
        let (color, highlight) = color::vary(base, rng);
        Blob {
            id,
            position,
            velocity,
            radius,
            mass: radius * radius,
            color,
            highlight,
            alpha: rng.gen_range(0.85..1.15),
            phase: rng.gen_range(0.0..TAU),
            float_phase: rng.gen_range(0.0..TAU),
            cell: (0, 0),
        }
    }

    pub fn speed(&self) -> f64 {
        self.velocity.norm()
    }

    pub fn momentum(&self) -> Vector2<f64> {
        self.velocity * self.mass
    }
}

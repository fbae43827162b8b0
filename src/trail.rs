use legion::system;
use nalgebra::Vector2;

use crate::settings::{Scale, TrailConfig};

pub const MIN_EASING: f64 = 0.2;
pub const MAX_EASING: f64 = 0.85;

/// Pointer follower: a delay line of raw samples (`targets`) and the smoothed
/// positions that are actually drawn. Canvas coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct Trail {
    pointer: Option<Vector2<f64>>,
    targets: Vec<Option<Vector2<f64>>>,
    positions: Vec<Vector2<f64>>,
}

/// Per-slot responsiveness. Slot 0 follows tightest.
pub fn easing(config: &TrailConfig, slot: usize) -> f64 {
    (config.follow_base - config.follow_decay * slot as f64).clamp(MIN_EASING, MAX_EASING)
}

impl Trail {
    pub fn new(length: usize) -> Trail {
        Trail {
            pointer: None,
            targets: vec![None; length],
            positions: vec![Vector2::zeros(); length],
        }
    }

    pub fn is_tracking(&self) -> bool {
        self.pointer.is_some()
    }

    pub fn pointer(&self) -> Option<Vector2<f64>> {
        self.pointer
    }

    pub fn target(&self, slot: usize) -> Option<Vector2<f64>> {
        self.targets.get(slot).copied().flatten()
    }

    pub fn position(&self, slot: usize) -> Option<Vector2<f64>> {
        self.positions.get(slot).copied()
    }

    /// Records a pointer sample in client px. The first sample seeds every slot
    /// so the trail does not sweep in from the origin.
    pub fn set_pointer(&mut self, client_x: f64, client_y: f64, render_scale: f64) {
        let pointer = Vector2::new(client_x * render_scale, client_y * render_scale);
        self.pointer = Some(pointer);

        if self.targets.first().map_or(false, |t| t.is_none()) {
            for target in self.targets.iter_mut() {
                *target = Some(pointer);
            }
            for position in self.positions.iter_mut() {
                *position = pointer;
            }
        }
    }

    /// Pushes the latest pointer sample into slot 0, dropping the oldest.
    pub fn shift(&mut self) {
        if let Some(pointer) = self.pointer {
            if !self.targets.is_empty() {
                self.targets.rotate_right(1);
                self.targets[0] = Some(pointer);
            }
        }
    }

    /// Moves every seeded render position toward its target.
    pub fn follow(&mut self, config: &TrailConfig) {
        for (slot, (position, target)) in self
            .positions
            .iter_mut()
            .zip(self.targets.iter())
            .enumerate()
        {
            if let Some(target) = target {
                let t = easing(config, slot);
                *position += (target - *position) * t;
            }
        }
    }

    /// Drawable slots: render position with idle wobble applied, and the
    /// breathing radius.
    pub fn sprites<'a>(
        &'a self,
        config: &'a TrailConfig,
        scale: &'a Scale,
        time: f64,
    ) -> impl Iterator<Item = (Vector2<f64>, f64)> + 'a {
        let wobble = config.idle_wobble_px * scale.render_scale;
        self.positions
            .iter()
            .zip(self.targets.iter())
            .enumerate()
            .filter(|(_, (_, target))| target.is_some())
            .map(move |(slot, (position, _))| {
                let i = slot as f64;
                let offset = Vector2::new(
                    (time * config.wobble_speed + i * 0.9).sin() * wobble,
                    (time * config.wobble_speed + i * 1.15).cos() * wobble,
                );
                let breathe = 1. + config.breathe_amount * (time * config.breathe_speed + i).sin();
                (position + offset, scale.radius * breathe)
            })
    }

    /// Rescales stored samples after the render scale changes.
    pub fn rescale(&mut self, factor: f64) {
        if let Some(pointer) = self.pointer.as_mut() {
            *pointer *= factor;
        }
        for target in self.targets.iter_mut().flatten() {
            *target *= factor;
        }
        for position in self.positions.iter_mut() {
            *position *= factor;
        }
    }
}

#[system]
pub fn trail_update(#[resource] trail: &mut Trail, #[resource] config: &TrailConfig) {
    trail.shift();
    trail.follow(config);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::Metrics;

    #[test]
    fn easing_is_monotone_and_clamped() {
        for decay in [0., 0.005, 0.018, 0.05, 0.3, 1.] {
            for base in [0., 0.5, 0.9, 2.] {
                let config = TrailConfig {
                    follow_base: base,
                    follow_decay: decay,
                    ..TrailConfig::default()
                };
                let mut previous = f64::INFINITY;
                for slot in 0..64 {
                    let t = easing(&config, slot);
                    assert!((MIN_EASING..=MAX_EASING).contains(&t));
                    assert!(t <= previous);
                    previous = t;
                }
            }
        }
    }

    #[test]
    fn uninitialized_trail_draws_nothing() {
        let config = TrailConfig::default();
        let scale = Scale::compute(&config, &Metrics::default());
        let mut trail = Trail::new(config.trail_length);
        trail.shift();
        trail.follow(&config);
        assert!(!trail.is_tracking());
        assert_eq!(trail.sprites(&config, &scale, 0.).count(), 0);
    }

    #[test]
    fn first_pointer_seeds_every_slot() {
        let mut trail = Trail::new(5);
        trail.set_pointer(100., 50., 0.1);
        for slot in 0..5 {
            assert_eq!(trail.target(slot), Some(Vector2::new(10., 5.)));
            assert_eq!(trail.position(slot), Some(Vector2::new(10., 5.)));
        }
    }

    #[test]
    fn slot_zero_tracks_latest_sample() {
        let config = TrailConfig {
            trail_length: 4,
            ..TrailConfig::default()
        };
        let mut trail = Trail::new(config.trail_length);
        trail.set_pointer(0., 0., 1.);
        trail.shift();
        trail.set_pointer(40., 0., 1.);
        trail.shift();
        trail.follow(&config);

        assert_eq!(trail.target(0), Some(Vector2::new(40., 0.)));
        assert_eq!(trail.target(1), Some(Vector2::new(0., 0.)));
        let head = trail.position(0).unwrap();
        assert!((head.x - 20.).abs() < 1e-9);
        assert_eq!(trail.position(1), Some(Vector2::new(0., 0.)));
    }

    #[test]
    fn later_slots_lag_further_behind() {
        let config = TrailConfig::default();
        let mut trail = Trail::new(config.trail_length);
        trail.set_pointer(0., 0., 1.);
        for _ in 0..config.trail_length {
            trail.set_pointer(100., 0., 1.);
            trail.shift();
        }
        trail.follow(&config);
        let near = trail.position(0).unwrap().x;
        let far = trail.position(config.trail_length - 1).unwrap().x;
        assert!(near > far);
    }
}

use nalgebra::Vector2;

use super::{spatial::SpatialHash, EPSILON};
use crate::{blob::Blob, settings::SlimeConfig};

/// Share of the post-blend approach speed removed along the normal.
const CONTACT_IMPULSE: f64 = 0.25;
/// Relative speed at which the viscous blend saturates.
const MIX_SPEED: f64 = 6.;
const MIN_MIX: f64 = 0.12;
const MAX_MIX: f64 = 0.45;
const COHESION_SCALE: f64 = 0.04;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Interaction {
    Apart,
    Contact,
    Cohesion,
}

fn pair_mut(blobs: &mut [Blob], i: usize, j: usize) -> (&mut Blob, &mut Blob) {
    debug_assert!(i < j);
    let (head, tail) = blobs.split_at_mut(j);
    (&mut head[i], &mut tail[0])
}

/// Resolves every pair of bodies sharing a 3x3 block of cells. Each unordered
/// pair is visited once.
pub fn interact_all(blobs: &mut [Blob], hash: &SpatialHash, config: &SlimeConfig) -> usize {
    let mut contacts = 0;
    for i in 0..blobs.len() {
        let cell = blobs[i].cell;
        for j in hash.neighbourhood(cell) {
            if j <= i {
                continue;
            }
            let (a, b) = pair_mut(blobs, i, j);
            if interact(a, b, config) == Interaction::Contact {
                contacts += 1;
            }
        }
    }
    contacts
}

pub fn interact(a: &mut Blob, b: &mut Blob, config: &SlimeConfig) -> Interaction {
    let delta = b.position - a.position;
    let dist = delta.norm();
    let contact = a.radius + b.radius;
    let cohesion = contact + config.cohesion_px;

    if dist <= EPSILON || dist >= cohesion {
        return Interaction::Apart;
    }
    let normal = delta / dist;

    if dist < contact {
        resolve_contact(a, b, normal, contact - dist, config);
        Interaction::Contact
    } else {
        let t = (cohesion - dist) / config.cohesion_px;
        let pull = t * t * config.stickiness * COHESION_SCALE;
        a.velocity += normal * pull;
        b.velocity -= normal * pull;
        Interaction::Cohesion
    }
}

fn resolve_contact(
    a: &mut Blob,
    b: &mut Blob,
    normal: Vector2<f64>,
    overlap: f64,
    config: &SlimeConfig,
) {
    // Heavier bodies move less.
    let total_mass = a.mass + b.mass;
    let push_a = b.mass / total_mass;
    let push_b = a.mass / total_mass;
    a.position -= normal * (overlap * push_a);
    b.position += normal * (overlap * push_b);

    let rel_speed = (a.velocity - b.velocity).norm();
    let mix = (config.collision_mix + config.stickiness * (rel_speed / MIX_SPEED).clamp(0., 1.))
        .clamp(MIN_MIX, MAX_MIX);
    let va = a.velocity;
    a.velocity = a.velocity.lerp(&b.velocity, mix);
    b.velocity = b.velocity.lerp(&va, mix);

    let separating = (b.velocity - a.velocity).dot(&normal);
    if separating < 0. {
        let impulse = -separating * CONTACT_IMPULSE;
        a.velocity -= normal * (impulse * push_a);
        b.velocity += normal * (impulse * push_b);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::FALLBACK_RGB;
    use rand::SeedableRng;
    use rand_pcg::Pcg64;

    fn blob(id: u64, x: f64, y: f64, r: f64, vx: f64, vy: f64) -> Blob {
        let mut rng = Pcg64::seed_from_u64(id);
        let position = Vector2::new(x, y);
        Blob::new(id, position, Vector2::new(vx, vy), r, FALLBACK_RGB, &mut rng)
    }

    #[test]
    fn overlap_is_pushed_apart() {
        let config = SlimeConfig::default();
        let mut a = blob(1, 100., 100., 20., 0., 0.);
        let mut b = blob(2, 100. + 20. + 10. - 1., 100., 10., 0., 0.);
        let before = (b.position - a.position).norm();

        assert_eq!(interact(&mut a, &mut b, &config), Interaction::Contact);
        let after = (b.position - a.position).norm();
        assert!(after > before);
        assert!((after - 30.).abs() < 1e-9);
        // The heavier body moves a quarter as far as the lighter one.
        assert!((a.position.x - (100. - 0.2)).abs() < 1e-9);
        assert!((b.position.x - (129. + 0.8)).abs() < 1e-9);
        assert_eq!(a.velocity, Vector2::zeros());
        assert_eq!(b.velocity, Vector2::zeros());
    }

    #[test]
    fn contact_roughly_conserves_momentum() {
        let config = SlimeConfig::default();
        let mut a = blob(1, 0., 0., 15., 3., 0.);
        let mut b = blob(2, 25., 0., 15., -1., 0.);
        let before = a.momentum() + b.momentum();
        interact(&mut a, &mut b, &config);
        let after = a.momentum() + b.momentum();
        assert!((after - before).norm() < 1e-6 * before.norm().max(1.));
        // Viscous blend pulls the velocities together.
        assert!((a.velocity.x - b.velocity.x).abs() < 4.);
    }

    #[test]
    fn near_bodies_attract_softly() {
        let config = SlimeConfig::default();
        let mut a = blob(1, 0., 0., 10., 0., 0.);
        let mut b = blob(2, 25., 0., 10., 0., 0.);
        assert_eq!(interact(&mut a, &mut b, &config), Interaction::Cohesion);
        assert!(a.velocity.x > 0.);
        assert!(b.velocity.x < 0.);
        assert!(a.velocity.x < 0.01);
        assert_eq!(a.position, Vector2::new(0., 0.));
    }

    #[test]
    fn distant_and_coincident_bodies_are_ignored() {
        let config = SlimeConfig::default();
        let mut a = blob(1, 0., 0., 10., 1., 0.);
        let mut b = blob(2, 31., 0., 10., 0., 0.);
        assert_eq!(interact(&mut a, &mut b, &config), Interaction::Apart);
        assert_eq!(a.velocity, Vector2::new(1., 0.));

        let mut c = blob(3, 0., 0., 10., 0., 0.);
        assert_eq!(interact(&mut a, &mut c, &config), Interaction::Apart);
        assert_eq!(a.position, c.position);
    }

    #[test]
    fn interact_all_uses_the_grid() {
        let config = SlimeConfig::default();
        let mut blobs = vec![
            blob(1, 100., 100., 10., 0., 0.),
            blob(2, 115., 100., 10., 0., 0.),
            blob(3, 1000., 1000., 10., 0., 0.),
        ];
        let mut hash = SpatialHash::new(config.cell_size);
        hash.rebuild(&mut blobs);
        assert_eq!(interact_all(&mut blobs, &hash, &config), 1);
        assert!((blobs[1].position.x - blobs[0].position.x - 20.).abs() < 1e-9);
        assert_eq!(blobs[2].position, Vector2::new(1000., 1000.));
    }
}

use ordered_float::OrderedFloat;
use rand::Rng;

use crate::{blob::Blob, color::Rgb, settings::SlimeConfig};

const MIN_MERGED_ALPHA: f64 = 0.75;
const MAX_MERGED_ALPHA: f64 = 1.2;
/// Weight of combined radius in the pair score; small, close pairs go first.
const SIZE_WEIGHT: f64 = 0.25;

/// What a budget pass did to the population.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BudgetOutcome {
    pub merged: usize,
    pub evicted: usize,
}

impl BudgetOutcome {
    pub fn is_empty(&self) -> bool {
        self.merged == 0 && self.evicted == 0
    }
}

/// Samples random pairs and returns the best near-contact one as
/// `(lower, higher)` indices. Probabilistic: may miss a mergeable pair.
pub fn find_merge_pair<R: Rng>(
    blobs: &[Blob],
    config: &SlimeConfig,
    rng: &mut R,
) -> Option<(usize, usize)> {
    let len = blobs.len();
    if len < 2 {
        return None;
    }
    let tries = config
        .merge_trials_cap
        .min(len * config.merge_trials_per_body);

    (0..tries)
        .filter_map(|_| {
            let i = rng.gen_range(0..len);
            let mut j = rng.gen_range(0..len);
            if j == i {
                j = (j + 1) % len;
            }
            let (a, b) = (&blobs[i], &blobs[j]);
            let dist = (b.position - a.position).norm();
            if dist > a.radius + b.radius + config.merge_slack_px {
                return None;
            }
            let score = dist + (a.radius + b.radius) * SIZE_WEIGHT;
            Some((OrderedFloat(score), i.min(j), i.max(j)))
        })
        .min_by_key(|&(score, _, _)| score)
        .map(|(_, i, j)| (i, j))
}

/// Combines two bodies. Mass, momentum and area are conserved; color and
/// phases are drawn fresh.
pub fn merge<R: Rng>(a: &Blob, b: &Blob, id: u64, base: Rgb, rng: &mut R) -> Blob {
    let mass = a.mass + b.mass;
    let position = (a.position * a.mass + b.position * b.mass) / mass;
    let velocity = (a.velocity * a.mass + b.velocity * b.mass) / mass;
    let radius = (a.radius * a.radius + b.radius * b.radius).sqrt();

    let mut merged = Blob::new(id, position, velocity, radius, base, rng);
    merged.alpha = ((a.alpha + b.alpha) * 0.5).clamp(MIN_MERGED_ALPHA, MAX_MERGED_ALPHA);
    merged
}

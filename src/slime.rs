use legion::system;
use log::debug;
use nalgebra::Vector2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use std::f64::consts::TAU;

use crate::{
    advance::{advance_blobs, Bounds},
    blob::Blob,
    collision::{interact_all, SpatialHash},
    color::{Rgb, FALLBACK_RGB},
    host::Metrics,
    merge::{self, BudgetOutcome},
    settings::SlimeConfig,
};

/// Fraction of the main body's radius at which burst droplets start.
const MICRO_OFFSET: f64 = 0.35;

/// The live slime bodies and everything needed to step them.
///
/// Bodies are kept in insertion order, so index 0 is always the oldest. Merges
/// and evictions shift indices; use [`Blob::id`] to follow a body over time.
pub struct SlimeWorld {
    config: SlimeConfig,
    blobs: Vec<Blob>,
    last_id: u64,
    base: Rgb,
    hash: SpatialHash,
    rng: Pcg64,
}

impl SlimeWorld {
    pub fn new(config: SlimeConfig, seed: u64) -> SlimeWorld {
        SlimeWorld {
            config,
            blobs: Vec::with_capacity(config.max_bodies + 1),
            last_id: 0,
            base: FALLBACK_RGB,
            hash: SpatialHash::new(config.cell_size),
            rng: Pcg64::seed_from_u64(seed),
        }
    }

    pub fn config(&self) -> &SlimeConfig {
        &self.config
    }

    pub fn blobs(&self) -> &[Blob] {
        &self.blobs
    }

    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }

    pub fn get(&self, id: u64) -> Option<&Blob> {
        self.blobs.iter().find(|b| b.id == id)
    }

    /// Color new bodies are varied from. Read from the theme on resize.
    pub fn set_base_color(&mut self, base: Rgb) {
        self.base = base;
    }

    pub fn base_color(&self) -> Rgb {
        self.base
    }

    fn next_id(&mut self) -> u64 {
        self.last_id += 1;
        self.last_id
    }

    /// Adds one body and immediately enforces the population cap.
    pub fn add(
        &mut self,
        position: Vector2<f64>,
        velocity: Vector2<f64>,
        radius: f64,
    ) -> (u64, BudgetOutcome) {
        let id = self.next_id();
        let blob = Blob::new(id, position, velocity, radius, self.base, &mut self.rng);
        self.blobs.push(blob);
        (id, self.enforce_budget())
    }

    /// One main body at the click point plus a spray of smaller droplets.
    /// Client coordinates are shifted by the scroll offset into page space.
    pub fn spawn_burst(&mut self, client_x: f64, client_y: f64, scroll: Vector2<f64>) -> Vec<u64> {
        let origin = Vector2::new(client_x, client_y) + scroll;
        let config = self.config;
        let mut spawned = Vec::with_capacity(config.burst_max + 1);
        let mut outcome = BudgetOutcome::default();

        let main_r: f64 = config.base_r + self.rng.gen_range(-2.0..10.0);
        let drift: f64 = self.rng.gen_range(-2.0..2.0);
        let rise: f64 = self.rng.gen_range(2.5..4.5);
        let velocity = Vector2::new(drift, -rise);
        let (id, budget) = self.add(origin, velocity, main_r);
        spawned.push(id);
        outcome.merged += budget.merged;
        outcome.evicted += budget.evicted;

        let count = self.rng.gen_range(config.burst_min..=config.burst_max);
        for _ in 0..count {
            let angle: f64 = self.rng.gen_range(0.0..TAU);
            let speed: f64 = self.rng.gen_range(1.6..5.2);
            let radius: f64 = self.rng.gen_range(config.micro_r_min..config.micro_r_max);
            let direction = Vector2::new(angle.cos(), angle.sin());
            let lift: f64 = self.rng.gen_range(1.2..3.2);

            let position = origin + direction * (main_r * MICRO_OFFSET);
            let velocity = direction * speed - Vector2::new(0., lift);
            let (id, budget) = self.add(position, velocity, radius);
            spawned.push(id);
            outcome.merged += budget.merged;
            outcome.evicted += budget.evicted;
        }

        debug!(
            "Burst at ({:.0}, {:.0}): {} bodies, {} merged, {} evicted, {} live",
            origin.x,
            origin.y,
            spawned.len(),
            outcome.merged,
            outcome.evicted,
            self.blobs.len()
        );
        spawned
    }

    /// Merges (or, failing that, evicts the oldest) until the population fits.
    pub fn enforce_budget(&mut self) -> BudgetOutcome {
        let mut outcome = BudgetOutcome::default();
        while self.blobs.len() > self.config.max_bodies {
            if self.merge_one_pair() {
                outcome.merged += 1;
            } else {
                let evicted = self.blobs.remove(0);
                debug!("No merge candidate, evicting oldest body {}", evicted.id);
                outcome.evicted += 1;
            }
        }
        if !outcome.is_empty() {
            debug!(
                "Population over budget: {} merged, {} evicted",
                outcome.merged, outcome.evicted
            );
        }
        outcome
    }

    fn merge_one_pair(&mut self) -> bool {
        let (i, j) = match merge::find_merge_pair(&self.blobs, &self.config, &mut self.rng) {
            Some(pair) => pair,
            None => return false,
        };
        let id = self.next_id();
        let merged = merge::merge(&self.blobs[i], &self.blobs[j], id, self.base, &mut self.rng);
        self.blobs[i] = merged;
        self.blobs.remove(j);
        true
    }

    /// Integrates, rebuilds the spatial hash, then resolves contacts.
    /// Returns the number of overlapping pairs resolved.
    pub fn step(&mut self, metrics: &Metrics) -> usize {
        if self.blobs.is_empty() {
            return 0;
        }
        let bounds = Bounds::of_page(metrics, &self.config);
        advance_blobs(&mut self.blobs, &bounds, &self.config);
        self.hash.rebuild(&mut self.blobs);
        interact_all(&mut self.blobs, &self.hash, &self.config)
    }

    #[cfg(test)]
    pub(crate) fn blobs_mut(&mut self) -> &mut Vec<Blob> {
        &mut self.blobs
    }
}

#[system]
pub fn slime_step(#[resource] slime: &mut SlimeWorld, #[resource] metrics: &Metrics) {
    slime.step(metrics);
}

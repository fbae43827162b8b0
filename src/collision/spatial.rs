use fnv::FnvHashMap;

use crate::blob::Blob;

pub type Cell = (i32, i32);

/// Uniform grid of body indices, rebuilt from scratch every step.
#[derive(Clone, Debug, Default)]
pub struct SpatialHash {
    cell_size: f64,
    buckets: FnvHashMap<Cell, Vec<usize>>,
}

pub fn cell_of(x: f64, y: f64, cell_size: f64) -> Cell {
    ((x / cell_size).floor() as i32, (y / cell_size).floor() as i32)
}

impl SpatialHash {
    pub fn new(cell_size: f64) -> SpatialHash {
        SpatialHash {
            cell_size,
            buckets: FnvHashMap::default(),
        }
    }

    /// Files every body under the cell holding its center and caches that
    /// cell on the body.
    pub fn rebuild(&mut self, blobs: &mut [Blob]) {
        self.buckets.clear();
        for (index, blob) in blobs.iter_mut().enumerate() {
            blob.cell = cell_of(blob.position.x, blob.position.y, self.cell_size);
            self.buckets.entry(blob.cell).or_default().push(index);
        }
    }

    pub fn bucket(&self, cell: Cell) -> &[usize] {
        self.buckets.get(&cell).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Indices in the 3x3 block of cells around `cell`.
    pub fn neighbourhood(&self, cell: Cell) -> impl Iterator<Item = usize> + '_ {
        (-1..=1)
            .flat_map(move |dx| (-1..=1).map(move |dy| (cell.0 + dx, cell.1 + dy)))
            .flat_map(move |c| self.bucket(c).iter().copied())
    }

    pub fn occupied_cells(&self) -> usize {
        self.buckets.len()
    }
}

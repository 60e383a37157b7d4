//! Screen-tile grid and the per-tile bins triangle setup appends to.

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Dimensions of the tile grid covering a render target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(super) struct TileGrid {
    pub(super) columns: u32,
    pub(super) rows: u32,
    pub(super) tile_size: u32,
}

/// Inclusive rectangle of tile coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct TileRange {
    pub(super) min_x: u32,
    pub(super) max_x: u32,
    pub(super) min_y: u32,
    pub(super) max_y: u32,
}

impl TileRange {
    pub(super) fn tile_count(&self) -> u64 {
        (self.max_x - self.min_x + 1) as u64 * (self.max_y - self.min_y + 1) as u64
    }

    #[cfg(test)]
    pub(super) fn contains(&self, x: u32, y: u32) -> bool {
        (self.min_x..=self.max_x).contains(&x) && (self.min_y..=self.max_y).contains(&y)
    }
}

impl TileGrid {
    pub(super) fn for_target(width: u32, height: u32, tile_size: u32) -> Self {
        Self {
            columns: width.div_ceil(tile_size),
            rows: height.div_ceil(tile_size),
            tile_size,
        }
    }

    pub(super) fn len(&self) -> usize {
        self.columns as usize * self.rows as usize
    }

    /// Tiles overlapped by the raster-space bounding box `min..=max`, clamped to the grid.
    ///
    /// Returns `None` when the box lies entirely off the grid.
    pub(super) fn tile_range(&self, min: [f32; 2], max: [f32; 2]) -> Option<TileRange> {
        if self.columns == 0 || self.rows == 0 {
            return None;
        }

        let tile_size = self.tile_size as f32;
        let to_tile = |coordinate: f32| (coordinate / tile_size).floor();
        let min_x = to_tile(min[0]).max(0.0);
        let min_y = to_tile(min[1]).max(0.0);
        let max_x = to_tile(max[0]).min((self.columns - 1) as f32);
        let max_y = to_tile(max[1]).min((self.rows - 1) as f32);

        if !(min_x <= max_x && min_y <= max_y) {
            return None;
        }

        Some(TileRange {
            min_x: min_x as u32,
            max_x: max_x as u32,
            min_y: min_y as u32,
            max_y: max_y as u32,
        })
    }
}

/// One lock-striped bin per tile.
///
/// Appends from many tasks at once are safe; the order in which concurrent appends land is
/// unspecified, which is why fill sorts each bin before use.
pub(super) struct TileBins<T> {
    grid: TileGrid,
    bins: Vec<Mutex<Vec<T>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<T: Clone> TileBins<T> {
    pub(super) fn new(grid: TileGrid) -> Self {
        Self {
            grid,
            bins: (0..grid.len()).map(|_| Mutex::new(Vec::new())).collect(),
        }
    }

    pub(super) fn grid(&self) -> TileGrid {
        self.grid
    }

    /// Appends `item` to every tile in `range`. Returns the number of entries added.
    pub(super) fn insert(&self, range: TileRange, item: T) -> u64 {
        for tile_y in range.min_y..=range.max_y {
            for tile_x in range.min_x..=range.max_x {
                lock(self.bin(tile_x, tile_y)).push(item.clone());
            }
        }
        range.tile_count()
    }

    fn bin(&self, tile_x: u32, tile_y: u32) -> &Mutex<Vec<T>> {
        &self.bins[tile_y as usize * self.grid.columns as usize + tile_x as usize]
    }

    /// Locks a bin and stable-sorts it by `key`.
    pub(super) fn lock_sorted_by_key<K: Ord>(
        &self,
        tile_x: u32,
        tile_y: u32,
        key: impl FnMut(&T) -> K,
    ) -> MutexGuard<'_, Vec<T>> {
        let mut bin = lock(self.bin(tile_x, tile_y));
        bin.sort_by_key(key);
        bin
    }

    #[cfg(test)]
    pub(super) fn bin_len(&self, tile_x: u32, tile_y: u32) -> usize {
        lock(self.bin(tile_x, tile_y)).len()
    }
}

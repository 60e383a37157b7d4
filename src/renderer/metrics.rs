use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use super::Renderer;

/// Per-frame counters describing where triangles went.
///
/// Every triangle slot submitted ends up in exactly one of `triangles_invalid_index`,
/// `triangles_clipped_away`, or the emission path; each emitted (possibly clip-split) triangle
/// is then counted in exactly one of `triangles_non_finite`, `triangles_culled`,
/// `triangles_offscreen` or `triangles_binned`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Draw commands processed.
    pub draw_commands: u64,
    /// Index triplets across all commands.
    pub triangles_submitted: u64,
    /// Triplets skipped because an index was past the vertex count.
    pub triangles_invalid_index: u64,
    /// Triplets entirely behind the near plane.
    pub triangles_clipped_away: u64,
    /// Emitted triangles discarded for non-finite raster coordinates.
    pub triangles_non_finite: u64,
    /// Emitted triangles discarded as back-facing or degenerate.
    pub triangles_culled: u64,
    /// Emitted triangles whose bounding box misses the tile grid.
    pub triangles_offscreen: u64,
    /// Triangles appended to at least one tile.
    pub triangles_binned: u64,
    /// Total tile-bin entries; a triangle spanning several tiles counts once per tile.
    pub bin_entries: u64,
    /// Tiles whose bin held at least one triangle.
    pub tiles_touched: u64,
    /// Pixels written by the fill unit.
    pub pixels_shaded: u64,
    /// Floats allocated from the frame arena.
    pub arena_floats: u64,
}

impl FrameStats {
    /// Merge another frame's counts into this accumulator.
    pub fn accumulate(&mut self, other: &Self) {
        self.draw_commands += other.draw_commands;
        self.triangles_submitted += other.triangles_submitted;
        self.triangles_invalid_index += other.triangles_invalid_index;
        self.triangles_clipped_away += other.triangles_clipped_away;
        self.triangles_non_finite += other.triangles_non_finite;
        self.triangles_culled += other.triangles_culled;
        self.triangles_offscreen += other.triangles_offscreen;
        self.triangles_binned += other.triangles_binned;
        self.bin_entries += other.bin_entries;
        self.tiles_touched += other.tiles_touched;
        self.pixels_shaded += other.pixels_shaded;
        self.arena_floats += other.arena_floats;
    }
}

/// Per-phase timing breakdown for a single frame.
///
/// Populated when the `render_metrics` feature is enabled, zero otherwise.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PhaseTimings {
    /// Time spent in vertex shading, summed over all draw commands.
    pub vertex_shading: Duration,
    /// Time spent in triangle setup and binning, summed over all draw commands.
    pub triangle_setup: Duration,
    /// Time spent sorting and filling tiles.
    pub tile_fill: Duration,
    /// Total `finish()` time.
    pub total: Duration,
}

/// Counters shared by the tasks of one frame.
#[derive(Debug, Default)]
pub(super) struct FrameCounters {
    pub(super) invalid_index: AtomicU64,
    pub(super) clipped_away: AtomicU64,
    pub(super) non_finite: AtomicU64,
    pub(super) culled: AtomicU64,
    pub(super) offscreen: AtomicU64,
    pub(super) binned: AtomicU64,
    pub(super) bin_entries: AtomicU64,
    pub(super) tiles_touched: AtomicU64,
    pub(super) pixels_shaded: AtomicU64,
}

impl FrameCounters {
    #[inline]
    pub(super) fn add(counter: &AtomicU64, amount: u64) {
        counter.fetch_add(amount, Ordering::Relaxed);
    }

    pub(super) fn snapshot(&self) -> FrameStats {
        let load = |counter: &AtomicU64| counter.load(Ordering::Relaxed);
        FrameStats {
            triangles_invalid_index: load(&self.invalid_index),
            triangles_clipped_away: load(&self.clipped_away),
            triangles_non_finite: load(&self.non_finite),
            triangles_culled: load(&self.culled),
            triangles_offscreen: load(&self.offscreen),
            triangles_binned: load(&self.binned),
            bin_entries: load(&self.bin_entries),
            tiles_touched: load(&self.tiles_touched),
            pixels_shaded: load(&self.pixels_shaded),
            ..FrameStats::default()
        }
    }
}

impl Renderer {
    /// Returns the counters of the most recently finished frame.
    pub fn last_frame_stats(&self) -> FrameStats {
        self.last_frame_stats
    }

    /// Returns the per-phase timing breakdown for the most recently finished frame.
    pub fn last_phase_timings(&self) -> PhaseTimings {
        self.last_phase_timings
    }
}

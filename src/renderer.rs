use std::sync::Arc;

use crate::arena::FrameArena;
use crate::config::RenderConfig;
use crate::error::RenderError;
use crate::runtime::{ParallelRuntime, RayonRuntime};
use crate::shader::{PixelShader, UniformBlock, VertexShader};
use crate::surface::RenderTarget;

mod binning;
mod construction;
mod draw_queue;
pub mod metrics;
mod rendering;
mod tile_fill;
mod triangle_setup;
mod types;
mod vertex_shading;

use binning::{TileBins, TileGrid};
pub use metrics::{FrameStats, PhaseTimings};
use types::{DrawCommand, DrawState, ShadedCommand};

/// Tile-based deferred rasterizer.
///
/// Draw calls are recorded with the `bind_*` methods and [`submit`](Renderer::submit), then
/// rendered all at once by [`finish`](Renderer::finish):
///
/// 1. for each command, in submission order, its vertices are shaded in parallel batches and
///    its triangles are clipped, culled and binned into screen tiles in parallel;
/// 2. every tile then sorts its bin back into submission order and fills its pixels, all tiles
///    in parallel.
///
/// All per-frame storage comes from a [`FrameArena`] that is reset when the frame ends.
pub struct Renderer {
    config: RenderConfig,
    runtime: Box<dyn ParallelRuntime>,
    arena: FrameArena,

    /// State the next `submit` snapshots.
    current_state: DrawState,
    draw_queue: Vec<DrawCommand>,

    target: Option<Arc<RenderTarget>>,
    tile_grid: TileGrid,

    last_frame_stats: FrameStats,
    last_phase_timings: PhaseTimings,
}

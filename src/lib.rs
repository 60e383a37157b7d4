//! A tile-based deferred software rasterizer.
//!
//! Draw calls are queued on a [`Renderer`] and turned into pixels by [`Renderer::finish`]:
//! vertices are shaded in parallel batches, triangles are clipped against the near plane,
//! backface culled and binned into screen tiles, and every tile is then filled independently in
//! submission order.
//!
//! ```
//! use std::sync::Arc;
//!
//! use tileraster::{
//!     PixelShader, RenderConfig, RenderTarget, Renderer, SerialRuntime, UniformBlock,
//!     VertexShader, PARAM_W,
//! };
//!
//! /// `[x, y, z]` attributes in, `[x, y, z, w]` out.
//! struct Flat;
//!
//! impl VertexShader for Flat {
//!     fn num_params(&self) -> usize {
//!         4
//!     }
//!
//!     fn num_attribs(&self) -> usize {
//!         3
//!     }
//!
//!     fn process_vertices(&self, out: &mut [f32], attribs: &[f32], _: &UniformBlock, count: usize) {
//!         for vertex in 0..count {
//!             out[vertex * 4..vertex * 4 + 3].copy_from_slice(&attribs[vertex * 3..vertex * 3 + 3]);
//!             out[vertex * 4 + PARAM_W] = 1.0;
//!         }
//!     }
//! }
//!
//! impl PixelShader for Flat {
//!     fn shade_fragment(&self, _: &[f32], _: &UniformBlock) -> [f32; 4] {
//!         [1.0, 1.0, 1.0, 1.0]
//!     }
//! }
//!
//! let mut renderer = Renderer::with_runtime(RenderConfig::default(), SerialRuntime)?;
//! let target = Arc::new(RenderTarget::new(64, 64));
//! renderer.bind_target(target.clone());
//! renderer.bind_shader(Arc::new(Flat), Arc::new(Flat));
//! renderer.bind_geometry(
//!     vec![-1.0, -1.0, 2.0, -1.0, 3.0, 2.0, 3.0, -1.0, 2.0],
//!     3,
//!     vec![0, 1, 2],
//!     3,
//! );
//! renderer.submit()?;
//!
//! let stats = renderer.finish()?;
//! assert_eq!(stats.pixels_shaded, 64 * 64);
//! assert_eq!(target.color_buffer().pixel(5, 5), Some(u32::MAX));
//! # Ok::<(), tileraster::RenderError>(())
//! ```

mod arena;
mod color;
mod config;
mod error;
mod filler;
mod line;
mod rasterizer;
mod renderer;
mod runtime;
mod shader;
mod surface;

pub use arena::FrameArena;
pub use color::Color;
pub use config::{
    RenderConfig, DEFAULT_ARENA_CHUNK_LEN, DEFAULT_NEAR_Z_CLIP, DEFAULT_TILE_SIZE,
    DEFAULT_VERTEX_BATCH_SIZE,
};
pub use error::RenderError;
pub use filler::ShaderFiller;
pub use rasterizer::{FragmentSink, Rasterizer};
pub use renderer::{FrameStats, PhaseTimings, Renderer};
pub use runtime::{ParallelRuntime, RayonRuntime, SerialRuntime, TaskExtent, TaskIndex};
pub use shader::{
    PixelShader, UniformBlock, VertexShader, FIRST_VARYING, PARAM_W, PARAM_X, PARAM_Y, PARAM_Z,
};
pub use surface::{RenderTarget, Surface, TileRect, DEPTH_CLEAR_VALUE};

use crate::color::Color;
use crate::filler::ShaderFiller;
use crate::line::draw_line_clipped;
use crate::rasterizer::Rasterizer;
use crate::surface::{RenderTarget, TileRect, DEPTH_CLEAR_VALUE};

use super::binning::TileBins;
use super::metrics::FrameCounters;
use super::types::Triangle;

/// Everything a fill task needs for one frame.
pub(super) struct FillContext<'a, 'f> {
    pub(super) target: &'a RenderTarget,
    pub(super) bins: &'a TileBins<Triangle<'f>>,
    pub(super) counters: &'a FrameCounters,
    /// Packed value the color surface is cleared to.
    pub(super) clear_color: u32,
    /// Outline triangles instead of shading them.
    pub(super) wireframe: bool,
}

impl FillContext<'_, '_> {
    /// Sorts one tile's bin back into submission order and draws it.
    ///
    /// Tiles touch disjoint pixels, so any number of tiles can be filled at once.
    pub(super) fn fill_tile(&self, tile_x: u32, tile_y: u32) {
        let grid = self.bins.grid();
        let (width, height) = (self.target.width(), self.target.height());
        let rect = TileRect::for_tile(tile_x, tile_y, grid.tile_size, width, height);
        if rect.is_empty() {
            return;
        }

        let bin = self
            .bins
            .lock_sorted_by_key(tile_x, tile_y, |triangle| triangle.sequence);

        let color = self.target.color_buffer();
        color.clear_tile(rect, self.clear_color);
        self.target.depth_buffer().clear_tile(rect, DEPTH_CLEAR_VALUE);

        if !bin.is_empty() {
            let written = if self.wireframe {
                let edge_color = Color::WHITE.to_packed();
                let mut written = 0;
                for triangle in bin.iter() {
                    let [a, b, c] = triangle.raster;
                    for (from, to) in [(a, b), (b, c), (c, a)] {
                        written += draw_line_clipped(color, from, to, edge_color, rect);
                    }
                }
                written
            } else {
                let rasterizer = Rasterizer::new(width, height);
                let mut filler = ShaderFiller::new(self.target);
                for triangle in bin.iter() {
                    let command = triangle.command;
                    filler.set_uniforms(&command.uniforms);
                    filler.enable_depth_test(command.depth_test);
                    filler.set_pixel_shader(&*command.pixel_shader);
                    filler.enable_blend(command.blend);
                    filler.set_up_triangle(triangle.clip_z());
                    filler.set_up_varyings([
                        triangle.varyings(0),
                        triangle.varyings(1),
                        triangle.varyings(2),
                    ]);
                    rasterizer.fill_triangle(&mut filler, rect, triangle.raster);
                }
                filler.pixels_written()
            };

            FrameCounters::add(&self.counters.tiles_touched, 1);
            FrameCounters::add(&self.counters.pixels_shaded, written);
        }

        color.flush_tile(rect);
    }
}

use tracing::{debug, debug_span, warn};

use super::metrics::FrameCounters;
use super::tile_fill::FillContext;
use super::triangle_setup::SetupContext;
use super::vertex_shading::shade_vertices;
use super::*;
use crate::runtime::TaskExtent;

impl Renderer {
    /// Renders every queued command into the bound target.
    ///
    /// Commands are processed one at a time in submission order: vertex shading, then triangle
    /// setup and binning, each joined before the next phase starts. Once every command is
    /// binned, all tiles are filled in parallel. The frame arena is reset and the queue is
    /// emptied before returning, even when the queue was empty.
    pub fn finish(&mut self) -> Result<FrameStats, RenderError> {
        let Some(target) = self.target.clone() else {
            return Err(RenderError::NoTargetBound);
        };

        #[cfg(feature = "render_metrics")]
        let frame_started_at = std::time::Instant::now();
        #[cfg(feature = "render_metrics")]
        let mut timings = PhaseTimings::default();

        let counters = FrameCounters::default();
        let mut triangles_submitted = 0u64;
        {
            let arena = &self.arena;
            let runtime = &*self.runtime;
            let bins = TileBins::new(self.tile_grid);
            let setup = SetupContext {
                arena,
                bins: &bins,
                counters: &counters,
                near_z_clip: self.config.near_z_clip,
                viewport: [target.width() as f32, target.height() as f32],
            };

            let mut base_sequence = 0u32;
            for command in &self.draw_queue {
                #[cfg(feature = "render_metrics")]
                let shading_started_at = std::time::Instant::now();

                let params = {
                    let _span = debug_span!("vertex_shading", vertices = command.num_vertices)
                        .entered();
                    shade_vertices(command, arena, runtime, self.config.vertex_batch_size)
                };

                #[cfg(feature = "render_metrics")]
                let setup_started_at = std::time::Instant::now();

                let num_triangles = command.num_triangles();
                let shaded = ShadedCommand {
                    command,
                    params,
                    base_sequence,
                };
                {
                    let _span = debug_span!("triangle_setup", triangles = num_triangles).entered();
                    runtime.spawn_and_join(TaskExtent::linear(num_triangles), &|index| {
                        setup.setup_triangle(shaded, index.x)
                    });
                }

                #[cfg(feature = "render_metrics")]
                {
                    timings.vertex_shading += setup_started_at - shading_started_at;
                    timings.triangle_setup += setup_started_at.elapsed();
                }

                base_sequence += num_triangles as u32;
                triangles_submitted += num_triangles as u64;
            }

            #[cfg(feature = "render_metrics")]
            let fill_started_at = std::time::Instant::now();

            let fill = FillContext {
                target: &target,
                bins: &bins,
                counters: &counters,
                clear_color: self.config.clear_color.to_packed(),
                wireframe: self.config.wireframe,
            };
            let grid = bins.grid();
            {
                let _span = debug_span!("tile_fill", columns = grid.columns, rows = grid.rows)
                    .entered();
                let extent = TaskExtent::new(grid.columns as usize, grid.rows as usize, 1);
                runtime.spawn_and_join(extent, &|index| {
                    fill.fill_tile(index.x as u32, index.y as u32)
                });
            }

            #[cfg(feature = "render_metrics")]
            {
                timings.tile_fill = fill_started_at.elapsed();
            }
        }

        let mut stats = counters.snapshot();
        stats.draw_commands = self.draw_queue.len() as u64;
        stats.triangles_submitted = triangles_submitted;
        stats.arena_floats = self.arena.allocated_len() as u64;

        if stats.triangles_invalid_index > 0 {
            warn!(
                triangles = stats.triangles_invalid_index,
                "skipped triangles referencing vertices past the end of their buffer"
            );
        }

        // Nothing borrows the arena past this point.
        self.arena.reset();
        self.draw_queue.clear();

        debug!(
            draw_commands = stats.draw_commands,
            triangles_submitted = stats.triangles_submitted,
            triangles_binned = stats.triangles_binned,
            triangles_culled = stats.triangles_culled,
            tiles_touched = stats.tiles_touched,
            pixels_shaded = stats.pixels_shaded,
            "frame finished"
        );

        #[cfg(feature = "render_metrics")]
        {
            timings.total = frame_started_at.elapsed();
            self.last_phase_timings = timings;
        }
        self.last_frame_stats = stats;
        Ok(stats)
    }
}

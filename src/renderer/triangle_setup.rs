use smallvec::SmallVec;

use crate::arena::FrameArena;
use crate::shader::{PARAM_W, PARAM_X, PARAM_Y, PARAM_Z};

use super::binning::TileBins;
use super::metrics::FrameCounters;
use super::types::{signed_area, DrawCommand, ShadedCommand, Triangle};

/// A vertex synthesized by the near-plane clipper.
type ClipVertex = SmallVec<[f32; 16]>;

/// Bit `i` is set when vertex `i` lies behind the near plane (`z < near_z_clip`).
pub(super) fn clip_mask(vertices: &[&[f32]; 3], near_z_clip: f32) -> u8 {
    vertices
        .iter()
        .enumerate()
        .filter(|(_, params)| params[PARAM_Z] < near_z_clip)
        .fold(0, |mask, (index, _)| mask | 1 << index)
}

/// Parametric distance from `from` to `to` at which z crosses the near plane.
#[inline]
fn crossing(from: &[f32], to: &[f32], near_z_clip: f32) -> f32 {
    (from[PARAM_Z] - near_z_clip) / (from[PARAM_Z] - to[PARAM_Z])
}

/// Lerps every component, varyings included.
fn interpolate(from: &[f32], to: &[f32], distance: f32) -> ClipVertex {
    from.iter()
        .zip(to)
        .map(|(a, b)| a * (1.0 - distance) + b * distance)
        .collect()
}

/// `p0` is clipped. Emits the quad left over as two triangles sharing the `p1`-`np2` edge.
fn clip_one(
    [p0, p1, p2]: [&[f32]; 3],
    near_z_clip: f32,
    emit: &mut impl FnMut([&[f32]; 3]),
) -> usize {
    let np1 = interpolate(p1, p0, crossing(p1, p0, near_z_clip));
    let np2 = interpolate(p2, p0, crossing(p2, p0, near_z_clip));
    emit([&np1[..], p1, &np2[..]]);
    emit([&np2[..], p1, p2]);
    2
}

/// `p0` and `p1` are clipped; `p2` keeps a single, smaller triangle.
fn clip_two(
    [p0, p1, p2]: [&[f32]; 3],
    near_z_clip: f32,
    emit: &mut impl FnMut([&[f32]; 3]),
) -> usize {
    let np1 = interpolate(p2, p1, crossing(p2, p1, near_z_clip));
    let np2 = interpolate(p2, p0, crossing(p2, p0, near_z_clip));
    emit([&np2[..], &np1[..], p2]);
    1
}

/// Clips a triangle against the near plane and hands each resulting triangle to `emit`.
///
/// Vertex order is only ever rotated, so emitted triangles keep the input winding. Returns the
/// number of triangles emitted: 0, 1 or 2.
pub(super) fn clip_triangle(
    vertices: [&[f32]; 3],
    near_z_clip: f32,
    emit: &mut impl FnMut([&[f32]; 3]),
) -> usize {
    let [p0, p1, p2] = vertices;
    match clip_mask(&vertices, near_z_clip) {
        0 => {
            emit(vertices);
            1
        }
        1 => clip_one([p0, p1, p2], near_z_clip, emit),
        2 => clip_one([p1, p2, p0], near_z_clip, emit),
        4 => clip_one([p2, p0, p1], near_z_clip, emit),
        3 => clip_two([p0, p1, p2], near_z_clip, emit),
        6 => clip_two([p1, p2, p0], near_z_clip, emit),
        5 => clip_two([p2, p0, p1], near_z_clip, emit),
        _ => 0,
    }
}

/// Everything a setup task needs for one frame.
pub(super) struct SetupContext<'a, 'f> {
    pub(super) arena: &'f FrameArena,
    pub(super) bins: &'a TileBins<Triangle<'f>>,
    pub(super) counters: &'a FrameCounters,
    pub(super) near_z_clip: f32,
    /// Render target width and height in pixels.
    pub(super) viewport: [f32; 2],
}

impl<'f> SetupContext<'_, 'f> {
    /// Gathers, clips, culls and bins triangle `triangle_index` of `shaded`.
    pub(super) fn setup_triangle(&self, shaded: ShadedCommand<'f>, triangle_index: usize) {
        let command = shaded.command;
        let first = triangle_index * 3;
        let gathered = [0, 1, 2].map(|corner| {
            command
                .indices
                .get(first + corner)
                .and_then(|&index| shaded.vertex_params(index))
        });
        let [Some(p0), Some(p1), Some(p2)] = gathered else {
            FrameCounters::add(&self.counters.invalid_index, 1);
            return;
        };

        // Clip children share their parent's sequence number.
        let sequence = shaded.base_sequence + triangle_index as u32;
        let emitted = clip_triangle([p0, p1, p2], self.near_z_clip, &mut |vertices| {
            self.enqueue_triangle(command, sequence, vertices)
        });
        if emitted == 0 {
            FrameCounters::add(&self.counters.clipped_away, 1);
        }
    }

    /// Projects one (possibly synthesized) triangle to raster space and appends it to every
    /// tile its bounding box overlaps.
    pub(super) fn enqueue_triangle(
        &self,
        command: &'f DrawCommand,
        sequence: u32,
        vertices: [&[f32]; 3],
    ) {
        let [width, height] = self.viewport;
        let clip = vertices.map(|params| {
            let one_over_w = 1.0 / params[PARAM_W];
            [
                params[PARAM_X] * one_over_w,
                params[PARAM_Y] * one_over_w,
                params[PARAM_Z],
            ]
        });
        let raster = clip.map(|ndc| {
            [
                ndc[0] * width / 2.0 + width / 2.0,
                ndc[1] * height / 2.0 + height / 2.0,
            ]
        });

        if !raster.iter().flatten().all(|coordinate| coordinate.is_finite()) {
            FrameCounters::add(&self.counters.non_finite, 1);
            return;
        }

        // Also rejects edge-on triangles, which the rasterizer can't fill correctly.
        if signed_area(&raster) >= 0.0 {
            FrameCounters::add(&self.counters.culled, 1);
            return;
        }

        let min = [
            raster[0][0].min(raster[1][0]).min(raster[2][0]),
            raster[0][1].min(raster[1][1]).min(raster[2][1]),
        ];
        let max = [
            raster[0][0].max(raster[1][0]).max(raster[2][0]),
            raster[0][1].max(raster[1][1]).max(raster[2][1]),
        ];
        let Some(range) = self.bins.grid().tile_range(min, max) else {
            FrameCounters::add(&self.counters.offscreen, 1);
            return;
        };

        let width = command.num_params;
        let params = self.arena.alloc_concat(&[
            &vertices[0][..width],
            &vertices[1][..width],
            &vertices[2][..width],
        ]);
        let triangle = Triangle {
            sequence,
            command,
            clip,
            raster,
            params,
        };

        let entries = self.bins.insert(range, triangle);
        FrameCounters::add(&self.counters.binned, 1);
        FrameCounters::add(&self.counters.bin_entries, entries);
    }
}

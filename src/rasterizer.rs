//! Reference scan conversion: walks the pixels of one tile and reports the ones a triangle
//! covers.

use crate::surface::TileRect;

/// Receives the covered pixels of a triangle.
pub trait FragmentSink {
    /// `barycentric` weights the triangle's three vertices at the center of pixel `(x, y)`.
    fn shade_pixel(&mut self, x: u32, y: u32, barycentric: [f32; 3]);
}

/// Edge-function rasterizer bounded to a single tile.
///
/// Only triangles with negative signed area (the winding that survives backface culling) are
/// filled. A pixel is covered when its center lies inside all three edges. Centers exactly on
/// an edge belong to the triangle for which that edge is a top-left edge, so two triangles
/// sharing an edge never both cover the same pixel.
#[derive(Debug, Clone, Copy)]
pub struct Rasterizer {
    surface_width: u32,
    surface_height: u32,
}

#[inline(always)]
fn edge(a: [f32; 2], b: [f32; 2], p: [f32; 2]) -> f32 {
    // Always evaluated from the same endpoint, so two triangles sharing an edge get exactly
    // opposite values and rounding can't leave a gap or a double hit.
    if (a[1], a[0]) <= (b[1], b[0]) {
        (b[0] - a[0]) * (p[1] - a[1]) - (b[1] - a[1]) * (p[0] - a[0])
    } else {
        -((a[0] - b[0]) * (p[1] - b[1]) - (a[1] - b[1]) * (p[0] - b[0]))
    }
}

#[inline(always)]
fn is_top_left(a: [f32; 2], b: [f32; 2]) -> bool {
    let dx = b[0] - a[0];
    let dy = b[1] - a[1];
    dy > 0.0 || (dy == 0.0 && dx < 0.0)
}

#[inline(always)]
fn covers(edge_value: f32, a: [f32; 2], b: [f32; 2]) -> bool {
    edge_value < 0.0 || (edge_value == 0.0 && is_top_left(a, b))
}

impl Rasterizer {
    pub fn new(surface_width: u32, surface_height: u32) -> Self {
        Self {
            surface_width,
            surface_height,
        }
    }

    /// Reports every pixel of `rect` covered by the raster-space triangle `vertices`.
    pub fn fill_triangle(
        &self,
        sink: &mut impl FragmentSink,
        rect: TileRect,
        vertices: [[f32; 2]; 3],
    ) {
        let [v0, v1, v2] = vertices;
        let area = edge(v0, v1, v2);
        if !(area < 0.0) {
            return;
        }

        let right = rect.right().min(self.surface_width) as f32;
        let bottom = rect.bottom().min(self.surface_height) as f32;
        let min_x = v0[0].min(v1[0]).min(v2[0]).floor().max(rect.left as f32);
        let max_x = v0[0].max(v1[0]).max(v2[0]).ceil().min(right);
        let min_y = v0[1].min(v1[1]).min(v2[1]).floor().max(rect.top as f32);
        let max_y = v0[1].max(v1[1]).max(v2[1]).ceil().min(bottom);
        if !(min_x < max_x && min_y < max_y) {
            return;
        }

        let inverse_area = 1.0 / area;
        for y in min_y as u32..max_y as u32 {
            let center_y = y as f32 + 0.5;
            for x in min_x as u32..max_x as u32 {
                let center = [x as f32 + 0.5, center_y];
                let e0 = edge(v1, v2, center);
                let e1 = edge(v2, v0, center);
                let e2 = edge(v0, v1, center);
                if covers(e0, v1, v2) && covers(e1, v2, v0) && covers(e2, v0, v1) {
                    sink.shade_pixel(x, y, [e0 * inverse_area, e1 * inverse_area, e2 * inverse_area]);
                }
            }
        }
    }
}

use std::sync::Arc;

use tileraster::{Color, RenderError, Renderer};

use crate::expectations::PixelExpectation;
use crate::shaders::{ColorVertex, PassthroughShader};

// ── Grid layout constants ────────────────────────────────────────────────────

const CELL_SIZE: u32 = 96;
const COLUMNS: u32 = 4;
const ROWS: u32 = 3;

/// Neither dimension is a multiple of the default 64-pixel tile, so edge tiles are partial.
pub const CANVAS_WIDTH: u32 = CELL_SIZE * COLUMNS;
pub const CANVAS_HEIGHT: u32 = CELL_SIZE * ROWS;

/// Returns the pixel origin (top-left corner) of cell number `n` (1-based).
fn cell_origin(cell_number: u32) -> (f32, f32) {
    let index = cell_number - 1;
    let column = index % COLUMNS;
    let row = index / COLUMNS;
    ((column * CELL_SIZE) as f32, (row * CELL_SIZE) as f32)
}

/// Accumulates colored triangles given in pixel coordinates.
///
/// Positions are mapped to normalized device coordinates with `w = 1`, so pixel `(x, y)` of
/// the mesh lands on pixel `(x, y)` of the render target.
pub struct MeshBuilder {
    width: f32,
    height: f32,
    vertices: Vec<ColorVertex>,
    indices: Vec<u32>,
}

impl MeshBuilder {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width as f32,
            height: height as f32,
            vertices: Vec::new(),
            indices: Vec::new(),
        }
    }

    /// Adds one vertex and returns its index.
    pub fn vertex(&mut self, (x, y): (f32, f32), z: f32, color: Color) -> u32 {
        let position = [
            x / self.width * 2.0 - 1.0,
            y / self.height * 2.0 - 1.0,
            z,
            1.0,
        ];
        self.vertices
            .push(ColorVertex::new(position, color.normalize()));
        (self.vertices.len() - 1) as u32
    }

    /// Adds a triangle as given; `(0, 0), (0, 1), (1, 0)` is the front-facing winding.
    pub fn triangle(&mut self, points: [(f32, f32); 3], z: [f32; 3], color: Color) -> &mut Self {
        for (point, z) in points.into_iter().zip(z) {
            let index = self.vertex(point, z, color);
            self.indices.push(index);
        }
        self
    }

    /// Adds a front-facing axis-aligned rectangle as two triangles.
    pub fn rect(&mut self, min: (f32, f32), max: (f32, f32), z: f32, color: Color) -> &mut Self {
        self.horizontal_gradient(min, max, z, color, color)
    }

    /// Like [`rect`](Self::rect), fading from `left` at `min.0` to `right` at `max.0`.
    pub fn horizontal_gradient(
        &mut self,
        min: (f32, f32),
        max: (f32, f32),
        z: f32,
        left: Color,
        right: Color,
    ) -> &mut Self {
        let top_left = self.vertex(min, z, left);
        let bottom_left = self.vertex((min.0, max.1), z, left);
        let top_right = self.vertex((max.0, min.1), z, right);
        let bottom_right = self.vertex(max, z, right);
        self.indices.extend_from_slice(&[
            top_left,
            bottom_left,
            top_right,
            top_right,
            bottom_left,
            bottom_right,
        ]);
        self
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    /// Binds the accumulated geometry and submits it with whatever state is currently bound.
    pub fn submit(&self, renderer: &mut Renderer) -> Result<(), RenderError> {
        let attribs: Vec<f32> = bytemuck::cast_slice(&self.vertices).to_vec();
        renderer.bind_geometry(
            attribs,
            self.vertices.len(),
            self.indices.clone(),
            self.indices.len(),
        );
        renderer.submit()
    }
}

/// Queues the entire main test scene on `renderer` and returns the pixel expectations the
/// rendered target must meet.
///
/// The renderer's target must be `CANVAS_WIDTH` × `CANVAS_HEIGHT` and its clear color the default
/// transparent black.
pub fn build_main_scene(renderer: &mut Renderer) -> Result<Vec<PixelExpectation>, RenderError> {
    let shader = Arc::new(PassthroughShader);
    renderer.bind_shader(shader.clone(), shader);
    renderer.enable_depth_test(false);
    renderer.enable_blend(false);

    let mut expectations: Vec<PixelExpectation> = Vec::new();
    expectations.extend(cell_01_opaque_rect(renderer)?);
    expectations.extend(cell_02_painters_order(renderer)?);
    expectations.extend(cell_03_depth_test_nearer_first(renderer)?);
    expectations.extend(cell_04_blend_over(renderer)?);
    expectations.extend(cell_05_one_vertex_near_clipped(renderer)?);
    expectations.extend(cell_06_two_vertices_near_clipped(renderer)?);
    expectations.extend(cell_07_back_facing_culled(renderer)?);
    expectations.extend(cell_08_fully_near_clipped(renderer)?);
    expectations.extend(cell_09_horizontal_gradient(renderer)?);
    expectations.extend(cell_10_many_small_triangles(renderer)?);
    expectations.extend(cell_11_shared_edge_blend(renderer)?);
    expectations.extend(cell_12_canvas_corner(renderer)?);
    Ok(expectations)
}

fn mesh() -> MeshBuilder {
    MeshBuilder::new(CANVAS_WIDTH, CANVAS_HEIGHT)
}

fn at(origin: (f32, f32), dx: u32, dy: u32) -> (u32, u32) {
    (origin.0 as u32 + dx, origin.1 as u32 + dy)
}

// ── Section A: ordering and state ────────────────────────────────────────────

fn cell_01_opaque_rect(renderer: &mut Renderer) -> Result<Vec<PixelExpectation>, RenderError> {
    let (ox, oy) = cell_origin(1);
    mesh()
        .rect((ox + 10.0, oy + 10.0), (ox + 86.0, oy + 86.0), 2.0, Color::rgb(220, 50, 50))
        .submit(renderer)?;

    let (x, y) = at((ox, oy), 48, 48);
    let (bx, by) = at((ox, oy), 5, 5);
    Ok(vec![
        PixelExpectation::opaque(x, y, 220, 50, 50, "c01_interior"),
        PixelExpectation::cleared(bx, by, "c01_outside_is_cleared"),
    ])
}

fn cell_02_painters_order(renderer: &mut Renderer) -> Result<Vec<PixelExpectation>, RenderError> {
    let (ox, oy) = cell_origin(2);
    mesh()
        .rect((ox + 10.0, oy + 10.0), (ox + 70.0, oy + 70.0), 2.0, Color::rgb(220, 50, 50))
        .submit(renderer)?;
    mesh()
        .rect((ox + 40.0, oy + 40.0), (ox + 86.0, oy + 86.0), 2.0, Color::rgb(50, 180, 50))
        .submit(renderer)?;

    let (x, y) = at((ox, oy), 20, 20);
    let (ox2, oy2) = at((ox, oy), 55, 55);
    Ok(vec![
        PixelExpectation::opaque(x, y, 220, 50, 50, "c02_first_only"),
        PixelExpectation::opaque(ox2, oy2, 50, 180, 50, "c02_overlap_is_later"),
    ])
}

fn cell_03_depth_test_nearer_first(
    renderer: &mut Renderer,
) -> Result<Vec<PixelExpectation>, RenderError> {
    let (ox, oy) = cell_origin(3);
    renderer.enable_depth_test(true);
    mesh()
        .rect((ox + 10.0, oy + 10.0), (ox + 70.0, oy + 70.0), 2.0, Color::rgb(50, 180, 50))
        .submit(renderer)?;
    mesh()
        .rect((ox + 40.0, oy + 40.0), (ox + 86.0, oy + 86.0), 5.0, Color::rgb(220, 50, 50))
        .submit(renderer)?;
    renderer.enable_depth_test(false);

    let (x, y) = at((ox, oy), 55, 55);
    let (fx, fy) = at((ox, oy), 80, 80);
    Ok(vec![
        PixelExpectation::opaque(x, y, 50, 180, 50, "c03_nearer_earlier_wins"),
        PixelExpectation::opaque(fx, fy, 220, 50, 50, "c03_farther_visible_alone"),
    ])
}

fn cell_04_blend_over(renderer: &mut Renderer) -> Result<Vec<PixelExpectation>, RenderError> {
    let (ox, oy) = cell_origin(4);
    mesh()
        .rect((ox + 10.0, oy + 10.0), (ox + 50.0, oy + 86.0), 2.0, Color::rgb(0, 0, 255))
        .submit(renderer)?;
    renderer.enable_blend(true);
    mesh()
        .rect(
            (ox + 30.0, oy + 10.0),
            (ox + 86.0, oy + 86.0),
            2.0,
            Color::rgba(255, 0, 0, 128),
        )
        .submit(renderer)?;
    renderer.enable_blend(false);

    let (x, y) = at((ox, oy), 40, 48);
    let (cx, cy) = at((ox, oy), 70, 48);
    Ok(vec![
        PixelExpectation::new(x, y, 128, 0, 127, 255, "c04_over_opaque"),
        PixelExpectation::new(cx, cy, 128, 0, 0, 128, "c04_over_cleared"),
    ])
}

// ── Section B: clipping and culling ──────────────────────────────────────────

fn cell_05_one_vertex_near_clipped(
    renderer: &mut Renderer,
) -> Result<Vec<PixelExpectation>, RenderError> {
    let (ox, oy) = cell_origin(5);
    // The near plane cuts both edges leaving the first vertex at their midpoints.
    mesh()
        .triangle(
            [
                (ox + 10.0, oy + 10.0),
                (ox + 10.0, oy + 86.0),
                (ox + 86.0, oy + 10.0),
            ],
            [0.0, 2.0, 2.0],
            Color::rgb(220, 200, 50),
        )
        .submit(renderer)?;

    let (x, y) = at((ox, oy), 40, 40);
    let (cx, cy) = at((ox, oy), 15, 15);
    Ok(vec![
        PixelExpectation::opaque(x, y, 220, 200, 50, "c05_remainder_drawn"),
        PixelExpectation::cleared(cx, cy, "c05_clipped_corner_is_cleared"),
    ])
}

fn cell_06_two_vertices_near_clipped(
    renderer: &mut Renderer,
) -> Result<Vec<PixelExpectation>, RenderError> {
    let (ox, oy) = cell_origin(6);
    // z falls from 4 to 0 along both edges leaving the last vertex, so the near plane crosses
    // them three quarters of the way along.
    mesh()
        .triangle(
            [
                (ox + 10.0, oy + 10.0),
                (ox + 10.0, oy + 86.0),
                (ox + 86.0, oy + 10.0),
            ],
            [0.0, 0.0, 4.0],
            Color::rgb(50, 200, 220),
        )
        .submit(renderer)?;

    let (x, y) = at((ox, oy), 80, 12);
    let (cx, cy) = at((ox, oy), 15, 15);
    Ok(vec![
        PixelExpectation::opaque(x, y, 50, 200, 220, "c06_corner_drawn"),
        PixelExpectation::cleared(cx, cy, "c06_rest_is_cleared"),
    ])
}

fn cell_07_back_facing_culled(
    renderer: &mut Renderer,
) -> Result<Vec<PixelExpectation>, RenderError> {
    let (ox, oy) = cell_origin(7);
    mesh()
        .triangle(
            [
                (ox + 10.0, oy + 10.0),
                (ox + 86.0, oy + 10.0),
                (ox + 10.0, oy + 86.0),
            ],
            [2.0; 3],
            Color::rgb(220, 50, 50),
        )
        .submit(renderer)?;

    let (x, y) = at((ox, oy), 30, 30);
    Ok(vec![PixelExpectation::cleared(x, y, "c07_back_face_is_culled")])
}

fn cell_08_fully_near_clipped(
    renderer: &mut Renderer,
) -> Result<Vec<PixelExpectation>, RenderError> {
    let (ox, oy) = cell_origin(8);
    mesh()
        .rect((ox + 10.0, oy + 10.0), (ox + 86.0, oy + 86.0), 0.5, Color::rgb(220, 50, 50))
        .submit(renderer)?;

    let (x, y) = at((ox, oy), 48, 48);
    Ok(vec![PixelExpectation::cleared(x, y, "c08_behind_near_plane")])
}

// ── Section C: interpolation and coverage ────────────────────────────────────

fn cell_09_horizontal_gradient(
    renderer: &mut Renderer,
) -> Result<Vec<PixelExpectation>, RenderError> {
    let (ox, oy) = cell_origin(9);
    mesh()
        .horizontal_gradient(
            (ox + 8.0, oy + 8.0),
            (ox + 88.0, oy + 88.0),
            2.0,
            Color::rgb(255, 0, 0),
            Color::rgb(0, 0, 255),
        )
        .submit(renderer)?;

    // Pixel centers sit half a pixel right of the column index.
    let (lx, ly) = at((ox, oy), 8, 48);
    let (mx, my) = at((ox, oy), 47, 20);
    let (rx, ry) = at((ox, oy), 87, 70);
    Ok(vec![
        PixelExpectation::opaque(lx, ly, 253, 0, 2, "c09_left_edge"),
        PixelExpectation::opaque(mx, my, 129, 0, 126, "c09_middle"),
        PixelExpectation::opaque(rx, ry, 2, 0, 253, "c09_right_edge"),
    ])
}

fn cell_10_many_small_triangles(
    renderer: &mut Renderer,
) -> Result<Vec<PixelExpectation>, RenderError> {
    let (ox, oy) = cell_origin(10);
    let mut mesh = mesh();
    for row in 0..8 {
        for column in 0..8 {
            let color = if (row + column) % 2 == 0 {
                Color::WHITE
            } else {
                Color::BLACK
            };
            let min = (ox + 8.0 + column as f32 * 10.0, oy + 8.0 + row as f32 * 10.0);
            mesh.rect(min, (min.0 + 10.0, min.1 + 10.0), 2.0, color);
        }
    }
    mesh.submit(renderer)?;

    let (wx, wy) = at((ox, oy), 13, 13);
    let (bx, by) = at((ox, oy), 23, 13);
    let (lx, ly) = at((ox, oy), 83, 83);
    Ok(vec![
        PixelExpectation::opaque(wx, wy, 255, 255, 255, "c10_first_square"),
        PixelExpectation::opaque(bx, by, 0, 0, 0, "c10_second_square"),
        PixelExpectation::opaque(lx, ly, 255, 255, 255, "c10_last_square"),
    ])
}

fn cell_11_shared_edge_blend(
    renderer: &mut Renderer,
) -> Result<Vec<PixelExpectation>, RenderError> {
    let (ox, oy) = cell_origin(11);
    // A blended quad would double-blend any pixel covered by both of its triangles.
    renderer.enable_blend(true);
    mesh()
        .rect(
            (ox + 10.0, oy + 10.0),
            (ox + 86.0, oy + 86.0),
            2.0,
            Color::rgba(0, 255, 0, 128),
        )
        .submit(renderer)?;
    renderer.enable_blend(false);

    let mut expectations = Vec::new();
    for step in 0..8 {
        // Pixels whose centers lie on the diagonal shared by both triangles.
        let offset = 10 + step * 9;
        let (x, y) = at((ox, oy), offset, 85 - (offset - 10));
        expectations.push(PixelExpectation::new(x, y, 0, 128, 0, 128, "c11_diagonal"));
    }
    Ok(expectations)
}

fn cell_12_canvas_corner(renderer: &mut Renderer) -> Result<Vec<PixelExpectation>, RenderError> {
    let (ox, oy) = cell_origin(12);
    // Runs past the canvas edge into tiles that don't exist.
    mesh()
        .rect((ox + 40.0, oy + 40.0), (ox + 200.0, oy + 200.0), 2.0, Color::rgb(50, 50, 220))
        .submit(renderer)?;

    let (x, y) = (CANVAS_WIDTH - 1, CANVAS_HEIGHT - 1);
    let (cx, cy) = at((ox, oy), 20, 20);
    Ok(vec![
        PixelExpectation::opaque(x, y, 50, 50, 220, "c12_last_pixel"),
        PixelExpectation::cleared(cx, cy, "c12_outside"),
    ])
}

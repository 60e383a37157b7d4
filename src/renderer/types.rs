use std::sync::Arc;

use crate::shader::{PixelShader, UniformBlock, VertexShader, FIRST_VARYING};

/// The "current" state that bind calls mutate and `submit` snapshots.
#[derive(Clone)]
pub(super) struct DrawState {
    pub(super) vertices: Arc<[f32]>,
    pub(super) num_vertices: usize,
    pub(super) indices: Arc<[u32]>,
    pub(super) num_indices: usize,
    pub(super) uniforms: UniformBlock,
    pub(super) vertex_shader: Option<Arc<dyn VertexShader>>,
    pub(super) pixel_shader: Option<Arc<dyn PixelShader>>,
    pub(super) depth_test: bool,
    pub(super) blend: bool,
}

impl Default for DrawState {
    fn default() -> Self {
        Self {
            vertices: Vec::new().into(),
            num_vertices: 0,
            indices: Vec::new().into(),
            num_indices: 0,
            uniforms: UniformBlock::default(),
            vertex_shader: None,
            pixel_shader: None,
            depth_test: false,
            blend: false,
        }
    }
}

/// One submitted draw call.
pub(super) struct DrawCommand {
    pub(super) vertices: Arc<[f32]>,
    pub(super) num_vertices: usize,
    pub(super) indices: Arc<[u32]>,
    pub(super) num_indices: usize,
    pub(super) uniforms: UniformBlock,
    pub(super) vertex_shader: Arc<dyn VertexShader>,
    pub(super) pixel_shader: Arc<dyn PixelShader>,
    pub(super) num_params: usize,
    pub(super) num_attribs: usize,
    pub(super) depth_test: bool,
    pub(super) blend: bool,
}

impl DrawCommand {
    pub(super) fn num_triangles(&self) -> usize {
        self.num_indices / 3
    }
}

/// A draw command paired with its shaded parameter buffer for the current frame.
#[derive(Clone, Copy)]
pub(super) struct ShadedCommand<'f> {
    pub(super) command: &'f DrawCommand,
    pub(super) params: &'f [f32],
    /// Sequence number of the command's first triangle.
    pub(super) base_sequence: u32,
}

impl<'f> ShadedCommand<'f> {
    /// Shaded parameter vector of vertex `index`, or `None` when the index is out of range.
    pub(super) fn vertex_params(&self, index: u32) -> Option<&'f [f32]> {
        let index = index as usize;
        if index >= self.command.num_vertices {
            return None;
        }
        let width = self.command.num_params;
        self.params.get(index * width..(index + 1) * width)
    }
}

/// A clipped, front-facing triangle ready for binning.
#[derive(Clone, Copy)]
pub(super) struct Triangle<'f> {
    pub(super) sequence: u32,
    pub(super) command: &'f DrawCommand,
    /// Normalized device x and y, clip-space z.
    pub(super) clip: [[f32; 3]; 3],
    pub(super) raster: [[f32; 2]; 3],
    /// The three vertices' full parameter vectors, back to back.
    pub(super) params: &'f [f32],
}

impl<'f> Triangle<'f> {
    pub(super) fn varyings(&self, vertex: usize) -> &'f [f32] {
        let width = self.command.num_params;
        let params: &'f [f32] = self.params;
        &params[vertex * width + FIRST_VARYING..(vertex + 1) * width]
    }

    pub(super) fn clip_z(&self) -> [f32; 3] {
        self.clip.map(|vertex| vertex[2])
    }
}

/// Signed area (times two) of a raster-space triangle.
///
/// Front-facing triangles are strictly negative.
#[inline]
pub(super) fn signed_area(raster: &[[f32; 2]; 3]) -> f32 {
    let [v0, v1, v2] = raster;
    (v1[0] - v0[0]) * (v2[1] - v0[1]) - (v1[1] - v0[1]) * (v2[0] - v0[0])
}

use super::*;

impl Renderer {
    /// Binds the vertex attribute and index buffers used by the next [`submit`](Self::submit).
    ///
    /// `vertices` holds `num_vertices` attribute vectors of the vertex shader's `num_attribs`
    /// floats each, back to back. Every three indices form one triangle.
    pub fn bind_geometry(
        &mut self,
        vertices: impl Into<Arc<[f32]>>,
        num_vertices: usize,
        indices: impl Into<Arc<[u32]>>,
        num_indices: usize,
    ) {
        let state = &mut self.current_state;
        state.vertices = vertices.into();
        state.num_vertices = num_vertices;
        state.indices = indices.into();
        state.num_indices = num_indices;
    }

    pub fn bind_uniforms(&mut self, uniforms: UniformBlock) {
        self.current_state.uniforms = uniforms;
    }

    pub fn bind_shader(
        &mut self,
        vertex_shader: Arc<dyn VertexShader>,
        pixel_shader: Arc<dyn PixelShader>,
    ) {
        self.current_state.vertex_shader = Some(vertex_shader);
        self.current_state.pixel_shader = Some(pixel_shader);
    }

    /// Sets the surfaces [`finish`](Self::finish) renders into and sizes the tile grid to them.
    pub fn bind_target(&mut self, target: Arc<RenderTarget>) {
        let (width, height) = (target.width(), target.height());
        if width == 0 || height == 0 {
            tracing::warn!(width, height, "bound a render target with no pixels");
        }
        self.tile_grid = TileGrid::for_target(width, height, self.config.tile_size);
        self.target = Some(target);
    }

    pub fn enable_depth_test(&mut self, enabled: bool) {
        self.current_state.depth_test = enabled;
    }

    pub fn enable_blend(&mut self, enabled: bool) {
        self.current_state.blend = enabled;
    }

    /// Queues a copy of the currently bound state.
    ///
    /// Only buffer lengths are checked here. Indices are range-checked per triangle during
    /// `finish`, and triangles referencing a missing vertex are skipped.
    pub fn submit(&mut self) -> Result<(), RenderError> {
        let state = &self.current_state;
        let (Some(vertex_shader), Some(pixel_shader)) =
            (&state.vertex_shader, &state.pixel_shader)
        else {
            return Err(RenderError::ShaderNotBound);
        };

        let num_params = vertex_shader.num_params();
        if num_params < 4 {
            return Err(RenderError::TooFewParams(num_params));
        }

        let num_attribs = vertex_shader.num_attribs();
        let required = state.num_vertices * num_attribs;
        if state.vertices.len() < required {
            return Err(RenderError::VertexBufferTooSmall {
                required,
                actual: state.vertices.len(),
            });
        }
        if state.indices.len() < state.num_indices {
            return Err(RenderError::IndexBufferTooSmall {
                required: state.num_indices,
                actual: state.indices.len(),
            });
        }

        let command = DrawCommand {
            vertices: state.vertices.clone(),
            num_vertices: state.num_vertices,
            indices: state.indices.clone(),
            num_indices: state.num_indices,
            uniforms: state.uniforms.clone(),
            vertex_shader: vertex_shader.clone(),
            pixel_shader: pixel_shader.clone(),
            num_params,
            num_attribs,
            depth_test: state.depth_test,
            blend: state.blend,
        };
        self.draw_queue.push(command);
        Ok(())
    }

    /// Drops every queued command without rendering.
    pub fn clear_draw_queue(&mut self) {
        self.draw_queue.clear();
    }

    pub fn queued_commands(&self) -> usize {
        self.draw_queue.len()
    }

    /// Tile grid `(columns, rows)` of the bound target.
    pub fn tile_grid(&self) -> (u32, u32) {
        (self.tile_grid.columns, self.tile_grid.rows)
    }
}

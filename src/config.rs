use crate::{Color, RenderError};

/// Default edge length of a screen tile, in pixels.
pub const DEFAULT_TILE_SIZE: u32 = 64;
/// Default number of vertices handed to one vertex-shading task.
pub const DEFAULT_VERTEX_BATCH_SIZE: usize = 16;
/// Default clip-space z below which a vertex is behind the near plane.
pub const DEFAULT_NEAR_Z_CLIP: f32 = 1.0;
/// Default length, in floats, of the first frame-arena chunk.
pub const DEFAULT_ARENA_CHUNK_LEN: usize = 1 << 16;

/// Tunables for a [`Renderer`](crate::Renderer).
///
/// ```
/// use tileraster::{Color, RenderConfig};
///
/// let config = RenderConfig::default()
///     .with_tile_size(32)
///     .with_clear_color(Color::BLACK)
///     .with_worker_threads(4);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    /// Edge length of a square screen tile in pixels.
    pub tile_size: u32,
    /// Vertices per vertex-shading task.
    pub vertex_batch_size: usize,
    /// Raw clip-space z threshold for near-plane clipping.
    ///
    /// The comparison is made on z before the perspective divide.
    pub near_z_clip: f32,
    /// Color a tile is cleared to before its triangles are filled.
    pub clear_color: Color,
    /// Size of a dedicated worker pool. `None` uses rayon's global pool.
    pub worker_threads: Option<usize>,
    /// Length, in floats, of the first frame-arena chunk.
    pub arena_chunk_len: usize,
    /// Draw every binned triangle's edges in opaque white instead of running its pixel shader.
    pub wireframe: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            tile_size: DEFAULT_TILE_SIZE,
            vertex_batch_size: DEFAULT_VERTEX_BATCH_SIZE,
            near_z_clip: DEFAULT_NEAR_Z_CLIP,
            clear_color: Color::TRANSPARENT,
            worker_threads: None,
            arena_chunk_len: DEFAULT_ARENA_CHUNK_LEN,
            wireframe: false,
        }
    }
}

impl RenderConfig {
    pub fn with_tile_size(mut self, tile_size: u32) -> Self {
        self.tile_size = tile_size;
        self
    }

    pub fn with_vertex_batch_size(mut self, vertex_batch_size: usize) -> Self {
        self.vertex_batch_size = vertex_batch_size;
        self
    }

    pub fn with_near_z_clip(mut self, near_z_clip: f32) -> Self {
        self.near_z_clip = near_z_clip;
        self
    }

    pub fn with_clear_color(mut self, clear_color: Color) -> Self {
        self.clear_color = clear_color;
        self
    }

    pub fn with_worker_threads(mut self, worker_threads: usize) -> Self {
        self.worker_threads = Some(worker_threads);
        self
    }

    pub fn with_arena_chunk_len(mut self, arena_chunk_len: usize) -> Self {
        self.arena_chunk_len = arena_chunk_len;
        self
    }

    pub fn with_wireframe(mut self, wireframe: bool) -> Self {
        self.wireframe = wireframe;
        self
    }

    pub fn validate(&self) -> Result<(), RenderError> {
        if self.tile_size == 0 {
            return Err(RenderError::InvalidConfig("tile_size must be non-zero"));
        }
        if self.vertex_batch_size == 0 {
            return Err(RenderError::InvalidConfig(
                "vertex_batch_size must be non-zero",
            ));
        }
        if !self.near_z_clip.is_finite() {
            return Err(RenderError::InvalidConfig("near_z_clip must be finite"));
        }
        if self.worker_threads == Some(0) {
            return Err(RenderError::InvalidConfig(
                "worker_threads must be non-zero when set",
            ));
        }
        if self.arena_chunk_len == 0 {
            return Err(RenderError::InvalidConfig("arena_chunk_len must be non-zero"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::RenderConfig;
    use crate::RenderError;

    #[test]
    fn default_config_is_valid() {
        assert!(RenderConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_tile_size_is_rejected() {
        let result = RenderConfig::default().with_tile_size(0).validate();
        assert!(matches!(result, Err(RenderError::InvalidConfig(_))));
    }

    #[test]
    fn non_finite_near_clip_is_rejected() {
        let result = RenderConfig::default()
            .with_near_z_clip(f32::NAN)
            .validate();
        assert!(matches!(result, Err(RenderError::InvalidConfig(_))));
    }

    #[test]
    fn wireframe_is_off_by_default() {
        assert!(!RenderConfig::default().wireframe);
        let config = RenderConfig::default().with_wireframe(true);
        assert!(config.wireframe);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_worker_threads_is_rejected() {
        let result = RenderConfig::default().with_worker_threads(0).validate();
        assert!(matches!(result, Err(RenderError::InvalidConfig(_))));
    }
}

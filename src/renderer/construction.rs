use super::*;

impl Renderer {
    /// A renderer with the default config, running on rayon's global pool.
    pub fn new() -> Self {
        Self::from_parts(RenderConfig::default(), Box::new(RayonRuntime::global()))
    }

    /// Validates `config` and builds the worker pool it asks for.
    pub fn with_config(config: RenderConfig) -> Result<Self, RenderError> {
        config.validate()?;
        let runtime = match config.worker_threads {
            Some(worker_threads) => RayonRuntime::with_threads(worker_threads)?,
            None => RayonRuntime::global(),
        };
        tracing::debug!(
            tile_size = config.tile_size,
            worker_threads = runtime.num_threads(),
            "renderer created"
        );
        Ok(Self::from_parts(config, Box::new(runtime)))
    }

    /// Like [`with_config`](Self::with_config), but schedules every phase on `runtime`.
    ///
    /// `config.worker_threads` is ignored.
    pub fn with_runtime(
        config: RenderConfig,
        runtime: impl ParallelRuntime + 'static,
    ) -> Result<Self, RenderError> {
        config.validate()?;
        if config.worker_threads.is_some() {
            tracing::warn!("worker_threads is ignored when a custom runtime is supplied");
        }
        Ok(Self::from_parts(config, Box::new(runtime)))
    }

    fn from_parts(config: RenderConfig, runtime: Box<dyn ParallelRuntime>) -> Self {
        Self {
            arena: FrameArena::new(config.arena_chunk_len),
            config,
            runtime,
            current_state: DrawState::default(),
            draw_queue: Vec::new(),
            target: None,
            tile_grid: TileGrid::default(),
            last_frame_stats: FrameStats::default(),
            last_phase_timings: PhaseTimings::default(),
        }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Floats of arena storage kept between frames.
    pub fn arena_capacity(&self) -> usize {
        self.arena.capacity()
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::SerialRuntime;

    #[test]
    fn with_config_rejects_invalid_config() {
        let config = RenderConfig::default().with_tile_size(0);
        assert!(matches!(
            Renderer::with_config(config),
            Err(RenderError::InvalidConfig(_))
        ));
    }

    #[test]
    fn with_config_builds_a_dedicated_pool() {
        let renderer = Renderer::with_config(RenderConfig::default().with_worker_threads(2));
        assert!(renderer.is_ok());
    }

    #[test]
    fn new_renderer_starts_with_an_empty_queue_and_no_target() {
        let renderer = Renderer::with_runtime(RenderConfig::default(), SerialRuntime).unwrap();
        assert_eq!(renderer.queued_commands(), 0);
        assert_eq!(renderer.tile_grid(), (0, 0));
        assert_eq!(renderer.last_frame_stats(), FrameStats::default());
    }
}

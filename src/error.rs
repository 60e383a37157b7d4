use thiserror::Error;

/// Errors reported by [`Renderer`](crate::Renderer).
///
/// The inner pipeline itself never fails: malformed geometry is discarded and counted in
/// [`FrameStats`](crate::FrameStats). These errors cover configuration and the cheap checks made
/// when a draw command is submitted or a frame is finished.
#[derive(Debug, Error)]
pub enum RenderError {
    /// A configuration value is out of range.
    #[error("invalid render configuration: {0}")]
    InvalidConfig(&'static str),
    /// The dedicated worker pool could not be created.
    #[error("failed to build worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
    /// `submit` was called before `bind_shader`.
    #[error("no vertex/pixel shader pair is bound")]
    ShaderNotBound,
    /// The bound vertex shader does not produce clip-space x, y, z and w.
    #[error("vertex shader declares {0} output params, at least 4 are required")]
    TooFewParams(usize),
    /// The bound vertex buffer is shorter than `num_vertices * num_attribs`.
    #[error("vertex buffer holds {actual} floats, {required} are required")]
    VertexBufferTooSmall { required: usize, actual: usize },
    /// The bound index buffer is shorter than the declared index count.
    #[error("index buffer holds {actual} indices, {required} were declared")]
    IndexBufferTooSmall { required: usize, actual: usize },
    /// `finish` was called with no render target bound.
    #[error("no render target is bound")]
    NoTargetBound,
}

use std::fmt;
use std::sync::Arc;

/// Index of clip-space x in a shaded parameter vector.
pub const PARAM_X: usize = 0;
/// Index of clip-space y in a shaded parameter vector.
pub const PARAM_Y: usize = 1;
/// Index of clip-space z in a shaded parameter vector.
pub const PARAM_Z: usize = 2;
/// Index of clip-space w in a shaded parameter vector.
pub const PARAM_W: usize = 3;
/// Index of the first varying. Everything from here on is interpolated for the pixel shader.
pub const FIRST_VARYING: usize = 4;

/// Transforms raw vertex attributes into shaded parameter vectors.
///
/// Every output vector is `num_params()` floats wide: clip-space x, y, z, w followed by the
/// varyings the pixel shader receives.
pub trait VertexShader: Send + Sync {
    /// Width of each output parameter vector. Must be at least 4.
    fn num_params(&self) -> usize;

    /// Width of each input attribute vector.
    fn num_attribs(&self) -> usize;

    /// Shades `count` vertices.
    ///
    /// `in_attribs` holds `count * num_attribs()` floats and `out_params` holds
    /// `count * num_params()` floats. Called once per batch, possibly from several threads.
    fn process_vertices(
        &self,
        out_params: &mut [f32],
        in_attribs: &[f32],
        uniforms: &UniformBlock,
        count: usize,
    );
}

/// Computes the color of one covered pixel.
pub trait PixelShader: Send + Sync {
    /// `varyings` are the perspective-correct interpolated parameters past clip-space position.
    /// Returns normalized RGBA.
    fn shade_fragment(&self, varyings: &[f32], uniforms: &UniformBlock) -> [f32; 4];
}

/// Opaque uniform data shared by both shaders of a draw command.
///
/// The block is an immutable byte buffer, cheap to clone. Shaders decode it with
/// [`UniformBlock::read`].
///
/// ```
/// use bytemuck::{Pod, Zeroable};
/// use tileraster::UniformBlock;
///
/// #[repr(C)]
/// #[derive(Clone, Copy, Pod, Zeroable, Debug, PartialEq)]
/// struct Tint {
///     rgba: [f32; 4],
/// }
///
/// let block = UniformBlock::from_pod(&Tint { rgba: [1.0, 0.0, 0.0, 1.0] });
/// assert_eq!(block.read::<Tint>(), Some(Tint { rgba: [1.0, 0.0, 0.0, 1.0] }));
/// assert_eq!(block.read::<[f32; 8]>(), None);
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct UniformBlock(Arc<[u8]>);

impl Default for UniformBlock {
    fn default() -> Self {
        Self(Arc::from(Vec::new()))
    }
}

impl UniformBlock {
    pub fn new(bytes: impl Into<Arc<[u8]>>) -> Self {
        Self(bytes.into())
    }

    pub fn from_pod<T: bytemuck::Pod>(value: &T) -> Self {
        Self(Arc::from(bytemuck::bytes_of(value)))
    }

    pub fn bytes(&self) -> &[u8] {
        &self.0
    }

    /// Decodes the block as `T`. Returns `None` when the sizes differ.
    pub fn read<T: bytemuck::Pod>(&self) -> Option<T> {
        if self.0.len() != std::mem::size_of::<T>() {
            return None;
        }
        Some(bytemuck::pod_read_unaligned(&self.0))
    }
}

impl fmt::Debug for UniformBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UniformBlock")
            .field("len", &self.0.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::UniformBlock;

    #[test]
    fn empty_block_rejects_sized_reads() {
        let block = UniformBlock::default();
        assert!(block.bytes().is_empty());
        assert_eq!(block.read::<[f32; 1]>(), None);
    }

    #[test]
    fn read_tolerates_unaligned_storage() {
        let block = UniformBlock::new(vec![0u8, 0, 128, 63]);
        assert_eq!(block.read::<f32>(), Some(1.0));
    }
}

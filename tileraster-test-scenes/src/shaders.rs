use euclid::{default::Transform3D, point3};
use tileraster::{PixelShader, UniformBlock, VertexShader, FIRST_VARYING, PARAM_W};

/// Vertex layout shared by every scene shader: a position and an RGBA color.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ColorVertex {
    pub position: [f32; 4],
    pub color: [f32; 4],
}

impl ColorVertex {
    pub const FLOATS: usize = 8;

    pub fn new(position: [f32; 4], color: [f32; 4]) -> Self {
        Self { position, color }
    }
}

/// Writes the vertex position straight through as clip-space `x, y, z, w` and the color as the
/// four varyings. Its pixel shader returns the interpolated color.
#[derive(Debug, Default, Clone, Copy)]
pub struct PassthroughShader;

impl VertexShader for PassthroughShader {
    fn num_params(&self) -> usize {
        ColorVertex::FLOATS
    }

    fn num_attribs(&self) -> usize {
        ColorVertex::FLOATS
    }

    fn process_vertices(
        &self,
        out_params: &mut [f32],
        in_attribs: &[f32],
        _uniforms: &UniformBlock,
        count: usize,
    ) {
        let len = count * ColorVertex::FLOATS;
        out_params[..len].copy_from_slice(&in_attribs[..len]);
    }
}

impl PixelShader for PassthroughShader {
    fn shade_fragment(&self, varyings: &[f32], _uniforms: &UniformBlock) -> [f32; 4] {
        [varyings[0], varyings[1], varyings[2], varyings[3]]
    }
}

/// Uniform block of [`ProjectedShader`]: a row-major 4x4 matrix in euclid's layout.
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Projection {
    pub matrix: [f32; 16],
}

impl Projection {
    /// Divides x and y by z: `w' = z`, z passes through unchanged.
    pub fn pinhole() -> Self {
        Self::from_transform(&Transform3D::new(
            1.0, 0.0, 0.0, 0.0, //
            0.0, 1.0, 0.0, 0.0, //
            0.0, 0.0, 1.0, 1.0, //
            0.0, 0.0, 0.0, 0.0,
        ))
    }

    pub fn from_transform(transform: &Transform3D<f32>) -> Self {
        Self {
            matrix: transform.to_array(),
        }
    }

    pub fn transform(&self) -> Transform3D<f32> {
        let m = self.matrix;
        Transform3D::new(
            m[0], m[1], m[2], m[3], //
            m[4], m[5], m[6], m[7], //
            m[8], m[9], m[10], m[11], //
            m[12], m[13], m[14], m[15],
        )
    }

    pub fn to_uniforms(&self) -> UniformBlock {
        UniformBlock::from_pod(self)
    }
}

/// Transforms `position.xyz` (w is ignored) by the [`Projection`] in its uniform block.
///
/// Falls back to [`Projection::pinhole`] when no projection is bound.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProjectedShader;

impl VertexShader for ProjectedShader {
    fn num_params(&self) -> usize {
        ColorVertex::FLOATS
    }

    fn num_attribs(&self) -> usize {
        ColorVertex::FLOATS
    }

    fn process_vertices(
        &self,
        out_params: &mut [f32],
        in_attribs: &[f32],
        uniforms: &UniformBlock,
        count: usize,
    ) {
        let transform = uniforms
            .read::<Projection>()
            .unwrap_or_else(Projection::pinhole)
            .transform();
        let vertices: &[ColorVertex] =
            bytemuck::cast_slice(&in_attribs[..count * ColorVertex::FLOATS]);

        for (out, vertex) in out_params.chunks_exact_mut(ColorVertex::FLOATS).zip(vertices) {
            let [x, y, z, _] = vertex.position;
            let clip = transform.transform_point3d_homogeneous(point3(x, y, z));
            out[..PARAM_W + 1].copy_from_slice(&[clip.x, clip.y, clip.z, clip.w]);
            out[FIRST_VARYING..].copy_from_slice(&vertex.color);
        }
    }
}

impl PixelShader for ProjectedShader {
    fn shade_fragment(&self, varyings: &[f32], _uniforms: &UniformBlock) -> [f32; 4] {
        [varyings[0], varyings[1], varyings[2], varyings[3]]
    }
}

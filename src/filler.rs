//! Reference fill unit: interpolates a triangle's parameters at covered pixels, runs the pixel
//! shader and writes the result with optional depth testing and blending.

use smallvec::SmallVec;

use crate::rasterizer::FragmentSink;
use crate::shader::{PixelShader, UniformBlock};
use crate::surface::RenderTarget;
use crate::Color;

/// Per-pixel fill unit, configured once per triangle and fed by the [`Rasterizer`].
///
/// Interpolation is perspective-correct: each vertex is weighted by the reciprocal of its
/// clip-space z, the same quantity the near-plane test uses.
///
/// [`Rasterizer`]: crate::Rasterizer
pub struct ShaderFiller<'a> {
    target: &'a RenderTarget,
    uniforms: Option<&'a UniformBlock>,
    empty_uniforms: UniformBlock,
    pixel_shader: Option<&'a dyn PixelShader>,
    depth_test: bool,
    blend: bool,
    z: [f32; 3],
    one_over_z: [f32; 3],
    varyings: [&'a [f32]; 3],
    scratch: SmallVec<[f32; 16]>,
    pixels_written: u64,
}

impl<'a> ShaderFiller<'a> {
    pub fn new(target: &'a RenderTarget) -> Self {
        Self {
            target,
            uniforms: None,
            empty_uniforms: UniformBlock::default(),
            pixel_shader: None,
            depth_test: false,
            blend: false,
            z: [1.0; 3],
            one_over_z: [1.0; 3],
            varyings: [&[] as &[f32]; 3],
            scratch: SmallVec::new(),
            pixels_written: 0,
        }
    }

    pub fn set_uniforms(&mut self, uniforms: &'a UniformBlock) {
        self.uniforms = Some(uniforms);
    }

    pub fn enable_depth_test(&mut self, enabled: bool) {
        self.depth_test = enabled;
    }

    pub fn set_pixel_shader(&mut self, pixel_shader: &'a dyn PixelShader) {
        self.pixel_shader = Some(pixel_shader);
    }

    pub fn enable_blend(&mut self, enabled: bool) {
        self.blend = enabled;
    }

    /// Sets the clip-space z of the three vertices.
    pub fn set_up_triangle(&mut self, z: [f32; 3]) {
        self.z = z;
        self.one_over_z = z.map(|value| 1.0 / value);
    }

    /// Sets the varyings of the three vertices. All three slices must have the same length.
    pub fn set_up_varyings(&mut self, varyings: [&'a [f32]; 3]) {
        self.varyings = varyings;
    }

    /// Pixels written since the filler was created.
    pub fn pixels_written(&self) -> u64 {
        self.pixels_written
    }

    fn perspective_weights(&self, barycentric: [f32; 3]) -> ([f32; 3], f32) {
        let scaled = [
            barycentric[0] * self.one_over_z[0],
            barycentric[1] * self.one_over_z[1],
            barycentric[2] * self.one_over_z[2],
        ];
        let denominator = scaled[0] + scaled[1] + scaled[2];
        if denominator.is_finite() && denominator > 0.0 {
            let depth = 1.0 / denominator;
            (scaled.map(|weight| weight * depth), depth)
        } else {
            let depth = barycentric[0] * self.z[0]
                + barycentric[1] * self.z[1]
                + barycentric[2] * self.z[2];
            (barycentric, depth)
        }
    }
}

fn blend_over(source: [f32; 4], destination: [f32; 4]) -> [f32; 4] {
    let alpha = source[3];
    let inverse = 1.0 - alpha;
    [
        source[0] * alpha + destination[0] * inverse,
        source[1] * alpha + destination[1] * inverse,
        source[2] * alpha + destination[2] * inverse,
        alpha + destination[3] * inverse,
    ]
}

impl FragmentSink for ShaderFiller<'_> {
    fn shade_pixel(&mut self, x: u32, y: u32, barycentric: [f32; 3]) {
        let Some(pixel_shader) = self.pixel_shader else {
            return;
        };

        let (weights, depth) = self.perspective_weights(barycentric);
        let depth_buffer = self.target.depth_buffer();
        if self.depth_test && depth >= f32::from_bits(depth_buffer.working_pixel(x, y)) {
            return;
        }

        let [a, b, c] = self.varyings;
        self.scratch.clear();
        self.scratch.extend(
            a.iter()
                .zip(b)
                .zip(c)
                .map(|((a, b), c)| a * weights[0] + b * weights[1] + c * weights[2]),
        );

        let uniforms = self.uniforms.unwrap_or(&self.empty_uniforms);
        let mut color = pixel_shader.shade_fragment(&self.scratch, uniforms);

        let color_buffer = self.target.color_buffer();
        if self.blend {
            let destination = Color::from_packed(color_buffer.working_pixel(x, y)).normalize();
            color = blend_over(color, destination);
        }

        color_buffer.write_pixel(x, y, Color::from_normalized(color).to_packed());
        if self.depth_test {
            depth_buffer.write_pixel(x, y, depth.to_bits());
        }
        self.pixels_written += 1;
    }
}

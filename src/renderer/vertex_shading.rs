use std::sync::{Mutex, PoisonError};

use crate::arena::FrameArena;
use crate::runtime::{ParallelRuntime, TaskExtent};

use super::types::DrawCommand;

/// Runs the command's vertex shader over all of its vertices, `batch_size` vertices per task.
///
/// Returns the shaded parameter buffer, `num_vertices * num_params` floats allocated from the
/// frame arena. Returns only after every batch has completed.
pub(super) fn shade_vertices<'f>(
    command: &DrawCommand,
    arena: &'f FrameArena,
    runtime: &dyn ParallelRuntime,
    batch_size: usize,
) -> &'f [f32] {
    let num_params = command.num_params;
    let num_attribs = command.num_attribs;
    let params = arena.alloc_zeroed(command.num_vertices * num_params);
    if params.is_empty() {
        return &[];
    }

    {
        // Each task owns one batch; the locks are never contended.
        let batches: Vec<Mutex<&mut [f32]>> = params
            .chunks_mut(batch_size * num_params)
            .map(Mutex::new)
            .collect();

        runtime.spawn_and_join(TaskExtent::linear(batches.len()), &|index| {
            let first_vertex = index.x * batch_size;
            let count = (command.num_vertices - first_vertex).min(batch_size);
            let attribs =
                &command.vertices[first_vertex * num_attribs..(first_vertex + count) * num_attribs];

            let mut out = batches[index.x]
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            command
                .vertex_shader
                .process_vertices(&mut **out, attribs, &command.uniforms, count);
        });
    }

    params
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;
    use crate::runtime::{RayonRuntime, SerialRuntime};
    use crate::shader::{PixelShader, UniformBlock, VertexShader};

    /// Doubles each attribute into a 4-wide parameter vector and records batch sizes.
    struct RecordingShader {
        batch_counts: Mutex<Vec<usize>>,
        calls: AtomicUsize,
    }

    impl VertexShader for RecordingShader {
        fn num_params(&self) -> usize {
            4
        }

        fn num_attribs(&self) -> usize {
            1
        }

        fn process_vertices(
            &self,
            out_params: &mut [f32],
            in_attribs: &[f32],
            _uniforms: &UniformBlock,
            count: usize,
        ) {
            self.calls.fetch_add(1, Ordering::Relaxed);
            self.batch_counts.lock().unwrap().push(count);
            assert_eq!(out_params.len(), count * 4);
            assert_eq!(in_attribs.len(), count);
            for (out, attrib) in out_params.chunks_mut(4).zip(in_attribs) {
                out.fill(attrib * 2.0);
            }
        }
    }

    struct NoPixels;

    impl PixelShader for NoPixels {
        fn shade_fragment(&self, _varyings: &[f32], _uniforms: &UniformBlock) -> [f32; 4] {
            [0.0; 4]
        }
    }

    fn command(num_vertices: usize, shader: Arc<RecordingShader>) -> DrawCommand {
        let vertices: Vec<f32> = (0..num_vertices).map(|i| i as f32).collect();
        DrawCommand {
            vertices: vertices.into(),
            num_vertices,
            indices: Vec::new().into(),
            num_indices: 0,
            uniforms: UniformBlock::default(),
            vertex_shader: shader,
            pixel_shader: Arc::new(NoPixels),
            num_params: 4,
            num_attribs: 1,
            depth_test: false,
            blend: false,
        }
    }

    fn recording_shader() -> Arc<RecordingShader> {
        Arc::new(RecordingShader {
            batch_counts: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        })
    }

    #[test]
    fn last_batch_receives_the_residual_count() {
        let shader = recording_shader();
        let command = command(37, shader.clone());
        let arena = FrameArena::new(64);
        shade_vertices(&command, &arena, &SerialRuntime, 16);

        assert_eq!(*shader.batch_counts.lock().unwrap(), vec![16, 16, 5]);
    }

    #[test]
    fn every_vertex_lands_at_its_own_offset() {
        let shader = recording_shader();
        let command = command(100, shader.clone());
        let arena = FrameArena::new(64);
        let runtime = RayonRuntime::with_threads(4).unwrap();
        let params = shade_vertices(&command, &arena, &runtime, 16);

        assert_eq!(params.len(), 400);
        assert_eq!(shader.calls.load(Ordering::Relaxed), 7);
        for (vertex, out) in params.chunks(4).enumerate() {
            assert!(out.iter().all(|&value| value == vertex as f32 * 2.0));
        }
    }

    #[test]
    fn empty_command_never_calls_the_shader() {
        let shader = recording_shader();
        let command = command(0, shader.clone());
        let arena = FrameArena::new(64);
        let params = shade_vertices(&command, &arena, &SerialRuntime, 16);

        assert!(params.is_empty());
        assert_eq!(shader.calls.load(Ordering::Relaxed), 0);
    }
}

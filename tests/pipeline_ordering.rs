/// End-to-end checks that compositing follows submission order no matter how the runtime
/// schedules tasks.
use std::sync::Arc;

use tileraster::{
    Color, ParallelRuntime, RayonRuntime, RenderConfig, RenderTarget, Renderer, SerialRuntime,
    TaskExtent, TaskIndex,
};
use tileraster_test_scenes::{MeshBuilder, PassthroughShader};

/// Runs tasks on the calling thread, last index first.
struct ReversedRuntime;

impl ParallelRuntime for ReversedRuntime {
    fn spawn_and_join(&self, extent: TaskExtent, task: &(dyn Fn(TaskIndex) + Sync)) {
        for linear in (0..extent.len()).rev() {
            task(extent.index(linear));
        }
    }
}

/// Runs tasks on the calling thread in a fixed scrambled order.
struct ScrambledRuntime;

impl ParallelRuntime for ScrambledRuntime {
    fn spawn_and_join(&self, extent: TaskExtent, task: &(dyn Fn(TaskIndex) + Sync)) {
        let len = extent.len();
        // Odd indices backwards, then even indices forwards.
        let odd = (0..len).filter(|index| index % 2 == 1).rev();
        let even = (0..len).filter(|index| index % 2 == 0);
        for linear in odd.chain(even) {
            task(extent.index(linear));
        }
    }
}

const SIZE: u32 = 128;

fn renderer(runtime: impl ParallelRuntime + 'static) -> (Renderer, Arc<RenderTarget>) {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut renderer = Renderer::with_runtime(RenderConfig::default(), runtime).unwrap();
    let target = Arc::new(RenderTarget::new(SIZE, SIZE));
    renderer.bind_target(target.clone());
    let shader = Arc::new(PassthroughShader);
    renderer.bind_shader(shader.clone(), shader);
    (renderer, target)
}

fn mesh() -> MeshBuilder {
    MeshBuilder::new(SIZE, SIZE)
}

fn palette(index: usize) -> Color {
    let index = index as u8;
    Color::rgb(index.wrapping_mul(37), index.wrapping_mul(91), index.wrapping_mul(53))
}

#[test]
fn unclipped_triangle_is_binned_once_with_two_or_four_tiles() {
    let (mut renderer, _) = renderer(SerialRuntime);
    mesh()
        .triangle(
            [(32.0, 32.0), (64.0, 96.0), (96.0, 32.0)],
            [2.0; 3],
            Color::WHITE,
        )
        .submit(&mut renderer)
        .unwrap();

    let stats = renderer.finish().unwrap();
    assert_eq!(stats.triangles_binned, 1);
    assert!(matches!(stats.tiles_touched, 2 | 4));
    assert_eq!(stats.bin_entries, stats.tiles_touched);
}

#[test]
fn one_clipped_vertex_reaches_fill_as_two_triangles() {
    let (mut renderer, _) = renderer(SerialRuntime);
    mesh()
        .triangle(
            [(32.0, 32.0), (64.0, 96.0), (96.0, 32.0)],
            [0.5, 2.0, 2.0],
            Color::WHITE,
        )
        .submit(&mut renderer)
        .unwrap();

    let stats = renderer.finish().unwrap();
    assert_eq!(stats.triangles_submitted, 1);
    assert_eq!(stats.triangles_binned, 2);
}

#[test]
fn later_commands_win_under_reversed_scheduling() {
    for (name, runtime) in [
        ("reversed", Box::new(ReversedRuntime) as Box<dyn ParallelRuntime>),
        ("scrambled", Box::new(ScrambledRuntime) as Box<dyn ParallelRuntime>),
    ] {
        let (mut renderer, target) = renderer(BoxedRuntime(runtime));
        for command in 0..20 {
            let inset = command as f32;
            mesh()
                .rect(
                    (inset, inset),
                    (SIZE as f32 - inset, SIZE as f32 - inset),
                    2.0,
                    palette(command),
                )
                .submit(&mut renderer)
                .unwrap();
        }
        renderer.finish().unwrap();

        let color = target.color_buffer();
        assert_eq!(color.pixel(64, 64), Some(palette(19).to_packed()), "{name}");
        assert_eq!(color.pixel(0, 0), Some(palette(0).to_packed()), "{name}");
        assert_eq!(color.pixel(5, 64), Some(palette(5).to_packed()), "{name}");
    }
}

#[test]
fn later_triangles_of_one_command_win() {
    let (mut renderer, target) = renderer(ReversedRuntime);
    let mut mesh = mesh();
    for layer in 0..10 {
        mesh.rect((0.0, 0.0), (SIZE as f32, SIZE as f32), 2.0, palette(layer));
    }
    mesh.submit(&mut renderer).unwrap();
    renderer.finish().unwrap();

    assert_eq!(
        target.color_buffer().pixel(100, 30),
        Some(palette(9).to_packed())
    );
}

#[test]
fn depth_test_picks_the_nearer_surface_in_either_order() {
    for near_first in [true, false] {
        let (mut renderer, target) = renderer(ReversedRuntime);
        renderer.enable_depth_test(true);

        let near = (2.0, Color::rgb(0, 200, 0));
        let far = (6.0, Color::rgb(200, 0, 0));
        let order = if near_first { [near, far] } else { [far, near] };
        for (z, color) in order {
            mesh()
                .rect((10.0, 10.0), (118.0, 118.0), z, color)
                .submit(&mut renderer)
                .unwrap();
        }
        renderer.finish().unwrap();

        assert_eq!(
            target.color_buffer().pixel(64, 64),
            Some(Color::rgb(0, 200, 0).to_packed()),
            "near_first = {near_first}"
        );
    }
}

#[test]
fn blending_composites_in_submission_order() {
    let (mut renderer, target) = renderer(ReversedRuntime);
    mesh()
        .rect((0.0, 0.0), (128.0, 128.0), 2.0, Color::rgb(0, 0, 255))
        .submit(&mut renderer)
        .unwrap();
    renderer.enable_blend(true);
    mesh()
        .rect((0.0, 0.0), (128.0, 128.0), 2.0, Color::rgba(255, 0, 0, 128))
        .submit(&mut renderer)
        .unwrap();
    renderer.finish().unwrap();

    let Color([r, g, b, a]) = Color::from_packed(target.color_buffer().pixel(64, 64).unwrap());
    assert_eq!((r, g, a), (128, 0, 255));
    assert!(b.abs_diff(127) <= 1);
}

#[test]
fn rayon_stress_matches_serial_image() {
    let build = |renderer: &mut Renderer| {
        for command in 0..16 {
            let mut mesh = mesh();
            for slot in 0..64 {
                let x = ((slot * 29 + command * 11) % 112) as f32;
                let y = ((slot * 17 + command * 23) % 112) as f32;
                mesh.rect((x, y), (x + 16.0, y + 16.0), 2.0, palette(command * 64 + slot));
            }
            mesh.submit(renderer).unwrap();
        }
    };

    let (mut serial, serial_target) = renderer(SerialRuntime);
    build(&mut serial);
    let serial_stats = serial.finish().unwrap();

    let config = RenderConfig::default().with_tile_size(16);
    let mut pooled = Renderer::with_runtime(config, RayonRuntime::with_threads(8).unwrap()).unwrap();
    let pooled_target = Arc::new(RenderTarget::new(SIZE, SIZE));
    pooled.bind_target(pooled_target.clone());
    let shader = Arc::new(PassthroughShader);
    pooled.bind_shader(shader.clone(), shader);

    for _ in 0..4 {
        build(&mut pooled);
        let stats = pooled.finish().unwrap();
        assert_eq!(stats.triangles_binned, serial_stats.triangles_binned);
        assert_eq!(stats.pixels_shaded, serial_stats.pixels_shaded);
        assert!(pooled_target.color_buffer().pixels() == serial_target.color_buffer().pixels());
    }
}

#[test]
fn every_triangle_is_accounted_for() {
    let (mut renderer, _) = renderer(SerialRuntime);
    let mut mesh = mesh();
    mesh.rect((10.0, 10.0), (50.0, 50.0), 2.0, Color::WHITE);
    mesh.triangle([(0.0, 0.0), (20.0, 0.0), (0.0, 20.0)], [2.0; 3], Color::WHITE);
    mesh.triangle([(0.0, 0.0), (0.0, 20.0), (20.0, 0.0)], [0.1; 3], Color::WHITE);
    mesh.triangle([(0.0, 0.0), (0.0, 20.0), (20.0, 0.0)], [0.1, 4.0, 4.0], Color::WHITE);
    mesh.triangle(
        [(-300.0, 0.0), (-300.0, 20.0), (-280.0, 0.0)],
        [2.0; 3],
        Color::WHITE,
    );
    mesh.submit(&mut renderer).unwrap();

    let stats = renderer.finish().unwrap();
    assert_eq!(stats.draw_commands, 1);
    assert_eq!(stats.triangles_submitted, 6);
    assert_eq!(stats.triangles_culled, 1);
    assert_eq!(stats.triangles_clipped_away, 1);
    assert_eq!(stats.triangles_offscreen, 1);
    assert_eq!(stats.triangles_binned, 4);
    assert_eq!(renderer.queued_commands(), 0);
}

/// Lets a boxed runtime be handed to `Renderer::with_runtime`.
struct BoxedRuntime(Box<dyn ParallelRuntime>);

impl ParallelRuntime for BoxedRuntime {
    fn spawn_and_join(&self, extent: TaskExtent, task: &(dyn Fn(TaskIndex) + Sync)) {
        self.0.spawn_and_join(extent, task)
    }
}

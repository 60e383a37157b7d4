use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use tileraster::{Color, RenderConfig, RenderTarget, Renderer, SerialRuntime};
use tileraster_test_scenes::{build_main_scene, MeshBuilder, PassthroughShader};

const WIDTH: u32 = 1024;
const HEIGHT: u32 = 768;

/// 32x24 overlapping rects per command, every one a different color.
fn rect_grid(commands: usize) -> Vec<MeshBuilder> {
    (0..commands)
        .map(|command| {
            let mut mesh = MeshBuilder::new(WIDTH, HEIGHT);
            for row in 0..24 {
                for column in 0..32 {
                    let x = (column * 32 + command * 7) as f32;
                    let y = (row * 32 + command * 5) as f32;
                    let shade = ((row * 32 + column + command) % 256) as u8;
                    mesh.rect((x, y), (x + 40.0, y + 40.0), 2.0, Color::rgb(shade, 255 - shade, 96));
                }
            }
            mesh
        })
        .collect()
}

fn bench_finish(c: &mut Criterion) {
    let meshes = rect_grid(8);
    let shader = Arc::new(PassthroughShader);

    let mut group = c.benchmark_group("finish");
    group.sample_size(20);

    for tile_size in [32, 64, 128] {
        let config = RenderConfig::default().with_tile_size(tile_size);
        let mut renderer = Renderer::with_config(config).unwrap();
        renderer.bind_target(Arc::new(RenderTarget::new(WIDTH, HEIGHT)));
        renderer.bind_shader(shader.clone(), shader.clone());
        renderer.enable_blend(true);

        group.bench_with_input(
            BenchmarkId::new("rect_grid_rayon", tile_size),
            &tile_size,
            |b, _| {
                b.iter(|| {
                    for mesh in &meshes {
                        mesh.submit(&mut renderer).unwrap();
                    }
                    black_box(renderer.finish().unwrap())
                });
            },
        );
    }

    let mut serial = Renderer::with_runtime(RenderConfig::default(), SerialRuntime).unwrap();
    serial.bind_target(Arc::new(RenderTarget::new(WIDTH, HEIGHT)));
    serial.bind_shader(shader.clone(), shader.clone());
    serial.enable_blend(true);
    group.bench_function("rect_grid_serial", |b| {
        b.iter(|| {
            for mesh in &meshes {
                mesh.submit(&mut serial).unwrap();
            }
            black_box(serial.finish().unwrap())
        });
    });

    group.finish();
}

fn bench_main_scene(c: &mut Criterion) {
    let mut renderer = Renderer::new();
    renderer.bind_target(Arc::new(RenderTarget::new(
        tileraster_test_scenes::CANVAS_WIDTH,
        tileraster_test_scenes::CANVAS_HEIGHT,
    )));

    c.bench_function("main_scene", |b| {
        b.iter(|| {
            build_main_scene(&mut renderer).unwrap();
            black_box(renderer.finish().unwrap())
        });
    });
}

criterion_group!(benches, bench_finish, bench_main_scene);
criterion_main!(benches);

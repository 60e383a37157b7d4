/// Visual regression tests for the tileraster renderer.
///
/// These tests render scenes into an in-memory render target, then validate specific pixel
/// locations against expected colors.
///
/// Run with:   cargo test --test visual_regression
use std::sync::Arc;

use tileraster::{
    Color, RayonRuntime, RenderConfig, RenderTarget, Renderer, SerialRuntime,
};
use tileraster_test_scenes::expectations::check_surface;
use tileraster_test_scenes::{build_main_scene, PixelExpectation, CANVAS_HEIGHT, CANVAS_WIDTH};

fn render_main_scene(mut renderer: Renderer) -> Arc<RenderTarget> {
    let _ = env_logger::builder().is_test(true).try_init();

    let target = Arc::new(RenderTarget::new(CANVAS_WIDTH, CANVAS_HEIGHT));
    renderer.bind_target(target.clone());

    let expectations = build_main_scene(&mut renderer).unwrap();
    renderer.finish().unwrap();

    let failures = check_surface(target.color_buffer(), &expectations);
    if !failures.is_empty() {
        let message = format!(
            "{} pixel expectation(s) failed:\n{}",
            failures.len(),
            failures.join("\n"),
        );
        panic!("{message}");
    }
    target
}

/// Main regression test: renders every cell and validates pixel expectations.
#[test]
fn main_scene_pixel_expectations() {
    render_main_scene(Renderer::new());
}

/// The serial runtime and a small dedicated pool must produce the same image.
#[test]
fn main_scene_is_identical_across_runtimes() {
    let serial = render_main_scene(
        Renderer::with_runtime(RenderConfig::default(), SerialRuntime).unwrap(),
    );
    let pooled = render_main_scene(
        Renderer::with_runtime(
            RenderConfig::default(),
            RayonRuntime::with_threads(3).unwrap(),
        )
        .unwrap(),
    );

    assert!(serial.color_buffer().pixels() == pooled.color_buffer().pixels());
}

/// Tile size only changes how work is split, never the image.
#[test]
fn main_scene_is_identical_across_tile_sizes() {
    let reference = render_main_scene(Renderer::new());
    for tile_size in [16, 50, 64, 1000] {
        let config = RenderConfig::default().with_tile_size(tile_size);
        let target = render_main_scene(Renderer::with_config(config).unwrap());
        assert!(
            target.color_buffer().pixels() == reference.color_buffer().pixels(),
            "tile size {tile_size} changed the image"
        );
    }
}

/// Regression test: empty draw queue should not crash and leaves the clear color.
#[test]
fn empty_draw_queue() {
    let config = RenderConfig::default().with_clear_color(Color::rgb(10, 20, 30));
    let mut renderer = Renderer::with_config(config).unwrap();
    let target = Arc::new(RenderTarget::new(CANVAS_WIDTH, CANVAS_HEIGHT));
    renderer.bind_target(target.clone());

    let stats = renderer.finish().unwrap();
    assert_eq!(stats.draw_commands, 0);

    let expectations = vec![
        PixelExpectation::opaque(0, 0, 10, 20, 30, "first_pixel"),
        PixelExpectation::opaque(
            CANVAS_WIDTH - 1,
            CANVAS_HEIGHT - 1,
            10,
            20,
            30,
            "last_pixel",
        ),
    ];
    let failures = check_surface(target.color_buffer(), &expectations);
    assert!(failures.is_empty(), "{}", failures.join("\n"));
}

/// Regression test: the target is redrawn from scratch every frame.
#[test]
fn second_frame_does_not_see_the_first() {
    let mut renderer = Renderer::new();
    let target = Arc::new(RenderTarget::new(CANVAS_WIDTH, CANVAS_HEIGHT));
    renderer.bind_target(target.clone());

    build_main_scene(&mut renderer).unwrap();
    renderer.finish().unwrap();
    renderer.finish().unwrap();

    assert!(target.color_buffer().pixels().iter().all(|&pixel| pixel == 0));
}

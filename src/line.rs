//! Bresenham lines bounded to one tile, used by the wireframe fill mode.

use crate::surface::{Surface, TileRect};

/// Cuts the segment down to the part inside `rect` (Liang-Barsky).
fn clip_segment(from: [f32; 2], to: [f32; 2], rect: TileRect) -> Option<([f32; 2], [f32; 2])> {
    let dx = to[0] - from[0];
    let dy = to[1] - from[1];
    let boundaries = [
        (-dx, from[0] - rect.left as f32),
        (dx, rect.right() as f32 - from[0]),
        (-dy, from[1] - rect.top as f32),
        (dy, rect.bottom() as f32 - from[1]),
    ];

    let (mut enter, mut exit) = (0.0f32, 1.0f32);
    for (p, q) in boundaries {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let t = q / p;
        if p < 0.0 {
            if t > exit {
                return None;
            }
            enter = enter.max(t);
        } else {
            if t < enter {
                return None;
            }
            exit = exit.min(t);
        }
    }

    let at = |t: f32| [from[0] + dx * t, from[1] + dy * t];
    Some((at(enter), at(exit)))
}

/// Draws the raster-space segment `from`-`to` into `surface` with `value`, touching only pixels
/// inside `rect`. Returns the number of pixels written.
pub(crate) fn draw_line_clipped(
    surface: &Surface,
    from: [f32; 2],
    to: [f32; 2],
    value: u32,
    rect: TileRect,
) -> u64 {
    if rect.is_empty() || !from.iter().chain(&to).all(|c| c.is_finite()) {
        return 0;
    }
    let Some((from, to)) = clip_segment(from, to, rect) else {
        return 0;
    };

    let (mut x, mut y) = (from[0].floor() as i64, from[1].floor() as i64);
    let (x1, y1) = (to[0].floor() as i64, to[1].floor() as i64);
    let dx = (x1 - x).abs();
    let dy = -(y1 - y).abs();
    let sx = if x < x1 { 1 } else { -1 };
    let sy = if y < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    let x_range = rect.left as i64..rect.right() as i64;
    let y_range = rect.top as i64..rect.bottom() as i64;
    let mut written = 0;
    loop {
        // The clipped end can land on the exclusive right or bottom boundary.
        if x_range.contains(&x) && y_range.contains(&y) {
            surface.write_pixel(x as u32, y as u32, value);
            written += 1;
        }
        if x == x1 && y == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
    written
}

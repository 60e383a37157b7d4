use std::sync::atomic::{AtomicU32, Ordering};

use crate::Color;

/// Packed depth value a depth surface is cleared to: the bits of `f32::INFINITY`.
pub const DEPTH_CLEAR_VALUE: u32 = 0x7f80_0000;

/// A rectangle of pixels, usually the part of one screen tile that lies inside a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileRect {
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
}

impl TileRect {
    /// The rect of tile `(tile_x, tile_y)` clipped to a `surface_width` × `surface_height` area.
    pub fn for_tile(
        tile_x: u32,
        tile_y: u32,
        tile_size: u32,
        surface_width: u32,
        surface_height: u32,
    ) -> Self {
        let left = tile_x * tile_size;
        let top = tile_y * tile_size;
        Self {
            left,
            top,
            width: tile_size.min(surface_width.saturating_sub(left)),
            height: tile_size.min(surface_height.saturating_sub(top)),
        }
    }

    pub fn right(&self) -> u32 {
        self.left + self.width
    }

    pub fn bottom(&self) -> u32 {
        self.top + self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// A 2D array of packed 32-bit pixels.
///
/// Pixels are written through a working buffer. [`flush_tile`](Surface::flush_tile) publishes a
/// rect of the working buffer to the presented buffer that [`pixel`](Surface::pixel) and
/// [`to_rgba8`](Surface::to_rgba8) read. Pixels are atomics so that tiles covering disjoint rects
/// can be written from different threads through `&self`.
pub struct Surface {
    width: u32,
    height: u32,
    working: Box<[AtomicU32]>,
    presented: Box<[AtomicU32]>,
}

impl Surface {
    pub fn new(width: u32, height: u32) -> Self {
        let len = width as usize * height as usize;
        Self {
            width,
            height,
            working: (0..len).map(|_| AtomicU32::new(0)).collect(),
            presented: (0..len).map(|_| AtomicU32::new(0)).collect(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    fn offset(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Sets every working pixel of `rect` to `value`.
    pub fn clear_tile(&self, rect: TileRect, value: u32) {
        for y in rect.top..rect.bottom() {
            let row = self.offset(rect.left, y);
            for pixel in &self.working[row..row + rect.width as usize] {
                pixel.store(value, Ordering::Relaxed);
            }
        }
    }

    /// Publishes the working pixels of `rect`.
    pub fn flush_tile(&self, rect: TileRect) {
        for y in rect.top..rect.bottom() {
            let row = self.offset(rect.left, y);
            let end = row + rect.width as usize;
            for (presented, working) in self.presented[row..end]
                .iter()
                .zip(&self.working[row..end])
            {
                presented.store(working.load(Ordering::Relaxed), Ordering::Relaxed);
            }
        }
    }

    /// Working pixel at `(x, y)`. Panics when out of bounds.
    #[inline]
    pub fn working_pixel(&self, x: u32, y: u32) -> u32 {
        self.working[self.offset(x, y)].load(Ordering::Relaxed)
    }

    /// Writes a working pixel. Panics when out of bounds.
    #[inline]
    pub fn write_pixel(&self, x: u32, y: u32, value: u32) {
        self.working[self.offset(x, y)].store(value, Ordering::Relaxed);
    }

    /// Presented pixel at `(x, y)`, or `None` when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<u32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.presented[self.offset(x, y)].load(Ordering::Relaxed))
    }

    /// Presented pixels, row-major, one packed value per pixel.
    pub fn pixels(&self) -> Vec<u32> {
        self.presented
            .iter()
            .map(|pixel| pixel.load(Ordering::Relaxed))
            .collect()
    }

    /// Presented pixels as RGBA8 bytes, row-major.
    pub fn to_rgba8(&self) -> Vec<u8> {
        self.presented
            .iter()
            .flat_map(|pixel| Color::from_packed(pixel.load(Ordering::Relaxed)).to_array())
            .collect()
    }
}

/// A color surface plus the depth surface used for depth testing.
///
/// Depth values are stored as the bit patterns of `f32`.
pub struct RenderTarget {
    color: Surface,
    depth: Surface,
}

impl RenderTarget {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            color: Surface::new(width, height),
            depth: Surface::new(width, height),
        }
    }

    pub fn width(&self) -> u32 {
        self.color.width()
    }

    pub fn height(&self) -> u32 {
        self.color.height()
    }

    pub fn color_buffer(&self) -> &Surface {
        &self.color
    }

    pub fn depth_buffer(&self) -> &Surface {
        &self.depth
    }
}

//! Tile-space to pixel-space geometry.
//!
//! Three coordinate systems meet here:
//!
//! 1. **Linear tile positions** (u64): row-major index into one region's
//!    tile grid, as produced by the run-length visibility stream.
//! 2. **Tile coordinates** ([`TileRect`]): inclusive (x, y) tile positions
//!    local to one region, `0..width` by `0..height`.
//! 3. **Pixel coordinates** ([`PixelRect`]): absolute canvas pixels, with
//!    exclusive upper bounds.
//!
//! Conversion rules:
//!
//! - Linear → Tile: `x = pos % width`, `y = pos / width`
//! - Tile → Pixel: `grid_index * tile_extent * scale + tile * scale`

/// Tile extent of one region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileGrid {
    /// Tiles per region row.
    pub width: u32,
    /// Tile rows per region.
    pub height: u32,
}

impl TileGrid {
    /// Create a grid of `width` × `height` tiles.
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Total number of tiles in one region.
    pub fn tile_count(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Convert a linear row-major position into (x, y) tile coordinates.
    ///
    /// The caller guarantees `pos < tile_count()` and a non-zero width.
    #[inline]
    pub fn tile_at(&self, pos: u64) -> (u32, u32) {
        let width = self.width as u64;
        ((pos % width) as u32, (pos / width) as u32)
    }

    /// Whether the signed tile position lies inside this grid.
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.width && (y as u32) < self.height
    }

    /// One-tile-thick edges of the region: top, bottom, left, right.
    pub fn border_edges(&self) -> [TileRect; 4] {
        let right = self.width.saturating_sub(1);
        let bottom = self.height.saturating_sub(1);
        [
            TileRect::new(0, 0, right, 0),
            TileRect::new(0, bottom, right, bottom),
            TileRect::new(0, 0, 0, bottom),
            TileRect::new(right, 0, right, bottom),
        ]
    }
}

impl Default for TileGrid {
    fn default() -> Self {
        Self::new(180, 180)
    }
}

/// Inclusive, axis-aligned rectangle in region-local tile space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileRect {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

impl TileRect {
    pub const fn new(x0: u32, y0: u32, x1: u32, y1: u32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// A rectangle covering exactly one tile.
    pub const fn single(x: u32, y: u32) -> Self {
        Self::new(x, y, x, y)
    }
}

#[cfg(test)]
impl TileRect {
    /// Number of tiles covered.
    pub fn tile_count(&self) -> u64 {
        (self.x1 - self.x0 + 1) as u64 * (self.y1 - self.y0 + 1) as u64
    }

    /// Whether the tile at (x, y) is covered.
    pub fn contains(&self, x: u32, y: u32) -> bool {
        (self.x0..=self.x1).contains(&x) && (self.y0..=self.y1).contains(&y)
    }
}

/// Absolute pixel rectangle; `x1`/`y1` are one past the last pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PixelRect {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

impl PixelRect {
    pub fn width(&self) -> u32 {
        self.x1.saturating_sub(self.x0)
    }

    pub fn height(&self) -> u32 {
        self.y1.saturating_sub(self.y0)
    }
}

/// Place a region-local tile rectangle on the canvas.
///
/// # Arguments
///
/// * `rect` - Inclusive tile rectangle inside one region
/// * `grid_x`, `grid_y` - Zero-based column/row of the region in the canvas
/// * `tile_width`, `tile_height` - Region extent in tiles
/// * `scale` - Pixels per tile edge
///
/// # Examples
///
/// ```
/// use overmapper::geometry::{to_pixels, PixelRect, TileRect};
///
/// let px = to_pixels(&TileRect::single(0, 0), 1, 1, 180, 180, 2);
/// assert_eq!(px, PixelRect { x0: 360, y0: 360, x1: 362, y1: 362 });
/// ```
#[inline]
pub fn to_pixels(
    rect: &TileRect,
    grid_x: u32,
    grid_y: u32,
    tile_width: u32,
    tile_height: u32,
    scale: u32,
) -> PixelRect {
    let ox = grid_x * tile_width * scale;
    let oy = grid_y * tile_height * scale;
    PixelRect {
        x0: ox + rect.x0 * scale,
        y0: oy + rect.y0 * scale,
        x1: ox + (rect.x1 + 1) * scale,
        y1: oy + (rect.y1 + 1) * scale,
    }
}

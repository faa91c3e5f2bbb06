//! Render configuration.
//!
//! `MapConfig` bundles everything the compositor needs besides the region
//! index itself. It is passed explicitly into [`Compositor::new`]; nothing in
//! the pipeline reads process-wide settings.
//!
//! [`Compositor::new`]: crate::Compositor::new

use thiserror::Error;

use crate::compositor::Palette;
use crate::geometry::TileGrid;

/// Default region extent in tiles along X.
pub const DEFAULT_TILE_WIDTH: u32 = 180;

/// Default region extent in tiles along Y.
pub const DEFAULT_TILE_HEIGHT: u32 = 180;

/// Default pixels per tile edge.
pub const DEFAULT_SCALE: u32 = 2;

/// Default vertical level to render (ground level in the save format).
pub const DEFAULT_LEVEL: i32 = 10;

/// Default canvas budget in pixels (4 GiB of RGBA).
pub const DEFAULT_MAX_PIXELS: u64 = 1 << 30;

/// Invalid configuration values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("region tile width must be greater than zero")]
    ZeroTileWidth,

    #[error("region tile height must be greater than zero")]
    ZeroTileHeight,

    #[error("scale must be greater than zero")]
    ZeroScale,
}

/// Configuration for one render pass.
#[derive(Clone, Debug, PartialEq)]
pub struct MapConfig {
    /// Tile extent of every region.
    pub grid: TileGrid,

    /// Pixels per tile edge.
    pub scale: u32,

    /// Level whose data is decoded from each fragment.
    pub level: i32,

    /// Colours used for every drawn primitive.
    pub palette: Palette,

    /// Decode fragments on the rayon pool before drawing.
    pub parallel: bool,

    /// Largest canvas, in pixels, a render may allocate.
    pub max_pixels: u64,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            grid: TileGrid::new(DEFAULT_TILE_WIDTH, DEFAULT_TILE_HEIGHT),
            scale: DEFAULT_SCALE,
            level: DEFAULT_LEVEL,
            palette: Palette::default(),
            parallel: false,
            max_pixels: DEFAULT_MAX_PIXELS,
        }
    }
}

impl MapConfig {
    /// Set the region tile extent.
    pub fn with_grid(mut self, width: u32, height: u32) -> Self {
        self.grid = TileGrid::new(width, height);
        self
    }

    /// Set the pixel scale.
    pub fn with_scale(mut self, scale: u32) -> Self {
        self.scale = scale;
        self
    }

    /// Set the level to render.
    pub fn with_level(mut self, level: i32) -> Self {
        self.level = level;
        self
    }

    /// Replace the palette.
    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }

    /// Enable or disable parallel fragment decoding.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Set the canvas pixel budget.
    pub fn with_max_pixels(mut self, max_pixels: u64) -> Self {
        self.max_pixels = max_pixels;
        self
    }

    /// Check that every dimension is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid.width == 0 {
            return Err(ConfigError::ZeroTileWidth);
        }
        if self.grid.height == 0 {
            return Err(ConfigError::ZeroTileHeight);
        }
        if self.scale == 0 {
            return Err(ConfigError::ZeroScale);
        }
        Ok(())
    }

    /// Pixel extent of one region: `(width, height)`.
    ///
    /// Returns `None` when the product overflows `u32`.
    pub fn region_pixels(&self) -> Option<(u32, u32)> {
        Some((
            self.grid.width.checked_mul(self.scale)?,
            self.grid.height.checked_mul(self.scale)?,
        ))
    }
}

//! Colours used by the compositor.

use image::Rgba;

use crate::region::RegionCoord;

/// Colour set for one render pass.
///
/// Grid and origin colours are translucent by default so the overlay
/// tints, rather than hides, the tiles along region borders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    /// Canvas fill; unvisited tiles and absent regions.
    pub background: Rgba<u8>,
    /// Visited tiles.
    pub visited: Rgba<u8>,
    /// Note markers.
    pub note: Rgba<u8>,
    /// Region borders.
    pub grid: Rgba<u8>,
    /// Borders of the region at world (0, 0).
    pub origin: Rgba<u8>,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            background: Rgba([0, 0, 0, 255]),
            visited: Rgba([255, 255, 255, 255]),
            note: Rgba([0, 0, 255, 255]),
            grid: Rgba([255, 0, 0, 180]),
            origin: Rgba([0, 255, 0, 180]),
        }
    }
}

impl Palette {
    /// Border colour for the region at `coord`.
    pub fn border_for(&self, coord: RegionCoord) -> Rgba<u8> {
        if coord.is_origin() {
            self.origin
        } else {
            self.grid
        }
    }
}

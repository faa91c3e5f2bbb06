//! Region discovery.
//!
//! A save directory holds one fragment file per explored region. This module
//! recognizes those files, groups them under a single subject identity and
//! tracks the bounding box of the discovered region grid.

mod filename;
mod index;

pub use filename::{parse_fragment_name, FragmentName};
pub use index::{IndexError, RegionFragment, RegionIndex};

use std::fmt;

/// Signed position of one region in the world grid.
///
/// Y grows northward, matching the compass naming of the bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegionCoord {
    pub x: i32,
    pub y: i32,
}

impl RegionCoord {
    pub const ORIGIN: RegionCoord = RegionCoord { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn is_origin(&self) -> bool {
        *self == Self::ORIGIN
    }
}

impl fmt::Display for RegionCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

/// Inclusive extent of the discovered region grid.
///
/// The default box covers only the world origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BoundingBox {
    pub west: i32,
    pub east: i32,
    pub south: i32,
    pub north: i32,
}

impl BoundingBox {
    /// A box covering exactly one region.
    pub fn around(coord: RegionCoord) -> Self {
        Self {
            west: coord.x,
            east: coord.x,
            south: coord.y,
            north: coord.y,
        }
    }

    /// Widen the box so it covers `coord`.
    pub fn include(&mut self, coord: RegionCoord) {
        self.west = self.west.min(coord.x);
        self.east = self.east.max(coord.x);
        self.south = self.south.min(coord.y);
        self.north = self.north.max(coord.y);
    }

    /// Regions per row (`east - west + 1`).
    pub fn width(&self) -> u64 {
        (self.east as i64 - self.west as i64 + 1) as u64
    }

    /// Regions per column (`north - south + 1`).
    pub fn height(&self) -> u64 {
        (self.north as i64 - self.south as i64 + 1) as u64
    }

    pub fn contains(&self, coord: RegionCoord) -> bool {
        (self.west..=self.east).contains(&coord.x) && (self.south..=self.north).contains(&coord.y)
    }

    /// Every cell of the box with its zero-based grid index.
    ///
    /// Rows run south to north and, within a row, columns run west to east.
    /// Yields `(ix, iy, coord)`.
    pub fn cells(&self) -> impl Iterator<Item = (u32, u32, RegionCoord)> {
        let (west, east) = (self.west, self.east);
        (self.south..=self.north)
            .enumerate()
            .flat_map(move |(iy, y)| {
                (west..=east)
                    .enumerate()
                    .map(move |(ix, x)| (ix as u32, iy as u32, RegionCoord::new(x, y)))
            })
    }
}

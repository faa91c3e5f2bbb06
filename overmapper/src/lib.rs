//! Overmapper - explored-map rendering from per-region save fragments
//!
//! This library reconstructs a single composite visibility map for one
//! subject from a directory of region fragment files and renders it into an
//! RGBA canvas.
//!
//! The pipeline runs in three stages:
//!
//! 1. [`RegionIndex`] discovers `#<identity>.seen.<x>.<y>` fragments directly
//!    under a save directory and computes their bounding box.
//! 2. [`RegionDecoder`] decodes one fragment's run-length visibility stream
//!    and note list for a single level into region-local tile geometry.
//! 3. [`Compositor`] places every decoded primitive on the canvas using the
//!    [`geometry`] transforms and overlays the region grid.
//!
//! # Example
//!
//! ```no_run
//! use overmapper::{Compositor, MapConfig, RegionIndex};
//!
//! let index = RegionIndex::build("save/World")?;
//! let canvas = Compositor::new(MapConfig::default()).render(&index)?;
//! println!("{}: {}x{} pixels", index, canvas.width(), canvas.height());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod compositor;
pub mod config;
pub mod decoder;
pub mod geometry;
pub mod region;

pub use compositor::{Canvas, Compositor, Palette, RenderError, RenderReport};
pub use config::{ConfigError, MapConfig};
pub use decoder::{DecodeError, DecodedRegion, LevelStatus, NotePoint, RegionDecoder, StreamEnd};
pub use geometry::{to_pixels, PixelRect, TileGrid, TileRect};
pub use region::{BoundingBox, IndexError, RegionCoord, RegionFragment, RegionIndex};

/// Version string reported by the CLI.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//! Canvas composition.
//!
//! The compositor walks every cell of the index bounding box, rows south to
//! north and columns west to east, and draws into one RGBA canvas:
//!
//! 1. Visited rectangles of present regions (replace blend)
//! 2. Note markers of present regions (over blend)
//! 3. Border overlay of every region, present or absent (over blend)
//!
//! Each region maps to its own disjoint block of the canvas, so draw order
//! only matters within a region.

mod canvas;
mod palette;

pub use canvas::{blend_over, fill_rect, BlendMode, Canvas};
pub use palette::Palette;

use std::collections::HashMap;

use rayon::prelude::*;
use thiserror::Error;
use tracing::{debug, debug_span, warn};

use crate::config::{ConfigError, MapConfig};
use crate::decoder::{DecodeError, DecodedRegion, LevelStatus, RegionDecoder};
use crate::geometry::{to_pixels, PixelRect, TileRect};
use crate::region::{RegionCoord, RegionIndex};

/// Errors that can occur while rendering.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// The bounding box does not fit in one canvas within the pixel budget.
    #[error("canvas for {regions_wide}x{regions_tall} regions exceeds {max_pixels} pixels")]
    CanvasTooLarge {
        regions_wide: u64,
        regions_tall: u64,
        max_pixels: u64,
    },

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// What happened while rendering, beyond the canvas itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderReport {
    /// Fragments decoded and drawn.
    pub regions_decoded: usize,
    /// Regions whose fragment had no data for the level.
    pub missing_level: Vec<RegionCoord>,
    /// Regions whose run-length stream did not end cleanly.
    pub truncated: Vec<RegionCoord>,
    /// Note markers skipped for lying outside their region.
    pub notes_skipped: usize,
}

impl RenderReport {
    /// No region reported a missing level or a truncated stream.
    pub fn is_clean(&self) -> bool {
        self.missing_level.is_empty() && self.truncated.is_empty()
    }

    fn record(&mut self, coord: RegionCoord, region: &DecodedRegion) {
        self.regions_decoded += 1;

        if region.level == LevelStatus::Missing {
            warn!(coord = %coord, "Fragment has no data for the requested level");
            self.missing_level.push(coord);
        } else if !region.runs.is_complete() {
            warn!(coord = %coord, end = ?region.runs, "Visibility stream ended early");
            self.truncated.push(coord);
        }

        if !region.notes_end.is_complete() {
            debug!(coord = %coord, end = ?region.notes_end, "Note list ended");
        }
    }
}

/// Renders a [`RegionIndex`] into a canvas.
#[derive(Debug, Clone)]
pub struct Compositor {
    config: MapConfig,
    decoder: RegionDecoder,
}

impl Compositor {
    pub fn new(config: MapConfig) -> Self {
        let decoder = RegionDecoder::new(config.grid);
        Self { config, decoder }
    }

    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    /// Render every region of `index` at the configured level.
    ///
    /// Any decode failure aborts the render; no partial canvas is returned.
    pub fn render(&self, index: &RegionIndex) -> Result<Canvas, RenderError> {
        self.render_with_report(index).map(|(canvas, _)| canvas)
    }

    /// Render and also return what was observed while decoding.
    pub fn render_with_report(
        &self,
        index: &RegionIndex,
    ) -> Result<(Canvas, RenderReport), RenderError> {
        self.config.validate()?;
        let (width, height) = self.canvas_size(index)?;
        let palette = &self.config.palette;
        let level = self.config.level;

        let mut canvas = Canvas::from_pixel(width, height, palette.background);
        let mut report = RenderReport::default();

        let mut predecoded = if self.config.parallel {
            self.decode_parallel(index)?
        } else {
            HashMap::new()
        };

        for (ix, iy, coord) in index.bounds().cells() {
            let _span = debug_span!("region", coord = %coord, ix, iy).entered();
            debug!(present = index.contains(coord), "Drawing region");

            if let Some(fragment) = index.get(coord) {
                let region = match predecoded.remove(&coord) {
                    Some(region) => region,
                    None => self.decoder.decode(fragment.path(), level)?,
                };
                report.record(coord, &region);
                report.notes_skipped += self.draw_region(&mut canvas, ix, iy, &region);
            }

            self.draw_border(&mut canvas, ix, iy, coord);
        }

        debug!(
            width,
            height,
            regions_decoded = report.regions_decoded,
            "Render complete"
        );

        Ok((canvas, report))
    }

    fn canvas_size(&self, index: &RegionIndex) -> Result<(u32, u32), RenderError> {
        let too_large = || RenderError::CanvasTooLarge {
            regions_wide: index.width(),
            regions_tall: index.height(),
            max_pixels: self.config.max_pixels,
        };

        let (region_w, region_h) = self.config.region_pixels().ok_or_else(too_large)?;
        let width = index
            .width()
            .checked_mul(region_w as u64)
            .and_then(|w| u32::try_from(w).ok())
            .ok_or_else(too_large)?;
        let height = index
            .height()
            .checked_mul(region_h as u64)
            .and_then(|h| u32::try_from(h).ok())
            .ok_or_else(too_large)?;

        // Checked before allocating; the buffer length must also be addressable
        let pixels = width as u64 * height as u64;
        if pixels > self.config.max_pixels {
            return Err(too_large());
        }
        pixels
            .checked_mul(4)
            .and_then(|bytes| usize::try_from(bytes).ok())
            .ok_or_else(too_large)?;

        Ok((width, height))
    }

    fn decode_parallel(
        &self,
        index: &RegionIndex,
    ) -> Result<HashMap<RegionCoord, DecodedRegion>, RenderError> {
        let level = self.config.level;
        let fragments: Vec<_> = index.fragments().collect();

        debug!(fragments = fragments.len(), "Decoding fragments in parallel");

        let decoded = fragments
            .par_iter()
            .map(|fragment| {
                self.decoder
                    .decode(fragment.path(), level)
                    .map(|region| (fragment.coord(), region))
            })
            .collect::<Result<HashMap<_, _>, _>>()?;

        Ok(decoded)
    }

    /// Draw visited tiles and notes; returns the number of skipped notes.
    fn draw_region(
        &self,
        canvas: &mut Canvas,
        ix: u32,
        iy: u32,
        region: &DecodedRegion,
    ) -> usize {
        let palette = &self.config.palette;
        let grid = self.config.grid;

        for rect in &region.visited {
            let px = self.place(rect, ix, iy);
            fill_rect(canvas, &px, palette.visited, BlendMode::Replace);
        }

        let mut skipped = 0;
        for note in &region.notes {
            if !grid.contains(note.x, note.y) {
                debug!(x = note.x, y = note.y, "Skipping note outside region");
                skipped += 1;
                continue;
            }
            let px = self.place(&TileRect::single(note.x as u32, note.y as u32), ix, iy);
            fill_rect(canvas, &px, palette.note, BlendMode::Over);
        }

        skipped
    }

    fn draw_border(&self, canvas: &mut Canvas, ix: u32, iy: u32, coord: RegionCoord) {
        let color = self.config.palette.border_for(coord);
        for edge in self.config.grid.border_edges() {
            let px = self.place(&edge, ix, iy);
            fill_rect(canvas, &px, color, BlendMode::Over);
        }
    }

    fn place(&self, rect: &TileRect, ix: u32, iy: u32) -> PixelRect {
        let grid = self.config.grid;
        to_pixels(rect, ix, iy, grid.width, grid.height, self.config.scale)
    }
}

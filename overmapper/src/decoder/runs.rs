//! Run-length visibility stream decoding.
//!
//! One line of whitespace-separated `(flag, length)` integer pairs encodes a
//! region's whole tile grid in row-major order. A flag of `1` marks the run
//! as visited; any other flag value is unvisited. The stream has no count or
//! terminator: it ends at the end of the line or at the first pair that does
//! not parse.

use std::str::SplitWhitespace;

use tracing::warn;

use super::StreamEnd;
use crate::geometry::{TileGrid, TileRect};

/// One entry of the run-length stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibilityRun {
    pub visited: bool,
    pub length: u64,
}

/// Iterator over the runs of one stream line.
///
/// Yields `Err(token)` once for the first token that breaks the pairing,
/// after which it is exhausted.
pub struct RunParser<'a> {
    tokens: SplitWhitespace<'a>,
    done: bool,
}

impl<'a> RunParser<'a> {
    pub fn new(line: &'a str) -> Self {
        Self {
            tokens: line.split_whitespace(),
            done: false,
        }
    }
}

impl<'a> Iterator for RunParser<'a> {
    type Item = Result<VisibilityRun, &'a str>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let flag = self.tokens.next()?;
        let result = match (flag.parse::<i64>(), self.tokens.next()) {
            (Err(_), _) => Err(flag),
            // A dangling flag with no length
            (Ok(_), None) => Err(flag),
            (Ok(flag), Some(length)) => match length.parse::<u64>() {
                Ok(length) => Ok(VisibilityRun {
                    visited: flag == 1,
                    length,
                }),
                Err(_) => Err(length),
            },
        };

        if result.is_err() {
            self.done = true;
        }
        Some(result)
    }
}

/// Decoded run stream of one region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedRuns {
    /// Visited rectangles in region-local tile space.
    pub rects: Vec<TileRect>,
    /// How the stream ended.
    pub end: StreamEnd,
    /// Visited tiles dropped for lying past the end of the grid.
    pub clipped_tiles: u64,
}

/// Decode one run-length line into visited rectangles.
///
/// `line_no` is only used to report where a malformed stream stopped.
pub fn decode_runs(line: &str, line_no: usize, grid: TileGrid) -> DecodedRuns {
    let mut rects = Vec::new();
    let mut clipped_tiles = 0u64;
    let mut position = 0u64;
    let mut end = StreamEnd::Complete;

    for run in RunParser::new(line) {
        match run {
            Ok(run) => {
                if run.visited && run.length > 0 {
                    clipped_tiles += split_run(position, run.length, grid, &mut rects);
                }
                position = position.saturating_add(run.length);
            }
            Err(token) => {
                end = StreamEnd::EndedEarly {
                    line: line_no,
                    token: token.to_string(),
                };
            }
        }
    }

    if clipped_tiles > 0 {
        warn!(
            line = line_no,
            clipped_tiles,
            tile_count = grid.tile_count(),
            "Visited runs extend past the region grid, extra tiles dropped"
        );
    }

    DecodedRuns {
        rects,
        end,
        clipped_tiles,
    }
}

/// Split one visited run into at most three rectangles.
///
/// A run on a single row is one rectangle. A run crossing rows becomes a
/// head (rest of the first row), an optional full-width middle block, and a
/// tail (start of the last row). Tiles past the end of the grid are dropped;
/// returns how many were dropped.
pub fn split_run(start: u64, length: u64, grid: TileGrid, out: &mut Vec<TileRect>) -> u64 {
    let total = grid.tile_count();
    if length == 0 {
        return 0;
    }
    if start >= total {
        return length;
    }

    let requested_end = start.saturating_add(length - 1);
    let end = requested_end.min(total - 1);
    let clipped = requested_end - end;

    let (x0, y0) = grid.tile_at(start);
    let (x1, y1) = grid.tile_at(end);
    let last_column = grid.width - 1;

    if y0 == y1 {
        out.push(TileRect::new(x0, y0, x1, y1));
    } else {
        out.push(TileRect::new(x0, y0, last_column, y0));
        if y1 > y0 + 1 {
            out.push(TileRect::new(0, y0 + 1, last_column, y1 - 1));
        }
        out.push(TileRect::new(0, y1, x1, y1));
    }

    clipped
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::BTreeSet;

    const GRID: TileGrid = TileGrid::new(180, 180);

    fn split(start: u64, length: u64, grid: TileGrid) -> Vec<TileRect> {
        let mut out = Vec::new();
        split_run(start, length, grid, &mut out);
        out
    }

    fn covered(rects: &[TileRect]) -> BTreeSet<(u32, u32)> {
        rects
            .iter()
            .flat_map(|r| (r.y0..=r.y1).flat_map(move |y| (r.x0..=r.x1).map(move |x| (x, y))))
            .collect()
    }

    // ========================================================================
    // Run splitting
    // ========================================================================

    #[test]
    fn test_split_same_row() {
        assert_eq!(split(5, 10, GRID), vec![TileRect::new(5, 0, 14, 0)]);
    }

    #[test]
    fn test_split_single_tile() {
        assert_eq!(split(0, 1, GRID), vec![TileRect::single(0, 0)]);
    }

    #[test]
    fn test_split_full_row() {
        assert_eq!(split(180, 180, GRID), vec![TileRect::new(0, 1, 179, 1)]);
    }

    #[test]
    fn test_split_two_rows_has_no_middle() {
        // 170..=189 covers the end of row 0 and the start of row 1
        let rects = split(170, 20, GRID);
        assert_eq!(
            rects,
            vec![TileRect::new(170, 0, 179, 0), TileRect::new(0, 1, 9, 1)]
        );
    }

    #[test]
    fn test_split_three_rows_has_full_width_middle() {
        let rects = split(170, 200, GRID);
        assert_eq!(rects.len(), 3);
        assert_eq!(rects[0], TileRect::new(170, 0, 179, 0));
        assert_eq!(rects[1], TileRect::new(0, 1, 179, 1));
        assert_eq!(rects[2], TileRect::new(0, 2, 9, 2));
    }

    #[test]
    fn test_split_many_rows_single_middle_block() {
        let rects = split(90, 180 * 10, GRID);
        assert_eq!(rects.len(), 3);
        assert_eq!(rects[1], TileRect::new(0, 1, 179, 9));
    }

    #[test]
    fn test_split_whole_grid_from_row_start() {
        // Head and tail are full rows when the run is row aligned
        let rects = split(0, GRID.tile_count(), GRID);
        assert_eq!(
            rects,
            vec![
                TileRect::new(0, 0, 179, 0),
                TileRect::new(0, 1, 179, 178),
                TileRect::new(0, 179, 179, 179),
            ]
        );
    }

    #[test]
    fn test_split_clips_past_grid_end() {
        let grid = TileGrid::new(4, 2);
        let mut out = Vec::new();
        let clipped = split_run(6, 5, grid, &mut out);
        assert_eq!(clipped, 3);
        assert_eq!(out, vec![TileRect::new(2, 1, 3, 1)]);
    }

    #[test]
    fn test_split_entirely_past_grid_end() {
        let grid = TileGrid::new(4, 2);
        let mut out = Vec::new();
        assert_eq!(split_run(8, 3, grid, &mut out), 3);
        assert!(out.is_empty());
    }

    #[test]
    fn test_split_zero_length() {
        assert!(split(3, 0, GRID).is_empty());
    }

    // ========================================================================
    // Stream parsing
    // ========================================================================

    #[test]
    fn test_parser_pairs() {
        let runs: Vec<_> = RunParser::new("0 5 1 3 2 1").collect();
        assert_eq!(
            runs,
            vec![
                Ok(VisibilityRun {
                    visited: false,
                    length: 5
                }),
                Ok(VisibilityRun {
                    visited: true,
                    length: 3
                }),
                Ok(VisibilityRun {
                    visited: false,
                    length: 1
                }),
            ]
        );
    }

    #[test]
    fn test_parser_stops_at_bad_token() {
        let runs: Vec<_> = RunParser::new("1 3 x 4 1 1").collect();
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[1], Err("x"));
    }

    #[test]
    fn test_parser_dangling_flag() {
        let runs: Vec<_> = RunParser::new("1 3 0").collect();
        assert_eq!(runs.last(), Some(&Err("0")));
    }

    #[test]
    fn test_parser_negative_length_is_malformed() {
        let runs: Vec<_> = RunParser::new("1 -3").collect();
        assert_eq!(runs, vec![Err("-3")]);
    }

    #[test]
    fn test_decode_runs_complete() {
        let grid = TileGrid::new(4, 4);
        let decoded = decode_runs("0 2 1 3 0 11", 2, grid);
        assert_eq!(decoded.end, StreamEnd::Complete);
        assert_eq!(decoded.clipped_tiles, 0);
        // Tiles 2..=4: (2,0) (3,0) (0,1)
        assert_eq!(
            covered(&decoded.rects),
            [(2, 0), (3, 0), (0, 1)].into_iter().collect()
        );
    }

    #[test]
    fn test_decode_runs_empty_line_is_complete() {
        let decoded = decode_runs("", 2, GRID);
        assert_eq!(decoded.end, StreamEnd::Complete);
        assert!(decoded.rects.is_empty());
    }

    #[test]
    fn test_decode_runs_ended_early_keeps_prior_runs() {
        let grid = TileGrid::new(4, 4);
        let decoded = decode_runs("1 2 0 2 1 oops 1 4", 7, grid);
        assert_eq!(
            decoded.end,
            StreamEnd::EndedEarly {
                line: 7,
                token: "oops".to_string()
            }
        );
        assert_eq!(decoded.rects, vec![TileRect::new(0, 0, 1, 0)]);
    }

    #[test]
    fn test_decode_runs_only_flag_one_is_visited() {
        let grid = TileGrid::new(4, 4);
        let decoded = decode_runs("2 4 -1 4 1 1", 2, grid);
        assert_eq!(decoded.rects, vec![TileRect::single(0, 2)]);
    }

    // ========================================================================
    // Coverage property
    // ========================================================================

    proptest! {
        #[test]
        fn prop_rects_cover_exactly_visited_tiles(
            width in 1u32..24,
            height in 1u32..24,
            runs in prop::collection::vec((any::<bool>(), 0u64..80), 0..40),
        ) {
            let grid = TileGrid::new(width, height);
            let line = runs
                .iter()
                .map(|(visited, length)| format!("{} {}", u8::from(*visited), length))
                .collect::<Vec<_>>()
                .join(" ");

            let mut expected = BTreeSet::new();
            let mut position = 0u64;
            for (visited, length) in &runs {
                if *visited {
                    for pos in position..position + length {
                        if pos < grid.tile_count() {
                            expected.insert(grid.tile_at(pos));
                        }
                    }
                }
                position += length;
            }

            let decoded = decode_runs(&line, 1, grid);
            prop_assert_eq!(&decoded.end, &StreamEnd::Complete);
            prop_assert_eq!(covered(&decoded.rects), expected);

            for rect in &decoded.rects {
                prop_assert!(rect.x0 <= rect.x1 && rect.y0 <= rect.y1);
                prop_assert!(rect.x1 < width && rect.y1 < height);
            }
        }

        #[test]
        fn prop_multi_row_runs_use_at_most_three_rects(
            start in 0u64..32400,
            length in 1u64..32400,
        ) {
            let rects = split(start, length, GRID);
            prop_assert!(!rects.is_empty() && rects.len() <= 3);
        }
    }
}

//! Region fragment decoding.
//!
//! A fragment is a line-oriented text file. For the requested level it holds:
//!
//! ```text
//! L 10                 <- level marker
//! 0 1800 1 45 0 30555  <- run-length visibility stream
//! E 10                 <- level footer (skipped)
//! 0 32400              <- auxiliary data (skipped)
//! N 12 40              <- note position
//! Fuel depot           <- note body (skipped)
//! ...
//! ```
//!
//! Decoding never fails on malformed content. Each section reports how it
//! ended through [`StreamEnd`] instead, so callers can tell a clean fragment
//! from a truncated or corrupt one.
//!
//! Lines are read as raw bytes. Only the run-length line and note position
//! lines must be UTF-8; skipped lines such as note bodies may hold any
//! encoding.

mod runs;

pub use runs::{decode_runs, split_run, DecodedRuns, RunParser, VisibilityRun};

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::str;

use thiserror::Error;

use crate::geometry::{TileGrid, TileRect};

/// Lines between the run-length stream and the first note.
const FOOTER_LINES: usize = 2;

/// Errors that can occur while reading a fragment.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The fragment could not be opened or read.
    #[error("failed to read fragment {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Whether the level marker was present in the fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelStatus {
    Found,
    /// End of file came before the level marker.
    Missing,
}

/// How one section of a fragment ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEnd {
    /// The section was consumed to its natural end.
    Complete,
    /// The section stopped at a token or line that did not parse.
    EndedEarly {
        /// 1-based line number of the offending line.
        line: usize,
        /// The token (run stream) or whole line (note list) that stopped it.
        token: String,
    },
    /// The file ended before the section began.
    Missing,
}

impl StreamEnd {
    pub fn is_complete(&self) -> bool {
        matches!(self, StreamEnd::Complete)
    }
}

/// A note annotation position in region-local tile space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NotePoint {
    pub x: i32,
    pub y: i32,
}

/// Decoded content of one fragment for one level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedRegion {
    /// Visited tiles as rectangles in region-local tile space.
    pub visited: Vec<TileRect>,
    /// Note positions in file order.
    pub notes: Vec<NotePoint>,
    pub level: LevelStatus,
    /// How the run-length stream ended.
    pub runs: StreamEnd,
    /// How the note list ended.
    pub notes_end: StreamEnd,
}

impl DecodedRegion {
    fn level_missing() -> Self {
        Self {
            visited: Vec::new(),
            notes: Vec::new(),
            level: LevelStatus::Missing,
            runs: StreamEnd::Missing,
            notes_end: StreamEnd::Missing,
        }
    }

    /// Level present and run stream fully consumed.
    pub fn is_clean(&self) -> bool {
        self.level == LevelStatus::Found && self.runs.is_complete()
    }
}

/// The marker line that opens a level's data, e.g. `L 10`.
pub fn level_marker(level: i32) -> String {
    format!("L {}", level)
}

/// Decodes fragments against a fixed region tile grid.
#[derive(Debug, Clone, Copy)]
pub struct RegionDecoder {
    grid: TileGrid,
}

impl RegionDecoder {
    pub fn new(grid: TileGrid) -> Self {
        Self { grid }
    }

    pub fn grid(&self) -> TileGrid {
        self.grid
    }

    /// Decode the fragment at `path` for `level`.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::Io`] if the file cannot be opened or read.
    pub fn decode(&self, path: &Path, level: i32) -> Result<DecodedRegion, DecodeError> {
        let io_error = |source| DecodeError::Io {
            path: path.to_path_buf(),
            source,
        };

        let file = File::open(path).map_err(io_error)?;
        self.decode_reader(BufReader::new(file), level)
            .map_err(io_error)
    }

    /// Decode fragment content from any buffered reader.
    pub fn decode_reader<R: BufRead>(&self, reader: R, level: i32) -> io::Result<DecodedRegion> {
        let marker = level_marker(level);
        let mut cursor = LineCursor::new(reader);

        loop {
            match cursor.next_line()? {
                Some(line) if line == marker.as_bytes() => break,
                Some(_) => {}
                None => return Ok(DecodedRegion::level_missing()),
            }
        }

        let mut region = DecodedRegion {
            level: LevelStatus::Found,
            ..DecodedRegion::level_missing()
        };

        let Some(line) = cursor.next_line()? else {
            return Ok(region);
        };
        let runs = self.decode_run_line(&line, cursor.line_no);
        region.visited = runs.rects;
        region.runs = runs.end;

        for _ in 0..FOOTER_LINES {
            if cursor.next_line()?.is_none() {
                return Ok(region);
            }
        }

        region.notes_end = loop {
            let Some(line) = cursor.next_line()? else {
                break StreamEnd::Complete;
            };

            match str::from_utf8(&line).ok().and_then(parse_note_line) {
                Some(note) => {
                    region.notes.push(note);
                    // Note body
                    if cursor.next_line()?.is_none() {
                        break StreamEnd::Complete;
                    }
                }
                None => {
                    break StreamEnd::EndedEarly {
                        line: cursor.line_no,
                        token: String::from_utf8_lossy(&line).into_owned(),
                    };
                }
            }
        };

        Ok(region)
    }

    /// Decode the run-length line.
    ///
    /// Invalid UTF-8 becomes U+FFFD, which never parses as an integer, so the
    /// stream ends at the token holding the first bad byte.
    fn decode_run_line(&self, line: &[u8], line_no: usize) -> DecodedRuns {
        decode_runs(&String::from_utf8_lossy(line), line_no, self.grid)
    }
}

/// Parse an `N <x> <y>` note position line. Tokens after `y` are ignored.
fn parse_note_line(line: &str) -> Option<NotePoint> {
    let mut tokens = line.strip_prefix('N')?.split_whitespace();
    let x = tokens.next()?.parse().ok()?;
    let y = tokens.next()?.parse().ok()?;
    Some(NotePoint { x, y })
}

/// Raw line reader that tracks 1-based line numbers.
///
/// Strips a trailing `\n` or `\r\n`; never decodes the bytes.
struct LineCursor<R> {
    reader: R,
    line_no: usize,
}

impl<R: BufRead> LineCursor<R> {
    fn new(reader: R) -> Self {
        Self { reader, line_no: 0 }
    }

    fn next_line(&mut self) -> io::Result<Option<Vec<u8>>> {
        let mut line = Vec::new();
        if self.reader.read_until(b'\n', &mut line)? == 0 {
            return Ok(None);
        }
        self.line_no += 1;

        if line.last() == Some(&b'\n') {
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
        }
        Ok(Some(line))
    }
}

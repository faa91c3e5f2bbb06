//! Region index built from a save directory scan.

use std::collections::BTreeMap;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, trace, warn};

use super::filename::{parse_fragment_name, FragmentName};
use super::{BoundingBox, RegionCoord};

/// Errors that can occur while discovering fragments.
#[derive(Debug, Error)]
pub enum IndexError {
    /// Fragments for more than one subject were found.
    #[error("multiple subjects detected: {first:?} and {second:?} (at {})", .path.display())]
    MultipleSubjects {
        first: String,
        second: String,
        path: PathBuf,
    },

    /// The directory held no fragment files.
    #[error("no seen files found in {}", .0.display())]
    NoFragmentsFound(PathBuf),

    /// The save directory could not be listed.
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// One discovered fragment file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionFragment {
    coord: RegionCoord,
    path: PathBuf,
}

impl RegionFragment {
    pub fn new(coord: RegionCoord, path: impl Into<PathBuf>) -> Self {
        Self {
            coord,
            path: path.into(),
        }
    }

    pub fn coord(&self) -> RegionCoord {
        self.coord
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// All fragments of one subject, keyed by region coordinate.
///
/// Built once by [`RegionIndex::build`] and read-only afterwards. An index
/// always holds at least one fragment and exactly one subject identity.
#[derive(Debug, Clone)]
pub struct RegionIndex {
    identity: String,
    fragments: BTreeMap<RegionCoord, RegionFragment>,
    bounds: BoundingBox,
}

impl RegionIndex {
    /// Discover the fragments directly under `root`.
    ///
    /// Subdirectories are skipped without being descended into, and entries
    /// whose names are not fragment names are ignored. Entries are visited in
    /// lexical name order.
    ///
    /// # Errors
    ///
    /// - [`IndexError::Io`] if `root` cannot be listed
    /// - [`IndexError::MultipleSubjects`] if two fragments disagree on identity
    /// - [`IndexError::NoFragmentsFound`] if nothing matched
    pub fn build(root: impl AsRef<Path>) -> Result<Self, IndexError> {
        let root = root.as_ref();
        let entries = std::fs::read_dir(root).map_err(|source| IndexError::Io {
            path: root.to_path_buf(),
            source,
        })?;

        let mut candidates = Vec::new();
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(root = %root.display(), error = %e, "Skipping unreadable entry");
                    continue;
                }
            };

            let path = entry.path();
            let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
            if is_dir {
                trace!(path = %path.display(), "Skipping subdirectory");
                continue;
            }

            candidates.push((entry.file_name(), path));
        }
        candidates.sort();

        let mut builder = IndexBuilder::default();
        for (name, path) in candidates {
            let Some(name) = name.to_str() else {
                trace!(path = %path.display(), "Ignoring non UTF-8 file name");
                continue;
            };

            match parse_fragment_name(name) {
                FragmentName::Matched { identity, x, y } => {
                    builder.insert(identity, RegionCoord::new(x, y), path)?;
                }
                FragmentName::NotMatched => {
                    trace!(path = %path.display(), "Ignoring non-fragment file");
                }
            }
        }

        let index = builder
            .finish()
            .ok_or_else(|| IndexError::NoFragmentsFound(root.to_path_buf()))?;

        debug!(
            identity = %index.identity,
            fragments = index.len(),
            west = index.bounds.west,
            east = index.bounds.east,
            south = index.bounds.south,
            north = index.bounds.north,
            "Region index built"
        );

        Ok(index)
    }

    /// Subject identity shared by every fragment.
    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn bounds(&self) -> BoundingBox {
        self.bounds
    }

    /// Regions per row of the bounding box.
    pub fn width(&self) -> u64 {
        self.bounds.width()
    }

    /// Regions per column of the bounding box.
    pub fn height(&self) -> u64 {
        self.bounds.height()
    }

    /// Number of discovered fragments.
    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    /// Always false; construction fails on an empty directory.
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    pub fn get(&self, coord: RegionCoord) -> Option<&RegionFragment> {
        self.fragments.get(&coord)
    }

    pub fn contains(&self, coord: RegionCoord) -> bool {
        self.fragments.contains_key(&coord)
    }

    /// Fragments in coordinate order.
    pub fn fragments(&self) -> impl Iterator<Item = &RegionFragment> {
        self.fragments.values()
    }
}

impl fmt::Display for RegionIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Map {}x{} ({})", self.width(), self.height(), self.len())
    }
}

/// Accumulates fragments during a scan.
///
/// The bounding box starts at the world origin so the origin region is
/// always part of the rendered map.
#[derive(Default)]
struct IndexBuilder {
    identity: Option<String>,
    fragments: BTreeMap<RegionCoord, RegionFragment>,
    bounds: BoundingBox,
}

impl IndexBuilder {
    fn insert(
        &mut self,
        identity: String,
        coord: RegionCoord,
        path: PathBuf,
    ) -> Result<(), IndexError> {
        let first = self.identity.get_or_insert_with(|| identity.clone());
        if *first != identity {
            return Err(IndexError::MultipleSubjects {
                first: first.clone(),
                second: identity,
                path,
            });
        }

        self.bounds.include(coord);

        if let Some(previous) = self.fragments.insert(coord, RegionFragment::new(coord, path)) {
            warn!(
                coord = %coord,
                replaced = %previous.path().display(),
                "Duplicate fragment coordinate, keeping the later file"
            );
        }

        Ok(())
    }

    fn finish(self) -> Option<RegionIndex> {
        Some(RegionIndex {
            identity: self.identity?,
            bounds: self.bounds,
            fragments: self.fragments,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, b"# version 1\n").unwrap();
        path
    }

    #[test]
    fn test_build_single_fragment() {
        let temp = TempDir::new().unwrap();
        let path = touch(temp.path(), "#Zm9v.seen.0.0");

        let index = RegionIndex::build(temp.path()).unwrap();

        assert_eq!(index.identity(), "Zm9v");
        assert_eq!(index.len(), 1);
        assert_eq!(index.width(), 1);
        assert_eq!(index.height(), 1);
        let fragment = index.get(RegionCoord::ORIGIN).unwrap();
        assert_eq!(fragment.path(), path.as_path());
        assert_eq!(fragment.coord(), RegionCoord::ORIGIN);
    }

    #[test]
    fn test_build_bounding_box() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "#Zm9v.seen.-1.2");
        touch(temp.path(), "#Zm9v.seen.3.-4");
        touch(temp.path(), "#Zm9v.seen.0.0");

        let index = RegionIndex::build(temp.path()).unwrap();
        let bounds = index.bounds();

        assert_eq!(bounds.west, -1);
        assert_eq!(bounds.east, 3);
        assert_eq!(bounds.north, 2);
        assert_eq!(bounds.south, -4);
        assert_eq!(index.width(), 5);
        assert_eq!(index.height(), 7);
        assert_eq!(index.to_string(), "Map 5x7 (3)");
    }

    #[test]
    fn test_build_bounding_box_includes_origin() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "#Zm9v.seen.2.3");

        let index = RegionIndex::build(temp.path()).unwrap();
        let bounds = index.bounds();

        assert!(bounds.contains(RegionCoord::ORIGIN));
        assert_eq!((bounds.west, bounds.east), (0, 2));
        assert_eq!((bounds.south, bounds.north), (0, 3));
        assert_eq!(index.to_string(), "Map 3x4 (1)");
        assert!(!index.contains(RegionCoord::ORIGIN));
    }

    #[test]
    fn test_build_empty_directory() {
        let temp = TempDir::new().unwrap();

        let result = RegionIndex::build(temp.path());
        assert!(matches!(result, Err(IndexError::NoFragmentsFound(_))));
    }

    #[test]
    fn test_build_only_unrelated_files() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "master.gsav");
        touch(temp.path(), "#Zm9v.sav");

        let result = RegionIndex::build(temp.path());
        assert!(matches!(result, Err(IndexError::NoFragmentsFound(_))));
    }

    #[test]
    fn test_build_multiple_subjects() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "#QWxpY2U=.seen.0.0");
        touch(temp.path(), "#Qm9i.seen.1.0");

        let result = RegionIndex::build(temp.path());
        match result {
            Err(IndexError::MultipleSubjects { first, second, .. }) => {
                // Lexical order makes the first identity deterministic
                assert_eq!(first, "QWxpY2U=");
                assert_eq!(second, "Qm9i");
            }
            other => panic!("expected MultipleSubjects, got {:?}", other),
        }
    }

    #[test]
    fn test_build_skips_subdirectories() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "#Zm9v.seen.0.0");

        // Fragments below the root, even for another subject, are not seen
        let nested = temp.path().join("#Zm9v.seen.9.9");
        std::fs::create_dir_all(&nested).unwrap();
        touch(&nested, "#Qm9i.seen.5.5");

        let index = RegionIndex::build(temp.path()).unwrap();
        assert_eq!(index.len(), 1);
        assert!(index.contains(RegionCoord::ORIGIN));
        assert!(!index.contains(RegionCoord::new(9, 9)));
        assert!(!index.contains(RegionCoord::new(5, 5)));
    }

    #[test]
    fn test_build_missing_root() {
        let result = RegionIndex::build("/nonexistent/overmapper/save");
        assert!(matches!(result, Err(IndexError::Io { .. })));
    }

    #[test]
    fn test_build_duplicate_coordinate_keeps_later() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "#Zm9v.seen.-0.0");
        let later = touch(temp.path(), "#Zm9v.seen.0.0");

        let index = RegionIndex::build(temp.path()).unwrap();
        assert_eq!(index.len(), 1);
        assert_eq!(
            index.get(RegionCoord::ORIGIN).unwrap().path(),
            later.as_path()
        );
    }

    #[test]
    fn test_fragments_in_coordinate_order() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "#Zm9v.seen.2.0");
        touch(temp.path(), "#Zm9v.seen.-2.0");
        touch(temp.path(), "#Zm9v.seen.0.1");

        let index = RegionIndex::build(temp.path()).unwrap();
        let coords: Vec<_> = index.fragments().map(|f| f.coord()).collect();
        assert_eq!(
            coords,
            vec![
                RegionCoord::new(-2, 0),
                RegionCoord::new(0, 1),
                RegionCoord::new(2, 0),
            ]
        );
    }

    #[test]
    fn test_index_error_display() {
        let err = IndexError::NoFragmentsFound(PathBuf::from("/saves/World"));
        assert_eq!(err.to_string(), "no seen files found in /saves/World");

        let err = IndexError::MultipleSubjects {
            first: "a".to_string(),
            second: "b".to_string(),
            path: PathBuf::from("/saves/World/#b.seen.0.0"),
        };
        assert!(err.to_string().contains("multiple subjects detected"));
    }
}

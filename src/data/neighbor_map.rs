//! Ranked neighbor lists per relation source, memoized to disk.
//!
//! Each relation source is one CSV of pairwise similarity frequencies
//! (conceptually one per chromosome). The builder registers every pair
//! symmetrically and sorts each cell's neighbors by descending frequency.
//! The result is cached as a JSON blob inside the input directory so
//! subsequent runs skip the CSV scan entirely.

use crate::error::{RankError, Result};
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use std::time::UNIX_EPOCH;

/// Cell identifier.
pub type CellId = u32;

/// Pairwise similarity frequency (count of shared motifs).
pub type Frequency = u64;

/// Neighbor lists for one relation source, keyed by cell.
///
/// Each list is ordered by descending frequency; ties keep input row order.
pub type SourceNeighbors = BTreeMap<CellId, Vec<(CellId, Frequency)>>;

/// File name of the serialized neighbor-map cache inside an input directory.
pub const CACHE_FILE: &str = "neighbor_map_cache.json";

/// How to treat an existing cache file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CachePolicy {
    /// Load a present cache unconditionally. A stale cache silently shadows
    /// changed input files; delete the cache file to force a rebuild.
    Trusting,
    /// Compare the cached per-file stamps (name, size, mtime) against the
    /// directory and rebuild on any mismatch.
    Fingerprint,
}

/// Size/mtime stamp of one source file, stored in the cache for validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct FileStamp {
    name: String,
    len: u64,
    mtime_secs: u64,
}

#[derive(Debug, Serialize, Deserialize)]
struct CacheBlob {
    stamps: Vec<FileStamp>,
    sources: BTreeMap<String, SourceNeighbors>,
}

/// Per-source ranked neighbor lists for every cell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NeighborMap {
    sources: BTreeMap<String, SourceNeighbors>,
}

impl NeighborMap {
    /// Wrap already-built per-source neighbor lists.
    pub fn from_sources(sources: BTreeMap<String, SourceNeighbors>) -> Self {
        Self { sources }
    }

    /// Build the neighbor map for a directory of pairwise-frequency CSVs,
    /// or load it from the cache file if one is present.
    ///
    /// Every `*.csv` file in `dir` is one relation source. A malformed row
    /// anywhere fails the whole build and nothing is cached. An empty
    /// directory yields an empty map.
    pub fn build<P: AsRef<Path>>(dir: P, policy: CachePolicy) -> Result<Self> {
        let dir = dir.as_ref();
        let cache_path = dir.join(CACHE_FILE);

        if cache_path.exists() {
            let file = File::open(&cache_path)?;
            let blob: CacheBlob = serde_json::from_reader(BufReader::new(file))?;
            match policy {
                CachePolicy::Trusting => {
                    info!("loading cached neighbor map from {}", cache_path.display());
                    return Ok(Self::from_sources(blob.sources));
                }
                CachePolicy::Fingerprint => {
                    if blob.stamps == collect_stamps(dir)? {
                        info!("loading validated neighbor map cache");
                        return Ok(Self::from_sources(blob.sources));
                    }
                    info!("neighbor map cache is stale, rebuilding");
                }
            }
        }

        info!("building neighbor map from {}", dir.display());
        let mut sources = BTreeMap::new();
        for name in source_files(dir)? {
            let path = dir.join(&name);
            sources.insert(name, read_source(&path)?);
        }

        let blob = CacheBlob {
            stamps: collect_stamps(dir)?,
            sources,
        };
        // Flush before returning: a write error must fail the build
        // instead of leaving a truncated cache behind.
        let mut writer = BufWriter::new(File::create(&cache_path)?);
        serde_json::to_writer(&mut writer, &blob)?;
        writer.flush()?;

        Ok(Self::from_sources(blob.sources))
    }

    /// Iterate relation sources in deterministic (file name) order.
    pub fn sources(&self) -> impl Iterator<Item = (&str, &SourceNeighbors)> {
        self.sources.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Neighbor lists of one relation source, by file name.
    pub fn get(&self, source: &str) -> Option<&SourceNeighbors> {
        self.sources.get(source)
    }

    /// Number of relation sources.
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// Whether the map holds no sources.
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// All cell ids appearing in any source, ascending and unique.
    pub fn all_cells(&self) -> Vec<CellId> {
        let mut cells = BTreeSet::new();
        for neighbors in self.sources.values() {
            for (&cell, list) in neighbors {
                cells.insert(cell);
                cells.extend(list.iter().map(|&(n, _)| n));
            }
        }
        cells.into_iter().collect()
    }
}

/// CSV file names in `dir`, sorted for deterministic source ordering.
fn source_files(dir: &Path) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.ends_with(".csv") && entry.file_type()?.is_file() {
            names.push(name);
        }
    }
    names.sort();
    Ok(names)
}

fn collect_stamps(dir: &Path) -> Result<Vec<FileStamp>> {
    let mut stamps = Vec::new();
    for name in source_files(dir)? {
        let meta = std::fs::metadata(dir.join(&name))?;
        let mtime_secs = meta
            .modified()?
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        stamps.push(FileStamp {
            name,
            len: meta.len(),
            mtime_secs,
        });
    }
    Ok(stamps)
}

/// Read one pairwise-frequency CSV into symmetric, rank-sorted neighbor lists.
///
/// Required header-named columns: `Item 1`, `Item 2`, `Frequency`; column
/// order is free and extra columns are ignored.
fn read_source(path: &Path) -> Result<SourceNeighbors> {
    let display = path.display().to_string();
    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?.clone();
    let column = |name: &str| -> Result<usize> {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| RankError::MissingColumn {
                column: name.to_string(),
                path: display.clone(),
            })
    };
    let item1 = column("Item 1")?;
    let item2 = column("Item 2")?;
    let frequency = column("Frequency")?;

    let mut neighbors: SourceNeighbors = BTreeMap::new();
    for (row, record) in reader.records().enumerate() {
        let record = record?;
        let cell = |idx: usize| -> Result<CellId> {
            let value = record.get(idx).unwrap_or("");
            value
                .trim()
                .parse()
                .map_err(|_| RankError::InvalidCellId {
                    value: value.to_string(),
                    row,
                    path: display.clone(),
                })
        };
        let a = cell(item1)?;
        let b = cell(item2)?;
        let raw = record.get(frequency).unwrap_or("");
        let freq: Frequency = raw
            .trim()
            .parse()
            .map_err(|_| RankError::InvalidFrequency {
                value: raw.to_string(),
                row,
                path: display.clone(),
            })?;

        neighbors.entry(a).or_default().push((b, freq));
        neighbors.entry(b).or_default().push((a, freq));
    }

    // Stable sort keeps input row order among equal frequencies.
    for list in neighbors.values_mut() {
        list.sort_by(|x, y| y.1.cmp(&x.1));
    }

    Ok(neighbors)
}

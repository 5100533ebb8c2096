//! Core data structures (neighbor maps, phase metadata, removal reports).

mod neighbor_map;
mod phases;
mod report;

pub use neighbor_map::{
    CachePolicy, CellId, Frequency, NeighborMap, SourceNeighbors, CACHE_FILE,
};
pub use phases::{CellPhases, UNKNOWN_PHASE};
pub use report::{RankReport, RemovalRecord};

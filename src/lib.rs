//! Iterative PageRank-based core cell selection for single-cell Hi-C data.
//!
//! Given one pairwise-similarity table per chromosome, this library finds
//! the subset of cells that stay mutually well-connected across all of
//! them: each iteration scores every cell with PageRank on per-chromosome
//! top-K neighbor graphs, aggregates the scores with a trimmed sum, and
//! cuts the least central cells at the elbow of the score curve until no
//! distinct elbow remains.
//!
//! # Overview
//!
//! The library is organized into composable modules:
//!
//! - **data**: Neighbor maps (with a disk cache), phase metadata, reports
//! - **centrality**: Directed top-K neighbor graphs and PageRank
//! - **aggregate**: Trimmed summation of per-source scores
//! - **elbow**: Knee-point detection on the sorted score curve
//! - **pipeline**: The iteration driver owning the active set
//!
//! # Example
//!
//! ```no_run
//! use schic_rank::prelude::*;
//!
//! let map = NeighborMap::build("pairwise/K4", CachePolicy::Trusting).unwrap();
//! let phases = CellPhases::from_csv("phases.csv").unwrap();
//!
//! let controller = RankController::new(RankConfig::default(), phases);
//! let report = controller.run(&map, map.all_cells()).unwrap();
//! report.to_csv("final_active_cells.csv").unwrap();
//! ```

pub mod aggregate;
pub mod centrality;
pub mod data;
pub mod elbow;
pub mod error;
pub mod pipeline;

/// Convenient re-exports for common usage.
pub mod prelude {
    pub use crate::aggregate::{aggregate_scores, trimmed_sum, TrimConfig};
    pub use crate::centrality::{pagerank, score_source, KnnGraph, PageRankOptions};
    pub use crate::data::{
        CachePolicy, CellId, CellPhases, Frequency, NeighborMap, RankReport, RemovalRecord,
        SourceNeighbors, CACHE_FILE, UNKNOWN_PHASE,
    };
    pub use crate::elbow::find_elbow;
    pub use crate::error::{RankError, Result};
    pub use crate::pipeline::{
        IterationObserver, IterationSnapshot, NoopObserver, PrunePolicy, RankConfig,
        RankController,
    };
}

//! Per-source centrality over directed top-K neighbor graphs.

mod graph;
mod pagerank;

pub use graph::KnnGraph;
pub use pagerank::{pagerank, PageRankOptions};

use crate::data::{CellId, SourceNeighbors};
use crate::error::Result;
use std::collections::BTreeMap;

/// Score one relation source against the current active set.
///
/// Builds the directed top-`k` neighbor graph restricted to `active` and
/// returns one PageRank score per active cell.
pub fn score_source(
    neighbors: &SourceNeighbors,
    active: &[CellId],
    k: usize,
    opts: &PageRankOptions,
) -> Result<BTreeMap<CellId, f64>> {
    let graph = KnnGraph::build(neighbors, active, k);
    pagerank(&graph, opts)
}

//! Directed top-K neighbor graph over the active cell set.

use crate::data::{CellId, SourceNeighbors};
use std::collections::HashMap;

/// Directed graph whose nodes are the active cells of one iteration.
///
/// Node indices are positions in the ascending-sorted cell list; each node
/// has out-edges to its first `k` active neighbors by descending frequency.
/// Cells absent from the source, or with fewer than `k` active neighbors,
/// simply have fewer or zero out-edges.
#[derive(Debug, Clone)]
pub struct KnnGraph {
    cells: Vec<CellId>,
    out_edges: Vec<Vec<usize>>,
}

impl KnnGraph {
    /// Build the graph for one relation source against the active set.
    ///
    /// "Top-K" means the first `k` entries of the neighbor list after
    /// filtering to active cells; the lists arrive pre-sorted from the
    /// neighbor map and are not re-sorted here.
    pub fn build(neighbors: &SourceNeighbors, active: &[CellId], k: usize) -> Self {
        let mut cells = active.to_vec();
        cells.sort_unstable();
        cells.dedup();

        let index: HashMap<CellId, usize> = cells
            .iter()
            .enumerate()
            .map(|(i, &cell)| (cell, i))
            .collect();

        let mut out_edges = vec![Vec::new(); cells.len()];
        for (i, cell) in cells.iter().enumerate() {
            let Some(list) = neighbors.get(cell) else {
                continue;
            };
            for &(neighbor, _) in list
                .iter()
                .filter(|(n, _)| index.contains_key(n))
                .take(k)
            {
                let j = index[&neighbor];
                // Duplicate pairs in the input collapse to one edge.
                if !out_edges[i].contains(&j) {
                    out_edges[i].push(j);
                }
            }
        }

        Self { cells, out_edges }
    }

    /// Number of nodes (active cells).
    pub fn n_nodes(&self) -> usize {
        self.cells.len()
    }

    /// Node cells in ascending id order.
    pub fn cells(&self) -> &[CellId] {
        &self.cells
    }

    /// Out-edge target indices of node `i`.
    pub fn out_edges(&self, i: usize) -> &[usize] {
        &self.out_edges[i]
    }
}

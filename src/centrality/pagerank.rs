//! Stationary-distribution centrality by power iteration.

use crate::centrality::KnnGraph;
use crate::data::CellId;
use crate::error::{RankError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// PageRank parameters: random walk with uniform teleportation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageRankOptions {
    /// Damping factor (probability of following an edge).
    pub damping: f64,
    /// Convergence threshold; iteration stops when the L1 change drops
    /// below `n * tol`.
    pub tol: f64,
    /// Maximum number of power-iteration sweeps.
    pub max_iter: usize,
}

impl Default for PageRankOptions {
    fn default() -> Self {
        Self {
            damping: 0.85,
            tol: 1e-6,
            max_iter: 100,
        }
    }
}

/// Compute PageRank scores for every node of the graph.
///
/// Dangling nodes redistribute their mass uniformly, so graphs with
/// isolated nodes are valid inputs: an empty graph yields an empty map and
/// an edge-free graph yields the uniform distribution. The node order,
/// edge order and summation order are all fixed, making the result
/// bit-reproducible for identical inputs.
pub fn pagerank(graph: &KnnGraph, opts: &PageRankOptions) -> Result<BTreeMap<CellId, f64>> {
    let n = graph.n_nodes();
    if n == 0 {
        return Ok(BTreeMap::new());
    }
    let n_f = n as f64;
    let teleport = (1.0 - opts.damping) / n_f;

    let mut scores = vec![1.0 / n_f; n];
    for _ in 0..opts.max_iter {
        let mut next = vec![0.0; n];
        let mut dangling = 0.0;
        for (i, &score) in scores.iter().enumerate() {
            let out = graph.out_edges(i);
            if out.is_empty() {
                dangling += score;
                continue;
            }
            let share = opts.damping * score / out.len() as f64;
            for &j in out {
                next[j] += share;
            }
        }
        let dangling_share = opts.damping * dangling / n_f;
        for value in next.iter_mut() {
            *value += teleport + dangling_share;
        }

        let err: f64 = next
            .iter()
            .zip(&scores)
            .map(|(a, b)| (a - b).abs())
            .sum();
        scores = next;
        if err < n_f * opts.tol {
            return Ok(graph.cells().iter().copied().zip(scores).collect());
        }
    }

    Err(RankError::Numerical(format!(
        "PageRank failed to converge within {} iterations",
        opts.max_iter
    )))
}

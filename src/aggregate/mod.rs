//! Trimmed aggregation of per-source centrality scores.

use crate::data::CellId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Trimming rule applied to a cell's per-source score list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrimConfig {
    /// Minimum list length before any trimming happens.
    pub min_len: usize,
    /// Number of lowest scores to drop.
    pub drop_low: usize,
    /// Number of highest scores to drop.
    pub drop_high: usize,
}

impl Default for TrimConfig {
    fn default() -> Self {
        Self {
            min_len: 10,
            drop_low: 2,
            drop_high: 2,
        }
    }
}

/// Sum a score list after dropping its extremes.
///
/// The list is sorted ascending; when it is at least `min_len` long the
/// lowest `drop_low` and highest `drop_high` values are discarded before
/// summing, which dampens the influence of any single anomalous relation
/// source. Shorter lists are summed unmodified; an empty list sums to 0.
pub fn trimmed_sum(scores: &[f64], trim: &TrimConfig) -> f64 {
    let mut sorted = scores.to_vec();
    sorted.sort_by(f64::total_cmp);
    let kept: &[f64] =
        if sorted.len() >= trim.min_len && sorted.len() > trim.drop_low + trim.drop_high {
            &sorted[trim.drop_low..sorted.len() - trim.drop_high]
        } else {
            &sorted
        };
    kept.iter().sum()
}

/// Combine per-source score maps into one aggregate score per active cell,
/// sorted descending by score (ties broken by ascending cell id).
///
/// A cell collects a score from every source map that contains it; sources
/// where it is absent are skipped, not counted as zero.
pub fn aggregate_scores(
    per_source: &[BTreeMap<CellId, f64>],
    active: &[CellId],
    trim: &TrimConfig,
) -> Vec<(CellId, f64)> {
    let mut ranked: Vec<(CellId, f64)> = active
        .iter()
        .map(|&cell| {
            let scores: Vec<f64> = per_source
                .iter()
                .filter_map(|source| source.get(&cell).copied())
                .collect();
            (cell, trimmed_sum(&scores, trim))
        })
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
    ranked
}

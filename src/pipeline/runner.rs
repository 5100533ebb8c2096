//! The active-set controller driving the iterative ranking.

use crate::aggregate::{aggregate_scores, TrimConfig};
use crate::centrality::{score_source, PageRankOptions};
use crate::data::{CellId, CellPhases, NeighborMap, RankReport, RemovalRecord};
use crate::elbow::find_elbow;
use crate::error::Result;
use log::info;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Which contiguous side of the elbow split leaves the active set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrunePolicy {
    /// Remove the cells at and below the elbow: the less central ones.
    /// The retained core is the high-scoring head of the curve.
    DropLow,
    /// Remove the cells above the elbow instead, keeping the low-scoring
    /// tail. Bulk-filtering variant of the same loop.
    DropHigh,
}

/// Configuration for one controller run; serializable as YAML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankConfig {
    /// Number of top neighbors per cell in each source graph.
    pub k: usize,
    /// Stop once the active set is at or below this size.
    pub min_active: usize,
    /// Trimming rule for per-source score aggregation.
    pub trim: TrimConfig,
    /// PageRank parameters.
    pub pagerank: PageRankOptions,
    /// Which side of the elbow split is pruned.
    pub policy: PrunePolicy,
}

impl Default for RankConfig {
    fn default() -> Self {
        Self {
            k: 5,
            min_active: 10,
            trim: TrimConfig::default(),
            pagerank: PageRankOptions::default(),
            policy: PrunePolicy::DropLow,
        }
    }
}

impl RankConfig {
    /// Load from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Serialize to a YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

/// Per-iteration view handed to observers before the stop/remove decision.
#[derive(Debug)]
pub struct IterationSnapshot<'a> {
    /// Zero-based iteration counter.
    pub iteration: usize,
    /// Active cells sorted descending by aggregate score.
    pub cells: &'a [CellId],
    /// Aggregate scores matching `cells`.
    pub scores: &'a [f64],
    /// Detected elbow index, if any.
    pub elbow: Option<usize>,
}

/// Passive per-iteration hook (progress display, plotting frontends).
/// Observers never influence control flow.
pub trait IterationObserver {
    fn on_iteration(&mut self, snapshot: &IterationSnapshot<'_>);
}

/// Observer that ignores every iteration.
pub struct NoopObserver;

impl IterationObserver for NoopObserver {
    fn on_iteration(&mut self, _snapshot: &IterationSnapshot<'_>) {}
}

/// Iteration driver: owns the active set and the append-only removal log.
///
/// Each iteration scores every relation source against the current active
/// set (sources are independent, so this fans out over a rayon pool),
/// aggregates the per-source scores, and cuts one side of the elbow split
/// until no distinct elbow remains or the active set reaches its floor.
#[derive(Debug, Clone)]
pub struct RankController {
    config: RankConfig,
    phases: CellPhases,
}

impl RankController {
    pub fn new(config: RankConfig, phases: CellPhases) -> Self {
        Self { config, phases }
    }

    pub fn config(&self) -> &RankConfig {
        &self.config
    }

    /// Run the controller over `initial` cells until termination.
    ///
    /// The returned report holds exactly one record per initial cell:
    /// removed cells with the iteration and score at removal, survivors
    /// with the final iteration counter plus one and a score of 0.
    pub fn run(&self, map: &NeighborMap, initial: Vec<CellId>) -> Result<RankReport> {
        self.run_with_observer(map, initial, &mut NoopObserver)
    }

    /// Like [`run`](Self::run), invoking `observer` once per iteration.
    pub fn run_with_observer(
        &self,
        map: &NeighborMap,
        initial: Vec<CellId>,
        observer: &mut dyn IterationObserver,
    ) -> Result<RankReport> {
        let mut active = initial;
        active.sort_unstable();
        active.dedup();

        let sources: Vec<_> = map.sources().map(|(_, neighbors)| neighbors).collect();
        let mut report = RankReport::new();
        let mut iteration = 0usize;

        loop {
            let per_source: Vec<BTreeMap<CellId, f64>> = sources
                .par_iter()
                .map(|neighbors| {
                    score_source(neighbors, &active, self.config.k, &self.config.pagerank)
                })
                .collect::<Result<_>>()?;

            let ranked = aggregate_scores(&per_source, &active, &self.config.trim);
            let values: Vec<f64> = ranked.iter().map(|&(_, score)| score).collect();
            let elbow = find_elbow(&values);

            let cells_desc: Vec<CellId> = ranked.iter().map(|&(cell, _)| cell).collect();
            observer.on_iteration(&IterationSnapshot {
                iteration,
                cells: &cells_desc,
                scores: &values,
                elbow,
            });

            // Stop without removal on any degenerate split.
            let split = match elbow {
                Some(e)
                    if active.len() > self.config.min_active && e != 0 && e != ranked.len() =>
                {
                    e
                }
                _ => break,
            };

            let (kept, removed) = match self.config.policy {
                PrunePolicy::DropLow => (&ranked[..split], &ranked[split..]),
                PrunePolicy::DropHigh => (&ranked[split..], &ranked[..split]),
            };
            info!(
                "iteration {}: {} active cells, elbow at {}, removing {}",
                iteration,
                active.len(),
                split,
                removed.len()
            );

            for &(cell, score) in removed {
                report.push(RemovalRecord {
                    cell,
                    iteration,
                    score,
                    phase: self.phases.get(cell).to_string(),
                });
            }
            active = kept.iter().map(|&(cell, _)| cell).collect();
            active.sort_unstable();
            iteration += 1;
        }

        // Survivors form the retained core; the counter was already
        // incremented past the last removal round, hence the +1 marker.
        for &cell in &active {
            report.push(RemovalRecord {
                cell,
                iteration: iteration + 1,
                score: 0.0,
                phase: self.phases.get(cell).to_string(),
            });
        }
        info!(
            "stopped after {} removal rounds, {} cells in the core",
            iteration,
            active.len()
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::SourceNeighbors;

    /// 12 cells: 0..6 form a tight high-frequency clique, 6..12 each
    /// point at five core cells (cyclically, so every core cell receives
    /// the same number of peripheral edges) and receive nothing back
    /// above rank K.
    fn two_tier_source() -> SourceNeighbors {
        let mut neighbors: SourceNeighbors = SourceNeighbors::new();
        for c in 0u32..6 {
            let list: Vec<(CellId, u64)> =
                (0u32..6).filter(|&n| n != c).map(|n| (n, 100)).collect();
            neighbors.insert(c, list);
        }
        for p in 0u32..6 {
            let cell = 6 + p;
            let list: Vec<(CellId, u64)> = (0..5).map(|j| ((p + j) % 6, 1)).collect();
            neighbors.insert(cell, list);
        }
        neighbors
    }

    fn two_tier_map(n_sources: usize) -> NeighborMap {
        let sources = (0..n_sources)
            .map(|i| (format!("chr{}.csv", i + 1), two_tier_source()))
            .collect();
        NeighborMap::from_sources(sources)
    }

    /// Ring where every cell points at the next: perfectly symmetric, so
    /// the score curve is flat and no elbow exists.
    fn ring_map(n_cells: u32) -> NeighborMap {
        let mut neighbors = SourceNeighbors::new();
        for c in 0..n_cells {
            neighbors.insert(c, vec![((c + 1) % n_cells, 1)]);
        }
        let mut sources = std::collections::BTreeMap::new();
        sources.insert("chr1.csv".to_string(), neighbors);
        NeighborMap::from_sources(sources)
    }

    fn config(min_active: usize) -> RankConfig {
        RankConfig {
            min_active,
            ..Default::default()
        }
    }

    struct Trace {
        sizes: Vec<usize>,
        elbows: Vec<Option<usize>>,
    }

    impl IterationObserver for Trace {
        fn on_iteration(&mut self, snapshot: &IterationSnapshot<'_>) {
            self.sizes.push(snapshot.cells.len());
            self.elbows.push(snapshot.elbow);
        }
    }

    #[test]
    fn test_peripheral_cells_removed_in_one_round() {
        let map = two_tier_map(3);
        let controller = RankController::new(config(4), CellPhases::new());
        let report = controller.run(&map, map.all_cells()).unwrap();

        assert_eq!(report.len(), 12);
        let mut core = report.core_cells();
        core.sort_unstable();
        assert_eq!(core, vec![0, 1, 2, 3, 4, 5]);

        for record in report.records() {
            if record.cell >= 6 {
                assert_eq!(record.iteration, 0);
                assert!(record.score > 0.0);
            } else {
                // Counter is 1 after the single removal round; survivors
                // are marked with counter + 1.
                assert_eq!(record.iteration, 2);
                assert_eq!(record.score, 0.0);
            }
        }
    }

    #[test]
    fn test_conservation_and_monotonic_shrink() {
        let map = two_tier_map(2);
        let controller = RankController::new(config(4), CellPhases::new());
        let mut trace = Trace {
            sizes: Vec::new(),
            elbows: Vec::new(),
        };
        let report = controller
            .run_with_observer(&map, map.all_cells(), &mut trace)
            .unwrap();

        let mut cells: Vec<CellId> = report.records().iter().map(|r| r.cell).collect();
        cells.sort_unstable();
        cells.dedup();
        assert_eq!(cells, map.all_cells());

        for window in trace.sizes.windows(2) {
            assert!(window[1] < window[0]);
        }
    }

    #[test]
    fn test_flat_curve_stops_immediately() {
        let map = ring_map(12);
        let controller = RankController::new(config(4), CellPhases::new());
        let report = controller.run(&map, map.all_cells()).unwrap();

        // No elbow, no removal: everyone survives with iteration 1.
        assert_eq!(report.len(), 12);
        for record in report.records() {
            assert_eq!(record.iteration, 1);
            assert_eq!(record.score, 0.0);
        }
    }

    #[test]
    fn test_min_active_floor_blocks_removal() {
        let map = two_tier_map(1);
        let controller = RankController::new(config(50), CellPhases::new());
        let report = controller.run(&map, map.all_cells()).unwrap();

        assert_eq!(report.core_cells().len(), 12);
    }

    #[test]
    fn test_drop_high_keeps_low_scorers() {
        let map = two_tier_map(1);
        let cfg = RankConfig {
            min_active: 4,
            policy: PrunePolicy::DropHigh,
            ..Default::default()
        };
        let controller = RankController::new(cfg, CellPhases::new());
        let report = controller.run(&map, map.all_cells()).unwrap();

        let mut core = report.core_cells();
        core.sort_unstable();
        assert_eq!(core, vec![6, 7, 8, 9, 10, 11]);
        for record in report.records() {
            if record.cell < 6 {
                assert_eq!(record.iteration, 0);
            }
        }
    }

    #[test]
    fn test_deterministic_reports() {
        let map = two_tier_map(3);
        let controller = RankController::new(config(4), CellPhases::new());
        let a = controller.run(&map, map.all_cells()).unwrap();
        let b = controller.run(&map, map.all_cells()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_initial_set() {
        let map = two_tier_map(1);
        let controller = RankController::new(config(4), CellPhases::new());
        let report = controller.run(&map, Vec::new()).unwrap();
        assert!(report.is_empty());
    }

    #[test]
    fn test_phases_are_annotated() {
        let map = two_tier_map(1);
        let mut phases = CellPhases::new();
        for c in 0..6 {
            phases.insert(c, "G1");
        }
        let controller = RankController::new(config(4), phases);
        let report = controller.run(&map, map.all_cells()).unwrap();

        for record in report.records() {
            if record.cell < 6 {
                assert_eq!(record.phase, "G1");
            } else {
                assert_eq!(record.phase, crate::data::UNKNOWN_PHASE);
            }
        }
    }

    #[test]
    fn test_config_yaml_round_trip() {
        let cfg = RankConfig {
            k: 7,
            min_active: 25,
            policy: PrunePolicy::DropHigh,
            ..Default::default()
        };
        let yaml = cfg.to_yaml().unwrap();
        let parsed = RankConfig::from_yaml(&yaml).unwrap();
        assert_eq!(parsed, cfg);
    }
}

//! The active-set controller: iterative centrality, trimming and elbow cuts.

mod runner;

pub use runner::{
    IterationObserver, IterationSnapshot, NoopObserver, PrunePolicy, RankConfig, RankController,
};

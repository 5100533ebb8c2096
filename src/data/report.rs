//! Removal records and the final ranking report.

use crate::data::CellId;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One cell leaving the active set.
///
/// Cells that survive to the end get `iteration = final counter + 1` and a
/// score of 0, marking them as the retained core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemovalRecord {
    #[serde(rename = "Cell")]
    pub cell: CellId,
    #[serde(rename = "Iteration")]
    pub iteration: usize,
    #[serde(rename = "Score")]
    pub score: f64,
    #[serde(rename = "Phase")]
    pub phase: String,
}

/// Append-only log of removal records across a whole controller run.
///
/// One record per cell ever known to the controller: the record order is
/// earliest-pruned first, so the log doubles as a centrality ranking.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RankReport {
    records: Vec<RemovalRecord>,
}

impl RankReport {
    /// Create an empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a removal record.
    pub fn push(&mut self, record: RemovalRecord) {
        self.records.push(record);
    }

    /// All records in removal order.
    pub fn records(&self) -> &[RemovalRecord] {
        &self.records
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the report holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Highest iteration value present, i.e. the survivor marker.
    pub fn final_iteration(&self) -> Option<usize> {
        self.records.iter().map(|r| r.iteration).max()
    }

    /// Cells carrying the maximal iteration value: the retained core.
    pub fn core_cells(&self) -> Vec<CellId> {
        match self.final_iteration() {
            Some(last) => self
                .records
                .iter()
                .filter(|r| r.iteration == last)
                .map(|r| r.cell)
                .collect(),
            None => Vec::new(),
        }
    }

    /// Write the report as CSV with columns `Cell,Iteration,Score,Phase`.
    pub fn to_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)?;
        for record in &self.records {
            writer.serialize(record)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Load a previously written report.
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut reader = csv::Reader::from_path(path)?;
        let mut records = Vec::new();
        for record in reader.deserialize() {
            records.push(record?);
        }
        Ok(Self { records })
    }
}

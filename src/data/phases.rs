//! Cell phase metadata, used only for output annotation.

use crate::data::CellId;
use crate::error::{RankError, Result};
use std::collections::BTreeMap;
use std::path::Path;

/// Phase label reported for cells without metadata.
pub const UNKNOWN_PHASE: &str = "Unknown";

/// Mapping from cell id to a categorical phase label.
///
/// Loaded once at startup and consumed read-only; never used for
/// algorithmic decisions.
#[derive(Debug, Clone, Default)]
pub struct CellPhases {
    phases: BTreeMap<CellId, String>,
}

impl CellPhases {
    /// Create empty metadata; every lookup reports [`UNKNOWN_PHASE`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Load phase metadata from a CSV file with header-named columns
    /// `Cell` and `Phase` (any order, extra columns ignored).
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let display = path.as_ref().display().to_string();
        let mut reader = csv::Reader::from_path(path.as_ref())?;
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
        let cell_col = column("Cell")?;
        let phase_col = column("Phase")?;

        let mut phases = BTreeMap::new();
        for (row, record) in reader.records().enumerate() {
            let record = record?;
            let raw = record.get(cell_col).unwrap_or("");
            let cell: CellId = raw
                .trim()
                .parse()
                .map_err(|_| RankError::InvalidCellId {
                    value: raw.to_string(),
                    row,
                    path: display.clone(),
                })?;
            let phase = record.get(phase_col).unwrap_or("").trim().to_string();
            phases.insert(cell, phase);
        }
        Ok(Self { phases })
    }

    /// Record a phase label for a cell.
    pub fn insert(&mut self, cell: CellId, phase: impl Into<String>) {
        self.phases.insert(cell, phase.into());
    }

    /// Phase label for a cell; [`UNKNOWN_PHASE`] when absent.
    pub fn get(&self, cell: CellId) -> &str {
        self.phases
            .get(&cell)
            .map(String::as_str)
            .unwrap_or(UNKNOWN_PHASE)
    }

    /// Number of cells with a known phase.
    pub fn len(&self) -> usize {
        self.phases.len()
    }

    /// Whether no phases are known.
    pub fn is_empty(&self) -> bool {
        self.phases.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_and_lookup() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "Cell,Phase").unwrap();
        writeln!(file, "0,G1").unwrap();
        writeln!(file, "1,S").unwrap();
        writeln!(file, "2,G2M").unwrap();
        file.flush().unwrap();

        let phases = CellPhases::from_csv(file.path()).unwrap();
        assert_eq!(phases.len(), 3);
        assert_eq!(phases.get(1), "S");
    }

    #[test]
    fn test_missing_cell_reports_unknown() {
        let phases = CellPhases::new();
        assert_eq!(phases.get(42), UNKNOWN_PHASE);
    }

    #[test]
    fn test_missing_column_is_an_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "Cell,Stage").unwrap();
        writeln!(file, "0,G1").unwrap();
        file.flush().unwrap();

        let err = CellPhases::from_csv(file.path()).unwrap_err();
        assert!(matches!(err, RankError::MissingColumn { .. }));
    }
}

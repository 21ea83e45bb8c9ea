use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Options for the generation engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateOptions {
    /// Seed for the row RNG. `None` draws a fresh seed, recorded in the report.
    pub seed: Option<u64>,
    /// Upper bound of the window used for unbounded timestamps.
    pub reference_time: DateTime<Utc>,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            seed: None,
            reference_time: Utc::now(),
        }
    }
}

/// Per-cell counters collected while generating values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellStats {
    /// Cells emptied by a general constraint.
    pub omitted: u64,
    /// Cells holding a sentinel instead of a real value.
    pub sentinel: u64,
}

/// Report for a generation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationReport {
    pub seed: u64,
    pub columns: Vec<String>,
    pub delimiter: char,
    pub rows_requested: u64,
    pub rows_written: u64,
    pub bytes_written: u64,
    pub omitted_cells: u64,
    pub sentinel_cells: u64,
    pub duration_ms: u64,
}

impl GenerationReport {
    pub fn new(seed: u64, columns: Vec<String>, delimiter: u8, rows_requested: u64) -> Self {
        Self {
            seed,
            columns,
            delimiter: char::from(delimiter),
            rows_requested,
            rows_written: 0,
            bytes_written: 0,
            omitted_cells: 0,
            sentinel_cells: 0,
            duration_ms: 0,
        }
    }

    pub fn record_cells(&mut self, stats: CellStats) {
        self.omitted_cells += stats.omitted;
        self.sentinel_cells += stats.sentinel;
    }
}

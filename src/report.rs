//! Analysis results and the csv report the run leaves behind.

use serde::Serialize;
use std::path::Path;

/// The outcome of one (benchmark, level) analysis. Percentages are in
/// [0, 100] when the analysis succeeded. `-1` marks a failed stage; it is
/// deliberately distinguishable from a real 0% (a benchmark can touch no
/// memory-address instructions at all and still have analyzed fine).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnalysisResult {
    pub dynamic_percent: f64,
    pub static_percent: f64,
}

impl AnalysisResult {
    pub const FAILED: AnalysisResult = AnalysisResult {
        dynamic_percent: -1.0,
        static_percent: -1.0,
    };

    pub fn new(dynamic_percent: f64, static_percent: f64) -> Self {
        Self {
            dynamic_percent,
            static_percent,
        }
    }

    pub fn is_failure(&self) -> bool {
        self.dynamic_percent < 0.0
    }
}

pub fn percent(part: u64, whole: u64) -> f64 {
    (part as f64 / whole as f64) * 100.0
}

/// One line of `results.csv`. The column names are the report format the
/// downstream spreadsheets already expect, hence the serde renames.
#[derive(Debug, Serialize)]
pub struct Row {
    #[serde(rename = "Benchmark")]
    pub benchmark: String,
    #[serde(rename = "x86 dyn percent")]
    pub x86_dynamic: f64,
    #[serde(rename = "x86 static percent")]
    pub x86_static: f64,
    #[serde(rename = "IR dyn percent")]
    pub ir_dynamic: f64,
    #[serde(rename = "IR static percent")]
    pub ir_static: f64,
}

impl Row {
    pub fn new(benchmark: String, x86: AnalysisResult, ir: AnalysisResult) -> Self {
        Self {
            benchmark,
            x86_dynamic: x86.dynamic_percent,
            x86_static: x86.static_percent,
            ir_dynamic: ir.dynamic_percent,
            ir_static: ir.static_percent,
        }
    }

    /// The row for a benchmark that never got as far as either aggregator.
    pub fn failed(benchmark: String) -> Self {
        Self::new(benchmark, AnalysisResult::FAILED, AnalysisResult::FAILED)
    }
}

pub fn write_csv(path: &Path, rows: &[Row]) -> csv::Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

//! Where the execution counts come from.
//!
//! LLFI records one log line per injected/profiled instruction instance.
//! Depending on how the experiment was run the records end up either in
//! one consolidated `llfi.stat.fi.injectedfaults.txt` or split across the
//! per-run files of an `llfi_stat_output/` directory. Both carry the same
//! `fi_index=N` fields; resolving the source form here means the
//! aggregation itself never has to care which one was present.

use crate::errors::AnalyzeError;
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const INJECTED_FAULTS_LOG: &str = "llfi.stat.fi.injectedfaults.txt";
pub const STAT_OUTPUT_DIR: &str = "llfi_stat_output";

#[derive(Clone, Debug)]
pub enum EvidenceSource {
    /// The consolidated injection log.
    File(PathBuf),
    /// Per-run stats files, counts summed across all of them.
    Directory(PathBuf),
}

impl EvidenceSource {
    /// The consolidated log wins when both forms are present; walking the
    /// per-run files is the slower path and only a fallback.
    pub fn locate(dir: &Path) -> Option<Self> {
        let log = dir.join(INJECTED_FAULTS_LOG);
        if log.is_file() {
            return Some(EvidenceSource::File(log));
        }

        let stats = dir.join(STAT_OUTPUT_DIR);
        if stats.is_dir() {
            return Some(EvidenceSource::Directory(stats));
        }

        None
    }

    /// Normalizes either source form to one multiset of
    /// (instruction index → occurrence count).
    pub fn occurrences(&self) -> Result<HashMap<u32, u64>, AnalyzeError> {
        let mut counts = HashMap::new();

        match self {
            EvidenceSource::File(path) => {
                count_file(path, &mut counts)?;
            }
            EvidenceSource::Directory(dir) => {
                let entries = fs::read_dir(dir)
                    .map_err(|_| AnalyzeError::Missing(dir.clone()))?;
                // each file contributes independently; no de-duplication
                // across runs
                for entry in entries.flatten() {
                    let path = entry.path();
                    if path.is_file() {
                        count_file(&path, &mut counts)?;
                    }
                }
            }
        }

        debug!(
            "evidence: {} distinct indices, {} occurrences",
            counts.len(),
            counts.values().sum::<u64>()
        );
        Ok(counts)
    }
}

fn count_file(path: &Path, counts: &mut HashMap<u32, u64>) -> Result<(), AnalyzeError> {
    lazy_static! {
        static ref FI_INDEX: Regex = Regex::new(r"fi_index=(\d+)").unwrap();
    }

    let text = fs::read_to_string(path).map_err(|_| AnalyzeError::Missing(path.to_path_buf()))?;

    for line in text.lines() {
        // lines without fi_index are run bookkeeping, not records
        let Some(caps) = FI_INDEX.captures(line) else {
            continue;
        };
        let index: u32 = caps[1].parse().map_err(|_| {
            AnalyzeError::Parse(format!("{}: fi_index out of range: {line:?}", path.display()))
        })?;
        *counts.entry(index).or_insert(0) += 1;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{EvidenceSource, INJECTED_FAULTS_LOG, STAT_OUTPUT_DIR};
    use std::collections::HashMap;
    use std::fs;

    const RECORDS: &str = "\
fi_type=bitflip, fi_max_multiple=1, fi_index=3, fi_cycle=101, fi_reg_index=0, fi_bit=17
fi_type=bitflip, fi_max_multiple=1, fi_index=3, fi_cycle=206, fi_reg_index=0, fi_bit=4
fi_type=bitflip, fi_max_multiple=1, fi_index=7, fi_cycle=310, fi_reg_index=1, fi_bit=0
";

    #[test]
    fn consolidated_log_counts_occurrences() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(INJECTED_FAULTS_LOG), RECORDS).unwrap();

        let source = EvidenceSource::locate(dir.path()).unwrap();
        assert!(matches!(source, EvidenceSource::File(_)));

        let counts = source.occurrences().unwrap();
        assert_eq!(counts, HashMap::from([(3, 2), (7, 1)]));
    }

    #[test]
    fn split_directory_sums_across_files() {
        let dir = tempfile::tempdir().unwrap();
        let stats = dir.path().join(STAT_OUTPUT_DIR);
        fs::create_dir(&stats).unwrap();
        let (a, b) = RECORDS.split_at(RECORDS.find("fi_index=7").unwrap());
        fs::write(stats.join("llfi.stat.run-0.txt"), a).unwrap();
        fs::write(stats.join("llfi.stat.run-1.txt"), b).unwrap();

        let source = EvidenceSource::locate(dir.path()).unwrap();
        assert!(matches!(source, EvidenceSource::Directory(_)));

        let counts = source.occurrences().unwrap();
        assert_eq!(counts, HashMap::from([(3, 2), (7, 1)]));
    }

    #[test]
    fn both_forms_describe_the_same_multiset() {
        let consolidated = tempfile::tempdir().unwrap();
        fs::write(consolidated.path().join(INJECTED_FAULTS_LOG), RECORDS).unwrap();

        let split = tempfile::tempdir().unwrap();
        let stats = split.path().join(STAT_OUTPUT_DIR);
        fs::create_dir(&stats).unwrap();
        for (n, line) in RECORDS.lines().enumerate() {
            fs::write(stats.join(format!("run-{n}.txt")), line).unwrap();
        }

        let a = EvidenceSource::locate(consolidated.path())
            .unwrap()
            .occurrences()
            .unwrap();
        let b = EvidenceSource::locate(split.path())
            .unwrap()
            .occurrences()
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn consolidated_log_wins_over_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(INJECTED_FAULTS_LOG), RECORDS).unwrap();
        fs::create_dir(dir.path().join(STAT_OUTPUT_DIR)).unwrap();

        assert!(matches!(
            EvidenceSource::locate(dir.path()),
            Some(EvidenceSource::File(_))
        ));
    }

    #[test]
    fn neither_form_present() {
        let dir = tempfile::tempdir().unwrap();
        assert!(EvidenceSource::locate(dir.path()).is_none());
    }

    #[test]
    fn bookkeeping_lines_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(INJECTED_FAULTS_LOG),
            "# run summary\ntotal runs: 2\nfi_type=bitflip, fi_index=5, fi_bit=3\n",
        )
        .unwrap();

        let counts = EvidenceSource::locate(dir.path())
            .unwrap()
            .occurrences()
            .unwrap();
        assert_eq!(counts, HashMap::from([(5, 1)]));
    }
}

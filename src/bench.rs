//! Benchmark directories and the files we expect inside them.
//!
//! Each benchmark lives in its own subdirectory of the benchmarks root and
//! carries the executable under test (`x86`), the LLFI-indexed IR
//! (`ir.ll`), the fault-injection evidence, and an `input.txt` with the
//! command line for the executable.

use crate::errors::AnalyzeError;
use std::fs;
use std::path::{Path, PathBuf};

pub const INPUT_FILE: &str = "input.txt";
pub const EXECUTABLE: &str = "x86";
pub const IR_FILE: &str = "ir.ll";

#[derive(Clone, Debug)]
pub struct Benchmark {
    pub name: String,
    pub dir: PathBuf,
}

impl Benchmark {
    pub fn executable(&self) -> PathBuf {
        self.dir.join(EXECUTABLE)
    }

    pub fn ir_file(&self) -> PathBuf {
        self.dir.join(IR_FILE)
    }

    /// Command line tokens for the executable, read from `input.txt`.
    /// The file is required even when the program takes no arguments; an
    /// empty file just means an empty argv.
    pub fn arguments(&self) -> Result<Vec<String>, AnalyzeError> {
        let path = self.dir.join(INPUT_FILE);
        let contents = fs::read_to_string(&path).map_err(|_| AnalyzeError::Missing(path))?;
        Ok(contents.split_whitespace().map(str::to_string).collect())
    }
}

/// Every immediate subdirectory of `root` is a benchmark. Sorted by name so
/// repeated runs produce the report in the same order.
pub fn discover(root: &Path) -> Result<Vec<Benchmark>, AnalyzeError> {
    let entries = fs::read_dir(root).map_err(|_| AnalyzeError::Missing(root.to_path_buf()))?;

    let mut benchmarks = Vec::new();
    for entry in entries.flatten() {
        let dir = entry.path();
        if !dir.is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        benchmarks.push(Benchmark { name, dir });
    }

    benchmarks.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(benchmarks)
}

#[cfg(test)]
mod tests {
    use super::{discover, INPUT_FILE};
    use std::fs;

    #[test]
    fn discover_sorts_and_skips_files() {
        let root = tempfile::tempdir().unwrap();
        fs::create_dir(root.path().join("zeta")).unwrap();
        fs::create_dir(root.path().join("alpha")).unwrap();
        fs::write(root.path().join("stray.txt"), "not a benchmark").unwrap();

        let found = discover(root.path()).unwrap();
        let names: Vec<_> = found.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, ["alpha", "zeta"]);
    }

    #[test]
    fn empty_input_file_is_zero_arguments() {
        let root = tempfile::tempdir().unwrap();
        fs::create_dir(root.path().join("bench")).unwrap();
        fs::write(root.path().join("bench").join(INPUT_FILE), "").unwrap();

        let bench = discover(root.path()).unwrap().remove(0);
        assert_eq!(bench.arguments().unwrap(), Vec::<String>::new());
    }

    #[test]
    fn missing_input_file_is_an_error() {
        let root = tempfile::tempdir().unwrap();
        fs::create_dir(root.path().join("bench")).unwrap();

        let bench = discover(root.path()).unwrap().remove(0);
        assert!(bench.arguments().is_err());
    }

    #[test]
    fn arguments_split_on_whitespace() {
        let root = tempfile::tempdir().unwrap();
        fs::create_dir(root.path().join("bench")).unwrap();
        fs::write(
            root.path().join("bench").join(INPUT_FILE),
            "-n 100\n  data/input.bin\n",
        )
        .unwrap();

        let bench = discover(root.path()).unwrap().remove(0);
        assert_eq!(bench.arguments().unwrap(), ["-n", "100", "data/input.bin"]);
    }
}

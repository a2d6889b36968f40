//! Drives the PIN instrumentation tool over one benchmark executable and
//! turns the trace it leaves behind into the two x86 percentages.
//!
//! PIN does the heavy lifting: the `memaddr` pintool writes the complete
//! static instruction listing of the binary plus a dynamic trace with one
//! record per executed instruction. We only launch it, bound its runtime,
//! and aggregate what it wrote.

pub mod parser;

use crate::errors::AnalyzeError;
use crate::report::AnalysisResult;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Static listing emitted by the pintool into the working directory.
pub const STATIC_OUT: &str = "memaddr.static.out";
/// Dynamic trace emitted by the pintool into the working directory.
pub const TRACE_OUT: &str = "memaddr.trace.out";

/// A configured PIN installation. Paths are injected here once instead of
/// living in process-wide globals; everything downstream gets them from
/// this struct.
pub struct Pin {
    pin_bin: PathBuf,
    tool: PathBuf,
    timeout: Duration,
}

impl Pin {
    pub fn new(pin_root: &Path, timeout: Duration) -> Self {
        Self {
            pin_bin: pin_root.join("pin"),
            tool: pin_root.join("source/tools/MemAddr/obj-intel64/memaddr.so"),
            timeout,
        }
    }

    /// Runs the pintool over `executable` inside `workdir` and aggregates
    /// the listing and trace it emits. Any failure along the way comes
    /// back as an `AnalyzeError` for the driver to convert; nothing here
    /// aborts the wider run.
    pub fn analyze(
        &self,
        executable: &Path,
        args: &[String],
        workdir: &Path,
    ) -> Result<AnalysisResult, AnalyzeError> {
        if !executable.is_file() {
            return Err(AnalyzeError::Missing(executable.to_path_buf()));
        }

        self.run_tool(executable, args, workdir)?;

        let listing = parser::parse_listing(&self.read_output(workdir, STATIC_OUT)?)?;
        let trace = parser::parse_trace(&self.read_output(workdir, TRACE_OUT)?)?;
        debug!(
            "pin emitted {} static instructions, {} trace records",
            listing.len(),
            trace.len()
        );

        parser::aggregate(&listing, &trace)
    }

    fn run_tool(
        &self,
        executable: &Path,
        args: &[String],
        workdir: &Path,
    ) -> Result<(), AnalyzeError> {
        info!("running {} on {}", self.pin_bin.display(), executable.display());

        let mut child = Command::new(&self.pin_bin)
            .arg("-t")
            .arg(&self.tool)
            .arg("--")
            .arg(executable)
            .args(args)
            .current_dir(workdir)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| AnalyzeError::Tool(format!("spawning {}: {e}", self.pin_bin.display())))?;

        // no async machinery for a single blocking child, just poll
        let started = Instant::now();
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => {
                    if started.elapsed() > self.timeout {
                        let _ = child.kill();
                        let _ = child.wait();
                        return Err(AnalyzeError::Tool(format!(
                            "timed out after {:?}",
                            self.timeout
                        )));
                    }
                    std::thread::sleep(Duration::from_millis(100));
                }
                Err(e) => return Err(AnalyzeError::Tool(format!("waiting for pin: {e}"))),
            }
        };

        if !status.success() {
            let stderr = child
                .stderr
                .take()
                .and_then(|mut pipe| {
                    let mut buf = String::new();
                    std::io::Read::read_to_string(&mut pipe, &mut buf).ok()?;
                    Some(buf)
                })
                .unwrap_or_default();
            let tail = stderr.lines().last().unwrap_or("").to_string();
            return Err(AnalyzeError::Tool(format!("pin exited {status}: {tail}")));
        }

        Ok(())
    }

    fn read_output(&self, workdir: &Path, name: &str) -> Result<String, AnalyzeError> {
        let path = workdir.join(name);
        fs::read_to_string(&path)
            .map_err(|_| AnalyzeError::Tool(format!("pin left no {name} behind")))
    }
}

//! The IR-level half of the census: joins the LLFI-indexed IR against the
//! fault-injection evidence to recover how many times each static IR
//! instruction executed, then reduces to the two percentages.

pub mod evidence;
pub mod parse;

use crate::bench;
use crate::errors::AnalyzeError;
use crate::report::{percent, AnalysisResult};
use evidence::EvidenceSource;
use parse::IrInstruction;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Analyzes one benchmark directory at the IR level.
pub fn analyze(workdir: &Path) -> Result<AnalysisResult, AnalyzeError> {
    let ir_path = workdir.join(bench::IR_FILE);
    let text = fs::read_to_string(&ir_path).map_err(|_| AnalyzeError::Missing(ir_path))?;
    let instructions = parse::parse_ir(&text)?;

    let source = EvidenceSource::locate(workdir)
        .ok_or_else(|| AnalyzeError::Missing(workdir.join(evidence::INJECTED_FAULTS_LOG)))?;
    let counts = source.occurrences()?;
    debug!(
        "{} static IR instructions, evidence for {}",
        instructions.len(),
        counts.len()
    );

    aggregate(&instructions, &counts)
}

/// The static instruction list is complete before this runs; evidence is
/// joined against it by index. An index the static list does not know
/// means the log and the IR file disagree about the program; that is a
/// data-integrity error and is never silently dropped.
pub fn aggregate(
    instructions: &[IrInstruction],
    counts: &HashMap<u32, u64>,
) -> Result<AnalysisResult, AnalyzeError> {
    let classified: HashMap<u32, bool> = instructions
        .iter()
        .map(|i| (i.index, i.memory_address))
        .collect();

    let mut total = 0u64;
    let mut dynamic_memory = 0u64;
    for (index, count) in counts {
        let memory_address = classified.get(index).ok_or_else(|| {
            AnalyzeError::Parse(format!(
                "evidence references llfi index {index} absent from the IR"
            ))
        })?;
        total += count;
        if *memory_address {
            dynamic_memory += count;
        }
    }

    if total == 0 {
        return Err(AnalyzeError::EmptyEvidence);
    }

    let static_memory = instructions.iter().filter(|i| i.memory_address).count() as u64;

    Ok(AnalysisResult::new(
        percent(dynamic_memory, total),
        percent(static_memory, instructions.len() as u64),
    ))
}

//! Parses the two files the pintool leaves in the benchmark directory and
//! joins them into percentages.
//!
//! Listing lines look like `401136: mov rax, qword ptr [rbp-0x8]`: hex
//! address, mnemonic, then the operand string as XED printed it. Trace
//! lines are just the hex address of each executed occurrence, in
//! execution order.

use crate::classify;
use crate::errors::AnalyzeError;
use crate::report::{percent, AnalysisResult};
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashMap;

/// One distinct instruction of the binary, classified once at parse time.
#[derive(Clone, Debug)]
pub struct StaticInstruction {
    pub address: u64,
    pub mnemonic: String,
    pub operands: String,
    pub memory_address: bool,
}

pub fn parse_listing(text: &str) -> Result<Vec<StaticInstruction>, AnalyzeError> {
    lazy_static! {
        static ref LISTING_LINE: Regex =
            Regex::new(r"^(?:0x)?([0-9a-fA-F]+):\s+(\S+)\s*(.*)$").unwrap();
    }

    let mut instructions = Vec::new();
    for (n, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let caps = LISTING_LINE.captures(line).ok_or_else(|| {
            AnalyzeError::Parse(format!("static listing line {}: {:?}", n + 1, line))
        })?;

        let address = u64::from_str_radix(&caps[1], 16)
            .map_err(|_| AnalyzeError::Parse(format!("static listing line {}: bad address", n + 1)))?;
        let mnemonic = caps[2].to_string();
        let operands = caps[3].trim().to_string();
        let memory_address = classify::x86::is_memory_address(&operands);

        instructions.push(StaticInstruction {
            address,
            mnemonic,
            operands,
            memory_address,
        });
    }

    Ok(instructions)
}

pub fn parse_trace(text: &str) -> Result<Vec<u64>, AnalyzeError> {
    let mut trace = Vec::new();
    for (n, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let hex = line.strip_prefix("0x").unwrap_or(line);
        let address = u64::from_str_radix(hex, 16)
            .map_err(|_| AnalyzeError::Parse(format!("trace line {}: {:?}", n + 1, line)))?;
        trace.push(address);
    }

    Ok(trace)
}

/// Joins the dynamic trace against the static listing. Every trace record
/// must resolve to a listed instruction; an unknown address means the two
/// files disagree about the binary, which is a data-integrity problem, not
/// something to skip over.
pub fn aggregate(
    listing: &[StaticInstruction],
    trace: &[u64],
) -> Result<AnalysisResult, AnalyzeError> {
    if listing.is_empty() {
        return Err(AnalyzeError::Tool("static listing is empty".to_string()));
    }
    if trace.is_empty() {
        return Err(AnalyzeError::Tool("dynamic trace is empty".to_string()));
    }

    let mut classified: HashMap<u64, bool> = HashMap::with_capacity(listing.len());
    for insn in listing {
        if classified.insert(insn.address, insn.memory_address).is_some() {
            return Err(AnalyzeError::Parse(format!(
                "duplicate address {:x} in static listing",
                insn.address
            )));
        }
    }

    let mut dynamic_memory = 0u64;
    for address in trace {
        let memory_address = classified.get(address).ok_or_else(|| {
            AnalyzeError::Parse(format!(
                "trace references address {address:x} absent from the static listing"
            ))
        })?;
        if *memory_address {
            dynamic_memory += 1;
        }
    }

    let static_memory = listing.iter().filter(|i| i.memory_address).count() as u64;

    Ok(AnalysisResult::new(
        percent(dynamic_memory, trace.len() as u64),
        percent(static_memory, listing.len() as u64),
    ))
}

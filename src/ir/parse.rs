//! Parses LLFI-indexed LLVM IR.
//!
//! The indexing pass tags every instruction it numbered with trailing
//! metadata: `%0 = load i32, i32* %a, align 4, !llfi_index !7`. The index
//! is the correlation key the injection logs use, so we read it straight
//! out of the metadata. Re-deriving indices by counting instructions
//! ourselves would silently break the correlation the moment our walk
//! order differed from LLFI's.

use crate::classify;
use crate::errors::AnalyzeError;
use itertools::Itertools;
use lazy_static::lazy_static;
use regex::Regex;

/// One static IR instruction, classified once at parse time.
#[derive(Clone, Debug)]
pub struct IrInstruction {
    pub index: u32,
    pub opcode: String,
    pub memory_address: bool,
}

pub fn parse_ir(text: &str) -> Result<Vec<IrInstruction>, AnalyzeError> {
    lazy_static! {
        static ref LLFI_INDEX: Regex = Regex::new(r"!llfi_index !(\d+)").unwrap();
    }

    let mut instructions = Vec::new();
    for line in text.lines() {
        let line = line.trim();

        let Some(caps) = LLFI_INDEX.captures(line) else {
            continue;
        };
        let index: u32 = caps[1]
            .parse()
            .map_err(|_| AnalyzeError::Parse(format!("llfi index out of range: {line:?}")))?;

        let opcode = opcode_of(line)
            .ok_or_else(|| AnalyzeError::Parse(format!("indexed line with no opcode: {line:?}")))?;
        let memory_address = classify::ir::is_memory_address(&opcode);

        instructions.push(IrInstruction {
            index,
            opcode,
            memory_address,
        });
    }

    if instructions.is_empty() {
        return Err(AnalyzeError::Parse(
            "no llfi-indexed instructions in IR file".to_string(),
        ));
    }

    if let Some(dup) = instructions.iter().map(|i| i.index).duplicates().next() {
        return Err(AnalyzeError::Parse(format!("duplicate llfi index {dup}")));
    }

    Ok(instructions)
}

/// The opcode token of one instruction line: the first token, or the token
/// after `=` when the instruction produces a value. `tail call` and
/// friends carry a marker before the real opcode.
fn opcode_of(line: &str) -> Option<String> {
    lazy_static! {
        static ref ASSIGNED: Regex = Regex::new(r"^%[^\s=]+\s*=\s*(.+)$").unwrap();
    }

    let body = match ASSIGNED.captures(line) {
        Some(caps) => caps.get(1).map(|m| m.as_str()).unwrap_or(line),
        None => line,
    };

    let mut tokens = body.split_whitespace();
    let first = tokens.next()?;
    match first {
        "tail" | "musttail" | "notail" => tokens.next().map(str::to_string),
        _ => Some(first.to_string()),
    }
}

//! Memory-address instruction classification, one module per level.
//!
//! Both classifiers share one policy: an instruction form we do not
//! recognize classifies as *not* memory-address instead of failing the
//! benchmark. That keeps one odd opcode from sinking an otherwise valid
//! run, at the price of silently under-counting. See the note at each
//! predicate.

pub mod ir;
pub mod x86;

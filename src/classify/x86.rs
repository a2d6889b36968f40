use lazy_static::lazy_static;
use regex::Regex;

/// Whether a disassembled x86 instruction is a memory-address instruction,
/// judged by its operand string.
///
/// The pintool disassembles with Intel/XED syntax, which prints every
/// memory reference as a bracketed operand: `mov rax, qword ptr [rbp-0x8]`,
/// `lea rdi, ptr [rip+0x2ef2]`, `add dword ptr [rax+rcx*4], 1`. So "has at
/// least one memory operand" reduces to "contains a `[...]` group",
/// regardless of whether the instruction is a move, arithmetic, or an
/// explicit address computation like `lea`.
///
/// Anything without such an operand is counted as not memory-address. That
/// includes implicit stack traffic (`push`, `pop`, `call`, `ret`), which
/// names no address in its operands, and any operand syntax we do not
/// recognize at all. Known under-count; failing the whole benchmark over
/// one odd operand form would be worse.
pub fn is_memory_address(op_str: &str) -> bool {
    lazy_static! {
        static ref MEM_OPERAND: Regex = Regex::new(r"\[[^\[\]]+\]").unwrap();
    }

    MEM_OPERAND.is_match(op_str)
}

#[cfg(test)]
mod tests {
    use super::is_memory_address;

    #[test]
    fn loads_and_stores() {
        assert!(is_memory_address("rax, qword ptr [rbp-0x8]"));
        assert!(is_memory_address("qword ptr [rbp-0x8], rax"));
        assert!(is_memory_address("dword ptr [rax+rcx*4], 1"));
        assert!(is_memory_address("al, byte ptr [rip+0x2ef2]"));
    }

    #[test]
    fn address_computation_counts() {
        // lea never touches memory but it does compute an address
        assert!(is_memory_address("rdi, ptr [rip+0xf3b]"));
        assert!(is_memory_address("rax, ptr [rbx+rdx*8+0x10]"));
    }

    #[test]
    fn register_and_immediate_forms_do_not_count() {
        assert!(!is_memory_address("rax, rbx"));
        assert!(!is_memory_address("rax, 0x539"));
        assert!(!is_memory_address(""));
    }

    #[test]
    fn implicit_stack_traffic_does_not_count() {
        // push/pop/ret name no address in their operands; the predicate
        // only sees operand text, so these stay out of the count
        assert!(!is_memory_address("rbp"));
        assert!(!is_memory_address("0x401050"));
    }

    #[test]
    fn unrecognized_forms_default_to_false() {
        assert!(!is_memory_address("???"));
        assert!(!is_memory_address("st(0), st(1)"));
    }

    #[test]
    fn classification_is_stable() {
        for _ in 0..3 {
            assert!(is_memory_address("rax, qword ptr [rsp+0x20]"));
            assert!(!is_memory_address("rax, rbx"));
        }
    }
}

// crates/quint-core/src/fsm.rs
// ============================================================================
// Module: Quint Phase State Machine
// Description: The six-state workflow phase transition table.
// Purpose: Centralise the IDLE/ABDUCTION/DEDUCTION/INDUCTION/AUDIT/DECISION
//          transitions so the dispatcher and tools agree on one source of truth.
// Dependencies: crate::core::fpf
// ============================================================================

//! ## Overview
//! Preconditions (data prerequisites like "at least one L0 holon exists")
//! are checked by each tool against the store directly, since they depend
//! on tool-specific arguments the transition table does not need to know
//! about. This module owns only the phase graph: which phase a successful
//! tool call leaves the context in.

use crate::core::Phase;

/// Returns the phase a context moves to after `tool` completes successfully,
/// given its `current` phase.
///
/// `internalize` only changes phase on its very first call for a context
/// (when `current` is `Idle` and the context has never been initialised);
/// callers signal that with `first_call = true`. All other tools ignore
/// `first_call`.
#[must_use]
pub fn next_phase(tool: &str, current: Phase, first_call: bool) -> Phase {
    match tool {
        "propose" => Phase::Abduction,
        "verify" => Phase::Deduction,
        "test" => Phase::Induction,
        "audit" => Phase::Audit,
        "decide" => Phase::Decision,
        "finalize" => Phase::Idle,
        "reset" => Phase::Idle,
        "internalize" if first_call => Phase::Abduction,
        _ => current,
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::next_phase;
    use crate::core::Phase;

    #[test]
    fn cycle_tools_advance_regardless_of_current_phase() {
        assert_eq!(next_phase("propose", Phase::Idle, false), Phase::Abduction);
        assert_eq!(next_phase("verify", Phase::Abduction, false), Phase::Deduction);
        assert_eq!(next_phase("test", Phase::Deduction, false), Phase::Induction);
        assert_eq!(next_phase("audit", Phase::Induction, false), Phase::Audit);
        assert_eq!(next_phase("decide", Phase::Audit, false), Phase::Decision);
    }

    #[test]
    fn reset_and_finalize_always_return_to_idle() {
        assert_eq!(next_phase("reset", Phase::Decision, false), Phase::Idle);
        assert_eq!(next_phase("finalize", Phase::Audit, false), Phase::Idle);
    }

    #[test]
    fn internalize_only_moves_phase_on_first_call() {
        assert_eq!(next_phase("internalize", Phase::Idle, true), Phase::Abduction);
        assert_eq!(next_phase("internalize", Phase::Idle, false), Phase::Idle);
        assert_eq!(next_phase("internalize", Phase::Deduction, true), Phase::Abduction);
    }

    #[test]
    fn unknown_tool_leaves_phase_unchanged() {
        assert_eq!(next_phase("search", Phase::Decision, false), Phase::Decision);
        assert_eq!(next_phase("calculate_r", Phase::Idle, false), Phase::Idle);
    }
}

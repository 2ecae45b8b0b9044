// crates/quint-core/src/core/fpf.rs
// ============================================================================
// Module: Quint FPF State
// Description: Per-context phase-workflow singleton.
// Purpose: Define the phase enum and the persisted FPF state record.
// Dependencies: crate::core::identifiers
// ============================================================================

//! ## Overview
//! "FPF" (Focus-Propose-Falsify) state is the per-context singleton backing
//! the phase state machine: the active phase, the active session/role labels,
//! the last observed commit, and the assurance threshold used to flag
//! decaying evidence.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::ContextId;
use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Phase
// ============================================================================

/// A state in the phase workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    /// No active cycle.
    Idle,
    /// Hypotheses are being proposed.
    Abduction,
    /// Hypotheses are being logically verified.
    Deduction,
    /// Hypotheses are being empirically tested.
    Induction,
    /// A risk audit is in progress.
    Audit,
    /// A decision is being finalised.
    Decision,
}

impl Phase {
    /// Returns the human-facing role label associated with this phase,
    /// surfaced by `internalize`.
    #[must_use]
    pub const fn role_label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Abduction => "hypothesis proposer",
            Self::Deduction => "logic verifier",
            Self::Induction => "empirical tester",
            Self::Audit => "risk auditor",
            Self::Decision => "decision maker",
        }
    }
}

// ============================================================================
// SECTION: FPF State
// ============================================================================

/// Per-context singleton tracking the active phase and session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FpfState {
    /// Context this state is scoped to.
    pub context_id: ContextId,
    /// Currently active phase.
    pub active_phase: Phase,
    /// Active session identifier, assigned on first `internalize`.
    pub active_session_id: Option<String>,
    /// Last commit id observed by `internalize`.
    pub last_commit: Option<String>,
    /// When `last_commit` was last observed.
    pub last_commit_at: Option<Timestamp>,
    /// Minimum R_eff a holon must carry to be considered trustworthy.
    pub assurance_threshold: f64,
    /// Last time this record was updated.
    pub updated_at: Timestamp,
}

impl FpfState {
    /// Creates a fresh, idle FPF state for a new context.
    #[must_use]
    pub fn new(context_id: ContextId, now: Timestamp) -> Self {
        Self {
            context_id,
            active_phase: Phase::Idle,
            active_session_id: None,
            last_commit: None,
            last_commit_at: None,
            assurance_threshold: 0.7,
            updated_at: now,
        }
    }
}

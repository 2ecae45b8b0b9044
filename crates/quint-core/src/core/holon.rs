// crates/quint-core/src/core/holon.rs
// ============================================================================
// Module: Quint Holon Model
// Description: Units of knowledge tracked through the epistemic layers.
// Purpose: Define the holon record and its lifecycle-facing enums.
// Dependencies: crate::core::{identifiers, time}
// ============================================================================

//! ## Overview
//! A holon is a unit of knowledge: a hypothesis proposed by an agent, or a
//! Design Rationale Record (DRR) finalising a decision between competing
//! hypotheses. Holons are never deleted; they move between epistemic layers
//! as evidence accrues, and are reclassified "invalid" rather than removed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::ContextId;
use crate::core::identifiers::HolonId;
use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Holon Type / Kind
// ============================================================================

/// Distinguishes an in-progress hypothesis from a finalised decision record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HolonType {
    /// A proposed claim moving through the epistemic layers.
    Hypothesis,
    /// A Design Rationale Record finalising a decision.
    Drr,
}

/// Whether a holon describes a concrete system artifact or an abstract claim.
///
/// Determines which dependency edge type (`componentOf` vs `constituentOf`)
/// is used when the holon is linked to its dependencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HolonKind {
    /// A concrete system artifact (code, service, configuration).
    System,
    /// An abstract claim or episteme (a belief, principle, or analysis).
    Episteme,
}

impl HolonKind {
    /// Parses a kind from its wire representation.
    ///
    /// # Errors
    ///
    /// Returns the original string when it is not `"system"` or `"episteme"`.
    pub fn parse(value: &str) -> Result<Self, String> {
        match value {
            "system" => Ok(Self::System),
            "episteme" => Ok(Self::Episteme),
            other => Err(other.to_string()),
        }
    }
}

/// Epistemic status of a holon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layer {
    /// Conjecture: proposed but not yet logically verified.
    L0,
    /// Substantiated: passed a logic check.
    L1,
    /// Corroborated: passed a test.
    L2,
    /// Finalised Design Rationale Record.
    Drr,
    /// Rejected by a failing or refining verdict.
    Invalid,
}

impl Layer {
    /// Returns the wire form of this layer, matching the serde representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::L0 => "L0",
            Self::L1 => "L1",
            Self::L2 => "L2",
            Self::Drr => "DRR",
            Self::Invalid => "invalid",
        }
    }
}

// ============================================================================
// SECTION: Contract
// ============================================================================

/// Structured constraints carried by a DRR holon, inherited by downstream
/// implementers via `implement`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contract {
    /// Invariants the decision establishes.
    #[serde(default)]
    pub invariants: Vec<String>,
    /// Anti-patterns the decision forbids.
    #[serde(default)]
    pub anti_patterns: Vec<String>,
    /// Criteria that must hold before the decision is considered implemented.
    #[serde(default)]
    pub acceptance_criteria: Vec<String>,
    /// Scope (paths, modules, subsystems) affected by the decision.
    #[serde(default)]
    pub affected_scope: Vec<String>,
}

impl Contract {
    /// Returns whether the contract carries any content at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.invariants.is_empty()
            && self.anti_patterns.is_empty()
            && self.acceptance_criteria.is_empty()
            && self.affected_scope.is_empty()
    }
}

// ============================================================================
// SECTION: Reverification Flag
// ============================================================================

/// Marks a holon as needing re-verification because one of its carriers changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReverificationFlag {
    /// Reason the holon needs re-verification.
    pub reason: String,
    /// When the flag was raised.
    pub flagged_at: Timestamp,
}

// ============================================================================
// SECTION: Holon
// ============================================================================

/// A unit of knowledge: a hypothesis or a finalised decision record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Holon {
    /// Opaque identifier; a slug for hypotheses, `DRR-<date>-<slug>` for DRRs.
    pub id: HolonId,
    /// Hypothesis or DRR.
    pub holon_type: HolonType,
    /// System or episteme.
    pub kind: HolonKind,
    /// Current epistemic layer.
    pub layer: Layer,
    /// Human-readable title.
    pub title: String,
    /// Body text (the claim or decision narrative).
    pub body: String,
    /// Project/workspace scope this holon belongs to.
    pub context_id: ContextId,
    /// Free-text description of what the claim actually covers.
    pub claim_scope: String,
    /// Parent holon, if this holon was created as part of a promotion lineage.
    pub parent_id: Option<HolonId>,
    /// Cached effective reliability score, refreshed by `calculate_r`.
    pub cached_r_score: f64,
    /// Set when a carrier change has invalidated prior verification.
    pub reverification: Option<ReverificationFlag>,
    /// Structured constraints, populated only on DRR holons.
    #[serde(default)]
    pub contract: Contract,
    /// Creation time.
    pub created_at: Timestamp,
    /// Last update time.
    pub updated_at: Timestamp,
}

impl Holon {
    /// Clamps and assigns a freshly computed R_eff score.
    pub fn set_cached_score(&mut self, score: f64) {
        self.cached_r_score = score.clamp(0.0, 1.0);
    }
}

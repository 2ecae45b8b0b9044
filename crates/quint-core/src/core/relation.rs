// crates/quint-core/src/core/relation.rs
// ============================================================================
// Module: Quint Relation Model
// Description: Typed directed edges between holons.
// Purpose: Define relation types, congruence levels, and the relation record.
// Dependencies: crate::core::identifiers
// ============================================================================

//! ## Overview
//! Relations form the dependency graph the assurance calculator walks.
//! `componentOf`/`constituentOf` edges carry R_eff dependency (weakest-link);
//! `selects`/`rejects` bind a DRR to its winner and alternatives; `memberOf`
//! groups competing alternatives without propagating score; `supersededBy`
//! chains replacement decisions.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::HolonId;
use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Relation Type
// ============================================================================

/// The kind of edge a relation represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RelationType {
    /// Source is a system component depending on target for its R_eff.
    ComponentOf,
    /// Source is an episteme constituent depending on target for its R_eff.
    ConstituentOf,
    /// Source is a competing alternative grouped under target's decision.
    MemberOf,
    /// Source (a DRR) selects target as its winning holon.
    Selects,
    /// Source (a DRR) rejects target as a considered alternative.
    Rejects,
    /// Source refines (supersedes in place) target.
    Refines,
    /// Source is verified by evidence recorded against target.
    VerifiedBy,
    /// Source's work was performed as recorded by target.
    PerformedBy,
    /// Source (an old DRR) has been superseded by target (a new DRR).
    SupersededBy,
}

impl RelationType {
    /// Returns whether this relation type participates in R_eff dependency
    /// (weakest-link) propagation.
    #[must_use]
    pub const fn carries_dependency(&self) -> bool {
        matches!(self, Self::ComponentOf | Self::ConstituentOf)
    }
}

// ============================================================================
// SECTION: Congruence Level
// ============================================================================

/// Rating of how well a dependency's context matches the dependant's,
/// applied as a multiplicative penalty by the assurance calculator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CongruenceLevel {
    /// Weak congruence: penalty factor 0.7.
    Cl1 = 1,
    /// Moderate congruence: penalty factor 0.9.
    Cl2 = 2,
    /// Full congruence: penalty factor 1.0 (no penalty).
    Cl3 = 3,
}

impl CongruenceLevel {
    /// Parses a congruence level from its numeric wire form.
    ///
    /// # Errors
    ///
    /// Returns the original value when it is not `1`, `2`, or `3`.
    pub fn from_u8(value: u8) -> Result<Self, u8> {
        match value {
            1 => Ok(Self::Cl1),
            2 => Ok(Self::Cl2),
            3 => Ok(Self::Cl3),
            other => Err(other),
        }
    }

    /// The numeric wire form of this congruence level (`1`, `2`, or `3`).
    #[must_use]
    pub const fn as_u8(&self) -> u8 {
        match self {
            Self::Cl1 => 1,
            Self::Cl2 => 2,
            Self::Cl3 => 3,
        }
    }

    /// The multiplicative penalty this level applies to a dependency's
    /// contribution to R_eff.
    ///
    /// Isolated as a free function over the enum so the piecewise-linear
    /// curve can be swapped for a non-linear one without touching traversal
    /// code.
    #[must_use]
    pub const fn penalty(&self) -> f64 {
        match self {
            Self::Cl1 => 0.7,
            Self::Cl2 => 0.9,
            Self::Cl3 => 1.0,
        }
    }
}

// ============================================================================
// SECTION: Relation
// ============================================================================

/// A typed directed edge between two holons.
///
/// The primary key is the triple `(source_id, target_id, relation_type)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Relation {
    /// Source holon.
    pub source_id: HolonId,
    /// Target holon.
    pub target_id: HolonId,
    /// Edge type.
    pub relation_type: RelationType,
    /// Congruence level, meaningful for dependency-carrying edges.
    pub congruence_level: CongruenceLevel,
    /// Creation time.
    pub created_at: Timestamp,
}

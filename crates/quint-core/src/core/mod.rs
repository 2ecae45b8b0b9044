// crates/quint-core/src/core/mod.rs
// ============================================================================
// Module: Quint Core Types
// Description: Canonical Quint data model types.
// Purpose: Provide stable, serializable types for holons, evidence, and logs.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Quint core types define the holon/evidence/relation graph, audit log
//! entries, FPF phase state, and waivers. These types are the canonical
//! source of truth for the store trait, the assurance calculator, the phase
//! state machine, and the tools layer.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod audit;
pub mod characteristic;
pub mod evidence;
pub mod fpf;
pub mod hashing;
pub mod holon;
pub mod identifiers;
pub mod relation;
pub mod slug;
pub mod time;
pub mod waiver;
pub mod work_record;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::AuditLogEntry;
pub use audit::AuditResult;
pub use characteristic::Characteristic;
pub use characteristic::Scale;
pub use evidence::Evidence;
pub use evidence::EvidenceType;
pub use evidence::StaleFlag;
pub use evidence::Verdict;
pub use fpf::FpfState;
pub use fpf::Phase;
pub use hashing::HashError;
pub use hashing::hash_canonical_json;
pub use holon::Contract;
pub use holon::Holon;
pub use holon::HolonKind;
pub use holon::HolonType;
pub use holon::Layer;
pub use holon::ReverificationFlag;
pub use identifiers::AuditId;
pub use identifiers::ContextId;
pub use identifiers::EvidenceId;
pub use identifiers::HolonId;
pub use identifiers::WaiverId;
pub use relation::CongruenceLevel;
pub use relation::Relation;
pub use relation::RelationType;
pub use slug::resolve_unique_slug;
pub use slug::slugify;
pub use time::DAY_MILLIS;
pub use time::Timestamp;
pub use waiver::Waiver;
pub use work_record::WorkRecord;

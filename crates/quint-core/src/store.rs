// crates/quint-core/src/store.rs
// ============================================================================
// Module: Quint Store Interface
// Description: Backend-agnostic persistence contract for the Quint data model.
// Purpose: Define the `Store` trait implemented by `quint-store-sqlite`.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! The `Store` trait is the single seam between the calculator/FSM/tools
//! layer and durable persistence. Implementations must be transactional per
//! call: the dispatcher relies on each tool's (evidence append, layer
//! change, audit append) landing atomically. Implementations must be
//! deterministic and fail closed on missing or invalid data.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use thiserror::Error;

use crate::core::AuditLogEntry;
use crate::core::Characteristic;
use crate::core::ContextId;
use crate::core::Evidence;
use crate::core::EvidenceId;
use crate::core::FpfState;
use crate::core::Holon;
use crate::core::HolonId;
use crate::core::Layer;
use crate::core::Relation;
use crate::core::RelationType;
use crate::core::Timestamp;
use crate::core::Waiver;
use crate::core::WorkRecord;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised by a [`Store`] implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store's underlying I/O or driver reported an error.
    #[error("store io error: {0}")]
    Io(String),
    /// Persisted data failed an integrity check on read.
    #[error("store corruption: {0}")]
    Corrupt(String),
    /// The on-disk schema version is newer or older than this build supports.
    #[error("store schema version mismatch: {0}")]
    VersionMismatch(String),
    /// A migration step failed to apply.
    #[error("store migration failed: {0}")]
    Migration(String),
}

// ============================================================================
// SECTION: Search
// ============================================================================

/// Which entity classes a [`Store::search`] call should cover.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchScope {
    /// Holon titles and bodies only.
    Holons,
    /// Evidence bodies only.
    Evidence,
    /// Both holons and evidence.
    All,
}

/// A single full-text search hit.
#[derive(Debug, Clone)]
pub struct SearchHit {
    /// Holon the hit is attached to (the holon itself, for a holon hit; the
    /// owning holon, for an evidence hit).
    pub holon_id: HolonId,
    /// Evidence identifier, present only for evidence hits.
    pub evidence_id: Option<EvidenceId>,
    /// Matched title or evidence body snippet.
    pub snippet: String,
    /// Relevance rank assigned by the search backend; lower is more relevant.
    pub rank: f64,
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// Backend-agnostic persistence contract for the Quint data model.
///
/// Every method is expected to execute within its own storage transaction so
/// that callers composing several calls into one tool body still get
/// atomic per-call durability; multi-call atomicity is the caller's
/// responsibility (see `quint-mcp`'s dispatcher, which wraps each tool body
/// in a single transaction where the backend supports nesting).
pub trait Store {
    // -- Holon ---------------------------------------------------------

    /// Inserts a newly created holon.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on I/O failure.
    fn create_holon(&mut self, holon: &Holon) -> Result<(), StoreError>;

    /// Fetches a holon by id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on I/O failure.
    fn get_holon(&self, id: &HolonId) -> Result<Option<Holon>, StoreError>;

    /// Lists every holon id in a context.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on I/O failure.
    fn list_holon_ids(&self, context_id: &ContextId) -> Result<Vec<HolonId>, StoreError>;

    /// Updates a holon's layer and `updated_at` timestamp.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on I/O failure.
    fn update_holon_layer(
        &mut self,
        id: &HolonId,
        layer: Layer,
        now: Timestamp,
    ) -> Result<(), StoreError>;

    /// Updates a holon's cached R_eff score.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on I/O failure.
    fn update_holon_score(&mut self, id: &HolonId, score: f64) -> Result<(), StoreError>;

    /// Lists the direct children of `parent_id` (one hop).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on I/O failure.
    fn get_holons_by_parent(&self, parent_id: &HolonId) -> Result<Vec<Holon>, StoreError>;

    /// Walks the `parent_id` chain from `id` up to its root, inclusive of `id`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on I/O failure.
    fn get_lineage(&self, id: &HolonId) -> Result<Vec<Holon>, StoreError>;

    /// Flags a holon as needing re-verification.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on I/O failure.
    fn mark_needs_reverification(
        &mut self,
        id: &HolonId,
        reason: &str,
        now: Timestamp,
    ) -> Result<(), StoreError>;

    /// Clears a holon's re-verification flag.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on I/O failure.
    fn clear_needs_reverification(&mut self, id: &HolonId) -> Result<(), StoreError>;

    /// Counts holons by layer within a context, restricted to the
    /// active-holons predicate when `active_only` is set.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on I/O failure.
    fn count_by_layer(
        &self,
        context_id: &ContextId,
        active_only: bool,
    ) -> Result<BTreeMap<Layer, u64>, StoreError>;

    // -- Evidence --------------------------------------------------------

    /// Appends an evidence record.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on I/O failure.
    fn add_evidence(&mut self, evidence: &Evidence) -> Result<(), StoreError>;

    /// Lists evidence attached to a holon, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on I/O failure.
    fn list_evidence_by_holon(&self, holon_id: &HolonId) -> Result<Vec<Evidence>, StoreError>;

    /// Lists evidence whose carrier reference matches `carrier_ref`, across
    /// all holons.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on I/O failure.
    fn list_evidence_with_carrier(&self, carrier_ref: &str) -> Result<Vec<Evidence>, StoreError>;

    /// Marks a single evidence item stale.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on I/O failure.
    fn mark_evidence_stale(
        &mut self,
        evidence_id: &EvidenceId,
        reason: &str,
        now: Timestamp,
    ) -> Result<(), StoreError>;

    /// Clears the stale flag on a single evidence item.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on I/O failure.
    fn clear_evidence_stale(&mut self, evidence_id: &EvidenceId) -> Result<(), StoreError>;

    /// Clears the stale flag on every evidence item attached to a holon.
    ///
    /// Used by `verify`/`test` on a PASS verdict.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on I/O failure.
    fn clear_stale_for_holon(&mut self, holon_id: &HolonId) -> Result<(), StoreError>;

    /// Lists stale evidence attached to a single holon.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on I/O failure.
    fn list_stale_by_holon(&self, holon_id: &HolonId) -> Result<Vec<Evidence>, StoreError>;

    /// Lists every stale evidence item in a context.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on I/O failure.
    fn list_all_stale(&self, context_id: &ContextId) -> Result<Vec<Evidence>, StoreError>;

    // -- Relation ----------------------------------------------------------

    /// Inserts a relation edge.
    ///
    /// Implementations reject a duplicate `(source, target, type)` triple by
    /// returning `Ok(false)`; cycle detection is performed by the caller
    /// (see [`crate::calculator::would_create_cycle`]) before this is
    /// invoked, since it requires graph traversal the store trait does not
    /// otherwise expose.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on I/O failure.
    fn create_relation(&mut self, relation: &Relation) -> Result<bool, StoreError>;

    /// Lists outgoing `componentOf`/`constituentOf` edges from `source_id`
    /// (the holons `source_id` depends on for its R_eff), ordered by
    /// ascending target id for deterministic weakest-link tie-breaks.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on I/O failure.
    fn list_dependencies_of(&self, source_id: &HolonId) -> Result<Vec<Relation>, StoreError>;

    /// Lists incoming `componentOf`/`constituentOf` edges into `target_id`
    /// (the holons that depend on `target_id`).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on I/O failure.
    fn list_components_of(&self, target_id: &HolonId) -> Result<Vec<Relation>, StoreError>;

    /// Lists outgoing relations from `source_id` restricted to `types`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on I/O failure.
    fn list_relations_from(
        &self,
        source_id: &HolonId,
        types: &[RelationType],
    ) -> Result<Vec<Relation>, StoreError>;

    /// Lists incoming relations into `target_id` restricted to `types`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on I/O failure.
    fn list_relations_to(
        &self,
        target_id: &HolonId,
        types: &[RelationType],
    ) -> Result<Vec<Relation>, StoreError>;

    // -- Work record ---------------------------------------------------

    /// Appends a work record.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on I/O failure.
    fn append_work_record(&mut self, record: &WorkRecord) -> Result<(), StoreError>;

    /// Lists work records attached to a holon.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on I/O failure.
    fn list_work_records(&self, holon_id: &HolonId) -> Result<Vec<WorkRecord>, StoreError>;

    // -- Audit log -------------------------------------------------------

    /// Appends an audit log entry. Audit entries are never updated or deleted.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on I/O failure.
    fn append_audit(&mut self, entry: &AuditLogEntry) -> Result<(), StoreError>;

    /// Lists audit entries for a context, most recent first.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on I/O failure.
    fn list_audit_by_context(
        &self,
        context_id: &ContextId,
        limit: usize,
    ) -> Result<Vec<AuditLogEntry>, StoreError>;

    /// Lists audit entries whose `target_id` matches, most recent first.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on I/O failure.
    fn list_audit_by_target(&self, target_id: &str) -> Result<Vec<AuditLogEntry>, StoreError>;

    // -- FPF state -------------------------------------------------------

    /// Reads the FPF state for a context, if it has been initialised.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on I/O failure.
    fn get_fpf_state(&self, context_id: &ContextId) -> Result<Option<FpfState>, StoreError>;

    /// Writes (inserts or replaces) the FPF state for a context.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on I/O failure.
    fn put_fpf_state(&mut self, state: &FpfState) -> Result<(), StoreError>;

    // -- Waiver ------------------------------------------------------------

    /// Inserts a waiver.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on I/O failure.
    fn insert_waiver(&mut self, waiver: &Waiver) -> Result<(), StoreError>;

    /// Returns the waiver active for `evidence_id` as of `now`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on I/O failure.
    fn get_active_waiver(
        &self,
        evidence_id: &EvidenceId,
        now: Timestamp,
    ) -> Result<Option<Waiver>, StoreError>;

    // -- Characteristic ------------------------------------------------

    /// Adds a characteristic. Characteristics are read-only once written.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on I/O failure.
    fn add_characteristic(&mut self, characteristic: &Characteristic) -> Result<(), StoreError>;

    /// Lists characteristics attached to a holon.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on I/O failure.
    fn list_characteristics(&self, holon_id: &HolonId) -> Result<Vec<Characteristic>, StoreError>;

    // -- Search ----------------------------------------------------------

    /// Runs a full-text search over holons and/or evidence.
    ///
    /// Implementations must tolerate reserved full-text operators in `query`
    /// (escaping or quoting terms) so inputs like `"redis-backed"` do not
    /// raise a parse error in the search backend.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on I/O failure.
    fn search(
        &self,
        query: &str,
        context_id: &ContextId,
        scope: SearchScope,
        layer_filter: Option<Layer>,
        limit: usize,
    ) -> Result<Vec<SearchHit>, StoreError>;
}

// crates/quint-core/src/calculator.rs
// ============================================================================
// Module: Quint Assurance Calculator
// Description: Recursive, weakest-link R_eff computation over the holon graph.
// Purpose: Given a holon id, compute its effective reliability and a report.
// Dependencies: crate::{core, store}
// ============================================================================

//! ## Overview
//! The assurance calculator is a pure function over the store: it never
//! mutates state (callers that want the cached score refreshed must call
//! [`Store::update_holon_score`] themselves with the returned
//! [`AssuranceReport::final_score`]). Recursion carries a path-scoped
//! visited set so back-edges inside a cycle are skipped — not recomputed —
//! and recorded as a `"cycle-broken"` factor, matching the calculator's
//! cycle-safety property: a cycle never changes the final score of a holon
//! whose own evidence and acyclic dependencies are otherwise clean.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashSet;

use crate::core::EvidenceId;
use crate::core::HolonId;
use crate::core::Timestamp;
use crate::core::Verdict;
use crate::errors::EngineError;
use crate::store::Store;

// ============================================================================
// SECTION: Report
// ============================================================================

/// Breakdown of an R_eff computation for a single holon.
#[derive(Debug, Clone)]
pub struct AssuranceReport {
    /// Holon this report describes.
    pub holon_id: HolonId,
    /// Score derived from evidence attached directly to the holon.
    pub self_score: f64,
    /// `min(self_score, dependency_score)`, clamped to `[0.0, 1.0]`.
    pub final_score: f64,
    /// The holon responsible for the minimum score: a dependency's id, or
    /// this holon's own id when it has no dependencies or its self score is
    /// the binding constraint.
    pub weakest_link: HolonId,
    /// Human-readable factors explaining the score (stale/decay/fail/cycle).
    pub factors: Vec<String>,
    /// Evidence ids that were stale at computation time.
    pub stale_evidence_ids: Vec<EvidenceId>,
    /// `1.0 - self_score` when the self score was reduced by staleness or
    /// decay; `0.0` otherwise.
    pub stale_penalty: f64,
    /// Reports for each acyclic dependency, in traversal order.
    pub dependency_reports: Vec<AssuranceReport>,
}

// ============================================================================
// SECTION: Calculator
// ============================================================================

/// Computes the effective reliability of `holon_id`.
///
/// # Errors
///
/// Returns [`EngineError::NotFound`] when `holon_id` does not exist, or
/// [`EngineError::Storage`] when the store reports an error.
pub fn calculate_r_eff(
    store: &impl Store,
    holon_id: &HolonId,
    now: Timestamp,
) -> Result<AssuranceReport, EngineError> {
    let mut path = HashSet::new();
    compute(store, holon_id, now, &mut path)
}

fn compute(
    store: &impl Store,
    holon_id: &HolonId,
    now: Timestamp,
    path: &mut HashSet<HolonId>,
) -> Result<AssuranceReport, EngineError> {
    if store.get_holon(holon_id)?.is_none() {
        return Err(EngineError::NotFound(format!("holon not found: {holon_id}")));
    }

    path.insert(holon_id.clone());
    let (self_score, mut factors, stale_evidence_ids, stale_penalty) =
        compute_self_score(store, holon_id, now)?;

    let dependencies = store.list_dependencies_of(holon_id)?;
    let mut dependency_reports = Vec::new();
    let mut weakest_dependency: Option<(f64, HolonId)> = None;

    for dep in dependencies {
        if path.contains(&dep.target_id) {
            factors.push(format!("cycle-broken: back-edge to {}", dep.target_id));
            continue;
        }
        let report = compute(store, &dep.target_id, now, path)?;
        let penalised = (report.final_score * dep.congruence_level.penalty()).clamp(0.0, 1.0);
        let is_new_min = weakest_dependency
            .as_ref()
            .is_none_or(|(current, _)| penalised < *current);
        if is_new_min {
            weakest_dependency = Some((penalised, dep.target_id.clone()));
        }
        dependency_reports.push(report);
    }

    path.remove(holon_id);

    let (final_score, weakest_link) = match weakest_dependency {
        Some((dep_score, dep_id)) if dep_score < self_score => (dep_score, dep_id),
        Some(_) => (self_score, holon_id.clone()),
        None => (self_score, holon_id.clone()),
    };

    Ok(AssuranceReport {
        holon_id: holon_id.clone(),
        self_score,
        final_score: final_score.clamp(0.0, 1.0),
        weakest_link,
        factors,
        stale_evidence_ids,
        stale_penalty,
        dependency_reports,
    })
}

/// Computes the self score (WLNK over directly attached evidence) for a
/// single holon, per the per-item scoring rules.
fn compute_self_score(
    store: &impl Store,
    holon_id: &HolonId,
    now: Timestamp,
) -> Result<(f64, Vec<String>, Vec<EvidenceId>, f64), EngineError> {
    let evidence = store.list_evidence_by_holon(holon_id)?;
    if evidence.is_empty() {
        return Ok((0.0, vec!["No evidence".to_string()], Vec::new(), 0.0));
    }

    let mut factors = Vec::new();
    let mut stale_evidence_ids = Vec::new();
    let mut min_score: Option<f64> = None;

    for item in &evidence {
        if store.get_active_waiver(&item.id, now)?.is_some() {
            factors.push(format!("Evidence {} waived", item.id));
            min_score = Some(min_score.map_or(1.0, |current: f64| current.min(1.0)));
            continue;
        }

        let score = if item.is_stale() {
            stale_evidence_ids.push(item.id.clone());
            let reason = item.stale.as_ref().map_or("unknown", |flag| flag.reason.as_str());
            factors.push(format!("Evidence stale: {reason}"));
            0.2
        } else if let Some(valid_until) = item.valid_until.filter(|until| *until < now) {
            factors.push(format!("Evidence decayed past {}", valid_until.to_iso_date()));
            0.1
        } else {
            match item.verdict {
                Verdict::Fail => {
                    factors.push("Evidence fail".to_string());
                    0.0
                }
                Verdict::Refine => {
                    factors.push("Evidence calls for refinement".to_string());
                    0.0
                }
                Verdict::Degrade => 0.5,
                Verdict::Pass => {
                    if matches!(item.evidence_type, crate::core::EvidenceType::External) {
                        factors.push("External evidence CL2 penalty applied".to_string());
                        0.9
                    } else {
                        1.0
                    }
                }
            }
        };

        min_score = Some(min_score.map_or(score, |current: f64| current.min(score)));
    }

    let self_score = min_score.unwrap_or(0.0).clamp(0.0, 1.0);
    let stale_penalty = if self_score < 1.0 && !stale_evidence_ids.is_empty() {
        1.0 - self_score
    } else {
        0.0
    };

    Ok((self_score, factors, stale_evidence_ids, stale_penalty))
}

// ============================================================================
// SECTION: Cycle Detection
// ============================================================================

/// Returns whether inserting a `componentOf`/`constituentOf` edge
/// `source -> target` would create a cycle in the dependency subgraph.
///
/// Performs a depth-first search from `target` following outgoing
/// dependency edges; a cycle would exist iff `source` is reachable from
/// `target`.
///
/// # Errors
///
/// Returns [`EngineError::Storage`] when the store reports an error.
pub fn would_create_cycle(
    store: &impl Store,
    source: &HolonId,
    target: &HolonId,
) -> Result<bool, EngineError> {
    if source == target {
        return Ok(true);
    }
    let mut visited = HashSet::new();
    let mut stack = vec![target.clone()];
    while let Some(current) = stack.pop() {
        if current == *source {
            return Ok(true);
        }
        if !visited.insert(current.clone()) {
            continue;
        }
        for dep in store.list_dependencies_of(&current)? {
            stack.push(dep.target_id);
        }
    }
    Ok(false)
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "Test-only assertions are permitted to unwrap."
)]
mod tests {
    use std::cell::RefCell;
    use std::collections::BTreeMap;
    use std::collections::HashMap;

    use super::calculate_r_eff;
    use super::would_create_cycle;
    use crate::core::Characteristic;
    use crate::core::CongruenceLevel;
    use crate::core::ContextId;
    use crate::core::Evidence;
    use crate::core::EvidenceId;
    use crate::core::EvidenceType;
    use crate::core::FpfState;
    use crate::core::Holon;
    use crate::core::HolonId;
    use crate::core::HolonKind;
    use crate::core::HolonType;
    use crate::core::Layer;
    use crate::core::Relation;
    use crate::core::RelationType;
    use crate::core::Timestamp;
    use crate::core::Verdict;
    use crate::core::Waiver;
    use crate::core::WorkRecord;
    use crate::store::SearchHit;
    use crate::store::SearchScope;
    use crate::store::Store;
    use crate::store::StoreError;

    #[derive(Default)]
    struct MemoryStore {
        holons: RefCell<HashMap<HolonId, Holon>>,
        evidence: RefCell<HashMap<HolonId, Vec<Evidence>>>,
        relations: RefCell<Vec<Relation>>,
        waivers: RefCell<Vec<Waiver>>,
    }

    impl MemoryStore {
        fn insert_holon(&self, holon: Holon) {
            self.holons.borrow_mut().insert(holon.id.clone(), holon);
        }

        fn push_evidence(&self, evidence: Evidence) {
            self.evidence.borrow_mut().entry(evidence.holon_id.clone()).or_default().push(evidence);
        }

        fn push_relation(&self, relation: Relation) {
            self.relations.borrow_mut().push(relation);
        }
    }

    impl Store for MemoryStore {
        fn create_holon(&mut self, holon: &Holon) -> Result<(), StoreError> {
            self.holons.get_mut().insert(holon.id.clone(), holon.clone());
            Ok(())
        }

        fn get_holon(&self, id: &HolonId) -> Result<Option<Holon>, StoreError> {
            Ok(self.holons.borrow().get(id).cloned())
        }

        fn list_holon_ids(&self, _context_id: &ContextId) -> Result<Vec<HolonId>, StoreError> {
            Ok(self.holons.borrow().keys().cloned().collect())
        }

        fn update_holon_layer(
            &mut self,
            id: &HolonId,
            layer: Layer,
            _now: Timestamp,
        ) -> Result<(), StoreError> {
            if let Some(holon) = self.holons.get_mut().get_mut(id) {
                holon.layer = layer;
            }
            Ok(())
        }

        fn update_holon_score(&mut self, id: &HolonId, score: f64) -> Result<(), StoreError> {
            if let Some(holon) = self.holons.get_mut().get_mut(id) {
                holon.set_cached_score(score);
            }
            Ok(())
        }

        fn get_holons_by_parent(&self, _parent_id: &HolonId) -> Result<Vec<Holon>, StoreError> {
            Ok(Vec::new())
        }

        fn get_lineage(&self, id: &HolonId) -> Result<Vec<Holon>, StoreError> {
            Ok(self.holons.borrow().get(id).cloned().into_iter().collect())
        }

        fn mark_needs_reverification(
            &mut self,
            _id: &HolonId,
            _reason: &str,
            _now: Timestamp,
        ) -> Result<(), StoreError> {
            Ok(())
        }

        fn clear_needs_reverification(&mut self, _id: &HolonId) -> Result<(), StoreError> {
            Ok(())
        }

        fn count_by_layer(
            &self,
            _context_id: &ContextId,
            _active_only: bool,
        ) -> Result<BTreeMap<Layer, u64>, StoreError> {
            Ok(BTreeMap::new())
        }

        fn add_evidence(&mut self, evidence: &Evidence) -> Result<(), StoreError> {
            self.evidence.get_mut().entry(evidence.holon_id.clone()).or_default().push(evidence.clone());
            Ok(())
        }

        fn list_evidence_by_holon(&self, holon_id: &HolonId) -> Result<Vec<Evidence>, StoreError> {
            Ok(self.evidence.borrow().get(holon_id).cloned().unwrap_or_default())
        }

        fn list_evidence_with_carrier(&self, _carrier_ref: &str) -> Result<Vec<Evidence>, StoreError> {
            Ok(Vec::new())
        }

        fn mark_evidence_stale(
            &mut self,
            _evidence_id: &EvidenceId,
            _reason: &str,
            _now: Timestamp,
        ) -> Result<(), StoreError> {
            Ok(())
        }

        fn clear_evidence_stale(&mut self, _evidence_id: &EvidenceId) -> Result<(), StoreError> {
            Ok(())
        }

        fn clear_stale_for_holon(&mut self, _holon_id: &HolonId) -> Result<(), StoreError> {
            Ok(())
        }

        fn list_stale_by_holon(&self, _holon_id: &HolonId) -> Result<Vec<Evidence>, StoreError> {
            Ok(Vec::new())
        }

        fn list_all_stale(&self, _context_id: &ContextId) -> Result<Vec<Evidence>, StoreError> {
            Ok(Vec::new())
        }

        fn create_relation(&mut self, relation: &Relation) -> Result<bool, StoreError> {
            self.relations.get_mut().push(relation.clone());
            Ok(true)
        }

        fn list_dependencies_of(&self, source_id: &HolonId) -> Result<Vec<Relation>, StoreError> {
            let mut deps: Vec<Relation> = self
                .relations
                .borrow()
                .iter()
                .filter(|r| &r.source_id == source_id && r.relation_type.carries_dependency())
                .cloned()
                .collect();
            deps.sort_by(|a, b| a.target_id.as_str().cmp(b.target_id.as_str()));
            Ok(deps)
        }

        fn list_components_of(&self, target_id: &HolonId) -> Result<Vec<Relation>, StoreError> {
            Ok(self
                .relations
                .borrow()
                .iter()
                .filter(|r| &r.target_id == target_id && r.relation_type.carries_dependency())
                .cloned()
                .collect())
        }

        fn list_relations_from(
            &self,
            source_id: &HolonId,
            types: &[RelationType],
        ) -> Result<Vec<Relation>, StoreError> {
            Ok(self
                .relations
                .borrow()
                .iter()
                .filter(|r| &r.source_id == source_id && types.contains(&r.relation_type))
                .cloned()
                .collect())
        }

        fn list_relations_to(
            &self,
            target_id: &HolonId,
            types: &[RelationType],
        ) -> Result<Vec<Relation>, StoreError> {
            Ok(self
                .relations
                .borrow()
                .iter()
                .filter(|r| &r.target_id == target_id && types.contains(&r.relation_type))
                .cloned()
                .collect())
        }

        fn append_work_record(&mut self, _record: &WorkRecord) -> Result<(), StoreError> {
            Ok(())
        }

        fn list_work_records(&self, _holon_id: &HolonId) -> Result<Vec<WorkRecord>, StoreError> {
            Ok(Vec::new())
        }

        fn append_audit(&mut self, _entry: &crate::core::AuditLogEntry) -> Result<(), StoreError> {
            Ok(())
        }

        fn list_audit_by_context(
            &self,
            _context_id: &ContextId,
            _limit: usize,
        ) -> Result<Vec<crate::core::AuditLogEntry>, StoreError> {
            Ok(Vec::new())
        }

        fn list_audit_by_target(
            &self,
            _target_id: &str,
        ) -> Result<Vec<crate::core::AuditLogEntry>, StoreError> {
            Ok(Vec::new())
        }

        fn get_fpf_state(&self, _context_id: &ContextId) -> Result<Option<FpfState>, StoreError> {
            Ok(None)
        }

        fn put_fpf_state(&mut self, _state: &FpfState) -> Result<(), StoreError> {
            Ok(())
        }

        fn insert_waiver(&mut self, waiver: &Waiver) -> Result<(), StoreError> {
            self.waivers.get_mut().push(waiver.clone());
            Ok(())
        }

        fn get_active_waiver(
            &self,
            evidence_id: &EvidenceId,
            now: Timestamp,
        ) -> Result<Option<Waiver>, StoreError> {
            Ok(self
                .waivers
                .borrow()
                .iter()
                .find(|w| &w.evidence_id == evidence_id && w.is_active(now))
                .cloned())
        }

        fn add_characteristic(&mut self, _characteristic: &Characteristic) -> Result<(), StoreError> {
            Ok(())
        }

        fn list_characteristics(&self, _holon_id: &HolonId) -> Result<Vec<Characteristic>, StoreError> {
            Ok(Vec::new())
        }

        fn search(
            &self,
            _query: &str,
            _context_id: &ContextId,
            _scope: SearchScope,
            _layer_filter: Option<Layer>,
            _limit: usize,
        ) -> Result<Vec<SearchHit>, StoreError> {
            Ok(Vec::new())
        }
    }

    fn holon(id: &str, ctx: &ContextId, now: Timestamp) -> Holon {
        Holon {
            id: HolonId::new(id),
            holon_type: HolonType::Hypothesis,
            kind: HolonKind::System,
            layer: Layer::L0,
            title: id.to_string(),
            body: String::new(),
            context_id: ctx.clone(),
            claim_scope: String::new(),
            parent_id: None,
            cached_r_score: 0.0,
            reverification: None,
            contract: crate::core::Contract::default(),
            created_at: now,
            updated_at: now,
        }
    }

    fn pass_evidence(id: &str, holon_id: &str, now: Timestamp, valid_until: Option<Timestamp>) -> Evidence {
        Evidence {
            id: EvidenceId::new(id),
            holon_id: HolonId::new(holon_id),
            evidence_type: EvidenceType::TestResult,
            body: String::new(),
            verdict: Verdict::Pass,
            assurance_level: None,
            carrier_ref: None,
            carrier_hash: None,
            carrier_commit: None,
            stale: None,
            valid_until,
            created_at: now,
        }
    }

    #[test]
    fn s1_fresh_pass_scores_one() {
        let ctx = ContextId::new("ctx");
        let now = Timestamp::from_unix_millis(1_000_000);
        let mut store = MemoryStore::default();
        store.insert_holon(holon("a", &ctx, now));
        store.push_evidence(pass_evidence("e1", "a", now, Some(now.plus_days(1))));

        let report = calculate_r_eff(&store, &HolonId::new("a"), now).unwrap();
        assert_eq!(report.final_score, 1.0);
    }

    #[test]
    fn s2_decayed_evidence_scores_point_one() {
        let ctx = ContextId::new("ctx");
        let now = Timestamp::from_unix_millis(1_000_000);
        let mut store = MemoryStore::default();
        store.insert_holon(holon("a", &ctx, now));
        store.push_evidence(pass_evidence("e1", "a", now, Some(now.plus_days(-1))));

        let report = calculate_r_eff(&store, &HolonId::new("a"), now).unwrap();
        assert_eq!(report.final_score, 0.1);
        assert!(report.factors.iter().any(|f| f.contains("decayed")));
    }

    #[test]
    fn s3_wlnk_fail_dependency_drags_score_to_zero() {
        let ctx = ContextId::new("ctx");
        let now = Timestamp::from_unix_millis(1_000_000);
        let mut store = MemoryStore::default();
        store.insert_holon(holon("a", &ctx, now));
        store.insert_holon(holon("b", &ctx, now));
        store.push_evidence(pass_evidence("e1", "a", now, Some(now.plus_days(1))));
        let mut fail = pass_evidence("e2", "b", now, Some(now.plus_days(1)));
        fail.verdict = Verdict::Fail;
        store.push_evidence(fail);
        store.push_relation(Relation {
            source_id: HolonId::new("a"),
            target_id: HolonId::new("b"),
            relation_type: RelationType::ComponentOf,
            congruence_level: CongruenceLevel::Cl3,
            created_at: now,
        });

        let report = calculate_r_eff(&store, &HolonId::new("a"), now).unwrap();
        assert_eq!(report.final_score, 0.0);
        assert_eq!(report.weakest_link, HolonId::new("b"));
    }

    #[test]
    fn s4_cl1_penalty_applies() {
        let ctx = ContextId::new("ctx");
        let now = Timestamp::from_unix_millis(1_000_000);
        let mut store = MemoryStore::default();
        store.insert_holon(holon("a", &ctx, now));
        store.insert_holon(holon("b", &ctx, now));
        store.push_evidence(pass_evidence("e1", "a", now, Some(now.plus_days(1))));
        store.push_evidence(pass_evidence("e2", "b", now, Some(now.plus_days(1))));
        store.push_relation(Relation {
            source_id: HolonId::new("a"),
            target_id: HolonId::new("b"),
            relation_type: RelationType::ComponentOf,
            congruence_level: CongruenceLevel::Cl1,
            created_at: now,
        });

        let report = calculate_r_eff(&store, &HolonId::new("a"), now).unwrap();
        assert!((report.final_score - 0.7).abs() < f64::EPSILON);
    }

    #[test]
    fn s5_external_evidence_carries_cl2_penalty() {
        let ctx = ContextId::new("ctx");
        let now = Timestamp::from_unix_millis(1_000_000);
        let mut store = MemoryStore::default();
        store.insert_holon(holon("a", &ctx, now));
        let mut ev = pass_evidence("e1", "a", now, Some(now.plus_days(1)));
        ev.evidence_type = EvidenceType::External;
        store.push_evidence(ev);

        let report = calculate_r_eff(&store, &HolonId::new("a"), now).unwrap();
        assert!((report.final_score - 0.9).abs() < f64::EPSILON);
    }

    #[test]
    fn s6_stale_dependency_propagates() {
        let ctx = ContextId::new("ctx");
        let now = Timestamp::from_unix_millis(1_000_000);
        let mut store = MemoryStore::default();
        store.insert_holon(holon("a", &ctx, now));
        store.insert_holon(holon("b", &ctx, now));
        store.push_evidence(pass_evidence("e1", "a", now, Some(now.plus_days(1))));
        let mut stale = pass_evidence("e2", "b", now, Some(now.plus_days(1)));
        stale.stale = Some(crate::core::StaleFlag {
            reason: "carrier changed".to_string(),
            flagged_at: now,
        });
        store.push_evidence(stale);
        store.push_relation(Relation {
            source_id: HolonId::new("a"),
            target_id: HolonId::new("b"),
            relation_type: RelationType::ComponentOf,
            congruence_level: CongruenceLevel::Cl3,
            created_at: now,
        });

        let report = calculate_r_eff(&store, &HolonId::new("a"), now).unwrap();
        assert_eq!(report.final_score, 0.2);
        assert_eq!(report.weakest_link, HolonId::new("b"));
    }

    #[test]
    fn s7_cycle_is_broken_cleanly() {
        let ctx = ContextId::new("ctx");
        let now = Timestamp::from_unix_millis(1_000_000);
        let mut store = MemoryStore::default();
        for id in ["a", "b", "c"] {
            store.insert_holon(holon(id, &ctx, now));
            store.push_evidence(pass_evidence(&format!("e-{id}"), id, now, Some(now.plus_days(1))));
        }
        for (src, dst) in [("a", "b"), ("b", "c"), ("c", "a")] {
            store.push_relation(Relation {
                source_id: HolonId::new(src),
                target_id: HolonId::new(dst),
                relation_type: RelationType::ComponentOf,
                congruence_level: CongruenceLevel::Cl3,
                created_at: now,
            });
        }

        let report = calculate_r_eff(&store, &HolonId::new("a"), now).unwrap();
        assert_eq!(report.final_score, 1.0);
    }

    #[test]
    fn cycle_detection_flags_back_edges() {
        let ctx = ContextId::new("ctx");
        let now = Timestamp::from_unix_millis(1_000_000);
        let mut store = MemoryStore::default();
        store.insert_holon(holon("a", &ctx, now));
        store.insert_holon(holon("b", &ctx, now));
        store.push_relation(Relation {
            source_id: HolonId::new("a"),
            target_id: HolonId::new("b"),
            relation_type: RelationType::ComponentOf,
            congruence_level: CongruenceLevel::Cl3,
            created_at: now,
        });

        assert!(would_create_cycle(&store, &HolonId::new("b"), &HolonId::new("a")).unwrap());
        assert!(!would_create_cycle(&store, &HolonId::new("a"), &HolonId::new("b")).unwrap());
    }
}

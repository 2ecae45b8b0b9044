// crates/quint-store-sqlite/src/store.rs
// ============================================================================
// Module: Quint SQLite Store
// Description: Durable Store backed by SQLite WAL, with FTS5 search.
// Purpose: Implement quint_core::Store over a single local database file.
// Dependencies: quint-core, rusqlite
// ============================================================================

//! ## Overview
//! `SqliteStore` is the production [`Store`](quint_core::Store) backend.
//! Every method opens its own transaction against a mutex-guarded
//! connection, matching the single-writer concurrency model: Quint runs as
//! one process with requests processed strictly sequentially, so a
//! `Mutex<Connection>` is sufficient and never contended across threads in
//! practice. Search is served from FTS5 tables kept in sync with holon and
//! evidence writes.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Mutex;

use quint_core::AuditLogEntry;
use quint_core::AuditResult;
use quint_core::Characteristic;
use quint_core::CongruenceLevel;
use quint_core::Contract;
use quint_core::ContextId;
use quint_core::Evidence;
use quint_core::EvidenceId;
use quint_core::EvidenceType;
use quint_core::FpfState;
use quint_core::Holon;
use quint_core::HolonId;
use quint_core::HolonKind;
use quint_core::HolonType;
use quint_core::Layer;
use quint_core::Phase;
use quint_core::Relation;
use quint_core::RelationType;
use quint_core::Scale;
use quint_core::SearchHit;
use quint_core::SearchScope;
use quint_core::StaleFlag;
use quint_core::Store;
use quint_core::StoreError;
use quint_core::Timestamp;
use quint_core::Verdict;
use quint_core::Waiver;
use quint_core::WorkRecord;
use rusqlite::Connection;
use rusqlite::OpenFlags;
use rusqlite::OptionalExtension;
use rusqlite::Row;
use rusqlite::params;
use thiserror::Error;

use crate::migrations::MIGRATIONS;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised opening or initializing a [`SqliteStore`].
#[derive(Debug, Error)]
pub enum SqliteStoreError {
    /// The database file could not be opened.
    #[error("sqlite store io error: {0}")]
    Io(String),
    /// The underlying `SQLite` engine reported an error.
    #[error("sqlite store db error: {0}")]
    Db(String),
    /// A migration step failed to apply.
    #[error("sqlite store migration failed: {0}")]
    Migration(String),
}

impl From<SqliteStoreError> for StoreError {
    fn from(error: SqliteStoreError) -> Self {
        match error {
            SqliteStoreError::Io(message) => Self::Io(message),
            SqliteStoreError::Db(message) => Self::Io(message),
            SqliteStoreError::Migration(message) => Self::Migration(message),
        }
    }
}

/// Converts a `rusqlite` error into a [`StoreError`].
fn db_err(err: rusqlite::Error) -> StoreError {
    StoreError::Io(err.to_string())
}

// ============================================================================
// SECTION: Config
// ============================================================================

/// Configuration for opening a [`SqliteStore`].
#[derive(Debug, Clone)]
pub struct SqliteStoreConfig {
    /// Path to the `SQLite` database file.
    pub path: PathBuf,
    /// Busy timeout in milliseconds.
    pub busy_timeout_ms: u64,
}

impl SqliteStoreConfig {
    /// Builds a config pointing at `path` with the default busy timeout.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), busy_timeout_ms: 5_000 }
    }
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// `SQLite`-backed [`Store`] implementation.
pub struct SqliteStore {
    connection: Mutex<Connection>,
}

impl SqliteStore {
    /// Opens (creating if absent) a `SQLite`-backed store at `config.path`,
    /// applying any pending migrations.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the file cannot be opened or a
    /// migration fails.
    pub fn open(config: &SqliteStoreConfig) -> Result<Self, SqliteStoreError> {
        ensure_parent_dir(&config.path)?;
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_CREATE
            | OpenFlags::SQLITE_OPEN_FULL_MUTEX;
        let mut connection = Connection::open_with_flags(&config.path, flags)
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        apply_pragmas(&connection, config.busy_timeout_ms)?;
        run_migrations(&mut connection)?;
        Ok(Self { connection: Mutex::new(connection) })
    }

    /// Opens an in-memory store, used by tests.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the connection cannot be opened or
    /// a migration fails.
    pub fn open_in_memory() -> Result<Self, SqliteStoreError> {
        let mut connection =
            Connection::open_in_memory().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        run_migrations(&mut connection)?;
        Ok(Self { connection: Mutex::new(connection) })
    }

    /// Locks the shared connection, mapping mutex poisoning to a store error.
    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, StoreError> {
        self.connection.lock().map_err(|_| StoreError::Io("store mutex poisoned".to_string()))
    }
}

/// Creates the database file's parent directory if needed.
fn ensure_parent_dir(path: &Path) -> Result<(), SqliteStoreError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|err| SqliteStoreError::Io(err.to_string()))?;
        }
    }
    Ok(())
}

/// Configures WAL journaling, foreign keys, and the busy timeout.
fn apply_pragmas(connection: &Connection, busy_timeout_ms: u64) -> Result<(), SqliteStoreError> {
    connection
        .execute_batch("PRAGMA journal_mode = WAL; PRAGMA foreign_keys = ON;")
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    connection
        .busy_timeout(std::time::Duration::from_millis(busy_timeout_ms))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    Ok(())
}

/// Applies every migration step in [`MIGRATIONS`] whose version exceeds the
/// highest recorded in `schema_version`, tolerating `duplicate column name`
/// failures on `ADD COLUMN` statements (the column already exists on a
/// clean schema).
fn run_migrations(connection: &mut Connection) -> Result<(), SqliteStoreError> {
    connection
        .execute_batch(
            "CREATE TABLE IF NOT EXISTS schema_version (
                version     INTEGER PRIMARY KEY,
                applied_at  INTEGER NOT NULL
            );",
        )
        .map_err(|err| SqliteStoreError::Migration(err.to_string()))?;
    let current: i64 = connection
        .query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", params![], |row| {
            row.get(0)
        })
        .map_err(|err| SqliteStoreError::Migration(err.to_string()))?;

    for migration in MIGRATIONS {
        if migration.version <= current {
            continue;
        }
        let tx = connection.transaction().map_err(|err| SqliteStoreError::Migration(err.to_string()))?;
        match tx.execute_batch(migration.sql) {
            Ok(()) => {}
            Err(rusqlite::Error::SqliteFailure(_, Some(message)))
                if message.contains("duplicate column name") => {}
            Err(err) => return Err(SqliteStoreError::Migration(err.to_string())),
        }
        tx.execute(
            "INSERT INTO schema_version (version, applied_at) VALUES (?1, ?2)",
            params![migration.version, 0],
        )
        .map_err(|err| SqliteStoreError::Migration(err.to_string()))?;
        tx.commit().map_err(|err| SqliteStoreError::Migration(err.to_string()))?;
    }
    Ok(())
}

// ============================================================================
// SECTION: Row <-> Domain Conversions
// ============================================================================

/// Returns the wire string for a holon type.
fn holon_type_str(value: HolonType) -> &'static str {
    match value {
        HolonType::Hypothesis => "hypothesis",
        HolonType::Drr => "drr",
    }
}

/// Parses a holon type from its stored string.
fn parse_holon_type(value: &str) -> Result<HolonType, StoreError> {
    match value {
        "hypothesis" => Ok(HolonType::Hypothesis),
        "drr" => Ok(HolonType::Drr),
        other => Err(StoreError::Corrupt(format!("unknown holon_type: {other}"))),
    }
}

/// Returns the wire string for a holon kind.
fn holon_kind_str(value: HolonKind) -> &'static str {
    match value {
        HolonKind::System => "system",
        HolonKind::Episteme => "episteme",
    }
}

/// Parses a holon kind from its stored string.
fn parse_holon_kind(value: &str) -> Result<HolonKind, StoreError> {
    HolonKind::parse(value).map_err(|other| StoreError::Corrupt(format!("unknown kind: {other}")))
}

/// Returns the wire string for a layer.
fn layer_str(value: Layer) -> &'static str {
    value.as_str()
}

/// Parses a layer from its stored string.
fn parse_layer(value: &str) -> Result<Layer, StoreError> {
    match value {
        "L0" => Ok(Layer::L0),
        "L1" => Ok(Layer::L1),
        "L2" => Ok(Layer::L2),
        "DRR" => Ok(Layer::Drr),
        "invalid" => Ok(Layer::Invalid),
        other => Err(StoreError::Corrupt(format!("unknown layer: {other}"))),
    }
}

/// Returns the wire string for an evidence type.
fn evidence_type_str(value: EvidenceType) -> &'static str {
    match value {
        EvidenceType::TestResult => "test_result",
        EvidenceType::LogicCheck => "logic_check",
        EvidenceType::AuditReport => "audit_report",
        EvidenceType::Implementation => "implementation",
        EvidenceType::Abandonment => "abandonment",
        EvidenceType::Supersession => "supersession",
        EvidenceType::Waiver => "waiver",
        EvidenceType::External => "external",
    }
}

/// Parses an evidence type from its stored string.
fn parse_evidence_type(value: &str) -> Result<EvidenceType, StoreError> {
    match value {
        "test_result" => Ok(EvidenceType::TestResult),
        "logic_check" => Ok(EvidenceType::LogicCheck),
        "audit_report" => Ok(EvidenceType::AuditReport),
        "implementation" => Ok(EvidenceType::Implementation),
        "abandonment" => Ok(EvidenceType::Abandonment),
        "supersession" => Ok(EvidenceType::Supersession),
        "waiver" => Ok(EvidenceType::Waiver),
        "external" => Ok(EvidenceType::External),
        other => Err(StoreError::Corrupt(format!("unknown evidence_type: {other}"))),
    }
}

/// Returns the wire string for a verdict.
fn verdict_str(value: Verdict) -> &'static str {
    match value {
        Verdict::Pass => "pass",
        Verdict::Fail => "fail",
        Verdict::Degrade => "degrade",
        Verdict::Refine => "refine",
    }
}

/// Parses a verdict from its stored string.
fn parse_verdict(value: &str) -> Result<Verdict, StoreError> {
    match value {
        "pass" => Ok(Verdict::Pass),
        "fail" => Ok(Verdict::Fail),
        "degrade" => Ok(Verdict::Degrade),
        "refine" => Ok(Verdict::Refine),
        other => Err(StoreError::Corrupt(format!("unknown verdict: {other}"))),
    }
}

/// Returns the wire string for a relation type.
fn relation_type_str(value: RelationType) -> &'static str {
    match value {
        RelationType::ComponentOf => "componentOf",
        RelationType::ConstituentOf => "constituentOf",
        RelationType::MemberOf => "memberOf",
        RelationType::Selects => "selects",
        RelationType::Rejects => "rejects",
        RelationType::Refines => "refines",
        RelationType::VerifiedBy => "verifiedBy",
        RelationType::PerformedBy => "performedBy",
        RelationType::SupersededBy => "supersededBy",
    }
}

/// Parses a relation type from its stored string.
fn parse_relation_type(value: &str) -> Result<RelationType, StoreError> {
    match value {
        "componentOf" => Ok(RelationType::ComponentOf),
        "constituentOf" => Ok(RelationType::ConstituentOf),
        "memberOf" => Ok(RelationType::MemberOf),
        "selects" => Ok(RelationType::Selects),
        "rejects" => Ok(RelationType::Rejects),
        "refines" => Ok(RelationType::Refines),
        "verifiedBy" => Ok(RelationType::VerifiedBy),
        "performedBy" => Ok(RelationType::PerformedBy),
        "supersededBy" => Ok(RelationType::SupersededBy),
        other => Err(StoreError::Corrupt(format!("unknown relation_type: {other}"))),
    }
}

/// Returns the integer form of a congruence level.
fn congruence_i64(value: CongruenceLevel) -> i64 {
    match value {
        CongruenceLevel::Cl1 => 1,
        CongruenceLevel::Cl2 => 2,
        CongruenceLevel::Cl3 => 3,
    }
}

/// Parses a congruence level from its stored integer.
fn parse_congruence(value: i64) -> Result<CongruenceLevel, StoreError> {
    let value = u8::try_from(value).map_err(|_| StoreError::Corrupt("congruence_level out of range".to_string()))?;
    CongruenceLevel::from_u8(value)
        .map_err(|other| StoreError::Corrupt(format!("unknown congruence_level: {other}")))
}

/// Returns the wire string for a phase.
fn phase_str(value: Phase) -> &'static str {
    match value {
        Phase::Idle => "IDLE",
        Phase::Abduction => "ABDUCTION",
        Phase::Deduction => "DEDUCTION",
        Phase::Induction => "INDUCTION",
        Phase::Audit => "AUDIT",
        Phase::Decision => "DECISION",
    }
}

/// Parses a phase from its stored string.
fn parse_phase(value: &str) -> Result<Phase, StoreError> {
    match value {
        "IDLE" => Ok(Phase::Idle),
        "ABDUCTION" => Ok(Phase::Abduction),
        "DEDUCTION" => Ok(Phase::Deduction),
        "INDUCTION" => Ok(Phase::Induction),
        "AUDIT" => Ok(Phase::Audit),
        "DECISION" => Ok(Phase::Decision),
        other => Err(StoreError::Corrupt(format!("unknown phase: {other}"))),
    }
}

/// Returns the wire string for a measurement scale.
fn scale_str(value: Scale) -> &'static str {
    match value {
        Scale::Ordinal => "ordinal",
        Scale::Ratio => "ratio",
        Scale::Interval => "interval",
        Scale::Nominal => "nominal",
    }
}

/// Parses a measurement scale from its stored string.
fn parse_scale(value: &str) -> Result<Scale, StoreError> {
    match value {
        "ordinal" => Ok(Scale::Ordinal),
        "ratio" => Ok(Scale::Ratio),
        "interval" => Ok(Scale::Interval),
        "nominal" => Ok(Scale::Nominal),
        other => Err(StoreError::Corrupt(format!("unknown scale: {other}"))),
    }
}

/// Returns the wire string for an audit result.
fn audit_result_str(value: AuditResult) -> &'static str {
    match value {
        AuditResult::Success => "SUCCESS",
        AuditResult::Blocked => "BLOCKED",
        AuditResult::Error => "ERROR",
    }
}

/// Parses an audit result from its stored string.
fn parse_audit_result(value: &str) -> Result<AuditResult, StoreError> {
    match value {
        "SUCCESS" => Ok(AuditResult::Success),
        "BLOCKED" => Ok(AuditResult::Blocked),
        "ERROR" => Ok(AuditResult::Error),
        other => Err(StoreError::Corrupt(format!("unknown audit result: {other}"))),
    }
}

/// Builds a holon from a query row.
fn row_to_holon(row: &Row<'_>) -> rusqlite::Result<Result<Holon, StoreError>> {
    let id: String = row.get(0)?;
    let holon_type: String = row.get(1)?;
    let kind: String = row.get(2)?;
    let layer: String = row.get(3)?;
    let title: String = row.get(4)?;
    let body: String = row.get(5)?;
    let context_id: String = row.get(6)?;
    let claim_scope: String = row.get(7)?;
    let parent_id: Option<String> = row.get(8)?;
    let cached_r_score: f64 = row.get(9)?;
    let reverification_reason: Option<String> = row.get(10)?;
    let reverification_at: Option<i64> = row.get(11)?;
    let contract_json: String = row.get(12)?;
    let created_at: i64 = row.get(13)?;
    let updated_at: i64 = row.get(14)?;

    Ok((|| {
        Ok(Holon {
            id: HolonId::new(id),
            holon_type: parse_holon_type(&holon_type)?,
            kind: parse_holon_kind(&kind)?,
            layer: parse_layer(&layer)?,
            title,
            body,
            context_id: ContextId::new(context_id),
            claim_scope,
            parent_id: parent_id.map(HolonId::new),
            cached_r_score,
            reverification: reverification_reason.map(|reason| quint_core::ReverificationFlag {
                reason,
                flagged_at: Timestamp::from_unix_millis(reverification_at.unwrap_or_default()),
            }),
            contract: serde_json::from_str(&contract_json)
                .map_err(|err| StoreError::Corrupt(format!("contract_json: {err}")))?,
            created_at: Timestamp::from_unix_millis(created_at),
            updated_at: Timestamp::from_unix_millis(updated_at),
        })
    })())
}

/// Builds an evidence record from a query row.
fn row_to_evidence(row: &Row<'_>) -> rusqlite::Result<Result<Evidence, StoreError>> {
    let id: String = row.get(0)?;
    let holon_id: String = row.get(1)?;
    let evidence_type: String = row.get(2)?;
    let body: String = row.get(3)?;
    let verdict: String = row.get(4)?;
    let assurance_level: Option<String> = row.get(5)?;
    let carrier_ref: Option<String> = row.get(6)?;
    let carrier_hash: Option<String> = row.get(7)?;
    let carrier_commit: Option<String> = row.get(8)?;
    let stale_reason: Option<String> = row.get(9)?;
    let stale_at: Option<i64> = row.get(10)?;
    let valid_until: Option<i64> = row.get(11)?;
    let created_at: i64 = row.get(12)?;

    Ok((|| {
        Ok(Evidence {
            id: EvidenceId::new(id),
            holon_id: HolonId::new(holon_id),
            evidence_type: parse_evidence_type(&evidence_type)?,
            body,
            verdict: parse_verdict(&verdict)?,
            assurance_level,
            carrier_ref,
            carrier_hash,
            carrier_commit,
            stale: stale_reason.map(|reason| StaleFlag {
                reason,
                flagged_at: Timestamp::from_unix_millis(stale_at.unwrap_or_default()),
            }),
            valid_until: valid_until.map(Timestamp::from_unix_millis),
            created_at: Timestamp::from_unix_millis(created_at),
        })
    })())
}

/// Builds a relation from a query row.
fn row_to_relation(row: &Row<'_>) -> rusqlite::Result<Result<Relation, StoreError>> {
    let source_id: String = row.get(0)?;
    let target_id: String = row.get(1)?;
    let relation_type: String = row.get(2)?;
    let congruence_level: i64 = row.get(3)?;
    let created_at: i64 = row.get(4)?;
    Ok((|| {
        Ok(Relation {
            source_id: HolonId::new(source_id),
            target_id: HolonId::new(target_id),
            relation_type: parse_relation_type(&relation_type)?,
            congruence_level: parse_congruence(congruence_level)?,
            created_at: Timestamp::from_unix_millis(created_at),
        })
    })())
}

// ============================================================================
// SECTION: FTS5 Query Building
// ============================================================================

/// Tokenises `query` on whitespace/punctuation and rebuilds a safe FTS5
/// `MATCH` expression, quoting each term so reserved operators (hyphens,
/// carets, colons) cannot break the query parser. Terms are ORed together
/// so a hit on any token surfaces the row.
fn build_fts_query(query: &str) -> Option<String> {
    let terms: Vec<String> = query
        .split(|ch: char| !ch.is_alphanumeric())
        .filter(|term| !term.is_empty())
        .map(|term| format!("\"{}\"", term.replace('"', "\"\"")))
        .collect();
    if terms.is_empty() { None } else { Some(terms.join(" OR ")) }
}

// ============================================================================
// SECTION: Store Impl
// ============================================================================

impl Store for SqliteStore {
    fn create_holon(&mut self, holon: &Holon) -> Result<(), StoreError> {
        let mut guard = self.lock()?;
        let tx = guard.transaction().map_err(db_err)?;
        let contract_json = serde_json::to_string(&holon.contract)
            .map_err(|err| StoreError::Corrupt(err.to_string()))?;
        tx.execute(
            "INSERT INTO holons (
                id, holon_type, kind, layer, title, body, context_id, claim_scope,
                parent_id, cached_r_score, reverification_reason, reverification_at,
                contract_json, created_at, updated_at
            ) VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13,?14,?15)",
            params![
                holon.id.as_str(),
                holon_type_str(holon.holon_type),
                holon_kind_str(holon.kind),
                layer_str(holon.layer),
                holon.title,
                holon.body,
                holon.context_id.as_str(),
                holon.claim_scope,
                holon.parent_id.as_ref().map(HolonId::as_str),
                holon.cached_r_score,
                holon.reverification.as_ref().map(|flag| flag.reason.as_str()),
                holon.reverification.as_ref().map(|flag| flag.flagged_at.as_unix_millis()),
                contract_json,
                holon.created_at.as_unix_millis(),
                holon.updated_at.as_unix_millis(),
            ],
        )
        .map_err(db_err)?;
        tx.execute(
            "INSERT INTO holons_fts (id, title, body) VALUES (?1, ?2, ?3)",
            params![holon.id.as_str(), holon.title, holon.body],
        )
        .map_err(db_err)?;
        tx.commit().map_err(db_err)
    }

    fn get_holon(&self, id: &HolonId) -> Result<Option<Holon>, StoreError> {
        let guard = self.lock()?;
        guard
            .query_row(
                "SELECT id, holon_type, kind, layer, title, body, context_id, claim_scope,
                        parent_id, cached_r_score, reverification_reason, reverification_at,
                        contract_json, created_at, updated_at
                 FROM holons WHERE id = ?1",
                params![id.as_str()],
                row_to_holon,
            )
            .optional()
            .map_err(db_err)?
            .transpose()
    }

    fn list_holon_ids(&self, context_id: &ContextId) -> Result<Vec<HolonId>, StoreError> {
        let guard = self.lock()?;
        let mut stmt = guard
            .prepare("SELECT id FROM holons WHERE context_id = ?1 ORDER BY created_at")
            .map_err(db_err)?;
        let rows = stmt
            .query_map(params![context_id.as_str()], |row| row.get::<_, String>(0))
            .map_err(db_err)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(HolonId::new(row.map_err(db_err)?));
        }
        Ok(out)
    }

    fn update_holon_layer(
        &mut self,
        id: &HolonId,
        layer: Layer,
        now: Timestamp,
    ) -> Result<(), StoreError> {
        let guard = self.lock()?;
        guard
            .execute(
                "UPDATE holons SET layer = ?1, updated_at = ?2 WHERE id = ?3",
                params![layer_str(layer), now.as_unix_millis(), id.as_str()],
            )
            .map_err(db_err)?;
        Ok(())
    }

    fn update_holon_score(&mut self, id: &HolonId, score: f64) -> Result<(), StoreError> {
        let guard = self.lock()?;
        guard
            .execute(
                "UPDATE holons SET cached_r_score = ?1 WHERE id = ?2",
                params![score.clamp(0.0, 1.0), id.as_str()],
            )
            .map_err(db_err)?;
        Ok(())
    }

    fn get_holons_by_parent(&self, parent_id: &HolonId) -> Result<Vec<Holon>, StoreError> {
        let guard = self.lock()?;
        let mut stmt = guard
            .prepare(
                "SELECT id, holon_type, kind, layer, title, body, context_id, claim_scope,
                        parent_id, cached_r_score, reverification_reason, reverification_at,
                        contract_json, created_at, updated_at
                 FROM holons WHERE parent_id = ?1 ORDER BY created_at",
            )
            .map_err(db_err)?;
        let rows = stmt.query_map(params![parent_id.as_str()], row_to_holon).map_err(db_err)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row.map_err(db_err)??);
        }
        Ok(out)
    }

    fn get_lineage(&self, id: &HolonId) -> Result<Vec<Holon>, StoreError> {
        let mut lineage = Vec::new();
        let mut current = Some(id.clone());
        let mut guard_seen = std::collections::HashSet::new();
        while let Some(current_id) = current.take() {
            if !guard_seen.insert(current_id.clone()) {
                break;
            }
            let Some(holon) = self.get_holon(&current_id)? else {
                break;
            };
            current = holon.parent_id.clone();
            lineage.push(holon);
        }
        Ok(lineage)
    }

    fn mark_needs_reverification(
        &mut self,
        id: &HolonId,
        reason: &str,
        now: Timestamp,
    ) -> Result<(), StoreError> {
        let guard = self.lock()?;
        guard
            .execute(
                "UPDATE holons SET reverification_reason = ?1, reverification_at = ?2 WHERE id = ?3",
                params![reason, now.as_unix_millis(), id.as_str()],
            )
            .map_err(db_err)?;
        Ok(())
    }

    fn clear_needs_reverification(&mut self, id: &HolonId) -> Result<(), StoreError> {
        let guard = self.lock()?;
        guard
            .execute(
                "UPDATE holons SET reverification_reason = NULL, reverification_at = NULL \
                 WHERE id = ?1",
                params![id.as_str()],
            )
            .map_err(db_err)?;
        Ok(())
    }

    fn count_by_layer(
        &self,
        context_id: &ContextId,
        active_only: bool,
    ) -> Result<BTreeMap<Layer, u64>, StoreError> {
        let guard = self.lock()?;
        let mut stmt = guard
            .prepare("SELECT id, layer FROM holons WHERE context_id = ?1")
            .map_err(db_err)?;
        let rows = stmt
            .query_map(params![context_id.as_str()], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })
            .map_err(db_err)?;
        let mut counts = BTreeMap::new();
        for row in rows {
            let (id, layer) = row.map_err(db_err)?;
            let holon_id = HolonId::new(id);
            if active_only && !is_holon_active(&guard, &holon_id)? {
                continue;
            }
            let layer = parse_layer(&layer)?;
            *counts.entry(layer).or_insert(0) += 1;
        }
        Ok(counts)
    }

    fn add_evidence(&mut self, evidence: &Evidence) -> Result<(), StoreError> {
        let guard = self.lock()?;
        let tx = guard.unchecked_transaction().map_err(db_err)?;
        tx.execute(
            "INSERT INTO evidence (
                id, holon_id, evidence_type, body, verdict, assurance_level,
                carrier_ref, carrier_hash, carrier_commit, stale_reason, stale_at,
                valid_until, created_at
            ) VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13)",
            params![
                evidence.id.as_str(),
                evidence.holon_id.as_str(),
                evidence_type_str(evidence.evidence_type),
                evidence.body,
                verdict_str(evidence.verdict),
                evidence.assurance_level,
                evidence.carrier_ref,
                evidence.carrier_hash,
                evidence.carrier_commit,
                evidence.stale.as_ref().map(|flag| flag.reason.as_str()),
                evidence.stale.as_ref().map(|flag| flag.flagged_at.as_unix_millis()),
                evidence.valid_until.map(|t| t.as_unix_millis()),
                evidence.created_at.as_unix_millis(),
            ],
        )
        .map_err(db_err)?;
        tx.execute(
            "INSERT INTO evidence_fts (id, holon_id, body) VALUES (?1, ?2, ?3)",
            params![evidence.id.as_str(), evidence.holon_id.as_str(), evidence.body],
        )
        .map_err(db_err)?;
        tx.commit().map_err(db_err)
    }

    fn list_evidence_by_holon(&self, holon_id: &HolonId) -> Result<Vec<Evidence>, StoreError> {
        let guard = self.lock()?;
        let mut stmt = guard
            .prepare(
                "SELECT id, holon_id, evidence_type, body, verdict, assurance_level,
                        carrier_ref, carrier_hash, carrier_commit, stale_reason, stale_at,
                        valid_until, created_at
                 FROM evidence WHERE holon_id = ?1 ORDER BY created_at",
            )
            .map_err(db_err)?;
        let rows = stmt.query_map(params![holon_id.as_str()], row_to_evidence).map_err(db_err)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row.map_err(db_err)??);
        }
        Ok(out)
    }

    fn list_evidence_with_carrier(&self, carrier_ref: &str) -> Result<Vec<Evidence>, StoreError> {
        let guard = self.lock()?;
        let mut stmt = guard
            .prepare(
                "SELECT id, holon_id, evidence_type, body, verdict, assurance_level,
                        carrier_ref, carrier_hash, carrier_commit, stale_reason, stale_at,
                        valid_until, created_at
                 FROM evidence WHERE carrier_ref = ?1 ORDER BY created_at",
            )
            .map_err(db_err)?;
        let rows = stmt.query_map(params![carrier_ref], row_to_evidence).map_err(db_err)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row.map_err(db_err)??);
        }
        Ok(out)
    }

    fn mark_evidence_stale(
        &mut self,
        evidence_id: &EvidenceId,
        reason: &str,
        now: Timestamp,
    ) -> Result<(), StoreError> {
        let guard = self.lock()?;
        guard
            .execute(
                "UPDATE evidence SET stale_reason = ?1, stale_at = ?2 WHERE id = ?3",
                params![reason, now.as_unix_millis(), evidence_id.as_str()],
            )
            .map_err(db_err)?;
        Ok(())
    }

    fn clear_evidence_stale(&mut self, evidence_id: &EvidenceId) -> Result<(), StoreError> {
        let guard = self.lock()?;
        guard
            .execute(
                "UPDATE evidence SET stale_reason = NULL, stale_at = NULL WHERE id = ?1",
                params![evidence_id.as_str()],
            )
            .map_err(db_err)?;
        Ok(())
    }

    fn clear_stale_for_holon(&mut self, holon_id: &HolonId) -> Result<(), StoreError> {
        let guard = self.lock()?;
        guard
            .execute(
                "UPDATE evidence SET stale_reason = NULL, stale_at = NULL WHERE holon_id = ?1",
                params![holon_id.as_str()],
            )
            .map_err(db_err)?;
        Ok(())
    }

    fn list_stale_by_holon(&self, holon_id: &HolonId) -> Result<Vec<Evidence>, StoreError> {
        let guard = self.lock()?;
        let mut stmt = guard
            .prepare(
                "SELECT id, holon_id, evidence_type, body, verdict, assurance_level,
                        carrier_ref, carrier_hash, carrier_commit, stale_reason, stale_at,
                        valid_until, created_at
                 FROM evidence WHERE holon_id = ?1 AND stale_reason IS NOT NULL
                 ORDER BY created_at",
            )
            .map_err(db_err)?;
        let rows = stmt.query_map(params![holon_id.as_str()], row_to_evidence).map_err(db_err)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row.map_err(db_err)??);
        }
        Ok(out)
    }

    fn list_all_stale(&self, context_id: &ContextId) -> Result<Vec<Evidence>, StoreError> {
        let guard = self.lock()?;
        let mut stmt = guard
            .prepare(
                "SELECT e.id, e.holon_id, e.evidence_type, e.body, e.verdict, e.assurance_level,
                        e.carrier_ref, e.carrier_hash, e.carrier_commit, e.stale_reason,
                        e.stale_at, e.valid_until, e.created_at
                 FROM evidence e
                 JOIN holons h ON h.id = e.holon_id
                 WHERE h.context_id = ?1 AND e.stale_reason IS NOT NULL
                 ORDER BY e.created_at",
            )
            .map_err(db_err)?;
        let rows = stmt.query_map(params![context_id.as_str()], row_to_evidence).map_err(db_err)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row.map_err(db_err)??);
        }
        Ok(out)
    }

    fn create_relation(&mut self, relation: &Relation) -> Result<bool, StoreError> {
        let guard = self.lock()?;
        let existing: Option<i64> = guard
            .query_row(
                "SELECT 1 FROM relations WHERE source_id = ?1 AND target_id = ?2 AND relation_type = ?3",
                params![
                    relation.source_id.as_str(),
                    relation.target_id.as_str(),
                    relation_type_str(relation.relation_type)
                ],
                |row| row.get(0),
            )
            .optional()
            .map_err(db_err)?;
        if existing.is_some() {
            return Ok(false);
        }
        guard
            .execute(
                "INSERT INTO relations (source_id, target_id, relation_type, congruence_level, created_at)
                 VALUES (?1,?2,?3,?4,?5)",
                params![
                    relation.source_id.as_str(),
                    relation.target_id.as_str(),
                    relation_type_str(relation.relation_type),
                    congruence_i64(relation.congruence_level),
                    relation.created_at.as_unix_millis(),
                ],
            )
            .map_err(db_err)?;
        Ok(true)
    }

    fn list_dependencies_of(&self, source_id: &HolonId) -> Result<Vec<Relation>, StoreError> {
        let guard = self.lock()?;
        let mut stmt = guard
            .prepare(
                "SELECT source_id, target_id, relation_type, congruence_level, created_at
                 FROM relations
                 WHERE source_id = ?1 AND relation_type IN ('componentOf', 'constituentOf')
                 ORDER BY target_id",
            )
            .map_err(db_err)?;
        let rows = stmt.query_map(params![source_id.as_str()], row_to_relation).map_err(db_err)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row.map_err(db_err)??);
        }
        Ok(out)
    }

    fn list_components_of(&self, target_id: &HolonId) -> Result<Vec<Relation>, StoreError> {
        let guard = self.lock()?;
        let mut stmt = guard
            .prepare(
                "SELECT source_id, target_id, relation_type, congruence_level, created_at
                 FROM relations
                 WHERE target_id = ?1 AND relation_type IN ('componentOf', 'constituentOf')
                 ORDER BY source_id",
            )
            .map_err(db_err)?;
        let rows = stmt.query_map(params![target_id.as_str()], row_to_relation).map_err(db_err)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row.map_err(db_err)??);
        }
        Ok(out)
    }

    fn list_relations_from(
        &self,
        source_id: &HolonId,
        types: &[RelationType],
    ) -> Result<Vec<Relation>, StoreError> {
        let guard = self.lock()?;
        let mut stmt = guard
            .prepare(
                "SELECT source_id, target_id, relation_type, congruence_level, created_at
                 FROM relations WHERE source_id = ?1 ORDER BY target_id",
            )
            .map_err(db_err)?;
        let rows = stmt.query_map(params![source_id.as_str()], row_to_relation).map_err(db_err)?;
        let mut out = Vec::new();
        for row in rows {
            let relation = row.map_err(db_err)??;
            if types.contains(&relation.relation_type) {
                out.push(relation);
            }
        }
        Ok(out)
    }

    fn list_relations_to(
        &self,
        target_id: &HolonId,
        types: &[RelationType],
    ) -> Result<Vec<Relation>, StoreError> {
        let guard = self.lock()?;
        let mut stmt = guard
            .prepare(
                "SELECT source_id, target_id, relation_type, congruence_level, created_at
                 FROM relations WHERE target_id = ?1 ORDER BY source_id",
            )
            .map_err(db_err)?;
        let rows = stmt.query_map(params![target_id.as_str()], row_to_relation).map_err(db_err)?;
        let mut out = Vec::new();
        for row in rows {
            let relation = row.map_err(db_err)??;
            if types.contains(&relation.relation_type) {
                out.push(relation);
            }
        }
        Ok(out)
    }

    fn append_work_record(&mut self, record: &WorkRecord) -> Result<(), StoreError> {
        let guard = self.lock()?;
        let ledger_json = serde_json::to_string(&record.ledger)
            .map_err(|err| StoreError::Corrupt(err.to_string()))?;
        guard
            .execute(
                "INSERT INTO work_records (holon_id, method_ref, performer_ref, started_at, ended_at, ledger_json)
                 VALUES (?1,?2,?3,?4,?5,?6)",
                params![
                    record.holon_id.as_str(),
                    record.method_ref,
                    record.performer_ref,
                    record.started_at.as_unix_millis(),
                    record.ended_at.map(|t| t.as_unix_millis()),
                    ledger_json,
                ],
            )
            .map_err(db_err)?;
        Ok(())
    }

    fn list_work_records(&self, holon_id: &HolonId) -> Result<Vec<WorkRecord>, StoreError> {
        let guard = self.lock()?;
        let mut stmt = guard
            .prepare(
                "SELECT holon_id, method_ref, performer_ref, started_at, ended_at, ledger_json
                 FROM work_records WHERE holon_id = ?1 ORDER BY started_at",
            )
            .map_err(db_err)?;
        let rows = stmt
            .query_map(params![holon_id.as_str()], |row| {
                let holon_id: String = row.get(0)?;
                let method_ref: String = row.get(1)?;
                let performer_ref: String = row.get(2)?;
                let started_at: i64 = row.get(3)?;
                let ended_at: Option<i64> = row.get(4)?;
                let ledger_json: String = row.get(5)?;
                Ok((holon_id, method_ref, performer_ref, started_at, ended_at, ledger_json))
            })
            .map_err(db_err)?;
        let mut out = Vec::new();
        for row in rows {
            let (holon_id, method_ref, performer_ref, started_at, ended_at, ledger_json) =
                row.map_err(db_err)?;
            out.push(WorkRecord {
                holon_id: HolonId::new(holon_id),
                method_ref,
                performer_ref,
                started_at: Timestamp::from_unix_millis(started_at),
                ended_at: ended_at.map(Timestamp::from_unix_millis),
                ledger: serde_json::from_str(&ledger_json)
                    .map_err(|err| StoreError::Corrupt(format!("ledger_json: {err}")))?,
            });
        }
        Ok(out)
    }

    fn append_audit(&mut self, entry: &AuditLogEntry) -> Result<(), StoreError> {
        let guard = self.lock()?;
        guard
            .execute(
                "INSERT INTO audit_log (id, at, tool, operation, actor, target_id, input_hash, result, details, context_id)
                 VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10)",
                params![
                    entry.id.as_str(),
                    entry.at.as_unix_millis(),
                    entry.tool,
                    entry.operation,
                    entry.actor,
                    entry.target_id,
                    entry.input_hash,
                    audit_result_str(entry.result),
                    entry.details,
                    entry.context_id.as_str(),
                ],
            )
            .map_err(db_err)?;
        Ok(())
    }

    fn list_audit_by_context(
        &self,
        context_id: &ContextId,
        limit: usize,
    ) -> Result<Vec<AuditLogEntry>, StoreError> {
        let guard = self.lock()?;
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let mut stmt = guard
            .prepare(
                "SELECT id, at, tool, operation, actor, target_id, input_hash, result, details, context_id
                 FROM audit_log WHERE context_id = ?1 ORDER BY at DESC LIMIT ?2",
            )
            .map_err(db_err)?;
        let rows = stmt
            .query_map(params![context_id.as_str(), limit], row_to_audit_entry)
            .map_err(db_err)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row.map_err(db_err)??);
        }
        Ok(out)
    }

    fn list_audit_by_target(&self, target_id: &str) -> Result<Vec<AuditLogEntry>, StoreError> {
        let guard = self.lock()?;
        let mut stmt = guard
            .prepare(
                "SELECT id, at, tool, operation, actor, target_id, input_hash, result, details, context_id
                 FROM audit_log WHERE target_id = ?1 ORDER BY at DESC",
            )
            .map_err(db_err)?;
        let rows = stmt.query_map(params![target_id], row_to_audit_entry).map_err(db_err)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row.map_err(db_err)??);
        }
        Ok(out)
    }

    fn get_fpf_state(&self, context_id: &ContextId) -> Result<Option<FpfState>, StoreError> {
        let guard = self.lock()?;
        guard
            .query_row(
                "SELECT context_id, active_phase, active_session_id, last_commit, last_commit_at,
                        assurance_threshold, updated_at
                 FROM fpf_state WHERE context_id = ?1",
                params![context_id.as_str()],
                |row| {
                    let context_id: String = row.get(0)?;
                    let active_phase: String = row.get(1)?;
                    let active_session_id: Option<String> = row.get(2)?;
                    let last_commit: Option<String> = row.get(3)?;
                    let last_commit_at: Option<i64> = row.get(4)?;
                    let assurance_threshold: f64 = row.get(5)?;
                    let updated_at: i64 = row.get(6)?;
                    Ok((
                        context_id,
                        active_phase,
                        active_session_id,
                        last_commit,
                        last_commit_at,
                        assurance_threshold,
                        updated_at,
                    ))
                },
            )
            .optional()
            .map_err(db_err)?
            .map(
                |(
                    context_id,
                    active_phase,
                    active_session_id,
                    last_commit,
                    last_commit_at,
                    assurance_threshold,
                    updated_at,
                )| {
                    Ok(FpfState {
                        context_id: ContextId::new(context_id),
                        active_phase: parse_phase(&active_phase)?,
                        active_session_id,
                        last_commit,
                        last_commit_at: last_commit_at.map(Timestamp::from_unix_millis),
                        assurance_threshold,
                        updated_at: Timestamp::from_unix_millis(updated_at),
                    })
                },
            )
            .transpose()
    }

    fn put_fpf_state(&mut self, state: &FpfState) -> Result<(), StoreError> {
        let guard = self.lock()?;
        guard
            .execute(
                "INSERT INTO fpf_state (
                    context_id, active_phase, active_session_id, last_commit, last_commit_at,
                    assurance_threshold, updated_at
                 ) VALUES (?1,?2,?3,?4,?5,?6,?7)
                 ON CONFLICT(context_id) DO UPDATE SET
                    active_phase = excluded.active_phase,
                    active_session_id = excluded.active_session_id,
                    last_commit = excluded.last_commit,
                    last_commit_at = excluded.last_commit_at,
                    assurance_threshold = excluded.assurance_threshold,
                    updated_at = excluded.updated_at",
                params![
                    state.context_id.as_str(),
                    phase_str(state.active_phase),
                    state.active_session_id,
                    state.last_commit,
                    state.last_commit_at.map(|t| t.as_unix_millis()),
                    state.assurance_threshold,
                    state.updated_at.as_unix_millis(),
                ],
            )
            .map_err(db_err)?;
        Ok(())
    }

    fn insert_waiver(&mut self, waiver: &Waiver) -> Result<(), StoreError> {
        let guard = self.lock()?;
        guard
            .execute(
                "INSERT INTO waivers (id, evidence_id, waived_until, rationale, actor, created_at)
                 VALUES (?1,?2,?3,?4,?5,?6)",
                params![
                    waiver.id.as_str(),
                    waiver.evidence_id.as_str(),
                    waiver.waived_until.as_unix_millis(),
                    waiver.rationale,
                    waiver.actor,
                    waiver.created_at.as_unix_millis(),
                ],
            )
            .map_err(db_err)?;
        Ok(())
    }

    fn get_active_waiver(
        &self,
        evidence_id: &EvidenceId,
        now: Timestamp,
    ) -> Result<Option<Waiver>, StoreError> {
        let guard = self.lock()?;
        guard
            .query_row(
                "SELECT id, evidence_id, waived_until, rationale, actor, created_at
                 FROM waivers WHERE evidence_id = ?1 AND waived_until >= ?2
                 ORDER BY waived_until DESC LIMIT 1",
                params![evidence_id.as_str(), now.as_unix_millis()],
                |row| {
                    let id: String = row.get(0)?;
                    let evidence_id: String = row.get(1)?;
                    let waived_until: i64 = row.get(2)?;
                    let rationale: String = row.get(3)?;
                    let actor: Option<String> = row.get(4)?;
                    let created_at: i64 = row.get(5)?;
                    Ok(Waiver {
                        id: quint_core::WaiverId::new(id),
                        evidence_id: EvidenceId::new(evidence_id),
                        waived_until: Timestamp::from_unix_millis(waived_until),
                        rationale,
                        actor,
                        created_at: Timestamp::from_unix_millis(created_at),
                    })
                },
            )
            .optional()
            .map_err(db_err)
    }

    fn add_characteristic(&mut self, characteristic: &Characteristic) -> Result<(), StoreError> {
        let guard = self.lock()?;
        guard
            .execute(
                "INSERT INTO characteristics (holon_id, name, scale, value, unit)
                 VALUES (?1,?2,?3,?4,?5)",
                params![
                    characteristic.holon_id.as_str(),
                    characteristic.name,
                    scale_str(characteristic.scale),
                    characteristic.value,
                    characteristic.unit,
                ],
            )
            .map_err(db_err)?;
        Ok(())
    }

    fn list_characteristics(&self, holon_id: &HolonId) -> Result<Vec<Characteristic>, StoreError> {
        let guard = self.lock()?;
        let mut stmt = guard
            .prepare(
                "SELECT holon_id, name, scale, value, unit FROM characteristics WHERE holon_id = ?1",
            )
            .map_err(db_err)?;
        let rows = stmt
            .query_map(params![holon_id.as_str()], |row| {
                let holon_id: String = row.get(0)?;
                let name: String = row.get(1)?;
                let scale: String = row.get(2)?;
                let value: String = row.get(3)?;
                let unit: Option<String> = row.get(4)?;
                Ok((holon_id, name, scale, value, unit))
            })
            .map_err(db_err)?;
        let mut out = Vec::new();
        for row in rows {
            let (holon_id, name, scale, value, unit) = row.map_err(db_err)?;
            out.push(Characteristic {
                holon_id: HolonId::new(holon_id),
                name,
                scale: parse_scale(&scale)?,
                value,
                unit,
            });
        }
        Ok(out)
    }

    fn search(
        &self,
        query: &str,
        context_id: &ContextId,
        scope: SearchScope,
        layer_filter: Option<Layer>,
        limit: usize,
    ) -> Result<Vec<SearchHit>, StoreError> {
        let Some(fts_query) = build_fts_query(query) else {
            return Ok(Vec::new());
        };
        let guard = self.lock()?;
        let mut hits = Vec::new();

        if matches!(scope, SearchScope::Holons | SearchScope::All) {
            let mut stmt = guard
                .prepare(
                    "SELECT h.id, h.title, h.layer, bm25(holons_fts) AS rank
                     FROM holons_fts
                     JOIN holons h ON h.id = holons_fts.id
                     WHERE holons_fts MATCH ?1 AND h.context_id = ?2
                     ORDER BY rank",
                )
                .map_err(db_err)?;
            let rows = stmt
                .query_map(params![fts_query, context_id.as_str()], |row| {
                    let id: String = row.get(0)?;
                    let title: String = row.get(1)?;
                    let layer: String = row.get(2)?;
                    let rank: f64 = row.get(3)?;
                    Ok((id, title, layer, rank))
                })
                .map_err(db_err)?;
            for row in rows {
                let (id, title, layer, rank) = row.map_err(db_err)?;
                if let Some(filter) = layer_filter {
                    if parse_layer(&layer)? != filter {
                        continue;
                    }
                }
                hits.push(SearchHit { holon_id: HolonId::new(id), evidence_id: None, snippet: title, rank });
            }
        }

        if matches!(scope, SearchScope::Evidence | SearchScope::All) {
            let mut stmt = guard
                .prepare(
                    "SELECT e.holon_id, e.id, substr(e.body, 1, 160), h.layer, bm25(evidence_fts) AS rank
                     FROM evidence_fts
                     JOIN evidence e ON e.id = evidence_fts.id
                     JOIN holons h ON h.id = e.holon_id
                     WHERE evidence_fts MATCH ?1 AND h.context_id = ?2
                     ORDER BY rank",
                )
                .map_err(db_err)?;
            let rows = stmt
                .query_map(params![fts_query, context_id.as_str()], |row| {
                    let holon_id: String = row.get(0)?;
                    let evidence_id: String = row.get(1)?;
                    let snippet: String = row.get(2)?;
                    let layer: String = row.get(3)?;
                    let rank: f64 = row.get(4)?;
                    Ok((holon_id, evidence_id, snippet, layer, rank))
                })
                .map_err(db_err)?;
            for row in rows {
                let (holon_id, evidence_id, snippet, layer, rank) = row.map_err(db_err)?;
                if let Some(filter) = layer_filter {
                    if parse_layer(&layer)? != filter {
                        continue;
                    }
                }
                hits.push(SearchHit {
                    holon_id: HolonId::new(holon_id),
                    evidence_id: Some(EvidenceId::new(evidence_id)),
                    snippet,
                    rank,
                });
            }
        }

        hits.sort_by(|a, b| a.rank.total_cmp(&b.rank));
        hits.truncate(limit.clamp(1, 50));
        Ok(hits)
    }
}

/// Builds an audit log entry from a query row.
fn row_to_audit_entry(row: &Row<'_>) -> rusqlite::Result<Result<AuditLogEntry, StoreError>> {
    let id: String = row.get(0)?;
    let at: i64 = row.get(1)?;
    let tool: String = row.get(2)?;
    let operation: String = row.get(3)?;
    let actor: Option<String> = row.get(4)?;
    let target_id: Option<String> = row.get(5)?;
    let input_hash: String = row.get(6)?;
    let result: String = row.get(7)?;
    let details: String = row.get(8)?;
    let context_id: String = row.get(9)?;
    Ok((|| {
        Ok(AuditLogEntry {
            id: quint_core::AuditId::new(id),
            at: Timestamp::from_unix_millis(at),
            tool,
            operation,
            actor,
            target_id,
            input_hash,
            result: parse_audit_result(&result)?,
            details,
            context_id: ContextId::new(context_id),
        })
    })())
}

/// Returns whether `holon_id` satisfies the active-holons predicate: its
/// layer is not `invalid`, and no resolved DRR targets it via
/// `selects`/`rejects`. A DRR is resolved iff it carries evidence of type
/// `implementation`, `abandonment`, or `supersession`.
fn is_holon_active(connection: &Connection, holon_id: &HolonId) -> Result<bool, StoreError> {
    let layer: Option<String> = connection
        .query_row("SELECT layer FROM holons WHERE id = ?1", params![holon_id.as_str()], |row| row.get(0))
        .optional()
        .map_err(db_err)?;
    let Some(layer) = layer else {
        return Ok(false);
    };
    if layer == "invalid" {
        return Ok(false);
    }

    let mut stmt = connection
        .prepare(
            "SELECT r.source_id FROM relations r
             WHERE r.target_id = ?1 AND r.relation_type IN ('selects', 'rejects')",
        )
        .map_err(db_err)?;
    let drr_ids = stmt
        .query_map(params![holon_id.as_str()], |row| row.get::<_, String>(0))
        .map_err(db_err)?;
    for drr_id in drr_ids {
        let drr_id = drr_id.map_err(db_err)?;
        let resolved: Option<i64> = connection
            .query_row(
                "SELECT 1 FROM evidence WHERE holon_id = ?1
                 AND evidence_type IN ('implementation', 'abandonment', 'supersession') LIMIT 1",
                params![drr_id],
                |row| row.get(0),
            )
            .optional()
            .map_err(db_err)?;
        if resolved.is_some() {
            return Ok(false);
        }
    }
    Ok(true)
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::missing_docs_in_private_items,
    reason = "Test-only assertions are permitted to unwrap; test fixtures are self-explanatory."
)]
mod tests {
    use super::*;

    /// Builds a minimal L0 holon fixture for tests.
    fn holon(id: &str, ctx: &str, now: Timestamp) -> Holon {
        Holon {
            id: HolonId::new(id),
            holon_type: HolonType::Hypothesis,
            kind: HolonKind::System,
            layer: Layer::L0,
            title: format!("Use {id} for caching"),
            body: "a claim about caching".to_string(),
            context_id: ContextId::new(ctx),
            claim_scope: String::new(),
            parent_id: None,
            cached_r_score: 0.0,
            reverification: None,
            contract: Contract::default(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn round_trips_a_holon() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let now = Timestamp::from_unix_millis(10_000);
        let h = holon("redis-backed-cache", "ctx", now);
        store.create_holon(&h).unwrap();
        let fetched = store.get_holon(&h.id).unwrap().unwrap();
        assert_eq!(fetched.title, h.title);
        assert_eq!(fetched.layer, Layer::L0);
    }

    #[test]
    fn search_tolerates_hyphenated_terms() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let now = Timestamp::from_unix_millis(10_000);
        let h = holon("redis-backed-cache", "ctx", now);
        store.create_holon(&h).unwrap();
        let hits = store
            .search("redis-backed", &ContextId::new("ctx"), SearchScope::Holons, None, 10)
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].holon_id, h.id);
    }

    #[test]
    fn count_by_layer_excludes_archived_when_active_only() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let now = Timestamp::from_unix_millis(10_000);
        let winner = holon("winner", "ctx", now);
        let rejected = holon("rejected", "ctx", now);
        store.create_holon(&winner).unwrap();
        store.create_holon(&rejected).unwrap();

        let mut drr = holon("DRR-2026-01-01-decide", "ctx", now);
        drr.holon_type = HolonType::Drr;
        drr.layer = Layer::Drr;
        store.create_holon(&drr).unwrap();

        store
            .create_relation(&Relation {
                source_id: drr.id.clone(),
                target_id: rejected.id.clone(),
                relation_type: RelationType::Rejects,
                congruence_level: CongruenceLevel::Cl3,
                created_at: now,
            })
            .unwrap();
        store
            .add_evidence(&Evidence {
                id: EvidenceId::new("ev-1"),
                holon_id: drr.id.clone(),
                evidence_type: EvidenceType::Abandonment,
                body: "abandoned".to_string(),
                verdict: Verdict::Pass,
                assurance_level: None,
                carrier_ref: None,
                carrier_hash: None,
                carrier_commit: None,
                stale: None,
                valid_until: None,
                created_at: now,
            })
            .unwrap();

        let active = store.count_by_layer(&ContextId::new("ctx"), true).unwrap();
        let total: u64 = active.values().sum();
        assert_eq!(total, 2);
    }
}

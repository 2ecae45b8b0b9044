// crates/quint-store-sqlite/src/migrations.rs
// ============================================================================
// Module: Quint SQLite Migrations
// Description: Append-only, numbered schema migration ladder.
// Purpose: Bring a fresh or existing database file up to the current schema.
// Dependencies: rusqlite
// ============================================================================

//! ## Overview
//! Migrations are applied in order, starting from the version recorded in
//! `schema_version` (0 for a brand-new file). Each step is a single SQL
//! statement batch executed inside the caller's transaction. Steps must
//! never be reordered or edited after release; a correction becomes a new,
//! later-numbered step instead. `ADD COLUMN` failures with
//! `duplicate column name` are tolerated, since a clean-schema database
//! already carries the column a later migration would otherwise add.

// ============================================================================
// SECTION: Migration Ladder
// ============================================================================

/// One numbered migration step.
pub struct Migration {
    /// Monotonic version number, starting at 1.
    pub version: i64,
    /// SQL statement batch applied by this step.
    pub sql: &'static str,
}

/// The ordered list of schema migrations, applied in full on every open.
pub const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        sql: "
            CREATE TABLE IF NOT EXISTS holons (
                id                    TEXT PRIMARY KEY,
                holon_type            TEXT NOT NULL,
                kind                  TEXT NOT NULL,
                layer                 TEXT NOT NULL,
                title                 TEXT NOT NULL,
                body                  TEXT NOT NULL,
                context_id            TEXT NOT NULL,
                claim_scope           TEXT NOT NULL,
                parent_id             TEXT,
                cached_r_score        REAL NOT NULL,
                reverification_reason TEXT,
                reverification_at     INTEGER,
                contract_json         TEXT NOT NULL,
                created_at            INTEGER NOT NULL,
                updated_at            INTEGER NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_holons_context ON holons (context_id);
            CREATE INDEX IF NOT EXISTS idx_holons_parent ON holons (parent_id);

            CREATE TABLE IF NOT EXISTS evidence (
                id             TEXT PRIMARY KEY,
                holon_id       TEXT NOT NULL,
                evidence_type  TEXT NOT NULL,
                body           TEXT NOT NULL,
                verdict        TEXT NOT NULL,
                assurance_level TEXT,
                carrier_ref    TEXT,
                carrier_hash   TEXT,
                carrier_commit TEXT,
                stale_reason   TEXT,
                stale_at       INTEGER,
                valid_until    INTEGER,
                created_at     INTEGER NOT NULL,
                FOREIGN KEY (holon_id) REFERENCES holons(id)
            );
            CREATE INDEX IF NOT EXISTS idx_evidence_holon ON evidence (holon_id);
            CREATE INDEX IF NOT EXISTS idx_evidence_carrier ON evidence (carrier_ref);

            CREATE TABLE IF NOT EXISTS relations (
                source_id         TEXT NOT NULL,
                target_id         TEXT NOT NULL,
                relation_type     TEXT NOT NULL,
                congruence_level  INTEGER NOT NULL,
                created_at        INTEGER NOT NULL,
                PRIMARY KEY (source_id, target_id, relation_type)
            );
            CREATE INDEX IF NOT EXISTS idx_relations_source ON relations (source_id, relation_type);
            CREATE INDEX IF NOT EXISTS idx_relations_target ON relations (target_id, relation_type);

            CREATE TABLE IF NOT EXISTS work_records (
                holon_id       TEXT NOT NULL,
                method_ref     TEXT NOT NULL,
                performer_ref  TEXT NOT NULL,
                started_at     INTEGER NOT NULL,
                ended_at       INTEGER,
                ledger_json    TEXT NOT NULL,
                FOREIGN KEY (holon_id) REFERENCES holons(id)
            );
            CREATE INDEX IF NOT EXISTS idx_work_records_holon ON work_records (holon_id);

            CREATE TABLE IF NOT EXISTS audit_log (
                id          TEXT PRIMARY KEY,
                at          INTEGER NOT NULL,
                tool        TEXT NOT NULL,
                operation   TEXT NOT NULL,
                actor       TEXT,
                target_id   TEXT,
                input_hash  TEXT NOT NULL,
                result      TEXT NOT NULL,
                details     TEXT NOT NULL,
                context_id  TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_audit_context ON audit_log (context_id, at);
            CREATE INDEX IF NOT EXISTS idx_audit_target ON audit_log (target_id, at);

            CREATE TABLE IF NOT EXISTS fpf_state (
                context_id           TEXT PRIMARY KEY,
                active_phase         TEXT NOT NULL,
                active_session_id    TEXT,
                last_commit          TEXT,
                last_commit_at       INTEGER,
                assurance_threshold  REAL NOT NULL,
                updated_at           INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS waivers (
                id            TEXT PRIMARY KEY,
                evidence_id   TEXT NOT NULL,
                waived_until  INTEGER NOT NULL,
                rationale     TEXT NOT NULL,
                actor         TEXT,
                created_at    INTEGER NOT NULL,
                FOREIGN KEY (evidence_id) REFERENCES evidence(id)
            );
            CREATE INDEX IF NOT EXISTS idx_waivers_evidence ON waivers (evidence_id);

            CREATE TABLE IF NOT EXISTS characteristics (
                holon_id  TEXT NOT NULL,
                name      TEXT NOT NULL,
                scale     TEXT NOT NULL,
                value     TEXT NOT NULL,
                unit      TEXT,
                PRIMARY KEY (holon_id, name),
                FOREIGN KEY (holon_id) REFERENCES holons(id)
            );

            CREATE VIRTUAL TABLE IF NOT EXISTS holons_fts USING fts5(
                id UNINDEXED,
                title,
                body,
                tokenize = 'unicode61'
            );
            CREATE VIRTUAL TABLE IF NOT EXISTS evidence_fts USING fts5(
                id UNINDEXED,
                holon_id UNINDEXED,
                body,
                tokenize = 'unicode61'
            );
        ",
    },
];

// crates/quint-store-sqlite/src/lib.rs
// ============================================================================
// Module: Quint SQLite Store
// Description: Durable Store backend using SQLite WAL.
// Purpose: Provide production-grade persistence for the Quint data model.
// Dependencies: quint-core, rusqlite
// ============================================================================

//! ## Overview
//! This crate provides a `SQLite`-backed [`Store`](quint_core::Store)
//! implementation. It persists the holon/evidence/relation graph, the audit
//! log, and per-context FPF state, and serves `search` from an FTS5 index
//! kept in sync with holon and evidence writes. The store is single-writer:
//! callers serialize mutating calls at the dispatcher, matching Quint's
//! single-threaded concurrency model.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod migrations;
pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use store::SqliteStore;
pub use store::SqliteStoreConfig;
pub use store::SqliteStoreError;

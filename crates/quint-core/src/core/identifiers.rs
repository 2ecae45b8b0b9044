// crates/quint-core/src/core/identifiers.rs
// ============================================================================
// Module: Quint Identifiers
// Description: Canonical opaque identifiers for holons, evidence, and audit records.
// Purpose: Provide strongly typed, serializable IDs with stable string forms.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! This module defines the canonical string-based identifiers used throughout
//! Quint. Identifiers are opaque and serialize as strings. Validation (slug
//! shape, uniqueness) is handled at the store and slug-generation boundaries
//! rather than within these simple wrappers.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Identifier Types
// ============================================================================

/// Identifier for a holon (hypothesis or DRR).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HolonId(String);

impl HolonId {
    /// Creates a new holon identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HolonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for HolonId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for HolonId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// Identifier for an evidence record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EvidenceId(String);

impl EvidenceId {
    /// Creates a new evidence identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EvidenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for EvidenceId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for EvidenceId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// Identifier scoping holons, evidence, and FPF state to a project or workspace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContextId(String);

impl ContextId {
    /// Creates a new context identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for ContextId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ContextId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// Identifier for an append-only audit log entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuditId(String);

impl AuditId {
    /// Creates a new audit identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AuditId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for AuditId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for AuditId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// Identifier for a waiver granted against a piece of evidence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WaiverId(String);

impl WaiverId {
    /// Creates a new waiver identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WaiverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for WaiverId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for WaiverId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

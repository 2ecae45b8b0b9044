// crates/quint-core/src/core/characteristic.rs
// ============================================================================
// Module: Quint Characteristic Model
// Description: Named measurements attached to a holon.
// Purpose: Define the characteristic record and its measurement scale.
// Dependencies: crate::core::identifiers
// ============================================================================

//! ## Overview
//! Characteristics are read-only once written; they annotate a holon with a
//! measured or asserted quantity (e.g. latency, coverage percentage) without
//! participating in the assurance calculator.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::HolonId;

// ============================================================================
// SECTION: Scale
// ============================================================================

/// Measurement scale of a characteristic's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scale {
    /// Ordered categories without meaningful distance (e.g. low/medium/high).
    Ordinal,
    /// A true zero and meaningful ratios (e.g. latency in milliseconds).
    Ratio,
    /// Meaningful distance but no true zero (e.g. a calendar year).
    Interval,
    /// Unordered categories (e.g. a subsystem name).
    Nominal,
}

// ============================================================================
// SECTION: Characteristic
// ============================================================================

/// A named measurement attached to a holon.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Characteristic {
    /// Holon this characteristic describes.
    pub holon_id: HolonId,
    /// Characteristic name.
    pub name: String,
    /// Measurement scale.
    pub scale: Scale,
    /// Recorded value, as text (the scale determines how to interpret it).
    pub value: String,
    /// Unit of measurement, if applicable.
    pub unit: Option<String>,
}

// crates/quint-mcp/src/tools/common.rs
// ============================================================================
// Module: Quint Tool Helpers
// Description: Shared argument parsing and identifier resolution for tools.
// Purpose: Keep per-tool bodies focused on their own business rules.
// Dependencies: quint-core, serde_json
// ============================================================================

//! ## Overview
//! Tool arguments arrive as an untyped [`serde_json::Value`]; these helpers
//! pull typed, validated fields out of it and raise
//! [`EngineError::InvalidArgument`] with a field-specific message on
//! mismatch, so every tool reports malformed input the same way.

// ============================================================================
// SECTION: Imports
// ============================================================================

use quint_core::CongruenceLevel;
use quint_core::Contract;
use quint_core::ContextId;
use quint_core::EngineError;
use quint_core::EvidenceType;
use quint_core::Holon;
use quint_core::HolonId;
use quint_core::HolonKind;
use quint_core::HolonType;
use quint_core::Scale;
use quint_core::Store;
use quint_core::Verdict;
use serde_json::Value;

// ============================================================================
// SECTION: Argument Extraction
// ============================================================================

/// Reads a required string field from a tool-call arguments object.
///
/// # Errors
///
/// Returns [`EngineError::InvalidArgument`] when `field` is missing, not a
/// string, or blank.
pub fn require_str<'a>(args: &'a Value, field: &str) -> Result<&'a str, EngineError> {
    let value = args
        .get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| EngineError::InvalidArgument(format!("missing required field: {field}")))?;
    if value.trim().is_empty() {
        return Err(EngineError::InvalidArgument(format!("field must not be blank: {field}")));
    }
    Ok(value)
}

/// Reads an optional string field, returning `None` when absent or blank.
#[must_use]
pub fn optional_str<'a>(args: &'a Value, field: &str) -> Option<&'a str> {
    args.get(field).and_then(Value::as_str).filter(|value| !value.trim().is_empty())
}

/// Reads an optional string list field, defaulting to empty.
///
/// # Errors
///
/// Returns [`EngineError::InvalidArgument`] when `field` is present but not
/// an array of strings.
pub fn optional_str_list(args: &Value, field: &str) -> Result<Vec<String>, EngineError> {
    match args.get(field) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| {
                item.as_str().map(str::to_string).ok_or_else(|| {
                    EngineError::InvalidArgument(format!("field must be an array of strings: {field}"))
                })
            })
            .collect(),
        Some(_) => Err(EngineError::InvalidArgument(format!(
            "field must be an array of strings: {field}"
        ))),
    }
}

/// Reads an optional boolean field, defaulting to `false`.
#[must_use]
pub fn optional_bool(args: &Value, field: &str) -> bool {
    args.get(field).and_then(Value::as_bool).unwrap_or(false)
}

/// Reads an optional unsigned-integer field within `[min, max]`, applying
/// `default` when absent.
///
/// # Errors
///
/// Returns [`EngineError::InvalidArgument`] when present but not an integer
/// in range.
pub fn optional_u64_range(
    args: &Value,
    field: &str,
    default: u64,
    min: u64,
    max: u64,
) -> Result<u64, EngineError> {
    match args.get(field) {
        None | Some(Value::Null) => Ok(default),
        Some(value) => {
            let parsed = value.as_u64().ok_or_else(|| {
                EngineError::InvalidArgument(format!("field must be a non-negative integer: {field}"))
            })?;
            Ok(parsed.clamp(min, max))
        }
    }
}

/// Reads the `dependency_cl`/`congruence_level` style field, defaulting to
/// [`CongruenceLevel::Cl3`].
///
/// # Errors
///
/// Returns [`EngineError::InvalidArgument`] when the value is present but not
/// `1`, `2`, or `3`.
pub fn optional_congruence_level(
    args: &Value,
    field: &str,
) -> Result<CongruenceLevel, EngineError> {
    match args.get(field) {
        None | Some(Value::Null) => Ok(CongruenceLevel::Cl3),
        Some(value) => {
            let raw = value.as_u64().ok_or_else(|| {
                EngineError::InvalidArgument(format!("{field} must be 1, 2, or 3"))
            })?;
            let narrowed = u8::try_from(raw)
                .map_err(|_| EngineError::InvalidArgument(format!("{field} must be 1, 2, or 3")))?;
            CongruenceLevel::from_u8(narrowed)
                .map_err(|_| EngineError::InvalidArgument(format!("{field} must be 1, 2, or 3")))
        }
    }
}

/// Parses a holon kind from the required `kind` field.
///
/// # Errors
///
/// Returns [`EngineError::InvalidArgument`] when `kind` is missing or not
/// `"system"`/`"episteme"`.
pub fn require_kind(args: &Value) -> Result<HolonKind, EngineError> {
    let raw = require_str(args, "kind")?;
    HolonKind::parse(raw)
        .map_err(|bad| EngineError::InvalidArgument(format!("kind must be system or episteme, got: {bad}")))
}

/// Parses the required `verdict` field.
///
/// # Errors
///
/// Returns [`EngineError::InvalidArgument`] when `verdict` is missing or not
/// one of `pass`, `fail`, `degrade`, `refine`.
pub fn require_verdict(args: &Value) -> Result<Verdict, EngineError> {
    match require_str(args, "verdict")? {
        "pass" => Ok(Verdict::Pass),
        "fail" => Ok(Verdict::Fail),
        "degrade" => Ok(Verdict::Degrade),
        "refine" => Ok(Verdict::Refine),
        other => Err(EngineError::InvalidArgument(format!(
            "verdict must be pass, fail, degrade, or refine, got: {other}"
        ))),
    }
}

/// Joins optional `carrier_files` into a single carrier reference, since the
/// data model carries one carrier per evidence item.
#[must_use]
pub fn join_carrier_files(files: &[String]) -> Option<String> {
    if files.is_empty() { None } else { Some(files.join(", ")) }
}

// ============================================================================
// SECTION: Identifier Resolution
// ============================================================================

/// Resolves a holon id argument, looking it up literally first.
///
/// # Errors
///
/// Returns [`EngineError::NotFound`] when no holon with that id exists.
pub fn require_existing_holon<S: Store>(
    store: &S,
    field_value: &str,
) -> Result<HolonId, EngineError> {
    let id = HolonId::new(field_value);
    store
        .get_holon(&id)?
        .map(|_| id)
        .ok_or_else(|| EngineError::NotFound(format!("holon not found: {field_value}")))
}

/// Resolves a DRR identifier argument, accepting the full dated id
/// (`DRR-YYYY-MM-DD-<slug>`), the dated filename form (with a trailing
/// `.md`), or the bare slug alone.
///
/// # Errors
///
/// Returns [`EngineError::NotFound`] when no matching DRR exists, or
/// [`EngineError::Storage`] on a store failure.
pub fn resolve_drr_id<S: Store>(
    store: &S,
    context_id: &ContextId,
    raw: &str,
) -> Result<HolonId, EngineError> {
    let candidate = raw.strip_suffix(".md").unwrap_or(raw);

    if let Some(holon) = store.get_holon(&HolonId::new(candidate))? {
        return Ok(holon.id);
    }

    let suffix = format!("-{candidate}");
    let mut matches: Vec<HolonId> = store
        .list_holon_ids(context_id)?
        .into_iter()
        .filter(|id| id.as_str().starts_with("DRR-") && id.as_str().ends_with(&suffix))
        .collect();
    matches.sort_by(|a, b| a.as_str().cmp(b.as_str()));

    matches
        .into_iter()
        .next()
        .ok_or_else(|| EngineError::NotFound(format!("DRR not found: {raw}")))
}

// ============================================================================
// SECTION: Contract / Characteristic Parsing
// ============================================================================

/// Parses the optional `contract` field into a [`Contract`].
///
/// # Errors
///
/// Returns [`EngineError::InvalidArgument`] when `contract` is present but
/// not an object, or one of its fields is present but not an array of
/// strings.
pub fn parse_contract(value: Option<&Value>) -> Result<Contract, EngineError> {
    let Some(value) = value.filter(|value| !value.is_null()) else {
        return Ok(Contract::default());
    };
    let obj = value
        .as_object()
        .ok_or_else(|| EngineError::InvalidArgument("contract must be an object".to_string()))?;
    let string_list = |name: &str| -> Result<Vec<String>, EngineError> {
        match obj.get(name) {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| {
                    item.as_str().map(str::to_string).ok_or_else(|| {
                        EngineError::InvalidArgument(format!(
                            "contract.{name} must be an array of strings"
                        ))
                    })
                })
                .collect(),
            Some(_) => Err(EngineError::InvalidArgument(format!(
                "contract.{name} must be an array of strings"
            ))),
        }
    };
    Ok(Contract {
        invariants: string_list("invariants")?,
        anti_patterns: string_list("anti_patterns")?,
        acceptance_criteria: string_list("acceptance_criteria")?,
        affected_scope: string_list("affected_scope")?,
    })
}

/// A single parsed `characteristics[]` entry, missing only the holon id its
/// caller will attach.
pub struct CharacteristicInput {
    /// Characteristic name.
    pub name: String,
    /// Measurement scale.
    pub scale: Scale,
    /// Recorded value, stringified from the wire representation.
    pub value: String,
    /// Unit of measurement, if supplied.
    pub unit: Option<String>,
}

/// Parses the optional `characteristics` field.
///
/// # Errors
///
/// Returns [`EngineError::InvalidArgument`] when `characteristics` is
/// present but not an array of objects, or an entry is missing `name`/`value`
/// or carries an unrecognised `scale`.
pub fn parse_characteristics(value: Option<&Value>) -> Result<Vec<CharacteristicInput>, EngineError> {
    let items = match value {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(items)) => items,
        Some(_) => {
            return Err(EngineError::InvalidArgument(
                "characteristics must be an array of objects".to_string(),
            ));
        }
    };
    items
        .iter()
        .map(|item| {
            let obj = item.as_object().ok_or_else(|| {
                EngineError::InvalidArgument("characteristics entries must be objects".to_string())
            })?;
            let name = obj
                .get("name")
                .and_then(Value::as_str)
                .ok_or_else(|| EngineError::InvalidArgument("characteristic.name is required".to_string()))?
                .to_string();
            let scale = match obj.get("scale").and_then(Value::as_str).unwrap_or("nominal") {
                "ordinal" => Scale::Ordinal,
                "ratio" => Scale::Ratio,
                "interval" => Scale::Interval,
                "nominal" => Scale::Nominal,
                other => {
                    return Err(EngineError::InvalidArgument(format!(
                        "characteristic.scale must be ordinal, ratio, interval, or nominal, got: {other}"
                    )));
                }
            };
            let value = obj
                .get("value")
                .ok_or_else(|| EngineError::InvalidArgument("characteristic.value is required".to_string()))
                .map(scalar_to_string)?;
            let unit = obj.get("unit").and_then(Value::as_str).map(str::to_string);
            Ok(CharacteristicInput { name, scale, value, unit })
        })
        .collect()
}

/// Stringifies a JSON scalar (string or number) for storage as a
/// characteristic's text value.
fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

// ============================================================================
// SECTION: DRR Resolution Status
// ============================================================================

/// Derives the resolution status of `holon` from its evidence: `"open"`,
/// `"implemented"`, `"abandoned"`, or `"superseded"` for a DRR; `"n/a"` for
/// any non-DRR holon.
///
/// # Errors
///
/// Returns [`EngineError::Storage`] on a store failure.
pub fn resolution_status<S: Store>(store: &S, holon: &Holon) -> Result<&'static str, EngineError> {
    if holon.holon_type != HolonType::Drr {
        return Ok("n/a");
    }
    let evidence = store.list_evidence_by_holon(&holon.id)?;
    if evidence.iter().any(|item| item.evidence_type == EvidenceType::Supersession) {
        return Ok("superseded");
    }
    if evidence.iter().any(|item| item.evidence_type == EvidenceType::Abandonment) {
        return Ok("abandoned");
    }
    if evidence.iter().any(|item| item.evidence_type == EvidenceType::Implementation) {
        return Ok("implemented");
    }
    Ok("open")
}

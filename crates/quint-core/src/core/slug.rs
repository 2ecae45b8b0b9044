// crates/quint-core/src/core/slug.rs
// ============================================================================
// Module: Quint Slug Generation
// Description: Deterministic, collision-resolved slug derivation for holon ids.
// Purpose: Turn a human title into a stable identifier suffix.
// Dependencies: uuid
// ============================================================================

//! ## Overview
//! Holon identifiers are derived from their title by slugifying: lower-case,
//! non-alphanumeric runs collapsed to a single hyphen, leading/trailing
//! hyphens stripped. Collisions fall back to a numeric suffix, then to a
//! UUID if the suffixed form is also taken.

// ============================================================================
// SECTION: Imports
// ============================================================================

use uuid::Uuid;

// ============================================================================
// SECTION: Slugify
// ============================================================================

/// Slugifies `title` into a deterministic lower-case, hyphen-separated form.
///
/// Returns `"untitled"` when the title contains no alphanumeric characters.
#[must_use]
pub fn slugify(title: &str) -> String {
    let mut out = String::with_capacity(title.len());
    let mut last_was_sep = true;
    for ch in title.chars() {
        if ch.is_ascii_alphanumeric() {
            out.push(ch.to_ascii_lowercase());
            last_was_sep = false;
        } else if !last_was_sep {
            out.push('-');
            last_was_sep = true;
        }
    }
    while out.ends_with('-') {
        out.pop();
    }
    if out.is_empty() { "untitled".to_string() } else { out }
}

/// Resolves a slug against an existence predicate, falling back to a
/// numeric suffix and finally a UUID if every deterministic candidate is
/// already taken.
///
/// `exists` should return `true` when a holon with the candidate id already
/// exists in the target context.
pub fn resolve_unique_slug(base: &str, mut exists: impl FnMut(&str) -> bool) -> String {
    if !exists(base) {
        return base.to_string();
    }
    for suffix in 2..=20u32 {
        let candidate = format!("{base}-{suffix}");
        if !exists(&candidate) {
            return candidate;
        }
    }
    format!("{base}-{}", Uuid::new_v4())
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "Test-only assertions are permitted to unwrap."
)]
mod tests {
    use super::resolve_unique_slug;
    use super::slugify;

    #[test]
    fn slugify_collapses_punctuation() {
        assert_eq!(slugify("Use Redis-backed cache!"), "use-redis-backed-cache");
    }

    #[test]
    fn slugify_strips_edges() {
        assert_eq!(slugify("--Hello World--"), "hello-world");
    }

    #[test]
    fn slugify_empty_falls_back() {
        assert_eq!(slugify("!!!"), "untitled");
    }

    #[test]
    fn resolve_unique_slug_suffixes_on_collision() {
        let taken = ["cache", "cache-2"];
        let resolved = resolve_unique_slug("cache", |candidate| taken.contains(&candidate));
        assert_eq!(resolved, "cache-3");
    }

    #[test]
    fn resolve_unique_slug_passes_through_when_free() {
        let resolved = resolve_unique_slug("cache", |_| false);
        assert_eq!(resolved, "cache");
    }
}

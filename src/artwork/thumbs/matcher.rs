//! Three-phase fuzzy matching against a folder manifest.
//!
//! Evaluated in strict order, first hit wins:
//!
//! 1. **Exact**: case-insensitive lookup of the full stem. Authoritative.
//! 2. **Variant-stripped**: remove known non-identifying annotations
//!    (prototype/beta tags, re-release tags, revisions, unlicensed tags,
//!    publisher collection tags, a leading bad-dump bracket) while
//!    preserving region annotations, then retry the exact lookup. This
//!    recovers most non-identical dumps of the same release.
//! 3. **Title-only**: prefix-match on the base title before the first
//!    parenthesis/bracket, disambiguated by region. Last resort.
//!
//! Phases 2 and 3 are flagged `best_effort` so reporting can distinguish
//! confident identifications from speculative ones.

use regex::Regex;
use std::sync::LazyLock;

use super::manifest::FolderManifest;
use crate::artwork::domain::ManifestMatch;

/// Removal patterns for annotations that don't identify the release.
/// Ordered; region tags are deliberately absent so they survive.
static STRIP_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        // Development status
        r"(?i)\s*\((?:Proto|Beta|Demo|Sample|Promo)(?:[ ,][^)]*)?\)",
        // Platform re-releases
        r"(?i)\s*\((?:Virtual Console|e-Reader(?: Edition)?|Switch Online|Classic Mini|GameCube(?: Edition)?)\)",
        // Revisions
        r"(?i)\s*\(Rev(?:[ -][^)]*)?\)",
        // Unlicensed / pirate dumps
        r"(?i)\s*\((?:Unl|Pirate)\)",
        // Publisher re-issue collections
        r"(?i)\s*\([^)]*(?:Collection|Anniversary|Classics)[^)]*\)",
        // Leading bad-dump style bracket, e.g. "[b] Game (USA)"
        r"^\[[^\]]*\]\s*",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

/// Region annotations we recognise, multi-region labels first so the
/// alternation can't truncate them.
static REGION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\((World|Japan, USA|USA, Europe|USA, Australia|Europe, Australia|Japan|USA|Europe|Australia|Brazil|Canada|China|France|Germany|Italy|Korea|Netherlands|Spain|Sweden|Asia)\)",
    )
    .unwrap()
});

/// Tie-break order when the input's region matches no candidate.
const REGION_FALLBACK: [&str; 6] = ["World", "USA", "Japan, USA", "USA, Europe", "Europe", "Japan"];

/// Remove known variant annotations, preserving regions.
pub fn strip_variants(stem: &str) -> String {
    let mut out = stem.to_string();
    for pattern in STRIP_PATTERNS.iter() {
        out = pattern.replace_all(&out, "").into_owned();
    }
    out.trim().to_string()
}

/// Extract the recognised region annotation from a filename, if any.
pub fn extract_region(name: &str) -> Option<&str> {
    REGION_PATTERN
        .captures(name)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Base title: everything before the first parenthesis or bracket.
fn base_title(stem: &str) -> &str {
    let end = stem
        .find(['(', '['])
        .unwrap_or(stem.len());
    stem[..end].trim()
}

/// Find the manifest entry for a filename stem, loosening in phases.
pub fn find_match(manifest: &FolderManifest, stem: &str) -> Option<ManifestMatch> {
    // Phase 1: exact (case-insensitive)
    if let Some(canonical) = manifest.get(stem) {
        return Some(ManifestMatch {
            name: canonical.to_string(),
            best_effort: false,
        });
    }

    // Phase 2: variant-stripped exact
    let stripped = strip_variants(stem);
    if stripped != stem
        && let Some(canonical) = manifest.get(&stripped)
    {
        return Some(ManifestMatch {
            name: canonical.to_string(),
            best_effort: true,
        });
    }

    // Phase 3: title-only prefix match
    let base = base_title(stem);
    if base.is_empty() {
        return None;
    }
    let base_lower = base.to_lowercase();

    let mut candidates: Vec<&str> = manifest
        .entries()
        .filter(|(lower, _)| lower.starts_with(&base_lower))
        .map(|(_, canonical)| canonical)
        .collect();

    match candidates.len() {
        0 => None,
        1 => Some(ManifestMatch {
            name: candidates[0].to_string(),
            best_effort: true,
        }),
        _ => {
            // Lexicographic order makes every selection below deterministic
            candidates.sort_unstable();
            Some(ManifestMatch {
                name: pick_by_region(&candidates, stem).to_string(),
                best_effort: true,
            })
        }
    }
}

/// Disambiguate multiple title candidates by region.
///
/// Prefer a candidate sharing the input's own region annotation; then
/// walk the fixed fallback order; finally the lexicographic first.
fn pick_by_region<'a>(candidates: &[&'a str], stem: &str) -> &'a str {
    if let Some(wanted) = extract_region(stem)
        && let Some(hit) = candidates
            .iter()
            .find(|c| extract_region(c) == Some(wanted))
    {
        return hit;
    }

    for region in REGION_FALLBACK {
        if let Some(hit) = candidates
            .iter()
            .find(|c| extract_region(c) == Some(region))
        {
            return hit;
        }
    }

    candidates[0]
}

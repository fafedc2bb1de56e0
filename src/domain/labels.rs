//! Label catalogs.
//!
//! Labels are declared in named YAML catalogs (by language or feature) and
//! merged before being applied as a full replacement of the repository's
//! label set.

use serde::{Deserialize, Serialize};

/// One issue label definition.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Label {
    pub name: String,
    pub description: String,
    /// Hex color without the leading `#`.
    pub color: String,
}

/// Merge catalogs by concatenation with union-by-name semantics: a later
/// definition of an already-seen name replaces the earlier one in place, so
/// first-seen order is preserved.
pub fn merge_catalogs(catalogs: &[Vec<Label>]) -> Vec<Label> {
    let mut merged: Vec<Label> = Vec::new();
    for catalog in catalogs {
        for label in catalog {
            match merged.iter_mut().find(|existing| existing.name == label.name) {
                Some(existing) => *existing = label.clone(),
                None => merged.push(label.clone()),
            }
        }
    }
    merged
}

//! Heuristic patch selection from the remote catalog.

use std::collections::{BTreeSet, HashSet};

use crate::remote::PatchRecord;

/// Select patches matching any requested type label that still have at least
/// one target host missing them.
///
/// A label matches a patch when every whitespace-delimited token of the
/// label appears among the tokens of the patch description: token-subset,
/// order-independent, case-sensitive. This is best-effort classification —
/// it can over-select an unrelated patch sharing all label tokens and
/// under-select on punctuation mismatches.
pub fn select_patch_ids(patches: &[PatchRecord], requested_labels: &[String]) -> BTreeSet<i64> {
    patches
        .iter()
        .filter(|p| p.missing > 0 && matches_any_label(&p.patch_description, requested_labels))
        .map(|p| p.patch_id)
        .collect()
}

fn matches_any_label(description: &str, labels: &[String]) -> bool {
    let tokens: HashSet<&str> = description.split_whitespace().collect();
    labels
        .iter()
        .any(|label| label.split_whitespace().all(|tok| tokens.contains(tok)))
}

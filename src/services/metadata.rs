//! Validation and merging of user-submitted metadata.
//!
//! A submission is checked in order and rejected at the first failing rule:
//!
//! 1. candidates are trimmed; blank keys or values are dropped
//! 2. nothing left → [`MergeError::EmptyInput`]
//! 3. a key repeated within the submission → [`MergeError::DuplicateInInput`]
//! 4. a key already present on the server → [`MergeError::DuplicateExisting`]
//!
//! On success the payload is the decoded server map followed by the new
//! pairs in submission order, one single-key object per key.

use std::collections::{HashMap, HashSet};

use thiserror::Error;

use crate::models::{MetadataCandidate, MetadataEntry, MetadataMap};
use crate::wire::HeaderMode;

/// Reasons a metadata submission is rejected before anything is sent.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MergeError {
    #[error("no metadata entries with both a key and a value")]
    EmptyInput,

    #[error("duplicate keys in submission: {}", .0.join(", "))]
    DuplicateInInput(Vec<String>),

    #[error("keys already exist: {}", .0.join(", "))]
    DuplicateExisting(Vec<String>),
}

/// Validates `candidates` against `existing` and builds the save payload,
/// decoding existing values with header detection.
pub fn validate_and_merge(
    existing: &MetadataMap,
    candidates: &[MetadataCandidate],
) -> Result<Vec<MetadataEntry>, MergeError> {
    validate_and_merge_with(existing, candidates, HeaderMode::Detect)
}

/// Like [`validate_and_merge`], with an explicit header treatment.
pub fn validate_and_merge_with(
    existing: &MetadataMap,
    candidates: &[MetadataCandidate],
    mode: HeaderMode,
) -> Result<Vec<MetadataEntry>, MergeError> {
    let submitted: Vec<MetadataEntry> = candidates
        .iter()
        .map(|c| MetadataEntry::new(c.key.trim(), c.value.trim()))
        .filter(|e| !e.key.is_empty() && !e.value.is_empty())
        .collect();

    if submitted.is_empty() {
        return Err(MergeError::EmptyInput);
    }

    let repeated = repeated_keys(&submitted);
    if !repeated.is_empty() {
        return Err(MergeError::DuplicateInInput(repeated));
    }

    let current: Vec<MetadataEntry> = existing
        .iter()
        .map(|(key, value)| MetadataEntry::new(key, value.decode(mode).into_string()))
        .collect();
    let current_keys: HashSet<&str> = current.iter().map(|e| e.key.as_str()).collect();

    let colliding: Vec<String> = submitted
        .iter()
        .filter(|e| current_keys.contains(e.key.as_str()))
        .map(|e| e.key.clone())
        .collect();
    if !colliding.is_empty() {
        return Err(MergeError::DuplicateExisting(colliding));
    }

    tracing::debug!(
        existing = current.len(),
        added = submitted.len(),
        "metadata submission validated"
    );
    Ok(current.into_iter().chain(submitted).collect())
}

/// Keys occurring more than once, each named once, in first-seen order.
fn repeated_keys(entries: &[MetadataEntry]) -> Vec<String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for entry in entries {
        *counts.entry(entry.key.as_str()).or_default() += 1;
    }

    let mut reported = HashSet::new();
    entries
        .iter()
        .map(|e| e.key.as_str())
        .filter(|key| counts[key] > 1 && reported.insert(*key))
        .map(str::to_string)
        .collect()
}

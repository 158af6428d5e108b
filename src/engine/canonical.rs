// src/engine/canonical.rs

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::models::AssignmentMode;

/// Bumping this invalidates every previously computed inputs_hash.
pub const ALGORITHM_VERSION: &str = "v1";

const INPUTS_HASH_LEN: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CanonicalLine {
    pub hour: i32,
    pub role_key: String,
    pub suggested_headcount: i32,
}

// Field declaration order is the canonical key order (sorted). Struct
// serialization keeps it stable regardless of serde_json map features.
#[derive(Serialize)]
struct CanonicalInput<'a> {
    algorithm_version: &'static str,
    assignment_mode: &'static str,
    lines: &'a [CanonicalLine],
    time_zone: &'a str,
}

/// Canonical textual form of {plan, timezone, mode}. Lines are sorted by
/// (hour, role_key) so incidental input order never changes the content.
/// Zero-headcount lines are kept: flipping one to non-zero must change it.
pub fn canonical_input(lines: &[CanonicalLine], time_zone: &str, mode: AssignmentMode) -> String {
    let mut sorted = lines.to_vec();
    sorted.sort_by(|a, b| (a.hour, a.role_key.as_str()).cmp(&(b.hour, b.role_key.as_str())));

    let input = CanonicalInput {
        algorithm_version: ALGORITHM_VERSION,
        assignment_mode: mode.as_str(),
        lines: &sorted,
        time_zone,
    };
    serde_json::to_string(&input).expect("canonical input serializes to JSON")
}

/// Truncated SHA-256 of the canonical input; the run dedup key.
pub fn inputs_hash(lines: &[CanonicalLine], time_zone: &str, mode: AssignmentMode) -> String {
    let canonical = canonical_input(lines, time_zone, mode);
    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    let digest = format!("{:x}", hasher.finalize());
    digest[..INPUTS_HASH_LEN].to_string()
}

// src/engine/mod.rs
//
// Pure scheduling engine: no storage access, deterministic for fixed inputs.
// The route layer loads rows, feeds them through here, and persists results.

pub mod assignment;
pub mod blocks;
pub mod candidates;
pub mod canonical;
pub mod constraints;

pub use assignment::{
    distinct_assignees, select_assignment, AssignmentOutcome, CandidateEvaluation,
    ConstraintEvaluator, ConstraintViolation,
};
pub use blocks::{pack_blocks, HourDemand, ShiftBlock};
pub use candidates::{find_candidates, DatedException, EmployeeRecord, RecurringRule};
pub use canonical::{canonical_input, inputs_hash, CanonicalLine, ALGORITHM_VERSION};
pub use constraints::{ExistingShift, ShiftHistoryEvaluator};

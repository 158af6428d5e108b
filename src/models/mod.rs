// src/models/mod.rs

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// ───────────────────────────────────────
// Status / mode variants
// ───────────────────────────────────────
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "plan_status", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum PlanStatus {
    Draft,
    Published,
}

/// Whether a run only proposes shift blocks or also picks concrete assignees.
/// Threaded through the idempotency hash, so switching mode yields a new run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "assignment_mode", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum AssignmentMode {
    Unassigned,
    Assigned,
}

impl AssignmentMode {
    pub fn as_str(self) -> &'static str {
        match self {
            AssignmentMode::Unassigned => "UNASSIGNED",
            AssignmentMode::Assigned => "ASSIGNED",
        }
    }
}

/// Run lifecycle. VOID is terminal; publishing does not change the status,
/// it stamps published_at on an APPLIED run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "run_status", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum RunStatus {
    Draft,
    Applied,
    Void,
}

impl RunStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            RunStatus::Draft => "DRAFT",
            RunStatus::Applied => "APPLIED",
            RunStatus::Void => "VOID",
        }
    }

    pub fn can_void(self) -> bool {
        self == RunStatus::Draft
    }

    pub fn can_apply(self) -> bool {
        self == RunStatus::Draft
    }

    pub fn can_publish(self) -> bool {
        self == RunStatus::Applied
    }
}

// ───────────────────────────────────────
// Core tenancy
// ───────────────────────────────────────
#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Organization {
    pub organization_id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Branch {
    pub branch_id: i64,
    pub organization_id: i64,
    pub name: String,
    pub time_zone: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Employee {
    pub employee_id: i64,
    pub branch_id: i64,
    pub full_name: String,
    pub role_key: String,
    pub is_active: bool,
}

// ───────────────────────────────────────
// Planning inputs
// ───────────────────────────────────────
#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct StaffingPlan {
    pub staffing_plan_id: i64,
    pub branch_id: i64,
    pub day: NaiveDate,
    pub status: PlanStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct StaffingPlanLine {
    pub staffing_plan_line_id: i64,
    pub staffing_plan_id: i64,
    pub hour: i32,
    pub role_key: String,
    pub suggested_headcount: i32,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct AvailabilityRule {
    pub availability_rule_id: i64,
    pub employee_id: i64,
    pub weekday: i16, // 0 = Monday .. 6 = Sunday
    pub start_hour: i32,
    pub end_hour: i32,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct AvailabilityException {
    pub availability_exception_id: i64,
    pub employee_id: i64,
    pub day: NaiveDate,
    pub is_available: bool,
}

// ───────────────────────────────────────
// Runs, suggestions, outputs
// ───────────────────────────────────────
#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct ScheduleRun {
    pub schedule_run_id: i64,
    pub organization_id: i64,
    pub branch_id: i64,
    pub day: NaiveDate,
    pub inputs_hash: String,
    pub algorithm_version: String,
    pub assignment_mode: AssignmentMode,
    pub status: RunStatus,
    pub published_at: Option<DateTime<Utc>>,
    pub published_by: Option<i64>,
    pub created_at: DateTime<Utc>,
}

/// One proposed shift block. candidate_employee_ids is the eligibility
/// snapshot taken at generation time and is kept after assignment for audit.
#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct RunSuggestion {
    pub suggestion_id: i64,
    pub schedule_run_id: i64,
    pub role_key: String,
    pub start_at: NaiveDateTime,
    pub end_at: NaiveDateTime,
    pub headcount: i32,
    pub candidate_employee_ids: Vec<i64>,
    pub score: f64,
    pub assigned_employee_id: Option<i64>,
    pub assignment_reason: Option<String>,
    pub assignment_score: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Shift {
    pub shift_id: i64,
    pub branch_id: i64,
    pub employee_id: i64,
    pub role_key: String,
    pub start_at: NaiveDateTime,
    pub end_at: NaiveDateTime,
    pub schedule_run_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Notification {
    pub notification_id: i64,
    pub target_employee_id: i64,
    pub notification_type: String,
    pub payload: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub consumed_at: Option<DateTime<Utc>>,
}

// ───────────────────────────────────────
// DTOs helpful for endpoints
// ───────────────────────────────────────
#[derive(Debug, Serialize)]
pub struct RunEnvelope {
    pub run: ScheduleRun,
    pub suggestions: Vec<RunSuggestion>,
}

#[derive(Debug, Serialize)]
pub struct GenerateResult {
    pub run: ScheduleRun,
    pub suggestions: Vec<RunSuggestion>,
    pub pre_existing: bool,
}

#[derive(Debug, Serialize)]
pub struct ApplyResult {
    pub run: ScheduleRun,
    pub shifts_created: u64,
}

#[derive(Debug, Serialize)]
pub struct PublishResult {
    pub run: ScheduleRun,
    pub already_published: bool,
    pub notified: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn void_only_from_draft() {
        assert!(RunStatus::Draft.can_void());
        assert!(!RunStatus::Applied.can_void());
        assert!(!RunStatus::Void.can_void());
    }

    #[test]
    fn publish_only_from_applied() {
        assert!(RunStatus::Applied.can_publish());
        assert!(!RunStatus::Draft.can_publish());
        assert!(!RunStatus::Void.can_publish());
    }

    #[test]
    fn apply_only_from_draft() {
        assert!(RunStatus::Draft.can_apply());
        assert!(!RunStatus::Applied.can_apply());
        assert!(!RunStatus::Void.can_apply());
    }
}

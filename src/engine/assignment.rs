// src/engine/assignment.rs

use std::fmt;

use chrono::NaiveDateTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintViolation {
    ShiftOverlap,
    InsufficientRest,
    WeeklyHourCap,
    ConsecutiveDayCap,
}

impl fmt::Display for ConstraintViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConstraintViolation::ShiftOverlap => "overlaps an existing shift",
            ConstraintViolation::InsufficientRest => "insufficient rest around an existing shift",
            ConstraintViolation::WeeklyHourCap => "weekly hour cap exceeded",
            ConstraintViolation::ConsecutiveDayCap => "consecutive working day cap exceeded",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone)]
pub struct CandidateEvaluation {
    pub employee_id: i64,
    pub is_eligible: bool,
    pub score: f64,
    pub violations: Vec<ConstraintViolation>,
}

/// Ranks and filters candidates for a concrete time window. Implementations
/// return evaluations pre-sorted by priority and own all tie-breaking.
pub trait ConstraintEvaluator {
    fn evaluate(
        &self,
        candidate_ids: &[i64],
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Vec<CandidateEvaluation>;
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssignmentOutcome {
    pub assigned_employee_id: Option<i64>,
    pub assignment_reason: Option<String>,
    pub assignment_score: Option<f64>,
}

/// Picks the first eligible candidate in the evaluator's priority order. When
/// none is eligible the top-ranked candidate's violations become the
/// diagnostic assignment_reason and the suggestion stays unassigned.
pub fn select_assignment(
    evaluator: &dyn ConstraintEvaluator,
    candidate_ids: &[i64],
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> AssignmentOutcome {
    let evaluations = evaluator.evaluate(candidate_ids, start, end);

    if let Some(winner) = evaluations.iter().find(|e| e.is_eligible) {
        return AssignmentOutcome {
            assigned_employee_id: Some(winner.employee_id),
            assignment_reason: None,
            assignment_score: Some(winner.score),
        };
    }

    match evaluations.first() {
        Some(top) => {
            let joined = top
                .violations
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; ");
            AssignmentOutcome {
                assigned_employee_id: None,
                assignment_reason: Some(format!(
                    "no eligible candidate; best ranked employee {}: {}",
                    top.employee_id, joined
                )),
                assignment_score: None,
            }
        }
        None => AssignmentOutcome::default(),
    }
}

/// Distinct assignees across a run's suggestions, ascending. The publish
/// notification fan-out sends one message per entry.
pub fn distinct_assignees(assigned_ids: &[Option<i64>]) -> Vec<i64> {
    let mut ids: Vec<i64> = assigned_ids.iter().copied().flatten().collect();
    ids.sort_unstable();
    ids.dedup();
    ids
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedEvaluator(Vec<CandidateEvaluation>);

    impl ConstraintEvaluator for FixedEvaluator {
        fn evaluate(&self, _: &[i64], _: NaiveDateTime, _: NaiveDateTime) -> Vec<CandidateEvaluation> {
            self.0.clone()
        }
    }

    fn window() -> (NaiveDateTime, NaiveDateTime) {
        let day = chrono::NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        (
            day.and_hms_opt(10, 0, 0).unwrap(),
            day.and_hms_opt(14, 0, 0).unwrap(),
        )
    }

    fn eligible(employee_id: i64, score: f64) -> CandidateEvaluation {
        CandidateEvaluation {
            employee_id,
            is_eligible: true,
            score,
            violations: vec![],
        }
    }

    fn ineligible(employee_id: i64, score: f64, violations: Vec<ConstraintViolation>) -> CandidateEvaluation {
        CandidateEvaluation {
            employee_id,
            is_eligible: false,
            score,
            violations,
        }
    }

    #[test]
    fn picks_first_eligible_in_priority_order() {
        let evaluator = FixedEvaluator(vec![
            ineligible(7, 9.0, vec![ConstraintViolation::ShiftOverlap]),
            eligible(3, 5.0),
            eligible(1, 4.0),
        ]);
        let (start, end) = window();
        let got = select_assignment(&evaluator, &[7, 3, 1], start, end);
        assert_eq!(got.assigned_employee_id, Some(3));
        assert_eq!(got.assignment_score, Some(5.0));
        assert!(got.assignment_reason.is_none());
    }

    #[test]
    fn no_eligible_candidate_keeps_top_violations_as_reason() {
        let evaluator = FixedEvaluator(vec![
            ineligible(
                7,
                9.0,
                vec![
                    ConstraintViolation::InsufficientRest,
                    ConstraintViolation::WeeklyHourCap,
                ],
            ),
            ineligible(3, 5.0, vec![ConstraintViolation::ShiftOverlap]),
        ]);
        let (start, end) = window();
        let got = select_assignment(&evaluator, &[7, 3], start, end);
        assert_eq!(got.assigned_employee_id, None);
        assert_eq!(got.assignment_score, None);
        let reason = got.assignment_reason.unwrap();
        assert!(reason.contains("employee 7"));
        assert!(reason.contains("insufficient rest"));
        assert!(reason.contains("weekly hour cap"));
    }

    #[test]
    fn empty_candidate_set_stays_unassigned() {
        let evaluator = FixedEvaluator(vec![]);
        let (start, end) = window();
        assert_eq!(
            select_assignment(&evaluator, &[], start, end),
            AssignmentOutcome::default(),
        );
    }

    #[test]
    fn distinct_assignees_dedupes_and_sorts() {
        let ids = [Some(5), None, Some(2), Some(5), Some(9), None, Some(2)];
        assert_eq!(distinct_assignees(&ids), vec![2, 5, 9]);
        assert!(distinct_assignees(&[None, None]).is_empty());
    }
}

// src/engine/constraints.rs

use std::cmp::Ordering;

use chrono::{Datelike, Duration, NaiveDateTime};

use super::assignment::{CandidateEvaluation, ConstraintEvaluator, ConstraintViolation};

pub const MIN_REST_HOURS: i64 = 10;
pub const MAX_WEEKLY_HOURS: f64 = 40.0;
pub const MAX_CONSECUTIVE_DAYS: i64 = 6;

/// An already-scheduled shift, the ground truth the constraint rules run
/// against.
#[derive(Debug, Clone)]
pub struct ExistingShift {
    pub employee_id: i64,
    pub start_at: NaiveDateTime,
    pub end_at: NaiveDateTime,
}

/// In-memory constraint evaluator over a snapshot of existing shifts.
/// Priority favours candidates with more free capacity in the window's ISO
/// week; ties break on ascending employee id, so evaluation order is total
/// and rerunning against unchanged shift state reproduces the ranking.
pub struct ShiftHistoryEvaluator {
    shifts: Vec<ExistingShift>,
}

impl ShiftHistoryEvaluator {
    pub fn new(shifts: Vec<ExistingShift>) -> Self {
        Self { shifts }
    }

    fn evaluate_one(&self, employee_id: i64, start: NaiveDateTime, end: NaiveDateTime) -> CandidateEvaluation {
        let own: Vec<&ExistingShift> = self
            .shifts
            .iter()
            .filter(|s| s.employee_id == employee_id)
            .collect();

        let mut violations = Vec::new();

        if own.iter().any(|s| s.start_at < end && start < s.end_at) {
            violations.push(ConstraintViolation::ShiftOverlap);
        }

        let min_rest = Duration::hours(MIN_REST_HOURS);
        let short_rest = own.iter().any(|s| {
            (s.end_at <= start && start - s.end_at < min_rest)
                || (s.start_at >= end && s.start_at - end < min_rest)
        });
        if short_rest {
            violations.push(ConstraintViolation::InsufficientRest);
        }

        let week = start.date().iso_week();
        let weekly_hours: f64 = own
            .iter()
            .filter(|s| s.start_at.date().iso_week() == week)
            .map(|s| (s.end_at - s.start_at).num_minutes() as f64 / 60.0)
            .sum();
        let block_hours = (end - start).num_minutes() as f64 / 60.0;
        if weekly_hours + block_hours > MAX_WEEKLY_HOURS {
            violations.push(ConstraintViolation::WeeklyHourCap);
        }

        let mut streak = 0i64;
        let mut d = start.date() - Duration::days(1);
        while own.iter().any(|s| s.start_at.date() == d) {
            streak += 1;
            d = d - Duration::days(1);
        }
        if streak >= MAX_CONSECUTIVE_DAYS {
            violations.push(ConstraintViolation::ConsecutiveDayCap);
        }

        CandidateEvaluation {
            employee_id,
            is_eligible: violations.is_empty(),
            score: (MAX_WEEKLY_HOURS - weekly_hours).max(0.0),
            violations,
        }
    }
}

impl ConstraintEvaluator for ShiftHistoryEvaluator {
    fn evaluate(
        &self,
        candidate_ids: &[i64],
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Vec<CandidateEvaluation> {
        let mut evaluations: Vec<CandidateEvaluation> = candidate_ids
            .iter()
            .map(|&id| self.evaluate_one(id, start, end))
            .collect();
        evaluations.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then(a.employee_id.cmp(&b.employee_id))
        });
        evaluations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn shift(employee_id: i64, day: u32, start: u32, end: u32) -> ExistingShift {
        ExistingShift {
            employee_id,
            start_at: at(day, start),
            end_at: at(day, end),
        }
    }

    #[test]
    fn overlap_is_flagged() {
        let ev = ShiftHistoryEvaluator::new(vec![shift(1, 2, 12, 16)]);
        let got = ev.evaluate(&[1], at(2, 10), at(2, 14));
        assert!(!got[0].is_eligible);
        assert!(got[0].violations.contains(&ConstraintViolation::ShiftOverlap));
    }

    #[test]
    fn short_rest_is_flagged_long_rest_is_not() {
        // ends 08:00, block starts 10:00: 2h rest
        let ev = ShiftHistoryEvaluator::new(vec![shift(1, 2, 4, 8)]);
        let got = ev.evaluate(&[1], at(2, 10), at(2, 14));
        assert!(got[0]
            .violations
            .contains(&ConstraintViolation::InsufficientRest));

        // ends 22:00 the day before, block starts 10:00: 12h rest
        let ev = ShiftHistoryEvaluator::new(vec![shift(1, 1, 18, 22)]);
        let got = ev.evaluate(&[1], at(2, 10), at(2, 14));
        assert!(got[0].is_eligible);
    }

    #[test]
    fn weekly_hour_cap_counts_the_window_week() {
        // 2026-03-02 .. 2026-03-06 are Mon..Fri of one ISO week; 5 x 8h = 40h
        let busy: Vec<ExistingShift> = (2..7).map(|d| shift(1, d, 8, 16)).collect();
        let ev = ShiftHistoryEvaluator::new(busy);
        let got = ev.evaluate(&[1], at(7, 10), at(7, 14));
        assert!(got[0].violations.contains(&ConstraintViolation::WeeklyHourCap));

        // same load in the previous week does not count
        let last_week: Vec<ExistingShift> = (2..7).map(|d| shift(2, d, 8, 16)).collect();
        let ev = ShiftHistoryEvaluator::new(last_week);
        let got = ev.evaluate(&[2], at(9, 10), at(9, 14));
        assert!(!got[0].violations.contains(&ConstraintViolation::WeeklyHourCap));
    }

    #[test]
    fn consecutive_day_cap() {
        // worked 2..=7 (six days), proposing the 8th: seventh day in a row
        let run: Vec<ExistingShift> = (2..8).map(|d| shift(1, d, 8, 12)).collect();
        let ev = ShiftHistoryEvaluator::new(run);
        let got = ev.evaluate(&[1], at(8, 13), at(8, 17));
        assert!(got[0]
            .violations
            .contains(&ConstraintViolation::ConsecutiveDayCap));

        // five prior days is fine
        let run: Vec<ExistingShift> = (3..8).map(|d| shift(2, d, 8, 12)).collect();
        let ev = ShiftHistoryEvaluator::new(run);
        let got = ev.evaluate(&[2], at(8, 13), at(8, 17));
        assert!(!got[0]
            .violations
            .contains(&ConstraintViolation::ConsecutiveDayCap));
    }

    #[test]
    fn ranking_prefers_lighter_week_then_lower_id() {
        let ev = ShiftHistoryEvaluator::new(vec![shift(1, 2, 8, 16)]);
        let got = ev.evaluate(&[1, 2, 3], at(4, 10), at(4, 14));
        // 2 and 3 are idle (same score), 1 already has 8h this week
        let order: Vec<i64> = got.iter().map(|e| e.employee_id).collect();
        assert_eq!(order, vec![2, 3, 1]);
    }

    #[test]
    fn evaluation_is_deterministic() {
        let shifts = vec![shift(1, 2, 8, 16), shift(2, 3, 8, 12)];
        let ev = ShiftHistoryEvaluator::new(shifts);
        let a = ev.evaluate(&[3, 1, 2], at(4, 10), at(4, 14));
        let b = ev.evaluate(&[3, 1, 2], at(4, 10), at(4, 14));
        let ids_a: Vec<i64> = a.iter().map(|e| e.employee_id).collect();
        let ids_b: Vec<i64> = b.iter().map(|e| e.employee_id).collect();
        assert_eq!(ids_a, ids_b);
    }
}

// src/engine/candidates.rs

use chrono::{Datelike, NaiveDate};

#[derive(Debug, Clone)]
pub struct EmployeeRecord {
    pub employee_id: i64,
    pub role_key: String,
    pub is_active: bool,
}

/// Recurring weekly availability window. weekday: 0 = Monday .. 6 = Sunday.
#[derive(Debug, Clone)]
pub struct RecurringRule {
    pub employee_id: i64,
    pub weekday: i16,
    pub start_hour: i32,
    pub end_hour: i32,
}

/// Dated override: is_available = false blocks the whole day, true opens it
/// regardless of recurring windows.
#[derive(Debug, Clone)]
pub struct DatedException {
    pub employee_id: i64,
    pub day: NaiveDate,
    pub is_available: bool,
}

/// Eligible employee ids for one shift block, ascending by id. Employees with
/// no recurring rules at all default to available. Empty output is valid: the
/// block then has to be staffed manually.
pub fn find_candidates(
    employees: &[EmployeeRecord],
    rules: &[RecurringRule],
    exceptions: &[DatedException],
    role_key: &str,
    day: NaiveDate,
    start_hour: i32,
    end_hour: i32,
) -> Vec<i64> {
    let weekday = day.weekday().num_days_from_monday() as i16;

    let mut candidates: Vec<i64> = employees
        .iter()
        .filter(|e| e.is_active && e.role_key == role_key)
        .filter(|e| {
            match exceptions
                .iter()
                .find(|x| x.employee_id == e.employee_id && x.day == day)
            {
                Some(x) => x.is_available,
                None => {
                    let own: Vec<&RecurringRule> = rules
                        .iter()
                        .filter(|r| r.employee_id == e.employee_id)
                        .collect();
                    own.is_empty() || covers_window(&own, weekday, start_hour, end_hour)
                }
            }
        })
        .map(|e| e.employee_id)
        .collect();
    candidates.sort_unstable();
    candidates
}

/// True when the union of the weekday's windows covers `[start, end)`.
fn covers_window(rules: &[&RecurringRule], weekday: i16, start: i32, end: i32) -> bool {
    let mut windows: Vec<(i32, i32)> = rules
        .iter()
        .filter(|r| r.weekday == weekday)
        .map(|r| (r.start_hour, r.end_hour))
        .collect();
    windows.sort_unstable();

    let mut reach = start;
    for (s, e) in windows {
        if s > reach {
            break;
        }
        reach = reach.max(e);
        if reach >= end {
            return true;
        }
    }
    reach >= end
}

#[cfg(test)]
mod tests {
    use super::*;

    fn employee(employee_id: i64, role_key: &str) -> EmployeeRecord {
        EmployeeRecord {
            employee_id,
            role_key: role_key.to_string(),
            is_active: true,
        }
    }

    fn rule(employee_id: i64, weekday: i16, start_hour: i32, end_hour: i32) -> RecurringRule {
        RecurringRule {
            employee_id,
            weekday,
            start_hour,
            end_hour,
        }
    }

    // 2026-03-02 is a Monday
    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()
    }

    #[test]
    fn employee_without_rules_defaults_to_available() {
        let employees = vec![employee(1, "WAITER")];
        let got = find_candidates(&employees, &[], &[], "WAITER", monday(), 10, 14);
        assert_eq!(got, vec![1]);
    }

    #[test]
    fn unavailable_exception_excludes_even_without_rules() {
        let employees = vec![employee(1, "WAITER")];
        let exceptions = vec![DatedException {
            employee_id: 1,
            day: monday(),
            is_available: false,
        }];
        let got = find_candidates(&employees, &[], &exceptions, "WAITER", monday(), 10, 14);
        assert!(got.is_empty());
    }

    #[test]
    fn available_exception_overrides_recurring_windows() {
        let employees = vec![employee(1, "WAITER")];
        // Monday window ends before the block, but the dated override opens the day
        let rules = vec![rule(1, 0, 8, 10)];
        let exceptions = vec![DatedException {
            employee_id: 1,
            day: monday(),
            is_available: true,
        }];
        let got = find_candidates(&employees, &rules, &exceptions, "WAITER", monday(), 10, 14);
        assert_eq!(got, vec![1]);
    }

    #[test]
    fn window_union_must_cover_the_block() {
        let employees = vec![employee(1, "WAITER"), employee(2, "WAITER")];
        let rules = vec![
            // employee 1: two touching windows cover [10,14)
            rule(1, 0, 8, 12),
            rule(1, 0, 12, 16),
            // employee 2: a gap at 12 breaks coverage
            rule(2, 0, 8, 12),
            rule(2, 0, 13, 16),
        ];
        let got = find_candidates(&employees, &rules, &[], "WAITER", monday(), 10, 14);
        assert_eq!(got, vec![1]);
    }

    #[test]
    fn rules_on_other_weekdays_do_not_help() {
        let employees = vec![employee(1, "WAITER")];
        let rules = vec![rule(1, 5, 0, 24)]; // Saturday only
        let got = find_candidates(&employees, &rules, &[], "WAITER", monday(), 10, 14);
        assert!(got.is_empty());
    }

    #[test]
    fn role_and_active_filters_apply() {
        let mut inactive = employee(3, "WAITER");
        inactive.is_active = false;
        let employees = vec![employee(1, "WAITER"), employee(2, "CHEF"), inactive];
        let got = find_candidates(&employees, &[], &[], "WAITER", monday(), 10, 14);
        assert_eq!(got, vec![1]);
    }

    #[test]
    fn output_is_sorted_by_employee_id() {
        let employees = vec![employee(9, "WAITER"), employee(2, "WAITER"), employee(5, "WAITER")];
        let got = find_candidates(&employees, &[], &[], "WAITER", monday(), 10, 14);
        assert_eq!(got, vec![2, 5, 9]);
    }
}

// src/routes/runs.rs

use axum::http::StatusCode;
use axum::{extract::{Path, Query, State}, Json};
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Deserialize;
use sqlx::{query, query_as, query_scalar, Pool, Postgres};
use std::collections::BTreeMap;

use crate::engine;
use crate::models::{
    ApplyResult, AssignmentMode, GenerateResult, PublishResult, RunEnvelope, RunSuggestion,
    ScheduleRun,
};
use crate::AppState;
use super::{conflict, internal_error, not_found};

// ─────────────────────────────────────────────────────────────────────────────
// Request / Response models
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct GenerateRunBody {
    pub day: NaiveDate,
    pub assignment_mode: AssignmentMode,
}

#[derive(Deserialize)]
pub struct ListQ {
    pub branch_id: Option<i64>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

#[derive(Deserialize)]
pub struct LatestQ {
    pub day: NaiveDate,
}

#[derive(Deserialize)]
pub struct PublishBody {
    pub published_by: Option<i64>,
}

struct NewSuggestion {
    role_key: String,
    start_at: NaiveDateTime,
    end_at: NaiveDateTime,
    headcount: i32,
    candidate_ids: Vec<i64>,
    score: f64,
    outcome: engine::AssignmentOutcome,
}

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

async fn fetch_run(pool: &Pool<Postgres>, id: i64) -> Result<Option<ScheduleRun>, sqlx::Error> {
    query_as::<_, ScheduleRun>(r#"SELECT * FROM public.schedule_runs WHERE schedule_run_id=$1"#)
        .bind(id)
        .fetch_optional(pool)
        .await
}

async fn suggestions_for(pool: &Pool<Postgres>, run_id: i64) -> Result<Vec<RunSuggestion>, sqlx::Error> {
    query_as::<_, RunSuggestion>(
        r#"
        SELECT * FROM public.run_suggestions
        WHERE schedule_run_id=$1
        ORDER BY role_key, start_at
        "#,
    )
    .bind(run_id)
    .fetch_all(pool)
    .await
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/branches/:branch_id/schedule-runs
///
/// Idempotent: the canonical hash of {plan lines, timezone, mode} plus the
/// unique key on (organization_id, branch_id, day, inputs_hash) guarantee that
/// regenerating with unchanged inputs returns the existing run. Concurrent
/// duplicate calls race on the insert; the loser reads back the winner's row.
pub async fn generate_run(
    State(state): State<AppState>,
    Path(branch_id): Path<i64>,
    Json(b): Json<GenerateRunBody>,
) -> Result<Json<GenerateResult>, (StatusCode, String)> {
    // 1) Branch and timezone
    let (organization_id, time_zone): (i64, Option<String>) = query_as(
        r#"SELECT organization_id, time_zone FROM public.branches WHERE branch_id=$1"#,
    )
    .bind(branch_id)
    .fetch_optional(&state.pool)
    .await
    .map_err(internal_error)?
    .ok_or_else(|| not_found(format!("branch {branch_id}")))?;
    let time_zone = time_zone
        .filter(|tz| !tz.is_empty())
        .unwrap_or_else(|| "UTC".to_string());

    // 2) Staffing plan (PUBLISHED preferred over DRAFT); abort before any write
    let plan_id: i64 = query_scalar::<_, i64>(
        r#"
        SELECT staffing_plan_id FROM public.staffing_plans
        WHERE branch_id=$1 AND day=$2
        ORDER BY (status = 'PUBLISHED') DESC, staffing_plan_id DESC
        LIMIT 1
        "#,
    )
    .bind(branch_id)
    .bind(b.day)
    .fetch_optional(&state.pool)
    .await
    .map_err(internal_error)?
    .ok_or_else(|| not_found(format!("staffing plan for branch {branch_id} on {}", b.day)))?;

    let lines: Vec<(i32, String, i32)> = query_as(
        r#"
        SELECT hour, role_key, suggested_headcount
        FROM public.staffing_plan_lines
        WHERE staffing_plan_id=$1
        ORDER BY hour, role_key
        "#,
    )
    .bind(plan_id)
    .fetch_all(&state.pool)
    .await
    .map_err(internal_error)?;

    let canonical_lines: Vec<engine::CanonicalLine> = lines
        .iter()
        .map(|(hour, role_key, suggested_headcount)| engine::CanonicalLine {
            hour: *hour,
            role_key: role_key.clone(),
            suggested_headcount: *suggested_headcount,
        })
        .collect();
    let inputs_hash = engine::inputs_hash(&canonical_lines, &time_zone, b.assignment_mode);

    // 3) Same inputs already generated? Return the existing run untouched.
    if let Some(run) = query_as::<_, ScheduleRun>(
        r#"
        SELECT * FROM public.schedule_runs
        WHERE organization_id=$1 AND branch_id=$2 AND day=$3 AND inputs_hash=$4
        "#,
    )
    .bind(organization_id)
    .bind(branch_id)
    .bind(b.day)
    .bind(&inputs_hash)
    .fetch_optional(&state.pool)
    .await
    .map_err(internal_error)?
    {
        let suggestions = suggestions_for(&state.pool, run.schedule_run_id)
            .await
            .map_err(internal_error)?;
        return Ok(Json(GenerateResult { run, suggestions, pre_existing: true }));
    }

    // 4) Engine inputs: employees, availability, and (in ASSIGNED mode) the
    //    surrounding shift state for the constraint evaluator
    let day_start = b.day.and_time(NaiveTime::MIN);

    let employees: Vec<engine::EmployeeRecord> = query_as::<_, (i64, String, bool)>(
        r#"
        SELECT employee_id, role_key, is_active
        FROM public.employees
        WHERE branch_id=$1 AND is_active
        ORDER BY employee_id
        "#,
    )
    .bind(branch_id)
    .fetch_all(&state.pool)
    .await
    .map_err(internal_error)?
    .into_iter()
    .map(|(employee_id, role_key, is_active)| engine::EmployeeRecord {
        employee_id,
        role_key,
        is_active,
    })
    .collect();

    let rules: Vec<engine::RecurringRule> = query_as::<_, (i64, i16, i32, i32)>(
        r#"
        SELECT r.employee_id, r.weekday, r.start_hour, r.end_hour
        FROM public.availability_rules r
        JOIN public.employees e ON e.employee_id = r.employee_id
        WHERE e.branch_id = $1
        "#,
    )
    .bind(branch_id)
    .fetch_all(&state.pool)
    .await
    .map_err(internal_error)?
    .into_iter()
    .map(|(employee_id, weekday, start_hour, end_hour)| engine::RecurringRule {
        employee_id,
        weekday,
        start_hour,
        end_hour,
    })
    .collect();

    let exceptions: Vec<engine::DatedException> = query_as::<_, (i64, NaiveDate, bool)>(
        r#"
        SELECT x.employee_id, x.day, x.is_available
        FROM public.availability_exceptions x
        JOIN public.employees e ON e.employee_id = x.employee_id
        WHERE e.branch_id = $1 AND x.day = $2
        "#,
    )
    .bind(branch_id)
    .bind(b.day)
    .fetch_all(&state.pool)
    .await
    .map_err(internal_error)?
    .into_iter()
    .map(|(employee_id, day, is_available)| engine::DatedException {
        employee_id,
        day,
        is_available,
    })
    .collect();

    let evaluator = match b.assignment_mode {
        AssignmentMode::Assigned => {
            let existing: Vec<engine::ExistingShift> =
                query_as::<_, (i64, NaiveDateTime, NaiveDateTime)>(
                    r#"
                    SELECT employee_id, start_at, end_at
                    FROM public.shifts
                    WHERE branch_id=$1 AND start_at >= $2 AND start_at < $3
                    "#,
                )
                .bind(branch_id)
                .bind(day_start - Duration::days(7))
                .bind(day_start + Duration::days(8))
                .fetch_all(&state.pool)
                .await
                .map_err(internal_error)?
                .into_iter()
                .map(|(employee_id, start_at, end_at)| engine::ExistingShift {
                    employee_id,
                    start_at,
                    end_at,
                })
                .collect();
            Some(engine::ShiftHistoryEvaluator::new(existing))
        }
        AssignmentMode::Unassigned => None,
    };

    // 5) Pack blocks per role, snapshot candidates, select assignees.
    //    BTreeMap keeps roles ascending; blocks come out ascending by start,
    //    so suggestions land in (role_key, start_at) order.
    let mut by_role: BTreeMap<String, Vec<engine::HourDemand>> = BTreeMap::new();
    for (hour, role_key, headcount) in &lines {
        by_role.entry(role_key.clone()).or_default().push(engine::HourDemand {
            hour: *hour,
            headcount: *headcount,
        });
    }

    let mut new_suggestions: Vec<NewSuggestion> = Vec::new();
    for (role_key, demand) in &by_role {
        for block in engine::pack_blocks(demand) {
            let start_at = day_start + Duration::hours(i64::from(block.start_hour));
            let end_at = day_start + Duration::hours(i64::from(block.end_hour));
            let candidate_ids = engine::find_candidates(
                &employees,
                &rules,
                &exceptions,
                role_key,
                b.day,
                block.start_hour,
                block.end_hour,
            );
            let outcome = match &evaluator {
                Some(ev) => engine::select_assignment(ev, &candidate_ids, start_at, end_at),
                None => engine::AssignmentOutcome::default(),
            };
            new_suggestions.push(NewSuggestion {
                role_key: role_key.clone(),
                start_at,
                end_at,
                headcount: block.headcount,
                candidate_ids,
                score: block.score,
                outcome,
            });
        }
    }

    // 6) Insert run + suggestions in one transaction. The unique key is the
    //    synchronization primitive: a concurrent duplicate generate blocks on
    //    the insert and gets zero rows once the winner commits.
    let mut tx = state.pool.begin().await.map_err(internal_error)?;

    let inserted = query_as::<_, ScheduleRun>(
        r#"
        INSERT INTO public.schedule_runs
          (organization_id, branch_id, day, inputs_hash, algorithm_version, assignment_mode, status)
        VALUES ($1,$2,$3,$4,$5,$6,'DRAFT')
        ON CONFLICT (organization_id, branch_id, day, inputs_hash) DO NOTHING
        RETURNING schedule_run_id, organization_id, branch_id, day, inputs_hash,
                  algorithm_version, assignment_mode, status, published_at, published_by, created_at
        "#,
    )
    .bind(organization_id)
    .bind(branch_id)
    .bind(b.day)
    .bind(&inputs_hash)
    .bind(engine::ALGORITHM_VERSION)
    .bind(b.assignment_mode)
    .fetch_optional(&mut *tx)
    .await
    .map_err(internal_error)?;

    match inserted {
        Some(run) => {
            let mut suggestions = Vec::with_capacity(new_suggestions.len());
            for s in &new_suggestions {
                let row = query_as::<_, RunSuggestion>(
                    r#"
                    INSERT INTO public.run_suggestions
                      (schedule_run_id, role_key, start_at, end_at, headcount,
                       candidate_employee_ids, score, assigned_employee_id,
                       assignment_reason, assignment_score)
                    VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10)
                    RETURNING suggestion_id, schedule_run_id, role_key, start_at, end_at, headcount,
                              candidate_employee_ids, score, assigned_employee_id,
                              assignment_reason, assignment_score
                    "#,
                )
                .bind(run.schedule_run_id)
                .bind(&s.role_key)
                .bind(s.start_at)
                .bind(s.end_at)
                .bind(s.headcount)
                .bind(&s.candidate_ids)
                .bind(s.score)
                .bind(s.outcome.assigned_employee_id)
                .bind(&s.outcome.assignment_reason)
                .bind(s.outcome.assignment_score)
                .fetch_one(&mut *tx)
                .await
                .map_err(internal_error)?;
                suggestions.push(row);
            }
            tx.commit().await.map_err(internal_error)?;
            tracing::info!(
                run_id = run.schedule_run_id,
                inputs_hash = %run.inputs_hash,
                suggestions = suggestions.len(),
                "generated schedule run"
            );
            Ok(Json(GenerateResult { run, suggestions, pre_existing: false }))
        }
        None => {
            // lost the race; the winner's row is authoritative
            tx.rollback().await.map_err(internal_error)?;
            let run = query_as::<_, ScheduleRun>(
                r#"
                SELECT * FROM public.schedule_runs
                WHERE organization_id=$1 AND branch_id=$2 AND day=$3 AND inputs_hash=$4
                "#,
            )
            .bind(organization_id)
            .bind(branch_id)
            .bind(b.day)
            .bind(&inputs_hash)
            .fetch_one(&state.pool)
            .await
            .map_err(internal_error)?;
            let suggestions = suggestions_for(&state.pool, run.schedule_run_id)
                .await
                .map_err(internal_error)?;
            Ok(Json(GenerateResult { run, suggestions, pre_existing: true }))
        }
    }
}

/// GET /api/v1/schedule-runs/:id
pub async fn get_run(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<RunEnvelope>, (StatusCode, String)> {
    let run = fetch_run(&state.pool, id)
        .await
        .map_err(internal_error)?
        .ok_or_else(|| not_found(format!("schedule run {id}")))?;
    let suggestions = suggestions_for(&state.pool, id).await.map_err(internal_error)?;
    Ok(Json(RunEnvelope { run, suggestions }))
}

/// GET /api/v1/branches/:branch_id/schedule-runs?day=
pub async fn latest_run(
    State(state): State<AppState>,
    Path(branch_id): Path<i64>,
    Query(q): Query<LatestQ>,
) -> Result<Json<Option<RunEnvelope>>, (StatusCode, String)> {
    let run = query_as::<_, ScheduleRun>(
        r#"
        SELECT * FROM public.schedule_runs
        WHERE branch_id=$1 AND day=$2
        ORDER BY schedule_run_id DESC
        LIMIT 1
        "#,
    )
    .bind(branch_id)
    .bind(q.day)
    .fetch_optional(&state.pool)
    .await
    .map_err(internal_error)?;

    match run {
        Some(run) => {
            let suggestions = suggestions_for(&state.pool, run.schedule_run_id)
                .await
                .map_err(internal_error)?;
            Ok(Json(Some(RunEnvelope { run, suggestions })))
        }
        None => Ok(Json(None)),
    }
}

/// GET /api/v1/schedule-runs
pub async fn list_runs(
    State(state): State<AppState>,
    Query(q): Query<ListQ>,
) -> Result<Json<Vec<ScheduleRun>>, (StatusCode, String)> {
    let rows = query_as::<_, ScheduleRun>(
        r#"
        SELECT * FROM public.schedule_runs
        WHERE ($1::bigint IS NULL OR branch_id = $1)
          AND ($2::date IS NULL OR day >= $2)
          AND ($3::date IS NULL OR day <= $3)
        ORDER BY day DESC, schedule_run_id DESC
        "#,
    )
    .bind(q.branch_id)
    .bind(q.from)
    .bind(q.to)
    .fetch_all(&state.pool)
    .await
    .map_err(internal_error)?;
    Ok(Json(rows))
}

/// POST /api/v1/schedule-runs/:id/void
///
/// DRAFT only. An APPLIED run has real shifts behind it and must not be
/// silently discarded; VOID is terminal.
pub async fn void_run(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ScheduleRun>, (StatusCode, String)> {
    let updated = query_as::<_, ScheduleRun>(
        r#"
        UPDATE public.schedule_runs SET status='VOID'
        WHERE schedule_run_id=$1 AND status='DRAFT'
        RETURNING *
        "#,
    )
    .bind(id)
    .fetch_optional(&state.pool)
    .await
    .map_err(internal_error)?;

    match updated {
        Some(run) => Ok(Json(run)),
        None => {
            let run = fetch_run(&state.pool, id)
                .await
                .map_err(internal_error)?
                .ok_or_else(|| not_found(format!("schedule run {id}")))?;
            Err(conflict(format!(
                "cannot void schedule run {id} in status {}",
                run.status.as_str()
            )))
        }
    }
}

/// POST /api/v1/schedule-runs/:id/apply
///
/// Commits a DRAFT run: assigned suggestions become real shifts and the run
/// moves to APPLIED, in one transaction.
pub async fn apply_run(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApplyResult>, (StatusCode, String)> {
    let mut tx = state.pool.begin().await.map_err(internal_error)?;

    let updated = query_as::<_, ScheduleRun>(
        r#"
        UPDATE public.schedule_runs SET status='APPLIED'
        WHERE schedule_run_id=$1 AND status='DRAFT'
        RETURNING *
        "#,
    )
    .bind(id)
    .fetch_optional(&mut *tx)
    .await
    .map_err(internal_error)?;

    let run = match updated {
        Some(run) => run,
        None => {
            tx.rollback().await.map_err(internal_error)?;
            let run = fetch_run(&state.pool, id)
                .await
                .map_err(internal_error)?
                .ok_or_else(|| not_found(format!("schedule run {id}")))?;
            return Err(conflict(format!(
                "cannot apply schedule run {id} in status {}",
                run.status.as_str()
            )));
        }
    };

    let res = query(
        r#"
        INSERT INTO public.shifts(branch_id, employee_id, role_key, start_at, end_at, schedule_run_id)
        SELECT $2, s.assigned_employee_id, s.role_key, s.start_at, s.end_at, s.schedule_run_id
        FROM public.run_suggestions s
        WHERE s.schedule_run_id = $1 AND s.assigned_employee_id IS NOT NULL
        "#,
    )
    .bind(id)
    .bind(run.branch_id)
    .execute(&mut *tx)
    .await
    .map_err(internal_error)?;

    tx.commit().await.map_err(internal_error)?;
    tracing::info!(run_id = id, shifts = res.rows_affected(), "applied schedule run");
    Ok(Json(ApplyResult { run, shifts_created: res.rows_affected() }))
}

/// POST /api/v1/schedule-runs/:id/publish
///
/// APPLIED only. The conditional update on `published_at IS NULL` is the
/// compare-and-swap that makes publish idempotent under concurrent calls:
/// exactly one caller sees a row come back and fans out notifications.
/// Outbox failures are logged and never roll back the transition.
pub async fn publish_run(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    body: Option<Json<PublishBody>>,
) -> Result<Json<PublishResult>, (StatusCode, String)> {
    let published_by = body.and_then(|Json(b)| b.published_by);

    let updated = query_as::<_, ScheduleRun>(
        r#"
        UPDATE public.schedule_runs
           SET published_at = now(),
               published_by = $2
         WHERE schedule_run_id = $1
           AND status = 'APPLIED'
           AND published_at IS NULL
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(published_by)
    .fetch_optional(&state.pool)
    .await
    .map_err(internal_error)?;

    match updated {
        Some(run) => {
            let assigned: Vec<Option<i64>> = match query_scalar::<_, Option<i64>>(
                r#"SELECT assigned_employee_id FROM public.run_suggestions WHERE schedule_run_id=$1"#,
            )
            .bind(id)
            .fetch_all(&state.pool)
            .await
            {
                Ok(rows) => rows,
                Err(e) => {
                    tracing::warn!(run_id = id, error = %e, "could not load assignees for notification fan-out");
                    Vec::new()
                }
            };

            let payload = serde_json::json!({
                "schedule_run_id": run.schedule_run_id,
                "branch_id": run.branch_id,
                "day": run.day,
            });
            let mut notified = 0usize;
            for employee_id in engine::distinct_assignees(&assigned) {
                let res = query(
                    r#"
                    INSERT INTO public.notifications(target_employee_id, notification_type, payload)
                    VALUES ($1, 'SCHEDULE_PUBLISHED', $2)
                    "#,
                )
                .bind(employee_id)
                .bind(&payload)
                .execute(&state.pool)
                .await;
                match res {
                    Ok(_) => notified += 1,
                    Err(e) => tracing::warn!(
                        run_id = id,
                        employee_id,
                        error = %e,
                        "failed to enqueue publish notification"
                    ),
                }
            }
            tracing::info!(run_id = id, notified, "published schedule run");
            Ok(Json(PublishResult { run, already_published: false, notified }))
        }
        None => {
            let run = fetch_run(&state.pool, id)
                .await
                .map_err(internal_error)?
                .ok_or_else(|| not_found(format!("schedule run {id}")))?;
            if run.published_at.is_some() {
                return Ok(Json(PublishResult { run, already_published: true, notified: 0 }));
            }
            Err(conflict(format!(
                "cannot publish schedule run {id} in status {}",
                run.status.as_str()
            )))
        }
    }
}

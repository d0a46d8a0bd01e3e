use actix_web::{web, HttpResponse, Responder};
use validator::Validate;
use crate::core::{MatchingRun, Matcher};
use crate::models::{
    AssignmentsResponse, ErrorResponse, HealthResponse, ReconcileRequest, RunResponse,
    SavePairingsRequest, SavePairingsResponse,
};
use crate::services::{CacheError, PostgresClient, RunCache, SupabaseClient};
use std::sync::Arc;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub supabase: Arc<SupabaseClient>,
    pub cache: Arc<RunCache>,
    pub postgres: Arc<PostgresClient>,
    pub matcher: Matcher,
}

/// Configure all matching routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/matching/run", web::post().to(run_matching))
        .route("/matching/reconcile", web::post().to(pair_remaining))
        .route("/matching/save", web::post().to(save_pairings))
        .route("/matching/runs/{run_id}", web::get().to(get_run))
        .route("/assignments", web::get().to(list_assignments));
}

fn error_response(status: u16, error: &str, message: String) -> HttpResponse {
    let body = ErrorResponse {
        error: error.to_string(),
        message,
        status_code: status,
    };
    match status {
        400 => HttpResponse::BadRequest().json(body),
        404 => HttpResponse::NotFound().json(body),
        502 => HttpResponse::BadGateway().json(body),
        _ => HttpResponse::InternalServerError().json(body),
    }
}

/// Map a run lookup failure to a response
fn run_lookup_error(run_id: &str, err: CacheError) -> HttpResponse {
    match err {
        CacheError::CacheMiss(_) => {
            error_response(404, "Run not found", format!("No matching run with id {}", run_id))
        }
        e => {
            tracing::error!("Failed to load run {}: {}", run_id, e);
            error_response(500, "Failed to load run", e.to_string())
        }
    }
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let pg_healthy = state.postgres.health_check().await.unwrap_or(false);

    let status = if pg_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        shared_cache: state.cache.is_shared(),
        timestamp: chrono::Utc::now(),
    })
}

/// Run matching endpoint
///
/// POST /api/v1/matching/run
///
/// Fetches the current mentee and mentor snapshot and runs the preference
/// matcher over it. A fetch failure is reported as 502; a run where nobody
/// could be matched is still a 200.
async fn run_matching(state: web::Data<AppState>) -> impl Responder {
    let (mentees, roster) = match state.supabase.fetch_snapshot().await {
        Ok(snapshot) => snapshot,
        Err(e) => {
            tracing::error!("Failed to fetch roster snapshot: {}", e);
            return error_response(502, "Failed to fetch roster", e.to_string());
        }
    };

    tracing::info!(
        "Running matching for {} mentees against {} mentors",
        mentees.len(),
        roster.len()
    );

    let run = MatchingRun::start(mentees, roster, state.matcher.policy());

    match state.cache.put(run).await {
        Ok(run) => {
            tracing::info!(
                "Run {} matched {} of {} mentees",
                run.id,
                run.matched_count(),
                run.assignments.len()
            );
            HttpResponse::Ok().json(RunResponse::from(run.as_ref().clone()))
        }
        Err(e) => {
            tracing::error!("Failed to store matching run: {}", e);
            error_response(500, "Failed to store run", e.to_string())
        }
    }
}

/// Pair remaining endpoint
///
/// POST /api/v1/matching/reconcile
///
/// Request body:
/// ```json
/// { "runId": "string" }
/// ```
async fn pair_remaining(
    state: web::Data<AppState>,
    req: web::Json<ReconcileRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return error_response(400, "Validation failed", errors.to_string());
    }

    let previous = match state.cache.get(&req.run_id).await {
        Ok(run) => run,
        Err(e) => return run_lookup_error(&req.run_id, e),
    };

    let run = previous.reconcile();

    tracing::info!(
        "Run {} reconciled into {}: {} -> {} matched",
        previous.id,
        run.id,
        previous.matched_count(),
        run.matched_count()
    );

    match state.cache.put(run).await {
        Ok(run) => HttpResponse::Ok().json(RunResponse::from(run.as_ref().clone())),
        Err(e) => {
            tracing::error!("Failed to store reconciled run: {}", e);
            error_response(500, "Failed to store run", e.to_string())
        }
    }
}

/// Save pairings endpoint
///
/// POST /api/v1/matching/save
///
/// Request body:
/// ```json
/// { "runId": "string", "assignedBy": "string" }
/// ```
async fn save_pairings(
    state: web::Data<AppState>,
    req: web::Json<SavePairingsRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return error_response(400, "Validation failed", errors.to_string());
    }

    let run = match state.cache.get(&req.run_id).await {
        Ok(run) => run,
        Err(e) => return run_lookup_error(&req.run_id, e),
    };

    let pairings = run.pairings(req.assigned_by.as_deref());

    if pairings.is_empty() {
        tracing::info!("Run {} has no pairings to save", run.id);
        return HttpResponse::Ok().json(SavePairingsResponse {
            run_id: run.id.clone(),
            saved: 0,
        });
    }

    match state.postgres.upsert_pairings(&run.id, &pairings).await {
        Ok(_) => HttpResponse::Ok().json(SavePairingsResponse {
            run_id: run.id.clone(),
            saved: pairings.len(),
        }),
        Err(e) => {
            tracing::error!("Failed to save pairings for run {}: {}", run.id, e);
            error_response(500, "Failed to save pairings", e.to_string())
        }
    }
}

/// Get a cached run
///
/// GET /api/v1/matching/runs/{runId}
async fn get_run(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let run_id = path.into_inner();

    match state.cache.get(&run_id).await {
        Ok(run) => HttpResponse::Ok().json(RunResponse::from(run.as_ref().clone())),
        Err(e) => run_lookup_error(&run_id, e),
    }
}

/// List saved assignments
///
/// GET /api/v1/assignments
///
/// Names come from the current roster; if it cannot be fetched the rows are
/// still listed, by id only.
async fn list_assignments(state: web::Data<AppState>) -> impl Responder {
    let assignments = match state.postgres.list_assignments().await {
        Ok(assignments) => assignments,
        Err(e) => {
            tracing::error!("Failed to list assignments: {}", e);
            return error_response(500, "Failed to list assignments", e.to_string());
        }
    };

    let response = match state.supabase.fetch_snapshot().await {
        Ok((mentees, roster)) => AssignmentsResponse::named(assignments, &mentees, &roster),
        Err(e) => {
            tracing::warn!("Roster unavailable, listing assignments without names: {}", e);
            AssignmentsResponse::from(assignments)
        }
    };

    HttpResponse::Ok().json(response)
}

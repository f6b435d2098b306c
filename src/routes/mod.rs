pub mod audit;
pub mod campaign;
pub mod candidate;
pub mod export;
pub mod health;
pub mod import;
pub mod interview;
pub mod slot;
pub mod user;

use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{auth::require_auth, rate_limit::{rps_middleware, RateLimiter}};
use crate::AppState;

/// Assembles the HTTP surface. Everything under `/api` requires a bearer
/// token and shares one request-per-second budget.
pub fn build_router(state: AppState, rps: u32) -> Router {
    let api = Router::new()
        .route("/api/users", get(user::list_users).post(user::register_user))
        .route(
            "/api/campaigns",
            get(campaign::list_campaigns).post(campaign::create_campaign),
        )
        .route("/api/campaigns/:id", get(campaign::get_campaign))
        .route(
            "/api/campaigns/:id/complete",
            post(campaign::complete_campaign),
        )
        .route("/api/campaigns/:id/stats", get(campaign::campaign_stats))
        .route(
            "/api/campaigns/:id/candidates",
            get(candidate::list_candidates).post(candidate::create_candidate),
        )
        .route(
            "/api/campaigns/:id/candidates/import",
            post(import::import_candidates),
        )
        .route(
            "/api/campaigns/:id/candidates/import-csv",
            post(import::import_candidates_csv),
        )
        .route(
            "/api/campaigns/:id/candidates/export",
            get(export::export_csv),
        )
        .route(
            "/api/campaigns/:id/candidates/export.xlsx",
            get(export::export_xlsx),
        )
        .route(
            "/api/campaigns/:id/slots",
            get(slot::list_slots).post(slot::add_slot),
        )
        .route("/api/slots/:id", delete(slot::remove_slot))
        .route(
            "/api/candidates/:id",
            get(candidate::get_candidate).patch(candidate::update_candidate),
        )
        .route(
            "/api/candidates/:id/status",
            post(candidate::change_candidate_status),
        )
        .route(
            "/api/candidates/:id/no-show",
            post(candidate::resolve_no_show),
        )
        .route(
            "/api/candidates/:id/interviews",
            post(interview::assign_interview),
        )
        .route(
            "/api/candidates/:id/interviews/cancel",
            post(interview::cancel_interview),
        )
        .route("/api/interviews/mine", get(interview::my_interviews))
        .route(
            "/api/interviews/:id/start",
            post(interview::start_interview),
        )
        .route(
            "/api/interviews/:id/complete",
            post(interview::complete_interview),
        )
        .route(
            "/api/interviews/:id/feedback",
            axum::routing::patch(interview::edit_feedback),
        )
        .route(
            "/api/interviews/:id/reassign",
            post(interview::reassign_interview),
        )
        .route("/api/stuck-candidates", get(audit::stuck_candidates))
        .route("/api/audit-logs", get(audit::audit_logs))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .layer(middleware::from_fn_with_state(
            RateLimiter::new(rps),
            rps_middleware,
        ));

    Router::new()
        .route("/health", get(health::health))
        .merge(api)
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

use std::sync::Arc;

use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::handlers;
use crate::services::BookingService;

pub fn booking_routes(service: Arc<BookingService>) -> Router {
    Router::new()
        .route("/services", get(handlers::list_services))
        .route("/availability", get(handlers::get_day_availability))
        .route("/availability/month", get(handlers::get_month_availability))
        .route("/sessions", post(handlers::start_session))
        .route(
            "/sessions/{id}",
            get(handlers::get_session).delete(handlers::end_session),
        )
        .route("/sessions/{id}/form", patch(handlers::update_form))
        .route("/sessions/{id}/next", post(handlers::next_step))
        .route("/sessions/{id}/back", post(handlers::previous_step))
        .route("/sessions/{id}/submit", post(handlers::submit_booking))
        .route("/sessions/{id}/dismiss-error", post(handlers::dismiss_error))
        .route("/sessions/{id}/reset", post(handlers::reset_session))
        .with_state(service)
}

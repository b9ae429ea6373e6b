use std::sync::Arc;

use axum::{
    Router,
    routing::get,
};

use admin_cell::{admin_routes, AdminState};
use booking_wizard_cell::{booking_routes, BookingService};

pub fn create_router(admin: Arc<AdminState>, booking: Arc<BookingService>) -> Router {
    Router::new()
        .route("/", get(|| async { "Clinic Booking API is running!" }))
        .nest("/admin", admin_routes(admin))
        .nest("/booking", booking_routes(booking))
}

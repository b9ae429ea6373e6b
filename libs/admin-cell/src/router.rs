use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Router,
};

use shared_utils::clock::Clock;

use crate::handlers;
use crate::services::CatalogService;

pub struct AdminState {
    pub catalog: CatalogService,
    pub clock: Arc<dyn Clock>,
}

impl AdminState {
    pub fn new(catalog: CatalogService, clock: Arc<dyn Clock>) -> Self {
        Self { catalog, clock }
    }
}

pub fn admin_routes(state: Arc<AdminState>) -> Router {
    Router::new()
        .route("/appointments", get(handlers::list_appointments))
        .route("/promotions", get(handlers::list_promotions).post(handlers::create_promotion))
        .route(
            "/promotions/{id}",
            put(handlers::update_promotion).delete(handlers::delete_promotion),
        )
        .route("/doctors", get(handlers::list_doctors).post(handlers::create_doctor))
        .route("/catalog", get(handlers::catalog_summary))
        .route("/catalog/reload", post(handlers::reload_catalog))
        .with_state(state)
}

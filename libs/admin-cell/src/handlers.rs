use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, error};

use shared_models::error::AppError;
use table_filter_cell::FilterState;

use crate::models::{
    AppointmentSort, CatalogError, DoctorInput, DoctorSort, ListQuery, PromotionInput, PromotionSort,
};
use crate::router::AdminState;

impl From<CatalogError> for AppError {
    fn from(e: CatalogError) -> Self {
        match e {
            CatalogError::Invalid(fields) => AppError::InvalidFields(fields),
            CatalogError::PromotionNotFound(_) => AppError::NotFound(e.to_string()),
            CatalogError::NoSource => AppError::Conflict(e.to_string()),
            other => {
                error!("Catalog failure: {}", other);
                AppError::Internal(other.to_string())
            }
        }
    }
}

fn list_response<T: Serialize>(items: &[&T], total: usize, filters: &FilterState) -> Json<Value> {
    Json(json!({
        "items": items,
        "total": total,
        "filtered": items.len(),
        "filters": filters,
        "is_filtering": filters.is_filtering(),
    }))
}

// ==============================================================================
// LIST HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn list_appointments(
    State(state): State<Arc<AdminState>>,
    Query(query): Query<ListQuery<AppointmentSort>>,
) -> Json<Value> {
    let today = state.clock.today();
    let filter = query.table_filter();
    let records = state.catalog.records().await;

    let rows = filter.apply(&records.appointments, today);
    let rows = query.sort.unwrap_or_default().sort(rows);
    debug!("Appointment list: {} of {} records match", rows.len(), records.appointments.len());

    list_response(&rows, records.appointments.len(), filter.state())
}

#[axum::debug_handler]
pub async fn list_promotions(
    State(state): State<Arc<AdminState>>,
    Query(query): Query<ListQuery<PromotionSort>>,
) -> Json<Value> {
    let today = state.clock.today();
    let filter = query.table_filter();
    let records = state.catalog.records().await;

    let mut rows = filter.apply(&records.promotions, today);
    if let Some(sort) = query.sort {
        rows = sort.sort(rows);
    }
    debug!("Promotion list: {} of {} records match", rows.len(), records.promotions.len());

    list_response(&rows, records.promotions.len(), filter.state())
}

#[axum::debug_handler]
pub async fn list_doctors(
    State(state): State<Arc<AdminState>>,
    Query(query): Query<ListQuery<DoctorSort>>,
) -> Json<Value> {
    let today = state.clock.today();
    let filter = query.table_filter();
    let records = state.catalog.records().await;

    let mut rows = filter.apply(&records.doctors, today);
    if let Some(sort) = query.sort {
        rows = sort.sort(rows);
    }

    list_response(&rows, records.doctors.len(), filter.state())
}

// ==============================================================================
// EDIT HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn create_promotion(
    State(state): State<Arc<AdminState>>,
    Json(input): Json<PromotionInput>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let promotion = state.catalog.create_promotion(input).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "promotion": promotion
        })),
    ))
}

#[axum::debug_handler]
pub async fn update_promotion(
    State(state): State<Arc<AdminState>>,
    Path(id): Path<u32>,
    Json(input): Json<PromotionInput>,
) -> Result<Json<Value>, AppError> {
    let promotion = state.catalog.update_promotion(id, input).await?;

    Ok(Json(json!({
        "success": true,
        "promotion": promotion
    })))
}

#[axum::debug_handler]
pub async fn delete_promotion(
    State(state): State<Arc<AdminState>>,
    Path(id): Path<u32>,
) -> Result<StatusCode, AppError> {
    state.catalog.delete_promotion(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[axum::debug_handler]
pub async fn create_doctor(
    State(state): State<Arc<AdminState>>,
    Json(input): Json<DoctorInput>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let doctor = state.catalog.create_doctor(input).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "doctor": doctor
        })),
    ))
}

// ==============================================================================
// CATALOG MAINTENANCE
// ==============================================================================

#[axum::debug_handler]
pub async fn reload_catalog(
    State(state): State<Arc<AdminState>>,
) -> Result<Json<Value>, AppError> {
    let summary = state.catalog.reload().await?;

    Ok(Json(json!({
        "success": true,
        "catalog": summary
    })))
}

#[axum::debug_handler]
pub async fn catalog_summary(
    State(state): State<Arc<AdminState>>,
) -> Json<Value> {
    Json(json!({
        "catalog": state.catalog.summary().await,
        "reloadable": state.catalog.source().is_some()
    }))
}

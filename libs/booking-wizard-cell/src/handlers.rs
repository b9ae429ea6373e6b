use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use tracing::error;
use uuid::Uuid;

use shared_models::error::AppError;

use crate::error::{BookingError, WizardError};
use crate::models::{AvailabilityQuery, FormPatch, MonthQuery, SERVICE_CATALOG};
use crate::services::BookingService;

impl From<BookingError> for AppError {
    fn from(e: BookingError) -> Self {
        match e {
            BookingError::SessionNotFound(_) => AppError::NotFound(e.to_string()),
            BookingError::Wizard(WizardError::Invalid(_)) => AppError::ValidationError(e.to_string()),
            BookingError::Wizard(_) => AppError::Conflict(e.to_string()),
            BookingError::InvalidDate(_) => AppError::BadRequest(e.to_string()),
            other => {
                error!("Booking service failure: {}", other);
                AppError::Internal(other.to_string())
            }
        }
    }
}

// ==============================================================================
// CATALOG & AVAILABILITY
// ==============================================================================

#[axum::debug_handler]
pub async fn list_services() -> Json<Value> {
    Json(json!({
        "services": SERVICE_CATALOG,
        "total": SERVICE_CATALOG.len()
    }))
}

#[axum::debug_handler]
pub async fn get_day_availability(
    State(service): State<Arc<BookingService>>,
    Query(query): Query<AvailabilityQuery>,
) -> Json<Value> {
    Json(json!(service.day_summary(query.date)))
}

#[axum::debug_handler]
pub async fn get_month_availability(
    State(service): State<Arc<BookingService>>,
    Query(query): Query<MonthQuery>,
) -> Result<Json<Value>, AppError> {
    let days = service.month_overview(query.year, query.month)?;

    Ok(Json(json!({
        "year": query.year,
        "month": query.month,
        "days": days
    })))
}

// ==============================================================================
// SESSION HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn start_session(
    State(service): State<Arc<BookingService>>,
) -> (StatusCode, Json<Value>) {
    let snapshot = service.start_session().await;
    (StatusCode::CREATED, Json(json!(snapshot)))
}

#[axum::debug_handler]
pub async fn get_session(
    State(service): State<Arc<BookingService>>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let snapshot = service.snapshot(session_id).await?;
    Ok(Json(json!(snapshot)))
}

#[axum::debug_handler]
pub async fn update_form(
    State(service): State<Arc<BookingService>>,
    Path(session_id): Path<Uuid>,
    Json(patch): Json<FormPatch>,
) -> Result<Json<Value>, AppError> {
    let snapshot = service.update_form(session_id, patch).await?;
    Ok(Json(json!(snapshot)))
}

#[axum::debug_handler]
pub async fn next_step(
    State(service): State<Arc<BookingService>>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let (advanced, snapshot) = service.next(session_id).await?;

    Ok(Json(json!({
        "advanced": advanced,
        "wizard": snapshot
    })))
}

#[axum::debug_handler]
pub async fn previous_step(
    State(service): State<Arc<BookingService>>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let (moved, snapshot) = service.back(session_id).await?;

    Ok(Json(json!({
        "moved": moved,
        "wizard": snapshot
    })))
}

#[axum::debug_handler]
pub async fn submit_booking(
    State(service): State<Arc<BookingService>>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let snapshot = service.submit(session_id).await?;
    Ok(Json(json!(snapshot)))
}

#[axum::debug_handler]
pub async fn dismiss_error(
    State(service): State<Arc<BookingService>>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let snapshot = service.dismiss_error(session_id).await?;
    Ok(Json(json!(snapshot)))
}

#[axum::debug_handler]
pub async fn reset_session(
    State(service): State<Arc<BookingService>>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let snapshot = service.reset(session_id).await?;
    Ok(Json(json!(snapshot)))
}

#[axum::debug_handler]
pub async fn end_session(
    State(service): State<Arc<BookingService>>,
    Path(session_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    service.end_session(session_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

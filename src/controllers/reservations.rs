use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

use crate::aggregation::group_by_customer;
use crate::controllers::error_response;
use crate::export;
use crate::models::{NewReservation, ReservationRecord};
use crate::selection::MAX_SEAT_COUNT;
use crate::store::DeleteBy;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/reservations",
            get(list_reservations)
                .post(create_reservation)
                .delete(delete_reservation),
        )
        .route("/reservations/grouped", get(grouped_reservations))
        .route("/reservations/export", get(export_reservations))
}

/* ---------- RESERVATIONS ---------- */

// POST /api/reservations
#[derive(Debug, Deserialize, Validate)]
struct CreateReservationRequest {
    #[validate(length(min = 1, max = 20))]
    seats: Vec<NewReservation>,
}

#[derive(Debug, Serialize)]
struct CreateReservationResponse {
    reservations: Vec<ReservationRecord>,
}

async fn create_reservation(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateReservationRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    if let Err(e) = req.validate() {
        return Err((
            StatusCode::BAD_REQUEST,
            format!("a reservation holds between 1 and {MAX_SEAT_COUNT} seats: {e}"),
        ));
    }

    let reservations = state
        .store
        .create_reservation(&req.seats)
        .await
        .map_err(|e| error_response("create_reservation", e))?;

    Ok((StatusCode::CREATED, Json(CreateReservationResponse { reservations })))
}

// DELETE /api/reservations
#[derive(Debug, Deserialize)]
struct DeleteReservationRequest {
    identifiers: Vec<String>,
    #[serde(default)]
    by_reservation_id: bool,
}

#[derive(Debug, Serialize)]
struct DeleteReservationResponse {
    deleted: usize,
    reservations: Vec<ReservationRecord>,
}

async fn delete_reservation(
    State(state): State<Arc<AppState>>,
    Json(req): Json<DeleteReservationRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let reservations = state
        .store
        .delete_reservation(&req.identifiers, DeleteBy::from_flag(req.by_reservation_id))
        .await
        .map_err(|e| error_response("delete_reservation", e))?;

    Ok((
        StatusCode::OK,
        Json(DeleteReservationResponse {
            deleted: reservations.len(),
            reservations,
        }),
    ))
}

// GET /api/reservations
async fn list_reservations(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let reservations = state
        .store
        .list_reservations()
        .await
        .map_err(|e| error_response("list_reservations", e))?;

    Ok((StatusCode::OK, Json(reservations)))
}

// GET /api/reservations/grouped
async fn grouped_reservations(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let records = state
        .store
        .list_reservations()
        .await
        .map_err(|e| error_response("grouped_reservations", e))?;

    Ok((StatusCode::OK, Json(group_by_customer(&records))))
}

// GET /api/reservations/export
async fn export_reservations(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let records = state
        .store
        .list_reservations()
        .await
        .map_err(|e| error_response("export_reservations", e))?;

    let csv = export::to_csv(&group_by_customer(&records), state.config.reservation.contact.kind);
    let disposition = format!("attachment; filename=\"{}\"", export::file_name(Utc::now()));

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, export::CONTENT_TYPE.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        csv,
    ))
}

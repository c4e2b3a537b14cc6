use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use std::sync::Arc;

use crate::controllers::error_response;
use crate::occupancy;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/seats", get(get_seats))
        .route("/seats/summary", get(get_summary))
}

// GET /api/seats
async fn get_seats(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let seats = state
        .store
        .list_seats()
        .await
        .map_err(|e| error_response("list_seats", e))?;

    Ok((StatusCode::OK, Json(seats)))
}

// GET /api/seats/summary
async fn get_summary(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let seats = state
        .store
        .list_seats()
        .await
        .map_err(|e| error_response("seat_summary", e))?;

    Ok((StatusCode::OK, Json(occupancy::summary(&seats))))
}

pub mod reservations;
pub mod seats;

use axum::{http::StatusCode, Router};
use std::sync::Arc;

use crate::error::ReservationError;

pub fn routes() -> Router<Arc<crate::AppState>> {
    Router::new()
        .merge(seats::routes())
        .merge(reservations::routes())
}

/* ---------- helpers ---------- */

fn status_for(err: &ReservationError) -> StatusCode {
    match err {
        ReservationError::InvalidSeatId(_) | ReservationError::Validation(_) => StatusCode::BAD_REQUEST,
        ReservationError::NotFound(_) => StatusCode::NOT_FOUND,
        ReservationError::SeatAlreadyOccupied(_) => StatusCode::CONFLICT,
        // raised only by `Session`, which no route drives
        ReservationError::InvalidTransition { .. } | ReservationError::Database(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// Maps a store error to the `(status, message)` pair handlers return.
/// Storage details are logged, not sent to the client.
pub(crate) fn error_response(op: &str, err: ReservationError) -> (StatusCode, String) {
    let status = status_for(&err);
    if err.is_user_facing() {
        tracing::warn!("{} rejected: {}", op, err);
        (status, err.to_string())
    } else {
        tracing::error!("{} failed: {:?}", op, err);
        (status, "Storage unavailable, please retry".to_string())
    }
}

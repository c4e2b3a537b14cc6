use crate::catalog::SeatId;

/// Every failure a reservation operation can surface.
///
/// All variants except [`ReservationError::Database`] are user-facing: the
/// caller reports them and lets the user correct the input or retry.
#[derive(Debug, thiserror::Error)]
pub enum ReservationError {
    #[error("Invalid seat id: {0}")]
    InvalidSeatId(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Seats already occupied: {}", join_seats(.0))]
    SeatAlreadyOccupied(Vec<SeatId>),

    #[error("No reservation matches: {0}")]
    NotFound(String),

    #[error("Action `{action}` is not available on the {screen} screen")]
    InvalidTransition {
        screen: &'static str,
        action: &'static str,
    },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl ReservationError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn is_user_facing(&self) -> bool {
        !matches!(self, Self::Database(_))
    }
}

fn join_seats(seats: &[SeatId]) -> String {
    seats
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

pub type Result<T, E = ReservationError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn occupied_message_lists_every_seat() {
        let seats = vec!["A01".parse().unwrap(), "B12".parse().unwrap()];
        let err = ReservationError::SeatAlreadyOccupied(seats);
        assert_eq!(err.to_string(), "Seats already occupied: A01, B12");
        assert!(err.is_user_facing());
    }

    #[test]
    fn database_errors_are_not_user_facing() {
        let err = ReservationError::from(sqlx::Error::PoolClosed);
        assert!(!err.is_user_facing());
    }
}

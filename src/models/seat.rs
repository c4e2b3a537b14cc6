use serde::{Deserialize, Serialize};

use crate::catalog::SeatId;
use crate::models::Person;

/// A seat of the hall together with its derived occupancy.
///
/// `person` is present exactly when `is_occupied` is true.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seat {
    pub id: SeatId,
    pub row: char,
    pub number: u8,
    pub is_occupied: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub person: Option<Person>,
}

impl Seat {
    pub fn available(id: SeatId) -> Self {
        Self {
            id,
            row: id.row(),
            number: id.number(),
            is_occupied: false,
            person: None,
        }
    }

    pub fn occupied(id: SeatId, person: Person) -> Self {
        Self {
            is_occupied: true,
            person: Some(person),
            ..Self::available(id)
        }
    }
}

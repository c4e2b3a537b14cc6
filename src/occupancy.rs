//! Derives seat occupancy from reservation records.

use serde::Serialize;

use crate::catalog;
use crate::models::{ReservationRecord, Seat};

/// Joins the static catalog against active records. The result always holds
/// all 90 seats in catalog order.
pub fn join(records: &[ReservationRecord]) -> Vec<Seat> {
    let mut seats = catalog::all_seats();
    for record in records {
        let seat = &mut seats[record.seat_id.index()];
        // records arrive freshest first; keep the first one seen
        if !seat.is_occupied {
            *seat = Seat::occupied(record.seat_id, record.person());
        }
    }
    seats
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OccupancySummary {
    pub total: usize,
    pub occupied: usize,
    pub available: usize,
}

pub fn summary(seats: &[Seat]) -> OccupancySummary {
    let occupied = seats.iter().filter(|s| s.is_occupied).count();
    OccupancySummary {
        total: seats.len(),
        occupied,
        available: seats.len() - occupied,
    }
}

//! Client-local draft of a reservation being assembled.
//!
//! The draft is never written partially: it is either submitted as a whole
//! through [`ReservationStore::create_reservation`] or discarded.

use serde::Serialize;

use crate::catalog::SeatId;
use crate::error::{ReservationError, Result};
use crate::models::{NewReservation, Person, ReservationRecord, Seat};
use crate::store::ReservationStore;

pub const DEFAULT_SEAT_COUNT: u8 = 1;
pub const MAX_SEAT_COUNT: u8 = 20;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DraftSeat {
    pub seat_id: SeatId,
    pub person: Option<Person>,
}

/// Seats picked so far, in click order, and the number the user asked for.
///
/// The draft never holds more than `target` seats.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeatSelection {
    target: u8,
    entries: Vec<DraftSeat>,
}

impl Default for SeatSelection {
    fn default() -> Self {
        Self {
            target: DEFAULT_SEAT_COUNT,
            entries: Vec::new(),
        }
    }
}

impl SeatSelection {
    pub fn with_target(target: u8) -> Result<Self> {
        let mut draft = Self::default();
        draft.set_target(target)?;
        Ok(draft)
    }

    pub fn target(&self) -> u8 {
        self.target
    }

    pub fn set_target(&mut self, target: u8) -> Result<()> {
        if !(1..=MAX_SEAT_COUNT).contains(&target) {
            return Err(ReservationError::validation(format!(
                "seat count must be between 1 and {MAX_SEAT_COUNT}"
            )));
        }
        if self.entries.len() > target as usize {
            return Err(ReservationError::validation(format!(
                "{} seats are already selected",
                self.entries.len()
            )));
        }
        self.target = target;
        Ok(())
    }

    pub fn entries(&self) -> &[DraftSeat] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn remaining(&self) -> usize {
        self.target as usize - self.entries.len()
    }

    pub fn is_selected(&self, seat_id: SeatId) -> bool {
        self.entries.iter().any(|e| e.seat_id == seat_id)
    }

    /// Adds `seat` if it is free in the snapshot and there is room.
    /// Returns whether the seat is part of the draft afterwards; a refused
    /// click is a no-op, not an error.
    pub fn select_seat(&mut self, seat: &Seat) -> bool {
        if seat.is_occupied {
            return false;
        }
        if self.is_selected(seat.id) {
            return true;
        }
        if self.entries.len() >= self.target as usize {
            return false;
        }
        self.entries.push(DraftSeat {
            seat_id: seat.id,
            person: None,
        });
        true
    }

    /// Sets the person for `seat_id`, adding the seat if it is not in the
    /// draft yet.
    pub fn assign_person(&mut self, seat_id: SeatId, person: Person) -> Result<()> {
        if person.name.trim().is_empty() {
            return Err(ReservationError::validation("customer name must not be empty"));
        }

        if let Some(entry) = self.entries.iter_mut().find(|e| e.seat_id == seat_id) {
            entry.person = Some(person);
            return Ok(());
        }
        if self.entries.len() >= self.target as usize {
            return Err(ReservationError::validation(format!(
                "only {} seat(s) can be selected",
                self.target
            )));
        }
        self.entries.push(DraftSeat {
            seat_id,
            person: Some(person),
        });
        Ok(())
    }

    pub fn is_complete(&self) -> bool {
        self.entries.len() == self.target as usize && self.entries.iter().all(|e| e.person.is_some())
    }

    /// Writes the draft through `store`. On success the draft starts over;
    /// on failure it is left untouched so the user can correct and retry.
    pub async fn submit<S>(&mut self, store: &S) -> Result<Vec<ReservationRecord>>
    where
        S: ReservationStore + ?Sized,
    {
        let batch = self.to_batch()?;
        let created = store.create_reservation(&batch).await?;
        self.cancel();
        Ok(created)
    }

    /// Drops every unsaved assignment and resets the seat count.
    pub fn cancel(&mut self) {
        *self = Self::default();
    }

    fn to_batch(&self) -> Result<Vec<NewReservation>> {
        if !self.is_complete() {
            return Err(ReservationError::validation(format!(
                "{} of {} seat(s) still need a person",
                self.target as usize - self.entries.iter().filter(|e| e.person.is_some()).count(),
                self.target
            )));
        }
        Ok(self
            .entries
            .iter()
            .filter_map(|e| {
                e.person.as_ref().map(|p| NewReservation {
                    seat_id: e.seat_id.to_string(),
                    name: p.name.clone(),
                    contact: p.contact.clone(),
                })
            })
            .collect())
    }
}

//! Persistence boundary for reservations.
//!
//! Any backend that satisfies [`ReservationStore`] can sit behind the
//! service: writes are all-or-nothing and a seat is never referenced by two
//! active records.

pub mod memory;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use uuid::Uuid;

use crate::catalog::SeatId;
use crate::error::{ReservationError, Result};
use crate::models::{NewReservation, ReservationRecord, Seat};
use crate::occupancy;

pub use memory::InMemoryStore;
pub use postgres::PgReservationStore;

#[async_trait]
pub trait ReservationStore: Send + Sync {
    /// Fresh snapshot of all 90 seats with occupancy filled in.
    async fn list_seats(&self) -> Result<Vec<Seat>> {
        let records = self.list_reservations().await?;
        Ok(occupancy::join(&records))
    }

    /// Reserves every seat of `entries` or none of them.
    async fn create_reservation(&self, entries: &[NewReservation]) -> Result<Vec<ReservationRecord>>;

    /// Removes the records matched by `identifiers` and returns them.
    async fn delete_reservation(&self, identifiers: &[String], by: DeleteBy) -> Result<Vec<ReservationRecord>>;

    /// Active records, freshest first.
    async fn list_reservations(&self) -> Result<Vec<ReservationRecord>>;
}

#[async_trait]
impl<S: ReservationStore + ?Sized> ReservationStore for Arc<S> {
    async fn list_seats(&self) -> Result<Vec<Seat>> {
        (**self).list_seats().await
    }

    async fn create_reservation(&self, entries: &[NewReservation]) -> Result<Vec<ReservationRecord>> {
        (**self).create_reservation(entries).await
    }

    async fn delete_reservation(&self, identifiers: &[String], by: DeleteBy) -> Result<Vec<ReservationRecord>> {
        (**self).delete_reservation(identifiers, by).await
    }

    async fn list_reservations(&self) -> Result<Vec<ReservationRecord>> {
        (**self).list_reservations().await
    }
}

/// Which key `delete_reservation` matches identifiers against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeleteBy {
    SeatId,
    ReservationId,
}

impl DeleteBy {
    pub fn from_flag(by_reservation_id: bool) -> Self {
        if by_reservation_id {
            DeleteBy::ReservationId
        } else {
            DeleteBy::SeatId
        }
    }

    pub fn parse(self, identifiers: &[String]) -> Result<DeleteTarget> {
        if identifiers.is_empty() {
            return Err(ReservationError::validation("nothing to delete"));
        }
        match self {
            DeleteBy::SeatId => identifiers
                .iter()
                .map(|id| id.trim().parse::<SeatId>())
                .collect::<Result<Vec<_>>>()
                .map(DeleteTarget::Seats),
            DeleteBy::ReservationId => identifiers
                .iter()
                .map(|id| {
                    Uuid::parse_str(id.trim()).map_err(|_| {
                        ReservationError::validation(format!("`{id}` is not a reservation id"))
                    })
                })
                .collect::<Result<Vec<_>>>()
                .map(DeleteTarget::Reservations),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteTarget {
    Seats(Vec<SeatId>),
    Reservations(Vec<Uuid>),
}

impl DeleteTarget {
    pub fn matches(&self, record: &ReservationRecord) -> bool {
        match self {
            DeleteTarget::Seats(seats) => seats.contains(&record.seat_id),
            DeleteTarget::Reservations(ids) => ids.contains(&record.id),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            DeleteTarget::Seats(seats) => seats
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", "),
            DeleteTarget::Reservations(ids) => ids
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

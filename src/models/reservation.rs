use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::catalog::SeatId;
use crate::error::{ReservationError, Result};
use crate::models::{ContactPolicy, Person};

/// One line of a reservation request as the caller sends it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewReservation {
    pub seat_id: String,
    pub name: String,
    #[serde(default)]
    pub contact: Option<String>,
}

impl NewReservation {
    pub fn new(seat_id: impl Into<String>, name: impl Into<String>, contact: Option<&str>) -> Self {
        Self {
            seat_id: seat_id.into(),
            name: name.into(),
            contact: contact.map(str::to_string),
        }
    }
}

/// A validated request line, ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSeat {
    pub seat_id: SeatId,
    pub person: Person,
}

/// Persisted reservation: one record per seat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationRecord {
    pub id: Uuid,
    pub seat_id: SeatId,
    pub customer_name: String,
    pub customer_contact: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ReservationRecord {
    pub fn from_pending(pending: PendingSeat, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            seat_id: pending.seat_id,
            customer_name: pending.person.name,
            customer_contact: pending.person.contact,
            created_at,
        }
    }

    pub fn person(&self) -> Person {
        Person {
            name: self.customer_name.clone(),
            contact: self.customer_contact.clone(),
        }
    }
}

/// Row shape of the `reservations` table.
#[derive(Debug, FromRow)]
pub struct ReservationRow {
    pub id: Uuid,
    pub seat_id: String,
    pub customer_name: String,
    pub customer_contact: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<ReservationRow> for ReservationRecord {
    type Error = ReservationError;

    fn try_from(row: ReservationRow) -> Result<Self> {
        Ok(Self {
            id: row.id,
            seat_id: row.seat_id.parse()?,
            customer_name: row.customer_name,
            customer_contact: row.customer_contact,
            created_at: row.created_at,
        })
    }
}

/// Checks a whole request before anything is written.
///
/// Fails on an empty batch, an unknown seat id, an invalid person, or a seat
/// listed twice.
pub fn validate_batch(entries: &[NewReservation], policy: ContactPolicy) -> Result<Vec<PendingSeat>> {
    if entries.is_empty() {
        return Err(ReservationError::validation("a reservation needs at least one seat"));
    }

    let mut seen = HashSet::with_capacity(entries.len());
    entries
        .iter()
        .map(|entry| {
            let seat_id: SeatId = entry.seat_id.trim().parse()?;
            if !seen.insert(seat_id) {
                return Err(ReservationError::validation(format!(
                    "seat {seat_id} is listed more than once"
                )));
            }
            let person = Person::new(&entry.name, entry.contact.as_deref(), policy)?;
            Ok(PendingSeat { seat_id, person })
        })
        .collect()
}

/// Freshest first; one batch shares a timestamp and keeps catalog order.
pub fn sort_freshest_first(records: &mut [ReservationRecord]) {
    records.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.seat_id.cmp(&b.seat_id)));
}

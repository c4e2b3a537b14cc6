//! Per-customer view of the per-seat reservation records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::SeatId;
use crate::models::ReservationRecord;

/// All seats booked under one (name, contact) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerGroup {
    pub customer_name: String,
    pub customer_contact: Option<String>,
    pub seat_ids: Vec<SeatId>,
    pub created_at: DateTime<Utc>,
}

/// Anything that can be folded into a [`CustomerGroup`].
pub trait Groupable {
    fn key(&self) -> (&str, Option<&str>);
    fn seat_ids(&self) -> &[SeatId];
    fn created_at(&self) -> DateTime<Utc>;
}

impl Groupable for ReservationRecord {
    fn key(&self) -> (&str, Option<&str>) {
        (&self.customer_name, self.customer_contact.as_deref())
    }

    fn seat_ids(&self) -> &[SeatId] {
        std::slice::from_ref(&self.seat_id)
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl Groupable for CustomerGroup {
    fn key(&self) -> (&str, Option<&str>) {
        (&self.customer_name, self.customer_contact.as_deref())
    }

    fn seat_ids(&self) -> &[SeatId] {
        &self.seat_ids
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Groups items by exact (name, contact). Groups come out in order of first
/// appearance, seats in order of first appearance, and each group carries the
/// earliest timestamp of its members. Grouping a grouped list is a no-op.
pub fn group_by_customer<T: Groupable>(items: &[T]) -> Vec<CustomerGroup> {
    let mut groups: Vec<CustomerGroup> = Vec::new();

    for item in items {
        let (name, contact) = item.key();
        let existing = groups
            .iter_mut()
            .find(|g| g.customer_name == name && g.customer_contact.as_deref() == contact);

        match existing {
            Some(group) => {
                for seat in item.seat_ids() {
                    if !group.seat_ids.contains(seat) {
                        group.seat_ids.push(*seat);
                    }
                }
                group.created_at = group.created_at.min(item.created_at());
            }
            None => {
                let mut seat_ids = Vec::with_capacity(item.seat_ids().len());
                for seat in item.seat_ids() {
                    if !seat_ids.contains(seat) {
                        seat_ids.push(*seat);
                    }
                }
                groups.push(CustomerGroup {
                    customer_name: name.to_string(),
                    customer_contact: contact.map(str::to_string),
                    seat_ids,
                    created_at: item.created_at(),
                });
            }
        }
    }

    groups
}

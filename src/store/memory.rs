use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::catalog::SeatId;
use crate::error::{ReservationError, Result};
use crate::models::reservation::{sort_freshest_first, validate_batch};
use crate::models::{ContactPolicy, NewReservation, ReservationRecord};
use crate::store::{DeleteBy, ReservationStore};

/// Process-local store. The write lock is held across check and insert, so
/// overlapping submissions are serialized.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    records: RwLock<Vec<ReservationRecord>>,
    policy: ContactPolicy,
}

impl InMemoryStore {
    pub fn new(policy: ContactPolicy) -> Self {
        Self {
            records: RwLock::new(Vec::new()),
            policy,
        }
    }
}

#[async_trait]
impl ReservationStore for InMemoryStore {
    async fn create_reservation(&self, entries: &[NewReservation]) -> Result<Vec<ReservationRecord>> {
        let pending = validate_batch(entries, self.policy)?;

        let mut records = self.records.write().await;
        let taken: Vec<SeatId> = pending
            .iter()
            .map(|p| p.seat_id)
            .filter(|seat| records.iter().any(|r| r.seat_id == *seat))
            .collect();
        if !taken.is_empty() {
            warn!("Rejected reservation, {} seat(s) already occupied", taken.len());
            return Err(ReservationError::SeatAlreadyOccupied(taken));
        }

        let now = Utc::now();
        let created: Vec<ReservationRecord> = pending
            .into_iter()
            .map(|p| ReservationRecord::from_pending(p, now))
            .collect();
        records.extend(created.iter().cloned());

        info!("Reserved {} seat(s)", created.len());
        Ok(created)
    }

    async fn delete_reservation(&self, identifiers: &[String], by: DeleteBy) -> Result<Vec<ReservationRecord>> {
        let target = by.parse(identifiers)?;

        let mut records = self.records.write().await;
        let mut removed = Vec::new();
        records.retain(|record| {
            if target.matches(record) {
                removed.push(record.clone());
                false
            } else {
                true
            }
        });

        if removed.is_empty() {
            return Err(ReservationError::NotFound(target.describe()));
        }
        info!("Deleted {} reservation record(s)", removed.len());
        Ok(removed)
    }

    async fn list_reservations(&self) -> Result<Vec<ReservationRecord>> {
        let mut records = self.records.read().await.clone();
        sort_freshest_first(&mut records);
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn failed_batch_leaves_no_trace() {
        let store = InMemoryStore::default();
        store
            .create_reservation(&[NewReservation::new("A02", "Ana", None)])
            .await
            .unwrap();

        let err = store
            .create_reservation(&[
                NewReservation::new("A01", "Luis", None),
                NewReservation::new("A02", "Luis", None),
            ])
            .await
            .unwrap_err();
        assert!(matches!(err, ReservationError::SeatAlreadyOccupied(ref s) if s.len() == 1));

        let seats = store.list_seats().await.unwrap();
        assert!(!seats[0].is_occupied, "A01 must not be half-booked");
        assert_eq!(seats[1].person.as_ref().unwrap().name, "Ana");
    }

    #[tokio::test]
    async fn partial_match_deletes_what_exists() {
        let store = InMemoryStore::default();
        store
            .create_reservation(&[NewReservation::new("C03", "Ana", None)])
            .await
            .unwrap();

        let removed = store
            .delete_reservation(&["C03".into(), "C04".into()], DeleteBy::SeatId)
            .await
            .unwrap();
        assert_eq!(removed.len(), 1);
        assert!(store.list_reservations().await.unwrap().is_empty());
    }
}

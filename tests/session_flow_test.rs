//! Operator session flows: count → seats → persons → receipt, delete, list.
//!
//! Run with: `cargo test --test session_flow_test`

#![allow(clippy::unwrap_used)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use cinema_reservations::catalog::SeatId;
use cinema_reservations::models::{ContactPolicy, NewReservation, ReservationRecord};
use cinema_reservations::session::{Screen, Session};
use cinema_reservations::store::{DeleteBy, InMemoryStore, ReservationStore};
use cinema_reservations::ReservationError;

fn seat(id: &str) -> SeatId {
    id.parse().unwrap()
}

fn new_session() -> (Arc<InMemoryStore>, Session) {
    let store = Arc::new(InMemoryStore::new(ContactPolicy::default()));
    let session = Session::new(store.clone(), ContactPolicy::default());
    (store, session)
}

/// Store whose reads start failing once a reservation has been written.
#[derive(Default)]
struct ReadsFailAfterCreate {
    inner: InMemoryStore,
    broken: AtomicBool,
}

#[async_trait]
impl ReservationStore for ReadsFailAfterCreate {
    async fn create_reservation(
        &self,
        entries: &[NewReservation],
    ) -> cinema_reservations::Result<Vec<ReservationRecord>> {
        let created = self.inner.create_reservation(entries).await?;
        self.broken.store(true, Ordering::SeqCst);
        Ok(created)
    }

    async fn delete_reservation(
        &self,
        identifiers: &[String],
        by: DeleteBy,
    ) -> cinema_reservations::Result<Vec<ReservationRecord>> {
        self.inner.delete_reservation(identifiers, by).await
    }

    async fn list_reservations(&self) -> cinema_reservations::Result<Vec<ReservationRecord>> {
        if self.broken.load(Ordering::SeqCst) {
            return Err(sqlx::Error::PoolTimedOut.into());
        }
        self.inner.list_reservations().await
    }
}

#[tokio::test]
async fn three_seat_reservation_reaches_receipt() {
    let (store, mut session) = new_session();

    session.start_reservation().unwrap();
    assert_eq!(session.screen(), Screen::Selecting);
    session.choose_seat_count(3).await.unwrap();
    assert_eq!(session.screen(), Screen::Reserving);

    for (id, name) in [("A01", "Ana"), ("A02", "Luis"), ("A03", "Eva")] {
        assert!(session.click_seat(seat(id)).unwrap());
        session.assign_person(seat(id), name, Some("555")).unwrap();
    }
    assert!(session.draft().is_complete());

    let receipt = session.submit().await.unwrap();
    assert_eq!(receipt.len(), 3);
    assert_eq!(session.screen(), Screen::Receipt);
    assert!(session.draft().is_empty());

    let seats = store.list_seats().await.unwrap();
    assert!(seats[..3].iter().all(|s| s.is_occupied));
    assert_eq!(seats.iter().filter(|s| s.is_occupied).count(), 3);
    assert!(session.seats()[..3].iter().all(|s| s.is_occupied));

    session.back_to_menu();
    assert_eq!(session.screen(), Screen::Menu);
    assert!(session.receipt().is_empty());
}

#[tokio::test]
async fn incomplete_draft_is_not_submitted() {
    let (store, mut session) = new_session();

    session.start_reservation().unwrap();
    session.choose_seat_count(2).await.unwrap();
    session.assign_person(seat("B05"), "Ana", None).unwrap();
    assert!(!session.draft().is_complete());

    let err = session.submit().await.unwrap_err();
    assert!(matches!(err, ReservationError::Validation(_)));
    assert_eq!(session.screen(), Screen::Reserving);
    assert_eq!(session.draft().len(), 1);
    assert!(store.list_reservations().await.unwrap().is_empty());
}

#[tokio::test]
async fn conflict_keeps_draft_and_refreshes_grid() {
    let (store, mut session) = new_session();

    session.start_reservation().unwrap();
    session.choose_seat_count(1).await.unwrap();
    session.assign_person(seat("C07"), "Ana", None).unwrap();

    // someone else books C07 while the operator is typing
    store
        .create_reservation(&[NewReservation::new("C07", "Luis", None)])
        .await
        .unwrap();

    let err = session.submit().await.unwrap_err();
    assert!(matches!(err, ReservationError::SeatAlreadyOccupied(_)));
    assert_eq!(session.draft().len(), 1);
    assert!(session.seats()[seat("C07").index()].is_occupied);
}

#[tokio::test]
async fn occupied_seats_cannot_be_clicked() {
    let (store, mut session) = new_session();
    store
        .create_reservation(&[NewReservation::new("A01", "Ana", None)])
        .await
        .unwrap();

    session.start_reservation().unwrap();
    session.choose_seat_count(2).await.unwrap();
    assert!(!session.click_seat(seat("A01")).unwrap());
    assert!(session.assign_person(seat("A01"), "Luis", None).is_err());
    assert!(session.draft().is_empty());
}

#[tokio::test]
async fn cancel_returns_to_count_with_fresh_draft() {
    let (_store, mut session) = new_session();

    session.start_reservation().unwrap();
    session.choose_seat_count(4).await.unwrap();
    session.assign_person(seat("D01"), "Ana", None).unwrap();
    session.cancel().unwrap();

    assert_eq!(session.screen(), Screen::Selecting);
    assert!(session.draft().is_empty());
    assert_eq!(session.draft().target(), 1);
}

#[tokio::test]
async fn delete_and_list_screens() {
    let (store, mut session) = new_session();
    store
        .create_reservation(&[
            NewReservation::new("E01", "Ana", Some("555")),
            NewReservation::new("E02", "Ana", Some("555")),
            NewReservation::new("E03", "Luis", None),
        ])
        .await
        .unwrap();

    let groups = session.open_listing().await.unwrap();
    assert_eq!(session.screen(), Screen::Listing);
    assert_eq!(groups.len(), 2);
    session.back_to_menu();

    session.start_deleting().await.unwrap();
    let removed = session.delete_seat(seat("E03")).await.unwrap();
    assert_eq!(removed[0].customer_name, "Luis");
    assert!(!session.seats()[seat("E03").index()].is_occupied);

    let err = session.delete_seat(seat("E03")).await.unwrap_err();
    assert!(matches!(err, ReservationError::NotFound(_)));
}

#[tokio::test]
async fn actions_from_the_wrong_screen_are_refused() {
    let (_store, mut session) = new_session();

    assert!(matches!(
        session.click_seat(seat("A01")),
        Err(ReservationError::InvalidTransition { action: "select seat", .. })
    ));
    assert!(session.choose_seat_count(2).await.is_err());
    assert!(session.delete_seat(seat("A01")).await.is_err());

    session.start_reservation().unwrap();
    assert!(session.start_reservation().is_err());
    assert!(session.choose_seat_count(21).await.is_err());
    assert_eq!(session.screen(), Screen::Selecting);
}

#[tokio::test]
async fn stored_reservation_reaches_receipt_when_refresh_fails() {
    let store = Arc::new(ReadsFailAfterCreate::default());
    let mut session = Session::new(store.clone(), ContactPolicy::default());

    session.start_reservation().unwrap();
    session.choose_seat_count(1).await.unwrap();
    session.assign_person(seat("B03"), "Ana", None).unwrap();

    let receipt = session.submit().await.unwrap();
    assert_eq!(receipt.len(), 1);
    assert_eq!(receipt[0].seat_id, seat("B03"));
    assert_eq!(session.screen(), Screen::Receipt);
    assert!(session.draft().is_empty());
    // the snapshot from before the submit is kept
    assert!(!session.seats()[seat("B03").index()].is_occupied);

    store.broken.store(false, Ordering::SeqCst);
    assert_eq!(store.list_reservations().await.unwrap().len(), 1);
}

#[tokio::test]
async fn changing_seat_count_keeps_selected_seats() {
    let (_store, mut session) = new_session();

    session.start_reservation().unwrap();
    session.choose_seat_count(2).await.unwrap();
    assert!(session.click_seat(seat("C01")).unwrap());
    assert!(session.click_seat(seat("C02")).unwrap());

    session.change_seat_count().unwrap();
    assert_eq!(session.screen(), Screen::Selecting);

    let err = session.choose_seat_count(1).await.unwrap_err();
    assert!(matches!(err, ReservationError::Validation(_)));
    assert_eq!(session.screen(), Screen::Selecting);
    assert_eq!(session.draft().len(), 2);
    assert_eq!(session.draft().target(), 2);

    session.choose_seat_count(3).await.unwrap();
    assert_eq!(session.screen(), Screen::Reserving);
    assert_eq!(session.draft().target(), 3);
    let picked: Vec<SeatId> = session.draft().entries().iter().map(|e| e.seat_id).collect();
    assert_eq!(picked, vec![seat("C01"), seat("C02")]);
    assert_eq!(session.draft().remaining(), 1);
}

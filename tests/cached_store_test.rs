//! Redis seat snapshot cache. Needs a disposable Redis:
//!
//! `REDIS_URL=redis://127.0.0.1/ cargo test --test cached_store_test -- --ignored --test-threads=1`

#![allow(clippy::unwrap_used)]

use cinema_reservations::cache::CachedStore;
use cinema_reservations::models::{ContactPolicy, NewReservation};
use cinema_reservations::store::{DeleteBy, InMemoryStore, ReservationStore};

async fn cached() -> CachedStore<InMemoryStore> {
    let url = std::env::var("REDIS_URL").unwrap();
    let store = CachedStore::connect(InMemoryStore::new(ContactPolicy::default()), &url, 60)
        .await
        .unwrap();
    store.invalidate_seats().await;
    store
}

#[tokio::test]
#[ignore = "requires REDIS_URL"]
async fn writes_through_the_cache_invalidate_the_snapshot() {
    let store = cached().await;
    assert!(store.list_seats().await.unwrap().iter().all(|s| !s.is_occupied));

    store
        .create_reservation(&[NewReservation::new("A01", "Ana", None)])
        .await
        .unwrap();
    assert!(store.list_seats().await.unwrap()[0].is_occupied);

    store
        .delete_reservation(&["A01".to_string()], DeleteBy::SeatId)
        .await
        .unwrap();
    assert!(!store.list_seats().await.unwrap()[0].is_occupied);
}

#[tokio::test]
#[ignore = "requires REDIS_URL"]
async fn conflicts_are_checked_against_the_store_not_the_snapshot() {
    let store = cached().await;
    // warm the snapshot, then book behind the cache's back
    store.list_seats().await.unwrap();
    store
        .inner()
        .create_reservation(&[NewReservation::new("B02", "Luis", None)])
        .await
        .unwrap();
    assert!(!store.list_seats().await.unwrap()[19].is_occupied, "snapshot is stale");

    let err = store
        .create_reservation(&[NewReservation::new("B02", "Ana", None)])
        .await
        .unwrap_err();
    assert!(err.to_string().contains("B02"));
    assert!(store.list_seats().await.unwrap()[19].is_occupied, "conflict dropped the snapshot");
}

#[tokio::test]
#[ignore = "requires REDIS_URL"]
async fn snapshot_read_before_a_write_is_not_cached() {
    let store = cached().await;

    // a reader misses the cache and reads the store while A01 is free
    let generation = store.seat_generation().await.unwrap();
    let seats = store.inner().list_seats().await.unwrap();
    assert!(!seats[0].is_occupied);

    // a writer books A01 before the reader stores its snapshot
    store
        .create_reservation(&[NewReservation::new("A01", "Ana", None)])
        .await
        .unwrap();

    assert!(!store.save_seats_if_current(&seats, generation).await.unwrap());
    assert!(store.list_seats().await.unwrap()[0].is_occupied);

    // with no write in between the snapshot is stored
    let generation = store.seat_generation().await.unwrap();
    let seats = store.inner().list_seats().await.unwrap();
    assert!(store.save_seats_if_current(&seats, generation).await.unwrap());
}

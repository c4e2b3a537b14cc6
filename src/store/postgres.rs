use async_trait::async_trait;
use chrono::{SubsecRound, Utc};
use sqlx::{postgres::PgPoolOptions, PgPool, Postgres, Transaction};
use std::time::Duration;
use tracing::{error, info, warn};

use crate::catalog::SeatId;
use crate::error::{ReservationError, Result};
use crate::models::reservation::{validate_batch, ReservationRow};
use crate::models::{ContactPolicy, NewReservation, ReservationRecord};
use crate::store::{DeleteBy, DeleteTarget, ReservationStore};

const RETURNING: &str = "RETURNING id, seat_id, customer_name, customer_contact, created_at";

/// Postgres-backed store. Each write is one transaction; the unique index on
/// `seat_id` rejects a seat that another transaction booked first.
#[derive(Clone)]
pub struct PgReservationStore {
    pool: PgPool,
    policy: ContactPolicy,
}

impl PgReservationStore {
    pub fn new(pool: PgPool, policy: ContactPolicy) -> Self {
        Self { pool, policy }
    }

    pub async fn connect(database_url: &str, pool_size: u32, policy: ContactPolicy) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(pool_size)
            .acquire_timeout(Duration::from_secs(5))
            .connect(database_url)
            .await?;
        info!("Database connected");

        Ok(Self::new(pool, policy))
    }

    /// Applies `src/migrations` (the `reservations` table and its unique
    /// seat index).
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        info!("Running database migrations...");
        sqlx::migrate!("./src/migrations").run(&self.pool).await?;
        info!("Migrations completed");
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Seats of `seat_ids` that are booked as of now, in seat order.
    async fn occupied_among(&self, seat_ids: &[String]) -> Result<Vec<SeatId>> {
        let taken: Vec<String> = sqlx::query_scalar(
            "SELECT seat_id FROM reservations WHERE seat_id = ANY($1) ORDER BY seat_id",
        )
        .bind(seat_ids)
        .fetch_all(&self.pool)
        .await?;
        parse_seats(&taken)
    }
}

async fn rollback(tx: Transaction<'_, Postgres>) {
    if let Err(e) = tx.rollback().await {
        warn!("Failed to roll back reservation transaction: {:?}", e);
    }
}

fn parse_seats(seats: &[String]) -> Result<Vec<SeatId>> {
    seats.iter().map(|s| s.parse()).collect()
}

fn into_records(rows: Vec<ReservationRow>) -> Result<Vec<ReservationRecord>> {
    rows.into_iter().map(ReservationRecord::try_from).collect()
}

// unique violation on insert means the seat was booked concurrently
fn conflict_or_db(err: sqlx::Error, seat: SeatId) -> ReservationError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            ReservationError::SeatAlreadyOccupied(vec![seat])
        }
        _ => ReservationError::Database(err),
    }
}

#[async_trait]
impl ReservationStore for PgReservationStore {
    async fn create_reservation(&self, entries: &[NewReservation]) -> Result<Vec<ReservationRecord>> {
        let pending = validate_batch(entries, self.policy)?;
        let seat_ids: Vec<String> = pending.iter().map(|p| p.seat_id.to_string()).collect();

        let mut tx = self.pool.begin().await?;

        let taken: Vec<String> = sqlx::query_scalar(
            "SELECT seat_id FROM reservations WHERE seat_id = ANY($1) ORDER BY seat_id FOR UPDATE",
        )
        .bind(&seat_ids)
        .fetch_all(&mut *tx)
        .await?;

        if !taken.is_empty() {
            rollback(tx).await;
            warn!("Rejected reservation, seats already occupied: {}", taken.join(", "));
            return Err(ReservationError::SeatAlreadyOccupied(parse_seats(&taken)?));
        }

        // timestamptz keeps microseconds
        let now = Utc::now().trunc_subsecs(6);
        let mut created = Vec::with_capacity(pending.len());
        for p in pending {
            let record = ReservationRecord::from_pending(p, now);
            let inserted = sqlx::query(
                "INSERT INTO reservations (id, seat_id, customer_name, customer_contact, created_at)
                 VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(record.id)
            .bind(record.seat_id.to_string())
            .bind(&record.customer_name)
            .bind(&record.customer_contact)
            .bind(record.created_at)
            .execute(&mut *tx)
            .await;

            if let Err(e) = inserted {
                rollback(tx).await;
                return Err(match conflict_or_db(e, record.seat_id) {
                    // the other transaction has committed; report all it took from this batch
                    ReservationError::SeatAlreadyOccupied(first) => {
                        let taken = self.occupied_among(&seat_ids).await?;
                        warn!("Seat {} was booked concurrently", record.seat_id);
                        ReservationError::SeatAlreadyOccupied(if taken.is_empty() { first } else { taken })
                    }
                    err => {
                        error!("create_reservation insert failed: {:?}", err);
                        err
                    }
                });
            }
            created.push(record);
        }

        tx.commit().await.map_err(|e| {
            error!("Failed to commit reservation: {:?}", e);
            ReservationError::Database(e)
        })?;

        info!("Reserved {} seat(s)", created.len());
        Ok(created)
    }

    async fn delete_reservation(&self, identifiers: &[String], by: DeleteBy) -> Result<Vec<ReservationRecord>> {
        let target = by.parse(identifiers)?;

        // a single DELETE is atomic on its own
        let rows: Vec<ReservationRow> = match &target {
            DeleteTarget::Seats(seats) => {
                let seats: Vec<String> = seats.iter().map(ToString::to_string).collect();
                sqlx::query_as(&format!("DELETE FROM reservations WHERE seat_id = ANY($1) {RETURNING}"))
                    .bind(seats)
                    .fetch_all(&self.pool)
                    .await?
            }
            DeleteTarget::Reservations(ids) => {
                sqlx::query_as(&format!("DELETE FROM reservations WHERE id = ANY($1) {RETURNING}"))
                    .bind(ids)
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        if rows.is_empty() {
            return Err(ReservationError::NotFound(target.describe()));
        }
        info!("Deleted {} reservation record(s)", rows.len());
        into_records(rows)
    }

    async fn list_reservations(&self) -> Result<Vec<ReservationRecord>> {
        let rows: Vec<ReservationRow> = sqlx::query_as(
            "SELECT id, seat_id, customer_name, customer_contact, created_at
             FROM reservations
             ORDER BY created_at DESC, seat_id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("list_reservations sql error: {:?}", e);
            e
        })?;

        into_records(rows)
    }
}

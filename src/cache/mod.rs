//! Redis snapshot cache in front of any [`ReservationStore`].
//!
//! Only `list_seats` is served from the cache. Writes always go to the
//! inner store, which checks occupancy against its own fresh state, and
//! every write that may have changed occupancy drops the snapshot.
//!
//! Invalidation also bumps a generation counter. A reader only stores the
//! snapshot it built if the generation is still the one it saw before
//! reading the inner store, so a write that lands mid-read is never hidden
//! behind a stale snapshot.

use async_trait::async_trait;
use redis::{aio::MultiplexedConnection, AsyncCommands, Client};
use tracing::{debug, info, warn};

use crate::error::{ReservationError, Result};
use crate::models::{NewReservation, ReservationRecord, Seat};
use crate::store::{DeleteBy, ReservationStore};

pub const SEATS_KEY: &str = "cinema:seats";
pub const GENERATION_KEY: &str = "cinema:seats:generation";

// KEYS[1] snapshot, KEYS[2] generation; ARGV[1] data, ARGV[2] generation seen, ARGV[3] ttl
const SAVE_IF_CURRENT: &str = r#"
    local current = redis.call('GET', KEYS[2]) or '0'
    if current ~= ARGV[2] then
        return 0
    end
    redis.call('SET', KEYS[1], ARGV[1], 'EX', ARGV[3])
    return 1
"#;

pub struct CachedStore<S> {
    inner: S,
    conn: MultiplexedConnection,
    ttl_seconds: u64,
}

impl<S: ReservationStore> CachedStore<S> {
    pub fn new(inner: S, conn: MultiplexedConnection, ttl_seconds: u64) -> Self {
        Self {
            inner,
            conn,
            ttl_seconds,
        }
    }

    pub async fn connect(inner: S, redis_url: &str, ttl_seconds: u64) -> redis::RedisResult<Self> {
        let client = Client::open(redis_url)?;
        let conn = client.get_multiplexed_async_connection().await?;
        info!("Redis connected, seat snapshots cached for {}s", ttl_seconds);
        Ok(Self::new(inner, conn, ttl_seconds))
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub async fn invalidate_seats(&self) {
        let mut conn = self.conn.clone();
        let result: redis::RedisResult<(u64,)> = redis::pipe()
            .atomic()
            .incr(GENERATION_KEY, 1)
            .del(SEATS_KEY)
            .ignore()
            .query_async(&mut conn)
            .await;
        match result {
            Ok((generation,)) => info!("Invalidated seat snapshot cache (generation {})", generation),
            Err(e) => warn!("Failed to invalidate seat snapshot cache: {:?}", e),
        }
    }

    /// Current invalidation generation; 0 before the first write.
    pub async fn seat_generation(&self) -> Result<u64, redis::RedisError> {
        let mut conn = self.conn.clone();
        let generation: Option<u64> = conn.get(GENERATION_KEY).await?;
        Ok(generation.unwrap_or(0))
    }

    /// Stores `seats` unless a write invalidated the cache after
    /// `generation` was read. Returns whether the snapshot was stored.
    pub async fn save_seats_if_current(&self, seats: &[Seat], generation: u64) -> Result<bool, redis::RedisError> {
        let data = serde_json::to_string(seats).map_err(|_| {
            redis::RedisError::from((redis::ErrorKind::TypeError, "Serialize error"))
        })?;
        let mut conn = self.conn.clone();
        let stored: u8 = redis::Script::new(SAVE_IF_CURRENT)
            .key(SEATS_KEY)
            .key(GENERATION_KEY)
            .arg(data)
            .arg(generation)
            .arg(self.ttl_seconds)
            .invoke_async(&mut conn)
            .await?;
        Ok(stored == 1)
    }

    async fn get_seats_from_cache(&self) -> Result<Option<Vec<Seat>>, redis::RedisError> {
        let mut conn = self.conn.clone();
        let data: Option<String> = conn.get(SEATS_KEY).await?;
        match data {
            Some(data) => serde_json::from_str(&data).map(Some).map_err(|_| {
                redis::RedisError::from((redis::ErrorKind::TypeError, "Parse error"))
            }),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl<S: ReservationStore> ReservationStore for CachedStore<S> {
    async fn list_seats(&self) -> Result<Vec<Seat>> {
        match self.get_seats_from_cache().await {
            Ok(Some(seats)) => {
                debug!("Seat snapshot served from cache");
                return Ok(seats);
            }
            Ok(None) => {}
            Err(e) => {
                warn!("Seat cache unavailable, reading store: {:?}", e);
                return self.inner.list_seats().await;
            }
        }

        // read before the store so a concurrent write is detected
        let generation = match self.seat_generation().await {
            Ok(generation) => generation,
            Err(e) => {
                warn!("Seat cache generation unavailable: {:?}", e);
                return self.inner.list_seats().await;
            }
        };
        let seats = self.inner.list_seats().await?;
        match self.save_seats_if_current(&seats, generation).await {
            Ok(true) => {}
            Ok(false) => debug!("Seat snapshot outdated by a concurrent write, not cached"),
            Err(e) => warn!("Failed to cache seat snapshot: {:?}", e),
        }
        Ok(seats)
    }

    async fn create_reservation(&self, entries: &[NewReservation]) -> Result<Vec<ReservationRecord>> {
        let result = self.inner.create_reservation(entries).await;
        // a conflict means the cached snapshot was stale too
        if matches!(result, Ok(_) | Err(ReservationError::SeatAlreadyOccupied(_))) {
            self.invalidate_seats().await;
        }
        result
    }

    async fn delete_reservation(&self, identifiers: &[String], by: DeleteBy) -> Result<Vec<ReservationRecord>> {
        let removed = self.inner.delete_reservation(identifiers, by).await?;
        self.invalidate_seats().await;
        Ok(removed)
    }

    async fn list_reservations(&self) -> Result<Vec<ReservationRecord>> {
        self.inner.list_reservations().await
    }
}

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{EventId, ReservationId, SeatId};
use domain::{NewReservation, ReservationRecord, ReservationStatus};
use sqlx::{PgPool, Row, postgres::PgRow};

use crate::{Result, store::ReservationStore};

/// PostgreSQL-backed reservation store.
///
/// Identifiers come from the `BIGSERIAL` primary key, which keeps them
/// unique across concurrent writers and processes.
#[derive(Clone)]
pub struct PostgresReservationStore {
    pool: PgPool,
}

impl PostgresReservationStore {
    /// Creates a new PostgreSQL reservation store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects to the database at `url`. The database is expected to be
    /// reachable; readiness is the deployment's concern.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = PgPool::connect(url).await?;
        Ok(Self::new(pool))
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }

    fn row_to_record(row: PgRow) -> Result<ReservationRecord> {
        let status: String = row.try_get("status")?;

        Ok(ReservationRecord {
            id: ReservationId::new(row.try_get("id")?),
            event_id: EventId::new(row.try_get::<String, _>("event_id")?),
            seat_id: SeatId::new(row.try_get::<String, _>("seat_id")?),
            user_email: row.try_get("user_email")?,
            status: status.parse::<ReservationStatus>()?,
            created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
        })
    }
}

#[async_trait]
impl ReservationStore for PostgresReservationStore {
    #[tracing::instrument(skip(self, reservation), fields(event_id = %reservation.event_id, seat_id = %reservation.seat_id))]
    async fn insert(&self, reservation: NewReservation) -> Result<ReservationRecord> {
        let row = sqlx::query(
            r#"
            INSERT INTO reservations (event_id, seat_id, user_email, status, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, event_id, seat_id, user_email, status, created_at
            "#,
        )
        .bind(reservation.event_id.as_str())
        .bind(reservation.seat_id.as_str())
        .bind(&reservation.user_email)
        .bind(reservation.status.as_str())
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        let record = Self::row_to_record(row)?;
        metrics::counter!("reservations_persisted_total").increment(1);
        tracing::debug!(reservation_id = %record.id, "reservation stored");
        Ok(record)
    }

    async fn get(&self, id: ReservationId) -> Result<Option<ReservationRecord>> {
        let row = sqlx::query(
            r#"
            SELECT id, event_id, seat_id, user_email, status, created_at
            FROM reservations
            WHERE id = $1
            "#,
        )
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_record).transpose()
    }

    async fn find_by_seat(
        &self,
        event_id: &EventId,
        seat_id: &SeatId,
    ) -> Result<Vec<ReservationRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT id, event_id, seat_id, user_email, status, created_at
            FROM reservations
            WHERE event_id = $1 AND seat_id = $2
            ORDER BY id ASC
            "#,
        )
        .bind(event_id.as_str())
        .bind(seat_id.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_record).collect()
    }

    async fn count(&self) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reservations")
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }
}

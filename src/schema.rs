//! Database schema management for `sensormap`.
//!
//! Ensures the readings table and its index exist before serving requests.
//! Applied once on startup from `main.rs` (EMBP: single gateway call).

use anyhow::Result;
use sqlx::PgPool;

// ---

/// Create the schema if it does not exist (idempotent).
///
/// One append-only row per reading: position, climate, the two gas channel
/// aggregates and the six MQ-135 sub-channels. Every measurement column is
/// nullable; a missing value is NULL rather than 0. Existing tables are
/// never altered.
///
/// Errors are propagated if any SQL execution fails.
pub async fn create_schema(pool: &PgPool) -> Result<()> {
    // ---
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS sensor_data (
            id              BIGSERIAL PRIMARY KEY,
            created_at      TIMESTAMPTZ NOT NULL DEFAULT now(),
            latitude        DOUBLE PRECISION,
            longitude       DOUBLE PRECISION,
            temp            DOUBLE PRECISION,
            humidity        DOUBLE PRECISION,
            mq9_val         DOUBLE PRECISION,
            mq135_val       DOUBLE PRECISION,
            mq135_co        DOUBLE PRECISION,
            mq135_alcohol   DOUBLE PRECISION,
            mq135_co2       DOUBLE PRECISION,
            mq135_toluene   DOUBLE PRECISION,
            mq135_nh4       DOUBLE PRECISION,
            mq135_acetone   DOUBLE PRECISION
        );
        "#,
    )
    .execute(&mut *tx)
    .await?;

    // Latest-N queries order by insertion time
    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_sensor_data_created_at
            ON sensor_data (created_at DESC);
        "#,
    )
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(())
}

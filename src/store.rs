//! Access to the `sensor_data` table.
//!
//! Functions take an explicit connection or pool; nothing here holds
//! process-wide state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};

use crate::models::RawRecord;

// ---

/// Body of a create request from a sensor node.
///
/// Every field is optional and a missing one is stored as NULL, not 0.
/// Field names follow the firmware payload; the long names are accepted
/// as aliases.
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
pub struct NewReading {
    // ---
    #[serde(alias = "latitude")]
    pub lat: Option<f64>,
    #[serde(alias = "longitude", alias = "lon")]
    pub lng: Option<f64>,
    #[serde(alias = "temperature")]
    pub temp: Option<f64>,
    #[serde(alias = "humidity", alias = "umid")]
    pub hum: Option<f64>,
    #[serde(alias = "mq9_val")]
    pub mq9: Option<f64>,
    #[serde(alias = "mq135_val")]
    pub mq135: Option<f64>,
    pub co: Option<f64>,
    pub alcohol: Option<f64>,
    pub co2: Option<f64>,
    pub toluene: Option<f64>,
    pub nh4: Option<f64>,
    pub acetone: Option<f64>,
}

/// Identity assigned by the database to a stored reading.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct StoredReading {
    pub id: i64,
    pub created_at: DateTime<Utc>,
}

pub async fn insert_reading(pool: &PgPool, reading: &NewReading) -> Result<StoredReading, sqlx::Error> {
    // ---
    let mut conn = pool.acquire().await?;

    sqlx::query_as::<_, StoredReading>(
        r#"
        INSERT INTO sensor_data (
            latitude, longitude, temp, humidity, mq9_val, mq135_val,
            mq135_co, mq135_alcohol, mq135_co2, mq135_toluene, mq135_nh4, mq135_acetone
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        RETURNING id, created_at
        "#,
    )
    .bind(reading.lat)
    .bind(reading.lng)
    .bind(reading.temp)
    .bind(reading.hum)
    .bind(reading.mq9)
    .bind(reading.mq135)
    .bind(reading.co)
    .bind(reading.alcohol)
    .bind(reading.co2)
    .bind(reading.toluene)
    .bind(reading.nh4)
    .bind(reading.acetone)
    .fetch_one(&mut *conn)
    .await
}

/// Latest `limit` rows as untyped JSON objects, newest first.
pub async fn latest_rows(conn: &mut PgConnection, limit: u32) -> Result<Vec<RawRecord>, sqlx::Error> {
    // ---
    let rows: Vec<String> = sqlx::query_scalar::<_, String>(
        r#"
        SELECT row_to_json(t)::text
        FROM (
            SELECT * FROM sensor_data
            ORDER BY created_at DESC
            LIMIT $1
        ) t
        "#,
    )
    .bind(i64::from(limit))
    .fetch_all(&mut *conn)
    .await?;

    let records = rows
        .iter()
        .filter_map(|text| match serde_json::from_str(text) {
            Ok(serde_json::Value::Object(map)) => Some(map),
            Ok(_) => None,
            Err(e) => {
                tracing::debug!("Skipping undecodable row: {} - Raw row: {}", e, text);
                None
            }
        })
        .collect();

    Ok(records)
}

//! Reading normalization and visual encoding for GPS-tagged environmental
//! sensors.
//!
//! Data flows one way: raw records from a [`source::ReadingSource`] are
//! resolved field by field ([`resolver`]), built into a descending
//! [`series::Series`], and published to the [`dashboard::Dashboard`], which
//! derives the day partition ([`partition`]), map encodings ([`encoding`]),
//! charts ([`charts`]) and viewport focus ([`focus`]). Validity is judged
//! per channel at render time ([`validity`]).
//!
//! The `sensormap` binary wires this to PostgreSQL and an Axum HTTP API.

pub mod charts;
pub mod config;
pub mod dashboard;
pub mod encoding;
pub mod focus;
pub mod models;
pub mod partition;
pub mod refresh;
pub mod resolver;
pub mod routes;
pub mod schema;
pub mod series;
pub mod source;
pub mod store;
pub mod validity;

pub use config::Config;
pub use models::{Channel, NormalizedReading, Position, RawRecord, Rgba, VisualEncoding};

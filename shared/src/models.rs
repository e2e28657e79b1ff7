use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One persisted price record. Immutable once written; the same
/// `(instrument, observed_at)` pair may legally appear more than once.
///
/// Serializes with the wire names the query API exposes (`ticker`,
/// `timestamp`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Observation {
    #[serde(rename = "ticker")]
    pub instrument: String,
    pub price: f64,
    #[serde(rename = "timestamp")]
    pub observed_at: i64,
}

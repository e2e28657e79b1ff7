/// Error taxonomy for the observation store.
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// A write violated a store invariant. Carries the rejected price.
    #[error("Price cannot be negative: {0}")]
    InvalidValue(f64),

    /// The backing medium could not be reached, or the store was closed.
    #[error("Storage unavailable: {0}")]
    Unavailable(#[from] sqlx::Error),
}

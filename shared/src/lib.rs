pub mod config;
pub mod error;
pub mod feed;
pub mod models;
pub mod store;

pub use config::{Config, TrackedInstrument};
pub use error::StoreError;
pub use feed::FeedClient;
pub use models::Observation;
pub use store::Store;

pub mod routes;
pub mod sampler;

pub use routes::router;
pub use sampler::{Sampler, SamplerHandle};

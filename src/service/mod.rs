pub mod normalizer;
pub mod pipeline;
pub mod scheduler;

pub use normalizer::normalize;
pub use pipeline::{ApodPipeline, RunReport};

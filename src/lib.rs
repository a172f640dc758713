pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod service;
pub mod types;

pub use error::EtlError;
pub use service::{ApodPipeline, RunReport};
pub use types::DailyRecord;

pub mod apod;

pub use apod::{DailyRecord, RawApod};

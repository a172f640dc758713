pub mod apod_api;

pub use apod_api::ApodApi;

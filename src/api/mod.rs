pub mod backend;
pub mod client;
pub mod error;
pub mod types;

#[cfg(test)]
pub mod mock;

pub use backend::Backend;
pub use client::{ApiClient, DEFAULT_API_URL};
pub use error::ApiError;
pub use types::{
    AppConfig, Job, JobQuery, SearchAck, SearchStatus, SortKey, Stats, StatusUpdate,
};

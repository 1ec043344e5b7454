//! Access to the remote food/region service.

pub mod client;
pub mod error;
pub mod transport;
pub mod types;

pub use client::ApiService;
pub use error::ApiError;

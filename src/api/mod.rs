//! API client module for communicating with the classification backend.

mod client;

pub use client::{ApiClient, DEFAULT_API_BASE, DEFAULT_MODEL};

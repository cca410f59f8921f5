//! Authenticated HTTP access to the marketplace API.
//!
//! This module provides the `ApiClient` through which every domain request
//! (listings, accessories, admin reference data) is sent. The client
//! attaches the stored bearer token and turns a 401 into a forced logout.

pub mod client;
pub mod error;

pub use client::{ApiClient, RequestOptions};
pub use error::ApiError;

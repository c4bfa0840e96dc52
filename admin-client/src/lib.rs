//! Admin Client - HTTP client for the trading backend
//!
//! Provides the table data fetcher (with auto-seed), the search resolver
//! and record CRUD over the backend REST API.

pub mod config;
pub mod error;
pub mod fetcher;
pub mod http;
pub mod search;

pub use config::ClientConfig;
pub use error::{ClientError, ClientResult, FetchError};
pub use fetcher::TableFetcher;
pub use http::HttpClient;
pub use search::{SearchParams, SearchResolver};

// Re-export shared types for convenience
pub use shared::query::{Pagination, QueryRequest, QueryResponse, SearchOption};
pub use shared::session::{BackendLoginData, LoginRequest, UserProfile};

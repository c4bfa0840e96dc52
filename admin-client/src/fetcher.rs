//! Table data fetcher with auto-seed
//!
//! An empty collection on a fresh backend answers "not found" instead of an
//! empty page. When a table config carries a sample record the fetcher probes
//! the endpoint first and creates the sample once, so the table renders with
//! at least one row.

use std::sync::Arc;

use dashmap::DashMap;
use serde_json::Value;
use shared::query::{QueryRequest, QueryResponse};
use tokio::sync::Mutex;

use crate::{ClientResult, HttpClient};

/// Cursor-paginated table reads
#[derive(Debug, Clone)]
pub struct TableFetcher {
    http: HttpClient,
    /// endpoint -> probe/seed lock
    seed_locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

impl TableFetcher {
    pub fn new(http: HttpClient) -> Self {
        Self {
            http,
            seed_locks: Arc::new(DashMap::new()),
        }
    }

    /// Same seed locks, different backend token
    pub fn with_token(&self, token: impl Into<String>) -> Self {
        Self {
            http: self.http.clone().with_token(token),
            seed_locks: Arc::clone(&self.seed_locks),
        }
    }

    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    /// Fetch one page
    ///
    /// Seeding problems never fail the read; the page request itself
    /// propagates [`crate::FetchError`] on a non-success status.
    pub async fn fetch_page(
        &self,
        endpoint: &str,
        request: &QueryRequest,
        sample_record: Option<&Value>,
    ) -> ClientResult<QueryResponse> {
        if let Some(sample) = sample_record {
            self.ensure_seeded(endpoint, sample).await;
        }

        let page = self.http.query(endpoint, request).await?;
        tracing::debug!(
            endpoint = %endpoint,
            rows = page.len(),
            has_more = page.pagination.has_more,
            "Fetched table page"
        );
        Ok(page)
    }

    /// Probe with `limit=1`; create the sample on literal "not found"
    async fn ensure_seeded(&self, endpoint: &str, sample: &Value) {
        let lock = {
            let entry = self.seed_locks.entry(endpoint.to_string()).or_default();
            Arc::clone(entry.value())
        };
        let _guard = lock.lock().await;

        let probe = QueryRequest::new(1);
        match self.http.query(endpoint, &probe).await {
            Ok(_) => {}
            Err(e) if e.is_not_found() => {
                tracing::info!(endpoint = %endpoint, "Collection not found, seeding sample record");
                if let Err(e) = self.http.create_record(endpoint, sample).await {
                    tracing::warn!(endpoint = %endpoint, error = %e, "Failed to seed sample record");
                }
            }
            Err(e) => {
                tracing::warn!(endpoint = %endpoint, error = %e, "Seed probe failed");
            }
        }
    }
}

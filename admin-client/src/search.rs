//! Typeahead search and filter option preloading
//!
//! Both degrade to an empty list on any failure; a broken dropdown must not
//! break the page around it.

use shared::query::{QueryRequest, SearchOption};

use crate::HttpClient;

/// Options preloaded for a select filter
pub const OPTIONS_LIMIT: u32 = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchParams {
    pub label_key: String,
    pub value_key: String,
    pub limit: u32,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            label_key: "name".to_string(),
            value_key: "id".to_string(),
            limit: 20,
        }
    }
}

impl SearchParams {
    pub fn new(label_key: impl Into<String>, value_key: impl Into<String>) -> Self {
        Self {
            label_key: label_key.into(),
            value_key: value_key.into(),
            ..Default::default()
        }
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }
}

#[derive(Debug, Clone)]
pub struct SearchResolver {
    http: HttpClient,
}

impl SearchResolver {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    /// `{label, value}` options for records matching `query`
    pub async fn search(
        &self,
        endpoint: &str,
        query: &str,
        search_fields: &[String],
        params: &SearchParams,
    ) -> Vec<SearchOption> {
        let request =
            QueryRequest::new(params.limit).search(query, search_fields.iter().cloned());
        self.resolve(endpoint, &request, params).await
    }

    /// All options of a referenced collection, for a select filter
    pub async fn load_options(
        &self,
        endpoint: &str,
        label_key: &str,
        value_key: &str,
    ) -> Vec<SearchOption> {
        let params = SearchParams::new(label_key, value_key).with_limit(OPTIONS_LIMIT);
        let request = QueryRequest::new(params.limit);
        self.resolve(endpoint, &request, &params).await
    }

    async fn resolve(
        &self,
        endpoint: &str,
        request: &QueryRequest,
        params: &SearchParams,
    ) -> Vec<SearchOption> {
        match self.http.query(endpoint, request).await {
            Ok(page) => page
                .data
                .iter()
                .filter_map(|record| {
                    SearchOption::from_record(record, &params.label_key, &params.value_key)
                })
                .collect(),
            Err(e) => {
                tracing::warn!(endpoint = %endpoint, error = %e, "Search failed, returning no options");
                Vec::new()
            }
        }
    }
}

use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use tracing::debug;

use crate::data::row::{rows_from_items, Row, RowId};
use crate::error::{ExplorerError, Result};

/// Dataset payload: a fully materialized row collection, no pagination
#[derive(Debug, Deserialize)]
struct ItemsResponse {
    #[serde(default)]
    items: Vec<JsonValue>,
}

/// Mutation payload: the authoritative row after a single-field update
#[derive(Debug, Deserialize)]
struct EntityResponse {
    entity: JsonValue,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: String,
}

/// Client for the entity endpoints of the data API
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    client: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Use a preconfigured client (timeouts, proxies)
    pub fn with_client(base_url: &str, client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Fetch the full dataset for one logical table.
    pub async fn fetch_rows(&self, endpoint: &str) -> Result<Vec<Row>> {
        let url = format!("{}/{}", self.base_url, endpoint);
        debug!(target: "api", "GET {}", url);
        let response = self.client.get(&url).send().await?.error_for_status()?;
        let body: ItemsResponse = response.json().await?;
        Ok(rows_from_items(&body.items))
    }

    /// Send a single-field update and return the authoritative row.
    ///
    /// Any non-2xx maps to `MutationRejected` (404 to `NotFound`), which
    /// the controller turns into an optimistic rollback.
    pub async fn update_field(
        &self,
        endpoint: &str,
        id: RowId,
        field: &str,
        value: JsonValue,
    ) -> Result<Row> {
        let url = format!("{}/{}/{}", self.base_url, endpoint, id);
        debug!(target: "api", "PATCH {} {{{}: ...}}", url, field);

        let mut body = serde_json::Map::new();
        body.insert(field.to_string(), value);

        let response = self
            .client
            .patch(&url)
            .json(&JsonValue::Object(body))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error = response.json::<ErrorBody>().await.unwrap_or_default().error;
            let message = if error.is_empty() {
                status.to_string()
            } else {
                error
            };
            if status == StatusCode::NOT_FOUND {
                return Err(ExplorerError::NotFound(message));
            }
            return Err(ExplorerError::MutationRejected(message));
        }

        let body: EntityResponse = response.json().await?;
        Row::from_json(&body.entity)
            .ok_or_else(|| ExplorerError::MutationRejected("malformed entity payload".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_items_response_tolerates_missing_items() {
        let body: ItemsResponse = serde_json::from_str("{}").unwrap();
        assert!(body.items.is_empty());

        let body: ItemsResponse =
            serde_json::from_value(json!({"items": [{"id": 1}, {"id": 2}]})).unwrap();
        assert_eq!(rows_from_items(&body.items).len(), 2);
    }

    #[test]
    fn test_base_url_trailing_slash_normalized() {
        let client = ApiClient::new("http://localhost:4000/");
        assert_eq!(client.base_url, "http://localhost:4000");
    }
}

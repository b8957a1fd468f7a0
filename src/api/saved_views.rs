//! Saved-view persistence: named View-State snapshots per logical table
//!
//! Each view-state field travels as its own payload field (not one opaque
//! blob) so the server can query and patch saved-view metadata without
//! round-tripping the whole configuration.

use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::data::filter::Filter;
use crate::error::{ExplorerError, Result};
use crate::state::view_state::{SortEntry, ViewState};

/// Layout kind of a saved view. Only the table layout exists today; the
/// tag is kept so future kinds deserialize without breaking old clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewKind {
    #[default]
    Table,
    #[serde(other)]
    Unknown,
}

/// A persisted, named View-State snapshot
#[derive(Debug, Clone, Deserialize)]
pub struct SavedView {
    pub id: i64,
    pub name: String,
    pub table_name: String,
    #[serde(default)]
    pub view_type: ViewKind,
    #[serde(flatten)]
    pub state: ViewState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for creating a saved view from the current View-State
#[derive(Debug, Clone, Serialize)]
pub struct NewSavedView {
    pub name: String,
    pub table_name: String,
    pub view_type: ViewKind,
    #[serde(flatten)]
    pub state: ViewState,
}

impl NewSavedView {
    pub fn new(name: impl Into<String>, table_name: impl Into<String>, state: ViewState) -> Self {
        Self {
            name: name.into(),
            table_name: table_name.into(),
            view_type: ViewKind::Table,
            state,
        }
    }

    /// Checked before any network call so a bad payload never leaves the
    /// process.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(ExplorerError::Validation("name is required".to_string()));
        }
        if self.table_name.trim().is_empty() {
            return Err(ExplorerError::Validation(
                "table_name is required".to_string(),
            ));
        }
        Ok(())
    }
}

/// Partial update: only the supplied fields reach the wire, and the server
/// merges them into the stored view. `group_by`/`search_term` use a double
/// Option so "clear this field" (null) and "leave it alone" (absent) stay
/// distinguishable.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SavedViewPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filters: Option<Vec<Filter>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_by: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_term: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hidden_columns: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column_order: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column_widths: Option<std::collections::HashMap<String, u32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_config: Option<Vec<SortEntry>>,
}

#[derive(Debug, Deserialize)]
struct ViewsResponse {
    #[serde(default)]
    views: Vec<SavedView>,
}

#[derive(Debug, Deserialize)]
struct ViewResponse {
    view: SavedView,
}

#[derive(Debug, Deserialize)]
struct DeleteResponse {
    #[serde(default = "default_success")]
    success: bool,
}

fn default_success() -> bool {
    true
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: String,
}

/// Client for the saved-view CRUD endpoints
#[derive(Clone)]
pub struct SavedViewStore {
    base_url: String,
    client: reqwest::Client,
}

impl SavedViewStore {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn with_client(base_url: &str, client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// List saved views, newest first, optionally scoped to one table.
    pub async fn list(&self, table: Option<&str>) -> Result<Vec<SavedView>> {
        let url = format!("{}/saved-views", self.base_url);
        debug!(target: "api", "GET {} table={:?}", url, table);
        let mut request = self.client.get(&url);
        if let Some(table) = table {
            request = request.query(&[("table", table)]);
        }
        let response = request.send().await?.error_for_status()?;
        let mut body: ViewsResponse = response.json().await?;
        body.views.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(body.views)
    }

    /// Persist the given View-State under a name. Validation failures
    /// surface before any network write.
    pub async fn create(&self, new_view: &NewSavedView) -> Result<SavedView> {
        new_view.validate()?;
        let url = format!("{}/saved-views", self.base_url);
        debug!(target: "api", "POST {} '{}'", url, new_view.name);
        let response = self.client.post(&url).json(new_view).send().await?;
        self.view_from_response(response).await
    }

    pub async fn fetch(&self, id: i64) -> Result<SavedView> {
        let url = format!("{}/saved-views/{}", self.base_url, id);
        let response = self.client.get(&url).send().await?;
        self.view_from_response(response).await
    }

    /// Merge the supplied fields into the stored view; the server stamps a
    /// fresh update timestamp.
    pub async fn update(&self, id: i64, patch: &SavedViewPatch) -> Result<SavedView> {
        let url = format!("{}/saved-views/{}", self.base_url, id);
        debug!(target: "api", "PATCH {}", url);
        let response = self.client.patch(&url).json(patch).send().await?;
        self.view_from_response(response).await
    }

    /// Delete a saved view. Deleting an id that is already gone is not a
    /// client error: it reports `Ok(false)`.
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let url = format!("{}/saved-views/{}", self.base_url, id);
        debug!(target: "api", "DELETE {}", url);
        let response = self.client.delete(&url).send().await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        if !status.is_success() {
            return Err(ExplorerError::MutationRejected(
                self.error_text(response, status).await,
            ));
        }
        let body: DeleteResponse = response.json().await.unwrap_or(DeleteResponse {
            success: true,
        });
        Ok(body.success)
    }

    async fn view_from_response(&self, response: reqwest::Response) -> Result<SavedView> {
        let status = response.status();
        if !status.is_success() {
            let message = self.error_text(response, status).await;
            return Err(match status {
                StatusCode::NOT_FOUND => ExplorerError::NotFound(message),
                StatusCode::BAD_REQUEST => ExplorerError::Validation(message),
                _ => ExplorerError::MutationRejected(message),
            });
        }
        let body: ViewResponse = response.json().await?;
        Ok(body.view)
    }

    async fn error_text(&self, response: reqwest::Response, status: StatusCode) -> String {
        let error = response.json::<ErrorBody>().await.unwrap_or_default().error;
        if error.is_empty() {
            status.to_string()
        } else {
            error
        }
    }
}

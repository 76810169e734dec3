//! Graph queries over http, against the page collaborator's json api.

use reqwest::Url;
use serde::de::DeserializeOwned;

use super::types::{Backlink, GraphNode, GraphSnapshot};
use super::GraphSource;
use crate::error::QueryError;

/// HTTP client for the page collaborator's graph endpoints.
#[derive(Clone, Debug)]
pub struct GraphClient {
	http: reqwest::Client,
	base: Url,
}

impl GraphClient {
	/// `api_base` must be absolute, e.g. `http://localhost:8000/api`.
	pub fn new(api_base: &str) -> Result<Self, QueryError> {
		let base = Url::parse(api_base).map_err(|e| QueryError::InvalidUrl(format!("{api_base}: {e}")))?;
		if base.cannot_be_a_base() {
			return Err(QueryError::InvalidUrl(api_base.to_string()));
		}
		Ok(Self {
			http: reqwest::Client::new(),
			base,
		})
	}

	fn endpoint(&self, segments: &[&str]) -> Result<Url, QueryError> {
		let mut url = self.base.clone();
		url.path_segments_mut()
			.map_err(|_| QueryError::InvalidUrl(self.base.to_string()))?
			.pop_if_empty()
			.extend(segments);
		Ok(url)
	}

	/// `graph`, with an optional `workspace` query parameter.
	pub fn full_graph_url(&self, workspace: Option<&str>) -> Result<Url, QueryError> {
		let mut url = self.endpoint(&["graph"])?;
		if let Some(ws) = workspace {
			url.query_pairs_mut().append_pair("workspace", ws);
		}
		Ok(url)
	}

	/// `graph/<page_id>/neighborhood`.
	pub fn neighborhood_url(&self, page_id: &str) -> Result<Url, QueryError> {
		self.endpoint(&["graph", page_id, "neighborhood"])
	}

	/// `graph/<page_id>/backlinks`.
	pub fn backlinks_url(&self, page_id: &str) -> Result<Url, QueryError> {
		self.endpoint(&["graph", page_id, "backlinks"])
	}

	/// `pages/workspaces`.
	pub fn workspaces_url(&self) -> Result<Url, QueryError> {
		self.endpoint(&["pages", "workspaces"])
	}

	async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, QueryError> {
		let response = self.http.get(url.clone()).send().await?;
		let status = response.status();
		if !status.is_success() {
			return Err(QueryError::Status {
				status: status.as_u16(),
				url: url.to_string(),
			});
		}
		Ok(response.json().await?)
	}

	/// Pages with no links in or out.
	pub async fn orphans(&self) -> Result<Vec<GraphNode>, QueryError> {
		self.get_json(self.endpoint(&["graph", "orphans"])?).await
	}

	/// Pages sharing tags with `page_id`, most related first.
	pub async fn suggestions(&self, page_id: &str, limit: usize) -> Result<Vec<GraphNode>, QueryError> {
		let mut url = self.endpoint(&["graph", page_id, "suggestions"])?;
		url.query_pairs_mut().append_pair("limit", &limit.to_string());
		self.get_json(url).await
	}
}

impl GraphSource for GraphClient {
	async fn full_graph(&self, workspace: Option<&str>) -> Result<GraphSnapshot, QueryError> {
		self.get_json(self.full_graph_url(workspace)?).await
	}

	async fn neighborhood(&self, page_id: &str) -> Result<GraphSnapshot, QueryError> {
		self.get_json(self.neighborhood_url(page_id)?).await
	}

	async fn backlinks(&self, page_id: &str) -> Result<Vec<Backlink>, QueryError> {
		self.get_json(self.backlinks_url(page_id)?).await
	}

	async fn workspaces(&self) -> Result<Vec<String>, QueryError> {
		self.get_json(self.workspaces_url()?).await
	}
}

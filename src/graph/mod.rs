//! Page link graph: data model and the queries that produce it.

mod client;
mod index;
mod session;
mod types;

pub use client::GraphClient;
pub use index::{LinkIndex, PageRecord};
pub use session::{GraphSession, RequestTicket};
pub use types::{Backlink, GraphEdge, GraphNode, GraphSnapshot, NodeId};

use log::warn;

use crate::config::GraphViewConfig;
use crate::error::QueryError;

/// Read-only graph queries served by the page collaborator.
#[allow(async_fn_in_trait)]
pub trait GraphSource {
	/// All pages and links, optionally restricted to one workspace.
	async fn full_graph(&self, workspace: Option<&str>) -> Result<GraphSnapshot, QueryError>;
	/// A page and its one-hop neighbors.
	async fn neighborhood(&self, page_id: &str) -> Result<GraphSnapshot, QueryError>;
	/// Pages linking to `page_id`, with context.
	async fn backlinks(&self, page_id: &str) -> Result<Vec<Backlink>, QueryError>;
	/// Workspace names for the filter control.
	async fn workspaces(&self) -> Result<Vec<String>, QueryError>;
}

impl GraphSource for LinkIndex {
	async fn full_graph(&self, workspace: Option<&str>) -> Result<GraphSnapshot, QueryError> {
		Ok(LinkIndex::full_graph(self, workspace))
	}

	async fn neighborhood(&self, page_id: &str) -> Result<GraphSnapshot, QueryError> {
		LinkIndex::neighborhood(self, page_id)
	}

	async fn backlinks(&self, page_id: &str) -> Result<Vec<Backlink>, QueryError> {
		LinkIndex::backlinks(self, page_id)
	}

	async fn workspaces(&self) -> Result<Vec<String>, QueryError> {
		Ok(LinkIndex::workspaces(self))
	}
}

/// Where the app reads its graph from.
#[derive(Clone, Debug)]
pub enum GraphBackend {
	/// The page collaborator over http.
	Remote(GraphClient),
	/// The in-memory sample notebook.
	Demo(LinkIndex),
}

impl GraphBackend {
	/// Remote client for `config.api_base`, or the sample notebook in demo
	/// mode or when the base url is unusable.
	pub fn from_config(config: &GraphViewConfig) -> Self {
		if config.demo {
			return Self::Demo(LinkIndex::sample());
		}
		match GraphClient::new(&config.api_base) {
			Ok(client) => Self::Remote(client),
			Err(e) => {
				warn!("{e}; falling back to the sample notebook");
				Self::Demo(LinkIndex::sample())
			}
		}
	}

	/// Pages with no links in or out.
	pub async fn orphans(&self) -> Result<Vec<GraphNode>, QueryError> {
		match self {
			Self::Remote(c) => c.orphans().await,
			Self::Demo(i) => Ok(i.orphans()),
		}
	}

	/// Same-workspace pages sharing tags with `page_id`.
	pub async fn suggestions(&self, page_id: &str, limit: usize) -> Result<Vec<GraphNode>, QueryError> {
		match self {
			Self::Remote(c) => c.suggestions(page_id, limit).await,
			Self::Demo(i) => i.suggestions(page_id, limit),
		}
	}
}

impl GraphSource for GraphBackend {
	async fn full_graph(&self, workspace: Option<&str>) -> Result<GraphSnapshot, QueryError> {
		match self {
			Self::Remote(c) => c.full_graph(workspace).await,
			Self::Demo(i) => GraphSource::full_graph(i, workspace).await,
		}
	}

	async fn neighborhood(&self, page_id: &str) -> Result<GraphSnapshot, QueryError> {
		match self {
			Self::Remote(c) => c.neighborhood(page_id).await,
			Self::Demo(i) => GraphSource::neighborhood(i, page_id).await,
		}
	}

	async fn backlinks(&self, page_id: &str) -> Result<Vec<Backlink>, QueryError> {
		match self {
			Self::Remote(c) => c.backlinks(page_id).await,
			Self::Demo(i) => GraphSource::backlinks(i, page_id).await,
		}
	}

	async fn workspaces(&self) -> Result<Vec<String>, QueryError> {
		match self {
			Self::Remote(c) => c.workspaces().await,
			Self::Demo(i) => GraphSource::workspaces(i).await,
		}
	}
}

/// Which graph a view is showing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GraphQuery {
	/// Every page, or those of one workspace.
	Full {
		/// Workspace to restrict to.
		workspace: Option<String>,
	},
	/// One page and its direct neighbors.
	Neighborhood {
		/// The centre page.
		page_id: String,
	},
}

/// Run `query` against `source`, degrading any failure to an empty snapshot
/// and dropping dangling edges from a successful one.
pub async fn load_snapshot<S: GraphSource>(source: &S, query: &GraphQuery) -> GraphSnapshot {
	let result = match query {
		GraphQuery::Full { workspace } => source.full_graph(workspace.as_deref()).await,
		GraphQuery::Neighborhood { page_id } => source.neighborhood(page_id).await,
	};
	snapshot_or_empty(result)
}

/// Successful snapshots lose their dangling edges; failures become empty.
pub fn snapshot_or_empty(result: Result<GraphSnapshot, QueryError>) -> GraphSnapshot {
	match result {
		Ok(snapshot) => snapshot.without_dangling_edges(),
		Err(e) => {
			warn!("{e}; showing an empty graph");
			GraphSnapshot::empty()
		}
	}
}

/// A list result, or an empty list when the query failed.
pub fn list_or_empty<T>(result: Result<Vec<T>, QueryError>) -> Vec<T> {
	result.unwrap_or_else(|e| {
		warn!("{e}; showing an empty list");
		Vec::new()
	})
}

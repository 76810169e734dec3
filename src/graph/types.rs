//! Graph wire types shared by the index, the http client and the views.

use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

/// Stable page identifier.
pub type NodeId = String;

/// A page as a graph node.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
	/// Page id.
	pub id: NodeId,
	/// Page title, used for labels and title links.
	pub title: String,
	/// Owning workspace; selects the node color.
	#[serde(default = "default_workspace")]
	pub workspace: String,
	/// Page tags.
	#[serde(default)]
	pub tags: BTreeSet<String>,
	/// Precomputed degree, used for rendering weight only.
	#[serde(default)]
	pub link_count: u32,
}

fn default_workspace() -> String {
	"default".into()
}

/// A directed link between two pages.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GraphEdge {
	/// Linking page.
	pub source: NodeId,
	/// Linked page.
	pub target: NodeId,
}

/// Nodes and edges returned by a single graph query.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
	/// Pages in the result.
	#[serde(default)]
	pub nodes: Vec<GraphNode>,
	/// Links among them. May reference pages outside `nodes`.
	#[serde(default)]
	pub edges: Vec<GraphEdge>,
}

impl GraphSnapshot {
	/// No nodes, no edges.
	pub fn empty() -> Self {
		Self::default()
	}

	/// True when there are no nodes.
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	/// Node by exact id.
	pub fn node(&self, id: &str) -> Option<&GraphNode> {
		self.nodes.iter().find(|n| n.id == id)
	}

	/// Resolve a link target among the loaded nodes: id first, then
	/// case-insensitive title.
	pub fn resolve(&self, target: &str) -> Option<&GraphNode> {
		self.node(target).or_else(|| {
			let wanted = target.to_lowercase();
			self.nodes.iter().find(|n| n.title.to_lowercase() == wanted)
		})
	}

	/// Copy of this snapshot keeping only edges whose endpoints are both
	/// present in the node set.
	///
	/// Scoped queries legitimately reference pages outside the returned node
	/// set, so dropped edges are not an error.
	pub fn without_dangling_edges(&self) -> Self {
		let ids: HashSet<&str> = self.nodes.iter().map(|n| n.id.as_str()).collect();
		let edges: Vec<GraphEdge> = self
			.edges
			.iter()
			.filter(|e| ids.contains(e.source.as_str()) && ids.contains(e.target.as_str()))
			.cloned()
			.collect();
		let dropped = self.edges.len() - edges.len();
		if dropped > 0 {
			log::debug!("dropped {dropped} dangling edge(s)");
		}
		Self {
			nodes: self.nodes.clone(),
			edges,
		}
	}
}

/// An inbound link to a page, with text from around the link.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Backlink {
	/// Id of the linking page.
	pub page_id: NodeId,
	/// Title of the linking page.
	pub page_title: String,
	/// Text around the link, empty when none could be cut.
	#[serde(default)]
	pub context_snippet: String,
}

//! In-memory link index.
//!
//! Holds page records and derives graph edges from their content with the
//! same grammar the page renderer uses, so every link a reader can click is
//! an edge here. Serves the same queries as the HTTP collaborator and backs
//! the demo mode of the app.

use std::collections::{BTreeSet, HashMap, HashSet};

use super::types::{Backlink, GraphEdge, GraphNode, GraphSnapshot};
use crate::error::QueryError;
use crate::links::{context_snippet, link_targets};

/// A stored page, as far as the link graph is concerned.
#[derive(Clone, Debug)]
pub struct PageRecord {
	/// Page id.
	pub id: String,
	/// Page title; links may target it instead of the id.
	pub title: String,
	/// Owning workspace.
	pub workspace: String,
	/// Page tags.
	pub tags: BTreeSet<String>,
	/// Raw page text, scanned for wiki-links.
	pub content: String,
}

impl PageRecord {
	/// Untagged page.
	pub fn new(id: &str, title: &str, workspace: &str, content: &str) -> Self {
		Self {
			id: id.into(),
			title: title.into(),
			workspace: workspace.into(),
			tags: BTreeSet::new(),
			content: content.into(),
		}
	}

	/// Replace the tags.
	pub fn with_tags(mut self, tags: &[&str]) -> Self {
		self.tags = tags.iter().map(|t| t.to_string()).collect();
		self
	}
}

/// Pages plus the resolved, de-duplicated edges between them.
#[derive(Clone, Debug, Default)]
pub struct LinkIndex {
	pages: Vec<PageRecord>,
	edges: Vec<GraphEdge>,
	degree: HashMap<String, u32>,
}

impl LinkIndex {
	/// Index `pages` and derive their edges.
	pub fn new(pages: Vec<PageRecord>) -> Self {
		let mut index = Self {
			pages,
			..Self::default()
		};
		index.rebuild_edges();
		index
	}

	/// Insert or replace a page and re-derive all edges.
	pub fn upsert(&mut self, page: PageRecord) {
		match self.pages.iter_mut().find(|p| p.id == page.id) {
			Some(existing) => *existing = page,
			None => self.pages.push(page),
		}
		self.rebuild_edges();
	}

	fn rebuild_edges(&mut self) {
		let mut seen = HashSet::new();
		let mut edges = Vec::new();
		for page in &self.pages {
			for target in link_targets(&page.content) {
				let Some(resolved) = self.resolve(&target) else {
					continue;
				};
				let edge = GraphEdge {
					source: page.id.clone(),
					target: resolved.id.clone(),
				};
				if edge.source != edge.target && seen.insert(edge.clone()) {
					edges.push(edge);
				}
			}
		}

		let mut degree: HashMap<String, u32> = HashMap::new();
		for e in &edges {
			*degree.entry(e.source.clone()).or_insert(0) += 1;
			*degree.entry(e.target.clone()).or_insert(0) += 1;
		}
		self.edges = edges;
		self.degree = degree;
	}

	/// Resolve a link target: exact id first, then case-insensitive title.
	pub fn resolve(&self, target: &str) -> Option<&PageRecord> {
		self.pages.iter().find(|p| p.id == target).or_else(|| {
			let wanted = target.to_lowercase();
			self.pages.iter().find(|p| p.title.to_lowercase() == wanted)
		})
	}

	fn page(&self, id: &str) -> Result<&PageRecord, QueryError> {
		self.pages
			.iter()
			.find(|p| p.id == id)
			.ok_or_else(|| QueryError::NotFound(id.to_string()))
	}

	fn to_node(&self, page: &PageRecord) -> GraphNode {
		GraphNode {
			id: page.id.clone(),
			title: page.title.clone(),
			workspace: page.workspace.clone(),
			tags: page.tags.clone(),
			link_count: self.degree.get(&page.id).copied().unwrap_or(0),
		}
	}

	/// Every page, optionally restricted to one workspace, with the outgoing
	/// edges of the included pages. Edges leaving the scope are left for the
	/// consumer to drop.
	pub fn full_graph(&self, workspace: Option<&str>) -> GraphSnapshot {
		let in_scope = |p: &&PageRecord| workspace.is_none_or(|ws| p.workspace == ws);
		let nodes: Vec<GraphNode> = self.pages.iter().filter(in_scope).map(|p| self.to_node(p)).collect();
		let ids: HashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
		let edges = self
			.edges
			.iter()
			.filter(|e| ids.contains(e.source.as_str()))
			.cloned()
			.collect();
		GraphSnapshot { nodes, edges }
	}

	/// The page, its one-hop neighbors in either direction, and the edges
	/// among exactly that set.
	pub fn neighborhood(&self, page_id: &str) -> Result<GraphSnapshot, QueryError> {
		let center = self.page(page_id)?;
		let mut members: Vec<&str> = vec![center.id.as_str()];
		for e in &self.edges {
			let other = if e.source == center.id {
				&e.target
			} else if e.target == center.id {
				&e.source
			} else {
				continue;
			};
			if !members.contains(&other.as_str()) {
				members.push(other);
			}
		}

		let nodes = members
			.iter()
			.filter_map(|id| self.pages.iter().find(|p| p.id == *id))
			.map(|p| self.to_node(p))
			.collect();
		let edges = self
			.edges
			.iter()
			.filter(|e| members.contains(&e.source.as_str()) && members.contains(&e.target.as_str()))
			.cloned()
			.collect();
		Ok(GraphSnapshot { nodes, edges })
	}

	/// Pages linking to `page_id`, each with text from around its link.
	pub fn backlinks(&self, page_id: &str) -> Result<Vec<Backlink>, QueryError> {
		let target = self.page(page_id)?;
		let backlinks = self
			.edges
			.iter()
			.filter(|e| e.target == target.id)
			.filter_map(|e| self.pages.iter().find(|p| p.id == e.source))
			.map(|source| {
				let mut snippet = context_snippet(&source.content, &target.title);
				if snippet.is_empty() {
					snippet = context_snippet(&source.content, &target.id);
				}
				Backlink {
					page_id: source.id.clone(),
					page_title: source.title.clone(),
					context_snippet: snippet,
				}
			})
			.collect();
		Ok(backlinks)
	}

	/// Distinct workspace names, sorted.
	pub fn workspaces(&self) -> Vec<String> {
		let names: BTreeSet<&str> = self.pages.iter().map(|p| p.workspace.as_str()).collect();
		names.into_iter().map(String::from).collect()
	}

	/// Pages with no incoming or outgoing links.
	pub fn orphans(&self) -> Vec<GraphNode> {
		self.pages
			.iter()
			.filter(|p| !self.degree.contains_key(&p.id))
			.map(|p| self.to_node(p))
			.collect()
	}

	/// Other pages in the same workspace sharing at least one tag, most
	/// overlapping first.
	pub fn suggestions(&self, page_id: &str, limit: usize) -> Result<Vec<GraphNode>, QueryError> {
		let page = self.page(page_id)?;
		let mut scored: Vec<(usize, &PageRecord)> = self
			.pages
			.iter()
			.filter(|c| c.id != page.id && c.workspace == page.workspace)
			.map(|c| (c.tags.intersection(&page.tags).count(), c))
			.filter(|(overlap, _)| *overlap > 0)
			.collect();
		scored.sort_by(|a, b| b.0.cmp(&a.0));
		Ok(scored
			.into_iter()
			.take(limit)
			.map(|(_, c)| self.to_node(c))
			.collect())
	}

	/// A small seeded notebook used when the app runs without a server.
	pub fn sample() -> Self {
		Self::new(vec![
			PageRecord::new(
				"welcome",
				"Welcome",
				"personal",
				"Start with [[Reading List]] and the [[Rust Notes|rust notes]].",
			)
			.with_tags(&["index"]),
			PageRecord::new(
				"reading",
				"Reading List",
				"personal",
				"Next up: [[Force Directed Layouts]], then back to [[Welcome]].",
			)
			.with_tags(&["books", "index"]),
			PageRecord::new(
				"rust",
				"Rust Notes",
				"work",
				"Ownership, borrowing and [[Async Runtimes]]. See [[Layout Engine Design]].",
			)
			.with_tags(&["rust"]),
			PageRecord::new(
				"async",
				"Async Runtimes",
				"work",
				"Executors, wakers and cooperative scheduling.",
			)
			.with_tags(&["rust"]),
			PageRecord::new(
				"layout",
				"Layout Engine Design",
				"work",
				"Built on ideas from [[Force Directed Layouts]] with a [[Rust Notes|rust]] core.",
			)
			.with_tags(&["rust", "graphs"]),
			PageRecord::new(
				"fdl",
				"Force Directed Layouts",
				"research",
				"Springs, charges and cooling schedules.",
			)
			.with_tags(&["graphs"]),
			PageRecord::new("inbox", "Inbox", "personal", "Unsorted thoughts."),
		])
	}
}

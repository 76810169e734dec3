use std::collections::HashMap;

use crate::graph::GraphNode;

const COLORS: &[&str] = &[
	"#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
	"#bcbd22", "#17becf",
];

/// Workspace colors in first-seen order over one node set.
///
/// Stable within a snapshot only; a snapshot with different workspaces gets
/// a fresh assignment.
#[derive(Clone, Debug, Default)]
pub struct WorkspacePalette {
	slots: HashMap<String, usize>,
}

impl WorkspacePalette {
	pub fn from_nodes<'a>(nodes: impl IntoIterator<Item = &'a GraphNode>) -> Self {
		let mut slots = HashMap::new();
		for node in nodes {
			let next = slots.len();
			slots.entry(node.workspace.clone()).or_insert(next);
		}
		Self { slots }
	}

	pub fn color(&self, workspace: &str) -> &'static str {
		self.slots
			.get(workspace)
			.map_or(COLORS[0], |&slot| COLORS[slot % COLORS.len()])
	}

	/// Workspaces with their colors, in assignment order, for a legend.
	pub fn legend(&self) -> Vec<(String, &'static str)> {
		let mut entries: Vec<(&String, &usize)> = self.slots.iter().collect();
		entries.sort_by_key(|(_, slot)| **slot);
		entries
			.into_iter()
			.map(|(ws, &slot)| (ws.clone(), COLORS[slot % COLORS.len()]))
			.collect()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::collections::BTreeSet;

	fn node(workspace: &str) -> GraphNode {
		GraphNode {
			id: format!("{workspace}-page"),
			title: "t".into(),
			workspace: workspace.into(),
			tags: BTreeSet::new(),
			link_count: 0,
		}
	}

	#[test]
	fn colors_follow_first_seen_order() {
		let nodes = vec![node("work"), node("home"), node("work"), node("lab")];
		let palette = WorkspacePalette::from_nodes(&nodes);
		assert_eq!(palette.color("work"), COLORS[0]);
		assert_eq!(palette.color("home"), COLORS[1]);
		assert_eq!(palette.color("lab"), COLORS[2]);
		assert_eq!(
			palette.legend().into_iter().map(|(ws, _)| ws).collect::<Vec<_>>(),
			vec!["work", "home", "lab"]
		);
	}

	#[test]
	fn assignment_is_per_snapshot() {
		let first = WorkspacePalette::from_nodes(&[node("work"), node("home")]);
		let second = WorkspacePalette::from_nodes(&[node("home")]);
		assert_eq!(first.color("home"), COLORS[1]);
		assert_eq!(second.color("home"), COLORS[0]);
	}

	#[test]
	fn palette_wraps_around() {
		let nodes: Vec<GraphNode> = (0..12).map(|i| node(&format!("ws{i}"))).collect();
		let palette = WorkspacePalette::from_nodes(&nodes);
		assert_eq!(palette.color("ws10"), COLORS[0]);
		assert_eq!(palette.color("unknown"), COLORS[0]);
	}
}

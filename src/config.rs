//! View configuration.
//!
//! Read once at start-up from a JSON `data-graph-config` attribute on
//! `<body>`; every field is optional.

use log::warn;
use serde::Deserialize;

const CONFIG_ATTRIBUTE: &str = "data-graph-config";

/// Tunables for the graph views.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct GraphViewConfig {
	/// Absolute base url of the page api. Empty means `<origin>/api`, or the
	/// sample notebook when there is no origin to resolve against.
	pub api_base: String,
	/// Serve the built-in sample notebook instead of calling the api.
	pub demo: bool,
	/// Smallest zoom factor the wheel reaches.
	pub min_zoom: f64,
	/// Largest zoom factor the wheel reaches.
	pub max_zoom: f64,
	/// Idle rotation of the view.
	pub drift: bool,
	/// Show the compact/expanded layout toggle.
	pub expand_controls: bool,
	/// Drift angle per animation frame, radians.
	pub drift_step: f64,
	/// Quiet period before drift resumes after an interaction.
	pub drift_quiet_ms: f64,
	/// Characters per label line.
	pub label_budget: usize,
	/// Radius of a node with no links, in graph units.
	pub base_node_radius: f64,
}

impl Default for GraphViewConfig {
	fn default() -> Self {
		Self {
			api_base: String::new(),
			demo: false,
			min_zoom: 0.1,
			max_zoom: 4.0,
			drift: true,
			expand_controls: true,
			drift_step: 0.0008,
			drift_quiet_ms: 1000.0,
			label_budget: 18,
			base_node_radius: 5.0,
		}
	}
}

impl GraphViewConfig {
	/// Parse a JSON config, falling back to defaults on malformed input.
	pub fn from_json(raw: &str) -> Self {
		serde_json::from_str(raw).unwrap_or_else(|e| {
			warn!("ignoring malformed graph config: {e}");
			Self::default()
		})
	}

	/// Config for the running page, with `api_base` resolved against the
	/// window origin.
	pub fn load() -> Self {
		let Some(window) = web_sys::window() else {
			return Self::default();
		};
		let config = window
			.document()
			.and_then(|d| d.body())
			.and_then(|b| b.get_attribute(CONFIG_ATTRIBUTE))
			.map(|raw| Self::from_json(&raw))
			.unwrap_or_default();
		config.resolve_api_base(window.location().origin().ok().as_deref())
	}

	/// Fill an empty `api_base` with `<origin>/api`. Without an origin it
	/// stays empty and the backend falls back to the sample notebook.
	pub fn resolve_api_base(mut self, origin: Option<&str>) -> Self {
		if self.api_base.is_empty() {
			match origin {
				Some(origin) => self.api_base = format!("{}/api", origin.trim_end_matches('/')),
				None => warn!("no window origin; graph api base left unset"),
			}
		}
		self
	}

	/// The full graph view: drift and the density toggle enabled.
	pub fn full_graph_view(self) -> Self {
		Self {
			drift: true,
			expand_controls: true,
			..self
		}
	}

	/// The embedded neighborhood view: static, compact.
	pub fn neighborhood_view(self) -> Self {
		Self {
			drift: false,
			expand_controls: false,
			..self
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn partial_json_keeps_defaults() {
		let config = GraphViewConfig::from_json(r#"{"demo": true, "label_budget": 12}"#);
		assert!(config.demo);
		assert_eq!(config.label_budget, 12);
		assert_eq!(config.max_zoom, 4.0);
		assert_eq!(config.drift_quiet_ms, 1000.0);
	}

	#[test]
	fn malformed_json_falls_back() {
		assert_eq!(GraphViewConfig::from_json("{nope"), GraphViewConfig::default());
	}

	#[test]
	fn api_base_resolves_against_the_origin() {
		let resolved = GraphViewConfig::default().resolve_api_base(Some("https://notes.example/"));
		assert_eq!(resolved.api_base, "https://notes.example/api");

		let explicit = GraphViewConfig {
			api_base: "https://api.example/v1".into(),
			..GraphViewConfig::default()
		};
		assert_eq!(
			explicit.resolve_api_base(Some("https://notes.example")).api_base,
			"https://api.example/v1"
		);
	}

	#[test]
	fn missing_origin_leaves_the_sample_notebook() {
		let config = GraphViewConfig::default().resolve_api_base(None);
		assert!(config.api_base.is_empty());
		assert!(matches!(
			crate::graph::GraphBackend::from_config(&config),
			crate::graph::GraphBackend::Demo(_)
		));
	}

	#[test]
	fn view_presets_toggle_features() {
		let hood = GraphViewConfig::default().neighborhood_view();
		assert!(!hood.drift && !hood.expand_controls);
		let full = hood.full_graph_view();
		assert!(full.drift && full.expand_controls);
	}
}

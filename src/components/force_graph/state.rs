use std::collections::HashSet;

use super::drift::Drift;
use super::labels::{label_opacity, wrap_label};
use super::palette::WorkspacePalette;
use super::simulation::{LayoutParams, Simulation};
use crate::config::GraphViewConfig;
use crate::graph::{GraphNode, GraphSnapshot};

/// Extra hit slack around a node, in graph units.
pub const HIT_PADDING: f64 = 4.0;
/// Pointer travel (px) below which a press on a node counts as a click.
const CLICK_SLOP: f64 = 4.0;
const WHEEL_ZOOM_IN: f64 = 1.1;
const WHEEL_ZOOM_OUT: f64 = 0.9;

/// Pan and zoom: `screen = graph * k + (x, y)`.
#[derive(Clone, Debug, PartialEq)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self {
			x: 0.0,
			y: 0.0,
			k: 1.0,
		}
	}
}

impl ViewTransform {
	pub fn apply(&self, gx: f64, gy: f64) -> (f64, f64) {
		(gx * self.k + self.x, gy * self.k + self.y)
	}

	pub fn invert(&self, sx: f64, sy: f64) -> (f64, f64) {
		((sx - self.x) / self.k, (sy - self.y) / self.k)
	}

	/// Scale by `factor` within `[min, max]`, keeping the graph point under
	/// `(sx, sy)` fixed.
	pub fn zoom_about(&mut self, sx: f64, sy: f64, factor: f64, min: f64, max: f64) {
		let new_k = (self.k * factor).clamp(min, max);
		let ratio = new_k / self.k;
		self.x = sx - (sx - self.x) * ratio;
		self.y = sy - (sy - self.y) * ratio;
		self.k = new_k;
	}
}

fn rotate_about((px, py): (f64, f64), (cx, cy): (f64, f64), angle: f64) -> (f64, f64) {
	let (sin, cos) = angle.sin_cos();
	let (dx, dy) = (px - cx, py - cy);
	(cx + dx * cos - dy * sin, cy + dx * sin + dy * cos)
}

#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub active: bool,
	pub node_idx: Option<usize>,
	pub start_x: f64,
	pub start_y: f64,
	/// Node position minus pointer position at grab time, graph units.
	pub grab_dx: f64,
	pub grab_dy: f64,
	pub moved: bool,
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
}

#[derive(Clone, Debug, Default)]
pub struct HoverState {
	pub node: Option<usize>,
	pub neighbors: HashSet<usize>,
	pub highlight_t: f64,
}

/// Interaction controller for one snapshot: layout, view transform, drift,
/// drag, pan and hover.
pub struct ForceGraphState {
	pub sim: Simulation,
	pub transform: ViewTransform,
	pub drag: DragState,
	pub pan: PanState,
	pub hover: HoverState,
	pub drift: Option<Drift>,
	pub palette: WorkspacePalette,
	pub width: f64,
	pub height: f64,
	pub expanded: bool,
	pub flow_time: f64,
	pivot: (f64, f64),
	max_link_count: u32,
	last_frame: Option<f64>,
	config: GraphViewConfig,
}

impl ForceGraphState {
	pub fn new(snapshot: &GraphSnapshot, width: f64, height: f64, config: &GraphViewConfig) -> Self {
		let center = (width / 2.0, height / 2.0);
		Self {
			sim: Simulation::new(snapshot, LayoutParams::compact(center)),
			transform: ViewTransform::default(),
			drag: DragState::default(),
			pan: PanState::default(),
			hover: HoverState::default(),
			drift: config
				.drift
				.then(|| Drift::new(config.drift_step, config.drift_quiet_ms)),
			palette: WorkspacePalette::from_nodes(&snapshot.nodes),
			width,
			height,
			expanded: false,
			flow_time: 0.0,
			pivot: center,
			max_link_count: snapshot.nodes.iter().map(|n| n.link_count).max().unwrap_or(0),
			last_frame: None,
			config: config.clone(),
		}
	}

	/// Tear `previous` down and take over its surface for a new snapshot.
	/// Shared nodes keep their positions; the view transform, density and
	/// drift phase carry over.
	pub fn replacing(mut previous: ForceGraphState, snapshot: &GraphSnapshot) -> Self {
		previous.teardown();
		let mut next = Self::new(snapshot, previous.width, previous.height, &previous.config);
		next.sim.seed_from(&previous.sim);
		next.transform = previous.transform;
		next.drift = previous.drift;
		next.pivot = previous.pivot;
		if previous.expanded {
			next.set_expanded(true);
		}
		log::info!(
			"replaced layout: {} nodes, {} edges",
			snapshot.nodes.len(),
			snapshot.edges.len()
		);
		next
	}

	/// Stop the simulation and drop any in-progress gesture.
	pub fn teardown(&mut self) {
		self.sim.stop();
		self.drag = DragState::default();
		self.pan = PanState::default();
		self.hover = HoverState::default();
	}

	pub fn drift_angle(&self) -> f64 {
		self.drift.as_ref().map_or(0.0, Drift::angle)
	}

	pub fn pivot(&self) -> (f64, f64) {
		self.pivot
	}

	pub fn graph_to_screen(&self, gx: f64, gy: f64) -> (f64, f64) {
		rotate_about(self.transform.apply(gx, gy), self.pivot, self.drift_angle())
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		let (ux, uy) = rotate_about((sx, sy), self.pivot, -self.drift_angle());
		self.transform.invert(ux, uy)
	}

	pub fn node_radius(&self, idx: usize) -> f64 {
		let links = self.sim.nodes().get(idx).map_or(0, |n| n.node.link_count);
		self.config.base_node_radius + (links as f64).sqrt() * 1.5
	}

	/// Nearest node whose disk (plus [`HIT_PADDING`]) contains the point.
	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<usize> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		let mut found: Option<(usize, f64)> = None;
		for (idx, node) in self.sim.nodes().iter().enumerate() {
			let dist = ((node.x - gx).powi(2) + (node.y - gy).powi(2)).sqrt();
			if dist < self.node_radius(idx) + HIT_PADDING && found.is_none_or(|(_, best)| dist < best) {
				found = Some((idx, dist));
			}
		}
		found.map(|(idx, _)| idx)
	}

	pub fn hovered_node(&self) -> Option<&GraphNode> {
		self.hover.node.and_then(|idx| self.sim.nodes().get(idx)).map(|n| &n.node)
	}

	/// Set the single hovered node. Returns whether it changed.
	pub fn set_hover(&mut self, node: Option<usize>) -> bool {
		if self.hover.node == node {
			return false;
		}
		self.hover.node = node;
		self.hover.neighbors.clear();
		if let Some(idx) = node {
			for (src, tgt) in self.sim.links() {
				if src == idx {
					self.hover.neighbors.insert(tgt);
				} else if tgt == idx {
					self.hover.neighbors.insert(src);
				}
			}
		}
		true
	}

	pub fn is_highlighted(&self, idx: usize) -> bool {
		self.hover.node == Some(idx) || self.hover.neighbors.contains(&idx)
	}

	fn interrupt_drift(&mut self, now: f64) {
		if let Some(drift) = self.drift.as_mut() {
			drift.interrupt(now);
		}
	}

	/// Press: grab a node (pin and reheat) or start panning.
	pub fn pointer_down(&mut self, sx: f64, sy: f64, now: f64) {
		self.interrupt_drift(now);
		if let Some(idx) = self.node_at_position(sx, sy) {
			let (gx, gy) = self.screen_to_graph(sx, sy);
			let node = &self.sim.nodes()[idx];
			let (nx, ny) = (node.x, node.y);
			self.drag = DragState {
				active: true,
				node_idx: Some(idx),
				start_x: sx,
				start_y: sy,
				grab_dx: nx - gx,
				grab_dy: ny - gy,
				moved: false,
			};
			self.sim.pin(idx, nx, ny);
			self.sim.reheat();
		} else {
			self.pan = PanState {
				active: true,
				start_x: sx,
				start_y: sy,
				transform_start_x: self.transform.x,
				transform_start_y: self.transform.y,
			};
		}
	}

	/// Pointer motion: move the pinned node, pan, or update hover.
	/// Returns whether the hovered node changed.
	pub fn pointer_move(&mut self, sx: f64, sy: f64, now: f64) -> bool {
		if self.drag.active {
			self.interrupt_drift(now);
			if (sx - self.drag.start_x).hypot(sy - self.drag.start_y) > CLICK_SLOP {
				self.drag.moved = true;
			}
			if let Some(idx) = self.drag.node_idx {
				let (gx, gy) = self.screen_to_graph(sx, sy);
				self.sim.pin(idx, gx + self.drag.grab_dx, gy + self.drag.grab_dy);
			}
			false
		} else if self.pan.active {
			self.interrupt_drift(now);
			// translation commutes with the rotation about the centroid
			self.transform.x = self.pan.transform_start_x + (sx - self.pan.start_x);
			self.transform.y = self.pan.transform_start_y + (sy - self.pan.start_y);
			self.refresh_pivot();
			false
		} else {
			let hovered = self.node_at_position(sx, sy);
			self.set_hover(hovered)
		}
	}

	/// Release. Returns `(id, title)` when the press was a click on a node.
	pub fn pointer_up(&mut self, now: f64) -> Option<(String, String)> {
		let mut clicked = None;
		if self.drag.active || self.pan.active {
			self.interrupt_drift(now);
		}
		if self.drag.active {
			if let Some(idx) = self.drag.node_idx {
				self.sim.release(idx);
				self.sim.cool();
				if !self.drag.moved {
					let node = &self.sim.nodes()[idx].node;
					clicked = Some((node.id.clone(), node.title.clone()));
				}
			}
		}
		self.drag = DragState::default();
		self.pan.active = false;
		clicked
	}

	/// Pointer left the canvas: end any gesture and clear hover.
	pub fn pointer_leave(&mut self, now: f64) {
		self.pointer_up(now);
		self.set_hover(None);
	}

	/// Wheel zoom about the pointer, clamped to the configured range.
	pub fn wheel(&mut self, sx: f64, sy: f64, delta_y: f64, now: f64) {
		self.interrupt_drift(now);
		let factor = if delta_y > 0.0 { WHEEL_ZOOM_OUT } else { WHEEL_ZOOM_IN };
		let (min, max) = (self.config.min_zoom, self.config.max_zoom);
		let Some((cx, cy)) = self.centroid() else {
			// nothing to rotate about; the pivot stays put
			let (ux, uy) = rotate_about((sx, sy), self.pivot, -self.drift_angle());
			self.transform.zoom_about(ux, uy, factor, min, max);
			return;
		};
		self.refresh_pivot();
		let (gx, gy) = self.screen_to_graph(sx, sy);
		// screen(g) = T(c) + R * k * (g - c); keep screen(g) at the pointer
		let k = (self.transform.k * factor).clamp(min, max);
		let (ox, oy) = rotate_about((k * (gx - cx), k * (gy - cy)), (0.0, 0.0), self.drift_angle());
		self.transform = ViewTransform {
			x: sx - k * cx - ox,
			y: sy - k * cy - oy,
			k,
		};
		self.refresh_pivot();
	}

	/// New viewport size. Positions are kept; only the centering point moves.
	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
		self.sim.set_center((width / 2.0, height / 2.0));
	}

	/// Switch between compact and expanded density.
	pub fn set_expanded(&mut self, expanded: bool) {
		self.expanded = expanded;
		let center = self.sim.params().center;
		self.sim.set_params(LayoutParams::for_density(expanded, center));
	}

	/// Frame callback: drift, physics, hover easing, and the rotation pivot.
	/// `now` is the animation-frame timestamp in ms.
	pub fn tick(&mut self, now: f64) {
		let dt = self.last_frame.map_or(0.016, |last| ((now - last) / 1000.0).clamp(0.0, 0.1));
		self.last_frame = Some(now);

		if let Some(drift) = self.drift.as_mut() {
			drift.advance(now);
		}
		self.sim.tick();
		self.flow_time += dt;

		let target = if self.hover.node.is_some() { 1.0 } else { 0.0 };
		self.hover.highlight_t += (target - self.hover.highlight_t) * (1.5 * dt * 10.0).min(1.0);

		self.refresh_pivot();
	}

	fn centroid(&self) -> Option<(f64, f64)> {
		let nodes = self.sim.nodes();
		if nodes.is_empty() {
			return None;
		}
		let n = nodes.len() as f64;
		let (sx, sy) = nodes.iter().fold((0.0, 0.0), |(sx, sy), node| (sx + node.x, sy + node.y));
		Some((sx / n, sy / n))
	}

	/// Rotation pivot: the node centroid in screen space.
	fn refresh_pivot(&mut self) {
		if let Some((cx, cy)) = self.centroid() {
			self.pivot = self.transform.apply(cx, cy);
		}
	}

	/// Label lines for a node, wrapped to the configured budget.
	pub fn label_lines(&self, idx: usize) -> Vec<String> {
		self.sim
			.nodes()
			.get(idx)
			.map(|n| wrap_label(&n.node.title, self.config.label_budget))
			.unwrap_or_default()
	}

	pub fn label_alpha(&self, idx: usize) -> f64 {
		let links = self.sim.nodes().get(idx).map_or(0, |n| n.node.link_count);
		label_opacity(links, self.max_link_count)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::graph::GraphEdge;
	use std::collections::BTreeSet;

	fn snapshot() -> GraphSnapshot {
		let node = |id: &str, ws: &str, links: u32| GraphNode {
			id: id.into(),
			title: format!("Page {id}"),
			workspace: ws.into(),
			tags: BTreeSet::new(),
			link_count: links,
		};
		GraphSnapshot {
			nodes: vec![node("a", "work", 2), node("b", "home", 1), node("c", "work", 1)],
			edges: vec![
				GraphEdge {
					source: "a".into(),
					target: "b".into(),
				},
				GraphEdge {
					source: "a".into(),
					target: "c".into(),
				},
			],
		}
	}

	fn still_config() -> GraphViewConfig {
		GraphViewConfig {
			drift: false,
			..GraphViewConfig::default()
		}
	}

	fn state(config: &GraphViewConfig) -> ForceGraphState {
		let mut s = ForceGraphState::new(&snapshot(), 800.0, 600.0, config);
		s.sim.place(0, 100.0, 100.0);
		s.sim.place(1, 300.0, 100.0);
		s.sim.place(2, 100.0, 300.0);
		s
	}

	#[test]
	fn screen_and_graph_coordinates_invert_under_rotation() {
		let mut s = state(&GraphViewConfig::default());
		s.transform = ViewTransform {
			x: 40.0,
			y: -10.0,
			k: 1.7,
		};
		for frame in 0..200 {
			s.tick(frame as f64 * 16.0);
		}
		assert!(s.drift_angle() > 0.0);
		let (sx, sy) = s.graph_to_screen(123.0, -45.0);
		let (gx, gy) = s.screen_to_graph(sx, sy);
		assert!((gx - 123.0).abs() < 1e-9 && (gy + 45.0).abs() < 1e-9);
	}

	#[test]
	fn hit_test_picks_the_nearest_node() {
		let s = state(&still_config());
		assert_eq!(s.node_at_position(102.0, 101.0), Some(0));
		assert_eq!(s.node_at_position(298.0, 100.0), Some(1));
		assert_eq!(s.node_at_position(500.0, 500.0), None);
	}

	#[test]
	fn drag_pins_tracks_pointer_and_releases_in_place() {
		let mut s = state(&still_config());
		s.transform = ViewTransform {
			x: 50.0,
			y: 20.0,
			k: 2.0,
		};
		let (sx, sy) = s.graph_to_screen(300.0, 100.0);
		s.pointer_down(sx, sy, 0.0);
		assert!(s.drag.active);
		assert!(s.sim.nodes()[1].is_pinned());

		// 40px on screen at 2x zoom is 20 graph units
		s.pointer_move(sx + 40.0, sy, 10.0);
		assert_eq!(s.sim.nodes()[1].fx, Some(320.0));
		s.tick(16.0);
		assert_eq!(s.sim.nodes()[1].x, 320.0);

		assert_eq!(s.pointer_up(20.0), None);
		let node = &s.sim.nodes()[1];
		assert!(!node.is_pinned());
		assert_eq!((node.x, node.y), (320.0, 100.0));
	}

	#[test]
	fn drag_reheats_and_release_cools() {
		let mut s = state(&still_config());
		let mut frame = 0.0;
		while !s.sim.is_settled() {
			frame += 16.0;
			s.tick(frame);
		}
		let a = &s.sim.nodes()[0];
		let (sx, sy) = s.graph_to_screen(a.x, a.y);
		s.pointer_down(sx, sy, frame);
		assert!(s.drag.active);
		s.tick(frame + 16.0);
		assert!(!s.sim.is_settled());
		s.pointer_up(frame + 32.0);
		for i in 0..2000 {
			s.tick(frame + 48.0 + i as f64 * 16.0);
		}
		assert!(s.sim.is_settled());
	}

	#[test]
	fn click_without_motion_navigates() {
		let mut s = state(&still_config());
		s.pointer_down(100.0, 100.0, 0.0);
		s.pointer_move(101.0, 101.0, 5.0);
		assert_eq!(
			s.pointer_up(10.0),
			Some(("a".to_string(), "Page a".to_string()))
		);
	}

	#[test]
	fn background_press_pans() {
		let mut s = state(&still_config());
		s.pointer_down(500.0, 500.0, 0.0);
		assert!(s.pan.active);
		s.pointer_move(530.0, 480.0, 5.0);
		assert_eq!((s.transform.x, s.transform.y), (30.0, -20.0));
		assert_eq!(s.pointer_up(10.0), None);
		assert!(!s.pan.active);
	}

	#[test]
	fn zoom_is_clamped() {
		let mut s = state(&still_config());
		for _ in 0..100 {
			s.wheel(400.0, 300.0, -1.0, 0.0);
		}
		assert_eq!(s.transform.k, 4.0);
		for _ in 0..200 {
			s.wheel(400.0, 300.0, 1.0, 0.0);
		}
		assert_eq!(s.transform.k, 0.1);
	}

	#[test]
	fn wheel_keeps_the_point_under_the_pointer() {
		let mut s = state(&still_config());
		let before = s.screen_to_graph(250.0, 170.0);
		s.wheel(250.0, 170.0, -1.0, 0.0);
		let after = s.screen_to_graph(250.0, 170.0);
		assert!((before.0 - after.0).abs() < 1e-9 && (before.1 - after.1).abs() < 1e-9);
	}

	/// Settled layout viewed upside down: drift steps by pi on the first frame.
	fn half_turned() -> ForceGraphState {
		let config = GraphViewConfig {
			drift_step: std::f64::consts::PI,
			..GraphViewConfig::default()
		};
		let mut s = state(&config);
		s.sim.stop();
		s.tick(0.0);
		assert!((s.drift_angle() - std::f64::consts::PI).abs() < 1e-12);
		s
	}

	#[test]
	fn pan_follows_the_pointer_while_rotated() {
		let mut s = half_turned();
		let before = s.graph_to_screen(100.0, 100.0);
		s.pointer_down(5.0, 5.0, 10.0);
		assert!(s.pan.active);
		s.pointer_move(35.0, 5.0, 20.0);
		let moved = s.graph_to_screen(100.0, 100.0);
		assert!((moved.0 - (before.0 + 30.0)).abs() < 1e-9 && (moved.1 - before.1).abs() < 1e-9);
		s.tick(30.0);
		let settled = s.graph_to_screen(100.0, 100.0);
		assert!((settled.0 - moved.0).abs() < 1e-9 && (settled.1 - moved.1).abs() < 1e-9);
	}

	#[test]
	fn rotated_wheel_keeps_the_point_under_the_pointer_across_ticks() {
		let mut s = half_turned();
		let anchor = s.screen_to_graph(150.0, 420.0);
		s.wheel(150.0, 420.0, -1.0, 10.0);
		for frame in 1..5 {
			s.tick(10.0 + frame as f64 * 16.0);
			let (sx, sy) = s.graph_to_screen(anchor.0, anchor.1);
			assert!((sx - 150.0).abs() < 1e-9 && (sy - 420.0).abs() < 1e-9);
		}
		assert!((s.transform.k - 1.1).abs() < 1e-12);
	}

	#[test]
	fn pointer_down_pauses_drift_until_quiet_period() {
		let mut s = state(&GraphViewConfig::default());
		let mut now = 0.0;
		for _ in 0..10 {
			now += 16.0;
			s.tick(now);
		}
		let held = s.drift_angle();
		s.pointer_down(700.0, 550.0, now);
		while now + 16.0 < 1000.0 + 160.0 {
			now += 16.0;
			s.tick(now);
			assert_eq!(s.drift_angle(), held);
		}
		s.pointer_up(now);
		let released = now;
		while now + 16.0 < released + 1000.0 {
			now += 16.0;
			s.tick(now);
			assert_eq!(s.drift_angle(), held);
		}
		s.tick(released + 1000.0);
		let step = GraphViewConfig::default().drift_step;
		assert!((s.drift_angle() - (held + step)).abs() < 1e-12);
	}

	#[test]
	fn hover_is_single_and_highlights_neighbors() {
		let mut s = state(&still_config());
		assert!(s.pointer_move(100.0, 100.0, 0.0));
		assert_eq!(s.hovered_node().map(|n| n.id.as_str()), Some("a"));
		assert!(s.is_highlighted(1) && s.is_highlighted(2));
		assert!(!s.pointer_move(101.0, 100.0, 1.0));
		assert!(s.pointer_move(300.0, 100.0, 2.0));
		assert_eq!(s.hovered_node().map(|n| n.id.as_str()), Some("b"));
		assert!(!s.is_highlighted(2));
		s.pointer_leave(3.0);
		assert!(s.hovered_node().is_none());
	}

	#[test]
	fn resize_keeps_positions_and_moves_center() {
		let mut s = state(&still_config());
		let before: Vec<(f64, f64)> = s.sim.nodes().iter().map(|n| (n.x, n.y)).collect();
		s.resize(1200.0, 900.0);
		let after: Vec<(f64, f64)> = s.sim.nodes().iter().map(|n| (n.x, n.y)).collect();
		assert_eq!(before, after);
		assert_eq!(s.sim.params().center, (600.0, 450.0));
		assert_eq!((s.width, s.height), (1200.0, 900.0));
	}

	#[test]
	fn expanded_density_doubles_link_distance() {
		let mut s = state(&still_config());
		s.set_expanded(true);
		assert_eq!(s.sim.params().link_distance, 120.0);
		s.set_expanded(false);
		assert_eq!(s.sim.params().link_distance, 60.0);
	}

	#[test]
	fn replacing_keeps_view_and_shared_positions() {
		let mut old = state(&still_config());
		old.transform.k = 2.5;
		old.set_expanded(true);
		let next = ForceGraphState::replacing(old, &snapshot());
		assert_eq!(next.transform.k, 2.5);
		assert!(next.expanded);
		assert!(!next.sim.is_stopped());
		assert_eq!((next.sim.nodes()[1].x, next.sim.nodes()[1].y), (300.0, 100.0));
	}

	#[test]
	fn teardown_stops_the_simulation() {
		let mut s = state(&still_config());
		s.teardown();
		assert!(s.sim.is_stopped());
		assert!(!s.sim.tick());
	}

	#[test]
	fn palette_and_labels_follow_the_snapshot() {
		let s = state(&still_config());
		assert_ne!(s.palette.color("work"), s.palette.color("home"));
		assert_eq!(s.label_lines(0), vec!["Page a"]);
		assert!(s.label_alpha(0) > s.label_alpha(1));
	}
}

//! Force-directed layout.
//!
//! Semi-implicit Euler over an array of nodes. Each tick applies a link
//! spring, pairwise charge, a centering shift and disk collision, scaled by a
//! cooling `alpha`. Pinned nodes still receive forces but are written back to
//! their pin every tick.

use std::collections::HashMap;
use std::f64::consts::PI;

use crate::graph::{GraphNode, GraphSnapshot};

pub const ALPHA_MIN: f64 = 0.001;
/// Alpha target while a node is being dragged.
pub const ACTIVE_ALPHA: f64 = 0.3;
const VELOCITY_DECAY: f64 = 0.4;
const CENTER_STRENGTH: f64 = 0.1;
const COLLIDE_STRENGTH: f64 = 0.7;
const DISTANCE_MIN2: f64 = 1.0;
const SEED_RADIUS: f64 = 100.0;

/// Force parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutParams {
	pub link_distance: f64,
	/// Negative repels.
	pub charge_strength: f64,
	pub center: (f64, f64),
	pub collision_radius: f64,
}

impl LayoutParams {
	pub fn compact(center: (f64, f64)) -> Self {
		Self {
			link_distance: 60.0,
			charge_strength: -120.0,
			center,
			collision_radius: 12.0,
		}
	}

	/// Twice the spacing of [`LayoutParams::compact`], for large graphs.
	pub fn expanded(center: (f64, f64)) -> Self {
		let compact = Self::compact(center);
		Self {
			link_distance: compact.link_distance * 2.0,
			charge_strength: compact.charge_strength * 2.0,
			collision_radius: compact.collision_radius * 2.0,
			center,
		}
	}

	pub fn for_density(expanded: bool, center: (f64, f64)) -> Self {
		if expanded {
			Self::expanded(center)
		} else {
			Self::compact(center)
		}
	}
}

/// A graph node with layout state.
#[derive(Clone, Debug)]
pub struct SimulationNode {
	pub node: GraphNode,
	pub x: f64,
	pub y: f64,
	pub vx: f64,
	pub vy: f64,
	pub fx: Option<f64>,
	pub fy: Option<f64>,
}

impl SimulationNode {
	pub fn is_pinned(&self) -> bool {
		self.fx.is_some() || self.fy.is_some()
	}
}

#[derive(Clone, Copy, Debug)]
struct Link {
	source: usize,
	target: usize,
	strength: f64,
	bias: f64,
}

/// Linear congruential generator for the sub-pixel jiggle that separates
/// coincident nodes. Deterministic so layouts are reproducible.
#[derive(Clone, Debug)]
struct Lcg(u64);

impl Lcg {
	fn next(&mut self) -> f64 {
		self.0 = (1_664_525 * self.0 + 1_013_904_223) % 4_294_967_296;
		self.0 as f64 / 4_294_967_296.0
	}

	fn jiggle(&mut self) -> f64 {
		(self.next() - 0.5) * 1e-6
	}
}

/// A running layout over one snapshot.
pub struct Simulation {
	nodes: Vec<SimulationNode>,
	links: Vec<Link>,
	index: HashMap<String, usize>,
	params: LayoutParams,
	alpha: f64,
	alpha_target: f64,
	alpha_decay: f64,
	stopped: bool,
	rng: Lcg,
}

impl Simulation {
	/// Seed nodes on a circle around the center and connect them. Edges with
	/// an endpoint outside the node set are skipped.
	pub fn new(snapshot: &GraphSnapshot, params: LayoutParams) -> Self {
		let n = snapshot.nodes.len();
		let mut index = HashMap::with_capacity(n);
		let nodes: Vec<SimulationNode> = snapshot
			.nodes
			.iter()
			.enumerate()
			.map(|(i, node)| {
				index.insert(node.id.clone(), i);
				let angle = (i as f64) * 2.0 * PI / n as f64;
				SimulationNode {
					node: node.clone(),
					x: params.center.0 + SEED_RADIUS * angle.cos(),
					y: params.center.1 + SEED_RADIUS * angle.sin(),
					vx: 0.0,
					vy: 0.0,
					fx: None,
					fy: None,
				}
			})
			.collect();

		let pairs: Vec<(usize, usize)> = snapshot
			.edges
			.iter()
			.filter_map(|e| Some((*index.get(&e.source)?, *index.get(&e.target)?)))
			.filter(|(s, t)| s != t)
			.collect();
		let mut count = vec![0usize; n];
		for &(s, t) in &pairs {
			count[s] += 1;
			count[t] += 1;
		}
		let links = pairs
			.into_iter()
			.map(|(source, target)| Link {
				source,
				target,
				strength: 1.0 / count[source].min(count[target]) as f64,
				bias: count[source] as f64 / (count[source] + count[target]) as f64,
			})
			.collect();

		Self {
			nodes,
			links,
			index,
			params,
			alpha: 1.0,
			alpha_target: 0.0,
			alpha_decay: 1.0 - ALPHA_MIN.powf(1.0 / 300.0),
			stopped: false,
			rng: Lcg(1),
		}
	}

	/// Take positions and velocities from a previous layout for every node
	/// that exists in both, so a refresh does not jump.
	pub fn seed_from(&mut self, previous: &Simulation) {
		for prev in &previous.nodes {
			if let Some(&i) = self.index.get(&prev.node.id) {
				let node = &mut self.nodes[i];
				node.x = prev.x;
				node.y = prev.y;
				node.vx = prev.vx;
				node.vy = prev.vy;
			}
		}
	}

	pub fn nodes(&self) -> &[SimulationNode] {
		&self.nodes
	}

	#[cfg(test)]
	pub fn node_index(&self, id: &str) -> Option<usize> {
		self.index.get(id).copied()
	}

	/// Connected index pairs, source first.
	pub fn links(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
		self.links.iter().map(|l| (l.source, l.target))
	}

	pub fn params(&self) -> &LayoutParams {
		&self.params
	}

	#[cfg(test)]
	pub fn alpha(&self) -> f64 {
		self.alpha
	}

	pub fn is_stopped(&self) -> bool {
		self.stopped
	}

	/// Cooled below [`ALPHA_MIN`] with nothing holding it warm.
	pub fn is_settled(&self) -> bool {
		self.alpha < ALPHA_MIN && self.alpha_target < ALPHA_MIN
	}

	/// Keep alpha warm until [`Simulation::cool`].
	pub fn reheat(&mut self) {
		self.alpha_target = ACTIVE_ALPHA;
	}

	pub fn cool(&mut self) {
		self.alpha_target = 0.0;
	}

	/// Halt for good. Further ticks do nothing.
	pub fn stop(&mut self) {
		if !self.stopped {
			log::debug!("simulation stopped ({} nodes)", self.nodes.len());
		}
		self.stopped = true;
	}

	/// Move the centering point, e.g. on resize, and let the layout re-settle.
	pub fn set_center(&mut self, center: (f64, f64)) {
		self.params.center = center;
		self.alpha = self.alpha.max(ACTIVE_ALPHA);
	}

	/// Swap force parameters (density toggle) and restart cooling.
	pub fn set_params(&mut self, params: LayoutParams) {
		self.params = params;
		self.alpha = 1.0;
	}

	pub fn place(&mut self, idx: usize, x: f64, y: f64) {
		if let Some(node) = self.nodes.get_mut(idx) {
			node.x = x;
			node.y = y;
			node.vx = 0.0;
			node.vy = 0.0;
		}
	}

	/// Fix a node at `(x, y)` until released.
	pub fn pin(&mut self, idx: usize, x: f64, y: f64) {
		if let Some(node) = self.nodes.get_mut(idx) {
			node.fx = Some(x);
			node.fy = Some(y);
		}
	}

	/// Clear a pin. The node carries on from where it was last drawn.
	pub fn release(&mut self, idx: usize) {
		if let Some(node) = self.nodes.get_mut(idx) {
			node.fx = None;
			node.fy = None;
		}
	}

	/// Advance one step. Returns `false` when nothing moved because the
	/// simulation is stopped or settled.
	pub fn tick(&mut self) -> bool {
		if self.stopped || self.is_settled() {
			return false;
		}
		self.alpha += (self.alpha_target - self.alpha) * self.alpha_decay;

		let Self {
			nodes,
			links,
			params,
			alpha,
			rng,
			..
		} = self;
		apply_links(nodes, links, params.link_distance, *alpha, rng);
		apply_charge(nodes, params.charge_strength, *alpha, rng);
		apply_center(nodes, params.center);
		apply_collision(nodes, params.collision_radius, rng);

		for node in nodes.iter_mut() {
			match (node.fx, node.fy) {
				(Some(fx), Some(fy)) => {
					node.x = fx;
					node.y = fy;
					node.vx = 0.0;
					node.vy = 0.0;
				}
				_ => {
					node.vx *= 1.0 - VELOCITY_DECAY;
					node.vy *= 1.0 - VELOCITY_DECAY;
					node.x += node.vx;
					node.y += node.vy;
				}
			}
		}
		true
	}
}

fn nonzero(v: f64, rng: &mut Lcg) -> f64 {
	if v == 0.0 { rng.jiggle() } else { v }
}

fn apply_links(nodes: &mut [SimulationNode], links: &[Link], distance: f64, alpha: f64, rng: &mut Lcg) {
	for link in links {
		let (s, t) = (&nodes[link.source], &nodes[link.target]);
		let x = nonzero(t.x + t.vx - s.x - s.vx, rng);
		let y = nonzero(t.y + t.vy - s.y - s.vy, rng);
		let l = (x * x + y * y).sqrt();
		let k = (l - distance) / l * alpha * link.strength;
		let (x, y) = (x * k, y * k);

		let t = &mut nodes[link.target];
		t.vx -= x * link.bias;
		t.vy -= y * link.bias;
		let s = &mut nodes[link.source];
		s.vx += x * (1.0 - link.bias);
		s.vy += y * (1.0 - link.bias);
	}
}

fn apply_charge(nodes: &mut [SimulationNode], strength: f64, alpha: f64, rng: &mut Lcg) {
	if strength == 0.0 {
		return;
	}
	let positions: Vec<(f64, f64)> = nodes.iter().map(|n| (n.x, n.y)).collect();
	for (i, node) in nodes.iter_mut().enumerate() {
		for (j, &(ox, oy)) in positions.iter().enumerate() {
			if i == j {
				continue;
			}
			let x = nonzero(ox - node.x, rng);
			let y = nonzero(oy - node.y, rng);
			let mut l = x * x + y * y;
			if l < DISTANCE_MIN2 {
				l = (DISTANCE_MIN2 * l).sqrt();
			}
			let w = strength * alpha / l;
			node.vx += x * w;
			node.vy += y * w;
		}
	}
}

fn apply_center(nodes: &mut [SimulationNode], (cx, cy): (f64, f64)) {
	if nodes.is_empty() {
		return;
	}
	let n = nodes.len() as f64;
	let (sx, sy) = nodes.iter().fold((0.0, 0.0), |(sx, sy), node| (sx + node.x, sy + node.y));
	let (dx, dy) = ((sx / n - cx) * CENTER_STRENGTH, (sy / n - cy) * CENTER_STRENGTH);
	for node in nodes.iter_mut() {
		node.x -= dx;
		node.y -= dy;
	}
}

fn apply_collision(nodes: &mut [SimulationNode], radius: f64, rng: &mut Lcg) {
	let r = radius * 2.0;
	for i in 0..nodes.len() {
		for j in (i + 1)..nodes.len() {
			let (a, b) = (&nodes[i], &nodes[j]);
			let x = (a.x + a.vx) - (b.x + b.vx);
			let y = (a.y + a.vy) - (b.y + b.vy);
			let l2 = x * x + y * y;
			if l2 >= r * r {
				continue;
			}
			let (x, y) = (nonzero(x, rng), nonzero(y, rng));
			let l = (x * x + y * y).sqrt();
			let k = (r - l) / l * COLLIDE_STRENGTH * 0.5;
			let (x, y) = (x * k, y * k);
			nodes[i].vx += x;
			nodes[i].vy += y;
			nodes[j].vx -= x;
			nodes[j].vy -= y;
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::graph::GraphEdge;
	use std::collections::BTreeSet;

	fn snapshot(ids: &[&str], edges: &[(&str, &str)]) -> GraphSnapshot {
		GraphSnapshot {
			nodes: ids
				.iter()
				.map(|id| GraphNode {
					id: id.to_string(),
					title: id.to_string(),
					workspace: "default".into(),
					tags: BTreeSet::new(),
					link_count: 0,
				})
				.collect(),
			edges: edges
				.iter()
				.map(|(s, t)| GraphEdge {
					source: s.to_string(),
					target: t.to_string(),
				})
				.collect(),
		}
	}

	fn distance(sim: &Simulation, a: usize, b: usize) -> f64 {
		let (a, b) = (&sim.nodes()[a], &sim.nodes()[b]);
		((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt()
	}

	fn run_until_settled(sim: &mut Simulation) -> usize {
		let mut ticks = 0;
		while sim.tick() {
			ticks += 1;
			assert!(ticks < 10_000, "simulation never settled");
		}
		ticks
	}

	#[test]
	fn expanded_doubles_spacing() {
		let compact = LayoutParams::compact((0.0, 0.0));
		let expanded = LayoutParams::for_density(true, (0.0, 0.0));
		assert_eq!(expanded.link_distance, compact.link_distance * 2.0);
		assert_eq!(expanded.charge_strength, compact.charge_strength * 2.0);
		assert_eq!(expanded.collision_radius, compact.collision_radius * 2.0);
	}

	#[test]
	fn dangling_edges_never_reach_the_layout() {
		let sim = Simulation::new(&snapshot(&["a", "b"], &[("a", "b"), ("a", "c")]), LayoutParams::compact((0.0, 0.0)));
		assert_eq!(sim.links().collect::<Vec<_>>(), vec![(0, 1)]);
		assert!(sim.node_index("c").is_none());
	}

	#[test]
	fn link_force_converges_to_link_distance() {
		let params = LayoutParams {
			charge_strength: 0.0,
			..LayoutParams::compact((0.0, 0.0))
		};
		let mut sim = Simulation::new(&snapshot(&["a", "b"], &[("a", "b")]), params);
		assert!((distance(&sim, 0, 1) - 200.0).abs() < 1e-9);
		run_until_settled(&mut sim);
		assert!((distance(&sim, 0, 1) - params.link_distance).abs() < 6.0);
	}

	#[test]
	fn charge_pushes_unlinked_nodes_apart() {
		let mut sim = Simulation::new(&snapshot(&["a", "b"], &[]), LayoutParams::compact((0.0, 0.0)));
		for _ in 0..10 {
			sim.tick();
		}
		assert!(distance(&sim, 0, 1) > 200.0);
	}

	#[test]
	fn collision_separates_overlapping_nodes() {
		let params = LayoutParams {
			charge_strength: 0.0,
			..LayoutParams::compact((0.0, 0.0))
		};
		let mut sim = Simulation::new(&snapshot(&["a", "b"], &[]), params);
		sim.place(0, 0.0, 0.0);
		sim.place(1, 5.0, 0.0);
		for _ in 0..60 {
			sim.tick();
		}
		assert!(distance(&sim, 0, 1) > params.collision_radius * 2.0 * 0.9);
	}

	#[test]
	fn centering_follows_a_moved_center() {
		let mut sim = Simulation::new(&snapshot(&["a", "b", "c"], &[]), LayoutParams::compact((0.0, 0.0)));
		sim.set_center((300.0, 200.0));
		run_until_settled(&mut sim);
		let n = sim.nodes().len() as f64;
		let mx = sim.nodes().iter().map(|n| n.x).sum::<f64>() / n;
		let my = sim.nodes().iter().map(|n| n.y).sum::<f64>() / n;
		assert!((mx - 300.0).abs() < 1.0, "mean x {mx}");
		assert!((my - 200.0).abs() < 1.0, "mean y {my}");
	}

	#[test]
	fn pinned_node_holds_and_release_does_not_snap() {
		let mut sim = Simulation::new(&snapshot(&["a", "b"], &[("a", "b")]), LayoutParams::compact((0.0, 0.0)));
		sim.pin(0, 40.0, -25.0);
		for _ in 0..20 {
			sim.tick();
			let a = &sim.nodes()[0];
			assert_eq!((a.x, a.y), (40.0, -25.0));
		}
		sim.release(0);
		assert!(!sim.nodes()[0].is_pinned());
		assert_eq!((sim.nodes()[0].x, sim.nodes()[0].y), (40.0, -25.0));
		sim.tick();
		let a = &sim.nodes()[0];
		assert!((a.x - 40.0).abs() < 50.0 && (a.y + 25.0).abs() < 50.0);
	}

	#[test]
	fn reheat_wakes_a_settled_layout_until_cooled() {
		let mut sim = Simulation::new(&snapshot(&["a", "b"], &[("a", "b")]), LayoutParams::compact((0.0, 0.0)));
		run_until_settled(&mut sim);
		assert!(sim.is_settled());
		assert!(!sim.tick());

		sim.reheat();
		let before = sim.alpha();
		for _ in 0..30 {
			assert!(sim.tick());
		}
		assert!(sim.alpha() > before);

		sim.cool();
		run_until_settled(&mut sim);
		assert!(sim.alpha() < ALPHA_MIN);
	}

	#[test]
	fn stop_halts_ticking() {
		let mut sim = Simulation::new(&snapshot(&["a", "b"], &[("a", "b")]), LayoutParams::compact((0.0, 0.0)));
		sim.tick();
		sim.stop();
		let before: Vec<(f64, f64)> = sim.nodes().iter().map(|n| (n.x, n.y)).collect();
		sim.reheat();
		assert!(!sim.tick());
		let after: Vec<(f64, f64)> = sim.nodes().iter().map(|n| (n.x, n.y)).collect();
		assert_eq!(before, after);
		assert!(sim.is_stopped());
	}

	#[test]
	fn seed_from_keeps_shared_positions() {
		let mut old = Simulation::new(&snapshot(&["a", "b"], &[("a", "b")]), LayoutParams::compact((0.0, 0.0)));
		old.place(1, 7.0, 8.0);
		let mut fresh = Simulation::new(&snapshot(&["b", "c"], &[]), LayoutParams::compact((0.0, 0.0)));
		fresh.seed_from(&old);
		let b = &fresh.nodes()[fresh.node_index("b").unwrap()];
		assert_eq!((b.x, b.y), (7.0, 8.0));
	}

	#[test]
	fn empty_snapshot_is_harmless() {
		let mut sim = Simulation::new(&GraphSnapshot::empty(), LayoutParams::compact((0.0, 0.0)));
		assert!(sim.tick());
		assert!(sim.nodes().is_empty());
	}
}

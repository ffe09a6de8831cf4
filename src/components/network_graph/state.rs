use std::collections::{HashMap, HashSet};
use std::f64::consts::PI;

use force_graph::{DefaultNodeIdx, EdgeData, ForceGraph, NodeData, SimulationParameters};
use log::debug;

use super::style::{EdgeStyle, NodeStyle, edge_style, node_style};
use crate::model::{Entity, GraphData};

pub const HIT_RADIUS: f64 = 12.0;
/// Pointer travel (px) after which a press on a node is a drag, not a click.
const CLICK_SLOP: f64 = 3.0;
const MIN_ZOOM: f64 = 0.1;
const MAX_ZOOM: f64 = 10.0;

/// Pull of every node toward the canvas centre, per axis.
const CENTER_STRENGTH: f64 = 0.15;
const CHARGE_STRENGTH: f32 = 80.0;
/// Per-node collision radius; two nodes keep at least twice this apart.
const COLLIDE_RADIUS: f64 = 30.0;
const LINK_DISTANCE: f64 = 40.0;
const LINK_STIFFNESS: f64 = 1.5;
const VELOCITY_DECAY: f32 = 0.35;
const ALPHA_DECAY: f64 = 0.015;
const ALPHA_MIN: f64 = 0.001;
const COOLDOWN_TICKS: u32 = 200;

/// What a change of inputs means for the running layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Relayout {
	/// The node set changed: start a fresh simulation.
	Rebuild,
	/// Same node set, but attributes or links changed: swap the data in and
	/// keep every node where it is.
	Refresh,
	/// Only the canvas size changed: recentre and reheat.
	Reheat,
	Keep,
}

/// Remembers the graph and canvas size the layout was last synced to.
#[derive(Clone, Debug, Default)]
pub struct LayoutTracker {
	signature: Option<String>,
	graph: Option<GraphData>,
	size: Option<(f64, f64)>,
}

impl LayoutTracker {
	pub fn observe(&mut self, graph: &GraphData, width: f64, height: f64) -> Relayout {
		let signature = graph.signature();
		let size = Some((width, height));
		let decision = if self.signature.as_ref() != Some(&signature) {
			Relayout::Rebuild
		} else if self.graph.as_ref() != Some(graph) {
			Relayout::Refresh
		} else if self.size != size {
			Relayout::Reheat
		} else {
			return Relayout::Keep;
		};
		self.signature = Some(signature);
		self.graph = Some(graph.clone());
		self.size = size;
		decision
	}
}

/// Position and pin of a node carried over from a previous layout.
type Placement = (f32, f32, bool);

fn build_graph(data: &GraphData, placed: &HashMap<String, Placement>) -> (ForceGraph<NodeInfo, ()>, Vec<EdgeInfo>) {
	let mut graph = ForceGraph::new(SimulationParameters {
		force_charge: CHARGE_STRENGTH,
		force_spring: 0.05,
		force_max: 100.0,
		node_speed: 3000.0,
		damping_factor: 1.0 - VELOCITY_DECAY,
	});
	let mut id_to_idx = HashMap::new();

	// New nodes start on a circle around the origin; the view transform puts
	// the origin at the canvas centre.
	let count = data.nodes.len().max(1) as f64;
	for (i, entity) in data.nodes.iter().enumerate() {
		let angle = (i as f64) * 2.0 * PI / count;
		let (x, y, is_anchor) = placed.get(&entity.id).copied().unwrap_or((
			(100.0 * angle.cos()) as f32,
			(100.0 * angle.sin()) as f32,
			false,
		));
		let idx = graph.add_node(NodeData {
			x,
			y,
			mass: 10.0,
			is_anchor,
			user_data: NodeInfo {
				style: node_style(entity.category),
				entity: entity.clone(),
			},
		});
		id_to_idx.insert(entity.id.as_str(), (idx, entity.category));
	}

	let mut edges = Vec::with_capacity(data.links.len());
	for link in &data.links {
		let (Some(&(source, from)), Some(&(target, to))) =
			(id_to_idx.get(link.source.as_str()), id_to_idx.get(link.target.as_str()))
		else {
			debug!("skipping link {} -> {}: unknown endpoint", link.source, link.target);
			continue;
		};
		graph.add_edge(source, target, EdgeData::default());
		edges.push(EdgeInfo {
			source,
			target,
			style: edge_style(from, to, link.is_ring_connection()),
		});
	}
	(graph, edges)
}

#[derive(Clone, Debug, Default)]
pub struct NodeInfo {
	pub entity: Entity,
	pub style: NodeStyle,
}

#[derive(Clone, Debug)]
pub struct EdgeInfo {
	pub source: DefaultNodeIdx,
	pub target: DefaultNodeIdx,
	pub style: EdgeStyle,
}

#[derive(Clone, Debug, Default)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub active: bool,
	/// Set once the pointer travelled far enough that release is not a click.
	pub moved: bool,
	pub node_idx: Option<DefaultNodeIdx>,
	pub start_x: f64,
	pub start_y: f64,
	pub node_start_x: f32,
	pub node_start_y: f32,
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
	pub node: Option<DefaultNodeIdx>,
	pub neighbors: HashSet<DefaultNodeIdx>,
	pub highlight_t: f64,
	pub prev_node: Option<DefaultNodeIdx>,
	pub prev_neighbors: HashSet<DefaultNodeIdx>,
	delay_t: f64,
}

pub struct NetworkGraphState {
	pub graph: ForceGraph<NodeInfo, ()>,
	pub transform: ViewTransform,
	pub drag: DragState,
	pub pan: PanState,
	pub hover: HoverState,
	pub width: f64,
	pub height: f64,
	pub edges: Vec<EdgeInfo>,
	alpha: f64,
	ticks: u32,
}

impl NetworkGraphState {
	pub fn new(data: &GraphData, width: f64, height: f64) -> Self {
		let (graph, edges) = build_graph(data, &HashMap::new());
		Self {
			graph,
			edges,
			transform: ViewTransform {
				x: width / 2.0,
				y: height / 2.0,
				k: 1.0,
			},
			drag: DragState::default(),
			pan: PanState::default(),
			hover: HoverState::default(),
			width,
			height,
			alpha: 1.0,
			ticks: 0,
		}
	}

	/// Swap in new entities and links without moving anything. Nodes keep
	/// their position and pin by id and the simulation is not restarted.
	pub fn refresh(&mut self, data: &GraphData) {
		let mut placed = HashMap::new();
		self.graph.visit_nodes(|node| {
			placed.insert(
				node.data.user_data.entity.id.clone(),
				(node.x(), node.y(), node.data.is_anchor),
			);
		});
		(self.graph, self.edges) = build_graph(data, &placed);
		// node indices may have changed
		self.drag = DragState::default();
		self.hover = HoverState::default();
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<DefaultNodeIdx> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		let mut found = None;
		self.graph.visit_nodes(|node| {
			let (dx, dy) = (node.x() as f64 - gx, node.y() as f64 - gy);
			// world-space, scales with zoom like nodes
			if (dx * dx + dy * dy).sqrt() < HIT_RADIUS {
				found = Some(node.index());
			}
		});
		found
	}

	pub fn entity(&self, idx: DefaultNodeIdx) -> Option<Entity> {
		let mut found = None;
		self.graph.visit_nodes(|node| {
			if node.index() == idx {
				found = Some(node.data.user_data.entity.clone());
			}
		});
		found
	}

	pub fn positions(&self) -> HashMap<DefaultNodeIdx, (f64, f64)> {
		let mut out = HashMap::new();
		self.graph.visit_nodes(|node| {
			out.insert(node.index(), (node.x() as f64, node.y() as f64));
		});
		out
	}

	/// Pointer pressed at screen `(x, y)`: grab the node under it, or start panning.
	pub fn press(&mut self, x: f64, y: f64) {
		let Some(idx) = self.node_at_position(x, y) else {
			self.pan = PanState {
				active: true,
				start_x: x,
				start_y: y,
				transform_start_x: self.transform.x,
				transform_start_y: self.transform.y,
			};
			return;
		};
		let mut origin = (0.0, 0.0);
		self.graph.visit_nodes(|node| {
			if node.index() == idx {
				origin = (node.x(), node.y());
			}
		});
		self.drag = DragState {
			active: true,
			moved: false,
			node_idx: Some(idx),
			start_x: x,
			start_y: y,
			node_start_x: origin.0,
			node_start_y: origin.1,
		};
	}

	pub fn pointer_move(&mut self, x: f64, y: f64) {
		if self.pan.active {
			self.transform.x = self.pan.transform_start_x + (x - self.pan.start_x);
			self.transform.y = self.pan.transform_start_y + (y - self.pan.start_y);
			return;
		}
		if !self.drag.active {
			let hovered = self.node_at_position(x, y);
			self.set_hover(hovered);
			return;
		}

		let (dx, dy) = (x - self.drag.start_x, y - self.drag.start_y);
		if !self.drag.moved && dx.hypot(dy) < CLICK_SLOP {
			return;
		}
		self.drag.moved = true;
		let Some(idx) = self.drag.node_idx else {
			return;
		};
		let k = self.transform.k;
		let target = (
			self.drag.node_start_x + (dx / k) as f32,
			self.drag.node_start_y + (dy / k) as f32,
		);
		self.graph.visit_nodes_mut(|node| {
			if node.index() == idx {
				node.data.x = target.0;
				node.data.y = target.1;
				node.data.is_anchor = true;
			}
		});
	}

	/// End of a press. Returns the entity when the press never became a drag.
	pub fn release(&mut self) -> Option<Entity> {
		let clicked = match self.drag {
			DragState { active: true, moved: false, node_idx: Some(idx), .. } => self.entity(idx),
			_ => None,
		};
		self.drag = DragState::default();
		self.pan.active = false;
		clicked
	}

	/// Pointer left the canvas.
	pub fn cancel_pointer(&mut self) {
		self.drag = DragState::default();
		self.pan.active = false;
		self.set_hover(None);
	}

	/// Zoom by one wheel notch, keeping the point under the cursor fixed.
	pub fn zoom_at(&mut self, x: f64, y: f64, delta_y: f64) {
		let factor = if delta_y > 0.0 { 0.9 } else { 1.1 };
		let k = (self.transform.k * factor).clamp(MIN_ZOOM, MAX_ZOOM);
		let ratio = k / self.transform.k;
		self.transform.x = x - (x - self.transform.x) * ratio;
		self.transform.y = y - (y - self.transform.y) * ratio;
		self.transform.k = k;
	}

	pub fn set_hover(&mut self, node: Option<DefaultNodeIdx>) {
		if self.hover.node == node {
			return;
		}
		let was_hovering = self.hover.node.is_some();

		// keep the old highlight around while it fades out
		if was_hovering && node.is_none() {
			self.hover.prev_node = self.hover.node.take();
			self.hover.prev_neighbors = std::mem::take(&mut self.hover.neighbors);
		} else {
			self.hover.prev_node = None;
			self.hover.prev_neighbors.clear();
		}

		self.hover.node = node;
		self.hover.neighbors.clear();

		if let Some(idx) = node {
			if !was_hovering {
				self.hover.delay_t = 0.0;
			}
			for edge in &self.edges {
				if edge.source == idx {
					self.hover.neighbors.insert(edge.target);
				} else if edge.target == idx {
					self.hover.neighbors.insert(edge.source);
				}
			}
		}
	}

	pub fn is_highlighted(&self, idx: DefaultNodeIdx) -> bool {
		self.hover.node == Some(idx)
			|| self.hover.neighbors.contains(&idx)
			|| self.hover.prev_node == Some(idx)
			|| self.hover.prev_neighbors.contains(&idx)
	}

	pub fn is_hovered(&self, idx: DefaultNodeIdx) -> bool {
		self.hover.node == Some(idx) || self.hover.prev_node == Some(idx)
	}

	pub fn has_active_highlight(&self) -> bool {
		self.hover.node.is_some() || self.hover.prev_node.is_some()
	}

	pub fn is_cooling(&self) -> bool {
		self.drag.active || (self.alpha >= ALPHA_MIN && self.ticks < COOLDOWN_TICKS)
	}

	/// Restart the simulation without discarding positions.
	pub fn reheat(&mut self) {
		self.alpha = 1.0;
		self.ticks = 0;
	}

	pub fn tick(&mut self, dt: f32) {
		if self.is_cooling() {
			self.graph.update(dt);
			self.apply_layout_forces();
			self.alpha += (0.0 - self.alpha) * ALPHA_DECAY;
			self.ticks += 1;
		}
		self.tick_hover(dt as f64);
	}

	/// Centre pull, link distance and collision, on top of the charge and
	/// spring forces the simulation already applies.
	fn apply_layout_forces(&mut self) {
		let alpha = self.alpha;
		let mut pos = self.positions();
		let anchored = {
			let mut set = HashSet::new();
			self.graph.visit_nodes(|node| {
				if node.data.is_anchor {
					set.insert(node.index());
				}
			});
			set
		};

		for (x, y) in pos.values_mut() {
			*x -= *x * CENTER_STRENGTH * alpha;
			*y -= *y * CENTER_STRENGTH * alpha;
		}

		for edge in &self.edges {
			let (Some(&(x1, y1)), Some(&(x2, y2))) = (pos.get(&edge.source), pos.get(&edge.target)) else {
				continue;
			};
			let (dx, dy) = (x2 - x1, y2 - y1);
			let dist = (dx * dx + dy * dy).sqrt().max(0.001);
			let pull = ((dist - LINK_DISTANCE) / dist * alpha * LINK_STIFFNESS).clamp(-0.5, 0.5) / 2.0;
			if let Some(p) = pos.get_mut(&edge.source) {
				p.0 += dx * pull;
				p.1 += dy * pull;
			}
			if let Some(p) = pos.get_mut(&edge.target) {
				p.0 -= dx * pull;
				p.1 -= dy * pull;
			}
		}

		let keys: Vec<DefaultNodeIdx> = pos.keys().copied().collect();
		let min_sep = COLLIDE_RADIUS * 2.0;
		for (i, a) in keys.iter().enumerate() {
			for b in &keys[i + 1..] {
				let (ax, ay) = pos[a];
				let (bx, by) = pos[b];
				let (mut dx, mut dy) = (bx - ax, by - ay);
				let mut dist = (dx * dx + dy * dy).sqrt();
				if dist >= min_sep {
					continue;
				}
				if dist < 0.001 {
					// coincident nodes: split along a fixed axis
					(dx, dy, dist) = (0.01, 0.0, 0.01);
				}
				let push = (min_sep - dist) / dist / 2.0;
				if let Some(p) = pos.get_mut(a) {
					p.0 -= dx * push;
					p.1 -= dy * push;
				}
				if let Some(p) = pos.get_mut(b) {
					p.0 += dx * push;
					p.1 += dy * push;
				}
			}
		}

		self.graph.visit_nodes_mut(|node| {
			let idx = node.index();
			if anchored.contains(&idx) {
				return;
			}
			if let Some(&(x, y)) = pos.get(&idx) {
				node.data.x = x as f32;
				node.data.y = y as f32;
			}
		});
	}

	fn tick_hover(&mut self, dt: f64) {
		let (target, delay, speed) = if self.hover.node.is_some() {
			(1.0, 0.08, 1.8)
		} else {
			(0.0, 0.0, 1.26)
		};

		if self.hover.node.is_some() {
			self.hover.delay_t = (self.hover.delay_t + dt).min(delay);
			if self.hover.delay_t >= delay {
				self.hover.highlight_t += (target - self.hover.highlight_t) * speed * dt;
			}
		} else {
			self.hover.highlight_t += (target - self.hover.highlight_t) * speed * dt;
			if self.hover.highlight_t < 0.01 {
				self.hover.highlight_t = 0.0;
				self.hover.prev_node = None;
				self.hover.prev_neighbors.clear();
			}
		}
	}

	/// New canvas size: keep the graph centred and let it settle again.
	pub fn resize(&mut self, width: f64, height: f64) {
		self.transform.x += (width - self.width) / 2.0;
		self.transform.y += (height - self.height) / 2.0;
		self.width = width;
		self.height = height;
		self.reheat();
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::super::style::EdgeTier;
	use super::*;

	fn graph(nodes: serde_json::Value) -> GraphData {
		serde_json::from_value(json!({ "nodes": nodes, "links": [] })).unwrap()
	}

	#[test]
	fn rebuilds_once_per_distinct_signature() {
		let a = graph(json!([{ "id": "A", "type": "mule" }, { "id": "B" }, { "id": "C", "type": "ring" }]));
		let reordered = graph(json!([{ "id": "C", "type": "ring" }, { "id": "A", "type": "mule" }, { "id": "B" }]));
		let recategorized = graph(json!([{ "id": "A", "type": "shell" }, { "id": "B" }, { "id": "C", "type": "ring" }]));

		let mut tracker = LayoutTracker::default();
		let decisions: Vec<Relayout> = [&a, &a, &reordered, &recategorized, &reordered, &reordered]
			.into_iter()
			.map(|g| tracker.observe(g, 600.0, 400.0))
			.collect();

		assert_eq!(
			decisions,
			[
				Relayout::Rebuild,
				Relayout::Keep,
				Relayout::Refresh,
				Relayout::Rebuild,
				Relayout::Rebuild,
				Relayout::Keep,
			]
		);
	}

	#[test]
	fn size_change_only_reheats() {
		let g = graph(json!([{ "id": "A" }]));
		let mut tracker = LayoutTracker::default();
		assert_eq!(tracker.observe(&g, 600.0, 400.0), Relayout::Rebuild);
		assert_eq!(tracker.observe(&g, 800.0, 400.0), Relayout::Reheat);
		assert_eq!(tracker.observe(&g, 800.0, 400.0), Relayout::Keep);
	}

	#[test]
	fn unknown_endpoints_are_skipped_and_duplicates_kept() {
		let data: GraphData = serde_json::from_value(json!({
			"nodes": [{ "id": "A", "type": "mule" }, { "id": "B", "type": "mule" }],
			"links": [
				{ "source": "A", "target": "B" },
				{ "source": "A", "target": "B" },
				{ "source": "A", "target": "ghost" }
			]
		}))
		.unwrap();
		let state = NetworkGraphState::new(&data, 600.0, 400.0);
		assert_eq!(state.edges.len(), 2);
		assert!(state.edges.iter().all(|e| e.style.animated));
	}

	#[test]
	fn cooling_stops_after_the_tick_budget() {
		let data = graph(json!([{ "id": "A" }, { "id": "B" }]));
		let mut state = NetworkGraphState::new(&data, 600.0, 400.0);
		for _ in 0..COOLDOWN_TICKS {
			assert!(state.is_cooling());
			state.tick(0.016);
		}
		assert!(!state.is_cooling());
		state.resize(900.0, 400.0);
		assert!(state.is_cooling());
		assert_eq!(state.transform.x, 450.0);
	}

	#[test]
	fn collision_separates_overlapping_nodes() {
		let data = graph(json!([{ "id": "A" }, { "id": "B" }]));
		let mut state = NetworkGraphState::new(&data, 600.0, 400.0);
		state.graph.visit_nodes_mut(|node| {
			node.data.x = 0.0;
			node.data.y = if node.data.user_data.entity.id == "A" { 0.0 } else { 1.0 };
		});
		state.apply_layout_forces();
		let pos: Vec<(f64, f64)> = state.positions().into_values().collect();
		let gap = ((pos[0].0 - pos[1].0).powi(2) + (pos[0].1 - pos[1].1).powi(2)).sqrt();
		assert!(gap > 1.0);
	}

	#[test]
	fn hover_collects_neighbors_from_both_directions() {
		let data: GraphData = serde_json::from_value(json!({
			"nodes": [{ "id": "A" }, { "id": "B" }, { "id": "C" }],
			"links": [{ "source": "A", "target": "B" }, { "source": "C", "target": "A" }]
		}))
		.unwrap();
		let mut state = NetworkGraphState::new(&data, 600.0, 400.0);
		let a = state.edges[0].source;
		state.set_hover(Some(a));
		assert_eq!(state.hover.neighbors.len(), 2);
		assert_eq!(state.entity(a).map(|e| e.id), Some("A".to_string()));
	}

	fn node_screen_position(state: &NetworkGraphState, id: &str) -> (f64, f64) {
		let mut at = (0.0, 0.0);
		state.graph.visit_nodes(|node| {
			if node.data.user_data.entity.id == id {
				at = (
					node.x() as f64 * state.transform.k + state.transform.x,
					node.y() as f64 * state.transform.k + state.transform.y,
				);
			}
		});
		at
	}

	#[test]
	fn press_and_release_in_place_is_a_click() {
		let data = graph(json!([{ "id": "A", "type": "mule" }, { "id": "B" }]));
		let mut state = NetworkGraphState::new(&data, 600.0, 400.0);
		let (x, y) = node_screen_position(&state, "A");
		state.press(x, y);
		state.pointer_move(x + 1.0, y + 1.0);
		assert_eq!(state.release().map(|e| e.id), Some("A".to_string()));
		assert!(!state.drag.active);
	}

	#[test]
	fn dragging_a_node_is_not_a_click() {
		let data = graph(json!([{ "id": "A" }, { "id": "B" }]));
		let mut state = NetworkGraphState::new(&data, 600.0, 400.0);
		let (x, y) = node_screen_position(&state, "A");
		state.press(x, y);
		state.pointer_move(x + 20.0, y);
		assert!(state.drag.moved);
		assert_eq!(state.release(), None);
		let (nx, _) = node_screen_position(&state, "A");
		assert!((nx - (x + 20.0)).abs() < 0.01);
	}

	#[test]
	fn background_press_pans() {
		let data = graph(json!([{ "id": "A" }]));
		let mut state = NetworkGraphState::new(&data, 600.0, 400.0);
		state.press(5.0, 5.0);
		assert!(state.pan.active);
		state.pointer_move(25.0, 15.0);
		assert_eq!((state.transform.x, state.transform.y), (320.0, 210.0));
		assert_eq!(state.release(), None);
		assert!(!state.pan.active);
	}

	#[test]
	fn zoom_keeps_the_cursor_point_fixed() {
		let data = graph(json!([{ "id": "A" }]));
		let mut state = NetworkGraphState::new(&data, 600.0, 400.0);
		let before = state.screen_to_graph(100.0, 80.0);
		state.zoom_at(100.0, 80.0, -1.0);
		let after = state.screen_to_graph(100.0, 80.0);
		assert!((state.transform.k - 1.1).abs() < 1e-9);
		assert!((before.0 - after.0).abs() < 1e-9 && (before.1 - after.1).abs() < 1e-9);
	}

	#[test]
	fn same_nodes_with_new_attributes_refresh_in_place() {
		let before = graph(json!([{ "id": "A", "type": "mule", "riskScore": 40 }, { "id": "B", "type": "mule" }]));
		let after: GraphData = serde_json::from_value(json!({
			"nodes": [{ "id": "A", "type": "mule", "riskScore": 99 }, { "id": "B", "type": "mule" }],
			"links": [{ "source": "A", "target": "B", "isRingConnection": true }]
		}))
		.unwrap();

		let mut tracker = LayoutTracker::default();
		assert_eq!(tracker.observe(&before, 600.0, 400.0), Relayout::Rebuild);
		assert_eq!(tracker.observe(&after, 600.0, 400.0), Relayout::Refresh);
		assert_eq!(tracker.observe(&after, 600.0, 400.0), Relayout::Keep);

		let mut state = NetworkGraphState::new(&before, 600.0, 400.0);
		for _ in 0..COOLDOWN_TICKS {
			state.tick(0.016);
		}
		let settled = node_screen_position(&state, "A");
		state.refresh(&after);

		assert_eq!(state.edges.len(), 1);
		assert_eq!(state.edges[0].style.tier, EdgeTier::RingConnection);
		assert_eq!(node_screen_position(&state, "A"), settled);
		assert!(!state.is_cooling());
		let (x, y) = settled;
		state.press(x, y);
		assert_eq!(state.release().map(|e| e.risk_score), Some(99));
	}
}

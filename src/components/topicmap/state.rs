//! Topicmap geometry: nodes, edges, the view transform and hit-testing.
//!
//! Positions are model coordinates. A node's position is the center of its
//! image; its extent is the size of the most recently rendered image.

use std::collections::HashMap;
use std::f64::consts::PI;

use force_graph::{DefaultNodeIdx, EdgeData, ForceGraph, NodeData, SimulationParameters};
use log::{debug, warn};

use super::node_image::NodeImage;
use super::types::{NodeKind, Position, Target, TopicmapData, ViewAssoc, ViewTopic};

/// Extent of a node that has not been rendered yet.
pub const DEFAULT_NODE_SIZE: (f64, f64) = (40.0, 24.0);

/// Simulation steps run by [`TopicmapState::auto_layout`].
const LAYOUT_STEPS: usize = 300;
const LAYOUT_RADIUS: f64 = 150.0;

/// A node on the canvas.
#[derive(Clone, Debug)]
pub struct ViewNode {
	/// Unique on the canvas. For ordinary topics this is the topic id.
	pub element_id: i64,
	/// Topic or association proxy.
	pub kind: NodeKind,
	/// The topic as supplied by the host, kept in step with moves.
	pub topic: ViewTopic,
	/// Center in model coordinates.
	pub pos: Position,
	/// Width of the last rendered image.
	pub width: f64,
	/// Height of the last rendered image.
	pub height: f64,
	/// Image of the last rendering pass, `None` if that pass failed.
	pub image: Option<NodeImage>,
	/// Follows the host's selection.
	pub selected: bool,
	/// Drop-target highlight during a drag.
	pub hover: bool,
	/// Details are shown in place; the border is hidden.
	pub expanded: bool,
}

impl ViewNode {
	fn new(topic: ViewTopic) -> Self {
		Self {
			element_id: topic.id,
			kind: NodeKind::of(&topic),
			pos: topic.pos.unwrap_or_default(),
			width: DEFAULT_NODE_SIZE.0,
			height: DEFAULT_NODE_SIZE.1,
			image: None,
			selected: false,
			hover: false,
			expanded: false,
			topic,
		}
	}

	/// What events and commands for this node refer to.
	pub fn target(&self) -> Target {
		self.kind.target()
	}

	/// Box covering the image and half of its border.
	pub fn bounding_box(&self, border_width: f64) -> BoundingBox {
		let (hw, hh) = (
			self.width / 2.0 + border_width / 2.0,
			self.height / 2.0 + border_width / 2.0,
		);
		BoundingBox {
			x1: self.pos.x - hw,
			y1: self.pos.y - hh,
			x2: self.pos.x + hw,
			y2: self.pos.y + hh,
		}
	}
}

/// An edge on the canvas, identified by its association id.
#[derive(Clone, Debug)]
pub struct ViewEdge {
	/// The association as supplied by the host.
	pub assoc: ViewAssoc,
	pub selected: bool,
}

impl ViewEdge {
	/// The association id.
	pub fn id(&self) -> i64 {
		self.assoc.id
	}
}

/// Axis-aligned bounding box in model coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
	pub x1: f64,
	pub y1: f64,
	pub x2: f64,
	pub y2: f64,
}

impl BoundingBox {
	/// Strict containment: points on the border are outside.
	pub fn contains(&self, p: Position) -> bool {
		p.x > self.x1 && p.x < self.x2 && p.y > self.y1 && p.y < self.y2
	}
}

/// Pan and zoom transform applied to the entire view.
#[derive(Clone, Debug)]
pub struct ViewTransform {
	/// Horizontal offset in canvas pixels.
	pub x: f64,
	/// Vertical offset in canvas pixels.
	pub y: f64,
	/// Zoom factor (1.0 = 100%).
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

/// Tracks an in-progress canvas pan operation.
#[derive(Clone, Debug, Default)]
pub struct PanState {
	/// A background press is in progress.
	pub active: bool,
	/// The press has travelled far enough to be a pan.
	pub moved: bool,
	/// Pointer position at press time, canvas pixels.
	pub start_x: f64,
	/// Pointer position at press time, canvas pixels.
	pub start_y: f64,
	/// Transform offset at press time.
	pub transform_start_x: f64,
	/// Transform offset at press time.
	pub transform_start_y: f64,
}

/// Nodes, edges and the view transform.
///
/// Nodes and edges keep map order: later entries are drawn on top and
/// win hit-tests.
#[derive(Clone, Debug, Default)]
pub struct TopicmapState {
	nodes: Vec<ViewNode>,
	edges: Vec<ViewEdge>,
	/// Pan offset and zoom.
	pub transform: ViewTransform,
	/// Background drag in progress.
	pub pan: PanState,
	/// Canvas width in pixels.
	pub width: f64,
	/// Canvas height in pixels.
	pub height: f64,
}

impl TopicmapState {
	/// Builds the geometry for `data` and lays out unpositioned topics.
	/// Associations whose players are missing are skipped.
	pub fn new(data: &TopicmapData, width: f64, height: f64) -> Self {
		let mut state = Self {
			width,
			height,
			..Self::default()
		};
		for topic in &data.topics {
			state.add_topic(topic.clone());
		}
		for assoc in &data.assocs {
			state.add_assoc(assoc.clone());
		}
		state.auto_layout();
		state
	}

	/// Nodes in map order.
	pub fn nodes(&self) -> &[ViewNode] {
		&self.nodes
	}

	/// Edges in map order.
	pub fn edges(&self) -> &[ViewEdge] {
		&self.edges
	}

	/// Nodes in map order, mutably.
	pub fn nodes_mut(&mut self) -> impl Iterator<Item = &mut ViewNode> {
		self.nodes.iter_mut()
	}

	/// Adds a topic node. Returns `false` if the element id is taken.
	pub fn add_topic(&mut self, topic: ViewTopic) -> bool {
		if self.node(topic.id).is_some() {
			warn!("topicmap: duplicate node {}", topic.id);
			return false;
		}
		self.nodes.push(ViewNode::new(topic));
		true
	}

	/// Adds an edge. Returns `false` if the id is taken or a player is unknown.
	pub fn add_assoc(&mut self, assoc: ViewAssoc) -> bool {
		if self.edge(assoc.id).is_some() {
			warn!("topicmap: duplicate edge {}", assoc.id);
			return false;
		}
		if self.node(assoc.topic_id1).is_none() || self.node(assoc.topic_id2).is_none() {
			warn!(
				"topicmap: edge {} references unknown node ({} -> {})",
				assoc.id, assoc.topic_id1, assoc.topic_id2
			);
			return false;
		}
		self.edges.push(ViewEdge {
			assoc,
			selected: false,
		});
		true
	}

	/// Removes a node and the edges attached to it.
	pub fn remove_node(&mut self, element_id: i64) -> Option<ViewNode> {
		let index = self.nodes.iter().position(|n| n.element_id == element_id)?;
		self.edges
			.retain(|e| e.assoc.topic_id1 != element_id && e.assoc.topic_id2 != element_id);
		Some(self.nodes.remove(index))
	}

	/// Removes an association's edge.
	pub fn remove_edge(&mut self, assoc_id: i64) -> Option<ViewEdge> {
		let index = self.edges.iter().position(|e| e.id() == assoc_id)?;
		Some(self.edges.remove(index))
	}

	/// Node by element id.
	pub fn node(&self, element_id: i64) -> Option<&ViewNode> {
		self.nodes.iter().find(|n| n.element_id == element_id)
	}

	/// Node by element id, mutably.
	pub fn node_mut(&mut self, element_id: i64) -> Option<&mut ViewNode> {
		self.nodes.iter_mut().find(|n| n.element_id == element_id)
	}

	/// Edge by association id.
	pub fn edge(&self, assoc_id: i64) -> Option<&ViewEdge> {
		self.edges.iter().find(|e| e.id() == assoc_id)
	}

	/// Edge by association id, mutably.
	pub fn edge_mut(&mut self, assoc_id: i64) -> Option<&mut ViewEdge> {
		self.edges.iter_mut().find(|e| e.id() == assoc_id)
	}

	/// The node representing a topic, or the proxy node of an association.
	pub fn node_for(&self, target: Target) -> Option<&ViewNode> {
		self.nodes.iter().find(|n| n.target() == target)
	}

	/// Centers of an edge's two player nodes.
	pub fn endpoints(&self, edge: &ViewEdge) -> Option<(Position, Position)> {
		Some((
			self.node(edge.assoc.topic_id1)?.pos,
			self.node(edge.assoc.topic_id2)?.pos,
		))
	}

	/// First node in map order whose box contains `pos`, skipping `exclude`.
	pub fn node_at(&self, pos: Position, exclude: &[i64], border_width: f64) -> Option<i64> {
		self.nodes
			.iter()
			.filter(|n| !exclude.contains(&n.element_id))
			.find(|n| n.bounding_box(border_width).contains(pos))
			.map(|n| n.element_id)
	}

	/// Top-most (last drawn) node whose box contains `pos`.
	pub fn topmost_node_at(&self, pos: Position, border_width: f64) -> Option<i64> {
		self.nodes
			.iter()
			.rev()
			.find(|n| n.bounding_box(border_width).contains(pos))
			.map(|n| n.element_id)
	}

	/// Top-most edge within `tolerance` of `pos` (on top of its stroke width).
	pub fn edge_at(&self, pos: Position, tolerance: f64, stroke_width: f64) -> Option<i64> {
		self.edges
			.iter()
			.rev()
			.find(|e| {
				self.endpoints(e).is_some_and(|(a, b)| {
					distance_to_segment(pos, a, b) <= tolerance + stroke_width / 2.0
				})
			})
			.map(|e| e.id())
	}

	/// Moves a node's center. Unknown ids are ignored.
	pub fn move_node(&mut self, element_id: i64, pos: Position) {
		match self.node_mut(element_id) {
			Some(node) => node.pos = pos,
			None => debug!("topicmap: move of unknown node {}", element_id),
		}
	}

	/// Canvas pixels to model coordinates.
	pub fn screen_to_graph(&self, p: Position) -> Position {
		Position::new(
			(p.x - self.transform.x) / self.transform.k,
			(p.y - self.transform.y) / self.transform.k,
		)
	}

	/// Model coordinates to canvas pixels.
	pub fn graph_to_screen(&self, p: Position) -> Position {
		Position::new(
			p.x * self.transform.k + self.transform.x,
			p.y * self.transform.k + self.transform.y,
		)
	}

	/// Zooms to `k` keeping the screen point `anchor` fixed.
	pub fn zoom_at(&mut self, anchor: Position, k: f64) {
		let ratio = k / self.transform.k;
		self.transform.x = anchor.x - (anchor.x - self.transform.x) * ratio;
		self.transform.y = anchor.y - (anchor.y - self.transform.y) * ratio;
		self.transform.k = k;
	}

	/// Records a new canvas size.
	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}

	/// Places topics that have no stored position.
	///
	/// Runs a force simulation in which positioned topics are fixed anchors and
	/// unpositioned ones start on a circle around the anchors' centroid (or the
	/// viewport center). Returns the number of topics placed.
	pub fn auto_layout(&mut self) -> usize {
		let unplaced = self.nodes.iter().filter(|n| n.topic.pos.is_none()).count();
		if unplaced == 0 {
			return 0;
		}

		let center = self.anchor_centroid().unwrap_or_else(|| {
			self.screen_to_graph(Position::new(self.width / 2.0, self.height / 2.0))
		});

		let mut graph: ForceGraph<usize, ()> = ForceGraph::new(SimulationParameters {
			force_charge: 150.0,
			force_spring: 0.05,
			force_max: 100.0,
			node_speed: 3000.0,
			damping_factor: 0.9,
		});
		let mut id_to_idx: HashMap<i64, DefaultNodeIdx> = HashMap::new();
		let mut ordinal = 0;

		for (i, node) in self.nodes.iter().enumerate() {
			let placed = node.topic.pos.is_some();
			let pos = if placed {
				node.pos
			} else {
				let angle = (ordinal as f64) * 2.0 * PI / unplaced as f64;
				ordinal += 1;
				Position::new(
					center.x + LAYOUT_RADIUS * angle.cos(),
					center.y + LAYOUT_RADIUS * angle.sin(),
				)
			};
			let idx = graph.add_node(NodeData {
				x: pos.x as f32,
				y: pos.y as f32,
				mass: 10.0,
				is_anchor: placed,
				user_data: i,
			});
			id_to_idx.insert(node.element_id, idx);
		}

		for edge in &self.edges {
			if let (Some(&src), Some(&tgt)) = (
				id_to_idx.get(&edge.assoc.topic_id1),
				id_to_idx.get(&edge.assoc.topic_id2),
			) {
				graph.add_edge(src, tgt, EdgeData::default());
			}
		}

		for _ in 0..LAYOUT_STEPS {
			graph.update(0.016);
		}

		let nodes = &mut self.nodes;
		graph.visit_nodes(|n| {
			let node = &mut nodes[n.data.user_data];
			if node.topic.pos.is_none() {
				let pos = Position::new(n.x() as f64, n.y() as f64);
				node.pos = pos;
				node.topic.pos = Some(pos);
			}
		});
		debug!("topicmap: auto layout placed {} topics", unplaced);
		unplaced
	}

	fn anchor_centroid(&self) -> Option<Position> {
		let placed: Vec<Position> = self
			.nodes
			.iter()
			.filter(|n| n.topic.pos.is_some())
			.map(|n| n.pos)
			.collect();
		if placed.is_empty() {
			return None;
		}
		let n = placed.len() as f64;
		Some(Position::new(
			placed.iter().map(|p| p.x).sum::<f64>() / n,
			placed.iter().map(|p| p.y).sum::<f64>() / n,
		))
	}
}

fn distance_to_segment(p: Position, a: Position, b: Position) -> f64 {
	let (dx, dy) = (b.x - a.x, b.y - a.y);
	let len_sq = dx * dx + dy * dy;
	let t = if len_sq < f64::EPSILON {
		0.0
	} else {
		(((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0)
	};
	let (cx, cy) = (a.x + t * dx, a.y + t * dy);
	((p.x - cx).powi(2) + (p.y - cy).powi(2)).sqrt()
}

#[cfg(test)]
pub(crate) mod tests {
	use super::*;

	pub(crate) fn topic(id: i64, x: f64, y: f64) -> ViewTopic {
		ViewTopic {
			id,
			label: format!("Topic {id}"),
			icon: "\u{f10c}".into(),
			pos: Some(Position::new(x, y)),
			assoc_id: None,
		}
	}

	pub(crate) fn assoc(id: i64, topic_id1: i64, topic_id2: i64) -> ViewAssoc {
		ViewAssoc {
			id,
			label: None,
			topic_id1,
			topic_id2,
		}
	}

	fn sample() -> TopicmapState {
		let data = TopicmapData {
			topics: vec![topic(1, 0.0, 0.0), topic(2, 100.0, 0.0), topic(3, 100.0, 100.0)],
			assocs: vec![assoc(10, 1, 2)],
		};
		TopicmapState::new(&data, 800.0, 600.0)
	}

	#[test]
	fn containment_is_strict() {
		let state = sample();
		let node = state.node(1).unwrap();
		let bbox = node.bounding_box(0.0);
		assert_eq!(bbox.x1, -20.0);
		assert!(!bbox.contains(Position::new(-20.0, 0.0)));
		assert!(bbox.contains(Position::new(-19.9, 11.9)));
	}

	#[test]
	fn node_at_honors_exclusion() {
		let mut state = sample();
		state.move_node(2, Position::new(5.0, 0.0));
		assert_eq!(state.node_at(Position::new(3.0, 0.0), &[], 1.0), Some(1));
		assert_eq!(state.node_at(Position::new(3.0, 0.0), &[1], 1.0), Some(2));
		assert_eq!(state.topmost_node_at(Position::new(3.0, 0.0), 1.0), Some(2));
		assert_eq!(state.node_at(Position::new(500.0, 500.0), &[], 1.0), None);
	}

	#[test]
	fn edge_hit_uses_segment_distance() {
		let state = sample();
		assert_eq!(state.edge_at(Position::new(50.0, 4.0), 3.0, 3.0), Some(10));
		assert_eq!(state.edge_at(Position::new(50.0, 6.0), 3.0, 3.0), None);
		assert_eq!(state.edge_at(Position::new(130.0, 0.0), 3.0, 3.0), None);
	}

	#[test]
	fn rejects_dangling_and_duplicate_edges() {
		let mut state = sample();
		assert!(!state.add_assoc(assoc(11, 1, 99)));
		assert!(!state.add_assoc(assoc(10, 2, 3)));
		assert!(state.add_assoc(assoc(11, 2, 3)));
	}

	#[test]
	fn removing_a_node_drops_its_edges() {
		let mut state = sample();
		assert!(state.remove_node(2).is_some());
		assert!(state.edge(10).is_none());
		assert!(state.remove_node(2).is_none());
	}

	#[test]
	fn screen_graph_conversion_round_trips() {
		let mut state = sample();
		state.transform = ViewTransform {
			x: 40.0,
			y: -10.0,
			k: 2.0,
		};
		let p = Position::new(13.0, 7.0);
		assert_eq!(state.screen_to_graph(state.graph_to_screen(p)), p);
		state.zoom_at(Position::new(100.0, 100.0), 4.0);
		assert_eq!(state.transform.k, 4.0);
		assert_eq!(
			state.screen_to_graph(Position::new(100.0, 100.0)),
			Position::new(30.0, 55.0)
		);
	}

	#[test]
	fn auto_layout_places_only_unpositioned_topics() {
		let mut floating = topic(4, 0.0, 0.0);
		floating.pos = None;
		let data = TopicmapData {
			topics: vec![topic(1, 0.0, 0.0), topic(2, 100.0, 0.0), floating],
			assocs: vec![assoc(10, 1, 4)],
		};
		let state = TopicmapState::new(&data, 800.0, 600.0);
		assert_eq!(state.node(1).unwrap().pos, Position::new(0.0, 0.0));
		assert_eq!(state.node(2).unwrap().pos, Position::new(100.0, 0.0));
		let placed = state.node(4).unwrap();
		assert!(placed.topic.pos.is_some());
		assert!(placed.pos.x.is_finite() && placed.pos.y.is_finite());
	}
}

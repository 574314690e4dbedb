//! The topicmap view adapter.
//!
//! [`TopicmapView`] turns pointer input into domain events and keeps the
//! visual selection in step with the host's selection. It never calls host
//! code directly: everything outbound is queued as an [`Effect`] and handed
//! over by [`TopicmapView::take_effects`] once the caller is done with the
//! view.

use std::mem;

use log::debug;

use super::commands::{ContextCommands, ContextMenu, selection_kind};
use super::drag::{DragOutcome, DragState};
use super::events::{Effect, TopicmapEvent};
use super::glyph::{GlyphError, GlyphSource};
use super::measure::TextMeasure;
use super::node_image::render_node;
use super::scale::{ScaleConfig, ScaledValues};
use super::selection::{SelectionKind, SharedSelection, dispatch_targets};
use super::state::{PanState, TopicmapState};
use super::theme::Theme;
use super::types::{Element, NodeKind, Position, Target, TopicmapData, ViewAssoc, ViewTopic};

/// Pointer travel (screen pixels) after which a background press is a pan
/// rather than a tap.
const PAN_THRESHOLD: f64 = 3.0;

/// A node whose image could not be rendered in the last pass.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderFailure {
	/// Element id of the node.
	pub element_id: i64,
	/// Why the icon could not be resolved.
	pub error: GlyphError,
}

/// Select/unselect notifications suppressed while the view changes the
/// selection on the host's behalf.
#[derive(Clone, Copy, Debug, Default)]
struct Suspended {
	select: bool,
	unselect: bool,
}

/// Interaction core of the topicmap canvas.
///
/// Owns the geometry, the gesture state and the visual selection flags,
/// and reads the host's [`SharedSelection`]. Callers feed it pointer input
/// in canvas pixels, drain [`TopicmapView::take_effects`] once they have
/// released it, and redraw when [`TopicmapView::take_redraw`] says so.
pub struct TopicmapView {
	state: TopicmapState,
	selection: SharedSelection,
	commands: ContextCommands,
	config: ScaleConfig,
	theme: Theme,
	drag: Option<DragState>,
	menu: Option<ContextMenu>,
	suspended: Suspended,
	/// Set when a gesture ends, so the click that follows is not a tap.
	suppress_tap: bool,
	effects: Vec<Effect>,
	dirty: bool,
}

impl TopicmapView {
	/// Builds the view for `data` on a canvas of `width` x `height` pixels.
	/// Unpositioned topics are laid out automatically.
	pub fn new(
		data: &TopicmapData,
		width: f64,
		height: f64,
		selection: SharedSelection,
		commands: ContextCommands,
		theme: Theme,
	) -> Self {
		Self {
			state: TopicmapState::new(data, width, height),
			selection,
			commands,
			config: ScaleConfig::default(),
			theme,
			drag: None,
			menu: None,
			suspended: Suspended::default(),
			suppress_tap: false,
			effects: Vec::new(),
			dirty: true,
		}
	}

	/// Geometry and flags of everything on the canvas.
	pub fn state(&self) -> &TopicmapState {
		&self.state
	}

	/// Zoom and stroke configuration.
	pub fn config(&self) -> &ScaleConfig {
		&self.config
	}

	/// Colors and fonts the view renders with.
	pub fn theme(&self) -> &Theme {
		&self.theme
	}

	/// Current zoom factor.
	pub fn zoom(&self) -> f64 {
		self.state.transform.k
	}

	/// Drains the queued effects in the order they were produced.
	pub fn take_effects(&mut self) -> Vec<Effect> {
		mem::take(&mut self.effects)
	}

	/// Returns whether a redraw is due and clears the flag.
	pub fn take_redraw(&mut self) -> bool {
		mem::take(&mut self.dirty)
	}

	/// Requests a redraw.
	pub fn mark_dirty(&mut self) {
		self.dirty = true;
	}

	/// Adopts a new canvas size.
	pub fn resize(&mut self, width: f64, height: f64) {
		self.state.resize(width, height);
		self.dirty = true;
	}

	/// Replaces the displayed topicmap, keeping size and pan/zoom.
	pub fn load(&mut self, data: &TopicmapData) {
		let mut state = TopicmapState::new(data, self.state.width, self.state.height);
		state.transform = self.state.transform.clone();
		self.state = state;
		self.drag = None;
		self.menu = None;
		self.suppress_tap = false;
		self.dirty = true;
		self.sync_selection();
	}

	// Node rendering

	/// Renders every node image afresh and adopts the image sizes.
	///
	/// Nodes whose icon cannot be resolved keep their previous extent, lose
	/// their image and are reported.
	pub fn render_nodes(
		&mut self,
		measure: &dyn TextMeasure,
		glyphs: &dyn GlyphSource,
	) -> Vec<RenderFailure> {
		let theme = &self.theme;
		let mut failures = Vec::new();
		for node in self.state.nodes_mut() {
			match render_node(&node.topic.label, &node.topic.icon, measure, glyphs, theme) {
				Ok(image) => {
					node.width = image.width;
					node.height = image.height;
					node.image = Some(image);
				}
				Err(error) => {
					node.image = None;
					failures.push(RenderFailure {
						element_id: node.element_id,
						error,
					});
				}
			}
		}
		failures
	}

	// Pointer input. Positions are canvas pixels.

	/// Primary button pressed: grabs the node under the pointer, together
	/// with the rest of the selection when it is selected, or starts a pan on
	/// the empty canvas.
	pub fn pointer_down(&mut self, screen: Position) {
		self.close_context_menu();
		let model = self.state.screen_to_graph(screen);
		if let Some(id) = self.state.topmost_node_at(model, self.config.border.normal) {
			let grabbed_selected = self.state.node(id).is_some_and(|n| n.selected);
			let companions: Vec<i64> = if grabbed_selected {
				self.state
					.nodes()
					.iter()
					.filter(|n| n.selected)
					.map(|n| n.element_id)
					.collect()
			} else {
				Vec::new()
			};
			self.drag = Some(DragState::new(&self.state, id, model, companions));
		} else if self.edge_at(model).is_none() {
			self.state.pan = PanState {
				active: true,
				moved: false,
				start_x: screen.x,
				start_y: screen.y,
				transform_start_x: self.state.transform.x,
				transform_start_y: self.state.transform.y,
			};
		}
	}

	/// Moves the grabbed nodes or pans.
	pub fn pointer_move(&mut self, screen: Position) {
		let model = self.state.screen_to_graph(screen);
		let border = self.config.border.normal;
		if let Some(drag) = self.drag.as_mut() {
			drag.track(&mut self.state, model, border);
			self.dirty = true;
		} else if self.state.pan.active {
			let pan = &mut self.state.pan;
			let (dx, dy) = (screen.x - pan.start_x, screen.y - pan.start_y);
			if dx.hypot(dy) > PAN_THRESHOLD {
				pan.moved = true;
			}
			if pan.moved {
				self.state.transform.x = pan.transform_start_x + dx;
				self.state.transform.y = pan.transform_start_y + dy;
				self.dirty = true;
			}
		}
	}

	/// Primary button released: ends the drag or pan in progress.
	pub fn pointer_up(&mut self, _screen: Position) {
		// The gesture is detached before its outcome is evaluated, so a late
		// move cannot act on it.
		if let Some(drag) = self.drag.take() {
			let group: Vec<i64> = drag.group().collect();
			match drag.finish(&mut self.state) {
				DragOutcome::DroppedOn { dragged, target } => {
					self.suppress_tap = true;
					if let (Some(id1), Some(id2)) = (self.resolved_id(dragged), self.resolved_id(target))
					{
						self.emit(TopicmapEvent::TopicDropOnTopic {
							topic_id1: id1,
							topic_id2: id2,
						});
					}
				}
				DragOutcome::Moved { node } => {
					self.suppress_tap = true;
					for id in group {
						if let Some(n) = self.state.node_mut(id) {
							n.topic.pos = Some(n.pos);
						}
					}
					self.topic_drag(node);
				}
				DragOutcome::Idle => {}
			}
			self.dirty = true;
		}
		if self.state.pan.active {
			self.state.pan.active = false;
			if self.state.pan.moved {
				self.suppress_tap = true;
			}
		}
	}

	/// Pointer left the canvas: abandon any gesture.
	pub fn pointer_leave(&mut self) {
		if let Some(drag) = self.drag.take() {
			drag.cancel(&mut self.state);
			self.dirty = true;
		}
		self.state.pan.active = false;
	}

	/// A primary-button click. `click_count` is the DOM click detail;
	/// `additive` is set while a multi-select modifier is held.
	pub fn tap(&mut self, screen: Position, click_count: u32, additive: bool) {
		if mem::take(&mut self.suppress_tap) {
			return;
		}
		let model = self.state.screen_to_graph(screen);
		let hit = match self.state.topmost_node_at(model, self.config.border.normal) {
			Some(id) => Some(Element::Node(id)),
			None => self.edge_at(model).map(Element::Edge),
		};
		let Some(element) = hit else {
			if !additive {
				self.unselect_all_except(None);
			}
			return;
		};
		let Some(target) = self.element_target(element) else {
			return;
		};

		if additive && self.is_selected(target) {
			self.set_selected(target, false);
		} else {
			if !additive {
				self.unselect_all_except(Some(target));
			}
			self.set_selected(target, true);
		}

		if click_count == 2 {
			if let Element::Node(id) = element {
				match self.state.node(id) {
					Some(node) if !node.kind.is_proxy() => {
						let topic = node.topic.clone();
						self.emit(TopicmapEvent::TopicDoubleClick(topic));
					}
					_ => {}
				}
			}
		}
	}

	/// A secondary-button click: opens the element's command palette, or
	/// reports a context menu request for the empty canvas.
	pub fn context_tap(&mut self, screen: Position) {
		self.close_context_menu();
		let model = self.state.screen_to_graph(screen);
		let target = match self.state.topmost_node_at(model, self.config.border.normal) {
			Some(id) => self.state.node(id).map(|n| n.target()),
			None => self.edge_at(model).map(Target::Assoc),
		};
		match target {
			Some(target) => {
				if self.commands.for_target(target).is_empty() {
					debug!("topicmap: no context commands for {:?}", target);
					return;
				}
				self.menu = Some(ContextMenu::open(&self.commands, target, screen));
			}
			None => self.emit(TopicmapEvent::TopicmapContextmenu {
				model,
				render: screen,
			}),
		}
	}

	/// Zooms around `screen` and reports the new level.
	pub fn wheel(&mut self, screen: Position, delta_y: f64) {
		let k = self.state.transform.k;
		let new_k = self.config.clamp_zoom(k * self.config.wheel_factor(delta_y));
		if (new_k - k).abs() < f64::EPSILON {
			return;
		}
		self.state.zoom_at(screen, new_k);
		self.dirty = true;
		self.emit(TopicmapEvent::Zoom(new_k));
	}

	// Context menu

	/// The command palette currently open, if any.
	pub fn context_menu(&self) -> Option<&ContextMenu> {
		self.menu.as_ref()
	}

	/// Dismisses the command palette.
	pub fn close_context_menu(&mut self) {
		self.menu = None;
	}

	/// Runs the chosen entry of the open menu and closes it.
	pub fn select_menu_command(&mut self, index: usize) -> bool {
		match self.menu.take() {
			Some(menu) => self.run_command(menu.target, index),
			None => false,
		}
	}

	/// Queues a context command for `target`, or for the whole selection when
	/// `target` is part of it.
	pub fn run_command(&mut self, target: Target, index: usize) -> bool {
		let Some(command) = self.commands.for_target(target).get(index).cloned() else {
			return false;
		};
		let ids = dispatch_targets(&self.selection.borrow(), selection_kind(target), target.id());
		for id in ids {
			self.effects.push(Effect::Command {
				handler: command.handler.clone(),
				id,
			});
		}
		true
	}

	// View synchronization

	/// Marks `target` selected without notifying the host. An association
	/// shown both as an edge and as proxy nodes is selected everywhere.
	pub fn select(&mut self, target: Target) -> bool {
		if self.elements_for(target).is_empty() {
			debug!("topicmap: select of unknown {:?}", target);
			return false;
		}
		self.suspended.select = true;
		let changed = self.set_selected(target, true);
		self.suspended.select = false;
		changed
	}

	/// Marks `target` unselected without notifying the host.
	pub fn unselect(&mut self, target: Target) -> bool {
		if self.elements_for(target).is_empty() {
			debug!("topicmap: unselect of unknown {:?}", target);
			return false;
		}
		self.suspended.unselect = true;
		let changed = self.set_selected(target, false);
		self.suspended.unselect = false;
		changed
	}

	/// Makes the visual selection match the host selection.
	pub fn sync_selection(&mut self) {
		let selection = self.selection.borrow().clone();
		let wanted = |target: Target| match target {
			Target::Topic(id) => selection.contains(SelectionKind::Topics, id),
			Target::Assoc(id) => selection.contains(SelectionKind::Assocs, id),
		};
		let mut changes: Vec<(Target, bool)> = Vec::new();
		for (target, selected) in self.element_flags() {
			let want = wanted(target);
			if selected != want && !changes.contains(&(target, want)) {
				changes.push((target, want));
			}
		}
		for (target, selected) in changes {
			if selected {
				self.select(target);
			} else {
				self.unselect(target);
			}
		}
	}

	/// Whether any element showing `target` is selected.
	pub fn is_selected(&self, target: Target) -> bool {
		self.elements_for(target)
			.into_iter()
			.any(|element| self.element_selected(element))
	}

	/// Shows a topic. Returns `false` if its element id is already shown.
	pub fn add_topic(&mut self, topic: ViewTopic) -> bool {
		let needs_layout = topic.pos.is_none();
		let added = self.state.add_topic(topic);
		if added && needs_layout {
			self.state.auto_layout();
		}
		self.dirty |= added;
		added
	}

	/// Shows an association as an edge. Returns `false` if it is already
	/// shown or a player is missing.
	pub fn add_assoc(&mut self, assoc: ViewAssoc) -> bool {
		let added = self.state.add_assoc(assoc);
		self.dirty |= added;
		added
	}

	/// Removes a node (by element id) and its edges.
	pub fn remove_node(&mut self, element_id: i64) -> bool {
		if self.drag.as_ref().is_some_and(|d| d.group().any(|id| id == element_id)) {
			self.pointer_leave();
		}
		let removed = self.state.remove_node(element_id).is_some();
		self.dirty |= removed;
		removed
	}

	/// Removes an association's edge.
	pub fn remove_assoc(&mut self, assoc_id: i64) -> bool {
		let removed = self.state.remove_edge(assoc_id).is_some();
		self.dirty |= removed;
		removed
	}

	/// Changes a node's label. The image is rebuilt on the next render pass.
	pub fn set_topic_label(&mut self, element_id: i64, label: impl Into<String>) {
		if let Some(node) = self.state.node_mut(element_id) {
			node.topic.label = label.into();
			self.dirty = true;
		}
	}

	/// Changes a node's icon code point.
	pub fn set_topic_icon(&mut self, element_id: i64, icon: impl Into<String>) {
		if let Some(node) = self.state.node_mut(element_id) {
			node.topic.icon = icon.into();
			self.dirty = true;
		}
	}

	/// Moves a node without reporting a drag.
	pub fn set_topic_position(&mut self, element_id: i64, pos: Position) {
		if let Some(node) = self.state.node_mut(element_id) {
			node.pos = pos;
			node.topic.pos = Some(pos);
			self.dirty = true;
		}
	}

	/// Shows or hides a node's border while its details are expanded in place.
	pub fn set_expanded(&mut self, element_id: i64, expanded: bool) {
		if let Some(node) = self.state.node_mut(element_id) {
			node.expanded = expanded;
			self.dirty = true;
		}
	}

	// Helpers

	fn emit(&mut self, event: TopicmapEvent) {
		debug!("topicmap: {}", event.name());
		self.effects.push(Effect::Emit(event));
	}

	/// Domain id of a node: the association id for proxies.
	fn resolved_id(&self, element_id: i64) -> Option<i64> {
		self.state.node(element_id).map(|n| n.target().id())
	}

	fn edge_at(&self, model: Position) -> Option<i64> {
		let scale = ScaledValues::new(&self.config, self.state.transform.k);
		self.state
			.edge_at(model, scale.edge_hit_tolerance, self.config.edge.width)
	}

	/// Reports a finished move. Only topic nodes report; when the node is
	/// selected every selected topic reports its position.
	fn topic_drag(&mut self, element_id: i64) {
		if let Some(NodeKind::Topic(topic_id)) = self.state.node(element_id).map(|n| n.kind) {
			let ids = dispatch_targets(&self.selection.borrow(), SelectionKind::Topics, topic_id);
			for id in ids {
				if let Some(node) = self.state.node_for(Target::Topic(id)) {
					let pos = node.pos;
					self.emit(TopicmapEvent::TopicDrag { id, pos });
				}
			}
		}
		self.effects.push(Effect::DragSettled);
	}

	/// Every element showing `target`: the association's edge first, then
	/// nodes in map order.
	fn elements_for(&self, target: Target) -> Vec<Element> {
		let edge = match target {
			Target::Assoc(id) => self.state.edge(id).map(|_| Element::Edge(id)),
			Target::Topic(_) => None,
		};
		edge.into_iter()
			.chain(
				self.state
					.nodes()
					.iter()
					.filter(|n| n.target() == target)
					.map(|n| Element::Node(n.element_id)),
			)
			.collect()
	}

	/// Target and selection flag of every element, nodes first.
	fn element_flags(&self) -> Vec<(Target, bool)> {
		self.state
			.nodes()
			.iter()
			.map(|n| (n.target(), n.selected))
			.chain(
				self.state
					.edges()
					.iter()
					.map(|e| (Target::Assoc(e.id()), e.selected)),
			)
			.collect()
	}

	fn element_target(&self, element: Element) -> Option<Target> {
		match element {
			Element::Node(id) => self.state.node(id).map(|n| n.target()),
			Element::Edge(id) => self.state.edge(id).map(|_| Target::Assoc(id)),
		}
	}

	fn element_selected(&self, element: Element) -> bool {
		match element {
			Element::Node(id) => self.state.node(id).is_some_and(|n| n.selected),
			Element::Edge(id) => self.state.edge(id).is_some_and(|e| e.selected),
		}
	}

	/// Sets the selection flag of every element showing `target` and
	/// notifies the host once if anything changed, unless notifications of
	/// that kind are suspended.
	fn set_selected(&mut self, target: Target, selected: bool) -> bool {
		let mut changed = false;
		for element in self.elements_for(target) {
			let flag = match element {
				Element::Node(id) => self.state.node_mut(id).map(|n| &mut n.selected),
				Element::Edge(id) => self.state.edge_mut(id).map(|e| &mut e.selected),
			};
			if let Some(flag) = flag.filter(|f| **f != selected) {
				*flag = selected;
				changed = true;
			}
		}
		if !changed {
			return false;
		}
		self.dirty = true;

		let suspended = if selected {
			self.suspended.select
		} else {
			self.suspended.unselect
		};
		if !suspended {
			self.emit(selection_event(target, selected));
		}
		true
	}

	fn unselect_all_except(&mut self, keep: Option<Target>) {
		let mut selected: Vec<Target> = Vec::new();
		for (target, flag) in self.element_flags() {
			if flag && Some(target) != keep && !selected.contains(&target) {
				selected.push(target);
			}
		}
		for target in selected {
			self.set_selected(target, false);
		}
	}
}

fn selection_event(target: Target, selected: bool) -> TopicmapEvent {
	match (target, selected) {
		(Target::Topic(id), true) => TopicmapEvent::TopicSelect(id),
		(Target::Topic(id), false) => TopicmapEvent::TopicUnselect(id),
		(Target::Assoc(id), true) => TopicmapEvent::AssocSelect(id),
		(Target::Assoc(id), false) => TopicmapEvent::AssocUnselect(id),
	}
}

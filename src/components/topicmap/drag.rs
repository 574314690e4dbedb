//! Node drag gestures.
//!
//! A gesture runs `idle -> dragging -> {dropped on node | moved | no-op}` and
//! ends on pointer-up. While dragging, the node under the pointer (other than
//! the nodes moving with the gesture) is the drop target and carries the hover
//! flag.

use super::state::TopicmapState;
use super::types::Position;

/// How a drag gesture ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DragOutcome {
	/// Released over another node. Positions have been reset.
	DroppedOn { dragged: i64, target: i64 },
	/// Released elsewhere after the grabbed node moved.
	Moved { node: i64 },
	/// Nothing happened.
	Idle,
}

/// Tracks an in-progress node drag operation.
#[derive(Clone, Debug)]
pub struct DragState {
	/// Element id of the grabbed node.
	pub node: i64,
	/// Pointer position at grab time, model coordinates.
	pub pointer_start: Position,
	/// Nodes moving with the pointer and their positions at grab time.
	group: Vec<(i64, Position)>,
	/// Current drop target.
	pub hover_node: Option<i64>,
}

impl DragState {
	/// Starts a gesture on `node`. `companions` move along with it.
	pub fn new(
		state: &TopicmapState,
		node: i64,
		pointer_start: Position,
		companions: impl IntoIterator<Item = i64>,
	) -> Self {
		let mut group: Vec<(i64, Position)> = Vec::new();
		for id in std::iter::once(node).chain(companions) {
			if group.iter().any(|&(g, _)| g == id) {
				continue;
			}
			if let Some(n) = state.node(id) {
				group.push((id, n.pos));
			}
		}
		Self {
			node,
			pointer_start,
			group,
			hover_node: None,
		}
	}

	/// Element ids moving with this gesture, grabbed node first.
	pub fn group(&self) -> impl Iterator<Item = i64> + '_ {
		self.group.iter().map(|&(id, _)| id)
	}

	/// Follows the pointer: moves the group and updates the drop target.
	pub fn track(&mut self, state: &mut TopicmapState, pointer: Position, border_width: f64) {
		let (dx, dy) = (pointer.x - self.pointer_start.x, pointer.y - self.pointer_start.y);
		for &(id, start) in &self.group {
			state.move_node(id, Position::new(start.x + dx, start.y + dy));
		}

		let moving: Vec<i64> = self.group().collect();
		let candidate = state.node_at(pointer, &moving, border_width);
		if candidate != self.hover_node {
			self.unhover(state);
			self.hover_node = candidate;
			self.hover(state);
		}
	}

	/// Whether the grabbed node is away from where it was grabbed.
	pub fn moved(&self, state: &TopicmapState) -> bool {
		self.group
			.first()
			.and_then(|&(id, start)| state.node(id).map(|n| n.pos != start))
			.unwrap_or(false)
	}

	/// Puts every node of the group back to its grab-time position.
	pub fn reset_position(&self, state: &mut TopicmapState) {
		for &(id, start) in &self.group {
			state.move_node(id, start);
		}
	}

	/// Ends the gesture.
	pub fn finish(mut self, state: &mut TopicmapState) -> DragOutcome {
		if let Some(target) = self.hover_node {
			self.unhover(state);
			self.hover_node = None;
			self.reset_position(state);
			DragOutcome::DroppedOn {
				dragged: self.node,
				target,
			}
		} else if self.moved(state) {
			DragOutcome::Moved { node: self.node }
		} else {
			DragOutcome::Idle
		}
	}

	/// Aborts the gesture: clears the drop target and restores positions.
	pub fn cancel(mut self, state: &mut TopicmapState) {
		self.unhover(state);
		self.hover_node = None;
		self.reset_position(state);
	}

	fn hover(&self, state: &mut TopicmapState) {
		self.set_hover_flag(state, true);
	}

	fn unhover(&self, state: &mut TopicmapState) {
		self.set_hover_flag(state, false);
	}

	fn set_hover_flag(&self, state: &mut TopicmapState, hover: bool) {
		if let Some(node) = self.hover_node.and_then(|id| state.node_mut(id)) {
			node.hover = hover;
		}
	}
}

#[cfg(test)]
mod tests {
	use super::super::state::tests::topic;
	use super::super::types::TopicmapData;
	use super::*;

	fn state() -> TopicmapState {
		let data = TopicmapData {
			topics: vec![topic(1, 0.0, 0.0), topic(2, 200.0, 0.0), topic(3, 0.0, 200.0)],
			assocs: vec![],
		};
		TopicmapState::new(&data, 800.0, 600.0)
	}

	#[test]
	fn hover_toggles_on_enter_and_leave() {
		let mut state = state();
		let mut drag = DragState::new(&state, 1, Position::new(0.0, 0.0), []);
		drag.track(&mut state, Position::new(195.0, 2.0), 1.0);
		assert_eq!(drag.hover_node, Some(2));
		assert!(state.node(2).unwrap().hover);

		drag.track(&mut state, Position::new(5.0, 195.0), 1.0);
		assert_eq!(drag.hover_node, Some(3));
		assert!(!state.node(2).unwrap().hover);
		assert!(state.node(3).unwrap().hover);

		drag.track(&mut state, Position::new(400.0, 400.0), 1.0);
		assert_eq!(drag.hover_node, None);
		assert!(!state.node(3).unwrap().hover);
	}

	#[test]
	fn drop_resets_the_whole_group() {
		let mut state = state();
		let mut drag = DragState::new(&state, 1, Position::new(0.0, 0.0), [3]);
		drag.track(&mut state, Position::new(200.0, 0.0), 1.0);
		assert_eq!(state.node(3).unwrap().pos, Position::new(200.0, 200.0));

		let outcome = drag.finish(&mut state);
		assert_eq!(outcome, DragOutcome::DroppedOn { dragged: 1, target: 2 });
		assert_eq!(state.node(1).unwrap().pos, Position::new(0.0, 0.0));
		assert_eq!(state.node(3).unwrap().pos, Position::new(0.0, 200.0));
		assert!(!state.node(2).unwrap().hover);
	}

	#[test]
	fn movement_without_target_is_a_move() {
		let mut state = state();
		let mut drag = DragState::new(&state, 1, Position::new(0.0, 0.0), []);
		drag.track(&mut state, Position::new(50.0, 60.0), 1.0);
		assert_eq!(drag.finish(&mut state), DragOutcome::Moved { node: 1 });
		assert_eq!(state.node(1).unwrap().pos, Position::new(50.0, 60.0));
	}

	#[test]
	fn returning_to_start_is_a_no_op() {
		let mut state = state();
		let mut drag = DragState::new(&state, 1, Position::new(0.0, 0.0), []);
		drag.track(&mut state, Position::new(50.0, 60.0), 1.0);
		drag.track(&mut state, Position::new(0.0, 0.0), 1.0);
		assert_eq!(drag.finish(&mut state), DragOutcome::Idle);
	}

	#[test]
	fn companions_are_never_drop_targets() {
		// Node 4 overlaps node 1 and moves with it.
		let data = TopicmapData {
			topics: vec![topic(1, 0.0, 0.0), topic(4, 10.0, 5.0)],
			assocs: vec![],
		};
		let mut state = TopicmapState::new(&data, 800.0, 600.0);
		let mut drag = DragState::new(&state, 1, Position::new(0.0, 0.0), [4]);
		drag.track(&mut state, Position::new(300.0, 300.0), 1.0);
		assert_eq!(state.node(4).unwrap().pos, Position::new(310.0, 305.0));
		assert_eq!(drag.hover_node, None);
		assert!(!state.node(4).unwrap().hover);
		assert_eq!(drag.finish(&mut state), DragOutcome::Moved { node: 1 });
	}

	#[test]
	fn grabbed_node_is_never_its_own_target() {
		let mut state = state();
		let mut drag = DragState::new(&state, 1, Position::new(0.0, 0.0), []);
		drag.track(&mut state, Position::new(3.0, 3.0), 1.0);
		assert_eq!(drag.hover_node, None);
	}
}

//! Domain events and the outbound effect queue.

use std::fmt;
use std::rc::Rc;

use serde::Serialize;

use super::commands::CommandHandler;
use super::types::{Position, ViewTopic};

/// Notifications the view sends to the host.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "event", content = "payload", rename_all = "kebab-case")]
pub enum TopicmapEvent {
	TopicSelect(i64),
	TopicUnselect(i64),
	AssocSelect(i64),
	AssocUnselect(i64),
	TopicDoubleClick(ViewTopic),
	/// Right click on the empty canvas.
	#[serde(rename = "topicmap-contextmenu")]
	TopicmapContextmenu {
		/// Model coordinates.
		model: Position,
		/// Rendered (canvas pixel) coordinates.
		render: Position,
	},
	/// Topic 1 was dropped onto topic 2.
	#[serde(rename_all = "camelCase")]
	TopicDropOnTopic { topic_id1: i64, topic_id2: i64 },
	TopicDrag { id: i64, pos: Position },
	Zoom(f64),
}

impl TopicmapEvent {
	pub fn name(&self) -> &'static str {
		match self {
			TopicmapEvent::TopicSelect(_) => "topic-select",
			TopicmapEvent::TopicUnselect(_) => "topic-unselect",
			TopicmapEvent::AssocSelect(_) => "assoc-select",
			TopicmapEvent::AssocUnselect(_) => "assoc-unselect",
			TopicmapEvent::TopicDoubleClick(_) => "topic-double-click",
			TopicmapEvent::TopicmapContextmenu { .. } => "topicmap-contextmenu",
			TopicmapEvent::TopicDropOnTopic { .. } => "topic-drop-on-topic",
			TopicmapEvent::TopicDrag { .. } => "topic-drag",
			TopicmapEvent::Zoom(_) => "zoom",
		}
	}
}

/// Receives events drained from the view.
pub type EventSink = Rc<dyn Fn(TopicmapEvent)>;

/// Something the view wants done once the caller has released it.
///
/// Queuing instead of calling out keeps host handlers from re-entering the
/// view while one of its methods is still running.
#[derive(Clone)]
pub enum Effect {
	Emit(TopicmapEvent),
	/// Run a context command for one id.
	Command { handler: CommandHandler, id: i64 },
	/// A drag moved nodes and has settled.
	DragSettled,
}

impl fmt::Debug for Effect {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Effect::Emit(event) => f.debug_tuple("Emit").field(event).finish(),
			Effect::Command { id, .. } => f.debug_struct("Command").field("id", id).finish(),
			Effect::DragSettled => f.write_str("DragSettled"),
		}
	}
}

/// Host callbacks effects are delivered to.
#[derive(Clone)]
pub struct EffectTarget {
	pub on_event: EventSink,
	pub on_drag_settled: Rc<dyn Fn()>,
}

impl EffectTarget {
	/// Delivers effects in queue order.
	pub fn deliver(&self, effects: Vec<Effect>) {
		for effect in effects {
			match effect {
				Effect::Emit(event) => (self.on_event)(event),
				Effect::Command { handler, id } => handler(id),
				Effect::DragSettled => (self.on_drag_settled)(),
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use std::cell::RefCell;

	use super::*;

	#[test]
	fn serializes_with_event_name() {
		let json = serde_json::to_value(TopicmapEvent::TopicDropOnTopic {
			topic_id1: 1,
			topic_id2: 2,
		})
		.unwrap();
		assert_eq!(json["event"], "topic-drop-on-topic");
		assert_eq!(json["payload"]["topicId1"], 1);

		let ctx = TopicmapEvent::TopicmapContextmenu {
			model: Position::new(1.0, 2.0),
			render: Position::new(3.0, 4.0),
		};
		let json = serde_json::to_value(&ctx).unwrap();
		assert_eq!(json["event"], ctx.name());
		assert_eq!(json["payload"]["render"]["x"], 3.0);
	}

	#[test]
	fn delivers_in_queue_order() {
		let log = Rc::new(RefCell::new(Vec::new()));
		let (l1, l2, l3) = (log.clone(), log.clone(), log.clone());
		let target = EffectTarget {
			on_event: Rc::new(move |e: TopicmapEvent| l1.borrow_mut().push(e.name().to_string())),
			on_drag_settled: Rc::new(move || l2.borrow_mut().push("settled".into())),
		};
		let handler: CommandHandler = Rc::new(move |id: i64| l3.borrow_mut().push(format!("cmd {id}")));
		target.deliver(vec![
			Effect::Emit(TopicmapEvent::TopicSelect(1)),
			Effect::Command { handler, id: 4 },
			Effect::DragSettled,
		]);
		assert_eq!(*log.borrow(), vec!["topic-select", "cmd 4", "settled"]);
	}
}

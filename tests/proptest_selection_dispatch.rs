//! Property-based tests for selection-aware dispatch.
//!
//! 1. An action on a selected element applies to the selection snapshot.
//! 2. An action on an unselected element applies to that element only.
//! 3. Handlers that mutate the selection do not change who is invoked.
//! 4. Programmatic select/unselect never notifies the host.
//! 5. Association proxies only ever report association ids.

#![allow(unused_crate_dependencies)]

use std::cell::RefCell;
use std::rc::Rc;

use proptest::prelude::*;
use topicmap_view::components::topicmap::{
	ContextCommand, ContextCommands, Effect, EffectTarget, Position, Selection, SelectionKind,
	SharedSelection, Target, Theme, TopicmapData, TopicmapEvent, TopicmapView, ViewTopic,
	dispatch_targets,
};

// ── Helpers ─────────────────────────────────────────────────────────────

fn ids_strategy() -> impl Strategy<Value = Vec<i64>> {
	prop::collection::hash_set(0i64..50, 0..12).prop_map(|set| set.into_iter().collect())
}

fn kind_strategy() -> impl Strategy<Value = SelectionKind> {
	prop_oneof![Just(SelectionKind::Topics), Just(SelectionKind::Assocs)]
}

fn selection_of(kind: SelectionKind, ids: &[i64]) -> Selection {
	let mut selection = Selection::default();
	for &id in ids {
		selection.add(kind, id);
	}
	selection
}

/// Nodes on a grid 100 units apart. With `proxies` every node stands in for
/// association `1000 + id`.
fn grid(count: i64, proxies: bool) -> TopicmapData {
	let topics = (0..count)
		.map(|id| ViewTopic {
			id,
			label: format!("n{id}"),
			icon: "\u{f10c}".into(),
			pos: Some(Position::new((id % 5) as f64 * 100.0, (id / 5) as f64 * 100.0)),
			assoc_id: proxies.then_some(1000 + id),
		})
		.collect();
	TopicmapData {
		topics,
		assocs: vec![],
	}
}

fn view_of(data: &TopicmapData) -> TopicmapView {
	TopicmapView::new(
		data,
		800.0,
		600.0,
		SharedSelection::default(),
		ContextCommands::default(),
		Theme::default(),
	)
}

fn node_center(id: i64) -> Position {
	Position::new((id % 5) as f64 * 100.0, (id / 5) as f64 * 100.0)
}

// ═════════════════════════════════════════════════════════════════════════
// 1-2. Dispatch targets
// ═════════════════════════════════════════════════════════════════════════

proptest! {
	#[test]
	fn dispatch_targets_snapshot_or_single(
		ids in ids_strategy(),
		clicked in 0i64..50,
		kind in kind_strategy(),
	) {
		let selection = selection_of(kind, &ids);
		let targets = dispatch_targets(&selection, kind, clicked);
		if ids.contains(&clicked) {
			prop_assert_eq!(targets, ids);
		} else {
			prop_assert_eq!(targets, vec![clicked]);
		}
	}
}

proptest! {
	#[test]
	fn other_kind_never_widens_dispatch(ids in ids_strategy(), clicked in 0i64..50) {
		let selection = selection_of(SelectionKind::Topics, &ids);
		prop_assert_eq!(
			dispatch_targets(&selection, SelectionKind::Assocs, clicked),
			vec![clicked]
		);
	}
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Mutating handlers
// ═════════════════════════════════════════════════════════════════════════

proptest! {
	#[test]
	fn mutating_handler_sees_the_snapshot(
		ids in prop::collection::hash_set(0i64..10, 0..10),
		clicked in 0i64..10,
		proxies in any::<bool>(),
	) {
		// With proxies the nodes stand in for associations 1000..1010.
		let (kind, offset) = if proxies {
			(SelectionKind::Assocs, 1000)
		} else {
			(SelectionKind::Topics, 0)
		};
		let ids: Vec<i64> = ids.into_iter().map(|id| id + offset).collect();
		let clicked = clicked + offset;
		let target = if proxies { Target::Assoc(clicked) } else { Target::Topic(clicked) };

		let selection: SharedSelection = Rc::new(RefCell::new(selection_of(kind, &ids)));
		let seen = Rc::new(RefCell::new(Vec::new()));
		let (sel, log) = (selection.clone(), seen.clone());
		let hide = ContextCommand::new("Hide", move |id| {
			sel.borrow_mut().remove(kind, id);
			log.borrow_mut().push(id);
		});
		let commands = ContextCommands {
			topic: vec![hide.clone()],
			assoc: vec![hide],
		};
		let mut view = TopicmapView::new(
			&grid(10, proxies),
			800.0,
			600.0,
			selection.clone(),
			commands,
			Theme::default(),
		);

		prop_assert!(view.run_command(target, 0));
		let host = EffectTarget {
			on_event: Rc::new(|_: TopicmapEvent| {}),
			on_drag_settled: Rc::new(|| {}),
		};
		host.deliver(view.take_effects());

		if ids.contains(&clicked) {
			prop_assert_eq!(&*seen.borrow(), &ids);
			prop_assert!(selection.borrow().ids(kind).is_empty());
		} else {
			prop_assert_eq!(&*seen.borrow(), &vec![clicked]);
			let sel = selection.borrow();
			prop_assert_eq!(sel.ids(kind), ids.as_slice());
		}
	}
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Programmatic selection is silent
// ═════════════════════════════════════════════════════════════════════════

proptest! {
	#[test]
	fn programmatic_selection_never_emits(
		ops in prop::collection::vec((0i64..12, any::<bool>(), any::<bool>()), 0..40),
	) {
		let data = grid(10, false);
		let mut view = view_of(&data);
		for (id, select, proxy_id) in ops {
			let target = if proxy_id { Target::Assoc(id) } else { Target::Topic(id) };
			if select {
				view.select(target);
			} else {
				view.unselect(target);
			}
		}
		prop_assert!(view.take_effects().is_empty());
	}
}

// ═════════════════════════════════════════════════════════════════════════
// 5. Proxies report association ids
// ═════════════════════════════════════════════════════════════════════════

proptest! {
	#[test]
	fn proxy_taps_report_association_ids(
		taps in prop::collection::vec((0i64..10, any::<bool>(), 1u32..=2), 1..30),
	) {
		let data = grid(10, true);
		let mut view = view_of(&data);
		for (id, additive, clicks) in taps {
			view.tap(node_center(id), clicks, additive);
		}
		for effect in view.take_effects() {
			match effect {
				Effect::Emit(TopicmapEvent::AssocSelect(id))
				| Effect::Emit(TopicmapEvent::AssocUnselect(id)) => {
					prop_assert!((1000..1010).contains(&id), "element id leaked: {}", id);
				}
				other => prop_assert!(false, "unexpected effect {:?}", other),
			}
		}
	}
}

proptest! {
	#[test]
	fn tap_events_replay_into_view_selection(
		taps in prop::collection::vec((0i64..10, any::<bool>()), 1..30),
	) {
		let data = grid(10, false);
		let mut view = view_of(&data);
		let host = Rc::new(RefCell::new(Selection::default()));
		for (id, additive) in taps {
			view.tap(node_center(id), 1, additive);
			for effect in view.take_effects() {
				if let Effect::Emit(event) = effect {
					let mut host = host.borrow_mut();
					match event {
						TopicmapEvent::TopicSelect(id) => host.add(SelectionKind::Topics, id),
						TopicmapEvent::TopicUnselect(id) => host.remove(SelectionKind::Topics, id),
						_ => {}
					}
				}
			}
		}
		for id in 0..10 {
			prop_assert_eq!(
				view.is_selected(Target::Topic(id)),
				host.borrow().contains(SelectionKind::Topics, id)
			);
		}
	}
}

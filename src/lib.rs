//! topicmap-view: Interactive topicmap canvas.
//!
//! This crate provides a WASM-based topicmap component that renders topics and
//! associations as a node/edge graph with selection-aware context commands,
//! drag and drop, pan and zoom.

use std::rc::Rc;

use leptos::prelude::*;
use leptos_meta::*;
use log::{Level, info, warn};
use wasm_bindgen::JsCast;
use web_sys::{HtmlScriptElement, Window};

pub mod components;

pub use components::topicmap::{
	ContextCommand, ContextCommands, EventSink, Position, Selection, SelectionKind, SharedSelection, Target,
	TopicmapCanvas, TopicmapData, TopicmapEvent, TopicmapView, ViewAssoc, ViewTopic,
};

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("topicmap-view: logging initialized");
}

/// Load the topicmap from a script element with id="topicmap-data".
/// Expected format: JSON with { topics: [...], assocs: [...] }
fn load_topicmap_data() -> Option<TopicmapData> {
	let window: Window = web_sys::window()?;
	let document = window.document()?;
	let element = document.get_element_by_id("topicmap-data")?;
	let script: HtmlScriptElement = element.dyn_into().ok()?;
	let json_text = script.text().ok()?;

	match serde_json::from_str::<TopicmapData>(&json_text) {
		Ok(data) => {
			info!(
				"topicmap-view: loaded {} topics, {} assocs",
				data.topics.len(),
				data.assocs.len()
			);
			Some(data)
		}
		Err(e) => {
			warn!("topicmap-view: failed to parse topicmap data: {}", e);
			None
		}
	}
}

/// Keeps a selection in step with the view's select/unselect events.
pub fn track_selection(selection: &SharedSelection, event: &TopicmapEvent) {
	let mut selection = selection.borrow_mut();
	match *event {
		TopicmapEvent::TopicSelect(id) => selection.add(SelectionKind::Topics, id),
		TopicmapEvent::TopicUnselect(id) => selection.remove(SelectionKind::Topics, id),
		TopicmapEvent::AssocSelect(id) => selection.add(SelectionKind::Assocs, id),
		TopicmapEvent::AssocUnselect(id) => selection.remove(SelectionKind::Assocs, id),
		_ => {}
	}
}

/// Main application component.
/// Loads the topicmap from the DOM and renders it with a logging host.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	let topicmap = load_topicmap_data().unwrap_or_default();
	let topicmap_signal = Signal::derive(move || topicmap.clone());

	let selection = SharedSelection::default();
	let sel = selection.clone();
	let on_event: EventSink = Rc::new(move |event: TopicmapEvent| {
		match serde_json::to_string(&event) {
			Ok(json) => info!("topicmap-view: {}", json),
			Err(e) => warn!("topicmap-view: unserializable event: {}", e),
		}
		track_selection(&sel, &event);
	});

	let hide_sel = selection.clone();
	let commands = ContextCommands {
		topic: vec![
			ContextCommand::new("Hide", move |id| {
				info!("topicmap-view: hide topic {}", id);
				hide_sel.borrow_mut().remove(SelectionKind::Topics, id);
			}),
			ContextCommand::new("Details", |id| info!("topicmap-view: details of topic {}", id)),
		],
		assoc: vec![ContextCommand::new("Delete", |id| {
			info!("topicmap-view: delete assoc {}", id)
		})],
	};

	view! {
		<Html attr:lang="en" attr:dir="ltr" />
		<Title text="Topicmap" />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<div class="fullscreen-topicmap">
			<TopicmapCanvas
				data=topicmap_signal
				on_event=on_event
				selection=selection
				commands=commands
				icon_font_url="fonts/fontawesome-webfont.svg"
				fullscreen=true
			/>
			<div class="topicmap-overlay">
				<p class="subtitle">"Click to select, shift-click to extend. Right click for commands. Drag a topic onto another to relate them."</p>
			</div>
		</div>
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn selection_tracks_events() {
		let selection = SharedSelection::default();
		track_selection(&selection, &TopicmapEvent::TopicSelect(1));
		track_selection(&selection, &TopicmapEvent::AssocSelect(9));
		track_selection(&selection, &TopicmapEvent::TopicSelect(2));
		track_selection(&selection, &TopicmapEvent::TopicUnselect(1));
		track_selection(&selection, &TopicmapEvent::Zoom(2.0));
		assert_eq!(
			*selection.borrow(),
			Selection {
				topic_ids: vec![2],
				assoc_ids: vec![9],
			}
		);
	}
}

//! Topicmap visualization component.
//!
//! Renders topics and associations on an HTML canvas with:
//! - Node images composed of an icon-font glyph and the topic label
//! - Selection that follows the host's selection model
//! - Context commands that act on the whole selection when the clicked
//!   element is part of it
//! - Node dragging, dropping one topic onto another, pan and zoom
//!
//! Associations may be displayed as nodes ("association proxies"); every
//! event and command for such a node carries the association id.
//!
//! # Example
//!
//! ```ignore
//! use topicmap_view::{ContextCommand, ContextCommands, TopicmapCanvas, TopicmapData};
//!
//! let commands = ContextCommands {
//!     topic: vec![ContextCommand::new("Hide", move |id| hide_topic(id))],
//!     assoc: vec![],
//! };
//! let on_event = Rc::new(|event| log::info!("{:?}", event));
//!
//! view! { <TopicmapCanvas data=data.into() on_event=on_event commands=commands fullscreen=true /> }
//! ```

mod commands;
mod component;
mod drag;
mod events;
mod glyph;
mod measure;
mod node_image;
mod render;
pub mod scale;
mod selection;
mod state;
pub mod theme;
mod types;
mod view;

pub use commands::{CommandHandler, ContextCommand, ContextCommands, ContextMenu};
pub use component::TopicmapCanvas;
pub use events::{Effect, EffectTarget, EventSink, TopicmapEvent};
pub use glyph::{GlyphCause, GlyphError, GlyphSource, GlyphTable, load_icon_font};
pub use measure::{MeasureBox, TextMeasure, TextSize};
pub use node_image::{NodeImage, render_node};
pub use selection::{Selection, SelectionKind, SharedSelection, dispatch_targets};
pub use state::{TopicmapState, ViewEdge, ViewNode};
pub use theme::Theme;
pub use types::{Element, NodeKind, Position, Target, TopicmapData, ViewAssoc, ViewTopic};
pub use view::{RenderFailure, TopicmapView};

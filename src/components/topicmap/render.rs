//! Canvas rendering for the topicmap.
//!
//! Draws in two passes under the view transform: edges first, then nodes in
//! map order so later nodes sit on top (matching hit-testing).
//!
//! Nodes are drawn from their composed SVG image once the browser has decoded
//! it. Until then the label and icon are drawn directly.

use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;

use log::warn;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::Closure;
use web_sys::{CanvasRenderingContext2d, HtmlImageElement, Path2d};

use super::node_image::{ICON_SCALE, ICON_TRANSLATE, LABEL_BASELINE_OFFSET, LABEL_X, NodeImage};
use super::scale::{ScaleConfig, ScaledValues};
use super::state::{TopicmapState, ViewEdge, ViewNode};
use super::theme::Theme;

const LABEL_COLOR: &str = "#000000";

/// Decoded node images, keyed by element id.
pub struct NodeBitmaps {
	images: HashMap<i64, (String, HtmlImageElement)>,
	/// Set whenever an image finishes decoding.
	loaded: Rc<Cell<bool>>,
	on_load: Closure<dyn FnMut()>,
}

impl Default for NodeBitmaps {
	fn default() -> Self {
		let loaded = Rc::new(Cell::new(false));
		let flag = loaded.clone();
		Self {
			images: HashMap::new(),
			loaded,
			on_load: Closure::new(move || flag.set(true)),
		}
	}
}

impl NodeBitmaps {
	/// Starts decoding the image of every node whose picture changed and
	/// forgets nodes that are gone or failed to render.
	pub fn refresh(&mut self, state: &TopicmapState) {
		let mut images = HashMap::with_capacity(state.nodes().len());
		for node in state.nodes() {
			let Some(image) = &node.image else {
				continue;
			};
			let url = image.data_url();
			match self.images.remove(&node.element_id) {
				Some(entry) if entry.0 == url => {
					images.insert(node.element_id, entry);
				}
				_ => match HtmlImageElement::new() {
					Ok(img) => {
						let _ = img.add_event_listener_with_callback(
							"load",
							self.on_load.as_ref().unchecked_ref(),
						);
						img.set_src(&url);
						images.insert(node.element_id, (url, img));
					}
					Err(e) => warn!("topicmap: cannot create image: {:?}", e),
				},
			}
		}
		self.images = images;
	}

	/// Returns whether an image finished decoding since the last call.
	pub fn take_loaded(&self) -> bool {
		self.loaded.replace(false)
	}

	fn ready(&self, element_id: i64) -> Option<&HtmlImageElement> {
		self.images
			.get(&element_id)
			.map(|(_, img)| img)
			.filter(|img| img.complete() && img.natural_width() > 0)
	}
}

/// Renders the complete topicmap to the canvas.
pub fn render(
	state: &TopicmapState,
	bitmaps: &NodeBitmaps,
	ctx: &CanvasRenderingContext2d,
	config: &ScaleConfig,
	theme: &Theme,
) {
	let scale = ScaledValues::new(config, state.transform.k);

	ctx.set_fill_style_str(&theme.background_color);
	ctx.fill_rect(0.0, 0.0, state.width, state.height);

	ctx.save();
	let _ = ctx.translate(state.transform.x, state.transform.y);
	let _ = ctx.scale(state.transform.k, state.transform.k);

	for edge in state.edges() {
		draw_edge(state, ctx, config, &scale, theme, edge);
	}
	for node in state.nodes() {
		draw_node(ctx, bitmaps, config, theme, node);
	}

	ctx.restore();
}

fn draw_edge(
	state: &TopicmapState,
	ctx: &CanvasRenderingContext2d,
	config: &ScaleConfig,
	scale: &ScaledValues,
	theme: &Theme,
	edge: &ViewEdge,
) {
	let Some((a, b)) = state.endpoints(edge) else {
		return;
	};
	let width = if edge.selected {
		config.edge.selected_width
	} else {
		config.edge.width
	};

	ctx.set_stroke_style_str(&theme.edge_color.to_css());
	ctx.set_line_width(width);
	ctx.begin_path();
	ctx.move_to(a.x, a.y);
	ctx.line_to(b.x, b.y);
	ctx.stroke();

	let Some(label) = edge.assoc.label.as_deref().filter(|l| !l.is_empty()) else {
		return;
	};
	let (mx, my) = ((a.x + b.x) / 2.0, (a.y + b.y) / 2.0);
	ctx.save();
	let _ = ctx.translate(mx, my);
	let _ = ctx.scale(scale.edge_label_scale, scale.edge_label_scale);
	ctx.set_font(&theme.edge_label_font());
	ctx.set_text_align("center");
	ctx.set_fill_style_str(&theme.edge_label_color.to_css());
	let _ = ctx.fill_text(label, 0.0, -config.edge.label_margin);
	ctx.restore();
}

fn draw_node(
	ctx: &CanvasRenderingContext2d,
	bitmaps: &NodeBitmaps,
	config: &ScaleConfig,
	theme: &Theme,
	node: &ViewNode,
) {
	let (x, y) = (node.pos.x - node.width / 2.0, node.pos.y - node.height / 2.0);

	ctx.set_fill_style_str(&theme.background_color);
	ctx.fill_rect(x, y, node.width, node.height);

	if let Some(img) = bitmaps.ready(node.element_id) {
		let _ = ctx.draw_image_with_html_image_element_and_dw_and_dh(
			img,
			x,
			y,
			node.width,
			node.height,
		);
	} else if let Some(image) = &node.image {
		draw_node_image(ctx, theme, image, x, y);
	}

	if node.expanded {
		return;
	}
	let (width, color) = if node.hover {
		(config.border.hover, &theme.hover_border_color)
	} else if node.selected {
		(config.border.selected, &theme.highlight_color)
	} else {
		(config.border.normal, &theme.border_color)
	};
	ctx.set_stroke_style_str(color);
	ctx.set_line_width(width);
	ctx.stroke_rect(x, y, node.width, node.height);
}

/// Draws the label and icon of a node image with its top-left at `(x, y)`
/// while its SVG is still decoding.
fn draw_node_image(ctx: &CanvasRenderingContext2d, theme: &Theme, image: &NodeImage, x: f64, y: f64) {
	ctx.set_font(&theme.node_font());
	ctx.set_text_align("left");
	ctx.set_fill_style_str(LABEL_COLOR);
	let _ = ctx.fill_text(&image.label, x + LABEL_X, y + image.height - LABEL_BASELINE_OFFSET);

	let path = match Path2d::new_with_path_string(&image.icon_path) {
		Ok(path) => path,
		Err(e) => {
			warn!("topicmap: bad icon path: {:?}", e);
			return;
		}
	};
	ctx.save();
	let _ = ctx.translate(x, y);
	let _ = ctx.scale(ICON_SCALE.0, ICON_SCALE.1);
	let _ = ctx.translate(ICON_TRANSLATE.0, ICON_TRANSLATE.1);
	ctx.set_fill_style_str(&theme.icon_color);
	ctx.fill_with_path_2d(&path);
	ctx.restore();
}

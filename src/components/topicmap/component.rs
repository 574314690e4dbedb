//! Leptos component wrapping the topicmap canvas.
//!
//! The component creates an HTML canvas element and wires mouse and wheel
//! handlers into a [`TopicmapView`]. Drawing happens in a
//! `requestAnimationFrame` loop, and only when the view reports changes.
//! Effects queued by the view are delivered after its borrow is released, so
//! host callbacks may freely change the selection.

use std::cell::RefCell;
use std::mem;
use std::rc::Rc;

use leptos::prelude::*;
use log::{error, info};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlElement, MouseEvent, WheelEvent, Window};

use super::commands::{ContextCommands, ContextMenu};
use super::events::{EffectTarget, EventSink};
use super::glyph::{GlyphTable, load_icon_font};
use super::measure::MeasureBox;
use super::render::{self, NodeBitmaps};
use super::selection::SharedSelection;
use super::theme::Theme;
use super::types::{Position, TopicmapData};
use super::view::TopicmapView;

/// The view plus the browser resources it renders with.
struct TopicmapContext {
	view: TopicmapView,
	glyphs: Option<GlyphTable>,
	measure: MeasureBox,
	bitmaps: NodeBitmaps,
	/// Node images must be rendered before the next draw.
	stale_images: bool,
}

type SharedContext = Rc<RefCell<Option<TopicmapContext>>>;

/// Renders an interactive topicmap on a canvas element.
///
/// Topics and associations come from the reactive `data` signal. Events are
/// delivered to `on_event`; the host is expected to keep `selection` up to
/// date from the select/unselect events, and the visual selection follows it
/// after every delivery. Set `fullscreen = true` to fill the viewport;
/// explicit `width`/`height` override automatic sizing.
#[component]
pub fn TopicmapCanvas(
	#[prop(into)] data: Signal<TopicmapData>,
	on_event: EventSink,
	#[prop(optional)] selection: SharedSelection,
	#[prop(optional)] commands: ContextCommands,
	#[prop(optional, into)] icon_font_url: Option<String>,
	#[prop(optional)] on_drag_settled: Option<Rc<dyn Fn()>>,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let measure_ref = NodeRef::<leptos::html::Div>::new();
	let menu = RwSignal::new(None::<ContextMenu>);
	let chosen = RwSignal::new(None::<usize>);

	let target = EffectTarget {
		on_event,
		on_drag_settled: on_drag_settled.unwrap_or_else(|| Rc::new(|| {})),
	};
	let context: SharedContext = Rc::new(RefCell::new(None));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let (context_init, animate_init, resize_cb_init) =
		(context.clone(), animate.clone(), resize_cb.clone());

	Effect::new(move |_| {
		let (Some(canvas), Some(probe)) = (canvas_ref.get(), measure_ref.get()) else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let probe: HtmlElement = probe.into();
		let Some(window) = web_sys::window() else {
			return;
		};

		let (w, h) = if fullscreen {
			window_size(&window)
		} else {
			(
				width.unwrap_or_else(|| {
					canvas
						.parent_element()
						.map(|p| p.client_width() as f64)
						.unwrap_or(800.0)
				}),
				height.unwrap_or_else(|| {
					canvas
						.parent_element()
						.map(|p| p.client_height() as f64)
						.unwrap_or(600.0)
				}),
			)
		};
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let ctx: CanvasRenderingContext2d = match canvas.get_context("2d") {
			Ok(Some(ctx)) => match ctx.dyn_into() {
				Ok(ctx) => ctx,
				Err(_) => return,
			},
			_ => {
				error!("topicmap: canvas has no 2d context");
				return;
			}
		};

		let theme = Theme::from_document();
		let _ = probe.style().set_property("font", &theme.node_font());
		let view = TopicmapView::new(
			&data.get_untracked(),
			w,
			h,
			selection.clone(),
			commands.clone(),
			theme,
		);
		*context_init.borrow_mut() = Some(TopicmapContext {
			view,
			glyphs: None,
			measure: MeasureBox::new(probe),
			bitmaps: NodeBitmaps::default(),
			stale_images: true,
		});
		if let Some(c) = context_init.borrow_mut().as_mut() {
			c.view.sync_selection();
		}

		if let Some(url) = icon_font_url.clone() {
			let context_font = context_init.clone();
			leptos::task::spawn_local(async move {
				match load_icon_font(&url).await {
					Ok(table) => {
						if let Some(c) = context_font.borrow_mut().as_mut() {
							c.glyphs = Some(table);
							c.stale_images = true;
							c.view.mark_dirty();
						}
					}
					Err(e) => error!("topicmap: {}", e),
				}
			});
		}

		if fullscreen {
			let (context_resize, canvas_resize) = (context_init.clone(), canvas.clone());
			*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
				let Some(win) = web_sys::window() else {
					return;
				};
				let (nw, nh) = window_size(&win);
				canvas_resize.set_width(nw as u32);
				canvas_resize.set_height(nh as u32);
				if let Some(c) = context_resize.borrow_mut().as_mut() {
					c.view.resize(nw, nh);
				}
			}));
			if let Some(ref cb) = *resize_cb_init.borrow() {
				let _ =
					window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}

		let (context_anim, animate_inner) = (context_init.clone(), animate_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			if let Some(c) = context_anim.borrow_mut().as_mut() {
				if c.bitmaps.take_loaded() {
					c.view.mark_dirty();
				}
				if c.view.take_redraw() {
					if mem::take(&mut c.stale_images) {
						for failure in c.view.render_nodes(&c.measure, &c.glyphs) {
							error!("topicmap: node {}: {}", failure.element_id, failure.error);
						}
						c.bitmaps.refresh(c.view.state());
					}
					render::render(
						c.view.state(),
						&c.bitmaps,
						&ctx,
						c.view.config(),
						c.view.theme(),
					);
				}
			}
			if let Some(ref cb) = *animate_inner.borrow() {
				if let Some(win) = web_sys::window() {
					let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
				}
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let context_data = context.clone();
	Effect::new(move |prev: Option<()>| {
		let data = data.get();
		// The initial map is built when the canvas mounts.
		if prev.is_none() {
			return;
		}
		if let Some(c) = context_data.borrow_mut().as_mut() {
			info!(
				"topicmap: showing {} topics, {} assocs",
				data.topics.len(),
				data.assocs.len()
			);
			c.view.load(&data);
			c.stale_images = true;
		}
	});

	let (context_cmd, target_cmd) = (context.clone(), target.clone());
	Effect::new(move |_| {
		let Some(index) = chosen.get() else {
			return;
		};
		chosen.set(None);
		if let Some(c) = context_cmd.borrow_mut().as_mut() {
			c.view.select_menu_command(index);
		}
		deliver(&context_cmd, &target_cmd, menu);
	});

	let (context_md, target_md) = (context.clone(), target.clone());
	let on_mousedown = move |ev: MouseEvent| {
		if ev.button() != 0 {
			return;
		}
		let Some(p) = canvas_point(canvas_ref, &ev) else {
			return;
		};
		if let Some(c) = context_md.borrow_mut().as_mut() {
			c.view.pointer_down(p);
		}
		deliver(&context_md, &target_md, menu);
	};

	let (context_mm, target_mm) = (context.clone(), target.clone());
	let on_mousemove = move |ev: MouseEvent| {
		let Some(p) = canvas_point(canvas_ref, &ev) else {
			return;
		};
		if let Some(c) = context_mm.borrow_mut().as_mut() {
			c.view.pointer_move(p);
		}
		deliver(&context_mm, &target_mm, menu);
	};

	let (context_mu, target_mu) = (context.clone(), target.clone());
	let on_mouseup = move |ev: MouseEvent| {
		let Some(p) = canvas_point(canvas_ref, &ev) else {
			return;
		};
		if let Some(c) = context_mu.borrow_mut().as_mut() {
			c.view.pointer_up(p);
		}
		deliver(&context_mu, &target_mu, menu);
	};

	let (context_ml, target_ml) = (context.clone(), target.clone());
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(c) = context_ml.borrow_mut().as_mut() {
			c.view.pointer_leave();
		}
		deliver(&context_ml, &target_ml, menu);
	};

	let (context_cl, target_cl) = (context.clone(), target.clone());
	let on_click = move |ev: MouseEvent| {
		let Some(p) = canvas_point(canvas_ref, &ev) else {
			return;
		};
		let additive = ev.shift_key() || ev.ctrl_key() || ev.meta_key();
		let clicks = ev.detail().max(1) as u32;
		if let Some(c) = context_cl.borrow_mut().as_mut() {
			c.view.tap(p, clicks, additive);
		}
		deliver(&context_cl, &target_cl, menu);
	};

	let (context_cm, target_cm) = (context.clone(), target.clone());
	let on_contextmenu = move |ev: MouseEvent| {
		ev.prevent_default();
		let Some(p) = canvas_point(canvas_ref, &ev) else {
			return;
		};
		if let Some(c) = context_cm.borrow_mut().as_mut() {
			c.view.context_tap(p);
		}
		deliver(&context_cm, &target_cm, menu);
	};

	let (context_wh, target_wh) = (context.clone(), target.clone());
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some(p) = canvas_point(canvas_ref, &ev) else {
			return;
		};
		if let Some(c) = context_wh.borrow_mut().as_mut() {
			c.view.wheel(p, ev.delta_y());
		}
		deliver(&context_wh, &target_wh, menu);
	};

	view! {
		<div class="topicmap" style="position: relative;">
			<canvas
				node_ref=canvas_ref
				class="topicmap-canvas"
				on:mousedown=on_mousedown
				on:mousemove=on_mousemove
				on:mouseup=on_mouseup
				on:mouseleave=on_mouseleave
				on:click=on_click
				on:contextmenu=on_contextmenu
				on:wheel=on_wheel
				style="display: block; cursor: default;"
			/>
			<div
				node_ref=measure_ref
				class="topicmap-measure"
				style="position: absolute; left: 0; top: 0; visibility: hidden; white-space: nowrap;"
			/>
			{move || {
				menu.get()
					.map(|m| {
						let style = format!("position: absolute; left: {}px; top: {}px;", m.at.x, m.at.y);
						view! {
							<ul class="topicmap-context-menu" style=style>
								{m
									.labels
									.into_iter()
									.enumerate()
									.map(|(i, label)| {
										view! { <li on:click=move |_| chosen.set(Some(i))>{label}</li> }
									})
									.collect_view()}
							</ul>
						}
					})
			}}
		</div>
	}
}

/// Hands queued effects to the host once the view is no longer borrowed,
/// then brings the visual selection in line with the host's.
fn deliver(context: &SharedContext, target: &EffectTarget, menu: RwSignal<Option<ContextMenu>>) {
	let effects = match context.borrow_mut().as_mut() {
		Some(c) => {
			let open = c.view.context_menu().cloned();
			if menu.with_untracked(|m| *m != open) {
				menu.set(open);
			}
			c.view.take_effects()
		}
		None => return,
	};
	if effects.is_empty() {
		return;
	}
	target.deliver(effects);
	if let Some(c) = context.borrow_mut().as_mut() {
		c.view.sync_selection();
	}
}

fn canvas_point(canvas_ref: NodeRef<leptos::html::Canvas>, ev: &MouseEvent) -> Option<Position> {
	let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
	let rect = canvas.get_bounding_client_rect();
	Some(Position::new(
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

fn window_size(window: &Window) -> (f64, f64) {
	(
		window
			.inner_width()
			.ok()
			.and_then(|v| v.as_f64())
			.unwrap_or(800.0),
		window
			.inner_height()
			.ok()
			.and_then(|v| v.as_f64())
			.unwrap_or(600.0),
	)
}

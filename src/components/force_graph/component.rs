use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use log::{debug, info, warn};
use send_wrapper::SendWrapper;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent, Window};

use super::frame_loop::FrameLoop;
use super::palette::WorkspacePalette;
use super::render;
use super::state::ForceGraphState;
use crate::config::GraphViewConfig;
use crate::graph::{GraphNode, GraphSnapshot};

/// Called with `(page_id, page_title)` when a node is clicked.
pub type NavigateFn = Rc<dyn Fn(&str, &str)>;

type AnimationSlot = Rc<RefCell<FrameLoop<Closure<dyn FnMut(f64)>>>>;
type ResizeListener = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

fn canvas_size(
	window: &Window,
	canvas: &HtmlCanvasElement,
	fullscreen: bool,
	width: Option<f64>,
	height: Option<f64>,
) -> (f64, f64) {
	if fullscreen {
		let w = window.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(800.0);
		let h = window.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(600.0);
		return (w, h);
	}
	let parent = canvas.parent_element();
	(
		width.unwrap_or_else(|| parent.as_ref().map_or(800.0, |p| p.client_width() as f64)),
		height.unwrap_or_else(|| parent.as_ref().map_or(600.0, |p| p.client_height() as f64)),
	)
}

fn request_frame(window: &Window, slot: &AnimationSlot) {
	let mut frames = slot.borrow_mut();
	let id = frames
		.callback()
		.and_then(|cb| window.request_animation_frame(cb.as_ref().unchecked_ref()).ok());
	if let Some(id) = id {
		frames.scheduled(id);
	}
}

fn context_2d(canvas: &HtmlCanvasElement) -> Option<CanvasRenderingContext2d> {
	canvas.get_context("2d").ok().flatten()?.dyn_into().ok()
}

fn local_point(canvas_ref: NodeRef<leptos::html::Canvas>, ev: &MouseEvent) -> Option<(f64, f64)> {
	let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
	let rect = canvas.get_bounding_client_rect();
	Some((
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

/// Interactive force-directed view of a [`GraphSnapshot`].
///
/// One animation loop runs per mounted canvas. A new snapshot replaces the
/// layout in place. Unmounting stops the layout, cancels the pending frame
/// and removes the resize listener.
#[component]
pub fn ForceGraphCanvas(
	#[prop(into)] data: Signal<GraphSnapshot>,
	config: GraphViewConfig,
	on_navigate: NavigateFn,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let state: Rc<RefCell<Option<ForceGraphState>>> = Rc::new(RefCell::new(None));
	let animate: AnimationSlot = Rc::new(RefCell::new(FrameLoop::default()));
	let resize_cb: ResizeListener = Rc::new(RefCell::new(None));

	let hovered = RwSignal::new(None::<GraphNode>);
	let pointer = RwSignal::new((0.0, 0.0));
	let cursor = RwSignal::new("grab");
	let expanded = RwSignal::new(false);
	let expand_controls = config.expand_controls;

	let (state_init, animate_init, resize_cb_init) =
		(state.clone(), animate.clone(), resize_cb.clone());
	Effect::new(move |_| {
		let snapshot = data.get();
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();

		let previous = state_init.borrow_mut().take();
		if let Some(previous) = previous {
			*state_init.borrow_mut() = Some(ForceGraphState::replacing(previous, &snapshot));
			hovered.set(None);
			return;
		}

		let Some(window) = web_sys::window() else {
			return;
		};
		let (w, h) = canvas_size(&window, &canvas, fullscreen, width, height);
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);
		let Some(ctx) = context_2d(&canvas) else {
			warn!("canvas has no 2d context; graph not drawn");
			return;
		};
		*state_init.borrow_mut() = Some(ForceGraphState::new(&snapshot, w, h, &config));
		info!(
			"graph canvas mounted: {} nodes, {} edges",
			snapshot.nodes.len(),
			snapshot.edges.len()
		);

		let (state_resize, canvas_resize) = (state_init.clone(), canvas.clone());
		*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
			let Some(win) = web_sys::window() else {
				return;
			};
			let (nw, nh) = canvas_size(&win, &canvas_resize, fullscreen, width, height);
			canvas_resize.set_width(nw as u32);
			canvas_resize.set_height(nh as u32);
			if let Some(ref mut s) = *state_resize.borrow_mut() {
				s.resize(nw, nh);
			}
		}));
		if let Some(ref cb) = *resize_cb_init.borrow() {
			let _ = window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
		}

		let (state_anim, animate_inner) = (state_init.clone(), animate_init.clone());
		animate_init.borrow_mut().start(Closure::new(move |now: f64| {
			if let Some(ref mut s) = *state_anim.borrow_mut() {
				s.tick(now);
				render::render(s, &ctx);
			}
			if let Some(win) = web_sys::window() {
				request_frame(&win, &animate_inner);
			}
		}));
		request_frame(&window, &animate_init);
	});

	let owned = SendWrapper::new((state.clone(), animate.clone(), resize_cb.clone()));
	on_cleanup(move || {
		let (state, animate, resize_cb) = owned.take();
		if let Some(ref mut s) = *state.borrow_mut() {
			s.teardown();
		}
		let pending = animate.borrow_mut().stop();
		if let Some(win) = web_sys::window() {
			if let Some(id) = pending {
				let _ = win.cancel_animation_frame(id);
			}
			if let Some(cb) = resize_cb.borrow_mut().take() {
				let _ = win.remove_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}
		debug!("graph canvas unmounted; animation loop stopped");
	});

	let state_md = state.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some((x, y)) = local_point(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut s) = *state_md.borrow_mut() {
			s.pointer_down(x, y, ev.time_stamp());
			cursor.set(if s.drag.active { "grabbing" } else { "move" });
		}
	};

	let state_mm = state.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = local_point(canvas_ref, &ev) else {
			return;
		};
		pointer.set((x, y));
		if let Some(ref mut s) = *state_mm.borrow_mut() {
			if s.pointer_move(x, y, ev.time_stamp()) {
				hovered.set(s.hovered_node().cloned());
				cursor.set(if s.hover.node.is_some() { "pointer" } else { "grab" });
			}
		}
	};

	let state_mu = state.clone();
	let on_mouseup = move |ev: MouseEvent| {
		let clicked = match *state_mu.borrow_mut() {
			Some(ref mut s) => s.pointer_up(ev.time_stamp()),
			None => None,
		};
		cursor.set(if hovered.with_untracked(Option::is_some) { "pointer" } else { "grab" });
		if let Some((id, title)) = clicked {
			debug!("navigating to page {id}");
			on_navigate(&id, &title);
		}
	};

	let state_ml = state.clone();
	let on_mouseleave = move |ev: MouseEvent| {
		if let Some(ref mut s) = *state_ml.borrow_mut() {
			s.pointer_leave(ev.time_stamp());
		}
		hovered.set(None);
		cursor.set("grab");
	};

	let state_wh = state.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some((x, y)) = local_point(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut s) = *state_wh.borrow_mut() {
			s.wheel(x, y, ev.delta_y(), ev.time_stamp());
		}
	};

	let state_tg = state.clone();
	let on_toggle_density = move |_: MouseEvent| {
		let next = !expanded.get_untracked();
		expanded.set(next);
		if let Some(ref mut s) = *state_tg.borrow_mut() {
			s.set_expanded(next);
		}
	};

	let legend = move || {
		data.with(|d| WorkspacePalette::from_nodes(&d.nodes).legend())
			.into_iter()
			.map(|(workspace, color)| {
				view! {
					<li>
						<span class="swatch" style=format!("background: {color};") />
						{workspace}
					</li>
				}
			})
			.collect_view()
	};

	let tooltip = move || {
		hovered.get().map(|node| {
			let (x, y) = pointer.get();
			view! {
				<div
					class="graph-tooltip"
					style=format!("position: absolute; left: {}px; top: {}px;", x + 12.0, y + 12.0)
				>
					<strong>{node.title}</strong>
					<span class="workspace">{node.workspace}</span>
					<span class="links">{format!("{} links", node.link_count)}</span>
				</div>
			}
		})
	};

	view! {
		<div class="force-graph" style="position: relative;">
			<canvas
				node_ref=canvas_ref
				class="force-graph-canvas"
				on:mousedown=on_mousedown
				on:mousemove=on_mousemove
				on:mouseup=on_mouseup
				on:mouseleave=on_mouseleave
				on:wheel=on_wheel
				style=move || format!("display: block; cursor: {};", cursor.get())
			/>
			<Show when=move || data.with(GraphSnapshot::is_empty)>
				<p class="graph-empty">"No linked pages yet"</p>
			</Show>
			{tooltip}
			<ul class="graph-legend">{legend}</ul>
			{expand_controls.then(|| view! {
				<button class="graph-density" on:click=on_toggle_density>
					{move || if expanded.get() { "Compact" } else { "Expand" }}
				</button>
			})}
		</div>
	}
}

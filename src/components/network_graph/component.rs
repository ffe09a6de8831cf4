use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use leptos::prelude::*;
use leptos::task::spawn_local;
use log::{debug, error};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent};

use super::render;
use super::state::{LayoutTracker, NetworkGraphState, Relayout};
use crate::model::{Entity, GraphData};

const MIN_WIDTH: f64 = 300.0;
const MIN_HEIGHT: f64 = 200.0;

type SharedState = Rc<RefCell<Option<NetworkGraphState>>>;
type SharedCallback = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

fn measure(canvas: &HtmlCanvasElement, width: Option<f64>, height: Option<f64>) -> (f64, f64) {
	let parent = canvas.parent_element();
	let w = width.unwrap_or_else(|| parent.as_ref().map(|p| p.client_width() as f64).unwrap_or(600.0));
	let h = height.unwrap_or_else(|| parent.as_ref().map(|p| p.client_height() as f64).unwrap_or(400.0));
	(w.max(MIN_WIDTH), h.max(MIN_HEIGHT))
}

/// Bring the simulation in line with the current graph and canvas size.
fn sync_layout(
	canvas: &HtmlCanvasElement,
	graph: &GraphData,
	size: (f64, f64),
	state: &SharedState,
	tracker: &RefCell<LayoutTracker>,
) {
	let (w, h) = size;
	let relayout = tracker.borrow_mut().observe(graph, w, h);
	if relayout == Relayout::Keep {
		return;
	}
	canvas.set_width(w as u32);
	canvas.set_height(h as u32);

	let mut slot = state.borrow_mut();
	if let (Relayout::Refresh | Relayout::Reheat, Some(s)) = (relayout, slot.as_mut()) {
		if relayout == Relayout::Refresh {
			debug!("refreshing {} nodes in place", graph.nodes.len());
			s.refresh(graph);
		}
		if (s.width, s.height) != (w, h) {
			s.resize(w, h);
		}
		return;
	}
	debug!("layout rebuild for {} nodes", graph.nodes.len());
	*slot = Some(NetworkGraphState::new(graph, w, h));
}

fn pointer(canvas_ref: NodeRef<leptos::html::Canvas>, ev: &MouseEvent) -> Option<(f64, f64)> {
	let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
	let rect = canvas.get_bounding_client_rect();
	Some((ev.client_x() as f64 - rect.left(), ev.client_y() as f64 - rect.top()))
}

/// Force-directed transaction network. Clicking a node reports its entity.
#[component]
pub fn NetworkGraphCanvas(
	#[prop(into)] data: Signal<GraphData>,
	#[prop(into)] on_select: Callback<Entity>,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let state: SharedState = Rc::new(RefCell::new(None));
	let tracker = Rc::new(RefCell::new(LayoutTracker::default()));
	let animate_fx: SharedCallback = Rc::new(RefCell::new(None));
	let alive = Arc::new(AtomicBool::new(true));

	let (state_rs, tracker_rs) = (state.clone(), tracker.clone());
	let resize = window_event_listener(leptos::ev::resize, move |_| {
		let Some(canvas) = canvas_ref.get_untracked() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let size = measure(&canvas, width, height);
		sync_layout(&canvas, &data.get_untracked(), size, &state_rs, &tracker_rs);
	});

	// The animation loop notices `alive` on its next frame and releases itself.
	let alive_cleanup = alive.clone();
	on_cleanup(move || {
		alive_cleanup.store(false, Ordering::Relaxed);
		resize.remove();
	});

	let (state_fx, tracker_fx) = (state.clone(), tracker.clone());
	Effect::new(move |_| {
		let graph = data.get();
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		sync_layout(&canvas, &graph, measure(&canvas, width, height), &state_fx, &tracker_fx);

		let Some(window) = web_sys::window() else {
			return;
		};
		if animate_fx.borrow().is_some() {
			return;
		}
		let ctx = match canvas.get_context("2d") {
			Ok(Some(ctx)) => ctx.dyn_into::<CanvasRenderingContext2d>().ok(),
			_ => None,
		};
		let Some(ctx) = ctx else {
			error!("2d canvas context unavailable");
			return;
		};

		let (state_anim, animate_inner, alive_anim) = (state_fx.clone(), animate_fx.clone(), alive.clone());
		*animate_fx.borrow_mut() = Some(Closure::new(move || {
			if !alive_anim.load(Ordering::Relaxed) {
				// break the self-reference; the closure is dropped once this frame returns
				if let Some(cb) = animate_inner.borrow_mut().take() {
					spawn_local(async move { drop(cb) });
				}
				return;
			}
			if let Some(ref mut s) = *state_anim.borrow_mut() {
				s.tick(0.016);
				render::render(s, &ctx, js_sys::Date::now());
			}
			if let (Some(cb), Some(win)) = (animate_inner.borrow().as_ref(), web_sys::window()) {
				let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_fx.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let state_md = state.clone();
	let on_mousedown = move |ev: MouseEvent| {
		if let (Some((x, y)), Some(s)) = (pointer(canvas_ref, &ev), state_md.borrow_mut().as_mut()) {
			s.press(x, y);
		}
	};

	let state_mm = state.clone();
	let on_mousemove = move |ev: MouseEvent| {
		if let (Some((x, y)), Some(s)) = (pointer(canvas_ref, &ev), state_mm.borrow_mut().as_mut()) {
			s.pointer_move(x, y);
		}
	};

	let state_mu = state.clone();
	let on_mouseup = move |_: MouseEvent| {
		// release the borrow before handing the entity out
		let clicked = state_mu.borrow_mut().as_mut().and_then(|s| s.release());
		if let Some(entity) = clicked {
			on_select.run(entity);
		}
	};

	let state_ml = state.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(s) = state_ml.borrow_mut().as_mut() {
			s.cancel_pointer();
		}
	};

	let state_wh = state;
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		if let (Some((x, y)), Some(s)) = (pointer(canvas_ref, &ev), state_wh.borrow_mut().as_mut()) {
			s.zoom_at(x, y, ev.delta_y());
		}
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="network-graph-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:wheel=on_wheel
			style="display: block; cursor: grab;"
		/>
	}
}

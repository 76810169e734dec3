use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::state::ForceGraphState;

const BACKGROUND: &str = "#1a1a2e";
const LABEL_FONT_PX: f64 = 11.0;
const LABEL_LINE_HEIGHT: f64 = 13.0;

fn ease_out_cubic(t: f64) -> f64 {
	1.0 - (1.0 - t).powi(3)
}

/// Paint one frame. Nodes and edges are drawn in graph space under the view
/// transform; labels are placed in screen space so they stay upright while
/// the view drifts.
pub fn render(state: &ForceGraphState, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, state.width, state.height);

	let (px, py) = state.pivot();
	ctx.save();
	let _ = ctx.translate(px, py);
	let _ = ctx.rotate(state.drift_angle());
	let _ = ctx.translate(-px, -py);
	let _ = ctx.translate(state.transform.x, state.transform.y);
	let _ = ctx.scale(state.transform.k, state.transform.k);
	draw_edges(state, ctx);
	draw_nodes(state, ctx);
	ctx.restore();

	draw_labels(state, ctx);
}

fn draw_edges(state: &ForceGraphState, ctx: &CanvasRenderingContext2d) {
	let k = state.transform.k;
	let (line_width, dash, gap) = (1.2 / k, 6.0 / k, 4.0 / k);
	let dash_offset = -(state.flow_time * 20.0) % (dash + gap);
	let t = ease_out_cubic(state.hover.highlight_t);
	let nodes = state.sim.nodes();

	for (src, tgt) in state.sim.links() {
		let (n1, n2) = (&nodes[src], &nodes[tgt]);
		let (dx, dy) = (n2.x - n1.x, n2.y - n1.y);
		let dist = (dx * dx + dy * dy).sqrt();
		if dist < 0.001 {
			continue;
		}

		let lit = state.hover.node.is_some() && state.is_highlighted(src) && state.is_highlighted(tgt);
		let (alpha, width) = if lit {
			(0.5 + 0.4 * t, line_width * (1.0 + 0.5 * t))
		} else {
			(0.5 - 0.35 * t, line_width)
		};

		ctx.set_stroke_style_str(&format!("rgba(140, 170, 220, {alpha})"));
		ctx.set_line_width(width);
		if lit {
			let _ = ctx.set_line_dash(&js_sys::Array::of2(
				&JsValue::from_f64(dash),
				&JsValue::from_f64(gap),
			));
			ctx.set_line_dash_offset(dash_offset);
		}

		let (ux, uy) = (dx / dist, dy / dist);
		let (r1, r2) = (state.node_radius(src), state.node_radius(tgt));
		ctx.begin_path();
		ctx.move_to(n1.x + ux * r1, n1.y + uy * r1);
		ctx.line_to(n2.x - ux * r2, n2.y - uy * r2);
		ctx.stroke();
		if lit {
			let _ = ctx.set_line_dash(&js_sys::Array::new());
		}
	}
}

fn draw_nodes(state: &ForceGraphState, ctx: &CanvasRenderingContext2d) {
	let (has_hover, t, k) = (
		state.hover.node.is_some(),
		ease_out_cubic(state.hover.highlight_t),
		state.transform.k,
	);

	for (idx, node) in state.sim.nodes().iter().enumerate() {
		let radius = state.node_radius(idx);
		let lit = has_hover && state.is_highlighted(idx);
		let alpha = if has_hover && !lit { 1.0 - 0.7 * t } else { 1.0 };

		ctx.set_global_alpha(alpha);
		ctx.begin_path();
		let _ = ctx.arc(node.x, node.y, radius, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(state.palette.color(&node.node.workspace));
		ctx.fill();

		if state.hover.node == Some(idx) && t > 0.01 {
			ctx.begin_path();
			let _ = ctx.arc(node.x, node.y, radius + 2.0 / k, 0.0, 2.0 * PI);
			ctx.set_stroke_style_str(&format!("rgba(255, 255, 255, {})", 0.8 * t));
			ctx.set_line_width(1.5 / k);
			ctx.stroke();
		}
		if node.is_pinned() {
			ctx.begin_path();
			let _ = ctx.arc(node.x, node.y, radius * 0.4, 0.0, 2.0 * PI);
			ctx.set_fill_style_str("white");
			ctx.fill();
		}
	}
	ctx.set_global_alpha(1.0);
}

fn draw_labels(state: &ForceGraphState, ctx: &CanvasRenderingContext2d) {
	let (has_hover, t, k) = (
		state.hover.node.is_some(),
		ease_out_cubic(state.hover.highlight_t),
		state.transform.k,
	);
	ctx.set_font(&format!("{LABEL_FONT_PX}px sans-serif"));
	ctx.set_text_align("center");

	for (idx, node) in state.sim.nodes().iter().enumerate() {
		let mut alpha = state.label_alpha(idx);
		if has_hover {
			alpha = if state.is_highlighted(idx) {
				alpha + (1.0 - alpha) * t
			} else {
				alpha * (1.0 - 0.8 * t)
			};
		}
		if alpha < 0.02 {
			continue;
		}

		let (sx, sy) = state.graph_to_screen(node.x, node.y);
		let top = sy + state.node_radius(idx) * k + LABEL_LINE_HEIGHT;
		ctx.set_fill_style_str(&format!("rgba(255, 255, 255, {alpha})"));
		for (line_no, line) in state.label_lines(idx).iter().enumerate() {
			let _ = ctx.fill_text(line, sx, top + line_no as f64 * LABEL_LINE_HEIGHT);
		}
	}
	ctx.set_text_align("start");
}

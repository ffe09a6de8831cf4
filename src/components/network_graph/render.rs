use std::f64::consts::PI;

use web_sys::CanvasRenderingContext2d;

use super::state::NetworkGraphState;
use super::style::particle_progress;

const LABEL_BG: &str = "rgba(10, 14, 23, 0.85)";
const BADGE_BG: &str = "rgba(239, 68, 68, 0.9)";

fn ease_out_cubic(t: f64) -> f64 {
	1.0 - (1.0 - t).powi(3)
}

pub fn render(state: &NetworkGraphState, ctx: &CanvasRenderingContext2d, now_ms: f64) {
	ctx.clear_rect(0.0, 0.0, state.width, state.height);
	ctx.save();
	let _ = ctx.translate(state.transform.x, state.transform.y);
	let _ = ctx.scale(state.transform.k, state.transform.k);
	draw_edges(state, ctx, now_ms);
	draw_nodes(state, ctx);
	ctx.restore();
}

fn draw_edges(state: &NetworkGraphState, ctx: &CanvasRenderingContext2d, now_ms: f64) {
	let t = ease_out_cubic(state.hover.highlight_t);
	let has_highlight = state.has_active_highlight();
	let progress = particle_progress(now_ms);
	let positions = state.positions();

	for edge in &state.edges {
		let (Some(&(x1, y1)), Some(&(x2, y2))) = (positions.get(&edge.source), positions.get(&edge.target))
		else {
			continue;
		};
		let style = &edge.style;

		// While hovering, edges outside the highlighted neighbourhood fade.
		let dimmed = has_highlight
			&& !(state.is_highlighted(edge.source) && state.is_highlighted(edge.target));
		ctx.set_global_alpha(if dimmed { 1.0 - 0.75 * t } else { 1.0 });

		ctx.begin_path();
		ctx.move_to(x1, y1);
		ctx.line_to(x2, y2);
		ctx.set_stroke_style_str(style.color);
		ctx.set_line_width(style.width);
		ctx.stroke();

		if style.animated {
			let (px, py) = (x1 + (x2 - x1) * progress, y1 + (y2 - y1) * progress);
			ctx.begin_path();
			let _ = ctx.arc(px, py, 2.0, 0.0, 2.0 * PI);
			ctx.set_fill_style_str(style.particle);
			ctx.set_shadow_blur(8.0);
			ctx.set_shadow_color(style.particle);
			ctx.fill();
			ctx.set_shadow_blur(0.0);
		}
	}
	ctx.set_global_alpha(1.0);
}

fn draw_nodes(state: &NetworkGraphState, ctx: &CanvasRenderingContext2d) {
	let (has_highlight, t, k) = (
		state.has_active_highlight(),
		ease_out_cubic(state.hover.highlight_t),
		state.transform.k,
	);

	state.graph.visit_nodes(|node| {
		let idx = node.index();
		let info = &node.data.user_data;
		let style = info.style;
		let (x, y) = (node.x() as f64, node.y() as f64);
		let highlighted = state.is_highlighted(idx);
		let hovered = state.is_hovered(idx);

		let alpha = if has_highlight && !highlighted { 1.0 - 0.7 * t } else { 1.0 };
		let radius = if hovered { style.radius * (1.0 + 0.35 * t) } else { style.radius };
		ctx.set_global_alpha(alpha);

		// halo
		ctx.begin_path();
		let _ = ctx.arc(x, y, radius + 4.0, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(&format!("{}15", style.fill));
		ctx.fill();

		ctx.set_shadow_blur(style.glow_blur);
		ctx.set_shadow_color(style.fill);
		ctx.begin_path();
		let _ = ctx.arc(x, y, radius, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(style.fill);
		ctx.fill();

		ctx.begin_path();
		let _ = ctx.arc(x - radius * 0.2, y - radius * 0.2, radius * 0.4, 0.0, 2.0 * PI);
		ctx.set_fill_style_str("rgba(255, 255, 255, 0.25)");
		ctx.fill();
		ctx.set_shadow_blur(0.0);
		ctx.set_shadow_color("transparent");

		ctx.begin_path();
		let _ = ctx.arc(x, y, radius, 0.0, 2.0 * PI);
		ctx.set_stroke_style_str(&format!("{}80", style.fill));
		ctx.set_line_width(if hovered { 2.0 / k } else { 1.0 / k });
		ctx.stroke();

		draw_label(ctx, info.entity.label(), style.label_color, x, y + radius + 3.0, k);
		if info.entity.category.is_flagged() && info.entity.risk_score > 0 {
			draw_badge(ctx, info.entity.risk_score, x, y - radius, k);
		}
		ctx.set_global_alpha(1.0);
	});
}

fn draw_label(ctx: &CanvasRenderingContext2d, label: &str, color: &str, x: f64, top: f64, k: f64) {
	let font_size = 11.0 / k;
	let pad = 3.0 / k;
	ctx.set_font(&format!("{font_size}px sans-serif"));
	let width = ctx.measure_text(label).map(|m| m.width()).unwrap_or_default();

	ctx.set_fill_style_str(LABEL_BG);
	ctx.fill_rect(x - width / 2.0 - pad, top - pad, width + pad * 2.0, font_size + pad * 2.0);

	ctx.set_fill_style_str(color);
	ctx.set_text_align("center");
	ctx.set_text_baseline("top");
	let _ = ctx.fill_text(label, x, top);
}

fn draw_badge(ctx: &CanvasRenderingContext2d, score: u8, x: f64, node_top: f64, k: f64) {
	let text = score.to_string();
	let font_size = 9.0 / k;
	ctx.set_font(&format!("bold {font_size}px monospace"));
	let width = ctx.measure_text(&text).map(|m| m.width()).unwrap_or_default() + 6.0 / k;
	let top = node_top - font_size - 5.0 / k;

	ctx.set_fill_style_str(BADGE_BG);
	ctx.fill_rect(x - width / 2.0, top, width, font_size + 4.0 / k);

	ctx.set_fill_style_str("#ffffff");
	ctx.set_text_align("center");
	ctx.set_text_baseline("top");
	let _ = ctx.fill_text(&text, x, top + 2.0 / k);
}

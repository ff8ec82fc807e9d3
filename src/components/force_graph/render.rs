use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::state::{ForceGraphState, NODE_RADIUS};
use crate::disclosure::{Layout, NodeView, TextMeasure};

const BACKGROUND: &str = "#fafafa";
const EDGE_COLOR: &str = "#aaaaaa";
const EXPANDABLE_RING: &str = "rgba(2, 0, 72, 0.45)";
const LABEL_FONT: &str = "12px sans-serif";
const LINE_HEIGHT: f64 = 14.0;
const LINK_ICON: &str = "\u{1F517}";

/// Text metrics from the canvas, in the label font.
struct CanvasMeasure<'a>(&'a CanvasRenderingContext2d);

impl TextMeasure for CanvasMeasure<'_> {
	fn width(&self, text: &str) -> f64 {
		self.0
			.measure_text(text)
			.map(|m| m.width())
			.unwrap_or(0.0)
	}
}

pub fn render(state: &ForceGraphState, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, state.width, state.height);
	ctx.save();
	let _ = ctx.translate(state.transform.x, state.transform.y);
	let _ = ctx.scale(state.transform.k, state.transform.k);
	draw_edges(state, ctx);
	ctx.set_font(LABEL_FONT);
	let views = state.session.node_views(&CanvasMeasure(ctx));
	for view in &views {
		draw_node(view, ctx);
	}
	ctx.restore();
}

fn draw_edges(state: &ForceGraphState, ctx: &CanvasRenderingContext2d) {
	let arrow_size = 8.0;
	ctx.set_stroke_style_str(EDGE_COLOR);
	ctx.set_fill_style_str(EDGE_COLOR);
	ctx.set_line_width(1.5);

	for edge in state.session.visible().edges() {
		let (Some(from), Some(to)) = (
			state.layout.position(&edge.source),
			state.layout.position(&edge.target),
		) else {
			continue;
		};
		let (dx, dy) = (to.x - from.x, to.y - from.y);
		let dist = (dx * dx + dy * dy).sqrt();
		if dist < 2.0 * NODE_RADIUS {
			continue;
		}

		let (ux, uy) = (dx / dist, dy / dist);
		ctx.begin_path();
		ctx.move_to(from.x + ux * NODE_RADIUS, from.y + uy * NODE_RADIUS);
		ctx.line_to(
			to.x - ux * (NODE_RADIUS + arrow_size),
			to.y - uy * (NODE_RADIUS + arrow_size),
		);
		ctx.stroke();

		let (tip_x, tip_y) = (to.x - ux * NODE_RADIUS, to.y - uy * NODE_RADIUS);
		let (back_x, back_y) = (tip_x - ux * arrow_size, tip_y - uy * arrow_size);
		let (px, py) = (-uy * arrow_size * 0.5, ux * arrow_size * 0.5);
		ctx.begin_path();
		ctx.move_to(tip_x, tip_y);
		ctx.line_to(back_x + px, back_y + py);
		ctx.line_to(back_x - px, back_y - py);
		ctx.close_path();
		ctx.fill();
	}
}

fn draw_node(view: &NodeView, ctx: &CanvasRenderingContext2d) {
	let (x, y) = (view.position.x, view.position.y);

	ctx.begin_path();
	let _ = ctx.arc(x, y, NODE_RADIUS, 0.0, 2.0 * PI);
	ctx.set_fill_style_str(&view.style.fill);
	ctx.fill();

	if view.style.expandable {
		let _ = ctx.set_line_dash(&js_sys::Array::of2(
			&JsValue::from_f64(4.0),
			&JsValue::from_f64(3.0),
		));
		ctx.begin_path();
		let _ = ctx.arc(x, y, NODE_RADIUS + 4.0, 0.0, 2.0 * PI);
		ctx.set_stroke_style_str(EXPANDABLE_RING);
		ctx.set_line_width(2.0);
		ctx.stroke();
		let _ = ctx.set_line_dash(&js_sys::Array::new());
	}

	ctx.set_text_align("center");
	ctx.set_text_baseline("middle");
	ctx.set_fill_style_str(view.style.text_color);
	let top = y - (view.lines.len().saturating_sub(1)) as f64 * LINE_HEIGHT / 2.0;
	for (i, line) in view.lines.iter().enumerate() {
		let _ = ctx.fill_text(line, x, top + i as f64 * LINE_HEIGHT);
	}

	if view.style.has_link {
		ctx.set_text_align("start");
		let _ = ctx.fill_text(LINK_ICON, x + 35.0, y + 30.0);
	}
}

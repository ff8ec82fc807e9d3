//! Greedy word wrapping of node names.

/// Measures rendered text width in pixels.
pub trait TextMeasure {
	/// Width of `text` in pixels.
	fn width(&self, text: &str) -> f64;
}

/// Every character advances by the same amount. Good enough off-screen.
#[derive(Clone, Copy, Debug)]
pub struct FixedAdvance(pub f64);

impl TextMeasure for FixedAdvance {
	fn width(&self, text: &str) -> f64 {
		text.chars().count() as f64 * self.0
	}
}

/// Splits `text` on whitespace into lines no wider than `max_width`. A single
/// word wider than the limit gets a line of its own.
pub fn wrap_label(text: &str, max_width: f64, measure: &impl TextMeasure) -> Vec<String> {
	let mut lines = Vec::new();
	let mut line: Vec<&str> = Vec::new();

	for word in text.split_whitespace() {
		line.push(word);
		if line.len() > 1 && measure.width(&line.join(" ")) > max_width {
			line.pop();
			lines.push(line.join(" "));
			line = vec![word];
		}
	}
	lines.push(line.join(" "));
	lines
}

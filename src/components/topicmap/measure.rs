//! Label measurement.

use web_sys::HtmlElement;

/// Pixel extent of a rendered text.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TextSize {
	pub width: f64,
	pub height: f64,
}

pub trait TextMeasure {
	fn measure(&self, text: &str) -> TextSize;
}

/// Measures text with an off-screen probe element styled like node labels.
///
/// The probe must be attached to the document and laid out with
/// `position: absolute; visibility: hidden; white-space: nowrap`.
pub struct MeasureBox {
	probe: HtmlElement,
}

impl MeasureBox {
	pub fn new(probe: HtmlElement) -> Self {
		Self { probe }
	}
}

impl TextMeasure for MeasureBox {
	fn measure(&self, text: &str) -> TextSize {
		self.probe.set_text_content(Some(text));
		TextSize {
			width: self.probe.client_width() as f64,
			height: self.probe.client_height() as f64,
		}
	}
}

//! Node images: the topic icon followed by its label on a plain background.
//!
//! Images are composed as SVG and handed to the canvas as a `data:` URL. The
//! label and icon path are kept so a node can be drawn while its URL decodes.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use super::glyph::{GlyphError, GlyphSource};
use super::measure::TextMeasure;
use super::theme::Theme;

/// Horizontal room for the icon plus padding.
pub const ICON_SPACE: f64 = 32.0;
/// Vertical padding around the label.
pub const VERTICAL_PADDING: f64 = 8.0;
/// Label baseline distance from the bottom edge.
pub const LABEL_BASELINE_OFFSET: f64 = 7.0;
pub const LABEL_X: f64 = 26.0;
/// Icon font units to image pixels. Font glyphs have a y-up coordinate system.
pub const ICON_SCALE: (f64, f64) = (0.009, -0.009);
pub const ICON_TRANSLATE: (f64, f64) = (600.0, -2000.0);

/// A rendered node image.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeImage {
	pub width: f64,
	pub height: f64,
	pub label: String,
	/// SVG path data of the icon, in font units.
	pub icon_path: String,
	/// The complete SVG document.
	pub svg: String,
}

impl NodeImage {
	/// The SVG document as a base64 `data:` URL.
	pub fn data_url(&self) -> String {
		format!("data:image/svg+xml;base64,{}", STANDARD.encode(&self.svg))
	}
}

/// Renders a node image for a label and icon code point.
///
/// Measures the label on every call; nothing is cached.
pub fn render_node(
	label: &str,
	icon: &str,
	measure: &dyn TextMeasure,
	glyphs: &dyn GlyphSource,
	theme: &Theme,
) -> Result<NodeImage, GlyphError> {
	let icon_path = glyphs.glyph_path(icon)?.to_string();
	let size = measure.measure(label);
	let width = size.width + ICON_SPACE;
	let height = size.height + VERTICAL_PADDING;
	let svg = format!(
		r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}"><rect x="0" y="0" width="{width}" height="{height}" fill="{background}"></rect><text x="{LABEL_X}" y="{baseline}" font-family="{font_family}" font-size="{font_size}">{label}</text><path d="{icon_path}" fill="{icon_color}" transform="scale({sx} {sy}) translate({tx} {ty})"></path></svg>"#,
		background = xml_escape(&theme.background_color),
		baseline = height - LABEL_BASELINE_OFFSET,
		font_family = xml_escape(&theme.font_family),
		font_size = xml_escape(&theme.main_font_size),
		label = xml_escape(label),
		icon_color = xml_escape(&theme.icon_color),
		sx = ICON_SCALE.0,
		sy = ICON_SCALE.1,
		tx = ICON_TRANSLATE.0,
		ty = ICON_TRANSLATE.1,
	);
	Ok(NodeImage {
		width,
		height,
		label: label.to_string(),
		icon_path,
		svg,
	})
}

fn xml_escape(text: &str) -> String {
	let mut out = String::with_capacity(text.len());
	for c in text.chars() {
		match c {
			'&' => out.push_str("&amp;"),
			'<' => out.push_str("&lt;"),
			'>' => out.push_str("&gt;"),
			'"' => out.push_str("&quot;"),
			_ => out.push(c),
		}
	}
	out
}

#[cfg(test)]
pub(crate) mod tests {
	use super::super::glyph::GlyphTable;
	use super::super::measure::TextSize;
	use super::*;

	/// Fixed-pitch measurement: 7px per char, 16px line height.
	pub(crate) struct FixedPitch;

	impl TextMeasure for FixedPitch {
		fn measure(&self, text: &str) -> TextSize {
			TextSize {
				width: 7.0 * text.chars().count() as f64,
				height: 16.0,
			}
		}
	}

	pub(crate) fn glyphs() -> GlyphTable {
		[("\u{f10c}".to_string(), "M0 0L10 10".to_string())]
			.into_iter()
			.collect()
	}

	#[test]
	fn size_derives_from_label_extent() {
		let image = render_node("Berlin", "\u{f10c}", &FixedPitch, &glyphs(), &Theme::default())
			.unwrap();
		assert_eq!(image.width, 42.0 + ICON_SPACE);
		assert_eq!(image.height, 24.0);
		assert!(image.svg.contains(r#"<text x="26" y="17""#));
		assert!(image.svg.contains(r#"d="M0 0L10 10""#));
		assert!(image.svg.contains("scale(0.009 -0.009) translate(600 -2000)"));
	}

	#[test]
	fn label_is_escaped() {
		let image = render_node("R&D <lab>", "\u{f10c}", &FixedPitch, &glyphs(), &Theme::default())
			.unwrap();
		assert!(image.svg.contains(">R&amp;D &lt;lab&gt;</text>"));
		assert_eq!(image.label, "R&D <lab>");
	}

	#[test]
	fn unknown_icon_is_a_render_error() {
		let err = render_node("x", "\u{f000}", &FixedPitch, &glyphs(), &Theme::default())
			.unwrap_err();
		assert!(matches!(err, GlyphError::Unavailable { ref unicode, .. } if unicode == "\u{f000}"));
	}

	#[test]
	fn data_url_is_base64_svg() {
		let image = render_node("a", "\u{f10c}", &FixedPitch, &glyphs(), &Theme::default())
			.unwrap();
		let url = image.data_url();
		let encoded = url.strip_prefix("data:image/svg+xml;base64,").unwrap();
		let decoded = STANDARD.decode(encoded).unwrap();
		assert_eq!(String::from_utf8(decoded).unwrap(), image.svg);
	}
}

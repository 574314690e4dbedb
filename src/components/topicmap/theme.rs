//! Visual theming for the topicmap.
//!
//! Colors and fonts come from CSS custom properties on `document.body`, so the
//! canvas follows the host page's style sheet. Unset properties fall back to
//! the defaults below.

use web_sys::CssStyleDeclaration;

/// RGBA color representation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
	pub r: u8,
	pub g: u8,
	pub b: u8,
	pub a: f64,
}

impl Color {
	pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
		Self { r, g, b, a: 1.0 }
	}

	pub fn to_css(self) -> String {
		if (self.a - 1.0).abs() < 0.001 {
			format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
		} else {
			format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
		}
	}
}

/// Rendering parameters for nodes and edges.
///
/// Colors are kept as CSS strings: they end up both in node SVG images and in
/// canvas fill/stroke styles, which accept any CSS color.
#[derive(Clone, Debug, PartialEq)]
pub struct Theme {
	pub font_family: String,
	/// Node label font size, e.g. `"14px"`.
	pub main_font_size: String,
	/// Edge label font size.
	pub label_font_size: String,
	pub icon_color: String,
	pub hover_border_color: String,
	pub highlight_color: String,
	pub background_color: String,
	pub border_color: String,
	pub edge_color: Color,
	pub edge_label_color: Color,
}

impl Default for Theme {
	fn default() -> Self {
		Self {
			font_family: "Lucida Grande, Verdana, sans-serif".into(),
			main_font_size: "14px".into(),
			label_font_size: "13px".into(),
			icon_color: "#5aa0c8".into(),
			hover_border_color: "#3c78c8".into(),
			highlight_color: "#1e90ff".into(),
			background_color: "#ffffff".into(),
			border_color: "#dcdcdc".into(),
			edge_color: Color::rgb(178, 178, 178),
			edge_label_color: Color::rgb(80, 80, 80),
		}
	}
}

/// CSS custom properties a theme is read from.
pub const FONT_FAMILY_VAR: &str = "--main-font-family";
pub const MAIN_FONT_SIZE_VAR: &str = "--main-font-size";
pub const LABEL_FONT_SIZE_VAR: &str = "--label-font-size";
pub const ICON_COLOR_VAR: &str = "--color-topic-icon";
pub const HOVER_BORDER_COLOR_VAR: &str = "--color-topic-hover";
pub const HIGHLIGHT_COLOR_VAR: &str = "--highlight-color";
pub const BACKGROUND_COLOR_VAR: &str = "--background-color";
pub const BORDER_COLOR_VAR: &str = "--border-color-lighter";

impl Theme {
	/// Builds a theme from a property lookup. Blank values keep the default.
	pub fn from_properties(lookup: impl Fn(&str) -> Option<String>) -> Self {
		let defaults = Theme::default();
		let prop = |name: &str, fallback: String| {
			lookup(name)
				.map(|v| v.trim().to_string())
				.filter(|v| !v.is_empty())
				.unwrap_or(fallback)
		};
		Self {
			font_family: prop(FONT_FAMILY_VAR, defaults.font_family),
			main_font_size: prop(MAIN_FONT_SIZE_VAR, defaults.main_font_size),
			label_font_size: prop(LABEL_FONT_SIZE_VAR, defaults.label_font_size),
			icon_color: prop(ICON_COLOR_VAR, defaults.icon_color),
			hover_border_color: prop(HOVER_BORDER_COLOR_VAR, defaults.hover_border_color),
			highlight_color: prop(HIGHLIGHT_COLOR_VAR, defaults.highlight_color),
			background_color: prop(BACKGROUND_COLOR_VAR, defaults.background_color),
			border_color: prop(BORDER_COLOR_VAR, defaults.border_color),
			edge_color: defaults.edge_color,
			edge_label_color: defaults.edge_label_color,
		}
	}

	/// Reads the theme from a computed style declaration.
	pub fn from_computed_style(style: &CssStyleDeclaration) -> Self {
		Self::from_properties(|name| style.get_property_value(name).ok())
	}

	/// Reads the theme from `document.body`, or the defaults outside a browser.
	pub fn from_document() -> Self {
		let style = web_sys::window().and_then(|window| {
			let body = window.document()?.body()?;
			window.get_computed_style(&body).ok().flatten()
		});
		match style {
			Some(style) => Self::from_computed_style(&style),
			None => Self::default(),
		}
	}

	/// Canvas font string for node labels.
	pub fn node_font(&self) -> String {
		format!("{} {}", self.main_font_size, self.font_family)
	}

	/// Canvas font string for edge labels.
	pub fn edge_label_font(&self) -> String {
		format!("{} {}", self.label_font_size, self.font_family)
	}
}

#[cfg(test)]
mod tests {
	use std::collections::HashMap;

	use super::*;

	#[test]
	fn css_round_trip_keeps_alpha() {
		assert_eq!(Color::rgb(178, 178, 178).to_css(), "#b2b2b2");
		assert_eq!(
			Color { a: 0.25, ..Color::rgb(0, 0, 0) }.to_css(),
			"rgba(0, 0, 0, 0.25)"
		);
	}

	#[test]
	fn blank_properties_keep_defaults() {
		let props: HashMap<&str, &str> = [
			(HIGHLIGHT_COLOR_VAR, " #ff0000"),
			(MAIN_FONT_SIZE_VAR, ""),
		]
		.into_iter()
		.collect();
		let theme = Theme::from_properties(|name| props.get(name).map(|v| v.to_string()));
		assert_eq!(theme.highlight_color, "#ff0000");
		assert_eq!(theme.main_font_size, Theme::default().main_font_size);
		assert_eq!(theme.node_font(), "14px Lucida Grande, Verdana, sans-serif");
	}
}

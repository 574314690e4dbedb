//! Icon glyph lookup.
//!
//! Topic icons are code points of an SVG icon font. The font is fetched once,
//! parsed into a [`GlyphTable`] of outline paths, and consulted on every
//! node rendering pass.

use std::collections::HashMap;

use thiserror::Error;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{DomParser, Element, SupportedType};

/// Why a glyph lookup failed.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum GlyphCause {
	#[error("icon font not loaded")]
	NotLoaded,
	#[error("no such glyph in icon font")]
	NoSuchGlyph,
	#[error("glyph has no outline data")]
	EmptyOutline,
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum GlyphError {
	#[error("icon glyph \"{unicode}\" not available ({cause})")]
	Unavailable {
		unicode: String,
		#[source]
		cause: GlyphCause,
	},
	#[error("invalid icon font: {0}")]
	InvalidFont(String),
	#[error("failed to fetch icon font: {0}")]
	Fetch(String),
}

impl GlyphError {
	fn unavailable(unicode: &str, cause: GlyphCause) -> Self {
		GlyphError::Unavailable {
			unicode: unicode.to_string(),
			cause,
		}
	}
}

/// Resolves an icon code point to SVG path data.
pub trait GlyphSource {
	fn glyph_path(&self, unicode: &str) -> Result<&str, GlyphError>;
}

/// Outline paths of an icon font, keyed by code point.
#[derive(Clone, Debug, Default)]
pub struct GlyphTable {
	glyphs: HashMap<String, String>,
}

impl GlyphTable {
	pub fn len(&self) -> usize {
		self.glyphs.len()
	}

	pub fn is_empty(&self) -> bool {
		self.glyphs.is_empty()
	}

	/// Parses the `<glyph unicode=".." d="..">` elements of an SVG font document.
	pub fn parse_svg_font(xml: &str) -> Result<Self, GlyphError> {
		let parser = DomParser::new().map_err(invalid_font)?;
		let doc = parser
			.parse_from_string(xml, SupportedType::ImageSvgXml)
			.map_err(invalid_font)?;
		if doc.query_selector("parsererror").map_err(invalid_font)?.is_some() {
			return Err(GlyphError::InvalidFont("malformed XML".into()));
		}
		let font = doc
			.query_selector("font")
			.map_err(invalid_font)?
			.ok_or_else(|| GlyphError::InvalidFont("no <font> element".into()))?;
		let nodes = font.query_selector_all("glyph").map_err(invalid_font)?;

		let mut glyphs = HashMap::new();
		for i in 0..nodes.length() {
			let Some(glyph) = nodes.item(i).and_then(|n| n.dyn_into::<Element>().ok()) else {
				continue;
			};
			if let Some(unicode) = glyph.get_attribute("unicode") {
				glyphs.insert(unicode, glyph.get_attribute("d").unwrap_or_default());
			}
		}
		Ok(Self { glyphs })
	}
}

impl FromIterator<(String, String)> for GlyphTable {
	fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
		Self {
			glyphs: iter.into_iter().collect(),
		}
	}
}

impl GlyphSource for GlyphTable {
	fn glyph_path(&self, unicode: &str) -> Result<&str, GlyphError> {
		match self.glyphs.get(unicode) {
			Some(d) if d.trim().is_empty() => {
				Err(GlyphError::unavailable(unicode, GlyphCause::EmptyOutline))
			}
			Some(d) => Ok(d),
			None => Err(GlyphError::unavailable(unicode, GlyphCause::NoSuchGlyph)),
		}
	}
}

/// A font that may still be loading.
impl<T: GlyphSource> GlyphSource for Option<T> {
	fn glyph_path(&self, unicode: &str) -> Result<&str, GlyphError> {
		match self {
			Some(source) => source.glyph_path(unicode),
			None => Err(GlyphError::unavailable(unicode, GlyphCause::NotLoaded)),
		}
	}
}

fn invalid_font(err: JsValue) -> GlyphError {
	GlyphError::InvalidFont(format!("{err:?}"))
}

/// Fetches and parses an SVG icon font.
#[cfg(target_arch = "wasm32")]
pub async fn load_icon_font(url: &str) -> Result<GlyphTable, GlyphError> {
	let response = gloo_net::http::Request::get(url)
		.send()
		.await
		.map_err(|e| GlyphError::Fetch(e.to_string()))?;
	if !response.ok() {
		return Err(GlyphError::Fetch(format!(
			"{} {} ({url})",
			response.status(),
			response.status_text()
		)));
	}
	let xml = response
		.text()
		.await
		.map_err(|e| GlyphError::Fetch(e.to_string()))?;
	let table = GlyphTable::parse_svg_font(&xml)?;
	log::info!("topicmap: icon font loaded, {} glyphs", table.len());
	Ok(table)
}

#[cfg(not(target_arch = "wasm32"))]
pub async fn load_icon_font(url: &str) -> Result<GlyphTable, GlyphError> {
	Err(GlyphError::Fetch(format!("{url}: no browser fetch on this target")))
}

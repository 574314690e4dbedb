//! Zoom and stroke configuration.
//!
//! Node images, borders and edges are drawn in world space and grow with the
//! zoom level. Interaction tolerances are specified in screen pixels so the
//! pointer feels the same at every zoom.

/// Defines how a visual property scales with zoom level.
#[derive(Clone, Debug)]
pub enum ScaleBehavior {
	/// Constant world-space size. Appears larger when zoomed in.
	World,
	/// Constant screen-space size (pixels). Unaffected by zoom.
	Screen,
	/// World-space scaling, clamped to min/max screen-space bounds.
	Clamped { min_screen: f64, max_screen: f64 },
}

impl ScaleBehavior {
	/// Compute the world-space value for a given base value and zoom level.
	pub fn apply(&self, base: f64, k: f64) -> f64 {
		match self {
			ScaleBehavior::World => base,
			ScaleBehavior::Screen => base / k,
			ScaleBehavior::Clamped {
				min_screen,
				max_screen,
			} => base.clamp(min_screen / k, max_screen / k),
		}
	}
}

/// Border widths per node state, in world units.
#[derive(Clone, Debug)]
pub struct BorderConfig {
	pub normal: f64,
	pub selected: f64,
	pub hover: f64,
}

/// Edge geometry.
#[derive(Clone, Debug)]
pub struct EdgeConfig {
	pub width: f64,
	pub selected_width: f64,
	/// Pointer distance that still counts as a hit on the edge.
	pub hit_tolerance: f64,
	pub hit_behavior: ScaleBehavior,
	/// Label offset above the edge midpoint.
	pub label_margin: f64,
	/// Edge labels stay legible when zoomed far out.
	pub label_behavior: ScaleBehavior,
}

/// Complete scale configuration.
#[derive(Clone, Debug)]
pub struct ScaleConfig {
	pub min_zoom: f64,
	pub max_zoom: f64,
	/// Zoom change per wheel notch, relative to the current zoom.
	pub wheel_sensitivity: f64,
	pub border: BorderConfig,
	pub edge: EdgeConfig,
}

impl Default for ScaleConfig {
	fn default() -> Self {
		Self {
			min_zoom: 0.1,
			max_zoom: 10.0,
			wheel_sensitivity: 0.2,
			border: BorderConfig {
				normal: 1.0,
				selected: 2.0,
				hover: 3.0,
			},
			edge: EdgeConfig {
				width: 3.0,
				selected_width: 6.0,
				hit_tolerance: 6.0,
				hit_behavior: ScaleBehavior::Screen,
				label_margin: 10.0,
				label_behavior: ScaleBehavior::Clamped {
					min_screen: 1.0,
					max_screen: f64::INFINITY,
				},
			},
		}
	}
}

impl ScaleConfig {
	/// Zoom factor for one wheel notch; `delta_y > 0` zooms out. Purely
	/// horizontal scrolling leaves the zoom alone.
	pub fn wheel_factor(&self, delta_y: f64) -> f64 {
		let step = 1.0 + self.wheel_sensitivity * 0.5;
		if delta_y > 0.0 {
			1.0 / step
		} else if delta_y < 0.0 {
			step
		} else {
			1.0
		}
	}

	pub fn clamp_zoom(&self, k: f64) -> f64 {
		k.clamp(self.min_zoom, self.max_zoom)
	}
}

/// Pre-computed scale values for a specific zoom level.
#[derive(Clone, Debug)]
pub struct ScaledValues {
	pub k: f64,
	pub edge_hit_tolerance: f64,
	/// Multiplier applied to the edge label font size.
	pub edge_label_scale: f64,
}

impl ScaledValues {
	pub fn new(config: &ScaleConfig, k: f64) -> Self {
		Self {
			k,
			edge_hit_tolerance: config
				.edge
				.hit_behavior
				.apply(config.edge.hit_tolerance, k),
			edge_label_scale: config.edge.label_behavior.apply(1.0, k),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn screen_tolerance_shrinks_in_world_space_when_zoomed_in() {
		let config = ScaleConfig::default();
		assert_eq!(ScaledValues::new(&config, 2.0).edge_hit_tolerance, 3.0);
		assert_eq!(ScaledValues::new(&config, 0.5).edge_hit_tolerance, 12.0);
	}

	#[test]
	fn wheel_notch_matches_sensitivity() {
		let config = ScaleConfig::default();
		assert!((config.wheel_factor(-1.0) - 1.1).abs() < 1e-9);
		assert!((config.wheel_factor(1.0) * 1.1 - 1.0).abs() < 1e-9);
		assert_eq!(config.clamp_zoom(50.0), 10.0);
	}

	#[test]
	fn horizontal_scroll_keeps_zoom() {
		assert_eq!(ScaleConfig::default().wheel_factor(0.0), 1.0);
	}

	#[test]
	fn labels_grow_when_zoomed_out() {
		let config = ScaleConfig::default();
		assert_eq!(ScaledValues::new(&config, 1.0).edge_label_scale, 1.0);
		assert_eq!(ScaledValues::new(&config, 0.5).edge_label_scale, 2.0);
		assert_eq!(ScaledValues::new(&config, 4.0).edge_label_scale, 1.0);
	}
}

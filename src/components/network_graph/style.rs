//! Colors and sizes as pure functions of entity category.

use crate::model::EntityCategory;

pub const AMBER: &str = "#f59e0b";
pub const RED: &str = "#ef4444";
pub const BLUE: &str = "#3b82f6";
pub const PINK: &str = "#ec4899";
pub const SLATE: &str = "#94a3b8";

/// One trip of the flow particle along an animated edge.
pub const PARTICLE_PERIOD_MS: f64 = 2000.0;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct NodeStyle {
	pub fill: &'static str,
	pub radius: f64,
	pub glow_blur: f64,
	pub label_color: &'static str,
}

pub fn node_style(category: EntityCategory) -> NodeStyle {
	match category {
		EntityCategory::Ring => NodeStyle { fill: AMBER, radius: 8.0, glow_blur: 20.0, label_color: AMBER },
		EntityCategory::Mule => NodeStyle { fill: RED, radius: 8.0, glow_blur: 20.0, label_color: RED },
		EntityCategory::Normal => NodeStyle { fill: BLUE, radius: 5.0, glow_blur: 12.0, label_color: SLATE },
		_ => NodeStyle { fill: BLUE, radius: 5.0, glow_blur: 12.0, label_color: BLUE },
	}
}

/// Edge classes, highest precedence first.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EdgeTier {
	RingConnection,
	RingAdjacent,
	Mule,
	Normal,
	Default,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgeStyle {
	pub tier: EdgeTier,
	pub color: &'static str,
	pub width: f64,
	pub animated: bool,
	pub particle: &'static str,
}

pub fn edge_style(source: EntityCategory, target: EntityCategory, ring_connection: bool) -> EdgeStyle {
	use EntityCategory::{Mule, Normal, Ring};

	let ring_adjacent = (source == Ring && matches!(target, Mule | Ring))
		|| (target == Ring && matches!(source, Mule | Ring));

	let (tier, color, width, animated) = if ring_connection {
		(EdgeTier::RingConnection, "#ec489980", 3.0, true)
	} else if ring_adjacent {
		(EdgeTier::RingAdjacent, "#f59e0b80", 2.5, true)
	} else if source == Mule || target == Mule {
		(EdgeTier::Mule, "#ef444460", 2.0, source == Mule && target == Mule)
	} else if source == Normal && target == Normal {
		(EdgeTier::Normal, "#94a3b820", 1.0, false)
	} else {
		(EdgeTier::Default, "#00E5FF20", 1.0, false)
	};

	EdgeStyle {
		tier,
		color,
		width,
		animated,
		particle: if ring_connection { PINK } else { RED },
	}
}

/// Fraction of the way along an edge the particle sits at `now_ms`.
pub fn particle_progress(now_ms: f64) -> f64 {
	now_ms.rem_euclid(PARTICLE_PERIOD_MS) / PARTICLE_PERIOD_MS
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::model::EntityCategory::{Mule, Normal, Ring, Shell, Unknown};

	#[test]
	fn node_colors_follow_category() {
		assert_eq!(node_style(Ring).fill, AMBER);
		assert_eq!(node_style(Mule).fill, RED);
		for other in [Normal, Shell, Unknown] {
			assert_eq!(node_style(other).fill, BLUE);
			assert!(node_style(other).glow_blur < node_style(Mule).glow_blur);
		}
	}

	#[test]
	fn ring_flag_wins_over_categories() {
		assert_eq!(edge_style(Normal, Normal, true).tier, EdgeTier::RingConnection);
		assert_eq!(edge_style(Mule, Ring, true).particle, PINK);
	}

	#[test]
	fn tiers_are_mutually_exclusive_in_order() {
		assert_eq!(edge_style(Ring, Mule, false).tier, EdgeTier::RingAdjacent);
		assert_eq!(edge_style(Shell, Ring, false).tier, EdgeTier::Default);
		assert_eq!(edge_style(Mule, Shell, false).tier, EdgeTier::Mule);
		assert_eq!(edge_style(Normal, Normal, false).tier, EdgeTier::Normal);
		assert_eq!(edge_style(Shell, Normal, false).tier, EdgeTier::Default);
	}

	#[test]
	fn only_mule_pairs_animate_in_the_mule_tier() {
		assert!(edge_style(Mule, Mule, false).animated);
		assert!(!edge_style(Mule, Normal, false).animated);
		assert!(edge_style(Ring, Ring, false).animated);
		assert!(!edge_style(Normal, Normal, false).animated);
	}

	#[test]
	fn particle_wraps_every_period() {
		assert_eq!(particle_progress(0.0), 0.0);
		assert_eq!(particle_progress(500.0), 0.25);
		assert_eq!(particle_progress(2500.0), 0.25);
	}
}

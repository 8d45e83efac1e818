//! Outcome of matching one face against the gallery

use crate::config::UNRECOGNIZED_LABEL;

#[derive(Debug, Clone, PartialEq)]
pub enum Identity {
	Known { label: String, distance: f32, confidence: f32 },
	Unrecognized,
}

impl Identity {
	pub fn label(&self) -> &str {
		match self {
			Identity::Known { label, .. } => label,
			Identity::Unrecognized => UNRECOGNIZED_LABEL,
		}
	}

	/// Inverse-distance heuristic, not a probability. Zero when unrecognized.
	pub fn confidence(&self) -> f32 {
		match self {
			Identity::Known { confidence, .. } => *confidence,
			Identity::Unrecognized => 0.0,
		}
	}

	pub fn is_known(&self) -> bool {
		matches!(self, Identity::Known { .. })
	}
}

impl std::fmt::Display for Identity {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{:.2} {}", self.confidence(), self.label())
	}
}

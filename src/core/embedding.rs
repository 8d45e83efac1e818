//! Face embedding vectors compared by Euclidean distance

#[derive(Debug, Clone, PartialEq)]
pub struct Embedding(Vec<f32>);

impl Embedding {
	/// Wrap provider output as-is
	pub fn new(data: Vec<f32>) -> Self {
		Self(data)
	}

	/// Create with L2 normalization (ArcFace-style providers)
	pub fn normalized(data: Vec<f32>) -> Self {
		Self(normalize(&data))
	}

	pub fn as_slice(&self) -> &[f32] {
		&self.0
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Euclidean distance. Mismatched dimensions are infinitely far apart.
	pub fn distance(&self, other: &Self) -> f32 {
		if self.0.len() != other.0.len() {
			return f32::INFINITY;
		}

		self.0
			.iter()
			.zip(other.0.iter())
			.map(|(a, b)| (a - b) * (a - b))
			.sum::<f32>()
			.sqrt()
	}
}

impl From<Vec<f32>> for Embedding {
	fn from(data: Vec<f32>) -> Self {
		Self::new(data)
	}
}

fn normalize(v: &[f32]) -> Vec<f32> {
	let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
	if norm > 0.0 {
		v.iter().map(|x| x / norm).collect()
	} else {
		v.to_vec()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use approx::assert_relative_eq;

	#[test]
	fn distance_to_self_is_zero() {
		let e = Embedding::new(vec![0.1, -0.4, 0.9, 0.25]);
		assert_eq!(e.distance(&e), 0.0);
	}

	#[test]
	fn distance_is_euclidean() {
		let a = Embedding::new(vec![0.0, 0.0]);
		let b = Embedding::new(vec![3.0, 4.0]);
		assert_relative_eq!(a.distance(&b), 5.0);
		assert_relative_eq!(b.distance(&a), 5.0);
	}

	#[test]
	fn mismatched_dimensions_never_match() {
		let a = Embedding::new(vec![0.0, 0.0]);
		let b = Embedding::new(vec![0.0, 0.0, 0.0]);
		assert!(a.distance(&b).is_infinite());
	}

	#[test]
	fn normalized_has_unit_length() {
		let e = Embedding::normalized(vec![3.0, 4.0]);
		assert_relative_eq!(e.as_slice()[0], 0.6);
		assert_relative_eq!(e.as_slice()[1], 0.8);
	}

	#[test]
	fn normalizing_zero_vector_keeps_zeros() {
		let e = Embedding::normalized(vec![0.0, 0.0, 0.0]);
		assert_eq!(e.as_slice(), &[0.0, 0.0, 0.0]);
	}
}

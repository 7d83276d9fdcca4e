use std::path::Path;

use log::info;

use super::codec;
use super::sparse::SparseMatrix;
use super::transition::CountMatrix;
use super::vocabulary::Vocabulary;
use super::walk::TransitionSource;
use crate::error::{ClaptrapError, Result};
use crate::io::{read_bytes, write_bytes};

/// Word transition model: a vocabulary and the sparse counts between its
/// tokens.
///
/// # Responsibilities
/// - Build from a tokenized corpus (vocabulary selection, then counting)
/// - Persist to and restore from the binary codec
/// - Expose its transitions to walkers through [`TransitionSource`]
///
/// # Invariants
/// - Every sparse row and column index is a valid vocabulary index
/// - Immutable once built; share it by reference or `Arc`
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MarkovModel {
	vocabulary: Vocabulary,
	sparse: SparseMatrix,
}

impl MarkovModel {
	/// Pairs a vocabulary with a sparse matrix over it.
	///
	/// # Errors
	/// Returns a validation error if the matrix references an index outside
	/// the vocabulary.
	pub fn new(vocabulary: Vocabulary, sparse: SparseMatrix) -> Result<Self> {
		sparse.check_bounds(vocabulary.len()).map_err(ClaptrapError::Validation)?;
		Ok(Self { vocabulary, sparse })
	}

	/// Builds a model from the `threshold` most frequent tokens of `corpus`.
	///
	/// # Errors
	/// Returns a validation error if the corpus is empty.
	pub fn from_corpus<S: AsRef<str> + Sync>(corpus: &[S], threshold: usize) -> Result<Self> {
		let vocabulary = Vocabulary::from_corpus(corpus, threshold)?;
		let matrix = CountMatrix::from_corpus(&vocabulary, corpus);
		let sparse = SparseMatrix::from_dense(&matrix);
		info!(
			"built model: {} tokens, {} non-zero transitions",
			vocabulary.len(),
			sparse.entry_count()
		);
		Ok(Self { vocabulary, sparse })
	}

	/// Decodes a blob produced by [`MarkovModel::to_bytes`].
	pub fn from_bytes(blob: &[u8]) -> Result<Self> {
		let (sparse, vocabulary) = codec::load(blob)?;
		Ok(Self { vocabulary, sparse })
	}

	pub fn to_bytes(&self, compress: bool) -> Result<Vec<u8>> {
		codec::dump(&self.sparse, &self.vocabulary, compress)
	}

	/// Loads a model file, compressed or not.
	///
	/// # Errors
	/// I/O failures surface as resource errors, malformed content as decode
	/// errors.
	pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
		let bytes = read_bytes(&path)?;
		info!("reading model from {}", path.as_ref().display());
		Self::from_bytes(&bytes)
	}

	pub fn to_file<P: AsRef<Path>>(&self, path: P, compress: bool) -> Result<()> {
		let bytes = self.to_bytes(compress)?;
		write_bytes(&path, &bytes)?;
		info!("wrote model to {}", path.as_ref().display());
		Ok(())
	}

	pub fn vocabulary(&self) -> &Vocabulary {
		&self.vocabulary
	}

	pub fn sparse(&self) -> &SparseMatrix {
		&self.sparse
	}
}

impl TransitionSource for MarkovModel {
	fn node_count(&self) -> usize {
		self.vocabulary.len()
	}

	fn token(&self, node: usize) -> &str {
		&self.vocabulary.words()[node]
	}

	fn neighbors(&self, node: usize) -> &[(usize, u64)] {
		self.sparse.row(node)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn builds_the_cat_sat_model() {
		let model = MarkovModel::from_corpus(&["the", "cat", "sat"], 1000).unwrap();
		let dense = model.sparse().to_dense(3).unwrap();
		assert_eq!(model.vocabulary().words(), ["the", "cat", "sat"]);
		assert_eq!(dense.row(0), [0, 1, 0]);
		assert_eq!(dense.row(1), [0, 0, 1]);
		assert_eq!(dense.row(2), [0, 0, 0]);
	}

	#[test]
	fn rejects_out_of_range_matrix() {
		let vocabulary = Vocabulary::new(["a"]).unwrap();
		let sparse = SparseMatrix::from_rows(&[vec![0, 1], vec![0, 0]]);
		assert!(matches!(MarkovModel::new(vocabulary, sparse), Err(ClaptrapError::Validation(_))));
	}

	#[test]
	fn exposes_rows_as_neighbors() {
		let vocabulary = Vocabulary::new(["a", "b", "c"]).unwrap();
		let sparse = SparseMatrix::from_rows(&[vec![1, 0, 2], vec![0, 0, 0], vec![10, 4, 5]]);
		let model = MarkovModel::new(vocabulary, sparse).unwrap();
		assert_eq!(model.node_count(), 3);
		assert_eq!(model.token(2), "c");
		assert_eq!(model.neighbors(0), [(0, 1), (2, 2)]);
		assert!(model.neighbors(1).is_empty());
	}

	#[test]
	fn bytes_round_trip() {
		let model = MarkovModel::from_corpus(&["a", "b", ".", "a", "c", "b", "a"], 1000).unwrap();
		for compress in [true, false] {
			let restored = MarkovModel::from_bytes(&model.to_bytes(compress).unwrap()).unwrap();
			assert_eq!(restored, model);
		}
	}
}

use std::sync::mpsc;
use std::thread;

use log::{debug, info};

use super::vocabulary::Vocabulary;
use crate::error::{ClaptrapError, Result};

/// Corpora shorter than this are counted on the calling thread.
pub const PARALLEL_THRESHOLD: usize = 1 << 16;

/// Dense square matrix of transition counts between vocabulary tokens.
///
/// Cell `(i, j)` holds how many times token `j` directly followed token `i`
/// once every non-vocabulary token has been removed from the corpus.
///
/// # Invariants
/// - `cells.len() == dimension * dimension`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CountMatrix {
	dimension: usize,
	cells: Vec<u64>,
}

/// Counts collected over one contiguous slice of the corpus.
///
/// The first and last vocabulary hits are kept so that the transition
/// spanning two neighbouring chunks can be restored on merge.
struct PartialCounts {
	chunk: usize,
	matrix: CountMatrix,
	first: Option<usize>,
	last: Option<usize>,
}

impl CountMatrix {
	/// Creates an all-zero matrix.
	pub fn zeros(dimension: usize) -> Self {
		Self { dimension, cells: vec![0; dimension * dimension] }
	}

	/// Builds a matrix from explicit rows.
	///
	/// # Errors
	/// Returns a validation error if the rows do not form a square matrix.
	pub fn from_rows(rows: &[Vec<u64>]) -> Result<Self> {
		let dimension = rows.len();
		let mut matrix = Self::zeros(dimension);
		for (i, row) in rows.iter().enumerate() {
			if row.len() != dimension {
				return Err(ClaptrapError::validation(format!(
					"row {i} has {} cells, expected {dimension}",
					row.len()
				)));
			}
			matrix.row_mut(i).copy_from_slice(row);
		}
		Ok(matrix)
	}

	/// Counts transitions of `corpus` restricted to `vocabulary`.
	///
	/// Tokens outside the vocabulary are skipped: they neither start nor
	/// interrupt a transition. Large corpora are split across worker threads;
	/// the result is identical to a single sequential scan.
	pub fn from_corpus<S: AsRef<str> + Sync>(vocabulary: &Vocabulary, corpus: &[S]) -> Self {
		let workers = if corpus.len() < PARALLEL_THRESHOLD { 1 } else { num_cpus::get().max(1) };
		let matrix = Self::count_chunked(vocabulary, corpus, workers);
		info!(
			"counted {} transitions over {} tokens ({} vocabulary entries)",
			matrix.total(),
			corpus.len(),
			vocabulary.len()
		);
		matrix
	}

	/// Splits the corpus in `workers` chunks, counts each on its own thread
	/// and merges the partial matrices in corpus order.
	fn count_chunked<S: AsRef<str> + Sync>(vocabulary: &Vocabulary, corpus: &[S], workers: usize) -> Self {
		if workers <= 1 || corpus.len() < 2 {
			return Self::count_chunk(vocabulary, corpus, 0).matrix;
		}

		let chunk_size = corpus.len().div_ceil(workers);
		debug!("counting transitions in {} chunks of {} tokens", corpus.len().div_ceil(chunk_size), chunk_size);

		let (tx, rx) = mpsc::channel();
		thread::scope(|scope| {
			for (chunk_index, chunk) in corpus.chunks(chunk_size).enumerate() {
				let tx = tx.clone();
				scope.spawn(move || {
					// The receiver outlives the scope
					let _ = tx.send(Self::count_chunk(vocabulary, chunk, chunk_index));
				});
			}
		});
		drop(tx);

		let mut partials: Vec<PartialCounts> = rx.iter().collect();
		partials.sort_by_key(|partial| partial.chunk);

		let mut matrix = Self::zeros(vocabulary.len());
		let mut previous: Option<usize> = None;
		for partial in partials {
			if let (Some(from), Some(to)) = (previous, partial.first) {
				matrix.increment(from, to);
			}
			matrix.merge(&partial.matrix);
			previous = partial.last.or(previous);
		}
		matrix
	}

	fn count_chunk<S: AsRef<str>>(vocabulary: &Vocabulary, chunk: &[S], chunk_index: usize) -> PartialCounts {
		let mut matrix = Self::zeros(vocabulary.len());
		let mut first = None;
		let mut previous: Option<usize> = None;

		for token in chunk {
			let Some(current) = vocabulary.index_of(token.as_ref()) else {
				continue;
			};
			match previous {
				Some(from) => matrix.increment(from, current),
				None => first = Some(current),
			}
			previous = Some(current);
		}

		PartialCounts { chunk: chunk_index, matrix, first, last: previous }
	}

	pub fn dimension(&self) -> usize {
		self.dimension
	}

	/// Returns the count at `(row, col)`, or `None` outside the matrix.
	pub fn get(&self, row: usize, col: usize) -> Option<u64> {
		if row >= self.dimension || col >= self.dimension {
			return None;
		}
		Some(self.cells[row * self.dimension + col])
	}

	/// Returns one row of counts.
	///
	/// # Panics
	/// Panics if `index >= dimension`.
	pub fn row(&self, index: usize) -> &[u64] {
		&self.cells[index * self.dimension..(index + 1) * self.dimension]
	}

	pub fn rows(&self) -> impl Iterator<Item = &[u64]> {
		// chunks() rejects a zero size
		self.cells.chunks(self.dimension.max(1))
	}

	/// Sum of every cell.
	pub fn total(&self) -> u64 {
		self.cells.iter().sum()
	}

	/// Adds the counts of a same-sized `other` into this matrix.
	fn merge(&mut self, other: &Self) {
		for (cell, count) in self.cells.iter_mut().zip(&other.cells) {
			*cell += count;
		}
	}

	fn row_mut(&mut self, index: usize) -> &mut [u64] {
		&mut self.cells[index * self.dimension..(index + 1) * self.dimension]
	}

	fn increment(&mut self, from: usize, to: usize) {
		self.cells[from * self.dimension + to] += 1;
	}
}

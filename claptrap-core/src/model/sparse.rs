use std::collections::BTreeMap;

use super::transition::CountMatrix;
use crate::error::{ClaptrapError, Result};

/// Count matrix with zero cells elided.
///
/// Maps a row index to its `(column, weight)` pairs in ascending column
/// order. Rows without any non-zero cell are absent.
///
/// # Invariants
/// - Every stored row is non-empty
/// - Columns are strictly increasing within a row
/// - Every weight is strictly positive
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SparseMatrix {
	rows: BTreeMap<usize, Vec<(usize, u64)>>,
}

impl SparseMatrix {
	pub fn new() -> Self {
		Self::default()
	}

	/// Row-major scan of a dense matrix keeping non-zero cells only.
	pub fn from_dense(matrix: &CountMatrix) -> Self {
		Self::from_row_slices(matrix.rows())
	}

	/// Same as [`SparseMatrix::from_dense`] for plain nested rows.
	pub fn from_rows(rows: &[Vec<u64>]) -> Self {
		Self::from_row_slices(rows.iter().map(Vec::as_slice))
	}

	/// Wraps rows that already satisfy the invariants.
	pub(crate) fn from_checked_rows(rows: BTreeMap<usize, Vec<(usize, u64)>>) -> Self {
		Self { rows }
	}

	fn from_row_slices<'a>(rows: impl Iterator<Item = &'a [u64]>) -> Self {
		let mut sparse = Self::new();
		for (row, cells) in rows.enumerate() {
			let entries: Vec<(usize, u64)> = cells
				.iter()
				.enumerate()
				.filter(|(_, value)| **value != 0)
				.map(|(col, value)| (col, *value))
				.collect();
			if !entries.is_empty() {
				sparse.rows.insert(row, entries);
			}
		}
		sparse
	}

	/// Inserts a complete row, replacing any previous one.
	///
	/// Zero weights are dropped and entries are sorted by column. An entry
	/// list that ends up empty removes the row.
	///
	/// # Errors
	/// Returns a validation error if a column appears twice.
	pub fn insert_row(&mut self, row: usize, mut entries: Vec<(usize, u64)>) -> Result<()> {
		entries.retain(|(_, weight)| *weight != 0);
		entries.sort_unstable_by_key(|(col, _)| *col);
		if entries.windows(2).any(|pair| pair[0].0 == pair[1].0) {
			return Err(ClaptrapError::validation(format!("row {row} repeats a column")));
		}
		if entries.is_empty() {
			self.rows.remove(&row);
		} else {
			self.rows.insert(row, entries);
		}
		Ok(())
	}

	/// Expands back into a dense matrix of the given dimension.
	///
	/// # Errors
	/// Returns a validation error if an index does not fit.
	pub fn to_dense(&self, dimension: usize) -> Result<CountMatrix> {
		self.check_bounds(dimension).map_err(ClaptrapError::Validation)?;
		let mut rows = vec![vec![0u64; dimension]; dimension];
		for (&row, entries) in &self.rows {
			for &(col, weight) in entries {
				rows[row][col] = weight;
			}
		}
		CountMatrix::from_rows(&rows)
	}

	/// Outgoing `(column, weight)` pairs of `row`; empty when absent.
	pub fn row(&self, row: usize) -> &[(usize, u64)] {
		self.rows.get(&row).map(Vec::as_slice).unwrap_or(&[])
	}

	/// Stored rows in ascending index order.
	pub fn iter(&self) -> impl Iterator<Item = (usize, &[(usize, u64)])> {
		self.rows.iter().map(|(row, entries)| (*row, entries.as_slice()))
	}

	/// Number of non-empty rows.
	pub fn row_count(&self) -> usize {
		self.rows.len()
	}

	/// Number of non-zero cells.
	pub fn entry_count(&self) -> usize {
		self.rows.values().map(Vec::len).sum()
	}

	pub fn is_empty(&self) -> bool {
		self.rows.is_empty()
	}

	/// Checks every row and column index against `dimension`.
	pub(crate) fn check_bounds(&self, dimension: usize) -> std::result::Result<(), String> {
		for (&row, entries) in &self.rows {
			if row >= dimension {
				return Err(format!("row index {row} out of range for {dimension} tokens"));
			}
			if let Some(&(col, _)) = entries.iter().find(|(col, _)| *col >= dimension) {
				return Err(format!("column index {col} in row {row} out of range for {dimension} tokens"));
			}
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn drops_zero_cells_row_major() {
		let sparse = SparseMatrix::from_rows(&[vec![1, 0, 2], vec![0, 3, 100], vec![10, 4, 5]]);
		assert_eq!(sparse.row(0), [(0, 1), (2, 2)]);
		assert_eq!(sparse.row(1), [(1, 3), (2, 100)]);
		assert_eq!(sparse.row(2), [(0, 10), (1, 4), (2, 5)]);
		assert_eq!(sparse.entry_count(), 7);
	}

	#[test]
	fn empty_rows_are_omitted() {
		let sparse = SparseMatrix::from_rows(&[vec![0, 0], vec![0, 7]]);
		assert_eq!(sparse.row_count(), 1);
		assert!(sparse.row(0).is_empty());
	}

	#[test]
	fn dense_round_trip() {
		let dense = CountMatrix::from_rows(&[vec![0, 5, 0], vec![0, 0, 0], vec![2, 0, 1]]).unwrap();
		let sparse = SparseMatrix::from_dense(&dense);
		assert_eq!(sparse.to_dense(3).unwrap(), dense);
	}

	#[test]
	fn to_dense_rejects_small_dimension() {
		let sparse = SparseMatrix::from_rows(&[vec![0, 0, 1], vec![0, 0, 0], vec![0, 0, 0]]);
		assert!(sparse.to_dense(2).is_err());
	}

	#[test]
	fn insert_row_normalizes_entries() {
		let mut sparse = SparseMatrix::new();
		sparse.insert_row(4, vec![(3, 1), (0, 0), (1, 9)]).unwrap();
		assert_eq!(sparse.row(4), [(1, 9), (3, 1)]);
		assert!(sparse.insert_row(4, vec![(1, 1), (1, 2)]).is_err());
		sparse.insert_row(4, vec![(2, 0)]).unwrap();
		assert!(sparse.is_empty());
	}
}

//! Binary persistence of a (sparse matrix, vocabulary) pair.
//!
//! Layout of the raw payload:
//! - `FORMAT_MAGIC` (4 bytes) and `FORMAT_VERSION` (1 byte)
//! - a `postcard` body: token count, each token length-prefixed, row count,
//!   then each non-empty row as its index followed by `(column, weight)` pairs
//!
//! When compressed, the whole payload is wrapped in an xz stream. The xz
//! header doubles as the compression magic, so `load` needs no flag.

use std::borrow::Cow;
use std::collections::BTreeMap;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use super::sparse::SparseMatrix;
use super::vocabulary::Vocabulary;
use crate::error::{ClaptrapError, Result};

/// Leading bytes of an uncompressed payload.
pub const FORMAT_MAGIC: &[u8; 4] = b"CLTP";

/// Payload layout version written by [`dump`].
pub const FORMAT_VERSION: u8 = 1;

/// Leading bytes of every xz stream.
pub const COMPRESSION_MAGIC: &[u8; 6] = b"\xFD7zXZ\x00";

#[derive(Serialize)]
struct WireModelRef<'a> {
	words: &'a [String],
	rows: Vec<WireRowRef<'a>>,
}

#[derive(Serialize)]
struct WireRowRef<'a> {
	index: usize,
	entries: &'a [(usize, u64)],
}

#[derive(Deserialize)]
struct WireModel {
	words: Vec<String>,
	rows: Vec<WireRow>,
}

#[derive(Deserialize)]
struct WireRow {
	index: usize,
	entries: Vec<(usize, u64)>,
}

/// Serializes a sparse matrix and its vocabulary into a single blob.
///
/// With `compress`, the payload is xz-compressed and starts with
/// [`COMPRESSION_MAGIC`]; otherwise it starts with [`FORMAT_MAGIC`].
///
/// # Errors
/// Returns an encode error if serialization or compression fails.
pub fn dump(sparse: &SparseMatrix, vocabulary: &Vocabulary, compress: bool) -> Result<Vec<u8>> {
	let wire = WireModelRef {
		words: vocabulary.words(),
		rows: sparse
			.iter()
			.map(|(index, entries)| WireRowRef { index, entries })
			.collect(),
	};

	let mut payload = Vec::with_capacity(FORMAT_MAGIC.len() + 1);
	payload.extend_from_slice(FORMAT_MAGIC);
	payload.push(FORMAT_VERSION);
	let payload = postcard::to_extend(&wire, payload)
		.map_err(|e| ClaptrapError::Encode(format!("postcard error: {e}")))?;

	if !compress {
		info!("dumped {} tokens, {} cells into {} bytes", vocabulary.len(), sparse.entry_count(), payload.len());
		return Ok(payload);
	}

	let mut compressed = Vec::new();
	lzma_rs::xz_compress(&mut payload.as_slice(), &mut compressed)
		.map_err(|e| ClaptrapError::Encode(format!("xz error: {e}")))?;
	info!(
		"dumped {} tokens, {} cells into {} bytes ({} before compression)",
		vocabulary.len(),
		sparse.entry_count(),
		compressed.len(),
		payload.len()
	);
	Ok(compressed)
}

/// Returns whether `blob` starts with the compression magic.
pub fn is_compressed(blob: &[u8]) -> bool {
	blob.starts_with(COMPRESSION_MAGIC)
}

/// Parses a blob written by [`dump`], compressed or not.
///
/// # Errors
/// Returns a decode error for unknown magic, unsupported versions, corrupt
/// compression, truncated or trailing data, duplicate tokens, and indices
/// or weights that break the sparse matrix invariants.
pub fn load(blob: &[u8]) -> Result<(SparseMatrix, Vocabulary)> {
	let payload: Cow<'_, [u8]> = if is_compressed(blob) {
		let mut decompressed = Vec::new();
		lzma_rs::xz_decompress(&mut &blob[..], &mut decompressed)
			.map_err(|e| ClaptrapError::decode(format!("xz error: {e}")))?;
		debug!("decompressed {} bytes into {}", blob.len(), decompressed.len());
		Cow::Owned(decompressed)
	} else {
		Cow::Borrowed(blob)
	};

	let (sparse, vocabulary) = parse_payload(&payload)?;
	info!("loaded {} tokens, {} cells", vocabulary.len(), sparse.entry_count());
	Ok((sparse, vocabulary))
}

fn parse_payload(payload: &[u8]) -> Result<(SparseMatrix, Vocabulary)> {
	let header_len = FORMAT_MAGIC.len() + 1;
	if payload.len() < header_len {
		return Err(ClaptrapError::decode(format!("blob too short: {} bytes", payload.len())));
	}
	if !payload.starts_with(FORMAT_MAGIC) {
		return Err(ClaptrapError::decode("unrecognized magic"));
	}
	let version = payload[FORMAT_MAGIC.len()];
	if version != FORMAT_VERSION {
		return Err(ClaptrapError::decode(format!("unsupported format version {version}")));
	}

	let (wire, rest) = postcard::take_from_bytes::<WireModel>(&payload[header_len..])
		.map_err(|e| ClaptrapError::decode(format!("postcard error: {e}")))?;
	if !rest.is_empty() {
		return Err(ClaptrapError::decode(format!("{} trailing bytes", rest.len())));
	}

	let vocabulary = Vocabulary::new(wire.words).map_err(|e| match e {
		ClaptrapError::Validation(message) => ClaptrapError::Decode(message),
		other => other,
	})?;
	let sparse = check_rows(wire.rows, vocabulary.len())?;
	Ok((sparse, vocabulary))
}

fn check_rows(rows: Vec<WireRow>, dimension: usize) -> Result<SparseMatrix> {
	let mut checked = BTreeMap::new();
	let mut previous_row: Option<usize> = None;

	for WireRow { index, entries } in rows {
		if index >= dimension {
			return Err(ClaptrapError::decode(format!("row index {index} out of range for {dimension} tokens")));
		}
		if previous_row.is_some_and(|previous| previous >= index) {
			return Err(ClaptrapError::decode(format!("row {index} out of order")));
		}
		if entries.is_empty() {
			return Err(ClaptrapError::decode(format!("row {index} has no entries")));
		}

		let mut previous_col: Option<usize> = None;
		for &(col, weight) in &entries {
			if col >= dimension {
				return Err(ClaptrapError::decode(format!(
					"column index {col} in row {index} out of range for {dimension} tokens"
				)));
			}
			if previous_col.is_some_and(|previous| previous >= col) {
				return Err(ClaptrapError::decode(format!("column {col} in row {index} out of order")));
			}
			if weight == 0 {
				return Err(ClaptrapError::decode(format!("zero weight at ({index}, {col})")));
			}
			previous_col = Some(col);
		}

		previous_row = Some(index);
		checked.insert(index, entries);
	}

	Ok(SparseMatrix::from_checked_rows(checked))
}

use std::collections::HashMap;

use log::{debug, warn};

use crate::error::{ClaptrapError, Result};

/// Default number of most frequent tokens kept in a vocabulary.
pub const DEFAULT_THRESHOLD: usize = 1000;

/// Tokens never admitted to a vocabulary, compared case-insensitively:
/// chapter numerals and book furniture.
pub const STOP_LIST: [&str; 14] = [
	"i", "ii", "iii", "iv", "v", "vi", "vii", "viii", "ix", "x", "xi", "xii", "chapter", "gutenberg",
];

/// Ordered set of unique tokens, each identified by its position.
///
/// # Invariants
/// - No duplicate tokens
/// - `index[words[i]] == i` for every `i`
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Vocabulary {
	words: Vec<String>,
	index: HashMap<String, usize>,
}

impl Vocabulary {
	/// Builds a vocabulary from an explicit ordered token list.
	///
	/// # Errors
	/// Returns a validation error if a token appears twice.
	pub fn new<I, S>(words: I) -> Result<Self>
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		let mut vocabulary = Self::default();
		for word in words {
			let word = word.into();
			if vocabulary.index.contains_key(&word) {
				return Err(ClaptrapError::validation(format!("duplicate vocabulary token {word:?}")));
			}
			vocabulary.index.insert(word.clone(), vocabulary.words.len());
			vocabulary.words.push(word);
		}
		Ok(vocabulary)
	}

	/// Selects the `threshold` most frequent tokens of `corpus`, then drops
	/// stop-listed ones.
	///
	/// Tokens with equal counts keep the order in which they first appear
	/// in the corpus, so the result is fully deterministic.
	///
	/// # Errors
	/// Returns a validation error if the corpus is empty. A vocabulary left
	/// empty by the stop-list is valid.
	pub fn from_corpus<S: AsRef<str>>(corpus: &[S], threshold: usize) -> Result<Self> {
		if corpus.is_empty() {
			return Err(ClaptrapError::validation("corpus is empty"));
		}

		// token -> (count, first position)
		let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
		for (position, token) in corpus.iter().enumerate() {
			counts.entry(token.as_ref()).or_insert((0, position)).0 += 1;
		}

		let mut ranked: Vec<(&str, usize, usize)> = counts
			.into_iter()
			.map(|(token, (count, first))| (token, count, first))
			.collect();
		ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));
		debug!("corpus has {} distinct tokens, keeping at most {}", ranked.len(), threshold);

		let words = ranked
			.into_iter()
			.take(threshold)
			.map(|(token, _, _)| token)
			.filter(|token| !is_stop_listed(token));
		// Counting keys are unique already
		let vocabulary = Self::new(words)?;

		if vocabulary.is_empty() {
			warn!("vocabulary is empty after applying the stop-list");
		}
		Ok(vocabulary)
	}

	pub fn len(&self) -> usize {
		self.words.len()
	}

	pub fn is_empty(&self) -> bool {
		self.words.is_empty()
	}

	/// Tokens in index order.
	pub fn words(&self) -> &[String] {
		&self.words
	}

	pub fn get(&self, index: usize) -> Option<&str> {
		self.words.get(index).map(String::as_str)
	}

	pub fn index_of(&self, token: &str) -> Option<usize> {
		self.index.get(token).copied()
	}

	pub fn contains(&self, token: &str) -> bool {
		self.index.contains_key(token)
	}

	pub fn iter(&self) -> impl Iterator<Item = &str> {
		self.words.iter().map(String::as_str)
	}
}

fn is_stop_listed(token: &str) -> bool {
	let lower = token.to_lowercase();
	STOP_LIST.contains(&lower.as_str())
}

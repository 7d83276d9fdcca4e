use log::trace;
use rand::Rng;

use super::walk::{TransitionSource, Walker};
use crate::error::{ClaptrapError, Result};

/// Punctuation tokens glued to the previous word.
const PUNCTUATION: [char; 6] = ['.', '!', '?', ';', ',', ':'];

/// Punctuation after which the next word is capitalized.
const TERMINATORS: [char; 3] = ['.', '!', '?'];

/// Replacements for a trailing space left by truncation.
const CLOSING: [char; 4] = ['.', '!', '?', 's'];

/// Requested phrase length, in characters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PhraseLength {
	/// Exactly this many characters.
	Exact(usize),
	/// Anywhere in `min..=max` characters.
	Range { min: usize, max: usize },
}

impl PhraseLength {
	pub const fn range(min: usize, max: usize) -> Self {
		Self::Range { min, max }
	}

	/// Returns the validated `(min, max)` bounds.
	///
	/// # Errors
	/// Returns a validation error if `min < 1` or `min > max`.
	pub fn bounds(self) -> Result<(usize, usize)> {
		let (min, max) = match self {
			Self::Exact(length) => (length, length),
			Self::Range { min, max } => (min, max),
		};
		if min > max {
			return Err(ClaptrapError::validation(format!(
				"minimum length {min} must not exceed maximum length {max}"
			)));
		}
		if min < 1 {
			return Err(ClaptrapError::validation("length must be positive"));
		}
		Ok((min, max))
	}
}

impl Default for PhraseLength {
	fn default() -> Self {
		Self::Range { min: 100, max: 120 }
	}
}

impl From<usize> for PhraseLength {
	fn from(length: usize) -> Self {
		Self::Exact(length)
	}
}

impl From<(usize, usize)> for PhraseLength {
	fn from((min, max): (usize, usize)) -> Self {
		Self::Range { min, max }
	}
}

/// Phrase under construction.
struct Accumulator {
	text: String,
	chars: usize,
	capitalize_next: bool,
}

impl Accumulator {
	fn new(seed: String) -> Self {
		let chars = seed.chars().count();
		Self { text: seed, chars, capitalize_next: false }
	}

	fn push_token(&mut self, token: &str) {
		match single_char(token) {
			Some(c) if PUNCTUATION.contains(&c) => {
				self.text.push(c);
				self.chars += 1;
				if TERMINATORS.contains(&c) {
					self.capitalize_next = true;
				}
			}
			_ => {
				let word = if self.capitalize_next {
					self.capitalize_next = false;
					title_case(token)
				} else {
					token.to_owned()
				};
				self.text.push(' ');
				self.text.push_str(&word);
				// Case mapping may change the length
				self.chars += 1 + word.chars().count();
			}
		}
	}

	/// Cuts the text to at most `max` characters.
	fn truncate(&mut self, max: usize) {
		if let Some((offset, _)) = self.text.char_indices().nth(max) {
			self.text.truncate(offset);
		}
		self.chars = self.text.chars().count();
	}
}

/// Renders one phrase from a weighted walk.
///
/// 1. Tokens are pulled until one title-cases to a purely alphabetic word,
///    which opens the phrase. A walk that finds none within `node_count()`
///    steps jumps to an alphabetic node picked uniformly.
/// 2. While the phrase is shorter than `min`, tokens are appended: single
///    punctuation marks without a space (`.`, `!` and `?` capitalize the next
///    word), anything else after one space.
/// 3. The phrase is cut to `max` characters; a trailing space is replaced by
///    one of `.`, `!`, `?` or `s`.
///
/// All randomness comes from `rng`, so a seeded source reproduces the
/// phrase exactly.
///
/// # Errors
/// Returns a validation error for invalid lengths, and for sources with no
/// alphabetic token to open a phrase with.
pub fn assemble<S, R>(source: &S, walker: &mut Walker, rng: &mut R, length: PhraseLength) -> Result<String>
where
	S: TransitionSource + ?Sized,
	R: Rng,
{
	let (min, max) = length.bounds()?;
	let seed = seed_word(source, walker, rng)?;

	let mut phrase = Accumulator::new(seed);
	let mut tokens = walker.tokens(source, rng);
	while phrase.chars < min {
		let token = tokens.next().ok_or_else(|| ClaptrapError::validation("model has no tokens"))?;
		phrase.push_token(token);
	}
	drop(tokens);

	phrase.truncate(max);
	if phrase.text.ends_with(' ') {
		phrase.text.pop();
		phrase.text.push(CLOSING[rng.random_range(0..CLOSING.len())]);
	}
	Ok(phrase.text)
}

/// Walks until a token title-cases to an alphabetic word.
///
/// The walk may be trapped in a cycle of non-alphabetic tokens, so after
/// `node_count()` fruitless steps the walker jumps to a uniformly chosen
/// alphabetic node.
fn seed_word<S, R>(source: &S, walker: &mut Walker, rng: &mut R) -> Result<String>
where
	S: TransitionSource + ?Sized,
	R: Rng,
{
	let alphabetic: Vec<usize> = (0..source.node_count())
		.filter(|&node| is_alphabetic(&title_case(source.token(node))))
		.collect();
	if alphabetic.is_empty() {
		return Err(ClaptrapError::validation("model has no alphabetic token to start a phrase"));
	}

	for _ in 0..source.node_count() {
		let Some(node) = walker.step(source, rng) else {
			break;
		};
		let candidate = title_case(source.token(node));
		if is_alphabetic(&candidate) {
			return Ok(candidate);
		}
	}

	let node = alphabetic[rng.random_range(0..alphabetic.len())];
	trace!("no alphabetic token reached, jumping to node {node}");
	walker.jump(node);
	Ok(title_case(source.token(node)))
}

/// Upper-cases letters that follow a non-letter and lower-cases the others.
///
/// Only the first character of an upper-case expansion stays upper-case,
/// so `ßa` becomes `Ssa`.
pub fn title_case(word: &str) -> String {
	let mut result = String::with_capacity(word.len());
	let mut previous_is_letter = false;
	for c in word.chars() {
		if c.is_alphabetic() {
			if previous_is_letter {
				result.extend(c.to_lowercase());
			} else {
				let mut upper = c.to_uppercase();
				result.extend(upper.next());
				result.extend(upper.flat_map(char::to_lowercase));
			}
		} else {
			result.push(c);
		}
		previous_is_letter = c.is_alphabetic();
	}
	result
}

fn is_alphabetic(word: &str) -> bool {
	!word.is_empty() && word.chars().all(char::is_alphabetic)
}

fn single_char(token: &str) -> Option<char> {
	let mut chars = token.chars();
	match (chars.next(), chars.next()) {
		(Some(c), None) => Some(c),
		_ => None,
	}
}

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::phrase::{self, PhraseLength};
use super::walk::{TransitionSource, Walker};
use crate::error::Result;

/// High-level phrase generator over a transition model.
///
/// # Responsibilities
/// - Own one weighted walk over a shared, read-only model
/// - Own the random source every random decision draws from
/// - Render bounded-length phrases, one at a time or in batches
///
/// The walk continues across phrases, as a single infinite token stream
/// feeding successive phrases. Independent generators may share one model
/// through `&M` or `Arc<M>`; they never share walk state.
#[derive(Debug)]
pub struct PhraseGenerator<S, R = StdRng> {
	source: S,
	walker: Walker,
	rng: R,
}

impl<S: TransitionSource> PhraseGenerator<S, StdRng> {
	/// Creates a reproducible generator: the same seed over the same model
	/// yields the same phrases.
	pub fn seeded(source: S, seed: u64) -> Self {
		Self::new(source, StdRng::seed_from_u64(seed))
	}

	/// Creates a generator seeded from the thread-local random source.
	pub fn from_entropy(source: S) -> Self {
		Self::new(source, StdRng::from_rng(&mut rand::rng()))
	}
}

impl<S: TransitionSource, R: Rng> PhraseGenerator<S, R> {
	pub fn new(source: S, rng: R) -> Self {
		Self { source, walker: Walker::new(), rng }
	}

	/// Generates one phrase.
	///
	/// # Errors
	/// Returns a validation error for an invalid length or a model unable
	/// to start a phrase.
	pub fn phrase(&mut self, length: PhraseLength) -> Result<String> {
		phrase::assemble(&self.source, &mut self.walker, &mut self.rng, length)
	}

	/// Generates `count` phrases sequentially.
	pub fn phrases(&mut self, length: PhraseLength, count: usize) -> Result<Vec<String>> {
		(0..count).map(|_| self.phrase(length)).collect()
	}

	/// Advances the walk by one token, outside of any phrase.
	pub fn next_token(&mut self) -> Option<&str> {
		self.walker.next_token(&self.source, &mut self.rng)
	}

	pub fn source(&self) -> &S {
		&self.source
	}

	/// The injected random source, for callers that draw phrase lengths
	/// from the same stream.
	pub fn rng_mut(&mut self) -> &mut R {
		&mut self.rng
	}
}

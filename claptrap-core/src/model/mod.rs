//! Top-level module for the word-transition model.
//!
//! Data flows one way:
//! corpus → `Vocabulary` → `CountMatrix` → `SparseMatrix` → codec
//! → `MarkovModel` → `Walker` → phrase.

/// Frequency-ranked, stop-listed token selection.
pub mod vocabulary;

/// Dense transition counting, single-threaded or chunked across threads.
pub mod transition;

/// Count matrix with zero cells elided.
pub mod sparse;

/// Binary dump/load of a (sparse matrix, vocabulary) pair, with optional
/// xz compression detected from the leading magic.
pub mod codec;

/// Vocabulary and sparse matrix bundled as one immutable model.
pub mod markov_model;

/// Arena-indexed weighted directed graph built from raw adjacency.
pub mod digraph;

/// `TransitionSource` trait and the weighted random walker.
pub mod walk;

/// Phrase length validation and phrase rendering.
pub mod phrase;

/// High-level generator owning a walk and its random source.
pub mod generator;

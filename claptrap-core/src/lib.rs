//! Word-transition phrase generation library.
//!
//! This crate provides a complete pipeline from a tokenized corpus to
//! generated text:
//! - Vocabulary selection and transition counting
//! - Sparse, optionally compressed model persistence
//! - Weighted random walks over the transition graph
//! - Bounded-length, punctuation-aware phrase rendering
//!
//! All randomness is injected by the caller, so a seeded random source
//! reproduces phrases exactly.

/// Error type shared by every operation.
pub mod error;

/// Core models, codec and generation logic.
pub mod model;

/// File helpers (model files, data folders, path handling).
pub mod io;

pub use error::{ClaptrapError, Result};
pub use model::digraph::WeightedDigraph;
pub use model::generator::PhraseGenerator;
pub use model::markov_model::MarkovModel;
pub use model::phrase::PhraseLength;
pub use model::sparse::SparseMatrix;
pub use model::transition::CountMatrix;
pub use model::vocabulary::{DEFAULT_THRESHOLD, Vocabulary};
pub use model::walk::{TransitionSource, Walker};

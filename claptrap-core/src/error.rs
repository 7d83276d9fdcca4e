use thiserror::Error;

/// Errors surfaced by model building, persistence and phrase generation.
///
/// Each variant is a distinct condition so callers (CLI, HTTP server) can
/// report it without inspecting messages.
#[derive(Error, Debug)]
pub enum ClaptrapError {
	/// Invalid caller input: length specification, corpus or matrix shape.
	#[error("validation error: {0}")]
	Validation(String),

	/// Persisted model is truncated or structurally malformed.
	#[error("decode error: {0}")]
	Decode(String),

	/// Serializer or compressor failure while dumping a model.
	#[error("encode error: {0}")]
	Encode(String),

	/// Underlying file or stream failure.
	#[error("resource error: {0}")]
	Resource(#[from] std::io::Error),
}

impl ClaptrapError {
	pub(crate) fn validation(message: impl Into<String>) -> Self {
		Self::Validation(message.into())
	}

	pub(crate) fn decode(message: impl Into<String>) -> Self {
		Self::Decode(message.into())
	}
}

pub type Result<T> = std::result::Result<T, ClaptrapError>;

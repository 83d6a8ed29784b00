use std::io;

use thiserror::Error;

/// Errors produced while building models or running generation sessions.
///
/// `NoMatchFound` and `OutOfVocabulary` end a session but never the
/// program: the generator turns them into a [`StopReason`] and asks the
/// caller whether to go on. Everything else is reported as-is.
///
/// [`StopReason`]: crate::model::generator::StopReason
#[derive(Debug, Error)]
pub enum DissocError {
	/// Training text could not be obtained.
	#[error("cannot read training text from {source_name}: {source}")]
	SourceUnreadable {
		source_name: String,
		#[source]
		source: io::Error,
	},

	/// The corpus does not have more tokens than the frame size.
	#[error("corpus has {len} tokens but the frame size is {frame_size}; need at least {}", .frame_size + 1)]
	CorpusTooSmall { len: usize, frame_size: usize },

	/// A cyclic scan ran out of attempts without a hit.
	#[error("no match found after {attempts} attempts")]
	NoMatchFound { attempts: usize },

	/// None of the tokens of a phrase (or a single lookup) is in the vocabulary.
	#[error("'{phrase}' has no token present in the vocabulary")]
	OutOfVocabulary { phrase: String },

	/// The caller rejected every proposed starting window.
	#[error("no starting window accepted after {attempts} proposals")]
	SeedRejected { attempts: usize },

	/// A window does not hold exactly the frame size.
	#[error("window holds {actual} tokens, expected {expected}")]
	InvalidWindow { expected: usize, actual: usize },

	/// Training text produced no tokens at all.
	#[error("training text contains no tokens")]
	EmptyCorpus,

	/// A configuration value is out of range.
	#[error("invalid configuration: {0}")]
	InvalidConfig(String),

	/// A configuration file could not be parsed.
	#[error("malformed configuration file: {0}")]
	ConfigFormat(#[from] serde_json::Error),

	/// Writing to the transcript failed.
	#[error("transcript sink failed: {0}")]
	Sink(#[from] io::Error),
}

impl DissocError {
	/// Returns `true` for errors that only end the current session.
	pub fn is_recoverable(&self) -> bool {
		matches!(self, DissocError::NoMatchFound { .. } | DissocError::OutOfVocabulary { .. })
	}
}

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, DissocError>;

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn recoverable_split() {
		assert!(DissocError::NoMatchFound { attempts: 3 }.is_recoverable());
		assert!(DissocError::OutOfVocabulary { phrase: "zz".into() }.is_recoverable());
		assert!(!DissocError::EmptyCorpus.is_recoverable());
		assert!(!DissocError::CorpusTooSmall { len: 2, frame_size: 4 }.is_recoverable());
		assert!(!DissocError::SeedRejected { attempts: 1 }.is_recoverable());
	}

	#[test]
	fn corpus_too_small_message_names_the_minimum() {
		let err = DissocError::CorpusTooSmall { len: 3, frame_size: 4 };
		assert_eq!(err.to_string(), "corpus has 3 tokens but the frame size is 4; need at least 5");
	}
}

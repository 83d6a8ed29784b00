use rand::Rng;
use tracing::trace;

use super::corpus::Corpus;
use super::generation_config::{GenerationConfig, SearchMode};
use super::sampler::Sampler;
use super::window::Window;
use crate::error::{DissocError, Result};

/// Exact n-gram continuation search over the raw corpus.
///
/// Given a window of `frame_size` tokens, looks for another place in the
/// corpus where the same tokens appear in the same order and returns the
/// token right after it. The corpus is read as a ring, so a match may span
/// its end and its start.
///
/// # Invariants
/// - `corpus.len() > frame_size` (checked at construction)
/// - `scan_limit <= corpus.len()`
#[derive(Clone, Debug)]
pub struct WindowMatcher<'a> {
	corpus: &'a Corpus,
	frame_size: usize,
	scan_limit: usize,
	search: SearchMode,
}

impl<'a> WindowMatcher<'a> {
	/// Creates a matcher for `corpus` using the frame size, scan bound and
	/// search mode of `config`.
	///
	/// # Errors
	/// Returns `CorpusTooSmall` if the corpus does not exceed the frame size.
	pub fn new(corpus: &'a Corpus, config: &GenerationConfig) -> Result<Self> {
		let frame_size = config.frame_size();
		corpus.ensure_fits(frame_size)?;
		Ok(Self {
			corpus,
			frame_size,
			scan_limit: config.effective_scan_limit(corpus.len()),
			search: config.search,
		})
	}

	pub fn frame_size(&self) -> usize {
		self.frame_size
	}

	/// Failed attempts allowed before a step reports `NoMatchFound`.
	pub fn scan_limit(&self) -> usize {
		self.scan_limit
	}

	/// Proposes a starting window copied from a random corpus position.
	pub fn random_window<R: Rng>(&self, sampler: &mut Sampler<R>) -> Result<Window> {
		let start = sampler
			.start_position(self.corpus.len(), self.frame_size)
			.ok_or(DissocError::CorpusTooSmall { len: self.corpus.len(), frame_size: self.frame_size })?;
		self.corpus.window_at(start, self.frame_size)
	}

	/// Returns `true` if the window matches the corpus at `start` (cyclic).
	pub fn matches_at(&self, window: &Window, start: usize) -> bool {
		window.iter().enumerate().all(|(i, token)| self.corpus.cyclic(start + i) == token)
	}

	/// Every cyclic position where `window` occurs, in corpus order.
	pub fn occurrences(&self, window: &Window) -> Vec<usize> {
		(0..self.corpus.len()).filter(|&start| self.matches_at(window, start)).collect()
	}

	/// Finds the token that follows another occurrence of `window`.
	///
	/// Scanning starts at a random position (or 0 in `FromStart` mode) and
	/// moves forward one position per attempt, wrapping past the end.
	///
	/// # Errors
	/// - `InvalidWindow` if the window size differs from the frame size
	/// - `NoMatchFound` once `scan_limit` attempts have failed
	pub fn find_continuation<R: Rng>(&self, window: &Window, sampler: &mut Sampler<R>) -> Result<&'a str> {
		if window.len() != self.frame_size {
			return Err(DissocError::InvalidWindow { expected: self.frame_size, actual: window.len() });
		}

		let len = self.corpus.len();
		let mut position = match self.search {
			SearchMode::Random => sampler.index(len).unwrap_or_default(),
			SearchMode::FromStart => 0,
		};

		let mut attempts = 0;
		loop {
			if self.matches_at(window, position) {
				trace!(position, attempts, "Window matched");
				return Ok(self.corpus.cyclic(position + self.frame_size));
			}
			position = (position + 1) % len;
			attempts += 1;
			if attempts >= self.scan_limit {
				return Err(DissocError::NoMatchFound { attempts });
			}
		}
	}
}

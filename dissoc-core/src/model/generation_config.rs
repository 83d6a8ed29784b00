use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{DissocError, Result};
use crate::io;

/// Default number of tokens in a search window.
pub const DEFAULT_FRAME_SIZE: usize = 4;

/// Default number of tokens emitted per session.
pub const DEFAULT_MAX_STEPS: usize = 300;

/// Default number of seed proposals or phrase requests before giving up.
pub const DEFAULT_MAX_SEED_ATTEMPTS: usize = 100;

/// Where the exact-match search starts scanning on every step.
///
/// # Variants
/// - `Random`: a fresh uniformly random position each step
/// - `FromStart`: always position 0. Tends to settle on the first
///   distinctive phrase of the corpus and loop on it.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum SearchMode {
	#[default]
	Random,
	FromStart,
}

/// Tunable parameters of a generation session.
///
/// # Responsibilities
/// - Hold frame size, step bound, scan bound, seed retry bound and search mode
/// - Reject values that would make the generators degenerate
///
/// # Invariants
/// - `frame_size`, `max_steps` and `max_seed_attempts` are all >= 1
///   (enforced by the setters and by `validate` after deserialization)
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct GenerationConfig {
	frame_size: usize,
	max_steps: usize,
	max_seed_attempts: usize,

	/// Number of failed match attempts after which a step gives up.
	/// `None` uses `corpus length - (frame size + 1)`.
	pub scan_limit: Option<usize>,

	pub search: SearchMode,
}

impl Default for GenerationConfig {
	fn default() -> Self {
		Self {
			frame_size: DEFAULT_FRAME_SIZE,
			max_steps: DEFAULT_MAX_STEPS,
			max_seed_attempts: DEFAULT_MAX_SEED_ATTEMPTS,
			scan_limit: None,
			search: SearchMode::Random,
		}
	}
}

impl GenerationConfig {
	/// Loads a JSON configuration file. Missing fields take their defaults.
	///
	/// # Errors
	/// - `SourceUnreadable` if the file cannot be read
	/// - `ConfigFormat` if it is not valid JSON for this structure
	/// - `InvalidConfig` if a value is out of range
	pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
		let config: Self = io::read_json(path)?;
		config.validate()?;
		Ok(config)
	}

	pub fn frame_size(&self) -> usize {
		self.frame_size
	}

	pub fn max_steps(&self) -> usize {
		self.max_steps
	}

	pub fn max_seed_attempts(&self) -> usize {
		self.max_seed_attempts
	}

	/// Sets the window size of the exact-match generator.
	///
	/// Sizes 1-2 give very incoherent text; large sizes make `NoMatchFound`
	/// and looping likely.
	///
	/// # Errors
	/// Returns `InvalidConfig` if `frame_size` is zero.
	pub fn set_frame_size(&mut self, frame_size: usize) -> Result<()> {
		Self::check_positive("frame_size", frame_size)?;
		self.frame_size = frame_size;
		Ok(())
	}

	/// # Errors
	/// Returns `InvalidConfig` if `max_steps` is zero.
	pub fn set_max_steps(&mut self, max_steps: usize) -> Result<()> {
		Self::check_positive("max_steps", max_steps)?;
		self.max_steps = max_steps;
		Ok(())
	}

	/// # Errors
	/// Returns `InvalidConfig` if `attempts` is zero.
	pub fn set_max_seed_attempts(&mut self, attempts: usize) -> Result<()> {
		Self::check_positive("max_seed_attempts", attempts)?;
		self.max_seed_attempts = attempts;
		Ok(())
	}

	/// Re-checks every invariant (used after deserialization).
	pub fn validate(&self) -> Result<()> {
		Self::check_positive("frame_size", self.frame_size)?;
		Self::check_positive("max_steps", self.max_steps)?;
		Self::check_positive("max_seed_attempts", self.max_seed_attempts)
	}

	/// Number of failed attempts allowed for a corpus of `corpus_len` tokens.
	///
	/// Defaults to `corpus_len - (frame_size + 1)`; an explicit `scan_limit`
	/// is capped at `corpus_len`, a full cycle.
	pub fn effective_scan_limit(&self, corpus_len: usize) -> usize {
		match self.scan_limit {
			Some(limit) => limit.min(corpus_len),
			None => corpus_len.saturating_sub(self.frame_size + 1),
		}
	}

	fn check_positive(name: &str, value: usize) -> Result<()> {
		if value == 0 {
			return Err(DissocError::InvalidConfig(format!("{name} must be >= 1")));
		}
		Ok(())
	}
}

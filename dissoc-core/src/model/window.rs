use std::collections::VecDeque;
use std::fmt;

use crate::error::{DissocError, Result};

/// Fixed-size sliding buffer of tokens, the exact-match search key.
///
/// Pushing a token at the back evicts the front one, so the length never
/// changes after construction (`ABC` → `BCD` → `CDE`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Window {
	tokens: VecDeque<String>,
}

impl Window {
	/// Creates a window whose size is the number of tokens given.
	///
	/// # Errors
	/// Returns `InvalidWindow` if `tokens` is empty.
	pub fn new(tokens: Vec<String>) -> Result<Self> {
		if tokens.is_empty() {
			return Err(DissocError::InvalidWindow { expected: 1, actual: 0 });
		}
		Ok(Self { tokens: tokens.into() })
	}

	/// Number of tokens held (the frame size).
	pub fn len(&self) -> usize {
		self.tokens.len()
	}

	/// Always `false` for a constructed window.
	pub fn is_empty(&self) -> bool {
		self.tokens.is_empty()
	}

	pub fn get(&self, index: usize) -> Option<&str> {
		self.tokens.get(index).map(String::as_str)
	}

	/// Most recently pushed token.
	pub fn back(&self) -> Option<&str> {
		self.tokens.back().map(String::as_str)
	}

	pub fn iter(&self) -> impl Iterator<Item = &str> {
		self.tokens.iter().map(String::as_str)
	}

	/// Appends `token` and returns the evicted front token.
	pub fn push_back(&mut self, token: String) -> Option<String> {
		let evicted = self.tokens.pop_front();
		self.tokens.push_back(token);
		evicted
	}

	/// Copies the tokens out, oldest first.
	pub fn to_vec(&self) -> Vec<String> {
		self.tokens.iter().cloned().collect()
	}
}

impl fmt::Display for Window {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		for (i, token) in self.tokens.iter().enumerate() {
			if i > 0 {
				f.write_str(" ")?;
			}
			f.write_str(token)?;
		}
		Ok(())
	}
}

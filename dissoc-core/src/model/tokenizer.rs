use std::collections::HashSet;
use std::io::BufRead;

use crate::error::{DissocError, Result};

/// Characters that separate tokens when no custom set is given.
///
/// Whitespace plus the punctuation the generators never want to see inside
/// a token. Apostrophes are delimiters too, so `don't` becomes `don` and `t`.
pub const DEFAULT_DELIMITERS: &[char] = &[
	' ', '\t', '\n', '\r', '\x0c', ',', '.', ':', ';', '?', '!', '@', '#', '$', '%', '^', '&', '*',
	'[', ']', '{', '}', '(', ')', '<', '>', '_', '"', '\'',
];

/// Splits raw text into lowercase tokens.
///
/// # Responsibilities
/// - Split on a fixed delimiter set and drop the empty pieces
/// - Lowercase every token so lookups are case-insensitive
/// - Accept text line by line, from memory or from any `BufRead`
///
/// # Invariants
/// - Output never contains a delimiter character nor an empty token
/// - Identical input always yields an identical token sequence
#[derive(Clone, Debug)]
pub struct Tokenizer {
	delimiters: HashSet<char>,
}

impl Default for Tokenizer {
	fn default() -> Self {
		Self::with_delimiters(DEFAULT_DELIMITERS.iter().copied())
	}
}

impl Tokenizer {
	/// Creates a tokenizer splitting on the given characters.
	pub fn with_delimiters<I: IntoIterator<Item = char>>(delimiters: I) -> Self {
		Self { delimiters: delimiters.into_iter().collect() }
	}

	/// Returns `true` if `c` separates tokens.
	pub fn is_delimiter(&self, c: char) -> bool {
		self.delimiters.contains(&c)
	}

	/// Tokenizes a single line.
	pub fn tokenize_line<'a>(&'a self, line: &'a str) -> impl Iterator<Item = String> + 'a {
		line.split(move |c: char| self.is_delimiter(c))
			.filter(|piece| !piece.is_empty())
			.map(|piece| piece.to_lowercase())
			// Lowercasing never introduces a delimiter for the default set,
			// but a custom set may contain characters that only appear after it.
			.flat_map(move |piece| {
				piece
					.split(|c: char| self.is_delimiter(c))
					.filter(|p| !p.is_empty())
					.map(str::to_owned)
					.collect::<Vec<_>>()
			})
	}

	/// Tokenizes every line of an in-memory source, in order.
	pub fn tokenize_lines<I, S>(&self, lines: I) -> Vec<String>
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		let mut tokens = Vec::new();
		for line in lines {
			tokens.extend(self.tokenize_line(line.as_ref()));
		}
		tokens
	}

	/// Tokenizes a text blob (any line endings).
	pub fn tokenize_text(&self, text: &str) -> Vec<String> {
		self.tokenize_lines(text.lines())
	}

	/// Tokenizes everything a reader produces.
	///
	/// `source_name` is only used to label the error.
	///
	/// # Errors
	/// Returns `SourceUnreadable` on the first read failure; nothing is retried.
	pub fn tokenize_reader<R: BufRead>(&self, source_name: &str, reader: R) -> Result<Vec<String>> {
		let mut tokens = Vec::new();
		for line in reader.lines() {
			let line = line.map_err(|source| DissocError::SourceUnreadable {
				source_name: source_name.to_owned(),
				source,
			})?;
			tokens.extend(self.tokenize_line(&line));
		}
		Ok(tokens)
	}
}

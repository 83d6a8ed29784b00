use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::tokenizer::Tokenizer;
use super::window::Window;
use crate::error::{DissocError, Result};
use crate::io;

/// Summary figures reported once a corpus is loaded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CorpusStats {
	/// Number of tokens in the corpus.
	pub tokens: usize,
	/// Number of distinct tokens.
	pub vocabulary: usize,
	/// The longest token (first one seen on ties).
	pub longest_token: String,
}

/// The full, ordered token sequence of the training text.
///
/// Built once, never mutated afterwards. Every generator reads from it,
/// so it is cheap to share by reference between sessions.
///
/// # Invariants
/// - Holds at least one token
/// - Tokens are exactly what the `Tokenizer` produced, in input order
///
/// Deserialization goes through [`Corpus::new`], so an empty token list is
/// rejected there too.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(try_from = "RawCorpus")]
pub struct Corpus {
	tokens: Vec<String>,
}

/// Unchecked wire shape of a `Corpus`.
#[derive(Deserialize)]
struct RawCorpus {
	tokens: Vec<String>,
}

impl TryFrom<RawCorpus> for Corpus {
	type Error = DissocError;

	fn try_from(raw: RawCorpus) -> Result<Self> {
		Self::new(raw.tokens)
	}
}

impl Corpus {
	/// Wraps an already tokenized sequence.
	///
	/// # Errors
	/// Returns `EmptyCorpus` if `tokens` is empty.
	pub fn new(tokens: Vec<String>) -> Result<Self> {
		if tokens.is_empty() {
			return Err(DissocError::EmptyCorpus);
		}
		Ok(Self { tokens })
	}

	/// Tokenizes `text` with the default tokenizer.
	pub fn from_text(text: &str) -> Result<Self> {
		Self::new(Tokenizer::default().tokenize_text(text))
	}

	/// Tokenizes a sequence of lines.
	pub fn from_lines<I, S>(tokenizer: &Tokenizer, lines: I) -> Result<Self>
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		Self::new(tokenizer.tokenize_lines(lines))
	}

	/// Reads and concatenates several training files, in order.
	///
	/// # Errors
	/// - `SourceUnreadable` if any file cannot be read
	/// - `EmptyCorpus` if the files hold no token at all
	pub fn from_paths<P: AsRef<Path>>(tokenizer: &Tokenizer, paths: &[P]) -> Result<Self> {
		let mut tokens = Vec::new();
		for path in paths {
			let lines = io::read_file(path)?;
			tokens.extend(tokenizer.tokenize_lines(lines));
		}
		let corpus = Self::new(tokens)?;
		let stats = corpus.stats();
		info!(
			files = paths.len(),
			tokens = stats.tokens,
			vocabulary = stats.vocabulary,
			longest = %stats.longest_token,
			"Corpus loaded"
		);
		Ok(corpus)
	}

	/// Number of tokens.
	pub fn len(&self) -> usize {
		self.tokens.len()
	}

	/// Always `false`; an empty corpus cannot be built.
	pub fn is_empty(&self) -> bool {
		self.tokens.is_empty()
	}

	/// Returns the token at `index`, if any.
	pub fn get(&self, index: usize) -> Option<&str> {
		self.tokens.get(index).map(String::as_str)
	}

	/// Returns the token at `index` taken modulo the corpus length.
	///
	/// The corpus is treated as a ring: position `len()` is position 0.
	pub fn cyclic(&self, index: usize) -> &str {
		&self.tokens[index % self.tokens.len()]
	}

	/// Read-only view on all tokens.
	pub fn tokens(&self) -> &[String] {
		&self.tokens
	}

	/// Checks that a window of `frame_size` tokens can be drawn and continued.
	///
	/// # Errors
	/// Returns `CorpusTooSmall` unless `len() > frame_size`.
	pub fn ensure_fits(&self, frame_size: usize) -> Result<()> {
		if self.len() <= frame_size {
			return Err(DissocError::CorpusTooSmall { len: self.len(), frame_size });
		}
		Ok(())
	}

	/// Copies `size` consecutive tokens starting at `start` (cyclic) into a window.
	pub fn window_at(&self, start: usize, size: usize) -> Result<Window> {
		Window::new((0..size).map(|i| self.cyclic(start + i).to_owned()).collect())
	}

	/// Computes token count, vocabulary size and longest token.
	pub fn stats(&self) -> CorpusStats {
		let vocabulary = self.tokens.iter().map(String::as_str).collect::<HashSet<_>>().len();
		let mut longest = "";
		for token in &self.tokens {
			if token.chars().count() > longest.chars().count() {
				longest = token;
			}
		}
		CorpusStats { tokens: self.tokens.len(), vocabulary, longest_token: longest.to_owned() }
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write;
	use tempfile::NamedTempFile;

	#[test]
	fn empty_text_is_rejected() {
		assert!(matches!(Corpus::from_text(" .,; "), Err(DissocError::EmptyCorpus)));
	}

	#[test]
	fn deserializing_an_empty_corpus_fails() {
		let err = serde_json::from_str::<Corpus>(r#"{"tokens":[]}"#).unwrap_err();
		assert!(err.to_string().contains("no tokens"), "{err}");
	}

	#[test]
	fn deserialized_corpus_matches_the_tokenized_one() {
		let corpus = Corpus::from_text("a b, c").unwrap();
		let json = serde_json::to_string(&corpus).unwrap();
		assert_eq!(json, r#"{"tokens":["a","b","c"]}"#);
		let back: Corpus = serde_json::from_str(&json).unwrap();
		assert_eq!(back, corpus);
		assert_eq!(back.cyclic(3), "a");
	}

	#[test]
	fn cyclic_indexing_wraps() {
		let corpus = Corpus::from_text("a b c").unwrap();
		assert_eq!(corpus.cyclic(0), "a");
		assert_eq!(corpus.cyclic(3), "a");
		assert_eq!(corpus.cyclic(5), "c");
		assert_eq!(corpus.get(3), None);
	}

	#[test]
	fn window_at_wraps_around_the_end() {
		let corpus = Corpus::from_text("a b c d").unwrap();
		let window = corpus.window_at(3, 3).unwrap();
		assert_eq!(window.to_vec(), vec!["d", "a", "b"]);
	}

	#[test]
	fn ensure_fits_requires_one_more_token_than_the_frame() {
		let corpus = Corpus::from_text("a b c d").unwrap();
		assert!(corpus.ensure_fits(3).is_ok());
		assert!(matches!(
			corpus.ensure_fits(4),
			Err(DissocError::CorpusTooSmall { len: 4, frame_size: 4 })
		));
	}

	#[test]
	fn stats_report_vocabulary_and_longest_token() {
		let corpus = Corpus::from_text("the cat sat the cat ran the dog sat").unwrap();
		let stats = corpus.stats();
		assert_eq!(stats.tokens, 9);
		assert_eq!(stats.vocabulary, 5);
		assert_eq!(stats.longest_token, "the");
	}

	#[test]
	fn several_files_are_concatenated() {
		let mut first = NamedTempFile::new().unwrap();
		writeln!(first, "One two").unwrap();
		let mut second = NamedTempFile::new().unwrap();
		writeln!(second, "three, FOUR").unwrap();

		let corpus = Corpus::from_paths(&Tokenizer::default(), &[first.path(), second.path()]).unwrap();
		assert_eq!(corpus.tokens(), ["one", "two", "three", "four"]);
	}

	#[test]
	fn missing_file_is_unreadable() {
		let err = Corpus::from_paths(&Tokenizer::default(), &["this_file_should_not_exist.txt"]).unwrap_err();
		assert!(matches!(err, DissocError::SourceUnreadable { .. }));
	}
}

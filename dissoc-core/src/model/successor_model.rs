use std::collections::HashMap;

use rand::Rng;
use tracing::info;

use super::corpus::Corpus;
use super::sampler::Sampler;
use super::successors::Successors;
use super::tokenizer::Tokenizer;
use crate::error::{DissocError, Result};

/// First-order Markov model mapping each token to its observed successors.
///
/// Built in a single pass over the corpus: for every adjacent pair
/// `(T, U)`, `U` is appended to the successor list of `T`. Every corpus
/// token gets an entry, so the final token of the corpus is known even when
/// nothing ever follows it; such a token is a dead end.
///
/// # Responsibilities
/// - Build the successor lists from a `Corpus`
/// - Sample the next token proportionally to observed frequencies
/// - Pick a usable starting token out of a free-form phrase
///
/// # Invariants
/// - For tokens `T` and `U`, `U` appears in `T`'s list exactly as many times
///   as `U` immediately follows `T` in the corpus
/// - Read-only once built
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SuccessorModel {
	/// Mapping from a token to the tokens seen right after it.
	successors: HashMap<String, Successors>,
}

impl SuccessorModel {
	/// Builds the model from every adjacent token pair of `corpus`.
	pub fn build(corpus: &Corpus) -> Self {
		let mut successors: HashMap<String, Successors> = HashMap::new();
		let tokens = corpus.tokens();

		for pair in tokens.windows(2) {
			successors.entry(pair[0].clone()).or_default().push(&pair[1]);
		}
		// The corpus' last token may never have been a predecessor.
		if let Some(last) = tokens.last() {
			successors.entry(last.clone()).or_default();
		}

		let model = Self { successors };
		info!(
			vocabulary = model.vocabulary_size(),
			dead_ends = model.successors.values().filter(|s| s.is_empty()).count(),
			"Successor model built"
		);
		model
	}

	/// Number of distinct tokens known to the model.
	pub fn vocabulary_size(&self) -> usize {
		self.successors.len()
	}

	/// Returns `true` if `token` occurs in the corpus.
	pub fn contains(&self, token: &str) -> bool {
		self.successors.contains_key(token)
	}

	/// Returns `true` if at least one token was ever seen after `token`.
	pub fn is_continuable(&self, token: &str) -> bool {
		self.successors.get(token).is_some_and(|s| !s.is_empty())
	}

	/// Successor list of `token`, duplicates included, in corpus order.
	pub fn successors(&self, token: &str) -> Option<&[String]> {
		self.successors.get(token).map(Successors::as_slice)
	}

	/// Transition counts of `token`.
	pub fn frequencies(&self, token: &str) -> Option<HashMap<&str, usize>> {
		self.successors.get(token).map(Successors::counts)
	}

	/// Returns `true` if both models hold the same keys with the same
	/// per-key follower multisets, whatever the order inside each list.
	pub fn same_distribution(&self, other: &Self) -> bool {
		self.successors.len() == other.successors.len()
			&& self.successors.iter().all(|(token, successors)| {
				other.successors.get(token).is_some_and(|o| o.counts() == successors.counts())
			})
	}

	/// Samples the token following `last`.
	///
	/// Returns `Ok(None)` when `last` is a dead end.
	///
	/// # Errors
	/// Returns `OutOfVocabulary` if `last` is not in the corpus.
	pub fn sample_next<R: Rng>(&self, last: &str, sampler: &mut Sampler<R>) -> Result<Option<&str>> {
		let successors = self
			.successors
			.get(last)
			.ok_or_else(|| DissocError::OutOfVocabulary { phrase: last.to_owned() })?;
		Ok(successors.sample(sampler))
	}

	/// Picks the starting token of a phrase.
	///
	/// Takes the phrase's last token; while that token cannot be continued,
	/// drops it and tries the one before. Returns `None` once the phrase is
	/// exhausted.
	pub fn select_seed(&self, tokenizer: &Tokenizer, phrase: &str) -> Option<String> {
		let mut tokens: Vec<String> = tokenizer.tokenize_line(phrase).collect();
		while let Some(candidate) = tokens.pop() {
			if self.is_continuable(&candidate) {
				return Some(candidate);
			}
		}
		None
	}
}

use std::collections::HashMap;

use rand::Rng;

use super::sampler::Sampler;

/// Tokens observed right after one given token.
///
/// Conceptually a node of a Markov chain whose outgoing edges are stored
/// as a flat list: every observation is pushed, duplicates included, so the
/// number of copies of a follower is its transition count.
///
/// ## Responsibilities:
/// - Accumulate followers during the build pass
/// - Pick a follower uniformly over the list (hence by frequency)
///
/// ## Invariants
/// - Order of `followers` is the order of observation in the corpus
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct Successors {
	/// Example: "cat" => ["sleeps", "meows", "sits", "meows"]
	followers: Vec<String>,
}

impl Successors {
	/// Records one occurrence of `next` following the owning token.
	pub fn push(&mut self, next: &str) {
		self.followers.push(next.to_owned());
	}

	pub fn is_empty(&self) -> bool {
		self.followers.is_empty()
	}

	pub fn as_slice(&self) -> &[String] {
		&self.followers
	}

	/// Transition count per distinct follower.
	pub fn counts(&self) -> HashMap<&str, usize> {
		let mut counts = HashMap::new();
		for follower in &self.followers {
			*counts.entry(follower.as_str()).or_insert(0) += 1;
		}
		counts
	}

	/// Picks a follower; `None` if the token was never followed.
	pub fn sample<R: Rng>(&self, sampler: &mut Sampler<R>) -> Option<&str> {
		sampler.choose(&self.followers).map(String::as_str)
	}
}

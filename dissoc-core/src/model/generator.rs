use rand::Rng;
use rand::rngs::StdRng;
use tracing::{debug, info, warn};

use super::corpus::Corpus;
use super::generation_config::GenerationConfig;
use super::sampler::Sampler;
use super::successor_model::SuccessorModel;
use super::tokenizer::Tokenizer;
use super::window::Window;
use super::window_matcher::WindowMatcher;
use crate::error::{DissocError, Result};
use crate::interaction::{Responder, TokenSink};

/// Marker written to the transcript when the exact-match search gives up.
pub const NO_MATCH_MARKER: &str = "No match found.  Terminating.";

/// Which generator drives a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Strategy {
	/// Exact n-gram continuation over the raw corpus.
	Window,
	/// Frequency-weighted successor chain.
	Markov,
}

/// Why a session stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopReason {
	/// `max_steps` tokens were emitted.
	StepLimit,
	/// The window was not found elsewhere within the scan bound.
	NoMatchFound,
	/// The chain reached a token nothing ever followed.
	DeadEnd,
	/// No phrase with a usable token was supplied.
	OutOfVocabulary,
}

/// Outcome of one session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionReport {
	pub strategy: Strategy,
	/// Accepted starting window or starting token. Empty if none was found.
	pub seed: Vec<String>,
	/// Tokens produced after the seed, in order.
	pub emitted: Vec<String>,
	pub reason: StopReason,
}

/// Drives the generators over one corpus.
///
/// # Responsibilities
/// - Own the corpus, the successor model, the configuration and the sampler
/// - Select starting points through a `Responder`
/// - Run bounded sessions, streaming tokens into a `TokenSink`
/// - Turn `NoMatchFound` / `OutOfVocabulary` into a recorded `StopReason`
///
/// # Invariants
/// - Corpus and successor model are never mutated after construction
/// - A session emits at most `max_steps` tokens after its seed
#[derive(Debug)]
pub struct Generator<R = StdRng> {
	corpus: Corpus,
	model: SuccessorModel,
	tokenizer: Tokenizer,
	config: GenerationConfig,
	sampler: Sampler<R>,
}

impl<R: Rng> Generator<R> {
	/// Creates a generator and builds the successor model.
	///
	/// # Errors
	/// Returns `InvalidConfig` if `config` breaks its invariants.
	pub fn new(corpus: Corpus, tokenizer: Tokenizer, config: GenerationConfig, sampler: Sampler<R>) -> Result<Self> {
		config.validate()?;
		let model = SuccessorModel::build(&corpus);
		info!(
			tokens = corpus.len(),
			frame_size = config.frame_size(),
			max_steps = config.max_steps(),
			"Generator ready"
		);
		Ok(Self { corpus, model, tokenizer, config, sampler })
	}

	/// Tokenizes `lines` with the default tokenizer and builds a generator.
	pub fn from_lines<I, S>(lines: I, config: GenerationConfig, sampler: Sampler<R>) -> Result<Self>
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		let tokenizer = Tokenizer::default();
		let corpus = Corpus::from_lines(&tokenizer, lines)?;
		Self::new(corpus, tokenizer, config, sampler)
	}

	pub fn corpus(&self) -> &Corpus {
		&self.corpus
	}

	pub fn model(&self) -> &SuccessorModel {
		&self.model
	}

	pub fn config(&self) -> &GenerationConfig {
		&self.config
	}

	/// Runs sessions of `strategy` until the responder declines to continue.
	///
	/// # Errors
	/// Fatal errors only (`CorpusTooSmall`, `SeedRejected`, sink failures).
	pub fn run(
		&mut self,
		strategy: Strategy,
		responder: &mut dyn Responder,
		sink: &mut dyn TokenSink,
	) -> Result<Vec<SessionReport>> {
		let mut reports = Vec::new();
		loop {
			let report = match strategy {
				Strategy::Window => self.run_window_session(responder, sink)?,
				Strategy::Markov => self.run_markov_session(responder, sink)?,
			};
			let again = responder.continue_session(&report);
			reports.push(report);
			if !again {
				break;
			}
		}
		Ok(reports)
	}

	/// Proposes random windows until one is accepted, then generates from it.
	///
	/// # Errors
	/// - `CorpusTooSmall` if the corpus does not exceed the frame size
	/// - `SeedRejected` after `max_seed_attempts` rejections
	/// - `Sink` if the transcript cannot be written
	pub fn run_window_session(
		&mut self,
		responder: &mut dyn Responder,
		sink: &mut dyn TokenSink,
	) -> Result<SessionReport> {
		let matcher = WindowMatcher::new(&self.corpus, &self.config)?;
		let window = Self::propose_window(&matcher, &mut self.sampler, responder, self.config.max_seed_attempts())?;
		self.continue_window(window, sink)
	}

	/// Generates from an explicit starting window.
	///
	/// Writes a session header and the window to `sink`, then up to
	/// `max_steps` continuations. A `NoMatchFound` ends the session early.
	///
	/// # Errors
	/// - `CorpusTooSmall` if the corpus does not exceed the frame size
	/// - `InvalidWindow` if `window` is not `frame_size` tokens long
	/// - `Sink` if the transcript cannot be written
	pub fn continue_window(&mut self, mut window: Window, sink: &mut dyn TokenSink) -> Result<SessionReport> {
		let matcher = WindowMatcher::new(&self.corpus, &self.config)?;
		if window.len() != matcher.frame_size() {
			return Err(DissocError::InvalidWindow { expected: matcher.frame_size(), actual: window.len() });
		}

		debug!(window = %window, "Window session started");
		sink.note(&format!("New conversation.  Frame size={}", matcher.frame_size()))?;
		for token in window.iter() {
			sink.emit(token)?;
		}

		let seed = window.to_vec();
		let mut emitted = Vec::new();
		let mut reason = StopReason::StepLimit;
		while emitted.len() < self.config.max_steps() {
			match matcher.find_continuation(&window, &mut self.sampler) {
				Ok(next) => {
					sink.emit(next)?;
					window.push_back(next.to_owned());
					emitted.push(next.to_owned());
				}
				Err(DissocError::NoMatchFound { attempts }) => {
					debug!(attempts, emitted = emitted.len(), "No match found");
					sink.note(NO_MATCH_MARKER)?;
					reason = StopReason::NoMatchFound;
					break;
				}
				Err(e) => return Err(e),
			}
		}

		debug!(emitted = emitted.len(), ?reason, "Window session ended");
		Ok(SessionReport { strategy: Strategy::Window, seed, emitted, reason })
	}

	/// Asks for phrases until one holds a usable token, then generates from it.
	///
	/// After `max_seed_attempts` unusable phrases, or when the responder has
	/// no more phrases, the session ends with `StopReason::OutOfVocabulary`.
	///
	/// # Errors
	/// Returns `Sink` if the transcript cannot be written.
	pub fn run_markov_session(
		&mut self,
		responder: &mut dyn Responder,
		sink: &mut dyn TokenSink,
	) -> Result<SessionReport> {
		match self.select_seed(responder) {
			Some(seed) => self.continue_markov(&seed, sink),
			None => Ok(SessionReport {
				strategy: Strategy::Markov,
				seed: Vec::new(),
				emitted: Vec::new(),
				reason: StopReason::OutOfVocabulary,
			}),
		}
	}

	/// Generates from an explicit starting token.
	///
	/// # Errors
	/// - `OutOfVocabulary` if `seed` is not in the corpus
	/// - `Sink` if the transcript cannot be written
	pub fn continue_markov(&mut self, seed: &str, sink: &mut dyn TokenSink) -> Result<SessionReport> {
		if !self.model.contains(seed) {
			return Err(DissocError::OutOfVocabulary { phrase: seed.to_owned() });
		}

		debug!(seed, "Markov session started");
		sink.note("New conversation.  Successor chain")?;
		sink.emit(seed)?;

		let mut current = seed.to_owned();
		let mut emitted = Vec::new();
		let mut reason = StopReason::StepLimit;
		while emitted.len() < self.config.max_steps() {
			match self.model.sample_next(&current, &mut self.sampler)? {
				Some(next) => {
					sink.emit(next)?;
					current = next.to_owned();
					emitted.push(current.clone());
				}
				None => {
					debug!(token = %current, "Dead end reached");
					reason = StopReason::DeadEnd;
					break;
				}
			}
		}

		debug!(emitted = emitted.len(), ?reason, "Markov session ended");
		Ok(SessionReport { strategy: Strategy::Markov, seed: vec![seed.to_owned()], emitted, reason })
	}

	fn propose_window(
		matcher: &WindowMatcher<'_>,
		sampler: &mut Sampler<R>,
		responder: &mut dyn Responder,
		max_attempts: usize,
	) -> Result<Window> {
		for attempt in 1..=max_attempts {
			let window = matcher.random_window(sampler)?;
			if responder.confirm_window(&window) {
				return Ok(window);
			}
			debug!(attempt, window = %window, "Starting window rejected");
		}
		warn!(max_attempts, "No starting window accepted");
		Err(DissocError::SeedRejected { attempts: max_attempts })
	}

	fn select_seed(&self, responder: &mut dyn Responder) -> Option<String> {
		let attempts = self.config.max_seed_attempts();
		for attempt in 0..attempts {
			let phrase = responder.request_phrase(attempt > 0)?;
			if let Some(seed) = self.model.select_seed(&self.tokenizer, &phrase) {
				return Some(seed);
			}
			warn!(phrase = %phrase, "Bad starting phrase, no token in vocabulary");
		}
		None
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::interaction::ScriptedResponder;

	const CATS: &str = "the cat sat the cat ran the dog sat";

	fn generator(text: &str, frame_size: usize, max_steps: usize, seed: u64) -> Generator {
		let mut config = GenerationConfig::default();
		config.set_frame_size(frame_size).unwrap();
		config.set_max_steps(max_steps).unwrap();
		Generator::from_lines(text.lines(), config, Sampler::seeded(seed)).unwrap()
	}

	fn window(tokens: &[&str]) -> Window {
		Window::new(tokens.iter().map(|t| t.to_string()).collect()).unwrap()
	}

	#[test]
	fn end_to_end_first_step_is_sat_or_ran() {
		for seed in 0..50 {
			let mut generator = generator(CATS, 2, 1, seed);
			let mut sink: Vec<String> = Vec::new();
			let report = generator.continue_window(window(&["the", "cat"]), &mut sink).unwrap();
			assert_eq!(report.emitted.len(), 1);
			assert!(["sat", "ran"].contains(&report.emitted[0].as_str()));
			assert_eq!(sink, vec!["the", "cat", report.emitted[0].as_str()]);
		}
	}

	#[test]
	fn window_session_never_exceeds_max_steps() {
		let text = "a b c a b d a b c a b e a b c";
		for seed in 0..20 {
			let mut generator = generator(text, 2, 25, seed);
			let mut responder = ScriptedResponder::new();
			let mut sink: Vec<String> = Vec::new();
			let report = generator.run_window_session(&mut responder, &mut sink).unwrap();
			assert!(report.emitted.len() <= 25);
			if report.reason == StopReason::StepLimit {
				assert_eq!(report.emitted.len(), 25);
			}
			assert_eq!(sink.len(), report.seed.len() + report.emitted.len());
		}
	}

	#[test]
	fn every_window_step_is_a_corpus_continuation() {
		let mut generator = generator(CATS, 2, 100, 17);
		let mut sink: Vec<String> = Vec::new();
		let report = generator.continue_window(window(&["the", "cat"]), &mut sink).unwrap();

		let corpus = generator.corpus().clone();
		let matcher = WindowMatcher::new(&corpus, generator.config()).unwrap();
		let mut live = window(&["the", "cat"]);
		for next in &report.emitted {
			let followers: Vec<&str> = matcher
				.occurrences(&live)
				.into_iter()
				.map(|p| corpus.cyclic(p + 2))
				.collect();
			assert!(followers.contains(&next.as_str()), "{next} cannot follow {live}");
			live.push_back(next.clone());
		}
	}

	#[test]
	fn unmatched_window_ends_with_marker() {
		struct Recorder(Vec<String>);
		impl TokenSink for Recorder {
			fn emit(&mut self, token: &str) -> std::io::Result<()> {
				self.0.push(token.to_owned());
				Ok(())
			}
			fn note(&mut self, message: &str) -> std::io::Result<()> {
				self.0.push(format!("[{message}]"));
				Ok(())
			}
		}

		let mut generator = generator(CATS, 2, 10, 3);
		let mut sink = Recorder(Vec::new());
		let report = generator.continue_window(window(&["dog", "cat"]), &mut sink).unwrap();
		assert_eq!(report.reason, StopReason::NoMatchFound);
		assert!(report.emitted.is_empty());
		assert_eq!(sink.0.first().map(String::as_str), Some("[New conversation.  Frame size=2]"));
		assert_eq!(sink.0.last(), Some(&format!("[{NO_MATCH_MARKER}]")));
	}

	#[test]
	fn wrong_size_window_fails_fast() {
		let mut generator = generator(CATS, 3, 10, 0);
		let mut sink: Vec<String> = Vec::new();
		assert!(matches!(
			generator.continue_window(window(&["the", "cat"]), &mut sink),
			Err(DissocError::InvalidWindow { expected: 3, actual: 2 })
		));
		assert!(sink.is_empty());
	}

	#[test]
	fn small_corpus_cannot_start_a_window_session() {
		let mut generator = generator("a b c", 4, 10, 0);
		let mut responder = ScriptedResponder::new();
		let mut sink: Vec<String> = Vec::new();
		assert!(matches!(
			generator.run_window_session(&mut responder, &mut sink),
			Err(DissocError::CorpusTooSmall { len: 3, frame_size: 4 })
		));
	}

	#[test]
	fn rejections_are_bounded() {
		let mut config = GenerationConfig::default();
		config.set_frame_size(2).unwrap();
		config.set_max_seed_attempts(3).unwrap();
		let mut generator = Generator::from_lines([CATS], config, Sampler::seeded(1)).unwrap();
		let mut responder = ScriptedResponder::new().with_confirmations([false; 5]);
		let mut sink: Vec<String> = Vec::new();
		assert!(matches!(
			generator.run_window_session(&mut responder, &mut sink),
			Err(DissocError::SeedRejected { attempts: 3 })
		));
	}

	#[test]
	fn rejected_window_is_replaced() {
		let mut generator = generator(CATS, 2, 5, 8);
		let mut responder = ScriptedResponder::new().with_confirmations([false, false, true]);
		let mut sink: Vec<String> = Vec::new();
		let report = generator.run_window_session(&mut responder, &mut sink).unwrap();
		assert_eq!(report.seed.len(), 2);
		assert!(report.emitted.len() <= 5);
	}

	#[test]
	fn markov_session_runs_to_step_limit_on_a_cycle() {
		// Every token has a successor except the final "c", which also appears earlier.
		let mut generator = generator("a b c a b c a", 4, 40, 5);
		let mut responder = ScriptedResponder::new().with_phrases(["hello a"]);
		let mut sink: Vec<String> = Vec::new();
		let report = generator.run_markov_session(&mut responder, &mut sink).unwrap();
		assert_eq!(report.seed, vec!["a"]);
		assert_eq!(report.reason, StopReason::StepLimit);
		assert_eq!(report.emitted.len(), 40);
		assert_eq!(sink.len(), 41);
		assert_eq!(&report.emitted[..3], ["b", "c", "a"]);
	}

	#[test]
	fn markov_session_records_dead_end() {
		let mut generator = generator("x y z", 4, 40, 5);
		let mut sink: Vec<String> = Vec::new();
		let report = generator.continue_markov("x", &mut sink).unwrap();
		assert_eq!(report.emitted, vec!["y", "z"]);
		assert_eq!(report.reason, StopReason::DeadEnd);
	}

	#[test]
	fn bad_phrases_are_retried_then_reported() {
		let mut generator = generator(CATS, 2, 3, 5);
		let mut responder = ScriptedResponder::new().with_phrases(["zebra", "unicorn yak", "the"]);
		let mut sink: Vec<String> = Vec::new();
		let report = generator.run_markov_session(&mut responder, &mut sink).unwrap();
		assert_eq!(report.seed, vec!["the"]);
		assert_eq!(report.emitted.len(), 3);

		let mut responder = ScriptedResponder::new().with_phrases(["zebra"]);
		let report = generator.run_markov_session(&mut responder, &mut sink).unwrap();
		assert_eq!(report.reason, StopReason::OutOfVocabulary);
		assert!(report.seed.is_empty());
	}

	#[test]
	fn unknown_explicit_seed_is_out_of_vocabulary() {
		let mut generator = generator(CATS, 2, 3, 5);
		let mut sink: Vec<String> = Vec::new();
		assert!(matches!(
			generator.continue_markov("zebra", &mut sink),
			Err(DissocError::OutOfVocabulary { .. })
		));
	}

	#[test]
	fn run_repeats_while_the_caller_continues() {
		let mut generator = generator(CATS, 2, 4, 12);
		let mut responder = ScriptedResponder::new()
			.with_phrases(["the", "cat", "dog"])
			.with_continuations([true, true, false]);
		let mut sink: Vec<String> = Vec::new();
		let reports = generator.run(Strategy::Markov, &mut responder, &mut sink).unwrap();
		assert_eq!(reports.len(), 3);
		assert!(reports.iter().all(|r| r.strategy == Strategy::Markov));
		let expected: usize = reports.iter().map(|r| r.seed.len() + r.emitted.len()).sum();
		assert_eq!(sink.len(), expected);
	}

	#[test]
	fn same_seed_same_text() {
		let mut first = generator(CATS, 2, 30, 99);
		let mut second = generator(CATS, 2, 30, 99);
		let mut a: Vec<String> = Vec::new();
		let mut b: Vec<String> = Vec::new();
		first.continue_window(window(&["the", "cat"]), &mut a).unwrap();
		second.continue_window(window(&["the", "cat"]), &mut b).unwrap();
		assert_eq!(a, b);
	}
}

//! Request/response boundary between the generator and its caller.
//!
//! The generator never blocks on a terminal or a file itself. It asks a
//! [`Responder`] whether a starting point is acceptable and whether to start
//! another session, and pushes every produced token into a [`TokenSink`].
//! Both are called synchronously; the generator resumes as soon as they return.

use std::collections::VecDeque;
use std::io::{self, Write};

use crate::model::generator::SessionReport;
use crate::model::window::Window;

/// Answers the questions a session asks its caller.
pub trait Responder {
	/// Accept (`true`) or reject a proposed starting window.
	fn confirm_window(&mut self, window: &Window) -> bool;

	/// Supplies a starting phrase for the successor chain.
	///
	/// `retry` is `true` when the previous phrase had no usable token.
	/// Returning `None` gives up on the session.
	fn request_phrase(&mut self, retry: bool) -> Option<String>;

	/// Whether to run another session after `report`.
	fn continue_session(&mut self, report: &SessionReport) -> bool;
}

/// Append-only destination of the generated transcript.
///
/// `emit` receives tokens one per call, in emission order. `note` receives
/// framing lines (session headers, termination markers) and may ignore them.
pub trait TokenSink {
	fn emit(&mut self, token: &str) -> io::Result<()>;

	fn note(&mut self, _message: &str) -> io::Result<()> {
		Ok(())
	}
}

/// Collects tokens in memory, dropping notes.
impl TokenSink for Vec<String> {
	fn emit(&mut self, token: &str) -> io::Result<()> {
		self.push(token.to_owned());
		Ok(())
	}
}

/// Writes the transcript as text: tokens separated by spaces, notes on
/// their own line. Flushes after every call.
#[derive(Debug)]
pub struct WriterSink<W: Write> {
	writer: W,
}

impl<W: Write> WriterSink<W> {
	pub fn new(writer: W) -> Self {
		Self { writer }
	}

	pub fn into_inner(self) -> W {
		self.writer
	}
}

impl<W: Write> TokenSink for WriterSink<W> {
	fn emit(&mut self, token: &str) -> io::Result<()> {
		write!(self.writer, "{token} ")?;
		self.writer.flush()
	}

	fn note(&mut self, message: &str) -> io::Result<()> {
		writeln!(self.writer, "\n{message}")?;
		self.writer.flush()
	}
}

/// Forwards everything to two sinks (e.g. console and transcript file).
#[derive(Debug)]
pub struct TeeSink<A, B> {
	first: A,
	second: B,
}

impl<A: TokenSink, B: TokenSink> TeeSink<A, B> {
	pub fn new(first: A, second: B) -> Self {
		Self { first, second }
	}
}

impl<A: TokenSink, B: TokenSink> TokenSink for TeeSink<A, B> {
	fn emit(&mut self, token: &str) -> io::Result<()> {
		self.first.emit(token)?;
		self.second.emit(token)
	}

	fn note(&mut self, message: &str) -> io::Result<()> {
		self.first.note(message)?;
		self.second.note(message)
	}
}

impl<S: TokenSink> TokenSink for Option<S> {
	fn emit(&mut self, token: &str) -> io::Result<()> {
		match self {
			Some(sink) => sink.emit(token),
			None => Ok(()),
		}
	}

	fn note(&mut self, message: &str) -> io::Result<()> {
		match self {
			Some(sink) => sink.note(message),
			None => Ok(()),
		}
	}
}

/// Non-interactive responder replaying prepared answers.
///
/// Once a script runs out, windows are accepted, no phrase is given and no
/// further session is started.
#[derive(Clone, Debug, Default)]
pub struct ScriptedResponder {
	confirmations: VecDeque<bool>,
	phrases: VecDeque<String>,
	continuations: VecDeque<bool>,
}

impl ScriptedResponder {
	pub fn new() -> Self {
		Self::default()
	}

	/// Answers given to successive window proposals.
	pub fn with_confirmations<I: IntoIterator<Item = bool>>(mut self, answers: I) -> Self {
		self.confirmations.extend(answers);
		self
	}

	/// Phrases given to successive phrase requests.
	pub fn with_phrases<I, S>(mut self, phrases: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.phrases.extend(phrases.into_iter().map(Into::into));
		self
	}

	/// Answers given after each finished session.
	pub fn with_continuations<I: IntoIterator<Item = bool>>(mut self, answers: I) -> Self {
		self.continuations.extend(answers);
		self
	}
}

impl Responder for ScriptedResponder {
	fn confirm_window(&mut self, _window: &Window) -> bool {
		self.confirmations.pop_front().unwrap_or(true)
	}

	fn request_phrase(&mut self, _retry: bool) -> Option<String> {
		self.phrases.pop_front()
	}

	fn continue_session(&mut self, _report: &SessionReport) -> bool {
		self.continuations.pop_front().unwrap_or(false)
	}
}

//! Corpus-driven pseudo-random text generation.
//!
//! This crate provides two classic generators that read a tokenized
//! training corpus:
//! - Exact n-gram continuation ("Dissociated Press"): a sliding window of
//!   tokens is searched for elsewhere in the corpus and the following token
//!   is emitted
//! - First-order successor chain ("Mark V. Shaney"): each token maps to the
//!   multiset of tokens observed right after it, sampled by frequency
//!
//! Storage and prompting stay outside the core: callers hand in lines of
//! text, a [`interaction::Responder`] for seed acceptance and a
//! [`interaction::TokenSink`] for the transcript.

/// Error type shared by every module.
pub mod error;

/// Caller-facing seams: seed acceptance, continuation prompts and the
/// transcript sink.
pub mod interaction;

/// Corpus, models and the generation loop.
pub mod model;

/// File helpers (training text, configuration files).
///
/// Not exposed
pub(crate) mod io;

pub use error::{DissocError, Result};

//! Corpus, generators and the session driver.
//!
//! Leaves first:
//! - Tokenization into lowercase tokens (`Tokenizer`)
//! - The immutable token sequence (`Corpus`) and the sliding `Window`
//! - Exact n-gram continuation search (`WindowMatcher`)
//! - Frequency-weighted successor chain (`SuccessorModel`)
//! - Random draws over an injected generator (`Sampler`)
//! - Bounded sessions over either strategy (`Generator`)

/// Text to token splitting.
pub mod tokenizer;

/// Immutable ordered token sequence with cyclic indexing.
pub mod corpus;

/// Fixed-size FIFO window of tokens.
pub mod window;

/// Random source handle shared by every sampling step.
pub mod sampler;

/// Frame size, step bound, scan bound and search mode.
pub mod generation_config;

/// Exact-match continuation search with wraparound.
pub mod window_matcher;

/// Per-token follower list.
///
/// Not exposed
mod successors;

/// First-order successor model built from the corpus.
pub mod successor_model;

/// Session driver over both strategies.
pub mod generator;

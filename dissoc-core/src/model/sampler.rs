use std::time::{SystemTime, UNIX_EPOCH};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Owner of the random source used by every sampling step.
///
/// Passed explicitly into the matchers and models instead of reaching for a
/// global generator, so a session seeded with the same value replays the
/// same text.
#[derive(Clone, Debug)]
pub struct Sampler<R = StdRng> {
	rng: R,
}

impl Sampler<StdRng> {
	/// Reproducible sampler.
	pub fn seeded(seed: u64) -> Self {
		Self::new(StdRng::seed_from_u64(seed))
	}

	/// Sampler seeded from the wall clock (non-cryptographic).
	pub fn from_clock() -> Self {
		let seed = SystemTime::now()
			.duration_since(UNIX_EPOCH)
			.map(|elapsed| elapsed.as_nanos() as u64)
			.unwrap_or_default();
		Self::seeded(seed)
	}
}

impl<R: Rng> Sampler<R> {
	pub fn new(rng: R) -> Self {
		Self { rng }
	}

	/// Uniform index in `[0, len)`, or `None` when `len` is zero.
	pub fn index(&mut self, len: usize) -> Option<usize> {
		if len == 0 {
			return None;
		}
		Some(self.rng.random_range(0..len))
	}

	/// Uniformly picks one element of `items`.
	///
	/// An element present twice is twice as likely.
	pub fn choose<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
		self.index(items.len()).map(|i| &items[i])
	}

	/// Random starting position for a window of `frame_size` tokens.
	///
	/// Stays at least `frame_size` tokens away from the end, so the
	/// window never wraps and always has a following token.
	pub fn start_position(&mut self, corpus_len: usize, frame_size: usize) -> Option<usize> {
		self.index(corpus_len.saturating_sub(frame_size))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn same_seed_same_draws() {
		let mut a = Sampler::seeded(7);
		let mut b = Sampler::seeded(7);
		let left: Vec<_> = (0..32).map(|_| a.index(1000)).collect();
		let right: Vec<_> = (0..32).map(|_| b.index(1000)).collect();
		assert_eq!(left, right);
	}

	#[test]
	fn empty_ranges_yield_none() {
		let mut sampler = Sampler::seeded(1);
		assert_eq!(sampler.index(0), None);
		assert_eq!(sampler.choose::<u8>(&[]), None);
		assert_eq!(sampler.start_position(4, 4), None);
	}

	#[test]
	fn start_position_keeps_room_for_the_frame() {
		let mut sampler = Sampler::seeded(3);
		for _ in 0..500 {
			let start = sampler.start_position(10, 4).unwrap();
			assert!(start < 6);
		}
	}

	#[test]
	fn choose_covers_every_element() {
		let mut sampler = Sampler::seeded(11);
		let items = ["a", "b", "c"];
		let mut seen = [false; 3];
		for _ in 0..200 {
			let picked = sampler.choose(&items).unwrap();
			let i = items.iter().position(|x| x == picked).unwrap();
			seen[i] = true;
		}
		assert!(seen.iter().all(|s| *s));
	}
}

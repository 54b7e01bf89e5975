use std::sync::LazyLock;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use parking_lot::Mutex;

use crate::{Nondeterminism, SplitMix64};

static CLOCK_ANCHOR: LazyLock<Instant> = LazyLock::new(Instant::now);

/// Real clocks and process environment, with random draws from a SplitMix64
/// stream seeded from OS entropy.
#[derive(Debug)]
pub struct SystemSource {
	rng: Mutex<SplitMix64>,
	seeded: bool,
}

impl SystemSource {
	/// Creates a source whose random stream is seeded from OS entropy.
	pub fn new() -> Self {
		let mut buf = [0u8; 8];
		let seed = match getrandom::fill(&mut buf) {
			Ok(()) => u64::from_le_bytes(buf),
			Err(error) => {
				let fallback = clock_nanos() ^ epoch_millis().rotate_left(32);
				tracing::warn!(%error, "entropy.os_seed_unavailable; falling back to clock seed");
				fallback
			}
		};
		Self {
			rng: Mutex::new(SplitMix64::new(seed)),
			seeded: false,
		}
	}

	/// Creates a source with real clocks but a reproducible random stream.
	pub fn seeded(seed: u64) -> Self {
		Self {
			rng: Mutex::new(SplitMix64::new(seed)),
			seeded: true,
		}
	}
}

impl Default for SystemSource {
	fn default() -> Self {
		Self::new()
	}
}

fn clock_nanos() -> u64 {
	u64::try_from(CLOCK_ANCHOR.elapsed().as_nanos()).unwrap_or(u64::MAX)
}

fn epoch_millis() -> u64 {
	SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.map(|elapsed| u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
		.unwrap_or(0)
}

impl Nondeterminism for SystemSource {
	fn nanos(&self) -> u64 {
		clock_nanos()
	}

	fn epoch_millis(&self) -> u64 {
		epoch_millis()
	}

	fn next_bool(&self) -> bool {
		self.rng.lock().next_bool()
	}

	fn next_unit(&self) -> f64 {
		self.rng.lock().next_unit()
	}

	fn env(&self, key: &str) -> Option<String> {
		std::env::var(key).ok()
	}

	fn source_id(&self) -> &'static str {
		if self.seeded { "system-seeded" } else { "system" }
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn clock_is_monotonic() {
		let source = SystemSource::new();
		let first = source.nanos();
		let second = source.nanos();
		assert!(second >= first);
	}

	#[test]
	fn epoch_millis_is_after_2020() {
		assert!(SystemSource::new().epoch_millis() > 1_577_836_800_000);
	}

	#[test]
	fn seeded_sources_share_random_stream() {
		let a = SystemSource::seeded(99);
		let b = SystemSource::seeded(99);
		let draws_a: Vec<bool> = (0..32).map(|_| a.next_bool()).collect();
		let draws_b: Vec<bool> = (0..32).map(|_| b.next_bool()).collect();
		assert_eq!(draws_a, draws_b);
		assert_eq!(a.source_id(), "system-seeded");
	}

	#[test]
	fn missing_env_var_is_none() {
		assert_eq!(SystemSource::new().env("MIRAGE_ENTROPY_TEST_SURELY_UNSET"), None);
	}
}

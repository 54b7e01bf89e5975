//! Injectable nondeterminism for scenario branch selection.
//!
//! Every clock read, coin flip and environment lookup a scenario performs goes
//! through [`Nondeterminism`]. Production code uses [`SystemSource`]; tests
//! force individual branches with [`ScriptedSource`].

mod scripted;
mod splitmix;
mod system;

pub use scripted::{ScriptedSource, ScriptedSourceBuilder};
pub use splitmix::SplitMix64;
pub use system::SystemSource;

/// Source of time, randomness and environment values.
pub trait Nondeterminism: std::fmt::Debug + Send + Sync {
	/// High resolution clock reading in nanoseconds. Only differences and
	/// residues are meaningful; the origin is unspecified.
	fn nanos(&self) -> u64;

	/// Wall clock in milliseconds since the Unix epoch.
	fn epoch_millis(&self) -> u64;

	/// Fair coin flip.
	fn next_bool(&self) -> bool;

	/// Uniform draw in `[0, 1)`.
	fn next_unit(&self) -> f64;

	/// Environment variable lookup.
	fn env(&self, key: &str) -> Option<String>;

	/// Stable identifier for tracing and diagnostics.
	fn source_id(&self) -> &'static str;
}

use std::collections::VecDeque;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::Nondeterminism;

const DEFAULT_NANOS: u64 = 1;
const DEFAULT_MILLIS: u64 = 1;
const DEFAULT_UNIT: f64 = 0.5;

/// Queue of scripted readings. Pops from the front while more than one value
/// remains, then keeps repeating the last one.
#[derive(Debug, Clone)]
struct Channel<T> {
	values: VecDeque<T>,
	fallback: T,
}

impl<T: Copy> Channel<T> {
	fn new(fallback: T) -> Self {
		Self {
			values: VecDeque::new(),
			fallback,
		}
	}

	fn next(&mut self) -> T {
		match self.values.len() {
			0 => self.fallback,
			1 => self.values[0],
			_ => self.values.pop_front().unwrap_or(self.fallback),
		}
	}
}

#[derive(Debug)]
struct ScriptState {
	nanos: Channel<u64>,
	millis: Channel<u64>,
	bools: Channel<bool>,
	units: Channel<f64>,
}

/// Fully scripted source for forcing scenario branches in tests.
///
/// Unset channels return fixed defaults: `nanos = 1`, `epoch_millis = 1`,
/// `next_bool = false`, `next_unit = 0.5`, and no environment variables.
#[derive(Debug)]
pub struct ScriptedSource {
	state: Mutex<ScriptState>,
	env: FxHashMap<String, String>,
}

impl ScriptedSource {
	/// Starts a builder with every channel at its default.
	pub fn builder() -> ScriptedSourceBuilder {
		ScriptedSourceBuilder::default()
	}

	/// A source where every channel returns its default.
	pub fn fixed() -> Self {
		Self::builder().build()
	}
}

impl Nondeterminism for ScriptedSource {
	fn nanos(&self) -> u64 {
		self.state.lock().nanos.next()
	}

	fn epoch_millis(&self) -> u64 {
		self.state.lock().millis.next()
	}

	fn next_bool(&self) -> bool {
		self.state.lock().bools.next()
	}

	fn next_unit(&self) -> f64 {
		self.state.lock().units.next()
	}

	fn env(&self, key: &str) -> Option<String> {
		self.env.get(key).cloned()
	}

	fn source_id(&self) -> &'static str {
		"scripted"
	}
}

/// Builder for [`ScriptedSource`].
#[derive(Debug, Default)]
pub struct ScriptedSourceBuilder {
	nanos: Vec<u64>,
	millis: Vec<u64>,
	bools: Vec<bool>,
	units: Vec<f64>,
	env: FxHashMap<String, String>,
}

impl ScriptedSourceBuilder {
	/// Every nanosecond reading returns `value`.
	pub fn nanos(mut self, value: u64) -> Self {
		self.nanos = vec![value];
		self
	}

	/// Nanosecond readings follow `values`, repeating the last one.
	pub fn nanos_sequence(mut self, values: impl IntoIterator<Item = u64>) -> Self {
		self.nanos = values.into_iter().collect();
		self
	}

	/// Every millisecond reading returns `value`.
	pub fn millis(mut self, value: u64) -> Self {
		self.millis = vec![value];
		self
	}

	/// Coin flips follow `values`, repeating the last one.
	pub fn bools(mut self, values: impl IntoIterator<Item = bool>) -> Self {
		self.bools = values.into_iter().collect();
		self
	}

	/// Unit draws follow `values`, repeating the last one.
	pub fn units(mut self, values: impl IntoIterator<Item = f64>) -> Self {
		self.units = values.into_iter().collect();
		self
	}

	/// Sets one environment variable.
	pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.env.insert(key.into(), value.into());
		self
	}

	/// Finishes the source.
	pub fn build(self) -> ScriptedSource {
		let mut nanos = Channel::new(DEFAULT_NANOS);
		nanos.values.extend(self.nanos);
		let mut millis = Channel::new(DEFAULT_MILLIS);
		millis.values.extend(self.millis);
		let mut bools = Channel::new(false);
		bools.values.extend(self.bools);
		let mut units = Channel::new(DEFAULT_UNIT);
		units.values.extend(self.units);

		ScriptedSource {
			state: Mutex::new(ScriptState { nanos, millis, bools, units }),
			env: self.env,
		}
	}
}

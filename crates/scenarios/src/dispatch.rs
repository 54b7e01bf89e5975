//! Dispatch table scenario: one generic capability, two interchangeable
//! providers, and a proxy that picks between them per call.

use std::sync::Arc;

use mirage_entropy::Nondeterminism;
use rustc_hash::FxHashMap;

use crate::effects::ExternalAction;
use crate::error::{Result, ScenarioError};

/// Key bound to the primary provider.
pub const KEY_DEFAULT: &str = "default";
/// Key bound to the secondary provider, forced by the fallback token.
pub const KEY_FALLBACK: &str = "fallback";
/// Key bound to either provider by a coin flip at table construction.
pub const KEY_SOMETIMES: &str = "sometimes";

/// Primary input used when the caller supplies none.
pub const DEFAULT_INPUT: &str = "alpha";
/// Fallback token used when the caller supplies none.
pub const DEFAULT_FALLBACK_TOKEN: &str = "forceFallback";

const OPERATION_EXECUTE: &str = "execute";

/// Single-method capability shared by every provider.
pub trait BehaviorProvider: std::fmt::Debug + Send + Sync {
	/// Transforms `input`.
	fn execute(&self, input: &str) -> String;
}

/// Reverses its input and tags it.
#[derive(Debug)]
struct Reversing;

impl BehaviorProvider for Reversing {
	fn execute(&self, input: &str) -> String {
		let mut out: String = input.chars().rev().collect();
		out.push_str("#real");
		out
	}
}

/// Uppercases its input behind a prefix.
#[derive(Debug)]
struct Detached;

impl BehaviorProvider for Detached {
	fn execute(&self, input: &str) -> String {
		format!("detached:{}", input.to_uppercase())
	}
}

/// Operation key to provider, with intentionally overlapping keys.
#[derive(Debug)]
pub struct DispatchTable {
	providers: FxHashMap<&'static str, Arc<dyn BehaviorProvider>>,
	fallback_token: String,
}

impl DispatchTable {
	/// Binds `default` to `primary`, `fallback` to `secondary` and
	/// `sometimes` to whichever a coin flip picks.
	pub fn new(
		primary: Arc<dyn BehaviorProvider>,
		secondary: Arc<dyn BehaviorProvider>,
		fallback_token: impl Into<String>,
		source: &dyn Nondeterminism,
	) -> Self {
		let sometimes = if source.next_bool() { Arc::clone(&primary) } else { Arc::clone(&secondary) };
		let mut providers = FxHashMap::default();
		providers.insert(KEY_DEFAULT, primary);
		providers.insert(KEY_FALLBACK, secondary);
		providers.insert(KEY_SOMETIMES, sometimes);
		Self {
			providers,
			fallback_token: fallback_token.into(),
		}
	}

	/// Provider bound to `key`.
	pub fn get(&self, key: &str) -> Option<&Arc<dyn BehaviorProvider>> {
		self.providers.get(key)
	}

	/// Resolves the key for a call of `operation` with `arg`.
	///
	/// The fallback token forces `fallback`; otherwise the operation name is
	/// the key, and an unbound key flips between `default` and `sometimes`.
	pub fn resolve_key(&self, operation: &str, arg: &str, source: &dyn Nondeterminism) -> Result<(&'static str, Arc<dyn BehaviorProvider>)> {
		let requested = if arg == self.fallback_token { KEY_FALLBACK } else { operation };
		if let Some((key, provider)) = self.providers.get_key_value(requested) {
			return Ok((*key, Arc::clone(provider)));
		}
		let key = if source.next_bool() { KEY_DEFAULT } else { KEY_SOMETIMES };
		self.providers
			.get(key)
			.map(|provider| (key, Arc::clone(provider)))
			.ok_or_else(|| ScenarioError::invariant(format!("dispatch key '{key}' unbound")))
	}
}

/// Provider facade that routes every call through a [`DispatchTable`].
#[derive(Debug)]
pub struct DispatchProxy<'a> {
	table: &'a DispatchTable,
	source: &'a dyn Nondeterminism,
	effects: &'a dyn ExternalAction,
}

impl<'a> DispatchProxy<'a> {
	/// Wraps `table`.
	pub fn new(table: &'a DispatchTable, source: &'a dyn Nondeterminism, effects: &'a dyn ExternalAction) -> Self {
		Self { table, source, effects }
	}

	/// Invokes `execute` and reports which key served it.
	pub fn invoke(&self, input: &str) -> Result<(&'static str, String)> {
		let (key, provider) = self.table.resolve_key(OPERATION_EXECUTE, input, self.source)?;
		let outcome = self.effects.perform(&[input.to_string()]);
		tracing::debug!(key, ?outcome, "scenario.dispatch.resolve");
		Ok((key, provider.execute(input)))
	}
}

/// Dispatch table scenario.
#[derive(Debug)]
pub struct DispatchScenario {
	source: Arc<dyn Nondeterminism>,
	effects: Arc<dyn ExternalAction>,
}

impl DispatchScenario {
	/// Creates the scenario.
	pub fn new(source: Arc<dyn Nondeterminism>, effects: Arc<dyn ExternalAction>) -> Self {
		Self { source, effects }
	}

	/// Runs one primary call and one forced-fallback call.
	pub fn run(&self, primary_input: Option<&str>, fallback_token: Option<&str>) -> Result<Vec<String>> {
		let token = fallback_token.unwrap_or(DEFAULT_FALLBACK_TOKEN);
		let table = DispatchTable::new(Arc::new(Reversing), Arc::new(Detached), token, &*self.source);
		let proxy = DispatchProxy::new(&table, &*self.source, &*self.effects);

		let (_, first) = proxy.invoke(primary_input.unwrap_or(DEFAULT_INPUT))?;
		let (_, forced) = proxy.invoke(token)?;
		Ok(vec![format!("Dynamic proxy result: {first}"), format!("Forced fallback result: {forced}")])
	}
}

#[cfg(test)]
mod tests {
	use mirage_entropy::{ScriptedSource, SystemSource};
	use pretty_assertions::assert_eq;
	use rstest::rstest;

	use super::*;
	use crate::effects::{DisabledAction, RecordingAction};

	fn scenario(bools: Vec<bool>) -> DispatchScenario {
		DispatchScenario::new(Arc::new(ScriptedSource::builder().bools(bools).build()), Arc::new(DisabledAction))
	}

	#[test]
	fn providers_are_distinguishable_by_output() {
		assert_eq!(Reversing.execute("abc"), "cba#real");
		assert_eq!(Detached.execute("abc"), "detached:ABC");
	}

	// Construction flip binds `sometimes`, the per-call flip picks default/sometimes.
	#[rstest]
	#[case(vec![true, true], "ahpla#real")]
	#[case(vec![true, false], "ahpla#real")]
	#[case(vec![false, true], "ahpla#real")]
	#[case(vec![false, false], "detached:ALPHA")]
	fn primary_call_depends_on_entropy(#[case] bools: Vec<bool>, #[case] expected: &str) {
		let trace = scenario(bools).run(None, None).unwrap();
		assert_eq!(trace[0], format!("Dynamic proxy result: {expected}"));
		assert_eq!(trace[1], "Forced fallback result: detached:FORCEFALLBACK");
	}

	#[test]
	fn fallback_token_forces_fallback_regardless_of_entropy() {
		let scenario = DispatchScenario::new(Arc::new(SystemSource::new()), Arc::new(DisabledAction));
		for _ in 0..100 {
			let trace = scenario.run(Some("beta"), Some("T")).unwrap();
			assert_eq!(trace[1], "Forced fallback result: detached:T");
		}
	}

	#[test]
	fn primary_equal_to_token_is_forced_too() {
		let trace = scenario(vec![true]).run(Some("same"), Some("same")).unwrap();
		assert_eq!(trace, vec!["Dynamic proxy result: detached:SAME".to_string(), "Forced fallback result: detached:SAME".to_string()]);
	}

	#[test]
	fn resolve_key_reports_forced_key() {
		let source = ScriptedSource::fixed();
		let table = DispatchTable::new(Arc::new(Reversing), Arc::new(Detached), "T", &source);
		let (key, _) = table.resolve_key("execute", "T", &source).unwrap();
		assert_eq!(key, KEY_FALLBACK);
		let (key, _) = table.resolve_key(KEY_DEFAULT, "x", &source).unwrap();
		assert_eq!(key, KEY_DEFAULT);
	}

	#[test]
	fn every_call_goes_through_side_effect_capability() {
		let recorder = Arc::new(RecordingAction::new());
		let scenario = DispatchScenario::new(Arc::new(ScriptedSource::fixed()), recorder.clone());
		scenario.run(Some("ls"), Some("T")).unwrap();
		assert_eq!(recorder.calls(), vec![vec!["ls".to_string()], vec!["T".to_string()]]);
	}
}

//! Closure pipeline scenario.
//!
//! Five steps run over a string while some of them read and rewrite a
//! call-scoped state slot. The first and last steps may trade places on any
//! given call, and an optional input drives a second, independent path.

use std::sync::Arc;

use mirage_entropy::Nondeterminism;

use crate::config::{ENV_LAMBDA, ScenarioConfig};
use crate::fingerprint::fingerprint;
use crate::scope::ScopedCell;

/// Value the scoped state holds at the start of every call.
pub const INITIAL_STATE: &str = "seed";
/// Input the optional path's selected step is applied to.
pub const PROBE: &str = "drift";

const SWAP_MODULUS: u64 = 5;

/// Call-scoped state read and written by the pipeline steps.
pub type PipelineState = ScopedCell<String>;

/// Fresh pipeline state holding [`INITIAL_STATE`].
pub fn pipeline_state() -> PipelineState {
	ScopedCell::with_initial(|| INITIAL_STATE.to_string())
}

/// One transformation step.
pub type Step = Box<dyn Fn(&str, &mut PipelineState) -> String + Send + Sync>;

/// Ordered sequence of steps.
pub struct Pipeline {
	steps: Vec<Step>,
}

impl std::fmt::Debug for Pipeline {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Pipeline").field("steps", &self.steps.len()).finish()
	}
}

impl Pipeline {
	/// Trim, decorate, twist, append-state, guard.
	pub fn standard(never_set: Option<String>) -> Self {
		let steps: Vec<Step> = vec![
			Box::new(|input: &str, _: &mut PipelineState| input.trim().to_string()),
			Box::new(decorate),
			Box::new(|input: &str, _: &mut PipelineState| uppercase_with_twist(input)),
			Box::new(|input: &str, state: &mut PipelineState| format!("{input}::{}", state.get())),
			Box::new(move |input: &str, _: &mut PipelineState| {
				if fingerprint(input) == 0 {
					return cold_branch(input, never_set.as_deref());
				}
				input.to_string()
			}),
		];
		Self { steps }
	}

	/// Number of steps.
	pub fn len(&self) -> usize {
		self.steps.len()
	}

	/// Whether the pipeline has no steps.
	pub fn is_empty(&self) -> bool {
		self.steps.is_empty()
	}

	/// Step indices in execution order, optionally with the ends swapped.
	pub fn order(&self, swap_ends: bool) -> Vec<usize> {
		let mut order: Vec<usize> = (0..self.steps.len()).collect();
		if swap_ends && order.len() > 1 {
			let last = order.len() - 1;
			order.swap(0, last);
		}
		order
	}

	/// Applies one step.
	pub fn apply(&self, index: usize, input: &str, state: &mut PipelineState) -> Option<String> {
		self.steps.get(index).map(|step| step(input, state))
	}

	/// Folds `seed` through every step in [`Pipeline::order`].
	pub fn run(&self, seed: String, state: &mut PipelineState, swap_ends: bool) -> String {
		self.order(swap_ends)
			.into_iter()
			.fold(seed, |value, index| (self.steps[index])(&value, state))
	}
}

fn decorate(text: &str, state: &mut PipelineState) -> String {
	let next = format!("{text}*{}", state.get());
	state.set(next);
	format!("{text}-decorated")
}

/// Even length uppercases; odd length splits on `:`, lowercases and joins the
/// parts in reverse. Trailing empty parts are dropped before joining.
pub fn uppercase_with_twist(text: &str) -> String {
	if text.encode_utf16().count() % 2 == 0 {
		return text.to_uppercase();
	}
	let mut parts: Vec<&str> = text.split(':').collect();
	while parts.last().is_some_and(|part| part.is_empty()) {
		parts.pop();
	}
	parts
		.into_iter()
		.map(str::to_lowercase)
		.reduce(|acc, next| next + &acc)
		.unwrap_or_else(|| format!("{text}?twist"))
}

fn cold_branch(untouched: &str, never_set: Option<&str>) -> String {
	if never_set.is_some() {
		tracing::warn!(input = untouched, "scenario.pipeline.never_set_observed");
		return format!("{untouched}::frozen");
	}
	format!("{untouched}::cold")
}

/// Closure pipeline scenario.
#[derive(Debug)]
pub struct PipelineScenario {
	source: Arc<dyn Nondeterminism>,
	never_set: Option<String>,
}

impl PipelineScenario {
	/// Creates the scenario.
	pub fn new(config: &ScenarioConfig, source: Arc<dyn Nondeterminism>) -> Self {
		Self {
			source,
			never_set: config.never_set.clone(),
		}
	}

	/// Runs the scenario with fresh scoped state.
	pub fn run(&self, optional_input: Option<&str>) -> Vec<String> {
		let mut state = pipeline_state();
		self.run_in(&mut state, optional_input)
	}

	/// Runs the scenario against caller-provided scoped state, clearing it
	/// before returning.
	pub fn run_in(&self, state: &mut PipelineState, optional_input: Option<&str>) -> Vec<String> {
		let pipeline = Pipeline::standard(self.never_set.clone());
		let swap_ends = self.source.nanos() % SWAP_MODULUS == 0;
		let seed = format!("{}::origin", state.get());
		let composed = pipeline.run(seed, state, swap_ends);
		tracing::debug!(swap_ends, "scenario.pipeline.composed");

		let mut messages = vec![format!("Lambda pipeline: {composed}")];

		let optional = optional_input.map(str::to_string).or_else(|| self.source.env(ENV_LAMBDA));
		if let Some(value) = optional {
			state.set(format!("{value}{}", self.source.nanos()));
			let index = value.encode_utf16().count() % pipeline.len();
			if let Some(result) = pipeline.apply(index, PROBE, state) {
				tracing::debug!(index, "scenario.pipeline.optional");
				messages.push(format!("Optional path: {result}"));
			}
		}

		state.clear();
		messages
	}
}

#[cfg(test)]
mod tests;

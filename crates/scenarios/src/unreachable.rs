//! Guarded-unreachable scenario and its instrumentation hook.

use std::hint::black_box;
use std::sync::Arc;

use mirage_entropy::Nondeterminism;

use crate::config::ScenarioConfig;
use crate::hook::{Instrumentation, WeavingLog, weaving_log};

/// Trace line of the default (cold) path.
pub const MSG_DORMANT: &str = "Dormant branch executed";
/// Trace line of a branch that no unit draw can reach.
pub const MSG_IMPOSSIBLE: &str = "Random is never negative";
/// Trace line when heavy mode runs with mode `hot`.
pub const MSG_HOT: &str = "Hot path activated";
/// Trace line of a branch comparing an absent flag against `true`.
pub const MSG_NULL_TRUE: &str = "Null true branch";
/// Trace line when the hook left no message.
pub const MSG_HOOK_DEFAULT: &str = "target_for_weaving executed";

/// Guarded-unreachable scenario.
#[derive(Debug)]
pub struct UnreachableScenario {
	heavy_mode: bool,
	hot: bool,
	execute: bool,
	source: Arc<dyn Nondeterminism>,
	hook: Instrumentation,
}

impl UnreachableScenario {
	/// Creates the scenario. The heavy-mode guard is fixed here.
	pub fn new(config: &ScenarioConfig, source: Arc<dyn Nondeterminism>, hook: Instrumentation) -> Self {
		Self {
			heavy_mode: config.heavy_mode,
			hot: config.is_hot(),
			execute: config.execute,
			source,
			hook,
		}
	}

	/// Runs the scenario with a fresh weaving log.
	pub fn run(&self) -> Vec<String> {
		let mut log = weaving_log();
		self.run_in(&mut log)
	}

	/// Runs the scenario against caller-provided scoped state, clearing it
	/// before returning.
	pub fn run_in(&self, log: &mut WeavingLog) -> Vec<String> {
		if self.heavy_mode {
			return self.heavy(log);
		}

		let mut messages = Vec::with_capacity(1);
		if self.source.next_unit() < 0.0 {
			tracing::error!("scenario.unreachable.negative_unit_draw");
			messages.push(MSG_IMPOSSIBLE.to_string());
		}
		messages.push(self.dormant());
		messages
	}

	fn heavy(&self, log: &mut WeavingLog) -> Vec<String> {
		let mut events = Vec::with_capacity(3);
		if self.hot {
			events.push(MSG_HOT.to_string());
		}
		if black_box(None::<bool>) == Some(true) {
			events.push(MSG_NULL_TRUE.to_string());
		}

		self.hook.target_for_weaving(log, &*self.source);
		match log.take() {
			Some(message) if !message.is_empty() => events.push(message),
			_ => events.push(MSG_HOOK_DEFAULT.to_string()),
		}
		log.clear();
		tracing::debug!(woven = self.hook.is_woven(), events = events.len(), "scenario.unreachable.heavy");
		events
	}

	fn dormant(&self) -> String {
		let execute = self.execute;
		let source = &self.source;
		let cold = || {
			if execute {
				tracing::info!(draw = source.next_unit(), "This closure should remain cold");
			}
		};
		cold();
		MSG_DORMANT.to_string()
	}
}

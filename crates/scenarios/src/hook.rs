//! Instrumentation seam for the guarded-unreachable scenario.
//!
//! [`Instrumentation::target_for_weaving`] is the one stable entry point a
//! harness may intercept. Advice is attached from outside the scenario and
//! runs around the hook body; the scenario only ever sees the resulting
//! [`WeavingLog`] message.

use std::fmt;
use std::sync::Arc;

use mirage_entropy::Nondeterminism;

use crate::scope::ScopedCell;

/// Message the default hook body leaves behind.
pub const HOOK_REACHED: &str = "Instrumentation hook reached";
const TEMPORAL_ANOMALY: &str = "Temporal anomaly";

/// Call-scoped message written by the hook and read back by the scenario.
pub type WeavingLog = ScopedCell<Option<String>>;

/// Logic attached on entry to or exit from the hook.
pub type Advice = Arc<dyn Fn(&mut WeavingLog) + Send + Sync>;

/// Replacement for the hook body itself.
pub type HookBody = Arc<dyn Fn(&mut WeavingLog, &dyn Nondeterminism) + Send + Sync>;

/// Creates an empty weaving log.
pub fn weaving_log() -> WeavingLog {
	ScopedCell::with_initial(|| None)
}

/// Hook body plus any externally attached advice.
#[derive(Clone)]
pub struct Instrumentation {
	body: HookBody,
	on_enter: Vec<Advice>,
	on_exit: Vec<Advice>,
}

impl Default for Instrumentation {
	fn default() -> Self {
		Self {
			body: Arc::new(default_body),
			on_enter: Vec::new(),
			on_exit: Vec::new(),
		}
	}
}

impl fmt::Debug for Instrumentation {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Instrumentation")
			.field("on_enter", &self.on_enter.len())
			.field("on_exit", &self.on_exit.len())
			.finish_non_exhaustive()
	}
}

impl Instrumentation {
	/// Unwoven hook with the default body.
	pub fn new() -> Self {
		Self::default()
	}

	/// Attaches advice that runs before the body.
	pub fn on_enter(mut self, advice: impl Fn(&mut WeavingLog) + Send + Sync + 'static) -> Self {
		self.on_enter.push(Arc::new(advice));
		self
	}

	/// Attaches advice that runs after the body.
	pub fn on_exit(mut self, advice: impl Fn(&mut WeavingLog) + Send + Sync + 'static) -> Self {
		self.on_exit.push(Arc::new(advice));
		self
	}

	/// Substitutes the hook body.
	pub fn replace_body(mut self, body: impl Fn(&mut WeavingLog, &dyn Nondeterminism) + Send + Sync + 'static) -> Self {
		self.body = Arc::new(body);
		self
	}

	/// Whether any advice is attached.
	pub fn is_woven(&self) -> bool {
		!self.on_enter.is_empty() || !self.on_exit.is_empty()
	}

	/// The interceptable entry point.
	#[inline(never)]
	pub fn target_for_weaving(&self, log: &mut WeavingLog, source: &dyn Nondeterminism) {
		tracing::trace!(woven = self.is_woven(), "hook.enter");
		for advice in &self.on_enter {
			advice(log);
		}
		(self.body)(log, source);
		for advice in &self.on_exit {
			advice(log);
		}
	}
}

fn default_body(log: &mut WeavingLog, source: &dyn Nondeterminism) {
	if source.epoch_millis() == u64::MAX {
		log.set(Some(TEMPORAL_ANOMALY.to_string()));
		return;
	}
	if log.get().is_none() {
		log.set(Some(HOOK_REACHED.to_string()));
	}
}

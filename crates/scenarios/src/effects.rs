//! External side-effect capability.
//!
//! Scenarios that "may perform an external action" never spawn anything on
//! their own. They call [`ExternalAction::perform`], and the default
//! [`DisabledAction`] suppresses the call.

use std::process::Command;

use parking_lot::Mutex;

/// What happened when an external action was requested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
	/// The capability is not enabled; nothing ran.
	Suppressed,
	/// The action was started.
	Spawned,
	/// The action could not be started.
	Failed(String),
}

/// Capability to perform an irreversible action outside the process.
pub trait ExternalAction: std::fmt::Debug + Send + Sync {
	/// Performs the action described by `argv`.
	fn perform(&self, argv: &[String]) -> ActionOutcome;
}

/// Fail-closed capability: logs and does nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledAction;

impl ExternalAction for DisabledAction {
	fn perform(&self, argv: &[String]) -> ActionOutcome {
		tracing::debug!(argv = ?argv, "effects.suppressed");
		ActionOutcome::Suppressed
	}
}

/// Spawns `argv[0]` with the remaining arguments and does not wait for it.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessAction;

impl ExternalAction for ProcessAction {
	fn perform(&self, argv: &[String]) -> ActionOutcome {
		let Some((program, args)) = argv.split_first() else {
			return ActionOutcome::Failed("empty command".to_string());
		};
		match Command::new(program).args(args).spawn() {
			Ok(mut child) => {
				tracing::info!(program = %program, pid = child.id(), "effects.spawned");
				std::thread::spawn(move || match child.wait() {
					Ok(status) => tracing::debug!(%status, "effects.reaped"),
					Err(error) => tracing::debug!(%error, "effects.reap_failed"),
				});
				ActionOutcome::Spawned
			}
			Err(error) => {
				tracing::warn!(program = %program, %error, "effects.spawn_failed");
				ActionOutcome::Failed(error.to_string())
			}
		}
	}
}

/// Records every requested action without performing it.
#[derive(Debug, Default)]
pub struct RecordingAction {
	calls: Mutex<Vec<Vec<String>>>,
}

impl RecordingAction {
	/// Creates an empty recorder.
	pub fn new() -> Self {
		Self::default()
	}

	/// Snapshot of every argv requested so far.
	pub fn calls(&self) -> Vec<Vec<String>> {
		self.calls.lock().clone()
	}
}

impl ExternalAction for RecordingAction {
	fn perform(&self, argv: &[String]) -> ActionOutcome {
		self.calls.lock().push(argv.to_vec());
		ActionOutcome::Suppressed
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn disabled_action_fails_closed() {
		assert_eq!(DisabledAction.perform(&["rm".to_string(), "-rf".to_string()]), ActionOutcome::Suppressed);
	}

	#[test]
	fn process_action_rejects_empty_argv() {
		assert_eq!(ProcessAction.perform(&[]), ActionOutcome::Failed("empty command".to_string()));
	}

	#[test]
	fn process_action_reports_missing_program() {
		let outcome = ProcessAction.perform(&["mirage-definitely-not-a-program".to_string()]);
		assert!(matches!(outcome, ActionOutcome::Failed(_)));
	}

	#[cfg(unix)]
	#[test]
	fn process_action_spawns_and_reaps_in_background() {
		assert_eq!(ProcessAction.perform(&["true".to_string()]), ActionOutcome::Spawned);
	}

	#[test]
	fn recorder_keeps_order() {
		let recorder = RecordingAction::new();
		recorder.perform(&["a".to_string()]);
		recorder.perform(&["b".to_string(), "c".to_string()]);
		assert_eq!(recorder.calls(), vec![vec!["a".to_string()], vec!["b".to_string(), "c".to_string()]]);
	}
}

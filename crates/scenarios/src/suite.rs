//! Scenario construction and dispatch by [`Invocation`].

use std::sync::Arc;

use mirage_entropy::{Nondeterminism, SystemSource};
use mirage_invocation::{Invocation, ScenarioOutput};

use crate::config::ScenarioConfig;
use crate::dispatch::DispatchScenario;
use crate::effects::{DisabledAction, ExternalAction, ProcessAction};
use crate::error::Result;
use crate::hook::Instrumentation;
use crate::identity::IdentityRegistry;
use crate::maze::MazeScenario;
use crate::pipeline::PipelineScenario;
use crate::unreachable::UnreachableScenario;

/// Every scenario, built once and shared across concurrent callers.
#[derive(Debug)]
pub struct ScenarioSuite {
	identity: IdentityRegistry,
	dispatch: DispatchScenario,
	maze: MazeScenario,
	pipeline: PipelineScenario,
	unreachable: UnreachableScenario,
}

impl ScenarioSuite {
	/// Builds every scenario from explicit collaborators.
	pub fn new(config: &ScenarioConfig, source: Arc<dyn Nondeterminism>, effects: Arc<dyn ExternalAction>, hook: Instrumentation) -> Self {
		tracing::debug!(source = source.source_id(), woven = hook.is_woven(), "scenario.suite.build");
		Self {
			identity: IdentityRegistry::new(Arc::clone(&source)),
			dispatch: DispatchScenario::new(Arc::clone(&source), Arc::clone(&effects)),
			maze: MazeScenario::new(config, Arc::clone(&source), effects),
			pipeline: PipelineScenario::new(config, Arc::clone(&source)),
			unreachable: UnreachableScenario::new(config, source, hook),
		}
	}

	/// Overlays the environment on `config` and picks the side-effect
	/// capability it asks for.
	pub fn from_config(config: ScenarioConfig, source: Arc<dyn Nondeterminism>, hook: Instrumentation) -> Result<Self> {
		let config = config.with_env_overlay(&*source)?;
		let effects: Arc<dyn ExternalAction> = if config.external_actions {
			tracing::warn!("scenario.suite.external_actions_enabled");
			Arc::new(ProcessAction)
		} else {
			Arc::new(DisabledAction)
		};
		Ok(Self::new(&config, source, effects, hook))
	}

	/// Default configuration, system entropy and the process environment.
	pub fn from_env() -> Result<Self> {
		Self::from_config(ScenarioConfig::default(), Arc::new(SystemSource::new()), Instrumentation::new())
	}

	/// Runs one invocation to completion.
	pub fn invoke(&self, invocation: &Invocation) -> Result<ScenarioOutput> {
		let span = tracing::debug_span!("scenario", kind = invocation.kind().as_str());
		let _guard = span.enter();
		tracing::trace!(request = %invocation.describe(), "scenario.invoke");

		let output = match invocation {
			Invocation::Aliasing => ScenarioOutput::Trace(self.identity.run()?),
			Invocation::DynamicProxy { input, fallback_input } => {
				ScenarioOutput::Trace(self.dispatch.run(input.as_deref(), fallback_input.as_deref())?)
			}
			Invocation::Reflection { command } => {
				let tokens = (!command.is_empty()).then_some(command.as_slice());
				ScenarioOutput::Text {
					command: command.clone(),
					result: self.maze.run(tokens)?,
				}
			}
			Invocation::Lambda { optional_input } => ScenarioOutput::Trace(self.pipeline.run(optional_input.as_deref())),
			Invocation::Unreachable => ScenarioOutput::Trace(self.unreachable.run()),
		};
		Ok(output)
	}
}

//! Name-indirection scenario.
//!
//! An alias names a provider type, the type is instantiated through a factory
//! looked up by name, and the operation is looked up again by name and by an
//! argument shape that depends on both the alias and the operation.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use mirage_entropy::Nondeterminism;
use rustc_hash::FxHashMap;

use crate::config::{ENV_ALIAS, ScenarioConfig};
use crate::effects::ExternalAction;
use crate::error::{Result, ScenarioError};

/// Alias bound to `CandidateA`.
pub const ALIAS_A: &str = "A";
/// Alias bound to `CandidateB`.
pub const ALIAS_B: &str = "B";
/// Alias whose type comes from configuration.
pub const ALIAS_SHADOW: &str = "Shadow";

/// Type name of the token-acting provider.
pub const TYPE_CANDIDATE_A: &str = "CandidateA";
/// Type name of the compute-only provider.
pub const TYPE_CANDIDATE_B: &str = "CandidateB";

/// Operation taking command tokens.
pub const OP_ACT: &str = "act";
/// Operation taking nothing.
pub const OP_COMPUTE: &str = "compute";

const DEFAULT_TOKENS: [&str; 2] = ["echo", "ReflectionMaze executed"];

/// Argument shape an operation is looked up with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signature {
	/// No parameters.
	Nullary,
	/// One string-array parameter.
	Tokens,
}

/// Ambient capabilities handed to every operation.
pub struct OperationContext<'a> {
	tokens: &'a [String],
	effects: &'a dyn ExternalAction,
	trigger: Option<&'a str>,
}

type Factory = fn() -> Box<dyn Any + Send>;
type Invoker = fn(&dyn Any, &OperationContext<'_>) -> Option<String>;

struct TypeEntry {
	factory: Factory,
	operations: FxHashMap<(&'static str, Signature), Invoker>,
}

/// Registry of instantiable provider types and their named operations.
pub struct TypeRegistry {
	types: FxHashMap<&'static str, TypeEntry>,
}

impl fmt::Debug for TypeRegistry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let mut names: Vec<_> = self.types.keys().collect();
		names.sort();
		f.debug_struct("TypeRegistry").field("types", &names).finish()
	}
}

impl TypeRegistry {
	/// Registry holding `CandidateA` and `CandidateB`.
	pub fn builtin() -> Self {
		let mut types = FxHashMap::default();

		let mut a_ops: FxHashMap<(&'static str, Signature), Invoker> = FxHashMap::default();
		a_ops.insert((OP_ACT, Signature::Tokens), invoke_a_act);
		a_ops.insert((OP_COMPUTE, Signature::Nullary), invoke_a_compute);
		a_ops.insert(("call", Signature::Nullary), invoke_a_call);
		types.insert(
			TYPE_CANDIDATE_A,
			TypeEntry {
				factory: new_candidate_a,
				operations: a_ops,
			},
		);

		let mut b_ops: FxHashMap<(&'static str, Signature), Invoker> = FxHashMap::default();
		b_ops.insert((OP_COMPUTE, Signature::Nullary), invoke_b_compute);
		b_ops.insert((OP_ACT, Signature::Nullary), invoke_b_act);
		b_ops.insert(("run", Signature::Nullary), invoke_b_run);
		types.insert(
			TYPE_CANDIDATE_B,
			TypeEntry {
				factory: new_candidate_b,
				operations: b_ops,
			},
		);

		Self { types }
	}

	/// Whether `type_name` is registered.
	pub fn contains(&self, type_name: &str) -> bool {
		self.types.contains_key(type_name)
	}
}

fn new_candidate_a() -> Box<dyn Any + Send> {
	Box::new(CandidateA)
}

fn new_candidate_b() -> Box<dyn Any + Send> {
	Box::new(CandidateB)
}

fn invoke_a_act(this: &dyn Any, cx: &OperationContext<'_>) -> Option<String> {
	this.downcast_ref::<CandidateA>().map(|a| a.act(cx.tokens, cx.effects))
}

fn invoke_a_compute(this: &dyn Any, _: &OperationContext<'_>) -> Option<String> {
	this.downcast_ref::<CandidateA>().map(CandidateA::compute)
}

fn invoke_a_call(this: &dyn Any, cx: &OperationContext<'_>) -> Option<String> {
	this.downcast_ref::<CandidateA>().map(|a| a.call(cx.effects))
}

fn invoke_b_compute(this: &dyn Any, _: &OperationContext<'_>) -> Option<String> {
	this.downcast_ref::<CandidateB>().map(CandidateB::compute)
}

fn invoke_b_act(this: &dyn Any, _: &OperationContext<'_>) -> Option<String> {
	this.downcast_ref::<CandidateB>().map(CandidateB::act)
}

fn invoke_b_run(this: &dyn Any, cx: &OperationContext<'_>) -> Option<String> {
	this.downcast_ref::<CandidateB>().map(|b| b.run(cx.trigger))
}

/// Provider that acts on command tokens.
#[derive(Debug)]
struct CandidateA;

impl CandidateA {
	fn act(&self, tokens: &[String], effects: &dyn ExternalAction) -> String {
		let outcome = effects.perform(tokens);
		tracing::debug!(?outcome, "scenario.maze.a_act");
		"A-act".to_string()
	}

	fn compute(&self) -> String {
		"A-compute".to_string()
	}

	fn call(&self, effects: &dyn ExternalAction) -> String {
		self.act(&["echo".to_string(), "This should not execute".to_string()], effects)
	}
}

/// Provider whose operations never leave the process.
#[derive(Debug)]
struct CandidateB;

impl CandidateB {
	fn compute(&self) -> String {
		"B-compute".to_string()
	}

	fn act(&self) -> String {
		"B-act".to_string()
	}

	fn run(&self, trigger: Option<&str>) -> String {
		if trigger.is_some() {
			tracing::info!(result = %self.compute(), "scenario.maze.b_run");
		}
		"B-run".to_string()
	}
}

/// Everything one resolution decided, plus the operation's result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MazeOutcome {
	/// Alias selected for the call.
	pub alias: &'static str,
	/// Type name the alias resolved to.
	pub type_name: String,
	/// Operation name resolved for the alias.
	pub operation: &'static str,
	/// Argument shape the operation was looked up with.
	pub signature: Signature,
	/// Operation result.
	pub result: String,
}

impl MazeOutcome {
	/// Formatted scenario result.
	pub fn render(&self) -> String {
		format!("Reflection result from alias {}: {}", self.alias, self.result)
	}
}

/// Name-indirection scenario.
#[derive(Debug)]
pub struct MazeScenario {
	aliases: FxHashMap<&'static str, String>,
	types: TypeRegistry,
	trigger: Option<String>,
	source: Arc<dyn Nondeterminism>,
	effects: Arc<dyn ExternalAction>,
}

impl MazeScenario {
	/// Builds the alias table. The `Shadow` target is fixed here from
	/// configuration and never revisited.
	pub fn new(config: &ScenarioConfig, source: Arc<dyn Nondeterminism>, effects: Arc<dyn ExternalAction>) -> Self {
		let shadow = config.alias_target.clone().unwrap_or_else(|| TYPE_CANDIDATE_A.to_string());
		let mut aliases = FxHashMap::default();
		aliases.insert(ALIAS_A, TYPE_CANDIDATE_A.to_string());
		aliases.insert(ALIAS_B, TYPE_CANDIDATE_B.to_string());
		aliases.insert(ALIAS_SHADOW, shadow);
		Self {
			aliases,
			types: TypeRegistry::builtin(),
			trigger: config.trigger.clone(),
			source,
			effects,
		}
	}

	/// Type name currently bound to `alias`.
	pub fn alias_target(&self, alias: &str) -> Option<&str> {
		self.aliases.get(alias).map(String::as_str)
	}

	/// Runs the scenario and returns the formatted result.
	pub fn run(&self, command: Option<&[String]>) -> Result<String> {
		self.run_detailed(command).map(|outcome| outcome.render())
	}

	/// Runs the scenario and returns every resolution step.
	pub fn run_detailed(&self, command: Option<&[String]>) -> Result<MazeOutcome> {
		let tokens = sanitize(command);
		let alias = self.select_alias();
		let type_name = self
			.aliases
			.get(alias)
			.ok_or_else(|| ScenarioError::invariant(format!("alias '{alias}' has no target")))?;

		let entry = self.types.types.get(type_name.as_str()).ok_or_else(|| ScenarioError::Resolution {
			alias: alias.to_string(),
			type_name: type_name.clone(),
			operation: None,
			reason: "unknown type".to_string(),
		})?;
		let instance = (entry.factory)();

		// Operation name first; the argument shape depends on it.
		let operation = self.resolve_operation(alias);
		let signature = signature_for(alias, operation);
		tracing::debug!(alias, type_name = %type_name, operation, ?signature, "scenario.maze.resolve");

		let invoker = entry.operations.get(&(operation, signature)).ok_or_else(|| ScenarioError::Resolution {
			alias: alias.to_string(),
			type_name: type_name.clone(),
			operation: Some(operation.to_string()),
			reason: format!("no operation with {signature:?} signature"),
		})?;

		let cx = OperationContext {
			tokens: &tokens,
			effects: &*self.effects,
			trigger: self.trigger.as_deref(),
		};
		let result = invoker(&*instance, &cx)
			.ok_or_else(|| ScenarioError::invariant(format!("instance of '{type_name}' rejected its own operation '{operation}'")))?;

		Ok(MazeOutcome {
			alias,
			type_name: type_name.clone(),
			operation,
			signature,
			result,
		})
	}

	fn select_alias(&self) -> &'static str {
		if let Some(pinned) = self.source.env(ENV_ALIAS)
			&& let Some((alias, _)) = self.aliases.get_key_value(pinned.as_str())
		{
			return *alias;
		}
		if self.source.nanos() % 3 == 0 {
			ALIAS_A
		} else if self.source.nanos() % 2 == 0 {
			ALIAS_B
		} else {
			ALIAS_SHADOW
		}
	}

	fn resolve_operation(&self, alias: &str) -> &'static str {
		match alias {
			ALIAS_B => OP_COMPUTE,
			ALIAS_SHADOW => OP_ACT,
			_ if self.source.epoch_millis() % 2 == 0 => OP_ACT,
			_ => OP_COMPUTE,
		}
	}
}

fn signature_for(alias: &str, operation: &str) -> Signature {
	if (alias == ALIAS_A || alias == ALIAS_SHADOW) && operation != OP_COMPUTE {
		Signature::Tokens
	} else {
		Signature::Nullary
	}
}

fn sanitize(command: Option<&[String]>) -> Vec<String> {
	let tokens: Vec<String> = command
		.unwrap_or_default()
		.iter()
		.filter(|token| !token.trim().is_empty())
		.cloned()
		.collect();
	if tokens.is_empty() {
		return DEFAULT_TOKENS.iter().map(|token| token.to_string()).collect();
	}
	tokens
}

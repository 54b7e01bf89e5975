//! Canonical invocation types for scenario dispatch.
//!
//! Every entry point (HTTP-style query, test harness, replay file) converts
//! its request into an [`Invocation`] before dispatch, and every scenario
//! answers with a [`ScenarioOutput`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Query parameter carrying the primary dispatch input.
pub const PARAM_INPUT: &str = "input";
/// Query parameter carrying the fallback token.
pub const PARAM_FALLBACK_INPUT: &str = "fallbackInput";
/// Query parameter carrying the pipeline's optional input.
pub const PARAM_OPTIONAL_INPUT: &str = "optionalInput";
/// Repeatable query parameter carrying one command token.
pub const PARAM_COMMAND: &str = "command";

/// Names of the available scenarios.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScenarioKind {
	/// Identity registry with aliased, weak and cloned handles.
	Aliasing,
	/// Dispatch table with overlapping keys.
	DynamicProxy,
	/// Alias to type to operation name indirection.
	Reflection,
	/// Closure pipeline over scoped state.
	Lambda,
	/// Guarded-unreachable branches and the instrumentation hook.
	Unreachable,
}

impl ScenarioKind {
	/// Every scenario, in routing order.
	pub const ALL: [ScenarioKind; 5] = [Self::Aliasing, Self::DynamicProxy, Self::Reflection, Self::Lambda, Self::Unreachable];

	/// Stable routing name.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Aliasing => "aliasing",
			Self::DynamicProxy => "dynamic-proxy",
			Self::Reflection => "reflection",
			Self::Lambda => "lambda",
			Self::Unreachable => "unreachable",
		}
	}
}

impl fmt::Display for ScenarioKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for ScenarioKind {
	type Err = InvocationError;

	fn from_str(name: &str) -> Result<Self, Self::Err> {
		Self::ALL
			.into_iter()
			.find(|kind| kind.as_str() == name)
			.ok_or_else(|| InvocationError::UnknownScenario(name.to_string()))
	}
}

/// Errors raised while decoding a request into an [`Invocation`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvocationError {
	/// No scenario is registered under this name.
	#[error("unknown scenario: {0}")]
	UnknownScenario(String),
	/// The scenario does not accept this parameter.
	#[error("scenario '{scenario}' does not accept parameter '{param}'")]
	UnexpectedParam {
		/// Scenario being decoded.
		scenario: ScenarioKind,
		/// Offending parameter name.
		param: String,
	},
	/// A single-valued parameter was supplied more than once.
	#[error("parameter '{0}' supplied more than once")]
	DuplicateParam(String),
}

/// A scenario request with its optional inputs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "scenario", rename_all = "kebab-case")]
pub enum Invocation {
	/// Run the identity registry scenario.
	Aliasing,
	/// Run the dispatch table scenario.
	DynamicProxy {
		/// Primary input, defaulted when absent.
		input: Option<String>,
		/// Fallback token, defaulted when absent.
		fallback_input: Option<String>,
	},
	/// Run the name-indirection scenario.
	Reflection {
		/// Command tokens handed to token-taking operations.
		#[serde(default)]
		command: Vec<String>,
	},
	/// Run the closure pipeline scenario.
	Lambda {
		/// Optional input driving the second execution path.
		optional_input: Option<String>,
	},
	/// Run the guarded-unreachable scenario.
	Unreachable,
}

impl Invocation {
	/// Decodes a scenario name and HTTP-style query parameters.
	pub fn from_params<'a>(name: &str, params: impl IntoIterator<Item = (&'a str, &'a str)>) -> Result<Self, InvocationError> {
		let kind: ScenarioKind = name.parse()?;
		let mut invocation = Self::empty(kind);

		for (key, value) in params {
			let slot = match (&mut invocation, key) {
				(Self::DynamicProxy { input, .. }, PARAM_INPUT) => input,
				(Self::DynamicProxy { fallback_input, .. }, PARAM_FALLBACK_INPUT) => fallback_input,
				(Self::Lambda { optional_input }, PARAM_OPTIONAL_INPUT) => optional_input,
				(Self::Reflection { command }, PARAM_COMMAND) => {
					command.push(value.to_string());
					continue;
				}
				_ => {
					return Err(InvocationError::UnexpectedParam {
						scenario: kind,
						param: key.to_string(),
					});
				}
			};
			if slot.replace(value.to_string()).is_some() {
				return Err(InvocationError::DuplicateParam(key.to_string()));
			}
		}

		Ok(invocation)
	}

	/// An invocation of `kind` with every input absent.
	pub fn empty(kind: ScenarioKind) -> Self {
		match kind {
			ScenarioKind::Aliasing => Self::Aliasing,
			ScenarioKind::DynamicProxy => Self::DynamicProxy {
				input: None,
				fallback_input: None,
			},
			ScenarioKind::Reflection => Self::Reflection { command: Vec::new() },
			ScenarioKind::Lambda => Self::Lambda { optional_input: None },
			ScenarioKind::Unreachable => Self::Unreachable,
		}
	}

	/// Scenario this invocation targets.
	pub const fn kind(&self) -> ScenarioKind {
		match self {
			Self::Aliasing => ScenarioKind::Aliasing,
			Self::DynamicProxy { .. } => ScenarioKind::DynamicProxy,
			Self::Reflection { .. } => ScenarioKind::Reflection,
			Self::Lambda { .. } => ScenarioKind::Lambda,
			Self::Unreachable => ScenarioKind::Unreachable,
		}
	}

	/// Short description for tracing/logging.
	pub fn describe(&self) -> String {
		match self {
			Self::DynamicProxy { input, fallback_input } => {
				format!("dynamic-proxy input={input:?} fallback={fallback_input:?}")
			}
			Self::Reflection { command } if command.is_empty() => "reflection".to_string(),
			Self::Reflection { command } => format!("reflection {}", command.join(" ")),
			Self::Lambda { optional_input: Some(value) } => format!("lambda optional={value:?}"),
			other => other.kind().as_str().to_string(),
		}
	}
}

/// Observable result of one scenario run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScenarioOutput {
	/// Ordered trace messages.
	Trace(Vec<String>),
	/// Single formatted result together with the command tokens it saw.
	Text {
		/// Command tokens as supplied by the caller.
		command: Vec<String>,
		/// Formatted scenario result.
		result: String,
	},
}

impl ScenarioOutput {
	/// Trace messages, or the single result as a one-element slice.
	pub fn messages(&self) -> &[String] {
		match self {
			Self::Trace(messages) => messages,
			Self::Text { result, .. } => std::slice::from_ref(result),
		}
	}
}

#[cfg(test)]
mod tests;

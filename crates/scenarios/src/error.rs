//! Scenario failure taxonomy.

/// Failures a scenario call can surface to its caller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScenarioError {
	/// Configuration is malformed and no safe default exists.
	#[error("configuration fault for '{key}': {reason}")]
	Configuration {
		/// Offending configuration key.
		key: String,
		/// What was wrong with it.
		reason: String,
	},

	/// A name-indirection step named an unknown type or operation.
	#[error(
		"resolution fault for alias '{alias}' -> '{type_name}'{}: {reason}",
		operation.as_ref().map(|op| format!(" op '{op}'")).unwrap_or_default()
	)]
	Resolution {
		/// Alias being resolved.
		alias: String,
		/// Type name the alias pointed at.
		type_name: String,
		/// Operation name, once known.
		operation: Option<String>,
		/// What could not be found.
		reason: String,
	},

	/// A scenario-internal assumption broke. Always a defect.
	#[error("invariant violated: {0}")]
	Invariant(String),
}

impl ScenarioError {
	pub(crate) fn config(key: &str, reason: impl Into<String>) -> Self {
		Self::Configuration {
			key: key.to_string(),
			reason: reason.into(),
		}
	}

	pub(crate) fn invariant(detail: impl Into<String>) -> Self {
		let detail = detail.into();
		tracing::error!(%detail, "scenario.invariant_violation");
		Self::Invariant(detail)
	}
}

/// Result type for scenario calls.
pub type Result<T> = std::result::Result<T, ScenarioError>;

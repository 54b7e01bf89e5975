//! Scenario configuration.
//!
//! Values are read once when a [`crate::ScenarioSuite`] is built: first from
//! an optional TOML document, then overlaid with `MIRAGE_*` environment
//! variables looked up through the injected [`Nondeterminism`] source.

use std::path::Path;

use mirage_entropy::Nondeterminism;
use serde::Deserialize;

use crate::error::{Result, ScenarioError};

/// Overrides the type name behind the `Shadow` alias.
pub const ENV_REF_IMPL: &str = "MIRAGE_REF_IMPL";
/// Enables heavy mode in the guarded-unreachable scenario.
pub const ENV_ENABLE: &str = "MIRAGE_ENABLE";
/// Mode string consulted in heavy mode.
pub const ENV_MODE: &str = "MIRAGE_MODE";
/// Opts in to real external actions.
pub const ENV_EXTERNAL_ACTIONS: &str = "MIRAGE_EXTERNAL_ACTIONS";
/// Guard for the dormant inner action.
pub const ENV_EXECUTE: &str = "MIRAGE_EXECUTE";
/// Guard for the decoy `run` operation of `CandidateB`.
pub const ENV_TRIGGER: &str = "MIRAGE_TRIGGER";
/// Pins the alias chosen by the name-indirection scenario. Read per call.
pub const ENV_ALIAS: &str = "MIRAGE_ALIAS";
/// Fallback optional input for the closure pipeline. Read per call.
pub const ENV_LAMBDA: &str = "MIRAGE_LAMBDA";

/// Mode value that activates the hot path.
pub const MODE_HOT: &str = "hot";

/// Configuration consumed by the scenarios.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScenarioConfig {
	/// Type name behind the `Shadow` alias. `None` means `CandidateA`.
	pub alias_target: Option<String>,
	/// Heavy-mode guard of the guarded-unreachable scenario.
	pub heavy_mode: bool,
	/// Mode string, `"hot"` activates the hot path.
	pub mode: String,
	/// Whether the external action capability may spawn processes.
	pub external_actions: bool,
	/// Guard of the dormant inner action.
	pub execute: bool,
	/// Guard of the decoy `CandidateB::run` operation.
	pub trigger: Option<String>,
	/// Guard of the pipeline's panic branch. Never set in practice.
	pub never_set: Option<String>,
}

impl Default for ScenarioConfig {
	fn default() -> Self {
		Self {
			alias_target: None,
			heavy_mode: false,
			mode: "cold".to_string(),
			external_actions: false,
			execute: false,
			trigger: None,
			never_set: None,
		}
	}
}

impl ScenarioConfig {
	/// Parses a TOML document.
	pub fn from_toml_str(content: &str) -> Result<Self> {
		toml::from_str(content).map_err(|error| ScenarioError::config("toml", error.to_string()))
	}

	/// Reads and parses a TOML file.
	pub fn load(path: &Path) -> Result<Self> {
		let content = std::fs::read_to_string(path).map_err(|error| ScenarioError::config(&path.display().to_string(), error.to_string()))?;
		Self::from_toml_str(&content)
	}

	/// Applies `MIRAGE_*` environment overrides on top of `self`.
	pub fn with_env_overlay(mut self, source: &dyn Nondeterminism) -> Result<Self> {
		if let Some(target) = non_empty(source.env(ENV_REF_IMPL)) {
			self.alias_target = Some(target);
		}
		if let Some(flag) = source.env(ENV_ENABLE) {
			self.heavy_mode = parse_flag(ENV_ENABLE, &flag)?;
		}
		if let Some(mode) = non_empty(source.env(ENV_MODE)) {
			self.mode = mode;
		}
		if let Some(flag) = source.env(ENV_EXTERNAL_ACTIONS) {
			self.external_actions = parse_flag(ENV_EXTERNAL_ACTIONS, &flag)?;
		}
		if let Some(flag) = source.env(ENV_EXECUTE) {
			self.execute = parse_flag(ENV_EXECUTE, &flag)?;
		}
		if let Some(trigger) = source.env(ENV_TRIGGER) {
			self.trigger = Some(trigger);
		}
		tracing::debug!(source = source.source_id(), heavy_mode = self.heavy_mode, mode = %self.mode, "config.env_overlay");
		Ok(self)
	}

	/// Whether the hot path is selected.
	pub fn is_hot(&self) -> bool {
		self.mode == MODE_HOT
	}
}

fn non_empty(value: Option<String>) -> Option<String> {
	value.filter(|v| !v.trim().is_empty())
}

fn parse_flag(key: &str, raw: &str) -> Result<bool> {
	match raw.trim().to_ascii_lowercase().as_str() {
		"1" | "true" | "yes" | "on" => Ok(true),
		"0" | "false" | "no" | "off" | "" => Ok(false),
		other => Err(ScenarioError::config(key, format!("expected a boolean, got '{other}'"))),
	}
}

#[cfg(test)]
mod tests {
	use mirage_entropy::ScriptedSource;
	use rstest::rstest;

	use super::*;

	#[test]
	fn defaults_are_cold_and_closed() {
		let config = ScenarioConfig::default();
		assert!(!config.heavy_mode);
		assert!(!config.external_actions);
		assert!(!config.is_hot());
		assert_eq!(config.alias_target, None);
	}

	#[test]
	fn toml_overrides_fields() {
		let config = ScenarioConfig::from_toml_str("heavy_mode = true\nmode = \"hot\"\nalias_target = \"CandidateB\"\n").unwrap();
		assert!(config.heavy_mode);
		assert!(config.is_hot());
		assert_eq!(config.alias_target.as_deref(), Some("CandidateB"));
		assert!(!config.execute);
	}

	#[test]
	fn unknown_toml_key_is_configuration_fault() {
		let err = ScenarioConfig::from_toml_str("heavy = true").unwrap_err();
		assert!(matches!(err, ScenarioError::Configuration { ref key, .. } if key == "toml"), "{err}");
	}

	#[test]
	fn load_reads_file() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("mirage.toml");
		std::fs::write(&path, "mode = \"hot\"").unwrap();
		assert!(ScenarioConfig::load(&path).unwrap().is_hot());
	}

	#[test]
	fn load_missing_file_is_configuration_fault() {
		let dir = tempfile::tempdir().unwrap();
		let err = ScenarioConfig::load(&dir.path().join("absent.toml")).unwrap_err();
		assert!(matches!(err, ScenarioError::Configuration { .. }));
	}

	#[rstest]
	#[case("1", true)]
	#[case("TRUE", true)]
	#[case(" on ", true)]
	#[case("no", false)]
	#[case("0", false)]
	fn env_flags_parse(#[case] raw: &str, #[case] expected: bool) {
		let source = ScriptedSource::builder().env(ENV_ENABLE, raw).build();
		let config = ScenarioConfig::default().with_env_overlay(&source).unwrap();
		assert_eq!(config.heavy_mode, expected);
	}

	#[test]
	fn malformed_env_flag_names_key() {
		let source = ScriptedSource::builder().env(ENV_EXTERNAL_ACTIONS, "maybe").build();
		let err = ScenarioConfig::default().with_env_overlay(&source).unwrap_err();
		assert_eq!(
			err,
			ScenarioError::Configuration {
				key: ENV_EXTERNAL_ACTIONS.to_string(),
				reason: "expected a boolean, got 'maybe'".to_string(),
			}
		);
	}

	#[test]
	fn env_overlay_wins_over_file() {
		let source = ScriptedSource::builder().env(ENV_REF_IMPL, "CandidateB").env(ENV_MODE, "hot").build();
		let config = ScenarioConfig::from_toml_str("alias_target = \"CandidateA\"")
			.and_then(|config| config.with_env_overlay(&source))
			.unwrap();
		assert_eq!(config.alias_target.as_deref(), Some("CandidateB"));
		assert!(config.is_hot());
	}

	#[test]
	fn blank_env_values_are_ignored() {
		let source = ScriptedSource::builder().env(ENV_REF_IMPL, "  ").build();
		let config = ScenarioConfig::default().with_env_overlay(&source).unwrap();
		assert_eq!(config.alias_target, None);
	}
}

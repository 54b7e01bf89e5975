use pretty_assertions::assert_eq;
use rstest::rstest;

use super::*;

#[rstest]
#[case("aliasing", ScenarioKind::Aliasing)]
#[case("dynamic-proxy", ScenarioKind::DynamicProxy)]
#[case("reflection", ScenarioKind::Reflection)]
#[case("lambda", ScenarioKind::Lambda)]
#[case("unreachable", ScenarioKind::Unreachable)]
fn kind_names_round_trip(#[case] name: &str, #[case] kind: ScenarioKind) {
	assert_eq!(name.parse::<ScenarioKind>(), Ok(kind));
	assert_eq!(kind.to_string(), name);
}

#[test]
fn unknown_scenario_is_rejected() {
	assert_eq!(
		Invocation::from_params("teleport", []),
		Err(InvocationError::UnknownScenario("teleport".to_string()))
	);
}

#[test]
fn dynamic_proxy_params_decode() {
	let invocation = Invocation::from_params("dynamic-proxy", [("input", "beta"), ("fallbackInput", "T")]).unwrap();
	assert_eq!(
		invocation,
		Invocation::DynamicProxy {
			input: Some("beta".to_string()),
			fallback_input: Some("T".to_string()),
		}
	);
}

#[test]
fn repeated_command_params_accumulate() {
	let invocation = Invocation::from_params("reflection", [("command", "echo"), ("command", "hi")]).unwrap();
	assert_eq!(
		invocation,
		Invocation::Reflection {
			command: vec!["echo".to_string(), "hi".to_string()],
		}
	);
	assert_eq!(invocation.describe(), "reflection echo hi");
}

#[test]
fn duplicate_single_param_is_rejected() {
	let err = Invocation::from_params("lambda", [("optionalInput", "a"), ("optionalInput", "b")]).unwrap_err();
	assert_eq!(err, InvocationError::DuplicateParam("optionalInput".to_string()));
}

#[test]
fn foreign_param_is_rejected() {
	let err = Invocation::from_params("aliasing", [("input", "x")]).unwrap_err();
	assert_eq!(
		err,
		InvocationError::UnexpectedParam {
			scenario: ScenarioKind::Aliasing,
			param: "input".to_string(),
		}
	);
}

#[test]
fn empty_optional_input_is_present() {
	let invocation = Invocation::from_params("lambda", [("optionalInput", "")]).unwrap();
	assert_eq!(invocation, Invocation::Lambda { optional_input: Some(String::new()) });
}

#[test]
fn outputs_serialize_like_endpoints() {
	let trace = ScenarioOutput::Trace(vec!["a".to_string(), "b".to_string()]);
	assert_eq!(serde_json::to_string(&trace).unwrap(), r#"["a","b"]"#);

	let text = ScenarioOutput::Text {
		command: vec!["echo".to_string()],
		result: "Reflection result from alias B: B-compute".to_string(),
	};
	assert_eq!(
		serde_json::to_string(&text).unwrap(),
		r#"{"command":["echo"],"result":"Reflection result from alias B: B-compute"}"#
	);
	assert_eq!(text.messages(), ["Reflection result from alias B: B-compute".to_string()]);
}

#[test]
fn invocation_serializes_with_scenario_tag() {
	let json = serde_json::to_value(Invocation::Lambda {
		optional_input: Some("x".to_string()),
	})
	.unwrap();
	assert_eq!(json, serde_json::json!({ "scenario": "lambda", "optional_input": "x" }));
}

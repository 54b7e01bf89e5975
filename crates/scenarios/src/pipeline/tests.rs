use mirage_entropy::ScriptedSource;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rstest::rstest;

use super::*;

const COMPOSED_FROM_SEED: &str = "Lambda pipeline: SEED::ORIGIN-DECORATED::seed::origin*seed";

fn scenario(nanos: u64) -> PipelineScenario {
	PipelineScenario::new(&ScenarioConfig::default(), Arc::new(ScriptedSource::builder().nanos(nanos).build()))
}

#[test]
fn empty_optional_input_end_to_end() {
	let mut state = pipeline_state();
	assert_eq!(state.get(), "seed");
	let trace = scenario(1).run_in(&mut state, Some(""));
	assert_eq!(trace, vec![COMPOSED_FROM_SEED.to_string(), "Optional path: drift".to_string()]);
}

#[test]
fn without_optional_input_only_composed_path_runs() {
	assert_eq!(scenario(1).run(None), vec![COMPOSED_FROM_SEED.to_string()]);
}

#[test]
fn env_supplies_optional_input_fallback() {
	let source = ScriptedSource::builder().nanos(1).env(ENV_LAMBDA, "abc").build();
	let trace = PipelineScenario::new(&ScenarioConfig::default(), Arc::new(source)).run(None);
	assert_eq!(trace[1], "Optional path: drift::abc1");
}

#[test]
fn explicit_input_beats_env() {
	let source = ScriptedSource::builder().nanos(1).env(ENV_LAMBDA, "abc").build();
	let trace = PipelineScenario::new(&ScenarioConfig::default(), Arc::new(source)).run(Some("abcd"));
	assert_eq!(trace[1], "Optional path: drift");
}

#[rstest]
#[case("", "drift")]
#[case("a", "drift-decorated")]
#[case("ab", "drift")]
#[case("abc", "drift::abc7")]
#[case("abcd", "drift")]
#[case("abcde", "drift")]
fn optional_path_selects_step_by_length(#[case] input: &str, #[case] expected: &str) {
	let trace = scenario(7).run(Some(input));
	assert_eq!(trace[1], format!("Optional path: {expected}"));
}

#[test]
fn state_is_cleared_after_call() {
	let mut state = pipeline_state();
	scenario(1).run_in(&mut state, Some("mutate"));
	assert_eq!(state.get(), INITIAL_STATE);
}

#[test]
fn swapped_ends_change_result_when_seed_has_padding() {
	let mut straight = pipeline_state();
	straight.set(" pad ".to_string());
	let trace = scenario(1).run_in(&mut straight, None);
	assert_eq!(trace, vec!["Lambda pipeline: PAD ::ORIGIN-DECORATED::pad ::origin* pad ".to_string()]);

	let mut swapped = pipeline_state();
	swapped.set(" pad ".to_string());
	let trace = scenario(5).run_in(&mut swapped, None);
	assert_eq!(trace, vec!["Lambda pipeline: origin-decorated pad :: pad ::origin* pad".to_string()]);
}

#[test]
fn order_swaps_first_and_last() {
	let pipeline = Pipeline::standard(None);
	assert_eq!(pipeline.order(false), vec![0, 1, 2, 3, 4]);
	assert_eq!(pipeline.order(true), vec![4, 1, 2, 3, 0]);
}

#[rstest]
#[case("ab", "AB")]
#[case("a:B:c", "cba")]
#[case("x::YZ", "yzx")]
#[case(":::", ":::?twist")]
#[case("abc::", "abc")]
fn twist_cases(#[case] input: &str, #[case] expected: &str) {
	assert_eq!(uppercase_with_twist(input), expected);
}

#[test]
fn guard_step_returns_cold_value_for_zero_hash() {
	let pipeline = Pipeline::standard(None);
	let mut state = pipeline_state();
	assert_eq!(pipeline.apply(4, "", &mut state).as_deref(), Some("::cold"));
	assert_eq!(pipeline.apply(4, "warm", &mut state).as_deref(), Some("warm"));

	let frozen = Pipeline::standard(Some("set".to_string()));
	assert_eq!(frozen.apply(4, "", &mut state).as_deref(), Some("::frozen"));
}

#[test]
fn out_of_range_step_is_none() {
	assert_eq!(Pipeline::standard(None).apply(9, "x", &mut pipeline_state()), None);
}

proptest! {
	#[test]
	fn idempotent_under_fixed_mocks(nanos in any::<u64>(), input in proptest::option::of("[a-z:]{0,12}")) {
		let scenario = scenario(nanos);
		let first = scenario.run(input.as_deref());
		let second = scenario.run(input.as_deref());
		prop_assert_eq!(first, second);
	}

	#[test]
	fn odd_twist_never_uppercases(text in "[a-z:]{0,15}") {
		prop_assume!(text.len() % 2 == 1);
		let out = uppercase_with_twist(&text);
		prop_assert_eq!(out.to_lowercase(), out);
	}
}

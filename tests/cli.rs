use crate::helpers::cmd::TestCommandHarness;
use crate::helpers::stdout_predicates::{
    contains_config_file_error, contains_graphql_file_error_without_location,
};
use predicates::prelude::PredicateBooleanExt;
use predicates::str::{contains, is_empty};

#[test]
fn run_with_empty_dir() {
    let mut harness = TestCommandHarness::default();
    harness.run_for_success().stdout(is_empty());
    assert!(!harness.generated_file_path().exists());
}

#[test]
fn run_with_unparseable_graphql() {
    let mut harness = TestCommandHarness::default();

    let assertion = contains("Parse error at").and(contains_graphql_file_error_without_location(
        harness.directory_path().join("unparseable.graphql"),
    ));
    harness
        .with_graphql_file("unparseable.graphql", "query Broken {\n  field(\n}\n")
        .run_for_failure()
        .stdout(assertion);
    assert!(!harness.generated_file_path().exists());
}

#[test]
fn run_with_broken_config_file() {
    let mut harness = TestCommandHarness::default();
    let config_path = harness.directory_path().join(".codegenrc.json");
    harness
        .with_default_rc_file_contents("{ \"withPrimitives\": ")
        .run_for_failure()
        .stdout(contains_config_file_error(config_path).and(contains("JSON parse error")));
}

#[test]
fn run_with_missing_config_file() {
    let mut harness = TestCommandHarness::default();
    let config_path = harness.directory_path().join("missing.json");
    harness
        .with_arg("-c")
        .with_arg(&config_path)
        .run_for_failure()
        .stdout(contains_config_file_error(config_path));
}

#[test]
fn run_with_unknown_config_option() {
    TestCommandHarness::default()
        .with_default_rc_file_contents(r#"{ "withPrimitive": false }"#)
        .with_graphql_file("ping.graphql", "query Ping { ping }")
        .run_for_success()
        .stdout(
            contains("warning: unknown config option `withPrimitive`")
                .and(contains("Did you mean `withPrimitives`")),
        );
}

#[test]
fn run_with_unsupported_document_mode() {
    TestCommandHarness::default()
        .with_default_rc_file_contents(r#"{ "documentMode": "documentNode" }"#)
        .with_graphql_file("ping.graphql", "query Ping { ping }")
        .run_for_success()
        .stdout(contains("warning: unsupported document mode `documentNode`"));
}

#[test]
fn run_with_custom_output_file() {
    let mut harness = TestCommandHarness::default();
    let output_path = harness.directory_path().join("src/lib/primitives.ts");
    harness
        .with_graphql_file("ping.graphql", "query Ping { ping }")
        .with_arg("-o")
        .with_arg(&output_path)
        .run_for_success();

    let generated = std::fs::read_to_string(&output_path).expect("generated file");
    assert!(generated.starts_with("/* eslint-disable */\n"));
    assert!(generated.contains("export const queryPing = createQuery<PingQuery, PingQueryVariables>("));
    assert!(!harness.generated_file_path().exists());
}

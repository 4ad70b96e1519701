//! Test utility functions for codepipeline-synth

use codepipeline_synth::core::{Action, Artifact, Environment, Pipeline, ResourceRef, SourceAction};
use serde_json::Value;

/// Account the pipeline stack is deployed to
pub const PIPELINE_ACCOUNT: &str = "012345678913";

/// Account that owns shared build projects
pub const PROJECT_ACCOUNT: &str = "012345678912";

/// Region the pipeline stack is deployed to
pub const STACK_REGION: &str = "us-west-2";

pub fn pipeline_env() -> Environment {
    Environment::new(PIPELINE_ACCOUNT, STACK_REGION)
}

/// A pipeline with a single CodeCommit source stage
pub fn pipeline_with_source(name: &str) -> (Pipeline, Artifact) {
    let mut pipeline = Pipeline::new(name, pipeline_env());
    let output = Artifact::new("SourceOutput");

    pipeline
        .add_stage("Source")
        .expect("Source stage should be added")
        .add_action(
            Action::new("CodeCommit", SourceAction::codecommit(ResourceRef::managed("my-repo"), "main"))
                .with_output(output.clone()),
        )
        .expect("Source action should attach");

    (pipeline, output)
}

/// Synthesize and convert to a JSON value for shape assertions
pub fn synth_json(pipeline: &Pipeline) -> Value {
    let document = pipeline.synthesize().expect("Pipeline should synthesize");
    serde_json::to_value(&document).expect("Document should serialize")
}

/// Stage names in document order
pub fn stage_names(json: &Value) -> Vec<String> {
    json["Stages"]
        .as_array()
        .expect("Stages should be an array")
        .iter()
        .map(|s| s["Name"].as_str().unwrap_or_default().to_string())
        .collect()
}

/// Action names of one stage in document order
pub fn action_names(json: &Value, stage: &str) -> Vec<String> {
    find_stage(json, stage)["Actions"]
        .as_array()
        .expect("Actions should be an array")
        .iter()
        .map(|a| a["Name"].as_str().unwrap_or_default().to_string())
        .collect()
}

pub fn find_stage<'a>(json: &'a Value, stage: &str) -> &'a Value {
    json["Stages"]
        .as_array()
        .and_then(|stages| stages.iter().find(|s| s["Name"] == stage))
        .unwrap_or_else(|| panic!("Stage '{}' not found in {}", stage, json))
}

pub fn find_action<'a>(json: &'a Value, stage: &str, action: &str) -> &'a Value {
    find_stage(json, stage)["Actions"]
        .as_array()
        .and_then(|actions| actions.iter().find(|a| a["Name"] == action))
        .unwrap_or_else(|| panic!("Action '{}' not found in stage '{}'", action, stage))
}

/// Assert a configuration field of an action
pub fn assert_config(json: &Value, stage: &str, action: &str, key: &str, expected: &str) {
    let actual = &find_action(json, stage, action)["Configuration"][key];
    assert_eq!(
        actual, expected,
        "Configuration.{} of {}/{} should be {:?}, got {}",
        key, stage, action, expected, actual
    );
}

//! Test: Pipeline Files
//!
//! The sample pipelines under `pipelines/` load through the YAML layer and
//! synthesize to the same shape as the programmatic API.

use crate::helpers::*;
use codepipeline_synth::core::config::PipelineConfig;
use codepipeline_synth::core::{Action, ApprovalAction, Artifact, BuildAction, Pipeline, PipelineError, ResourceRef, SourceAction};
use serde_json::Value;

const BUILD_AND_APPROVE: &str = include_str!("../../pipelines/build-and-approve.yaml");
const CROSS_ACCOUNT_REGION: &str = include_str!("../../pipelines/cross-account-region.yaml");

fn synth_yaml(yaml: &str) -> Value {
    let config = PipelineConfig::from_yaml(yaml).expect("Pipeline file should be valid");
    let pipeline = config.to_pipeline().expect("Pipeline should build");
    synth_json(&pipeline)
}

/// YAML and the builder API produce the same document
#[test]
fn test_yaml_matches_builder() {
    let from_yaml = synth_yaml(BUILD_AND_APPROVE);

    let mut pipeline = Pipeline::new("build-and-approve", pipeline_env());
    let source = Artifact::new("SourceOutput");
    let commit = pipeline
        .add_stage("Source")
        .unwrap()
        .add_action(
            Action::new("Repo", SourceAction::codecommit(ResourceRef::managed("my-service"), "main"))
                .with_output(source.clone())
                .export_variable("CommitId"),
        )
        .unwrap()
        .variable("CommitId")
        .unwrap();
    let some_var = pipeline
        .add_stage("Build")
        .unwrap()
        .add_action(
            Action::new(
                "CodeBuild",
                BuildAction::new(ResourceRef::managed("my-service-build")).with_environment_variable("COMMIT_ID", commit),
            )
            .with_input(&source)
            .with_output(Artifact::new("BuildOutput"))
            .export_variable("SomeVar"),
        )
        .unwrap()
        .variable("SomeVar")
        .unwrap();
    pipeline
        .add_stage("Approve")
        .unwrap()
        .add_action(Action::new(
            "Approve",
            ApprovalAction::new()
                .with_notification_topic("arn:aws:sns:us-west-2:012345678913:release-approvals")
                .with_additional_information(format!("Build produced {}", some_var)),
        ))
        .unwrap();

    assert_eq!(from_yaml, synth_json(&pipeline));
}

/// Cross-account and cross-region actions from YAML
#[test]
fn test_cross_account_region_file() {
    let json = synth_yaml(CROSS_ACCOUNT_REGION);

    assert_eq!(
        action_names(&json, "Build"),
        vec!["CodeBuild", "CodeBuild-us-west-2", "CodeBuild-ap-southeast-2"]
    );
    assert_config(
        &json,
        "Build",
        "CodeBuild",
        "ProjectName",
        "codeBuildProjectNameInAnotherAccount",
    );
    assert_eq!(
        find_action(&json, "Build", "CodeBuild")["RoleArn"],
        "arn:aws:iam::012345678912:role/pipeline-build"
    );
    assert_eq!(
        find_action(&json, "Build", "CodeBuild-ap-southeast-2")["Region"],
        "ap-southeast-2"
    );
    assert!(find_action(&json, "Build", "CodeBuild-us-west-2").get("Region").is_none());
}

/// Adding an output to the cross-account action makes the file invalid
#[test]
fn test_cross_account_output_in_file_rejected() {
    let yaml = CROSS_ACCOUNT_REGION.replace(
        "        role_arn: \"arn:aws:iam::012345678912:role/pipeline-build\"",
        "        output: [SharedOutput]",
    );
    assert_ne!(yaml, CROSS_ACCOUNT_REGION);

    let err = PipelineConfig::from_yaml(&yaml).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<PipelineError>(),
        Some(PipelineError::CrossAccountOutputsUnsupported { .. })
    ));
}

/// Missing artifact references fail fast
#[test]
fn test_unknown_artifact_in_file_rejected() {
    let yaml = BUILD_AND_APPROVE.replace("input: [SourceOutput]", "input: [Missing]");

    let err = PipelineConfig::from_yaml(&yaml).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<PipelineError>(),
        Some(PipelineError::UnknownInputArtifact { .. })
    ));
}

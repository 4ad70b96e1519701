//! Test: Cross-Account Actions
//!
//! An action whose target lives in another account may not declare output
//! artifacts. The rejection happens when the action is attached.

use crate::helpers::*;
use codepipeline_synth::core::{
    Action, ActionKind, Artifact, BuildAction, PipelineError, ResourceRef, CROSS_ACCOUNT_OUTPUTS_ISSUE,
};

fn cross_account_project() -> ResourceRef {
    ResourceRef::imported("codeBuildProjectNameInAnotherAccount").in_account(PROJECT_ACCOUNT)
}

/// Cross-account build with an output artifact is rejected
#[test]
fn test_cross_account_with_outputs_is_rejected() {
    let (mut pipeline, source) = pipeline_with_source("CrossAccount");
    let mut stage = pipeline.add_stage("Build").unwrap();

    let result = stage.add_action(
        Action::new("CodeBuild", BuildAction::new(cross_account_project()))
            .with_input(&source)
            .with_output(Artifact::new("BuildOutput")),
    );

    let err = result.unwrap_err();
    assert!(matches!(
        &err,
        PipelineError::CrossAccountOutputsUnsupported { action, account, pipeline_account }
            if action == "CodeBuild" && account == PROJECT_ACCOUNT && pipeline_account == PIPELINE_ACCOUNT
    ));
    assert!(
        err.to_string().contains(CROSS_ACCOUNT_OUTPUTS_ISSUE),
        "Error should link the known limitation: {}",
        err
    );
}

/// The same action without outputs is accepted
#[test]
fn test_cross_account_without_outputs_is_accepted() {
    let (mut pipeline, source) = pipeline_with_source("CrossAccount");
    let handle = pipeline
        .add_stage("Build")
        .unwrap()
        .add_action(Action::new("CodeBuild", BuildAction::new(cross_account_project())).with_input(&source))
        .unwrap();

    assert_eq!(handle.environment.account, PROJECT_ACCOUNT);

    let json = synth_json(&pipeline);
    assert_eq!(action_names(&json, "Build"), vec!["CodeBuild"]);
}

/// A rejected action is never stored; the stage can still be used
#[test]
fn test_rejected_action_leaves_stage_untouched() {
    let (mut pipeline, source) = pipeline_with_source("CrossAccount");
    let mut stage = pipeline.add_stage("Build").unwrap();

    let rejected = stage.add_action(
        Action::new("CodeBuild", BuildAction::new(cross_account_project()))
            .with_input(&source)
            .with_output(Artifact::new("BuildOutput")),
    );
    assert!(rejected.is_err());

    // Name and output artifact are still free
    stage
        .add_action(
            Action::new("CodeBuild", BuildAction::new(ResourceRef::managed("local")))
                .with_input(&source)
                .with_output(Artifact::new("BuildOutput")),
        )
        .unwrap();

    let build = pipeline.stage("Build").unwrap();
    assert_eq!(build.actions().len(), 1);
    assert_eq!(
        build.actions()[0].action.kind,
        ActionKind::from(BuildAction::new(ResourceRef::managed("local")))
    );
}

/// An account override on the action counts as cross-account
#[test]
fn test_action_account_override_is_checked() {
    let (mut pipeline, source) = pipeline_with_source("CrossAccount");
    let result = pipeline.add_stage("Build").unwrap().add_action(
        Action::new("CodeBuild", BuildAction::new(ResourceRef::managed("local")))
            .with_input(&source)
            .with_output(Artifact::new("BuildOutput"))
            .in_account(PROJECT_ACCOUNT),
    );

    assert!(matches!(
        result,
        Err(PipelineError::CrossAccountOutputsUnsupported { .. })
    ));
}

/// Projects imported by ARN carry their account
#[test]
fn test_arn_import_is_cross_account() {
    let (mut pipeline, source) = pipeline_with_source("CrossAccount");
    let project = ResourceRef::from_arn(&format!(
        "arn:aws:codebuild:{}:{}:project/shared",
        STACK_REGION, PROJECT_ACCOUNT
    ))
    .unwrap();

    let result = pipeline.add_stage("Build").unwrap().add_action(
        Action::new("CodeBuild", BuildAction::new(project))
            .with_input(&source)
            .with_output(Artifact::new("BuildOutput")),
    );

    assert!(matches!(
        result,
        Err(PipelineError::CrossAccountOutputsUnsupported { .. })
    ));
}

/// Same-account resources may declare outputs
#[test]
fn test_same_account_with_outputs_is_accepted() {
    let (mut pipeline, source) = pipeline_with_source("SameAccount");
    let project = ResourceRef::imported("shared").in_account(PIPELINE_ACCOUNT);

    pipeline
        .add_stage("Build")
        .unwrap()
        .add_action(
            Action::new("CodeBuild", BuildAction::new(project))
                .with_input(&source)
                .with_output(Artifact::new("BuildOutput")),
        )
        .unwrap();

    let json = synth_json(&pipeline);
    assert_eq!(
        find_action(&json, "Build", "CodeBuild")["OutputArtifacts"][0]["Name"],
        "BuildOutput"
    );
}

/// Overriding the action's account does not hide a foreign project
#[test]
fn test_override_does_not_mask_foreign_resource() {
    let (mut pipeline, source) = pipeline_with_source("CrossAccount");
    let result = pipeline.add_stage("Build").unwrap().add_action(
        Action::new("CodeBuild", BuildAction::new(cross_account_project()))
            .with_input(&source)
            .with_output(Artifact::new("BuildOutput"))
            .in_account(PIPELINE_ACCOUNT),
    );

    assert!(matches!(
        result,
        Err(PipelineError::CrossAccountOutputsUnsupported { ref account, .. }) if account == PROJECT_ACCOUNT
    ));
}

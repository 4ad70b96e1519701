//! Test: Ordering and Idempotence
//!
//! Stages and actions serialize in declaration order, and synthesizing the
//! same pipeline twice produces identical bytes.

use crate::helpers::*;
use codepipeline_synth::core::{Action, ApprovalAction, Artifact, BuildAction, Pipeline, ResourceRef};
use codepipeline_synth::synth::{render, OutputFormat, Template};

fn mixed_pipeline() -> Pipeline {
    let (mut pipeline, source) = pipeline_with_source("Ordering");

    let mut build = pipeline.add_stage("Build").unwrap();
    // Declared out of alphabetical order on purpose
    for name in ["Zeta", "Alpha", "Mid"] {
        build
            .add_action(
                Action::new(name, BuildAction::new(ResourceRef::managed(name.to_lowercase())))
                    .with_input(&source)
                    .with_output(Artifact::new(format!("{}Output", name))),
            )
            .unwrap();
    }

    pipeline
        .add_stage("Approve")
        .unwrap()
        .add_action(Action::new("Sign-off", ApprovalAction::new().with_additional_information("Ship?")))
        .unwrap();

    let mut deploy = pipeline.add_stage("Deploy").unwrap();
    deploy
        .add_action(
            Action::new("Package", BuildAction::new(ResourceRef::managed("package")))
                .with_input(&Artifact::new("ZetaOutput"))
                .with_input(&Artifact::new("AlphaOutput"))
                .export_variable("Version"),
        )
        .unwrap();
    deploy
        .add_action(Action::new("Approve", ApprovalAction::new()).with_run_order(2))
        .unwrap();

    pipeline
}

/// Stage and action order match declaration order
#[test]
fn test_declaration_order_preserved() {
    let json = synth_json(&mixed_pipeline());

    assert_eq!(stage_names(&json), vec!["Source", "Build", "Approve", "Deploy"]);
    assert_eq!(action_names(&json, "Build"), vec!["Zeta", "Alpha", "Mid"]);
    assert_eq!(action_names(&json, "Deploy"), vec!["Package", "Approve"]);

    let deploy = find_stage(&json, "Deploy");
    assert_eq!(deploy["Actions"][0]["RunOrder"], 1);
    assert_eq!(deploy["Actions"][1]["RunOrder"], 2);
}

/// Multiple inputs keep their order and the first becomes the primary source
#[test]
fn test_multiple_inputs_primary_source() {
    let json = synth_json(&mixed_pipeline());
    let package = find_action(&json, "Deploy", "Package");

    assert_eq!(package["InputArtifacts"][0]["Name"], "ZetaOutput");
    assert_eq!(package["InputArtifacts"][1]["Name"], "AlphaOutput");
    assert_config(&json, "Deploy", "Package", "PrimarySource", "ZetaOutput");
}

/// Synthesizing twice yields byte-identical documents
#[test]
fn test_synthesis_is_idempotent() {
    let pipeline = mixed_pipeline();

    let first = pipeline.synthesize().unwrap();
    let second = pipeline.synthesize().unwrap();
    assert_eq!(first.to_json().unwrap(), second.to_json().unwrap());
    assert_eq!(first.to_yaml().unwrap(), second.to_yaml().unwrap());

    // Independently built pipelines agree too
    let rebuilt = mixed_pipeline().synthesize().unwrap();
    assert_eq!(
        render(&Template::from_document(first), OutputFormat::Json).unwrap(),
        render(&Template::from_document(rebuilt), OutputFormat::Json).unwrap()
    );
}

/// Configuration keys come out sorted
#[test]
fn test_configuration_keys_sorted() {
    let json_text = mixed_pipeline().synthesize().unwrap().to_json().unwrap();

    let branch = json_text.find("\"BranchName\"").unwrap();
    let poll = json_text.find("\"PollForSourceChanges\"").unwrap();
    let repo = json_text.find("\"RepositoryName\"").unwrap();
    assert!(branch < poll && poll < repo);
}

/// Typed document lookups see the same order as the JSON
#[test]
fn test_document_lookup() {
    let document = mixed_pipeline().synthesize().unwrap();
    assert_eq!(document.action_count(), 7);

    let deploy = document.stage("Deploy").unwrap();
    assert_eq!(deploy.actions[0].name, "Package");
    assert_eq!(deploy.action("Approve").unwrap().run_order, 2);
    assert_eq!(deploy.action("Package").unwrap().namespace.as_deref(), Some("Deploy_Package_NS"));

    assert!(document.stage("Test").is_none());
    assert!(document.stage("Build").unwrap().action("Package").is_none());
}

//! Synthesis of pipeline definitions into declarative documents
//!
//! The document mirrors the `Stages` property of an
//! `AWS::CodePipeline::Pipeline` resource. Stages and actions keep their
//! declaration order and configuration keys are sorted, so synthesizing the
//! same pipeline twice yields identical output.

pub mod template;

pub use template::Template;

use crate::core::{
    action::ActionCategory,
    error::Result,
    stage::BoundAction,
    Pipeline,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::info;

/// Owner of every action type emitted here
pub const ACTION_OWNER: &str = "AWS";

/// Version of every action type emitted here
pub const ACTION_VERSION: &str = "1";

/// Serialized pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PipelineDocument {
    pub name: String,
    pub stages: Vec<StageDocument>,
}

/// Serialized stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StageDocument {
    pub name: String,
    pub actions: Vec<ActionDocument>,
}

/// Serialized action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ActionDocument {
    pub name: String,

    pub action_type_id: ActionTypeId,

    pub run_order: u32,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub configuration: BTreeMap<String, Value>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub input_artifacts: Vec<ArtifactDocument>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub output_artifacts: Vec<ArtifactDocument>,

    /// Present only for actions that produce variables
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    /// Present only when the action runs outside the pipeline's region
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_arn: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ActionTypeId {
    pub category: ActionCategory,
    pub owner: String,
    pub provider: String,
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ArtifactDocument {
    pub name: String,
}

/// Output encoding for synthesized documents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Yaml,
}

/// Render any synthesized value in the requested format
pub fn render<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<String> {
    let rendered = match format {
        OutputFormat::Json => serde_json::to_string_pretty(value)?,
        OutputFormat::Yaml => serde_yaml::to_string(value)?,
    };
    Ok(rendered)
}

impl ActionDocument {
    fn from_bound(bound: &BoundAction, pipeline: &Pipeline) -> Self {
        let action = &bound.action;

        ActionDocument {
            name: action.name.clone(),
            action_type_id: ActionTypeId {
                category: action.category(),
                owner: ACTION_OWNER.to_string(),
                provider: action.kind.provider().to_string(),
                version: ACTION_VERSION.to_string(),
            },
            run_order: action.run_order,
            configuration: action.kind.configuration(&action.inputs),
            input_artifacts: action
                .inputs
                .iter()
                .map(|a| ArtifactDocument { name: a.name().to_string() })
                .collect(),
            output_artifacts: action
                .outputs
                .iter()
                .map(|a| ArtifactDocument { name: a.name().to_string() })
                .collect(),
            namespace: bound.namespace.clone(),
            region: bound
                .is_cross_region(&pipeline.environment)
                .then(|| bound.environment.region.clone()),
            role_arn: action.role_arn.clone(),
        }
    }
}

impl Pipeline {
    /// Validate the pipeline structure and serialize it
    pub fn synthesize(&self) -> Result<PipelineDocument> {
        self.validate()?;

        let stages = self
            .stages()
            .iter()
            .map(|stage| StageDocument {
                name: stage.name.clone(),
                actions: stage
                    .actions()
                    .iter()
                    .map(|bound| ActionDocument::from_bound(bound, self))
                    .collect(),
            })
            .collect();

        let document = PipelineDocument {
            name: self.name.clone(),
            stages,
        };

        info!(
            "Synthesized pipeline '{}' ({} stages, {} actions)",
            document.name,
            document.stages.len(),
            document.action_count()
        );

        Ok(document)
    }
}

impl PipelineDocument {
    pub fn action_count(&self) -> usize {
        self.stages.iter().map(|s| s.actions.len()).sum()
    }

    pub fn stage(&self, name: &str) -> Option<&StageDocument> {
        self.stages.iter().find(|s| s.name == name)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn to_yaml(&self) -> serde_yaml::Result<String> {
        serde_yaml::to_string(self)
    }
}

impl StageDocument {
    pub fn action(&self, name: &str) -> Option<&ActionDocument> {
        self.actions.iter().find(|a| a.name == name)
    }
}

/// Categories seen in a document, in order of first appearance
pub fn categories(document: &PipelineDocument) -> Vec<ActionCategory> {
    let mut seen = Vec::new();
    for action in document.stages.iter().flat_map(|s| &s.actions) {
        if !seen.contains(&action.action_type_id.category) {
            seen.push(action.action_type_id.category);
        }
    }
    seen
}

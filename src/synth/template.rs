//! CloudFormation-style template wrapper

use crate::synth::PipelineDocument;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Resource type for synthesized pipelines
pub const PIPELINE_RESOURCE_TYPE: &str = "AWS::CodePipeline::Pipeline";

/// A template with one pipeline resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Template {
    pub resources: BTreeMap<String, TemplateResource>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TemplateResource {
    #[serde(rename = "Type")]
    pub resource_type: String,
    pub properties: PipelineDocument,
}

impl Template {
    pub fn from_document(document: PipelineDocument) -> Self {
        let mut resources = BTreeMap::new();
        resources.insert(
            logical_id(&document.name),
            TemplateResource {
                resource_type: PIPELINE_RESOURCE_TYPE.to_string(),
                properties: document,
            },
        );
        Template { resources }
    }
}

/// Alphanumeric logical ID derived from the pipeline name
pub fn logical_id(name: &str) -> String {
    let id: String = name.chars().filter(|c| c.is_ascii_alphanumeric()).collect();
    match id.chars().next() {
        Some(c) if c.is_ascii_alphabetic() => id,
        _ => format!("Pipeline{}", id),
    }
}

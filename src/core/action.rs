//! Action domain model
//!
//! An [`Action`] is the shared base (name, run order, artifacts, placement)
//! wrapped around a variant payload in [`ActionKind`]. Variant-specific
//! behaviour is exposed through the [`TargetsResource`] and
//! [`ProducesVariables`] capabilities.

use crate::core::{
    artifact::Artifact,
    environment::Environment,
    error::{PipelineError, Result},
    resource::ResourceRef,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Default run order for actions that don't set one
pub const DEFAULT_RUN_ORDER: u32 = 1;

/// Largest run order accepted by the pipeline service
pub const MAX_RUN_ORDER: u32 = 999;

/// Variables exported by CodeCommit source actions
pub const CODECOMMIT_VARIABLES: &[&str] = &[
    "AuthorDate",
    "BranchName",
    "CommitId",
    "CommitMessage",
    "CommitterDate",
    "RepositoryName",
];

/// Variables exported by S3 source actions
pub const S3_VARIABLES: &[&str] = &["ETag", "VersionId"];

/// Action category as understood by the pipeline service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionCategory {
    Source,
    Build,
    Approval,
}

/// Which variables an action is able to export
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableSet {
    /// The action never produces variables
    None,
    /// The provider exports a fixed set of names
    Fixed(&'static [&'static str]),
    /// Any name may be exported (e.g. declared by a buildspec)
    Any,
}

impl VariableSet {
    pub fn contains(&self, name: &str) -> bool {
        match self {
            VariableSet::None => false,
            VariableSet::Fixed(names) => names.contains(&name),
            VariableSet::Any => true,
        }
    }
}

/// Capability: the action operates on a resource that may live elsewhere
pub trait TargetsResource {
    fn target_resource(&self) -> Option<&ResourceRef>;
}

/// Capability: the action can expose output variables
pub trait ProducesVariables {
    fn variable_set(&self) -> VariableSet;
}

/// When a source action starts the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceTrigger {
    /// Never start automatically
    None,
    /// The service polls the source for changes
    Poll,
    /// An event rule starts the pipeline (managed outside the pipeline)
    Events,
}

/// Source checkout
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceAction {
    CodeCommit {
        repository: ResourceRef,
        branch: String,
        trigger: SourceTrigger,
    },
    S3 {
        bucket: ResourceRef,
        object_key: String,
        trigger: SourceTrigger,
    },
}

impl SourceAction {
    pub fn codecommit(repository: ResourceRef, branch: impl Into<String>) -> Self {
        SourceAction::CodeCommit {
            repository,
            branch: branch.into(),
            trigger: SourceTrigger::Events,
        }
    }

    pub fn s3(bucket: ResourceRef, object_key: impl Into<String>) -> Self {
        SourceAction::S3 {
            bucket,
            object_key: object_key.into(),
            trigger: SourceTrigger::Poll,
        }
    }

    pub fn with_trigger(mut self, new_trigger: SourceTrigger) -> Self {
        match &mut self {
            SourceAction::CodeCommit { trigger, .. } | SourceAction::S3 { trigger, .. } => {
                *trigger = new_trigger;
            }
        }
        self
    }
}

impl TargetsResource for SourceAction {
    fn target_resource(&self) -> Option<&ResourceRef> {
        match self {
            SourceAction::CodeCommit { repository, .. } => Some(repository),
            SourceAction::S3 { bucket, .. } => Some(bucket),
        }
    }
}

impl ProducesVariables for SourceAction {
    fn variable_set(&self) -> VariableSet {
        match self {
            SourceAction::CodeCommit { .. } => VariableSet::Fixed(CODECOMMIT_VARIABLES),
            SourceAction::S3 { .. } => VariableSet::Fixed(S3_VARIABLES),
        }
    }
}

/// Plaintext environment variable handed to a build
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentVariable {
    pub name: String,
    pub value: String,
}

/// CodeBuild project invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildAction {
    pub project: ResourceRef,

    /// Environment variables, in declaration order
    pub environment_variables: Vec<EnvironmentVariable>,

    /// Run as a batch build
    pub batch: bool,
}

impl BuildAction {
    pub fn new(project: ResourceRef) -> Self {
        Self {
            project,
            environment_variables: Vec::new(),
            batch: false,
        }
    }

    pub fn with_environment_variable(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.environment_variables.push(EnvironmentVariable {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    pub fn with_batch(mut self, batch: bool) -> Self {
        self.batch = batch;
        self
    }
}

impl TargetsResource for BuildAction {
    fn target_resource(&self) -> Option<&ResourceRef> {
        Some(&self.project)
    }
}

impl ProducesVariables for BuildAction {
    fn variable_set(&self) -> VariableSet {
        VariableSet::Any
    }
}

/// Manual approval gate
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApprovalAction {
    /// SNS topic ARN notified when approval is pending
    pub notification_topic: Option<String>,

    /// Text shown to the reviewer; may contain variable references
    pub additional_information: Option<String>,

    /// Link shown to the reviewer
    pub external_entity_link: Option<String>,
}

impl ApprovalAction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_notification_topic(mut self, topic_arn: impl Into<String>) -> Self {
        self.notification_topic = Some(topic_arn.into());
        self
    }

    pub fn with_additional_information(mut self, text: impl Into<String>) -> Self {
        self.additional_information = Some(text.into());
        self
    }

    pub fn with_external_entity_link(mut self, link: impl Into<String>) -> Self {
        self.external_entity_link = Some(link.into());
        self
    }
}

impl TargetsResource for ApprovalAction {
    fn target_resource(&self) -> Option<&ResourceRef> {
        None
    }
}

impl ProducesVariables for ApprovalAction {
    fn variable_set(&self) -> VariableSet {
        VariableSet::None
    }
}

/// Variant payload of an action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionKind {
    Source(SourceAction),
    Build(BuildAction),
    Approval(ApprovalAction),
}

impl From<SourceAction> for ActionKind {
    fn from(action: SourceAction) -> Self {
        ActionKind::Source(action)
    }
}

impl From<BuildAction> for ActionKind {
    fn from(action: BuildAction) -> Self {
        ActionKind::Build(action)
    }
}

impl From<ApprovalAction> for ActionKind {
    fn from(action: ApprovalAction) -> Self {
        ActionKind::Approval(action)
    }
}

impl TargetsResource for ActionKind {
    fn target_resource(&self) -> Option<&ResourceRef> {
        match self {
            ActionKind::Source(source) => source.target_resource(),
            ActionKind::Build(build) => build.target_resource(),
            ActionKind::Approval(approval) => approval.target_resource(),
        }
    }
}

impl ProducesVariables for ActionKind {
    fn variable_set(&self) -> VariableSet {
        match self {
            ActionKind::Source(source) => source.variable_set(),
            ActionKind::Build(build) => build.variable_set(),
            ActionKind::Approval(approval) => approval.variable_set(),
        }
    }
}

impl ActionKind {
    pub fn category(&self) -> ActionCategory {
        match self {
            ActionKind::Source(_) => ActionCategory::Source,
            ActionKind::Build(_) => ActionCategory::Build,
            ActionKind::Approval(_) => ActionCategory::Approval,
        }
    }

    pub fn provider(&self) -> &'static str {
        match self {
            ActionKind::Source(SourceAction::CodeCommit { .. }) => "CodeCommit",
            ActionKind::Source(SourceAction::S3 { .. }) => "S3",
            ActionKind::Build(_) => "CodeBuild",
            ActionKind::Approval(_) => "Manual",
        }
    }

    /// Provider configuration record
    ///
    /// Keys are sorted so repeated synthesis is byte-identical.
    pub fn configuration(&self, inputs: &[Artifact]) -> BTreeMap<String, Value> {
        let mut config = BTreeMap::new();

        match self {
            ActionKind::Source(SourceAction::CodeCommit { repository, branch, trigger }) => {
                config.insert("RepositoryName".to_string(), Value::from(repository.name.as_str()));
                config.insert("BranchName".to_string(), Value::from(branch.as_str()));
                config.insert(
                    "PollForSourceChanges".to_string(),
                    Value::Bool(*trigger == SourceTrigger::Poll),
                );
            }
            ActionKind::Source(SourceAction::S3 { bucket, object_key, trigger }) => {
                config.insert("S3Bucket".to_string(), Value::from(bucket.name.as_str()));
                config.insert("S3ObjectKey".to_string(), Value::from(object_key.as_str()));
                config.insert(
                    "PollForSourceChanges".to_string(),
                    Value::Bool(*trigger == SourceTrigger::Poll),
                );
            }
            ActionKind::Build(build) => {
                config.insert("ProjectName".to_string(), Value::from(build.project.name.as_str()));

                if inputs.len() > 1 {
                    config.insert("PrimarySource".to_string(), Value::from(inputs[0].name()));
                }

                if !build.environment_variables.is_empty() {
                    let vars: Vec<Value> = build
                        .environment_variables
                        .iter()
                        .map(|var| {
                            serde_json::json!({
                                "name": var.name,
                                "type": "PLAINTEXT",
                                "value": var.value,
                            })
                        })
                        .collect();
                    // The service expects this field as a JSON-encoded string
                    config.insert(
                        "EnvironmentVariables".to_string(),
                        Value::String(Value::Array(vars).to_string()),
                    );
                }

                if build.batch {
                    config.insert("BatchEnabled".to_string(), Value::from("true"));
                }
            }
            ActionKind::Approval(approval) => {
                if let Some(topic) = &approval.notification_topic {
                    config.insert("NotificationArn".to_string(), Value::from(topic.as_str()));
                }
                if let Some(info) = &approval.additional_information {
                    config.insert("CustomData".to_string(), Value::from(info.as_str()));
                }
                if let Some(link) = &approval.external_entity_link {
                    config.insert("ExternalEntityLink".to_string(), Value::from(link.as_str()));
                }
            }
        }

        config
    }
}

/// A single action in a stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    /// Action name, unique within its stage
    pub name: String,

    /// Execution order within the stage
    pub run_order: u32,

    /// Artifacts consumed by this action
    pub inputs: Vec<Artifact>,

    /// Artifacts produced by this action
    pub outputs: Vec<Artifact>,

    /// Account override for where the action runs
    pub account: Option<String>,

    /// Region override for where the action runs
    pub region: Option<String>,

    /// Role assumed by the service to run the action
    pub role_arn: Option<String>,

    /// Namespace override for exported variables
    pub namespace: Option<String>,

    /// Variables this action exports for downstream use
    pub variables: Vec<String>,

    pub kind: ActionKind,
}

impl Action {
    pub fn new(name: impl Into<String>, kind: impl Into<ActionKind>) -> Self {
        Self {
            name: name.into(),
            run_order: DEFAULT_RUN_ORDER,
            inputs: Vec::new(),
            outputs: Vec::new(),
            account: None,
            region: None,
            role_arn: None,
            namespace: None,
            variables: Vec::new(),
            kind: kind.into(),
        }
    }

    pub fn with_input(mut self, artifact: &Artifact) -> Self {
        self.inputs.push(artifact.clone());
        self
    }

    pub fn with_output(mut self, artifact: Artifact) -> Self {
        self.outputs.push(artifact);
        self
    }

    pub fn with_run_order(mut self, run_order: u32) -> Self {
        self.run_order = run_order;
        self
    }

    pub fn in_account(mut self, account: impl Into<String>) -> Self {
        self.account = Some(account.into());
        self
    }

    pub fn in_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn with_role_arn(mut self, role_arn: impl Into<String>) -> Self {
        self.role_arn = Some(role_arn.into());
        self
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn export_variable(mut self, name: impl Into<String>) -> Self {
        self.variables.push(name.into());
        self
    }

    pub fn category(&self) -> ActionCategory {
        self.kind.category()
    }

    /// Whether a namespace should be emitted for this action
    pub fn produces_variables(&self) -> bool {
        self.kind.variable_set() != VariableSet::None
            && (self.namespace.is_some() || !self.variables.is_empty())
    }

    /// Where the action's target lives
    ///
    /// Explicit overrides on the action win, then the target resource's own
    /// placement, then the pipeline's environment.
    pub fn resolve_environment(&self, pipeline: &Environment) -> Environment {
        let resource = self.kind.target_resource();
        let account = self
            .account
            .as_deref()
            .or_else(|| resource.and_then(|r| r.account.as_deref()));
        let region = self
            .region
            .as_deref()
            .or_else(|| resource.and_then(|r| r.region.as_deref()));

        pipeline.resolve(account, region)
    }

    /// Every configuration string that may carry variable references
    pub fn configuration_text(&self) -> Vec<String> {
        self.kind
            .configuration(&self.inputs)
            .into_values()
            .filter_map(|value| match value {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect()
    }

    /// Checks that only depend on the action itself
    pub(crate) fn check_shape(&self) -> Result<()> {
        if self.run_order == 0 || self.run_order > MAX_RUN_ORDER {
            return Err(PipelineError::InvalidRunOrder {
                action: self.name.clone(),
                run_order: self.run_order,
            });
        }

        let (inputs_ok, outputs_ok, expected) = match &self.kind {
            ActionKind::Source(_) => (
                self.inputs.is_empty(),
                self.outputs.len() == 1,
                "no inputs and exactly one output",
            ),
            ActionKind::Build(_) => (!self.inputs.is_empty(), true, "at least one input"),
            ActionKind::Approval(_) => (
                self.inputs.is_empty(),
                self.outputs.is_empty(),
                "no artifacts",
            ),
        };
        if !inputs_ok || !outputs_ok {
            return Err(PipelineError::InvalidArtifactCount {
                action: self.name.clone(),
                expected,
                found: format!("{} input(s) and {} output(s)", self.inputs.len(), self.outputs.len()),
            });
        }

        let variable_set = self.kind.variable_set();
        if variable_set == VariableSet::None && (!self.variables.is_empty() || self.namespace.is_some()) {
            return Err(PipelineError::VariablesNotSupported(self.name.clone()));
        }
        if let Some(unknown) = self.variables.iter().find(|v| !variable_set.contains(v.as_str())) {
            return Err(PipelineError::UnknownVariable {
                action: self.name.clone(),
                variable: unknown.clone(),
            });
        }

        Ok(())
    }
}

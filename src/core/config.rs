//! Pipeline configuration from YAML

use crate::core::{
    action::{Action, ApprovalAction, BuildAction, EnvironmentVariable, SourceAction, SourceTrigger},
    artifact::Artifact,
    environment::Environment,
    resource::ResourceRef,
    Pipeline,
};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Top-level pipeline configuration loaded from YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Pipeline name
    pub name: String,

    /// Account the pipeline is deployed to
    pub account: String,

    /// Region the pipeline is deployed to
    pub region: String,

    /// Stages in execution order
    pub stages: Vec<StageConfig>,
}

/// Stage configuration as defined in YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageConfig {
    pub name: String,

    #[serde(default)]
    pub actions: Vec<ActionConfig>,
}

/// Action configuration as defined in YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionConfig {
    /// Action name, unique within its stage
    #[serde(alias = "action_name")]
    pub name: String,

    /// Provider-specific settings, selected by `type`
    #[serde(flatten)]
    pub provider: ProviderConfig,

    /// Names of consumed artifacts
    #[serde(default)]
    pub input: Vec<String>,

    /// Names of produced artifacts
    #[serde(default)]
    pub output: Vec<String>,

    #[serde(default)]
    pub account: Option<String>,

    #[serde(default)]
    pub region: Option<String>,

    #[serde(default)]
    pub run_order: Option<u32>,

    #[serde(default)]
    pub role_arn: Option<String>,

    /// Namespace override for exported variables
    #[serde(default)]
    pub namespace: Option<String>,

    /// Variables exported for downstream actions
    #[serde(default)]
    pub variables: Vec<String>,
}

/// Provider-specific action settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ProviderConfig {
    #[serde(rename = "codecommit")]
    CodeCommit {
        repository: ResourceConfig,
        #[serde(default = "default_branch")]
        branch: String,
        #[serde(default)]
        trigger: Option<SourceTrigger>,
    },

    #[serde(rename = "s3")]
    S3 {
        bucket: ResourceConfig,
        object_key: String,
        #[serde(default)]
        trigger: Option<SourceTrigger>,
    },

    #[serde(rename = "codebuild")]
    CodeBuild {
        project: ResourceConfig,
        #[serde(default)]
        environment_variables: Vec<EnvironmentVariable>,
        #[serde(default)]
        batch: bool,
    },

    #[serde(rename = "manual_approval")]
    ManualApproval {
        #[serde(default)]
        notification_topic: Option<String>,
        #[serde(default)]
        additional_information: Option<String>,
        #[serde(default)]
        external_entity_link: Option<String>,
    },
}

/// Keys accepted on every action
const COMMON_ACTION_KEYS: &[&str] = &[
    "type",
    "name",
    "action_name",
    "input",
    "output",
    "account",
    "region",
    "run_order",
    "role_arn",
    "namespace",
    "variables",
];

/// Keys accepted for one provider `type`, or `None` if the type is unknown
fn provider_keys(provider: &str) -> Option<&'static [&'static str]> {
    match provider {
        "codecommit" => Some(&["repository", "branch", "trigger"]),
        "s3" => Some(&["bucket", "object_key", "trigger"]),
        "codebuild" => Some(&["project", "environment_variables", "batch"]),
        "manual_approval" => Some(&["notification_topic", "additional_information", "external_entity_link"]),
        _ => None,
    }
}

/// Reject action keys that no provider understands
fn check_action_keys(raw: &serde_yaml::Value) -> Result<()> {
    let stages = raw.get("stages").and_then(|s| s.as_sequence());
    for stage in stages.into_iter().flatten() {
        let stage_name = stage.get("name").and_then(|n| n.as_str()).unwrap_or("?");
        let actions = stage.get("actions").and_then(|a| a.as_sequence());

        for action in actions.into_iter().flatten() {
            let Some(mapping) = action.as_mapping() else {
                continue;
            };
            // Unknown or missing types are reported by serde
            let Some(allowed) = action.get("type").and_then(|t| t.as_str()).and_then(provider_keys) else {
                continue;
            };

            for key in mapping.keys() {
                let key = key.as_str().unwrap_or_default();
                if !COMMON_ACTION_KEYS.contains(&key) && !allowed.contains(&key) {
                    let action_name = action.get("name").and_then(|n| n.as_str()).unwrap_or("?");
                    bail!(
                        "Unknown key '{}' on action '{}' in stage '{}'",
                        key,
                        action_name,
                        stage_name
                    );
                }
            }
        }
    }
    Ok(())
}

fn default_branch() -> String {
    "master".to_string()
}

/// Resource reference: either a bare name or a detailed mapping
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResourceConfig {
    /// Resource declared next to the pipeline
    Name(String),
    Detailed {
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        arn: Option<String>,
        #[serde(default)]
        account: Option<String>,
        #[serde(default)]
        region: Option<String>,
        /// Referenced by name only, not declared with the pipeline
        #[serde(default)]
        imported: bool,
    },
}

impl ResourceConfig {
    /// Convert to a resource reference
    pub fn to_resource(&self) -> Result<ResourceRef> {
        match self {
            ResourceConfig::Name(name) => Ok(ResourceRef::managed(name.clone())),
            ResourceConfig::Detailed {
                name,
                arn,
                account,
                region,
                imported,
            } => {
                let mut resource = match (arn, name) {
                    (Some(arn), _) => ResourceRef::from_arn(arn)?,
                    (None, Some(name)) if *imported => ResourceRef::imported(name.clone()),
                    (None, Some(name)) => ResourceRef::managed(name.clone()),
                    (None, None) => bail!("Resource reference needs either 'name' or 'arn'"),
                };
                if let Some(account) = account {
                    resource = resource.in_account(account.clone());
                }
                if let Some(region) = region {
                    resource = resource.in_region(region.clone());
                }
                Ok(resource)
            }
        }
    }
}

impl ActionConfig {
    /// Convert to an action domain model
    pub fn to_action(&self) -> Result<Action> {
        let mut action = match &self.provider {
            ProviderConfig::CodeCommit {
                repository,
                branch,
                trigger,
            } => {
                let mut source = SourceAction::codecommit(repository.to_resource()?, branch.clone());
                if let Some(trigger) = trigger {
                    source = source.with_trigger(*trigger);
                }
                Action::new(self.name.clone(), source)
            }
            ProviderConfig::S3 {
                bucket,
                object_key,
                trigger,
            } => {
                let mut source = SourceAction::s3(bucket.to_resource()?, object_key.clone());
                if let Some(trigger) = trigger {
                    source = source.with_trigger(*trigger);
                }
                Action::new(self.name.clone(), source)
            }
            ProviderConfig::CodeBuild {
                project,
                environment_variables,
                batch,
            } => {
                let mut build = BuildAction::new(project.to_resource()?).with_batch(*batch);
                for var in environment_variables {
                    build = build.with_environment_variable(var.name.clone(), var.value.clone());
                }
                Action::new(self.name.clone(), build)
            }
            ProviderConfig::ManualApproval {
                notification_topic,
                additional_information,
                external_entity_link,
            } => Action::new(
                self.name.clone(),
                ApprovalAction {
                    notification_topic: notification_topic.clone(),
                    additional_information: additional_information.clone(),
                    external_entity_link: external_entity_link.clone(),
                },
            ),
        };

        action.inputs = self.input.iter().map(|name| Artifact::new(name.clone())).collect();
        action.outputs = self.output.iter().map(|name| Artifact::new(name.clone())).collect();
        action.account = self.account.clone();
        action.region = self.region.clone();
        action.role_arn = self.role_arn.clone();
        action.namespace = self.namespace.clone();
        action.variables = self.variables.clone();
        if let Some(run_order) = self.run_order {
            action.run_order = run_order;
        }

        Ok(action)
    }
}

impl PipelineConfig {
    /// Load pipeline configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_yaml(&content)
    }

    /// Parse pipeline configuration from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config = Self::parse(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a YAML file, apply environment overrides, then validate
    pub fn load<P: AsRef<Path>>(path: P, account: Option<String>, region: Option<String>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config = Self::parse(&content).with_context(|| format!("Failed to parse {}", path.display()))?;
        let config = config.with_environment_override(account, region);
        config.validate()?;
        Ok(config)
    }

    /// Deserialize without running pipeline rules
    ///
    /// Action keys are checked first: the provider settings are flattened
    /// into each action, so serde alone would drop misspelled keys.
    fn parse(yaml: &str) -> Result<Self> {
        let raw: serde_yaml::Value = serde_yaml::from_str(yaml)?;
        check_action_keys(&raw)?;
        Ok(serde_yaml::from_value(raw)?)
    }

    /// Override the deployment account and/or region
    pub fn with_environment_override(mut self, account: Option<String>, region: Option<String>) -> Self {
        if let Some(account) = account {
            self.account = account;
        }
        if let Some(region) = region {
            self.region = region;
        }
        self
    }

    /// Validate the pipeline configuration
    ///
    /// Builds the pipeline through the same API used programmatically, so
    /// every attach-time and structural rule applies.
    pub fn validate(&self) -> Result<()> {
        let pipeline = self.to_pipeline()?;
        pipeline
            .validate()
            .with_context(|| format!("Pipeline '{}' is not valid", self.name))?;
        Ok(())
    }

    pub fn environment(&self) -> Environment {
        Environment::new(self.account.clone(), self.region.clone())
    }

    /// Convert config to a Pipeline domain model
    pub fn to_pipeline(&self) -> Result<Pipeline> {
        let mut pipeline = Pipeline::new(self.name.clone(), self.environment());

        for stage_config in &self.stages {
            let mut stage = pipeline
                .add_stage(stage_config.name.clone())
                .with_context(|| format!("Invalid stage '{}'", stage_config.name))?;

            for action_config in &stage_config.actions {
                let action = action_config.to_action().with_context(|| {
                    format!(
                        "Invalid action '{}' in stage '{}'",
                        action_config.name, stage_config.name
                    )
                })?;
                stage.add_action(action).with_context(|| {
                    format!(
                        "Cannot add action '{}' to stage '{}'",
                        action_config.name, stage_config.name
                    )
                })?;
            }
        }

        debug!(
            "Built pipeline '{}' with {} stage(s) in {}",
            pipeline.name,
            pipeline.stages().len(),
            pipeline.environment
        );

        Ok(pipeline)
    }
}

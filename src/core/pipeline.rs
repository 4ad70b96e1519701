//! Pipeline domain model
//!
//! Actions are validated as they are attached: a rejected action is never
//! stored, so callers can recover from the error and keep building.

use crate::core::{
    action::{Action, ActionCategory, ProducesVariables, TargetsResource, VariableSet},
    environment::Environment,
    error::{PipelineError, Result},
    stage::{ActionHandle, BoundAction, Stage},
    variables,
};
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

/// Where an artifact is produced
#[derive(Debug, Clone)]
struct Producer {
    stage_index: usize,
    run_order: u32,
    action: String,
}

/// Action that owns a variable namespace
#[derive(Debug, Clone)]
struct NamespaceOwner {
    action: String,
    variables: VariableSet,
}

/// A pipeline definition
#[derive(Debug, Clone)]
pub struct Pipeline {
    /// Pipeline name
    pub name: String,

    /// Account and region the pipeline is deployed to
    pub environment: Environment,

    /// Stages in declaration order
    stages: Vec<Stage>,

    /// Artifact name -> producing action
    producers: HashMap<String, Producer>,

    /// Namespace -> owning action
    namespaces: HashMap<String, NamespaceOwner>,
}

/// Handle for appending actions to one stage
pub struct StageBuilder<'p> {
    pipeline: &'p mut Pipeline,
    index: usize,
}

impl StageBuilder<'_> {
    pub fn name(&self) -> &str {
        &self.pipeline.stages[self.index].name
    }

    /// Validate an action and attach it to the stage
    pub fn add_action(&mut self, action: Action) -> Result<ActionHandle> {
        self.pipeline.attach(self.index, action)
    }
}

impl Pipeline {
    pub fn new(name: impl Into<String>, environment: Environment) -> Self {
        Pipeline {
            name: name.into(),
            environment,
            stages: Vec::new(),
            producers: HashMap::new(),
            namespaces: HashMap::new(),
        }
    }

    /// Append a new stage
    pub fn add_stage(&mut self, name: impl Into<String>) -> Result<StageBuilder<'_>> {
        let name = name.into();
        if self.stages.iter().any(|s| s.name == name) {
            return Err(PipelineError::DuplicateStageName(name));
        }

        debug!("Adding stage '{}' to pipeline '{}'", name, self.name);
        self.stages.push(Stage::new(name));

        Ok(StageBuilder {
            index: self.stages.len() - 1,
            pipeline: self,
        })
    }

    /// Reopen an existing stage to append more actions
    pub fn stage_mut(&mut self, name: &str) -> Option<StageBuilder<'_>> {
        let index = self.stages.iter().position(|s| s.name == name)?;
        Some(StageBuilder { pipeline: self, index })
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn stage(&self, name: &str) -> Option<&Stage> {
        self.stages.iter().find(|s| s.name == name)
    }

    /// Look up an attached action by stage and action name
    pub fn action(&self, stage: &str, action: &str) -> Option<&BoundAction> {
        self.stage(stage).and_then(|s| s.action(action))
    }

    fn attach(&mut self, stage_index: usize, action: Action) -> Result<ActionHandle> {
        match self.check_action(stage_index, &action) {
            Ok((environment, namespace)) => {
                debug!(
                    "Attached action '{}' to stage '{}' ({})",
                    action.name, self.stages[stage_index].name, environment
                );
                Ok(self.commit(stage_index, action, environment, namespace))
            }
            Err(e) => {
                warn!(
                    "Rejected action '{}' in stage '{}': {}",
                    action.name, self.stages[stage_index].name, e
                );
                Err(e)
            }
        }
    }

    /// Run every attach-time rule without touching pipeline state
    fn check_action(&self, stage_index: usize, action: &Action) -> Result<(Environment, Option<String>)> {
        let stage = &self.stages[stage_index];

        action.check_shape()?;

        if stage.action(&action.name).is_some() {
            return Err(PipelineError::DuplicateActionName {
                stage: stage.name.clone(),
                action: action.name.clone(),
            });
        }

        let environment = action.resolve_environment(&self.environment);
        if !action.outputs.is_empty() {
            // An action-level account override does not move the target resource
            let resource_account = action.kind.target_resource().and_then(|r| r.account.as_deref());
            let foreign = resource_account
                .into_iter()
                .chain([environment.account.as_str()])
                .find(|account| *account != self.environment.account);
            if let Some(account) = foreign {
                return Err(PipelineError::CrossAccountOutputsUnsupported {
                    action: action.name.clone(),
                    account: account.to_string(),
                    pipeline_account: self.environment.account.clone(),
                });
            }
        }

        for input in &action.inputs {
            let available = self.producers.get(input.name()).is_some_and(|p| {
                p.stage_index < stage_index
                    || (p.stage_index == stage_index && p.run_order < action.run_order)
            });
            if !available {
                return Err(PipelineError::UnknownInputArtifact {
                    action: action.name.clone(),
                    artifact: input.name().to_string(),
                });
            }
        }

        let mut outputs = HashSet::new();
        for output in &action.outputs {
            if let Some(existing) = self.producers.get(output.name()) {
                return Err(PipelineError::DuplicateArtifactProducer {
                    artifact: output.name().to_string(),
                    producer: existing.action.clone(),
                });
            }
            if !outputs.insert(output.name()) {
                return Err(PipelineError::DuplicateArtifactProducer {
                    artifact: output.name().to_string(),
                    producer: action.name.clone(),
                });
            }
        }

        let namespace = if action.produces_variables() {
            let namespace = action
                .namespace
                .clone()
                .unwrap_or_else(|| variables::derive_namespace(&stage.name, &action.name));
            if !variables::is_valid_namespace(&namespace) {
                return Err(PipelineError::InvalidNamespace {
                    action: action.name.clone(),
                    namespace,
                });
            }
            if let Some(owner) = self.namespaces.get(&namespace) {
                return Err(PipelineError::DuplicateNamespace {
                    namespace,
                    owner: owner.action.clone(),
                });
            }
            Some(namespace)
        } else {
            None
        };

        for text in action.configuration_text() {
            for reference in variables::find_references(&text) {
                if reference.is_builtin() {
                    continue;
                }
                let owner = self.namespaces.get(&reference.namespace).ok_or_else(|| {
                    PipelineError::UnknownVariableNamespace {
                        action: action.name.clone(),
                        namespace: reference.namespace.clone(),
                    }
                })?;
                if !owner.variables.contains(&reference.variable) {
                    return Err(PipelineError::UnknownVariable {
                        action: owner.action.clone(),
                        variable: reference.variable.clone(),
                    });
                }
            }
        }

        Ok((environment, namespace))
    }

    fn commit(
        &mut self,
        stage_index: usize,
        action: Action,
        environment: Environment,
        namespace: Option<String>,
    ) -> ActionHandle {
        for output in &action.outputs {
            self.producers.insert(
                output.name().to_string(),
                Producer {
                    stage_index,
                    run_order: action.run_order,
                    action: action.name.clone(),
                },
            );
        }

        if let Some(namespace) = &namespace {
            self.namespaces.insert(
                namespace.clone(),
                NamespaceOwner {
                    action: action.name.clone(),
                    variables: action.kind.variable_set(),
                },
            );
        }

        let bound = BoundAction {
            action,
            environment,
            namespace,
        };
        let stage = &mut self.stages[stage_index];
        let handle = bound.handle(&stage.name);
        stage.actions.push(bound);
        handle
    }

    /// Check the overall shape of the pipeline before synthesis
    pub fn validate(&self) -> Result<()> {
        if self.stages.len() < 2 {
            return Err(PipelineError::InvalidStructure(format!(
                "pipeline '{}' must have at least two stages, found {}",
                self.name,
                self.stages.len()
            )));
        }

        for (index, stage) in self.stages.iter().enumerate() {
            if stage.is_empty() {
                return Err(PipelineError::InvalidStructure(format!(
                    "stage '{}' has no actions",
                    stage.name
                )));
            }

            for bound in stage.actions() {
                let is_source = bound.action.category() == ActionCategory::Source;
                if index == 0 && !is_source {
                    return Err(PipelineError::InvalidStructure(format!(
                        "first stage '{}' may only contain source actions, found '{}'",
                        stage.name,
                        bound.name()
                    )));
                }
                if index > 0 && is_source {
                    return Err(PipelineError::InvalidStructure(format!(
                        "source action '{}' must be in the first stage, found in '{}'",
                        bound.name(),
                        stage.name
                    )));
                }
            }
        }

        Ok(())
    }
}

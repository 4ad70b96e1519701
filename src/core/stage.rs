//! Stage domain model

use crate::core::{
    action::{Action, ProducesVariables, VariableSet},
    environment::Environment,
    error::{PipelineError, Result},
    variables,
};

/// An action that has been accepted into a stage
///
/// Carries the placement resolved at attach time and, for actions that
/// produce variables, their namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundAction {
    pub action: Action,

    /// Account and region the action's target lives in
    pub environment: Environment,

    /// Namespace for exported variables
    pub namespace: Option<String>,
}

impl BoundAction {
    pub fn name(&self) -> &str {
        &self.action.name
    }

    /// Reference token for one of this action's variables
    pub fn variable(&self, name: &str) -> Result<String> {
        variable_token(
            &self.action.name,
            self.namespace.as_deref(),
            self.action.kind.variable_set(),
            name,
        )
    }

    pub(crate) fn handle(&self, stage: &str) -> ActionHandle {
        ActionHandle {
            stage: stage.to_string(),
            action: self.action.name.clone(),
            environment: self.environment.clone(),
            namespace: self.namespace.clone(),
            variables: self.action.kind.variable_set(),
        }
    }

    pub fn is_cross_account(&self, pipeline: &Environment) -> bool {
        self.environment.account != pipeline.account
    }

    pub fn is_cross_region(&self, pipeline: &Environment) -> bool {
        self.environment.region != pipeline.region
    }
}

/// Owned summary of an attached action, returned by `add_action`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionHandle {
    pub stage: String,
    pub action: String,
    pub environment: Environment,
    pub namespace: Option<String>,
    variables: VariableSet,
}

impl ActionHandle {
    /// Reference token for one of the action's variables
    pub fn variable(&self, name: &str) -> Result<String> {
        variable_token(&self.action, self.namespace.as_deref(), self.variables, name)
    }
}

fn variable_token(
    action: &str,
    namespace: Option<&str>,
    exported: VariableSet,
    name: &str,
) -> Result<String> {
    let namespace = namespace.ok_or_else(|| PipelineError::VariablesNotSupported(action.to_string()))?;

    if !exported.contains(name) {
        return Err(PipelineError::UnknownVariable {
            action: action.to_string(),
            variable: name.to_string(),
        });
    }

    Ok(variables::reference(namespace, name))
}

/// A named, ordered group of actions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stage {
    pub name: String,

    /// Actions in declaration order
    pub(crate) actions: Vec<BoundAction>,
}

impl Stage {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            actions: Vec::new(),
        }
    }

    pub fn actions(&self) -> &[BoundAction] {
        &self.actions
    }

    pub fn action(&self, name: &str) -> Option<&BoundAction> {
        self.actions.iter().find(|a| a.action.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

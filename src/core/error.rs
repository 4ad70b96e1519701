//! Errors raised while assembling a pipeline

use thiserror::Error;

/// Tracking issue for the platform limitation on cross-account outputs
pub const CROSS_ACCOUNT_OUTPUTS_ISSUE: &str = "https://github.com/aws/aws-cdk/issues/4169";

/// Errors raised by the pipeline construction API
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    /// A cross-account action declared output artifacts
    #[error(
        "action '{action}' targets a resource in account {account} (pipeline account {pipeline_account}) \
         and cannot have output artifacts; this is a known limitation, \
         see https://github.com/aws/aws-cdk/issues/4169"
    )]
    CrossAccountOutputsUnsupported {
        action: String,
        account: String,
        pipeline_account: String,
    },

    #[error("stage '{0}' already exists in the pipeline")]
    DuplicateStageName(String),

    #[error("stage '{stage}' already contains an action named '{action}'")]
    DuplicateActionName { stage: String, action: String },

    #[error("action '{action}' has run order {run_order}, expected a value between 1 and 999")]
    InvalidRunOrder { action: String, run_order: u32 },

    #[error("action '{action}' uses input artifact '{artifact}', which is not produced before it in this pipeline")]
    UnknownInputArtifact { action: String, artifact: String },

    #[error("artifact '{artifact}' is already produced by action '{producer}'")]
    DuplicateArtifactProducer { artifact: String, producer: String },

    #[error("action '{action}' expects {expected} but declares {found}")]
    InvalidArtifactCount {
        action: String,
        expected: &'static str,
        found: String,
    },

    #[error("action '{action}' does not export a variable named '{variable}'")]
    UnknownVariable { action: String, variable: String },

    #[error("action '{0}' does not produce variables")]
    VariablesNotSupported(String),

    #[error("action '{action}' references variable namespace '{namespace}', which no earlier action declares")]
    UnknownVariableNamespace { action: String, namespace: String },

    #[error("action '{action}' has namespace '{namespace}', which may only contain letters, digits, '@', '_' and '-'")]
    InvalidNamespace { action: String, namespace: String },

    #[error("variable namespace '{namespace}' is already used by action '{owner}'")]
    DuplicateNamespace { namespace: String, owner: String },

    #[error("invalid ARN '{0}'")]
    InvalidArn(String),

    #[error("invalid pipeline structure: {0}")]
    InvalidStructure(String),
}

/// Result type for pipeline construction
pub type Result<T> = std::result::Result<T, PipelineError>;

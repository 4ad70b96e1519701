//! codepipeline-synth - build, validate and synthesize CodePipeline definitions

pub mod cli;
pub mod core;
pub mod synth;

// Re-export commonly used types
pub use crate::core::{Action, ActionHandle, Artifact, Environment, Pipeline, PipelineError, ResourceRef};
pub use crate::core::{ApprovalAction, BuildAction, SourceAction};
pub use crate::synth::{PipelineDocument, Template};

//! Core domain models for pipeline definitions
//!
//! This module defines the pipeline, stage and action structures, and the
//! rules enforced while they are assembled.

pub mod action;
pub mod artifact;
pub mod config;
pub mod environment;
pub mod error;
pub mod pipeline;
pub mod resource;
pub mod stage;
pub mod variables;

pub use action::*;
pub use artifact::*;
pub use environment::*;
pub use error::*;
pub use pipeline::*;
pub use resource::*;
pub use stage::*;

//! Artifacts passed between actions

use serde::{Deserialize, Serialize};

/// A named handle to data produced by one action and consumed by others
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Artifact {
    name: String,
}

impl Artifact {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl From<&str> for Artifact {
    fn from(name: &str) -> Self {
        Artifact::new(name)
    }
}

impl From<String> for Artifact {
    fn from(name: String) -> Self {
        Artifact::new(name)
    }
}

//! Account/region context

use serde::{Deserialize, Serialize};

/// A resolved account and region pair
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Environment {
    pub account: String,
    pub region: String,
}

impl Environment {
    pub fn new(account: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            account: account.into(),
            region: region.into(),
        }
    }

    /// Resolve optional overrides against this environment
    pub fn resolve(&self, account: Option<&str>, region: Option<&str>) -> Environment {
        Environment {
            account: account.unwrap_or(&self.account).to_string(),
            region: region.unwrap_or(&self.region).to_string(),
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.account, self.region)
    }
}

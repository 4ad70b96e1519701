//! References to resources an action operates on

use crate::core::error::{PipelineError, Result};

/// How a resource reference was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceOrigin {
    /// Declared alongside the pipeline
    Managed,
    /// Referenced by name or ARN, never provisioned here
    Imported,
}

/// A repository, bucket or build project targeted by an action
///
/// The identifier is emitted as supplied. Account and region default to the
/// pipeline's environment when left unset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRef {
    /// Name of the resource as it appears in action configuration
    pub name: String,

    pub origin: ResourceOrigin,

    /// Owning account, if it differs from the pipeline's
    pub account: Option<String>,

    /// Owning region, if it differs from the pipeline's
    pub region: Option<String>,
}

impl ResourceRef {
    /// A resource declared next to the pipeline
    pub fn managed(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            origin: ResourceOrigin::Managed,
            account: None,
            region: None,
        }
    }

    /// A resource referenced only by name
    pub fn imported(name: impl Into<String>) -> Self {
        Self {
            origin: ResourceOrigin::Imported,
            ..Self::managed(name)
        }
    }

    /// A resource referenced by ARN; account and region come from the ARN
    pub fn from_arn(arn: &str) -> Result<Self> {
        let parsed = Arn::parse(arn)?;
        Ok(Self {
            name: parsed.resource_name().to_string(),
            origin: ResourceOrigin::Imported,
            account: non_empty(parsed.account),
            region: non_empty(parsed.region),
        })
    }

    /// Set the owning account
    pub fn in_account(mut self, account: impl Into<String>) -> Self {
        self.account = Some(account.into());
        self
    }

    /// Set the owning region
    pub fn in_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn is_imported(&self) -> bool {
        self.origin == ResourceOrigin::Imported
    }
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

/// Components of an `arn:partition:service:region:account:resource` string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Arn<'a> {
    pub partition: &'a str,
    pub service: &'a str,
    pub region: &'a str,
    pub account: &'a str,
    pub resource: &'a str,
}

impl<'a> Arn<'a> {
    pub fn parse(arn: &'a str) -> Result<Self> {
        let mut parts = arn.splitn(6, ':');
        let prefix = parts.next();
        let fields: Vec<&str> = parts.collect();

        if prefix != Some("arn") || fields.len() != 5 {
            return Err(PipelineError::InvalidArn(arn.to_string()));
        }

        let arn = Arn {
            partition: fields[0],
            service: fields[1],
            region: fields[2],
            account: fields[3],
            resource: fields[4],
        };

        if arn.partition.is_empty() || arn.service.is_empty() || arn.resource.is_empty() {
            return Err(PipelineError::InvalidArn(arn.to_string()));
        }

        Ok(arn)
    }

    /// Resource name with any `type/` or `type:` prefix removed
    pub fn resource_name(&self) -> &'a str {
        self.resource
            .rsplit(|c: char| c == '/' || c == ':')
            .next()
            .unwrap_or(self.resource)
    }
}

impl std::fmt::Display for Arn<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "arn:{}:{}:{}:{}:{}",
            self.partition, self.service, self.region, self.account, self.resource
        )
    }
}

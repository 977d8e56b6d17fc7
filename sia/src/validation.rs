//! Character-count validation against per-project limits.

use std::collections::HashMap;

use serde::Deserialize;

use crate::error::{Result, SiaError};
use crate::models::ProjectType;
use crate::remote::ConfigSource;

pub const UNRECOGNIZED_PROJECT_TYPE: &str = "Unrecognized project type selected.";
pub const CONFIGURATION_ERROR: &str =
    "Configuration Error: Unable to retrieve character limits. Please contact the Admins.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Limit {
    #[serde(default)]
    pub min: u64,
    pub max: u64,
}

/// Limits keyed by project type, as published in the limits resource:
/// `{ "<projectType>": { "min": 0, "max": 15000 } }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct LimitsConfig(HashMap<String, Limit>);

impl LimitsConfig {
    pub fn parse(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn get(&self, project_type: &ProjectType) -> Option<&Limit> {
        self.0.get(project_type.as_str())
    }

    pub fn insert(&mut self, project_type: impl Into<String>, limit: Limit) {
        self.0.insert(project_type.into(), limit);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    Ok,
    Rejected(String),
}

impl ValidationOutcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok)
    }
}

/// Check a count against a limit table. Pure; no I/O.
pub fn check_limits(
    limits: &LimitsConfig,
    character_count: usize,
    project_type: &ProjectType,
    check_minimum: bool,
) -> ValidationOutcome {
    let Some(limit) = limits.get(project_type) else {
        return ValidationOutcome::Rejected(UNRECOGNIZED_PROJECT_TYPE.to_string());
    };

    let count = character_count as u64;
    if count > limit.max {
        return ValidationOutcome::Rejected(format!(
            "The text in your file exceeded {} characters, which is too long.",
            limit.max
        ));
    }
    if check_minimum && count < limit.min {
        return ValidationOutcome::Rejected(format!(
            "The text in your file is under {}, which is too short.",
            limit.min
        ));
    }
    ValidationOutcome::Ok
}

/// Limits loaded once for a run. A failed load turns every check into the
/// configuration-error rejection instead of aborting the run.
#[derive(Debug, Clone)]
pub struct Validator {
    limits: std::result::Result<LimitsConfig, String>,
}

impl Validator {
    pub fn new(limits: LimitsConfig) -> Self {
        Self { limits: Ok(limits) }
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            limits: Err(reason.into()),
        }
    }

    pub async fn load(source: &dyn ConfigSource, resource: &str) -> Self {
        match Self::fetch_limits(source, resource).await {
            Ok(limits) => Self::new(limits),
            Err(e) => {
                tracing::error!(resource, error = %e, "Unable to load character limits");
                Self::unavailable(e.to_string())
            }
        }
    }

    async fn fetch_limits(source: &dyn ConfigSource, resource: &str) -> Result<LimitsConfig> {
        let body = source.fetch_text(resource).await?;
        LimitsConfig::parse(&body)
            .map_err(|e| SiaError::ConfigFetch(format!("Invalid limits in {resource}: {e}")))
    }

    pub fn is_available(&self) -> bool {
        self.limits.is_ok()
    }

    pub fn validate(
        &self,
        character_count: usize,
        project_type: &ProjectType,
        check_minimum: bool,
    ) -> ValidationOutcome {
        match &self.limits {
            Ok(limits) => check_limits(limits, character_count, project_type, check_minimum),
            Err(_) => ValidationOutcome::Rejected(CONFIGURATION_ERROR.to_string()),
        }
    }
}

//! Manifest validator.
//!
//! Runs the fixed validation rule set (secrets, resource limits, naming,
//! privileges) over a rendered or loaded set of documents.

use crate::analyzer::document::parse_set;
use crate::analyzer::rules::{RuleEngine, RuleInput, validator_rules};
use crate::analyzer::security::SecuritySettings;
use crate::analyzer::types::Finding;
use crate::error::Result;
use crate::generator::catalog::ResourceProfile;
use crate::generator::types::RenderedSet;

#[derive(Debug, Clone)]
pub struct Validator {
    engine: RuleEngine,
    settings: SecuritySettings,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator {
    pub fn new() -> Self {
        Self {
            engine: RuleEngine::new(validator_rules()),
            settings: SecuritySettings::default(),
        }
    }

    /// Validate every document in `set`. Fails only if a document does not parse.
    pub fn validate(
        &self,
        set: &RenderedSet,
        profile: Option<&ResourceProfile>,
    ) -> Result<Vec<Finding>> {
        let documents = parse_set(set)?;
        Ok(self.engine.evaluate(&RuleInput {
            documents: &documents,
            profile,
            settings: &self.settings,
        }))
    }
}

//! Built-in rules

pub mod duplicate_step_id;
pub mod explicit_permissions;
pub mod missing_job_timeout;
pub mod schema;
pub mod script_injection;

pub use duplicate_step_id::DuplicateStepIdRule;
pub use explicit_permissions::ExplicitJobPermissionsRule;
pub use missing_job_timeout::MissingJobTimeoutRule;
pub use schema::SchemaRule;
pub use script_injection::ScriptInjectionRule;

use crate::rule::Rule;
use crate::rule_set::{RegistryEntry, RuleFactory, RuleSet, RuleSetError};

pub const DEFAULT_RULE_SET_ID: &str = "ghlint-default";
const DEFAULT_RULE_SET_NAME: &str = "Default GitHub Actions rules";

/// Every built-in rule, by identifier
pub const REGISTRY: &[RegistryEntry] = &[
    (schema::NAME, || -> Box<dyn Rule> { Box::new(SchemaRule) }),
    (missing_job_timeout::NAME, || -> Box<dyn Rule> {
        Box::new(MissingJobTimeoutRule)
    }),
    (explicit_permissions::NAME, || -> Box<dyn Rule> {
        Box::new(ExplicitJobPermissionsRule)
    }),
    (script_injection::NAME, || -> Box<dyn Rule> {
        Box::new(ScriptInjectionRule)
    }),
    (duplicate_step_id::NAME, || -> Box<dyn Rule> {
        Box::new(DuplicateStepIdRule::default())
    }),
];

/// Identifiers of every built-in rule, in registry order
pub fn rule_ids() -> impl Iterator<Item = &'static str> {
    REGISTRY.iter().map(|(id, _)| *id)
}

/// The built-in rules named by `ids`, in the order given
pub fn rule_set<S: AsRef<str>>(ids: &[S]) -> Result<RuleSet, RuleSetError> {
    RuleSet::from_registry(DEFAULT_RULE_SET_ID, DEFAULT_RULE_SET_NAME, REGISTRY, ids)
}

/// Every built-in rule
pub fn default_rule_set() -> RuleSet {
    let factories = REGISTRY
        .iter()
        .map(|&(_, constructor)| -> RuleFactory { Box::new(constructor) })
        .collect();
    RuleSet::new(DEFAULT_RULE_SET_ID, DEFAULT_RULE_SET_NAME, factories)
}

//! Named groups of rules

use std::fmt;

use thiserror::Error;

use crate::rule::Rule;

/// Creates a fresh rule instance
pub type RuleFactory = Box<dyn Fn() -> Box<dyn Rule> + Send + Sync>;

/// Rule identifier and constructor, as listed in a registry
pub type RegistryEntry = (&'static str, fn() -> Box<dyn Rule>);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleSetError {
    #[error("unknown rule '{id}' in rule set '{rule_set}'")]
    UnknownRule { rule_set: String, id: String },
}

/// A named collection of rule factories.
///
/// Rules may keep state while checking a file, so the set never hands out
/// the same instance twice: [`RuleSet::create_rules`] builds new ones on
/// every call.
pub struct RuleSet {
    id: String,
    name: String,
    factories: Vec<RuleFactory>,
}

impl RuleSet {
    pub fn new(id: impl Into<String>, name: impl Into<String>, factories: Vec<RuleFactory>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            factories,
        }
    }

    /// Resolve rule identifiers through `registry`, keeping the order of `ids`
    pub fn from_registry<S: AsRef<str>>(
        id: impl Into<String>,
        name: impl Into<String>,
        registry: &[RegistryEntry],
        ids: &[S],
    ) -> Result<Self, RuleSetError> {
        let id = id.into();
        let mut factories: Vec<RuleFactory> = Vec::with_capacity(ids.len());
        for rule_id in ids {
            let rule_id = rule_id.as_ref();
            let Some((_, constructor)) = registry.iter().find(|(key, _)| *key == rule_id) else {
                return Err(RuleSetError::UnknownRule {
                    rule_set: id,
                    id: rule_id.to_string(),
                });
            };
            let constructor = *constructor;
            factories.push(Box::new(constructor));
        }
        Ok(Self::new(id, name, factories))
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// New instances of every rule in the set
    pub fn create_rules(&self) -> Vec<Box<dyn Rule>> {
        self.factories.iter().map(|factory| factory()).collect()
    }
}

impl fmt::Debug for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleSet")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("rules", &self.factories.len())
            .finish()
    }
}

/// A factory building `R` through its `Default` impl
pub fn factory<R: Rule + Default + 'static>() -> RuleFactory {
    Box::new(|| -> Box<dyn Rule> { Box::new(R::default()) })
}

use crate::error::ConfigError;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

/// Include/exclude regular expressions as written in the workflow config
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterPattern {
    #[serde(default)]
    pub includes: Vec<String>,
    #[serde(default)]
    pub excludes: Vec<String>,
}

/// A compiled [`FilterPattern`]
#[derive(Debug, Clone, Default)]
pub struct TableFilter {
    includes: Vec<Regex>,
    excludes: Vec<Regex>,
}

impl TableFilter {
    /// Compile a filter pattern; a missing pattern admits every name
    pub fn new(pattern: Option<&FilterPattern>) -> Result<Self, ConfigError> {
        let Some(pattern) = pattern else {
            return Ok(Self::default());
        };

        Ok(Self {
            includes: compile_all(&pattern.includes)?,
            excludes: compile_all(&pattern.excludes)?,
        })
    }

    /// Returns true when `name` must be skipped
    ///
    /// Patterns match from the start of the name and ignore case. When
    /// includes are configured they decide alone and excludes are not
    /// consulted; otherwise a name is skipped when any exclude matches.
    pub fn filter_by_name(&self, name: &str) -> bool {
        if !self.includes.is_empty() {
            return !self.includes.iter().any(|re| re.is_match(name));
        }
        self.excludes.iter().any(|re| re.is_match(name))
    }
}

fn compile_all(patterns: &[String]) -> Result<Vec<Regex>, ConfigError> {
    patterns.iter().map(|pattern| compile(pattern)).collect()
}

fn compile(pattern: &str) -> Result<Regex, ConfigError> {
    RegexBuilder::new(&format!("^(?:{})", pattern))
        .case_insensitive(true)
        .build()
        .map_err(|source| ConfigError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })
}

use serde::Serialize;

/// Reason recorded for tables rejected by the table filter pattern
pub const TABLE_FILTERED_REASON: &str = "Table pattern not allowed";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusEntry {
    pub name: String,
    pub reason: String,
}

/// Running tally of what a source produced, skipped and failed on
#[derive(Debug, Clone, Default, Serialize)]
pub struct SourceStatus {
    pub success: Vec<String>,
    pub filtered: Vec<StatusEntry>,
    pub warnings: Vec<StatusEntry>,
    pub failures: Vec<StatusEntry>,
}

impl SourceStatus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an entity that was read successfully
    pub fn scanned(&mut self, name: impl Into<String>) {
        self.success.push(name.into());
    }

    /// Record an entity skipped by a filter
    pub fn filter(&mut self, name: impl Into<String>, reason: impl Into<String>) {
        self.filtered.push(StatusEntry {
            name: name.into(),
            reason: reason.into(),
        });
    }

    pub fn warning(&mut self, name: impl Into<String>, reason: impl Into<String>) {
        self.warnings.push(StatusEntry {
            name: name.into(),
            reason: reason.into(),
        });
    }

    pub fn failure(&mut self, name: impl Into<String>, reason: impl Into<String>) {
        self.failures.push(StatusEntry {
            name: name.into(),
            reason: reason.into(),
        });
    }

    pub fn is_filtered(&self, name: &str) -> bool {
        self.filtered.iter().any(|entry| entry.name == name)
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    /// Total number of entities the source looked at
    pub fn total_seen(&self) -> usize {
        self.success.len() + self.filtered.len() + self.failures.len()
    }
}

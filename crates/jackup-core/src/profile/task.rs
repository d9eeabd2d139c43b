//! Task records and the task model used by the orchestrator

use serde::{Deserialize, Serialize};

/// A task as stored in a profile file.
///
/// Optional fields may be absent on disk. `priority` is accepted as an alias
/// for `order`, which older profiles used.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub source: String,
    pub destination: String,
    #[serde(default, alias = "priority", skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub excludes: Vec<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub source_must_be_mounted: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub destination_must_be_mounted: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl TaskRecord {
    pub fn new(source: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
            ..Self::default()
        }
    }

    pub fn with_order(mut self, order: i64) -> Self {
        self.order = Some(order);
        self
    }
}

/// One source-to-destination synchronization unit.
///
/// Built from a [`TaskRecord`] at load time with all defaults applied; the
/// orchestrator treats it as read-only for the duration of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    /// Unique within the owning profile
    pub name: String,
    pub source: String,
    pub destination: String,
    /// Lower runs first
    pub order: i64,
    /// Extra backend options, passed through verbatim
    pub args: Vec<String>,
    /// Patterns excluded from transfer, before ignore-file patterns are merged
    pub excludes: Vec<String>,
    pub source_must_be_mounted: bool,
    pub destination_must_be_mounted: bool,
}

impl Task {
    pub fn new(
        name: impl Into<String>,
        source: impl Into<String>,
        destination: impl Into<String>,
        order: i64,
    ) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
            destination: destination.into(),
            order,
            args: Vec::new(),
            excludes: Vec::new(),
            source_must_be_mounted: false,
            destination_must_be_mounted: false,
        }
    }

    /// Build a task from its stored record. A missing order defaults to 0.
    pub fn from_record(name: impl Into<String>, record: TaskRecord) -> Self {
        Self {
            name: name.into(),
            source: record.source,
            destination: record.destination,
            order: record.order.unwrap_or_default(),
            args: record.args,
            excludes: record.excludes,
            source_must_be_mounted: record.source_must_be_mounted,
            destination_must_be_mounted: record.destination_must_be_mounted,
        }
    }

    pub fn to_record(&self) -> TaskRecord {
        TaskRecord {
            source: self.source.clone(),
            destination: self.destination.clone(),
            order: Some(self.order),
            args: self.args.clone(),
            excludes: self.excludes.clone(),
            source_must_be_mounted: self.source_must_be_mounted,
            destination_must_be_mounted: self.destination_must_be_mounted,
        }
    }

    pub fn with_args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_excludes(mut self, excludes: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.excludes = excludes.into_iter().map(Into::into).collect();
        self
    }

    pub fn source_mounted(mut self) -> Self {
        self.source_must_be_mounted = true;
        self
    }

    pub fn destination_mounted(mut self) -> Self {
        self.destination_must_be_mounted = true;
        self
    }
}

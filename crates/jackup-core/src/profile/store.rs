//! JSON-file profile storage
//!
//! Each profile is `<dir>/<name>.json`, an object mapping task name to a
//! [`TaskRecord`]. Writes go through an atomic, locked replace so a crash
//! never leaves a half-written profile behind.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use jackup_fs::ConfigStore;
use tracing::{debug, info, warn};

use super::{ProfileStore, Task, TaskRecord, validate_name};
use crate::config::Config;
use crate::{Error, Result};

const PROFILE_EXT: &str = "json";

type ProfileMap = BTreeMap<String, TaskRecord>;

/// Changes applied by [`JsonProfileStore::edit_task`]; `None` keeps the
/// current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskEdit {
    pub source: Option<String>,
    pub destination: Option<String>,
    pub order: Option<i64>,
}

impl TaskEdit {
    pub fn is_empty(&self) -> bool {
        self.source.is_none() && self.destination.is_none() && self.order.is_none()
    }
}

/// Profile storage backed by one JSON file per profile.
#[derive(Debug, Clone)]
pub struct JsonProfileStore {
    dir: PathBuf,
    files: ConfigStore,
    excluded: Option<PathBuf>,
}

impl JsonProfileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            files: ConfigStore::new(),
            excluded: None,
        }
    }

    /// The store for `config.dir`, never treating the config file itself as
    /// a profile.
    pub fn for_config(config: &Config) -> Self {
        Self::new(&config.dir).with_excluded(&config.config_path)
    }

    /// Ignore `path` when it sits in the profile directory.
    pub fn with_excluded(mut self, path: impl Into<PathBuf>) -> Self {
        self.excluded = Some(path.into());
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file backing `name`.
    pub fn profile_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", name, PROFILE_EXT))
    }

    fn is_excluded(&self, path: &Path) -> bool {
        let Some(excluded) = self.excluded.as_deref() else {
            return false;
        };
        if path == excluded {
            return true;
        }
        match (fs::canonicalize(path), fs::canonicalize(excluded)) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        }
    }

    /// Reject a profile name whose file would be the config file.
    fn check_not_config(&self, name: &str) -> Result<()> {
        if self.is_excluded(&self.profile_path(name)) {
            return Err(Error::InvalidName {
                name: name.to_string(),
                reason: "name is taken by the config file".to_string(),
            });
        }
        Ok(())
    }

    fn read_map(&self, name: &str) -> Result<ProfileMap> {
        validate_name(name)?;
        let path = self.profile_path(name);
        if !path.is_file() || self.is_excluded(&path) {
            return Err(Error::ProfileNotFound {
                name: name.to_string(),
            });
        }
        Ok(self.files.load(&path)?)
    }

    fn write_map(&self, name: &str, map: &ProfileMap) -> Result<()> {
        self.files.save(&self.profile_path(name), map)?;
        Ok(())
    }

    /// Add a task, creating the profile if it does not exist yet.
    ///
    /// Without an explicit order the task is placed after every existing
    /// task. Duplicate orders are accepted; ties run in task-name order.
    pub fn add_task(&self, profile: &str, name: &str, mut record: TaskRecord) -> Result<Task> {
        validate_name(profile)?;
        validate_name(name)?;
        self.check_not_config(profile)?;

        let mut map = match self.read_map(profile) {
            Ok(map) => map,
            Err(Error::ProfileNotFound { .. }) => {
                info!(profile, "Creating profile");
                ProfileMap::new()
            }
            Err(e) => return Err(e),
        };

        if map.contains_key(name) {
            return Err(Error::TaskExists {
                profile: profile.to_string(),
                task: name.to_string(),
            });
        }

        let order = match record.order {
            Some(order) => order,
            None => next_order(&map),
        };
        record.order = Some(order);
        warn_on_shared_order(profile, name, order, &map);

        let task = Task::from_record(name, record.clone());
        map.insert(name.to_string(), record);
        self.write_map(profile, &map)?;

        debug!(profile, task = name, order, "Added task");
        Ok(task)
    }

    /// Change fields of an existing task.
    pub fn edit_task(&self, profile: &str, name: &str, edit: TaskEdit) -> Result<Task> {
        let mut map = self.read_map(profile)?;
        let mut record = map.remove(name).ok_or_else(|| Error::TaskNotFound {
            profile: profile.to_string(),
            task: name.to_string(),
        })?;

        if let Some(source) = edit.source {
            record.source = source;
        }
        if let Some(destination) = edit.destination {
            record.destination = destination;
        }
        if let Some(order) = edit.order {
            warn_on_shared_order(profile, name, order, &map);
            record.order = Some(order);
        }

        let task = Task::from_record(name, record.clone());
        map.insert(name.to_string(), record);
        self.write_map(profile, &map)?;

        debug!(profile, task = name, "Edited task");
        Ok(task)
    }

    /// Remove one task. The profile file stays, possibly empty.
    pub fn remove_task(&self, profile: &str, name: &str) -> Result<Task> {
        let mut map = self.read_map(profile)?;
        let record = map.remove(name).ok_or_else(|| Error::TaskNotFound {
            profile: profile.to_string(),
            task: name.to_string(),
        })?;
        self.write_map(profile, &map)?;

        debug!(profile, task = name, "Removed task");
        Ok(Task::from_record(name, record))
    }

    /// Delete a profile and all of its tasks.
    pub fn remove_profile(&self, name: &str) -> Result<()> {
        validate_name(name)?;
        self.check_not_config(name)?;
        let path = self.profile_path(name);
        if !jackup_fs::io::remove_if_present(&path)? {
            return Err(Error::ProfileNotFound {
                name: name.to_string(),
            });
        }
        info!(profile = name, "Removed profile");
        Ok(())
    }
}

fn next_order(map: &ProfileMap) -> i64 {
    map.values()
        .filter_map(|r| r.order)
        .max()
        .map_or(1, |max| max.saturating_add(1))
}

fn warn_on_shared_order(profile: &str, name: &str, order: i64, others: &ProfileMap) {
    let shared: Vec<&str> = others
        .iter()
        .filter(|(other, r)| other.as_str() != name && r.order.unwrap_or_default() == order)
        .map(|(other, _)| other.as_str())
        .collect();
    if !shared.is_empty() {
        warn!(
            profile,
            task = name,
            order,
            ?shared,
            "Order is shared with other tasks; ties run in name order"
        );
    }
}

impl ProfileStore for JsonProfileStore {
    fn exists(&self, name: &str) -> bool {
        if validate_name(name).is_err() {
            return false;
        }
        let path = self.profile_path(name);
        path.is_file() && !self.is_excluded(&path)
    }

    fn load(&self, name: &str) -> Result<Vec<Task>> {
        let map = self.read_map(name)?;
        Ok(map
            .into_iter()
            .map(|(task, record)| Task::from_record(task, record))
            .collect())
    }

    fn list(&self) -> Result<Vec<String>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(jackup_fs::Error::io(&self.dir, e).into()),
        };

        let mut names = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if !path.is_file() || path.extension().is_none_or(|ext| ext != PROFILE_EXT) {
                continue;
            }
            if self.is_excluded(&path) {
                debug!(path = %path.display(), "Skipping config file");
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str())
                && validate_name(stem).is_ok()
            {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }
}

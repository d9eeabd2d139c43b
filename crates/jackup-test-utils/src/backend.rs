//! [`RecordingBackend`] for exercising the orchestrator without rsync.

use std::collections::HashMap;
use std::path::Component;
use std::sync::{Arc, Mutex};

use jackup_core::{BackendOutput, SyncBackend};
use jackup_fs::SyncPath;

/// One recorded call to [`SyncBackend::transfer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub source: String,
    pub destination: String,
    pub options: Vec<String>,
}

type Hook = Arc<dyn Fn(&Invocation) + Send + Sync>;

#[derive(Default)]
struct Script {
    exit_status: HashMap<String, i32>,
    panics: Vec<String>,
}

/// A backend that records every call and answers from a script.
///
/// Calls are matched to script entries by a path component of the source,
/// so with sources laid out as `<profile>/<task>/src` (as [`TestProfiles`]
/// does) the key is the task name. Unscripted calls succeed.
///
/// Clones share the same record, so a test can keep one clone and box the
/// other into an executor.
///
/// [`TestProfiles`]: crate::TestProfiles
#[derive(Clone, Default)]
pub struct RecordingBackend {
    calls: Arc<Mutex<Vec<Invocation>>>,
    script: Arc<Mutex<Script>>,
    hook: Option<Hook>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Exit with `status` when the source has a component named `key`.
    pub fn exit_status_for(self, key: &str, status: i32) -> Self {
        self.script
            .lock()
            .unwrap()
            .exit_status
            .insert(key.to_string(), status);
        self
    }

    /// Panic when the source has a component named `key`.
    pub fn panic_for(self, key: &str) -> Self {
        self.script.lock().unwrap().panics.push(key.to_string());
        self
    }

    /// Run `hook` after each call is recorded.
    pub fn on_transfer(mut self, hook: impl Fn(&Invocation) + Send + Sync + 'static) -> Self {
        self.hook = Some(Arc::new(hook));
        self
    }

    /// Everything recorded so far, in call order.
    pub fn invocations(&self) -> Vec<Invocation> {
        self.calls.lock().unwrap().clone()
    }

    /// Source keys (task names) of every call, in call order.
    pub fn keys(&self) -> Vec<String> {
        self.invocations()
            .iter()
            .filter_map(|call| task_key(&call.source))
            .collect()
    }

    pub fn boxed(&self) -> Box<dyn SyncBackend> {
        Box::new(self.clone())
    }
}

/// The directory above a trailing `src` component, or the last component.
fn task_key(source: &str) -> Option<String> {
    let names: Vec<String> = std::path::Path::new(source)
        .components()
        .filter_map(|c| match c {
            Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    match names.as_slice() {
        [.., key, last] if last == "src" => Some(key.clone()),
        [.., last] => Some(last.clone()),
        [] => None,
    }
}

fn has_component(source: &str, key: &str) -> bool {
    std::path::Path::new(source)
        .components()
        .any(|c| matches!(c, Component::Normal(name) if name == key))
}

impl SyncBackend for RecordingBackend {
    fn name(&self) -> &str {
        "recording"
    }

    fn transfer(
        &self,
        source: &SyncPath,
        destination: &SyncPath,
        options: &[String],
    ) -> std::io::Result<BackendOutput> {
        let call = Invocation {
            source: source.as_str().to_string(),
            destination: destination.as_str().to_string(),
            options: options.to_vec(),
        };
        self.calls.lock().unwrap().push(call.clone());
        if let Some(ref hook) = self.hook {
            hook(&call);
        }

        let (status, panics) = {
            let script = self.script.lock().unwrap();
            let status = script
                .exit_status
                .iter()
                .find(|(key, _)| has_component(&call.source, key))
                .map(|(_, status)| *status)
                .unwrap_or(0);
            let panics = script.panics.iter().any(|key| has_component(&call.source, key));
            (status, panics)
        };
        if panics {
            panic!("recording backend scripted to panic on {}", call.source);
        }

        Ok(BackendOutput {
            exit_status: status,
            diagnostic: if status == 0 {
                String::new()
            } else {
                format!("scripted failure for {}", call.source)
            },
        })
    }
}

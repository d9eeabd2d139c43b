//! Source and destination paths as handed to the sync backend

use std::path::{Path, PathBuf};

/// Where a sync endpoint lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PathKind {
    /// A path on a locally mounted filesystem.
    Local,
    /// A path the backend reaches over the network (`host:path`, `rsync://...`).
    Remote,
}

/// A sync endpoint with home-relative notation already expanded.
///
/// The textual form is preserved exactly otherwise, including any trailing
/// slash, because the backend gives `dir` and `dir/` different meanings.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SyncPath {
    inner: String,
    kind: PathKind,
}

impl SyncPath {
    /// Resolve a raw path, expanding a leading `~` against the user's home.
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self::with_home(raw, dirs::home_dir().as_deref())
    }

    /// Resolve a raw path against an explicit home directory.
    ///
    /// `~user` forms are left untouched, as is everything when `home` is `None`.
    pub fn with_home(raw: impl AsRef<str>, home: Option<&Path>) -> Self {
        let raw = raw.as_ref();
        let kind = classify(raw);

        let inner = match (kind, home) {
            (PathKind::Local, Some(home)) => expand_tilde(raw, home),
            _ => raw.to_string(),
        };

        Self { inner, kind }
    }

    /// The path as it will be passed to the backend.
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    pub fn kind(&self) -> PathKind {
        self.kind
    }

    pub fn is_remote(&self) -> bool {
        self.kind == PathKind::Remote
    }

    /// Convert to a native path for local filesystem checks.
    pub fn to_native(&self) -> PathBuf {
        PathBuf::from(&self.inner)
    }

    /// Whether the path exists locally. Remote paths always report `false`.
    pub fn exists(&self) -> bool {
        self.kind == PathKind::Local && self.to_native().exists()
    }

    /// Whether the path is a directory on the local filesystem.
    pub fn is_dir(&self) -> bool {
        self.kind == PathKind::Local && self.to_native().is_dir()
    }
}

fn expand_tilde(raw: &str, home: &Path) -> String {
    if raw == "~" {
        return home.to_string_lossy().into_owned();
    }
    match raw.strip_prefix("~/") {
        Some(rest) => home.join(rest).to_string_lossy().into_owned(),
        None => raw.to_string(),
    }
}

/// Classify a path the way rsync does: a colon before any slash means a
/// remote shell or daemon address.
fn classify(raw: &str) -> PathKind {
    if raw.starts_with("rsync://") {
        return PathKind::Remote;
    }
    match raw.find(':') {
        Some(colon) if colon > 0 && !raw[..colon].contains('/') => PathKind::Remote,
        _ => PathKind::Local,
    }
}

impl AsRef<str> for SyncPath {
    fn as_ref(&self) -> &str {
        &self.inner
    }
}

impl std::fmt::Display for SyncPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl From<&str> for SyncPath {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for SyncPath {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

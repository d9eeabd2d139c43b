//! The external transfer tool
//!
//! The orchestrator hands a backend `(source, destination, options)` and gets
//! back an exit status and diagnostic text. [`RsyncBackend`] drives `rsync`.

use std::path::PathBuf;
use std::process::{Command, Stdio};

use jackup_fs::SyncPath;
use tracing::debug;

use crate::config::Config;

/// What a backend invocation reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendOutput {
    /// Process exit status; `-1` when the process was killed by a signal
    pub exit_status: i32,
    /// Captured error stream, trimmed
    pub diagnostic: String,
}

impl BackendOutput {
    pub fn success(&self) -> bool {
        self.exit_status == 0
    }
}

/// A tool that mirrors one directory tree onto another.
pub trait SyncBackend {
    /// Short name used in diagnostics.
    fn name(&self) -> &str;

    /// Perform one transfer. An `Err` means the tool could not be run at all.
    fn transfer(
        &self,
        source: &SyncPath,
        destination: &SyncPath,
        options: &[String],
    ) -> std::io::Result<BackendOutput>;
}

/// Options always passed to rsync, ahead of task options.
const RSYNC_BASE_ARGS: &[&str] = &[
    "--partial",
    "--info=BACKUP,COPY,DEL,FLIST2,PROGRESS2,REMOVE,MISC2,STATS1,SYMSAFE",
    "--human-readable",
    "--recursive",
    "--links",
    "--perms",
    "--times",
    "--group",
    "--owner",
    "--devices",
    "--specials",
    "--executability",
    "--new-compress",
];

/// Runs `rsync` as a child process.
///
/// Progress output goes straight to the terminal; the error stream is
/// captured and returned as the diagnostic.
#[derive(Debug, Clone)]
pub struct RsyncBackend {
    program: String,
    log_path: Option<PathBuf>,
}

impl RsyncBackend {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            log_path: None,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.rsync.clone()).with_log_file(config.log_path.clone())
    }

    /// Have rsync append its own transfer log to `path`.
    pub fn with_log_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_path = Some(path.into());
        self
    }

    /// Full argument list for one transfer, without the program name.
    pub fn arguments(&self, source: &SyncPath, destination: &SyncPath, options: &[String]) -> Vec<String> {
        let mut args = Vec::with_capacity(RSYNC_BASE_ARGS.len() + options.len() + 3);
        if let Some(ref log) = self.log_path {
            args.push(format!("--log-file={}", log.display()));
        }
        args.extend(RSYNC_BASE_ARGS.iter().map(|a| a.to_string()));
        args.extend(options.iter().cloned());
        args.push(source.as_str().to_string());
        args.push(destination.as_str().to_string());
        args
    }
}

impl SyncBackend for RsyncBackend {
    fn name(&self) -> &str {
        &self.program
    }

    fn transfer(
        &self,
        source: &SyncPath,
        destination: &SyncPath,
        options: &[String],
    ) -> std::io::Result<BackendOutput> {
        let args = self.arguments(source, destination, options);
        debug!(program = %self.program, ?args, "Running backend");

        let output = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::piped())
            .output()?;

        Ok(BackendOutput {
            exit_status: output.status.code().unwrap_or(-1),
            diagnostic: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn arguments_put_endpoints_last() {
        let backend = RsyncBackend::new("rsync").with_log_file("/tmp/jackup.log");
        let args = backend.arguments(
            &SyncPath::from("/src/"),
            &SyncPath::from("nas:/backup"),
            &["--delete".to_string(), "--exclude=*.tmp".to_string()],
        );

        assert_eq!(args.first().unwrap(), "--log-file=/tmp/jackup.log");
        assert_eq!(
            &args[args.len() - 4..],
            &["--delete", "--exclude=*.tmp", "/src/", "nas:/backup"]
        );
        assert!(args.contains(&"--partial".to_string()));
    }

    #[test]
    fn missing_program_is_an_io_error() {
        let backend = RsyncBackend::new("/nonexistent/jackup-test-rsync");
        let result = backend.transfer(&SyncPath::from("/a"), &SyncPath::from("/b"), &[]);
        assert!(result.is_err());
    }

    #[cfg(unix)]
    fn script(dir: &std::path::Path, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join("fake-rsync");
        std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[cfg(unix)]
    #[test]
    fn nonzero_exit_and_stderr_are_reported() {
        let temp = tempfile::TempDir::new().unwrap();
        let program = script(temp.path(), "echo 'rsync: change_dir failed' >&2\nexit 23");
        let backend = RsyncBackend::new(program.to_string_lossy());

        let output = backend
            .transfer(&SyncPath::from("/a"), &SyncPath::from("/b"), &[])
            .unwrap();

        assert!(!output.success());
        assert_eq!(output.exit_status, 23);
        assert_eq!(output.diagnostic, "rsync: change_dir failed");
    }

    #[cfg(unix)]
    #[test]
    fn zero_exit_is_success_even_when_nothing_moved() {
        let temp = tempfile::TempDir::new().unwrap();
        let program = script(temp.path(), "exit 0");
        let backend = RsyncBackend::new(program.to_string_lossy());

        let output = backend
            .transfer(&SyncPath::from("/a"), &SyncPath::from("/b"), &[])
            .unwrap();

        assert!(output.success());
        assert!(output.diagnostic.is_empty());
    }
}

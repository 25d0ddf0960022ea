//! Unit process invocation.
//!
//! Runs one unit to completion, capturing stdout and stderr on reader
//! threads so a chatty unit cannot block on a full pipe. With a timeout,
//! the whole process group is killed when the limit is exceeded.

use std::ffi::OsStr;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use super::{RunContext, Status};
use crate::error::{FleetcheckError, Result};
use crate::plugin::Plugin;

/// How a unit process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawExit {
    /// Normal exit with a code.
    Code(i32),
    /// Terminated by a signal.
    Signal(i32),
    /// Killed after exceeding the run's timeout.
    TimedOut,
    /// Exit status could not be interpreted.
    Unknown,
    /// The adapter decided the outcome without a process exit to classify.
    Decided(Status),
}

/// Raw outcome of running a unit, before classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResult {
    pub exit: RawExit,
    pub stdout: String,
    pub stderr: String,
}

impl RawResult {
    /// An outcome decided by the adapter itself.
    pub fn decided(status: Status, stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            exit: RawExit::Decided(status),
            stdout: stdout.into(),
            stderr: stderr.into(),
        }
    }
}

/// Process-level settings for one invocation.
#[derive(Debug, Clone, Default)]
pub struct Invocation {
    /// Variables added to the inherited environment.
    pub env: Vec<(String, String)>,

    /// Working directory.
    pub cwd: Option<PathBuf>,

    /// Kill the unit after this long.
    pub timeout: Option<Duration>,
}

impl Invocation {
    /// Serialize the run context for one unit.
    pub fn for_plugin(plugin: &Plugin, ctx: &RunContext) -> Self {
        Self {
            env: ctx.env_for(plugin),
            cwd: None,
            timeout: ctx.timeout,
        }
    }
}

/// Run `program` with `args` and wait for it.
///
/// Returns an error only when the process cannot be spawned or waited on.
pub fn run_process<S: AsRef<OsStr>>(
    program: &Path,
    args: &[S],
    invocation: &Invocation,
) -> Result<RawResult> {
    let mut cmd = Command::new(program);
    cmd.args(args);
    cmd.envs(invocation.env.iter().map(|(k, v)| (k.as_str(), v.as_str())));
    cmd.stdin(Stdio::null());
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());

    if let Some(cwd) = &invocation.cwd {
        cmd.current_dir(cwd);
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        cmd.process_group(0);
    }

    let mut child = cmd.spawn().map_err(|e| FleetcheckError::Execution {
        plugin: program.display().to_string(),
        message: e.to_string(),
    })?;

    let stdout = child.stdout.take();
    let stderr = child.stderr.take();
    let stdout_handle = thread::spawn(move || read_all(stdout));
    let stderr_handle = thread::spawn(move || read_all(stderr));

    let waited = wait_with_timeout(&mut child, invocation.timeout);

    let stdout = stdout_handle.join().unwrap_or_default();
    let stderr = stderr_handle.join().unwrap_or_default();

    let exit = match waited {
        Ok(Some(status)) => exit_of(status),
        Ok(None) => RawExit::TimedOut,
        Err(e) => {
            return Err(FleetcheckError::Execution {
                plugin: program.display().to_string(),
                message: e.to_string(),
            })
        }
    };

    Ok(RawResult {
        exit,
        stdout,
        stderr,
    })
}

fn read_all<R: Read>(source: Option<R>) -> String {
    let mut buf = Vec::new();
    if let Some(mut reader) = source {
        if let Err(e) = reader.read_to_end(&mut buf) {
            tracing::debug!("Output capture stopped after {} bytes: {}", buf.len(), e);
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

/// Wait for the child; `Ok(None)` means it was killed on timeout.
fn wait_with_timeout(
    child: &mut Child,
    timeout: Option<Duration>,
) -> std::io::Result<Option<ExitStatus>> {
    let Some(limit) = timeout else {
        return child.wait().map(Some);
    };

    let started = Instant::now();
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if started.elapsed() > limit {
            kill_tree(child);
            let _ = child.wait();
            return Ok(None);
        }
        thread::sleep(Duration::from_millis(10));
    }
}

fn kill_tree(child: &mut Child) {
    #[cfg(unix)]
    {
        if let Ok(pid) = i32::try_from(child.id()) {
            // SAFETY: kill() only sends a signal; the child leads its own
            // process group (see `process_group(0)`)
            unsafe {
                libc::kill(-pid, libc::SIGKILL);
            }
        }
    }
    let _ = child.kill();
}

fn exit_of(status: ExitStatus) -> RawExit {
    if let Some(code) = status.code() {
        return RawExit::Code(code);
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return RawExit::Signal(signal);
        }
    }

    RawExit::Unknown
}

/// Check if a path is an executable file.
pub fn is_executable(path: &Path) -> bool {
    let Ok(metadata) = path.metadata() else {
        return false;
    };
    if !metadata.is_file() {
        return false;
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        metadata.permissions().mode() & 0o111 != 0
    }

    #[cfg(not(unix))]
    {
        true
    }
}

/// Locate a binary on `PATH`.
pub fn which(binary: &str) -> Option<PathBuf> {
    let candidate = Path::new(binary);
    if candidate.components().count() > 1 {
        return is_executable(candidate).then(|| candidate.to_path_buf());
    }

    let paths = std::env::var_os("PATH")?;
    std::env::split_paths(&paths)
        .map(|dir| dir.join(binary))
        .find(|path| is_executable(path))
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::TempDir;

    fn script(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, body).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[test]
    fn captures_output_and_exit_code() {
        let temp = TempDir::new().unwrap();
        let path = script(
            temp.path(),
            "check.sh",
            "#!/bin/sh\necho out\necho err >&2\nexit 7\n",
        );

        let result = run_process::<&str>(&path, &[], &Invocation::default()).unwrap();

        assert_eq!(result.exit, RawExit::Code(7));
        assert_eq!(result.stdout.trim(), "out");
        assert_eq!(result.stderr.trim(), "err");
    }

    #[test]
    fn passes_environment() {
        let temp = TempDir::new().unwrap();
        let path = script(temp.path(), "env.sh", "#!/bin/sh\necho \"$MY_VAR\"\n");
        let invocation = Invocation {
            env: vec![("MY_VAR".into(), "my_value".into())],
            ..Default::default()
        };

        let result = run_process::<&str>(&path, &[], &invocation).unwrap();

        assert_eq!(result.stdout.trim(), "my_value");
    }

    #[test]
    fn spawn_failure_is_an_error() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("missing.sh");
        let err = run_process::<&str>(&missing, &[], &Invocation::default()).unwrap_err();
        assert!(matches!(err, FleetcheckError::Execution { .. }));
    }

    #[test]
    fn timeout_kills_unit() {
        let temp = TempDir::new().unwrap();
        let path = script(temp.path(), "hang.sh", "#!/bin/sh\nsleep 30\n");
        let invocation = Invocation {
            timeout: Some(Duration::from_millis(200)),
            ..Default::default()
        };

        let started = Instant::now();
        let result = run_process::<&str>(&path, &[], &invocation).unwrap();

        assert_eq!(result.exit, RawExit::TimedOut);
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[test]
    fn signal_exit_is_reported() {
        let temp = TempDir::new().unwrap();
        let path = script(temp.path(), "die.sh", "#!/bin/sh\nkill -9 $$\n");

        let result = run_process::<&str>(&path, &[], &Invocation::default()).unwrap();

        assert_eq!(result.exit, RawExit::Signal(9));
    }

    #[test]
    fn executable_bit_detection() {
        let temp = TempDir::new().unwrap();
        let exec = script(temp.path(), "x.sh", "#!/bin/sh\n");
        let plain = temp.path().join("plain.txt");
        fs::write(&plain, "data").unwrap();

        assert!(is_executable(&exec));
        assert!(!is_executable(&plain));
        assert!(!is_executable(temp.path()));
    }

    #[test]
    fn which_finds_sh() {
        assert!(which("sh").is_some());
        assert!(which("definitely-not-a-real-binary-name").is_none());
    }

    struct Truncated(bool);

    impl Read for Truncated {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if std::mem::replace(&mut self.0, true) {
                return Err(std::io::Error::other("pipe broke"));
            }
            buf[..4].copy_from_slice(b"half");
            Ok(4)
        }
    }

    #[test]
    fn read_error_keeps_partial_output() {
        assert_eq!(read_all(Some(Truncated(false))), "half");
        assert_eq!(read_all::<Truncated>(None), "");
    }
}

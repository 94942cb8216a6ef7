use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command as Process;
use tokio::task::JoinHandle;

use crate::error::CommandError;
use crate::plan::Command;

use super::io_pump::{pump_stderr, pump_stdout, FileSink, SinkRegistry};

/// A leaf command bound to its shell invocation and output sinks.
///
/// The working directory is handed to the spawned process, the runner's own
/// current directory is never changed, so any number of runners may execute
/// at once.
#[derive(Debug)]
pub struct CommandRunner {
    argv: Vec<String>,
    working_dir: Option<PathBuf>,
    stdout_sink: Option<FileSink>,
    stderr_sink: Option<FileSink>,
}

impl CommandRunner {
    /// Build the invocation and prepare output files.
    ///
    /// Each requested output file needs a writable directory. The registry
    /// truncates an existing file the first time its path is claimed, so a
    /// run starts from an empty file and later steps append to it.
    pub fn prepare(
        command: &Command,
        shell: &str,
        sinks: &SinkRegistry,
    ) -> Result<Self, CommandError> {
        let meta = &command.meta;
        let working_dir = meta.working_dir.clone();

        let stdout_sink = match meta.out_file.as_deref() {
            Some(file) => Some(claim_file(sinks, meta.working_dir(), file)?),
            None => None,
        };
        let stderr_sink = match meta.err_file.as_deref() {
            Some(file) => Some(claim_file(sinks, meta.working_dir(), file)?),
            None => None,
        };

        Ok(Self {
            argv: vec![shell.to_string(), "-c".to_string(), command.cmd.clone()],
            working_dir,
            stdout_sink,
            stderr_sink,
        })
    }

    pub fn argv(&self) -> &[String] {
        &self.argv
    }

    pub fn working_dir(&self) -> Option<&Path> {
        self.working_dir.as_deref()
    }

    /// Run to completion. Output goes to the console and, when configured,
    /// is appended to the output files as well.
    #[tracing::instrument(name = "command.run", skip(self), fields(cmd = %self.argv[2]))]
    pub async fn run(&self) -> Result<(), CommandError> {
        let mut process = Process::new(&self.argv[0]);
        process
            .args(&self.argv[1..])
            .stdin(Stdio::null())
            .stdout(stream_mode(&self.stdout_sink))
            .stderr(stream_mode(&self.stderr_sink));
        if let Some(dir) = &self.working_dir {
            process.current_dir(dir);
        }

        let mut child = process.spawn().map_err(|source| CommandError::Spawn {
            argv: self.argv.clone(),
            dir: self.dir_label(),
            source,
        })?;
        tracing::debug!(pid = ?child.id(), "spawned");

        let out_pump = match (child.stdout.take(), &self.stdout_sink) {
            (Some(rd), Some(sink)) => Some((pump_stdout(rd, sink.clone()), sink)),
            _ => None,
        };
        let err_pump = match (child.stderr.take(), &self.stderr_sink) {
            (Some(rd), Some(sink)) => Some((pump_stderr(rd, sink.clone()), sink)),
            _ => None,
        };

        let status = child.wait().await.map_err(|source| CommandError::Spawn {
            argv: self.argv.clone(),
            dir: self.dir_label(),
            source,
        })?;

        if let Some((handle, sink)) = out_pump {
            self.join_pump(handle, "stdout", sink).await?;
        }
        if let Some((handle, sink)) = err_pump {
            self.join_pump(handle, "stderr", sink).await?;
        }

        if !status.success() {
            return Err(CommandError::Failed {
                argv: self.argv.clone(),
                dir: self.dir_label(),
                status,
            });
        }

        Ok(())
    }

    pub fn report_start(&self) {
        println!("# ... START {:?} {:?}", self.argv, self.dir_label());
    }

    pub fn report_end(&self, error: Option<&CommandError>, elapsed: Duration) {
        match error {
            None => println!("# ... END {:?} {:?}", self.argv, self.dir_label()),
            Some(e) => println!("# ... FAILED {:?} {:?}: {e}", self.argv, self.dir_label()),
        }
        tracing::info!(
            cmd = %self.argv[2],
            elapsed_ms = elapsed.as_millis() as u64,
            ok = error.is_none(),
            "command finished"
        );
    }

    async fn join_pump(
        &self,
        handle: JoinHandle<std::io::Result<u64>>,
        stream: &'static str,
        sink: &FileSink,
    ) -> Result<(), CommandError> {
        let sink_error = |source| CommandError::Sink {
            argv: self.argv.clone(),
            stream,
            path: sink.path().to_path_buf(),
            source,
        };

        match handle.await {
            Ok(Ok(bytes)) => {
                tracing::trace!(stream, bytes, "stream drained");
                Ok(())
            }
            Ok(Err(e)) => Err(sink_error(e)),
            Err(join) => Err(sink_error(std::io::Error::new(
                std::io::ErrorKind::Other,
                join.to_string(),
            ))),
        }
    }

    /// Directory shown in reports; empty when the process default is used.
    fn dir_label(&self) -> PathBuf {
        self.working_dir.clone().unwrap_or_default()
    }
}

fn stream_mode(sink: &Option<FileSink>) -> Stdio {
    if sink.is_some() {
        Stdio::piped()
    } else {
        Stdio::inherit()
    }
}

/// Check the directory an output file lives in and claim its sink.
fn claim_file(
    sinks: &SinkRegistry,
    working_dir: Option<&Path>,
    file: &Path,
) -> Result<FileSink, CommandError> {
    let dir = working_dir.unwrap_or_else(|| Path::new("."));
    check_writable_dir(dir)?;

    let precondition = |reason: String| CommandError::Precondition {
        dir: dir.to_path_buf(),
        reason,
    };
    let full_path = sink_path(&dir.join(file))
        .map_err(|e| precondition(format!("cannot resolve {}: {e}", file.display())))?;

    sinks
        .claim(full_path.clone())
        .map_err(|e| precondition(format!("cannot truncate {}: {e}", full_path.display())))
}

/// One spelling per file: the canonical parent directory plus the file name,
/// so `run.log` and `sub/../run.log` share a sink.
fn sink_path(joined: &Path) -> std::io::Result<PathBuf> {
    let name = joined.file_name().ok_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::InvalidInput, "not a file name")
    })?;
    let parent = match joined.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    Ok(parent.canonicalize()?.join(name))
}

fn check_writable_dir(dir: &Path) -> Result<(), CommandError> {
    let reason = match std::fs::metadata(dir) {
        Ok(m) if !m.is_dir() => "not a directory".to_string(),
        Ok(_) => match writable(dir) {
            Ok(()) => return Ok(()),
            Err(reason) => reason,
        },
        Err(e) => e.to_string(),
    };

    Err(CommandError::Precondition {
        dir: dir.to_path_buf(),
        reason,
    })
}

/// Whether this process may create files in `dir`.
#[cfg(unix)]
fn writable(dir: &Path) -> Result<(), String> {
    use nix::unistd::{access, AccessFlags};

    access(dir, AccessFlags::W_OK).map_err(|errno| errno.desc().to_string())
}

#[cfg(not(unix))]
fn writable(dir: &Path) -> Result<(), String> {
    match std::fs::metadata(dir) {
        Ok(m) if m.permissions().readonly() => Err("directory is read-only".to_string()),
        Ok(_) => Ok(()),
        Err(e) => Err(e.to_string()),
    }
}

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// Append-only output file shared by every command redirected to it.
#[derive(Debug, Clone)]
pub struct FileSink {
    path: PathBuf,
    lock: Arc<Mutex<()>>,
}

impl FileSink {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Open in append mode, write, close. Writers to the same path take turns.
    pub async fn append(&self, data: &[u8]) -> std::io::Result<()> {
        let _guard = self.lock.lock().await;
        let mut f = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        f.write_all(data).await?;
        f.flush().await
    }
}

/// Hands out one [`FileSink`] per output path so concurrent appends serialize.
#[derive(Debug, Clone, Default)]
pub struct SinkRegistry {
    locks: Arc<std::sync::Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>>,
}

impl SinkRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sink for `path`. The first claim truncates an existing file, so every
    /// path starts empty once per registry and collects the whole run after.
    pub fn claim(&self, path: PathBuf) -> std::io::Result<FileSink> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        let lock = match locks.get(&path) {
            Some(lock) => Arc::clone(lock),
            None => {
                truncate_existing(&path)?;
                let lock = Arc::new(Mutex::new(()));
                locks.insert(path.clone(), Arc::clone(&lock));
                lock
            }
        };
        Ok(FileSink { path, lock })
    }
}

fn truncate_existing(path: &Path) -> std::io::Result<()> {
    match std::fs::OpenOptions::new()
        .write(true)
        .truncate(true)
        .open(path)
    {
        Ok(_) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

pub fn pump_stdout<R>(rd: R, sink: FileSink) -> JoinHandle<std::io::Result<u64>>
where
    R: tokio::io::AsyncRead + Unpin + Send + 'static,
{
    pump(rd, tokio::io::stdout(), sink)
}

pub fn pump_stderr<R>(rd: R, sink: FileSink) -> JoinHandle<std::io::Result<u64>>
where
    R: tokio::io::AsyncRead + Unpin + Send + 'static,
{
    pump(rd, tokio::io::stderr(), sink)
}

/// Copy a child stream to the console and append it to `sink`.
///
/// After a write failure the stream is still drained so the child never
/// blocks on a full pipe; the first failure is returned at EOF.
fn pump<R, W>(mut rd: R, mut console: W, sink: FileSink) -> JoinHandle<std::io::Result<u64>>
where
    R: tokio::io::AsyncRead + Unpin + Send + 'static,
    W: tokio::io::AsyncWrite + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut buf = vec![0u8; 16 * 1024];
        let mut total = 0u64;
        let mut failure: Option<std::io::Error> = None;

        loop {
            let n = rd.read(&mut buf).await?;
            if n == 0 {
                break;
            }
            total += n as u64;

            if failure.is_some() {
                continue;
            }
            if let Err(e) = write_chunk(&mut console, &sink, &buf[..n]).await {
                tracing::warn!(path = %sink.path().display(), error = %e, "output sink failed");
                failure = Some(e);
            }
        }

        match failure {
            Some(e) => Err(e),
            None => Ok(total),
        }
    })
}

async fn write_chunk<W>(console: &mut W, sink: &FileSink, chunk: &[u8]) -> std::io::Result<()>
where
    W: tokio::io::AsyncWrite + Unpin,
{
    console.write_all(chunk).await?;
    console.flush().await?;
    sink.append(chunk).await
}

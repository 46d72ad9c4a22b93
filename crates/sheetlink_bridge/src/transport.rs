//! Child-process transport to the Excel SQL engine.
//!
//! One engine process per invocation. The process receives the workbook
//! directory as its only command-line argument, then a single JSON
//! request line plus a `quit` line on stdin. We wait for it to exit,
//! bounded by the timeout, and hand back decoded stdout/stderr.
//!
//! Cleanup guarantees: the child is spawned with `kill_on_drop`, so a
//! caller that stops awaiting still gets the process killed; the timeout
//! path additionally kills and reaps explicitly before returning.

use crate::error::BridgeError;
use async_trait::async_trait;
use sheetlink_protocol::defaults::{DEFAULT_ENGINE_TIMEOUT_SECS, QUIT_LINE};
use sheetlink_protocol::EngineRequest;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, error, info, warn};

/// Raw engine output, decoded but not yet interpreted.
#[derive(Debug, Clone)]
pub struct RawEngineOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Seam between the tool dispatcher and the engine process.
///
/// Tools talk to this trait so tests can count or script invocations
/// without spawning anything.
#[async_trait]
pub trait EngineTransport: Send + Sync {
    async fn invoke(
        &self,
        request: &EngineRequest,
        workbook_dir: &Path,
    ) -> Result<RawEngineOutput, BridgeError>;
}

/// How the transport finds the engine binary.
#[derive(Debug, Clone)]
enum EngineLocation {
    /// Probe the candidate layouts under this install root on every call,
    /// so an engine built after server start is still picked up.
    Probe(PathBuf),
    /// Fixed path, no probing. Used by tests and the one-shot CLI.
    Explicit(PathBuf),
}

/// The production [`EngineTransport`]: spawns the engine executable.
#[derive(Debug, Clone)]
pub struct ChildProcessTransport {
    location: EngineLocation,
    timeout: Duration,
}

impl ChildProcessTransport {
    /// Transport probing the default install root with the default timeout.
    pub fn new() -> Self {
        Self::with_install_root(crate::locate::default_install_root())
    }

    /// Transport probing a specific install root.
    pub fn with_install_root(install_root: PathBuf) -> Self {
        Self {
            location: EngineLocation::Probe(install_root),
            timeout: Duration::from_secs(DEFAULT_ENGINE_TIMEOUT_SECS),
        }
    }

    /// Transport running a fixed executable, skipping the probe.
    pub fn with_executable(executable: PathBuf) -> Self {
        Self {
            location: EngineLocation::Explicit(executable),
            timeout: Duration::from_secs(DEFAULT_ENGINE_TIMEOUT_SECS),
        }
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn resolve_executable(&self) -> Result<PathBuf, BridgeError> {
        match &self.location {
            EngineLocation::Probe(root) => crate::locate::locate_engine(root),
            EngineLocation::Explicit(path) => {
                if path.is_file() {
                    Ok(path.clone())
                } else {
                    Err(BridgeError::EngineNotFound(path.clone()))
                }
            }
        }
    }
}

impl Default for ChildProcessTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EngineTransport for ChildProcessTransport {
    async fn invoke(
        &self,
        request: &EngineRequest,
        workbook_dir: &Path,
    ) -> Result<RawEngineOutput, BridgeError> {
        let executable = self.resolve_executable()?;
        let request_line = request.to_wire_line()?;

        info!(
            "Starting engine: {} {}",
            executable.display(),
            workbook_dir.display()
        );
        debug!("Engine request: {}", request_line);

        let mut child = Command::new(&executable)
            .arg(workbook_dir)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        // One request line, then `quit` so the engine exits on its own.
        // Closing stdin afterwards covers engines that read to EOF instead.
        if let Some(mut stdin) = child.stdin.take() {
            let input = format!("{request_line}\n{QUIT_LINE}\n");
            stdin.write_all(input.as_bytes()).await?;
            stdin.shutdown().await?;
        }

        let stdout_pipe = child.stdout.take();
        let stderr_pipe = child.stderr.take();
        let stdout_task = tokio::spawn(drain_pipe(stdout_pipe));
        let stderr_task = tokio::spawn(drain_pipe(stderr_pipe));

        let status = match tokio::time::timeout(self.timeout, child.wait()).await {
            Ok(status) => status?,
            Err(_) => {
                warn!(
                    "Engine exceeded {}s timeout, killing pid {:?}",
                    self.timeout.as_secs(),
                    child.id()
                );
                let _ = child.start_kill();
                let _ = child.wait().await;
                return Err(BridgeError::Timeout(self.timeout.as_secs()));
            }
        };

        let stdout_bytes = stdout_task.await.unwrap_or_default();
        let stderr_bytes = stderr_task.await.unwrap_or_default();

        let stdout = String::from_utf8_lossy(&stdout_bytes).into_owned();
        let stderr = String::from_utf8_lossy(&stderr_bytes).into_owned();

        if !status.success() {
            warn!("Engine exited with {status}");
        }
        if !stderr.is_empty() {
            error!("Engine stderr: {}", stderr.trim_end());
            log_legacy_decode(&stderr, &stderr_bytes);
        }
        debug!("Engine stdout ({} bytes)", stdout.len());

        Ok(RawEngineOutput { stdout, stderr })
    }
}

async fn drain_pipe<R>(pipe: Option<R>) -> Vec<u8>
where
    R: tokio::io::AsyncRead + Unpin,
{
    use tokio::io::AsyncReadExt;
    let mut buf = Vec::new();
    if let Some(mut pipe) = pipe {
        let _ = pipe.read_to_end(&mut buf).await;
    }
    buf
}

/// When the lossy UTF-8 decode of stderr shows replacement characters the
/// engine was probably writing a legacy regional codepage. Re-decode as
/// GBK for the diagnostic log only; stdout handling is unaffected.
fn log_legacy_decode(stderr: &str, stderr_bytes: &[u8]) {
    if !stderr.contains('\u{FFFD}') {
        return;
    }
    let (decoded, _, had_errors) = encoding_rs::GBK.decode(stderr_bytes);
    if !had_errors {
        error!("Engine stderr (GBK): {}", decoded.trim_end());
    }
}

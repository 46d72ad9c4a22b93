//! Server configuration and the shared workbook directory.

use sheetlink_protocol::defaults::{DEFAULT_ENGINE_TIMEOUT_SECS, DEFAULT_WORKBOOK_DIR};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

/// MCP server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server name reported in initialize.
    pub server_name: String,

    /// Server version reported in initialize.
    pub server_version: String,

    /// Workbook directory used until a caller sets one.
    pub default_workbook_dir: PathBuf,

    /// Seconds to wait for the engine before killing it.
    pub engine_timeout_secs: u64,

    /// Fixed engine executable path. When unset the engine is located by
    /// probing the install-root candidates on every call.
    pub engine_executable: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            server_name: "sheetlink".to_string(),
            server_version: env!("CARGO_PKG_VERSION").to_string(),
            default_workbook_dir: PathBuf::from(DEFAULT_WORKBOOK_DIR),
            engine_timeout_secs: DEFAULT_ENGINE_TIMEOUT_SECS,
            engine_executable: None,
        }
    }
}

/// The workbook directory handed to each engine invocation.
///
/// Shared by every call, written only by `set_excel_directory`. A write
/// racing an in-flight call may change which directory that call's
/// engine receives; last write wins. Validation happens at set-time
/// only, so a directory deleted afterwards surfaces as an engine
/// failure, not a bridge error.
#[derive(Debug, Clone)]
pub struct WorkbookDir {
    inner: Arc<RwLock<PathBuf>>,
}

impl WorkbookDir {
    pub fn new(initial: impl Into<PathBuf>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(initial.into())),
        }
    }

    pub async fn get(&self) -> PathBuf {
        self.inner.read().await.clone()
    }

    /// Point at a new directory. Rejects paths that do not name an
    /// existing directory.
    pub async fn set(&self, dir: &str) -> Result<(), String> {
        if dir.is_empty() {
            return Err("directory must not be empty".to_string());
        }
        let path = Path::new(dir);
        if !path.exists() {
            return Err(format!("directory '{dir}' does not exist"));
        }
        if !path.is_dir() {
            return Err(format!("'{dir}' is not a directory"));
        }
        *self.inner.write().await = path.to_path_buf();
        info!("Workbook directory set to {dir}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_rejects_missing_directory() {
        let dir = WorkbookDir::new("./XLSX");
        let err = dir.set("/definitely/not/here").await.unwrap_err();
        assert!(err.contains("does not exist"));
        assert_eq!(dir.get().await, PathBuf::from("./XLSX"));
    }

    #[tokio::test]
    async fn test_set_rejects_file() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        let dir = WorkbookDir::new("./XLSX");
        let err = dir
            .set(tmp.path().to_str().unwrap())
            .await
            .unwrap_err();
        assert!(err.contains("is not a directory"));
    }

    #[tokio::test]
    async fn test_set_updates_value() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = WorkbookDir::new("./XLSX");
        dir.set(tmp.path().to_str().unwrap()).await.unwrap();
        assert_eq!(dir.get().await, tmp.path());
    }
}

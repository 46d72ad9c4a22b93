//! Engine executable resolution.
//!
//! The engine is distributed next to the server in one of a few known
//! layouts. Candidates are probed in order; the first existing file wins.

use crate::error::BridgeError;
use sheetlink_protocol::defaults::{ENGINE_BUILD_OUTPUT_PATH, ENGINE_EXE_NAME};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Install root used when none is configured: the directory holding the
/// running server binary, falling back to the current directory.
pub fn default_install_root() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Probe the candidate locations under `install_root` for the engine.
///
/// Order: the install root itself, the nested build-output path, then the
/// same build-output path one directory level up. Fails with
/// [`BridgeError::EngineNotFound`] naming the last probed path.
pub fn locate_engine(install_root: &Path) -> Result<PathBuf, BridgeError> {
    let parent = install_root.parent().unwrap_or(install_root);
    let candidates = [
        install_root.join(ENGINE_EXE_NAME),
        install_root.join(ENGINE_BUILD_OUTPUT_PATH),
        parent.join(ENGINE_BUILD_OUTPUT_PATH),
    ];

    for candidate in &candidates {
        if candidate.is_file() {
            debug!("Resolved engine executable: {}", candidate.display());
            return Ok(candidate.clone());
        }
        debug!("Engine not at {}", candidate.display());
    }

    Err(BridgeError::EngineNotFound(
        candidates[candidates.len() - 1].clone(),
    ))
}

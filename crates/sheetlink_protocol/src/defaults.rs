//! Canonical default values shared across the bridge and the CLI.

/// Workbook directory handed to the engine when the caller never set one.
pub const DEFAULT_WORKBOOK_DIR: &str = "./XLSX";

/// Seconds the bridge waits for the engine before killing it.
pub const DEFAULT_ENGINE_TIMEOUT_SECS: u64 = 30;

/// Terminator line written after the request so the engine exits.
pub const QUIT_LINE: &str = "quit";

/// Engine executable file name.
pub const ENGINE_EXE_NAME: &str = "ExcelSqlTool.exe";

/// Build-output path of the engine relative to an install root.
pub const ENGINE_BUILD_OUTPUT_PATH: &str = "ExcelSqlTool/bin/Debug/net48/ExcelSqlTool.exe";

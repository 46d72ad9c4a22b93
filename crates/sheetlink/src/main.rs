//! Sheetlink launcher.
//!
//! `sheetlink mcp` serves the Model Context Protocol over stdio; this is
//! what an IDE configures as the server command. `sheetlink call` fires
//! one request at the engine directly and prints the adapted result,
//! which is the fastest way to check an engine build without an agent in
//! the loop.

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use sheetlink_bridge::{adapt_reply, extract_reply, ChildProcessTransport, EngineTransport};
use sheetlink_logging::{init_logging, LogConfig};
use sheetlink_mcp::{McpServer, ServerConfig};
use sheetlink_protocol::defaults::{DEFAULT_ENGINE_TIMEOUT_SECS, DEFAULT_WORKBOOK_DIR};
use sheetlink_protocol::{methods, EngineRequest};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "sheetlink", about = "MCP bridge to an external Excel SQL engine")]
struct Cli {
    /// Verbose stderr logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve MCP over stdio (the default)
    Mcp {
        /// Workbook directory used until a caller sets one
        #[arg(long, default_value = DEFAULT_WORKBOOK_DIR)]
        dir: PathBuf,

        /// Engine executable; probed from the install root when unset
        #[arg(long)]
        engine: Option<PathBuf>,

        /// Seconds to wait for the engine before killing it
        #[arg(long, default_value_t = DEFAULT_ENGINE_TIMEOUT_SECS)]
        timeout: u64,
    },

    /// Fire one request at the engine and print the adapted result
    Call {
        /// Engine method: get_tables, execute_sql, get_create_table, refresh
        method: String,

        /// SQL statement (execute_sql)
        #[arg(long)]
        sql: Option<String>,

        /// Table name (get_create_table)
        #[arg(long)]
        table: Option<String>,

        /// Workbook directory
        #[arg(long, default_value = DEFAULT_WORKBOOK_DIR)]
        dir: PathBuf,

        /// Engine executable; probed from the install root when unset
        #[arg(long)]
        engine: Option<PathBuf>,

        /// Seconds to wait for the engine before killing it
        #[arg(long, default_value_t = DEFAULT_ENGINE_TIMEOUT_SECS)]
        timeout: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(LogConfig {
        app_name: "sheetlink",
        verbose: cli.verbose,
        log_to_file: true,
    })?;

    match cli.command.unwrap_or(Command::Mcp {
        dir: PathBuf::from(DEFAULT_WORKBOOK_DIR),
        engine: None,
        timeout: DEFAULT_ENGINE_TIMEOUT_SECS,
    }) {
        Command::Mcp {
            dir,
            engine,
            timeout,
        } => serve_mcp(dir, engine, timeout).await,
        Command::Call {
            method,
            sql,
            table,
            dir,
            engine,
            timeout,
        } => call_engine(method, sql, table, dir, engine, timeout).await,
    }
}

async fn serve_mcp(dir: PathBuf, engine: Option<PathBuf>, timeout: u64) -> Result<()> {
    let config = ServerConfig {
        default_workbook_dir: dir,
        engine_timeout_secs: timeout,
        engine_executable: engine,
        ..ServerConfig::default()
    };

    info!("Serving MCP over stdio");
    McpServer::new(config).run().await
}

async fn call_engine(
    method: String,
    sql: Option<String>,
    table: Option<String>,
    dir: PathBuf,
    engine: Option<PathBuf>,
    timeout: u64,
) -> Result<()> {
    let request = match method.as_str() {
        methods::GET_TABLES => EngineRequest::new(methods::GET_TABLES),
        methods::REFRESH => EngineRequest::new(methods::REFRESH),
        methods::EXECUTE_SQL => match sql {
            Some(sql) => EngineRequest::execute_sql(&sql),
            None => bail!("execute_sql needs --sql"),
        },
        methods::GET_CREATE_TABLE => match table {
            Some(table) => EngineRequest::get_create_table(&table),
            None => bail!("get_create_table needs --table"),
        },
        other => bail!(
            "unknown engine method '{other}' (expected get_tables, execute_sql, get_create_table or refresh)"
        ),
    };

    let transport = match engine {
        Some(path) => ChildProcessTransport::with_executable(path),
        None => ChildProcessTransport::new(),
    }
    .timeout(Duration::from_secs(timeout));

    let output = transport.invoke(&request, &dir).await?;
    let reply = extract_reply(&output.stdout)?;
    let result = adapt_reply(&reply);

    if result.is_error {
        eprintln!("engine call failed:");
    }
    for block in &result.content {
        println!("{}", block.as_text());
    }

    if result.is_error {
        std::process::exit(1);
    }
    Ok(())
}

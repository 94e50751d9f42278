use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(
    name = "vigil",
    version,
    about = "Static and MCP-surface security scanner for agent skills and extensions"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Scan a filesystem path (honors the extension allowlist and skip-dirs).
    Scan(ScanArgs),
    /// Scan a filesystem path, forcing full recursive depth.
    ScanAll(ScanArgs),
    /// Scan a remote surface over the Model Context Protocol.
    Mcp(McpArgs),
}

#[derive(Clone, Copy, Debug, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Sarif,
}

#[derive(clap::Args, Debug, Clone)]
pub struct ScanArgs {
    pub path: PathBuf,

    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    #[arg(long)]
    pub output: Option<PathBuf>,

    #[arg(long, value_name = "LOW|MEDIUM|HIGH|CRITICAL")]
    pub fail_on: Option<String>,

    #[arg(long, default_value_t = false)]
    pub use_behavioral: bool,

    #[arg(long, default_value_t = false)]
    pub no_behavioral: bool,

    #[arg(long, default_value_t = false)]
    pub enable_meta: bool,

    #[arg(long, default_value_t = false)]
    pub fix: bool,

    #[arg(long, default_value_t = false)]
    pub show_confidence: bool,

    #[arg(long)]
    pub min_confidence: Option<f64>,

    #[arg(long = "skills-dir")]
    pub skills_dirs: Vec<PathBuf>,

    #[arg(long = "extensions-dir")]
    pub extensions_dirs: Vec<PathBuf>,

    #[arg(long = "ide-extensions-dir")]
    pub ide_extensions_dirs: Vec<PathBuf>,

    #[arg(long, default_value_t = false)]
    pub full_depth: bool,
}

#[derive(clap::Args, Debug, Clone)]
pub struct McpArgs {
    #[command(subcommand)]
    pub cmd: McpCommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum McpCommand {
    /// Scan a live server reachable over HTTP/SSE JSON-RPC.
    Remote(McpTargetArgs),
    /// Scan a JSON-RPC endpoint the same way, without implying a live
    /// long-lived connection (kept distinct for `--help` clarity only).
    Static(McpTargetArgs),
}

#[derive(clap::Args, Debug, Clone)]
pub struct McpTargetArgs {
    pub url: String,

    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    #[arg(long)]
    pub output: Option<PathBuf>,

    #[arg(long, value_name = "LOW|MEDIUM|HIGH|CRITICAL")]
    pub fail_on: Option<String>,

    #[arg(long)]
    pub bearer_token: Option<String>,

    /// "Key: Value", repeatable.
    #[arg(long = "header")]
    pub headers: Vec<String>,

    /// Comma-separated subset of tools,prompts,resources,instructions.
    #[arg(long, default_value = "tools,prompts,resources,instructions")]
    pub scan: String,

    #[arg(long, default_value_t = true)]
    pub read_resources: bool,

    /// Comma-separated mime-type allowlist; unset allows everything.
    #[arg(long)]
    pub mime_types: Option<String>,

    #[arg(long)]
    pub max_resource_bytes: Option<usize>,
}

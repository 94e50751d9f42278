mod mcp;
mod render;
mod scan;

use crate::cli::args::{Command, McpCommand};

pub async fn dispatch(command: Command) -> i32 {
    match command {
        Command::Scan(args) => scan::run(&args, false).await,
        Command::ScanAll(args) => scan::run(&args, true).await,
        Command::Mcp(mcp_args) => match mcp_args.cmd {
            McpCommand::Remote(target) => mcp::run(&target).await,
            McpCommand::Static(target) => mcp::run(&target).await,
        },
    }
}

//! nvim-bridge MCP Server
//!
//! Exposes a running Neovim instance to AI agents via the MCP protocol.
//!
//! ## Tools
//!
//! - `nvim_get_buffer` - Read the current buffer (optionally a line range)
//! - `nvim_set_buffer` - Replace buffer content (whole buffer or a range)
//! - `nvim_get_context` - Editor state: file, cursor, open buffers, git branch
//! - `nvim_execute` - Run an ex command or Lua chunk (fire and forget)
//! - `nvim_navigate` - Open a file and jump to a position
//! - `nvim_status` - Connectivity check
//!
//! ## Usage
//!
//! Start Neovim with remote control enabled, then add to your MCP client
//! configuration:
//! ```json
//! {
//!   "mcpServers": {
//!     "nvim-bridge": {
//!       "command": "nvim-bridge-mcp"
//!     }
//!   }
//! }
//! ```

use anyhow::Result;
use rmcp::transport::stdio;
use rmcp::ServiceExt;

mod tools;

use tools::NvimBridgeService;

#[tokio::main]
async fn main() -> Result<()> {
    // Configure logging to stderr only (stdout is for MCP protocol)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .target(env_logger::Target::Stderr)
        .init();

    log::info!("Starting nvim-bridge MCP server");

    let service = NvimBridgeService::new();
    let server = service.serve(stdio()).await?;

    // Wait for shutdown
    server.waiting().await?;

    log::info!("nvim-bridge MCP server stopped");
    Ok(())
}

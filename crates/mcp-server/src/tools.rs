//! MCP tools for nvim-bridge
//!
//! Each tool builds a fresh [`RemoteClient`] from the process environment,
//! so the socket is re-resolved on every call and a Neovim restarted mid
//! session is picked up without restarting the bridge.

use nvim_bridge_client::{
    editor_context, execute_command, execute_lua, navigate_to_file, read_buffer, write_buffer,
    RemoteClient,
};
use rmcp::handler::server::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{CallToolResult, Content, Implementation, ServerCapabilities, ServerInfo};
use rmcp::schemars;
use rmcp::{tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use serde::Deserialize;
use serde_json::json;

const START_SUGGESTION: &str = "Start Neovim with: nvim --listen /tmp/nvim-$USER.sock <file>";

/// nvim-bridge MCP Service
#[derive(Clone)]
pub struct NvimBridgeService {
    /// Tool router
    tool_router: ToolRouter<Self>,
}

#[tool_handler]
impl ServerHandler for NvimBridgeService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some("nvim-bridge drives a running Neovim instance. Use 'nvim_status' to check connectivity, 'nvim_get_buffer'/'nvim_set_buffer' for buffer text, 'nvim_get_context' for editor state, 'nvim_execute' for ex commands or Lua, and 'nvim_navigate' to open files.".into()),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            ..Default::default()
        }
    }
}

fn success_json<T: serde::Serialize>(value: &T) -> CallToolResult {
    CallToolResult::success(vec![Content::text(
        serde_json::to_string_pretty(value).unwrap_or_default(),
    )])
}

fn error_payload(kind: &str, message: String, suggestion: Option<&str>) -> CallToolResult {
    let mut payload = json!({ "error": kind, "message": message });
    if let Some(hint) = suggestion {
        payload["suggestion"] = json!(hint);
    }
    CallToolResult::error(vec![Content::text(payload.to_string())])
}

// ============================================================================
// Tool Input Schemas
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GetBufferRequest {
    /// Line-number gutter toggle
    #[schemars(description = "Include line numbers in output (default: true)")]
    pub include_line_numbers: Option<bool>,

    /// Range start
    #[schemars(description = "Start line (1-indexed, optional)")]
    pub start_line: Option<u64>,

    /// Range end
    #[schemars(description = "End line (1-indexed, optional)")]
    pub end_line: Option<u64>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SetBufferRequest {
    /// Replacement text
    #[schemars(description = "New buffer content (required)")]
    pub content: String,

    /// Range start
    #[schemars(description = "Start line for partial replacement (1-indexed, optional)")]
    pub start_line: Option<u64>,

    /// Range end
    #[schemars(description = "End line for partial replacement (1-indexed, optional)")]
    pub end_line: Option<u64>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ExecuteRequest {
    /// Ex command, without the leading colon
    #[schemars(description = "Vim command (without leading ':')")]
    pub command: Option<String>,

    /// Lua alternative to `command`
    #[schemars(description = "Lua code to execute (alternative to command)")]
    pub lua: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct NavigateRequest {
    /// Target file
    #[schemars(description = "File path to open (required)")]
    pub path: String,

    /// Jump target
    #[schemars(description = "Line number to jump to (optional)")]
    pub line: Option<u64>,

    /// Jump target column
    #[schemars(description = "Column number (optional)")]
    pub column: Option<u64>,
}

// ============================================================================
// Tool Implementations
// ============================================================================

#[tool_router]
impl NvimBridgeService {
    pub fn new() -> Self {
        Self {
            tool_router: Self::tool_router(),
        }
    }

    /// Read the current buffer
    #[tool(description = "Get the current Neovim buffer: contents (optionally a line range), cursor position, file path and type, modified flag.")]
    pub async fn nvim_get_buffer(
        &self,
        Parameters(request): Parameters<GetBufferRequest>,
    ) -> Result<CallToolResult, McpError> {
        let remote = RemoteClient::from_env();
        let snapshot = read_buffer(
            &remote,
            request.start_line,
            request.end_line,
            request.include_line_numbers.unwrap_or(true),
        )
        .await;

        match snapshot {
            Ok(snapshot) => Ok(success_json(&snapshot)),
            Err(e) => Ok(error_payload(
                "neovim_not_connected",
                e.to_string(),
                Some(START_SUGGESTION),
            )),
        }
    }

    /// Replace buffer content
    #[tool(description = "Set the current Neovim buffer content. Replaces the whole buffer, or lines start_line..end_line when given. Delivery is unverified: success means the request reached Neovim.")]
    pub async fn nvim_set_buffer(
        &self,
        Parameters(request): Parameters<SetBufferRequest>,
    ) -> Result<CallToolResult, McpError> {
        let remote = RemoteClient::from_env();
        match write_buffer(
            &remote,
            &request.content,
            request.start_line,
            request.end_line,
        )
        .await
        {
            Ok(result) => Ok(success_json(&json!({
                "success": true,
                "lines_changed": result.lines_changed,
            }))),
            Err(e) => Ok(error_payload("failed_to_set_buffer", e.to_string(), None)),
        }
    }

    /// Snapshot editor state
    #[tool(description = "Get Neovim editor context: current file, cursor, open buffers, and git branch when available.")]
    pub async fn nvim_get_context(&self) -> Result<CallToolResult, McpError> {
        let remote = RemoteClient::from_env();
        match editor_context(&remote).await {
            Ok(context) => Ok(success_json(&context)),
            Err(e) => Ok(error_payload(
                "neovim_not_connected",
                e.to_string(),
                Some(START_SUGGESTION),
            )),
        }
    }

    /// Run a command or Lua chunk
    #[tool(description = "Execute a Vim ex command or Lua code in Neovim. Fire and forget: the acknowledgment confirms delivery, not the command's output.")]
    pub async fn nvim_execute(
        &self,
        Parameters(request): Parameters<ExecuteRequest>,
    ) -> Result<CallToolResult, McpError> {
        let remote = RemoteClient::from_env();
        let sent = if let Some(lua) = request.lua.as_deref() {
            execute_lua(&remote, lua).await
        } else if let Some(command) = request.command.as_deref() {
            execute_command(&remote, command).await
        } else {
            return Ok(error_payload(
                "invalid_request",
                "Provide command or lua".to_string(),
                None,
            ));
        };

        match sent {
            Ok(output) => Ok(success_json(&json!({
                "success": true,
                "output": output,
            }))),
            Err(e) => Ok(error_payload("execution_failed", e.to_string(), None)),
        }
    }

    /// Open a file at a position
    #[tool(description = "Open a file in Neovim, optionally jumping to a line and column. Nothing verifies the file opened.")]
    pub async fn nvim_navigate(
        &self,
        Parameters(request): Parameters<NavigateRequest>,
    ) -> Result<CallToolResult, McpError> {
        let remote = RemoteClient::from_env();
        match navigate_to_file(&remote, &request.path, request.line, request.column).await {
            Ok(()) => Ok(success_json(&json!({
                "success": true,
                "opened_path": request.path,
            }))),
            Err(e) => Ok(error_payload("navigation_failed", e.to_string(), None)),
        }
    }

    /// Connectivity check
    #[tool(description = "Check whether a Neovim instance is reachable over its remote-control socket. Never fails.")]
    pub async fn nvim_status(&self) -> Result<CallToolResult, McpError> {
        let connected = RemoteClient::from_env().is_connected().await;
        let message = if connected {
            "Neovim is connected and ready"
        } else {
            "Neovim is not connected. Start with: nvim --listen /tmp/nvim-$USER.sock <file>"
        };
        Ok(success_json(&json!({
            "connected": connected,
            "message": message,
        })))
    }
}

//! The context aggregator: one snapshot of editor and workspace state, plus
//! the fire-and-forget command/navigation wrappers.

use serde::Serialize;
use tokio::process::Command;

use crate::buffer::{eval_number, eval_read, relative_to, CursorPosition};
use crate::error::Result;
use crate::remote::Remote;

/// Open-buffer enumeration queries at most this many buffer slots.
const OPEN_BUFFER_CAP: u64 = 20;

/// Marker for context fields the bridge does not collect yet. Distinct from
/// an empty collection so callers can tell "none" from "not implemented".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Reserved {
    NotYetSupported,
}

#[derive(Debug, Clone, Serialize)]
pub struct FileDescriptor {
    pub path: String,
    pub relative_path: String,
    pub filetype: String,
    pub modified: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct OpenBuffer {
    pub path: String,
    pub modified: bool,
}

/// Editor state assembled fresh per request; nothing here is cached.
#[derive(Debug, Clone, Serialize)]
pub struct EditorContext {
    pub current_file: FileDescriptor,
    pub cursor: CursorPosition,
    pub visual_selection: Reserved,
    pub diagnostics: Reserved,
    pub open_buffers: Vec<OpenBuffer>,
    pub git_branch: Option<String>,
}

/// Gather current file, cursor, open buffers and VCS branch.
pub async fn editor_context(remote: &dyn Remote) -> Result<EditorContext> {
    let path = eval_read(remote, r#"expand("%:p")"#).await?;
    let filetype = eval_read(remote, "&filetype").await?;
    let modified = eval_read(remote, "&modified").await? == "1";
    let cursor = CursorPosition {
        line: eval_number(remote, r#"line(".")"#).await?,
        column: eval_number(remote, r#"col(".")"#).await?,
    };
    let cwd = eval_read(remote, "getcwd()").await?;

    let open_buffers = open_buffers(remote).await?;
    let git_branch = git_branch(&cwd).await;

    Ok(EditorContext {
        current_file: FileDescriptor {
            relative_path: relative_to(&path, &cwd),
            path,
            filetype,
            modified,
        },
        cursor,
        visual_selection: Reserved::NotYetSupported,
        diagnostics: Reserved::NotYetSupported,
        open_buffers,
        git_branch,
    })
}

async fn open_buffers(remote: &dyn Remote) -> Result<Vec<OpenBuffer>> {
    let highest = eval_number(remote, r#"bufnr("$")"#).await?;
    let mut buffers = Vec::new();
    for index in 1..=highest.min(OPEN_BUFFER_CAP) {
        // A slot that errors mid-enumeration (wiped buffer, stale index) is
        // skipped, not fatal.
        let Ok(path) = remote.eval_expr(&format!("bufname({index})")).await else {
            continue;
        };
        if path.is_empty() {
            continue;
        }
        let modified = match remote
            .eval_expr(&format!("getbufvar({index}, '&modified')"))
            .await
        {
            Ok(flag) => flag == "1",
            Err(_) => continue,
        };
        buffers.push(OpenBuffer { path, modified });
    }
    Ok(buffers)
}

/// Current branch via git itself, run in the editor's working directory.
/// No repository, no git, detached head: all degrade to `None`.
async fn git_branch(cwd: &str) -> Option<String> {
    let output = Command::new("git")
        .arg("-C")
        .arg(cwd)
        .arg("branch")
        .arg("--show-current")
        .output()
        .await
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let branch = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if branch.is_empty() {
        None
    } else {
        Some(branch)
    }
}

/// Run an ex command. The acknowledgment is fixed text: the keystroke path
/// has no return channel, so the command's own output is unobservable here.
pub async fn execute_command(remote: &dyn Remote, command: &str) -> Result<&'static str> {
    remote.send_keys(&format!("<Esc>:{command}<CR>")).await?;
    Ok("Command sent")
}

/// Run a Lua chunk through `:lua`. Same delivery-only contract as
/// [`execute_command`].
pub async fn execute_lua(remote: &dyn Remote, code: &str) -> Result<&'static str> {
    remote.send_keys(&format!("<Esc>:lua {code}<CR>")).await?;
    Ok("Lua executed")
}

/// Open a file and optionally jump to a position. Column movement is
/// injected as `0` plus `column - 1` steps right. Nothing verifies the file
/// actually opened.
pub async fn navigate_to_file(
    remote: &dyn Remote,
    path: &str,
    line: Option<u64>,
    column: Option<u64>,
) -> Result<()> {
    remote.send_keys(&format!("<Esc>:edit {path}<CR>")).await?;
    if let Some(line) = line {
        remote.send_keys(&format!("<Esc>:{line}<CR>")).await?;
        if let Some(column) = column {
            remote
                .send_keys(&format!("<Esc>0{}l", column.saturating_sub(1)))
                .await?;
        }
    }
    Ok(())
}

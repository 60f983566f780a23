//! The buffer transaction layer.
//!
//! Reads assemble an immutable [`BufferSnapshot`] from a sequence of
//! expression evaluations. Writes stage the replacement text in a temp file
//! and inject one composite delete-then-read keystroke payload, because
//! arbitrary content cannot be serialized safely into a shell-escaped
//! keystroke string.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;

use crate::error::{BridgeError, Result};
use crate::remote::Remote;

/// Width the line-number gutter is right-aligned to.
const NUMBER_WIDTH: usize = 4;
const NUMBER_SEPARATOR: &str = " | ";

/// Cursor position, 1-based in both axes (Neovim convention).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CursorPosition {
    pub line: u64,
    pub column: u64,
}

/// Immutable view of the current buffer at read time.
#[derive(Debug, Clone, Serialize)]
pub struct BufferSnapshot {
    /// Absolute path of the file backing the buffer.
    pub path: String,
    /// Path relative to Neovim's working directory, or the absolute path
    /// when the file lives outside it.
    pub relative_path: String,
    /// Requested line range, optionally with a line-number gutter.
    pub content: String,
    pub filetype: String,
    pub cursor: CursorPosition,
    pub total_lines: u64,
    pub modified: bool,
}

/// Outcome of a buffer write. `lines_changed` counts the *supplied* lines;
/// the keystroke path has no acknowledgment, so nothing here claims Neovim
/// actually applied the change.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct WriteResult {
    pub lines_changed: usize,
}

/// Wrap an adapter failure so a half-assembled snapshot never escapes.
fn read_failed(err: BridgeError) -> BridgeError {
    BridgeError::BufferRead(err.to_string())
}

pub(crate) async fn eval_read(remote: &dyn Remote, expr: &str) -> Result<String> {
    remote.eval_expr(expr).await.map_err(read_failed)
}

pub(crate) async fn eval_number(remote: &dyn Remote, expr: &str) -> Result<u64> {
    let raw = eval_read(remote, expr).await?;
    raw.trim().parse().map_err(|_| {
        BridgeError::BufferRead(format!("expected a number from {expr}, got {raw:?}"))
    })
}

/// Relative form of `path` under `cwd`: the prefix and its separator are
/// stripped only when the path actually lives under the working directory.
pub(crate) fn relative_to(path: &str, cwd: &str) -> String {
    match path
        .strip_prefix(cwd)
        .and_then(|rest| rest.strip_prefix('/'))
    {
        Some(rest) => rest.to_string(),
        None => path.to_string(),
    }
}

fn number_lines(text: &str, first_line: u64) -> String {
    text.split('\n')
        .enumerate()
        .map(|(offset, line)| {
            format!(
                "{:>width$}{NUMBER_SEPARATOR}{line}",
                first_line + offset as u64,
                width = NUMBER_WIDTH
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Snapshot the current buffer, defaulting to the full line range. The
/// gutter is cosmetic only and must be stripped before round-tripping
/// content back through [`write_buffer`].
pub async fn read_buffer(
    remote: &dyn Remote,
    start_line: Option<u64>,
    end_line: Option<u64>,
    with_line_numbers: bool,
) -> Result<BufferSnapshot> {
    let path = eval_read(remote, r#"expand("%:p")"#).await?;
    let filetype = eval_read(remote, "&filetype").await?;
    let modified = eval_read(remote, "&modified").await? == "1";
    let cursor_line = eval_number(remote, r#"line(".")"#).await?;
    let cursor_column = eval_number(remote, r#"col(".")"#).await?;
    let total_lines = eval_number(remote, r#"line("$")"#).await?;
    let cwd = eval_read(remote, "getcwd()").await?;

    let start = start_line.unwrap_or(1);
    let end = end_line.unwrap_or(total_lines);
    // One evaluation for the whole range, not one per line.
    let raw = eval_read(remote, &format!(r#"join(getline({start}, {end}), "\n")"#)).await?;

    let content = if with_line_numbers {
        number_lines(&raw, start)
    } else {
        raw
    };

    Ok(BufferSnapshot {
        relative_path: relative_to(&path, &cwd),
        path,
        content,
        filetype,
        cursor: CursorPosition {
            line: cursor_line,
            column: cursor_column,
        },
        total_lines,
        modified,
    })
}

/// Staging file for a buffer write. Removed explicitly after the injection
/// request; the `Drop` impl is a backstop so a cancelled call cannot leak it.
struct StagingFile {
    path: PathBuf,
    removed: bool,
}

impl StagingFile {
    async fn create(content: &str) -> Result<Self> {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        let path = std::env::temp_dir().join(format!("nvim-bridge-{nanos}.txt"));
        tokio::fs::write(&path, content).await?;
        Ok(Self {
            path,
            removed: false,
        })
    }

    fn path(&self) -> &Path {
        &self.path
    }

    async fn remove(mut self) {
        let _ = tokio::fs::remove_file(&self.path).await;
        self.removed = true;
    }
}

impl Drop for StagingFile {
    fn drop(&mut self) {
        if !self.removed {
            let _ = std::fs::remove_file(&self.path);
        }
    }
}

/// Replace a line range (default: the whole buffer, line 1 through `$`).
///
/// The injected payload leaves any pending input mode, deletes the target
/// range, then reads the staged file in immediately above where the range
/// started, so the replacement lands exactly where the deleted lines were.
pub async fn write_buffer(
    remote: &dyn Remote,
    content: &str,
    start_line: Option<u64>,
    end_line: Option<u64>,
) -> Result<WriteResult> {
    let lines_changed = content.split('\n').count();
    let start = start_line.unwrap_or(1);
    let end = match end_line {
        Some(line) => line.to_string(),
        None => "$".to_string(),
    };

    let staging = StagingFile::create(content).await?;
    let keys = format!(
        "<Esc>:{start},{end}d<CR>:{}r {}<CR>",
        start.saturating_sub(1),
        staging.path().display()
    );
    let sent = remote.send_keys(&keys).await;
    staging.remove().await;
    sent?;

    Ok(WriteResult { lines_changed })
}

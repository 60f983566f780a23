//! The remote protocol adapter.
//!
//! Each primitive is one blocking `nvim --server` invocation run through the
//! shell, bounded by [`REMOTE_TIMEOUT`]. The endpoint is resolved afresh on
//! every call.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;

use crate::endpoint::{self, EndpointConfig};
use crate::error::{BridgeError, Result};

const REMOTE_TIMEOUT: Duration = Duration::from_millis(5000);

/// The two primitives Neovim's remote protocol offers. The buffer and
/// context layers depend only on this trait, so they can be driven by a
/// scripted fake under test.
#[async_trait]
pub trait Remote: Send + Sync {
    /// Inject keystrokes as if typed. Fire and forget: no return channel.
    async fn send_keys(&self, keys: &str) -> Result<()>;

    /// Evaluate a Vimscript expression; returns its string form with
    /// trailing whitespace trimmed.
    async fn eval_expr(&self, expr: &str) -> Result<String>;
}

/// Escape a payload for embedding in a single-quoted shell argument: each
/// `'` becomes `'\''` (close the quote, emit a literal quote, reopen).
pub fn escape_single_quotes(s: &str) -> String {
    s.replace('\'', "'\\''")
}

/// [`Remote`] implementation backed by the `nvim` binary.
pub struct RemoteClient {
    config: EndpointConfig,
}

impl RemoteClient {
    pub fn new(config: EndpointConfig) -> Self {
        Self { config }
    }

    /// Client bound to the ambient process environment.
    pub fn from_env() -> Self {
        Self::new(EndpointConfig::from_env())
    }

    async fn run(&self, flag: &str, payload: &str) -> Result<std::process::Output> {
        let socket = endpoint::resolve(&self.config)?;
        let command_line = format!(
            "nvim --server '{}' {} '{}'",
            escape_single_quotes(&socket),
            flag,
            escape_single_quotes(payload),
        );
        log::debug!("nvim {flag} via {socket}");

        let output = tokio::time::timeout(
            REMOTE_TIMEOUT,
            Command::new("sh")
                .arg("-c")
                .arg(&command_line)
                .kill_on_drop(true)
                .output(),
        )
        .await
        .map_err(|_| {
            BridgeError::Protocol(format!(
                "nvim {flag} timed out after {}ms",
                REMOTE_TIMEOUT.as_millis()
            ))
        })??;

        if !output.status.success() {
            return Err(BridgeError::Protocol(format!(
                "nvim {flag} exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(output)
    }

    /// True when an endpoint resolves, exists on disk and answers a trivial
    /// expression. Never returns an error.
    pub async fn is_connected(&self) -> bool {
        let Ok(socket) = endpoint::resolve(&self.config) else {
            return false;
        };
        if !Path::new(&socket).exists() {
            return false;
        }
        self.eval_expr("1").await.is_ok()
    }
}

#[async_trait]
impl Remote for RemoteClient {
    async fn send_keys(&self, keys: &str) -> Result<()> {
        self.run("--remote-send", keys).await.map(|_| ())
    }

    async fn eval_expr(&self, expr: &str) -> Result<String> {
        let output = self.run("--remote-expr", expr).await?;
        Ok(String::from_utf8_lossy(&output.stdout)
            .trim_end()
            .to_string())
    }
}

//! # nvim-bridge-client
//!
//! Drives a running Neovim instance over its remote-control socket.
//!
//! Neovim's remote protocol offers exactly two primitives:
//!
//! ```text
//! nvim --server <socket> --remote-send <keys>   (inject keystrokes, no reply)
//! nvim --server <socket> --remote-expr <expr>   (evaluate, returns a string)
//! ```
//!
//! This crate layers buffer reads/writes and editor-context snapshots on top
//! of those primitives:
//!
//! ```text
//! EndpointConfig ──> resolve() ──> socket path
//!                                      │
//!                        RemoteClient (send_keys / eval_expr)
//!                                      │
//!              ┌───────────────────────┴──────────────────────┐
//!        buffer layer                                  context layer
//!   read_buffer / write_buffer              editor_context / execute / navigate
//! ```
//!
//! Keystroke injection has no return channel, so every mutation is delivered
//! fire-and-forget: a successful write means "the request reached Neovim",
//! never "the buffer now matches".

mod buffer;
mod context;
mod endpoint;
mod error;
mod remote;

#[cfg(test)]
mod test_support;

pub use buffer::{read_buffer, write_buffer, BufferSnapshot, CursorPosition, WriteResult};
pub use context::{
    editor_context, execute_command, execute_lua, navigate_to_file, EditorContext, FileDescriptor,
    OpenBuffer, Reserved,
};
pub use endpoint::{resolve, EndpointConfig};
pub use error::{BridgeError, Result};
pub use remote::{escape_single_quotes, Remote, RemoteClient};

//! Control-socket discovery.
//!
//! Resolution order: `NVIM_LISTEN_ADDRESS`, then `NVIM_MCP_SOCKET`, then the
//! per-user socket under the socket directory, then the shared fallback.
//! First match wins; environment values are returned verbatim and never
//! validated for liveness.

use std::path::PathBuf;

use crate::error::{BridgeError, Result};

/// Ambient inputs to endpoint resolution, captured once so resolution itself
/// is a pure function of this struct plus the filesystem.
#[derive(Debug, Clone)]
pub struct EndpointConfig {
    /// `NVIM_LISTEN_ADDRESS`, Neovim's own listen-address variable.
    pub listen_address: Option<String>,
    /// `NVIM_MCP_SOCKET`, the bridge-specific override.
    pub socket_override: Option<String>,
    /// Invoking user, used for the per-user socket candidate.
    pub user: String,
    /// Directory probed for socket candidates.
    pub socket_dir: PathBuf,
}

impl EndpointConfig {
    /// Capture resolution inputs from the process environment.
    pub fn from_env() -> Self {
        Self {
            listen_address: std::env::var("NVIM_LISTEN_ADDRESS").ok(),
            socket_override: std::env::var("NVIM_MCP_SOCKET").ok(),
            user: std::env::var("USER").unwrap_or_else(|_| "unknown".to_string()),
            socket_dir: PathBuf::from("/tmp"),
        }
    }

    fn candidates(&self) -> [PathBuf; 2] {
        [
            self.socket_dir.join(format!("nvim-{}.sock", self.user)),
            self.socket_dir.join("nvim.sock"),
        ]
    }
}

/// Resolve the socket path for this invocation. Nothing is cached: callers
/// resolve afresh on every protocol exchange.
pub fn resolve(config: &EndpointConfig) -> Result<String> {
    for value in [&config.listen_address, &config.socket_override] {
        if let Some(address) = value {
            if !address.is_empty() {
                return Ok(address.clone());
            }
        }
    }

    for candidate in config.candidates() {
        if candidate.exists() {
            return Ok(candidate.to_string_lossy().into_owned());
        }
    }

    Err(BridgeError::NoEndpointFound)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn config(dir: &TempDir) -> EndpointConfig {
        EndpointConfig {
            listen_address: None,
            socket_override: None,
            user: "alice".to_string(),
            socket_dir: dir.path().to_path_buf(),
        }
    }

    #[test]
    fn listen_address_wins_over_everything() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("nvim-alice.sock"), b"").unwrap();
        let cfg = EndpointConfig {
            listen_address: Some("/run/nvim-primary.sock".to_string()),
            socket_override: Some("/run/nvim-override.sock".to_string()),
            ..config(&dir)
        };
        assert_eq!(resolve(&cfg).unwrap(), "/run/nvim-primary.sock");
    }

    #[test]
    fn override_variable_is_second_in_line() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("nvim-alice.sock"), b"").unwrap();
        let cfg = EndpointConfig {
            socket_override: Some("/run/nvim-override.sock".to_string()),
            ..config(&dir)
        };
        assert_eq!(resolve(&cfg).unwrap(), "/run/nvim-override.sock");
    }

    #[test]
    fn empty_variables_are_treated_as_unset() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("nvim.sock"), b"").unwrap();
        let cfg = EndpointConfig {
            listen_address: Some(String::new()),
            socket_override: Some(String::new()),
            ..config(&dir)
        };
        assert_eq!(
            resolve(&cfg).unwrap(),
            dir.path().join("nvim.sock").to_string_lossy()
        );
    }

    #[test]
    fn per_user_socket_beats_shared_fallback() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("nvim-alice.sock"), b"").unwrap();
        std::fs::write(dir.path().join("nvim.sock"), b"").unwrap();
        let cfg = config(&dir);
        assert_eq!(
            resolve(&cfg).unwrap(),
            dir.path().join("nvim-alice.sock").to_string_lossy()
        );
    }

    #[test]
    fn environment_values_are_returned_unvalidated() {
        let dir = TempDir::new().unwrap();
        let cfg = EndpointConfig {
            listen_address: Some("/nowhere/does-not-exist.sock".to_string()),
            ..config(&dir)
        };
        // No liveness or existence check on env-supplied addresses.
        assert_eq!(resolve(&cfg).unwrap(), "/nowhere/does-not-exist.sock");
    }

    #[test]
    fn exhausted_resolution_fails() {
        let dir = TempDir::new().unwrap();
        let cfg = config(&dir);
        assert!(matches!(resolve(&cfg), Err(BridgeError::NoEndpointFound)));
    }
}

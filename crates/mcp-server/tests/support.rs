use anyhow::{Context, Result};
use std::path::PathBuf;

pub fn locate_bridge_mcp_bin() -> Result<PathBuf> {
    if let Some(path) = option_env!("CARGO_BIN_EXE_nvim-bridge-mcp") {
        return Ok(PathBuf::from(path));
    }

    // Cargo doesn't always expose CARGO_BIN_EXE_* at runtime. Derive it from
    // the test exe path:
    // `.../target/{debug|release}/deps/<test>` → `.../target/{debug|release}/nvim-bridge-mcp`
    if let Ok(exe) = std::env::current_exe() {
        if let Some(target_profile_dir) = exe.parent().and_then(|p| p.parent()) {
            let candidate = target_profile_dir.join("nvim-bridge-mcp");
            if candidate.exists() {
                return Ok(candidate);
            }
        }
    }

    // Final fallback: search the repo target dirs.
    let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let repo_root = manifest_dir
        .ancestors()
        .nth(2)
        .context("failed to resolve repo root from CARGO_MANIFEST_DIR")?;
    for rel in ["target/debug/nvim-bridge-mcp", "target/release/nvim-bridge-mcp"] {
        let candidate = repo_root.join(rel);
        if candidate.exists() {
            return Ok(candidate);
        }
    }

    anyhow::bail!(
        "failed to locate nvim-bridge-mcp binary; build with: cargo build -p nvim-bridge-mcp"
    )
}

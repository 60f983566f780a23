use thiserror::Error;

pub type Result<T> = std::result::Result<T, BridgeError>;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("no Neovim socket found. Start Neovim with: nvim --listen /tmp/nvim-$USER.sock <file>")]
    NoEndpointFound,

    #[error("remote protocol error: {0}")]
    Protocol(String),

    #[error("buffer read failed: {0}")]
    BufferRead(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

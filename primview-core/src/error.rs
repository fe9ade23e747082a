//! Error types shared across the primview crates

use thiserror::Error;

use crate::stl::StlError;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Display surface error: {0}")]
    Surface(String),
    #[error("Renderer has been disposed")]
    Disposed,
    #[error("Failed to load STL: {0}")]
    Stl(#[from] StlError),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

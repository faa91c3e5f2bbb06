//! CLI error types and exit codes.

use std::io;
use std::path::PathBuf;

use overmapper::{IndexError, RenderError};
use thiserror::Error;

/// Exit code for a bad invocation or invalid option values.
pub const EXIT_USAGE: u8 = 1;

/// Exit code for discovery, decode, render or output-create failures.
pub const EXIT_FAILURE: u8 = 2;

/// Exit code for a PNG encoding failure.
pub const EXIT_ENCODE: u8 = 3;

/// Errors surfaced to the user by the `overmapper` binary.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),

    #[error(transparent)]
    Index(#[from] IndexError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("failed to create {}: {source}", .path.display())]
    CreateOutput {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to encode PNG to {}: {source}", .path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

impl CliError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            CliError::Usage(_) => EXIT_USAGE,
            CliError::Index(_) | CliError::Render(_) | CliError::CreateOutput { .. } => {
                EXIT_FAILURE
            }
            CliError::Encode { .. } => EXIT_ENCODE,
        }
    }
}

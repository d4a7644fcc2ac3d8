//! Destination for a retrieved PDF/PS payload.

use std::io::Write;
use std::path::PathBuf;

use tracing::info;

/// Errors writing the retrieved payload.
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    /// The output path exists and overwriting was not permitted.
    #[error("output file {} already exists (use --force to overwrite)", path.display())]
    AlreadyExists {
        /// The refused output path.
        path: PathBuf,
    },

    /// Filesystem or stream write failure.
    #[error("failed to write payload to {dest}: {source}")]
    Io {
        /// Human-readable destination description.
        dest: String,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

/// Where the document bytes go once found.
#[derive(Debug, Clone)]
pub enum Sink {
    /// Stream the payload verbatim to standard output.
    Stdout,
    /// Write the payload to a file path.
    File {
        /// Destination path.
        path: PathBuf,
        /// Whether an existing file may be overwritten.
        force: bool,
    },
}

impl Sink {
    /// Builds a sink from an optional save path.
    #[must_use]
    pub fn from_path(path: Option<PathBuf>, force: bool) -> Self {
        match path {
            Some(path) => Self::File { path, force },
            None => Self::Stdout,
        }
    }

    /// Writes the payload bytes verbatim.
    ///
    /// # Errors
    ///
    /// Returns [`OutputError::AlreadyExists`] when the destination file
    /// exists and `force` is not set, or [`OutputError::Io`] on a write
    /// failure.
    pub async fn write(&self, payload: &[u8]) -> Result<(), OutputError> {
        match self {
            Self::Stdout => {
                info!("writing contents to stdout");
                let mut stdout = std::io::stdout().lock();
                stdout
                    .write_all(payload)
                    .and_then(|()| stdout.flush())
                    .map_err(|source| OutputError::Io {
                        dest: "stdout".to_string(),
                        source,
                    })
            }
            Self::File { path, force } => {
                if path.exists() {
                    if !force {
                        return Err(OutputError::AlreadyExists { path: path.clone() });
                    }
                    info!(path = %path.display(), "file already exists, overwriting");
                } else {
                    info!(path = %path.display(), "writing contents to file");
                }
                tokio::fs::write(path, payload)
                    .await
                    .map_err(|source| OutputError::Io {
                        dest: path.display().to_string(),
                        source,
                    })
            }
        }
    }
}

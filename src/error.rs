use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to read from stdin: {0}")]
    Stdin(#[source] std::io::Error),
    #[error("invalid snapshot JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("theme error: {message}")]
    Theme { message: String },
    #[error("render error: {message}")]
    Render { message: String },
    #[error("no output path given")]
    MissingOutput,
    #[error("unsupported output format: .{extension} (use .svg, .png or .pdf)")]
    UnsupportedFormat { extension: String },
}

impl Error {
    pub(crate) fn theme(message: impl Into<String>) -> Self {
        Self::Theme {
            message: message.into(),
        }
    }

    pub(crate) fn render(message: impl Into<String>) -> Self {
        Self::Render {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

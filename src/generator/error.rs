//! Generation error types

use crate::element::RenderError;
use thiserror::Error;

/// Errors raised while compiling a forwarder spec
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("output '{output}': invalid url '{url}': {source}")]
    InvalidUrl {
        output: String,
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("output '{output}': unsupported scheme '{scheme}', expected http or https")]
    UnsupportedScheme { output: String, scheme: String },

    #[error("internal render error: {0}")]
    Render(#[from] RenderError),
}

impl GenerateError {
    /// Name of the output the error belongs to, if it is output-specific
    pub fn output(&self) -> Option<&str> {
        match self {
            GenerateError::InvalidUrl { output, .. }
            | GenerateError::UnsupportedScheme { output, .. } => Some(output),
            GenerateError::Render(_) => None,
        }
    }
}

//! logfwd - compiles log forwarding pipelines into collector configuration

pub mod cli;
pub mod core;
pub mod element;
pub mod generator;

// Re-export commonly used types
pub use crate::core::{ForwarderConfig, OutputSpec, PipelineSpec, SecretBundle, SecretStore, BufferPolicy};
pub use element::{Block, Fragment, RenderError};
pub use generator::{Generated, GenerateError, Generator};

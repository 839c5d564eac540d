//! Core domain models for log forwarding
//!
//! This module defines the forwarder spec (pipelines and outputs), the
//! credential material outputs reference, the shared buffer policy, and
//! the naming rules that map spec names onto the collector DSL.

pub mod config;
pub mod naming;
pub mod policy;
pub mod secret;

pub use config::{ForwarderConfig, OutputSpec, OutputType, PipelineSpec};
pub use policy::{BufferOverrides, BufferPolicy};
pub use secret::{SecretBundle, SecretStore};

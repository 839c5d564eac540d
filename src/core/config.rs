//! Forwarder specification loaded from YAML

use crate::core::policy::{BufferOverrides, BufferPolicy};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Top-level forwarder specification
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ForwarderConfig {
    /// Output destinations
    #[serde(default)]
    pub outputs: Vec<OutputSpec>,

    /// Routing pipelines
    #[serde(default)]
    pub pipelines: Vec<PipelineSpec>,

    /// Fallback overrides for buffer tunables
    #[serde(default)]
    pub buffer: Option<BufferOverrides>,
}

/// A named routing pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineSpec {
    /// Unique pipeline name
    pub name: String,

    /// Log sources feeding this pipeline
    #[serde(default)]
    pub input_refs: Vec<String>,

    /// Outputs receiving every record, in order
    pub output_refs: Vec<String>,
}

/// Kind of destination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputType {
    Elasticsearch,
}

/// Reference to the secret holding an output's credentials
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputSecretSpec {
    pub name: String,
}

/// A named output destination
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputSpec {
    /// Unique output name
    pub name: String,

    #[serde(rename = "type")]
    pub output_type: OutputType,

    /// Destination URL: scheme, host and port
    pub url: String,

    #[serde(default)]
    pub secret: Option<OutputSecretSpec>,
}

impl PipelineSpec {
    pub fn new(name: impl Into<String>, output_refs: &[&str]) -> Self {
        Self {
            name: name.into(),
            input_refs: Vec::new(),
            output_refs: output_refs.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl OutputSpec {
    /// Elasticsearch output without a secret
    pub fn elasticsearch(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            output_type: OutputType::Elasticsearch,
            url: url.into(),
            secret: None,
        }
    }

    pub fn with_secret(mut self, secret_name: impl Into<String>) -> Self {
        self.secret = Some(OutputSecretSpec {
            name: secret_name.into(),
        });
        self
    }

    /// Name of the referenced secret, if any
    pub fn secret_name(&self) -> Option<&str> {
        self.secret.as_ref().map(|s| s.name.as_str())
    }
}

impl ForwarderConfig {
    /// Load forwarder configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse forwarder configuration from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: ForwarderConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate names and references
    pub fn validate(&self) -> Result<()> {
        let mut output_names = HashSet::new();
        for output in &self.outputs {
            if output.name.trim().is_empty() {
                anyhow::bail!("Output with empty name");
            }
            if !output_names.insert(output.name.as_str()) {
                anyhow::bail!("Duplicate output name: {}", output.name);
            }
            if output.url.trim().is_empty() {
                anyhow::bail!("Output '{}' has no url", output.name);
            }
            if let Some(secret) = &output.secret {
                if secret.name.trim().is_empty() {
                    anyhow::bail!("Output '{}' references a secret with an empty name", output.name);
                }
            }
        }

        let mut pipeline_names = HashSet::new();
        for pipeline in &self.pipelines {
            if pipeline.name.trim().is_empty() {
                anyhow::bail!("Pipeline with empty name");
            }
            if !pipeline_names.insert(pipeline.name.as_str()) {
                anyhow::bail!("Duplicate pipeline name: {}", pipeline.name);
            }
            if pipeline.output_refs.is_empty() {
                anyhow::bail!("Pipeline '{}' has no output_refs", pipeline.name);
            }
            for output_ref in &pipeline.output_refs {
                if !output_names.contains(output_ref.as_str()) {
                    anyhow::bail!(
                        "Pipeline '{}' references non-existent output '{}'",
                        pipeline.name,
                        output_ref
                    );
                }
            }
        }

        Ok(())
    }

    /// Buffer policy with this spec's overrides applied
    pub fn buffer_policy(&self) -> BufferPolicy {
        match &self.buffer {
            Some(overrides) => BufferPolicy::with_overrides(overrides),
            None => BufferPolicy::default(),
        }
    }
}

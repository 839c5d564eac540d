//! Configuration generation
//!
//! Combines the pipeline router and the per-output builders into one
//! rendered collector configuration.

pub mod elasticsearch;
pub mod error;
pub mod router;

pub use elasticsearch::Elasticsearch;
pub use error::GenerateError;
pub use router::{pipeline_to_outputs, route};

use crate::core::config::{ForwarderConfig, OutputSpec, OutputType, PipelineSpec};
use crate::core::policy::BufferPolicy;
use crate::core::secret::{SecretBundle, SecretStore};
use crate::element::{render, Block, Fragment};
use tracing::{debug, info, warn};

/// Compiles one output into its label block
///
/// Builders fail only when the output's connection details cannot be
/// parsed; missing secrets or secret fields just omit parameters.
pub trait OutputBuilder: Send + Sync {
    fn build(
        &self,
        output: &OutputSpec,
        secret: Option<&SecretBundle>,
        policy: &BufferPolicy,
    ) -> Result<Block, GenerateError>;
}

/// Builder responsible for an output type
pub fn builder_for(output_type: OutputType) -> &'static dyn OutputBuilder {
    match output_type {
        OutputType::Elasticsearch => &Elasticsearch,
    }
}

/// Result of a generation run
#[derive(Debug)]
pub struct Generated {
    /// Rendered configuration
    pub conf: String,

    /// Outputs that could not be built; their labels are missing from `conf`
    pub failures: Vec<GenerateError>,
}

impl Generated {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Render fragments into the final configuration text
pub fn generate_conf(fragments: &[Fragment]) -> Result<String, GenerateError> {
    Ok(render(fragments)?)
}

/// Configuration generator
#[derive(Debug, Clone, Default)]
pub struct Generator {
    policy: BufferPolicy,
}

impl Generator {
    pub fn new(policy: BufferPolicy) -> Self {
        Self { policy }
    }

    /// Generator using the buffer overrides of a forwarder spec
    pub fn from_config(config: &ForwarderConfig) -> Self {
        Self::new(config.buffer_policy())
    }

    pub fn policy(&self) -> &BufferPolicy {
        &self.policy
    }

    /// Build the label for one output
    pub fn build_output(
        &self,
        output: &OutputSpec,
        secret: Option<&SecretBundle>,
    ) -> Result<Block, GenerateError> {
        debug!("Building {:?} output {}", output.output_type, output.name);
        builder_for(output.output_type).build(output, secret, &self.policy)
    }

    /// Generate the full configuration: pipeline labels first, then one
    /// label per output, each in declaration order.
    ///
    /// An output whose URL is malformed is left out and reported in
    /// [`Generated::failures`]; everything else is still generated. Only a
    /// structural render failure aborts the run.
    pub fn generate(
        &self,
        pipelines: &[PipelineSpec],
        outputs: &[OutputSpec],
        secrets: &SecretStore,
    ) -> Result<Generated, GenerateError> {
        let mut fragments = route(pipelines, outputs);
        let mut failures = Vec::new();

        for output in outputs {
            let secret = output.secret_name().and_then(|name| secrets.get(name));
            if output.secret.is_some() && secret.is_none() {
                debug!("Secret for output {} not found, emitting no credentials", output.name);
            }

            match self.build_output(output, secret) {
                Ok(block) => fragments.push(block.into()),
                Err(e) => {
                    warn!("Skipping output {}: {}", output.name, e);
                    failures.push(e);
                }
            }
        }

        let conf = generate_conf(&fragments)?;
        info!(
            "Generated configuration for {} pipeline(s) and {} output(s)",
            pipelines.len(),
            outputs.len() - failures.len()
        );

        Ok(Generated { conf, failures })
    }

    /// Generate from a loaded forwarder spec
    pub fn generate_config(
        &self,
        config: &ForwarderConfig,
        secrets: &SecretStore,
    ) -> Result<Generated, GenerateError> {
        self.generate(&config.pipelines, &config.outputs, secrets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_orders_pipelines_before_outputs() {
        let outputs = vec![OutputSpec::elasticsearch("es", "http://es:9200")];
        let pipelines = vec![PipelineSpec::new("app", &["es"])];

        let generated = Generator::default()
            .generate(&pipelines, &outputs, &SecretStore::new())
            .unwrap();

        assert!(generated.is_complete());
        let pipeline_at = generated.conf.find("<label @APP>").unwrap();
        let output_at = generated.conf.find("<label @ES>").unwrap();
        assert!(pipeline_at < output_at);
    }

    #[test]
    fn test_bad_output_is_isolated() {
        let outputs = vec![
            OutputSpec::elasticsearch("broken", "::nope::"),
            OutputSpec::elasticsearch("good", "https://es:9200"),
        ];
        let pipelines = vec![PipelineSpec::new("app", &["broken", "good"])];

        let generated = Generator::default()
            .generate(&pipelines, &outputs, &SecretStore::new())
            .unwrap();

        assert_eq!(generated.failures.len(), 1);
        assert_eq!(generated.failures[0].output(), Some("broken"));
        assert!(generated.conf.contains("<label @APP>"));
        assert!(generated.conf.contains("<label @GOOD>"));
        assert!(!generated.conf.contains("<label @BROKEN>"));
    }

    #[test]
    fn test_missing_secret_behaves_as_empty() {
        let outputs = vec![OutputSpec::elasticsearch("es", "https://es:9200").with_secret("absent")];

        let generated = Generator::default()
            .generate(&[], &outputs, &SecretStore::new())
            .unwrap();

        assert!(generated.is_complete());
        assert!(!generated.conf.contains("user "));
        assert!(!generated.conf.contains("ca_file"));
    }

    #[test]
    fn test_secret_resolved_by_name() {
        let mut secrets = SecretStore::new();
        secrets.insert(SecretBundle::new("es-secret").with_ca_bundle("ca"));
        let outputs = vec![OutputSpec::elasticsearch("es", "https://es:9200").with_secret("es-secret")];

        let generated = Generator::default()
            .generate(&[], &outputs, &secrets)
            .unwrap();

        assert!(generated
            .conf
            .contains("ca_file '/var/run/ocp-collector/secrets/es-secret/ca-bundle.crt'"));
    }

    #[test]
    fn test_generate_conf_surfaces_render_errors() {
        let err = generate_conf(&[Block::new("").into()]).unwrap_err();
        assert!(matches!(err, GenerateError::Render(_)));
    }
}

//! Elasticsearch output label
//!
//! Each output compiles to one `<label>` holding two shared filters and a
//! pair of `<match>` blocks: a retry match that consumes records re-emitted
//! under the retry tag, and the primary match that catches everything else
//! and re-emits failures under that tag.

use crate::core::config::OutputSpec;
use crate::core::naming::{retry_tag, to_label, to_tag};
use crate::core::policy::BufferPolicy;
use crate::core::secret::{keys, SecretBundle};
use crate::element::{Block, Directive};
use crate::generator::{GenerateError, OutputBuilder};
use url::{Host, ParseError, Url};

/// Pinned TLS version for secure endpoints
pub const TLS_VERSION: &str = "TLSv1_2";

/// Record field holding the target index
pub const INDEX_KEY: &str = "viaq_index_name";

/// Record field holding the document id
pub const ID_KEY: &str = "viaq_msg_id";

/// 2^31
pub const REQUEST_TIMEOUT: u64 = 2_147_483_648;

const FLATTEN_LABELS: &str = r##"${!record['kubernetes'].nil? ? record['kubernetes'].merge({"flat_labels": (record['kubernetes']['labels']||{}).map{|k,v| "#{k}=#{v}"}}) : {} }"##;

/// Builder for `type: elasticsearch` outputs
#[derive(Debug, Clone, Copy, Default)]
pub struct Elasticsearch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scheme {
    Http,
    Https,
}

impl Scheme {
    fn as_str(self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Endpoint {
    scheme: Scheme,
    host: String,
    port: u16,
}

impl Endpoint {
    fn parse(output: &OutputSpec) -> Result<Self, GenerateError> {
        let url = Url::parse(&output.url).map_err(|source| GenerateError::InvalidUrl {
            output: output.name.clone(),
            url: output.url.clone(),
            source,
        })?;

        let scheme = match url.scheme() {
            "http" => Scheme::Http,
            "https" => Scheme::Https,
            other => {
                return Err(GenerateError::UnsupportedScheme {
                    output: output.name.clone(),
                    scheme: other.to_string(),
                })
            }
        };

        let invalid = |source: ParseError| GenerateError::InvalidUrl {
            output: output.name.clone(),
            url: output.url.clone(),
            source,
        };

        // IPv6 literals are written without their URL brackets
        let host = match url.host().ok_or_else(|| invalid(ParseError::EmptyHost))? {
            Host::Domain(domain) => domain.to_string(),
            Host::Ipv4(addr) => addr.to_string(),
            Host::Ipv6(addr) => addr.to_string(),
        };

        let port = url
            .port_or_known_default()
            .ok_or_else(|| invalid(ParseError::InvalidPort))?;

        Ok(Self { scheme, host, port })
    }
}

impl OutputBuilder for Elasticsearch {
    fn build(
        &self,
        output: &OutputSpec,
        secret: Option<&SecretBundle>,
        policy: &BufferPolicy,
    ) -> Result<Block, GenerateError> {
        let endpoint = Endpoint::parse(output)?;
        let tag = to_tag(&output.name);
        let retry = retry_tag(&output.name);

        let retry_match = match_block(&retry, &retry, None, &endpoint, secret, policy);
        let primary_match = match_block("**", &tag, Some(&retry), &endpoint, secret, policy);

        Ok(Block::label(to_label(&output.name))
            .child(remove_structured_filter())
            .child(flatten_labels_filter())
            .child(retry_match)
            .child(primary_match))
    }
}

fn remove_structured_filter() -> Block {
    Block::filter("**")
        .comment("#remove structured field if present")
        .directive("@type", "record_modifier")
        .directive("remove_keys", "structured")
}

fn flatten_labels_filter() -> Block {
    Block::filter("**")
        .comment("#flatten labels to prevent field explosion in ES")
        .directive("@type", "record_transformer")
        .directive("enable_ruby", "true")
        .child(Block::new("record").directive("kubernetes", FLATTEN_LABELS))
        .directive("remove_keys", "$.kubernetes.labels")
}

/// A `<match>` sending to the endpoint; `retry_to` is set on the primary only
fn match_block(
    pattern: &str,
    id: &str,
    retry_to: Option<&str>,
    endpoint: &Endpoint,
    secret: Option<&SecretBundle>,
    policy: &BufferPolicy,
) -> Block {
    let mut block = Block::matching(pattern)
        .directive("@type", "elasticsearch")
        .directive("@id", id)
        .directive("host", endpoint.host.as_str())
        .directive("port", endpoint.port.to_string())
        .directive("verify_es_version_at_startup", "false")
        .directive("scheme", endpoint.scheme.as_str());

    if endpoint.scheme == Scheme::Https {
        block = block.directive("ssl_version", TLS_VERSION);
    }

    block = block
        .directives(credential_directives(secret))
        .directive("target_index_key", INDEX_KEY)
        .directive("id_key", ID_KEY)
        .directive("remove_keys", INDEX_KEY)
        .directive("type_name", "_doc");

    if let Some(retry) = retry_to {
        block = block.directive("retry_tag", retry);
    }

    block
        .directive("http_backend", "typhoeus")
        .directive("write_operation", "create")
        .quoted("reload_connections", "true")
        .line_comment("# https://github.com/uken/fluent-plugin-elasticsearch#reload-after")
        .quoted("reload_after", "200")
        .line_comment("# https://github.com/uken/fluent-plugin-elasticsearch#sniffer-class-name")
        .quoted("sniffer_class_name", "Fluent::Plugin::ElasticsearchSimpleSniffer")
        .directive("reload_on_failure", "false")
        .line_comment("# 2 ^ 31")
        .directive("request_timeout", REQUEST_TIMEOUT.to_string())
        .child(buffer_block(&policy.buffer_path(id), policy))
}

/// Auth and TLS parameters for whichever secret fields are present
///
/// Username and password are read from the mounted secret when the
/// collector starts; the generated text never holds their values.
fn credential_directives(secret: Option<&SecretBundle>) -> Vec<Directive> {
    let Some(secret) = secret else {
        return Vec::new();
    };

    let mut directives = Vec::new();
    if secret.username.is_some() {
        directives.push(Directive::double(
            "user",
            read_if_exists(&secret.mount_path(keys::USERNAME)),
        ));
    }
    if secret.password.is_some() {
        directives.push(Directive::double(
            "password",
            read_if_exists(&secret.mount_path(keys::PASSWORD)),
        ));
    }
    if secret.tls_key.is_some() {
        directives.push(Directive::single("client_key", secret.mount_path(keys::TLS_KEY)));
    }
    if secret.tls_crt.is_some() {
        directives.push(Directive::single("client_cert", secret.mount_path(keys::TLS_CRT)));
    }
    if secret.ca_bundle.is_some() {
        directives.push(Directive::single("ca_file", secret.mount_path(keys::CA_BUNDLE)));
    }
    directives
}

/// Expression evaluating to the file's content, or empty when it is missing
fn read_if_exists(path: &str) -> String {
    format!(
        "#{{File.exists?('{path}') ? open('{path}','r') do |f|f.read end : ''}}",
        path = path
    )
}

fn buffer_block(path: &str, policy: &BufferPolicy) -> Block {
    Block::new("buffer")
        .directive("@type", "file")
        .quoted("path", path)
        .directive("flush_mode", policy.flush_mode.as_str())
        .directive("flush_interval", policy.flush_interval.as_str())
        .directive("flush_thread_count", policy.flush_thread_count.to_string())
        .directive("retry_type", policy.retry_type.as_str())
        .directive("retry_wait", policy.retry_wait.as_str())
        .directive("retry_max_interval", policy.retry_max_interval.as_str())
        .directive("retry_timeout", policy.retry_timeout.as_str())
        .double_quoted(
            "queued_chunks_limit_size",
            policy.queued_chunks_limit_size.expression(),
        )
        .double_quoted("total_limit_size", policy.total_limit_size.expression())
        .double_quoted("chunk_limit_size", policy.chunk_limit_size.expression())
        .directive("overflow_action", policy.overflow_action.as_str())
}

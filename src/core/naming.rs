//! Identifier derivation for labels and tags
//!
//! Pipeline and output names are free-form (`my-secure-pipeline`), but the
//! collector DSL wants `@UPPER_SNAKE` labels and `lower_snake` tags.

use regex::Regex;
use std::sync::OnceLock;

/// Sigil that marks a label reference in the collector DSL
pub const LABEL_SIGIL: &str = "@";

/// Prefix of the tag used to route records that failed delivery
pub const RETRY_PREFIX: &str = "retry_";

fn non_alphanumeric_runs() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^a-zA-Z0-9]+").expect("static pattern is valid"))
}

fn replace_runs(name: &str) -> String {
    non_alphanumeric_runs().replace_all(name, "_").into_owned()
}

/// Label form of a name: `my-pipeline` → `@MY_PIPELINE`
pub fn to_label(name: &str) -> String {
    format!("{}{}", LABEL_SIGIL, replace_runs(&name.to_uppercase()))
}

/// Tag form of a name: `My-Output` → `my_output`
pub fn to_tag(name: &str) -> String {
    replace_runs(&name.to_lowercase())
}

/// Tag used by the retry match of an output
pub fn retry_tag(name: &str) -> String {
    format!("{}{}", RETRY_PREFIX, to_tag(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_label() {
        assert_eq!(to_label("my-secure-pipeline"), "@MY_SECURE_PIPELINE");
        assert_eq!(to_label("oncluster-elasticsearch"), "@ONCLUSTER_ELASTICSEARCH");
    }

    #[test]
    fn test_to_label_collapses_runs() {
        assert_eq!(to_label("a--b..c"), "@A_B_C");
        assert_eq!(to_label("es.prod/2"), "@ES_PROD_2");
    }

    #[test]
    fn test_to_tag() {
        assert_eq!(to_tag("Other-Elasticsearch"), "other_elasticsearch");
        assert_eq!(to_tag("plain"), "plain");
    }

    #[test]
    fn test_retry_tag() {
        assert_eq!(retry_tag("other-elasticsearch"), "retry_other_elasticsearch");
    }

    #[test]
    fn test_label_and_tag_agree_on_shape() {
        let name = "some.mixed-Name_42";
        assert_eq!(to_label(name), format!("@{}", to_tag(name).to_uppercase()));
    }
}

//! Pipeline to output routing
//!
//! Every pipeline becomes a label whose single `<match **>` relabels
//! records to its outputs. With more than one output the match copies
//! each record to every output independently.

use crate::core::config::{OutputSpec, PipelineSpec};
use crate::core::naming::to_label;
use crate::element::{Block, Fragment};
use std::collections::HashSet;
use tracing::{debug, warn};

/// Build one routing label per pipeline, in pipeline order
///
/// Pipelines without outputs route nowhere and are left out.
pub fn route(pipelines: &[PipelineSpec], outputs: &[OutputSpec]) -> Vec<Fragment> {
    let known: HashSet<&str> = outputs.iter().map(|o| o.name.as_str()).collect();

    pipelines
        .iter()
        .filter(|pipeline| {
            if pipeline.output_refs.is_empty() {
                warn!("Pipeline {} has no outputs, skipping", pipeline.name);
                return false;
            }
            true
        })
        .map(|pipeline| {
            for output_ref in &pipeline.output_refs {
                if !known.contains(output_ref.as_str()) {
                    warn!(
                        "Pipeline {} routes to unknown output {}",
                        pipeline.name, output_ref
                    );
                }
            }
            Fragment::Block(pipeline_to_outputs(pipeline))
        })
        .collect()
}

/// Routing label for a single pipeline
pub fn pipeline_to_outputs(pipeline: &PipelineSpec) -> Block {
    debug!(
        "Routing pipeline {} to {} output(s)",
        pipeline.name,
        pipeline.output_refs.len()
    );

    let label = Block::label(to_label(&pipeline.name));

    match pipeline.output_refs.as_slice() {
        [] => label,
        [single] => label
            .comment(format!(
                "# Sending pipeline {} to output {}",
                pipeline.name, single
            ))
            .child(relabel(Block::matching("**"), single)),
        refs => {
            let stores = refs
                .iter()
                .map(|output_ref| relabel(Block::new("store"), output_ref));
            label
                .comment(format!("# Copying pipeline {} to outputs", pipeline.name))
                .child(
                    Block::matching("**")
                        .directive("@type", "copy")
                        .children(stores),
                )
        }
    }
}

fn relabel(block: Block, output_name: &str) -> Block {
    block
        .directive("@type", "relabel")
        .directive("@label", to_label(output_name))
}

//! Graph builder: turns parsed records into add_node/add_edge calls.
//!
//! The builder never owns a graph. It feeds whatever [`GraphSink`] the caller
//! passes in and hands it back, so both renderers share the same code path.

use crate::render::GraphSink;
use crate::types::{FilterPolicy, ZettelRecord};
use std::collections::HashSet;

/// Populate `sink` from `records` according to `policy`.
///
/// Every record becomes a node. A link becomes an edge unless its target is
/// filtered out by `only_listed` or it is a self-reference and
/// `include_self_references` is off. Edge deduplication is the sink's job.
pub fn build_graph<'a, S: GraphSink + ?Sized>(
    records: &[ZettelRecord],
    sink: &'a mut S,
    policy: &FilterPolicy,
) -> &'a mut S {
    let zettel_ids: HashSet<&str> = records.iter().map(|r| r.id.as_str()).collect();
    let ids_to_include: HashSet<&str> = if policy.only_listed {
        zettel_ids
    } else {
        records
            .iter()
            .flat_map(|r| std::iter::once(r.id.as_str()).chain(r.links.iter().map(String::as_str)))
            .collect()
    };

    let mut skipped = 0usize;
    for record in records {
        sink.add_node(&record.id, &record.title);

        for link in &record.links {
            if !ids_to_include.contains(link.as_str()) {
                skipped += 1;
                continue;
            }
            if link == &record.id && !policy.include_self_references {
                skipped += 1;
                continue;
            }
            sink.add_edge(&record.id, link);
        }
    }

    tracing::debug!(
        "Built graph from {} zettel(s), {} link(s) filtered out",
        records.len(),
        skipped
    );
    sink
}

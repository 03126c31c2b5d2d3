//! The linkability probe
//!
//! Crossfiltering is all-or-nothing per dashboard: one trace that cannot
//! react to filtering would silently break linking, so the whole dashboard
//! falls back to unlinked rendering instead. The probe runs before any
//! filter state is built and has no side effects.

use crate::trace::{self, ChartType, PathSegment, TraceDef};
use serde_json::Value;
use std::collections::BTreeSet;

/// The fixed set of filter-reactive chart types
pub fn default_allow_list() -> BTreeSet<ChartType> {
    [
        ChartType::Bar,
        ChartType::Box,
        ChartType::Choropleth,
        ChartType::Histogram,
        ChartType::Pie,
        ChartType::Scatter,
        ChartType::Scatter3d,
        ChartType::ScatterGeo,
        ChartType::ScatterMapbox,
        ChartType::Table,
    ]
    .into_iter()
    .collect()
}

/// Decide whether a set of traces may be linked
///
/// Three independent conditions, all required:
/// 1. every trace's chart type is in the allow-list;
/// 2. every trace has at least one grid-backed attribute;
/// 3. all grid-backed columns report the same record count.
pub fn is_linkable(traces: &[&TraceDef], allow_list: &BTreeSet<ChartType>) -> bool {
    if traces.is_empty() {
        return false;
    }

    let all_types_allowed = traces.iter().all(|t| allow_list.contains(&t.chart_type));

    let mut lengths = BTreeSet::new();
    let mut every_trace_bound = true;
    for tr in traces {
        let mut bound = 0usize;
        let is_table = tr.chart_type == ChartType::Table;
        trace::walk_attributes(&tr.attributes, &mut |key, node, path| {
            if !trace::is_src_attribute(key) {
                return;
            }
            bound += 1;

            // Header columns hold labels, not records; they do not take part
            // in the length check.
            let root = match path.first() {
                Some(PathSegment::Key(k)) => Some(k.as_str()),
                _ => None,
            };
            if is_table && root == Some("header") {
                return;
            }

            let field = trace::base_attribute_name(key);
            match node.get(field) {
                Some(Value::Array(items)) if is_table && root == Some("cells") => {
                    for sub_column in items {
                        if let Value::Array(column) = sub_column {
                            lengths.insert(column.len());
                        }
                    }
                }
                Some(Value::Array(items)) => {
                    lengths.insert(items.len());
                }
                _ => {}
            }
        });
        if bound == 0 {
            every_trace_bound = false;
        }
    }

    let identical_lengths = lengths.len() < 2;

    all_types_allowed && every_trace_bound && identical_lengths
}

//! Field source extraction
//!
//! A field source binds one rendered attribute of one panel trace to one
//! grid column. The registry walks each trace's attribute tree once at
//! registration time and records, per column, every binding that reads it.

use crate::grid::CellValue;
use crate::panel::PanelId;
use crate::trace::{self, AttrPath, ChartType, PathSegment, TraceDef};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

/// Binding between one grid column and one rendered attribute of one trace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSource {
    pub panel: PanelId,
    pub trace_index: usize,
    /// The marker attribute that declared the binding, e.g. `xsrc`
    pub src_attribute: String,
    /// Path to the data attribute the binding overwrites, e.g.
    /// `cells.values[1]`
    pub path: AttrPath,
    pub column: String,
    /// Column data captured at registration time
    pub data: Vec<CellValue>,
    /// Reserved for per-field constraints
    pub constrained: bool,
}

/// Extract every field source declared by one trace
pub fn collect_field_sources(
    panel: &PanelId,
    trace_index: usize,
    trace: &TraceDef,
) -> Vec<FieldSource> {
    let mut sources = Vec::new();
    let is_table = trace.chart_type == ChartType::Table;

    trace::walk_attributes(&trace.attributes, &mut |key, node, path| {
        if !trace::is_src_attribute(key) {
            return;
        }
        // Table headers are populated from the grid but must not change when
        // filtering eliminates rows, so they never become field sources.
        if is_table && matches!(path.first(), Some(PathSegment::Key(k)) if k == "header") {
            return;
        }
        let Some(reference) = node.get(key).and_then(Value::as_str) else {
            return;
        };
        let column_id = trace::column_ref_id(reference);
        if column_id.is_empty() {
            return;
        }

        let field_name = trace::base_attribute_name(key);
        let in_cells =
            is_table && matches!(path.first(), Some(PathSegment::Key(k)) if k == "cells");

        if in_cells {
            // Several columns are packed into one marker value, comma-joined,
            // because the cell values attribute is itself a list of columns.
            for (sub_index, column) in column_id.replace('*', "").split(',').enumerate() {
                if column.is_empty() {
                    continue;
                }
                let path = AttrPath::from_segments(path.to_vec())
                    .key(field_name)
                    .index(sub_index);
                let data = node
                    .get(field_name)
                    .and_then(|v| v.get(sub_index))
                    .and_then(Value::as_array)
                    .map(|items| column_data(items))
                    .unwrap_or_default();
                sources.push(FieldSource {
                    panel: panel.clone(),
                    trace_index,
                    src_attribute: key.to_string(),
                    path,
                    column: column.to_string(),
                    data,
                    constrained: false,
                });
            }
        } else {
            let data = match node.get(field_name).and_then(Value::as_array) {
                Some(items) => column_data(items),
                None => {
                    warn!(
                        "grid-backed attribute '{}' of column '{}' has no array data; treating as empty",
                        key, column_id
                    );
                    Vec::new()
                }
            };
            sources.push(FieldSource {
                panel: panel.clone(),
                trace_index,
                src_attribute: key.to_string(),
                path: AttrPath::from_segments(path.to_vec()).key(field_name),
                column: column_id.to_string(),
                data,
                constrained: false,
            });
        }
    });

    sources
}

fn column_data(items: &[Value]) -> Vec<CellValue> {
    items.iter().filter_map(CellValue::from_json).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scatter_trace_yields_one_source_per_axis() {
        let trace = TraceDef::with_uid(
            ChartType::Scatter,
            "t0",
            json!({
                "xsrc": "user:42:a",
                "x": [1, 2, 3],
                "ysrc": "user:42:b",
                "y": ["p", "q", "r"],
                "marker": { "color": "#444" }
            }),
        );
        let mut sources = collect_field_sources(&PanelId::from("p1"), 0, &trace);
        sources.sort_by(|a, b| a.column.cmp(&b.column));

        assert_eq!(sources.len(), 2);
        assert_eq!(sources[0].column, "a");
        assert_eq!(sources[0].path.to_attr_string(), "x");
        assert_eq!(sources[0].data.len(), 3);
        assert_eq!(sources[1].column, "b");
        assert_eq!(sources[1].path.to_attr_string(), "y");
    }

    #[test]
    fn test_table_cells_expand_per_subcolumn() {
        let trace = TraceDef::with_uid(
            ChartType::Table,
            "t0",
            json!({
                "header": { "valuessrc": "user:42:names", "values": ["A", "B"] },
                "cells": {
                    "valuessrc": "user:42:*col1,col2",
                    "values": [[1, 2, 3], [4, 5, 6]]
                }
            }),
        );
        let sources = collect_field_sources(&PanelId::from("p1"), 0, &trace);

        assert_eq!(sources.len(), 2);
        assert_eq!(sources[0].column, "col1");
        assert_eq!(sources[0].path.to_attr_string(), "cells.values[0]");
        assert_eq!(sources[0].data, vec![1.into(), 2.into(), 3.into()]);
        assert_eq!(sources[1].column, "col2");
        assert_eq!(sources[1].path.to_attr_string(), "cells.values[1]");
    }

    #[test]
    fn test_nested_transform_sources_are_found() {
        let trace = TraceDef::with_uid(
            ChartType::Scatter,
            "t0",
            json!({
                "xsrc": "u:1:a",
                "x": [1, 2],
                "transforms": [
                    { "groupssrc": "u:1:g", "groups": ["p", "q"] }
                ]
            }),
        );
        let sources = collect_field_sources(&PanelId::from("p1"), 0, &trace);
        let groups = sources.iter().find(|s| s.column == "g").unwrap();
        assert_eq!(groups.path.to_attr_string(), "transforms[0].groups");
    }

    #[test]
    fn test_missing_column_data_degrades_to_empty() {
        let trace = TraceDef::with_uid(
            ChartType::Scatter,
            "t0",
            json!({ "xsrc": "u:1:a" }),
        );
        let sources = collect_field_sources(&PanelId::from("p1"), 0, &trace);
        assert_eq!(sources.len(), 1);
        assert!(sources[0].data.is_empty());
    }
}

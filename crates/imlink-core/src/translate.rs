//! Selection translation
//!
//! Converts render-layer interaction events into the set of original record
//! indices they select. Decoding is chart-type specific: scatter-like types
//! carry record indices directly, histograms name bins that expand into the
//! records aggregated into them, and pies address slices by label and toggle
//! instead of narrowing.

use crate::event::{EventPoint, SelectionEvent};
use crate::panel::PanelEntry;
use crate::trace::ChartType;
use serde_json::Value;
use std::collections::BTreeSet;

/// Pre-filter raw event points per chart-type event semantics
///
/// `constrained` is whether the panel's own dimension held a filter when the
/// event arrived; it drives the pie click-to-reset toggle.
pub fn event_points(
    panel: &PanelEntry,
    constrained: bool,
    event: Option<&SelectionEvent>,
) -> Vec<EventPoint> {
    let Some(primary) = panel.primary_type() else {
        return Vec::new();
    };

    // Pies toggle: any click while constrained clears the filter. The salient
    // overlay fully covers the original slices, so the overlay guard below
    // must not apply here.
    if *primary == ChartType::Pie {
        if constrained {
            return Vec::new();
        }
        return event.map(|e| e.points.clone()).unwrap_or_default();
    }

    let points = if *primary == ChartType::Histogram {
        expand_histogram_bins(panel, event)
    } else {
        event.map(|e| e.points.clone()).unwrap_or_default()
    };

    // Points on the temporary salient overlay (curves past the original
    // trace set, or a uid that no longer matches) must not feed translation.
    points
        .into_iter()
        .filter(|p| {
            p.curve_number < panel.original_trace_count()
                && p.trace_uid
                    .as_deref()
                    .map_or(true, |uid| panel.trace_uid(p.curve_number) == Some(uid))
        })
        .collect()
}

/// Expand bin-addressed event points into per-record points
fn expand_histogram_bins(panel: &PanelEntry, event: Option<&SelectionEvent>) -> Vec<EventPoint> {
    let mut points = Vec::new();
    let Some(event) = event else {
        return points;
    };
    for p in &event.points {
        let indices = match &p.point_numbers {
            Some(point_numbers) => point_numbers.clone(),
            None => panel
                .trace_render(p.curve_number)
                .and_then(|tr| tr.bin_points.get(p.point_number))
                .cloned()
                .unwrap_or_default(),
        };
        for index in indices {
            let mut expanded = EventPoint::new(p.curve_number, index);
            expanded.trace_uid = p.trace_uid.clone();
            points.push(expanded);
        }
    }
    points
}

/// Translate pre-filtered event points into original record indices
pub fn translate(panel: &PanelEntry, points: &[EventPoint]) -> BTreeSet<usize> {
    let mut indices = BTreeSet::new();
    let pie = matches!(panel.primary_type(), Some(ChartType::Pie));

    for p in points {
        // An aggregated point expands into all the original indices the
        // transform folded into it.
        let mapping = panel
            .trace_render(p.curve_number)
            .and_then(|tr| tr.index_to_points.as_ref());
        if let Some(mapping) = mapping {
            if let Some(expanded) = mapping.get(&p.point_number) {
                indices.extend(expanded.iter().copied());
            }
            continue;
        }

        if pie {
            if let Some(label) = &p.label {
                indices.extend(pie_label_indices(panel, label));
            }
            continue;
        }

        indices.insert(p.point_number);
    }

    indices
}

/// All slice indices whose label matches, over the panel's original labels
fn pie_label_indices(panel: &PanelEntry, label: &str) -> Vec<usize> {
    let labels = panel
        .traces
        .first()
        .and_then(|t| t.attributes.get("labels"))
        .and_then(Value::as_array);
    let Some(labels) = labels else {
        return Vec::new();
    };
    labels
        .iter()
        .enumerate()
        .filter(|(_, value)| label_matches(value, label))
        .map(|(index, _)| index)
        .collect()
}

fn label_matches(value: &Value, label: &str) -> bool {
    match value {
        Value::String(s) => s == label,
        Value::Number(n) => n.to_string() == label,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::panel::{PanelId, PanelRenderInfo, TraceRenderInfo};
    use crate::trace::TraceDef;
    use serde_json::json;
    use std::collections::BTreeMap;

    fn panel_with(chart_type: ChartType, attributes: Value, render: TraceRenderInfo) -> PanelEntry {
        let mut entry = PanelEntry::new(
            PanelId::from("p1"),
            vec![TraceDef::with_uid(chart_type, "t0", attributes)],
            json!({}),
        );
        entry.render = Some(PanelRenderInfo {
            traces: vec![render],
            trace_opacity: vec![1.0],
        });
        entry
    }

    #[test]
    fn test_scatter_points_pass_through() {
        let panel = panel_with(
            ChartType::Scatter,
            json!({ "xsrc": "u:1:a", "x": [1, 2, 3] }),
            TraceRenderInfo::default(),
        );
        let event = SelectionEvent::new(vec![
            EventPoint::new(0, 1).with_uid("t0"),
            EventPoint::new(0, 2).with_uid("t0"),
        ]);
        let points = event_points(&panel, false, Some(&event));
        assert_eq!(points.len(), 2);
        let indices = translate(&panel, &points);
        assert_eq!(indices, [1, 2].into_iter().collect());
    }

    #[test]
    fn test_overlay_points_are_dropped() {
        let panel = panel_with(
            ChartType::Scatter,
            json!({ "xsrc": "u:1:a", "x": [1, 2, 3] }),
            TraceRenderInfo::default(),
        );
        let event = SelectionEvent::new(vec![
            EventPoint::new(0, 0).with_uid("t0"),
            // overlay trace: curve index past the original trace set
            EventPoint::new(1, 1).with_uid("t0"),
            // stale uid on an original curve index
            EventPoint::new(0, 2).with_uid("other"),
        ]);
        let points = event_points(&panel, false, Some(&event));
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].point_number, 0);
    }

    #[test]
    fn test_histogram_bins_expand() {
        let render = TraceRenderInfo {
            bin_points: vec![vec![3, 7, 9], vec![1, 2]],
            ..TraceRenderInfo::default()
        };
        let panel = panel_with(
            ChartType::Histogram,
            json!({ "xsrc": "u:1:a", "x": vec![0; 10] }),
            render,
        );
        let event = SelectionEvent::new(vec![EventPoint::new(0, 0).with_uid("t0")]);
        let points = event_points(&panel, false, Some(&event));
        let indices = translate(&panel, &points);
        assert_eq!(indices, [3, 7, 9].into_iter().collect());
    }

    #[test]
    fn test_histogram_prefers_pre_expanded_point_numbers() {
        let panel = panel_with(
            ChartType::Histogram,
            json!({ "xsrc": "u:1:a", "x": vec![0; 10] }),
            TraceRenderInfo::default(),
        );
        let event = SelectionEvent::new(vec![EventPoint::new(0, 4)
            .with_uid("t0")
            .with_point_numbers(vec![5, 6])]);
        let points = event_points(&panel, false, Some(&event));
        let indices = translate(&panel, &points);
        assert_eq!(indices, [5, 6].into_iter().collect());
    }

    #[test]
    fn test_pie_click_selects_all_matching_labels() {
        let panel = panel_with(
            ChartType::Pie,
            json!({
                "labelssrc": "u:1:b",
                "labels": ["x", "y", "x", "y", "x"],
                "valuessrc": "u:1:a",
                "values": [1, 2, 3, 4, 5]
            }),
            TraceRenderInfo::default(),
        );
        let event = SelectionEvent::new(vec![EventPoint::new(0, 0).with_label("x")]);
        let points = event_points(&panel, false, Some(&event));
        let indices = translate(&panel, &points);
        assert_eq!(indices, [0, 2, 4].into_iter().collect());
    }

    #[test]
    fn test_pie_click_while_constrained_clears() {
        let panel = panel_with(
            ChartType::Pie,
            json!({ "labelssrc": "u:1:b", "labels": ["x", "y"] }),
            TraceRenderInfo::default(),
        );
        let event = SelectionEvent::new(vec![EventPoint::new(0, 0).with_label("x")]);
        assert!(event_points(&panel, true, Some(&event)).is_empty());
    }

    #[test]
    fn test_transform_mapping_expands_aggregated_points() {
        let mut index_to_points = BTreeMap::new();
        index_to_points.insert(0usize, vec![0, 3]);
        index_to_points.insert(1usize, vec![1, 2, 4]);
        let render = TraceRenderInfo {
            index_to_points: Some(index_to_points),
            ..TraceRenderInfo::default()
        };
        let panel = panel_with(
            ChartType::Scatter,
            json!({ "xsrc": "u:1:a", "x": [1, 2, 3, 4, 5] }),
            render,
        );
        let event = SelectionEvent::new(vec![EventPoint::new(0, 1).with_uid("t0")]);
        let points = event_points(&panel, false, Some(&event));
        let indices = translate(&panel, &points);
        assert_eq!(indices, [1, 2, 4].into_iter().collect());
    }
}

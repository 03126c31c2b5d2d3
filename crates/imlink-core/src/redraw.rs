//! Redraw instructions and salient overlay construction
//!
//! The engine never touches pixels. On every filter change it computes, per
//! member panel, either a restoration of the pristine snapshot or a salient
//! overlay trace set plus post-style instructions, and hands them to the
//! render collaborator.

use crate::crossfilter::FilterIndex;
use crate::grid::Record;
use crate::panel::{PanelEntry, PanelId};
use crate::trace::{self, AttrPath, ChartType, TraceDef};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Opacity for dimmed context traces
pub const DESELECT_DIM: f64 = 0.1;
/// Mapbox context markers need a much stronger dim to stay legible
pub const DESELECT_DIM_MAPBOX: f64 = 0.01;

/// One attribute-level patch for the render collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RestyleOp {
    /// Set the rendered opacity of one trace
    TraceOpacity { trace_index: usize, opacity: f64 },
    /// Restyle `marker.opacity` of one trace
    MarkerOpacity { trace_index: usize, opacity: f64 },
    /// Restyle `hoverinfo` of one trace
    HoverInfo {
        trace_index: usize,
        hover_info: String,
    },
    /// Flip trace visibility (stacked bars dim by hiding)
    Visible {
        trace_indices: Vec<usize>,
        visible: bool,
    },
    /// Clear the panel's native selected-point state
    ClearNativeSelection,
    /// Remove the lingering box/lasso selection outline
    ClearSelectionOutline,
}

/// Redraw instruction for one member panel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PanelRedraw {
    /// Nothing is constrained: restore the pristine snapshot
    Restore {
        panel: PanelId,
        post_style: Vec<RestyleOp>,
    },
    /// Replace any overlay with this salient trace set and dim the context
    Salient {
        panel: PanelId,
        overlay: Vec<TraceDef>,
        post_style: Vec<RestyleOp>,
    },
}

impl PanelRedraw {
    pub fn panel(&self) -> &PanelId {
        match self {
            PanelRedraw::Restore { panel, .. } | PanelRedraw::Salient { panel, .. } => panel,
        }
    }

    pub fn post_style(&self) -> &[RestyleOp] {
        match self {
            PanelRedraw::Restore { post_style, .. } | PanelRedraw::Salient { post_style, .. } => {
                post_style
            }
        }
    }

    pub(crate) fn post_style_mut(&mut self) -> &mut Vec<RestyleOp> {
        match self {
            PanelRedraw::Restore { post_style, .. } | PanelRedraw::Salient { post_style, .. } => {
                post_style
            }
        }
    }
}

/// Build one panel's redraw instruction for the current retained set
pub fn panel_redraw(index: &FilterIndex, panel: &PanelEntry, retained: &[&Record]) -> PanelRedraw {
    if index.some_constrained() {
        PanelRedraw::Salient {
            panel: panel.id.clone(),
            overlay: salient_overlay(index, panel, retained),
            post_style: post_style_ops(panel, true),
        }
    } else {
        PanelRedraw::Restore {
            panel: panel.id.clone(),
            post_style: post_style_ops(panel, false),
        }
    }
}

/// Copy of the panel's original traces carrying only the retained subset
///
/// Every grid-backed attribute starts blank and is overwritten at its bound
/// path with the retained records' values for the bound column.
pub fn salient_overlay(
    index: &FilterIndex,
    panel: &PanelEntry,
    retained: &[&Record],
) -> Vec<TraceDef> {
    let mut overlay = panel.traces.clone();
    for tr in &mut overlay {
        trace::erase_grid_data(&mut tr.attributes);
    }

    for source in index.panel_field_sources(&panel.id) {
        let values: Vec<Value> = retained
            .iter()
            .map(|record| {
                record
                    .get(&source.column)
                    .map(|cell| cell.to_json())
                    .unwrap_or(Value::Null)
            })
            .collect();
        let Some(tr) = overlay.get_mut(source.trace_index) else {
            continue;
        };
        trace::set_deep(&mut tr.attributes, &source.path, Value::Array(values));

        // Directly colored traces keep their resolved marker color; without
        // it the overlay would fall back to the default color cycle.
        if tr.chart_type != ChartType::Pie {
            if let Some(color) = panel
                .trace_render(source.trace_index)
                .and_then(|info| info.marker_color.as_ref())
            {
                if directly_colored(color) {
                    trace::set_deep(
                        &mut tr.attributes,
                        &AttrPath::new().key("marker").key("color"),
                        color.clone(),
                    );
                }
            }
        }
    }

    overlay
}

/// Scalar colors and explicit color-name arrays survive on the overlay;
/// numeric colorscale arrays must not, as the retained subset would re-scale.
fn directly_colored(color: &Value) -> bool {
    match color {
        Value::Array(items) => !items.first().map_or(false, is_numeric),
        _ => true,
    }
}

fn is_numeric(value: &Value) -> bool {
    match value {
        Value::Number(_) => true,
        Value::String(s) => s.parse::<f64>().is_ok(),
        _ => false,
    }
}

/// Per-chart-type context styling for the dimmed or restored state
pub fn post_style_ops(panel: &PanelEntry, dim: bool) -> Vec<RestyleOp> {
    let mut ops = Vec::new();
    let stacked = panel.barmode() == Some("stack");

    for (trace_index, tr) in panel.traces.iter().enumerate() {
        match tr.chart_type {
            ChartType::Choropleth => {
                push_hover_toggle(&mut ops, panel, trace_index, dim);
                // The context becomes invisible so it cannot interfere with
                // reading the overlay's colors against the colorscale.
                ops.push(RestyleOp::TraceOpacity {
                    trace_index,
                    opacity: if dim {
                        0.0
                    } else {
                        panel.original_opacity(trace_index)
                    },
                });
            }
            ChartType::Scatter | ChartType::Box => {
                push_hover_toggle(&mut ops, panel, trace_index, dim);
                ops.push(RestyleOp::TraceOpacity {
                    trace_index,
                    opacity: if dim {
                        DESELECT_DIM
                    } else {
                        panel.original_opacity(trace_index)
                    },
                });
            }
            ChartType::Bar => {
                push_hover_toggle(&mut ops, panel, trace_index, dim);
                if stacked {
                    // Dimmed stacked bars would still offset the salient
                    // stack, so the context is hidden outright.
                    ops.push(RestyleOp::Visible {
                        trace_indices: (0..panel.original_trace_count()).collect(),
                        visible: !dim,
                    });
                } else {
                    ops.push(RestyleOp::TraceOpacity {
                        trace_index,
                        opacity: if dim {
                            DESELECT_DIM
                        } else {
                            panel.original_opacity(trace_index)
                        },
                    });
                }
            }
            ChartType::Histogram => {
                ops.push(RestyleOp::TraceOpacity {
                    trace_index,
                    opacity: if dim {
                        0.0
                    } else {
                        panel.original_opacity(trace_index)
                    },
                });
            }
            ChartType::Table | ChartType::Pie => {
                ops.push(RestyleOp::TraceOpacity {
                    trace_index,
                    opacity: if dim { 0.0 } else { 1.0 },
                });
            }
            ChartType::ScatterMapbox => {
                ops.push(RestyleOp::MarkerOpacity {
                    trace_index,
                    opacity: if dim { DESELECT_DIM_MAPBOX } else { 1.0 },
                });
            }
            ChartType::Scatter3d => {
                let restored = panel
                    .trace_render(trace_index)
                    .and_then(|info| info.marker_opacity)
                    .unwrap_or(1.0);
                ops.push(RestyleOp::MarkerOpacity {
                    trace_index,
                    opacity: if dim { DESELECT_DIM } else { restored },
                });
            }
            ChartType::ScatterGeo | ChartType::Other(_) => {
                ops.push(RestyleOp::TraceOpacity {
                    trace_index,
                    opacity: if dim {
                        DESELECT_DIM
                    } else {
                        panel.original_opacity(trace_index)
                    },
                });
            }
        }
    }

    ops
}

/// Hover on the dimmed context is disabled: its values would read out of
/// sync with the visible retained subset.
fn push_hover_toggle(ops: &mut Vec<RestyleOp>, panel: &PanelEntry, trace_index: usize, dim: bool) {
    let Some(primary) = panel.primary_type() else {
        return;
    };
    if !primary.supports_hover_toggle() {
        return;
    }
    let target = if dim {
        Some("none".to_string())
    } else {
        panel
            .trace_render(trace_index)
            .and_then(|info| info.hover_info.clone())
    };
    if let Some(hover_info) = target {
        ops.push(RestyleOp::HoverInfo {
            trace_index,
            hover_info,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crossfilter::{DimensionRole, Predicate};
    use crate::panel::{PanelRenderInfo, TraceRenderInfo};
    use crate::registry::FieldSource;
    use serde_json::json;

    fn seeded() -> (FilterIndex, PanelEntry) {
        let mut index = FilterIndex::new();
        index.merge_field_source(FieldSource {
            panel: PanelId::from("p1"),
            trace_index: 0,
            src_attribute: "xsrc".to_string(),
            path: AttrPath::new().key("x"),
            column: "a".to_string(),
            data: vec![1.into(), 2.into(), 3.into(), 4.into(), 5.into()],
            constrained: false,
        });
        index.build();

        let mut panel = PanelEntry::new(
            PanelId::from("p1"),
            vec![TraceDef::with_uid(
                ChartType::Scatter,
                "t0",
                json!({ "xsrc": "u:1:a", "x": [1, 2, 3, 4, 5], "hoverinfo": "all" }),
            )],
            json!({}),
        );
        panel.render = Some(PanelRenderInfo {
            traces: vec![TraceRenderInfo {
                marker_color: Some(json!("#1f77b4")),
                hover_info: Some("all".to_string()),
                ..TraceRenderInfo::default()
            }],
            trace_opacity: vec![1.0],
        });
        (index, panel)
    }

    #[test]
    fn test_overlay_carries_retained_subset() {
        let (mut index, panel) = seeded();
        let dim = index.add_dimension(DimensionRole::Form);
        index.apply_predicate(
            dim,
            Some(Predicate::Indices([0, 2, 4].into_iter().collect())),
        );

        let retained = index.retained_records();
        let overlay = salient_overlay(&index, &panel, &retained);

        assert_eq!(overlay.len(), 1);
        assert_eq!(overlay[0].attributes["x"], json!([1.0, 3.0, 5.0]));
        // scalar marker color carried over from the rendered appearance
        assert_eq!(overlay[0].attributes["marker"]["color"], json!("#1f77b4"));
    }

    #[test]
    fn test_numeric_color_arrays_are_not_carried() {
        let (mut index, mut panel) = seeded();
        if let Some(render) = panel.render.as_mut() {
            render.traces[0].marker_color = Some(json!([1, 2, 3, 4, 5]));
        }
        let dim = index.add_dimension(DimensionRole::Form);
        index.apply_predicate(dim, Some(Predicate::Indices([1].into_iter().collect())));

        let retained = index.retained_records();
        let overlay = salient_overlay(&index, &panel, &retained);
        assert!(overlay[0].attributes.get("marker").is_none());
    }

    #[test]
    fn test_scatter_post_style_dims_and_restores() {
        let (_, panel) = seeded();

        let dimmed = post_style_ops(&panel, true);
        assert!(dimmed.contains(&RestyleOp::TraceOpacity {
            trace_index: 0,
            opacity: DESELECT_DIM
        }));
        assert!(dimmed.contains(&RestyleOp::HoverInfo {
            trace_index: 0,
            hover_info: "none".to_string()
        }));

        let restored = post_style_ops(&panel, false);
        assert!(restored.contains(&RestyleOp::TraceOpacity {
            trace_index: 0,
            opacity: 1.0
        }));
        assert!(restored.contains(&RestyleOp::HoverInfo {
            trace_index: 0,
            hover_info: "all".to_string()
        }));
    }

    #[test]
    fn test_stacked_bars_dim_by_hiding() {
        let mut panel = PanelEntry::new(
            PanelId::from("p1"),
            vec![TraceDef::with_uid(
                ChartType::Bar,
                "t0",
                json!({ "ysrc": "u:1:a", "y": [1, 2] }),
            )],
            json!({ "barmode": "stack" }),
        );
        panel.render = Some(PanelRenderInfo::default());

        let ops = post_style_ops(&panel, true);
        assert!(ops.contains(&RestyleOp::Visible {
            trace_indices: vec![0],
            visible: false
        }));
    }

    #[test]
    fn test_panel_redraw_variant_follows_constraint_state() {
        let (mut index, panel) = seeded();
        let retained = index.retained_records();
        assert!(matches!(
            panel_redraw(&index, &panel, &retained),
            PanelRedraw::Restore { .. }
        ));

        let dim = index.add_dimension(DimensionRole::Form);
        index.apply_predicate(dim, Some(Predicate::Indices([0].into_iter().collect())));
        let retained = index.retained_records();
        match panel_redraw(&index, &panel, &retained) {
            PanelRedraw::Salient { overlay, .. } => {
                assert_eq!(overlay[0].attributes["x"], json!([1.0]));
            }
            PanelRedraw::Restore { .. } => panic!("expected a salient redraw"),
        }
    }
}

//! Panel membership and registration-time snapshots
//!
//! A panel is an independently rendered surface owned by the host. The
//! engine keeps, per member panel, the original trace definitions and the
//! rendered appearance reported by the render collaborator, so the pristine
//! look can be restored and the salient overlay reconstructed.

use crate::crossfilter::DimensionId;
use crate::trace::{ChartType, TraceDef};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Opaque identifier the host uses for one rendered panel
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PanelId(String);

impl PanelId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PanelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PanelId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for PanelId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Render-layer metadata for one rendered trace, reported by the render
/// collaborator once panel setup completes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TraceRenderInfo {
    /// Resolved marker color: a scalar color or a per-point array
    pub marker_color: Option<Value>,
    /// Resolved marker opacity
    pub marker_opacity: Option<f64>,
    /// Resolved hover-info setting
    pub hover_info: Option<String>,
    /// Histogram only: original record indices aggregated into each bin
    pub bin_points: Vec<Vec<usize>>,
    /// Index-to-points mapping recorded by the last active aggregation
    /// transform, if the trace has one
    pub index_to_points: Option<BTreeMap<usize, Vec<usize>>>,
}

/// Snapshot of a panel's rendered appearance, taken once the render
/// collaborator's (possibly deferred) setup resolves
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PanelRenderInfo {
    /// Per-trace resolved metadata, aligned with the trace definitions
    pub traces: Vec<TraceRenderInfo>,
    /// Rendered opacity per trace, used to restore the pristine look
    pub trace_opacity: Vec<f64>,
}

/// One member panel of a dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelEntry {
    pub id: PanelId,
    /// Original trace definitions, untouched by filtering
    pub traces: Vec<TraceDef>,
    /// Panel layout attributes (`barmode` drives bar post-styling)
    pub layout: Value,
    /// Render snapshot; `None` until setup completes
    pub render: Option<PanelRenderInfo>,
    pub included_in_crossfilter: bool,
    /// The panel's own selection dimension
    pub dimension: Option<DimensionId>,
}

impl PanelEntry {
    pub fn new(id: PanelId, traces: Vec<TraceDef>, layout: Value) -> Self {
        Self {
            id,
            traces,
            layout,
            render: None,
            included_in_crossfilter: false,
            dimension: None,
        }
    }

    /// Panels are driven by their first trace's chart type
    pub fn primary_type(&self) -> Option<&ChartType> {
        self.traces.first().map(|t| &t.chart_type)
    }

    pub fn original_trace_count(&self) -> usize {
        self.traces.len()
    }

    pub fn trace_uid(&self, curve: usize) -> Option<&str> {
        self.traces.get(curve).map(|t| t.uid.as_str())
    }

    pub fn trace_render(&self, curve: usize) -> Option<&TraceRenderInfo> {
        self.render.as_ref().and_then(|r| r.traces.get(curve))
    }

    /// Rendered opacity of one trace at registration time
    pub fn original_opacity(&self, curve: usize) -> f64 {
        self.render
            .as_ref()
            .and_then(|r| r.trace_opacity.get(curve))
            .copied()
            .unwrap_or(1.0)
    }

    pub fn is_ready(&self) -> bool {
        self.render.is_some()
    }

    pub fn barmode(&self) -> Option<&str> {
        self.layout.get("barmode").and_then(Value::as_str)
    }
}

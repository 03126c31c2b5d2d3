//! The dashboard coordinator
//!
//! `Dashboard` owns the shared [`FilterIndex`] and the member panels; it is
//! the one object every panel operation goes through. Interaction events and
//! programmatic filters come in, redraw instructions come out; nothing is
//! rendered here.
//!
//! All operations are synchronous and assume they never overlap on one
//! dashboard. Hosts with more than one thread must serialize dashboard
//! access externally.

use crate::compliance;
use crate::config::DashboardConfig;
use crate::crossfilter::{DimensionId, DimensionRole, FilterIndex, Predicate};
use crate::error::{DashboardError, DashboardResult};
use crate::event::SelectionEvent;
use crate::panel::{PanelEntry, PanelId, PanelRenderInfo};
use crate::redraw::{self, PanelRedraw, RestyleOp};
use crate::registry;
use crate::trace::TraceDef;
use crate::translate;
use imlink_filter::{parse_filter, FilterSpec};
use serde_json::Value;
use tracing::debug;

/// Coordinator for one set of linked panels
pub struct Dashboard {
    config: DashboardConfig,
    index: FilterIndex,
    panels: Vec<PanelEntry>,
    form_dimension: DimensionId,
    linked: bool,
}

impl Dashboard {
    /// Create an empty dashboard
    pub fn new(config: DashboardConfig) -> Self {
        let mut index = FilterIndex::new();
        let form_dimension = index.add_dimension(DimensionRole::Form);
        Self {
            config,
            index,
            panels: Vec::new(),
            form_dimension,
            linked: false,
        }
    }

    /// Register a panel's trace definitions
    ///
    /// Extracts the panel's field sources and re-probes linkability over the
    /// accumulated trace set. A capability mismatch is not an error; the
    /// dashboard just stays unlinked and its panels render normally.
    pub fn register(
        &mut self,
        id: PanelId,
        traces: Vec<TraceDef>,
        layout: Value,
    ) -> DashboardResult<()> {
        if self.panels.iter().any(|p| p.id == id) {
            return Err(DashboardError::DuplicatePanel(id));
        }
        self.panels.push(PanelEntry::new(id.clone(), traces, layout));

        let all_traces: Vec<&TraceDef> = self
            .panels
            .iter()
            .flat_map(|p| p.traces.iter())
            .collect();
        let linkable = compliance::is_linkable(&all_traces, &self.config.chart_type_allow_list);
        self.linked = self.config.crossfiltering_enabled && linkable;
        if !self.linked {
            debug!("dashboard not linkable after registering panel {id}; rendering unlinked");
            return Ok(());
        }

        let mut sources = Vec::new();
        if let Some(entry) = self.panels.last() {
            for (trace_index, tr) in entry.traces.iter().enumerate() {
                sources.extend(registry::collect_field_sources(&entry.id, trace_index, tr));
            }
        }
        debug!("registered panel {id} with {} field sources", sources.len());
        for source in sources {
            self.index.merge_field_source(source);
        }
        Ok(())
    }

    /// Complete a panel's registration once the render collaborator finishes
    /// its possibly deferred setup
    ///
    /// This is a one-time barrier per panel: the original appearance is
    /// snapshotted, the panel's selection dimension is created, and the
    /// record index is rebuilt over the merged grid. Calling it again for an
    /// already included panel has no effect.
    pub fn complete_panel(&mut self, id: &PanelId, render: PanelRenderInfo) -> DashboardResult<()> {
        if !self.linked {
            // Capability degrade: the panel renders unlinked.
            return Ok(());
        }
        let Some(position) = self.panels.iter().position(|p| &p.id == id) else {
            return Err(DashboardError::UnknownPanel(id.clone()));
        };
        if self.panels[position].included_in_crossfilter {
            return Ok(());
        }

        let dimension = self.index.add_dimension(DimensionRole::Plot(id.clone()));
        let entry = &mut self.panels[position];
        entry.render = Some(render);
        entry.dimension = Some(dimension);
        entry.included_in_crossfilter = true;

        self.index.build();
        debug!(
            "panel {id} joined the crossfilter; {} records indexed",
            self.index.record_count()
        );
        Ok(())
    }

    /// Handle a selection or click event on one member panel
    ///
    /// A new selection supersedes every prior filter dashboard-wide: all
    /// predicates are cleared, the event is translated, and the resulting
    /// predicate lands on the originating panel's own dimension. Returns the
    /// redraw instructions for every member panel.
    pub fn on_selection(
        &mut self,
        id: &PanelId,
        event: Option<&SelectionEvent>,
    ) -> DashboardResult<Vec<PanelRedraw>> {
        if !self.linked {
            return Err(DashboardError::LinkingDisabled);
        }
        let Some(entry) = self.panels.iter().find(|p| &p.id == id) else {
            return Err(DashboardError::UnknownPanel(id.clone()));
        };
        let Some(dimension) = entry.dimension else {
            return Err(DashboardError::PanelNotReady(id.clone()));
        };

        let was_constrained = self
            .index
            .dimension(dimension)
            .map_or(false, |d| d.is_constrained());
        let points = translate::event_points(entry, was_constrained, event);

        self.index.reset_all();

        let constrained = !points.is_empty();
        let indices = translate::translate(entry, &points);
        debug!(
            "selection on panel {id}: {} event points -> {} records",
            points.len(),
            indices.len()
        );
        self.index
            .apply_predicate(dimension, constrained.then(|| Predicate::Indices(indices)));

        let mut redraws = self.broadcast();
        for redraw in &mut redraws {
            if redraw.panel() == id {
                // The native selection state would fight the salient overlay.
                redraw.post_style_mut().push(RestyleOp::ClearNativeSelection);
                if !constrained {
                    redraw
                        .post_style_mut()
                        .push(RestyleOp::ClearSelectionOutline);
                }
            }
        }
        Ok(redraws)
    }

    /// Install a programmatic filter on the dashboard's form dimension
    ///
    /// The previous form filter, if any, is disposed first. Filters over
    /// columns the grid does not have are rejected.
    pub fn apply_filter(&mut self, spec: FilterSpec) -> DashboardResult<Vec<PanelRedraw>> {
        if !self.linked {
            return Err(DashboardError::LinkingDisabled);
        }
        if !self.index.grid().contains_column(&spec.column) {
            return Err(DashboardError::ColumnNotFound(spec.column));
        }
        debug!("form filter on column {} ({})", spec.column, spec.op.as_str());
        self.index.apply_predicate(
            self.form_dimension,
            Some(Predicate::Column {
                column: spec.column,
                op: spec.op,
                value: spec.value,
            }),
        );
        Ok(self.broadcast())
    }

    /// Parse and install a textual filter expression, e.g. `"mass > 1e10"`
    ///
    /// Malformed expressions and out-of-set operators are rejected before
    /// anything is installed.
    pub fn apply_filter_expr(&mut self, expr: &str) -> DashboardResult<Vec<PanelRedraw>> {
        let spec = parse_filter(expr)?;
        self.apply_filter(spec)
    }

    /// Clear every filter and restore all panels
    pub fn reset(&mut self) -> Vec<PanelRedraw> {
        self.index.reset_all();
        debug!("dashboard filters reset");
        self.broadcast()
    }

    /// Compute redraw instructions for every included member panel
    fn broadcast(&self) -> Vec<PanelRedraw> {
        let retained = self.index.retained_records();
        self.panels
            .iter()
            .filter(|p| p.included_in_crossfilter)
            .map(|p| redraw::panel_redraw(&self.index, p, &retained))
            .collect()
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    /// Whether crossfiltering is live for this dashboard
    pub fn is_linked(&self) -> bool {
        self.linked
    }

    pub fn index(&self) -> &FilterIndex {
        &self.index
    }

    /// Original indices of the currently retained records
    pub fn retained_indices(&self) -> Vec<usize> {
        self.index.retained_indices()
    }

    pub fn panel(&self, id: &PanelId) -> Option<&PanelEntry> {
        self.panels.iter().find(|p| &p.id == id)
    }

    pub fn panels(&self) -> &[PanelEntry] {
        &self.panels
    }
}

impl Default for Dashboard {
    fn default() -> Self {
        Self::new(DashboardConfig::default())
    }
}

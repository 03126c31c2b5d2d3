//! Dashboard configuration surface

use crate::compliance;
use crate::trace::ChartType;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeSet;

/// Layout attributes a crossfiltered dashboard forces onto member panels:
/// box select as the default drag gesture, no legends competing with the
/// salient overlay
pub fn default_layout_overrides() -> Value {
    json!({ "dragmode": "select", "showlegend": false })
}

/// Configuration for one dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Master switch; disabled dashboards render unlinked
    pub crossfiltering_enabled: bool,
    /// Layout attributes applied to every member panel
    pub layout_overrides: Value,
    /// Chart types allowed to participate in linking
    pub chart_type_allow_list: BTreeSet<ChartType>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            crossfiltering_enabled: true,
            layout_overrides: default_layout_overrides(),
            chart_type_allow_list: compliance::default_allow_list(),
        }
    }
}

impl DashboardConfig {
    /// Configuration with crossfiltering switched off
    pub fn disabled() -> Self {
        Self {
            crossfiltering_enabled: false,
            ..Self::default()
        }
    }
}
